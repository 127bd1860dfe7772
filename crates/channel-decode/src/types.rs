use serde::{Deserialize, Serialize};

/// Wire format of one channel's raw register.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFormat {
    UintBe,
    UintLe,
    IntBe,
    IntLe,
    FloatBe,
    FloatLe,
}

impl ChannelFormat {
    pub fn is_integer(self) -> bool {
        !matches!(self, ChannelFormat::FloatBe | ChannelFormat::FloatLe)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, ChannelFormat::IntBe | ChannelFormat::IntLe)
    }

    pub fn is_big_endian(self) -> bool {
        matches!(
            self,
            ChannelFormat::UintBe | ChannelFormat::IntBe | ChannelFormat::FloatBe
        )
    }
}

impl Default for ChannelFormat {
    fn default() -> Self {
        ChannelFormat::UintBe
    }
}

/// Decode parameters for one channel.
///
/// `offset_mm` is a decode-time calibration constant applied after `scale`;
/// it is independent of the per-channel zeroing offsets the station applies
/// on top of the decoded value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(rename = "raw_format", default)]
    pub format: ChannelFormat,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(rename = "offset", default)]
    pub offset_mm: f64,
    #[serde(default)]
    pub start_bit: Option<u32>,
    #[serde(default)]
    pub bit_length: Option<u32>,
}

fn default_scale() -> f64 {
    0.001
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            format: ChannelFormat::UintBe,
            scale: default_scale(),
            offset_mm: 0.0,
            start_bit: None,
            bit_length: None,
        }
    }
}

impl ChannelConfig {
    /// Check the invariants that can be checked without a payload.
    ///
    /// Width-dependent bounds are enforced at decode time, where the
    /// register width is known.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err("scale must be finite and nonzero");
        }
        if !self.offset_mm.is_finite() {
            return Err("offset must be finite");
        }
        let sliced = self.start_bit.is_some() || self.bit_length.is_some();
        if sliced && !self.format.is_integer() {
            return Err("bit slice is only valid for integer formats");
        }
        if self.start_bit.is_some() != self.bit_length.is_some() {
            return Err("start_bit and bit_length must be set together");
        }
        if let Some(len) = self.bit_length {
            if len == 0 || len > 64 {
                return Err("bit_length must be in 1..=64");
            }
        }
        Ok(())
    }
}
