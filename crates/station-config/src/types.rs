use channel_decode::ChannelConfig;
use serde::{Deserialize, Serialize};

pub const CHANNEL_COUNT: usize = 8;

/// Pass/fail targets and tolerances. All millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub d1_target: f64,
    pub d1_tol: f64,
    pub d2_target: f64,
    pub d2_tol: f64,
    pub len_target: f64,
    pub len_tol: f64,
    #[serde(rename = "dDelta_max")]
    pub ddelta_max: f64,
    pub end1_max: f64,
    pub end2_max: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            d1_target: 0.0,
            d1_tol: 0.050,
            d2_target: 0.0,
            d2_tol: 0.050,
            len_target: 1165.0,
            len_tol: 0.200,
            ddelta_max: 0.050,
            end1_max: 0.050,
            end2_max: 0.050,
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), String> {
        let targets = [
            ("d1_target", self.d1_target),
            ("d2_target", self.d2_target),
            ("len_target", self.len_target),
        ];
        for (name, v) in targets {
            if !v.is_finite() {
                return Err(format!("{name} must be finite"));
            }
        }
        let bounds = [
            ("d1_tol", self.d1_tol),
            ("d2_tol", self.d2_tol),
            ("len_tol", self.len_tol),
            ("dDelta_max", self.ddelta_max),
            ("end1_max", self.end1_max),
            ("end2_max", self.end2_max),
        ];
        for (name, v) in bounds {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{name} must be finite and >= 0"));
            }
        }
        Ok(())
    }
}

/// Per-channel zero offsets in millimetres, applied additively after decode.
///
/// Tolerant of legacy files with fewer than 8 entries; missing slots are
/// zero, extras are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct OffsetConfig(pub [f64; CHANNEL_COUNT]);

impl Default for OffsetConfig {
    fn default() -> Self {
        Self([0.0; CHANNEL_COUNT])
    }
}

impl From<Vec<f64>> for OffsetConfig {
    fn from(v: Vec<f64>) -> Self {
        let mut out = [0.0; CHANNEL_COUNT];
        for (slot, value) in out.iter_mut().zip(v) {
            *slot = value;
        }
        Self(out)
    }
}

impl From<OffsetConfig> for Vec<f64> {
    fn from(o: OffsetConfig) -> Self {
        o.0.to_vec()
    }
}

impl OffsetConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (idx, v) in self.0.iter().enumerate() {
            if !v.is_finite() {
                return Err(format!("offset {idx} must be finite"));
            }
        }
        Ok(())
    }
}

/// Decode parameters for all 8 channels. Same padding rules as offsets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ChannelConfig>", into = "Vec<ChannelConfig>")]
pub struct ChannelRegistry(pub [ChannelConfig; CHANNEL_COUNT]);

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self([ChannelConfig::default(); CHANNEL_COUNT])
    }
}

impl From<Vec<ChannelConfig>> for ChannelRegistry {
    fn from(v: Vec<ChannelConfig>) -> Self {
        let mut out = [ChannelConfig::default(); CHANNEL_COUNT];
        for (slot, cfg) in out.iter_mut().zip(v) {
            *slot = cfg;
        }
        Self(out)
    }
}

impl From<ChannelRegistry> for Vec<ChannelConfig> {
    fn from(r: ChannelRegistry) -> Self {
        r.0.to_vec()
    }
}

impl ChannelRegistry {
    pub fn validate(&self) -> Result<(), String> {
        for (idx, cfg) in self.0.iter().enumerate() {
            cfg.validate().map_err(|e| format!("channel {idx}: {e}"))?;
        }
        Ok(())
    }
}

/// HMI serial link settings. `serial_port = "DISABLED"` turns the link off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HmiSettings {
    pub serial_port: String,
    pub baud: u32,
}

impl Default for HmiSettings {
    fn default() -> Self {
        Self {
            serial_port: "/dev/serial0".to_string(),
            baud: 115_200,
        }
    }
}

/// The single persisted configuration object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub hub_addr: String,
    pub poll_interval_s: f64,
    pub request_timeout_s: f64,
    pub hmi: HmiSettings,
    pub targets: TargetConfig,
    pub offsets_mm: OffsetConfig,
    pub channels: ChannelRegistry,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            hub_addr: "192.168.100.1".to_string(),
            poll_interval_s: 0.5,
            request_timeout_s: 1.0,
            hmi: HmiSettings::default(),
            targets: TargetConfig::default(),
            offsets_mm: OffsetConfig::default(),
            channels: ChannelRegistry::default(),
        }
    }
}

impl StationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.poll_interval_s.is_finite() && self.poll_interval_s > 0.0) {
            return Err("poll_interval_s must be > 0".to_string());
        }
        if !(self.request_timeout_s.is_finite() && self.request_timeout_s > 0.0) {
            return Err("request_timeout_s must be > 0".to_string());
        }
        self.targets.validate()?;
        self.offsets_mm.validate()?;
        self.channels.validate()?;
        Ok(())
    }
}

/// A settable configuration field, as named by the HMI `SET` vocabulary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SetKey {
    D1Target,
    D1Tol,
    D2Target,
    D2Tol,
    LenTarget,
    LenTol,
    DDeltaMax,
    End1Max,
    End2Max,
    Offset(usize),
}

impl SetKey {
    /// Map a wire token (`d1t`, `lentol`, `off3`, ...) to a field.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "d1t" => Some(SetKey::D1Target),
            "d1tol" => Some(SetKey::D1Tol),
            "d2t" => Some(SetKey::D2Target),
            "d2tol" => Some(SetKey::D2Tol),
            "lent" => Some(SetKey::LenTarget),
            "lentol" => Some(SetKey::LenTol),
            "ddelmax" => Some(SetKey::DDeltaMax),
            "e1max" => Some(SetKey::End1Max),
            "e2max" => Some(SetKey::End2Max),
            _ => {
                let idx = token.strip_prefix("off")?.parse::<usize>().ok()?;
                if idx < CHANNEL_COUNT {
                    Some(SetKey::Offset(idx))
                } else {
                    None
                }
            }
        }
    }

    /// Targets and maxima that bound a check must not go negative.
    pub fn requires_non_negative(self) -> bool {
        matches!(
            self,
            SetKey::D1Tol
                | SetKey::D2Tol
                | SetKey::LenTol
                | SetKey::DDeltaMax
                | SetKey::End1Max
                | SetKey::End2Max
        )
    }
}
