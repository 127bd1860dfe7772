//! channel-decode: raw register decoding for gauge channels
//!
//! Converts the hex-encoded process-data registers reported by the sensor
//! hub into signed engineering values in millimetres, driven entirely by a
//! per-channel `ChannelConfig` (format, scale, calibration offset, optional
//! bit slice for packed sub-fields).

mod types;
pub use types::{ChannelConfig, ChannelFormat};

mod error;
pub use error::{DecodeError, Result};

mod decode;
pub use decode::{decode, decode_hex, parse_hex, SENTINEL_RAW_MIN};
