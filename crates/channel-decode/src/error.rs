use crate::ChannelFormat;
use thiserror::Error;

pub type Result<T, E = DecodeError> = core::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(&'static str),
    #[error("bit range [{start}, {start}+{len}) exceeds register width {width}")]
    BitRangeOutOfBounds { start: u32, len: u32, width: u32 },
    #[error("bit slice not supported for format {0:?}")]
    UnsupportedCombination(ChannelFormat),
    #[error("sensor fault sentinel in reading")]
    SensorFault,
}
