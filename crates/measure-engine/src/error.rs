use channel_decode::DecodeError;
use thiserror::Error;

pub type Result<T, E = CycleError> = core::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("channel {channel}: {source}")]
    Channel {
        channel: usize,
        #[source]
        source: DecodeError,
    },
}
