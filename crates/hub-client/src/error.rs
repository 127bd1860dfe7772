use thiserror::Error;

pub type Result<T, E = HubError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("port out of range: {0}")]
    InvalidPort(u8),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("no register data in response")]
    NoData,
}
