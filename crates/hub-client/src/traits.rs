use crate::{PortReading, Result};

/// A minimal blocking hub interface.
pub trait HubClient {
    /// Read one port's process-data register (ports 1..=8).
    fn read_port(&mut self, port: u8) -> Result<PortReading>;
}
