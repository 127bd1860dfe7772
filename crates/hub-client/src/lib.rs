//! hub-client: the sensor-hub collaborator seam
//!
//! The measurement loop fetches one hex-encoded process-data register per
//! port and cycle through the `HubClient` trait. The default build enables
//! a `mock` backend so the daemon and tests run on any host; the production
//! transport lives behind the same trait.

mod types;
pub use types::{PortReading, Timestamp, PORT_COUNT};

mod error;
pub use error::{HubError, Result};

mod traits;
pub use traits::HubClient;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockHub;
