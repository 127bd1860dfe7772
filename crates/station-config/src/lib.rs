//! station-config: the gauge station's persisted configuration
//!
//! One JSON file holds everything an operator can change: pass/fail targets
//! and tolerances, per-channel zero offsets, channel decode parameters, and
//! the hub/HMI connection settings. All values are stored in millimetres;
//! inches exist only at the HMI and dashboard boundaries.

mod types;
pub use types::{
    ChannelRegistry, HmiSettings, OffsetConfig, SetKey, StationConfig, TargetConfig, CHANNEL_COUNT,
};

mod error;
pub use error::{ConfigError, Result};

mod store;
pub use store::ConfigStore;

mod units;
pub use units::{in_to_mm, mm_to_in, MM_PER_IN};
