//! measure-engine: per-cycle evaluation of the gauged part
//!
//! Each sampling cycle decodes the 8 channel registers, applies the
//! station's zero offsets, derives the part metrics (diameters, delta, end
//! spreads, length) and checks them against the configured targets. The
//! whole pass is deterministic: identical registers and configuration
//! always produce an identical result, and a decode failure fails the
//! cycle rather than fabricating a value.

mod types;
pub use types::{Checks, MeasurementResult, MeasurementSample};

mod error;
pub use error::{CycleError, Result};

mod engine;
pub use engine::{
    decode_channels, evaluate, evaluate_cycle, part_length, CONSTANT_LENGTH_MM,
};
