use serde::{Deserialize, Serialize};
use station_config::CHANNEL_COUNT;

/// Decoded channel values for one sampling cycle, millimetres, before the
/// station zero offsets. Built fresh each cycle, never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasurementSample {
    pub values_mm: [f64; CHANNEL_COUNT],
}

/// Outcome of each pass/fail check.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Checks {
    pub d1: bool,
    pub d2: bool,
    pub d_delta: bool,
    pub end1_rng: bool,
    pub end2_rng: bool,
    pub length: bool,
}

impl Checks {
    pub fn all(self) -> bool {
        self.d1 && self.d2 && self.d_delta && self.end1_rng && self.end2_rng && self.length
    }
}

/// One cycle's derived metrics (millimetres) and verdicts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub d1: f64,
    pub d2: f64,
    pub d_delta: f64,
    pub end1_rng: f64,
    pub end2_rng: f64,
    pub length: f64,
    pub checks: Checks,
    pub overall_pass: bool,
}

impl MeasurementResult {
    /// Placeholder shown before the first good cycle: no values, no pass.
    pub fn unmeasured() -> Self {
        Self {
            d1: f64::NAN,
            d2: f64::NAN,
            d_delta: f64::NAN,
            end1_rng: f64::NAN,
            end2_rng: f64::NAN,
            length: f64::NAN,
            checks: Checks {
                d1: false,
                d2: false,
                d_delta: false,
                end1_rng: false,
                end2_rng: false,
                length: false,
            },
            overall_pass: false,
        }
    }
}
