use crate::{Checks, CycleError, MeasurementResult, MeasurementSample, Result};
use channel_decode::decode_hex;
use hub_client::PortReading;
use station_config::{ChannelRegistry, OffsetConfig, TargetConfig, CHANNEL_COUNT};

/// Reference length of the fixture, millimetres.
pub const CONSTANT_LENGTH_MM: f64 = 1165.0;

/// Legacy part-length formula.
///
/// Kept as a single named function: the coefficients are inherited from the
/// previous station firmware and must be confirmed against that device
/// before they are changed.
pub fn part_length(end1_mm: f64, end2_mm: f64) -> f64 {
    CONSTANT_LENGTH_MM - (end1_mm + end2_mm)
}

/// Decode all 8 channel registers into a sample.
///
/// Fails on the first undecodable channel, naming it; no value is ever
/// substituted for a bad register.
pub fn decode_channels(
    readings: &[PortReading; CHANNEL_COUNT],
    registry: &ChannelRegistry,
) -> Result<MeasurementSample> {
    let mut values_mm = [0.0; CHANNEL_COUNT];
    for (idx, reading) in readings.iter().enumerate() {
        values_mm[idx] = decode_hex(&reading.raw_hex, &registry.0[idx])
            .map_err(|source| CycleError::Channel {
                channel: idx,
                source,
            })?;
    }
    Ok(MeasurementSample { values_mm })
}

/// Derive the part metrics from a sample and check them against targets.
///
/// Channel map: 0 -> d1, 1 -> d2, 2..=4 -> end 1 probes, 5..=7 -> end 2
/// probes. All bounds are inclusive.
pub fn evaluate(
    sample: &MeasurementSample,
    targets: &TargetConfig,
    offsets: &OffsetConfig,
) -> MeasurementResult {
    let mut ch = [0.0; CHANNEL_COUNT];
    for idx in 0..CHANNEL_COUNT {
        ch[idx] = sample.values_mm[idx] + offsets.0[idx];
    }

    let d1 = ch[0];
    let d2 = ch[1];
    let d_delta = (d1 - d2).abs();
    let end1_rng = spread(ch[2], ch[3], ch[4]);
    let end2_rng = spread(ch[5], ch[6], ch[7]);
    let length = part_length(ch[2], ch[5]);

    let checks = Checks {
        d1: within_tol(d1, targets.d1_target, targets.d1_tol),
        d2: within_tol(d2, targets.d2_target, targets.d2_tol),
        d_delta: within_max(d_delta, targets.ddelta_max),
        end1_rng: within_max(end1_rng, targets.end1_max),
        end2_rng: within_max(end2_rng, targets.end2_max),
        length: within_tol(length, targets.len_target, targets.len_tol),
    };

    MeasurementResult {
        d1,
        d2,
        d_delta,
        end1_rng,
        end2_rng,
        length,
        checks,
        overall_pass: checks.all(),
    }
}

/// Decode and evaluate one full cycle.
pub fn evaluate_cycle(
    readings: &[PortReading; CHANNEL_COUNT],
    registry: &ChannelRegistry,
    targets: &TargetConfig,
    offsets: &OffsetConfig,
) -> Result<MeasurementResult> {
    let sample = decode_channels(readings, registry)?;
    Ok(evaluate(&sample, targets, offsets))
}

fn within_tol(value: f64, target: f64, tol: f64) -> bool {
    value.is_finite() && target.is_finite() && tol.is_finite() && (value - target).abs() <= tol
}

fn within_max(value: f64, max: f64) -> bool {
    value.is_finite() && max.is_finite() && value <= max
}

fn spread(a: f64, b: f64, c: f64) -> f64 {
    let max = a.max(b).max(c);
    let min = a.min(b).min(c);
    max - min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(hex: [&str; CHANNEL_COUNT]) -> [PortReading; CHANNEL_COUNT] {
        core::array::from_fn(|i| PortReading {
            port: i as u8 + 1,
            raw_hex: hex[i].to_string(),
            timestamp: None,
        })
    }

    fn sample(values_mm: [f64; CHANNEL_COUNT]) -> MeasurementSample {
        MeasurementSample { values_mm }
    }

    #[test]
    fn micron_pattern_decodes_to_millimetres() {
        let hex = ["0000", "0005", "000A", "0000", "0005", "000A", "0000", "0005"];
        let got = decode_channels(&readings(hex), &ChannelRegistry::default()).unwrap();
        let want = [0.000, 0.005, 0.010, 0.000, 0.005, 0.010, 0.000, 0.005];
        for (g, w) in got.values_mm.iter().zip(want) {
            assert!((g - w).abs() < 1e-12);
        }
    }

    #[test]
    fn bad_channel_fails_the_cycle_and_names_it() {
        let hex = ["0000", "0005", "000A", "zzzz", "0005", "000A", "0000", "0005"];
        let err = decode_channels(&readings(hex), &ChannelRegistry::default()).unwrap_err();
        let CycleError::Channel { channel, .. } = err;
        assert_eq!(channel, 3);
    }

    #[test]
    fn d1_within_tolerance_passes() {
        let mut targets = TargetConfig::default();
        targets.d1_target = 31.3436;
        targets.d1_tol = 0.10;
        let mut values = [0.0; CHANNEL_COUNT];
        values[0] = 31.34;
        let result = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!(result.checks.d1);
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut targets = TargetConfig::default();
        targets.d1_target = 10.0;
        targets.d1_tol = 0.5;
        let mut values = [0.0; CHANNEL_COUNT];

        values[0] = 10.5;
        let at_bound = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!(at_bound.checks.d1);

        values[0] = 10.5 + 1e-9;
        let past_bound = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!(!past_bound.checks.d1);
    }

    #[test]
    fn delta_is_absolute() {
        let mut targets = TargetConfig::default();
        targets.ddelta_max = 0.05;
        let mut values = [0.0; CHANNEL_COUNT];
        values[0] = 10.00;
        values[1] = 10.04;
        let r = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!((r.d_delta - 0.04).abs() < 1e-12);
        assert!(r.checks.d_delta);

        values[1] = 10.06;
        let r = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!(!r.checks.d_delta);
    }

    #[test]
    fn end_spread_is_max_minus_min() {
        let mut targets = TargetConfig::default();
        targets.end1_max = 0.02;
        let mut values = [0.0; CHANNEL_COUNT];
        values[2] = 1.000;
        values[3] = 1.015;
        values[4] = 0.995;
        let r = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!((r.end1_rng - 0.020).abs() < 1e-12);
        assert!(r.checks.end1_rng);
    }

    #[test]
    fn length_uses_the_legacy_formula() {
        let mut values = [0.0; CHANNEL_COUNT];
        values[2] = 2.0;
        values[5] = 3.0;
        let r = evaluate(
            &sample(values),
            &TargetConfig::default(),
            &OffsetConfig::default(),
        );
        assert_eq!(r.length, CONSTANT_LENGTH_MM - 5.0);
        assert_eq!(part_length(2.0, 3.0), 1160.0);
    }

    #[test]
    fn offsets_are_additive_after_decode() {
        let mut targets = TargetConfig::default();
        targets.d1_target = 1.0;
        targets.d1_tol = 0.001;
        let mut offsets = OffsetConfig::default();
        offsets.0[0] = 0.5;
        let mut values = [0.0; CHANNEL_COUNT];
        values[0] = 0.5;
        let r = evaluate(&sample(values), &targets, &offsets);
        assert_eq!(r.d1, 1.0);
        assert!(r.checks.d1);
    }

    #[test]
    fn overall_pass_is_the_and_of_all_checks() {
        // Targets sized so the all-zero sample passes everything
        let mut targets = TargetConfig::default();
        targets.len_target = CONSTANT_LENGTH_MM;
        let zero = sample([0.0; CHANNEL_COUNT]);
        let r = evaluate(&zero, &targets, &OffsetConfig::default());
        assert!(r.checks.all());
        assert!(r.overall_pass);

        // Break exactly one check
        targets.end2_max = 0.0005;
        let mut values = [0.0; CHANNEL_COUNT];
        values[6] = 0.001;
        let r = evaluate(&sample(values), &targets, &OffsetConfig::default());
        assert!(!r.checks.end2_rng);
        assert!(!r.overall_pass);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let hex = ["0000", "0005", "000A", "0000", "0005", "000A", "0000", "0005"];
        let registry = ChannelRegistry::default();
        let targets = TargetConfig::default();
        let offsets = OffsetConfig::default();
        let a = evaluate_cycle(&readings(hex), &registry, &targets, &offsets).unwrap();
        let b = evaluate_cycle(&readings(hex), &registry, &targets, &offsets).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unmeasured_never_passes() {
        let r = MeasurementResult::unmeasured();
        assert!(!r.overall_pass);
        assert!(r.d1.is_nan());
    }
}
