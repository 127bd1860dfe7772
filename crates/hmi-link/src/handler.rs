use crate::{Command, HmiFrame, FRAME_TERMINATOR};
use measure_engine::MeasurementResult;
use station_config::{in_to_mm, mm_to_in, ConfigStore, OffsetConfig, TargetConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Display colour codes (RGB565): pass and fail.
pub const NX_GREEN: u16 = 2016;
pub const NX_RED: u16 = 63488;

/// One outgoing command for the display, terminator not yet appended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutgoingFrame(String);

impl OutgoingFrame {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// Wire bytes: ASCII text plus the 3-byte terminator.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.0.len() + FRAME_TERMINATOR.len());
        out.extend_from_slice(self.0.as_bytes());
        out.extend_from_slice(&FRAME_TERMINATOR);
        out
    }
}

/// Render a millimetre value as inches with the display's fixed precision.
/// Unmeasured values show as a dash.
fn fmt_in(value_mm: f64) -> String {
    if value_mm.is_finite() {
        format!("{:.3}", mm_to_in(value_mm))
    } else {
        "-".to_string()
    }
}

fn text_frame(name: &str, value_mm: f64) -> OutgoingFrame {
    OutgoingFrame(format!("{name}.txt=\"{}\"", fmt_in(value_mm)))
}

fn colour_frame(name: &str, ok: bool) -> OutgoingFrame {
    let colour = if ok { NX_GREEN } else { NX_RED };
    OutgoingFrame(format!("{name}.pco={colour}"))
}

/// The nine target fields, in wire order.
pub fn target_frames(targets: &TargetConfig) -> Vec<OutgoingFrame> {
    vec![
        text_frame("tD1Target", targets.d1_target),
        text_frame("tD1Tol", targets.d1_tol),
        text_frame("tD2Target", targets.d2_target),
        text_frame("tD2Tol", targets.d2_tol),
        text_frame("tLenTarget", targets.len_target),
        text_frame("tLenTol", targets.len_tol),
        text_frame("tDeltaMax", targets.ddelta_max),
        text_frame("tEnd1Max", targets.end1_max),
        text_frame("tEnd2Max", targets.end2_max),
    ]
}

/// The eight per-channel offsets, `tOff0` through `tOff7`.
pub fn offset_frames(offsets: &OffsetConfig) -> Vec<OutgoingFrame> {
    offsets
        .0
        .iter()
        .enumerate()
        .map(|(idx, &value)| text_frame(&format!("tOff{idx}"), value))
        .collect()
}

/// The six measured values, in wire order.
pub fn value_frames(result: &MeasurementResult) -> Vec<OutgoingFrame> {
    vec![
        text_frame("tD1", result.d1),
        text_frame("tD2", result.d2),
        text_frame("tDelta", result.d_delta),
        text_frame("tEnd1", result.end1_rng),
        text_frame("tEnd2", result.end2_rng),
        text_frame("tLen", result.length),
    ]
}

pub fn status_frame(result: &MeasurementResult) -> OutgoingFrame {
    let status = if result.overall_pass { "PASS" } else { "FAIL" };
    OutgoingFrame(format!("tStatus.txt=\"{status}\""))
}

/// Everything the operator page shows after a cycle: values, per-field
/// colours, the verdict, and a page refresh.
pub fn live_frames(result: &MeasurementResult) -> Vec<OutgoingFrame> {
    let mut out = value_frames(result);
    out.push(colour_frame("tD1", result.checks.d1));
    out.push(colour_frame("tD2", result.checks.d2));
    out.push(colour_frame("tDelta", result.checks.d_delta));
    out.push(colour_frame("tEnd1", result.checks.end1_rng));
    out.push(colour_frame("tEnd2", result.checks.end2_rng));
    out.push(colour_frame("tLen", result.checks.length));
    out.push(status_frame(result));
    out.push(colour_frame("tStatus", result.overall_pass));
    let bco = if result.overall_pass { NX_GREEN } else { NX_RED };
    out.push(OutgoingFrame(format!("op.bco={bco}")));
    out.push(OutgoingFrame("ref op".to_string()));
    out
}

/// Frames sent once after the link opens: display setup, then the current
/// targets and offsets.
pub fn init_frames(targets: &TargetConfig, offsets: &OffsetConfig) -> Vec<OutgoingFrame> {
    let mut out = vec![
        OutgoingFrame("bkcmd=3".to_string()),
        OutgoingFrame("page op".to_string()),
        OutgoingFrame("sendme".to_string()),
    ];
    out.extend(target_frames(targets));
    out.extend(offset_frames(offsets));
    out
}

/// Dispatches complete frames: mutates configuration for `SET`/`SAVE`,
/// formats reply frames for the query commands. Protocol violations are
/// logged and dropped; they never stop the link.
pub struct ProtocolHandler {
    store: Arc<ConfigStore>,
}

impl ProtocolHandler {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Handle one complete frame against the latest measurement. Returns
    /// the frames to write, in order, before the next frame is processed.
    pub fn handle(&self, frame: &HmiFrame, latest: &MeasurementResult) -> Vec<OutgoingFrame> {
        if frame.is_empty() {
            return Vec::new();
        }
        let bytes = frame.bytes();
        let lead = bytes[0];
        if lead == 0x70 {
            // Display text reply: payload is NUL-terminated
            let payload = bytes[1..].split(|&b| b == 0).next().unwrap_or(&[]);
            info!("display text reply: {}", String::from_utf8_lossy(payload));
            return Vec::new();
        }
        if !(0x20..=0x7E).contains(&lead) {
            debug!("binary frame from display, lead=0x{lead:02X}");
            return Vec::new();
        }
        let line = match core::str::from_utf8(bytes) {
            Ok(s) => s.trim(),
            Err(_) => {
                warn!("dropping non-ASCII frame from display");
                return Vec::new();
            }
        };
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("ignoring display command '{}': {}", line, e);
                return Vec::new();
            }
        };
        match command {
            Command::Set { key, value_in } => {
                match self.store.apply_set(key, in_to_mm(value_in)) {
                    Ok(()) => info!("display set {:?} = {} in", key, value_in),
                    Err(e) => warn!("display set rejected: {}", e),
                }
                Vec::new()
            }
            Command::Save => {
                match self.store.save() {
                    Ok(()) => info!("configuration saved from display"),
                    Err(e) => warn!("configuration save failed: {}", e),
                }
                Vec::new()
            }
            Command::ReqTargets => target_frames(&self.store.snapshot().targets),
            Command::ReqOffsets => offset_frames(&self.store.snapshot().offsets_mm),
            Command::Dump => {
                let config = self.store.snapshot();
                let mut out = target_frames(&config.targets);
                out.extend(offset_frames(&config.offsets_mm));
                out.extend(value_frames(latest));
                out.push(status_frame(latest));
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameAccumulator;
    use station_config::SetKey;

    fn handler() -> (tempfile::TempDir, Arc<ConfigStore>, ProtocolHandler) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ConfigStore::open(dir.path().join("station.json")).unwrap());
        let handler = ProtocolHandler::new(store.clone());
        (dir, store, handler)
    }

    fn frame(text: &str) -> HmiFrame {
        HmiFrame::from_bytes(text.as_bytes())
    }

    #[test]
    fn encode_appends_terminator() {
        let wire = OutgoingFrame::new("tStatus.txt=\"PASS\"").encode();
        assert!(wire.ends_with(&FRAME_TERMINATOR));
        assert_eq!(&wire[..wire.len() - 3], b"tStatus.txt=\"PASS\"");
    }

    #[test]
    fn set_updates_memory_in_millimetres() {
        let (_dir, store, handler) = handler();
        let out = handler.handle(&frame("SET d1t 1.234"), &MeasurementResult::unmeasured());
        assert!(out.is_empty());
        assert!((store.snapshot().targets.d1_target - 31.3436).abs() < 1e-9);
    }

    #[test]
    fn bad_set_leaves_state_alone() {
        let (_dir, store, handler) = handler();
        let before = store.snapshot();
        for line in ["SET bogus 1.0", "SET d1t abc", "SET d1tol -2.0"] {
            let out = handler.handle(&frame(line), &MeasurementResult::unmeasured());
            assert!(out.is_empty());
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn req_targets_renders_inches_three_decimals() {
        let (_dir, store, handler) = handler();
        store.apply_set(SetKey::D1Target, in_to_mm(1.234)).unwrap();
        let out = handler.handle(&frame("REQ TARGETS"), &MeasurementResult::unmeasured());
        assert_eq!(out.len(), 9);
        assert_eq!(out[0].text(), "tD1Target.txt=\"1.234\"");
        // 0.050 mm default tolerance -> 0.002 in
        assert_eq!(out[1].text(), "tD1Tol.txt=\"0.002\"");
        // 1165.0 mm -> 45.866 in
        assert_eq!(out[4].text(), "tLenTarget.txt=\"45.866\"");
    }

    #[test]
    fn req_offsets_covers_all_channels() {
        let (_dir, _store, handler) = handler();
        let out = handler.handle(&frame("REQ OFFSETS"), &MeasurementResult::unmeasured());
        assert_eq!(out.len(), 8);
        assert_eq!(out[0].text(), "tOff0.txt=\"0.000\"");
        assert_eq!(out[7].text(), "tOff7.txt=\"0.000\"");
    }

    #[test]
    fn dump_order_is_targets_offsets_values_status() {
        let (_dir, _store, handler) = handler();
        let mut latest = MeasurementResult::unmeasured();
        latest.overall_pass = true;
        let out = handler.handle(&frame("DUMP"), &latest);
        assert_eq!(out.len(), 9 + 8 + 6 + 1);
        assert!(out[0].text().starts_with("tD1Target.txt="));
        assert!(out[9].text().starts_with("tOff0.txt="));
        assert!(out[17].text().starts_with("tD1.txt="));
        assert_eq!(out[23].text(), "tStatus.txt=\"PASS\"");
    }

    #[test]
    fn unmeasured_values_render_as_dash() {
        let out = value_frames(&MeasurementResult::unmeasured());
        assert_eq!(out[0].text(), "tD1.txt=\"-\"");
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let (_dir, store, handler) = handler();
        let before = store.snapshot();
        for text in ["HELLO", "set d1t 1.0", ""] {
            let out = handler.handle(&frame(text), &MeasurementResult::unmeasured());
            assert!(out.is_empty());
        }
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn binary_and_text_reply_frames_are_skipped() {
        let (_dir, _store, handler) = handler();
        let latest = MeasurementResult::unmeasured();
        let reply = HmiFrame::from_bytes(&[0x70, b'o', b'k', 0x00]);
        assert!(handler.handle(&reply, &latest).is_empty());
        let binary = HmiFrame::from_bytes(&[0x01, 0x02]);
        assert!(handler.handle(&binary, &latest).is_empty());
    }

    #[test]
    fn live_frames_cover_values_colours_and_verdict() {
        let mut result = MeasurementResult::unmeasured();
        result.overall_pass = false;
        let out = live_frames(&result);
        assert_eq!(out.len(), 6 + 6 + 1 + 1 + 1 + 1);
        assert_eq!(out[6].text(), format!("tD1.pco={NX_RED}"));
        assert_eq!(out[12].text(), "tStatus.txt=\"FAIL\"");
        assert_eq!(out[14].text(), format!("op.bco={NX_RED}"));
        assert_eq!(out[15].text(), "ref op");
    }

    #[test]
    fn init_frames_set_up_page_then_push_config() {
        let cfg = station_config::StationConfig::default();
        let out = init_frames(&cfg.targets, &cfg.offsets_mm);
        assert_eq!(out[0].text(), "bkcmd=3");
        assert_eq!(out[1].text(), "page op");
        assert_eq!(out[2].text(), "sendme");
        assert_eq!(out.len(), 3 + 9 + 8);
    }

    #[test]
    fn accumulated_set_round_trip() {
        let (_dir, store, handler) = handler();
        let mut acc = FrameAccumulator::new();
        let mut frames = acc.push(b"SET d1t ");
        frames.extend(acc.push(b"1.234\xFF\xFF\xFF"));
        assert_eq!(frames.len(), 1);
        let out = handler.handle(&frames[0], &MeasurementResult::unmeasured());
        assert!(out.is_empty());
        assert!((store.snapshot().targets.d1_target - 31.3436).abs() < 1e-9);
    }
}
