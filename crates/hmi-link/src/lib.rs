//! hmi-link: framed ASCII protocol to the operator display
//!
//! The display sends single-line ASCII commands and receives
//! `<field>.txt="…"` assignments, both terminated by the 3-byte sequence
//! `0xFF 0xFF 0xFF`. Values cross the wire in inches; everything internal
//! stays in millimetres. The default build enables a `mock` port so the
//! daemon and tests run without a serial device; the real link sits behind
//! the `serial` feature.

mod frame;
pub use frame::{FrameAccumulator, HmiFrame, FRAME_TERMINATOR, MAX_FRAME_LEN};

mod error;
pub use error::{LinkError, ProtocolError, Result};

mod command;
pub use command::Command;

mod handler;
pub use handler::{
    init_frames, live_frames, offset_frames, status_frame, target_frames, value_frames,
    OutgoingFrame, ProtocolHandler, NX_GREEN, NX_RED,
};

mod port;
pub use port::HmiPort;

#[cfg(feature = "mock")]
pub use port::MockPort;

#[cfg(feature = "serial")]
pub use port::SerialHmiPort;
