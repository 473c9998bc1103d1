//! Frame timing.
//!
//! The runtime owns one `FramePacer`; it decides when the next frame is due
//! and reports per-frame timing snapshots.

mod frame_pacer;

pub use frame_pacer::{FramePacer, FrameTime, DEFAULT_FRAME_INTERVAL};
