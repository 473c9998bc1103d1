//! Contract between the runtime (platform loop) and the program it drives.
//!
//! The runtime owns the window and GPU; the program sees them only through
//! `InitCtx` (once, at startup) and `FrameCtx` (once per frame).

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, InitCtx};
