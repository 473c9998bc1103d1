//! Window + runtime loop.
//!
//! Owns the `winit` event loop and the single window, and wires them to the
//! GPU layer and the frame pacer.

mod loop_state;
mod runtime;

pub use loop_state::LoopState;
pub use runtime::{Runtime, RuntimeConfig};
