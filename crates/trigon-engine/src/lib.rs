//! Trigon engine crate.
//!
//! Platform + GPU runtime for small fixed-pipeline demos: one window, one
//! frame loop, programs and buffers built once at startup.

pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;
