use std::time::{Duration, Instant};

use winit::event::WindowEvent;

use crate::core::AppControl;
use crate::time::FramePacer;

/// Platform-independent state of the frame loop.
///
/// The exit latch is one-way: once a close is observed no further frame is
/// drawn, even if more events arrive in the same batch.
#[derive(Debug, Clone)]
pub struct LoopState {
    exit_requested: bool,
    pacer: FramePacer,
}

impl LoopState {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            exit_requested: false,
            pacer: FramePacer::new(frame_interval),
        }
    }

    /// Feeds one window event; returns `Exit` once the loop must stop.
    pub fn observe(&mut self, event: &WindowEvent) -> AppControl {
        if matches!(event, WindowEvent::CloseRequested | WindowEvent::Destroyed) {
            self.request_exit();
        }
        self.control()
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn control(&self) -> AppControl {
        if self.exit_requested {
            AppControl::Exit
        } else {
            AppControl::Continue
        }
    }

    /// Whether a frame should be drawn at `now`.
    pub fn should_draw(&self, now: Instant) -> bool {
        !self.exit_requested && self.pacer.is_due(now)
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut FramePacer {
        &mut self.pacer
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            exit_requested: false,
            pacer: FramePacer::default(),
        }
    }
}
