use std::cell::Cell;
use std::rc::Rc;

use crate::error::{RenderError, Result};
use crate::time::{FrameClock, FrameTime};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Not started yet.
    Idle,
    /// Exactly one frame request is outstanding.
    Scheduled,
    /// Inside a frame callback.
    Rendering,
    /// Terminal.
    Stopped,
}

/// Proof that one frame is scheduled.
///
/// Consumed by [`FrameLoop::tick`]; a new one is handed back for the next
/// frame unless the loop has been stopped.
#[must_use = "dropping the request ends the loop"]
#[derive(Debug)]
pub struct FrameRequest {
    _private: (),
}

impl FrameRequest {
    fn new() -> Self {
        Self { _private: () }
    }
}

/// Cancels the loop from anywhere on the render thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

/// Frame scheduling state machine.
///
/// The host drives it: call [`start`](Self::start) once, then feed every
/// frame request back into [`tick`](Self::tick) together with the host
/// timestamp of the redraw.
#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    clock: FrameClock,
    stop: StopHandle,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            state: LoopState::Idle,
            clock,
            stop: StopHandle::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Schedules the first frame. Only valid once.
    pub fn start(&mut self) -> Result<FrameRequest> {
        if self.state != LoopState::Idle {
            return Err(RenderError::LoopAlreadyStarted);
        }
        self.state = LoopState::Scheduled;
        log::debug!("frame loop started");
        Ok(FrameRequest::new())
    }

    /// Runs one frame for `request` at host time `now_ms`.
    ///
    /// Returns the next request, or `None` once the stop handle has fired.
    /// A callback error stops the loop and is returned as is. A loop that is
    /// not `Scheduled` rejects the request with
    /// [`RenderError::LoopNotScheduled`] and stays in its state.
    pub fn tick<F>(
        &mut self,
        _request: FrameRequest,
        now_ms: f64,
        frame: F,
    ) -> Result<Option<FrameRequest>>
    where
        F: FnOnce(FrameTime) -> Result<()>,
    {
        if self.state != LoopState::Scheduled {
            return Err(RenderError::LoopNotScheduled);
        }

        self.state = LoopState::Rendering;
        let time = self.clock.tick_at(now_ms);

        if let Err(err) = frame(time) {
            self.state = LoopState::Stopped;
            return Err(err);
        }

        if self.stop.is_stopped() {
            self.state = LoopState::Stopped;
            log::info!("frame loop stopped after {} frame(s)", time.frame_index + 1);
            return Ok(None);
        }

        self.state = LoopState::Scheduled;
        Ok(Some(FrameRequest::new()))
    }
}
