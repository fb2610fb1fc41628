use winit::event::WindowEvent;

use crate::gl::GlowContext;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    /// Present and schedule another redraw.
    Continue,
    /// Present, then wait for the next external redraw request.
    Wait,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once the GL context is current, before the first frame.
    fn init(&mut self, gl: &GlowContext) -> crate::Result<()>;

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw. An error ends the event loop and is returned
    /// from `Runtime::run`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> crate::Result<AppControl>;

    /// Called before the context goes away.
    fn shutdown(&mut self, gl: &GlowContext) {
        let _ = gl;
    }
}
