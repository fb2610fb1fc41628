use winit::dpi::PhysicalSize;

use crate::gl::GlowContext;

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub gl: &'a GlowContext,
    /// Drawable size in physical pixels.
    pub size: PhysicalSize<u32>,
    /// Milliseconds since the runtime started.
    pub timestamp_ms: f64,
}

impl FrameCtx<'_> {
    /// Drawable size as `(width, height)`.
    pub fn drawable(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }
}
