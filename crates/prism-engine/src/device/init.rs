/// Initialization parameters for the GL layer.
///
/// Keep this structure small. Add flags only when a concrete platform
/// requirement exists.
#[derive(Debug, Clone)]
pub struct GlInit {
    /// Synchronize buffer swaps with the display refresh.
    pub vsync: bool,

    /// Depth buffer precision requested from the surface config.
    pub depth_bits: u8,

    /// Try a desktop GL 3.3 core context before falling back to GLES 3.0.
    pub prefer_desktop_gl: bool,
}

impl Default for GlInit {
    fn default() -> Self {
        Self {
            vsync: true,
            depth_bits: 24,
            prefer_desktop_gl: true,
        }
    }
}
