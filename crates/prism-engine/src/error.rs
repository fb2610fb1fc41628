use std::path::PathBuf;

use thiserror::Error;

use crate::gl::ShaderStage;

/// Errors produced while building or driving the render pipeline.
///
/// Everything raised before the first frame is fatal to startup. The message
/// carries the driver's diagnostic text where one exists.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A shader stage failed to compile.
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// The program failed to link.
    #[error("failed to link shader program: {log}")]
    ProgramLink { log: String },

    /// No drawing context could be obtained.
    #[error("drawing context unavailable: {0}")]
    MissingContext(String),

    /// A shader was handed to the linker in the wrong slot.
    #[error("expected a {expected} shader, got a {found} shader")]
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },

    /// A required vertex attribute is not declared by the linked program.
    #[error("attribute `{name}` is not active in the linked program")]
    MissingAttribute { name: String },

    /// A required uniform is not declared by the linked program.
    #[error("uniform `{name}` is not active in the linked program")]
    MissingUniform { name: String },

    /// Mesh arrays do not describe a consistent indexed triangle list.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// The driver refused to allocate an object.
    #[error("failed to create {what}: {reason}")]
    ResourceCreation { what: &'static str, reason: String },

    /// `FrameLoop::start` was called more than once.
    #[error("frame loop already started")]
    LoopAlreadyStarted,

    /// `FrameLoop::tick` was called while no frame was scheduled.
    #[error("frame loop has no frame scheduled")]
    LoopNotScheduled,

    /// Presenting or resizing the window surface failed.
    #[error("surface error: {0}")]
    Surface(String),

    /// Image bytes could not be decoded into pixels.
    #[error("failed to decode texture image: {0}")]
    TextureDecode(#[from] image::ImageError),

    /// The texture file could not be read.
    #[error("failed to read texture {}: {source}", path.display())]
    TextureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background loader went away without delivering an image.
    #[error("texture loader disconnected")]
    LoaderDisconnected,
}

pub type Result<T> = std::result::Result<T, RenderError>;
