//! GL context seam.
//!
//! Every GPU call made by the pipeline goes through [`Gl`], an explicitly
//! passed context object. Two implementations ship with the crate:
//! - [`GlowContext`] drives a real desktop GL / GLES context through `glow`
//! - [`RecordingGl`] is headless and records calls for inspection
//!
//! Raw GL enums do not cross this boundary; the small typed enums below are
//! mapped to GL constants inside each backend.

mod glow_backend;
pub mod recording;

use std::fmt;

pub use glow_backend::GlowContext;
pub use recording::{GlCall, RecordingGl};

/// Shader pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// GLSL flavour accepted by the current context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderDialect {
    /// Desktop GL 3.3 core profile.
    Glsl330,
    /// GLES 3.0 / WebGL2.
    Es300,
}

impl ShaderDialect {
    /// `#version` line prepended to stage bodies.
    pub fn header(self) -> &'static str {
        match self {
            ShaderDialect::Glsl330 => "#version 330 core\n",
            ShaderDialect::Es300 => "#version 300 es\n",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexType {
    UnsignedShort,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Primitive {
    Triangles,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthFunc {
    LessEqual,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// Buffers cleared by [`Gl::clear`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR_DEPTH: ClearMask = ClearMask {
        color: true,
        depth: true,
    };
}

/// The subset of the GL API the render pipeline relies on.
///
/// Handle types are opaque to callers. Object creation reports driver
/// failures as `Err(reason)`; everything else mirrors GL's fire-and-forget
/// style, with status queried explicitly where GL requires it.
pub trait Gl {
    type Shader: Copy + Eq + fmt::Debug;
    type Program: Copy + Eq + fmt::Debug;
    type Buffer: Copy + Eq + fmt::Debug;
    type Texture: Copy + Eq + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    /// Shading language flavour this context compiles.
    fn dialect(&self) -> ShaderDialect;

    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    /// Returns `None` where GL would return `-1`.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    // ── buffers + vertex state ────────────────────────────────────────────

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Uploads `data` to the buffer bound at `target` with static usage.
    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Describes f32 data in the bound array buffer for `location`.
    fn vertex_attrib_pointer_f32(
        &self,
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn enable_vertex_attrib_array(&self, location: u32);

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Column-major 4x4 matrix upload.
    fn uniform_matrix_4(&self, location: &Self::UniformLocation, data: &[f32; 16]);
    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&self) -> Result<Self::Texture, String>;
    /// Selects texture unit `unit` (0-based).
    fn active_texture(&self, unit: u32);
    fn bind_texture_2d(&self, texture: Option<Self::Texture>);
    /// Uploads tightly packed RGBA8 pixels to the bound 2D texture, level 0.
    fn tex_image_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]);
    fn texture_sampling(&self, wrap: TextureWrap, min: TextureFilter, mag: TextureFilter);
    fn generate_mipmap_2d(&self);
    fn delete_texture(&self, texture: Self::Texture);

    // ── frame state + draws ───────────────────────────────────────────────

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&self, depth: f32);
    /// Enables depth testing with `func`.
    fn depth_test(&self, func: DepthFunc);
    fn clear(&self, mask: ClearMask);
    fn draw_elements(&self, mode: Primitive, count: i32, index_type: IndexType, offset: i32);
}
