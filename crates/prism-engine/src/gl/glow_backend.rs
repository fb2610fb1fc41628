use glow::HasContext;

use super::{
    BufferTarget, ClearMask, DepthFunc, Gl, IndexType, Primitive, ShaderDialect, ShaderStage,
    TextureFilter, TextureWrap,
};
use crate::error::{RenderError, Result};

/// [`Gl`] over a loaded `glow` context.
///
/// Invariant: the GL context `gl` was loaded from is current on the calling
/// thread for as long as this value is used. Every `unsafe` block below
/// relies on that and on handles having been produced by this same context.
pub struct GlowContext {
    gl: glow::Context,
    dialect: ShaderDialect,
    vertex_array: glow::VertexArray,
}

impl GlowContext {
    /// Wraps a loaded context.
    ///
    /// Core profiles reject attribute setup without a bound vertex array
    /// object, so one is created and left bound for the context's lifetime.
    ///
    /// # Safety
    ///
    /// The context `gl` was loaded from must be current on this thread and
    /// stay current while the returned value is in use.
    pub unsafe fn new(gl: glow::Context, dialect: ShaderDialect) -> Result<Self> {
        let vertex_array = unsafe { gl.create_vertex_array() }.map_err(|reason| {
            RenderError::ResourceCreation {
                what: "vertex array",
                reason,
            }
        })?;
        unsafe { gl.bind_vertex_array(Some(vertex_array)) };

        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        let renderer = unsafe { gl.get_parameter_string(glow::RENDERER) };
        log::info!("GL context ready: {version} ({renderer}), dialect {dialect:?}");

        Ok(Self {
            gl,
            dialect,
            vertex_array,
        })
    }
}

impl Drop for GlowContext {
    fn drop(&mut self) {
        unsafe { self.gl.delete_vertex_array(self.vertex_array) };
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn index_enum(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::UnsignedShort => glow::UNSIGNED_SHORT,
    }
}

fn primitive_enum(mode: Primitive) -> u32 {
    match mode {
        Primitive::Triangles => glow::TRIANGLES,
    }
}

fn depth_enum(func: DepthFunc) -> u32 {
    match func {
        DepthFunc::LessEqual => glow::LEQUAL,
    }
}

fn wrap_enum(wrap: TextureWrap) -> i32 {
    match wrap {
        TextureWrap::Repeat => glow::REPEAT as i32,
        TextureWrap::ClampToEdge => glow::CLAMP_TO_EDGE as i32,
    }
}

fn filter_enum(filter: TextureFilter) -> i32 {
    match filter {
        TextureFilter::Nearest => glow::NEAREST as i32,
        TextureFilter::Linear => glow::LINEAR as i32,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR as i32,
    }
}

impl Gl for GlowContext {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type Texture = glow::Texture;
    type UniformLocation = glow::UniformLocation;

    fn dialect(&self) -> ShaderDialect {
        self.dialect
    }

    fn create_shader(&self, stage: ShaderStage) -> std::result::Result<glow::Shader, String> {
        unsafe { self.gl.create_shader(stage_enum(stage)) }
    }

    fn shader_source(&self, shader: glow::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: glow::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: glow::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: glow::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: glow::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> std::result::Result<glow::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: glow::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: glow::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: glow::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<glow::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn delete_program(&self, program: glow::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn attrib_location(&self, program: glow::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn uniform_location(&self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn create_buffer(&self) -> std::result::Result<glow::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<glow::Buffer>) {
        unsafe { self.gl.bind_buffer(target_enum(target), buffer) }
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target_enum(target), data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, buffer: glow::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                location,
                components,
                glow::FLOAT,
                normalized,
                stride,
                offset,
            )
        }
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) }
    }

    fn uniform_matrix_4(&self, location: &glow::UniformLocation, data: &[f32; 16]) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(Some(location), false, data) }
    }

    fn uniform_1_i32(&self, location: &glow::UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(Some(location), value) }
    }

    fn create_texture(&self) -> std::result::Result<glow::Texture, String> {
        unsafe { self.gl.create_texture() }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&self, texture: Option<glow::Texture>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture) }
    }

    fn tex_image_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            // Rows of odd-width images are not 4-byte aligned in general.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn texture_sampling(&self, wrap: TextureWrap, min: TextureFilter, mag: TextureFilter) {
        unsafe {
            let wrap = wrap_enum(wrap);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter_enum(min));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter_enum(mag));
        }
    }

    fn generate_mipmap_2d(&self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn delete_texture(&self, texture: glow::Texture) {
        unsafe { self.gl.delete_texture(texture) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_depth(&self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) }
    }

    fn depth_test(&self, func: DepthFunc) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_func(depth_enum(func));
        }
    }

    fn clear(&self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe { self.gl.clear(bits) }
    }

    fn draw_elements(&self, mode: Primitive, count: i32, index_type: IndexType, offset: i32) {
        unsafe {
            self.gl
                .draw_elements(primitive_enum(mode), count, index_enum(index_type), offset)
        }
    }
}
