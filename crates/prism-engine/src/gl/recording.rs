//! Headless [`Gl`] implementation.
//!
//! `RecordingGl` keeps just enough object state to behave like a driver for
//! the pipeline: shaders "compile" when their GLSL is well formed, programs
//! link when a compiled vertex and fragment shader are attached, and
//! attribute/uniform locations are resolved from the declarations found in
//! the attached sources. Every state-changing call is appended to a log that
//! tests inspect.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{
    BufferTarget, ClearMask, DepthFunc, Gl, IndexType, Primitive, ShaderDialect, ShaderStage,
    TextureFilter, TextureWrap,
};

/// One recorded state-changing call. Handles are the recorder's object ids.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader { shader: u32, stage: ShaderStage },
    ShaderSource { shader: u32 },
    CompileShader { shader: u32 },
    DeleteShader { shader: u32 },
    CreateProgram { program: u32 },
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    UseProgram { program: Option<u32> },
    DeleteProgram { program: u32 },
    CreateBuffer { buffer: u32 },
    BindBuffer { target: BufferTarget, buffer: Option<u32> },
    BufferData { target: BufferTarget, buffer: Option<u32>, len: usize },
    DeleteBuffer { buffer: u32 },
    VertexAttribPointer {
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    },
    EnableVertexAttribArray { location: u32 },
    UniformMatrix4 { location: u32, data: [f32; 16] },
    Uniform1i { location: u32, value: i32 },
    CreateTexture { texture: u32 },
    ActiveTexture { unit: u32 },
    BindTexture2d { texture: Option<u32> },
    TexImage2d { texture: Option<u32>, width: u32, height: u32 },
    TextureSampling {
        wrap: TextureWrap,
        min: TextureFilter,
        mag: TextureFilter,
    },
    GenerateMipmap { texture: Option<u32> },
    DeleteTexture { texture: u32 },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    ClearColor { rgba: [f32; 4] },
    ClearDepth { depth: f32 },
    DepthTest { func: DepthFunc },
    Clear { mask: ClearMask },
    DrawElements {
        mode: Primitive,
        count: i32,
        index_type: IndexType,
        offset: i32,
    },
}

#[derive(Debug, Default)]
struct ShaderObject {
    stage: Option<ShaderStage>,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    calls: Vec<GlCall>,

    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    buffers: HashMap<u32, Vec<u8>>,
    textures: HashMap<u32, (u32, u32)>,

    array_binding: Option<u32>,
    element_binding: Option<u32>,
    texture_binding: Option<u32>,

    fail_creation: Option<String>,
    fail_link: Option<String>,
}

impl State {
    fn alloc(&mut self) -> Result<u32, String> {
        if let Some(reason) = &self.fail_creation {
            return Err(reason.clone());
        }
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn binding(&self, target: BufferTarget) -> Option<u32> {
        match target {
            BufferTarget::Array => self.array_binding,
            BufferTarget::ElementArray => self.element_binding,
        }
    }
}

/// Headless, call-recording GL context.
#[derive(Debug)]
pub struct RecordingGl {
    dialect: ShaderDialect,
    state: RefCell<State>,
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::with_dialect(ShaderDialect::Es300)
    }

    pub fn with_dialect(dialect: ShaderDialect) -> Self {
        Self {
            dialect,
            state: RefCell::new(State::default()),
        }
    }

    /// Makes every subsequent object creation fail with `reason`.
    pub fn fail_resource_creation(&self, reason: impl Into<String>) {
        self.state.borrow_mut().fail_creation = Some(reason.into());
    }

    /// Makes every subsequent link fail with `log`.
    pub fn fail_link(&self, log: impl Into<String>) {
        self.state.borrow_mut().fail_link = Some(log.into());
    }

    /// Snapshot of all recorded calls, oldest first.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    /// Recorded draw calls only.
    pub fn draw_calls(&self) -> Vec<GlCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements { .. }))
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Bytes last uploaded to `buffer`, if it is alive.
    pub fn buffer_contents(&self, buffer: u32) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Dimensions last uploaded to `texture`, if it is alive.
    pub fn texture_size(&self, texture: u32) -> Option<(u32, u32)> {
        self.state.borrow().textures.get(&texture).copied()
    }

    /// Number of live shader, program, buffer and texture objects.
    pub fn live_objects(&self) -> usize {
        let s = self.state.borrow();
        s.shaders.len() + s.programs.len() + s.buffers.len() + s.textures.len()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

// ── GLSL inspection ───────────────────────────────────────────────────────

/// Rough well-formedness check standing in for a real compiler.
fn check_glsl(source: &str) -> Result<(), String> {
    let mut braces = 0i32;
    let mut parens = 0i32;
    for (line_no, line) in source.lines().enumerate() {
        for ch in strip_comment(line).chars() {
            match ch {
                '{' => braces += 1,
                '}' => braces -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
            if braces < 0 || parens < 0 {
                return Err(format!("ERROR: 0:{}: syntax error: unexpected '{ch}'", line_no + 1));
            }
        }
    }
    if braces != 0 {
        return Err("ERROR: 0:1: syntax error: unbalanced '{'".to_string());
    }
    if parens != 0 {
        return Err("ERROR: 0:1: syntax error: unbalanced '('".to_string());
    }
    if !source.contains("void main") {
        return Err("ERROR: 0:1: missing entry point 'main'".to_string());
    }
    Ok(())
}

fn strip_comment(line: &str) -> &str {
    line.split("//").next().unwrap_or("")
}

/// Names declared with `qualifier` (`in`, `uniform`, ...) at global scope.
fn declarations(source: &str, qualifier: &str) -> Vec<String> {
    let body: String = source
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .map(strip_comment)
        .collect::<Vec<_>>()
        .join("\n");

    let mut names = Vec::new();
    let mut depth = 0i32;
    let mut statement = String::new();

    for ch in body.chars() {
        match ch {
            '{' => {
                depth += 1;
                statement.clear();
            }
            '}' => {
                depth -= 1;
                statement.clear();
            }
            ';' => {
                if depth == 0 {
                    if let Some(name) = declared_name(&statement, qualifier) {
                        names.push(name);
                    }
                }
                statement.clear();
            }
            _ => statement.push(ch),
        }
    }
    names
}

fn declared_name(statement: &str, qualifier: &str) -> Option<String> {
    let mut tokens = statement.split_whitespace().peekable();

    // `layout(location = 0) in ...`
    if tokens.peek().is_some_and(|t| t.starts_with("layout")) {
        for t in tokens.by_ref() {
            if t.contains(')') {
                break;
            }
        }
    }

    let first = tokens.next()?;
    if first != qualifier {
        return None;
    }
    let last = tokens.last()?;
    let name = last.split('[').next().unwrap_or(last);
    Some(name.to_string())
}

impl Gl for RecordingGl {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn dialect(&self) -> ShaderDialect {
        self.dialect
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let shader = s.alloc()?;
        s.shaders.insert(
            shader,
            ShaderObject {
                stage: Some(stage),
                ..Default::default()
            },
        );
        s.calls.push(GlCall::CreateShader { shader, stage });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut s = self.state.borrow_mut();
        if let Some(obj) = s.shaders.get_mut(&shader) {
            obj.source = source.to_string();
        }
        s.calls.push(GlCall::ShaderSource { shader });
    }

    fn compile_shader(&self, shader: u32) {
        let mut s = self.state.borrow_mut();
        if let Some(obj) = s.shaders.get_mut(&shader) {
            match check_glsl(&obj.source) {
                Ok(()) => {
                    obj.compiled = true;
                    obj.log.clear();
                }
                Err(log) => {
                    obj.compiled = false;
                    obj.log = log;
                }
            }
        }
        s.calls.push(GlCall::CompileShader { shader });
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        let mut s = self.state.borrow_mut();
        s.shaders.remove(&shader);
        s.calls.push(GlCall::DeleteShader { shader });
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let program = s.alloc()?;
        s.programs.insert(program, ProgramObject::default());
        s.calls.push(GlCall::CreateProgram { program });
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        if let Some(p) = s.programs.get_mut(&program) {
            p.attached.push(shader);
        }
        s.calls.push(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut s = self.state.borrow_mut();
        if let Some(p) = s.programs.get_mut(&program) {
            p.attached.retain(|&id| id != shader);
        }
        s.calls.push(GlCall::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        s.calls.push(GlCall::LinkProgram { program });

        let injected = s.fail_link.clone();
        let Some(p) = s.programs.get(&program) else {
            return;
        };

        let mut vertex = None;
        let mut fragment = None;
        for id in &p.attached {
            let Some(obj) = s.shaders.get(id) else { continue };
            if !obj.compiled {
                continue;
            }
            match obj.stage {
                Some(ShaderStage::Vertex) => vertex = Some(obj.source.as_str()),
                Some(ShaderStage::Fragment) => fragment = Some(obj.source.as_str()),
                None => {}
            }
        }

        let outcome = match (injected, vertex, fragment) {
            (Some(log), _, _) => Err(log),
            (None, Some(vs), Some(fs)) => {
                let attributes = declarations(vs, "in");
                let mut uniforms = declarations(vs, "uniform");
                for name in declarations(fs, "uniform") {
                    if !uniforms.contains(&name) {
                        uniforms.push(name);
                    }
                }
                Ok((attributes, uniforms))
            }
            _ => Err("ERROR: program needs a compiled vertex and fragment shader".to_string()),
        };

        if let Some(p) = s.programs.get_mut(&program) {
            match outcome {
                Ok((attributes, uniforms)) => {
                    p.linked = true;
                    p.log.clear();
                    p.attributes = attributes;
                    p.uniforms = uniforms;
                }
                Err(log) => {
                    p.linked = false;
                    p.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram { program });
    }

    fn delete_program(&self, program: u32) {
        let mut s = self.state.borrow_mut();
        s.programs.remove(&program);
        s.calls.push(GlCall::DeleteProgram { program });
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let s = self.state.borrow();
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        p.attributes
            .iter()
            .position(|a| a == name)
            .map(|i| i as u32)
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let s = self.state.borrow();
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        p.uniforms.iter().position(|u| u == name).map(|i| i as u32)
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let buffer = s.alloc()?;
        s.buffers.insert(buffer, Vec::new());
        s.calls.push(GlCall::CreateBuffer { buffer });
        Ok(buffer)
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        let mut s = self.state.borrow_mut();
        match target {
            BufferTarget::Array => s.array_binding = buffer,
            BufferTarget::ElementArray => s.element_binding = buffer,
        }
        s.calls.push(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        let mut s = self.state.borrow_mut();
        let buffer = s.binding(target);
        if let Some(contents) = buffer.and_then(|id| s.buffers.get_mut(&id)) {
            *contents = data.to_vec();
        }
        s.calls.push(GlCall::BufferData {
            target,
            buffer,
            len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        let mut s = self.state.borrow_mut();
        s.buffers.remove(&buffer);
        s.calls.push(GlCall::DeleteBuffer { buffer });
    }

    fn vertex_attrib_pointer_f32(
        &self,
        location: u32,
        components: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.record(GlCall::VertexAttribPointer {
            location,
            components,
            normalized,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, location: u32) {
        self.record(GlCall::EnableVertexAttribArray { location });
    }

    fn uniform_matrix_4(&self, location: &u32, data: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4 {
            location: *location,
            data: *data,
        });
    }

    fn uniform_1_i32(&self, location: &u32, value: i32) {
        self.record(GlCall::Uniform1i {
            location: *location,
            value,
        });
    }

    fn create_texture(&self) -> Result<u32, String> {
        let mut s = self.state.borrow_mut();
        let texture = s.alloc()?;
        s.textures.insert(texture, (0, 0));
        s.calls.push(GlCall::CreateTexture { texture });
        Ok(texture)
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture { unit });
    }

    fn bind_texture_2d(&self, texture: Option<u32>) {
        let mut s = self.state.borrow_mut();
        s.texture_binding = texture;
        s.calls.push(GlCall::BindTexture2d { texture });
    }

    fn tex_image_2d_rgba(&self, width: u32, height: u32, pixels: &[u8]) {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        let mut s = self.state.borrow_mut();
        let texture = s.texture_binding;
        if let Some(size) = texture.and_then(|id| s.textures.get_mut(&id)) {
            *size = (width, height);
        }
        s.calls.push(GlCall::TexImage2d {
            texture,
            width,
            height,
        });
    }

    fn texture_sampling(&self, wrap: TextureWrap, min: TextureFilter, mag: TextureFilter) {
        self.record(GlCall::TextureSampling { wrap, min, mag });
    }

    fn generate_mipmap_2d(&self) {
        let texture = self.state.borrow().texture_binding;
        self.record(GlCall::GenerateMipmap { texture });
    }

    fn delete_texture(&self, texture: u32) {
        let mut s = self.state.borrow_mut();
        s.textures.remove(&texture);
        s.calls.push(GlCall::DeleteTexture { texture });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor { rgba: [r, g, b, a] });
    }

    fn clear_depth(&self, depth: f32) {
        self.record(GlCall::ClearDepth { depth });
    }

    fn depth_test(&self, func: DepthFunc) {
        self.record(GlCall::DepthTest { func });
    }

    fn clear(&self, mask: ClearMask) {
        self.record(GlCall::Clear { mask });
    }

    fn draw_elements(&self, mode: Primitive, count: i32, index_type: IndexType, offset: i32) {
        self.record(GlCall::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }
}
