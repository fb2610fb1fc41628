use std::borrow::Cow;

use crate::error::{RenderError, Result};
use crate::gl::{Gl, ShaderDialect, ShaderStage};

/// Shader source text tagged with its stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: Cow<'static, str>,
}

impl ShaderSource {
    pub fn new(stage: ShaderStage, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }

    pub fn vertex(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ShaderStage::Vertex, text)
    }

    pub fn fragment(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ShaderStage::Fragment, text)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Source as handed to the driver: the dialect's `#version` line is
    /// prepended unless the text already declares one.
    pub fn with_header(&self, dialect: ShaderDialect) -> Cow<'_, str> {
        if self.text.trim_start().starts_with("#version") {
            Cow::Borrowed(&self.text)
        } else {
            Cow::Owned(format!("{}{}", dialect.header(), self.text))
        }
    }
}

/// A successfully compiled shader object.
///
/// Only produced by [`ShaderCompiler::compile`], so holding one means the
/// driver accepted the source.
#[derive(Debug)]
pub struct CompiledShader<S> {
    handle: S,
    stage: ShaderStage,
}

impl<S: Copy> CompiledShader<S> {
    pub fn handle(&self) -> S {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Releases the shader object.
    pub fn delete<G: Gl<Shader = S>>(self, gl: &G) {
        gl.delete_shader(self.handle);
    }
}

/// Compiles single shader stages against a context.
pub struct ShaderCompiler<'g, G: Gl> {
    gl: &'g G,
}

impl<'g, G: Gl> ShaderCompiler<'g, G> {
    pub fn new(gl: &'g G) -> Self {
        Self { gl }
    }

    /// Compiles `source`.
    ///
    /// On failure the shader object is deleted and the driver log is
    /// returned inside [`RenderError::ShaderCompile`].
    pub fn compile(&self, source: &ShaderSource) -> Result<CompiledShader<G::Shader>> {
        let gl = self.gl;
        let stage = source.stage();

        let shader = gl
            .create_shader(stage)
            .map_err(|reason| RenderError::ResourceCreation {
                what: "shader",
                reason,
            })?;

        gl.shader_source(shader, &source.with_header(gl.dialect()));
        gl.compile_shader(shader);

        if !gl.shader_compile_status(shader) {
            let log = gl.shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile {
                stage,
                log: log.trim().to_string(),
            });
        }

        log::debug!("compiled {stage} shader");
        Ok(CompiledShader {
            handle: shader,
            stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordingGl};

    const VALID_VS: &str = "in vec4 aVertexPosition;\nvoid main() { gl_Position = aVertexPosition; }\n";

    #[test]
    fn header_is_prepended_once() {
        let src = ShaderSource::vertex(VALID_VS);
        let text = src.with_header(ShaderDialect::Glsl330);
        assert!(text.starts_with("#version 330 core\n"));

        let explicit = ShaderSource::vertex("#version 300 es\nvoid main() {}");
        assert_eq!(explicit.with_header(ShaderDialect::Glsl330), explicit.text());
    }

    #[test]
    fn compiles_valid_source() {
        let gl = RecordingGl::new();
        let shader = ShaderCompiler::new(&gl)
            .compile(&ShaderSource::vertex(VALID_VS))
            .unwrap();
        assert_eq!(shader.stage(), ShaderStage::Vertex);
        assert!(gl.shader_compile_status(shader.handle()));
    }

    #[test]
    fn malformed_source_reports_submitted_stage() {
        let gl = RecordingGl::new();
        let compiler = ShaderCompiler::new(&gl);

        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let err = compiler
                .compile(&ShaderSource::new(stage, "void main() { oops("))
                .unwrap_err();
            match err {
                RenderError::ShaderCompile { stage: reported, log } => {
                    assert_eq!(reported, stage);
                    assert!(!log.is_empty());
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn failed_shader_is_deleted() {
        let gl = RecordingGl::new();
        let _ = ShaderCompiler::new(&gl).compile(&ShaderSource::fragment("no entry point"));
        assert!(
            gl.calls()
                .iter()
                .any(|c| matches!(c, GlCall::DeleteShader { .. }))
        );
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn creation_failure_is_typed() {
        let gl = RecordingGl::new();
        gl.fail_resource_creation("context lost");
        let err = ShaderCompiler::new(&gl)
            .compile(&ShaderSource::vertex(VALID_VS))
            .unwrap_err();
        assert!(matches!(err, RenderError::ResourceCreation { what: "shader", .. }));
    }
}
