use crate::error::{RenderError, Result};
use crate::gl::{Gl, ShaderStage};

use super::compiler::{CompiledShader, ShaderCompiler, ShaderSource};

/// Names a program is expected to expose.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProgramLayout {
    pub attributes: &'static [&'static str],
    pub uniforms: &'static [&'static str],
}

/// Locations resolved by name once, right after linking.
///
/// `None` marks a name the linked program does not expose (GL's `-1`).
#[derive(Debug, Clone)]
pub struct LocationTable<U> {
    attributes: Vec<(&'static str, Option<u32>)>,
    uniforms: Vec<(&'static str, Option<U>)>,
}

impl<U: Clone> LocationTable<U> {
    fn resolve<G: Gl<UniformLocation = U>>(
        gl: &G,
        program: G::Program,
        layout: &ProgramLayout,
    ) -> Self {
        let attributes = layout
            .attributes
            .iter()
            .map(|&name| (name, gl.attrib_location(program, name)))
            .collect();
        let uniforms = layout
            .uniforms
            .iter()
            .map(|&name| (name, gl.uniform_location(program, name)))
            .collect();
        Self {
            attributes,
            uniforms,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, loc)| *loc)
    }

    pub fn uniform(&self, name: &str) -> Option<&U> {
        self.uniforms
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, loc)| loc.as_ref())
    }

    pub fn require_attribute(&self, name: &str) -> Result<u32> {
        self.attribute(name)
            .ok_or_else(|| RenderError::MissingAttribute {
                name: name.to_string(),
            })
    }

    pub fn require_uniform(&self, name: &str) -> Result<U> {
        self.uniform(name)
            .cloned()
            .ok_or_else(|| RenderError::MissingUniform {
                name: name.to_string(),
            })
    }

    /// Layout attribute names the program does not expose.
    pub fn missing_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|(_, loc)| loc.is_none())
            .map(|(n, _)| *n)
    }

    /// Layout uniform names the program does not expose.
    pub fn missing_uniforms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.uniforms
            .iter()
            .filter(|(_, loc)| loc.is_none())
            .map(|(n, _)| *n)
    }
}

/// A program that linked successfully, with its location table.
pub struct LinkedProgram<G: Gl> {
    program: G::Program,
    locations: LocationTable<G::UniformLocation>,
}

impl<G: Gl> LinkedProgram<G> {
    pub fn handle(&self) -> G::Program {
        self.program
    }

    pub fn locations(&self) -> &LocationTable<G::UniformLocation> {
        &self.locations
    }

    pub(crate) fn into_parts(self) -> (G::Program, LocationTable<G::UniformLocation>) {
        (self.program, self.locations)
    }

    pub fn delete(self, gl: &G) {
        gl.delete_program(self.program);
    }
}

/// Links compiled stages into programs.
pub struct ProgramLinker<'g, G: Gl> {
    gl: &'g G,
}

impl<'g, G: Gl> ProgramLinker<'g, G> {
    pub fn new(gl: &'g G) -> Self {
        Self { gl }
    }

    /// Compiles both sources and links them.
    ///
    /// A vertex shader that compiled is released again if the fragment stage
    /// fails.
    pub fn build(
        &self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
        layout: &ProgramLayout,
    ) -> Result<LinkedProgram<G>> {
        let compiler = ShaderCompiler::new(self.gl);
        let vs = compiler.compile(vertex)?;
        let fs = match compiler.compile(fragment) {
            Ok(fs) => fs,
            Err(err) => {
                vs.delete(self.gl);
                return Err(err);
            }
        };
        self.link(vs, fs, layout)
    }

    /// Attaches and links two compiled stages, then resolves `layout`.
    ///
    /// The shaders are consumed: after a successful link they are detached
    /// and deleted, after a failed one the program and shaders are deleted.
    pub fn link(
        &self,
        vertex: CompiledShader<G::Shader>,
        fragment: CompiledShader<G::Shader>,
        layout: &ProgramLayout,
    ) -> Result<LinkedProgram<G>> {
        let gl = self.gl;

        if let Some((expected, found)) = stage_mismatch(&vertex, &fragment) {
            vertex.delete(gl);
            fragment.delete(gl);
            return Err(RenderError::StageMismatch { expected, found });
        }

        let program = match gl.create_program() {
            Ok(p) => p,
            Err(reason) => {
                vertex.delete(gl);
                fragment.delete(gl);
                return Err(RenderError::ResourceCreation {
                    what: "program",
                    reason,
                });
            }
        };

        gl.attach_shader(program, vertex.handle());
        gl.attach_shader(program, fragment.handle());
        gl.link_program(program);

        if !gl.program_link_status(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            vertex.delete(gl);
            fragment.delete(gl);
            return Err(RenderError::ProgramLink {
                log: log.trim().to_string(),
            });
        }

        for shader in [vertex, fragment] {
            gl.detach_shader(program, shader.handle());
            shader.delete(gl);
        }

        let locations = LocationTable::resolve(gl, program, layout);
        log::info!(
            "linked program: {} attribute(s), {} uniform(s) resolved",
            layout.attributes.len() - locations.missing_attributes().count(),
            layout.uniforms.len() - locations.missing_uniforms().count(),
        );

        Ok(LinkedProgram { program, locations })
    }
}

fn stage_mismatch<S: Copy>(
    vertex: &CompiledShader<S>,
    fragment: &CompiledShader<S>,
) -> Option<(ShaderStage, ShaderStage)> {
    if vertex.stage() != ShaderStage::Vertex {
        return Some((ShaderStage::Vertex, vertex.stage()));
    }
    if fragment.stage() != ShaderStage::Fragment {
        return Some((ShaderStage::Fragment, fragment.stage()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordingGl};

    const VS: &str = "\
in vec4 aVertexPosition;
in vec4 aVertexColor;
uniform mat4 uModelViewMatrix;
uniform mat4 uProjectionMatrix;
out lowp vec4 vColor;
void main() {
    gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
    vColor = aVertexColor;
}
";

    const FS: &str = "\
precision mediump float;
in lowp vec4 vColor;
out vec4 fragColor;
void main() {
    fragColor = vColor;
}
";

    const LAYOUT: ProgramLayout = ProgramLayout {
        attributes: &["aVertexPosition", "aVertexColor", "aVertexNormal"],
        uniforms: &["uProjectionMatrix", "uModelViewMatrix", "uNormalMatrix"],
    };

    fn build(gl: &RecordingGl) -> Result<LinkedProgram<RecordingGl>> {
        ProgramLinker::new(gl).build(&ShaderSource::vertex(VS), &ShaderSource::fragment(FS), &LAYOUT)
    }

    #[test]
    fn declared_names_resolve_and_absent_names_do_not() {
        let gl = RecordingGl::new();
        let program = build(&gl).unwrap();
        let loc = program.locations();

        assert!(loc.attribute("aVertexPosition").is_some());
        assert!(loc.attribute("aVertexColor").is_some());
        assert!(loc.uniform("uProjectionMatrix").is_some());
        assert!(loc.uniform("uModelViewMatrix").is_some());

        assert_eq!(loc.attribute("aVertexNormal"), None);
        assert!(loc.uniform("uNormalMatrix").is_none());
        // Names outside the layout were never queried.
        assert_eq!(loc.attribute("vColor"), None);

        assert_eq!(loc.missing_attributes().collect::<Vec<_>>(), vec!["aVertexNormal"]);
        assert_eq!(loc.missing_uniforms().collect::<Vec<_>>(), vec!["uNormalMatrix"]);
    }

    #[test]
    fn require_reports_missing_names() {
        let gl = RecordingGl::new();
        let program = build(&gl).unwrap();
        let loc = program.locations();

        assert_eq!(loc.require_attribute("aVertexPosition").unwrap(), 0);
        assert!(matches!(
            loc.require_attribute("aVertexNormal"),
            Err(RenderError::MissingAttribute { name }) if name == "aVertexNormal"
        ));
        assert!(matches!(
            loc.require_uniform("uNormalMatrix"),
            Err(RenderError::MissingUniform { .. })
        ));
    }

    #[test]
    fn successful_link_detaches_and_deletes_shaders() {
        let gl = RecordingGl::new();
        let program = build(&gl).unwrap();
        let calls = gl.calls();

        let detaches = calls
            .iter()
            .filter(|c| matches!(c, GlCall::DetachShader { .. }))
            .count();
        let deletes = calls
            .iter()
            .filter(|c| matches!(c, GlCall::DeleteShader { .. }))
            .count();
        assert_eq!(detaches, 2);
        assert_eq!(deletes, 2);

        // Only the program object is left.
        assert_eq!(gl.live_objects(), 1);
        program.delete(&gl);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn link_failure_carries_driver_log() {
        let gl = RecordingGl::new();
        gl.fail_link("error: varying vColor not written\n");
        let err = build(&gl).err().unwrap();
        match err {
            RenderError::ProgramLink { log } => assert_eq!(log, "error: varying vColor not written"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn fragment_failure_releases_vertex_shader() {
        let gl = RecordingGl::new();
        let err = ProgramLinker::new(&gl)
            .build(
                &ShaderSource::vertex(VS),
                &ShaderSource::fragment("void main() {"),
                &LAYOUT,
            )
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn swapped_stages_are_rejected() {
        let gl = RecordingGl::new();
        let compiler = ShaderCompiler::new(&gl);
        let vs = compiler.compile(&ShaderSource::vertex(VS)).unwrap();
        let fs = compiler.compile(&ShaderSource::fragment(FS)).unwrap();

        let err = ProgramLinker::new(&gl).link(fs, vs, &LAYOUT).err().unwrap();
        assert!(matches!(
            err,
            RenderError::StageMismatch {
                expected: ShaderStage::Vertex,
                found: ShaderStage::Fragment,
            }
        ));
        assert_eq!(gl.live_objects(), 0);
    }
}
