use crate::error::{RenderError, Result};
use crate::gl::{BufferTarget, ClearMask, DepthFunc, Gl, IndexType, Primitive};
use crate::mesh::{AttributeBuffer, MeshBuffers};
use crate::shader::{LinkedProgram, LocationTable};
use crate::time::FrameTime;

use super::material::{Material, MaterialKind, names};
use super::transform::{Camera, RenderState, Spin, model_view, normal_matrix};

/// Per-frame diagnostics.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStats {
    pub index_count: i32,
    /// Rotation after this frame's advance.
    pub rotation: f32,
}

/// Locations the renderer binds every frame.
///
/// Only the position attribute is mandatory; any other name the program does
/// not expose is skipped.
struct Bindings<U> {
    position: u32,
    color: Option<u32>,
    normal: Option<u32>,
    tex_coord: Option<u32>,

    projection: Option<U>,
    model_view: Option<U>,
    normal_matrix: Option<U>,
    sampler: Option<U>,
}

impl<U: Clone> Bindings<U> {
    fn resolve(locations: &LocationTable<U>, kind: MaterialKind) -> Result<Self> {
        let position = locations.require_attribute(names::POSITION)?;

        let layout = kind.layout();
        for name in layout.attributes.iter().filter(|&&n| n != names::POSITION) {
            if locations.attribute(name).is_none() {
                log::warn!("attribute `{name}` is not active; it will not be bound");
            }
        }
        for name in layout.uniforms {
            if locations.uniform(name).is_none() {
                log::warn!("uniform `{name}` is not active; it will not be set");
            }
        }

        Ok(Self {
            position,
            color: locations.attribute(names::COLOR),
            normal: locations.attribute(names::NORMAL),
            tex_coord: locations.attribute(names::TEX_COORD),
            projection: locations.uniform(names::PROJECTION).cloned(),
            model_view: locations.uniform(names::MODEL_VIEW).cloned(),
            normal_matrix: locations.uniform(names::NORMAL_MATRIX).cloned(),
            sampler: locations.uniform(names::SAMPLER).cloned(),
        })
    }
}

/// Draws an uploaded mesh with a linked program, tumbling it a little more
/// every frame.
///
/// Owns the program, the mesh buffers and (for [`Material::Lit`]) the
/// texture until [`FrameRenderer::destroy`].
pub struct FrameRenderer<G: Gl> {
    program: G::Program,
    bindings: Bindings<G::UniformLocation>,
    buffers: MeshBuffers<G::Buffer>,
    material: Material<G>,

    state: RenderState,
    camera: Camera,
    spin: Spin,
}

impl<G: Gl> FrameRenderer<G> {
    /// Takes ownership of `program`, `buffers` and `texture`.
    ///
    /// Color buffers select [`Material::Flat`]. Normal buffers select
    /// [`Material::Lit`] and additionally need texture coordinates and a
    /// texture. Everything handed in is released again if construction fails.
    pub fn new(
        gl: &G,
        program: LinkedProgram<G>,
        buffers: MeshBuffers<G::Buffer>,
        texture: Option<G::Texture>,
    ) -> Result<Self> {
        let (program, locations) = program.into_parts();

        let release = |reason: RenderError| {
            gl.delete_program(program);
            buffers.delete(gl);
            if let Some(t) = texture {
                gl.delete_texture(t);
            }
            Err(reason)
        };

        let material = match (buffers.attribute, buffers.tex_coord, texture) {
            (AttributeBuffer::Color(color), _, _) => Material::Flat { color },
            (AttributeBuffer::Normal(normal), Some(tex_coord), Some(texture)) => Material::Lit {
                normal,
                tex_coord,
                texture,
            },
            (AttributeBuffer::Normal(_), None, _) => {
                return release(RenderError::InvalidMesh(
                    "lit material needs texture coordinates".into(),
                ));
            }
            (AttributeBuffer::Normal(_), Some(_), None) => {
                return release(RenderError::InvalidMesh(
                    "lit material needs a texture".into(),
                ));
            }
        };

        let bindings = match Bindings::resolve(&locations, material.kind()) {
            Ok(b) => b,
            Err(err) => return release(err),
        };

        log::info!(
            "frame renderer ready: {:?} material, {} indices",
            material.kind(),
            buffers.index_count
        );

        Ok(Self {
            program,
            bindings,
            buffers,
            material,
            state: RenderState::default(),
            camera: Camera::default(),
            spin: Spin::default(),
        })
    }

    pub fn material_kind(&self) -> MaterialKind {
        self.material.kind()
    }

    pub fn rotation(&self) -> f32 {
        self.state.rotation
    }

    /// Draws one frame into a `width` x `height` drawable.
    pub fn render(&mut self, gl: &G, frame: FrameTime, (width, height): (u32, u32)) -> FrameStats {
        gl.viewport(0, 0, width as i32, height as i32);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear_depth(1.0);
        gl.depth_test(DepthFunc::LessEqual);
        gl.clear(ClearMask::COLOR_DEPTH);

        let projection = self.camera.projection(Camera::aspect(width, height));
        let mv = model_view(&self.camera, &self.spin, self.state.rotation);
        self.state.advance(frame.dt);

        let b = &self.bindings;
        bind_attribute(gl, self.buffers.position, Some(b.position), 3);
        match &self.material {
            Material::Flat { color } => {
                bind_attribute(gl, *color, b.color, 4);
            }
            Material::Lit {
                normal, tex_coord, ..
            } => {
                bind_attribute(gl, *normal, b.normal, 3);
                bind_attribute(gl, *tex_coord, b.tex_coord, 2);
            }
        }

        gl.bind_buffer(BufferTarget::ElementArray, Some(self.buffers.indices));
        gl.use_program(Some(self.program));

        if let Some(loc) = &b.projection {
            gl.uniform_matrix_4(loc, &projection.to_cols_array());
        }
        if let Some(loc) = &b.model_view {
            gl.uniform_matrix_4(loc, &mv.to_cols_array());
        }

        if let Material::Lit { texture, .. } = &self.material {
            if let Some(loc) = &b.normal_matrix {
                gl.uniform_matrix_4(loc, &normal_matrix(&mv).to_cols_array());
            }
            gl.active_texture(0);
            gl.bind_texture_2d(Some(*texture));
            if let Some(loc) = &b.sampler {
                gl.uniform_1_i32(loc, 0);
            }
        }

        gl.draw_elements(
            Primitive::Triangles,
            self.buffers.index_count,
            IndexType::UnsignedShort,
            0,
        );

        log::trace!(
            "frame {}: dt {:.4}s, rotation {:.4}",
            frame.frame_index,
            frame.dt,
            self.state.rotation
        );

        FrameStats {
            index_count: self.buffers.index_count,
            rotation: self.state.rotation,
        }
    }

    /// Releases the program, buffers and texture.
    pub fn destroy(self, gl: &G) {
        gl.use_program(None);
        gl.delete_program(self.program);
        self.buffers.delete(gl);
        if let Material::Lit { texture, .. } = self.material {
            gl.delete_texture(texture);
        }
    }
}

fn bind_attribute<G: Gl>(gl: &G, buffer: G::Buffer, location: Option<u32>, components: i32) {
    let Some(location) = location else { return };
    gl.bind_buffer(BufferTarget::Array, Some(buffer));
    gl.vertex_attrib_pointer_f32(location, components, false, 0, 0);
    gl.enable_vertex_attrib_array(location);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::{GlCall, RecordingGl};
    use crate::mesh::{MeshBufferUploader, cube};
    use crate::render::material::{FLAT_LAYOUT, LIT_LAYOUT};
    use crate::shader::{ProgramLinker, ShaderSource};
    use crate::texture::Texture2d;

    const FLAT_VS: &str = "in vec4 aVertexPosition;\nin vec4 aVertexColor;\nuniform mat4 uModelViewMatrix;\nuniform mat4 uProjectionMatrix;\nout lowp vec4 vColor;\nvoid main() { gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition; vColor = aVertexColor; }\n";
    const FLAT_FS: &str = "in lowp vec4 vColor;\nout lowp vec4 fragColor;\nvoid main() { fragColor = vColor; }\n";

    const LIT_VS: &str = "in vec4 aVertexPosition;\nin vec3 aVertexNormal;\nin vec2 aTextureCoord;\nuniform mat4 uNormalMatrix;\nuniform mat4 uModelViewMatrix;\nuniform mat4 uProjectionMatrix;\nout highp vec2 vTextureCoord;\nvoid main() { gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition; vTextureCoord = aTextureCoord; }\n";
    const LIT_FS: &str = "in highp vec2 vTextureCoord;\nuniform sampler2D uSampler;\nout lowp vec4 fragColor;\nvoid main() { fragColor = texture(uSampler, vTextureCoord); }\n";

    fn frame(dt: f32, index: u64) -> FrameTime {
        FrameTime {
            dt,
            now_ms: 0.0,
            frame_index: index,
        }
    }

    fn flat(gl: &RecordingGl) -> FrameRenderer<RecordingGl> {
        let program = ProgramLinker::new(gl)
            .build(
                &ShaderSource::vertex(FLAT_VS),
                &ShaderSource::fragment(FLAT_FS),
                &FLAT_LAYOUT,
            )
            .unwrap();
        let buffers = MeshBufferUploader::new(gl).upload(&cube::colored_cube()).unwrap();
        FrameRenderer::new(gl, program, buffers, None).unwrap()
    }

    fn lit(gl: &RecordingGl) -> FrameRenderer<RecordingGl> {
        let program = ProgramLinker::new(gl)
            .build(
                &ShaderSource::vertex(LIT_VS),
                &ShaderSource::fragment(LIT_FS),
                &LIT_LAYOUT,
            )
            .unwrap();
        let buffers = MeshBufferUploader::new(gl).upload(&cube::textured_cube()).unwrap();
        let texture = Texture2d::placeholder(gl).unwrap();
        FrameRenderer::new(gl, program, buffers, Some(texture.handle())).unwrap()
    }

    // ── flat ──────────────────────────────────────────────────────────────

    #[test]
    fn flat_frame_draws_the_whole_cube() {
        let gl = RecordingGl::new();
        let mut renderer = flat(&gl);
        gl.clear_calls();

        let stats = renderer.render(&gl, frame(0.0, 0), (640, 480));

        assert_eq!(stats.index_count, 36);
        assert_eq!(
            gl.draw_calls(),
            vec![GlCall::DrawElements {
                mode: Primitive::Triangles,
                count: 36,
                index_type: IndexType::UnsignedShort,
                offset: 0,
            }]
        );
        let calls = gl.calls();
        assert!(calls.contains(&GlCall::Viewport {
            x: 0,
            y: 0,
            width: 640,
            height: 480
        }));
        assert!(calls.contains(&GlCall::DepthTest {
            func: DepthFunc::LessEqual
        }));
        assert!(calls.contains(&GlCall::VertexAttribPointer {
            location: 1,
            components: 4,
            normalized: false,
            stride: 0,
            offset: 0,
        }));
    }

    #[test]
    fn matrices_use_the_rotation_before_the_advance() {
        let gl = RecordingGl::new();
        let mut renderer = flat(&gl);
        gl.clear_calls();

        let stats = renderer.render(&gl, frame(0.5, 0), (100, 100));
        assert_eq!(stats.rotation, 0.5);

        let model_view_location = 0; // first uniform declared in FLAT_VS
        let uploaded = gl.calls().into_iter().find_map(|c| match c {
            GlCall::UniformMatrix4 { location, data } if location == model_view_location => {
                Some(data)
            }
            _ => None,
        });
        let expected = model_view(&Camera::default(), &Spin::default(), 0.0).to_cols_array();
        assert_eq!(uploaded, Some(expected));
    }

    #[test]
    fn rotation_advances_once_per_frame() {
        let gl = RecordingGl::new();
        let mut renderer = flat(&gl);
        for (i, dt) in [0.0, 0.016, 0.016].into_iter().enumerate() {
            renderer.render(&gl, frame(dt, i as u64), (1, 1));
        }
        assert!((renderer.rotation() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn missing_position_is_a_typed_error() {
        let gl = RecordingGl::new();
        let vs = "in vec4 aSomethingElse;\nvoid main() { gl_Position = aSomethingElse; }\n";
        let program = ProgramLinker::new(&gl)
            .build(
                &ShaderSource::vertex(vs),
                &ShaderSource::fragment(FLAT_FS),
                &FLAT_LAYOUT,
            )
            .unwrap();
        let buffers = MeshBufferUploader::new(&gl).upload(&cube::colored_cube()).unwrap();

        let err = FrameRenderer::new(&gl, program, buffers, None).err().unwrap();
        assert!(matches!(err, RenderError::MissingAttribute { name } if name == names::POSITION));
        assert_eq!(gl.live_objects(), 0);
    }

    // ── lit ───────────────────────────────────────────────────────────────

    #[test]
    fn lit_frame_binds_texture_unit_zero_and_normal_matrix() {
        let gl = RecordingGl::new();
        let mut renderer = lit(&gl);
        assert_eq!(renderer.material_kind(), MaterialKind::Lit);
        gl.clear_calls();

        renderer.render(&gl, frame(0.0, 0), (800, 600));
        let calls = gl.calls();

        assert!(calls.contains(&GlCall::ActiveTexture { unit: 0 }));
        assert!(calls.contains(&GlCall::Uniform1i {
            location: 3,
            value: 0
        }));
        // uNormalMatrix is the first uniform in LIT_VS.
        assert!(calls.iter().any(|c| matches!(c, GlCall::UniformMatrix4 { location: 0, .. })));
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, GlCall::UniformMatrix4 { .. }))
                .count(),
            3
        );
        assert!(calls.contains(&GlCall::VertexAttribPointer {
            location: 2,
            components: 2,
            normalized: false,
            stride: 0,
            offset: 0,
        }));
    }

    #[test]
    fn lit_normal_matrix_is_the_inverse_transpose_of_the_model_view() {
        let gl = RecordingGl::new();
        let mut renderer = lit(&gl);
        renderer.render(&gl, frame(0.4, 0), (800, 600));
        gl.clear_calls();

        renderer.render(&gl, frame(0.1, 1), (800, 600));
        let matrix_at = |wanted: u32| {
            gl.calls().into_iter().find_map(|c| match c {
                GlCall::UniformMatrix4 { location, data } if location == wanted => Some(data),
                _ => None,
            })
        };

        // LIT_VS declares uNormalMatrix, then uModelViewMatrix.
        let mv = model_view(&Camera::default(), &Spin::default(), 0.4);
        assert_eq!(matrix_at(1), Some(mv.to_cols_array()));
        assert_eq!(matrix_at(0), Some(normal_matrix(&mv).to_cols_array()));
        assert_ne!(matrix_at(0), matrix_at(1));
    }

    #[test]
    fn lit_without_texture_is_rejected() {
        let gl = RecordingGl::new();
        let program = ProgramLinker::new(&gl)
            .build(
                &ShaderSource::vertex(LIT_VS),
                &ShaderSource::fragment(LIT_FS),
                &LIT_LAYOUT,
            )
            .unwrap();
        let buffers = MeshBufferUploader::new(&gl).upload(&cube::textured_cube()).unwrap();
        let err = FrameRenderer::new(&gl, program, buffers, None).err().unwrap();
        assert!(matches!(err, RenderError::InvalidMesh(_)));
    }

    #[test]
    fn destroy_releases_everything() {
        let gl = RecordingGl::new();
        lit(&gl).destroy(&gl);
        assert_eq!(gl.live_objects(), 0);
    }
}
