use std::str::FromStr;

use prism_engine::Result;
use prism_engine::gl::Gl;
use prism_engine::mesh::{MeshBufferUploader, cube};
use prism_engine::render::{FrameLoop, FrameRenderer, FrameRequest, MaterialKind, StopHandle};
use prism_engine::shader::ProgramLinker;
use prism_engine::texture::{Texture2d, TextureLoader};

use crate::shaders;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Per-face colors.
    Flat,
    /// Textured and lit.
    Lit,
}

impl Variant {
    pub fn material(self) -> MaterialKind {
        match self {
            Variant::Flat => MaterialKind::Flat,
            Variant::Lit => MaterialKind::Lit,
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Variant::Flat),
            "lit" => Ok(Variant::Lit),
            other => Err(format!("unknown variant `{other}` (expected flat or lit)")),
        }
    }
}

/// The spinning cube: renderer, frame loop and the texture on its way in.
pub struct CubeScene<G: Gl> {
    renderer: FrameRenderer<G>,
    frames: FrameLoop,
    pending: Option<FrameRequest>,
    texture: Option<Texture2d<G::Texture>>,
    loader: Option<TextureLoader>,
}

impl<G: Gl> CubeScene<G> {
    /// Builds the pipeline for `variant` and schedules the first frame.
    ///
    /// The lit variant starts with the placeholder texture; `loader`, if
    /// given, replaces it once its image arrives.
    pub fn new(gl: &G, variant: Variant, loader: Option<TextureLoader>) -> Result<Self> {
        let (vs, fs) = shaders::sources(variant);
        let program = ProgramLinker::new(gl).build(&vs, &fs, variant.material().layout())?;

        let mesh = match variant {
            Variant::Flat => cube::colored_cube(),
            Variant::Lit => cube::textured_cube(),
        };
        let buffers = match MeshBufferUploader::new(gl).upload(&mesh) {
            Ok(b) => b,
            Err(err) => {
                program.delete(gl);
                return Err(err);
            }
        };

        let texture = match variant {
            Variant::Flat => None,
            Variant::Lit => match Texture2d::placeholder(gl) {
                Ok(t) => Some(t),
                Err(err) => {
                    program.delete(gl);
                    buffers.delete(gl);
                    return Err(err);
                }
            },
        };

        let loader = match (variant, loader) {
            (Variant::Flat, Some(_)) => {
                log::warn!("flat variant has no texture; ignoring the texture file");
                None
            }
            (_, loader) => loader,
        };

        let renderer = FrameRenderer::new(gl, program, buffers, texture.map(|t| t.handle()))?;

        let mut frames = FrameLoop::new();
        let pending = Some(frames.start()?);

        Ok(Self {
            renderer,
            frames,
            pending,
            texture,
            loader,
        })
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.frames.stop_handle()
    }

    /// Current texture dimensions (lit variant only).
    pub fn texture_size(&self) -> Option<(u32, u32)> {
        self.texture.map(|t| t.size())
    }

    /// Renders the pending frame, if any.
    ///
    /// Returns whether another frame is scheduled.
    pub fn frame(&mut self, gl: &G, now_ms: f64, size: (u32, u32)) -> Result<bool> {
        self.poll_texture(gl);

        let Some(request) = self.pending.take() else {
            return Ok(false);
        };

        let renderer = &mut self.renderer;
        self.pending = self.frames.tick(request, now_ms, |time| {
            renderer.render(gl, time, size);
            Ok(())
        })?;

        Ok(self.pending.is_some())
    }

    fn poll_texture(&mut self, gl: &G) {
        let Some(result) = self.loader.as_ref().and_then(TextureLoader::poll) else {
            return;
        };
        self.loader = None;

        match (result, self.texture.as_mut()) {
            (Ok(image), Some(texture)) => {
                texture.upload_rgba(gl, &image);
                log::info!(
                    "texture swapped in: {}x{}",
                    image.width(),
                    image.height()
                );
            }
            (Ok(_), None) => {}
            (Err(err), _) => log::warn!("keeping placeholder texture: {err}"),
        }
    }

    /// Releases every GL object the scene owns.
    pub fn destroy(self, gl: &G) {
        self.renderer.destroy(gl);
    }
}
