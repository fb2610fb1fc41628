use crate::gl::Gl;
use crate::shader::ProgramLayout;

/// Attribute and uniform names shared by the cube shaders.
pub mod names {
    pub const POSITION: &str = "aVertexPosition";
    pub const COLOR: &str = "aVertexColor";
    pub const NORMAL: &str = "aVertexNormal";
    pub const TEX_COORD: &str = "aTextureCoord";

    pub const PROJECTION: &str = "uProjectionMatrix";
    pub const MODEL_VIEW: &str = "uModelViewMatrix";
    pub const NORMAL_MATRIX: &str = "uNormalMatrix";
    pub const SAMPLER: &str = "uSampler";
}

pub const FLAT_LAYOUT: ProgramLayout = ProgramLayout {
    attributes: &[names::POSITION, names::COLOR],
    uniforms: &[names::PROJECTION, names::MODEL_VIEW],
};

pub const LIT_LAYOUT: ProgramLayout = ProgramLayout {
    attributes: &[names::POSITION, names::NORMAL, names::TEX_COORD],
    uniforms: &[
        names::PROJECTION,
        names::MODEL_VIEW,
        names::NORMAL_MATRIX,
        names::SAMPLER,
    ],
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MaterialKind {
    /// Per-vertex color, no lighting.
    Flat,
    /// Texture sampled through normals and a directional light.
    Lit,
}

impl MaterialKind {
    pub fn layout(self) -> &'static ProgramLayout {
        match self {
            MaterialKind::Flat => &FLAT_LAYOUT,
            MaterialKind::Lit => &LIT_LAYOUT,
        }
    }
}

/// Material-specific GPU resources a renderer draws with.
pub enum Material<G: Gl> {
    Flat {
        color: G::Buffer,
    },
    Lit {
        normal: G::Buffer,
        tex_coord: G::Buffer,
        texture: G::Texture,
    },
}

impl<G: Gl> Material<G> {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Flat { .. } => MaterialKind::Flat,
            Material::Lit { .. } => MaterialKind::Lit,
        }
    }
}
