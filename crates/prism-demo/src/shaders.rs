//! Embedded GLSL bodies. The `#version` line is added at compile time to
//! match the context's dialect.

use prism_engine::shader::ShaderSource;

use crate::scene::Variant;

const FLAT_VERT: &str = include_str!("../shaders/flat.vert.glsl");
const FLAT_FRAG: &str = include_str!("../shaders/flat.frag.glsl");
const LIT_VERT: &str = include_str!("../shaders/lit.vert.glsl");
const LIT_FRAG: &str = include_str!("../shaders/lit.frag.glsl");

/// Vertex and fragment source for `variant`.
pub fn sources(variant: Variant) -> (ShaderSource, ShaderSource) {
    match variant {
        Variant::Flat => (ShaderSource::vertex(FLAT_VERT), ShaderSource::fragment(FLAT_FRAG)),
        Variant::Lit => (ShaderSource::vertex(LIT_VERT), ShaderSource::fragment(LIT_FRAG)),
    }
}
