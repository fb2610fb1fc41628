use crate::error::{RenderError, Result};

/// The per-vertex attribute that accompanies positions.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexAttribute {
    /// RGBA, 4 components per vertex.
    Color(Vec<f32>),
    /// Surface normal, 3 components per vertex.
    Normal(Vec<f32>),
}

impl VertexAttribute {
    pub fn components(&self) -> usize {
        match self {
            VertexAttribute::Color(_) => 4,
            VertexAttribute::Normal(_) => 3,
        }
    }

    pub fn values(&self) -> &[f32] {
        match self {
            VertexAttribute::Color(v) | VertexAttribute::Normal(v) => v,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            VertexAttribute::Color(_) => "colors",
            VertexAttribute::Normal(_) => "normals",
        }
    }
}

/// CPU-side indexed triangle list.
///
/// Arrays are flat and tightly packed: 3 floats per position, the attribute's
/// component count per attribute entry, 2 floats per texture coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub attribute: VertexAttribute,
    pub tex_coords: Option<Vec<f32>>,
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Checks that every array describes the same vertex count and that the
    /// index list is a triangle list addressing only existing vertices.
    pub fn validate(&self) -> Result<()> {
        if self.positions.is_empty() || self.positions.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "position array length {} is not a non-zero multiple of 3",
                self.positions.len()
            )));
        }
        let vertices = self.vertex_count();

        check_stream(
            self.attribute.label(),
            self.attribute.values().len(),
            self.attribute.components(),
            vertices,
        )?;

        if let Some(uv) = &self.tex_coords {
            check_stream("texture coordinates", uv.len(), 2, vertices)?;
        }

        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!(
                "index count {} is not a non-zero multiple of 3",
                self.indices.len()
            )));
        }

        if let Some((at, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| usize::from(i) >= vertices)
        {
            return Err(RenderError::InvalidMesh(format!(
                "index {index} at position {at} is out of range for {vertices} vertices"
            )));
        }

        Ok(())
    }
}

fn check_stream(label: &str, len: usize, components: usize, vertices: usize) -> Result<()> {
    if len != vertices * components {
        return Err(RenderError::InvalidMesh(format!(
            "{label}: expected {} floats ({vertices} vertices x {components}), got {len}",
            vertices * components
        )));
    }
    Ok(())
}
