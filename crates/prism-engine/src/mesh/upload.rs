use crate::error::{RenderError, Result};
use crate::gl::{BufferTarget, Gl};

use super::data::{MeshData, VertexAttribute};

/// GPU buffer holding the mesh's second per-vertex stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttributeBuffer<B> {
    Color(B),
    Normal(B),
}

/// Buffer handles for an uploaded mesh.
///
/// Created once and never modified afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MeshBuffers<B> {
    pub position: B,
    pub attribute: AttributeBuffer<B>,
    pub tex_coord: Option<B>,
    pub indices: B,
    pub index_count: i32,
}

impl<B: Copy> MeshBuffers<B> {
    pub fn delete<G: Gl<Buffer = B>>(self, gl: &G) {
        let attribute = match self.attribute {
            AttributeBuffer::Color(b) | AttributeBuffer::Normal(b) => b,
        };
        gl.delete_buffer(self.position);
        gl.delete_buffer(attribute);
        if let Some(uv) = self.tex_coord {
            gl.delete_buffer(uv);
        }
        gl.delete_buffer(self.indices);
    }
}

/// Uploads static mesh arrays, one buffer per array.
pub struct MeshBufferUploader<'g, G: Gl> {
    gl: &'g G,
}

impl<'g, G: Gl> MeshBufferUploader<'g, G> {
    pub fn new(gl: &'g G) -> Self {
        Self { gl }
    }

    /// Validates `mesh` and uploads it.
    ///
    /// Nothing touches the GPU when validation fails.
    pub fn upload(&self, mesh: &MeshData) -> Result<MeshBuffers<G::Buffer>> {
        mesh.validate()?;

        let position = self.upload_array(BufferTarget::Array, bytemuck::cast_slice(&mesh.positions))?;

        let attribute_data = bytemuck::cast_slice(mesh.attribute.values());
        let attribute = match &mesh.attribute {
            VertexAttribute::Color(_) => {
                AttributeBuffer::Color(self.upload_array(BufferTarget::Array, attribute_data)?)
            }
            VertexAttribute::Normal(_) => {
                AttributeBuffer::Normal(self.upload_array(BufferTarget::Array, attribute_data)?)
            }
        };

        let tex_coord = match &mesh.tex_coords {
            Some(uv) => Some(self.upload_array(BufferTarget::Array, bytemuck::cast_slice(uv))?),
            None => None,
        };

        let indices = self.upload_array(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(&mesh.indices),
        )?;

        log::info!(
            "uploaded mesh: {} vertices, {} indices",
            mesh.vertex_count(),
            mesh.indices.len()
        );

        Ok(MeshBuffers {
            position,
            attribute,
            tex_coord,
            indices,
            index_count: mesh.indices.len() as i32,
        })
    }

    fn upload_array(&self, target: BufferTarget, bytes: &[u8]) -> Result<G::Buffer> {
        let buffer = self
            .gl
            .create_buffer()
            .map_err(|reason| RenderError::ResourceCreation {
                what: "buffer",
                reason,
            })?;
        self.gl.bind_buffer(target, Some(buffer));
        self.gl.buffer_data_static(target, bytes);
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::RecordingGl;
    use crate::mesh::cube;

    #[test]
    fn colored_cube_uploads_three_buffers() {
        let gl = RecordingGl::new();
        let buffers = MeshBufferUploader::new(&gl).upload(&cube::colored_cube()).unwrap();

        assert_eq!(buffers.index_count, 36);
        assert!(buffers.tex_coord.is_none());
        assert!(matches!(buffers.attribute, AttributeBuffer::Color(_)));

        let positions = gl.buffer_contents(buffers.position).unwrap();
        assert_eq!(positions.len(), 72 * 4);
        let indices: Vec<u16> = gl
            .buffer_contents(buffers.indices)
            .unwrap()
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(indices, cube::INDICES);
    }

    #[test]
    fn textured_cube_uploads_four_buffers() {
        let gl = RecordingGl::new();
        let buffers = MeshBufferUploader::new(&gl).upload(&cube::textured_cube()).unwrap();
        assert!(matches!(buffers.attribute, AttributeBuffer::Normal(_)));
        let uv = gl.buffer_contents(buffers.tex_coord.unwrap()).unwrap();
        assert_eq!(uv.len(), 48 * 4);

        buffers.delete(&gl);
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn invalid_mesh_never_reaches_the_gpu() {
        let gl = RecordingGl::new();
        let mut mesh = cube::colored_cube();
        mesh.indices[0] = 24;
        assert!(MeshBufferUploader::new(&gl).upload(&mesh).is_err());
        assert!(gl.calls().is_empty());
    }
}
