//! Mesh data and GPU upload.
//!
//! `MeshData` is the CPU-side description (flat arrays + u16 indices),
//! `MeshBufferUploader` turns it into one static GPU buffer per array.

pub mod cube;
mod data;
mod upload;

pub use data::{MeshData, VertexAttribute};
pub use upload::{AttributeBuffer, MeshBufferUploader, MeshBuffers};
