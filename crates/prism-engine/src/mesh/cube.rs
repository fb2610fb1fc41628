//! Unit cube geometry.
//!
//! Each face has its own 4 vertices so per-face attributes stay flat:
//! 6 faces x 4 vertices = 24 vertices, 6 faces x 2 triangles x 3 = 36 indices.

use super::data::{MeshData, VertexAttribute};

pub const FACE_COUNT: usize = 6;
pub const VERTICES_PER_FACE: usize = 4;
pub const VERTEX_COUNT: usize = FACE_COUNT * VERTICES_PER_FACE;
pub const INDEX_COUNT: usize = FACE_COUNT * 6;

#[rustfmt::skip]
pub const POSITIONS: [f32; VERTEX_COUNT * 3] = [
    // front
    -1.0, -1.0,  1.0,   1.0, -1.0,  1.0,   1.0,  1.0,  1.0,  -1.0,  1.0,  1.0,
    // back
    -1.0, -1.0, -1.0,  -1.0,  1.0, -1.0,   1.0,  1.0, -1.0,   1.0, -1.0, -1.0,
    // top
    -1.0,  1.0, -1.0,  -1.0,  1.0,  1.0,   1.0,  1.0,  1.0,   1.0,  1.0, -1.0,
    // bottom
    -1.0, -1.0, -1.0,   1.0, -1.0, -1.0,   1.0, -1.0,  1.0,  -1.0, -1.0,  1.0,
    // right
     1.0, -1.0, -1.0,   1.0,  1.0, -1.0,   1.0,  1.0,  1.0,   1.0, -1.0,  1.0,
    // left
    -1.0, -1.0, -1.0,  -1.0, -1.0,  1.0,  -1.0,  1.0,  1.0,  -1.0,  1.0, -1.0,
];

/// Front white, back red, top green, bottom blue, right yellow, left purple.
pub const FACE_COLORS: [[f32; 4]; FACE_COUNT] = [
    [1.0, 1.0, 1.0, 1.0],
    [1.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0, 1.0],
    [1.0, 0.0, 1.0, 1.0],
];

const FACE_NORMALS: [[f32; 3]; FACE_COUNT] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
];

const FACE_TEX_COORDS: [f32; VERTICES_PER_FACE * 2] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

#[rustfmt::skip]
pub const INDICES: [u16; INDEX_COUNT] = [
    0,  1,  2,   0,  2,  3,
    4,  5,  6,   4,  6,  7,
    8,  9,  10,  8,  10, 11,
    12, 13, 14,  12, 14, 15,
    16, 17, 18,  16, 18, 19,
    20, 21, 22,  20, 22, 23,
];

/// Repeats each face's value once per face vertex.
fn per_face<const N: usize>(faces: &[[f32; N]; FACE_COUNT]) -> Vec<f32> {
    faces
        .iter()
        .flat_map(|v| std::iter::repeat_n(v, VERTICES_PER_FACE).flatten().copied())
        .collect()
}

/// Cube with flat per-face colors.
pub fn colored_cube() -> MeshData {
    MeshData {
        positions: POSITIONS.to_vec(),
        attribute: VertexAttribute::Color(per_face(&FACE_COLORS)),
        tex_coords: None,
        indices: INDICES.to_vec(),
    }
}

/// Cube with face normals and a full 0..1 texture square on every face.
pub fn textured_cube() -> MeshData {
    MeshData {
        positions: POSITIONS.to_vec(),
        attribute: VertexAttribute::Normal(per_face(&FACE_NORMALS)),
        tex_coords: Some(FACE_TEX_COORDS.repeat(FACE_COUNT)),
        indices: INDICES.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_buffer_covers_six_faces() {
        assert_eq!(INDICES.len(), 36);
        assert!(INDICES.iter().all(|&i| usize::from(i) < VERTEX_COUNT));
        assert_eq!(VERTEX_COUNT, 24);
    }

    #[test]
    fn colored_cube_is_consistent() {
        let mesh = colored_cube();
        mesh.validate().unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.attribute.values().len(), 24 * 4);
        // Second face (back) is red on all four of its vertices.
        let back = &mesh.attribute.values()[16..32];
        assert!(back.chunks(4).all(|c| c == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn textured_cube_is_consistent() {
        let mesh = textured_cube();
        mesh.validate().unwrap();
        assert_eq!(mesh.tex_coords.as_ref().map(Vec::len), Some(48));
        assert_eq!(mesh.attribute.components(), 3);
    }

    #[test]
    fn face_normals_point_away_from_the_center() {
        let mesh = textured_cube();
        let normals = mesh.attribute.values();
        for (p, n) in mesh.positions.chunks(3).zip(normals.chunks(3)) {
            let dot: f32 = p.iter().zip(n).map(|(a, b)| a * b).sum();
            assert_eq!(dot, 1.0);
        }
    }
}
