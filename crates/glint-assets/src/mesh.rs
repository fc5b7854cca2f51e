//! CPU-side mesh data and OBJ loading.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use glam::{Vec2, Vec3};
use tracing::{debug, info};

use glint_rhi::vertex::Vertex;

use crate::error::{AssetError, AssetResult};

/// Mesh data ready for upload: deduplicated vertices plus indices.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Load and triangulate an OBJ file.
    ///
    /// Vertices are deduplicated on the full attribute tuple, so corners
    /// shared with identical position, color, normal, and texture
    /// coordinates collapse into one vertex.
    pub fn load_obj(path: impl AsRef<Path>) -> AssetResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut reader = std::io::BufReader::new(file);
        let mesh = Self::parse_obj(&mut reader, path)?;
        info!(
            path = %path.display(),
            vertices = mesh.vertices.len(),
            indices = mesh.indices.len(),
            "Loaded OBJ mesh"
        );
        Ok(mesh)
    }

    fn parse_obj(reader: &mut impl BufRead, path: &Path) -> AssetResult<Self> {
        let options = tobj::LoadOptions {
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };

        let (models, _materials) = tobj::load_obj_buf(reader, &options, |_| {
            // Materials are not used; resolve every mtllib to nothing.
            Ok((Vec::new(), Default::default()))
        })
        .map_err(|e| AssetError::ObjParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut unique: HashMap<[u32; 11], u32> = HashMap::new();

        for model in &models {
            let mesh = &model.mesh;
            for (face_vertex, &position_index) in mesh.indices.iter().enumerate() {
                let position = read_vec3(&mesh.positions, position_index);

                let color = if mesh.vertex_color.is_empty() {
                    Vec3::ONE
                } else {
                    read_vec3(&mesh.vertex_color, position_index)
                };

                let normal = match mesh.normal_indices.get(face_vertex) {
                    Some(&index) => read_vec3(&mesh.normals, index),
                    None => Vec3::ZERO,
                };

                let uv = match mesh.texcoord_indices.get(face_vertex) {
                    Some(&index) => read_vec2(&mesh.texcoords, index),
                    None => Vec2::ZERO,
                };

                let vertex = Vertex::new(position, color, normal, uv);
                let next = vertices.len() as u32;
                let index = *unique.entry(vertex_key(&vertex)).or_insert_with(|| {
                    vertices.push(vertex);
                    next
                });
                indices.push(index);
            }
        }

        if vertices.is_empty() {
            return Err(AssetError::EmptyMesh(path.to_path_buf()));
        }

        debug!(
            unique = vertices.len(),
            referenced = indices.len(),
            "Deduplicated mesh vertices"
        );

        Ok(Self { vertices, indices })
    }

    /// A unit cube with one color per face: 24 vertices, 36 indices.
    pub fn unit_cube() -> Self {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            // normal, up, face color
            (Vec3::NEG_X, Vec3::Y, Vec3::new(0.9, 0.9, 0.9)),
            (Vec3::X, Vec3::Y, Vec3::new(0.8, 0.8, 0.1)),
            (Vec3::Y, Vec3::Z, Vec3::new(0.9, 0.6, 0.1)),
            (Vec3::NEG_Y, Vec3::Z, Vec3::new(0.8, 0.1, 0.1)),
            (Vec3::Z, Vec3::Y, Vec3::new(0.1, 0.1, 0.8)),
            (Vec3::NEG_Z, Vec3::Y, Vec3::new(0.1, 0.8, 0.1)),
        ];

        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let mut mesh = Self::default();
        for (normal, up, color) in faces {
            let right = up.cross(normal);
            let corners = [
                (normal - right - up) * 0.5,
                (normal + right - up) * 0.5,
                (normal + right + up) * 0.5,
                (normal - right + up) * 0.5,
            ];

            let base = mesh.vertices.len() as u32;
            for (corner, uv) in corners.into_iter().zip(uvs) {
                mesh.vertices.push(Vertex::new(corner, color, normal, uv));
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        mesh
    }
}

fn read_vec3(data: &[f32], index: u32) -> Vec3 {
    let i = index as usize * 3;
    Vec3::new(data[i], data[i + 1], data[i + 2])
}

fn read_vec2(data: &[f32], index: u32) -> Vec2 {
    let i = index as usize * 2;
    Vec2::new(data[i], data[i + 1])
}

/// Bit-exact hash key over every vertex attribute.
fn vertex_key(vertex: &Vertex) -> [u32; 11] {
    [
        vertex.position.x.to_bits(),
        vertex.position.y.to_bits(),
        vertex.position.z.to_bits(),
        vertex.color.x.to_bits(),
        vertex.color.y.to_bits(),
        vertex.color.z.to_bits(),
        vertex.normal.x.to_bits(),
        vertex.normal.y.to_bits(),
        vertex.normal.z.to_bits(),
        vertex.uv.x.to_bits(),
        vertex.uv.y.to_bits(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    fn parse(text: &str) -> MeshData {
        let mut reader = Cursor::new(text.as_bytes());
        MeshData::parse_obj(&mut reader, Path::new("test.obj")).unwrap()
    }

    #[test]
    fn quad_deduplicates_shared_corners() {
        let mesh = parse(QUAD_OBJ);
        // Two triangles referencing four unique attribute tuples.
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert!(mesh.indices.iter().all(|&i| i < 4));
    }

    #[test]
    fn differing_normals_prevent_deduplication() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vn 0.0 0.0 -1.0
f 1//1 2//1 3//1
f 1//2 2//2 3//2
";
        let mesh = parse(obj);
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn material_library_references_are_ignored() {
        let obj = "\
mtllib scene.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
usemtl painted
f 1 2 3
";
        let mesh = parse(obj);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices.len(), 3);
    }

    #[test]
    fn missing_attributes_default_to_zero() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let mesh = parse(obj);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[0].normal, Vec3::ZERO);
        assert_eq!(mesh.vertices[0].uv, Vec2::ZERO);
        assert_eq!(mesh.vertices[0].color, Vec3::ONE);
    }

    #[test]
    fn empty_obj_is_an_error() {
        let mut reader = Cursor::new(b"# nothing here\n".as_slice());
        let result = MeshData::parse_obj(&mut reader, Path::new("empty.obj"));
        assert!(matches!(result, Err(AssetError::EmptyMesh(_))));
    }

    #[test]
    fn unit_cube_has_24_vertices_and_36_indices() {
        let cube = MeshData::unit_cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| i < 24));
    }

    #[test]
    fn unit_cube_normals_point_outward() {
        let cube = MeshData::unit_cube();
        for vertex in &cube.vertices {
            // Each corner lies on the face its normal points out of.
            assert!((vertex.position.dot(vertex.normal) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn unit_cube_faces_have_uniform_color() {
        let cube = MeshData::unit_cube();
        for face in cube.vertices.chunks(4) {
            assert!(face.iter().all(|v| v.color == face[0].color));
        }
    }
}
