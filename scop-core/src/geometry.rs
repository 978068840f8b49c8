/// Geometry primitives for OBJ models
use nalgebra::{Point3, Vector3};

use crate::transform::normalize_or_zero;

/// A vertex position. Its index is its position in [`Model::vertices`].
pub type Vertex = Point3<f32>;

/// A vertex normal, stored as read (not necessarily unit length).
pub type Normal = Vector3<f32>;

/// A texture coordinate. `w` is `0.0` when the source omits it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl TexCoord {
    pub fn new(u: f32, v: f32, w: f32) -> Self {
        Self { u, v, w }
    }
}

/// One corner of a face: a 0-based vertex index plus optional texture
/// coordinate and normal indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub vertex: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub fn new(vertex: usize, tex_coord: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            vertex,
            tex_coord,
            normal,
        }
    }

    /// Indices in the `-1`-for-absent layout used by index-buffer consumers.
    pub fn as_signed(&self) -> [isize; 3] {
        let signed = |index: Option<usize>| index.map_or(-1, |i| i as isize);
        [self.vertex as isize, signed(self.tex_coord), signed(self.normal)]
    }
}

/// A polygon. Corner order is the winding order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    pub vertices: Vec<FaceVertex>,
}

impl Face {
    pub fn new(vertices: Vec<FaceVertex>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// An indexed polygon model as read from an OBJ source.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Where the model came from (usually the file path)
    pub object_name: String,
    /// Texture the model should be displayed with
    pub texture_name: String,
    pub vertices: Vec<Vertex>,
    pub tex_coords: Vec<TexCoord>,
    pub normals: Vec<Normal>,
    pub faces: Vec<Face>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Position referenced by a face corner, or `None` if the index is out of
    /// range for this model.
    pub fn vertex_position(&self, corner: &FaceVertex) -> Option<&Vertex> {
        self.vertices.get(corner.vertex)
    }

    /// Positions of a face's corners, silently skipping out-of-range ones.
    pub fn face_positions<'a>(&'a self, face: &'a Face) -> impl Iterator<Item = &'a Vertex> + 'a {
        face.vertices
            .iter()
            .filter_map(move |corner| self.vertex_position(corner))
    }

    /// Face normal from the first three valid corners.
    ///
    /// Returns `None` for faces with fewer than three valid corners or with
    /// collinear leading corners.
    pub fn face_normal(&self, face: &Face) -> Option<Vector3<f32>> {
        let mut positions = self.face_positions(face);
        let v0 = positions.next()?;
        let v1 = positions.next()?;
        let v2 = positions.next()?;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = normalize_or_zero(&edge1.cross(&edge2));

        if normal == Vector3::zeros() {
            None
        } else {
            Some(normal)
        }
    }

    /// Texture sampling coordinates for a face corner.
    ///
    /// V is flipped (`1 - v`) to match top-down image rows. Corners without a
    /// valid texture coordinate fall back to a planar mapping of the vertex
    /// position onto the XY plane. Returns `None` if the vertex itself is out
    /// of range.
    pub fn texture_uv(&self, corner: &FaceVertex) -> Option<[f32; 2]> {
        let position = self.vertex_position(corner)?;
        match corner.tex_coord.and_then(|i| self.tex_coords.get(i)) {
            Some(tc) => Some([tc.u, 1.0 - tc.v]),
            None => Some([position.x, position.y]),
        }
    }

    /// A cube of quads centered at the origin, with texture coordinates and
    /// normals. Used when no model file is given.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut model = Self::new();
        model.object_name = "cube".to_string();

        model.vertices = vec![
            Point3::new(-half, -half, -half),
            Point3::new(half, -half, -half),
            Point3::new(half, half, -half),
            Point3::new(-half, half, -half),
            Point3::new(-half, -half, half),
            Point3::new(half, -half, half),
            Point3::new(half, half, half),
            Point3::new(-half, half, half),
        ];

        model.tex_coords = vec![
            TexCoord::new(0.0, 0.0, 0.0),
            TexCoord::new(1.0, 0.0, 0.0),
            TexCoord::new(1.0, 1.0, 0.0),
            TexCoord::new(0.0, 1.0, 0.0),
        ];

        model.normals = vec![
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
        ];

        // Counter-clockwise seen from outside
        let quads: [([usize; 4], usize); 6] = [
            ([4, 5, 6, 7], 0), // front
            ([1, 0, 3, 2], 1), // back
            ([3, 7, 6, 2], 2), // top
            ([0, 1, 5, 4], 3), // bottom
            ([1, 2, 6, 5], 4), // right
            ([0, 4, 7, 3], 5), // left
        ];

        for (corners, normal) in quads {
            let face = corners
                .iter()
                .enumerate()
                .map(|(uv, &vertex)| FaceVertex::new(vertex, Some(uv), Some(normal)))
                .collect();
            model.faces.push(Face::new(face));
        }

        model
    }
}
