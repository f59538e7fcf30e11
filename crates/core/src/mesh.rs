use crate::PointCloud;

/// A polygon as an ordered list of point indices. An empty face is a valid
/// record with no geometry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub vertices: Vec<u32>,
}

impl Face {
    pub fn new(vertices: Vec<u32>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl From<Vec<u32>> for Face {
    fn from(vertices: Vec<u32>) -> Self {
        Self { vertices }
    }
}

/// Points plus the faces that index into them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonMesh {
    pub cloud: PointCloud,
    pub faces: Vec<Face>,
}

impl PolygonMesh {
    pub fn new(cloud: PointCloud, faces: Vec<Face>) -> Self {
        Self { cloud, faces }
    }
}

/// One corner of a textured face. All indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: u32,
    pub texture: Option<u32>,
    pub normal: Option<u32>,
}

impl FaceCorner {
    pub fn position_only(position: u32) -> Self {
        Self {
            position,
            texture: None,
            normal: None,
        }
    }
}

/// Faces sharing one material.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubMesh {
    pub material: Option<String>,
    pub faces: Vec<Vec<FaceCorner>>,
}

/// Surface description referenced by name from a [`SubMesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct TexMaterial {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub dissolve: f32,
    pub illumination: u8,
    pub diffuse_texture: Option<String>,
}

impl TexMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.0, 0.0, 0.0],
            shininess: 0.0,
            dissolve: 1.0,
            illumination: 2,
            diffuse_texture: None,
        }
    }
}

/// A mesh with texture coordinates, normals and materials.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureMesh {
    pub cloud: PointCloud,
    pub tex_coordinates: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub submeshes: Vec<SubMesh>,
    pub materials: Vec<TexMaterial>,
}

impl TextureMesh {
    pub fn face_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.faces.len()).sum()
    }

    /// Drops texture and normal data, keeping positions and position-only
    /// faces in submesh order.
    pub fn to_polygon_mesh(&self) -> PolygonMesh {
        let faces = self
            .submeshes
            .iter()
            .flat_map(|s| s.faces.iter())
            .map(|corners| Face::new(corners.iter().map(|c| c.position).collect()))
            .collect();
        PolygonMesh::new(self.cloud.clone(), faces)
    }
}
