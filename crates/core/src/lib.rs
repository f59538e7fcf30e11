#![forbid(unsafe_code)]

pub mod cloud;
pub mod mesh;
pub mod point;

pub use cloud::{Colors, PointCloud};
pub use mesh::{Face, FaceCorner, PolygonMesh, SubMesh, TexMaterial, TextureMesh};
pub use point::PointXYZRGBA;
