#![forbid(unsafe_code)]

//! Point cloud and polygon mesh conversion between OFF/COFF, PCD, PLY and OBJ.

pub use cloudconv_core;
pub use cloudconv_filters;
pub use cloudconv_io;

pub use cloudconv_core::{Face, PointCloud, PointXYZRGBA, PolygonMesh, TextureMesh};
pub use cloudconv_io::{CloudIo, IoConfig, IoError, IoResult, OutputPaths};
