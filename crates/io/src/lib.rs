#![forbid(unsafe_code)]

//! Point cloud and mesh file I/O: OFF/COFF, PCD, PLY and OBJ codecs, format
//! converters and an in-place OBJ face-index normalizer.

pub mod cloud_io;
pub mod config;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod obj;
pub mod off;
pub mod pcd;
pub mod ply;

pub use cloud_io::CloudIo;
pub use config::{IoConfig, OutputPaths};
pub use convert::{
    append_extension, convert_obj_to_off, convert_off_to_pcd, convert_off_to_ply,
    convert_pcd_to_off, convert_ply_to_off,
};
pub use error::{FaceIndexOutOfRange, IoError, IoResult};
pub use normalize::{normalize_face_bytes, normalize_face_indices, normalize_face_text};
pub use obj::{read_obj, write_obj, DEFAULT_OBJ_PRECISION};
pub use off::{
    parse_off, read_off, read_off_faces, read_off_points, write_off, write_off_mesh, OffMesh,
};
pub use pcd::{read_pcd, write_pcd, write_pcd_binary};
pub use ply::{read_ply, write_ply, write_ply_binary};
