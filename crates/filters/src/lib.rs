#![forbid(unsafe_code)]

pub mod nan_removal;

pub use nan_removal::{
    check_face_indices, remap_faces, remove_nan, FaceIndexOutOfRange, RemappedFaces,
};
