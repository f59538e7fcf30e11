//! One-shot conversions between formats.
//!
//! The destination is the source path with the target extension appended,
//! not substituted: `scan.off` converts to `scan.off.pcd`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::IoResult;
use crate::{obj, off, pcd, ply};

/// Appends `.ext` to the full file name of `path`.
pub fn append_extension(path: impl AsRef<Path>, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_ref().as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// OFF → ASCII PCD. Faces are discarded. Returns the written path.
pub fn convert_off_to_pcd(src: impl AsRef<Path>) -> IoResult<PathBuf> {
    let src = src.as_ref();
    let (cloud, _) = off::read_off_points(src)?;
    let dst = append_extension(src, "pcd");
    pcd::write_pcd(&dst, &cloud)?;
    Ok(dst)
}

/// PCD → COFF with no faces. Returns the written path.
pub fn convert_pcd_to_off(src: impl AsRef<Path>) -> IoResult<PathBuf> {
    let src = src.as_ref();
    let cloud = pcd::read_pcd(src)?;
    let dst = append_extension(src, "off");
    off::write_off(&dst, &cloud, &[])?;
    Ok(dst)
}

/// OFF → ASCII PLY. Faces are discarded. Returns the written path.
pub fn convert_off_to_ply(src: impl AsRef<Path>) -> IoResult<PathBuf> {
    let src = src.as_ref();
    let (cloud, _) = off::read_off_points(src)?;
    let dst = append_extension(src, "ply");
    ply::write_ply(&dst, &cloud)?;
    Ok(dst)
}

/// PLY → COFF with no faces. Returns the written path.
pub fn convert_ply_to_off(src: impl AsRef<Path>) -> IoResult<PathBuf> {
    let src = src.as_ref();
    let cloud = ply::read_ply(src)?;
    let dst = append_extension(src, "off");
    off::write_off(&dst, &cloud, &[])?;
    Ok(dst)
}

/// OBJ → COFF keeping positions and position-only faces. Returns the
/// written path.
pub fn convert_obj_to_off(src: impl AsRef<Path>) -> IoResult<PathBuf> {
    let src = src.as_ref();
    let mesh = obj::read_obj(src)?.to_polygon_mesh();
    let dst = append_extension(src, "off");
    off::write_off_mesh(&dst, &mesh)?;
    Ok(dst)
}
