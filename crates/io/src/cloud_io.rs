use cloudconv_core::{Face, PointCloud, PolygonMesh, TextureMesh};
use std::path::{Path, PathBuf};

use crate::config::IoConfig;
use crate::error::IoResult;
use crate::off::OffMesh;
use crate::{convert, normalize, obj, off, pcd, ply};

/// Load and save entry points sharing one [`IoConfig`].
///
/// Every `save_*` method writes to the given path, or to the configured
/// default for that format when `None`, and returns the path it wrote.
#[derive(Debug, Clone, Default)]
pub struct CloudIo {
    config: IoConfig,
}

impl CloudIo {
    pub fn new(config: IoConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IoConfig {
        &self.config
    }

    pub fn load_pcd(&self, path: impl AsRef<Path>) -> IoResult<PointCloud> {
        pcd::read_pcd(path)
    }

    pub fn load_off(&self, path: impl AsRef<Path>) -> IoResult<OffMesh> {
        off::read_off(path)
    }

    pub fn load_obj(&self, path: impl AsRef<Path>) -> IoResult<TextureMesh> {
        obj::read_obj(path)
    }

    pub fn load_ply(&self, path: impl AsRef<Path>) -> IoResult<PointCloud> {
        ply::read_ply(path)
    }

    pub fn save_pcd(&self, cloud: &PointCloud, path: Option<&Path>) -> IoResult<PathBuf> {
        let path = resolve(path, &self.config.paths.pcd);
        if self.config.pcd_binary {
            pcd::write_pcd_binary(&path, cloud)?;
        } else {
            pcd::write_pcd(&path, cloud)?;
        }
        Ok(path)
    }

    pub fn save_off(
        &self,
        cloud: &PointCloud,
        faces: &[Face],
        path: Option<&Path>,
    ) -> IoResult<PathBuf> {
        let path = resolve(path, &self.config.paths.off);
        off::write_off(&path, cloud, faces)?;
        Ok(path)
    }

    pub fn save_off_mesh(&self, mesh: &PolygonMesh, path: Option<&Path>) -> IoResult<PathBuf> {
        self.save_off(&mesh.cloud, &mesh.faces, path)
    }

    pub fn save_obj(&self, mesh: &TextureMesh, path: Option<&Path>) -> IoResult<PathBuf> {
        let path = resolve(path, &self.config.paths.obj);
        obj::write_obj(&path, mesh, self.config.obj_precision)?;
        Ok(path)
    }

    pub fn save_ply(&self, cloud: &PointCloud, path: Option<&Path>) -> IoResult<PathBuf> {
        let path = resolve(path, &self.config.paths.ply);
        if self.config.ply_binary {
            ply::write_ply_binary(&path, cloud)?;
        } else {
            ply::write_ply(&path, cloud)?;
        }
        Ok(path)
    }

    /// See [`normalize::normalize_face_indices`].
    pub fn normalize_obj(&self, path: impl AsRef<Path>) -> IoResult<usize> {
        normalize::normalize_face_indices(path)
    }

    pub fn convert_off_to_pcd(&self, src: impl AsRef<Path>) -> IoResult<PathBuf> {
        convert::convert_off_to_pcd(src)
    }

    pub fn convert_pcd_to_off(&self, src: impl AsRef<Path>) -> IoResult<PathBuf> {
        convert::convert_pcd_to_off(src)
    }

    pub fn convert_off_to_ply(&self, src: impl AsRef<Path>) -> IoResult<PathBuf> {
        convert::convert_off_to_ply(src)
    }

    pub fn convert_ply_to_off(&self, src: impl AsRef<Path>) -> IoResult<PathBuf> {
        convert::convert_ply_to_off(src)
    }

    pub fn convert_obj_to_off(&self, src: impl AsRef<Path>) -> IoResult<PathBuf> {
        convert::convert_obj_to_off(src)
    }
}

fn resolve(explicit: Option<&Path>, fallback: &Path) -> PathBuf {
    explicit.unwrap_or(fallback).to_path_buf()
}
