//! Output defaults and format options.

use std::path::{Path, PathBuf};

use crate::obj::DEFAULT_OBJ_PRECISION;

/// File names used when a save call is not given an explicit destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Default: `point_cloud.pcd`
    pub pcd: PathBuf,
    /// Default: `point_cloud.off`
    pub off: PathBuf,
    /// Default: `point_cloud.obj`
    pub obj: PathBuf,
    /// Default: `point_cloud.ply`
    pub ply: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            pcd: PathBuf::from("point_cloud.pcd"),
            off: PathBuf::from("point_cloud.off"),
            obj: PathBuf::from("point_cloud.obj"),
            ply: PathBuf::from("point_cloud.ply"),
        }
    }
}

impl OutputPaths {
    /// Default names placed under `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Self {
            pcd: dir.join(defaults.pcd),
            off: dir.join(defaults.off),
            obj: dir.join(defaults.obj),
            ply: dir.join(defaults.ply),
        }
    }
}

/// Options shared by the [`CloudIo`](crate::CloudIo) facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoConfig {
    /// Destinations for saves without an explicit path.
    pub paths: OutputPaths,

    /// Decimal places for OBJ coordinates. Default: 6
    pub obj_precision: usize,

    /// Write PCD in binary instead of ASCII. Default: false
    pub pcd_binary: bool,

    /// Write PLY in binary little endian instead of ASCII. Default: false
    pub ply_binary: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            paths: OutputPaths::default(),
            obj_precision: DEFAULT_OBJ_PRECISION,
            pcd_binary: false,
            ply_binary: false,
        }
    }
}

impl IoConfig {
    #[must_use]
    pub fn with_paths(mut self, paths: OutputPaths) -> Self {
        self.paths = paths;
        self
    }

    #[must_use]
    pub fn with_obj_precision(mut self, precision: usize) -> Self {
        self.obj_precision = precision;
        self
    }

    #[must_use]
    pub fn with_pcd_binary(mut self, binary: bool) -> Self {
        self.pcd_binary = binary;
        self
    }

    #[must_use]
    pub fn with_ply_binary(mut self, binary: bool) -> Self {
        self.ply_binary = binary;
        self
    }
}
