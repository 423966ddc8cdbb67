use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::{debug, info};

use crate::database::PointCloud;
use crate::error::ClusterError;

/// Default extension of partition files.
pub const DEFAULT_EXTENSION: &str = "ply";

/// Order in which discovered partition files become cluster ids 1, 2, 3, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryOrder {
    /// Sorted by file name, reproducible across platforms.
    #[default]
    Sorted,
    /// Whatever order the directory listing returns.
    Directory,
}

/// Loads cluster point clouds from a directory of `.ply` files.
pub struct PlyCloudLoader;

impl PlyCloudLoader {
    /// Discover and load every partition file in `dir`.
    pub fn load_dir(
        dir: &Path,
        extension: &str,
        order: DiscoveryOrder,
    ) -> Result<Vec<PointCloud>, ClusterError> {
        let paths = Self::discover(dir, extension, order)?;
        info!(dir = %dir.display(), files = paths.len(), "discovered partition files");

        paths.iter().map(|path| Self::load(path)).collect()
    }

    /// List regular files in `dir` whose extension matches, case-insensitively.
    pub fn discover(
        dir: &Path,
        extension: &str,
        order: DiscoveryOrder,
    ) -> Result<Vec<PathBuf>, ClusterError> {
        if !dir.is_dir() {
            return Err(ClusterError::DirectoryNotFound(dir.to_path_buf()));
        }

        let io_err = |source| ClusterError::IoError { path: dir.to_path_buf(), source };
        let wanted = extension.trim_start_matches('.');

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
            if matches && path.is_file() {
                paths.push(path);
            }
        }

        if order == DiscoveryOrder::Sorted {
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        }
        Ok(paths)
    }

    /// Read the `vertex` element of one PLY file (ASCII or binary).
    /// A file without vertices yields an empty cloud.
    pub fn load(path: &Path) -> Result<PointCloud, ClusterError> {
        let file = File::open(path).map_err(|source| ClusterError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader).map_err(|e| ClusterError::PlyError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let mut points = Vec::new();
        if let Some(vertices) = ply.payload.get("vertex") {
            points.reserve(vertices.len());
            for vertex in vertices {
                let x = Self::coordinate(vertex, "x", path)?;
                let y = Self::coordinate(vertex, "y", path)?;
                let z = Self::coordinate(vertex, "z", path)?;
                points.push([x, y, z]);
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(cluster = %name, points = points.len(), "loaded point cloud");

        Ok(PointCloud { name, source: path.to_path_buf(), points })
    }

    fn coordinate(vertex: &DefaultElement, key: &str, path: &Path) -> Result<f64, ClusterError> {
        match vertex.get(key) {
            Some(Property::Float(v)) => Ok(*v as f64),
            Some(Property::Double(v)) => Ok(*v),
            Some(Property::Int(v)) => Ok(*v as f64),
            Some(Property::UInt(v)) => Ok(*v as f64),
            Some(Property::Short(v)) => Ok(*v as f64),
            Some(Property::UShort(v)) => Ok(*v as f64),
            Some(Property::Char(v)) => Ok(*v as f64),
            Some(Property::UChar(v)) => Ok(*v as f64),
            _ => Err(ClusterError::PlyError {
                path: path.to_path_buf(),
                details: format!("vertex property '{}' missing or not a scalar", key),
            }),
        }
    }
}
