use std::collections::hash_map::RandomState;
use std::fs;
use std::hash::{BuildHasher, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::surface::{RasterBuffer, SurfaceError};
use thiserror::Error;

const EXPORT_PREFIX: &str = "canvas_data_";
const EXPORT_EXTENSION: &str = "json";
const EXPORT_SUBDIR: &str = "Pictures/scribble";
const DEFAULT_FALLBACK_EXPORT_DIR: &str = "/tmp/scribble";
const EXPORT_SUFFIX_RANGE: u64 = 1_000_000;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode raster buffer: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid raster file {}: {source}", .path.display())]
    InvalidRaster {
        path: PathBuf,
        #[source]
        source: SurfaceError,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Where exported rasters go and where imported ones come from.
pub trait CanvasStorage {
    fn save_export(&self, buffer: &RasterBuffer) -> StorageResult<PathBuf>;
    fn load_import(&self, path: &Path) -> StorageResult<RasterBuffer>;
}

#[derive(Debug, Clone)]
pub struct StorageService {
    export_dir: PathBuf,
}

impl StorageService {
    pub const fn with_export_dir(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }

    /// `$HOME/Pictures/scribble`, or a directory under `/tmp` without a home.
    pub fn with_default_paths() -> Self {
        Self::with_export_dir(default_export_dir())
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn allocate_export_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let mut path = self.export_dir.clone();
        path.push(export_file_name(millis, random_suffix(millis)));
        path
    }

    pub fn save_export(&self, buffer: &RasterBuffer) -> StorageResult<PathBuf> {
        let serialized = buffer.to_json().map_err(StorageError::Encode)?;
        fs::create_dir_all(&self.export_dir)?;

        let path = self.allocate_export_path();
        fs::write(&path, serialized)?;
        tracing::info!(
            path = %path.display(),
            width = buffer.width(),
            height = buffer.height(),
            "exported canvas"
        );
        Ok(path)
    }

    pub fn load_import(&self, path: &Path) -> StorageResult<RasterBuffer> {
        let contents = fs::read_to_string(path)?;
        RasterBuffer::from_json(&contents).map_err(|source| StorageError::InvalidRaster {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl CanvasStorage for StorageService {
    fn save_export(&self, buffer: &RasterBuffer) -> StorageResult<PathBuf> {
        self.save_export(buffer)
    }

    fn load_import(&self, path: &Path) -> StorageResult<RasterBuffer> {
        self.load_import(path)
    }
}

/// `canvas_data_<unixMillis>_<hex>.json`
pub fn export_file_name(unix_millis: u128, suffix: u64) -> String {
    format!("{EXPORT_PREFIX}{unix_millis}_{suffix:x}.{EXPORT_EXTENSION}")
}

fn random_suffix(seed: u128) -> u64 {
    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u128(seed);
    hasher.finish() % EXPORT_SUFFIX_RANGE + 1
}

fn default_export_dir() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(EXPORT_SUBDIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FALLBACK_EXPORT_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ColorSpace;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scribble-storage-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn export_file_name_uses_millis_and_hex_suffix() {
        assert_eq!(
            export_file_name(1_700_000_000_123, 0xbeef),
            "canvas_data_1700000000123_beef.json"
        );
    }

    #[test]
    fn allocated_paths_live_in_export_dir_with_expected_shape() {
        let service = StorageService::with_export_dir(PathBuf::from("/tmp/exports"));
        let path = service.allocate_export_path();

        assert_eq!(path.parent(), Some(Path::new("/tmp/exports")));
        let name = path.file_name().and_then(|name| name.to_str()).unwrap();
        assert!(name.starts_with(EXPORT_PREFIX));
        assert!(name.ends_with(".json"));

        let stem = name
            .trim_start_matches(EXPORT_PREFIX)
            .trim_end_matches(".json");
        let (millis, suffix) = stem.split_once('_').unwrap();
        assert!(millis.parse::<u128>().is_ok());
        let suffix = u64::from_str_radix(suffix, 16).unwrap();
        assert!((1..=EXPORT_SUFFIX_RANGE).contains(&suffix));
    }

    #[test]
    fn save_then_load_round_trips_buffer() {
        let dir = scratch_dir("round-trip");
        let service = StorageService::with_export_dir(dir.clone());
        let buffer =
            RasterBuffer::new(2, 1, ColorSpace::Srgb, vec![10, 20, 30, 255, 0, 0, 0, 0]).unwrap();

        let path = service.save_export(&buffer).unwrap();
        assert!(path.starts_with(&dir));
        assert_eq!(service.load_import(&path).unwrap(), buffer);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_import_reports_malformed_json() {
        let dir = scratch_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{\"data\": [1, 2").unwrap();

        let service = StorageService::with_export_dir(dir.clone());
        let err = service.load_import(&path).unwrap_err();
        assert!(matches!(
            err,
            StorageError::InvalidRaster {
                source: SurfaceError::MalformedBuffer(_),
                ..
            }
        ));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn load_import_reports_missing_file() {
        let service = StorageService::with_export_dir(std::env::temp_dir());
        let err = service
            .load_import(Path::new("/definitely/not/here/canvas.json"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
