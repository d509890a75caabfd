use std::fs;
use std::path::{Path, PathBuf};

use scene::record::AnimalRecord;
use tracing::info;

use crate::animals::{AnimalDataError, parse_animals};
use crate::geojson::{BoundaryDocument, GeoJsonError};

#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Boundaries {
        path: PathBuf,
        source: GeoJsonError,
    },
    Animals {
        path: PathBuf,
        source: AnimalDataError,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Boundaries { path, source } => {
                write!(f, "failed to parse boundaries {}: {source}", path.display())
            }
            LoadError::Animals { path, source } => {
                write!(f, "failed to parse animals {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Boundaries { source, .. } => Some(source),
            LoadError::Animals { source, .. } => Some(source),
        }
    }
}

fn read_payload(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_boundaries(path: impl AsRef<Path>) -> Result<BoundaryDocument, LoadError> {
    let path = path.as_ref();
    let payload = read_payload(path)?;
    let doc = BoundaryDocument::from_geojson_str(&payload).map_err(|source| {
        LoadError::Boundaries {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(
        path = %path.display(),
        features = doc.features.len(),
        rings = doc.ring_count(),
        "boundaries loaded"
    );
    Ok(doc)
}

pub fn load_animals(path: impl AsRef<Path>) -> Result<Vec<AnimalRecord>, LoadError> {
    let path = path.as_ref();
    let payload = read_payload(path)?;
    let records = parse_animals(&payload).map_err(|source| LoadError::Animals {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), records = records.len(), "animals loaded");
    Ok(records)
}
