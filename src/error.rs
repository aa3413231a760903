use std::path::PathBuf;
use thiserror::Error;

use crate::kernel::{Physics, Source, Tissue};
use crate::types::{BoxDim, Index3};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort the operation in which they occur: loading a dataset
/// file, reading configuration or imaging data, or a malformed request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}:{line}: {message}", .path.display())]
    Parse { path: PathBuf, line: usize, message: String },

    #[error("missing or unreadable path: {}", .0.display())]
    MissingPath(PathBuf),

    #[error("invalid radionuclide identifier `{0}`")]
    InvalidNuclide(String),

    #[error("unsupported radionuclide `{0}`")]
    UnsupportedNuclide(String),

    #[error("unrecognized tissue `{0}`")]
    UnknownTissue(String),

    #[error("unrecognized physics model `{0}`")]
    UnknownPhysics(String),

    #[error("unrecognized kernel source `{0}`")]
    UnknownSource(String),

    #[error("`{name}` has shape {found:?}, expected {expected:?}")]
    ShapeMismatch { name: String, expected: BoxDim, found: BoxDim },

    #[error("no voxel with positive dose in region `{0}`")]
    EmptyRegion(String),

    #[error("no structure called `{0}`")]
    MissingStructure(String),

    #[error("a dose-volume histogram needs at least one bin")]
    NoBins,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Error::Parse { path: path.into(), line, message: message.into() }
    }
}

/// Reasons why a kernel library query produced no value. These are
/// recoverable: callers may ask for sources or tissues which were not loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("no {0} data loaded for this radionuclide")]
    SourceUnavailable(Source),

    #[error("no {dataset} tables for tissue {tissue}{}", physics_suffix(.physics))]
    NoMatchingTables { dataset: Source, tissue: Tissue, physics: Option<Physics> },

    #[error("offset {offset:?} lies outside the common lookup range of {limit} voxels")]
    OffsetOutOfRange { offset: Index3, limit: usize },

    #[error("no simulation table with voxel size {voxel_size_mm:.3} mm for tissue {tissue} and physics {physics}")]
    NoExactVoxelSize { tissue: Tissue, physics: Physics, voxel_size_mm: f64 },

    #[error("voxel size {0} mm is not a finite length")]
    InvalidVoxelSize(f64),
}

fn physics_suffix(physics: &Option<Physics>) -> String {
    physics.map(|p| format!(" and physics {p}")).unwrap_or_default()
}
