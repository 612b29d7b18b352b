use crate::analyzer::AnalyzeError;
use crate::transpile::TranspileError;
use pages_router::RouteConflict;
use std::path::PathBuf;

/// Every failure that aborts a build
///
/// Per-file variants carry the path of the offending file.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to transpile {path}: {source}")]
    Transpile {
        path: PathBuf,
        #[source]
        source: TranspileError,
    },

    #[error("failed to parse {path}: {source}")]
    Analyze {
        path: PathBuf,
        #[source]
        source: AnalyzeError,
    },

    #[error(transparent)]
    Conflict(#[from] RouteConflict),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run bundler `{program}`: {source}")]
    Bundler {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl BuildError {
    /// File the error is attributed to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            BuildError::Scan { path, .. }
            | BuildError::Read { path, .. }
            | BuildError::Transpile { path, .. }
            | BuildError::Analyze { path, .. }
            | BuildError::Write { path, .. } => Some(path),
            BuildError::Conflict(_) | BuildError::Bundler { .. } | BuildError::Task(_) => None,
        }
    }
}
