use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Seed page {url} unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("No content region found: {0}")]
    Extraction(String),

    #[error("Content too short: {chars} chars (minimum {minimum})")]
    Validation { chars: usize, minimum: usize },

    #[error("Anthology invariant violated: {0}")]
    Anthology(String),

    #[error("Failed to write {path}: {source}")]
    Sink {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("EPUB packaging error: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FolioError {
    /// Whether this error only affects a single candidate page.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Extraction(_) | Self::Validation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
