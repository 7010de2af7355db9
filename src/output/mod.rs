//! Writing emitted artifacts to disk.
//!
//! Each writer reports its own [`FolioError::Sink`] so a failure in one
//! artifact never prevents the other from being written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::{epub, FlatDocument};
use crate::app::{FolioError, Result};
use crate::domain::Anthology;

/// Output locations and toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the EPUB and the articles directory (default: ".")
    pub dir: PathBuf,

    /// Sub-directory for flat Markdown documents (default: "articles")
    pub articles_dir: String,

    /// Write one Markdown file per document
    pub flat: bool,

    /// Write the EPUB anthology
    pub epub: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            articles_dir: "articles".to_string(),
            flat: true,
            epub: true,
        }
    }
}

impl OutputConfig {
    pub fn articles_path(&self) -> PathBuf {
        self.dir.join(&self.articles_dir)
    }
}

fn sink_error(path: &Path) -> impl FnOnce(std::io::Error) -> FolioError + '_ {
    move |source| FolioError::Sink {
        path: path.to_path_buf(),
        source,
    }
}

/// Write every flat document into `dir`, creating it if needed.
pub fn write_flat_documents(dir: &Path, documents: &[FlatDocument]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(sink_error(dir))?;

    let mut written = Vec::with_capacity(documents.len());
    for doc in documents {
        let path = dir.join(&doc.file_name);
        fs::write(&path, &doc.contents).map_err(sink_error(&path))?;
        info!("Saved {}", doc.file_name);
        written.push(path);
    }

    Ok(written)
}

/// Package the anthology and write it into `dir`.
pub fn write_anthology(dir: &Path, anthology: &Anthology) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(sink_error(dir))?;

    let bytes = epub::package(anthology)?;
    let path = dir.join(anthology.file_name());
    fs::write(&path, bytes).map_err(sink_error(&path))?;
    info!("EPUB written to {}", path.display());

    Ok(path)
}
