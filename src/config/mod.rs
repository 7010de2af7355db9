//! Configuration management for Folio.
//!
//! Configuration is read from `~/.config/folio/config.toml` unless another
//! path is given. If the file doesn't exist, a default configuration with
//! comments is created. Every section and field is optional.

use crate::aggregator::BookConfig;
use crate::crawler::CrawlConfig;
use crate::discovery::DiscoveryConfig;
use crate::extractor::ExtractorConfig;
use crate::normalizer::NormalizerConfig;
use crate::output::OutputConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub discovery: DiscoveryConfig,
    pub extractor: ExtractorConfig,
    pub normalizer: NormalizerConfig,
    pub book: BookConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::write_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/folio/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("folio").join("config.toml"))
    }

    /// Write the commented default config file, creating parent directories.
    pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Generate the default config file content with comments.
    pub fn default_config_content() -> &'static str {
        r##"# Folio Configuration
#
# Selectors are CSS selectors, tried in the order listed.

[crawl]
# Pause between consecutive page fetches (milliseconds)
delay_ms = 1000

# Per-request timeout in seconds
timeout_secs = 10

# User agent sent with every request
user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"

[discovery]
# Maximum number of article links followed per run
max_links = 20

# Selectors for article links on the seed page
link_selectors = [
    'a[href*="/posts/"]',
    'a[href*="/post/"]',
    'a[href*="/articles/"]',
    'a[href*="/blog/"]',
    ".post-title a",
    ".entry-title a",
    "h2 a",
    "h3 a",
]

# Use only the first selector that finds a link
stop_at_first_match = false

# Minimum anchor text length when no selector finds a link
min_link_text_chars = 5

blocked_schemes = ["javascript:", "mailto:", "tel:", "data:"]
blocked_extensions = [
    ".css", ".js", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico",
    ".zip", ".gz", ".tar", ".rar", ".7z", ".pdf", ".xml",
]

[extractor]
# Selectors for the main content region, most specific first
content_selectors = [
    ".post-content",
    ".entry-content",
    "article",
    ".post",
    "main",
    '[role="main"]',
    ".content",
    "#content",
]

# Selectors for the article title
title_selectors = ["h1", ".post-title", ".entry-title", "title"]

# Elements removed before extraction
remove_selectors = [
    "script",
    "style",
    "noscript",
    "template",
    "iframe",
    "nav",
    "footer",
    "header",
    "aside",
    "form",
    ".comment",
    ".comments",
    "#comments",
    ".sidebar",
]

[normalizer]
# Documents shorter than this (trimmed characters) are rejected
min_body_chars = 100

[book]
# Derived from the seed URL's host when unset
# identifier = "example-com-collection"
# title = "example.com - Collected Articles"
# language = "en"
# authors = ["example.com"]
# description = "A collection of articles from example.com."

[output]
# Directory for the EPUB and the articles directory
dir = "."
articles_dir = "articles"

# Artifacts to write
flat = true
epub = true
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
