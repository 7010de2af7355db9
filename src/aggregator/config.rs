use serde::{Deserialize, Serialize};
use url::Url;

use crate::aggregator::flat::slugify;
use crate::domain::BookMeta;

/// Book metadata for the generated anthology.
///
/// Unset fields are derived from the seed URL's host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Identifier embedded in the package and its file name
    pub identifier: Option<String>,

    /// Book title
    pub title: Option<String>,

    /// BCP 47 language tag (default: "en")
    pub language: Option<String>,

    /// Author list, in display order
    pub authors: Vec<String>,

    /// Short site description for the introduction section
    pub description: Option<String>,
}

impl BookConfig {
    pub fn resolve(&self, seed: &Url) -> BookMeta {
        let host = seed.host_str().unwrap_or("site").to_string();

        let identifier = self
            .identifier
            .clone()
            .unwrap_or_else(|| format!("{}-collection", slugify(&host.replace('.', "-"))));

        let authors = if self.authors.is_empty() {
            vec![host.clone()]
        } else {
            self.authors.clone()
        };

        BookMeta {
            identifier,
            title: self
                .title
                .clone()
                .unwrap_or_else(|| format!("{} - Collected Articles", host)),
            language: self.language.clone().unwrap_or_else(|| "en".to_string()),
            authors,
            description: self
                .description
                .clone()
                .unwrap_or_else(|| format!("A collection of articles from {}.", host)),
            source_url: seed.clone(),
        }
    }
}
