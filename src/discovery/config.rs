use serde::{Deserialize, Serialize};

/// Configuration for candidate link discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum number of candidate links per run (default: 20)
    pub max_links: usize,

    /// CSS selectors for article links, in priority order
    pub link_selectors: Vec<String>,

    /// Stop at the first selector that yields a link instead of unioning all of them
    pub stop_at_first_match: bool,

    /// Minimum anchor text length for the all-anchors fallback scan (default: 5)
    pub min_link_text_chars: usize,

    /// URL prefixes that never point at documents
    pub blocked_schemes: Vec<String>,

    /// Path extensions that never point at documents
    pub blocked_extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_links: 20,
            link_selectors: vec![
                // URL-pattern selectors first, then class names, then headings
                "a[href*=\"/posts/\"]".to_string(),
                "a[href*=\"/post/\"]".to_string(),
                "a[href*=\"/articles/\"]".to_string(),
                "a[href*=\"/blog/\"]".to_string(),
                ".post-title a".to_string(),
                ".entry-title a".to_string(),
                "h2 a".to_string(),
                "h3 a".to_string(),
            ],
            stop_at_first_match: false,
            min_link_text_chars: 5,
            blocked_schemes: ["javascript:", "mailto:", "tel:", "data:"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocked_extensions: [
                ".css", ".js", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".zip",
                ".gz", ".tar", ".rar", ".7z", ".pdf", ".xml",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
