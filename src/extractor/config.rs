use serde::{Deserialize, Serialize};

/// Configuration for the content extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// CSS selectors to try for article content, most specific first
    pub content_selectors: Vec<String>,

    /// CSS selectors to try for the article title, in priority order
    pub title_selectors: Vec<String>,

    /// CSS selectors for elements removed from the page before extraction
    pub remove_selectors: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_selectors: vec![
                ".post-content".to_string(),
                ".entry-content".to_string(),
                "article".to_string(),
                ".post".to_string(),
                "main".to_string(),
                "[role=\"main\"]".to_string(),
                ".content".to_string(),
                "#content".to_string(),
            ],
            title_selectors: vec![
                "h1".to_string(),
                ".post-title".to_string(),
                ".entry-title".to_string(),
                "title".to_string(),
            ],
            remove_selectors: vec![
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
                "template".to_string(),
                "iframe".to_string(),
                "nav".to_string(),
                "footer".to_string(),
                "header".to_string(),
                "aside".to_string(),
                "form".to_string(),
                ".comment".to_string(),
                ".comments".to_string(),
                "#comments".to_string(),
                ".sidebar".to_string(),
            ],
        }
    }
}
