use url::Url;

/// A discovered URL that may lead to an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: Url,
    pub title_hint: Option<String>,
}

impl CandidateLink {
    pub fn new(url: Url, title_hint: Option<String>) -> Self {
        let title_hint = title_hint.filter(|t| !t.trim().is_empty());
        Self { url, title_hint }
    }
}
