use chrono::NaiveDate;
use url::Url;

/// A normalized article ready for aggregation.
///
/// Documents are immutable once built. The sequence index is zero until the
/// aggregator accepts the document and assigns its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    title: String,
    source_url: Url,
    body: String,
    retrieved_at: NaiveDate,
    sequence_index: usize,
}

impl Document {
    pub fn new(title: impl Into<String>, source_url: Url, body: impl Into<String>, retrieved_at: NaiveDate) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            untitled_from_url(&source_url)
        } else {
            title.trim().to_string()
        };

        Self {
            title,
            source_url,
            body: body.into(),
            retrieved_at,
            sequence_index: 0,
        }
    }

    pub(crate) fn with_sequence_index(mut self, index: usize) -> Self {
        self.sequence_index = index;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn retrieved_at(&self) -> NaiveDate {
        self.retrieved_at
    }

    /// 1-based position in the aggregated collection, 0 if not yet accepted.
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    /// Body length in characters, ignoring surrounding whitespace.
    pub fn body_chars(&self) -> usize {
        self.body.trim().chars().count()
    }
}

/// Fallback title built from the last non-empty path segment, or the host.
pub fn untitled_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(String::from)
        .or_else(|| url.host_str().map(String::from))
        .unwrap_or_default();

    format!("Untitled – {}", segment)
}
