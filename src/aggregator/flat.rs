use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Document;

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("NON_WORD_RE should compile"));
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").expect("SEPARATOR_RE should compile"));

pub const MAX_SLUG_CHARS: usize = 50;
pub const FLAT_EXTENSION: &str = "md";

/// One emitted flat-file document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatDocument {
    pub file_name: String,
    pub contents: String,
}

impl FlatDocument {
    pub fn from_document(doc: &Document) -> Self {
        let file_name = format!(
            "{:03}-{}.{}",
            doc.sequence_index(),
            slugify(doc.title()),
            FLAT_EXTENSION
        );

        let contents = format!(
            "# {}\n\nSource: {}\nRetrieved: {}\n\n---\n\n{}\n",
            doc.title(),
            doc.source_url(),
            doc.retrieved_at().format("%Y-%m-%d"),
            doc.body().trim()
        );

        Self { file_name, contents }
    }
}

/// Filesystem-safe slug: non-word characters dropped, separators collapsed
/// to `-`, at most [`MAX_SLUG_CHARS`] characters.
pub fn slugify(title: &str) -> String {
    let stripped = NON_WORD_RE.replace_all(title, "");
    let joined = SEPARATOR_RE.replace_all(stripped.trim(), "-");

    let truncated: String = joined.trim_matches('-').chars().take(MAX_SLUG_CHARS).collect();
    let slug = truncated.trim_end_matches('-');

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}
