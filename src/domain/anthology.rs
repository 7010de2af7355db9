use chrono::{DateTime, Local};
use url::Url;

use crate::aggregator::slugify;
use crate::app::{FolioError, Result};
use crate::domain::Document;

/// Book-level metadata shared by every emitted anthology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMeta {
    pub identifier: String,
    pub title: String,
    pub language: String,
    pub authors: Vec<String>,
    pub description: String,
    pub source_url: Url,
}

/// The aggregated, ordered collection of documents for one run.
#[derive(Debug, Clone)]
pub struct Anthology {
    meta: BookMeta,
    documents: Vec<Document>,
    generated_at: DateTime<Local>,
}

impl Anthology {
    /// Build an anthology, checking that documents are non-empty and indexed `1..=N`.
    pub fn new(meta: BookMeta, documents: Vec<Document>, generated_at: DateTime<Local>) -> Result<Self> {
        if documents.is_empty() {
            return Err(FolioError::Anthology("no documents".into()));
        }

        for (position, doc) in documents.iter().enumerate() {
            if doc.sequence_index() != position + 1 {
                return Err(FolioError::Anthology(format!(
                    "document {:?} has sequence index {} at position {}",
                    doc.title(),
                    doc.sequence_index(),
                    position + 1
                )));
            }
        }

        Ok(Self {
            meta,
            documents,
            generated_at,
        })
    }

    pub fn meta(&self) -> &BookMeta {
        &self.meta
    }

    pub fn identifier(&self) -> &str {
        &self.meta.identifier
    }

    pub fn title(&self) -> &str {
        &self.meta.title
    }

    pub fn language(&self) -> &str {
        &self.meta.language
    }

    pub fn authors(&self) -> &[String] {
        &self.meta.authors
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    /// Package file name: `{identifier}-{YYYYMMDD}.epub`, with the identifier slugged
    /// so it can never name another directory.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.epub",
            slugify(&self.meta.identifier),
            self.generated_at.format("%Y%m%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn meta() -> BookMeta {
        BookMeta {
            identifier: "example-collection".into(),
            title: "Example".into(),
            language: "en".into(),
            authors: vec!["example.com".into()],
            description: "Articles".into(),
            source_url: Url::parse("https://example.com/").unwrap(),
        }
    }

    fn doc(index: usize) -> Document {
        Document::new(
            format!("Doc {index}"),
            Url::parse(&format!("https://example.com/{index}")).unwrap(),
            "body",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .with_sequence_index(index)
    }

    #[test]
    fn test_empty_anthology_rejected() {
        assert!(Anthology::new(meta(), vec![], Local::now()).is_err());
    }

    #[test]
    fn test_gapped_indices_rejected() {
        let result = Anthology::new(meta(), vec![doc(1), doc(3)], Local::now());
        assert!(matches!(result, Err(FolioError::Anthology(_))));
    }

    #[test]
    fn test_file_name_embeds_date() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let anthology = Anthology::new(meta(), vec![doc(1), doc(2)], at).unwrap();
        assert_eq!(anthology.file_name(), "example-collection-20240309.epub");
    }

    #[test]
    fn test_file_name_cannot_escape_output_dir() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let mut meta = meta();
        meta.identifier = "../../etc/urn:books/field notes".into();

        let anthology = Anthology::new(meta, vec![doc(1)], at).unwrap();
        let name = anthology.file_name();
        assert_eq!(name, "etcurnbooksfield-notes-20240309.epub");
        assert!(!name.contains('/'));
        assert_eq!(anthology.identifier(), "../../etc/urn:books/field notes");
        assert_eq!(anthology.documents().len(), 2);
    }
}
