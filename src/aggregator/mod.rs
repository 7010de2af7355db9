//! Document aggregation and emission.
//!
//! The aggregator owns every accepted [`Document`] in acceptance order and
//! assigns each its 1-based sequence index. It emits two artifacts:
//!
//! - flat Markdown documents, one per article ([`FlatDocument`])
//! - an [`Anthology`], packaged as EPUB by [`epub::package`]
//!
//! A run that accepted nothing still emits one placeholder document.

mod config;
pub mod epub;
pub mod flat;

pub use config::BookConfig;
pub use flat::{slugify, FlatDocument};

use std::borrow::Cow;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::app::{FolioError, Result};
use crate::domain::{Anthology, BookMeta, Document};

pub const PLACEHOLDER_TITLE: &str = "No content retrieved";

const PLACEHOLDER_BODY: &str = "No article content could be retrieved from this site.\n\n\
Likely causes:\n\n\
- the pages are rendered with JavaScript, which is not executed\n\
- the site blocks automated requests or rate-limits them\n\
- the site structure changed and no article links or content regions were recognised\n\
- the network or the site was unavailable during the run\n\n\
Check the site in a browser and adjust the link and content selectors in the configuration.";

pub struct DocumentAggregator {
    meta: BookMeta,
    min_body_chars: usize,
    documents: Vec<Document>,
}

impl DocumentAggregator {
    pub fn new(meta: BookMeta, min_body_chars: usize) -> Self {
        Self {
            meta,
            min_body_chars,
            documents: Vec::new(),
        }
    }

    pub fn meta(&self) -> &BookMeta {
        &self.meta
    }

    /// Accept a document, returning its assigned sequence index.
    pub fn accept(&mut self, document: Document) -> Result<usize> {
        let chars = document.body_chars();
        if chars < self.min_body_chars {
            return Err(FolioError::Validation {
                chars,
                minimum: self.min_body_chars,
            });
        }

        let index = self.documents.len() + 1;
        debug!("Accepted document {} as #{}", document.source_url(), index);
        self.documents.push(document.with_sequence_index(index));
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn emit_flat_documents(&self) -> Vec<FlatDocument> {
        self.documents_or_placeholder()
            .iter()
            .map(FlatDocument::from_document)
            .collect()
    }

    pub fn emit_anthology(&self) -> Result<Anthology> {
        self.emit_anthology_at(Local::now())
    }

    pub fn emit_anthology_at(&self, generated_at: DateTime<Local>) -> Result<Anthology> {
        let documents = self.documents_or_placeholder().into_owned();
        Anthology::new(self.meta.clone(), documents, generated_at)
    }

    fn documents_or_placeholder(&self) -> Cow<'_, [Document]> {
        if self.documents.is_empty() {
            Cow::Owned(vec![self.placeholder()])
        } else {
            Cow::Borrowed(&self.documents)
        }
    }

    fn placeholder(&self) -> Document {
        Document::new(
            PLACEHOLDER_TITLE,
            self.meta.source_url.clone(),
            PLACEHOLDER_BODY,
            Local::now().date_naive(),
        )
        .with_sequence_index(1)
    }
}
