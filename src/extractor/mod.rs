//! Main-content extraction from parsed article pages.
//!
//! Extraction runs in two independent chains over the same page:
//!
//! - **title**: hint → title selectors → URL-derived fallback
//! - **region**: noise removal → content selectors → `body`
//!
//! Noise removal mutates the whole page once, before any region is
//! selected, so later stages never see scripts, navigation or comments.
//!
//! `Html::parse_document` always builds a `body`, so a fetched page never
//! fails with [`FolioError::Extraction`]. A page with no usable content
//! falls back to its body and is then rejected by the length gate. Only
//! fragments without a `body` reach the extraction error.

mod config;

pub use config::ExtractorConfig;

use std::fmt;

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use crate::app::{FolioError, Result};
use crate::domain::untitled_from_url;
use crate::selector::{collapsed_text, Matcher, MatcherChain};

/// Which heuristic selected an extracted region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionMatch {
    /// A configured content selector matched
    Selector(String),
    /// No selector matched; the whole body is used
    BodyFallback,
}

impl fmt::Display for RegionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(name) => write!(f, "selector {}", name),
            Self::BodyFallback => write!(f, "body fallback"),
        }
    }
}

/// The subtree judged to be a page's main content
#[derive(Debug, Clone)]
pub struct ExtractedRegion<'a> {
    pub element: ElementRef<'a>,
    pub matched: RegionMatch,
}

/// Content extractor for locating article content in HTML pages
pub struct ContentExtractor {
    content: MatcherChain,
    titles: MatcherChain,
    noise: MatcherChain,
    body: Matcher,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        Ok(Self {
            content: MatcherChain::parse(&config.content_selectors)?,
            titles: MatcherChain::parse(&config.title_selectors)?,
            noise: MatcherChain::parse(&config.remove_selectors)?,
            body: Matcher::parse("body")?,
        })
    }

    /// Resolve the document title. A non-blank hint wins over anything on the page.
    pub fn resolve_title(&self, page: &Html, url: &Url, hint: Option<&str>) -> String {
        hint_title(hint)
            .or_else(|| self.page_title(page))
            .unwrap_or_else(|| untitled_from_url(url))
    }

    fn page_title(&self, page: &Html) -> Option<String> {
        self.titles
            .first_match(|m| {
                m.select_first(page)
                    .map(collapsed_text)
                    .filter(|text| !text.is_empty())
            })
            .map(|(_, title)| title)
    }

    /// Detach every noise element from the page. Returns the number removed.
    pub fn strip_noise(&self, page: &mut Html) -> usize {
        let snapshot: &Html = page;
        let ids: Vec<_> = self
            .noise
            .iter()
            .flat_map(|m| m.select_all(snapshot))
            .map(|element| element.id())
            .collect();

        for id in &ids {
            if let Some(mut node) = page.tree.get_mut(*id) {
                node.detach();
            }
        }

        ids.len()
    }

    /// Strip noise and select the main content region.
    pub fn extract<'a>(&self, page: &'a mut Html) -> Result<ExtractedRegion<'a>> {
        let removed = self.strip_noise(page);
        let page: &'a Html = page;
        debug!("Removed {} noise elements", removed);

        let selected = self
            .content
            .first_match(|m| m.select_first(page).filter(|el| has_text(*el)));

        if let Some((matcher, element)) = selected {
            debug!("Content region matched {}", matcher.name());
            return Ok(ExtractedRegion {
                element,
                matched: RegionMatch::Selector(matcher.name().to_string()),
            });
        }

        self.body
            .select_first(page)
            .map(|element| ExtractedRegion {
                element,
                matched: RegionMatch::BodyFallback,
            })
            .ok_or_else(|| FolioError::Extraction("page has no body element".into()))
    }
}

fn hint_title(hint: Option<&str>) -> Option<String> {
    hint.map(|h| h.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|h| !h.is_empty())
}

fn has_text(element: ElementRef<'_>) -> bool {
    element.text().any(|t| !t.trim().is_empty())
}
