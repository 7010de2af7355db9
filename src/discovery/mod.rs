//! Candidate article link discovery.
//!
//! The seed page is probed with an ordered chain of link selectors. When the
//! chain finds nothing, every anchor on the page is scanned and filtered
//! through a blocklist and a minimum link-text length.
//!
//! ```text
//! seed page → link matcher chain ─┬─ candidates
//!                                 └─ (none) → all-anchor scan → candidates
//! ```

mod config;

pub use config::DiscoveryConfig;

use std::collections::HashMap;

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use crate::app::Result;
use crate::domain::CandidateLink;
use crate::selector::{collapsed_text, Matcher, MatcherChain};

pub struct LinkDiscoverer {
    config: DiscoveryConfig,
    chain: MatcherChain,
    anchors: Matcher,
}

impl LinkDiscoverer {
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let chain = MatcherChain::parse(&config.link_selectors)?;
        let anchors = Matcher::parse("a[href]")?;

        Ok(Self {
            config,
            chain,
            anchors,
        })
    }

    /// Collect candidate article links from a parsed page.
    pub fn discover(&self, page: &Html, base: &Url) -> Vec<CandidateLink> {
        let mut found = CandidateSet::new(base, self.config.max_links);

        for matcher in self.chain.iter() {
            if found.is_full() {
                break;
            }

            let before = found.len();
            for anchor in matcher.select_all(page) {
                if found.is_full() {
                    break;
                }
                if let Some(url) = self.resolve_structural(anchor, base) {
                    found.insert(url, anchor_hint(anchor));
                }
            }

            let added = found.len() - before;
            if added > 0 {
                debug!("Link selector {} yielded {} candidates", matcher.name(), added);
                if self.config.stop_at_first_match {
                    break;
                }
            }
        }

        if found.is_empty() {
            debug!("No structural link matches on {}, scanning all anchors", base);
            for anchor in self.anchors.select_all(page) {
                if found.is_full() {
                    break;
                }
                if let Some(url) = self.resolve_fallback(anchor, base) {
                    found.insert(url, anchor_hint(anchor));
                }
            }
        }

        found.into_links()
    }

    fn resolve_structural(&self, anchor: ElementRef<'_>, base: &Url) -> Option<Url> {
        let href = anchor.value().attr("href")?.trim();
        if self.has_blocked_scheme(href) {
            return None;
        }

        let mut url = base.join(href).ok()?;
        url.set_fragment(None);

        (is_http(&url) && !self.has_blocked_extension(&url)).then_some(url)
    }

    fn resolve_fallback(&self, anchor: ElementRef<'_>, base: &Url) -> Option<Url> {
        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() || href.contains('#') || self.has_blocked_scheme(href) {
            return None;
        }

        let text_chars = collapsed_text(anchor).chars().count();
        if text_chars < self.config.min_link_text_chars {
            return None;
        }

        let url = base.join(href).ok()?;
        let same_site = url.host_str() == base.host_str();

        (is_http(&url) && same_site && !self.has_blocked_extension(&url)).then_some(url)
    }

    fn has_blocked_scheme(&self, href: &str) -> bool {
        let href = href.to_ascii_lowercase();
        self.config
            .blocked_schemes
            .iter()
            .any(|scheme| href.starts_with(scheme.as_str()))
    }

    fn has_blocked_extension(&self, url: &Url) -> bool {
        let path = url.path().to_ascii_lowercase();
        self.config
            .blocked_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn anchor_hint(anchor: ElementRef<'_>) -> Option<String> {
    Some(collapsed_text(anchor)).filter(|text| !text.is_empty())
}

/// Insertion-ordered, URL-unique, capped candidate collection.
struct CandidateSet<'a> {
    seed: &'a Url,
    cap: usize,
    links: Vec<CandidateLink>,
    positions: HashMap<Url, usize>,
}

impl<'a> CandidateSet<'a> {
    fn new(seed: &'a Url, cap: usize) -> Self {
        Self {
            seed,
            cap,
            links: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn insert(&mut self, url: Url, title_hint: Option<String>) {
        if url == *self.seed {
            return;
        }

        if let Some(&position) = self.positions.get(&url) {
            let existing = &mut self.links[position];
            if existing.title_hint.is_none() {
                existing.title_hint = title_hint;
            }
            return;
        }

        if self.is_full() {
            return;
        }

        self.positions.insert(url.clone(), self.links.len());
        self.links.push(CandidateLink::new(url, title_hint));
    }

    fn len(&self) -> usize {
        self.links.len()
    }

    fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn is_full(&self) -> bool {
        self.links.len() >= self.cap
    }

    fn into_links(self) -> Vec<CandidateLink> {
        self.links
    }
}
