//! Ordered chains of named CSS matchers.
//!
//! Both link discovery and content extraction walk a fixed-priority list of
//! selectors, most specific first. A [`MatcherChain`] keeps the parsed
//! selectors together with their source text so callers can report which
//! heuristic produced a result.

use scraper::{ElementRef, Html, Selector};

use crate::app::{FolioError, Result};

/// A single named selector in a priority chain.
#[derive(Debug, Clone)]
pub struct Matcher {
    name: String,
    selector: Selector,
}

impl Matcher {
    pub fn parse(css: &str) -> Result<Self> {
        let selector = Selector::parse(css).map_err(|e| FolioError::Selector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: css.to_string(),
            selector,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select_all<'a>(&self, html: &'a Html) -> Vec<ElementRef<'a>> {
        html.select(&self.selector).collect()
    }

    pub fn select_first<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        html.select(&self.selector).next()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatcherChain {
    matchers: Vec<Matcher>,
}

impl MatcherChain {
    pub fn parse<S: AsRef<str>>(selectors: &[S]) -> Result<Self> {
        let matchers = selectors
            .iter()
            .map(|s| Matcher::parse(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matcher> {
        self.matchers.iter()
    }

    /// Return the first matcher for which `probe` yields a value, with that value.
    pub fn first_match<'m, T>(
        &'m self,
        mut probe: impl FnMut(&'m Matcher) -> Option<T>,
    ) -> Option<(&'m Matcher, T)> {
        self.matchers
            .iter()
            .find_map(|matcher| probe(matcher).map(|value| (matcher, value)))
    }
}

/// Concatenated text of an element with whitespace runs collapsed to single spaces.
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
