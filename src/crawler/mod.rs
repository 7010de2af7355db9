//! Sequential crawl loop.
//!
//! ```text
//! seed → Fetcher → LinkDiscoverer → for each candidate:
//!     sleep → Fetcher → ContentExtractor → Normalizer → DocumentAggregator
//! ```
//!
//! Candidates are processed one at a time. A failure on one candidate is
//! logged and recorded in the [`CrawlReport`]; only an unreachable seed page
//! ends the run.

mod config;

pub use config::CrawlConfig;

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use scraper::Html;
use tracing::{debug, info, warn};
use url::Url;

use crate::aggregator::DocumentAggregator;
use crate::app::{FolioError, Result};
use crate::discovery::LinkDiscoverer;
use crate::domain::{BookMeta, CandidateLink, Document};
use crate::extractor::ContentExtractor;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Transport,
    Extraction,
    Validation,
    Other,
}

impl From<&FolioError> for SkipReason {
    fn from(err: &FolioError) -> Self {
        if !err.is_candidate_local() {
            return Self::Other;
        }
        match err {
            FolioError::Http(_) | FolioError::Status { .. } => Self::Transport,
            FolioError::Extraction(_) => Self::Extraction,
            FolioError::Validation { .. } => Self::Validation,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::Extraction => "extraction",
            Self::Validation => "too short",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct SkippedCandidate {
    pub url: Url,
    pub reason: SkipReason,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub seed: Url,
    pub discovered: usize,
    pub accepted: usize,
    pub skipped: Vec<SkippedCandidate>,
}

impl CrawlReport {
    fn new(seed: Url, discovered: usize) -> Self {
        Self {
            seed,
            discovered,
            accepted: 0,
            skipped: Vec::new(),
        }
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// Result of a completed crawl: the filled aggregator and what happened.
pub struct CrawlRun {
    pub aggregator: DocumentAggregator,
    pub report: CrawlReport,
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    config: CrawlConfig,
    discoverer: LinkDiscoverer,
    extractor: ContentExtractor,
    normalizer: Normalizer,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        config: CrawlConfig,
        discoverer: LinkDiscoverer,
        extractor: ContentExtractor,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            fetcher,
            config,
            discoverer,
            extractor,
            normalizer,
        }
    }

    pub async fn run(&self, seed: &Url, meta: BookMeta) -> Result<CrawlRun> {
        info!("Fetching article list from {}", seed);

        let response = self
            .fetcher
            .fetch(seed, self.config.timeout())
            .await
            .map_err(|e| FolioError::SeedUnreachable {
                url: seed.to_string(),
                reason: e.to_string(),
            })?;
        log_redirect(seed, &response.final_url);

        let candidates = self.discover(&response.text(), &response.final_url);
        info!("Found {} candidate article links", candidates.len());

        let mut aggregator = DocumentAggregator::new(meta, self.normalizer.min_body_chars());
        let mut report = CrawlReport::new(seed.clone(), candidates.len());

        for candidate in candidates {
            tokio::time::sleep(self.config.delay()).await;

            let outcome = self
                .process_candidate(&candidate)
                .await
                .and_then(|doc| aggregator.accept(doc));

            match outcome {
                Ok(index) => {
                    info!("Accepted #{} {}", index, candidate.url);
                    report.accepted += 1;
                }
                Err(e) => {
                    let reason = SkipReason::from(&e);
                    if reason == SkipReason::Validation {
                        info!("Skipping {}: {}", candidate.url, e);
                    } else {
                        warn!("Skipping {}: {}", candidate.url, e);
                    }
                    report.skipped.push(SkippedCandidate {
                        url: candidate.url,
                        reason,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Crawl finished: {} accepted, {} skipped",
            report.accepted,
            report.skipped.len()
        );

        Ok(CrawlRun { aggregator, report })
    }

    fn discover(&self, html: &str, base: &Url) -> Vec<CandidateLink> {
        let page = Html::parse_document(html);
        self.discoverer.discover(&page, base)
    }

    async fn process_candidate(&self, candidate: &CandidateLink) -> Result<Document> {
        info!("Crawling {}", candidate.url);

        let response = self
            .fetcher
            .fetch(&candidate.url, self.config.timeout())
            .await?;
        log_redirect(&candidate.url, &response.final_url);

        self.build_document(
            &response.text(),
            &candidate.url,
            &response.final_url,
            candidate.title_hint.as_deref(),
        )
    }

    /// Extract and normalize one fetched page into a document.
    ///
    /// `source` is recorded on the document; relative links resolve against `effective`.
    pub fn build_document(
        &self,
        html: &str,
        source: &Url,
        effective: &Url,
        title_hint: Option<&str>,
    ) -> Result<Document> {
        let mut page = Html::parse_document(html);
        let title = self.extractor.resolve_title(&page, source, title_hint);

        let region = self.extractor.extract(&mut page)?;
        debug!("{}: content region from {}", source, region.matched);

        let body = self.normalizer.normalize(&region, Some(effective))?;

        Ok(Document::new(title, source.clone(), body, Local::now().date_naive()))
    }
}

fn log_redirect(requested: &Url, effective: &Url) {
    if requested != effective {
        info!("{} redirected to {}", requested, effective);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::time::Instant;

    use async_trait::async_trait;

    use crate::aggregator::BookConfig;
    use crate::discovery::DiscoveryConfig;
    use crate::extractor::ExtractorConfig;
    use crate::fetcher::FetchResponse;

    const SEED: &str = "https://site.example/";

    #[derive(Default)]
    struct StaticFetcher {
        pages: HashMap<String, String>,
        redirects: HashMap<String, String>,
    }

    impl StaticFetcher {
        fn page(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }

        fn redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<FetchResponse> {
            let target = self
                .redirects
                .get(url.as_str())
                .cloned()
                .unwrap_or_else(|| url.to_string());

            match self.pages.get(&target) {
                Some(html) => Ok(FetchResponse {
                    status: 200,
                    headers: vec![("content-type".into(), "text/html".into())],
                    final_url: Url::parse(&target)?,
                    body: html.clone().into_bytes(),
                }),
                None => Err(FolioError::Status {
                    url: target,
                    status: 404,
                }),
            }
        }
    }

    /// Records the clock reading of every fetch.
    struct TimedFetcher {
        inner: StaticFetcher,
        calls: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl Fetcher for TimedFetcher {
        async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(Instant::now());
            }
            self.inner.fetch(url, timeout).await
        }
    }

    fn crawler(fetcher: StaticFetcher) -> Crawler {
        crawler_with_delay(Arc::new(fetcher), 0)
    }

    fn crawler_with_delay(fetcher: Arc<dyn Fetcher + Send + Sync>, delay_ms: u64) -> Crawler {
        let config = CrawlConfig {
            delay_ms,
            ..Default::default()
        };
        Crawler::new(
            fetcher,
            config,
            LinkDiscoverer::new(DiscoveryConfig::default()).unwrap(),
            ContentExtractor::new(ExtractorConfig::default()).unwrap(),
            Normalizer::default(),
        )
    }

    fn meta() -> BookMeta {
        BookConfig::default().resolve(&Url::parse(SEED).unwrap())
    }

    fn article(heading: &str, text_len: usize) -> String {
        format!(
            "<html><head><title>{heading}</title></head><body><nav>Home About</nav>\
             <div class=\"entry-content\"><p>{}</p></div><footer>Footer</footer></body></html>",
            "a".repeat(text_len)
        )
    }

    #[tokio::test]
    async fn test_fallback_discovery_end_to_end() {
        let seed_html = r#"<html><body>
            <a href="/sixsix">Sixchr</a>
            <a href="/four">Four</a>
            <a href="/twenty">Twenty characters!!!</a>
        </body></html>"#;

        let fetcher = StaticFetcher::default()
            .page(SEED, seed_html)
            .page("https://site.example/sixsix", article("Six", 150))
            .page("https://site.example/four", article("Four", 150))
            .page("https://site.example/twenty", article("Twenty", 150));

        let run = crawler(fetcher)
            .run(&Url::parse(SEED).unwrap(), meta())
            .await
            .unwrap();

        assert_eq!(run.report.discovered, 2);
        assert_eq!(run.report.accepted, 2);

        let docs = run.aggregator.documents();
        let indices: Vec<_> = docs.iter().map(Document::sequence_index).collect();
        assert_eq!(indices, vec![1, 2]);
        // Anchor text is the title hint
        assert_eq!(docs[0].title(), "Sixchr");
        assert_eq!(docs[1].title(), "Twenty characters!!!");
        assert!(!docs[0].body().contains("Home About"));

        let flat = run.aggregator.emit_flat_documents();
        assert_eq!(flat.len(), 2);
        assert!(flat[0].file_name.starts_with("001-"));
        assert!(flat[1].file_name.starts_with("002-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_precedes_every_candidate_fetch() {
        let seed_html = r#"<body>
            <a href="/posts/one">First post</a>
            <a href="/posts/two">Second post</a>
        </body>"#;

        let fetcher = Arc::new(TimedFetcher {
            inner: StaticFetcher::default()
                .page(SEED, seed_html)
                .page("https://site.example/posts/one", article("One", 150))
                .page("https://site.example/posts/two", article("Two", 150)),
            calls: Mutex::new(Vec::new()),
        });

        let started = Instant::now();
        let run = crawler_with_delay(fetcher.clone(), 1500)
            .run(&Url::parse(SEED).unwrap(), meta())
            .await
            .unwrap();
        assert_eq!(run.report.accepted, 2);

        let calls = fetcher.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 3);
        // The seed fetch is not delayed
        assert_eq!(calls[0] - started, Duration::ZERO);
        assert!(calls[1] - calls[0] >= Duration::from_millis(1500));
        assert!(calls[2] - calls[1] >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_short_content_is_rejected() {
        let seed_html = r#"<body>
            <a href="/posts/short">Short post</a>
            <a href="/posts/long">Long post</a>
        </body>"#;

        let fetcher = StaticFetcher::default()
            .page(SEED, seed_html)
            .page("https://site.example/posts/short", article("Short", 80))
            .page("https://site.example/posts/long", article("Long", 200));

        let run = crawler(fetcher)
            .run(&Url::parse(SEED).unwrap(), meta())
            .await
            .unwrap();

        assert_eq!(run.aggregator.len(), 1);
        assert_eq!(run.aggregator.documents()[0].sequence_index(), 1);
        assert_eq!(run.report.skipped_for(SkipReason::Validation), 1);
        assert_eq!(
            run.report.skipped[0].url.as_str(),
            "https://site.example/posts/short"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_skips_candidate() {
        let seed_html = r#"<body>
            <a href="/posts/missing">Missing post</a>
            <a href="/posts/present">Present post</a>
        </body>"#;

        let fetcher = StaticFetcher::default()
            .page(SEED, seed_html)
            .page("https://site.example/posts/present", article("Present", 150));

        let run = crawler(fetcher)
            .run(&Url::parse(SEED).unwrap(), meta())
            .await
            .unwrap();

        assert_eq!(run.aggregator.len(), 1);
        assert_eq!(run.report.skipped_for(SkipReason::Transport), 1);
    }

    #[tokio::test]
    async fn test_unreachable_seed_ends_run() {
        let result = crawler(StaticFetcher::default())
            .run(&Url::parse(SEED).unwrap(), meta())
            .await;

        assert!(matches!(result, Err(FolioError::SeedUnreachable { .. })));
    }

    #[tokio::test]
    async fn test_no_candidates_still_emits_placeholder() {
        let fetcher = StaticFetcher::default().page(SEED, "<html><body><p>Nothing</p></body></html>");

        let run = crawler(fetcher)
            .run(&Url::parse(SEED).unwrap(), meta())
            .await
            .unwrap();

        assert_eq!(run.report.discovered, 0);
        assert!(run.aggregator.is_empty());
        let anthology = run.aggregator.emit_anthology().unwrap();
        assert_eq!(anthology.documents().len(), 1);
    }

    #[tokio::test]
    async fn test_redirected_page_resolves_links_against_effective_url() {
        let seed_html = r#"<body><a href="/posts/old">Moved post</a></body>"#;
        let page = format!(
            "<html><body><article><p>{} <a href=\"next\">next part</a></p></article></body></html>",
            "b".repeat(120)
        );

        let fetcher = StaticFetcher::default()
            .page(SEED, seed_html)
            .redirect("https://site.example/posts/old", "https://site.example/archive/new")
            .page("https://site.example/archive/new", page);

        let run = crawler(fetcher)
            .run(&Url::parse(SEED).unwrap(), meta())
            .await
            .unwrap();

        let doc = &run.aggregator.documents()[0];
        assert_eq!(doc.source_url().as_str(), "https://site.example/posts/old");
        assert!(doc.body().contains("[next part](https://site.example/archive/next)"));
    }

    #[test]
    fn test_empty_page_fails_length_gate_not_extraction() {
        let crawler = crawler(StaticFetcher::default());
        let url = Url::parse("https://site.example/posts/empty").unwrap();

        let err = crawler.build_document("", &url, &url, None).unwrap_err();
        assert_eq!(SkipReason::from(&err), SkipReason::Validation);
    }

    #[test]
    fn test_build_document_without_hint_uses_page_title() {
        let crawler = crawler(StaticFetcher::default());
        let url = Url::parse("https://site.example/posts/x").unwrap();
        let doc = crawler
            .build_document(&article("Page Title", 150), &url, &url, None)
            .unwrap();
        assert_eq!(doc.title(), "Page Title");
        assert_eq!(doc.body(), "a".repeat(150));
    }
}
