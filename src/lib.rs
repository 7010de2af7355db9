//! # Folio
//!
//! Turns a blog or documentation site into a reading collection: one
//! Markdown file per article plus a single EPUB anthology.
//!
//! ## Architecture
//!
//! Folio follows a sequential pipeline:
//!
//! ```text
//! Fetcher → LinkDiscoverer → ContentExtractor → Normalizer → DocumentAggregator → output
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Write the default configuration
//! folio init-config
//!
//! # Crawl a listing page
//! folio crawl https://blog.example.com/ --out ./book
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`crawler`]: The crawl loop
//! - [`discovery`]: Candidate link discovery
//! - [`extractor`]: Main-content extraction
//! - [`normalizer`]: HTML to Markdown conversion and cleanup
//! - [`aggregator`]: Document ordering, flat files and EPUB packaging
//! - [`output`]: Writing artifacts to disk

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the
/// configuration, the fetcher and the crawler.
pub mod app;

/// Configuration management.
///
/// Loads from `~/.config/folio/config.toml`, one section per pipeline stage.
pub mod config;

/// Command-line interface using clap.
///
/// - `crawl <url>` - Crawl a listing page and write the collection
/// - `init-config` - Write the default configuration file
pub mod cli;

/// Sequential crawl loop driving every other stage.
pub mod crawler;

/// Candidate article link discovery on the seed page.
pub mod discovery;

/// Core domain models.
///
/// - [`CandidateLink`](domain::CandidateLink): A link worth fetching
/// - [`Document`](domain::Document): One accepted article
/// - [`Anthology`](domain::Anthology): The ordered collection with book metadata
pub mod domain;

/// Main-content extraction with noise removal.
pub mod extractor;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for page fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// HTML to Markdown rendering and text cleanup.
pub mod normalizer;

/// Document aggregation, flat documents and EPUB packaging.
pub mod aggregator;

/// Writing flat documents and the EPUB to disk.
pub mod output;

/// Named CSS selector chains.
pub mod selector;
