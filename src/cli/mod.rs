pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Crawl a site's article list into Markdown files and an EPUB", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl a seed page and the articles it links to
    Crawl(CrawlArgs),
    /// Write the default configuration file
    InitConfig {
        /// Config file path (default: ~/.config/folio/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct CrawlArgs {
    /// URL of the page listing the articles
    pub url: String,

    /// Config file path (default: ~/.config/folio/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Maximum number of article links to follow
    #[arg(long)]
    pub max_links: Option<usize>,

    /// Pause between fetches in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Book title
    #[arg(long)]
    pub title: Option<String>,

    /// Book language tag
    #[arg(long)]
    pub language: Option<String>,

    /// Book author, repeatable
    #[arg(long = "author")]
    pub authors: Vec<String>,

    /// Skip the flat Markdown files
    #[arg(long)]
    pub no_flat: bool,

    /// Skip the EPUB
    #[arg(long)]
    pub no_epub: bool,
}

impl CrawlArgs {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(out) = &self.out {
            config.output.dir = out.clone();
        }
        if let Some(max_links) = self.max_links {
            config.discovery.max_links = max_links;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.crawl.delay_ms = delay_ms;
        }
        if let Some(title) = &self.title {
            config.book.title = Some(title.clone());
        }
        if let Some(language) = &self.language {
            config.book.language = Some(language.clone());
        }
        if !self.authors.is_empty() {
            config.book.authors = self.authors.clone();
        }
        if self.no_flat {
            config.output.flat = false;
        }
        if self.no_epub {
            config.output.epub = false;
        }
    }
}
