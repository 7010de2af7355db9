use std::path::{Path, PathBuf};

use tracing::error;
use url::Url;

use crate::app::{AppContext, FolioError, Result};
use crate::config::Config;
use crate::crawler::CrawlReport;
use crate::output::{write_anthology, write_flat_documents};

pub async fn crawl(ctx: &AppContext, url: &str) -> Result<()> {
    let seed = Url::parse(url)?;
    let meta = ctx.config.book.resolve(&seed);
    let crawler = ctx.crawler()?;

    let run = match crawler.run(&seed, meta).await {
        Ok(run) => run,
        Err(e @ FolioError::SeedUnreachable { .. }) => {
            println!("Could not fetch {}", seed);
            println!("No articles were collected and nothing was written.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    println!("Book: {}", run.aggregator.meta().title);
    print_report(&run.report);
    if run.aggregator.is_empty() {
        println!("No article passed extraction; writing a placeholder document instead.");
    }

    let output = &ctx.config.output;
    let mut failures = Vec::new();

    if output.flat {
        let dir = output.articles_path();
        match write_flat_documents(&dir, &run.aggregator.emit_flat_documents()) {
            Ok(paths) => println!("Wrote {} Markdown files to {}", paths.len(), dir.display()),
            Err(e) => {
                error!("Failed to write Markdown files: {}", e);
                failures.push(e);
            }
        }
    }

    if output.epub {
        let written = run
            .aggregator
            .emit_anthology()
            .and_then(|anthology| write_anthology(&output.dir, &anthology));
        match written {
            Ok(path) => println!("Wrote EPUB {}", path.display()),
            Err(e) => {
                error!("Failed to write EPUB: {}", e);
                failures.push(e);
            }
        }
    }

    failures.into_iter().next().map_or(Ok(()), Err)
}

fn print_report(report: &CrawlReport) {
    println!("Seed: {}", report.seed);
    println!("Candidate links: {}", report.discovered);
    println!("Accepted: {}", report.accepted);

    if !report.skipped.is_empty() {
        println!("Skipped: {}", report.skipped.len());
        for skipped in &report.skipped {
            println!("  [{}] {}", skipped.reason, skipped.url);
        }
    }
}

/// Write the commented default configuration and return its path.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path().map_err(|e| FolioError::Config(e.to_string()))?,
    };

    if path.exists() && !force {
        println!("Config already exists: {} (use --force to overwrite)", path.display());
        return Ok(path);
    }

    Config::write_default_config(&path).map_err(|e| FolioError::Config(e.to_string()))?;
    println!("Wrote default config to {}", path.display());
    Ok(path)
}
