use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::crawler::Crawler;
use crate::discovery::LinkDiscoverer;
use crate::extractor::ContentExtractor;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.crawl)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { config, fetcher }
    }

    /// Build a crawler from the current configuration.
    ///
    /// Fails if any configured selector does not parse.
    pub fn crawler(&self) -> Result<Crawler> {
        Ok(Crawler::new(
            self.fetcher.clone(),
            self.config.crawl.clone(),
            LinkDiscoverer::new(self.config.discovery.clone())?,
            ContentExtractor::new(self.config.extractor.clone())?,
            Normalizer::new(self.config.normalizer.clone()),
        ))
    }
}
