use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the crawl loop and HTTP transport
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Pause between consecutive fetches in milliseconds (default: 1000)
    pub delay_ms: u64,

    /// Per-request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User agent string sent with every request
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl CrawlConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the pause between fetches as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CrawlConfig::default();
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_durations() {
        let config = CrawlConfig {
            delay_ms: 1500,
            timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.delay(), Duration::from_millis(1500));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
