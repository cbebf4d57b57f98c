//! Google CSE link indexer
//!
//! Drives a headless browser through the Google CSE widget for a given
//! engine id and query, walks every result page, and streams the result
//! URLs to standard output, one per line.

pub mod browser;
pub mod browser_setup;
pub mod engine;
pub mod output;
pub mod search;
pub mod session;
pub mod utils;
pub mod widget;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::utils::constants::{
    DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_PAGE_POLL_INTERVAL_MS, DEFAULT_SEARCH_LOAD_TIMEOUT_MS,
    DEFAULT_SEARCH_POLL_INTERVAL_MS,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub poll: PollConfig,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Tolerate invalid TLS certificates on widget requests
    #[serde(default = "default_ignore_certificate_errors")]
    pub ignore_certificate_errors: bool,
}

/// Poll tunings for the two widget waits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Budget for the widget's first render (ms)
    #[serde(default = "default_search_load_timeout_ms")]
    pub search_load_timeout_ms: u64,

    /// Interval between first-render checks (ms)
    #[serde(default = "default_search_poll_interval_ms")]
    pub search_poll_interval_ms: u64,

    /// Budget for a pagination click to take effect (ms)
    #[serde(default = "default_page_load_timeout_ms")]
    pub page_load_timeout_ms: u64,

    /// Interval between page-change checks (ms)
    #[serde(default = "default_page_poll_interval_ms")]
    pub page_poll_interval_ms: u64,
}

impl PollConfig {
    /// Poller for the widget's first render
    #[must_use]
    pub fn search_load(&self) -> Poller {
        Poller::from_millis(self.search_poll_interval_ms, self.search_load_timeout_ms)
    }

    /// Poller for page advances
    #[must_use]
    pub fn page_advance(&self) -> Poller {
        Poller::from_millis(self.page_poll_interval_ms, self.page_load_timeout_ms)
    }
}

fn default_headless() -> bool {
    true
}

fn default_disable_security() -> bool {
    false
}

fn default_ignore_certificate_errors() -> bool {
    true
}

fn default_search_load_timeout_ms() -> u64 {
    DEFAULT_SEARCH_LOAD_TIMEOUT_MS
}

fn default_search_poll_interval_ms() -> u64 {
    DEFAULT_SEARCH_POLL_INTERVAL_MS
}

fn default_page_load_timeout_ms() -> u64 {
    DEFAULT_PAGE_LOAD_TIMEOUT_MS
}

fn default_page_poll_interval_ms() -> u64 {
    DEFAULT_PAGE_POLL_INTERVAL_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser: BrowserConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            ignore_certificate_errors: default_ignore_certificate_errors(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            search_load_timeout_ms: default_search_load_timeout_ms(),
            search_poll_interval_ms: default_search_poll_interval_ms(),
            page_load_timeout_ms: default_page_load_timeout_ms(),
            page_poll_interval_ms: default_page_poll_interval_ms(),
        }
    }
}

/// Load config from config.yaml in package root
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

pub use browser::{BrowserError, BrowserResult, BrowserWrapper};
pub use engine::{EngineError, EngineResult, Outcome, PaginationEngine, Poller};
pub use output::{LinkPrinter, LinkSink};
pub use search::{SearchError, run_search};
pub use session::{SearchRequest, SearchSession, SessionError};
pub use widget::{CseWidget, PageState, WidgetPage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_tunings() {
        let config = Config::default();
        assert!(config.browser.headless);
        assert!(!config.browser.disable_security);
        assert!(config.browser.ignore_certificate_errors);
        assert_eq!(config.poll.search_load_timeout_ms, 15_000);
        assert_eq!(config.poll.search_poll_interval_ms, 100);
        assert_eq!(config.poll.page_load_timeout_ms, 10_000);
        assert_eq!(config.poll.page_poll_interval_ms, 100);
    }

    #[test]
    fn yaml_overrides_merge_with_defaults() {
        let config: Config = serde_yaml::from_str(
            "browser:\n  headless: false\npoll:\n  page_load_timeout_ms: 500\n",
        )
        .unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.poll.page_load_timeout_ms, 500);
        assert_eq!(config.poll.search_load_timeout_ms, 15_000);
    }

    #[test]
    fn empty_yaml_section_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert!(config.browser.headless);
    }
}
