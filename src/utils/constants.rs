//! Shared configuration constants
//!
//! Default values used throughout the codebase to ensure consistency and
//! avoid magic numbers. The poll tunings can be overridden via `config.yaml`.

/// Chrome user agent string sent by the launched browser
///
/// The CSE backend serves its standard markup to mainstream Chrome versions;
/// the default HeadlessChrome token can get degraded markup.
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Origin the synthesized search document is served from
///
/// The widget reads its query from `location.search`, so the document must
/// live at a real http URL carrying `?q=`. Requests to this origin never
/// reach the network; they are fulfilled from memory via CDP interception.
pub const SYNTHETIC_ORIGIN: &str = "http://localhost/";

/// Script URL that bootstraps the CSE widget, completed by the engine id
pub const CSE_BOOTSTRAP_URL: &str = "https://cse.google.com/cse.js?cx=";

/// How long to wait for the widget to render the first result page (ms)
pub const DEFAULT_SEARCH_LOAD_TIMEOUT_MS: u64 = 15_000;

/// Poll interval while waiting for the first result page (ms)
pub const DEFAULT_SEARCH_POLL_INTERVAL_MS: u64 = 100;

/// How long to wait for the page number to change after a pagination click (ms)
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 10_000;

/// Poll interval while waiting for a pagination click to take effect (ms)
pub const DEFAULT_PAGE_POLL_INTERVAL_MS: u64 = 100;
