//! Widget-page adapter
//!
//! All coupling to the CSE widget's DOM class vocabulary lives behind the
//! [`WidgetPage`] trait. The pagination engine only ever sees page-number
//! snapshots and extracted hrefs, which is what lets tests drive it without
//! a browser.

mod cse;

pub use cse::CseWidget;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Atomic snapshot of the widget's pagination state
///
/// Produced by a single script evaluation, so the three fields are mutually
/// consistent for the tick that observed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// 1-based page currently rendered, -1 while the marker is absent
    pub current_page: i64,
    /// Number of pagination controls the cursor is showing
    pub total_pages: u32,
    /// False exactly when the widget rendered its no-results message
    pub has_results: bool,
}

impl PageState {
    /// Current page as a real page number, `None` while indeterminate
    #[must_use]
    pub fn current(&self) -> Option<u32> {
        u32::try_from(self.current_page).ok().filter(|page| *page >= 1)
    }

    /// True once the widget has rendered either results or its no-results message
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.current().is_some() || !self.has_results
    }
}

/// One rendered search page, seen through the widget's pagination cursor
///
/// Pages are 1-based. Implementations own the selector vocabulary and keep
/// every observation atomic (one script evaluation per call).
#[async_trait]
pub trait WidgetPage {
    /// Takes one snapshot of the pagination state
    async fn page_state(&self) -> Result<PageState>;

    /// Collects the result hrefs of the currently rendered page, in document order
    async fn extract_links(&self) -> Result<Vec<String>>;

    /// Triggers the pagination control for 1-based page `page`
    ///
    /// # Errors
    /// Fails when no control for that page exists.
    async fn go_to_page(&self, page: u32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_page_is_none_while_indeterminate() {
        let state = PageState {
            current_page: -1,
            total_pages: 0,
            has_results: true,
        };
        assert_eq!(state.current(), None);
        assert!(!state.is_rendered());
    }

    #[test]
    fn current_page_rejects_zero() {
        let state = PageState {
            current_page: 0,
            total_pages: 3,
            has_results: true,
        };
        assert_eq!(state.current(), None);
    }

    #[test]
    fn rendered_results_have_a_current_page() {
        let state = PageState {
            current_page: 2,
            total_pages: 5,
            has_results: true,
        };
        assert_eq!(state.current(), Some(2));
        assert!(state.is_rendered());
    }

    #[test]
    fn no_results_counts_as_rendered() {
        let state = PageState {
            current_page: -1,
            total_pages: 0,
            has_results: false,
        };
        assert_eq!(state.current(), None);
        assert!(state.is_rendered());
    }

    #[test]
    fn snapshot_deserializes_from_widget_json() {
        let state: PageState = serde_json::from_value(serde_json::json!({
            "currentPage": 4,
            "totalPages": 10,
            "hasResults": true
        }))
        .unwrap();
        assert_eq!(state.current(), Some(4));
        assert_eq!(state.total_pages, 10);
    }
}
