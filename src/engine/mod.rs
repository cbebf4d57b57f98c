//! Pagination engine
//!
//! An explicit state machine that walks the widget's result pages in
//! ascending order, streaming extracted links into a sink. It sees the page
//! only through [`WidgetPage`] snapshots and never touches a selector, so
//! the whole walk is testable without a browser.
//!
//! The walk: wait for the widget to render, then repeatedly extract the
//! current page, trigger the control for the next page and wait for the
//! page number to change. A page is extracted at most once because
//! extraction only runs on the initial load and after an observed
//! page-number change.

pub mod poll;

pub use poll::Poller;

use crate::output::LinkSink;
use crate::utils::constants::{
    DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_PAGE_POLL_INTERVAL_MS, DEFAULT_SEARCH_LOAD_TIMEOUT_MS,
    DEFAULT_SEARCH_POLL_INTERVAL_MS,
};
use crate::widget::{PageState, WidgetPage};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal pagination failures
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("search results did not render within {budget_ms}ms")]
    SearchLoadTimeout { budget_ms: u64 },

    #[error("page {page} did not render within {budget_ms}ms of the pagination click")]
    PageAdvanceTimeout { page: u32, budget_ms: u64 },

    #[error("widget evaluation failed: {0}")]
    Widget(#[source] anyhow::Error),

    #[error("link emission failed: {0}")]
    Emit(#[source] anyhow::Error),
}

/// Successful terminal outcomes of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every result page was visited and extracted
    PagesExhausted { pages: u32 },
    /// The widget rendered its no-results message; zero links, still success
    NoResults,
}

/// What the initial wait observed once the widget rendered
enum Loaded {
    Results { current: u32, total: u32 },
    Empty,
}

/// Classifies a snapshot for the initial wait
///
/// `None` keeps polling. The no-results message satisfies the wait just
/// like a rendered cursor does; an empty result set is an answer, not a
/// timeout.
fn classify_load(state: &PageState) -> Option<Loaded> {
    if !state.has_results {
        return Some(Loaded::Empty);
    }
    state.current().map(|current| Loaded::Results {
        current,
        total: state.total_pages,
    })
}

/// Drives one widget through all of its result pages
pub struct PaginationEngine<W> {
    widget: W,
    search_load: Poller,
    page_advance: Poller,
}

impl<W: WidgetPage> PaginationEngine<W> {
    /// Engine with the default poll tunings
    #[must_use]
    pub fn new(widget: W) -> Self {
        Self::with_tuning(
            widget,
            Poller::from_millis(DEFAULT_SEARCH_POLL_INTERVAL_MS, DEFAULT_SEARCH_LOAD_TIMEOUT_MS),
            Poller::from_millis(DEFAULT_PAGE_POLL_INTERVAL_MS, DEFAULT_PAGE_LOAD_TIMEOUT_MS),
        )
    }

    #[must_use]
    pub fn with_tuning(widget: W, search_load: Poller, page_advance: Poller) -> Self {
        Self {
            widget,
            search_load,
            page_advance,
        }
    }

    /// Walks every result page, streaming hrefs into `sink`
    ///
    /// # Errors
    /// * [`EngineError::SearchLoadTimeout`] - The widget never rendered
    /// * [`EngineError::PageAdvanceTimeout`] - A pagination click never took effect
    /// * [`EngineError::Widget`] / [`EngineError::Emit`] - Evaluation or output failure
    pub async fn run<S: LinkSink>(&self, sink: &mut S) -> EngineResult<Outcome> {
        let loaded = self
            .search_load
            .run(|| async move {
                let state = self.widget.page_state().await.map_err(EngineError::Widget)?;
                Ok(classify_load(&state))
            })
            .await?
            .ok_or(EngineError::SearchLoadTimeout {
                budget_ms: self.search_load.budget().as_millis() as u64,
            })?;

        let (mut current, mut total) = match loaded {
            Loaded::Empty => {
                tracing::info!("widget rendered no results for this query");
                return Ok(Outcome::NoResults);
            }
            Loaded::Results { current, total } => (current, total),
        };
        tracing::info!(current, total, "search results rendered");

        let mut pages_visited = 0u32;
        loop {
            // A cursor past the last page means every page is consumed.
            if current > total {
                tracing::debug!(current, total, "cursor past the last page");
                break;
            }

            let links = self
                .widget
                .extract_links()
                .await
                .map_err(EngineError::Widget)?;
            tracing::debug!(page = current, links = links.len(), "extracted result page");
            for href in &links {
                sink.emit(href).map_err(EngineError::Emit)?;
            }
            pages_visited += 1;

            let next = current + 1;
            if next > total {
                break;
            }

            self.widget
                .go_to_page(next)
                .await
                .map_err(EngineError::Widget)?;

            let previous = current;
            (current, total) = self
                .page_advance
                .run(|| async move {
                    let state = self.widget.page_state().await.map_err(EngineError::Widget)?;
                    Ok(state
                        .current()
                        .filter(|page| *page != previous)
                        .map(|page| (page, state.total_pages)))
                })
                .await?
                .ok_or(EngineError::PageAdvanceTimeout {
                    page: next,
                    budget_ms: self.page_advance.budget().as_millis() as u64,
                })?;
        }

        tracing::info!(pages = pages_visited, "pagination exhausted");
        Ok(Outcome::PagesExhausted {
            pages: pages_visited,
        })
    }
}
