//! One full indexing run
//!
//! Launches the browser, bootstraps the session, drives the pagination
//! engine, and races it against the document error hook: whichever resolves
//! first decides the run. Teardown always happens before the outcome is
//! reported.

use tracing::warn;

use crate::Config;
use crate::browser::{self, BrowserError, BrowserWrapper};
use crate::engine::{EngineError, Outcome, PaginationEngine};
use crate::output::LinkSink;
use crate::session::{SearchRequest, SearchSession, SessionError};
use crate::widget::CseWidget;

/// Fatal failures of an indexing run
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("uncaught error in search document: {0}")]
    DocumentRuntime(String),
}

/// Runs one search end to end, streaming result links into `sink`
///
/// # Errors
/// Returns [`SearchError`] for any fatal condition; links already streamed
/// for earlier pages remain valid output either way.
pub async fn run_search<S: LinkSink>(
    config: &Config,
    request: &SearchRequest,
    sink: &mut S,
) -> Result<Outcome, SearchError> {
    let wrapper = browser::launch(&config.browser).await?;

    let result = drive(&wrapper, config, request, sink).await;

    wrapper.shutdown().await;
    result
}

async fn drive<S: LinkSink>(
    wrapper: &BrowserWrapper,
    config: &Config,
    request: &SearchRequest,
    sink: &mut S,
) -> Result<Outcome, SearchError> {
    let mut session = SearchSession::bootstrap(wrapper.browser(), request).await?;
    let widget = CseWidget::new(session.page().clone());
    let engine = PaginationEngine::with_tuning(
        widget,
        config.poll.search_load(),
        config.poll.page_advance(),
    );

    tokio::select! {
        outcome = engine.run(sink) => Ok(outcome?),
        message = session.document_error() => {
            warn!("aborting: the search document raised an uncaught error");
            Err(SearchError::DocumentRuntime(message))
        }
    }
}
