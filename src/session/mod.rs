//! Browser session bootstrap
//!
//! Builds the page the pagination engine drives: creates a tab, installs
//! the console relay and the uncaught-error hook, arranges for the
//! synthetic address to be served from memory, and navigates to it.
//!
//! Interception is scoped to the synthetic origin, so the widget's own
//! script and API requests flow to the network untouched.

mod document;

pub use document::SearchRequest;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::js_protocol::runtime as cdp_runtime;
use chromiumoxide_cdp::cdp::browser_protocol::fetch as cdp_fetch;
use chromiumoxide_cdp::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while preparing the search page
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to create the search page: {0}")]
    PageCreation(String),

    #[error("failed to install {capability}: {message}")]
    EventSetup {
        capability: &'static str,
        message: String,
    },

    #[error("failed to load the search document: {0}")]
    Navigation(String),
}

/// One browser tab prepared for a search run
///
/// Owns the background tasks that relay console messages, surface uncaught
/// document errors, and serve the synthetic document. Dropping the session
/// stops them.
pub struct SearchSession {
    page: Page,
    exceptions: mpsc::UnboundedReceiver<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl SearchSession {
    /// Prepares a page for `request` and navigates to the synthetic address
    ///
    /// The order matters: event domains and interception are installed
    /// before navigation so the very first document request is already
    /// served from memory and no early console message or error is lost.
    ///
    /// # Errors
    /// Returns [`SessionError`] when page creation, event setup, or
    /// navigation fails.
    pub async fn bootstrap(browser: &Browser, request: &SearchRequest) -> SessionResult<Self> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::PageCreation(e.to_string()))?;

        page.execute(cdp_runtime::EnableParams::default())
            .await
            .map_err(|e| SessionError::EventSetup {
                capability: "runtime events",
                message: e.to_string(),
            })?;

        let mut tasks = Vec::new();
        tasks.push(spawn_console_relay(&page).await?);

        let (exception_tx, exceptions) = mpsc::unbounded_channel();
        tasks.push(spawn_error_hook(&page, exception_tx).await?);

        tasks.push(spawn_document_server(&page, request.document()).await?);

        let address = request.address();
        tracing::debug!(%address, "loading synthesized search document");
        page.goto(address.as_str())
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))?;

        Ok(Self {
            page,
            exceptions,
            tasks,
        })
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Resolves when the document raises an uncaught error
    ///
    /// Pending forever once the relay task is gone, which keeps a driver
    /// `select!` over this and the engine well behaved.
    pub async fn document_error(&mut self) -> String {
        match self.exceptions.recv().await {
            Some(message) => message,
            None => std::future::pending().await,
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Forwards document console messages to the diagnostic stream
///
/// Stdout is reserved for result URLs, so the relay lands on tracing under
/// the `document` target.
async fn spawn_console_relay(page: &Page) -> SessionResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<cdp_runtime::EventConsoleApiCalled>()
        .await
        .map_err(|e| SessionError::EventSetup {
            capability: "console relay",
            message: e.to_string(),
        })?;

    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let message = event
                .args
                .iter()
                .map(render_remote_object)
                .collect::<Vec<_>>()
                .join(" ");
            tracing::debug!(target: "document", kind = ?event.r#type, "{message}");
        }
    }))
}

/// Surfaces uncaught document errors through a channel the driver races
/// against the engine
async fn spawn_error_hook(
    page: &Page,
    exception_tx: mpsc::UnboundedSender<String>,
) -> SessionResult<JoinHandle<()>> {
    let mut events = page
        .event_listener::<cdp_runtime::EventExceptionThrown>()
        .await
        .map_err(|e| SessionError::EventSetup {
            capability: "error hook",
            message: e.to_string(),
        })?;

    Ok(tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let message = render_exception(&event.exception_details);
            if exception_tx.send(message).is_err() {
                break;
            }
        }
    }))
}

/// Serves the synthesized document for the synthetic origin
///
/// The listener is registered before the fetch domain is enabled so no
/// paused request slips past, and the pattern pauses nothing but the
/// synthetic origin. Stray subresource requests to that origin (favicon)
/// are aborted; there is nothing to serve for them.
async fn spawn_document_server(page: &Page, html: String) -> SessionResult<JoinHandle<()>> {
    let setup_err = |message: String| SessionError::EventSetup {
        capability: "document interception",
        message,
    };

    let mut paused = page
        .event_listener::<cdp_fetch::EventRequestPaused>()
        .await
        .map_err(|e| setup_err(e.to_string()))?;

    let pattern = cdp_fetch::RequestPattern::builder()
        .url_pattern(format!("{}*", crate::utils::constants::SYNTHETIC_ORIGIN))
        .build();
    page.execute(
        cdp_fetch::EnableParams::builder()
            .patterns(vec![pattern])
            .build(),
    )
    .await
    .map_err(|e| setup_err(e.to_string()))?;

    let body = BASE64.encode(html);
    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let reply = if matches!(event.resource_type, ResourceType::Document) {
                tracing::debug!(url = %event.request.url, "serving synthesized search document");
                let mut fulfill =
                    cdp_fetch::FulfillRequestParams::new(event.request_id.clone(), 200);
                fulfill.response_headers = Some(vec![cdp_fetch::HeaderEntry::new(
                    "Content-Type",
                    "text/html; charset=utf-8",
                )]);
                fulfill.body = Some(body.clone().into());
                page.execute(fulfill).await.map(|_| ())
            } else {
                let fail = cdp_fetch::FailRequestParams::new(
                    event.request_id.clone(),
                    ErrorReason::Aborted,
                );
                page.execute(fail).await.map(|_| ())
            };
            if let Err(e) = reply {
                tracing::debug!("interception reply failed: {e}");
            }
        }
    }))
}

fn render_remote_object(object: &cdp_runtime::RemoteObject) -> String {
    if let Some(value) = &object.value {
        match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    } else if let Some(description) = &object.description {
        description.clone()
    } else {
        String::from("<object>")
    }
}

fn render_exception(details: &cdp_runtime::ExceptionDetails) -> String {
    let summary = details
        .exception
        .as_ref()
        .and_then(|exception| exception.description.clone())
        .unwrap_or_else(|| details.text.clone());
    format!(
        "{summary} (line {}, column {})",
        details.line_number, details.column_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_value(value: serde_json::Value) -> cdp_runtime::RemoteObject {
        serde_json::from_value(serde_json::json!({
            "type": "object",
            "value": value,
        }))
        .unwrap()
    }

    #[test]
    fn console_strings_render_bare() {
        let object = remote_value(serde_json::Value::String("hello".into()));
        assert_eq!(render_remote_object(&object), "hello");
    }

    #[test]
    fn console_values_render_as_json() {
        let object = remote_value(serde_json::json!({"a": 1}));
        assert_eq!(render_remote_object(&object), "{\"a\":1}");
    }
}
