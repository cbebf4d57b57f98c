//! Browser lifecycle management
//!
//! One browser per indexing run: launch, hand out the handle, shut down.
//! The CDP event handler runs on its own task and MUST be aborted once the
//! browser is gone, or it spins forever on a dead connection.

use std::path::PathBuf;

use chromiumoxide::browser::Browser;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::BrowserResult;
use crate::BrowserConfig;

/// Wrapper for a Browser plus its event handler task and profile directory
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Closes the browser, waits for the process to exit, and removes the
    /// temporary profile
    ///
    /// Teardown failures are logged rather than propagated; the run's
    /// outcome was decided before teardown started.
    pub async fn shutdown(mut self) {
        info!("Shutting down browser");

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {e}");
        }

        self.cleanup_temp_dir();
    }

    /// Removes the temporary profile directory
    ///
    /// Must run after `browser.wait()` completes so Chrome has released its
    /// file handles; Windows cannot remove locked files.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {e}. Manual cleanup may be required.",
                    path.display()
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();

        if let Some(path) = &self.user_data_dir {
            warn!(
                "Browser dropped without shutdown; temp directory will be orphaned: {}",
                path.display()
            );
        }
    }
}

/// Launches a browser for one indexing run
///
/// Each run gets its own profile directory under the system temp dir, keyed
/// by process id, so concurrent invocations never contend on a Chrome
/// profile lock.
///
/// # Errors
/// Returns [`super::BrowserError`] when no executable can be found or
/// downloaded, or the launch itself fails.
pub async fn launch(config: &BrowserConfig) -> BrowserResult<BrowserWrapper> {
    let user_data_dir =
        std::env::temp_dir().join(format!("cse_indexer_{}", std::process::id()));

    let (browser, handler) =
        crate::browser_setup::launch_browser(config, user_data_dir.clone()).await?;

    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}
