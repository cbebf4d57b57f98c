//! Browser discovery and launch
//!
//! Finds a local Chrome/Chromium (env override, well-known paths, `which`),
//! falls back to downloading a managed build into the user cache, and
//! launches it configured as a host for the search widget.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult};
use crate::utils::constants::CHROME_USER_AGENT;

/// Well-known install locations for the current platform
fn well_known_paths() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    }
}

/// Checks `$PATH` for a browser binary via `which`
fn from_path_lookup() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }
    ["chromium", "chromium-browser", "google-chrome", "chrome"]
        .iter()
        .find_map(|name| {
            let output = Command::new("which").arg(name).output().ok()?;
            if !output.status.success() {
                return None;
            }
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!found.is_empty()).then(|| PathBuf::from(found))
        })
}

/// Finds a Chrome/Chromium executable on the system
///
/// `CHROMIUM_PATH` overrides everything; then well-known install locations
/// per platform; then `which` on Unix.
pub async fn find_browser_executable() -> BrowserResult<PathBuf> {
    if let Ok(override_path) = std::env::var("CHROMIUM_PATH") {
        let override_path = PathBuf::from(override_path);
        if override_path.exists() {
            info!(
                "Using browser from CHROMIUM_PATH: {}",
                override_path.display()
            );
            return Ok(override_path);
        }
        warn!(
            "Ignoring CHROMIUM_PATH, no file at {}",
            override_path.display()
        );
    }

    if let Some(found) = well_known_paths()
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
    {
        info!("Found browser at {}", found.display());
        return Ok(found);
    }

    if let Some(found) = from_path_lookup() {
        info!("Found browser on PATH: {}", found.display());
        return Ok(found);
    }

    Err(BrowserError::NotFound(
        "no Chrome/Chromium executable on this system".into(),
    ))
}

/// Downloads a managed Chromium into the user cache and returns its
/// executable path
pub async fn download_managed_browser() -> BrowserResult<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::env::temp_dir().join(".cache"))
        .join("cse-indexer/chromium");
    info!("Downloading managed Chromium into {}", cache_dir.display());

    std::fs::create_dir_all(&cache_dir)
        .map_err(|e| BrowserError::IoError(format!("creating cache directory: {e}")))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .map_err(|e| BrowserError::DownloadFailed(e.to_string()))?;
    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| BrowserError::DownloadFailed(e.to_string()))?;

    info!("Downloaded Chromium to {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Removes the profile directory on drop unless the launch succeeded
///
/// Keeps every launch-failure path from orphaning a temp directory without
/// threading cleanup calls through each of them.
struct TempDirGuard {
    path: PathBuf,
    keep: bool,
}

impl TempDirGuard {
    fn new(path: PathBuf) -> BrowserResult<Self> {
        std::fs::create_dir_all(&path)
            .map_err(|e| BrowserError::IoError(format!("creating user data directory: {e}")))?;
        Ok(Self { path, keep: false })
    }

    /// Hands the directory over to the caller, disarming cleanup
    fn into_path(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(
                "Failed to remove {} after launch failure: {e}",
                self.path.display()
            );
        }
    }
}

/// Chrome keeps emitting CDP events chromiumoxide cannot deserialize; the
/// handler surfaces them as errors even though the session is healthy.
///
/// https://github.com/mattsse/chromiumoxide/issues/167
/// https://github.com/mattsse/chromiumoxide/issues/229
fn is_benign_cdp_noise(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Finds or downloads a browser and launches it as a widget host
///
/// The flag set stays small: a realistic user agent (the CSE backend serves
/// degraded markup to the HeadlessChrome token), certificate tolerance when
/// configured, and quiet-browser flags. The sandbox is disabled inside
/// containers, where setuid sandboxing cannot work.
pub async fn launch_browser(
    config: &BrowserConfig,
    user_data_dir: PathBuf,
) -> BrowserResult<(Browser, JoinHandle<()>)> {
    let executable = match find_browser_executable().await {
        Ok(path) => path,
        Err(e) => {
            warn!("{e}; falling back to managed download");
            download_managed_browser().await?
        }
    };

    let temp_guard = TempDirGuard::new(user_data_dir)?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1280, 1024)
        .user_data_dir(temp_guard.path.clone())
        .chrome_executable(executable)
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-notifications")
        .arg("--metrics-recording-only")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    if config.ignore_certificate_errors {
        builder = builder.arg("--ignore-certificate-errors");
    }

    if config.disable_security {
        warn!("Disabling browser web security (disable_security=true)");
        builder = builder.arg("--disable-web-security");
    }

    if should_disable_sandbox() {
        info!("Containerized environment detected, disabling the sandbox");
        builder = builder.arg("--no-sandbox").arg("--disable-setuid-sandbox");
    } else if config.disable_security {
        builder = builder.arg("--no-sandbox").arg("--disable-setuid-sandbox");
    }

    let browser_config = builder
        .build()
        .map_err(|e| BrowserError::LaunchFailed(format!("building browser config: {e}")))?;

    debug!("Launching browser with config: {browser_config:?}");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            let Err(e) = event else { continue };
            let message = e.to_string();
            if is_benign_cdp_noise(&message) {
                trace!("Suppressed benign CDP noise: {message}");
            } else {
                error!("Browser handler error: {message}");
            }
        }
        debug!("Browser handler task finished");
    });

    temp_guard.into_path();

    Ok((browser, handler_task))
}

/// True when running inside a container, where the setuid sandbox cannot work
fn should_disable_sandbox() -> bool {
    Path::new("/.dockerenv").exists()
        || std::env::var("container").is_ok()
        || std::env::var("KUBERNETES_SERVICE_HOST").is_ok()
}
