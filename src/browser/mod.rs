//! Browser infrastructure for launching and tearing down Chrome instances

mod wrapper;

pub use wrapper::{BrowserWrapper, launch};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to download managed browser: {0}")]
    DownloadFailed(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;
