//! Population training table sources
//!
//! The population model is trained from a delimited text table that lives
//! either on disk or behind an HTTP(S) URL. This module only fetches the raw
//! text; parsing and training belong to the domain layer.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Where the population training table comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingDataSource {
    /// A file on the local filesystem
    File(PathBuf),
    /// An HTTP(S) URL
    Url(String),
    /// Table text supplied directly, mainly for tests and embedding
    Inline(String),
}

impl fmt::Display for TrainingDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingDataSource::File(path) => write!(f, "file {}", path.display()),
            TrainingDataSource::Url(url) => write!(f, "url {}", url),
            TrainingDataSource::Inline(text) => write!(f, "inline table ({} bytes)", text.len()),
        }
    }
}

/// Errors raised while fetching the training table
#[derive(Debug, Error)]
pub enum TrainingDataError {
    /// Reading a local file failed
    #[error("Failed to read training data file: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP request failed or returned a non-success status
    #[error("Failed to fetch training data: {0}")]
    Http(String),

    /// A URL source was configured but remote fetching is compiled out
    #[error("Remote training data is not enabled in this build")]
    RemoteDisabled,

    /// The source returned no content
    #[error("Training data source {0} is empty")]
    Empty(String),
}

impl TrainingDataSource {
    /// Fetch the raw table text
    pub async fn fetch(&self) -> Result<String, TrainingDataError> {
        debug!("Fetching training data from {}", self);

        let text = match self {
            TrainingDataSource::File(path) => tokio::fs::read_to_string(path).await?,
            TrainingDataSource::Url(url) => fetch_remote(url).await?,
            TrainingDataSource::Inline(text) => text.clone(),
        };

        if text.trim().is_empty() {
            return Err(TrainingDataError::Empty(self.to_string()));
        }

        info!("Fetched {} bytes of training data from {}", text.len(), self);
        Ok(text)
    }
}

#[cfg(feature = "remote")]
async fn fetch_remote(url: &str) -> Result<String, TrainingDataError> {
    let response = reqwest::get(url)
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| TrainingDataError::Http(e.to_string()))?;

    response
        .text()
        .await
        .map_err(|e| TrainingDataError::Http(e.to_string()))
}

#[cfg(not(feature = "remote"))]
async fn fetch_remote(_url: &str) -> Result<String, TrainingDataError> {
    Err(TrainingDataError::RemoteDisabled)
}
