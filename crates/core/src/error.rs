use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BilitvError {
    #[error("Could not extract ID from link: {link}")]
    IdNotFound { link: String },

    #[error("API error: {status}")]
    Api { status: StatusCode },

    #[error("Missing 'playurl' in response")]
    MissingPlayurl,

    #[error("Could not fetch stream URLs")]
    NoStreams,

    #[error("Download failed for {url}: {status}")]
    DownloadFailed { url: String, status: StatusCode },

    #[error("Merge failed for {output}: {reason}")]
    MergeFailed { output: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, BilitvError>;
