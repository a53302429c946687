use std::{io::ErrorKind, path::Path};

use tokio::fs;
use tracing::warn;

use crate::error::Result;

pub const PLAYURL_API: &str = "https://api.bilibili.tv/intl/gateway/web/playurl";
pub const REFERER: &str = "https://www.bilibili.tv/";

/// Everything a playurl request needs besides the identifier.
#[derive(Debug, Clone)]
pub struct Session {
    pub api_url: String,
    pub referer: String,
    pub cookie: String,
}

impl Session {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            api_url: PLAYURL_API.to_string(),
            referer: REFERER.to_string(),
            cookie: cookie.into(),
        }
    }

    /// Build a session from a cookies file. A missing file is not an error,
    /// the session just carries an empty cookie.
    pub async fn from_cookie_file(path: &Path) -> Result<Self> {
        Ok(Self::new(load_cookies(path).await?))
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Read newline-separated `name=value` pairs into a single `Cookie` header value.
pub async fn load_cookies(path: &Path) -> Result<String> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(join_cookie_lines(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "Missing cookies file, continuing without cookies");
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn join_cookie_lines(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
