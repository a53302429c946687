use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static EPISODE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,8}$").expect("episode id regex is valid"));

/// Which playurl request shape an identifier resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Short numeric id, sent as `ep_id`.
    Episode,
    /// Anything else, sent as `aid`.
    Asset,
}

/// Identifier pulled out of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exactly 4 to 8 digits is an episode id, everything else an asset id.
    pub fn kind(&self) -> IdKind {
        if EPISODE_ID_REGEX.is_match(&self.0) {
            IdKind::Episode
        } else {
            IdKind::Asset
        }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepted video quality codes in preference order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityTier(Vec<u32>);

impl QualityTier {
    pub fn new(codes: impl IntoIterator<Item = u32>) -> Self {
        Self(codes.into_iter().collect())
    }

    pub fn accepts(&self, quality: u32) -> bool {
        self.0.contains(&quality)
    }

    pub fn codes(&self) -> &[u32] {
        &self.0
    }
}

impl Default for QualityTier {
    fn default() -> Self {
        Self(vec![112, 80, 64, 32])
    }
}

/// One video and one audio URL, both short-lived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSet {
    pub video_url: String,
    pub audio_url: String,
    pub quality: u32,
}

/// API responses send `null` for absent fields as often as they omit them.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Default, Deserialize)]
pub struct Playurl {
    #[serde(default, deserialize_with = "null_as_default")]
    pub video: Vec<VideoEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_resource: Vec<AudioResource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream_info: StreamInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_resource: VideoResource,
}

/// Quality codes that are not a non-negative integer in `u32` range read as `None`.
fn lenient_quality<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_u64().and_then(|q| u32::try_from(q).ok()))
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamInfo {
    #[serde(default, deserialize_with = "lenient_quality")]
    pub quality: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}
