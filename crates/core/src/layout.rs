use std::path::PathBuf;

use crate::types::ContentId;

const EXTENSION: &str = "mp4";
const OUTPUT_PREFIX: &str = "bilibili";

/// File names used inside an output directory.
///
/// Temp names are fixed, so two runs sharing a directory overwrite each other.
#[derive(Debug, Clone)]
pub struct Layout {
    dir: PathBuf,
}

impl Layout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn video_temp(&self) -> PathBuf {
        self.dir.join(format!("temp_video.{EXTENSION}"))
    }

    pub fn audio_temp(&self) -> PathBuf {
        self.dir.join(format!("temp_audio.{EXTENSION}"))
    }

    /// Final merged file, named after the identifier.
    pub fn output(&self, id: &ContentId) -> PathBuf {
        self.dir.join(format!("{OUTPUT_PREFIX}_{id}.{EXTENSION}"))
    }
}
