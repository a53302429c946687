use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{BilitvError, Result};

/// Combines a video track and an audio track into one container.
#[allow(async_fn_in_trait)]
pub trait Merger {
    async fn combine(&self, video: &Path, audio: &Path, output: &Path) -> Result<PathBuf>;
}

/// Stream-copy merge through the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegMerger {
    program: PathBuf,
}

impl Default for FfmpegMerger {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegMerger {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Both tracks copied as-is, existing output overwritten.
    pub fn args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            video.into(),
            "-i".into(),
            audio.into(),
            "-c:v".into(),
            "copy".into(),
            "-c:a".into(),
            "copy".into(),
            output.into(),
            "-y".into(),
        ]
    }
}

impl Merger for FfmpegMerger {
    /// A non-zero exit status is only logged; the output path is returned either way.
    async fn combine(&self, video: &Path, audio: &Path, output: &Path) -> Result<PathBuf> {
        debug!(program = %self.program.display(), output = %output.display(), "Running merge");

        let status = Command::new(&self.program)
            .args(Self::args(video, audio, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| BilitvError::MergeFailed {
                output: output.to_path_buf(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            warn!(%status, output = %output.display(), "Merge tool exited unsuccessfully");
        }

        Ok(output.to_path_buf())
    }
}
