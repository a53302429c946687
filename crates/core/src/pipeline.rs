use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::fs;
use tracing::info;

use crate::{
    download::Downloader,
    error::{BilitvError, Result},
    layout::Layout,
    link::extract_id,
    merge::Merger,
    progress::{Reporter, Stage},
    resolver::StreamResolver,
    session::Session,
    types::QualityTier,
};

/// Link in, merged file out: extract, resolve, download both tracks, merge, clean up.
pub struct Pipeline<M> {
    resolver: StreamResolver,
    downloader: Downloader,
    merger: M,
    qualities: QualityTier,
}

impl<M: Merger> Pipeline<M> {
    pub fn new(resolver: StreamResolver, downloader: Downloader, merger: M) -> Self {
        Self {
            resolver,
            downloader,
            merger,
            qualities: QualityTier::default(),
        }
    }

    /// Build resolver and downloader on one shared HTTP client.
    pub fn from_session(session: Session, merger: M) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::new(
            StreamResolver::with_client(client.clone(), session),
            Downloader::new(client),
            merger,
        ))
    }

    pub fn with_qualities(mut self, qualities: QualityTier) -> Self {
        self.qualities = qualities;
        self
    }

    pub fn merger(&self) -> &M {
        &self.merger
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Temp files are removed once the merger has been invoked, whether or not it
    /// succeeded. A failed download leaves its partial file behind.
    pub async fn run(
        &self,
        link: &str,
        output_dir: &Path,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf> {
        fs::create_dir_all(output_dir).await?;

        let id = extract_id(link).ok_or_else(|| BilitvError::IdNotFound {
            link: link.to_string(),
        })?;
        info!(%id, kind = ?id.kind(), "Extracted identifier");

        reporter.stage(Stage::Resolving);
        let streams = self.resolver.resolve(&id, &self.qualities).await?;

        let layout = Layout::new(output_dir);
        let video_path = layout.video_temp();
        let audio_path = layout.audio_temp();

        reporter.stage(Stage::DownloadingVideo);
        self.downloader
            .download(&streams.video_url, &video_path, reporter)
            .await?;

        reporter.stage(Stage::DownloadingAudio);
        self.downloader
            .download(&streams.audio_url, &audio_path, reporter)
            .await?;

        reporter.stage(Stage::Merging);
        let merged = self
            .merger
            .combine(&video_path, &audio_path, &layout.output(&id))
            .await;

        fs::remove_file(&video_path).await?;
        fs::remove_file(&audio_path).await?;

        let output = merged?;
        info!(output = %output.display(), "Download complete");
        Ok(output)
    }
}
