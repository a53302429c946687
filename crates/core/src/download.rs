use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::debug;

use crate::{
    error::{BilitvError, Result},
    progress::Reporter,
};

/// Streams remote files to disk chunk by chunk.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// A failed transfer leaves whatever was already written in place.
    pub async fn download(&self, url: &str, dest: &Path, reporter: &dyn Reporter) -> Result<u64> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BilitvError::DownloadFailed {
                url: url.to_string(),
                status,
            });
        }

        let total = response.content_length().unwrap_or(0);
        debug!(url, dest = %dest.display(), total, "Starting download");
        reporter.transfer_started(total);

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            reporter.transfer_progress(downloaded);
        }
        file.flush().await?;

        reporter.transfer_finished();
        debug!(dest = %dest.display(), downloaded, "Download finished");

        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    #[derive(Default)]
    struct Recorder {
        total: Mutex<Option<u64>>,
        last: Mutex<u64>,
        finished: Mutex<bool>,
    }

    impl Reporter for Recorder {
        fn transfer_started(&self, total: u64) {
            *self.total.lock().unwrap() = Some(total);
        }

        fn transfer_progress(&self, downloaded: u64) {
            *self.last.lock().unwrap() = downloaded;
        }

        fn transfer_finished(&self) {
            *self.finished.lock().unwrap() = true;
        }
    }

    #[tokio::test]
    async fn test_download_writes_file_and_reports_progress() {
        let server = MockServer::start().await;
        let body = vec![7u8; 20_000];
        Mock::given(method("GET"))
            .and(path("/video.m4s"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("temp_video.mp4");
        let recorder = Recorder::default();

        let written = Downloader::new(Client::new())
            .download(&format!("{}/video.m4s", server.uri()), &dest, &recorder)
            .await
            .unwrap();

        assert_eq!(written, 20_000);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
        assert_eq!(*recorder.total.lock().unwrap(), Some(20_000));
        assert_eq!(*recorder.last.lock().unwrap(), 20_000);
        assert!(*recorder.finished.lock().unwrap());
    }

    #[tokio::test]
    async fn test_download_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("temp_audio.mp4");
        let err = Downloader::new(Client::new())
            .download(&format!("{}/audio.m4s", server.uri()), &dest, &crate::Silent)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BilitvError::DownloadFailed { status, .. } if status.as_u16() == 403
        ));
        assert!(!dest.exists());
    }
}
