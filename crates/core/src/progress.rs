/// Pipeline steps a user may want to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    DownloadingVideo,
    DownloadingAudio,
    Merging,
}

impl Stage {
    pub fn describe(&self) -> &'static str {
        match self {
            Stage::Resolving => "Fetching stream URLs...",
            Stage::DownloadingVideo => "Downloading video...",
            Stage::DownloadingAudio => "Downloading audio...",
            Stage::Merging => "Merging video and audio...",
        }
    }
}

/// Receives stage changes and byte counts while a pipeline runs.
///
/// Every method defaults to doing nothing.
pub trait Reporter {
    fn stage(&self, _stage: Stage) {}

    /// `total` is the declared content length, 0 when the server did not send one.
    fn transfer_started(&self, _total: u64) {}

    /// `downloaded` is the running byte count for the current transfer.
    fn transfer_progress(&self, _downloaded: u64) {}

    fn transfer_finished(&self) {}
}

/// Discards everything.
pub struct Silent;

impl Reporter for Silent {}
