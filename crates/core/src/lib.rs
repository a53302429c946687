//! Bilitv Core Library
//!
//! Resolves bilibili.tv links to their video and audio streams, downloads both
//! and merges them into a single file with ffmpeg.

pub mod download;
pub mod error;
pub mod format;
pub mod layout;
pub mod link;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod session;
pub mod types;

// Re-export commonly used items at crate root
pub use download::Downloader;
pub use error::{BilitvError, Result};
pub use format::format_duration;
pub use layout::Layout;
pub use link::extract_id;
pub use merge::{FfmpegMerger, Merger};
pub use pipeline::Pipeline;
pub use progress::{Reporter, Silent, Stage};
pub use resolver::StreamResolver;
pub use session::{Session, load_cookies};
pub use types::{ContentId, IdKind, QualityTier, StreamSet};
