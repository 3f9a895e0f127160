//! Download management and processing

pub mod formats;
pub mod thumbnail;
pub mod video;
pub mod ytdlp;

// Re-exports for convenience
pub use formats::{fetch_video_info, FormatTable, VideoInfo};
pub use thumbnail::prepare_thumbnail;
pub use video::{cleanup, download_video, probe_video_metadata, DownloadResult};
