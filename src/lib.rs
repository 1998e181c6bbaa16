pub mod config;
pub mod error;
pub mod routes;
pub mod video;

pub use config::Config;
pub use error::{ApiError, DownloadError};
pub use routes::build_router;
pub use video::{VIDEO_TEMPLATE, VideoRequest, VideoResponse, download_video};
