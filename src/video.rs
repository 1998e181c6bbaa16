//! Mock TikTok download: URL validation and response shaping.
//!
//! Nothing is fetched. A valid request gets a copy of [`VIDEO_TEMPLATE`] with
//! the caller's quality, format and watermark options applied.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DownloadError;

/// Anchored at the start only: anything after the numeric id is accepted.
const TIKTOK_VIDEO_URL_PATTERN: &str = r"^https://www\.tiktok\.com/@[\w.-]+/video/\d+";

static TIKTOK_VIDEO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TIKTOK_VIDEO_URL_PATTERN).expect("valid regex"));

const DEFAULT_QUALITY: &str = "high";
const DEFAULT_FORMAT: &str = "mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadataTemplate {
    pub title: &'static str,
    pub author: &'static str,
    pub duration: u64,
    pub quality: &'static str,
    pub size: u64,
    pub url: &'static str,
}

pub const VIDEO_TEMPLATE: VideoMetadataTemplate = VideoMetadataTemplate {
    title: "Sample TikTok Video",
    author: "John Doe",
    duration: 120,
    quality: DEFAULT_QUALITY,
    size: 50_000_000,
    url: "https://download-tiktok.com/video.mp4",
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoRequest {
    pub url: String,
    #[serde(default = "default_quality")]
    pub quality: Option<String>,
    #[serde(default = "default_format")]
    pub format: Option<String>,
    #[serde(default = "default_remove_watermark")]
    pub remove_watermark: Option<bool>,
}

#[cfg(test)]
impl VideoRequest {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            quality: default_quality(),
            format: default_format(),
            remove_watermark: default_remove_watermark(),
        }
    }
}

fn default_quality() -> Option<String> {
    Some(DEFAULT_QUALITY.to_string())
}

fn default_format() -> Option<String> {
    Some(DEFAULT_FORMAT.to_string())
}

fn default_remove_watermark() -> Option<bool> {
    Some(false)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResponse {
    pub video_url: String,
    pub title: String,
    pub author: String,
    pub duration: u64,
    pub size: u64,
    pub quality: String,
    pub format: String,
    pub watermark_removed: bool,
}

/// Working copy of the template with request options applied.
#[derive(Debug, Clone)]
struct VideoRecord {
    title: String,
    author: String,
    duration: u64,
    quality: String,
    size: u64,
    url: String,
    format: Option<String>,
    watermark_removed: bool,
}

impl From<VideoMetadataTemplate> for VideoRecord {
    fn from(template: VideoMetadataTemplate) -> Self {
        Self {
            title: template.title.to_string(),
            author: template.author.to_string(),
            duration: template.duration,
            quality: template.quality.to_string(),
            size: template.size,
            url: template.url.to_string(),
            format: None,
            watermark_removed: false,
        }
    }
}

impl TryFrom<VideoRecord> for VideoResponse {
    type Error = DownloadError;

    fn try_from(record: VideoRecord) -> Result<Self, Self::Error> {
        let format = record.format.ok_or_else(|| {
            DownloadError::Processing("response is missing a video format".to_string())
        })?;

        Ok(VideoResponse {
            video_url: record.url,
            title: record.title,
            author: record.author,
            duration: record.duration,
            size: record.size,
            quality: record.quality,
            format,
            watermark_removed: record.watermark_removed,
        })
    }
}

pub fn is_valid_tiktok_url(url: &str) -> bool {
    TIKTOK_VIDEO_URL_RE.is_match(url)
}

/// Validates the request URL and builds the fabricated download metadata.
pub fn download_video(request: &VideoRequest) -> Result<VideoResponse, DownloadError> {
    if !is_valid_tiktok_url(&request.url) {
        return Err(DownloadError::Validation);
    }

    let mut record = VideoRecord::from(VIDEO_TEMPLATE);
    if let Some(quality) = request.quality.as_deref().filter(|value| !value.is_empty()) {
        record.quality = quality.to_string();
    }
    if let Some(format) = request.format.as_deref().filter(|value| !value.is_empty()) {
        record.format = Some(format.to_string());
    }
    record.watermark_removed = request.remove_watermark.unwrap_or(false);

    debug!(
        "Composed mock download quality={} format={:?} watermark_removed={}",
        record.quality, record.format, record.watermark_removed
    );

    VideoResponse::try_from(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_URL: &str = "https://www.tiktok.com/@johndoe/video/1234567890123";

    #[test]
    fn accepts_canonical_video_urls() {
        assert!(is_valid_tiktok_url(VALID_URL));
        assert!(is_valid_tiktok_url("https://www.tiktok.com/@john.doe-99_x/video/1"));
    }

    #[test]
    fn accepts_trailing_content_after_valid_prefix() {
        assert!(is_valid_tiktok_url(
            "https://www.tiktok.com/@johndoe/video/123?is_from_webapp=1&sender_device=pc"
        ));
        assert!(is_valid_tiktok_url("https://www.tiktok.com/@johndoe/video/123abc"));
        assert!(is_valid_tiktok_url("https://www.tiktok.com/@johndoe/video/123/ trailing"));
    }

    #[test]
    fn rejects_urls_not_starting_with_pattern() {
        for url in [
            "not-a-url",
            "",
            "http://www.tiktok.com/@johndoe/video/123",
            "https://tiktok.com/@johndoe/video/123",
            "https://vm.tiktok.com/ZMabc123/",
            "https://www.tiktok.com/johndoe/video/123",
            "https://www.tiktok.com/@/video/123",
            "https://www.tiktok.com/@johndoe/video/",
            "https://www.tiktok.com/@johndoe/photo/123",
            " https://www.tiktok.com/@johndoe/video/123",
            "see https://www.tiktok.com/@johndoe/video/123",
            "https://wwwXtiktok.com/@johndoe/video/123",
        ] {
            assert!(!is_valid_tiktok_url(url), "expected rejection for {url:?}");
        }
    }

    #[test]
    fn default_request_matches_reference_scenario() {
        let response = download_video(&VideoRequest::new(VALID_URL)).unwrap();

        assert_eq!(
            response,
            VideoResponse {
                video_url: "https://download-tiktok.com/video.mp4".to_string(),
                title: "Sample TikTok Video".to_string(),
                author: "John Doe".to_string(),
                duration: 120,
                size: 50_000_000,
                quality: "high".to_string(),
                format: "mp4".to_string(),
                watermark_removed: false,
            }
        );
    }

    #[test]
    fn invalid_url_yields_validation_error() {
        let result = download_video(&VideoRequest::new("not-a-url"));
        assert_eq!(result, Err(DownloadError::Validation));
    }

    #[test]
    fn supplied_options_are_echoed() {
        let request = VideoRequest {
            url: VALID_URL.to_string(),
            quality: Some("low".to_string()),
            format: Some("webm".to_string()),
            remove_watermark: Some(true),
        };

        let response = download_video(&request).unwrap();
        assert_eq!(response.quality, "low");
        assert_eq!(response.format, "webm");
        assert!(response.watermark_removed);
    }

    #[test]
    fn missing_or_empty_quality_keeps_template_value() {
        for quality in [None, Some(String::new())] {
            let request = VideoRequest {
                quality,
                ..VideoRequest::new(VALID_URL)
            };
            assert_eq!(download_video(&request).unwrap().quality, "high");
        }
    }

    #[test]
    fn missing_format_is_a_processing_error() {
        for format in [None, Some(String::new())] {
            let request = VideoRequest {
                format,
                ..VideoRequest::new(VALID_URL)
            };
            assert!(matches!(
                download_video(&request),
                Err(DownloadError::Processing(_))
            ));
        }
    }

    #[test]
    fn null_watermark_flag_means_not_removed() {
        let request = VideoRequest {
            remove_watermark: None,
            ..VideoRequest::new(VALID_URL)
        };
        assert!(!download_video(&request).unwrap().watermark_removed);
    }

    #[test]
    fn repeated_requests_are_identical() {
        let request = VideoRequest {
            remove_watermark: Some(true),
            ..VideoRequest::new(VALID_URL)
        };
        assert_eq!(
            download_video(&request).unwrap(),
            download_video(&request).unwrap()
        );
        assert_eq!(VIDEO_TEMPLATE.quality, "high");
    }

    #[test]
    fn request_defaults_apply_when_fields_are_omitted() {
        let request: VideoRequest = serde_json::from_str(r#"{"url": "x"}"#).unwrap();
        assert_eq!(request, VideoRequest::new("x"));
    }

    #[test]
    fn omitted_watermark_flag_defaults_to_false() {
        let request: VideoRequest = serde_json::from_str(
            r#"{"url": "https://www.tiktok.com/@johndoe/video/1", "quality": "low"}"#,
        )
        .unwrap();
        assert_eq!(request.remove_watermark, Some(false));
        assert!(!download_video(&request).unwrap().watermark_removed);
    }

    #[test]
    fn explicit_nulls_deserialize_to_none() {
        let request: VideoRequest = serde_json::from_str(
            r#"{"url": "x", "quality": null, "format": null, "remove_watermark": null}"#,
        )
        .unwrap();
        assert_eq!(request.quality, None);
        assert_eq!(request.format, None);
        assert_eq!(request.remove_watermark, None);
    }
}
