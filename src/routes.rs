use std::collections::HashSet;

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, normalize_origin},
    error::{ApiError, DownloadError},
    video::{VideoRequest, VideoResponse, download_video},
};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn build_router(config: &Config) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health))
        .route("/download_video", post(download_video_endpoint))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(build_cors_layer(&config.allowed_origins))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn download_video_endpoint(
    Json(payload): Json<VideoRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    match download_video(&payload) {
        Ok(response) => {
            info!(
                "Mock download served for {:?} (quality={}, format={}, watermark_removed={})",
                payload.url, response.quality, response.format, response.watermark_removed
            );
            Ok(Json(response))
        }
        Err(DownloadError::Validation) => {
            warn!("Rejected URL with invalid TikTok format: {:?}", payload.url);
            Err(DownloadError::Validation.into())
        }
        Err(error) => {
            warn!("Mock download failed for {:?}: {error}", payload.url);
            Err(error.into())
        }
    }
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allowed = allowed_origins.iter().cloned().collect::<HashSet<_>>();
    info!(
        "CORS allow-list loaded with {} origin(s): {:?}",
        allowed_origins.len(),
        allowed_origins
    );

    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let normalized = origin.to_str().ok().and_then(normalize_origin);
        let is_allowed = normalized
            .as_ref()
            .is_some_and(|value| allowed.contains(value));
        debug!(
            "CORS origin check raw={:?} normalized={:?} allowed={}",
            origin, normalized, is_allowed
        );
        is_allowed
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
