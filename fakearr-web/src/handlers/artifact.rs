//! Torrent and NZB download handler

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use fakearr_core::route;

use super::utils::content_disposition;
use crate::error::WebError;
use crate::server::AppState;

/// Response header carrying the hex info-hash of a served torrent.
pub const INFO_HASH_HEADER: HeaderName = HeaderName::from_static("x-info-hash");

/// Serves `GET /<name>.torrent` and `GET /<name>.nzb` for any path.
///
/// The body is synthesized completely before the response is built, so a
/// failure never produces a partial download.
///
/// # Errors
/// - `WebError` - The path names no supported artifact (404/400) or synthesis failed (500)
pub async fn serve_artifact(State(state): State<AppState>, uri: Uri) -> Result<Response, WebError> {
    let artifact = route(uri.path())?;
    let payload = state.synthesizer.synthesize(&artifact)?;

    let disposition = HeaderValue::from_str(&content_disposition(&payload.file_name))
        .map_err(|e| WebError::InvalidHeader {
            reason: e.to_string(),
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(payload.content_type),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(payload.body.len()));

    if let Some(info_hash) = payload.info_hash {
        let value = HeaderValue::from_str(&info_hash.to_string()).map_err(|e| {
            WebError::InvalidHeader {
                reason: e.to_string(),
            }
        })?;
        headers.insert(INFO_HASH_HEADER, value);
        tracing::info!(
            "Served {} (info_hash={}, {} bytes)",
            payload.file_name,
            info_hash,
            payload.body.len()
        );
    } else {
        tracing::info!("Served {} ({} bytes)", payload.file_name, payload.body.len());
    }

    Ok((StatusCode::OK, headers, Body::from(payload.body)).into_response())
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::to_bytes;
    use axum::http::Request;
    use fakearr_core::torrent::TorrentDescriptor;
    use fakearr_core::FakearrConfig;
    use tower::ServiceExt;

    use super::*;
    use crate::server::build_router;

    fn app() -> Router {
        let state = AppState::from_config(&FakearrConfig::for_testing()).unwrap();
        build_router(state)
    }

    async fn get(uri: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_torrent_download() {
        let response = get("/show.torrent").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/x-bittorrent"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"show.torrent\""
        );

        let info_hash = response.headers()[INFO_HASH_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        let length: usize = response.headers()[header::CONTENT_LENGTH]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), length);

        let descriptor = TorrentDescriptor::from_bytes(&body).unwrap();
        assert_eq!(descriptor.info.name, "show");
        assert_eq!(descriptor.info_hash().unwrap().to_string(), info_hash);
    }

    #[tokio::test]
    async fn test_nzb_download() {
        let response = get("/show.nzb").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/x-nzb");
        assert!(response.headers().get(INFO_HASH_HEADER).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"<?xml"));
    }

    #[tokio::test]
    async fn test_rejections() {
        assert_eq!(get("/noext").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/.torrent").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get("/").await.status(), StatusCode::NOT_FOUND);

        let response = get("/show.mkv").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Unsupported extension: .mkv");
    }

    #[tokio::test]
    async fn test_encoded_name_in_disposition() {
        let response = get("/Caf%C3%A9%20%22One%22.nzb").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Caf_ \\\"One\\\".nzb\"; filename*=UTF-8''Caf%C3%A9%20%22One%22.nzb"
        );
    }
}
