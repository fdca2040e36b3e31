//! End-to-end request handling through the assembled router

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{Request, StatusCode, header};
use fakearr_core::FakearrConfig;
use fakearr_web::{AppState, build_router};
use sha1::{Digest, Sha1};
use tower::ServiceExt;

use crate::decoders::{decode_torrent, element_texts, info_hash_hex, parse_xml};

fn app() -> Router {
    build_router(AppState::from_config(&FakearrConfig::for_testing()).unwrap())
}

async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, Bytes) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

#[tokio::test]
async fn test_episode_torrent_end_to_end() {
    let (status, headers, body) = get("/My.Show.S01E01.torrent").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/x-bittorrent");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"My.Show.S01E01.torrent\""
    );

    let torrent = decode_torrent(&body);
    assert_eq!(torrent.info.name, "My.Show.S01E01");
    assert_eq!(torrent.info.piece_length, 262_144);
    assert_eq!(torrent.info.length, 1 << 30);
    assert_eq!(torrent.info.private, 0);
    assert_eq!(torrent.info.pieces.len(), 4096 * 20);
    assert_eq!(torrent.announce, "http://tracker.example.com/announce");
    assert_eq!(torrent.creation_date, 1_711_584_000);
    assert!(!torrent.created_by.is_empty());
}

#[tokio::test]
async fn test_pieces_are_sha1_of_index_and_name() {
    let (_, _, body) = get("/show.torrent").await;
    let pieces = decode_torrent(&body).info.pieces.into_vec();

    for index in [0usize, 1, 4095] {
        let expected = Sha1::digest(format!("piece_{index}_show").as_bytes());
        assert_eq!(&pieces[index * 20..(index + 1) * 20], expected.as_slice());
    }
}

#[tokio::test]
async fn test_info_hash_header_matches_info_dictionary() {
    let (_, headers, body) = get("/show.torrent").await;
    let torrent = decode_torrent(&body);

    assert_eq!(headers["x-info-hash"], info_hash_hex(&torrent.info).as_str());
}

#[tokio::test]
async fn test_legacy_info_hash_covers_pieces_and_name() {
    let (_, _, body) = get("/show.torrent").await;
    let torrent = decode_torrent(&body);

    let mut hasher = Sha1::new();
    hasher.update(&torrent.info.pieces);
    hasher.update(b"show");
    let expected = hasher.finalize();

    assert_eq!(
        torrent.legacy_info_hash.map(|hash| hash.into_vec()),
        Some(expected.to_vec())
    );
}

#[tokio::test]
async fn test_legacy_nzb_route() {
    let (status, headers, body) = get("/fake_nzb/Fake%20Movie.nzb").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/x-nzb");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Fake Movie.nzb\""
    );
    let text = String::from_utf8(body.to_vec()).unwrap();
    let document = parse_xml(&text);
    assert_eq!(element_texts(&document, "meta")[0], "Fake Movie");
}

#[tokio::test]
async fn test_encoded_slash_is_part_of_the_name() {
    let (status, headers, body) = get("/fake_nzb/AC%2FDC%20Live.nzb").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"AC/DC Live.nzb\""
    );
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(element_texts(&parse_xml(&text), "meta")[0], "AC/DC Live");
}

#[tokio::test]
async fn test_control_characters_are_not_found() {
    for uri in ["/a%01b.nzb", "/a%0Ab.nzb", "/a%1Fb.torrent"] {
        let (status, _, body) = get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(&body[..], b"Not found");
    }
}

#[tokio::test]
async fn test_rejections_leak_nothing() {
    let (status, _, body) = get("/noext").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"Not found");

    let (status, _, body) = get("/show.exe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(&body[..], b"Unsupported extension: .exe");

    let (status, _, _) = get("/%FF%FE.torrent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_identical_requests_identical_bodies() {
    let (_, _, first) = get("/show.torrent").await;
    let (_, _, second) = get("/show.torrent").await;
    assert_eq!(first, second);

    let (_, _, first) = get("/show.nzb").await;
    let (_, _, second) = get("/show.nzb").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, _, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}
