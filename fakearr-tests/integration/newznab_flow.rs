//! Indexer manager flow: register via caps, search, then grab the linked NZB

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use fakearr_core::FakearrConfig;
use fakearr_web::{AppState, build_router};
use tower::ServiceExt;

use crate::decoders::{element_texts, parse_xml};

fn app() -> Router {
    let mut config = FakearrConfig::for_testing();
    config.newznab.base_url = "http://fakearr.test:8000".to_string();
    build_router(AppState::from_config(&config).unwrap())
}

async fn get(uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_caps_is_xml() {
    let (status, content_type, body) = get("/api?t=caps").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/xml"));

    let document = parse_xml(&body);
    let tv_search = document
        .descendants()
        .find(|node| node.has_tag_name("tv-search"))
        .unwrap();
    assert_eq!(tv_search.attribute("available"), Some("yes"));
}

#[tokio::test]
async fn test_search_items_link_to_downloadable_nzbs() {
    let (status, _, feed) = get("/api?t=tvsearch&q=My%20Show").await;
    assert_eq!(status, StatusCode::OK);

    let links = element_texts(&parse_xml(&feed), "link");
    // channel link first, then the item link
    assert_eq!(links[0], "http://fakearr.test:8000");
    assert_eq!(links[1], "http://fakearr.test:8000/fake_nzb/My%20Show.nzb");

    let path = links[1].trim_start_matches("http://fakearr.test:8000");
    let (status, content_type, nzb) = get(path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/x-nzb"));
    assert_eq!(element_texts(&parse_xml(&nzb), "meta")[0], "My Show");
}

#[tokio::test]
async fn test_title_with_slash_survives_the_round_trip() {
    let (_, _, feed) = get("/api?t=search&q=AC%2FDC%20Live").await;

    let links = element_texts(&parse_xml(&feed), "link");
    assert_eq!(links[1], "http://fakearr.test:8000/fake_nzb/AC%2FDC%20Live.nzb");

    let path = links[1].trim_start_matches("http://fakearr.test:8000");
    let (status, _, nzb) = get(path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(element_texts(&parse_xml(&nzb), "meta")[0], "AC/DC Live");
}

#[tokio::test]
async fn test_control_characters_in_query_keep_feed_well_formed() {
    let (status, _, feed) = get("/api?t=search&q=a%01b").await;
    assert_eq!(status, StatusCode::OK);

    let document = parse_xml(&feed);
    assert_eq!(element_texts(&document, "title")[1], "ab");
}

#[tokio::test]
async fn test_unknown_function_is_rejected() {
    let (status, _, body) = get("/api?t=register").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid request");
}
