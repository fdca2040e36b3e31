//! Requests over a real TCP listener

use fakearr_core::FakearrConfig;
use fakearr_web::{AppState, build_router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = build_router(AppState::from_config(&FakearrConfig::for_testing()).unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    address
}

async fn raw_get(address: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(address).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn test_nzb_over_tcp() {
    let address = spawn_server().await;
    let response = raw_get(address, "/Some.Movie.2024.nzb").await;
    let lowered = response.to_ascii_lowercase();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(lowered.contains("content-type: application/x-nzb"));
    assert!(lowered.contains("content-disposition: attachment; filename=\"some.movie.2024.nzb\""));

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let length: usize = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap();
    assert_eq!(body.len(), length);
    assert!(body.trim_end().ends_with("</nzb>"));
}

#[tokio::test]
async fn test_unsupported_extension_over_tcp() {
    let address = spawn_server().await;
    let response = raw_get(address, "/show.avi").await;

    assert!(response.starts_with("HTTP/1.1 400"));
    assert!(response.ends_with("Unsupported extension: .avi"));
}
