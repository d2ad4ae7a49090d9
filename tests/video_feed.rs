//! End-to-end tests against a live server backed by a synthetic source.

use std::sync::Arc;
use std::time::Duration;

use camdash::config::AppConfig;
use camdash::state::AppState;
use camdash::web::create_router;

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn_server(device: &str) -> String {
    let config = AppConfig {
        device: device.to_string(),
        ..Default::default()
    };
    let state = Arc::new(AppState::new(config));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

#[tokio::test]
async fn video_feed_streams_multipart_jpeg() {
    let base = spawn_server("stub://e2e-feed").await;

    let mut response = reqwest::get(format!("{base}/video_feed"))
        .await
        .expect("request video feed");
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("multipart/x-mixed-replace; boundary=frame")
    );

    // Accumulate body bytes until two complete parts are buffered
    let mut body = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let chunk = tokio::time::timeout_at(deadline, response.chunk())
            .await
            .expect("stream stalled")
            .expect("stream errored")
            .expect("stream ended early");
        body.extend_from_slice(&chunk);

        let mut boundaries = 0;
        let mut at = 0;
        while let Some(pos) = find(&body, b"--frame\r\n", at) {
            boundaries += 1;
            at = pos + 1;
        }
        if boundaries >= 3 {
            break;
        }
    }
    drop(response);

    // First part: boundary, Content-Type header, blank line, JPEG payload
    let header = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";
    assert!(body.starts_with(header), "unexpected part framing");

    let payload_start = header.len();
    let payload_end = find(&body, b"\r\n\r\n--frame\r\n", payload_start)
        .expect("no terminating boundary after first part");
    let jpeg = &body[payload_start..payload_end];

    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "payload is not JPEG");
    let decoded = image::load_from_memory_with_format(jpeg, image::ImageFormat::Jpeg)
        .expect("decode first frame");
    // 640x480 capture at the default 50 percent scale
    assert_eq!((decoded.width(), decoded.height()), (320, 240));
}

#[tokio::test]
async fn snapshot_returns_scaled_jpeg() {
    let base = spawn_server("stub://e2e-snapshot").await;

    let response = reqwest::get(format!("{base}/snapshot"))
        .await
        .expect("request snapshot");
    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );

    let jpeg = response.bytes().await.unwrap();
    let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg)
        .expect("decode snapshot");
    assert_eq!((decoded.width(), decoded.height()), (320, 240));
}

#[tokio::test]
async fn health_and_plot_endpoints() {
    let base = spawn_server("stub://e2e-api").await;

    let health: serde_json::Value = reqwest::get(format!("{base}/healthz"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["success"], true);

    let plot: serde_json::Value = reqwest::get(format!("{base}/api/plot?mean=99&std=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // Mean is clamped to the slider range [-3, 3]
    assert_eq!(plot["mean"], 3.0);
    assert_eq!(plot["std"], 2.0);
    let counts = plot["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 40);
    let total: u64 = counts.iter().map(|c| c.as_u64().unwrap()).sum();
    assert!(total <= 500);
}

#[tokio::test]
async fn dashboard_page_is_served() {
    let base = spawn_server("stub://e2e-page").await;

    let response = reqwest::get(&base).await.unwrap();
    assert_eq!(response.status(), 200);
    let page = response.text().await.unwrap();
    assert!(page.contains("/video_feed"));
}
