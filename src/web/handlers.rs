//! HTTP request handlers

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "success": true, "status": "ok" }))
}

/// Multipart MJPEG stream endpoint.
///
/// Builds a fresh camera-backed emitter for this request and streams it
/// until the client disconnects. The capture loop runs on a blocking task
/// and feeds the response body through a capacity-1 channel, so the loop
/// only advances when the previous part has been consumed; when the body is
/// dropped the send fails, the loop breaks and the emitter (and with it the
/// camera handle) is released.
pub async fn video_feed(State(state): State<Arc<AppState>>) -> Response {
    let mut emitter = match state.new_emitter() {
        Ok(emitter) => emitter,
        Err(e) => return e.into_response(),
    };

    let client_id = uuid::Uuid::new_v4();
    info!(%client_id, device = emitter.device(), "Video feed client connected");

    let (tx, mut rx) = tokio::sync::mpsc::channel::<Bytes>(1);

    tokio::task::spawn_blocking(move || {
        loop {
            match emitter.next_frame() {
                Ok(frame) => {
                    let part = mjpeg_part(frame.data());
                    if tx.blocking_send(part).is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(e) => {
                    warn!(
                        %client_id,
                        sequence = emitter.sequence() + 1,
                        "Video feed ended: {e}"
                    );
                    break;
                }
            }
        }
        info!(
            %client_id,
            frames_sent = emitter.sequence(),
            "Video feed client disconnected"
        );
        // Emitter dropped here: camera device released
    });

    let body_stream = async_stream::stream! {
        while let Some(part) = rx.recv().await {
            yield Ok::<Bytes, Infallible>(part);
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            "multipart/x-mixed-replace; boundary=frame",
        )
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .header(header::PRAGMA, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(body_stream))
        .unwrap()
}

/// Single JPEG snapshot captured on demand
pub async fn snapshot(State(state): State<Arc<AppState>>) -> Result<Response> {
    let frame = tokio::task::spawn_blocking(move || {
        let mut emitter = state.new_emitter()?;
        emitter.next_frame()
    })
    .await
    .map_err(|e| AppError::CaptureError(format!("snapshot task failed: {e}")))??;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(frame.data_bytes()))
        .unwrap())
}

/// Frame the multipart chunk for one JPEG image.
///
/// Boundary line, Content-Type header, blank line, payload, trailing blank
/// line; browsers require this exact sequence for x-mixed-replace.
fn mjpeg_part(jpeg_data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(64 + jpeg_data.len());
    buf.put_slice(b"--frame\r\n");
    buf.put_slice(b"Content-Type: image/jpeg\r\n\r\n");
    buf.put_slice(jpeg_data);
    buf.put_slice(b"\r\n\r\n");
    buf.freeze()
}

// ============================================================================
// Dashboard plot
// ============================================================================

/// Histogram range served to the dashboard
const PLOT_RANGE: (f64, f64) = (-10.0, 10.0);
/// Number of histogram bins
const PLOT_BINS: usize = 40;
/// Samples drawn per request
const PLOT_SAMPLES: usize = 500;

#[derive(Deserialize, Default)]
pub struct PlotQuery {
    pub mean: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Serialize)]
pub struct PlotResponse {
    pub success: bool,
    pub mean: f64,
    pub std: f64,
    pub bin_start: f64,
    pub bin_width: f64,
    pub counts: Vec<u32>,
}

/// Histogram of freshly sampled normally distributed data.
///
/// Slider ranges from the dashboard: mean in [-3, 3], std in [1, 3];
/// out-of-range values are clamped rather than rejected.
pub async fn plot(Query(query): Query<PlotQuery>) -> Json<PlotResponse> {
    let mean = query.mean.unwrap_or(0.0).clamp(-3.0, 3.0);
    let std = query.std.unwrap_or(1.0).clamp(1.0, 3.0);

    let (lo, hi) = PLOT_RANGE;
    let bin_width = (hi - lo) / PLOT_BINS as f64;
    let mut counts = vec![0u32; PLOT_BINS];

    let mut rng = rand::thread_rng();
    for _ in 0..PLOT_SAMPLES {
        let value = sample_normal(&mut rng, mean, std);
        if value >= lo && value < hi {
            counts[((value - lo) / bin_width) as usize] += 1;
        }
    }

    Json(PlotResponse {
        success: true,
        mean,
        std,
        bin_start: lo,
        bin_width,
        counts,
    })
}

/// Draw one N(mean, std) sample via the Box-Muller transform
fn sample_normal(rng: &mut impl Rng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    mean + std * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mjpeg_part_framing() {
        let jpeg = [0xFFu8, 0xD8, 0x01, 0x02, 0xFF, 0xD9];
        let part = mjpeg_part(&jpeg);

        let expected_prefix = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n";
        assert!(part.starts_with(expected_prefix));
        assert_eq!(&part[expected_prefix.len()..expected_prefix.len() + jpeg.len()], &jpeg);
        assert!(part.ends_with(b"\r\n\r\n"));
    }

    #[test]
    fn normal_samples_track_mean() {
        let mut rng = rand::thread_rng();
        let n = 10_000;
        let sum: f64 = (0..n).map(|_| sample_normal(&mut rng, 2.0, 1.0)).sum();
        let avg = sum / n as f64;
        assert!((avg - 2.0).abs() < 0.1, "sample mean drifted: {avg}");
    }

    #[tokio::test]
    async fn plot_clamps_parameters() {
        let Json(response) = plot(Query(PlotQuery {
            mean: Some(99.0),
            std: Some(0.0),
        }))
        .await;
        assert_eq!(response.mean, 3.0);
        assert_eq!(response.std, 1.0);
        assert_eq!(response.counts.len(), PLOT_BINS);
        assert!(response.counts.iter().map(|&c| c as usize).sum::<usize>() <= PLOT_SAMPLES);
    }
}
