#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Synthetic "album cover": smooth gradients plus a bright disc.
pub fn artwork(size: u32) -> RgbImage {
    let c = size as f32 / 2.0;
    RgbImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - c * 0.7;
        let dy = y as f32 - c * 1.1;
        if dx * dx + dy * dy < (c * 0.35) * (c * 0.35) {
            Rgb([250, 230, 40])
        } else {
            Rgb([
                (x * 255 / size) as u8,
                (y * 180 / size) as u8,
                (255 - (x + y) * 127 / size) as u8,
            ])
        }
    })
}

/// Left half black, right half white (or the inverse).
pub fn halves(size: u32, inverted: bool) -> RgbImage {
    RgbImage::from_fn(size, size, |x, _| {
        let white = (x >= size / 2) != inverted;
        if white {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

pub fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn png(img: RgbImage) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], encode(img, ImageFormat::Png))
}

async fn require_browser_agent(headers: HeaderMap) -> axum::response::Response {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if agent.starts_with("Mozilla/5.0") {
        png(artwork(300)).into_response()
    } else {
        StatusCode::FORBIDDEN.into_response()
    }
}

/// Artwork CDN stand-in bound to an ephemeral local port.
pub async fn serve_artwork() -> SocketAddr {
    let app = Router::new()
        .route("/cover.png", get(|| async { png(artwork(600)) }))
        .route("/mirror/cover.png", get(|| async { png(artwork(600)) }))
        .route("/cover-small.png", get(|| async { png(artwork(300)) }))
        .route(
            "/cover.jpg",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/jpeg")],
                    encode(artwork(600), ImageFormat::Jpeg),
                )
            }),
        )
        .route("/halves.png", get(|| async { png(halves(256, false)) }))
        .route("/halves-inverted.png", get(|| async { png(halves(256, true)) }))
        .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/page.html",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html></html>") }),
        )
        .route(
            "/slow.png",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                png(artwork(64))
            }),
        )
        .route("/agent-checked.png", get(require_browser_agent));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}
