//! Minimal HTTP/1.1 stand-in for an img2img server, used by tests.

use crate::codec::{ImageCodec, PngCodec};
use image::{DynamicImage, Rgba, RgbaImage};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub head: String,
    pub json: serde_json::Value,
}

pub(crate) struct StubServer {
    endpoint: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    /// Answers every request with `status` and `body`.
    pub async fn respond(status: u16, body: impl Into<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let body = body.into();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let captured = Arc::clone(&captured);
                let body = body.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, status, &body, captured).await;
                });
            }
        });

        StubServer {
            endpoint: format!("http://{}/sdapi/v1/img2img", addr),
            requests,
        }
    }

    /// An endpoint nothing is listening on.
    pub async fn unused_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind probe listener");
        let addr = listener.local_addr().expect("probe address");
        drop(listener);
        format!("http://{}/sdapi/v1/img2img", addr)
    }

    pub fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("stub request log").clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    status: u16,
    body: &str,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let json = serde_json::from_slice(&buf[head_end..]).unwrap_or(serde_json::Value::Null);
    captured
        .lock()
        .expect("stub request log")
        .push(CapturedRequest { head, json });

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

pub(crate) fn png_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
    }))
}

pub(crate) fn png_base64(width: u32, height: u32) -> String {
    PngCodec
        .encode(&png_image(width, height))
        .expect("encode test png")
        .to_base64()
}
