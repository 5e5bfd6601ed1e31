use crate::{
    codec::{decode_base64, EncodedImage, ImageCodec, PngCodec},
    config::GenerationSettings,
    error::{Result, RetextureError},
    logger,
    models::{GenerationOutcome, Img2ImgResponse},
    payload::EditRequest,
    sdapi::Img2ImgTransport,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct Img2ImgClient {
    client: Client,
    endpoint: String,
    codec: Arc<dyn ImageCodec>,
}

impl Img2ImgClient {
    pub fn new(settings: &GenerationSettings) -> Self {
        Self::with_endpoint(settings.endpoint())
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            codec: Arc::new(PngCodec),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn execute(&self, request: &EditRequest) -> Result<EncodedImage> {
        let payload = request.to_payload();
        let (width, height) = request.dimensions();

        log::info!(
            "Sending {} request to {} ({}x{})",
            request.mode(),
            self.endpoint,
            width,
            height
        );
        log::debug!("Prompt: {}", request.prompt());

        let _timer = logger::timer(format!("img2img {}", request.mode()));

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_connect() {
                    "connection failed"
                } else if e.is_timeout() {
                    "request timed out"
                } else {
                    "request failed"
                };
                RetextureError::Transport(format!("{} for {}: {}", reason, self.endpoint, e))
            })?;

        let status = response.status();
        log::debug!("Response code: {}", status.as_u16());

        let body = response.text().await.map_err(|e| {
            RetextureError::Transport(format!("failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            log::debug!("img2img returned HTTP {}: {}", status.as_u16(), body);
            // Some proxies answer errors with no body at all.
            let body = if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(RetextureError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: Img2ImgResponse = serde_json::from_str(&body)
            .map_err(|e| RetextureError::Decode(format!("unexpected response body: {}", e)))?;

        let first = parsed
            .images
            .first()
            .ok_or_else(|| RetextureError::Decode("No images generated".into()))?;

        let bytes = decode_base64(first)?;
        let (image, _) = self.codec.wrap(bytes)?;

        log::info!(
            "✅ Received {}x{} image ({} bytes)",
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(image)
    }
}

#[async_trait]
impl Img2ImgTransport for Img2ImgClient {
    async fn send(&self, request: &EditRequest) -> GenerationOutcome {
        match self.execute(request).await {
            Ok(image) => GenerationOutcome::Success(image),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::payload::{build, EditMode};
    use crate::sdapi::stub::{png_base64, StubServer};

    fn request() -> EditRequest {
        let source = EncodedImage {
            bytes: vec![0, 1, 2],
            width: 32,
            height: 16,
        };
        build(
            EditMode::Restyle,
            &GenerationSettings::default(),
            &source,
            None,
            None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn success_decodes_first_image() {
        let body = format!(
            r#"{{"images":["{}","{}"]}}"#,
            png_base64(5, 4),
            png_base64(9, 9)
        );
        let server = StubServer::respond(200, body).await;
        let client = Img2ImgClient::with_endpoint(server.endpoint());

        let outcome = client.send(&request()).await;
        let image = outcome.image().expect("expected success");
        assert_eq!((image.width, image.height), (5, 4));

        let captured = server.requests().await;
        assert_eq!(captured.len(), 1);
        assert!(captured[0].head.starts_with("POST /sdapi/v1/img2img"));
        assert!(captured[0]
            .head
            .to_ascii_lowercase()
            .contains("content-type: application/json"));
        assert_eq!(captured[0].json["width"], 32);
        assert_eq!(captured[0].json["height"], 16);
    }

    #[tokio::test]
    async fn non_success_status_keeps_body_verbatim() {
        let server = StubServer::respond(500, "CUDA out of memory").await;
        let client = Img2ImgClient::with_endpoint(server.endpoint());

        let outcome = client.send(&request()).await;
        assert_eq!(
            outcome,
            GenerationOutcome::failure(FailureKind::HttpStatus, "CUDA out of memory")
        );
    }

    #[tokio::test]
    async fn blank_error_body_falls_back_to_the_status_line() {
        let server = StubServer::respond(503, "").await;
        let client = Img2ImgClient::with_endpoint(server.endpoint());

        let outcome = client.send(&request()).await;
        assert_eq!(
            outcome,
            GenerationOutcome::failure(FailureKind::HttpStatus, "503 Service Unavailable")
        );
    }

    #[tokio::test]
    async fn empty_image_list_is_a_decode_failure() {
        let server = StubServer::respond(200, r#"{"images":[]}"#).await;
        let client = Img2ImgClient::with_endpoint(server.endpoint());

        let outcome = client.send(&request()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Decode));
    }

    #[tokio::test]
    async fn malformed_bodies_are_decode_failures() {
        for body in [
            "<html>gateway</html>".to_string(),
            r#"{"detail":"nope"}"#.to_string(),
            r#"{"images":["!!!"]}"#.to_string(),
            r#"{"images":["aGVsbG8="]}"#.to_string(),
        ] {
            let server = StubServer::respond(200, body).await;
            let client = Img2ImgClient::with_endpoint(server.endpoint());
            let outcome = client.send(&request()).await;
            assert_eq!(outcome.failure_kind(), Some(FailureKind::Decode));
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        let endpoint = StubServer::unused_endpoint().await;
        let client = Img2ImgClient::with_endpoint(endpoint);

        let outcome = client.send(&request()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Transport));
    }
}
