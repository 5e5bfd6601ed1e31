pub mod client;
#[cfg(test)]
pub(crate) mod stub;

use crate::{models::GenerationOutcome, payload::EditRequest};
use async_trait::async_trait;

pub use client::Img2ImgClient;

/// Performs one img2img exchange.
///
/// Implementations never retry and never panic on service errors; every
/// failure comes back as a classified [`GenerationOutcome::Failure`].
#[async_trait]
pub trait Img2ImgTransport: Send + Sync {
    async fn send(&self, request: &EditRequest) -> GenerationOutcome;
}
