use crate::error::{Result, RetextureError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// An image in portable byte form together with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Converts between in-memory images and their portable byte form.
pub trait ImageCodec: Send + Sync {
    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage>;
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Wraps already-encoded bytes after checking they decode.
    fn wrap(&self, bytes: Vec<u8>) -> Result<(EncodedImage, DynamicImage)> {
        let image = self.decode(&bytes)?;
        let (width, height) = image.dimensions();
        Ok((
            EncodedImage {
                bytes,
                width,
                height,
            },
            image,
        ))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage> {
        let (width, height) = image.dimensions();
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| RetextureError::Codec(format!("PNG encode failed: {}", e)))?;

        Ok(EncodedImage {
            bytes,
            width,
            height,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| RetextureError::Decode(format!("PNG decode failed: {}", e)))
    }
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    // Some servers prefix results with a data URL header.
    let payload = match data.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    BASE64
        .decode(payload.trim())
        .map_err(|e| RetextureError::Decode(format!("invalid base64 image: {}", e)))
}
