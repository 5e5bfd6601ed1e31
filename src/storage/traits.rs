use crate::{codec::EncodedImage, error::Result};
use std::path::PathBuf;

/// Durable home for generated images.
pub trait ImageStore: Send + Sync {
    /// Saves `image` under a name derived from `label` and returns where it
    /// ended up.
    fn persist(&self, image: &EncodedImage, label: &str) -> Result<PathBuf>;
}
