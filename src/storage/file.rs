use crate::{
    codec::EncodedImage,
    error::{Result, RetextureError},
    storage::traits::ImageStore,
};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes results as `{dir}/{label}_{YYYYMMDD_HHMMSS}.png`.
#[derive(Debug, Clone)]
pub struct FileImageStore {
    dir: PathBuf,
}

impl FileImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(label: &str) -> String {
        let label: String = label
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let label = if label.is_empty() {
            "retexture".to_string()
        } else {
            label
        };
        format!("{}_{}.png", label, Local::now().format("%Y%m%d_%H%M%S"))
    }
}

impl ImageStore for FileImageStore {
    fn persist(&self, image: &EncodedImage, label: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            RetextureError::Persist(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.dir.join(Self::file_name(label));
        fs::write(&path, &image.bytes).map_err(|e| {
            RetextureError::Persist(format!("cannot write {}: {}", path.display(), e))
        })?;

        log::info!("💾 Saved result to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persists_under_label_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileImageStore::new(dir.path().join("out"));
        let image = EncodedImage {
            bytes: vec![137, 80, 78, 71],
            width: 1,
            height: 1,
        };

        let path = store.persist(&image, "style transfer").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("style_transfer_"));
        assert!(name.ends_with(".png"));
        // style_transfer_YYYYMMDD_HHMMSS.png
        assert_eq!(name.len(), "style_transfer_".len() + 15 + 4);
        assert_eq!(fs::read(&path).unwrap(), image.bytes);
    }

    #[test]
    fn blank_labels_fall_back_to_a_default() {
        assert!(FileImageStore::file_name("  ").starts_with("retexture_"));
        assert!(FileImageStore::file_name("../../etc").starts_with("______etc_"));
    }
}
