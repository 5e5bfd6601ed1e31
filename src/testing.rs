//! Call-counting collaborators shared by the unit tests.

use crate::{
    codec::EncodedImage,
    error::{FailureKind, Result, RetextureError},
    models::GenerationOutcome,
    payload::EditRequest,
    sdapi::Img2ImgTransport,
    storage::ImageStore,
    target::SurfaceTarget,
};
use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) struct CountingTransport {
    outcome: GenerationOutcome,
    calls: AtomicUsize,
    requests: Mutex<Vec<EditRequest>>,
}

impl CountingTransport {
    pub fn returning(outcome: GenerationOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(kind: FailureKind, message: &str) -> Self {
        Self::returning(GenerationOutcome::failure(kind, message))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<EditRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Img2ImgTransport for CountingTransport {
    async fn send(&self, request: &EditRequest) -> GenerationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// Never answers; for exercising timeouts.
pub(crate) struct HangingTransport;

#[async_trait]
impl Img2ImgTransport for HangingTransport {
    async fn send(&self, _request: &EditRequest) -> GenerationOutcome {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

pub(crate) struct RecordingTarget {
    name: String,
    image: Option<DynamicImage>,
    applied: Mutex<Vec<(u32, u32)>>,
}

impl RecordingTarget {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            image: None,
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn applied(&self) -> Vec<(u32, u32)> {
        self.applied.lock().unwrap().clone()
    }
}

impl SurfaceTarget for RecordingTarget {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn current_image(&self) -> Option<DynamicImage> {
        self.image.clone()
    }

    fn apply_image(&self, image: &DynamicImage) {
        self.applied.lock().unwrap().push(image.dimensions());
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    saved: Mutex<Vec<(String, EncodedImage)>>,
    fail: bool,
}

impl MemoryStore {
    pub fn broken() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }
}

impl ImageStore for MemoryStore {
    fn persist(&self, image: &EncodedImage, label: &str) -> Result<PathBuf> {
        if self.fail {
            return Err(RetextureError::Persist("disk full".into()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((label.to_string(), image.clone()));
        Ok(PathBuf::from(format!("{}.png", label)))
    }
}
