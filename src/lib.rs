pub mod codec;
pub mod config;
pub mod error;
pub mod logger;
pub mod mask;
pub mod models;
pub mod orchestrator;
pub mod payload;
pub mod prompt;
pub mod sdapi;
pub mod session;
pub mod storage;
pub mod target;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{EncodedImage, ImageCodec, PngCodec};
pub use config::{Config, GenerationSettings};
pub use error::{FailureKind, Result, RetextureError};
pub use mask::{synthesize, MaskFalloff, MaskField, MaskParams};
pub use models::GenerationOutcome;
pub use orchestrator::{MaskInput, RetextureJob, RetextureOrchestrator};
pub use payload::{EditKind, EditMode, EditRequest};
pub use prompt::{PromptOverride, StrengthOverride};
pub use sdapi::{Img2ImgClient, Img2ImgTransport};
pub use session::RetextureSession;
pub use storage::{FileImageStore, ImageStore};
pub use target::{find_surface, HierarchyResolver, SceneNode, SurfaceTarget, TargetResolver};
