use crate::codec::EncodedImage;
use crate::error::{FailureKind, RetextureError};

/// Result of one retexture request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(EncodedImage),
    Failure { kind: FailureKind, message: String },
}

impl GenerationOutcome {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        GenerationOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            GenerationOutcome::Success(_) => None,
            GenerationOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        match self {
            GenerationOutcome::Success(image) => Some(image),
            GenerationOutcome::Failure { .. } => None,
        }
    }
}

impl From<RetextureError> for GenerationOutcome {
    fn from(err: RetextureError) -> Self {
        GenerationOutcome::failure(err.kind(), err.message())
    }
}
