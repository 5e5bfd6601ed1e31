use crate::{
    codec::{EncodedImage, ImageCodec, PngCodec},
    config::{Config, GenerationSettings},
    error::{FailureKind, Result, RetextureError},
    mask::{self, MaskParams},
    models::GenerationOutcome,
    payload::{self, EditMode},
    prompt::{PromptOverride, StrengthOverride},
    sdapi::{Img2ImgClient, Img2ImgTransport},
    storage::{FileImageStore, ImageStore},
    target::SurfaceTarget,
};
use image::DynamicImage;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_LABEL: &str = "transformed_texture";

/// Denoising strength for whole-image style transfer, above the usual default.
pub const STYLE_TRANSFER_DENOISING: f32 = 0.65;

/// Where the in-paint mask for a job comes from.
#[derive(Debug, Clone, Copy)]
pub enum MaskInput<'a> {
    Image(&'a DynamicImage),
    /// Generated at the source image's size.
    Synthesize(MaskParams),
}

/// Everything one `process` call needs.
pub struct RetextureJob<'a> {
    image: Option<&'a DynamicImage>,
    mask: Option<MaskInput<'a>>,
    prompt_override: Option<String>,
    denoising_strength: Option<f32>,
    target: Option<&'a dyn SurfaceTarget>,
    label: String,
}

impl<'a> RetextureJob<'a> {
    pub fn new(image: Option<&'a DynamicImage>) -> Self {
        Self {
            image,
            mask: None,
            prompt_override: None,
            denoising_strength: None,
            target: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    pub fn for_image(image: &'a DynamicImage) -> Self {
        Self::new(Some(image))
    }

    pub fn with_mask_image(mut self, mask: &'a DynamicImage) -> Self {
        self.mask = Some(MaskInput::Image(mask));
        self
    }

    pub fn with_generated_mask(mut self, params: MaskParams) -> Self {
        self.mask = Some(MaskInput::Synthesize(params));
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_override = Some(prompt.into());
        self
    }

    /// Runs this job at `strength` instead of the configured denoising
    /// strength; the configured value is restored afterwards.
    pub fn with_denoising_strength(mut self, strength: f32) -> Self {
        self.denoising_strength = Some(strength);
        self
    }

    pub fn with_target(mut self, target: &'a dyn SurfaceTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    ModeSelect,
    Building,
    Sending,
    Applying,
    Idle,
    Failed(FailureKind),
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::ModeSelect => f.write_str("mode-select"),
            JobState::Building => f.write_str("building"),
            JobState::Sending => f.write_str("sending"),
            JobState::Applying => f.write_str("applying"),
            JobState::Idle => f.write_str("idle"),
            JobState::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

fn enter(job_id: &str, state: JobState) {
    log::debug!("[job {}] -> {}", job_id, state);
}

/// Entry point for retexture jobs. Owns the generation settings; `process`
/// takes `&mut self`, so at most one job (and one prompt override) is in
/// flight per orchestrator and settings never change mid-request.
pub struct RetextureOrchestrator {
    settings: GenerationSettings,
    transport: Arc<dyn Img2ImgTransport>,
    store: Arc<dyn ImageStore>,
    codec: Arc<dyn ImageCodec>,
}

impl RetextureOrchestrator {
    pub fn new(
        settings: GenerationSettings,
        transport: Arc<dyn Img2ImgTransport>,
        store: Arc<dyn ImageStore>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            transport,
            store,
            codec: Arc::new(PngCodec),
        })
    }

    /// HTTP transport against the configured server, results saved under
    /// `config.output_dir`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(Img2ImgClient::new(&config.generation));
        let store = Arc::new(FileImageStore::new(&config.output_dir));
        Self::new(config.generation.clone(), transport, store)
    }

    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Replaces the settings between jobs.
    pub fn update_settings(&mut self, settings: GenerationSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub async fn process(&mut self, job: RetextureJob<'_>) -> GenerationOutcome {
        let job_id = Uuid::new_v4().simple().to_string()[..8].to_string();

        let outcome = match self.prepare(&job_id, &job) {
            Ok((mode, source, mask)) => {
                let transport = Arc::clone(&self.transport);
                let mut strength =
                    StrengthOverride::install(&mut self.settings, job.denoising_strength);
                match job.prompt_override.as_deref() {
                    Some(prompt) => {
                        let guard = PromptOverride::install(&mut strength, prompt);
                        exchange(&job_id, &guard, transport.as_ref(), mode, &source, mask.as_ref())
                            .await
                    }
                    None => {
                        exchange(
                            &job_id,
                            &strength,
                            transport.as_ref(),
                            mode,
                            &source,
                            mask.as_ref(),
                        )
                        .await
                    }
                }
            }
            Err(err) => err.into(),
        };

        match outcome {
            GenerationOutcome::Success(image) => self.deliver(&job_id, &job, image),
            GenerationOutcome::Failure { kind, message } => {
                enter(&job_id, JobState::Failed(kind));
                log::error!("❌ [job {}] Retexture failed ({}): {}", job_id, kind, message);
                GenerationOutcome::Failure { kind, message }
            }
        }
    }

    fn prepare(
        &self,
        job_id: &str,
        job: &RetextureJob<'_>,
    ) -> Result<(EditMode, EncodedImage, Option<EncodedImage>)> {
        let image = job
            .image
            .ok_or_else(|| RetextureError::NoInput("no current image supplied".into()))?;

        if let Some(strength) = job.denoising_strength {
            if !(0.0..=1.0).contains(&strength) {
                return Err(RetextureError::InvalidMode(format!(
                    "denoising strength override must be within [0, 1], got {}",
                    strength
                )));
            }
        }

        enter(job_id, JobState::ModeSelect);
        let source = self.codec.encode(image)?;

        let mask = match job.mask {
            None => None,
            Some(MaskInput::Image(mask)) => Some(self.codec.encode(mask).map_err(|e| {
                RetextureError::InvalidMode(format!("mask could not be encoded: {}", e.message()))
            })?),
            Some(MaskInput::Synthesize(params)) => {
                let field = mask::synthesize(source.width, source.height, &params);
                Some(self.codec.encode(&field.to_image()).map_err(|e| {
                    RetextureError::InvalidMode(format!(
                        "generated mask could not be encoded: {}",
                        e.message()
                    ))
                })?)
            }
        };

        let mode = EditMode::for_mask(mask.as_ref());
        log::info!(
            "[job {}] {} {}x{} image{}",
            job_id,
            mode,
            source.width,
            source.height,
            if job.prompt_override.is_some() {
                " with prompt override"
            } else {
                ""
            }
        );
        Ok((mode, source, mask))
    }

    fn deliver(&self, job_id: &str, job: &RetextureJob<'_>, image: EncodedImage) -> GenerationOutcome {
        enter(job_id, JobState::Applying);

        let decoded = match self.codec.decode(&image.bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                enter(job_id, JobState::Failed(err.kind()));
                log::error!("❌ [job {}] Result could not be decoded: {}", job_id, err);
                return err.into();
            }
        };

        if let Some(target) = job.target {
            target.apply_image(&decoded);
            log::info!("[job {}] Applied result to {}", job_id, target.name());
        }

        if let Err(err) = self.store.persist(&image, &job.label) {
            log::warn!("⚠️  [job {}] Result applied but not saved: {}", job_id, err);
        }

        enter(job_id, JobState::Idle);
        log::info!("✅ [job {}] Retexture completed", job_id);
        GenerationOutcome::Success(image)
    }
}

async fn exchange(
    job_id: &str,
    settings: &GenerationSettings,
    transport: &dyn Img2ImgTransport,
    mode: EditMode,
    source: &EncodedImage,
    mask: Option<&EncodedImage>,
) -> GenerationOutcome {
    enter(job_id, JobState::Building);
    // The override, if any, is already installed in `settings`.
    let request = match payload::build(mode, settings, source, mask, None) {
        Ok(request) => request,
        Err(err) => return err.into(),
    };

    enter(job_id, JobState::Sending);
    match settings.request_timeout {
        Some(limit) => match tokio::time::timeout(limit, transport.send(&request)).await {
            Ok(outcome) => outcome,
            Err(_) => GenerationOutcome::failure(
                FailureKind::Transport,
                format!("no response within {}s", limit.as_secs_f32()),
            ),
        },
        None => transport.send(&request).await,
    }
}
