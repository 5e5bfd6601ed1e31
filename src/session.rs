use crate::{
    error::FailureKind,
    models::GenerationOutcome,
    orchestrator::{RetextureJob, RetextureOrchestrator},
    target::TargetResolver,
};

/// Ties the orchestrator to the host: the current selection and the prompt
/// last received from the speech bridge.
pub struct RetextureSession<R: TargetResolver> {
    orchestrator: RetextureOrchestrator,
    resolver: R,
    current_prompt: String,
}

impl<R: TargetResolver> RetextureSession<R> {
    pub fn new(orchestrator: RetextureOrchestrator, resolver: R) -> Self {
        let current_prompt = orchestrator.settings().base_prompt.clone();
        Self {
            orchestrator,
            resolver,
            current_prompt,
        }
    }

    pub fn orchestrator(&self) -> &RetextureOrchestrator {
        &self.orchestrator
    }

    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    pub fn prompt_display(&self) -> String {
        format!("Prompt: {}", self.current_prompt)
    }

    /// Speech-to-text callback. Blank transcriptions are ignored.
    pub fn update_prompt(&mut self, text: impl Into<String>) {
        let text = text.into();
        let text = text.trim();
        if text.is_empty() {
            log::debug!("Ignoring empty transcription");
            return;
        }
        self.current_prompt = text.to_string();
        log::info!("Prompt updated to: {}", self.current_prompt);
    }

    /// Name of the object that would be retextured, or `"None"`.
    pub fn current_target_name(&self) -> String {
        self.resolver
            .resolve_current_target()
            .map(|target| target.name())
            .unwrap_or_else(|| "None".to_string())
    }

    pub fn can_retexture(&self) -> bool {
        self.resolver.resolve_current_target().is_some()
    }

    /// Restyles whatever is currently selected using the current prompt.
    pub async fn retexture_current(&mut self) -> GenerationOutcome {
        let target = match self.resolver.resolve_current_target() {
            Some(target) => target,
            None => {
                log::warn!("No object selected! Select an object first.");
                return GenerationOutcome::failure(FailureKind::NoInput, "no object selected");
            }
        };

        let name = target.name();
        let image = target.current_image();
        if image.is_none() {
            log::warn!("{} has no readable surface image", name);
        }

        let job = RetextureJob::new(image.as_ref())
            .with_prompt(self.current_prompt.clone())
            .with_target(target.as_ref())
            .with_label(name);

        self.orchestrator.process(job).await
    }
}
