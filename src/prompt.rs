use crate::config::GenerationSettings;
use std::ops::{Deref, DerefMut};

/// Temporarily replaces `base_prompt`, restoring the captured original when
/// dropped.
///
/// Holding the guard keeps the settings mutably borrowed, so nothing else can
/// touch the prompt while an override is open. Restoration runs on every exit
/// path, including `?` returns, panics unwinding through the scope, timeouts
/// and a pending future being dropped.
pub struct PromptOverride<'a> {
    settings: &'a mut GenerationSettings,
    original: Option<String>,
}

impl<'a> PromptOverride<'a> {
    pub fn install(settings: &'a mut GenerationSettings, prompt: impl Into<String>) -> Self {
        let original = std::mem::replace(&mut settings.base_prompt, prompt.into());
        log::debug!(
            "Prompt override installed: '{}' (was '{}')",
            settings.base_prompt,
            original
        );
        Self {
            settings,
            original: Some(original),
        }
    }

    pub fn original(&self) -> &str {
        self.original.as_deref().unwrap_or_default()
    }
}

impl Deref for PromptOverride<'_> {
    type Target = GenerationSettings;

    fn deref(&self) -> &GenerationSettings {
        self.settings
    }
}

impl DerefMut for PromptOverride<'_> {
    fn deref_mut(&mut self) -> &mut GenerationSettings {
        self.settings
    }
}

impl Drop for PromptOverride<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            log::debug!("Prompt restored to '{}'", original);
            self.settings.base_prompt = original;
        }
    }
}

/// Temporarily replaces `denoising_strength` for one job. `None` leaves the
/// settings untouched; otherwise the captured strength is put back on drop.
pub struct StrengthOverride<'a> {
    settings: &'a mut GenerationSettings,
    original: Option<f32>,
}

impl<'a> StrengthOverride<'a> {
    pub fn install(settings: &'a mut GenerationSettings, strength: Option<f32>) -> Self {
        let original = strength.map(|strength| {
            let original = std::mem::replace(&mut settings.denoising_strength, strength);
            log::debug!(
                "Denoising strength override installed: {} (was {})",
                strength,
                original
            );
            original
        });
        Self { settings, original }
    }
}

impl Deref for StrengthOverride<'_> {
    type Target = GenerationSettings;

    fn deref(&self) -> &GenerationSettings {
        self.settings
    }
}

impl DerefMut for StrengthOverride<'_> {
    fn deref_mut(&mut self) -> &mut GenerationSettings {
        self.settings
    }
}

impl Drop for StrengthOverride<'_> {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            log::debug!("Denoising strength restored to {}", original);
            self.settings.denoising_strength = original;
        }
    }
}
