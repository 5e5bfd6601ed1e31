use crate::{
    codec::EncodedImage,
    config::GenerationSettings,
    error::{Result, RetextureError},
    models::{Img2ImgPayload, InpaintFields},
};
use std::fmt;

pub const RESTYLE_PROMPT_SUFFIX: &str =
    ", maintain car parts structure, preserve vehicle details, realistic automotive texture, high detail";
pub const RESTYLE_NEGATIVE_PROMPT: &str =
    "solid color, flat texture, loss of detail, destroyed geometry, unrecognizable, simple texture, blurry";

pub const INPAINT_PROMPT_SUFFIX: &str =
    ", seamless integration, match surrounding lighting, preserve detail level, smooth blending";
pub const INPAINT_NEGATIVE_PROMPT: &str =
    "visible seams, harsh edges, lighting mismatch, low quality, blurry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditMode {
    /// Whole-image restyle, no mask.
    Restyle,
    /// Region-constrained edit guided by a mask.
    Inpaint,
}

impl EditMode {
    /// Inpaint iff a mask is present.
    pub fn for_mask<T>(mask: Option<T>) -> Self {
        if mask.is_some() {
            EditMode::Inpaint
        } else {
            EditMode::Restyle
        }
    }

    pub fn prompt_suffix(&self) -> &'static str {
        match self {
            EditMode::Restyle => RESTYLE_PROMPT_SUFFIX,
            EditMode::Inpaint => INPAINT_PROMPT_SUFFIX,
        }
    }

    pub fn negative_prompt(&self) -> &'static str {
        match self {
            EditMode::Restyle => RESTYLE_NEGATIVE_PROMPT,
            EditMode::Inpaint => INPAINT_NEGATIVE_PROMPT,
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Restyle => f.write_str("restyle"),
            EditMode::Inpaint => f.write_str("inpaint"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditKind {
    Restyle,
    Inpaint { mask: EncodedImage, blur_radius: u32 },
}

/// A fully resolved img2img request. Only [`build`] constructs one, so the
/// mask is present exactly when the kind is `Inpaint`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    kind: EditKind,
    source: EncodedImage,
    prompt: String,
    negative_prompt: String,
    width: u32,
    height: u32,
    denoising_strength: f32,
    guidance_scale: f32,
    steps: u32,
    sampler_name: String,
    inpaint_full_res_padding: u32,
    inpainting_fill: u32,
}

impl EditRequest {
    pub fn mode(&self) -> EditMode {
        match self.kind {
            EditKind::Restyle => EditMode::Restyle,
            EditKind::Inpaint { .. } => EditMode::Inpaint,
        }
    }

    pub fn kind(&self) -> &EditKind {
        &self.kind
    }

    pub fn mask(&self) -> Option<&EncodedImage> {
        match &self.kind {
            EditKind::Restyle => None,
            EditKind::Inpaint { mask, .. } => Some(mask),
        }
    }

    pub fn source(&self) -> &EncodedImage {
        &self.source
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn to_payload(&self) -> Img2ImgPayload {
        let inpaint = match &self.kind {
            EditKind::Restyle => None,
            EditKind::Inpaint { mask, blur_radius } => Some(InpaintFields {
                mask: mask.to_base64(),
                mask_blur_x: *blur_radius,
                mask_blur_y: *blur_radius,
                inpaint_full_res: true,
                inpaint_full_res_padding: self.inpaint_full_res_padding,
                inpainting_mask_invert: 0,
                inpainting_fill: self.inpainting_fill,
                resize_mode: 0,
            }),
        };

        Img2ImgPayload {
            init_images: vec![self.source.to_base64()],
            prompt: self.prompt.clone(),
            negative_prompt: self.negative_prompt.clone(),
            denoising_strength: self.denoising_strength,
            cfg_scale: self.guidance_scale,
            steps: self.steps,
            sampler_name: self.sampler_name.clone(),
            width: self.width,
            height: self.height,
            batch_size: 1,
            n_iter: 1,
            send_images: true,
            save_images: false,
            inpaint,
        }
    }
}

/// Builds the request for `mode`.
///
/// `width`/`height` always come from `source`, never from configuration.
pub fn build(
    mode: EditMode,
    settings: &GenerationSettings,
    source: &EncodedImage,
    mask: Option<&EncodedImage>,
    prompt_override: Option<&str>,
) -> Result<EditRequest> {
    let kind = match (mode, mask) {
        (EditMode::Restyle, None) => EditKind::Restyle,
        (EditMode::Inpaint, Some(mask)) => EditKind::Inpaint {
            mask: mask.clone(),
            blur_radius: settings.mask_blur_radius,
        },
        (EditMode::Restyle, Some(_)) => {
            return Err(RetextureError::InvalidMode(
                "restyle request cannot carry a mask".into(),
            ))
        }
        (EditMode::Inpaint, None) => {
            return Err(RetextureError::InvalidMode(
                "inpaint request requires a mask".into(),
            ))
        }
    };

    let base = prompt_override.unwrap_or(&settings.base_prompt);

    Ok(EditRequest {
        kind,
        source: source.clone(),
        prompt: format!("{}{}", base, mode.prompt_suffix()),
        negative_prompt: mode.negative_prompt().to_string(),
        width: source.width,
        height: source.height,
        denoising_strength: settings.denoising_strength,
        guidance_scale: settings.guidance_scale,
        steps: settings.step_count,
        sampler_name: settings.sampler_name.clone(),
        inpaint_full_res_padding: settings.inpaint_full_res_padding,
        inpainting_fill: settings.inpainting_fill,
    })
}
