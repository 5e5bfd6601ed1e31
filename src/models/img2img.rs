use serde::{Deserialize, Serialize};

/// Body of `POST /sdapi/v1/img2img`.
///
/// The in-paint fields are omitted entirely for restyle requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Img2ImgPayload {
    pub init_images: Vec<String>,
    pub prompt: String,
    pub negative_prompt: String,
    pub denoising_strength: f32,
    pub cfg_scale: f32,
    pub steps: u32,
    pub sampler_name: String,
    pub width: u32,
    pub height: u32,
    pub batch_size: u32,
    pub n_iter: u32,
    pub send_images: bool,
    pub save_images: bool,
    #[serde(flatten)]
    pub inpaint: Option<InpaintFields>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InpaintFields {
    /// A single image, not an array.
    pub mask: String,
    pub mask_blur_x: u32,
    pub mask_blur_y: u32,
    pub inpaint_full_res: bool,
    pub inpaint_full_res_padding: u32,
    pub inpainting_mask_invert: u32,
    pub inpainting_fill: u32,
    pub resize_mode: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Img2ImgResponse {
    pub images: Vec<String>,
}
