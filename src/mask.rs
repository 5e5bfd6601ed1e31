//! Soft-edged region masks.
//!
//! A mask is a single-channel field where 1.0 means "fully edited" and 0.0
//! means "preserved". Edges use a smoothstep rather than a linear ramp so the
//! server-side blend has no visible seam at the mask boundary.

use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// How mask strength falls off away from the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaskFalloff {
    /// 1.0 at the center, 0.0 at and beyond the radius.
    Local,
    /// `peak` at the center easing down to `floor` at the farthest image
    /// corner, so edges keep some edit strength. Ignores the radius.
    Gradient { peak: f32, floor: f32 },
}

impl MaskFalloff {
    pub fn gradient() -> Self {
        MaskFalloff::Gradient {
            peak: 0.8,
            floor: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskParams {
    /// Fraction of the width.
    pub center_x: f32,
    /// Fraction of the height.
    pub center_y: f32,
    /// Fraction of `min(width, height)`.
    pub radius: f32,
    pub falloff: MaskFalloff,
}

impl MaskParams {
    pub fn new(falloff: MaskFalloff) -> Self {
        MaskParams {
            center_x: 0.5,
            center_y: 0.5,
            radius: 0.3,
            falloff,
        }
    }

    pub fn local() -> Self {
        Self::new(MaskFalloff::Local)
    }

    pub fn gradient() -> Self {
        Self::new(MaskFalloff::gradient())
    }

    pub fn with_center(mut self, center_x: f32, center_y: f32) -> Self {
        self.center_x = center_x;
        self.center_y = center_y;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl MaskField {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y * self.width + x) as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Opaque 8-bit grayscale rendering of the field.
    pub fn to_image(&self) -> DynamicImage {
        let gray = GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([(self.get(x, y) * 255.0).round() as u8])
        });
        DynamicImage::ImageLuma8(gray)
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Center pixel for a fractional center; always inside the field.
fn center_pixel(fraction: f32, extent: u32) -> u32 {
    ((fraction * extent as f32).floor().max(0.0) as u32).min(extent.saturating_sub(1))
}

/// Builds a `width` x `height` field around the pixel containing the
/// fractional center, which always holds the maximum (1.0 for `Local`,
/// `peak` for `Gradient`).
pub fn synthesize(width: u32, height: u32, params: &MaskParams) -> MaskField {
    let cx = center_pixel(params.center_x, width) as f32;
    let cy = center_pixel(params.center_y, height) as f32;

    let reach = match params.falloff {
        MaskFalloff::Local => params.radius * width.min(height) as f32,
        MaskFalloff::Gradient { .. } => {
            let dx = cx.max(width.saturating_sub(1) as f32 - cx);
            let dy = cy.max(height.saturating_sub(1) as f32 - cy);
            (dx * dx + dy * dy).sqrt()
        }
    }
    .max(f32::EPSILON);

    let mut values = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let weight = smoothstep(1.0 - (dx * dx + dy * dy).sqrt() / reach);

            let value = match params.falloff {
                MaskFalloff::Local => weight,
                MaskFalloff::Gradient { peak, floor } => floor + (peak - floor) * weight,
            };
            values.push(value.clamp(0.0, 1.0));
        }
    }

    MaskField {
        width,
        height,
        values,
    }
}
