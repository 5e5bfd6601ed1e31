use crate::error::{Result, RetextureError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_PROMPT: &str = "dark steel texture, black metal, gunmetal finish";

/// Tunables sent with every img2img request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// `host` or `host:port`; the port defaults to 7860.
    pub server_address: String,
    pub denoising_strength: f32,
    pub guidance_scale: f32,
    pub step_count: u32,
    pub mask_blur_radius: u32,
    pub base_prompt: String,
    pub sampler_name: String,
    pub inpaint_full_res_padding: u32,
    pub inpainting_fill: u32,
    #[serde(default, with = "duration_secs")]
    pub request_timeout: Option<Duration>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            server_address: "localhost".to_string(),
            denoising_strength: 0.55,
            guidance_scale: 9.0,
            step_count: 30,
            mask_blur_radius: 12,
            base_prompt: DEFAULT_PROMPT.to_string(),
            sampler_name: "DPM++ 2M".to_string(),
            inpaint_full_res_padding: 32,
            inpainting_fill: 1,
            request_timeout: None,
        }
    }
}

impl GenerationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `SD_*` variables, falling back to the defaults for anything unset
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        GenerationSettings {
            server_address: env::var("SD_SERVER_ADDRESS").unwrap_or(defaults.server_address),
            denoising_strength: parse_env("SD_DENOISING_STRENGTH")
                .unwrap_or(defaults.denoising_strength),
            guidance_scale: parse_env("SD_CFG_SCALE").unwrap_or(defaults.guidance_scale),
            step_count: parse_env("SD_STEPS").unwrap_or(defaults.step_count),
            mask_blur_radius: parse_env("SD_MASK_BLUR").unwrap_or(defaults.mask_blur_radius),
            base_prompt: env::var("SD_PROMPT").unwrap_or(defaults.base_prompt),
            sampler_name: env::var("SD_SAMPLER").unwrap_or(defaults.sampler_name),
            inpaint_full_res_padding: defaults.inpaint_full_res_padding,
            inpainting_fill: defaults.inpainting_fill,
            request_timeout: parse_timeout("SD_TIMEOUT_SECS"),
        }
    }

    pub fn with_server(mut self, address: impl Into<String>) -> Self {
        self.server_address = address.into();
        self
    }

    pub fn with_denoising_strength(mut self, strength: f32) -> Self {
        self.denoising_strength = strength;
        self
    }

    pub fn with_guidance_scale(mut self, scale: f32) -> Self {
        self.guidance_scale = scale;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.step_count = steps;
        self
    }

    pub fn with_mask_blur(mut self, radius: u32) -> Self {
        self.mask_blur_radius = radius;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.base_prompt = prompt.into();
        self
    }

    pub fn with_sampler(mut self, sampler: impl Into<String>) -> Self {
        self.sampler_name = sampler.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_address.trim().is_empty() {
            return Err(RetextureError::Config("server address is empty".into()));
        }
        if !(0.0..=1.0).contains(&self.denoising_strength) {
            return Err(RetextureError::Config(format!(
                "denoising strength must be within [0, 1], got {}",
                self.denoising_strength
            )));
        }
        if !(self.guidance_scale > 0.0) {
            return Err(RetextureError::Config(format!(
                "guidance scale must be positive, got {}",
                self.guidance_scale
            )));
        }
        if self.step_count == 0 {
            return Err(RetextureError::Config("step count must be at least 1".into()));
        }
        Ok(())
    }

    /// Full img2img endpoint for the configured server.
    pub fn endpoint(&self) -> String {
        let address = self.server_address.trim().trim_end_matches('/');
        let address = address
            .strip_prefix("http://")
            .or_else(|| address.strip_prefix("https://"))
            .unwrap_or(address);
        let scheme = if self.server_address.trim().starts_with("https://") {
            "https"
        } else {
            "http"
        };

        if has_port(address) {
            format!("{}://{}/sdapi/v1/img2img", scheme, address)
        } else {
            format!("{}://{}:{}/sdapi/v1/img2img", scheme, address, DEFAULT_PORT)
        }
    }
}

fn has_port(address: &str) -> bool {
    // Bracketed IPv6 literals carry their port after the closing bracket.
    let host_tail = match address.rfind(']') {
        Some(idx) => &address[idx..],
        None => address,
    };
    match host_tail.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

/// Whole seconds; zero or unparsable means no timeout.
fn parse_timeout(key: &str) -> Option<Duration> {
    parse_env::<u64>(key)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(deserializer)?;
        Ok(secs.filter(|s| *s > 0.0).map(Duration::from_secs_f64))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub generation: GenerationSettings,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            generation: GenerationSettings::default(),
            output_dir: PathBuf::from("retextured"),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let output_dir = env::var("RETEXTURE_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("retextured"));

        Config {
            generation: GenerationSettings::from_env(),
            output_dir,
        }
    }

    pub fn with_generation(mut self, settings: GenerationSettings) -> Self {
        self.generation = settings;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
