use retexture::{
    logger::{self, LogLevel, LoggerConfig},
    orchestrator::STYLE_TRANSFER_DENOISING,
    Config, GenerationOutcome, MaskParams, RetextureJob, RetextureOrchestrator,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::development().with_level(LogLevel::Debug))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_settings_info(&config.generation);
    log::info!("📁 Results will be saved to {}", config.output_dir.display());

    let input_path = match env::var("RETEXTURE_INPUT") {
        Ok(path) => path,
        Err(_) => {
            log::error!("❌ RETEXTURE_INPUT is not set; point it at a PNG to retexture");
            return Err("RETEXTURE_INPUT is required".into());
        }
    };

    let source = image::open(&input_path)?;
    log::info!(
        "🖼️  Loaded {} ({}x{})",
        input_path,
        source.width(),
        source.height()
    );

    let mask_image = match env::var("RETEXTURE_MASK") {
        Ok(path) => Some(image::open(path)?),
        Err(_) => None,
    };
    let flag = |key: &str| env::var(key).map(|v| v == "true").unwrap_or(false);

    let mut job = RetextureJob::for_image(&source);
    if let Some(mask) = mask_image.as_ref() {
        log::info!("🎭 Using mask image from RETEXTURE_MASK");
        job = job.with_mask_image(mask).with_label("inpaint_result");
    } else if flag("RETEXTURE_GRADIENT_MASK") {
        log::info!("🎭 Using generated gradient mask");
        job = job
            .with_generated_mask(MaskParams::gradient())
            .with_label("gradient_mask_result");
    } else if flag("RETEXTURE_LOCAL_MASK") {
        log::info!("🎭 Using generated local mask");
        job = job
            .with_generated_mask(MaskParams::local())
            .with_label("local_mask_result");
    } else {
        log::info!("🎨 No mask, running style transfer");
        job = job
            .with_denoising_strength(STYLE_TRANSFER_DENOISING)
            .with_label("style_transfer");
    }

    if let Ok(prompt) = env::var("RETEXTURE_PROMPT") {
        job = job.with_prompt(prompt);
    }

    let mut orchestrator = RetextureOrchestrator::from_config(&config)?;
    match orchestrator.process(job).await {
        GenerationOutcome::Success(image) => {
            log::info!(
                "🎉 Texture transformation completed ({}x{})",
                image.width,
                image.height
            );
            Ok(())
        }
        GenerationOutcome::Failure { kind, message } => {
            log::error!("❌ Texture transformation failed");
            Err(format!("{}: {}", kind, message).into())
        }
    }
}
