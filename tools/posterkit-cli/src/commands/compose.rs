//! Compose a still poster over a background image.

use std::path::PathBuf;

use posterkit_common::config::AppConfig;
use posterkit_render_engine::{CaptureOutcome, MediaRef};

use super::SessionArgs;

pub async fn run(
    config: &AppConfig,
    args: SessionArgs,
    background: PathBuf,
    output: PathBuf,
    entitled: bool,
    font: Option<PathBuf>,
    pixel_ratio: f64,
) -> anyhow::Result<()> {
    println!("Composing poster from: {}", args.profile.display());

    let session = super::build_session(config, &args)?;
    let pipeline = super::pipeline(config, args.asset_root(), font.as_deref(), pixel_ratio)?;
    let background = super::absolute(&background)?;
    let source = MediaRef::image(background.to_string_lossy());

    match pipeline.capture_image(&session, source, entitled).await {
        CaptureOutcome::Composed(artifact) => {
            std::fs::write(&output, &artifact.png)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;
            println!(
                "Wrote {}x{} poster to {}",
                artifact.width,
                artifact.height,
                output.display()
            );
        }
        CaptureOutcome::Fallback { source, reason } => {
            println!("Capture failed ({reason}); keeping source image {source}");
            if background.exists() {
                std::fs::copy(&background, &output)?;
                println!("Copied source to {}", output.display());
            }
        }
    }

    Ok(())
}
