//! Export a transparent overlay and layer geometry for a video compositor.

use std::path::PathBuf;

use posterkit_common::config::AppConfig;
use posterkit_render_engine::{overlay_bundle, MediaRef, OverlayFallback};

use super::SessionArgs;

pub async fn run(
    config: &AppConfig,
    args: SessionArgs,
    video: String,
    output: PathBuf,
    entitled: bool,
    font: Option<PathBuf>,
    pixel_ratio: f64,
) -> anyhow::Result<()> {
    println!("Capturing overlay for: {video}");

    let session = super::build_session(config, &args)?;
    let pipeline = super::pipeline(config, args.asset_root(), font.as_deref(), pixel_ratio)?;

    let bundle = match overlay_bundle(&pipeline, &session, MediaRef::video(video), entitled).await {
        Ok(bundle) => bundle,
        Err(OverlayFallback { source, reason }) => {
            println!("Overlay capture failed ({reason}); use the source video {source} as-is");
            return Ok(());
        }
    };

    std::fs::create_dir_all(&output)?;
    let png_path = output.join("overlay.png");
    let json_path = output.join("overlay.json");
    std::fs::write(&png_path, &bundle.overlay.png)?;
    std::fs::write(&json_path, serde_json::to_string_pretty(&bundle)?)?;

    println!("Overlay:  {}", png_path.display());
    println!("Geometry: {} ({} layers)", json_path.display(), bundle.layers.len());
    Ok(())
}
