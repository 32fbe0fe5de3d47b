//! Validate a frame file and show its resolved placeholders.

use std::path::PathBuf;

use posterkit_common::config::AppConfig;
use posterkit_common::error::PosterError;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    width: Option<f64>,
    height: Option<f64>,
) -> anyhow::Result<()> {
    let frame = super::load_frame(&path)?;
    let canvas = super::canvas_size(config, width, height)?;

    println!("Frame: {} ({})", frame.id, frame.name.as_deref().unwrap_or("unnamed"));
    println!("Canvas: {}x{}", canvas.width, canvas.height);
    println!("Placeholders: {}", frame.placeholders.len());

    for placeholder in &frame.placeholders {
        let rect = placeholder.resolve(canvas);
        println!(
            "  {:<20} {:<6} x={:.1} y={:.1} w={:.1} h={:.1}",
            placeholder.key.as_str(),
            format!("{:?}", placeholder.content_kind),
            rect.position.x,
            rect.position.y,
            rect.size.width,
            rect.size.height
        );
    }

    let problems = frame.validate();
    if problems.is_empty() {
        println!("OK");
        return Ok(());
    }
    for problem in &problems {
        println!("  problem: {problem}");
    }
    Err(PosterError::template(format!(
        "{} problem(s) in {}",
        problems.len(),
        path.display()
    ))
    .into())
}
