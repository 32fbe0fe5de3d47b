pub mod check_frame;
pub mod compose;
pub mod layout;
pub mod overlay;
pub mod templates;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use posterkit_common::config::AppConfig;
use posterkit_common::error::PosterError;
use posterkit_editor_core::{EditorSession, TemplateId};
use posterkit_layer_model::color::Color;
use posterkit_layer_model::content::BusinessProfile;
use posterkit_layer_model::frame::Frame;
use posterkit_layer_model::geometry::CanvasSize;
use posterkit_render_engine::{CapturePipeline, FileAssetSource, SoftwareRenderer};

/// Inputs shared by every command that builds an editor session.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Business profile JSON
    pub profile: PathBuf,

    /// Designer frame JSON to lay out with instead of the default layout
    #[arg(long)]
    pub frame: Option<PathBuf>,

    /// Template style id
    #[arg(long, default_value = "classic")]
    pub template: String,

    /// Field keys to hide (repeatable)
    #[arg(long = "hide")]
    pub hidden: Vec<String>,

    /// Canvas width (defaults to config)
    #[arg(long)]
    pub width: Option<f64>,

    /// Canvas height (defaults to config)
    #[arg(long)]
    pub height: Option<f64>,
}

impl SessionArgs {
    /// Directory relative asset references resolve against.
    pub fn asset_root(&self) -> PathBuf {
        self.profile
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Read a designer frame. Malformed frame data is a template error.
pub fn load_frame(path: &Path) -> anyhow::Result<Frame> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| {
        anyhow::Error::from(PosterError::template(format!(
            "invalid frame {}: {e}",
            path.display()
        )))
    })
}

pub fn canvas_size(config: &AppConfig, width: Option<f64>, height: Option<f64>) -> anyhow::Result<CanvasSize> {
    let canvas = CanvasSize::new(
        width.unwrap_or(config.canvas.width),
        height.unwrap_or(config.canvas.height),
    );
    if !canvas.is_valid() {
        anyhow::bail!("Invalid canvas size {}x{}", canvas.width, canvas.height);
    }
    Ok(canvas)
}

/// Build a session from command-line inputs: profile, template, optional
/// frame, hidden fields.
pub fn build_session(config: &AppConfig, args: &SessionArgs) -> anyhow::Result<EditorSession> {
    let profile: BusinessProfile = read_json(&args.profile)?;
    let mut config = config.clone();
    let canvas = canvas_size(&config, args.width, args.height)?;
    config.canvas.width = canvas.width;
    config.canvas.height = canvas.height;

    let mut session = EditorSession::from_config(&config);
    session.switch_template(TemplateId::from_external(&args.template));
    session.apply_profile(&profile);

    if let Some(path) = &args.frame {
        let frame = load_frame(path)?;
        for problem in frame.validate() {
            tracing::warn!(frame = %frame.id, %problem, "Frame problem");
        }
        session.select_frame(&frame);
    }

    for key in &args.hidden {
        if session.is_field_visible(key) {
            session.toggle_field(key);
        }
    }

    tracing::debug!(
        layers = session.layers().len(),
        template = %session.template(),
        "Built editor session"
    );
    Ok(session)
}

/// Software capture pipeline configured from `config`.
pub fn pipeline(
    config: &AppConfig,
    asset_root: PathBuf,
    font: Option<&Path>,
    pixel_ratio: f64,
) -> anyhow::Result<CapturePipeline<SoftwareRenderer<FileAssetSource>>> {
    let fill: Color = config
        .capture
        .background_fill
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid capture.background_fill: {e}"))?;

    let mut renderer = SoftwareRenderer::new(FileAssetSource::new(asset_root))
        .with_pixel_ratio(pixel_ratio)
        .with_background_fill(fill);
    if let Some(path) = font {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font {}", path.display()))?;
        renderer = renderer.with_font_bytes(bytes)?;
    } else {
        tracing::warn!("No --font given; text layers will render without glyphs");
    }

    Ok(CapturePipeline::from_config(
        renderer,
        &config.capture,
        &config.watermark,
    )?)
}

/// Absolute form of a command-line path, without requiring it to exist.
pub fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterkit_layer_model::content::fields;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("fixtures")
            .join(name)
    }

    fn args() -> SessionArgs {
        SessionArgs {
            profile: fixture("sample-profile.json"),
            frame: None,
            template: "bold".to_string(),
            hidden: vec![fields::EMAIL.to_string()],
            width: None,
            height: None,
        }
    }

    #[test]
    fn test_build_session_from_fixtures() {
        let session = build_session(&AppConfig::default(), &args()).unwrap();
        assert_eq!(session.template(), TemplateId::Bold);
        assert_eq!(session.canvas(), CanvasSize::new(360.0, 640.0));
        assert!(!session.is_field_visible(fields::EMAIL));
        assert!(session.layers().find_field(fields::SERVICES).is_some());
    }

    #[test]
    fn test_build_session_with_frame_and_canvas_override() {
        let mut args = args();
        args.frame = Some(fixture("frames/grand-opening.json"));
        args.width = Some(720.0);
        args.height = Some(1280.0);

        let session = build_session(&AppConfig::default(), &args).unwrap();
        assert_eq!(session.canvas(), CanvasSize::new(720.0, 1280.0));
        assert_eq!(session.active_frame().map(|f| f.id.as_str()), Some("grand-opening"));
        assert!(session.layers().find_field("promoCode").is_some());
    }

    #[test]
    fn test_unknown_template_falls_back() {
        let mut args = args();
        args.template = "neon".to_string();
        let session = build_session(&AppConfig::default(), &args).unwrap();
        assert_eq!(session.template(), TemplateId::Classic);
    }

    #[test]
    fn test_malformed_frame_is_template_error() {
        let path = std::env::temp_dir().join(format!("posterkit-bad-frame-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"id": "broken", "placeholders": [{"key": 1}]}"#).unwrap();
        let err = load_frame(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            err.downcast_ref::<PosterError>(),
            Some(PosterError::Template { .. })
        ));
        assert!(load_frame(&fixture("frames/grand-opening.json")).is_ok());
    }

    #[test]
    fn test_invalid_canvas_rejected() {
        assert!(canvas_size(&AppConfig::default(), Some(0.0), None).is_err());
    }
}
