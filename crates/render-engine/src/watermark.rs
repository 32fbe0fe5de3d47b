//! Capture-time watermark for non-entitled users.
//!
//! The watermark is never part of an editor's layer list. It is injected
//! into a [`Composition`] at capture time, above every other layer.

use posterkit_common::config::WatermarkConfig;
use posterkit_common::error::{PosterError, PosterResult};
use posterkit_layer_model::color::Color;
use posterkit_layer_model::geometry::{CanvasSize, Rect};
use posterkit_layer_model::layer::{FontWeight, Layer, LayerId, TextStyle};

use crate::compositor::Composition;

/// Approximate glyph advance as a fraction of font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;
const LINE_HEIGHT_RATIO: f64 = 1.6;

/// Whether a capture must carry the watermark.
pub fn should_watermark(is_entitled: bool) -> bool {
    !is_entitled
}

/// Resolved watermark appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    pub text: String,
    pub font_size: f64,
    pub color: Color,
    pub background: Color,
    pub margin: f64,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: "Made with PosterKit".to_string(),
            font_size: 12.0,
            color: Color::WHITE,
            background: Color::rgba(0, 0, 0, 153),
            margin: 8.0,
        }
    }
}

impl TryFrom<&WatermarkConfig> for WatermarkSpec {
    type Error = PosterError;

    fn try_from(config: &WatermarkConfig) -> PosterResult<Self> {
        let color = config
            .color
            .parse::<Color>()
            .map_err(|e| PosterError::config(format!("watermark.color: {e}")))?;
        let background = config
            .background
            .parse::<Color>()
            .map_err(|e| PosterError::config(format!("watermark.background: {e}")))?;
        if !(config.font_size.is_finite() && config.font_size > 0.0) {
            return Err(PosterError::config("watermark.font_size must be positive"));
        }

        Ok(Self {
            text: config.text.clone(),
            font_size: config.font_size,
            color,
            background,
            margin: config.margin.max(0.0),
        })
    }
}

impl WatermarkSpec {
    /// Badge layer anchored to the bottom-right corner of `canvas`.
    pub fn layer(&self, canvas: CanvasSize) -> Layer {
        let padding = self.font_size * 0.5;
        let width = self.text.chars().count() as f64 * self.font_size * GLYPH_WIDTH_RATIO
            + 2.0 * padding;
        let height = self.font_size * LINE_HEIGHT_RATIO;
        let rect = Rect::new(
            canvas.width - self.margin - width,
            canvas.height - self.margin - height,
            width,
            height,
        )
        .fit_within(canvas);

        let style = TextStyle {
            font_size: self.font_size,
            color: self.color,
            font_family: "System".to_string(),
            font_weight: FontWeight::Semibold,
            background_color: Some(self.background),
        };
        Layer::text(self.text.clone(), style, rect)
    }

    /// Inject the watermark above every layer of `composition` when the user
    /// is not entitled. Returns the injected layer's id.
    pub fn apply(&self, composition: &mut Composition, is_entitled: bool) -> Option<LayerId> {
        if !should_watermark(is_entitled) {
            return None;
        }
        let id = composition.push_top(self.layer(composition.canvas));
        composition.watermark = Some(id);
        Some(id)
    }
}
