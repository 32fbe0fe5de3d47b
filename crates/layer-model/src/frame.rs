//! Designer-authored frame templates.
//!
//! A [`Frame`] is read-only data supplied by the template asset provider.
//! Each [`Placeholder`] declares a field key, geometry (relative fractions
//! of the canvas or absolute units), a content kind, and default styling.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::content::FieldKey;
use crate::geometry::{CanvasSize, Rect};
use crate::layer::FontWeight;

/// A designer frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Ordered placeholders; later entries paint above earlier ones.
    pub placeholders: Vec<Placeholder>,
}

/// One slot within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    /// Semantic field key; becomes the layer's `fieldType`.
    pub key: FieldKey,

    /// How `x`, `y`, `width`, and `height` are interpreted.
    #[serde(default)]
    pub units: Units,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    pub content_kind: ContentKind,

    #[serde(default)]
    pub default_style: PlaceholderStyle,
}

/// Geometry units for a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Fractions of the canvas width/height in `[0, 1]`.
    #[default]
    Relative,
    /// Canvas layout units.
    Absolute,
}

/// What a placeholder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Logo,
    Panel,
}

/// Default styling attached to a placeholder. Unset values fall back to
/// generator defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceholderStyle {
    pub font_size: Option<f64>,
    pub color: Option<Color>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub background_color: Option<Color>,
}

/// Problems found by [`Frame::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("frame id is empty")]
    EmptyId,

    #[error("placeholder {index} ({key}) has non-finite or negative geometry")]
    InvalidGeometry { index: usize, key: String },

    #[error("placeholder {index} ({key}) has relative geometry outside [0, 1]")]
    RelativeOutOfRange { index: usize, key: String },

    #[error("placeholder key {key} appears more than once")]
    DuplicateKey { key: String },
}

impl Placeholder {
    /// Resolve this placeholder's geometry against an actual canvas, clamped
    /// so the result satisfies the committed-geometry invariants.
    pub fn resolve(&self, canvas: CanvasSize) -> Rect {
        let raw = match self.units {
            Units::Relative => Rect::new(
                self.x * canvas.width,
                self.y * canvas.height,
                self.width * canvas.width,
                self.height * canvas.height,
            ),
            Units::Absolute => Rect::new(self.x, self.y, self.width, self.height),
        };
        raw.fit_within(canvas)
    }
}

impl Frame {
    /// Placeholder keys in declaration order, without duplicates.
    pub fn keys(&self) -> Vec<FieldKey> {
        let mut seen = BTreeSet::new();
        self.placeholders
            .iter()
            .filter(|p| seen.insert(p.key.clone()))
            .map(|p| p.key.clone())
            .collect()
    }

    /// Collect every structural problem in this frame.
    ///
    /// Generation tolerates all of these (geometry is clamped, duplicate keys
    /// produce multiple layers); validation exists for asset authoring tools.
    pub fn validate(&self) -> Vec<FrameError> {
        let mut errors = vec![];
        if self.id.trim().is_empty() {
            errors.push(FrameError::EmptyId);
        }

        let mut seen = BTreeSet::new();
        for (index, p) in self.placeholders.iter().enumerate() {
            let values = [p.x, p.y, p.width, p.height];
            let key = p.key.to_string();
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                errors.push(FrameError::InvalidGeometry { index, key });
            } else if p.units == Units::Relative && values.iter().any(|v| *v > 1.0) {
                errors.push(FrameError::RelativeOutOfRange { index, key });
            }

            if !seen.insert(p.key.as_str()) {
                errors.push(FrameError::DuplicateKey {
                    key: p.key.to_string(),
                });
            }
        }
        errors
    }
}
