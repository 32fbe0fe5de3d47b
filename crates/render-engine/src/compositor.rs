//! Composition: the flattened, paint-ordered view of a layer stack.
//!
//! A [`Composition`] is what a renderer consumes. It owns copies of the
//! layers it paints, so it can outlive the editor state it was built from.

use serde::{Deserialize, Serialize};

use posterkit_layer_model::geometry::CanvasSize;
use posterkit_layer_model::layer::{Layer, LayerId, LayerList};
use posterkit_layer_model::visibility::VisibilityMask;

/// Kind of background media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Reference to caller-owned media (local path, `file://`, `data:` or remote URI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub uri: String,
    pub kind: MediaKind,
}

impl MediaRef {
    pub fn image(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: MediaKind::Image,
        }
    }

    pub fn video(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: MediaKind::Video,
        }
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Paint instructions for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub canvas: CanvasSize,

    /// Painted first, cover-fit to the canvas. `None` leaves the canvas
    /// transparent (overlay-only capture).
    pub background: Option<MediaRef>,

    /// Visible layers in ascending paint order.
    pub layers: Vec<Layer>,

    /// Id of the injected watermark layer, if any.
    pub watermark: Option<LayerId>,
}

impl Composition {
    pub fn top_z_index(&self) -> Option<i32> {
        self.layers.iter().map(|l| l.z_index).max()
    }

    /// Append a layer that paints above everything already present.
    pub fn push_top(&mut self, mut layer: Layer) -> LayerId {
        layer.z_index = self.top_z_index().map_or(0, |z| z.saturating_add(1));
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Layers excluding the watermark.
    pub fn content_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers
            .iter()
            .filter(move |l| Some(l.id) != self.watermark)
    }

    pub fn watermark_layer(&self) -> Option<&Layer> {
        let id = self.watermark?;
        self.layers.iter().find(|l| l.id == id)
    }
}

/// Layers that survive the mask, in ascending paint order.
pub fn paint_list<'a>(layers: &'a LayerList, mask: &VisibilityMask) -> Vec<&'a Layer> {
    layers
        .paint_order()
        .into_iter()
        .filter(|l| mask.shows(l))
        .collect()
}

/// Build the preview composition for a layer stack.
///
/// Pass the *displayed* layers (committed geometry plus in-flight gesture
/// deltas) so the preview follows the user's finger.
pub fn render_preview(
    layers: &LayerList,
    mask: &VisibilityMask,
    canvas: CanvasSize,
    background: Option<&MediaRef>,
) -> Composition {
    let painted: Vec<Layer> = paint_list(layers, mask).into_iter().cloned().collect();
    tracing::trace!(
        total = layers.len(),
        painted = painted.len(),
        "Built preview composition"
    );

    Composition {
        canvas,
        background: background.cloned(),
        layers: painted,
        watermark: None,
    }
}
