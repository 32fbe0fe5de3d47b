//! Capture requests: geometry frozen before a capture suspends.
//!
//! Building a [`CaptureRequest`] is synchronous and copies everything the
//! renderer needs. Once built, later edits to the session cannot affect
//! the capture.

use posterkit_editor_core::EditorSession;
use posterkit_layer_model::geometry::CanvasSize;
use posterkit_layer_model::layer::{LayerGeometry, LayerList};
use posterkit_layer_model::visibility::VisibilityMask;

use crate::compositor::{render_preview, Composition, MediaRef};
use crate::watermark::WatermarkSpec;

/// What a capture paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Background plus layers, flattened.
    Full,
    /// Layers only, on a transparent canvas.
    OverlayOnly,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Full => f.write_str("full"),
            CaptureMode::OverlayOnly => f.write_str("overlay"),
        }
    }
}

/// A self-contained capture job.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub mode: CaptureMode,

    /// Source media. Painted in [`CaptureMode::Full`]; returned unchanged
    /// when the capture fails.
    pub source: MediaRef,

    pub composition: Composition,
}

impl CaptureRequest {
    /// Freeze `layers` (already carrying displayed geometry) into a request.
    pub fn from_layers(
        mode: CaptureMode,
        layers: &LayerList,
        mask: &VisibilityMask,
        canvas: CanvasSize,
        source: MediaRef,
        is_entitled: bool,
        watermark: &WatermarkSpec,
    ) -> Self {
        let background = match mode {
            CaptureMode::Full => Some(&source),
            CaptureMode::OverlayOnly => None,
        };
        let mut composition = render_preview(layers, mask, canvas, background);
        watermark.apply(&mut composition, is_entitled);

        Self {
            mode,
            source,
            composition,
        }
    }

    /// Freeze a session as the user currently sees it, in-flight gestures
    /// included.
    pub fn from_session(
        mode: CaptureMode,
        session: &EditorSession,
        source: MediaRef,
        is_entitled: bool,
        watermark: &WatermarkSpec,
    ) -> Self {
        Self::from_layers(
            mode,
            &session.displayed_layers(),
            session.mask(),
            session.canvas(),
            source,
            is_entitled,
            watermark,
        )
    }

    pub fn canvas(&self) -> CanvasSize {
        self.composition.canvas
    }

    pub fn has_watermark(&self) -> bool {
        self.composition.watermark.is_some()
    }

    /// Flat geometry of the painted layers, watermark excluded.
    pub fn layer_geometry(&self) -> Vec<LayerGeometry> {
        self.composition
            .content_layers()
            .map(LayerGeometry::from)
            .collect()
    }
}
