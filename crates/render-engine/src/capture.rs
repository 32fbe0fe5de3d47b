//! Capture pipeline: snapshot, rasterize, encode.
//!
//! Every capture entry point freezes its [`CaptureRequest`] synchronously
//! and only then suspends, so edits made while a capture is pending never
//! leak into it. Captures are serialized through a gate: a request issued
//! while another is in flight waits for it and then renders its own fresh
//! snapshot.
//!
//! Capture failures (renderer error, timeout, encode error) are not errors
//! to the caller. They produce [`CaptureOutcome::Fallback`] carrying the
//! original source media.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use posterkit_common::config::{CaptureConfig, WatermarkConfig};
use posterkit_common::error::{PosterError, PosterResult};
use posterkit_editor_core::EditorSession;
use posterkit_layer_model::geometry::CanvasSize;
use posterkit_layer_model::layer::LayerList;
use posterkit_layer_model::visibility::VisibilityMask;

use crate::artifact::ImageArtifact;
use crate::compositor::MediaRef;
use crate::renderer::SnapshotRenderer;
use crate::snapshot::{CaptureMode, CaptureRequest};
use crate::watermark::WatermarkSpec;

/// Result of a capture. Both variants are successes from the caller's
/// point of view; `Fallback` is the degraded one.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Flattened raster of the composition.
    Composed(ImageArtifact),

    /// Capture failed; the uncomposited source is handed back.
    Fallback { source: MediaRef, reason: String },
}

impl CaptureOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, CaptureOutcome::Fallback { .. })
    }

    pub fn artifact(&self) -> Option<&ImageArtifact> {
        match self {
            CaptureOutcome::Composed(artifact) => Some(artifact),
            CaptureOutcome::Fallback { .. } => None,
        }
    }
}

/// Serialized, time-bounded capture front-end over a [`SnapshotRenderer`].
pub struct CapturePipeline<R> {
    renderer: R,
    watermark: WatermarkSpec,
    timeout: Duration,
    gate: Mutex<()>,
}

impl<R: SnapshotRenderer> CapturePipeline<R> {
    pub fn new(renderer: R, watermark: WatermarkSpec) -> Self {
        Self {
            renderer,
            watermark,
            timeout: Duration::from_millis(CaptureConfig::default().timeout_ms),
            gate: Mutex::new(()),
        }
    }

    /// Build from configuration. Fails only on malformed watermark colors.
    pub fn from_config(
        renderer: R,
        capture: &CaptureConfig,
        watermark: &WatermarkConfig,
    ) -> PosterResult<Self> {
        let spec = WatermarkSpec::try_from(watermark)?;
        Ok(Self::new(renderer, spec).with_timeout(Duration::from_millis(capture.timeout_ms)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn watermark(&self) -> &WatermarkSpec {
        &self.watermark
    }

    /// Freeze a session for capture.
    pub fn request(
        &self,
        mode: CaptureMode,
        session: &EditorSession,
        source: MediaRef,
        is_entitled: bool,
    ) -> CaptureRequest {
        CaptureRequest::from_session(mode, session, source, is_entitled, &self.watermark)
    }

    /// Capture the session flattened over `background`.
    ///
    /// The snapshot is taken before this returns; the session may be
    /// mutated while the returned future is pending.
    pub fn capture_image(
        &self,
        session: &EditorSession,
        background: MediaRef,
        is_entitled: bool,
    ) -> impl Future<Output = CaptureOutcome> + Send + '_ {
        let request = self.request(CaptureMode::Full, session, background, is_entitled);
        self.capture(request)
    }

    /// Capture only the layers, on a transparent canvas sized to `canvas`.
    /// On failure the outcome falls back to `source`.
    pub fn capture_overlay_only(
        &self,
        layers: &LayerList,
        mask: &VisibilityMask,
        canvas: CanvasSize,
        source: MediaRef,
        is_entitled: bool,
    ) -> impl Future<Output = CaptureOutcome> + Send + '_ {
        let request = CaptureRequest::from_layers(
            CaptureMode::OverlayOnly,
            layers,
            mask,
            canvas,
            source,
            is_entitled,
            &self.watermark,
        );
        self.capture(request)
    }

    /// Run a frozen request through the renderer.
    pub async fn capture(&self, request: CaptureRequest) -> CaptureOutcome {
        let _turn = self.gate.lock().await;
        let started = Instant::now();

        tracing::info!(
            mode = %request.mode,
            renderer = self.renderer.name(),
            layers = request.composition.layers.len(),
            watermark = request.has_watermark(),
            "Starting capture"
        );

        match self.render(&request).await {
            Ok(artifact) => {
                tracing::info!(
                    width = artifact.width,
                    height = artifact.height,
                    bytes = artifact.png.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Capture complete"
                );
                CaptureOutcome::Composed(artifact)
            }
            Err(e) => {
                tracing::warn!(
                    source = %request.source,
                    error = %e,
                    "Capture failed; falling back to source media"
                );
                CaptureOutcome::Fallback {
                    source: request.source,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn render(&self, request: &CaptureRequest) -> PosterResult<ImageArtifact> {
        let image = tokio::time::timeout(self.timeout, self.renderer.render(&request.composition))
            .await
            .map_err(|_| {
                PosterError::capture(format!("timed out after {} ms", self.timeout.as_millis()))
            })??;
        ImageArtifact::from_rgba(&image)
    }
}
