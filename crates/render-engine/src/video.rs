//! Video path: overlay bundle for an external compositor.
//!
//! The engine never touches video frames. It captures the layers as a
//! transparent overlay, pairs it with flat layer geometry, and hands both to
//! a [`VideoCompositor`], which burns the overlay uniformly across the
//! source video's duration.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use posterkit_common::error::PosterResult;
use posterkit_editor_core::EditorSession;
use posterkit_layer_model::geometry::CanvasSize;
use posterkit_layer_model::layer::LayerGeometry;

use crate::artifact::ImageArtifact;
use crate::capture::{CaptureOutcome, CapturePipeline};
use crate::compositor::MediaRef;
use crate::renderer::SnapshotRenderer;
use crate::snapshot::CaptureMode;

/// Everything a video compositor needs to burn the overlay in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoOverlayBundle {
    /// Transparent PNG of every visible layer (watermark included).
    pub overlay: ImageArtifact,

    /// Visible layers in paint order, watermark excluded.
    pub layers: Vec<LayerGeometry>,

    pub canvas: CanvasSize,

    pub source_video: MediaRef,

    pub captured_at: DateTime<Utc>,
}

/// External collaborator that burns an overlay into a video.
#[async_trait::async_trait]
pub trait VideoCompositor: Send + Sync {
    /// Compose and return a reference to the finished video.
    async fn compose(&self, bundle: &VideoOverlayBundle) -> PosterResult<MediaRef>;
}

/// Result of a video export.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoExport {
    Composed(MediaRef),

    /// Overlay capture or compositing failed; the source video is handed back.
    Fallback { source: MediaRef, reason: String },
}

impl VideoExport {
    pub fn is_fallback(&self) -> bool {
        matches!(self, VideoExport::Fallback { .. })
    }

    /// Reference the caller should persist or share.
    pub fn media(&self) -> &MediaRef {
        match self {
            VideoExport::Composed(media) => media,
            VideoExport::Fallback { source, .. } => source,
        }
    }
}

/// Overlay capture failed; the source video should be used unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFallback {
    pub source: MediaRef,
    pub reason: String,
}

impl From<OverlayFallback> for VideoExport {
    fn from(fallback: OverlayFallback) -> Self {
        VideoExport::Fallback {
            source: fallback.source,
            reason: fallback.reason,
        }
    }
}

/// Capture the overlay bundle for `session` without compositing it.
pub fn overlay_bundle<'a, R: SnapshotRenderer>(
    pipeline: &'a CapturePipeline<R>,
    session: &EditorSession,
    source_video: MediaRef,
    is_entitled: bool,
) -> impl Future<Output = Result<VideoOverlayBundle, OverlayFallback>> + Send + 'a {
    let request = pipeline.request(CaptureMode::OverlayOnly, session, source_video, is_entitled);
    let layers = request.layer_geometry();
    let canvas = request.canvas();
    let source_video = request.source.clone();

    async move {
        match pipeline.capture(request).await {
            CaptureOutcome::Composed(overlay) => Ok(VideoOverlayBundle {
                overlay,
                layers,
                canvas,
                source_video,
                captured_at: Utc::now(),
            }),
            CaptureOutcome::Fallback { source, reason } => Err(OverlayFallback { source, reason }),
        }
    }
}

/// Export a video: capture the overlay, then hand it to `compositor`.
///
/// Never fails hard. Any failure yields [`VideoExport::Fallback`] with the
/// original source video.
pub fn export_video<'a, R, C>(
    pipeline: &'a CapturePipeline<R>,
    compositor: &'a C,
    session: &EditorSession,
    source_video: MediaRef,
    is_entitled: bool,
) -> impl Future<Output = VideoExport> + Send + 'a
where
    R: SnapshotRenderer,
    C: VideoCompositor,
{
    let bundle = overlay_bundle(pipeline, session, source_video, is_entitled);

    async move {
        let bundle = match bundle.await {
            Ok(bundle) => bundle,
            Err(fallback) => return fallback.into(),
        };

        tracing::info!(
            source = %bundle.source_video,
            layers = bundle.layers.len(),
            "Handing overlay to video compositor"
        );
        match compositor.compose(&bundle).await {
            Ok(video) => {
                tracing::info!(output = %video, "Video export complete");
                VideoExport::Composed(video)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Video compositing failed; falling back to source video");
                VideoExport::Fallback {
                    source: bundle.source_video,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use image::{Rgba, RgbaImage};
    use posterkit_common::error::PosterError;
    use posterkit_editor_core::ScaleLimits;
    use posterkit_layer_model::content::{fields, BusinessProfile};

    use crate::compositor::Composition;
    use crate::watermark::WatermarkSpec;

    struct BlankRenderer;

    #[async_trait::async_trait]
    impl SnapshotRenderer for BlankRenderer {
        async fn render(&self, composition: &Composition) -> PosterResult<RgbaImage> {
            let (w, h) = composition.canvas.pixel_dimensions();
            Ok(RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0])))
        }

        fn name(&self) -> &str {
            "blank"
        }
    }

    struct FailingRenderer;

    #[async_trait::async_trait]
    impl SnapshotRenderer for FailingRenderer {
        async fn render(&self, _composition: &Composition) -> PosterResult<RgbaImage> {
            Err(PosterError::render("surface lost"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct RecordingCompositor {
        fail: bool,
        bundles: Mutex<Vec<VideoOverlayBundle>>,
    }

    #[async_trait::async_trait]
    impl VideoCompositor for RecordingCompositor {
        async fn compose(&self, bundle: &VideoOverlayBundle) -> PosterResult<MediaRef> {
            self.bundles.lock().unwrap().push(bundle.clone());
            if self.fail {
                return Err(PosterError::render("encoder crashed"));
            }
            Ok(MediaRef::video("composed.mp4"))
        }
    }

    fn session() -> EditorSession {
        let mut session = EditorSession::new(CanvasSize::new(90.0, 160.0), ScaleLimits::default());
        session.apply_profile(&BusinessProfile {
            name: Some("Acme Co".to_string()),
            phone: Some("555-1234".to_string()),
            ..Default::default()
        });
        session.toggle_field(fields::PHONE);
        session
    }

    #[tokio::test]
    async fn test_bundle_carries_visible_geometry_and_canvas() {
        let pipeline = CapturePipeline::new(BlankRenderer, WatermarkSpec::default());
        let compositor = RecordingCompositor::default();
        let s = session();

        let export = export_video(&pipeline, &compositor, &s, MediaRef::video("clip.mp4"), false).await;
        assert_eq!(export, VideoExport::Composed(MediaRef::video("composed.mp4")));

        let bundles = compositor.bundles.lock().unwrap();
        let bundle = &bundles[0];
        assert_eq!(bundle.canvas, CanvasSize::new(90.0, 160.0));
        assert_eq!(bundle.source_video, MediaRef::video("clip.mp4"));
        assert_eq!((bundle.overlay.width, bundle.overlay.height), (90, 160));
        assert!(bundle.layers.iter().all(|g| g.field_type.as_ref().map(|k| k.as_str()) != Some(fields::PHONE)));
        assert_eq!(bundle.layers.len(), s.layers().len() - 1);
    }

    #[tokio::test]
    async fn test_compositor_failure_returns_source_video() {
        let pipeline = CapturePipeline::new(BlankRenderer, WatermarkSpec::default());
        let compositor = RecordingCompositor {
            fail: true,
            ..Default::default()
        };
        let export = export_video(&pipeline, &compositor, &session(), MediaRef::video("clip.mp4"), true).await;

        assert!(export.is_fallback());
        assert_eq!(export.media(), &MediaRef::video("clip.mp4"));
    }

    #[tokio::test]
    async fn test_failed_overlay_capture_skips_compositor() {
        let pipeline = CapturePipeline::new(FailingRenderer, WatermarkSpec::default());
        let fallback = overlay_bundle(&pipeline, &session(), MediaRef::video("clip.mp4"), false)
            .await
            .unwrap_err();
        assert_eq!(fallback.source, MediaRef::video("clip.mp4"));
        assert!(fallback.reason.contains("surface lost"));

        let compositor = RecordingCompositor::default();
        let export = export_video(&pipeline, &compositor, &session(), MediaRef::video("clip.mp4"), false).await;
        assert_eq!(
            export,
            VideoExport::Fallback {
                source: MediaRef::video("clip.mp4"),
                reason: fallback.reason,
            }
        );
        assert!(compositor.bundles.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bundle_json_shape() {
        let bundle = VideoOverlayBundle {
            overlay: ImageArtifact {
                width: 1,
                height: 1,
                png: vec![1, 2, 3],
            },
            layers: vec![],
            canvas: CanvasSize::new(360.0, 640.0),
            source_video: MediaRef::video("clip.mp4"),
            captured_at: Utc::now(),
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert_eq!(value["sourceVideo"]["kind"], "video");
        assert_eq!(value["overlay"]["png"], "AQID");
        assert!(value["capturedAt"].is_string());
    }
}
