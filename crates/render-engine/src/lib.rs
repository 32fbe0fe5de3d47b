//! PosterKit Render Engine
//!
//! Flattens an editor's layer stack into export artifacts: a still image,
//! or a transparent overlay plus layer geometry for an external video
//! compositor.
//!
//! # Pipeline Architecture
//!
//! ```text
//! EditorSession ──┐
//!  (displayed     ├── CaptureRequest (sync snapshot)
//!   layers, mask) │        │
//! entitlement ────┘        ├── Watermark (top zIndex, capture-time only)
//!                          │
//!                          ▼
//!                  CapturePipeline (gate + timeout)
//!                          │
//!                          ▼
//!                  SnapshotRenderer ── AssetSource (background, images)
//!                          │
//!                ┌─────────┴──────────┐
//!                ▼                    ▼
//!         ImageArtifact (PNG)   Fallback(source media)
//!                │
//!                ▼ (video path)
//!       VideoOverlayBundle ──► VideoCompositor
//! ```

pub mod artifact;
pub mod capture;
pub mod compositor;
pub mod renderer;
pub mod snapshot;
pub mod video;
pub mod watermark;

pub use artifact::ImageArtifact;
pub use capture::{CaptureOutcome, CapturePipeline};
pub use compositor::{paint_list, render_preview, Composition, MediaKind, MediaRef};
pub use renderer::{AssetSource, FileAssetSource, MemoryAssetSource, SnapshotRenderer, SoftwareRenderer};
pub use snapshot::{CaptureMode, CaptureRequest};
pub use video::{
    export_video, overlay_bundle, OverlayFallback, VideoCompositor, VideoExport, VideoOverlayBundle,
};
pub use watermark::{should_watermark, WatermarkSpec};
