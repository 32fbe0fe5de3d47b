//! PosterKit Layer Model
//!
//! Defines the core data contracts for poster composition:
//! - **Geometry:** Canvas-local positions, sizes, and rectangles
//! - **Layers:** Positioned text, panel, image, and logo elements
//! - **Content:** Business profile data flattened to semantic field keys
//! - **Frames:** Designer-authored placeholder templates
//! - **Visibility:** Per-field show/hide state that outlives layer lists
//!
//! All coordinates are canvas-local layout units with a top-left origin.
//! Committed geometry always lies within `[0, width] x [0, height]`.

pub mod color;
pub mod content;
pub mod frame;
pub mod geometry;
pub mod layer;
pub mod visibility;

pub use color::*;
pub use content::*;
pub use frame::*;
pub use geometry::*;
pub use layer::*;
pub use visibility::*;
