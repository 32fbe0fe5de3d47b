//! PosterKit Editor Core
//!
//! Turns business data into layers and keeps them editable:
//! - **Template Mapper:** profile to content map, default layout, frame layout,
//!   and per-template color styling
//! - **Transform Controller:** pan/pinch gesture state machine with
//!   boundary clamping and scale limits
//! - **Editor Session:** owns the layer list, visibility mask, and controller,
//!   and sequences template/frame switches against in-flight gestures
//!
//! This crate is pure computation: no I/O, no async.
//! All inputs are data; all outputs are data.

pub mod content;
pub mod frame_layout;
pub mod layout;
pub mod session;
pub mod style;
pub mod transform;

pub use content::map_profile_to_content;
pub use frame_layout::generate_layers_from_frame;
pub use layout::generate_default_layers;
pub use session::EditorSession;
pub use style::{apply_template_style, TemplateId, TemplatePalette};
pub use transform::{InvalidScaleLimits, ScaleLimits, TransformController, TransformError};
