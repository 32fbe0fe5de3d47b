//! Gesture-driven layer transforms.
//!
//! Each layer has two independent gesture tracks, pan and pinch, each
//! `Idle → Active → Idle`. Transient per-gesture state lives in side tables
//! keyed by [`LayerId`]: an entry is created by `begin_*` and removed by
//! `end_*` (or a cancel/reset), so the layer list itself only ever holds
//! committed geometry.
//!
//! - **Pan** accumulates the raw pointer delta without clamping while the
//!   gesture is live; the clamped position is committed once on `end_pan`.
//! - **Pinch** recomputes size from the size captured at `begin_pinch` on
//!   every change and writes it straight into the layer. Scaling is anchored
//!   at the layer's top-left corner, so position never moves.

use std::collections::HashMap;

use posterkit_common::config::GestureConfig;
use posterkit_layer_model::geometry::{clamp_range, CanvasSize, Position, Size};
use posterkit_layer_model::layer::{Layer, LayerId, LayerList};

/// Allowed pinch factors relative to the pre-gesture size.
///
/// Always finite with `0 < min <= max`; construction rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    min: f64,
    max: f64,
}

/// Scale limits that cannot bound a pinch.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid scale limits [{min}, {max}]")]
pub struct InvalidScaleLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min: 0.2, max: 5.0 }
    }
}

impl ScaleLimits {
    pub fn new(min: f64, max: f64) -> Result<Self, InvalidScaleLimits> {
        if min.is_finite() && max.is_finite() && min > 0.0 && min <= max {
            Ok(Self { min, max })
        } else {
            Err(InvalidScaleLimits { min, max })
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamp a raw pinch factor. Non-finite input counts as "no scaling".
    pub fn clamp(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return 1.0_f64.clamp(self.min, self.max);
        }
        scale.clamp(self.min, self.max)
    }
}

impl From<&GestureConfig> for ScaleLimits {
    /// Unusable configured limits fall back to the defaults.
    fn from(config: &GestureConfig) -> Self {
        Self::new(config.min_scale, config.max_scale).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring configured scale limits");
            Self::default()
        })
    }
}

/// The two gesture tracks a layer supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Pan,
    Pinch,
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureKind::Pan => f.write_str("pan"),
            GestureKind::Pinch => f.write_str("pinch"),
        }
    }
}

/// Gesture sequencing errors. All are recoverable: the caller drops the
/// offending event and layer geometry is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("{0} is not in the layer list")]
    UnknownLayer(LayerId),

    #[error("{gesture} gesture already active on {id}")]
    GestureActive { id: LayerId, gesture: GestureKind },

    #[error("no {gesture} gesture active on {id}")]
    GestureIdle { id: LayerId, gesture: GestureKind },
}

#[derive(Debug, Clone, Copy)]
struct PanState {
    dx: f64,
    dy: f64,
}

#[derive(Debug, Clone, Copy)]
struct PinchState {
    origin: Size,
}

/// Per-layer pan/pinch state machine plus the editor's selection.
#[derive(Debug, Clone)]
pub struct TransformController {
    canvas: CanvasSize,
    limits: ScaleLimits,
    commit_epsilon: f64,
    pans: HashMap<LayerId, PanState>,
    pinches: HashMap<LayerId, PinchState>,
    selected: Option<LayerId>,
    dragging: Option<LayerId>,
}

impl TransformController {
    pub fn new(canvas: CanvasSize, limits: ScaleLimits) -> Self {
        Self {
            canvas,
            limits,
            commit_epsilon: 1e-6,
            pans: HashMap::new(),
            pinches: HashMap::new(),
            selected: None,
            dragging: None,
        }
    }

    /// Build a controller from gesture configuration.
    pub fn from_config(canvas: CanvasSize, config: &GestureConfig) -> Self {
        let mut controller = Self::new(canvas, ScaleLimits::from(config));
        if config.commit_epsilon.is_finite() {
            controller.commit_epsilon = config.commit_epsilon.abs();
        }
        controller
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn limits(&self) -> ScaleLimits {
        self.limits
    }

    /// Globally selected layer, target of style and delete actions.
    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<LayerId>) {
        self.selected = id;
    }

    /// Layer currently being dragged, if any.
    pub fn dragging(&self) -> Option<LayerId> {
        self.dragging
    }

    pub fn is_active(&self, id: LayerId, gesture: GestureKind) -> bool {
        match gesture {
            GestureKind::Pan => self.pans.contains_key(&id),
            GestureKind::Pinch => self.pinches.contains_key(&id),
        }
    }

    /// Whether no gesture is in flight on any layer.
    pub fn is_idle(&self) -> bool {
        self.pans.is_empty() && self.pinches.is_empty()
    }

    /// Start a pan. The layer becomes selected and is marked as dragging.
    pub fn begin_pan(&mut self, layers: &LayerList, id: LayerId) -> Result<(), TransformError> {
        if !layers.contains(id) {
            return Err(TransformError::UnknownLayer(id));
        }
        if self.pans.contains_key(&id) {
            return Err(TransformError::GestureActive {
                id,
                gesture: GestureKind::Pan,
            });
        }

        self.pans.insert(id, PanState { dx: 0.0, dy: 0.0 });
        self.selected = Some(id);
        self.dragging = Some(id);
        Ok(())
    }

    /// Record the raw pointer delta since `begin_pan`. No clamping.
    pub fn update_pan(&mut self, id: LayerId, dx: f64, dy: f64) -> Result<(), TransformError> {
        let state = self.pans.get_mut(&id).ok_or(TransformError::GestureIdle {
            id,
            gesture: GestureKind::Pan,
        })?;
        state.dx = finite_or_zero(dx);
        state.dy = finite_or_zero(dy);
        Ok(())
    }

    /// Finish a pan and commit the clamped position.
    ///
    /// The committed position satisfies `0 <= x <= canvas.width - width`
    /// (same for `y`). A negligible delta commits nothing. Returns the
    /// layer's position after the commit.
    pub fn end_pan(
        &mut self,
        layers: &mut LayerList,
        id: LayerId,
        dx: f64,
        dy: f64,
    ) -> Result<Position, TransformError> {
        if self.pans.remove(&id).is_none() {
            return Err(TransformError::GestureIdle {
                id,
                gesture: GestureKind::Pan,
            });
        }
        if self.dragging == Some(id) {
            self.dragging = None;
        }

        let layer = layers.get_mut(id).ok_or(TransformError::UnknownLayer(id))?;
        let (dx, dy) = (finite_or_zero(dx), finite_or_zero(dy));
        if dx.abs() <= self.commit_epsilon && dy.abs() <= self.commit_epsilon {
            return Ok(layer.position);
        }

        let committed = clamp_position(layer.position.translated(dx, dy), layer.size, self.canvas);
        tracing::debug!(
            layer = %id,
            x = committed.x,
            y = committed.y,
            "Committed pan"
        );
        layer.position = committed;
        Ok(committed)
    }

    /// Abandon a pan without committing.
    pub fn cancel_pan(&mut self, id: LayerId) {
        self.pans.remove(&id);
        if self.dragging == Some(id) {
            self.dragging = None;
        }
    }

    /// Start a pinch, capturing the layer's current size as the origin.
    pub fn begin_pinch(&mut self, layers: &LayerList, id: LayerId) -> Result<(), TransformError> {
        let layer = layers.get(id).ok_or(TransformError::UnknownLayer(id))?;
        if self.pinches.contains_key(&id) {
            return Err(TransformError::GestureActive {
                id,
                gesture: GestureKind::Pinch,
            });
        }

        self.pinches.insert(
            id,
            PinchState { origin: layer.size },
        );
        self.selected = Some(id);
        Ok(())
    }

    /// Apply a live pinch factor, writing the tentative size into the layer.
    pub fn update_pinch(
        &mut self,
        layers: &mut LayerList,
        id: LayerId,
        scale: f64,
    ) -> Result<Size, TransformError> {
        let origin = self
            .pinches
            .get(&id)
            .ok_or(TransformError::GestureIdle {
                id,
                gesture: GestureKind::Pinch,
            })?
            .origin;

        let layer = layers.get_mut(id).ok_or(TransformError::UnknownLayer(id))?;
        let size = scaled_size(origin, layer.position, scale, self.limits, self.canvas);
        layer.size = size;
        Ok(size)
    }

    /// Finish a pinch: apply the final factor once more and reset the track.
    pub fn end_pinch(
        &mut self,
        layers: &mut LayerList,
        id: LayerId,
        scale: f64,
    ) -> Result<Size, TransformError> {
        let state = self.pinches.remove(&id).ok_or(TransformError::GestureIdle {
            id,
            gesture: GestureKind::Pinch,
        })?;

        let layer = layers.get_mut(id).ok_or(TransformError::UnknownLayer(id))?;
        let size = scaled_size(state.origin, layer.position, scale, self.limits, self.canvas);
        tracing::debug!(
            layer = %id,
            width = size.width,
            height = size.height,
            "Committed pinch"
        );
        layer.size = size;
        Ok(size)
    }

    /// Abandon a pinch, restoring the pre-gesture size.
    pub fn cancel_pinch(&mut self, layers: &mut LayerList, id: LayerId) {
        if let Some(state) = self.pinches.remove(&id) {
            if let Some(layer) = layers.get_mut(id) {
                layer.size = state.origin;
            }
        }
    }

    /// Position the user currently sees: committed position plus any
    /// in-flight pan delta.
    pub fn displayed_position(&self, layer: &Layer) -> Position {
        match self.pans.get(&layer.id) {
            Some(pan) => layer.position.translated(pan.dx, pan.dy),
            None => layer.position,
        }
    }

    /// Copy of `layers` with in-flight pan deltas applied. In-flight pinch
    /// sizes are already live in the list.
    pub fn displayed_layers(&self, layers: &LayerList) -> LayerList {
        let mut displayed = layers.clone();
        for layer in displayed.iter_mut() {
            layer.position = self.displayed_position(layer);
        }
        displayed
    }

    /// Drop all per-layer state for a removed layer.
    pub fn forget(&mut self, id: LayerId) {
        self.pans.remove(&id);
        self.pinches.remove(&id);
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    /// Drop every in-flight gesture and the selection. Must run before a
    /// new layer list replaces the current one.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            tracing::debug!(
                pans = self.pans.len(),
                pinches = self.pinches.len(),
                "Resetting in-flight gestures"
            );
        }
        self.pans.clear();
        self.pinches.clear();
        self.dragging = None;
        self.selected = None;
    }
}

/// Clamp a position so a layer of `size` stays on the canvas.
pub fn clamp_position(position: Position, size: Size, canvas: CanvasSize) -> Position {
    Position::new(
        clamp_range(position.x, 0.0, canvas.width - size.width),
        clamp_range(position.y, 0.0, canvas.height - size.height),
    )
}

/// Size after pinching `origin` by `scale`, anchored at `position`.
///
/// The factor is limited to `limits`, then each dimension is capped by the
/// canvas space remaining right of / below the anchor.
pub fn scaled_size(
    origin: Size,
    position: Position,
    scale: f64,
    limits: ScaleLimits,
    canvas: CanvasSize,
) -> Size {
    let factor = limits.clamp(scale);
    let remaining_w = canvas.width - position.x;
    let remaining_h = canvas.height - position.y;
    Size::new(
        (origin.width * factor).min(remaining_w),
        (origin.height * factor).min(remaining_h),
    )
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
