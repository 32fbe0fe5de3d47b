//! Editor session: the stateful owner of one composition.
//!
//! Holds the current layer list, the visibility mask, and the transform
//! controller, and sequences wholesale layer replacement (profile apply,
//! template switch, frame select/remove) against in-flight gestures: the
//! controller is always reset before a new list is installed.

use posterkit_common::config::{AppConfig, GestureConfig};
use posterkit_layer_model::color::Color;
use posterkit_layer_model::content::{BusinessProfile, ContentMap};
use posterkit_layer_model::frame::Frame;
use posterkit_layer_model::geometry::{CanvasSize, Position, Rect, Size};
use posterkit_layer_model::layer::{FontWeight, Layer, LayerId, LayerList, TextStyle};
use posterkit_layer_model::visibility::VisibilityMask;

use crate::content::map_profile_to_content;
use crate::frame_layout::generate_layers_from_frame;
use crate::layout::{generate_default_layers, MARGIN};
use crate::style::{apply_template_style, TemplateId};
use crate::transform::{ScaleLimits, TransformController, TransformError};

/// Height of a newly added free-form text box.
const NEW_TEXT_HEIGHT: f64 = 40.0;
/// Edge of a newly added free-form image, as a fraction of canvas width.
const NEW_IMAGE_RATIO: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct EditorSession {
    canvas: CanvasSize,
    template: TemplateId,
    content: ContentMap,
    layers: LayerList,
    mask: VisibilityMask,
    transform: TransformController,
    active_frame: Option<Frame>,
    /// Layer list as it was before the first frame was selected.
    pre_frame_layers: Option<LayerList>,
}

impl EditorSession {
    pub fn new(canvas: CanvasSize, limits: ScaleLimits) -> Self {
        Self::with_controller(canvas, TransformController::new(canvas, limits))
    }

    /// Build from configuration. Invalid gesture limits are replaced by the
    /// defaults with a warning.
    pub fn from_config(config: &AppConfig) -> Self {
        let canvas = CanvasSize::new(config.canvas.width, config.canvas.height);
        let gestures = match config.gestures.validate() {
            Ok(()) => config.gestures.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "Using default gesture limits");
                GestureConfig::default()
            }
        };
        Self::with_controller(canvas, TransformController::from_config(canvas, &gestures))
    }

    fn with_controller(canvas: CanvasSize, transform: TransformController) -> Self {
        Self {
            canvas,
            template: TemplateId::default(),
            content: ContentMap::new(),
            layers: LayerList::new(),
            mask: VisibilityMask::new(),
            transform,
            active_frame: None,
            pre_frame_layers: None,
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn content(&self) -> &ContentMap {
        &self.content
    }

    /// Committed layers (in-flight pan deltas not applied).
    pub fn layers(&self) -> &LayerList {
        &self.layers
    }

    pub fn mask(&self) -> &VisibilityMask {
        &self.mask
    }

    pub fn transform(&self) -> &TransformController {
        &self.transform
    }

    pub fn active_frame(&self) -> Option<&Frame> {
        self.active_frame.as_ref()
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.transform.selected()
    }

    pub fn select(&mut self, id: Option<LayerId>) {
        let id = id.filter(|id| self.layers.contains(*id));
        self.transform.select(id);
    }

    // -- Template mapping -------------------------------------------------

    /// Flatten a business profile and regenerate layers from it.
    pub fn apply_profile(&mut self, profile: &BusinessProfile) {
        self.content = map_profile_to_content(profile);
        tracing::debug!(fields = self.content.len(), "Applied business profile");

        match self.active_frame.clone() {
            Some(frame) => {
                self.pre_frame_layers = Some(self.default_layers());
                self.install(generate_layers_from_frame(&frame, &self.content, self.canvas));
            }
            None => {
                let layers = self.default_layers();
                self.install(layers);
            }
        }
    }

    /// Switch the template style.
    ///
    /// Without a frame the default layout is regenerated in the new colors.
    /// With a frame active, frame geometry is kept and only footer colors are
    /// restyled (the pre-frame snapshot is restyled the same way).
    pub fn switch_template(&mut self, template: TemplateId) {
        self.template = template;
        tracing::debug!(template = %template, framed = self.active_frame.is_some(), "Switching template");

        if self.active_frame.is_some() {
            self.layers = apply_template_style(&self.layers, template);
            if let Some(snapshot) = self.pre_frame_layers.as_mut() {
                *snapshot = apply_template_style(snapshot, template);
            }
        } else {
            let layers = self.default_layers();
            self.install(layers);
        }
    }

    /// Replace the layers with a frame's layout.
    ///
    /// The first frame selection snapshots the current layers so
    /// [`remove_frame`](Self::remove_frame) can restore them. Keys the frame
    /// introduces are registered in the mask as visible; existing mask
    /// entries are never touched.
    pub fn select_frame(&mut self, frame: &Frame) {
        if self.pre_frame_layers.is_none() {
            self.pre_frame_layers = Some(self.layers.clone());
        }
        let added = self.mask.register_keys(frame.keys());
        let layers = generate_layers_from_frame(frame, &self.content, self.canvas);
        self.install(layers);
        self.active_frame = Some(frame.clone());
        tracing::debug!(frame = %frame.id, new_keys = added, "Selected frame");
    }

    /// Select a frame by id from a catalogue. An id with no match leaves the
    /// current selection unchanged and returns `false`.
    pub fn select_frame_by_id(&mut self, frames: &[Frame], id: &str) -> bool {
        match frames.iter().find(|f| f.id == id) {
            Some(frame) => {
                self.select_frame(frame);
                true
            }
            None => {
                tracing::debug!(frame = id, "No frame with this id; keeping selection");
                false
            }
        }
    }

    /// Drop the active frame, restoring the pre-frame layers or, failing
    /// that, regenerating the default layout. Returns `false` when no frame
    /// was active.
    pub fn remove_frame(&mut self) -> bool {
        let Some(frame) = self.active_frame.take() else {
            return false;
        };
        let layers = match self.pre_frame_layers.take() {
            Some(snapshot) => snapshot,
            None => self.default_layers(),
        };
        self.install(layers);
        tracing::debug!(frame = %frame.id, "Removed frame");
        true
    }

    fn default_layers(&self) -> LayerList {
        generate_default_layers(&self.content, self.canvas, self.template)
    }

    fn install(&mut self, layers: LayerList) {
        self.transform.reset();
        self.layers = layers;
    }

    // -- Visibility -------------------------------------------------------

    /// Flip a field's visibility; returns the new state.
    pub fn toggle_field(&mut self, key: &str) -> bool {
        self.mask.toggle(key)
    }

    pub fn is_field_visible(&self, key: &str) -> bool {
        self.mask.is_visible(key)
    }

    /// Committed layers that pass the mask, in list order.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| self.mask.shows(l))
    }

    // -- Free-form layers -------------------------------------------------

    /// Add a user text layer above everything else and select it.
    pub fn add_text_layer(&mut self, text: impl Into<String>, style: Option<TextStyle>) -> LayerId {
        let rect = Rect::new(
            MARGIN,
            (self.canvas.height - NEW_TEXT_HEIGHT) / 2.0,
            self.canvas.width - 2.0 * MARGIN,
            NEW_TEXT_HEIGHT,
        )
        .fit_within(self.canvas);
        let layer = Layer::text(text, style.unwrap_or_default(), rect);
        self.add_on_top(layer)
    }

    /// Add a user image layer, centered, above everything else and select it.
    pub fn add_image_layer(&mut self, source: impl Into<String>) -> LayerId {
        let edge = self.canvas.width * NEW_IMAGE_RATIO;
        let rect = Rect {
            position: Position::new(
                (self.canvas.width - edge) / 2.0,
                (self.canvas.height - edge) / 2.0,
            ),
            size: Size::new(edge, edge),
        }
        .fit_within(self.canvas);
        self.add_on_top(Layer::image(source, rect))
    }

    fn add_on_top(&mut self, layer: Layer) -> LayerId {
        let id = self.layers.push_on_top(layer);
        self.transform.select(Some(id));
        tracing::debug!(layer = %id, "Added layer");
        id
    }

    /// Remove a layer, dropping any gesture state and selection it held.
    pub fn delete_layer(&mut self, id: LayerId) -> Option<Layer> {
        self.transform.forget(id);
        self.layers.remove(id)
    }

    pub fn delete_selected(&mut self) -> Option<Layer> {
        let id = self.transform.selected()?;
        self.delete_layer(id)
    }

    // -- Style actions on the selected layer -------------------------------

    /// Set font family and weight of the selected text layer. Returns
    /// `false` when nothing applicable is selected.
    pub fn apply_font(&mut self, family: &str, weight: FontWeight) -> bool {
        self.with_selected_style(|style| {
            style.font_family = family.to_string();
            style.font_weight = weight;
        })
    }

    /// Set the font size of the selected text layer. Non-positive or
    /// non-finite sizes are ignored.
    pub fn set_font_size(&mut self, size: f64) -> bool {
        if !size.is_finite() || size <= 0.0 {
            return false;
        }
        self.with_selected_style(|style| style.font_size = size)
    }

    pub fn set_text_color(&mut self, color: Color) -> bool {
        self.with_selected_style(|style| style.color = color)
    }

    fn with_selected_style(&mut self, apply: impl FnOnce(&mut TextStyle)) -> bool {
        let Some(id) = self.transform.selected() else {
            return false;
        };
        match self.layers.get_mut(id).and_then(Layer::text_style_mut) {
            Some(style) => {
                apply(style);
                true
            }
            None => false,
        }
    }

    // -- Gestures ---------------------------------------------------------

    pub fn begin_pan(&mut self, id: LayerId) -> Result<(), TransformError> {
        self.transform.begin_pan(&self.layers, id)
    }

    pub fn update_pan(&mut self, id: LayerId, dx: f64, dy: f64) -> Result<(), TransformError> {
        self.transform.update_pan(id, dx, dy)
    }

    pub fn end_pan(&mut self, id: LayerId, dx: f64, dy: f64) -> Result<Position, TransformError> {
        self.transform.end_pan(&mut self.layers, id, dx, dy)
    }

    pub fn cancel_pan(&mut self, id: LayerId) {
        self.transform.cancel_pan(id);
    }

    pub fn begin_pinch(&mut self, id: LayerId) -> Result<(), TransformError> {
        self.transform.begin_pinch(&self.layers, id)
    }

    pub fn update_pinch(&mut self, id: LayerId, scale: f64) -> Result<Size, TransformError> {
        self.transform.update_pinch(&mut self.layers, id, scale)
    }

    pub fn end_pinch(&mut self, id: LayerId, scale: f64) -> Result<Size, TransformError> {
        self.transform.end_pinch(&mut self.layers, id, scale)
    }

    /// Layers as the user currently sees them, in-flight pan deltas
    /// included. This is the geometry a capture must use.
    pub fn displayed_layers(&self) -> LayerList {
        self.transform.displayed_layers(&self.layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterkit_layer_model::content::fields;
    use posterkit_layer_model::frame::{ContentKind, Placeholder, PlaceholderStyle, Units};
    use posterkit_layer_model::layer::LayerContent;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            name: Some("Acme Co".to_string()),
            phone: Some("555-1234".to_string()),
            email: Some("hi@acme.test".to_string()),
            ..Default::default()
        }
    }

    fn session() -> EditorSession {
        let mut session = EditorSession::new(CanvasSize::new(360.0, 640.0), ScaleLimits::default());
        session.apply_profile(&profile());
        session
    }

    fn promo_frame() -> Frame {
        let slot = |key: &str, kind, y| Placeholder {
            key: key.into(),
            units: Units::Relative,
            x: 0.1,
            y,
            width: 0.8,
            height: 0.1,
            content_kind: kind,
            default_style: PlaceholderStyle::default(),
        };
        Frame {
            id: "promo".to_string(),
            name: None,
            placeholders: vec![
                slot(fields::COMPANY_NAME, ContentKind::Text, 0.1),
                slot(fields::PHONE, ContentKind::Text, 0.8),
                slot("promoCode", ContentKind::Text, 0.9),
            ],
        }
    }

    fn visible_fields(session: &EditorSession) -> Vec<String> {
        session
            .visible_layers()
            .filter_map(|l| l.field_type.as_ref().map(|k| k.to_string()))
            .collect()
    }

    #[test]
    fn test_hidden_field_survives_regeneration() {
        let mut s = session();
        assert!(!s.toggle_field(fields::PHONE));
        assert!(!visible_fields(&s).contains(&fields::PHONE.to_string()));

        s.switch_template(TemplateId::Midnight);
        assert!(!s.is_field_visible(fields::PHONE));
        assert!(s.layers().find_field(fields::PHONE).is_some());
        assert!(!visible_fields(&s).contains(&fields::PHONE.to_string()));

        s.select_frame(&promo_frame());
        assert!(!s.is_field_visible(fields::PHONE));
        assert!(s.is_field_visible("promoCode"));
        assert!(!visible_fields(&s).contains(&fields::PHONE.to_string()));

        assert!(s.remove_frame());
        assert!(!s.is_field_visible(fields::PHONE));
        assert!(!visible_fields(&s).contains(&fields::PHONE.to_string()));
    }

    #[test]
    fn test_remove_frame_restores_snapshot() {
        let mut s = session();
        let before = s.layers().clone();

        s.select_frame(&promo_frame());
        assert_eq!(s.layers().len(), 3);
        assert_eq!(s.active_frame().map(|f| f.id.as_str()), Some("promo"));

        // A second frame selection must not overwrite the original snapshot.
        s.select_frame(&promo_frame());
        assert!(s.remove_frame());
        assert_eq!(s.layers(), &before);
        assert!(!s.remove_frame());
    }

    #[test]
    fn test_unknown_frame_id_keeps_selection() {
        let mut s = session();
        let frames = vec![promo_frame()];
        assert!(s.select_frame_by_id(&frames, "promo"));
        let framed = s.layers().clone();

        assert!(!s.select_frame_by_id(&frames, "missing"));
        assert_eq!(s.layers(), &framed);
        assert_eq!(s.active_frame().map(|f| f.id.as_str()), Some("promo"));
    }

    #[test]
    fn test_template_switch_resets_in_flight_gesture() {
        let mut s = session();
        let id = s.layers().find_field(fields::PHONE).unwrap().id;
        s.begin_pan(id).unwrap();
        s.update_pan(id, 15.0, 0.0).unwrap();

        s.switch_template(TemplateId::Bold);
        assert!(s.transform().is_idle());
        assert_eq!(s.selected(), None);
        assert!(s.end_pan(id, 15.0, 0.0).is_err());
    }

    #[test]
    fn test_template_switch_with_frame_keeps_geometry() {
        let mut s = session();
        s.select_frame(&promo_frame());
        let before: Vec<Rect> = s.layers().iter().map(Layer::rect).collect();
        s.switch_template(TemplateId::Elegant);
        let after: Vec<Rect> = s.layers().iter().map(Layer::rect).collect();
        assert_eq!(before, after);

        let phone = s.layers().find_field(fields::PHONE).unwrap();
        assert_eq!(
            phone.text_style().unwrap().color,
            TemplateId::Elegant.palette().footer_text
        );
    }

    #[test]
    fn test_user_layers_are_never_masked() {
        let mut s = session();
        let id = s.add_text_layer("Grand opening!", None);
        assert_eq!(s.selected(), Some(id));
        assert_eq!(s.layers().get(id).unwrap().z_index, s.layers().top_z_index().unwrap());

        for key in fields::KNOWN {
            s.toggle_field(key);
        }
        let visible: Vec<LayerId> = s.visible_layers().map(|l| l.id).collect();
        assert_eq!(visible, vec![id]);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut s = session();
        let id = s.add_image_layer("sticker.png");
        assert!(s.delete_selected().is_some());
        assert_eq!(s.selected(), None);
        assert!(!s.layers().contains(id));
        assert!(s.delete_layer(id).is_none());
    }

    #[test]
    fn test_style_actions_target_selected_text() {
        let mut s = session();
        assert!(!s.set_font_size(20.0));

        let id = s.add_text_layer("Hello", None);
        assert!(s.apply_font("Georgia", FontWeight::Bold));
        assert!(s.set_font_size(32.0));
        assert!(!s.set_font_size(-1.0));
        assert!(s.set_text_color(Color::rgb(10, 20, 30)));

        let style = s.layers().get(id).unwrap().text_style().unwrap().clone();
        assert_eq!(style.font_family, "Georgia");
        assert_eq!(style.font_weight, FontWeight::Bold);
        assert_eq!(style.font_size, 32.0);
        assert_eq!(style.color, Color::rgb(10, 20, 30));

        s.add_image_layer("photo.png");
        assert!(!s.set_text_color(Color::BLACK));
    }

    #[test]
    fn test_displayed_layers_include_in_flight_pan() {
        let mut s = session();
        let id = s.layers().find_field(fields::COMPANY_NAME).unwrap().id;
        s.begin_pan(id).unwrap();
        s.update_pan(id, 5.0, 7.0).unwrap();

        let shown = s.displayed_layers();
        assert_eq!(shown.get(id).unwrap().position, Position::new(25.0, 37.0));
        assert_eq!(s.layers().get(id).unwrap().position, Position::new(20.0, 30.0));
    }

    #[test]
    fn test_from_config_uses_canvas_defaults() {
        let s = EditorSession::from_config(&AppConfig::default());
        assert_eq!(s.canvas(), CanvasSize::new(360.0, 640.0));
        assert_eq!(s.transform().limits(), ScaleLimits::default());
    }

    #[test]
    fn test_inverted_configured_limits_fall_back_to_defaults() {
        let mut config = AppConfig::default();
        config.gestures.min_scale = 5.0;
        config.gestures.max_scale = 0.2;
        let mut s = EditorSession::from_config(&config);
        assert_eq!(s.transform().limits(), ScaleLimits::default());

        s.apply_profile(&profile());
        let id = s.layers().find_field(fields::PHONE).unwrap().id;
        let before = s.layers().get(id).unwrap().size;
        s.begin_pinch(id).unwrap();
        let size = s.update_pinch(id, 2.0).unwrap();
        assert!(size.width > before.width);
    }

    #[test]
    fn test_template_switch_under_frame_matches_fresh_layout() {
        let mut framed = session();
        framed.select_frame(&promo_frame());
        framed.switch_template(TemplateId::Bold);
        assert!(framed.remove_frame());

        let mut fresh = session();
        fresh.switch_template(TemplateId::Bold);

        assert_eq!(framed.template(), TemplateId::Bold);
        let looks = |s: &EditorSession| -> Vec<(Option<String>, Rect, LayerContent)> {
            s.layers()
                .iter()
                .map(|l| (l.field_type.as_ref().map(|k| k.to_string()), l.rect(), l.content.clone()))
                .collect()
        };
        assert_eq!(looks(&framed), looks(&fresh));
    }
}
