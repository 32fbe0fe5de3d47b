//! Layer types: the positioned visual elements of a composition.
//!
//! A [`Layer`] carries shared geometry and paint-order fields plus a
//! [`LayerContent`] payload. Decorative background panels are their own
//! variant rather than empty text with a background color.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::content::FieldKey;
use crate::geometry::{Position, Rect, Size};

static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl LayerId {
    /// Allocate a new identifier, never previously returned in this process.
    pub fn fresh() -> Self {
        Self(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Layer kind tag, as exposed to external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Text,
    Panel,
    Image,
    Logo,
}

/// Font weight for text layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Medium,
    Semibold,
    Bold,
}

/// Text appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f64,
    pub color: Color,
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Optional fill behind the text box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            color: Color::WHITE,
            font_family: "System".to_string(),
            font_weight: FontWeight::Normal,
            background_color: None,
        }
    }
}

/// What a layer paints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    /// Literal text. An empty string is valid.
    Text { text: String, style: TextStyle },

    /// Solid decorative fill, e.g. a footer scrim.
    Panel { background: Color },

    /// Image reference (local or remote URI).
    Image { source: String },

    /// Brand logo reference (local or remote URI).
    Logo { source: String },
}

/// A single positioned visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,

    #[serde(flatten)]
    pub content: LayerContent,

    pub position: Position,

    pub size: Size,

    /// Degrees. Preserved through the model; not end-user editable.
    #[serde(default)]
    pub rotation: f64,

    /// Paint order; higher paints on top.
    pub z_index: i32,

    /// Semantic key used by visibility masking and content re-application.
    /// `None` marks a free-form user layer that is never masked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldKey>,
}

impl Layer {
    /// Create a layer with a fresh id.
    pub fn new(content: LayerContent, rect: Rect) -> Self {
        Self {
            id: LayerId::fresh(),
            content,
            position: rect.position,
            size: rect.size,
            rotation: 0.0,
            z_index: 0,
            field_type: None,
        }
    }

    pub fn text(text: impl Into<String>, style: TextStyle, rect: Rect) -> Self {
        Self::new(
            LayerContent::Text {
                text: text.into(),
                style,
            },
            rect,
        )
    }

    pub fn panel(background: Color, rect: Rect) -> Self {
        Self::new(LayerContent::Panel { background }, rect)
    }

    pub fn image(source: impl Into<String>, rect: Rect) -> Self {
        Self::new(
            LayerContent::Image {
                source: source.into(),
            },
            rect,
        )
    }

    pub fn logo(source: impl Into<String>, rect: Rect) -> Self {
        Self::new(
            LayerContent::Logo {
                source: source.into(),
            },
            rect,
        )
    }

    pub fn with_field(mut self, key: impl Into<FieldKey>) -> Self {
        self.field_type = Some(key.into());
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn layer_type(&self) -> LayerType {
        match self.content {
            LayerContent::Text { .. } => LayerType::Text,
            LayerContent::Panel { .. } => LayerType::Panel,
            LayerContent::Image { .. } => LayerType::Image,
            LayerContent::Logo { .. } => LayerType::Logo,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            position: self.position,
            size: self.size,
        }
    }

    pub fn field_is(&self, key: &str) -> bool {
        self.field_type.as_ref().map(FieldKey::as_str) == Some(key)
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.content {
            LayerContent::Text { style, .. } => Some(style),
            _ => None,
        }
    }

    pub fn text_style_mut(&mut self) -> Option<&mut TextStyle> {
        match &mut self.content {
            LayerContent::Text { style, .. } => Some(style),
            _ => None,
        }
    }
}

/// Flat geometry record handed to downstream compositors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerGeometry {
    pub id: LayerId,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldKey>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub z_index: i32,
}

impl From<&Layer> for LayerGeometry {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id,
            layer_type: layer.layer_type(),
            field_type: layer.field_type.clone(),
            x: layer.position.x,
            y: layer.position.y,
            width: layer.size.width,
            height: layer.size.height,
            rotation: layer.rotation,
            z_index: layer.z_index,
        }
    }
}

/// Ordered collection of layers with unique ids.
///
/// Insertion order is preserved and breaks z-index ties when painting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerList {
    layers: Vec<Layer>,
}

impl LayerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list, dropping any layer whose id repeats an earlier one.
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        let mut list = Self::new();
        for layer in layers {
            list.push(layer);
        }
        list
    }

    /// Append a layer. Returns `false` (and drops the layer) when its id is
    /// already present.
    pub fn push(&mut self, layer: Layer) -> bool {
        if self.contains(layer.id) {
            return false;
        }
        self.layers.push(layer);
        true
    }

    /// Append a layer above every existing layer. A layer whose id is
    /// already taken is re-identified, so the returned id always names the
    /// inserted layer.
    pub fn push_on_top(&mut self, mut layer: Layer) -> LayerId {
        layer.z_index = self.top_z_index().map_or(0, |z| z.saturating_add(1));
        while self.contains(layer.id) {
            layer.id = LayerId::fresh();
        }
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    pub fn remove(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        Some(self.layers.remove(index))
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Layer> {
        self.layers.iter_mut()
    }

    /// Highest z-index present, if any.
    pub fn top_z_index(&self) -> Option<i32> {
        self.layers.iter().map(|l| l.z_index).max()
    }

    /// Layers in ascending paint order (stable: ties keep insertion order).
    pub fn paint_order(&self) -> Vec<&Layer> {
        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        ordered.sort_by_key(|l| l.z_index);
        ordered
    }

    /// First layer carrying the given field key.
    pub fn find_field(&self, key: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.field_is(key))
    }
}

impl<'a> IntoIterator for &'a LayerList {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fields;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = LayerId::fresh();
        let b = LayerId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_push_rejects_duplicate_ids() {
        let layer = Layer::image("a.png", rect());
        let mut list = LayerList::new();
        assert!(list.push(layer.clone()));
        assert!(!list.push(layer));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_paint_order_is_stable_for_ties() {
        let first = Layer::image("a.png", rect()).with_z_index(2);
        let second = Layer::image("b.png", rect()).with_z_index(1);
        let third = Layer::image("c.png", rect()).with_z_index(2);
        let ids = [first.id, second.id, third.id];
        let list = LayerList::from_layers(vec![first, second, third]);

        let order: Vec<LayerId> = list.paint_order().iter().map(|l| l.id).collect();
        assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn test_push_on_top_assigns_highest_z() {
        let mut list = LayerList::from_layers(vec![Layer::image("a.png", rect()).with_z_index(7)]);
        let id = list.push_on_top(Layer::image("b.png", rect()));
        assert_eq!(list.get(id).unwrap().z_index, 8);
    }

    #[test]
    fn test_push_on_top_reassigns_taken_id() {
        let existing = Layer::image("a.png", rect());
        let mut duplicate = Layer::image("b.png", rect());
        duplicate.id = existing.id;
        let mut list = LayerList::from_layers(vec![existing.clone()]);

        let id = list.push_on_top(duplicate);
        assert_ne!(id, existing.id);
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.get(id).unwrap().content,
            LayerContent::Image {
                source: "b.png".to_string()
            }
        );
        assert_eq!(list.get(existing.id), Some(&existing));
    }

    #[test]
    fn test_serialized_shape_uses_type_tag_and_field_type() {
        let layer = Layer::panel(Color::BLACK, rect())
            .with_field(fields::FOOTER_BACKGROUND)
            .with_z_index(3);
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["type"], "panel");
        assert_eq!(value["fieldType"], "footerBackground");
        assert_eq!(value["zIndex"], 3);

        let parsed: Layer = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, layer);
    }

    #[test]
    fn test_geometry_record_from_layer() {
        let layer = Layer::logo("logo.png", Rect::new(5.0, 6.0, 7.0, 8.0)).with_field(fields::LOGO);
        let geometry = LayerGeometry::from(&layer);
        assert_eq!(geometry.layer_type, LayerType::Logo);
        assert_eq!((geometry.x, geometry.y), (5.0, 6.0));
        assert_eq!(geometry.field_type.as_ref().map(FieldKey::as_str), Some("logo"));
    }
}
