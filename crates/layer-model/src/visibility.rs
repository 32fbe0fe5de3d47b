//! Per-field visibility mask.
//!
//! The mask lives independently of any layer list: regenerating layers
//! (template switch, frame select/remove) never resets it. Unknown keys are
//! visible, and layers without a field key are never filtered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::{fields, FieldKey};
use crate::layer::Layer;

/// Field key to visibility flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisibilityMask {
    entries: BTreeMap<FieldKey, bool>,
}

impl Default for VisibilityMask {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityMask {
    /// A mask with every known field registered as visible.
    pub fn new() -> Self {
        let mut mask = Self {
            entries: BTreeMap::new(),
        };
        mask.register_keys(fields::KNOWN.iter().map(|k| FieldKey::from(*k)));
        mask
    }

    /// Visibility of a field; unregistered keys are visible.
    pub fn is_visible(&self, key: &str) -> bool {
        self.entries.get(key).copied().unwrap_or(true)
    }

    /// Flip a field's visibility and return the new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        let next = !self.is_visible(key);
        self.entries.insert(FieldKey::from(key), next);
        next
    }

    pub fn set_visible(&mut self, key: &str, visible: bool) {
        self.entries.insert(FieldKey::from(key), visible);
    }

    /// Register keys not yet present as visible. Existing entries are kept.
    /// Returns how many keys were new.
    pub fn register_keys<I>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = FieldKey>,
    {
        let mut added = 0;
        for key in keys {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.entries.entry(key) {
                slot.insert(true);
                added += 1;
            }
        }
        added
    }

    /// Whether a layer should be rendered and exported.
    pub fn shows(&self, layer: &Layer) -> bool {
        match &layer.field_type {
            Some(key) => self.is_visible(key.as_str()),
            None => true,
        }
    }

    /// Keys currently hidden.
    pub fn hidden_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.entries
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_known_fields_default_visible() {
        let mask = VisibilityMask::new();
        for key in fields::KNOWN {
            assert!(mask.is_visible(key));
        }
        assert!(mask.is_visible("somethingNew"));
    }

    #[test]
    fn test_toggle_flips_state() {
        let mut mask = VisibilityMask::new();
        assert!(!mask.toggle(fields::PHONE));
        assert!(!mask.is_visible(fields::PHONE));
        assert!(mask.toggle(fields::PHONE));
    }

    #[test]
    fn test_toggle_unknown_key_hides_it() {
        let mut mask = VisibilityMask::new();
        assert!(!mask.toggle("promoCode"));
        assert_eq!(
            mask.hidden_keys().map(FieldKey::as_str).collect::<Vec<_>>(),
            vec!["promoCode"]
        );
    }

    #[test]
    fn test_register_keeps_existing_state() {
        let mut mask = VisibilityMask::new();
        mask.set_visible(fields::PHONE, false);
        let added = mask.register_keys(vec![FieldKey::from(fields::PHONE), "badge".into()]);
        assert_eq!(added, 1);
        assert!(!mask.is_visible(fields::PHONE));
        assert!(mask.is_visible("badge"));
    }

    #[test]
    fn test_free_form_layers_never_masked() {
        let mut mask = VisibilityMask::new();
        mask.set_visible(fields::PHONE, false);
        let free = Layer::image("sticker.png", Rect::new(0.0, 0.0, 5.0, 5.0));
        let phone = Layer::image("x.png", Rect::new(0.0, 0.0, 5.0, 5.0)).with_field(fields::PHONE);
        assert!(mask.shows(&free));
        assert!(!mask.shows(&phone));
    }
}
