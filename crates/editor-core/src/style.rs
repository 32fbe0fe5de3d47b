//! Template styles: per-template color palettes.
//!
//! Template ids form a closed set. Only the system boundary, where ids
//! arrive as strings, has an "unknown id" fallback
//! ([`TemplateId::from_external`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use posterkit_layer_model::color::Color;
use posterkit_layer_model::content::fields;
use posterkit_layer_model::layer::{LayerContent, LayerList};

/// Built-in template styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
    Bold,
    Minimal,
    Elegant,
    Vibrant,
    Midnight,
}

/// Colors a template applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplatePalette {
    /// Fill of the footer band panel.
    pub footer_background: Color,
    /// Color of every text layer inside the footer band.
    pub footer_text: Color,
}

/// Error for template ids that are not part of the built-in set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template id: {0}")]
pub struct UnknownTemplateId(pub String);

impl TemplateId {
    pub const ALL: [TemplateId; 6] = [
        TemplateId::Classic,
        TemplateId::Bold,
        TemplateId::Minimal,
        TemplateId::Elegant,
        TemplateId::Vibrant,
        TemplateId::Midnight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Bold => "bold",
            TemplateId::Minimal => "minimal",
            TemplateId::Elegant => "elegant",
            TemplateId::Vibrant => "vibrant",
            TemplateId::Midnight => "midnight",
        }
    }

    pub fn palette(&self) -> TemplatePalette {
        match self {
            TemplateId::Classic => TemplatePalette {
                footer_background: Color::rgba(0, 0, 0, 153),
                footer_text: Color::WHITE,
            },
            TemplateId::Bold => TemplatePalette {
                footer_background: Color::rgb(0xE5, 0x39, 0x35),
                footer_text: Color::WHITE,
            },
            TemplateId::Minimal => TemplatePalette {
                footer_background: Color::rgba(255, 255, 255, 217),
                footer_text: Color::rgb(0x21, 0x21, 0x21),
            },
            TemplateId::Elegant => TemplatePalette {
                footer_background: Color::rgb(0x1B, 0x1B, 0x2F),
                footer_text: Color::rgb(0xD4, 0xAF, 0x37),
            },
            TemplateId::Vibrant => TemplatePalette {
                footer_background: Color::rgb(0x6A, 0x1B, 0x9A),
                footer_text: Color::rgb(0xFF, 0xF5, 0x9D),
            },
            TemplateId::Midnight => TemplatePalette {
                footer_background: Color::rgb(0x0D, 0x47, 0xA1),
                footer_text: Color::rgb(0xE3, 0xF2, 0xFD),
            },
        }
    }

    /// Parse an externally supplied id, falling back to the default template
    /// when it is not recognized.
    pub fn from_external(id: &str) -> Self {
        id.parse().unwrap_or_else(|e: UnknownTemplateId| {
            tracing::warn!(error = %e, fallback = Self::default().as_str(), "Unknown template id");
            Self::default()
        })
    }
}

impl FromStr for TemplateId {
    type Err = UnknownTemplateId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTemplateId(s.to_string()))
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recolor footer layers with a template's palette.
///
/// Pure map over the list: only the `footerBackground` fill and the color of
/// footer text layers change. Ids, order, geometry, and content are kept, so
/// applying the same template twice yields the same result.
pub fn apply_template_style(layers: &LayerList, template: TemplateId) -> LayerList {
    let palette = template.palette();
    let mut styled = layers.clone();

    for layer in styled.iter_mut() {
        let Some(key) = layer.field_type.clone() else {
            continue;
        };

        if key.as_str() == fields::FOOTER_BACKGROUND {
            match &mut layer.content {
                LayerContent::Panel { background } => *background = palette.footer_background,
                LayerContent::Text { style, .. } => {
                    style.background_color = Some(palette.footer_background)
                }
                LayerContent::Image { .. } | LayerContent::Logo { .. } => {}
            }
        } else if key.is_footer_text() {
            if let Some(style) = layer.text_style_mut() {
                style.color = palette.footer_text;
            }
        }
    }

    styled
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterkit_layer_model::geometry::Rect;
    use posterkit_layer_model::layer::{Layer, TextStyle};

    fn footer_layers() -> LayerList {
        LayerList::from_layers(vec![
            Layer::panel(Color::BLACK, Rect::new(0.0, 400.0, 360.0, 240.0))
                .with_field(fields::FOOTER_BACKGROUND),
            Layer::text("555-1234", TextStyle::default(), Rect::new(20.0, 450.0, 150.0, 18.0))
                .with_field(fields::PHONE),
            Layer::text("Acme", TextStyle::default(), Rect::new(20.0, 30.0, 200.0, 36.0))
                .with_field(fields::COMPANY_NAME),
        ])
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("BOLD".parse::<TemplateId>().unwrap(), TemplateId::Bold);
        assert!("neon".parse::<TemplateId>().is_err());
    }

    #[test]
    fn test_external_unknown_falls_back() {
        assert_eq!(TemplateId::from_external("neon"), TemplateId::Classic);
        assert_eq!(TemplateId::from_external("elegant"), TemplateId::Elegant);
    }

    #[test]
    fn test_apply_rewrites_only_footer_colors() {
        let layers = footer_layers();
        let styled = apply_template_style(&layers, TemplateId::Bold);
        let palette = TemplateId::Bold.palette();

        let panel = styled.find_field(fields::FOOTER_BACKGROUND).unwrap();
        assert_eq!(
            panel.content,
            LayerContent::Panel {
                background: palette.footer_background
            }
        );
        let phone = styled.find_field(fields::PHONE).unwrap();
        assert_eq!(phone.text_style().unwrap().color, palette.footer_text);

        let heading = styled.find_field(fields::COMPANY_NAME).unwrap();
        assert_eq!(heading, layers.find_field(fields::COMPANY_NAME).unwrap());

        for (before, after) in layers.iter().zip(styled.iter()) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.rect(), after.rect());
        }
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let once = apply_template_style(&footer_layers(), TemplateId::Vibrant);
        let twice = apply_template_style(&once, TemplateId::Vibrant);
        assert_eq!(once, twice);
    }
}
