//! Layer generation from designer frames.

use posterkit_layer_model::color::Color;
use posterkit_layer_model::content::ContentMap;
use posterkit_layer_model::frame::{ContentKind, Frame, Placeholder};
use posterkit_layer_model::geometry::CanvasSize;
use posterkit_layer_model::layer::{Layer, LayerList, TextStyle};

/// Panel fill used when a panel placeholder declares no background.
pub const DEFAULT_PANEL_BACKGROUND: Color = Color::rgba(0, 0, 0, 153);

/// Resolve every placeholder of `frame` against the canvas and fill it from
/// the content map.
///
/// Layers carry `fieldType = placeholder.key` and paint in placeholder
/// order. A key with no content produces an empty layer rather than an
/// error, so a frame always yields one layer per placeholder.
pub fn generate_layers_from_frame(
    frame: &Frame,
    content: &ContentMap,
    canvas: CanvasSize,
) -> LayerList {
    let mut layers = LayerList::new();
    let mut missing = 0usize;

    for (index, placeholder) in frame.placeholders.iter().enumerate() {
        let value = content.get(placeholder.key.as_str());
        if value.is_none() && placeholder.content_kind != ContentKind::Panel {
            missing += 1;
        }

        let layer = placeholder_layer(placeholder, value.unwrap_or(""), canvas)
            .with_field(placeholder.key.clone())
            .with_z_index(index as i32 + 1);
        layers.push(layer);
    }

    tracing::debug!(
        frame = %frame.id,
        layers = layers.len(),
        missing_content = missing,
        "Generated frame layout"
    );
    layers
}

fn placeholder_layer(placeholder: &Placeholder, value: &str, canvas: CanvasSize) -> Layer {
    let rect = placeholder.resolve(canvas);
    let style = &placeholder.default_style;

    match placeholder.content_kind {
        ContentKind::Text => {
            let defaults = TextStyle::default();
            let text_style = TextStyle {
                font_size: style.font_size.unwrap_or(defaults.font_size),
                color: style.color.unwrap_or(defaults.color),
                font_family: style
                    .font_family
                    .clone()
                    .unwrap_or(defaults.font_family),
                font_weight: style.font_weight.unwrap_or(defaults.font_weight),
                background_color: style.background_color,
            };
            Layer::text(value, text_style, rect)
        }
        ContentKind::Panel => Layer::panel(
            style.background_color.unwrap_or(DEFAULT_PANEL_BACKGROUND),
            rect,
        ),
        ContentKind::Image => Layer::image(value, rect),
        ContentKind::Logo => Layer::logo(value, rect),
    }
}
