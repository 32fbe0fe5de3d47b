//! Default layout generation.
//!
//! Builds a fixed visual hierarchy from a content map:
//!
//! ```text
//! ┌───────────────────────────────┐
//! │ Company Name            [logo]│
//! │                               │
//! │            (media)            │
//! │                               │
//! ├───────────────────────────────┤ ← footer_y = height - footer_height
//! │ Company Name                  │
//! │ phone          │ website      │ ← base_y + 0 * LINE_HEIGHT
//! │ email          │ category     │ ← base_y + 1 * LINE_HEIGHT
//! │ address (full width)          │
//! │ services tag-line             │
//! └───────────────────────────────┘
//! ```
//!
//! Every layer is conditional on its content: absent data means the layer
//! is never created. Line positions are computed from line indices, so
//! omitting a field only shifts the lines below it in the same column.

use posterkit_layer_model::color::Color;
use posterkit_layer_model::content::{fields, ContentMap};
use posterkit_layer_model::geometry::{CanvasSize, Rect};
use posterkit_layer_model::layer::{FontWeight, Layer, LayerList, TextStyle};

use crate::style::{TemplateId, TemplatePalette};

/// Left/right inset of every text block.
pub const MARGIN: f64 = 20.0;
/// Top of the company-name heading.
pub const HEADING_Y: f64 = 30.0;
pub const HEADING_HEIGHT: f64 = 36.0;
pub const HEADING_FONT_SIZE: f64 = 24.0;
/// Heading color. Templates restyle the footer band only.
pub const HEADING_COLOR: Color = Color::WHITE;

/// Logo edge length as a fraction of canvas width.
pub const LOGO_SIZE_RATIO: f64 = 0.2;
pub const LOGO_Y: f64 = 20.0;
/// Added to the logo's z-index so logos paint above text.
pub const LOGO_Z_OFFSET: i32 = 100;

/// Footer band height as a fraction of canvas height.
pub const FOOTER_HEIGHT_RATIO: f64 = 0.3;
pub const FOOTER_MIN_HEIGHT: f64 = 120.0;
pub const FOOTER_PADDING: f64 = 10.0;
pub const FOOTER_NAME_HEIGHT: f64 = 26.0;
pub const FOOTER_NAME_FONT_SIZE: f64 = 18.0;

/// Vertical distance between consecutive contact lines.
pub const LINE_HEIGHT: f64 = 20.0;
pub const LINE_TEXT_HEIGHT: f64 = 18.0;
pub const LINE_FONT_SIZE: f64 = 12.0;
/// Gap between the canvas midline and the right column.
pub const COLUMN_GUTTER: f64 = 10.0;

const DEFAULT_FONT_FAMILY: &str = "System";

const LEFT_COLUMN: [&str; 2] = [fields::PHONE, fields::EMAIL];
const RIGHT_COLUMN: [&str; 2] = [fields::WEBSITE, fields::CATEGORY];

/// Height of the footer band for a canvas height. Never exceeds the canvas.
pub fn footer_height(canvas_height: f64) -> f64 {
    (canvas_height * FOOTER_HEIGHT_RATIO)
        .max(FOOTER_MIN_HEIGHT)
        .min(canvas_height)
}

/// Generate the default layer set for the given content.
pub fn generate_default_layers(
    content: &ContentMap,
    canvas: CanvasSize,
    template: TemplateId,
) -> LayerList {
    let palette = template.palette();
    let mut builder = LayoutBuilder::new(canvas);

    let logo_size = canvas.width * LOGO_SIZE_RATIO;
    let has_logo = content.contains(fields::LOGO);

    if let Some(name) = content.get(fields::COMPANY_NAME) {
        let reserved = if has_logo {
            logo_size + COLUMN_GUTTER
        } else {
            0.0
        };
        let width = canvas.width - 2.0 * MARGIN - reserved;
        builder.text(
            fields::COMPANY_NAME,
            name,
            Rect::new(MARGIN, HEADING_Y, width, HEADING_HEIGHT),
            text_style(HEADING_FONT_SIZE, HEADING_COLOR, FontWeight::Bold),
        );
    }

    if let Some(source) = content.get(fields::LOGO) {
        let rect = Rect::new(
            canvas.width - MARGIN - logo_size,
            LOGO_Y,
            logo_size,
            logo_size,
        );
        builder.logo(source, rect);
    }

    let has_footer_content = fields::FOOTER_TEXT
        .iter()
        .filter(|k| **k != fields::FOOTER_COMPANY_NAME)
        .chain(std::iter::once(&fields::COMPANY_NAME))
        .any(|k| content.contains(k));
    if !has_footer_content {
        return builder.finish();
    }

    let band_height = footer_height(canvas.height);
    let footer_y = canvas.height - band_height;
    builder.panel(Rect::new(0.0, footer_y, canvas.width, band_height), palette);

    let footer_text = palette.footer_text;
    let name_y = footer_y + FOOTER_PADDING;
    if let Some(name) = content.get(fields::COMPANY_NAME) {
        builder.text(
            fields::FOOTER_COMPANY_NAME,
            name,
            Rect::new(
                MARGIN,
                name_y,
                canvas.width - 2.0 * MARGIN,
                FOOTER_NAME_HEIGHT,
            ),
            text_style(FOOTER_NAME_FONT_SIZE, footer_text, FontWeight::Semibold),
        );
    }

    let base_y = name_y + FOOTER_NAME_HEIGHT + FOOTER_PADDING / 2.0;
    let column_width = canvas.width / 2.0 - MARGIN - COLUMN_GUTTER;
    let column_x = [MARGIN, canvas.width / 2.0 + COLUMN_GUTTER];
    let line_style = text_style(LINE_FONT_SIZE, footer_text, FontWeight::Normal);

    let mut rows = 0;
    for (column, keys) in [LEFT_COLUMN, RIGHT_COLUMN].iter().enumerate() {
        let mut line = 0;
        for key in keys {
            if let Some(value) = content.get(key) {
                let y = base_y + line as f64 * LINE_HEIGHT;
                builder.text(
                    key,
                    value,
                    Rect::new(column_x[column], y, column_width, LINE_TEXT_HEIGHT),
                    line_style.clone(),
                );
                line += 1;
            }
        }
        rows = rows.max(line);
    }

    let full_width = canvas.width - 2.0 * MARGIN;
    for key in [fields::ADDRESS, fields::SERVICES] {
        if let Some(value) = content.get(key) {
            let y = base_y + rows as f64 * LINE_HEIGHT;
            builder.text(
                key,
                value,
                Rect::new(MARGIN, y, full_width, LINE_TEXT_HEIGHT),
                line_style.clone(),
            );
            rows += 1;
        }
    }

    builder.finish()
}

fn text_style(font_size: f64, color: Color, weight: FontWeight) -> TextStyle {
    TextStyle {
        font_size,
        color,
        font_family: DEFAULT_FONT_FAMILY.to_string(),
        font_weight: weight,
        background_color: None,
    }
}

/// Accumulates layers in emission order, assigning z-indices and clamping
/// geometry into the canvas.
struct LayoutBuilder {
    canvas: CanvasSize,
    layers: LayerList,
    next_z: i32,
}

impl LayoutBuilder {
    fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            layers: LayerList::new(),
            next_z: 1,
        }
    }

    fn z(&mut self) -> i32 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    fn text(&mut self, key: &str, text: &str, rect: Rect, style: TextStyle) {
        let z = self.z();
        let layer = Layer::text(text, style, rect.fit_within(self.canvas))
            .with_field(key)
            .with_z_index(z);
        self.layers.push(layer);
    }

    fn logo(&mut self, source: &str, rect: Rect) {
        let z = self.z() + LOGO_Z_OFFSET;
        let layer = Layer::logo(source, rect.fit_within(self.canvas))
            .with_field(fields::LOGO)
            .with_z_index(z);
        self.layers.push(layer);
    }

    fn panel(&mut self, rect: Rect, palette: TemplatePalette) {
        let z = self.z();
        let layer = Layer::panel(palette.footer_background, rect.fit_within(self.canvas))
            .with_field(fields::FOOTER_BACKGROUND)
            .with_z_index(z);
        self.layers.push(layer);
    }

    fn finish(self) -> LayerList {
        tracing::debug!(
            layers = self.layers.len(),
            width = self.canvas.width,
            height = self.canvas.height,
            "Generated default layout"
        );
        self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posterkit_layer_model::layer::LayerType;

    fn full_content() -> ContentMap {
        [
            (fields::COMPANY_NAME, "Acme Co"),
            (fields::LOGO, "https://cdn.acme.test/logo.png"),
            (fields::PHONE, "555-1234"),
            (fields::EMAIL, "hi@acme.test"),
            (fields::WEBSITE, "acme.test"),
            (fields::CATEGORY, "Bakery"),
            (fields::ADDRESS, "1 Main St"),
            (fields::SERVICES, "Cakes • Bread"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_footer_height_never_exceeds_canvas() {
        assert_eq!(footer_height(640.0), 192.0);
        assert_eq!(footer_height(200.0), 120.0);
        assert_eq!(footer_height(80.0), 80.0);
    }

    #[test]
    fn test_full_profile_emits_every_layer() {
        let layers =
            generate_default_layers(&full_content(), CanvasSize::new(360.0, 640.0), TemplateId::Classic);
        for key in fields::KNOWN {
            assert!(layers.find_field(key).is_some(), "missing {key}");
        }
        assert_eq!(layers.len(), fields::KNOWN.len());
    }

    #[test]
    fn test_columns_and_lines() {
        let layers =
            generate_default_layers(&full_content(), CanvasSize::new(360.0, 640.0), TemplateId::Classic);
        let phone = layers.find_field(fields::PHONE).unwrap();
        let email = layers.find_field(fields::EMAIL).unwrap();
        let website = layers.find_field(fields::WEBSITE).unwrap();
        let address = layers.find_field(fields::ADDRESS).unwrap();
        let services = layers.find_field(fields::SERVICES).unwrap();

        assert_eq!(phone.position.x, MARGIN);
        assert_eq!(website.position.x, 180.0 + COLUMN_GUTTER);
        assert_eq!(phone.position.y, website.position.y);
        assert_eq!(email.position.y - phone.position.y, LINE_HEIGHT);
        assert_eq!(address.position.y - email.position.y, LINE_HEIGHT);
        assert_eq!(services.position.y - address.position.y, LINE_HEIGHT);
        assert_eq!(address.size.width, 360.0 - 2.0 * MARGIN);
    }

    #[test]
    fn test_missing_email_only_shifts_left_column() {
        let content: ContentMap = full_content()
            .iter()
            .filter(|(k, _)| k.as_str() != fields::EMAIL)
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        let canvas = CanvasSize::new(360.0, 640.0);
        let full = generate_default_layers(&full_content(), canvas, TemplateId::Classic);
        let partial = generate_default_layers(&content, canvas, TemplateId::Classic);

        let y = |list: &LayerList, key: &str| list.find_field(key).unwrap().position.y;
        assert_eq!(y(&full, fields::WEBSITE), y(&partial, fields::WEBSITE));
        assert_eq!(y(&full, fields::CATEGORY), y(&partial, fields::CATEGORY));
        // Right column still has two rows, so the address line does not move.
        assert_eq!(y(&full, fields::ADDRESS), y(&partial, fields::ADDRESS));
    }

    #[test]
    fn test_logo_paints_above_text_and_top_right() {
        let layers =
            generate_default_layers(&full_content(), CanvasSize::new(360.0, 640.0), TemplateId::Classic);
        let logo = layers.find_field(fields::LOGO).unwrap();
        assert_eq!(logo.layer_type(), LayerType::Logo);
        assert_eq!(logo.position.x + logo.size.width, 360.0 - MARGIN);
        assert!(layers.iter().all(|l| l.id == logo.id || l.z_index < logo.z_index));
    }

    #[test]
    fn test_logo_only_has_no_footer() {
        let content: ContentMap = [(fields::LOGO, "logo.png")].into_iter().collect();
        let layers = generate_default_layers(&content, CanvasSize::new(360.0, 640.0), TemplateId::Classic);
        assert_eq!(layers.len(), 1);
        assert!(layers.find_field(fields::FOOTER_BACKGROUND).is_none());
    }

    #[test]
    fn test_tiny_canvas_keeps_layers_inside() {
        let canvas = CanvasSize::new(60.0, 90.0);
        let layers = generate_default_layers(&full_content(), canvas, TemplateId::Classic);
        for layer in &layers {
            assert!(layer.rect().is_within(canvas), "{:?} escapes canvas", layer.field_type);
        }
    }

    #[test]
    fn test_template_colors_flow_into_layers() {
        let layers =
            generate_default_layers(&full_content(), CanvasSize::new(360.0, 640.0), TemplateId::Bold);
        let palette = TemplateId::Bold.palette();
        let phone = layers.find_field(fields::PHONE).unwrap();
        assert_eq!(phone.text_style().unwrap().color, palette.footer_text);
        let heading = layers.find_field(fields::COMPANY_NAME).unwrap();
        assert_eq!(heading.text_style().unwrap().color, HEADING_COLOR);
    }
}
