//! Snapshot renderers and asset loading.
//!
//! [`SnapshotRenderer`] is the seam to whatever actually rasterizes a
//! composition (a platform view snapshot, a GPU surface, ...). The bundled
//! [`SoftwareRenderer`] paints with `image`/`imageproc` so captures work
//! headless.
//!
//! Asset failures never fail a render: an image or logo that cannot be
//! loaded paints as an empty outline box. Only the background is required.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, PxScale};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, Blend};
use imageproc::rect::Rect as PixelRect;

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_layer_model::color::Color;
use posterkit_layer_model::geometry::Rect;
use posterkit_layer_model::layer::{Layer, LayerContent, TextStyle};

use crate::compositor::Composition;

/// Outline color for image layers whose asset is unavailable.
const MISSING_ASSET_OUTLINE: Rgba<u8> = Rgba([160, 160, 160, 200]);

/// Rasterizes a composition.
#[async_trait::async_trait]
pub trait SnapshotRenderer: Send + Sync {
    /// Paint `composition` into an RGBA buffer.
    async fn render(&self, composition: &Composition) -> PosterResult<RgbaImage>;

    /// Renderer name for logs.
    fn name(&self) -> &str;
}

/// Resolves image references to decoded pixels.
#[async_trait::async_trait]
pub trait AssetSource: Send + Sync {
    async fn load(&self, reference: &str) -> PosterResult<DynamicImage>;
}

/// In-memory assets keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    images: HashMap<String, DynamicImage>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: DynamicImage) {
        self.images.insert(reference.into(), image);
    }

    pub fn with(mut self, reference: impl Into<String>, image: DynamicImage) -> Self {
        self.insert(reference, image);
        self
    }
}

#[async_trait::async_trait]
impl AssetSource for MemoryAssetSource {
    async fn load(&self, reference: &str) -> PosterResult<DynamicImage> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| PosterError::asset(reference))
    }
}

/// Loads `data:` URIs, `file://` URIs, and paths relative to a root.
/// Remote references are reported as unavailable.
#[derive(Debug, Clone)]
pub struct FileAssetSource {
    root: PathBuf,
}

impl FileAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference.strip_prefix("file://").unwrap_or(reference));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait::async_trait]
impl AssetSource for FileAssetSource {
    async fn load(&self, reference: &str) -> PosterResult<DynamicImage> {
        let bytes = if let Some(encoded) = data_uri_payload(reference) {
            BASE64_STANDARD
                .decode(encoded)
                .map_err(|_| PosterError::asset(truncate(reference)))?
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(PosterError::unsupported(format!(
                "remote asset {reference} must be fetched by the caller"
            )));
        } else {
            let path = self.resolve(reference);
            if !path.exists() {
                return Err(PosterError::FileNotFound { path });
            }
            tokio::fs::read(&path).await?
        };

        image::load_from_memory(&bytes).map_err(|e| {
            tracing::debug!(reference = %truncate(reference), error = %e, "Asset decode failed");
            PosterError::asset(truncate(reference))
        })
    }
}

fn data_uri_payload(reference: &str) -> Option<&str> {
    let rest = reference.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    meta.ends_with(";base64").then_some(payload)
}

fn truncate(reference: &str) -> String {
    const MAX: usize = 64;
    match reference.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &reference[..idx]),
        None => reference.to_string(),
    }
}

/// CPU rasterizer built on `image` and `imageproc`.
pub struct SoftwareRenderer<A> {
    assets: A,
    font: Option<FontArc>,
    /// Output pixels per canvas unit.
    pixel_ratio: f64,
    /// Painted under the background in full captures.
    background_fill: Color,
}

impl<A: AssetSource> SoftwareRenderer<A> {
    pub fn new(assets: A) -> Self {
        Self {
            assets,
            font: None,
            pixel_ratio: 1.0,
            background_fill: Color::BLACK,
        }
    }

    /// Font used for every text layer. Without one, text layers paint only
    /// their background fill.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Parse and attach a TTF/OTF font.
    pub fn with_font_bytes(self, bytes: Vec<u8>) -> PosterResult<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| PosterError::render(format!("invalid font data: {e}")))?;
        Ok(self.with_font(font))
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        if ratio.is_finite() && ratio > 0.0 {
            self.pixel_ratio = ratio;
        }
        self
    }

    pub fn with_background_fill(mut self, fill: Color) -> Self {
        self.background_fill = fill;
        self
    }

    /// Load every image the composition references. Layer assets that
    /// fail are recorded as `None`; a failing background is an error.
    async fn load_assets(
        &self,
        composition: &Composition,
    ) -> PosterResult<(Option<DynamicImage>, HashMap<String, Option<DynamicImage>>)> {
        let background = match &composition.background {
            Some(media) => Some(self.assets.load(&media.uri).await?),
            None => None,
        };

        let mut images = HashMap::new();
        for layer in &composition.layers {
            let source = match &layer.content {
                LayerContent::Image { source } | LayerContent::Logo { source } => source,
                _ => continue,
            };
            if source.is_empty() || images.contains_key(source) {
                continue;
            }
            let loaded = match self.assets.load(source).await {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!(layer = %layer.id, error = %e, "Asset unavailable; painting empty box");
                    None
                }
            };
            images.insert(source.clone(), loaded);
        }
        Ok((background, images))
    }
}

#[async_trait::async_trait]
impl<A: AssetSource> SnapshotRenderer for SoftwareRenderer<A> {
    async fn render(&self, composition: &Composition) -> PosterResult<RgbaImage> {
        if !composition.canvas.is_valid() {
            return Err(PosterError::render(format!(
                "invalid canvas {}x{}",
                composition.canvas.width, composition.canvas.height
            )));
        }
        let (background, images) = self.load_assets(composition).await?;

        let raster = Rasterizer {
            composition: composition.clone(),
            background,
            images,
            font: self.font.clone(),
            pixel_ratio: self.pixel_ratio,
            background_fill: self.background_fill,
        };
        tokio::task::spawn_blocking(move || raster.paint())
            .await
            .map_err(|e| PosterError::render(format!("raster task failed: {e}")))
    }

    fn name(&self) -> &str {
        "software"
    }
}

/// Owned paint job, run off the async executor.
struct Rasterizer {
    composition: Composition,
    background: Option<DynamicImage>,
    images: HashMap<String, Option<DynamicImage>>,
    font: Option<FontArc>,
    pixel_ratio: f64,
    background_fill: Color,
}

impl Rasterizer {
    fn paint(self) -> RgbaImage {
        let canvas = self.composition.canvas;
        let width = ((canvas.width * self.pixel_ratio).round() as u32).max(1);
        let height = ((canvas.height * self.pixel_ratio).round() as u32).max(1);

        let mut target = match &self.background {
            Some(media) => {
                let mut base = RgbaImage::from_pixel(width, height, rgba(self.background_fill));
                let fitted = media.resize_to_fill(width, height, FilterType::Triangle);
                imageops::overlay(&mut base, &fitted.to_rgba8(), 0, 0);
                base
            }
            None => RgbaImage::from_pixel(width, height, rgba(Color::TRANSPARENT)),
        };

        for layer in &self.composition.layers {
            self.paint_layer(&mut target, layer);
        }
        target
    }

    fn paint_layer(&self, target: &mut RgbaImage, layer: &Layer) {
        let Some(bounds) = self.pixel_rect(layer.rect()) else {
            return;
        };

        match &layer.content {
            LayerContent::Panel { background } => fill(target, bounds, *background),
            LayerContent::Text { text, style } => self.paint_text(target, bounds, text, style),
            LayerContent::Image { source } => self.paint_image(target, bounds, source, false),
            LayerContent::Logo { source } => self.paint_image(target, bounds, source, true),
        }
    }

    fn paint_text(&self, target: &mut RgbaImage, bounds: PixelRect, text: &str, style: &TextStyle) {
        if let Some(background) = style.background_color {
            fill(target, bounds, background);
        }
        let Some(font) = &self.font else {
            return;
        };
        if text.is_empty() || style.font_size <= 0.0 || style.color.is_transparent() {
            return;
        }

        let px = (style.font_size * self.pixel_ratio) as f32;
        // Vertically center a single line inside the layer box.
        let inset = ((bounds.height() as f32 - px) / 2.0).max(0.0) as i32;
        let mut blend = Blend(std::mem::take(target));
        draw_text_mut(
            &mut blend,
            rgba(style.color),
            bounds.left() + (px * 0.25) as i32,
            bounds.top() + inset,
            PxScale::from(px),
            font,
            text,
        );
        *target = blend.0;
    }

    fn paint_image(&self, target: &mut RgbaImage, bounds: PixelRect, source: &str, contain: bool) {
        let Some(Some(image)) = self.images.get(source) else {
            draw_hollow_rect_mut(target, bounds, MISSING_ASSET_OUTLINE);
            return;
        };

        let (w, h) = (bounds.width(), bounds.height());
        let fitted = if contain {
            image.resize(w, h, FilterType::Triangle)
        } else {
            image.resize_to_fill(w, h, FilterType::Triangle)
        };
        // Contained logos are centered inside their box.
        let x = bounds.left() as i64 + (w as i64 - fitted.width() as i64) / 2;
        let y = bounds.top() as i64 + (h as i64 - fitted.height() as i64) / 2;
        imageops::overlay(target, &fitted.to_rgba8(), x, y);
    }

    fn pixel_rect(&self, rect: Rect) -> Option<PixelRect> {
        let r = self.pixel_ratio;
        let width = (rect.size.width * r).round();
        let height = (rect.size.height * r).round();
        if !(width >= 1.0 && height >= 1.0) {
            return None;
        }
        Some(
            PixelRect::at((rect.position.x * r).round() as i32, (rect.position.y * r).round() as i32)
                .of_size(width as u32, height as u32),
        )
    }
}

fn fill(target: &mut RgbaImage, bounds: PixelRect, color: Color) {
    if color.is_transparent() {
        return;
    }
    let mut blend = Blend(std::mem::take(target));
    draw_filled_rect_mut(&mut blend, bounds, rgba(color));
    *target = blend.0;
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_array())
}
