//! Encoded capture output.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use posterkit_common::error::{PosterError, PosterResult};

/// A PNG-encoded raster.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    pub width: u32,
    pub height: u32,
    #[serde(with = "png_base64")]
    pub png: Vec<u8>,
}

impl std::fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

impl ImageArtifact {
    pub fn from_rgba(image: &RgbaImage) -> PosterResult<Self> {
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| PosterError::capture(format!("PNG encode failed: {e}")))?;

        Ok(Self {
            width: image.width(),
            height: image.height(),
            png,
        })
    }

    /// Decode back into pixels.
    pub fn decode(&self) -> PosterResult<RgbaImage> {
        image::load_from_memory_with_format(&self.png, ImageFormat::Png)
            .map(|img| img.to_rgba8())
            .map_err(|e| PosterError::capture(format!("PNG decode failed: {e}")))
    }

    /// `data:image/png;base64,...` URI for callers that hand artifacts to
    /// web views or share sheets.
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", BASE64_STANDARD.encode(&self.png))
    }
}

mod png_base64 {
    use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
