use serde::{Deserialize, Serialize};

use super::SurfaceError;

pub const BYTES_PER_PIXEL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    #[serde(rename = "srgb")]
    Srgb,
    #[serde(rename = "display-p3")]
    DisplayP3,
}

/// Full snapshot of a surface: RGBA bytes, row-major from the top-left corner.
///
/// The serialized form is the persisted file format, so the field names are
/// fixed: `data`, `colorSpace`, `width`, `height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterBuffer {
    #[serde(rename = "data")]
    pixels: Vec<u8>,
    #[serde(rename = "colorSpace")]
    color_space: ColorSpace,
    width: u32,
    height: u32,
}

impl RasterBuffer {
    pub fn new(
        width: u32,
        height: u32,
        color_space: ColorSpace,
        pixels: Vec<u8>,
    ) -> Result<Self, SurfaceError> {
        let buffer = Self {
            pixels,
            color_space,
            width,
            height,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Checks that the pixel data covers exactly `width * height` pixels.
    ///
    /// Deserialization does not run this, so buffers decoded from files must
    /// be validated before use.
    pub fn validate(&self) -> Result<(), SurfaceError> {
        let expected = expected_len(self.width, self.height);
        if Some(self.pixels.len()) != expected {
            return Err(SurfaceError::BufferLengthMismatch {
                width: self.width,
                height: self.height,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }

    pub(super) fn from_rgba_image(image: &image::RgbaImage, color_space: ColorSpace) -> Self {
        Self {
            pixels: image.as_raw().clone(),
            color_space,
            width: image.width(),
            height: image.height(),
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let chunk = self.pixels.get(offset..offset + BYTES_PER_PIXEL)?;
        Some([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(input: &str) -> Result<Self, SurfaceError> {
        let buffer: Self = serde_json::from_str(input)?;
        buffer.validate()?;
        Ok(buffer)
    }
}

fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}
