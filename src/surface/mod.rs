//! Raster surfaces that the paint state machine draws onto.

mod buffer;
mod color;
mod image_surface;

use crate::geometry::{Color, Point, Rect};
use thiserror::Error;

pub use buffer::{ColorSpace, RasterBuffer, BYTES_PER_PIXEL};
pub use color::parse_color;
pub use image_surface::ImageSurface;

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("pixel data holds {actual} bytes, expected {width}x{height}x4")]
    BufferLengthMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("malformed raster buffer: {0}")]
    MalformedBuffer(#[from] serde_json::Error),
}

/// Drawing primitives and pixel access a paint session needs from its surface.
pub trait RasterSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    // Drawing primitives report whether any pixel was written.
    fn fill_disc(&mut self, center: Point, radius: f64, color: &Color) -> bool;
    fn stroke_line(&mut self, from: Point, to: Point, color: &Color) -> bool;
    fn stroke_rect(&mut self, rect: Rect, color: &Color) -> bool;
    fn fill_all(&mut self, color: &Color) -> bool;

    fn read_pixels(&self) -> RasterBuffer;
    /// Copies `buffer` onto the surface at the origin, clipping whatever does
    /// not overlap.
    fn write_pixels(&mut self, buffer: &RasterBuffer);
}
