use image::{Rgba as ImageRgba, RgbaImage};

use super::{parse_color, ColorSpace, RasterBuffer, RasterSurface, SurfaceError, SurfaceResult};
use crate::geometry::{Color, Point, Rect, Rgba};

/// In-memory RGBA surface. Draws aliased shapes with a one pixel stroke and
/// replaces pixels outright instead of blending.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
    color_space: ColorSpace,
}

impl ImageSurface {
    /// Creates a fully transparent surface.
    pub fn new(width: u32, height: u32) -> SurfaceResult<Self> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::InvalidDimensions { width, height });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
            color_space: ColorSpace::Srgb,
        })
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image
            .get_pixel_checked(x, y)
            .map(|ImageRgba([r, g, b, a])| Rgba::new(*r, *g, *b, *a))
    }

    fn resolve(&self, color: &Color) -> Option<Rgba> {
        let resolved = parse_color(color);
        if resolved.is_none() {
            tracing::warn!(color = %color, "unrecognized color token; skipping draw");
        }
        resolved
    }

    fn put(&mut self, x: i64, y: i64, rgba: Rgba) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return false;
        };
        if x >= self.image.width() || y >= self.image.height() {
            return false;
        }
        self.image.put_pixel(x, y, ImageRgba(rgba.channels()));
        true
    }

    fn put_span(&mut self, from_x: i64, to_x: i64, y: i64, rgba: Rgba) -> bool {
        let max_x = i64::from(self.image.width()) - 1;
        let mut drawn = false;
        for x in from_x.max(0)..=to_x.min(max_x) {
            drawn |= self.put(x, y, rgba);
        }
        drawn
    }

    fn put_column(&mut self, x: i64, from_y: i64, to_y: i64, rgba: Rgba) -> bool {
        let max_y = i64::from(self.image.height()) - 1;
        let mut drawn = false;
        for y in from_y.max(0)..=to_y.min(max_y) {
            drawn |= self.put(x, y, rgba);
        }
        drawn
    }

    /// Steps between two cells. Callers clip first so both cells lie within
    /// one pixel of the surface.
    fn bresenham(&mut self, from: (i64, i64), to: (i64, i64), rgba: Rgba) -> bool {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let step_x = if x < to.0 { 1 } else { -1 };
        let step_y = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut drawn = false;

        loop {
            drawn |= self.put(x, y, rgba);
            if x == to.0 && y == to.1 {
                break;
            }
            let doubled = err * 2;
            if doubled >= dy {
                err += dy;
                x += step_x;
            }
            if doubled <= dx {
                err += dx;
                y += step_y;
            }
        }
        drawn
    }

    /// Liang-Barsky clip of a segment against the surface grown by one pixel
    /// on every side. `None` when the segment misses it entirely.
    ///
    /// A clipped endpoint is pinned to the edge it crossed instead of being
    /// interpolated along that axis, which keeps huge coordinates from
    /// cancelling out.
    fn clip_segment(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        if ![from.x, from.y, to.x, to.y].iter().all(|value| value.is_finite()) {
            return None;
        }
        let min = -CLIP_MARGIN;
        let max_x = f64::from(self.image.width()) + CLIP_MARGIN;
        let max_y = f64::from(self.image.height()) + CLIP_MARGIN;
        let dx = to.x - from.x;
        let dy = to.y - from.y;

        let mut enter = (0.0_f64, None);
        let mut leave = (1.0_f64, None);
        for (p, q, edge) in [
            (-dx, from.x - min, ClipEdge::X(min)),
            (dx, max_x - from.x, ClipEdge::X(max_x)),
            (-dy, from.y - min, ClipEdge::Y(min)),
            (dy, max_y - from.y, ClipEdge::Y(max_y)),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 && t > enter.0 {
                enter = (t, Some(edge));
            } else if p > 0.0 && t < leave.0 {
                leave = (t, Some(edge));
            }
            if enter.0 > leave.0 {
                return None;
            }
        }

        let at = |(t, edge): (f64, Option<ClipEdge>)| {
            let mut point = Point::new(from.x + t * dx, from.y + t * dy);
            match edge {
                Some(ClipEdge::X(x)) => point.x = x,
                Some(ClipEdge::Y(y)) => point.y = y,
                None => {}
            }
            Point::new(point.x.clamp(min, max_x), point.y.clamp(min, max_y))
        };
        let clipped = (at(enter), at(leave));
        [clipped.0.x, clipped.0.y, clipped.1.x, clipped.1.y]
            .iter()
            .all(|value| value.is_finite())
            .then_some(clipped)
    }
}

#[derive(Debug, Clone, Copy)]
enum ClipEdge {
    X(f64),
    Y(f64),
}

const CLIP_MARGIN: f64 = 1.0;

fn cell(point: Point) -> (i64, i64) {
    (point.x.floor() as i64, point.y.floor() as i64)
}

impl RasterSurface for ImageSurface {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: &Color) -> bool {
        if radius.is_nan() || radius <= 0.0 {
            return false;
        }
        let Some(rgba) = self.resolve(color) else {
            return false;
        };

        let min_x = ((center.x - radius).floor() as i64).max(0);
        let min_y = ((center.y - radius).floor() as i64).max(0);
        let max_x = ((center.x + radius).ceil() as i64).min(i64::from(self.image.width()) - 1);
        let max_y = ((center.y + radius).ceil() as i64).min(i64::from(self.image.height()) - 1);
        let radius_sq = radius * radius;
        let mut drawn = false;

        for y in min_y..=max_y {
            let dy = y as f64 + 0.5 - center.y;
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - center.x;
                if dx * dx + dy * dy <= radius_sq {
                    drawn |= self.put(x, y, rgba);
                }
            }
        }
        drawn
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: &Color) -> bool {
        let Some(rgba) = self.resolve(color) else {
            return false;
        };
        let Some((from, to)) = self.clip_segment(from, to) else {
            return false;
        };
        self.bresenham(cell(from), cell(to), rgba)
    }

    fn stroke_rect(&mut self, rect: Rect, color: &Color) -> bool {
        let Some(rgba) = self.resolve(color) else {
            return false;
        };
        let (left, top) = cell(Point::new(rect.x, rect.y));
        let (right, bottom) = cell(Point::new(rect.right(), rect.bottom()));

        let mut drawn = self.put_span(left, right, top, rgba);
        drawn |= self.put_span(left, right, bottom, rgba);
        drawn |= self.put_column(left, top, bottom, rgba);
        drawn |= self.put_column(right, top, bottom, rgba);
        drawn
    }

    fn fill_all(&mut self, color: &Color) -> bool {
        let Some(rgba) = self.resolve(color) else {
            return false;
        };
        let fill = ImageRgba(rgba.channels());
        for pixel in self.image.pixels_mut() {
            *pixel = fill;
        }
        true
    }

    fn read_pixels(&self) -> RasterBuffer {
        RasterBuffer::from_rgba_image(&self.image, self.color_space)
    }

    fn write_pixels(&mut self, buffer: &RasterBuffer) {
        if buffer.color_space() != self.color_space {
            tracing::debug!(
                source = ?buffer.color_space(),
                target = ?self.color_space,
                "writing pixels across color spaces without conversion"
            );
        }

        let copy_width = buffer.width().min(self.image.width()) as usize;
        let copy_height = buffer.height().min(self.image.height()) as usize;
        let src_stride = buffer.width() as usize * super::BYTES_PER_PIXEL;
        let dst_stride = self.image.width() as usize * super::BYTES_PER_PIXEL;
        let row_len = copy_width * super::BYTES_PER_PIXEL;
        let src = buffer.pixels();
        let dst: &mut [u8] = &mut self.image;

        for row in 0..copy_height {
            let src_offset = row * src_stride;
            let dst_offset = row * dst_stride;
            let (Some(src_row), Some(dst_row)) = (
                src.get(src_offset..src_offset + row_len),
                dst.get_mut(dst_offset..dst_offset + row_len),
            ) else {
                return;
            };
            dst_row.copy_from_slice(src_row);
        }
    }
}
