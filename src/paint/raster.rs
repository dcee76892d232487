use super::Tool;
use crate::geometry::{chebyshev_distance, Color, Point, Rect};
use crate::surface::RasterSurface;

pub(super) const BRUSH_RADIUS: f64 = 1.0;

/// Drag geometry handed to every rasterizer: where the drag started and where
/// the pointer is now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Segment {
    pub(super) anchor: Point,
    pub(super) at: Point,
}

type Rasterizer = fn(&mut dyn RasterSurface, Segment, &Color) -> bool;

pub(super) fn rasterizer(tool: Tool) -> Rasterizer {
    match tool {
        Tool::Freehand => stamp_brush,
        Tool::Line => draw_line,
        Tool::Rectangle => draw_rectangle,
        Tool::Circle => draw_circle,
    }
}

fn stamp_brush(surface: &mut dyn RasterSurface, segment: Segment, color: &Color) -> bool {
    surface.fill_disc(segment.at, BRUSH_RADIUS, color)
}

fn draw_line(surface: &mut dyn RasterSurface, segment: Segment, color: &Color) -> bool {
    surface.stroke_line(segment.anchor, segment.at, color)
}

fn draw_rectangle(surface: &mut dyn RasterSurface, segment: Segment, color: &Color) -> bool {
    surface.stroke_rect(Rect::from_corners(segment.anchor, segment.at), color)
}

fn draw_circle(surface: &mut dyn RasterSurface, segment: Segment, color: &Color) -> bool {
    let radius = chebyshev_distance(segment.anchor, segment.at);
    surface.fill_disc(segment.anchor, radius, color)
}
