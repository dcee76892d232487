//! Drawing state machine: active tool, active color and the drag in progress.

mod raster;
mod tool;

use std::fmt;

use crate::geometry::{Color, Point, BACKGROUND_COLOR};
use crate::surface::RasterSurface;
use raster::{rasterizer, Segment};

pub use tool::{Tool, ToolParseError};

/// Routes pointer input into rasterization calls on the surface it owns.
///
/// `Paint` keeps no pixels of its own. Every call that draws mutates the
/// surface immediately and nothing is retained as an editable shape.
#[derive(Debug)]
pub struct Paint<S> {
    surface: S,
    tool: Tool,
    color: Color,
    dragging: bool,
    anchor: Option<Point>,
}

impl<S: RasterSurface> Paint<S> {
    pub fn new(surface: S) -> Self {
        Self::with_tool(surface, Tool::default(), Color::default())
    }

    pub fn with_tool(surface: S, tool: Tool, color: Color) -> Self {
        Self {
            surface,
            tool,
            color,
            dragging: false,
            anchor: None,
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        tracing::debug!(from = ?self.tool, to = ?tool, dragging = self.dragging, "tool changed");
        self.tool = tool;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_color(&mut self, color: impl Into<Color>) {
        self.color = color.into();
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Last drag anchor. Only meaningful while a drag is in progress.
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Starts a drag at `at`. A second call before `end_drag` moves the anchor.
    pub fn begin_drag(&mut self, at: Point) {
        self.dragging = true;
        self.anchor = Some(at);
    }

    /// Rasterizes the active tool between the anchor and `at`.
    ///
    /// Returns whether any pixel changed. Outside of a drag this is a no-op.
    pub fn paint(&mut self, at: Point) -> bool {
        let Some(anchor) = self.anchor.filter(|_| self.dragging) else {
            return false;
        };

        let draw = rasterizer(self.tool);
        draw(&mut self.surface, Segment { anchor, at }, &self.color)
    }

    /// Handles a pointer sample in the middle of a drag. Tools that only draw
    /// on release ignore it.
    pub fn track(&mut self, at: Point) -> bool {
        if !self.tool.paints_while_dragging() {
            return false;
        }
        self.paint(at)
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Fills the whole surface with the background color.
    pub fn clear(&mut self) {
        self.surface.fill_all(&Color::new(BACKGROUND_COLOR));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl<S> fmt::Display for Paint<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Is drawing: {}", self.dragging)?;
        writeln!(f, "Tool: {}", self.tool)?;
        match self.anchor {
            Some(anchor) => writeln!(f, "Anchor: {anchor}")?,
            None => writeln!(f, "Anchor: none")?,
        }
        write!(f, "Color: {}", self.color)
    }
}
