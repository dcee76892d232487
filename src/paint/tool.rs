use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Freehand,
    Line,
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolParseError {
    #[error("unknown tool \"{0}\"")]
    Unknown(String),
}

impl Tool {
    pub const ALL: [Tool; 4] = [Self::Freehand, Self::Line, Self::Rectangle, Self::Circle];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Freehand => "FREEHAND",
            Self::Line => "LINE",
            Self::Rectangle => "RECTANGLE",
            Self::Circle => "CIRCLE",
        }
    }

    /// Whether pointer samples in the middle of a drag should rasterize.
    ///
    /// Only the freehand brush stamps while moving; the shape tools draw once,
    /// when the drag is released.
    pub const fn paints_while_dragging(self) -> bool {
        matches!(self, Self::Freehand)
    }
}

impl FromStr for Tool {
    type Err = ToolParseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.label() == label)
            .ok_or_else(|| ToolParseError::Unknown(label.to_string()))
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
