use std::path::Path;

use serde::Deserialize;

use super::{Session, SessionEvent, SessionOutcome};
use crate::error::AppResult;
use crate::geometry::Color;
use crate::paint::{Paint, Tool};
use crate::storage::CanvasStorage;
use crate::surface::ImageSurface;

/// Recorded input for a headless drawing session.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub events: Vec<SessionEvent>,
}

impl Script {
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&raw)?)
    }
}

#[derive(Debug)]
pub struct ScriptReport {
    pub outcomes: Vec<SessionOutcome>,
    pub surface: ImageSurface,
}

/// Plays every event of `script` against a fresh surface. Sizes missing from
/// the script fall back to `default_size`.
pub fn run_script<St: CanvasStorage>(
    script: Script,
    default_size: (u32, u32),
    tool: Tool,
    color: Color,
    storage: St,
) -> AppResult<ScriptReport> {
    let width = script.width.unwrap_or(default_size.0);
    let height = script.height.unwrap_or(default_size.1);
    let surface = ImageSurface::new(width, height)?;
    let mut session = Session::new(Paint::with_tool(surface, tool, color), storage);

    let mut outcomes = Vec::with_capacity(script.events.len());
    for (index, event) in script.events.into_iter().enumerate() {
        let outcome = session.handle(event)?;
        tracing::debug!(index, ?outcome, "script event handled");
        if let SessionOutcome::Exported(path) = &outcome {
            tracing::info!(index, path = %path.display(), "script export written");
        }
        outcomes.push(outcome);
    }

    Ok(ScriptReport {
        outcomes,
        surface: session.into_paint().into_surface(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::geometry::Rgba;
    use crate::storage::StorageService;
    use std::path::PathBuf;

    fn storage() -> StorageService {
        StorageService::with_export_dir(PathBuf::from("/nonexistent/scribble"))
    }

    #[test]
    fn run_script_draws_rectangle_from_recorded_drag() {
        let script = Script::from_json(
            r##"{
                "width": 12,
                "height": 12,
                "events": [
                    {"type": "key", "key": "Escape"},
                    {"type": "toolbar", "label": "rectangle"},
                    {"type": "color", "value": "#00ff00"},
                    {"type": "pointer_down", "x": 10, "y": 10},
                    {"type": "pointer_move", "x": 7, "y": 5},
                    {"type": "pointer_up", "x": 4, "y": 2}
                ]
            }"##,
        )
        .unwrap();

        let report = run_script(script, (800, 600), Tool::Freehand, Color::default(), storage())
            .unwrap();

        assert_eq!(
            report.outcomes,
            vec![
                SessionOutcome::Cleared,
                SessionOutcome::ToolChanged(Tool::Rectangle),
                SessionOutcome::ColorChanged,
                SessionOutcome::DragStarted,
                SessionOutcome::Ignored,
                SessionOutcome::DragEnded { drawn: true },
            ]
        );
        let green = Some(Rgba::opaque(0, 255, 0));
        assert_eq!(report.surface.pixel(4, 2), green);
        assert_eq!(report.surface.pixel(10, 10), green);
        assert_eq!(report.surface.pixel(7, 5), Some(Rgba::WHITE));
    }

    #[test]
    fn run_script_uses_default_size_when_missing() {
        let script = Script::from_json(r#"{"events": []}"#).unwrap();
        let report =
            run_script(script, (5, 3), Tool::Line, Color::default(), storage()).unwrap();
        assert_eq!(report.surface.image().dimensions(), (5, 3));
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn run_script_stops_on_unknown_tool_label() {
        let script = Script::from_json(
            r#"{"width": 4, "height": 4, "events": [{"type": "toolbar", "label": "lasso"}]}"#,
        )
        .unwrap();
        let err = run_script(script, (4, 4), Tool::Freehand, Color::default(), storage())
            .unwrap_err();
        assert!(matches!(err, AppError::Session(_)));
        assert_eq!(err.to_string(), "unknown tool \"LASSO\"");
    }

    #[test]
    fn run_script_rejects_empty_surface() {
        let script = Script::from_json(r#"{"width": 0, "height": 4, "events": []}"#).unwrap();
        let err = run_script(script, (4, 4), Tool::Freehand, Color::default(), storage())
            .unwrap_err();
        assert!(matches!(err, AppError::Surface(_)));
    }
}
