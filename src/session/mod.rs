//! Host input glue: turns pointer, toolbar, keyboard and file events into
//! paint calls and raster file transfers.

mod script;

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{Color, Point};
use crate::input::{
    resolve_shortcut, resolve_toolbar_label, ShortcutAction, ShortcutKey, ShortcutModifiers,
    ToolbarCommand,
};
use crate::paint::{Paint, Tool, ToolParseError};
use crate::storage::{CanvasStorage, StorageError};
use crate::surface::RasterSurface;

pub use script::{run_script, Script, ScriptReport};

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tool(#[from] ToolParseError),
    #[error("export failed: {0}")]
    Export(#[source] StorageError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    Toolbar {
        label: String,
    },
    Color {
        value: String,
    },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    Export,
    Import {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Ignored,
    DragStarted,
    Drawn,
    DragEnded { drawn: bool },
    ToolChanged(Tool),
    ColorChanged,
    Cleared,
    Exported(PathBuf),
    Imported,
    ImportRejected,
}

/// One drawing session: a paint state machine plus the storage its exports
/// and imports go through. Events are handled strictly one at a time.
#[derive(Debug)]
pub struct Session<S, St> {
    paint: Paint<S>,
    storage: St,
    active_button: Option<Tool>,
}

impl<S, St> Session<S, St>
where
    S: RasterSurface,
    St: CanvasStorage,
{
    pub fn new(paint: Paint<S>, storage: St) -> Self {
        Self {
            paint,
            storage,
            active_button: None,
        }
    }

    pub fn paint(&self) -> &Paint<S> {
        &self.paint
    }

    pub fn storage(&self) -> &St {
        &self.storage
    }

    /// Tool whose toolbar button was last pressed, if any.
    pub fn active_button(&self) -> Option<Tool> {
        self.active_button
    }

    pub fn into_paint(self) -> Paint<S> {
        self.paint
    }

    pub fn handle(&mut self, event: SessionEvent) -> SessionResult<SessionOutcome> {
        tracing::trace!(?event, "session event");
        match event {
            SessionEvent::PointerDown { x, y } => {
                self.paint.begin_drag(Point::new(x, y));
                Ok(SessionOutcome::DragStarted)
            }
            SessionEvent::PointerMove { x, y } => Ok(if self.paint.track(Point::new(x, y)) {
                SessionOutcome::Drawn
            } else {
                SessionOutcome::Ignored
            }),
            SessionEvent::PointerUp { x, y } => {
                let drawn = self.paint.paint(Point::new(x, y));
                self.paint.end_drag();
                Ok(SessionOutcome::DragEnded { drawn })
            }
            SessionEvent::Toolbar { label } => self.toolbar(&label),
            SessionEvent::Color { value } => {
                self.paint.set_color(Color::new(value));
                Ok(SessionOutcome::ColorChanged)
            }
            SessionEvent::Key { key, ctrl, shift } => {
                let action = ShortcutKey::from_name(&key)
                    .and_then(|key| resolve_shortcut(key, ShortcutModifiers::new(ctrl, shift)));
                match action {
                    Some(ShortcutAction::ClearCanvas) => Ok(self.clear()),
                    Some(ShortcutAction::ExportCanvas) => self.export(),
                    None => Ok(SessionOutcome::Ignored),
                }
            }
            SessionEvent::Export => self.export(),
            SessionEvent::Import { path } => Ok(self.import(path)),
        }
    }

    fn toolbar(&mut self, label: &str) -> SessionResult<SessionOutcome> {
        match resolve_toolbar_label(label)? {
            ToolbarCommand::Download => self.export(),
            ToolbarCommand::SelectTool(tool) => {
                self.paint.set_tool(tool);
                self.active_button = Some(tool);
                Ok(SessionOutcome::ToolChanged(tool))
            }
        }
    }

    pub fn clear(&mut self) -> SessionOutcome {
        self.paint.clear();
        SessionOutcome::Cleared
    }

    pub fn export(&mut self) -> SessionResult<SessionOutcome> {
        let buffer = self.paint.surface().read_pixels();
        let path = self
            .storage
            .save_export(&buffer)
            .map_err(SessionError::Export)?;
        Ok(SessionOutcome::Exported(path))
    }

    /// Loads a previously exported raster onto the surface. A file that cannot
    /// be read or decoded is logged and leaves the surface as it was.
    pub fn import(&mut self, path: PathBuf) -> SessionOutcome {
        match self.storage.load_import(&path) {
            Ok(buffer) => {
                let surface = self.paint.surface_mut();
                if buffer.width() != surface.width() || buffer.height() != surface.height() {
                    tracing::warn!(
                        path = %path.display(),
                        buffer_width = buffer.width(),
                        buffer_height = buffer.height(),
                        surface_width = surface.width(),
                        surface_height = surface.height(),
                        "imported raster size differs from canvas"
                    );
                }
                surface.write_pixels(&buffer);
                tracing::info!(path = %path.display(), "imported canvas");
                SessionOutcome::Imported
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to import canvas");
                SessionOutcome::ImportRejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rgba;
    use crate::storage::StorageService;
    use crate::surface::{ImageSurface, RasterBuffer};
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("scribble-session-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn session(dir: &std::path::Path) -> Session<ImageSurface, StorageService> {
        let surface = ImageSurface::new(16, 12).unwrap();
        Session::new(
            Paint::new(surface),
            StorageService::with_export_dir(dir.to_path_buf()),
        )
    }

    fn painted(buffer: &RasterBuffer) -> usize {
        buffer
            .pixels()
            .chunks_exact(4)
            .filter(|pixel| pixel[3] != 0)
            .count()
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let events: Vec<SessionEvent> = serde_json::from_str(
            r#"[
                {"type": "pointer_down", "x": 1, "y": 2.5},
                {"type": "toolbar", "label": "line"},
                {"type": "key", "key": "Escape"},
                {"type": "export"}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                SessionEvent::PointerDown { x: 1.0, y: 2.5 },
                SessionEvent::Toolbar {
                    label: "line".to_string()
                },
                SessionEvent::Key {
                    key: "Escape".to_string(),
                    ctrl: false,
                    shift: false
                },
                SessionEvent::Export,
            ]
        );
    }

    #[test]
    fn pointer_move_and_up_share_the_same_dispatch() {
        let dir = scratch_dir("dispatch");
        let mut session = session(&dir);

        session
            .handle(SessionEvent::Toolbar {
                label: "line".into(),
            })
            .unwrap();
        session
            .handle(SessionEvent::PointerDown { x: 1.0, y: 1.0 })
            .unwrap();
        assert_eq!(
            session
                .handle(SessionEvent::PointerMove { x: 5.0, y: 1.0 })
                .unwrap(),
            SessionOutcome::Ignored
        );
        assert_eq!(painted(&session.paint().surface().read_pixels()), 0);

        assert_eq!(
            session
                .handle(SessionEvent::PointerUp { x: 10.0, y: 1.0 })
                .unwrap(),
            SessionOutcome::DragEnded { drawn: true }
        );
        assert_eq!(painted(&session.paint().surface().read_pixels()), 10);
        assert!(!session.paint().is_dragging());
    }

    #[test]
    fn freehand_moves_draw_and_stray_moves_do_not() {
        let dir = scratch_dir("freehand");
        let mut session = session(&dir);

        assert_eq!(
            session
                .handle(SessionEvent::PointerMove { x: 3.0, y: 3.0 })
                .unwrap(),
            SessionOutcome::Ignored
        );
        session
            .handle(SessionEvent::PointerDown { x: 3.0, y: 3.0 })
            .unwrap();
        assert_eq!(
            session
                .handle(SessionEvent::PointerMove { x: 3.0, y: 3.0 })
                .unwrap(),
            SessionOutcome::Drawn
        );
        assert_eq!(painted(&session.paint().surface().read_pixels()), 4);
    }

    #[test]
    fn toolbar_records_active_button_and_download_keeps_it() {
        let dir = scratch_dir("active-button");
        let mut session = session(&dir);
        assert_eq!(session.active_button(), None);

        session
            .handle(SessionEvent::Toolbar {
                label: "circle".into(),
            })
            .unwrap();
        assert_eq!(session.active_button(), Some(Tool::Circle));

        let outcome = session
            .handle(SessionEvent::Toolbar {
                label: "download".into(),
            })
            .unwrap();
        assert!(matches!(outcome, SessionOutcome::Exported(_)));
        assert_eq!(session.active_button(), Some(Tool::Circle));
        assert_eq!(session.paint().tool(), Tool::Circle);

        let _ = session.handle(SessionEvent::Toolbar {
            label: "bogus".into(),
        });
        assert_eq!(session.active_button(), Some(Tool::Circle));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn release_with_unparseable_color_reports_nothing_drawn() {
        let dir = scratch_dir("bad-color");
        let mut session = session(&dir);
        for event in [
            SessionEvent::Color {
                value: "definitely not a color".into(),
            },
            SessionEvent::Toolbar {
                label: "line".into(),
            },
            SessionEvent::PointerDown { x: 1.0, y: 1.0 },
        ] {
            session.handle(event).unwrap();
        }

        assert_eq!(
            session
                .handle(SessionEvent::PointerUp { x: 9.0, y: 4.0 })
                .unwrap(),
            SessionOutcome::DragEnded { drawn: false }
        );
        assert_eq!(painted(&session.paint().surface().read_pixels()), 0);
    }

    #[test]
    fn circle_released_at_anchor_reports_nothing_drawn() {
        let dir = scratch_dir("zero-circle");
        let mut session = session(&dir);
        session
            .handle(SessionEvent::Toolbar {
                label: "circle".into(),
            })
            .unwrap();
        session
            .handle(SessionEvent::PointerDown { x: 5.0, y: 5.0 })
            .unwrap();

        assert_eq!(
            session
                .handle(SessionEvent::PointerUp { x: 5.0, y: 5.0 })
                .unwrap(),
            SessionOutcome::DragEnded { drawn: false }
        );
        assert!(!session.paint().is_dragging());
    }

    #[test]
    fn unknown_toolbar_label_is_an_error() {
        let dir = scratch_dir("toolbar");
        let mut session = session(&dir);
        let err = session
            .handle(SessionEvent::Toolbar {
                label: "spray".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Tool(ToolParseError::Unknown(ref label)) if label == "SPRAY"
        ));
        assert_eq!(session.paint().tool(), Tool::Freehand);
    }

    #[test]
    fn escape_clears_to_white() {
        let dir = scratch_dir("escape");
        let mut session = session(&dir);
        assert_eq!(
            session
                .handle(SessionEvent::Key {
                    key: "Escape".into(),
                    ctrl: false,
                    shift: false,
                })
                .unwrap(),
            SessionOutcome::Cleared
        );
        let buffer = session.paint().surface().read_pixels();
        assert_eq!(buffer.pixel(0, 0), Some(Rgba::WHITE.channels()));
        assert_eq!(buffer.pixel(15, 11), Some(Rgba::WHITE.channels()));
    }

    #[test]
    fn export_then_import_restores_pixels_byte_for_byte() {
        let dir = scratch_dir("round-trip");
        let mut session = session(&dir);
        for event in [
            SessionEvent::Key {
                key: "Escape".into(),
                ctrl: false,
                shift: false,
            },
            SessionEvent::Color {
                value: "#3366cc".into(),
            },
            SessionEvent::Toolbar {
                label: "circle".into(),
            },
            SessionEvent::PointerDown { x: 6.0, y: 6.0 },
            SessionEvent::PointerUp { x: 8.0, y: 9.0 },
        ] {
            session.handle(event).unwrap();
        }
        let before = session.paint().surface().read_pixels();

        let SessionOutcome::Exported(path) = session
            .handle(SessionEvent::Toolbar {
                label: "download".into(),
            })
            .unwrap()
        else {
            panic!("download should export");
        };

        session.clear();
        assert_ne!(session.paint().surface().read_pixels(), before);

        assert_eq!(
            session.handle(SessionEvent::Import { path }).unwrap(),
            SessionOutcome::Imported
        );
        assert_eq!(session.paint().surface().read_pixels(), before);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_import_leaves_surface_unchanged() {
        let dir = scratch_dir("malformed");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("short.json");
        fs::write(
            &path,
            r#"{"data":[1,2,3,4],"colorSpace":"srgb","width":16,"height":12}"#,
        )
        .unwrap();

        let mut session = session(&dir);
        session.clear();
        let before = session.paint().surface().read_pixels();

        assert_eq!(
            session.handle(SessionEvent::Import { path }).unwrap(),
            SessionOutcome::ImportRejected
        );
        assert_eq!(session.paint().surface().read_pixels(), before);

        fs::remove_dir_all(dir).unwrap();
    }
}
