mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod paint;
pub mod session;
pub mod storage;
pub mod surface;
pub use error::{AppError, AppResult};

use std::path::Path;

use session::{run_script, Script, ScriptReport};
use storage::StorageService;

/// Entrypoint used by the CLI: replays a recorded event script against a
/// canvas sized from `config.json`.
pub fn run(script_path: &Path) -> AppResult<ScriptReport> {
    logging::init();
    tracing::info!(script = %script_path.display(), "starting scribble");

    let config = config::load_app_config();
    let storage = match config.export_dir.clone() {
        Some(dir) => StorageService::with_export_dir(dir),
        None => StorageService::with_default_paths(),
    };
    tracing::debug!(export_dir = %storage.export_dir().display(), "storage ready");

    let script = Script::from_path(script_path)?;
    let report = run_script(
        script,
        config.canvas_size(),
        config.initial_tool(),
        config.initial_color(),
        storage,
    )?;

    tracing::info!(events = report.outcomes.len(), "script complete");
    Ok(report)
}
