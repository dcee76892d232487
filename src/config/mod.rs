use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::{Color, DEFAULT_COLOR};
use crate::paint::Tool;

const APP_DIR: &str = "scribble";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_CANVAS_WIDTH: u32 = 800;
const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub(crate) canvas_width: Option<u32>,
    #[serde(default)]
    pub(crate) canvas_height: Option<u32>,
    #[serde(default)]
    pub(crate) export_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) default_color: Option<String>,
    #[serde(default)]
    pub(crate) default_tool: Option<String>,
}

impl AppConfig {
    pub(crate) fn canvas_size(&self) -> (u32, u32) {
        (
            self.canvas_width.unwrap_or(DEFAULT_CANVAS_WIDTH),
            self.canvas_height.unwrap_or(DEFAULT_CANVAS_HEIGHT),
        )
    }

    pub(crate) fn initial_color(&self) -> Color {
        Color::new(self.default_color.as_deref().unwrap_or(DEFAULT_COLOR))
    }

    pub(crate) fn initial_tool(&self) -> Tool {
        let Some(label) = self.default_tool.as_deref() else {
            return Tool::default();
        };
        label.to_uppercase().parse().unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring default_tool from config.json");
            Tool::default()
        })
    }
}

pub(crate) fn load_app_config() -> AppConfig {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let Some(path) = config_path(xdg_config_home, home).filter(|path| path.exists()) else {
        return AppConfig::default();
    };
    let parsed: anyhow::Result<AppConfig> = std::fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|contents| serde_json::from_str(&contents).map_err(anyhow::Error::from));
    parsed.unwrap_or_else(|err| {
        tracing::warn!(%err, path = %path.display(), "ignoring config.json; using defaults");
        AppConfig::default()
    })
}

/// `$XDG_CONFIG_HOME/scribble/config.json`, else `~/.config/scribble/config.json`.
fn config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    let mut path = match xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home?.join(".config"),
    };
    path.push(APP_DIR);
    path.push(APP_CONFIG_FILE);
    Some(path)
}
