mod shortcut;
mod toolbar;

pub use shortcut::{resolve_shortcut, ShortcutAction, ShortcutKey, ShortcutModifiers};
pub use toolbar::{resolve_toolbar_label, ToolbarCommand};
