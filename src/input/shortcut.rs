#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Escape,
}

impl ShortcutKey {
    /// Maps a host key name (`"Escape"`, `"s"`) to a key. Keys with no
    /// binding resolve to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => Some(Self::Escape),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(Self::Character(ch.to_ascii_lowercase())),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ClearCanvas,
    ExportCanvas,
}

pub fn resolve_shortcut(key: ShortcutKey, modifiers: ShortcutModifiers) -> Option<ShortcutAction> {
    match (key, modifiers.ctrl, modifiers.shift) {
        (ShortcutKey::Escape, false, false) => Some(ShortcutAction::ClearCanvas),
        (ShortcutKey::Character('s'), true, _) => Some(ShortcutAction::ExportCanvas),
        _ => None,
    }
}
