//! Named key translation.
//!
//! Models speak X11 keysym names ("Return", "BackSpace", "ctrl+c"). The
//! dispatcher translates them once into device key codes; backends map the
//! codes onto whatever their input tool expects.

const KEY_TABLE: &[(&str, &str)] = &[
    ("Return", "return"),
    ("Tab", "tab"),
    ("Escape", "escape"),
    ("BackSpace", "delete"),
    ("Delete", "forward-delete"),
    ("space", "space"),
    ("Up", "arrow-up"),
    ("Down", "arrow-down"),
    ("Left", "arrow-left"),
    ("Right", "arrow-right"),
];

/// Translate a model key name into a device key code.
///
/// Unrecognized names pass through lower-cased.
pub fn translate(name: &str) -> String {
    KEY_TABLE
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| name.to_lowercase())
}

/// Split a combination like `ctrl+shift+t` into modifiers and the final key.
pub fn split_combo(code: &str) -> (Vec<&str>, &str) {
    let mut parts: Vec<&str> = code
        .split('+')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let key = parts.pop().unwrap_or("");
    (parts, key)
}
