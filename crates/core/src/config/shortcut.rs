use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MdPickError, Result};

/// The activation chord that starts and stops a selection session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    #[serde(rename = "Ctrl")]
    pub ctrl: bool,
    #[serde(rename = "Alt")]
    pub alt: bool,
    #[serde(rename = "Shift")]
    pub shift: bool,
    #[serde(rename = "Key")]
    pub key: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self { ctrl: true, alt: false, shift: false, key: "m".to_string() }
    }
}

/// A key press as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Key name, e.g. `"m"`, `"ArrowUp"`, `"Escape"`
    pub key: String,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn plain(key: &str) -> Self {
        Self { key: key.to_string(), ..Default::default() }
    }
}

impl ShortcutConfig {
    /// Parses chords like `Ctrl+Shift+M` or `alt+x`.
    ///
    /// # Errors
    ///
    /// Returns [`MdPickError::InvalidShortcut`] for unknown modifiers or when
    /// the chord does not end in exactly one single-character key.
    pub fn parse(chord: &str) -> Result<Self> {
        let mut config = ShortcutConfig { ctrl: false, alt: false, shift: false, key: String::new() };

        for part in chord.split('+').map(str::trim) {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => config.ctrl = true,
                "alt" | "option" => config.alt = true,
                "shift" => config.shift = true,
                _ if part.chars().count() == 1 && config.key.is_empty() => config.key = part.to_string(),
                _ => return Err(MdPickError::InvalidShortcut(chord.to_string())),
            }
        }

        if config.key.is_empty() {
            return Err(MdPickError::InvalidShortcut(chord.to_string()));
        }

        Ok(config)
    }

    /// Modifiers must match exactly; the key is compared case-insensitively.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.ctrl == self.ctrl
            && event.alt == self.alt
            && event.shift == self.shift
            && event.key.to_uppercase() == self.key.to_uppercase()
    }
}

impl fmt::Display for ShortcutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        write!(f, "{}", self.key.to_uppercase())
    }
}
