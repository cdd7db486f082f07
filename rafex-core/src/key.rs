use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::ConfigError;

/// A keyboard key a trial can bind.
///
/// Parses from names (`"space"`, `"ArrowLeft"`, `"e"`) and from the legacy
/// browser key codes older task definitions use (`"69"` for `E`, `"32"` for space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub enum Key {
    /// A letter or digit, stored lowercase.
    Char(char),
    Space,
    Enter,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }

    /// Maps a browser key code, e.g. 69 for `E`.
    pub fn from_key_code(code: u32) -> Option<Self> {
        Some(match code {
            13 => Key::Enter,
            32 => Key::Space,
            37 => Key::ArrowLeft,
            38 => Key::ArrowUp,
            39 => Key::ArrowRight,
            40 => Key::ArrowDown,
            48..=57 | 65..=90 => Key::char(char::from_u32(code)?),
            _ => return None,
        })
    }
}

impl FromStr for Key {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let unknown = || ConfigError::UnknownKey(s.to_string());

        if let Ok(code) = name.parse::<u32>() {
            // a lone digit is the digit key, anything longer is a key code
            if name.len() > 1 {
                return Key::from_key_code(code).ok_or_else(unknown);
            }
        }

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return if c.is_ascii_alphanumeric() {
                Ok(Key::char(c))
            } else if c == ' ' {
                Ok(Key::Space)
            } else {
                Err(unknown())
            };
        }

        match name.to_ascii_lowercase().as_str() {
            "space" | "spacebar" => Ok(Key::Space),
            "enter" | "return" => Ok(Key::Enter),
            "arrowleft" | "left" => Ok(Key::ArrowLeft),
            "arrowright" | "right" => Ok(Key::ArrowRight),
            "arrowup" | "up" => Ok(Key::ArrowUp),
            "arrowdown" | "down" => Ok(Key::ArrowDown),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c}"),
            Key::Space => f.write_str("space"),
            Key::Enter => f.write_str("enter"),
            Key::ArrowLeft => f.write_str("arrowleft"),
            Key::ArrowRight => f.write_str("arrowright"),
            Key::ArrowUp => f.write_str("arrowup"),
            Key::ArrowDown => f.write_str("arrowdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names() {
        assert_eq!("E".parse::<Key>().unwrap(), Key::Char('e'));
        assert_eq!("Space".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("left".parse::<Key>().unwrap(), Key::ArrowLeft);
        assert_eq!("7".parse::<Key>().unwrap(), Key::Char('7'));
    }

    #[test]
    fn parses_legacy_key_codes() {
        assert_eq!("69".parse::<Key>().unwrap(), Key::Char('e'));
        assert_eq!("73".parse::<Key>().unwrap(), Key::Char('i'));
        assert_eq!("32".parse::<Key>().unwrap(), Key::Space);
        assert!("999".parse::<Key>().is_err());
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!("hyper".parse::<Key>(), Err(ConfigError::UnknownKey(_))));
        assert!("%".parse::<Key>().is_err());
    }
}
