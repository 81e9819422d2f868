//! Hotkey strings such as `"alt ctrl shift down"`.
//!
//! A hotkey is written as whitespace-separated, case-insensitive tokens:
//! modifier names, at most one key, or the single word `none`. Key codes
//! are Windows virtual-key codes; printable characters are resolved
//! through a [`KeyboardLayout`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::host::KeyboardLayout;
use crate::{Error, Result};

/// Keyboard modifier keys, in canonical serialization order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Alt,
    Ctrl,
    Shift,
    Win,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [Self::Alt, Self::Ctrl, Self::Shift, Self::Win];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alt => "alt",
            Self::Ctrl => "ctrl",
            Self::Shift => "shift",
            Self::Win => "win",
        }
    }

    fn from_name(token: &str) -> Option<Self> {
        match token {
            "alt" => Some(Self::Alt),
            "ctrl" => Some(Self::Ctrl),
            "shift" => Some(Self::Shift),
            "win" => Some(Self::Win),
            _ => None,
        }
    }

    /// The flag bit, identical to the Win32 `MOD_*` value.
    fn bit(self) -> u32 {
        match self {
            Self::Alt => 0x1,
            Self::Ctrl => 0x2,
            Self::Shift => 0x4,
            Self::Win => 0x8,
        }
    }
}

/// A set of modifiers stored as independent flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierMask(u32);

impl ModifierMask {
    pub const EMPTY: Self = Self(0);
    pub const ALT: Self = Self(0x1);
    pub const CTRL: Self = Self(0x2);
    pub const SHIFT: Self = Self(0x4);
    pub const WIN: Self = Self(0x8);

    /// Returns the raw bits (compatible with Win32 `MOD_*` flags).
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    /// Iterates the set modifiers in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl From<Modifier> for ModifierMask {
    fn from(modifier: Modifier) -> Self {
        Self(modifier.bit())
    }
}

impl BitOr for ModifierMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A parsed hotkey. Zero key code with no modifiers means disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HotkeyBinding {
    pub key_code: u32,
    pub modifiers: ModifierMask,
}

impl HotkeyBinding {
    pub const DISABLED: Self = Self {
        key_code: 0,
        modifiers: ModifierMask::EMPTY,
    };

    pub fn is_disabled(&self) -> bool {
        self.key_code == 0 && self.modifiers.is_empty()
    }
}

/// Named keys: canonical name, virtual-key code, accepted aliases.
const NAMED_KEYS: &[(&str, u32, &[&str])] = &[
    ("backspace", 0x08, &["back"]),
    ("tab", 0x09, &[]),
    ("enter", 0x0D, &["return"]),
    ("pause", 0x13, &["break"]),
    ("capslock", 0x14, &[]),
    ("escape", 0x1B, &["esc"]),
    ("space", 0x20, &[]),
    ("pageup", 0x21, &["pgup", "prior"]),
    ("pagedown", 0x22, &["pgdn", "next"]),
    ("end", 0x23, &[]),
    ("home", 0x24, &[]),
    ("left", 0x25, &[]),
    ("up", 0x26, &[]),
    ("right", 0x27, &[]),
    ("down", 0x28, &[]),
    ("printscreen", 0x2C, &["prtsc", "snapshot"]),
    ("insert", 0x2D, &["ins"]),
    ("delete", 0x2E, &["del"]),
    ("numpad0", 0x60, &[]),
    ("numpad1", 0x61, &[]),
    ("numpad2", 0x62, &[]),
    ("numpad3", 0x63, &[]),
    ("numpad4", 0x64, &[]),
    ("numpad5", 0x65, &[]),
    ("numpad6", 0x66, &[]),
    ("numpad7", 0x67, &[]),
    ("numpad8", 0x68, &[]),
    ("numpad9", 0x69, &[]),
    ("multiply", 0x6A, &[]),
    ("add", 0x6B, &[]),
    ("subtract", 0x6D, &[]),
    ("decimal", 0x6E, &[]),
    ("divide", 0x6F, &[]),
    ("numlock", 0x90, &[]),
    ("scrolllock", 0x91, &[]),
    ("semicolon", 0xBA, &[]),
    ("plus", 0xBB, &["equals"]),
    ("comma", 0xBC, &[]),
    ("minus", 0xBD, &[]),
    ("period", 0xBE, &["dot"]),
    ("slash", 0xBF, &[]),
    ("backtick", 0xC0, &["grave"]),
    ("lbracket", 0xDB, &[]),
    ("backslash", 0xDC, &[]),
    ("rbracket", 0xDD, &[]),
    ("quote", 0xDE, &[]),
];

/// VK_F1; F1–F24 are contiguous.
const VK_F1: u32 = 0x70;

/// Resolves a named key token (already lower-case) to its canonical
/// name and virtual-key code.
fn named_key(token: &str) -> Option<(String, u32)> {
    if let Some(rest) = token.strip_prefix('f')
        && let Ok(n) = rest.parse::<u32>()
        && (1..=24).contains(&n)
        && !rest.starts_with('0')
    {
        return Some((format!("f{n}"), VK_F1 + n - 1));
    }

    NAMED_KEYS
        .iter()
        .find(|(name, _, aliases)| *name == token || aliases.contains(&token))
        .map(|(name, vk, _)| ((*name).to_string(), *vk))
}

enum Token {
    None,
    Modifier(Modifier),
    Key { name: String, code: u32 },
}

fn classify(token: &str, layout: &dyn KeyboardLayout) -> Option<Token> {
    if token == "none" {
        return Some(Token::None);
    }
    if let Some(m) = Modifier::from_name(token) {
        return Some(Token::Modifier(m));
    }
    if let Some((name, code)) = named_key(token) {
        return Some(Token::Key { name, code });
    }

    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && !c.is_whitespace()
        && !c.is_control()
    {
        let code = layout.key_for_char(c)?;
        return Some(Token::Key {
            name: c.to_string(),
            code,
        });
    }
    None
}

/// A validated hotkey string, before it is reduced to codes.
struct Parsed {
    none: bool,
    modifiers: ModifierMask,
    key: Option<(String, u32)>,
}

fn parse_tokens(text: &str, layout: &dyn KeyboardLayout) -> Result<Parsed> {
    let invalid = |detail: String| Error::InvalidHotkey {
        text: text.to_string(),
        detail,
    };

    let mut parsed = Parsed {
        none: false,
        modifiers: ModifierMask::EMPTY,
        key: None,
    };
    let mut count = 0;

    for raw in text.split_whitespace() {
        count += 1;
        let token = raw.to_lowercase();
        match classify(&token, layout) {
            Some(Token::None) => parsed.none = true,
            Some(Token::Modifier(m)) => parsed.modifiers.insert(m),
            Some(Token::Key { name, code }) => {
                if let Some((existing, _)) = &parsed.key {
                    return Err(invalid(format!(
                        "more than one key ({existing:?} and {name:?})"
                    )));
                }
                parsed.key = Some((name, code));
            }
            None => return Err(invalid(format!("unknown key {raw:?}"))),
        }
    }

    if parsed.none && count > 1 {
        return Err(invalid("`none` cannot be combined with other keys".into()));
    }
    if parsed.key.is_none() && !parsed.modifiers.is_empty() {
        return Err(invalid("modifiers without a key".into()));
    }
    Ok(parsed)
}

/// Parses a hotkey string into a key code and modifier mask.
///
/// `"none"` and the empty string both yield [`HotkeyBinding::DISABLED`].
/// Modifiers alone are rejected.
pub fn parse(text: &str, layout: &dyn KeyboardLayout) -> Result<HotkeyBinding> {
    let parsed = parse_tokens(text, layout)?;
    Ok(HotkeyBinding {
        key_code: parsed.key.map_or(0, |(_, code)| code),
        modifiers: parsed.modifiers,
    })
}

/// Parses a modifier-only string such as `"shift"` or `"alt ctrl"`.
///
/// Used for the auto-tray override setting, where a key is meaningless.
pub fn parse_modifiers(text: &str) -> Result<ModifierMask> {
    let mut mask = ModifierMask::EMPTY;
    let mut none = false;
    let mut count = 0;
    for raw in text.split_whitespace() {
        count += 1;
        let token = raw.to_lowercase();
        if token == "none" {
            none = true;
        } else if let Some(m) = Modifier::from_name(&token) {
            mask.insert(m);
        } else {
            return Err(Error::InvalidHotkey {
                text: text.to_string(),
                detail: format!("{raw:?} is not a modifier"),
            });
        }
    }
    if none && count > 1 {
        return Err(Error::InvalidHotkey {
            text: text.to_string(),
            detail: "`none` cannot be combined with other keys".into(),
        });
    }
    Ok(mask)
}

/// Re-serializes a hotkey string in canonical form.
///
/// Modifiers come first in the order `alt ctrl shift win`, followed by
/// the key. Invalid input is returned unchanged so that partially typed
/// text survives a round trip through the settings UI.
pub fn normalize(text: &str, layout: &dyn KeyboardLayout) -> String {
    match parse_tokens(text, layout) {
        Ok(parsed) => Canonical(&parsed).to_string(),
        Err(_) => text.to_string(),
    }
}

struct Canonical<'a>(&'a Parsed);

impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsed = self.0;
        let mut parts: Vec<&str> = parsed.modifiers.iter().map(Modifier::name).collect();
        if let Some((name, _)) = &parsed.key {
            parts.push(name);
        }
        if parts.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&parts.join(" "))
    }
}

/// Formats a modifier mask the way [`normalize`] would.
pub fn modifiers_to_string(mask: ModifierMask) -> String {
    if mask.is_empty() {
        return "none".into();
    }
    mask.iter().map(Modifier::name).collect::<Vec<_>>().join(" ")
}
