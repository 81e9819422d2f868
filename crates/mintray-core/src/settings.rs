//! The persisted settings file and its validation.
//!
//! Loaded from `<config dir>/mintray/settings.json`. Missing fields
//! fall back to defaults thanks to `#[serde(default)]`; unknown fields
//! are ignored. An unrecognized enum value costs only its own field or
//! rule, never the rest of the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::Hotkey;
use crate::host::KeyboardLayout;
use crate::hotkey::{self, HotkeyBinding, ModifierMask};
use crate::log::{self, LogConfig};
use crate::rules::{AutoTrayRule, CompiledRule, TriggerEvent};
use crate::tracker::representation::PlacementPolicy;
use crate::{Error, Result};

/// Format version written by this build.
pub const SETTINGS_VERSION: u32 = 1;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Poll intervals outside this range are clamped; 0 is left alone and
/// disables polling.
const POLL_INTERVAL_MIN_MS: u64 = 50;
const POLL_INTERVAL_MAX_MS: u64 = 60_000;

/// Top-level settings for mintray.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    pub version: u32,
    /// Where minimized windows are shown.
    pub minimize_placement: PlacementPolicy,
    /// List visible windows in the popup menu as well.
    pub show_windows_in_menu: bool,
    /// Apply `open` rules to windows that already exist at startup.
    pub auto_tray_existing: bool,
    /// Milliseconds between enumeration sweeps; 0 disables polling.
    pub poll_interval: u64,
    pub hotkey_minimize: String,
    pub hotkey_restore: String,
    pub hotkey_menu: String,
    /// Modifiers that, when all held, suppress auto-tray rules.
    pub modifiers_override: String,
    pub auto_tray: Vec<AutoTrayRule>,
    pub logging: LogConfig,
    /// Problems found while decoding, reported by the next `validate`.
    #[serde(skip)]
    pub(crate) load_problems: Vec<String>,
    /// 1-based indices of rules with an unrecognized `tray-event`.
    #[serde(skip)]
    pub(crate) rejected_rules: Vec<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            minimize_placement: PlacementPolicy::Tray,
            show_windows_in_menu: false,
            auto_tray_existing: false,
            poll_interval: 500,
            hotkey_minimize: default_hotkey(Hotkey::Minimize).into(),
            hotkey_restore: default_hotkey(Hotkey::Restore).into(),
            hotkey_menu: default_hotkey(Hotkey::Menu).into(),
            modifiers_override: "shift".into(),
            auto_tray: Vec::new(),
            logging: LogConfig::default(),
            load_problems: Vec::new(),
            rejected_rules: Vec::new(),
        }
    }
}

fn default_hotkey(hotkey: Hotkey) -> &'static str {
    match hotkey {
        Hotkey::Minimize => "alt ctrl shift down",
        Hotkey::Restore => "alt ctrl shift up",
        Hotkey::Menu => "none",
    }
}

impl Settings {
    pub fn hotkey_text(&self, hotkey: Hotkey) -> &str {
        match hotkey {
            Hotkey::Minimize => &self.hotkey_minimize,
            Hotkey::Restore => &self.hotkey_restore,
            Hotkey::Menu => &self.hotkey_menu,
        }
    }

    fn hotkey_text_mut(&mut self, hotkey: Hotkey) -> &mut String {
        match hotkey {
            Hotkey::Minimize => &mut self.hotkey_minimize,
            Hotkey::Restore => &mut self.hotkey_restore,
            Hotkey::Menu => &mut self.hotkey_menu,
        }
    }

    /// Parses a hotkey setting. An empty string disables the hotkey.
    pub fn binding(&self, hotkey: Hotkey, layout: &dyn KeyboardLayout) -> Result<HotkeyBinding> {
        hotkey::parse(self.hotkey_text(hotkey), layout)
    }

    /// The auto-tray override mask; empty when unparsable.
    pub fn override_mask(&self) -> ModifierMask {
        hotkey::parse_modifiers(&self.modifiers_override).unwrap_or(ModifierMask::EMPTY)
    }

    /// The sweep period, or `None` when polling is disabled.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval > 0).then(|| Duration::from_millis(self.poll_interval))
    }

    /// Replaces every invalid value with its default and normalizes the
    /// rest. Returns a description of each problem found.
    pub fn validate(&mut self, layout: &dyn KeyboardLayout) -> Vec<String> {
        let mut problems = std::mem::take(&mut self.load_problems);
        let rejected = std::mem::take(&mut self.rejected_rules);

        if self.version > SETTINGS_VERSION {
            problems.push(format!(
                "version {} is newer than supported version {SETTINGS_VERSION}",
                self.version
            ));
        }

        for hk in Hotkey::ALL {
            let text = self.hotkey_text(hk).to_string();
            let normalized = match hotkey::parse(&text, layout) {
                Ok(_) => hotkey::normalize(&text, layout),
                Err(e) => {
                    problems.push(format!("{}: {e}; using {:?}", hk.name(), default_hotkey(hk)));
                    default_hotkey(hk).to_string()
                }
            };
            *self.hotkey_text_mut(hk) = normalized;
        }

        match hotkey::parse_modifiers(&self.modifiers_override) {
            Ok(mask) => self.modifiers_override = hotkey::modifiers_to_string(mask),
            Err(e) => {
                problems.push(format!("modifiers-override: {e}; using \"shift\""));
                self.modifiers_override = "shift".into();
            }
        }

        if self.poll_interval != 0 {
            let clamped = self
                .poll_interval
                .clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS);
            if clamped != self.poll_interval {
                problems.push(format!(
                    "poll-interval {} out of range; using {clamped}",
                    self.poll_interval
                ));
                self.poll_interval = clamped;
            }
        }

        let mut index = 0;
        self.auto_tray.retain(|rule| {
            index += 1;
            if rejected.contains(&index) {
                return false;
            }
            if rule.is_empty() {
                problems.push(format!("auto-tray rule {index} has no fields; removed"));
                return false;
            }
            if let Err(e) = CompiledRule::compile(rule.clone()) {
                problems.push(format!("auto-tray rule {index}: {e}; removed"));
                return false;
            }
            true
        });

        if !log::is_valid_level(&self.logging.level) {
            problems.push(format!(
                "logging.level {:?} is not one of {}; using \"info\"",
                self.logging.level,
                log::LEVELS.join(", ")
            ));
            self.logging.level = "info".into();
        }

        problems
    }

    /// Writes the settings as pretty-printed JSON, creating the parent
    /// directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::SettingsIo {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| Error::SettingsFormat {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, json + "\n").map_err(io_err)
    }
}

/// Returns the settings directory: `<config dir>/mintray/`.
pub fn settings_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mintray"))
}

/// Returns the settings file path: `<config dir>/mintray/settings.json`.
pub fn settings_path() -> Option<PathBuf> {
    settings_dir().map(|d| d.join(SETTINGS_FILE_NAME))
}

/// Decodes settings JSON without validating it.
///
/// An unrecognized `minimize-placement` falls back to its default and a
/// rule with an unrecognized `tray-event` is dropped. Both are reported
/// by the next [`Settings::validate`]. Only malformed JSON or a value of
/// the wrong type fails the decode.
pub fn from_json(content: &str) -> serde_json::Result<Settings> {
    let mut value: serde_json::Value = serde_json::from_str(content)?;
    let mut problems = Vec::new();
    let mut rejected = Vec::new();

    if let Some(obj) = value.as_object_mut() {
        if let Some(v) = obj.get("minimize-placement")
            && PlacementPolicy::deserialize(v).is_err()
        {
            problems.push(format!("minimize-placement: unknown value {v}; using \"tray\""));
            obj.remove("minimize-placement");
        }

        if let Some(rules) = obj.get_mut("auto-tray").and_then(|r| r.as_array_mut()) {
            for (i, rule) in rules.iter_mut().enumerate() {
                let Some(rule) = rule.as_object_mut() else {
                    continue;
                };
                if let Some(v) = rule.get("tray-event")
                    && TriggerEvent::deserialize(v).is_err()
                {
                    problems.push(format!(
                        "auto-tray rule {}: unknown tray-event {v}; removed",
                        i + 1
                    ));
                    rule.remove("tray-event");
                    rejected.push(i + 1);
                }
            }
        }
    }

    let mut settings: Settings = serde_json::from_value(value)?;
    settings.load_problems = problems;
    settings.rejected_rules = rejected;
    Ok(settings)
}

/// Reads and decodes a settings file without validating it.
pub fn try_load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::SettingsIo {
        path: path.display().to_string(),
        source,
    })?;
    from_json(&content).map_err(|source| Error::SettingsFormat {
        path: path.display().to_string(),
        source,
    })
}

/// Reads and decodes `settings.json` from the default location.
pub fn try_load() -> Result<Settings> {
    let path = settings_path().ok_or_else(|| Error::SettingsIo {
        path: SETTINGS_FILE_NAME.into(),
        source: std::io::Error::other("could not determine config directory"),
    })?;
    try_load_from(&path)
}

/// Loads and validates the settings, falling back to defaults.
///
/// A missing file silently yields defaults; other errors and every
/// validation problem are logged as warnings.
pub fn load_from(path: &Path, layout: &dyn KeyboardLayout) -> Settings {
    let mut settings = match try_load_from(path) {
        Ok(s) => s,
        Err(e) if e.is_not_found() => Settings::default(),
        Err(e) => {
            tracing::warn!("{e}; using default settings");
            Settings::default()
        }
    };
    for problem in settings.validate(layout) {
        tracing::warn!("settings: {problem}");
    }
    settings
}

/// [`load_from`] at the default location.
pub fn load(layout: &dyn KeyboardLayout) -> Settings {
    match settings_path() {
        Some(path) => load_from(&path, layout),
        None => {
            tracing::warn!("could not determine config directory; using default settings");
            Settings::default()
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
