//! Auto-tray rule types and evaluation logic.
//!
//! Rules decide which windows mintray minimizes on its own. They are
//! evaluated in order and the first matching rule wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, WindowInfo};

/// When a matching window should be sent to the tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerEvent {
    /// As soon as the window appears.
    #[default]
    Open,
    /// When the user minimizes it.
    Minimize,
    OpenAndMinimize,
}

/// The moment at which rules are evaluated for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEvent {
    /// The window was seen for the first time.
    Open,
    /// The window started minimizing.
    Minimize,
}

impl TriggerEvent {
    pub fn covers(self, event: RuleEvent) -> bool {
        matches!(
            (self, event),
            (Self::Open | Self::OpenAndMinimize, RuleEvent::Open)
                | (Self::Minimize | Self::OpenAndMinimize, RuleEvent::Minimize)
        )
    }
}

/// A user-configured auto-tray rule. Empty fields are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AutoTrayRule {
    /// Absolute path of the executable, compared case-insensitively.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub executable: String,
    /// Window class name, compared exactly.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub window_class: String,
    /// Regular expression the whole window title must match.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub window_title: String,
    #[serde(rename = "tray-event")]
    pub trigger: TriggerEvent,
}

impl AutoTrayRule {
    /// Returns true when no field constrains the match.
    ///
    /// Such rules are dropped during validation and never match.
    pub fn is_empty(&self) -> bool {
        self.executable.is_empty() && self.window_class.is_empty() && self.window_title.is_empty()
    }
}

/// A rule with its title pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: AutoTrayRule,
    title: Option<Regex>,
}

impl CompiledRule {
    /// Compiles the title pattern, anchored so that it must match the
    /// entire title.
    pub fn compile(rule: AutoTrayRule) -> Result<Self> {
        let title = if rule.window_title.is_empty() {
            None
        } else {
            let anchored = format!("^(?:{})$", rule.window_title);
            let re = Regex::new(&anchored).map_err(|e| Error::InvalidPattern {
                pattern: rule.window_title.clone(),
                detail: e.to_string(),
            })?;
            Some(re)
        };
        Ok(Self { rule, title })
    }

    pub fn trigger(&self) -> TriggerEvent {
        self.rule.trigger
    }
}

/// Compiles a validated rule list, skipping (and logging) anything
/// that is empty or fails to compile.
pub fn compile_all(rules: &[AutoTrayRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .filter(|r| !r.is_empty())
        .filter_map(|r| match CompiledRule::compile(r.clone()) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("skipping auto-tray rule: {e}");
                None
            }
        })
        .collect()
}

/// Returns whether every non-empty field of `rule` matches `window`.
///
/// A rule that names an executable never matches a window whose
/// executable could not be resolved.
pub fn matches(rule: &CompiledRule, window: &WindowInfo) -> bool {
    let r = &rule.rule;
    if r.is_empty() {
        return false;
    }

    if !r.executable.is_empty() {
        let Some(path) = &window.executable else {
            return false;
        };
        if path.to_string_lossy().to_lowercase() != r.executable.to_lowercase() {
            return false;
        }
    }

    if !r.window_class.is_empty() && window.class != r.window_class {
        return false;
    }

    if !r.window_title.is_empty() {
        let Some(re) = &rule.title else {
            tracing::warn!("rule pattern {:?} was never compiled", r.window_title);
            return false;
        };
        if !re.is_match(&window.title) {
            return false;
        }
    }

    true
}

/// Finds the rule that governs `window` for `event`.
///
/// Only the first rule that matches the window is considered. If its
/// trigger does not cover `event`, no rule applies.
pub fn first_match<'a>(
    rules: &'a [CompiledRule],
    window: &WindowInfo,
    event: RuleEvent,
) -> Option<&'a CompiledRule> {
    rules
        .iter()
        .find(|r| matches(r, window))
        .filter(|r| r.trigger().covers(event))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn rule(exe: &str, class: &str, title: &str, trigger: TriggerEvent) -> CompiledRule {
        CompiledRule::compile(AutoTrayRule {
            executable: exe.into(),
            window_class: class.into(),
            window_title: title.into(),
            trigger,
        })
        .unwrap()
    }

    fn window(exe: Option<&str>, class: &str, title: &str) -> WindowInfo {
        WindowInfo {
            title: title.into(),
            class: class.into(),
            executable: exe.map(PathBuf::from),
        }
    }

    #[test]
    fn class_only_rule_ignores_title_and_executable() {
        // Arrange
        let r = rule("", "Notepad", "", TriggerEvent::Minimize);

        // Act / Assert
        assert!(matches(
            &r,
            &window(Some(r"C:\Windows\notepad.exe"), "Notepad", "Untitled")
        ));
        assert!(matches(&r, &window(None, "Notepad", "")));
    }

    #[test]
    fn class_match_is_case_sensitive() {
        let r = rule("", "Notepad", "", TriggerEvent::Minimize);
        assert!(!matches(&r, &window(None, "notepad", "Untitled")));
    }

    #[test]
    fn executable_match_is_case_insensitive_and_exact() {
        // Arrange
        let r = rule(r"c:\windows\NOTEPAD.EXE", "", "", TriggerEvent::Open);

        // Act / Assert
        assert!(matches(
            &r,
            &window(Some(r"C:\Windows\notepad.exe"), "Notepad", "x")
        ));
        assert!(!matches(
            &r,
            &window(Some(r"C:\Windows\System32\notepad.exe"), "Notepad", "x")
        ));
    }

    #[test]
    fn unresolved_executable_fails_closed() {
        let r = rule(r"C:\app.exe", "", "", TriggerEvent::Open);
        assert!(!matches(&r, &window(None, "App", "x")));
    }

    #[test]
    fn title_pattern_must_match_whole_title() {
        // Arrange
        let r = rule("", "", "Inbox.*", TriggerEvent::Open);

        // Act / Assert
        assert!(matches(&r, &window(None, "Mail", "Inbox (3)")));
        assert!(!matches(&r, &window(None, "Mail", "My Inbox (3)")));
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let r = rule("", "", "foo|bar", TriggerEvent::Open);
        assert!(matches(&r, &window(None, "C", "bar")));
        assert!(!matches(&r, &window(None, "C", "foobar baz")));
    }

    #[test]
    fn empty_rule_never_matches() {
        let r = rule("", "", "", TriggerEvent::Open);
        assert!(!matches(&r, &window(None, "Any", "Window")));
    }

    #[test]
    fn invalid_pattern_is_rejected_at_compile_time() {
        // Act
        let err = CompiledRule::compile(AutoTrayRule {
            window_title: "(unclosed".into(),
            ..Default::default()
        })
        .unwrap_err();

        // Assert
        assert_eq!(err.code(), crate::ErrorCode::InvalidPattern);
    }

    #[test]
    fn first_matching_rule_wins_even_if_trigger_differs() {
        // Arrange
        let rules = vec![
            rule("", "Chrome", "", TriggerEvent::Minimize),
            rule("", "Chrome", "", TriggerEvent::Open),
        ];
        let chrome = window(None, "Chrome", "Google");

        // Act / Assert
        assert!(first_match(&rules, &chrome, RuleEvent::Open).is_none());
        assert!(first_match(&rules, &chrome, RuleEvent::Minimize).is_some());
    }

    #[test]
    fn open_and_minimize_covers_both_events() {
        assert!(TriggerEvent::OpenAndMinimize.covers(RuleEvent::Open));
        assert!(TriggerEvent::OpenAndMinimize.covers(RuleEvent::Minimize));
        assert!(!TriggerEvent::Open.covers(RuleEvent::Minimize));
        assert!(!TriggerEvent::Minimize.covers(RuleEvent::Open));
    }

    #[test]
    fn compile_all_skips_empty_and_invalid_rules() {
        // Arrange
        let rules = vec![
            AutoTrayRule::default(),
            AutoTrayRule {
                window_title: "[".into(),
                ..Default::default()
            },
            AutoTrayRule {
                window_class: "Calculator".into(),
                ..Default::default()
            },
        ];

        // Act
        let compiled = compile_all(&rules);

        // Assert
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].rule.window_class, "Calculator");
    }

    #[test]
    fn rule_json_uses_kebab_case_keys() {
        // Arrange
        let json = r#"{"window-class":"Notepad","tray-event":"open-and-minimize"}"#;

        // Act
        let parsed: AutoTrayRule = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(parsed.window_class, "Notepad");
        assert_eq!(parsed.trigger, TriggerEvent::OpenAndMinimize);
        assert!(parsed.executable.is_empty());
    }
}
