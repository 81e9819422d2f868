use thiserror::Error;

use crate::WindowHandle;

/// Result alias used throughout mintray.
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, machine-readable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Host,
    Representation,
    IdExhausted,
    InvalidHotkey,
    InvalidPattern,
    HotkeyRegistration,
    SettingsIo,
    SettingsFormat,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Representation => "representation",
            Self::IdExhausted => "id-exhausted",
            Self::InvalidHotkey => "invalid-hotkey",
            Self::InvalidPattern => "invalid-pattern",
            Self::HotkeyRegistration => "hotkey-registration",
            Self::SettingsIo => "settings-io",
            Self::SettingsFormat => "settings-format",
        }
    }
}

/// Errors surfaced by the tracker, the parsers and the platform layer.
///
/// Every variant maps to an [`ErrorCode`] so callers can branch on the
/// kind while still showing the human-readable detail.
#[derive(Debug, Error)]
pub enum Error {
    /// A host window-management or shell call failed.
    #[error("{operation} failed: {detail}")]
    Host {
        operation: &'static str,
        detail: String,
    },

    /// The window was minimized but its tray icon could not be created.
    #[error("could not create tray icon for window {handle}: {detail}")]
    Representation { handle: WindowHandle, detail: String },

    /// A monotonic identifier counter ran out of values.
    #[error("{what} identifiers exhausted")]
    IdExhausted { what: &'static str },

    #[error("invalid hotkey {text:?}: {detail}")]
    InvalidHotkey { text: String, detail: String },

    #[error("invalid window title pattern {pattern:?}: {detail}")]
    InvalidPattern { pattern: String, detail: String },

    /// `RegisterHotKey` refused the binding (usually already taken).
    #[error("could not register hotkey {name} ({text})")]
    HotkeyRegistration { name: &'static str, text: String },

    #[error("{path}: {source}")]
    SettingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    SettingsFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Shorthand for a failed host call.
    pub fn host(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Host {
            operation,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Host { .. } => ErrorCode::Host,
            Self::Representation { .. } => ErrorCode::Representation,
            Self::IdExhausted { .. } => ErrorCode::IdExhausted,
            Self::InvalidHotkey { .. } => ErrorCode::InvalidHotkey,
            Self::InvalidPattern { .. } => ErrorCode::InvalidPattern,
            Self::HotkeyRegistration { .. } => ErrorCode::HotkeyRegistration,
            Self::SettingsIo { .. } => ErrorCode::SettingsIo,
            Self::SettingsFormat { .. } => ErrorCode::SettingsFormat,
        }
    }

    /// Returns true for a settings read that failed because the file
    /// does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SettingsIo { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
