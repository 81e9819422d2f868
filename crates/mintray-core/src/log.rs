//! `tracing` subscriber setup with a size-rotated log file.
//!
//! Logs are written to `<config dir>/mintray/logs/mintray.log`. When
//! the file exceeds the configured max size, it is rotated to
//! `mintray.log.1` (one backup kept).

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "mintray.log";
const BACKUP_EXTENSION: &str = "log.1";

/// Level names accepted in the `logging.level` setting.
pub const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogConfig {
    /// Whether file logging is enabled. Defaults to `false`.
    pub enabled: bool,
    /// Minimum log level, one of [`LEVELS`].
    pub level: String,
    /// Maximum log file size in megabytes before rotation. 0 never rotates.
    pub max_file_mb: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".into(),
            max_file_mb: 10,
        }
    }
}

pub fn is_valid_level(level: &str) -> bool {
    LEVELS.contains(&level.to_ascii_lowercase().as_str())
}

/// Returns the log file path: `<config dir>/mintray/logs/mintray.log`.
pub fn log_path() -> Option<PathBuf> {
    crate::settings::settings_dir().map(|d| d.join("logs").join(LOG_FILE_NAME))
}

/// An append-only file that moves itself aside once it grows past
/// `max_bytes`.
pub struct RotatingFile {
    file: File,
    path: PathBuf,
    max_bytes: u64,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: &Path, max_bytes: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            file,
            path: path.to_path_buf(),
            max_bytes,
            written,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.path.with_extension(BACKUP_EXTENSION))?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        if self.max_bytes > 0 && self.written >= self.max_bytes {
            // A failed rotation keeps appending to the current file.
            let _ = self.rotate();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Installs the global `tracing` subscriber. Call once at startup.
///
/// With logging enabled, events at or above the configured level go to
/// the rotating log file and the file path is returned. Otherwise (or
/// if the file cannot be opened) only warnings and errors are printed
/// to stderr.
pub fn init(config: &LogConfig) -> Option<PathBuf> {
    if config.enabled
        && let Some(path) = log_path()
    {
        match RotatingFile::open(&path, config.max_file_mb * 1024 * 1024) {
            Ok(file) => {
                let filter =
                    EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .try_init();
                return Some(path);
            }
            Err(e) => eprintln!("Warning: could not open {}: {e}", path.display()),
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
    None
}
