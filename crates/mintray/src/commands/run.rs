use std::path::PathBuf;

#[cfg(windows)]
pub fn execute(config: Option<PathBuf>) {
    let path = super::settings_path(config);
    if let Err(e) = mintray_windows::daemon::run(&path) {
        eprintln!("Daemon error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
pub fn execute(_config: Option<PathBuf>) {
    eprintln!("Error: the daemon only runs on Windows.");
    std::process::exit(1);
}
