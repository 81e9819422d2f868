use std::path::PathBuf;

use mintray_core::settings;

/// Loads the settings file and reports every value that would be
/// replaced by its default at startup. Exits 1 if there are problems.
pub fn execute(config: Option<PathBuf>) {
    let path = super::settings_path(config);

    let mut settings = match settings::try_load_from(&path) {
        Ok(s) => s,
        Err(e) if e.is_not_found() => {
            println!("{} not found; defaults apply.", path.display());
            return;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let problems = settings.validate(super::layout().as_ref());
    if problems.is_empty() {
        println!(
            "{} is valid ({} auto-tray rules).",
            path.display(),
            settings.auto_tray.len()
        );
        return;
    }

    for problem in &problems {
        println!("  - {problem}");
    }
    eprintln!("{} problem(s) in {}", problems.len(), path.display());
    std::process::exit(1);
}
