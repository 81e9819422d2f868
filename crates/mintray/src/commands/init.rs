use std::path::PathBuf;

use mintray_core::Settings;

/// Writes the default `settings.json`. An existing file is left alone.
pub fn execute(config: Option<PathBuf>) {
    let path = super::settings_path(config);

    if path.exists() {
        println!("Already exists: {}", path.display());
        return;
    }

    if let Err(e) = Settings::default().save(&path) {
        eprintln!("Error: could not write {e}");
        std::process::exit(1);
    }
    println!("Created {}", path.display());
    println!("\nAdd auto-tray rules under \"auto-tray\", then run 'mintray check'.");
}
