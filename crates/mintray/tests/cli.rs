use std::path::Path;
use std::process::{Command, Output};

fn mintray(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mintray"))
        .args(args)
        .output()
        .expect("failed to execute mintray")
}

fn mintray_with_config(config: &Path, args: &[&str]) -> Output {
    let config = config.to_str().expect("temp path is UTF-8");
    let mut all = vec!["--config", config];
    all.extend_from_slice(args);
    mintray(&all)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_exits_successfully() {
    // Act
    let output = mintray(&["--help"]);

    // Assert
    assert!(output.status.success());
    assert!(stdout(&output).contains("notification area"));
}

#[test]
fn version_exits_successfully() {
    // Act
    let output = mintray(&["--version"]);

    // Assert
    assert!(output.status.success());
    assert!(stdout(&output).contains("mintray"));
}

#[test]
fn hotkey_prints_normalized_binding() {
    // Act
    let output = mintray(&["hotkey", "WIN", "shift", "CTRL", "alt", "Esc"]);

    // Assert
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("alt ctrl shift win escape"), "{out}");
    assert!(out.contains("vk=0x1B"), "{out}");
}

#[test]
fn hotkey_none_is_disabled() {
    // Act
    let output = mintray(&["hotkey", "none"]);

    // Assert
    assert!(output.status.success());
    assert!(stdout(&output).contains("disabled"));
}

#[test]
fn invalid_hotkey_exits_with_error() {
    // Act
    let output = mintray(&["hotkey", "ctrl", "none"]);

    // Assert
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ctrl none"), "{stderr}");
}

#[test]
fn init_then_check_reports_valid_settings() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mintray").join("settings.json");

    // Act
    let init = mintray_with_config(&path, &["init"]);
    let check = mintray_with_config(&path, &["check"]);

    // Assert
    assert!(init.status.success());
    assert!(stdout(&init).contains("Created"));
    assert!(path.exists());
    assert!(check.status.success());
    assert!(stdout(&check).contains("is valid"));
}

#[test]
fn init_does_not_overwrite() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ \"poll-interval\": 1000 }").unwrap();

    // Act
    let output = mintray_with_config(&path, &["init"]);

    // Assert
    assert!(output.status.success());
    assert!(stdout(&output).contains("Already exists"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "{ \"poll-interval\": 1000 }");
}

#[test]
fn check_lists_each_problem() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "hotkey-restore": "ctrl none",
            "auto-tray": [ { "window-title": "(" } ]
        }"#,
    )
    .unwrap();

    // Act
    let output = mintray_with_config(&path, &["check"]);

    // Assert
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("hotkey-restore"), "{out}");
    assert!(out.contains("auto-tray rule 1"), "{out}");
}

#[test]
fn check_reports_unknown_enum_values() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "minimize-placement": "taskbar",
            "auto-tray": [ { "window-class": "Notepad", "tray-event": "close" } ]
        }"#,
    )
    .unwrap();

    // Act
    let output = mintray_with_config(&path, &["check"]);

    // Assert
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("minimize-placement"), "{out}");
    assert!(out.contains("auto-tray rule 1"), "{out}");
}

#[test]
fn check_without_file_uses_defaults() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    // Act
    let output = mintray_with_config(&path, &["check"]);

    // Assert
    assert!(output.status.success());
    assert!(stdout(&output).contains("defaults apply"));
}

#[test]
fn check_rejects_malformed_json() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    // Act
    let output = mintray_with_config(&path, &["check"]);

    // Assert
    assert_eq!(output.status.code(), Some(1));
}
