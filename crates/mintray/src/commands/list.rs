#[cfg(windows)]
pub fn execute(all: bool) {
    use comfy_table::presets::UTF8_FULL;
    use comfy_table::{Cell, ContentArrangement, Table};
    use mintray_core::host::WindowHost;
    use mintray_windows::Win32Host;

    let host = Win32Host;
    let windows = match host.enumerate_top_level() {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("HWND"),
            Cell::new("Title"),
            Cell::new("Class"),
            Cell::new("Visible"),
            Cell::new("Executable"),
        ]);

    let mut count = 0;
    for handle in windows {
        let visible = host.is_user_visible(handle);
        if !all && !visible {
            continue;
        }
        let info = host.info(handle);
        let executable = info
            .executable
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "?".into());

        table.add_row(vec![
            Cell::new(handle),
            Cell::new(info.title),
            Cell::new(info.class),
            Cell::new(if visible { "yes" } else { "no" }),
            Cell::new(executable),
        ]);
        count += 1;
    }

    println!("{table}");
    println!("\n{count} windows found");
}

#[cfg(not(windows))]
pub fn execute(_all: bool) {
    eprintln!("Error: listing windows is only supported on Windows.");
    std::process::exit(1);
}
