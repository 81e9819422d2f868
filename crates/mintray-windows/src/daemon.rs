use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use mintray_core::{Action, Outcome, Result, Settings, TrayManager, log, settings};

use crate::ctrl_c;
use crate::event_loop::{self, DaemonMsg, MessageWindow, TRAY_CALLBACK_MSG, WinEventHook};
use crate::host::{Win32Host, Win32Keyboard, Win32Layout};
use crate::hotkey::HotkeyManager;
use crate::menu;
use crate::tray::Win32Tray;

/// Runs the mintray daemon until Exit is chosen or Ctrl+C is pressed.
///
/// Everything happens on the calling thread: the Win32 message pump
/// delivers hotkeys, tray clicks, the minimize hook and the poll timer.
/// Every window still minimized is restored before returning.
pub fn run(settings_path: &Path) -> Result<()> {
    // The log level lives in the settings, so read them once just for it.
    let log_config = settings::try_load_from(settings_path)
        .map(|s| s.logging)
        .unwrap_or_default();
    let log_file = log::init(&log_config);

    let settings = settings::load_from(settings_path, &Win32Layout);
    tracing::info!("Daemon started (PID: {})", std::process::id());
    tracing::info!(
        "Settings: placement={:?}, poll={}ms, {} auto-tray rules",
        settings.minimize_placement,
        settings.poll_interval,
        settings.auto_tray.len()
    );

    let (tx, rx) = mpsc::channel::<DaemonMsg>();
    event_loop::install_sender(tx);

    let mut window = MessageWindow::create()?;
    let tray = Win32Tray::new(window.hwnd(), TRAY_CALLBACK_MSG);
    let manager = TrayManager::new(
        Box::new(Win32Host),
        Box::new(tray.clone()),
        Box::new(Win32Keyboard),
        &settings,
    );

    let mut hotkeys = HotkeyManager::new();
    register_hotkeys(&mut hotkeys, &settings);

    let hook = match WinEventHook::install() {
        Ok(hook) => Some(hook),
        Err(e) => {
            tracing::warn!("{e}; minimize rules only run on the next sweep");
            None
        }
    };
    if let Err(e) = ctrl_c::set_handler() {
        tracing::warn!("{e}");
    }

    let mut daemon = Daemon {
        manager,
        tray,
        hotkeys,
        settings_path: settings_path.to_path_buf(),
    };
    daemon.manager.start(settings.auto_tray_existing);
    window.set_poll_interval(settings.poll_interval());

    if let Some(path) = &log_file {
        eprintln!("Logging to {}", path.display());
    }
    eprintln!("mintray running. Press Ctrl+C to exit.");

    event_loop::run_message_pump(&rx, |msg| daemon.handle(msg, &mut window));

    tracing::info!("Daemon stopping");
    // Tracker drop restores the windows while the icon owner still exists.
    drop(daemon);
    drop(hook);
    drop(window);
    Ok(())
}

fn register_hotkeys(hotkeys: &mut HotkeyManager, settings: &Settings) {
    for e in hotkeys.register_all(settings, &Win32Layout) {
        tracing::warn!("{e}");
        eprintln!("Warning: {e}");
    }
}

struct Daemon {
    manager: TrayManager,
    tray: Win32Tray,
    hotkeys: HotkeyManager,
    settings_path: PathBuf,
}

impl Daemon {
    fn handle(&mut self, msg: DaemonMsg, window: &mut MessageWindow) -> ControlFlow<()> {
        match msg {
            DaemonMsg::MinimizeStart(handle) => {
                self.manager.on_minimize_start(handle);
                ControlFlow::Continue(())
            }
            DaemonMsg::Poll => {
                self.manager.poll();
                ControlFlow::Continue(())
            }
            DaemonMsg::TaskbarCreated => {
                tracing::info!("taskbar recreated; re-adding tray icons");
                self.tray.restore_icons();
                ControlFlow::Continue(())
            }
            DaemonMsg::Hotkey(id) => match self.hotkeys.action_for(id) {
                Some(action) => self.action(action, window),
                None => ControlFlow::Continue(()),
            },
            DaemonMsg::Action(action) => self.action(action, window),
        }
    }

    fn action(&mut self, action: Action, window: &mut MessageWindow) -> ControlFlow<()> {
        match self.manager.handle_action(action) {
            Outcome::Done => ControlFlow::Continue(()),
            Outcome::ShowMenu => {
                let entries = self.manager.menu_entries();
                match menu::show(window.hwnd(), &entries) {
                    Ok(command) => self.action(Action::MenuCommand(command), window),
                    Err(e) => {
                        tracing::warn!("popup menu: {e}");
                        ControlFlow::Continue(())
                    }
                }
            }
            Outcome::Reload => {
                self.reload(window);
                ControlFlow::Continue(())
            }
            Outcome::Exit => ControlFlow::Break(()),
        }
    }

    /// Re-reads the settings file. Logging keeps its startup
    /// configuration; everything else takes effect immediately.
    fn reload(&mut self, window: &mut MessageWindow) {
        let settings = settings::load_from(&self.settings_path, &Win32Layout);
        self.manager.reload(&settings);
        register_hotkeys(&mut self.hotkeys, &settings);
        window.set_poll_interval(settings.poll_interval());
    }
}
