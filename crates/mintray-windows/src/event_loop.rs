//! The daemon's message window, minimize hook and message pump.
//!
//! Everything runs on one thread. Window procedures and the WinEvent
//! callback only push a [`DaemonMsg`] into a thread-local channel; the
//! pump drains it between messages, so the handler never re-enters
//! itself from inside a callback.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use mintray_core::{Action, Error, Result, WindowHandle};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, EVENT_SYSTEM_MINIMIZESTART,
    GetMessageW, KillTimer, MSG, PostThreadMessageW, RegisterClassW, RegisterWindowMessageW,
    SetTimer, TranslateMessage, WINEVENT_OUTOFCONTEXT, WINEVENT_SKIPOWNPROCESS, WM_APP,
    WM_CONTEXTMENU, WM_HOTKEY, WM_LBUTTONUP, WM_NULL, WM_RBUTTONUP, WM_TIMER, WNDCLASSW,
    WS_EX_TOOLWINDOW,
};
use windows::core::w;

use crate::event;

/// Callback message of every tray icon: `wParam` is the icon id,
/// `lParam` the mouse message.
pub const TRAY_CALLBACK_MSG: u32 = WM_APP + 1;

const POLL_TIMER_ID: usize = 0x4D54;

/// Input for the daemon, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonMsg {
    /// A top-level window started minimizing.
    MinimizeStart(WindowHandle),
    Action(Action),
    /// `WM_HOTKEY` with this registration id.
    Hotkey(i32),
    /// The poll timer fired.
    Poll,
    /// Explorer restarted; tray icons must be added again.
    TaskbarCreated,
}

thread_local! {
    static SENDER: RefCell<Option<Sender<DaemonMsg>>> = const { RefCell::new(None) };
    static TASKBAR_CREATED: Cell<u32> = const { Cell::new(0) };
}

/// Routes callback messages of the current thread into `tx`.
pub fn install_sender(tx: Sender<DaemonMsg>) {
    SENDER.with(|cell| *cell.borrow_mut() = Some(tx));
}

fn send(msg: DaemonMsg) {
    SENDER.with(|cell| {
        if let Some(sender) = cell.borrow().as_ref() {
            let _ = sender.send(msg);
        }
    });
}

/// A hidden window that owns the tray icons and the poll timer.
///
/// Must NOT be a message-only window (`HWND_MESSAGE` parent) because those
/// do not receive the `TaskbarCreated` broadcast. Instead we create a
/// regular hidden window with `WS_EX_TOOLWINDOW` to keep it out of the
/// taskbar.
pub struct MessageWindow {
    hwnd: HWND,
    polling: bool,
}

impl MessageWindow {
    pub fn create() -> Result<Self> {
        // SAFETY: registers a class whose procedure only forwards
        // messages; the class name is a static literal.
        unsafe {
            let class_name = w!("MintrayMessageWindow");
            let wc = WNDCLASSW {
                lpfnWndProc: Some(message_window_proc),
                lpszClassName: class_name,
                ..Default::default()
            };
            if RegisterClassW(&wc) == 0 {
                return Err(Error::host("RegisterClassW", "class registration refused"));
            }

            TASKBAR_CREATED.with(|id| id.set(RegisterWindowMessageW(w!("TaskbarCreated"))));

            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW,
                class_name,
                w!("mintray"),
                Default::default(),
                0,
                0,
                0,
                0,
                None,
                None,
                None,
                None,
            )
            .map_err(|e| Error::host("CreateWindowExW", e.to_string()))?;

            Ok(Self {
                hwnd,
                polling: false,
            })
        }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Starts, restarts or (with `None`) stops the poll timer.
    pub fn set_poll_interval(&mut self, interval: Option<Duration>) {
        self.stop_polling();
        let Some(interval) = interval else {
            return;
        };
        let millis = u32::try_from(interval.as_millis()).unwrap_or(u32::MAX);
        // SAFETY: the timer belongs to our own window.
        let id = unsafe { SetTimer(Some(self.hwnd), POLL_TIMER_ID, millis, None) };
        if id == 0 {
            tracing::warn!("SetTimer failed; window changes are only seen on minimize");
        } else {
            self.polling = true;
        }
    }

    fn stop_polling(&mut self) {
        if self.polling {
            // SAFETY: kills the timer set in set_poll_interval.
            unsafe {
                let _ = KillTimer(Some(self.hwnd), POLL_TIMER_ID);
            }
            self.polling = false;
        }
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        self.stop_polling();
        // SAFETY: we created the window and destroy it once.
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
    }
}

/// WNDPROC for the message window.
///
/// Translates the poll timer, tray icon clicks and `TaskbarCreated`
/// into daemon messages. Everything else goes to `DefWindowProcW`.
unsafe extern "system" fn message_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == POLL_TIMER_ID => {
            send(DaemonMsg::Poll);
            return LRESULT(0);
        }
        TRAY_CALLBACK_MSG => {
            let id = wparam.0 as u32;
            match (lparam.0 & 0xFFFF) as u32 {
                WM_LBUTTONUP => send(DaemonMsg::Action(Action::ActivateTray(id))),
                WM_RBUTTONUP | WM_CONTEXTMENU => send(DaemonMsg::Action(Action::ShowMenu)),
                _ => {}
            }
            return LRESULT(0);
        }
        _ => {}
    }

    let taskbar_created = TASKBAR_CREATED.with(Cell::get);
    if taskbar_created != 0 && msg == taskbar_created {
        send(DaemonMsg::TaskbarCreated);
        return LRESULT(0);
    }

    // SAFETY: default handling for every other message.
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Out-of-context `EVENT_SYSTEM_MINIMIZESTART` hook, removed on drop.
pub struct WinEventHook {
    hook: HWINEVENTHOOK,
}

impl WinEventHook {
    pub fn install() -> Result<Self> {
        // SAFETY: SetWinEventHook registers our callback for system-wide
        // window events. WINEVENT_OUTOFCONTEXT means the callback runs in
        // our process. WINEVENT_SKIPOWNPROCESS ignores our own windows.
        let hook = unsafe {
            SetWinEventHook(
                EVENT_SYSTEM_MINIMIZESTART,
                EVENT_SYSTEM_MINIMIZESTART,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };
        if hook.is_invalid() {
            return Err(Error::host("SetWinEventHook", "hook was not installed"));
        }
        Ok(Self { hook })
    }
}

impl Drop for WinEventHook {
    fn drop(&mut self) {
        // SAFETY: removes the hook installed in `install`.
        unsafe {
            let _ = UnhookWinEvent(self.hook);
        }
    }
}

/// The WinEvent callback.
///
/// Out-of-context callbacks run inside `GetMessageW` without making it
/// return, so a `WM_NULL` is posted to wake the pump.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    _id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    if let Some(handle) = event::minimize_start(event, hwnd, id_object) {
        send(DaemonMsg::MinimizeStart(handle));
        // SAFETY: posts to our own thread's queue.
        unsafe {
            let _ = PostThreadMessageW(GetCurrentThreadId(), WM_NULL, WPARAM(0), LPARAM(0));
        }
    }
}

/// The Win32 message pump.
///
/// Dispatches window messages, turns `WM_HOTKEY` into
/// [`DaemonMsg::Hotkey`] and feeds every queued [`DaemonMsg`] to
/// `handler`. Returns when the handler breaks or `WM_QUIT` arrives.
pub fn run_message_pump(
    rx: &Receiver<DaemonMsg>,
    mut handler: impl FnMut(DaemonMsg) -> ControlFlow<()>,
) {
    let mut msg = MSG::default();

    // SAFETY: standard GetMessage/Dispatch loop on this thread's queue.
    while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
        if msg.message == WM_HOTKEY {
            if handler(DaemonMsg::Hotkey(msg.wParam.0 as i32)).is_break() {
                return;
            }
        } else {
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        while let Ok(queued) = rx.try_recv() {
            if handler(queued).is_break() {
                return;
            }
        }
    }
}
