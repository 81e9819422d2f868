use mintray_core::host::KeyboardLayout;
use mintray_core::{Action, Error, Hotkey, Settings};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    HOT_KEY_MODIFIERS, MOD_NOREPEAT, RegisterHotKey, UnregisterHotKey,
};

/// Manages the global hotkey registrations.
///
/// Hotkeys are registered on the current thread's message queue.
/// `WM_HOTKEY` messages arrive via the Win32 message pump running
/// on the same thread.
#[derive(Default)]
pub struct HotkeyManager {
    registered: Vec<Hotkey>,
}

impl HotkeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every enabled hotkey from the settings, replacing any
    /// previous registrations.
    ///
    /// Returns one error per hotkey that could not be parsed or that the
    /// OS refused, usually because another program owns the combination.
    pub fn register_all(&mut self, settings: &Settings, layout: &dyn KeyboardLayout) -> Vec<Error> {
        self.unregister_all();

        let mut errors = Vec::new();
        for hotkey in Hotkey::ALL {
            let binding = match settings.binding(hotkey, layout) {
                Ok(b) => b,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            if binding.is_disabled() {
                continue;
            }

            // ModifierMask bits are the MOD_* values.
            let modifiers = HOT_KEY_MODIFIERS(binding.modifiers.bits()) | MOD_NOREPEAT;
            // SAFETY: RegisterHotKey binds to the calling thread's queue;
            // ids are unique per hotkey.
            let result = unsafe { RegisterHotKey(None, hotkey.id(), modifiers, binding.key_code) };
            match result {
                Ok(()) => {
                    tracing::debug!(
                        "registered {} ({})",
                        hotkey.name(),
                        settings.hotkey_text(hotkey)
                    );
                    self.registered.push(hotkey);
                }
                Err(_) => errors.push(Error::HotkeyRegistration {
                    name: hotkey.name(),
                    text: settings.hotkey_text(hotkey).to_string(),
                }),
            }
        }
        errors
    }

    /// Maps a `WM_HOTKEY` id back to its action.
    pub fn action_for(&self, id: i32) -> Option<Action> {
        self.registered
            .iter()
            .find(|h| h.id() == id)
            .map(|h| h.action())
    }

    fn unregister_all(&mut self) {
        for hotkey in self.registered.drain(..) {
            // SAFETY: UnregisterHotKey removes our own registration.
            unsafe {
                let _ = UnregisterHotKey(None, hotkey.id());
            }
        }
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        self.unregister_all();
    }
}
