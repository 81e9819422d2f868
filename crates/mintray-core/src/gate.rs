use crate::host::KeyboardState;
use crate::hotkey::ModifierMask;

/// Returns whether every modifier in `mask` is currently held.
///
/// An empty mask means the override feature is off and always yields
/// `false`.
pub fn is_held(mask: ModifierMask, keyboard: &dyn KeyboardState) -> bool {
    !mask.is_empty() && mask.iter().all(|m| keyboard.is_down(m))
}
