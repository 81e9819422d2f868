use mintray_core::hotkey;

/// Prints the normalized binding and its key code, or the parse error.
pub fn execute(text: &str) {
    let layout = super::layout();
    match hotkey::parse(text, layout.as_ref()) {
        Ok(binding) if binding.is_disabled() => println!("none (disabled)"),
        Ok(binding) => println!(
            "{} (vk=0x{:02X}, modifiers=0x{:X})",
            hotkey::normalize(text, layout.as_ref()),
            binding.key_code,
            binding.modifiers.bits()
        ),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
