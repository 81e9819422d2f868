use std::path::PathBuf;

use mintray_core::{Error, Result};
use windows::Win32::Foundation::{CloseHandle, MAX_PATH};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryFullProcessImageNameW,
};
use windows::core::PWSTR;

/// Resolves the full path of the executable running as `pid`.
///
/// Fails for processes we may not query (elevated or protected) and for
/// processes that have already exited.
pub fn executable_path(pid: u32) -> Result<PathBuf> {
    // SAFETY: PROCESS_QUERY_LIMITED_INFORMATION is the least-privilege
    // access right that still allows QueryFullProcessImageNameW.
    let handle = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }
        .map_err(|e| Error::host("OpenProcess", e.to_string()))?;

    // Long-path aware processes can exceed MAX_PATH.
    let mut buffer = vec![0u16; MAX_PATH as usize * 4];
    let mut size = buffer.len() as u32;
    // SAFETY: buffer holds `size` u16s; on success `size` is updated to
    // the number written, excluding the terminator.
    let result = unsafe {
        QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        )
    };
    // SAFETY: we own the handle opened above.
    unsafe {
        let _ = CloseHandle(handle);
    }

    result.map_err(|e| Error::host("QueryFullProcessImageNameW", e.to_string()))?;
    Ok(PathBuf::from(String::from_utf16_lossy(
        &buffer[..size as usize],
    )))
}
