/*
 * Win32 subclassing of the control that hosts the editor. The host's
 * WM_NOTIFY traffic carries every Scintilla notification, so its window
 * procedure is swapped for `scintilla_host_proc` while the control is
 * registered. The procedure it replaced is kept in the control registry,
 * not in the window's user data, which the host toolkit may own.
 */
use crate::bridge::Bridge;
use crate::control_registry::WindowHooks;
use crate::error::{BridgeError, Result as BridgeResult};
use crate::interposer::Interception;
use crate::types::{ControlHandle, OriginalProcedure};
use crate::window_common::{control_of, hwnd_of, window_exists};

use windows::Win32::{
    Foundation::{GetLastError, HWND, LPARAM, LRESULT, WPARAM},
    UI::WindowsAndMessaging::{
        CallWindowProcW, GWLP_WNDPROC, GetWindowLongPtrW, SetWindowLongPtrW, WNDPROC,
    },
};

/// Window procedure installed on every registered host control.
unsafe extern "system" fn scintilla_host_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let control = control_of(hwnd);
    match unsafe { Bridge::global().intercept_message(control, msg, lparam.0) } {
        Interception::Unhandled => LRESULT(0),
        Interception::Chain(original) => unsafe {
            let prev_proc: WNDPROC = std::mem::transmute(original.raw());
            CallWindowProcW(prev_proc, hwnd, msg, wparam, lparam)
        },
    }
}

#[allow(clippy::fn_to_numeric_cast)]
fn host_proc_address() -> isize {
    scintilla_host_proc as isize
}

/// `WindowHooks` over real windows.
pub(crate) struct Win32WindowHooks;

impl WindowHooks for Win32WindowHooks {
    fn interpose(&self, control: ControlHandle) -> BridgeResult<OriginalProcedure> {
        if !window_exists(control) {
            return Err(BridgeError::InvalidHandle(format!(
                "host control {control} is not a window"
            )));
        }
        let hwnd = hwnd_of(control);
        let prev = unsafe { SetWindowLongPtrW(hwnd, GWLP_WNDPROC, host_proc_address()) };
        if prev == 0 {
            return Err(BridgeError::OperationFailed(format!(
                "unable to subclass host control {control}: {:?}",
                unsafe { GetLastError() }
            )));
        }
        log::debug!("HostSubclass: subclassed {control}, previous procedure {prev:#x}");
        Ok(OriginalProcedure::from_raw(prev))
    }

    fn restore(&self, control: ControlHandle, original: OriginalProcedure) -> bool {
        if !window_exists(control) {
            log::debug!("HostSubclass: {control} already destroyed, nothing to restore");
            return false;
        }
        let hwnd = hwnd_of(control);
        let current = unsafe { GetWindowLongPtrW(hwnd, GWLP_WNDPROC) };
        if current != host_proc_address() {
            log::warn!(
                "HostSubclass: {control} was subclassed again after us ({current:#x}); restoring anyway"
            );
        }
        unsafe { SetWindowLongPtrW(hwnd, GWLP_WNDPROC, original.raw()) };
        log::debug!("HostSubclass: restored procedure {:#x} on {control}", original.raw());
        true
    }
}
