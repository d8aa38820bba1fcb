/*
 * Common Win32 helpers shared by the control handlers: conversion between
 * `HWND` and the pointer-sized `ControlHandle`, and the two window
 * operations Java drives directly on the editor (placement and focus).
 */
use crate::error::{BridgeError, Result as BridgeResult};
use crate::types::ControlHandle;

use windows::Win32::{
    Foundation::HWND,
    UI::Input::KeyboardAndMouse::SetFocus,
    UI::WindowsAndMessaging::{
        IsWindow, SWP_DRAWFRAME, SWP_NOACTIVATE, SWP_NOZORDER, SET_WINDOW_POS_FLAGS, SetWindowPos,
    },
};

use std::ffi::c_void;

/// Placement flags for editor moves: keep z-order and activation, redraw the frame.
pub(crate) const EDITOR_PLACEMENT_FLAGS: SET_WINDOW_POS_FLAGS =
    SET_WINDOW_POS_FLAGS(SWP_NOZORDER.0 | SWP_DRAWFRAME.0 | SWP_NOACTIVATE.0);

pub(crate) fn hwnd_of(control: ControlHandle) -> HWND {
    HWND(control.raw() as *mut c_void)
}

pub(crate) fn control_of(hwnd: HWND) -> ControlHandle {
    ControlHandle::from_raw(hwnd.0 as isize)
}

pub(crate) fn window_exists(control: ControlHandle) -> bool {
    !control.is_null() && unsafe { IsWindow(Some(hwnd_of(control))) }.as_bool()
}

fn existing_window(control: ControlHandle) -> BridgeResult<HWND> {
    if !window_exists(control) {
        log::warn!("WindowCommon: {control} is not a window");
        return Err(BridgeError::InvalidHandle(format!(
            "{control} is not a live window"
        )));
    }
    Ok(hwnd_of(control))
}

pub(crate) fn move_window(
    control: ControlHandle,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
) -> BridgeResult<()> {
    let hwnd = existing_window(control)?;
    log::trace!("WindowCommon: placing {control} at ({x}, {y}) size {width}x{height}");
    unsafe { SetWindowPos(hwnd, None, x, y, width, height, EDITOR_PLACEMENT_FLAGS) }?;
    Ok(())
}

pub(crate) fn focus_window(control: ControlHandle) -> BridgeResult<()> {
    let hwnd = existing_window(control)?;
    // A null previous focus also surfaces as an error, so failures are only logged.
    match unsafe { SetFocus(Some(hwnd)) } {
        Ok(previous) => log::trace!("WindowCommon: focused {control}, previous focus {:?}", previous.0),
        Err(err) => log::warn!("WindowCommon: SetFocus on {control} failed: {err}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_conversion_is_lossless() {
        let control = ControlHandle::from_raw(0x0004_0A2C);
        assert_eq!(control_of(hwnd_of(control)), control);
    }

    #[test]
    fn null_handle_is_never_a_window() {
        assert!(!window_exists(ControlHandle::NULL));
        assert!(move_window(ControlHandle::NULL, 0, 0, 10, 10).is_err());
    }

    #[test]
    fn focusing_a_missing_window_reports_invalid_handle() {
        let stale = ControlHandle::from_raw(0x7FFF_0000);
        assert!(matches!(
            focus_window(stale),
            Err(crate::error::BridgeError::InvalidHandle(_))
        ));
        assert!(focus_window(ControlHandle::NULL).is_err());
    }

    #[test]
    fn placement_flags_keep_z_order_and_activation() {
        assert!(EDITOR_PLACEMENT_FLAGS.contains(SWP_NOZORDER));
        assert!(EDITOR_PLACEMENT_FLAGS.contains(SWP_NOACTIVATE));
        assert!(EDITOR_PLACEMENT_FLAGS.contains(SWP_DRAWFRAME));
    }
}
