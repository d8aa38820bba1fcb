/*
 * Creation and teardown of the native Scintilla editor window, and capture
 * of its direct-call pair. The editor class is registered by the lexer
 * library loaded at process attach.
 */
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result as BridgeResult};
use crate::lifecycle;
use crate::scintilla::{SCI_GETDIRECTFUNCTION, SCI_GETDIRECTPOINTER};
use crate::types::{ControlHandle, DirectCall};
use crate::window_common::{control_of, hwnd_of, window_exists};

use windows::Win32::{
    Foundation::{LPARAM, WPARAM},
    UI::WindowsAndMessaging::{
        CreateWindowExW, DestroyWindow, SendMessageW, WINDOW_EX_STYLE, WS_CHILD, WS_TABSTOP,
        WS_VISIBLE,
    },
};
use windows::core::{HSTRING, w};

/*
 * Creates an editor window as a zero-sized visible child of `parent`. The
 * host lays it out later through `resizeControl`.
 */
pub(crate) fn create_editor_window(
    config: &BridgeConfig,
    parent: ControlHandle,
) -> BridgeResult<ControlHandle> {
    if !window_exists(parent) {
        return Err(BridgeError::InvalidHandle(format!(
            "parent {parent} is not a window"
        )));
    }
    let h_instance = lifecycle::module_instance()?;
    let hwnd_editor = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            &HSTRING::from(config.editor_class.as_str()),
            w!(""),
            WS_CHILD | WS_TABSTOP | WS_VISIBLE,
            0,
            0,
            0,
            0,
            Some(hwnd_of(parent)),
            None,
            Some(h_instance),
            None,
        )
    }
    .map_err(|err| {
        log::error!(
            "ScintillaHandler: CreateWindowExW for class '{}' failed: {err}",
            config.editor_class
        );
        BridgeError::OperationFailed(format!(
            "unable to create a '{}' window (is {} loaded?): {err}",
            config.editor_class, config.lexer_library
        ))
    })?;

    let editor = control_of(hwnd_editor);
    log::debug!("ScintillaHandler: created editor {editor} under {parent}");
    Ok(editor)
}

/// Asks the editor for its direct function and context pointer.
pub(crate) fn query_direct_call(editor: ControlHandle) -> BridgeResult<DirectCall> {
    let hwnd = hwnd_of(editor);
    let function = unsafe {
        SendMessageW(hwnd, SCI_GETDIRECTFUNCTION, Some(WPARAM(0)), Some(LPARAM(0)))
    };
    let context = unsafe {
        SendMessageW(hwnd, SCI_GETDIRECTPOINTER, Some(WPARAM(0)), Some(LPARAM(0)))
    };
    // SCI_GETDIRECTFUNCTION hands out the address of Scintilla's SciFnDirect.
    unsafe { DirectCall::from_raw(function.0, context.0) }.ok_or_else(|| {
        BridgeError::InitializationFailed(format!(
            "editor {editor} returned no direct function"
        ))
    })
}

pub(crate) fn destroy_editor_window(editor: ControlHandle) {
    if let Err(err) = unsafe { DestroyWindow(hwnd_of(editor)) } {
        log::warn!("ScintillaHandler: DestroyWindow({editor}) failed: {err}");
    }
}
