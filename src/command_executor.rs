/*
 * This module executes editor commands issued from Java. Every command ends
 * in `execute_send`, which invokes the control's cached direct-call
 * capability. The remaining functions marshal one payload shape each: they
 * borrow or allocate the native memory the command needs, issue the call,
 * copy results back into fields of the managed payload object, and let the
 * scratch buffers drop on every exit path.
 *
 * Field names (`handle`, `capacity`, `start`, `end`, `text`, `searchPattern`,
 * `startFound`, `endFound`) belong to the Java payload classes `Scintilla`,
 * `CText`, `TextRange` and `FindText`.
 *
 * Text crosses into the editor as standard UTF-8 on every path: string
 * parameters arrive already decoded and are copied into NUL-terminated
 * scratch buffers, the same way the find pattern is, and output buffers are
 * decoded as UTF-8. A string with an embedded NUL ends at that NUL.
 */
use crate::control_registry::ControlRegistry;
use crate::error::{BridgeError, Result as BridgeResult};
use crate::field_access::ManagedObject;
use crate::scintilla::{CharacterRange, TextRange, TextToFind};
use crate::scratch::ScratchBuffer;
use crate::types::ControlHandle;

/// Marks a range that extends to the end of the document.
const RANGE_TO_END: i32 = -1;

/*
 * Reads the native control handle from the calling object's `handle` field.
 * A zero handle is a valid answer: the Java control has not been created yet
 * or was already disposed.
 */
pub(crate) fn resolve_control(host: &mut impl ManagedObject) -> BridgeResult<ControlHandle> {
    Ok(ControlHandle::from_jint(host.get_int("handle")?))
}

/*
 * Sends a command through the cached direct-call capability of `control` and
 * returns the editor's result unmodified. A null handle is a silent no-op
 * returning 0, matching calls made on a not-yet-created control.
 */
pub(crate) fn execute_send(
    registry: &ControlRegistry,
    control: ControlHandle,
    message: u32,
    wparam: usize,
    lparam: isize,
) -> BridgeResult<isize> {
    if control.is_null() {
        log::trace!("CommandExecutor: message {message} sent to null control ignored");
        return Ok(0);
    }
    let direct_call = registry.direct_call(control).ok_or_else(|| {
        log::warn!("CommandExecutor: control {control} has no editor attached");
        BridgeError::InvalidHandle(format!("control {control} does not host an editor"))
    })?;
    log::trace!(
        "CommandExecutor: control {control} message {message} wparam {wparam:#x} lparam {lparam:#x}"
    );
    Ok(unsafe { direct_call.call(message, wparam, lparam) })
}

/// `rawSend`: resolves the handle from the host object, then sends.
pub(crate) fn execute_raw_send(
    registry: &ControlRegistry,
    host: &mut impl ManagedObject,
    message: u32,
    wparam: usize,
    lparam: isize,
) -> BridgeResult<isize> {
    let control = resolve_control(host)?;
    execute_send(registry, control, message, wparam, lparam)
}

/// NUL-terminated copy of `text`, or `None` for a null string.
fn terminated_copy(text: Option<&str>) -> BridgeResult<Option<ScratchBuffer>> {
    text.map(|text| ScratchBuffer::terminated(text.as_bytes()))
        .transpose()
}

fn buffer_param(buffer: &Option<ScratchBuffer>) -> isize {
    buffer.as_ref().map_or(0, |buffer| buffer.as_ptr() as isize)
}

/*
 * String-parameter form. The copy of `text` lives for the duration of the
 * call only; `None` is passed as a null pointer.
 */
pub(crate) fn execute_send_text(
    registry: &ControlRegistry,
    control: ControlHandle,
    message: u32,
    wparam: usize,
    text: Option<&str>,
) -> BridgeResult<isize> {
    let buffer = terminated_copy(text)?;
    execute_send(registry, control, message, wparam, buffer_param(&buffer))
}

/// Dual-string form: both parameters are copied the same way.
pub(crate) fn execute_send_texts(
    registry: &ControlRegistry,
    control: ControlHandle,
    message: u32,
    wtext: Option<&str>,
    ltext: Option<&str>,
) -> BridgeResult<isize> {
    let wbuffer = terminated_copy(wtext)?;
    let lbuffer = terminated_copy(ltext)?;
    execute_send(
        registry,
        control,
        message,
        buffer_param(&wbuffer) as usize,
        buffer_param(&lbuffer),
    )
}

/*
 * Output-buffer form. Allocates `capacity` bytes, lets the editor fill them,
 * and stores the content (up to the first NUL, or the whole buffer if the
 * editor did not terminate it) in the payload's `text` field.
 */
pub(crate) fn execute_send_text_out(
    registry: &ControlRegistry,
    control: ControlHandle,
    message: u32,
    wparam: usize,
    payload: &mut impl ManagedObject,
) -> BridgeResult<isize> {
    let capacity = payload.get_int("capacity")?;
    let len = usize::try_from(capacity).map_err(|_| {
        BridgeError::InvalidArgument(format!("text buffer capacity {capacity} is negative"))
    })?;
    // A zero capacity still gets one byte so the editor never sees a dangling pointer.
    let mut buffer = ScratchBuffer::zeroed(len.max(1))?;

    let result = execute_send(
        registry,
        control,
        message,
        wparam,
        buffer.as_mut_ptr() as isize,
    )?;

    payload.set_string("text", Some(&buffer.to_text()))?;
    Ok(result)
}

/*
 * Size of the buffer for a range read, terminator included. A range ending at
 * -1 runs to the end of the document, so its size comes from `capacity`.
 */
pub(crate) fn text_range_buffer_len(
    start: i32,
    end: i32,
    capacity: Option<i32>,
) -> BridgeResult<usize> {
    let span = if end == RANGE_TO_END {
        let capacity = capacity.ok_or_else(|| {
            BridgeError::InvalidArgument(
                "a range ending at -1 requires a capacity".to_string(),
            )
        })?;
        i64::from(capacity)
    } else {
        i64::from(end) - i64::from(start)
    };
    usize::try_from(span + 1)
        .ok()
        .filter(|&len| len > 0)
        .ok_or_else(|| {
            BridgeError::InvalidArgument(format!(
                "text range {start}..{end} (capacity {capacity:?}) has no room for text"
            ))
        })
}

/// Range output-buffer form (`Sci_TextRange`).
pub(crate) fn execute_send_text_range(
    registry: &ControlRegistry,
    control: ControlHandle,
    message: u32,
    wparam: usize,
    payload: &mut impl ManagedObject,
) -> BridgeResult<isize> {
    let start = payload.get_int("start")?;
    let end = payload.get_int("end")?;
    let capacity = if end == RANGE_TO_END {
        Some(payload.get_int("capacity")?)
    } else {
        None
    };
    let mut buffer = ScratchBuffer::zeroed(text_range_buffer_len(start, end, capacity)?)?;

    let mut range = TextRange {
        chrg: CharacterRange::new(start, end),
        text: buffer.as_mut_ptr(),
    };
    let result = execute_send(
        registry,
        control,
        message,
        wparam,
        &mut range as *mut TextRange as isize,
    )?;

    payload.set_string("text", Some(&buffer.to_text()))?;
    Ok(result)
}

/*
 * Find/replace form (`Sci_TextToFind`). The pattern is copied into a buffer
 * of its own; the editor only reads it. The matched range comes back through
 * the descriptor and is stored in `startFound`/`endFound` ((-1, -1) when the
 * editor did not report a match).
 */
pub(crate) fn execute_send_find_text(
    registry: &ControlRegistry,
    control: ControlHandle,
    message: u32,
    wparam: usize,
    payload: &mut impl ManagedObject,
) -> BridgeResult<isize> {
    let start = payload.get_int("start")?;
    let end = payload.get_int("end")?;
    let pattern = payload.get_string("searchPattern")?.ok_or_else(|| {
        BridgeError::InvalidArgument("FindText.searchPattern is null".to_string())
    })?;
    let pattern_buffer = ScratchBuffer::terminated(pattern.as_bytes())?;

    let mut find = TextToFind {
        chrg: CharacterRange::new(start, end),
        text: pattern_buffer.as_ptr(),
        found: CharacterRange::unset(),
    };
    let result = execute_send(
        registry,
        control,
        message,
        wparam,
        &mut find as *mut TextToFind as isize,
    )?;

    payload.set_int("startFound", find.found.cp_min as i32)?;
    payload.set_int("endFound", find.found.cp_max as i32)?;
    Ok(result)
}
