/*
 * Decision logic of the interposed message procedure. The Win32 side
 * (`controls::host_subclass`) only recovers the thread's runtime context and
 * acts on the returned `Interception`; everything else lives here so it can be
 * exercised without a window.
 *
 * Per message:
 *  1. WM_NCDESTROY: the record is dropped and the message chained, so a
 *     handle the system later reuses starts from a fresh record;
 *  2. no record for the control, or no runtime context bound to the calling
 *     thread: not handled (0), nothing is delivered or chained;
 *  3. a runtime exception is pending: not handled, so the host's stack unwinds
 *     and the exception reaches Java before any further event is delivered;
 *  4. WM_NOTIFY: translated and delivered;
 *  5. the original procedure runs, whether or not delivery succeeded.
 */
use crate::control_registry::ControlRegistry;
use crate::error::Result;
use crate::notification::NotificationRecord;
use crate::scintilla::{NotifyHeader, ScNotification};
use crate::types::{ControlHandle, OriginalProcedure};

pub(crate) const WM_NOTIFY: u32 = 0x004E;
pub(crate) const WM_NCDESTROY: u32 = 0x0082;

/// Receiver of translated notifications: the managed runtime, or a recorder in tests.
pub(crate) trait NotificationSink {
    fn exception_pending(&mut self) -> bool;

    /// Hands `record` to the runtime's dispatch entry point for `origin`.
    fn deliver(&mut self, origin: ControlHandle, record: &NotificationRecord) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interception {
    /// Return 0 without calling any other procedure.
    Unhandled,
    /// Forward the message to the procedure the control had before.
    Chain(OriginalProcedure),
}

/*
 * Runs the interposer for one message. `sink` is `None` when the calling
 * thread has no bound runtime context.
 *
 * # Safety
 * For WM_NOTIFY, `lparam` must point to a valid `NMHDR`. When the header's
 * origin is the editor registered for `control`, it must point to a full
 * `SCNotification`.
 */
pub(crate) unsafe fn intercept<S: NotificationSink>(
    registry: &ControlRegistry,
    sink: Option<&mut S>,
    control: ControlHandle,
    message: u32,
    lparam: isize,
) -> Interception {
    let Some(state) = registry.lookup(control) else {
        log::trace!("Interposer: message {message:#x} for unregistered control {control} dropped");
        return Interception::Unhandled;
    };
    if message == WM_NCDESTROY {
        registry.forget(control);
        return Interception::Chain(state.original_procedure());
    }
    let Some(sink) = sink else {
        log::trace!("Interposer: no runtime context on this thread, message {message:#x} for {control} dropped");
        return Interception::Unhandled;
    };
    if sink.exception_pending() {
        log::debug!("Interposer: exception pending, leaving message {message:#x} unhandled");
        return Interception::Unhandled;
    }
    let chain = Interception::Chain(state.original_procedure());
    if message != WM_NOTIFY || lparam == 0 {
        return chain;
    }

    let header = unsafe { &*(lparam as *const NotifyHeader) };
    let origin = ControlHandle::from_raw(header.hwnd_from);
    let record = if state.editor() == Some(origin) {
        let notification = unsafe { &*(lparam as *const ScNotification) };
        unsafe { NotificationRecord::from_notification(notification) }
    } else {
        Ok(NotificationRecord::from_header(header))
    };

    let delivered = record.and_then(|record| {
        log::trace!(
            "Interposer: delivering code {} from {origin} to the runtime",
            header.code
        );
        sink.deliver(origin, &record)
    });
    if let Err(err) = delivered {
        log::warn!("Interposer: notification {} from {origin} not delivered: {err}", header.code);
    }
    chain
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub delivered: Vec<(ControlHandle, NotificationRecord)>,
        pub pending: bool,
        pub fail: bool,
    }

    impl NotificationSink for RecordingSink {
        fn exception_pending(&mut self) -> bool {
            self.pending
        }

        fn deliver(&mut self, origin: ControlHandle, record: &NotificationRecord) -> Result<()> {
            if self.fail {
                return Err(crate::error::BridgeError::unresolved(
                    "Method",
                    "dispatchNotificationEvent",
                ));
            }
            self.delivered.push((origin, record.clone()));
            Ok(())
        }
    }
}
