/*
 * The control-state table: one record per hosted control, keyed by the
 * control's window handle. A record exists exactly while the control's
 * message procedure is interposed. Records are small `Copy` values; callers
 * receive copies, so nothing outside the table can hold a reference that a
 * concurrent `dispose` would invalidate. The lock is held only for the
 * duration of a table operation and never across a call into the runtime or
 * into the editor.
 */
use crate::error::{BridgeError, Result};
use crate::types::{ControlHandle, DirectCall, OriginalProcedure};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/*
 * Platform operations the table needs to keep its invariant: swapping a
 * control's message procedure in and out. Implemented over Win32 subclassing
 * in `controls::host_subclass` and by recording fakes in tests.
 */
pub(crate) trait WindowHooks {
    /// Installs the interposed procedure and returns the one it replaced.
    fn interpose(&self, control: ControlHandle) -> Result<OriginalProcedure>;

    /// Puts `original` back if the window still exists. Returns whether it did.
    fn restore(&self, control: ControlHandle, original: OriginalProcedure) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ControlState {
    original_procedure: OriginalProcedure,
    editor: Option<ControlHandle>,
    direct_call: Option<DirectCall>,
}

impl ControlState {
    fn new(original_procedure: OriginalProcedure) -> Self {
        Self {
            original_procedure,
            editor: None,
            direct_call: None,
        }
    }

    pub(crate) fn original_procedure(&self) -> OriginalProcedure {
        self.original_procedure
    }

    pub(crate) fn editor(&self) -> Option<ControlHandle> {
        self.editor
    }

    pub(crate) fn direct_call(&self) -> Option<DirectCall> {
        self.direct_call
    }
}

#[derive(Debug, Default)]
pub(crate) struct ControlRegistry {
    states: Mutex<HashMap<ControlHandle, ControlState>>,
}

impl ControlRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn states(&self) -> MutexGuard<'_, HashMap<ControlHandle, ControlState>> {
        self.states.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("Registry: recovering control table after a panic in another thread");
            poisoned.into_inner()
        })
    }

    /*
     * Returns the record for `control`, interposing its message procedure
     * and inserting a fresh record on first use. An existing record is
     * returned as-is; the procedure is never interposed twice.
     */
    pub(crate) fn get_or_create(
        &self,
        control: ControlHandle,
        hooks: &dyn WindowHooks,
    ) -> Result<ControlState> {
        if control.is_null() {
            return Err(BridgeError::InvalidHandle(
                "cannot register a null control handle".to_string(),
            ));
        }

        let mut states = self.states();
        if let Some(existing) = states.get(&control) {
            log::trace!("Registry: control {control} already interposed");
            return Ok(*existing);
        }

        let original = hooks.interpose(control)?;
        let state = ControlState::new(original);
        states.insert(control, state);
        log::debug!(
            "Registry: interposed control {control} (original procedure {:#x}), {} live",
            original.raw(),
            states.len()
        );
        Ok(state)
    }

    /*
     * Populates the editor half of a record. This happens once, right after
     * the editor window is created; a second attempt is rejected so the
     * cached direct-call capability is never replaced under a live editor.
     */
    pub(crate) fn attach_editor(
        &self,
        control: ControlHandle,
        editor: ControlHandle,
        direct_call: DirectCall,
    ) -> Result<()> {
        let mut states = self.states();
        let state = states.get_mut(&control).ok_or_else(|| {
            BridgeError::InvalidHandle(format!("control {control} is not registered"))
        })?;
        if let Some(existing) = state.editor {
            return Err(BridgeError::OperationFailed(format!(
                "control {control} already hosts editor {existing}"
            )));
        }
        state.editor = Some(editor);
        state.direct_call = Some(direct_call);
        log::debug!("Registry: control {control} now hosts editor {editor}");
        Ok(())
    }

    pub(crate) fn lookup(&self, control: ControlHandle) -> Option<ControlState> {
        self.states().get(&control).copied()
    }

    pub(crate) fn direct_call(&self, control: ControlHandle) -> Option<DirectCall> {
        self.lookup(control).and_then(|state| state.direct_call())
    }

    /*
     * Removes the record and hands the window its original procedure back
     * (when the window still exists), so later messages no longer reach the
     * interposer. Returns the removed record.
     */
    pub(crate) fn dispose(
        &self,
        control: ControlHandle,
        hooks: &dyn WindowHooks,
    ) -> Option<ControlState> {
        let mut states = self.states();
        let Some(state) = states.remove(&control) else {
            log::warn!("Registry: dispose requested for unknown control {control}");
            return None;
        };
        let restored = hooks.restore(control, state.original_procedure);
        log::debug!(
            "Registry: disposed control {control} (procedure restored: {restored}), {} live",
            states.len()
        );
        Some(state)
    }

    /// Drops the record of a window that is being destroyed; there is no procedure to restore.
    pub(crate) fn forget(&self, control: ControlHandle) -> Option<ControlState> {
        let mut states = self.states();
        let state = states.remove(&control)?;
        log::debug!(
            "Registry: control {control} destroyed without dispose, {} live",
            states.len()
        );
        Some(state)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.states().len()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Hooks that record every interposition instead of touching real windows.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingHooks {
        pub interposed: RefCell<Vec<ControlHandle>>,
        pub restored: RefCell<Vec<(ControlHandle, OriginalProcedure)>>,
        pub window_gone: bool,
        pub refuse: bool,
    }

    impl RecordingHooks {
        /// Original procedures are derived from the handle so tests can predict them.
        pub(crate) fn original_for(control: ControlHandle) -> OriginalProcedure {
            OriginalProcedure::from_raw(control.raw() * 0x10 + 1)
        }
    }

    impl WindowHooks for RecordingHooks {
        fn interpose(&self, control: ControlHandle) -> Result<OriginalProcedure> {
            if self.refuse {
                return Err(BridgeError::OperationFailed("interpose refused".to_string()));
            }
            self.interposed.borrow_mut().push(control);
            Ok(Self::original_for(control))
        }

        fn restore(&self, control: ControlHandle, original: OriginalProcedure) -> bool {
            if self.window_gone {
                return false;
            }
            self.restored.borrow_mut().push((control, original));
            true
        }
    }
}
