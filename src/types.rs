/*
 * Platform-neutral value types passed between the bridge layers. Window
 * handles travel through Java as `int`, so `ControlHandle` owns the widening
 * and narrowing rules in one place. `DirectCall` is the editor's fast-path
 * command capability, captured once per control and copied out of the
 * registry for each call.
 */
use jni::sys::jint;
use std::fmt;

/// Native window handle, stored pointer-sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlHandle(isize);

impl ControlHandle {
    pub const NULL: ControlHandle = ControlHandle(0);

    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    /// Java passes handles as `int`; Win32 handles are sign-extended 32-bit values.
    pub const fn from_jint(raw: jint) -> Self {
        Self(raw as isize)
    }

    pub const fn raw(self) -> isize {
        self.0
    }

    pub const fn to_jint(self) -> jint {
        self.0 as jint
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Address of the message procedure a control had before interposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalProcedure(isize);

impl OriginalProcedure {
    pub const fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> isize {
        self.0
    }
}

/// Signature of Scintilla's `SciFnDirect`.
pub type DirectFunction = unsafe extern "C" fn(isize, u32, usize, isize) -> isize;

/*
 * Function + context pair returned by SCI_GETDIRECTFUNCTION and
 * SCI_GETDIRECTPOINTER. Fields are private: the only way to obtain one is the
 * unsafe constructors, whose callers vouch that the pair came from a live
 * editor window.
 */
#[derive(Clone, Copy)]
pub struct DirectCall {
    function: DirectFunction,
    context: isize,
}

impl DirectCall {
    /// # Safety
    /// `function` must be callable with `context` for as long as the value is used.
    pub unsafe fn new(function: DirectFunction, context: isize) -> Self {
        Self { function, context }
    }

    /// Builds the pair from the raw integers the editor hands out. Returns
    /// `None` when the function address is null.
    ///
    /// # Safety
    /// A non-zero `function` must be the address of a `SciFnDirect`.
    pub unsafe fn from_raw(function: isize, context: isize) -> Option<Self> {
        if function == 0 {
            return None;
        }
        let function = unsafe { std::mem::transmute::<isize, DirectFunction>(function) };
        Some(Self { function, context })
    }

    /// # Safety
    /// Pointer-valued parameters must stay valid for the duration of the call.
    pub unsafe fn call(&self, message: u32, wparam: usize, lparam: isize) -> isize {
        unsafe { (self.function)(self.context, message, wparam, lparam) }
    }

    #[cfg(test)]
    pub(crate) fn context(&self) -> isize {
        self.context
    }
}

impl fmt::Debug for DirectCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectCall")
            .field("function", &(self.function as usize as *const ()))
            .field("context", &format_args!("{:#x}", self.context))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn echo_message(context: isize, message: u32, wparam: usize, lparam: isize) -> isize {
        context + message as isize + wparam as isize + lparam
    }

    #[test]
    fn handle_round_trips_negative_jint() {
        let handle = ControlHandle::from_jint(-2);
        assert_eq!(handle.raw(), -2);
        assert_eq!(handle.to_jint(), -2);
        assert!(!handle.is_null());
        assert!(ControlHandle::from_jint(0).is_null());
    }

    #[test]
    fn direct_call_from_null_address_is_none() {
        assert!(unsafe { DirectCall::from_raw(0, 0x10) }.is_none());
    }

    #[test]
    fn direct_call_passes_context_first() {
        let call = unsafe { DirectCall::from_raw(echo_message as usize as isize, 1000) }
            .expect("non-null function");
        assert_eq!(unsafe { call.call(2001, 20, 3) }, 1000 + 2001 + 20 + 3);
        assert_eq!(call.context(), 1000);
    }
}
