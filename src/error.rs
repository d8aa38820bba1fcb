/*
 * Error type shared by every layer of the bridge. Internal functions return
 * `Result<T>` and propagate with `?`; only the exported JNI entry points turn
 * a `BridgeError` into a Java exception (see `field_access::surface_error`).
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),

    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    /// A class, method or field could not be found in the managed runtime.
    #[error("JNI error: {kind} not found: {name}")]
    Unresolved { kind: &'static str, name: String },

    #[error("unable to allocate a scratch buffer of {0} bytes")]
    AllocationFailed(usize),

    #[error("JNI call failed: {0}")]
    Jni(#[from] jni::errors::Error),

    #[cfg(target_os = "windows")]
    #[error("Win32 call failed: {0}")]
    Win32(#[from] windows::core::Error),
}

impl BridgeError {
    pub(crate) fn unresolved(kind: &'static str, name: impl Into<String>) -> Self {
        BridgeError::Unresolved {
            kind,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_class_message_uses_dotted_form_given_by_caller() {
        let err = BridgeError::unresolved("Class", "org.scintilla.editor.Scintilla");
        assert_eq!(
            err.to_string(),
            "JNI error: Class not found: org.scintilla.editor.Scintilla"
        );
    }

    #[test]
    fn allocation_failure_reports_requested_size() {
        assert_eq!(
            BridgeError::AllocationFailed(42).to_string(),
            "unable to allocate a scratch buffer of 42 bytes"
        );
    }
}
