/*
 * Provides the native half of the `org.scintilla.editor` Java binding: a JNI
 * bridge that hosts the Scintilla editor control inside a Java-owned Win32
 * window. The bridge tracks one state record per hosted control, forwards
 * the editor's WM_NOTIFY traffic to Java as `NotificationEvent` objects, and
 * marshals `sendMessage` calls (plain, string, text buffer, text range and
 * find-text payloads) onto the editor's direct-call function.
 *
 * Conditional compilation keeps the portable pieces (state table, marshaling,
 * notification translation, JNI plumbing) available on every platform so
 * non-Windows builds can still compile and test them; window creation,
 * subclassing and the DLL entry point exist only on Windows.
 */
pub mod bridge;
pub(crate) mod command_executor;
pub mod config;
pub(crate) mod control_registry;
#[cfg(target_os = "windows")]
pub(crate) mod controls;
pub mod error;
pub mod exports;
pub mod field_access;
pub(crate) mod interposer;
pub mod lifecycle;
pub mod notification;
pub mod scintilla;
pub(crate) mod scratch;
pub(crate) mod thread_context;
pub mod types;
#[cfg(target_os = "windows")]
pub(crate) mod window_common;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result as BridgeResult};
pub use field_access::{JniObject, ManagedObject};
pub use notification::{FieldValue, NotificationRecord};
pub use types::{ControlHandle, DirectCall, DirectFunction};
