/*
 * Process-wide bridge state: configuration, the control-state table and the
 * cached runtime handles used to deliver notifications. Exported entry points
 * obtain the single instance through `Bridge::global()` and hand it down
 * explicitly; nothing below this module reaches for a global.
 */
use crate::config::BridgeConfig;
use crate::control_registry::ControlRegistry;
use crate::error::{BridgeError, Result};
use crate::field_access::JniObject;
use crate::interposer::{self, Interception, NotificationSink};
use crate::notification::NotificationRecord;
use crate::thread_context;
use crate::types::ControlHandle;

use jni::JNIEnv;
use jni::objects::{GlobalRef, JClass, JMethodID, JObject, JStaticMethodID, JValue};
use jni::signature::{Primitive, ReturnType};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

const EVENT_CONSTRUCTOR: &str = "<init>";
const EVENT_CONSTRUCTOR_SIGNATURE: &str = "()V";

static BRIDGE: OnceLock<Bridge> = OnceLock::new();

/*
 * Class and method handles for `Scintilla.dispatchNotificationEvent` and the
 * `NotificationEvent` constructor. Resolved once per VM and kept as global
 * references, so they stay valid on every thread.
 */
#[derive(Clone)]
pub(crate) struct DispatchTarget {
    host_class: GlobalRef,
    dispatch_method: JStaticMethodID,
    event_class: GlobalRef,
    event_constructor: JMethodID,
}

impl DispatchTarget {
    pub(crate) fn resolve(env: &mut JNIEnv, config: &BridgeConfig) -> Result<Self> {
        let host = find_class(env, &config.host_class)?;
        let dispatch_method = env
            .get_static_method_id(&host, &config.dispatch_method, config.dispatch_signature())
            .map_err(|_| {
                clear_pending(env);
                BridgeError::unresolved(
                    "Method",
                    format!(
                        "{}.{}",
                        BridgeConfig::dotted(&config.host_class),
                        config.dispatch_method
                    ),
                )
            })?;
        let host_class = env.new_global_ref(&host)?;
        env.delete_local_ref(host)?;

        let event = find_class(env, &config.event_class)?;
        let event_constructor = env
            .get_method_id(&event, EVENT_CONSTRUCTOR, EVENT_CONSTRUCTOR_SIGNATURE)
            .map_err(|_| {
                clear_pending(env);
                BridgeError::unresolved(
                    "Constructor",
                    format!("{}()", BridgeConfig::dotted(&config.event_class)),
                )
            })?;
        let event_class = env.new_global_ref(&event)?;
        env.delete_local_ref(event)?;

        log::debug!(
            "Bridge: resolved {}.{} and {}",
            config.host_class,
            config.dispatch_method,
            config.event_class
        );
        Ok(Self {
            host_class,
            dispatch_method,
            event_class,
            event_constructor,
        })
    }

    // The global references wrap class objects.
    fn host_class(&self) -> JClass<'_> {
        unsafe { JClass::from_raw(self.host_class.as_raw()) }
    }

    fn event_class(&self) -> JClass<'_> {
        unsafe { JClass::from_raw(self.event_class.as_raw()) }
    }
}

fn find_class<'local>(env: &mut JNIEnv<'local>, class_name: &str) -> Result<JClass<'local>> {
    env.find_class(class_name).map_err(|_| {
        clear_pending(env);
        BridgeError::unresolved("Class", BridgeConfig::dotted(class_name))
    })
}

/// Drops the VM's own lookup error so the bridge can raise a descriptive one.
fn clear_pending(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}

/*
 * Delivers notification records into the VM on the thread the window
 * procedure runs on.
 */
pub(crate) struct JniNotificationSink<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    target: &'a DispatchTarget,
}

impl<'a, 'local> JniNotificationSink<'a, 'local> {
    pub(crate) fn new(env: &'a mut JNIEnv<'local>, target: &'a DispatchTarget) -> Self {
        Self { env, target }
    }

    fn populate_and_dispatch(
        &mut self,
        event: &JObject,
        origin: ControlHandle,
        record: &NotificationRecord,
    ) -> Result<()> {
        record.apply_to(&mut JniObject::new(self.env, event))?;
        let host_class = self.target.host_class();
        unsafe {
            self.env.call_static_method_unchecked(
                &host_class,
                self.target.dispatch_method,
                ReturnType::Primitive(Primitive::Void),
                &[
                    JValue::Int(origin.to_jint()).as_jni(),
                    JValue::Object(event).as_jni(),
                ],
            )
        }?;
        Ok(())
    }
}

impl NotificationSink for JniNotificationSink<'_, '_> {
    fn exception_pending(&mut self) -> bool {
        self.env.exception_check().unwrap_or(true)
    }

    fn deliver(&mut self, origin: ControlHandle, record: &NotificationRecord) -> Result<()> {
        let event_class = self.target.event_class();
        let event = unsafe {
            self.env
                .new_object_unchecked(&event_class, self.target.event_constructor, &[])
        }?;
        let outcome = self.populate_and_dispatch(&event, origin, record);
        self.env.delete_local_ref(event)?;
        outcome
    }
}

pub struct Bridge {
    config: BridgeConfig,
    registry: ControlRegistry,
    dispatch: Mutex<Option<DispatchTarget>>,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            registry: ControlRegistry::new(),
            dispatch: Mutex::new(None),
        }
    }

    /// The instance used by the exported entry points, configured from the environment.
    pub fn global() -> &'static Bridge {
        BRIDGE.get_or_init(|| Bridge::new(BridgeConfig::from_env()))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    fn dispatch(&self) -> MutexGuard<'_, Option<DispatchTarget>> {
        self.dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn dispatch_target(&self) -> Option<DispatchTarget> {
        self.dispatch().clone()
    }

    /*
     * Binds the calling thread to `env` and makes sure the dispatch handles
     * are resolved. Resolution happens outside the lock (class loading may
     * run Java static initializers); if two threads race, the first result
     * stored wins and the other is dropped.
     */
    pub(crate) fn bind_context(&self, env: &mut JNIEnv) -> Result<()> {
        thread_context::store(env);
        if self.dispatch().is_some() {
            return Ok(());
        }
        let resolved = DispatchTarget::resolve(env, &self.config)?;
        self.dispatch().get_or_insert(resolved);
        Ok(())
    }

    /// Drops the cached global references. Called when the VM unloads the library.
    pub(crate) fn release_dispatch_target(&self) {
        if self.dispatch().take().is_some() {
            log::debug!("Bridge: released cached dispatch handles");
        }
    }

    /*
     * Entry of the interposed window procedure. Recovers the runtime context
     * bound to the current thread; a thread without one, or a bridge whose
     * dispatch handles are not resolved, counts as unbound.
     *
     * # Safety
     * Same contract as `interposer::intercept`.
     */
    pub(crate) unsafe fn intercept_message(
        &self,
        control: ControlHandle,
        message: u32,
        lparam: isize,
    ) -> Interception {
        let env = thread_context::load()
            .and_then(|raw| unsafe { JNIEnv::from_raw(raw.as_ptr()) }.ok());
        let target = self.dispatch_target();
        match (env, target) {
            (Some(mut env), Some(target)) => {
                let mut sink = JniNotificationSink::new(&mut env, &target);
                unsafe { interposer::intercept(&self.registry, Some(&mut sink), control, message, lparam) }
            }
            _ => unsafe {
                interposer::intercept::<JniNotificationSink>(&self.registry, None, control, message, lparam)
            },
        }
    }
}

#[cfg(target_os = "windows")]
mod windowing {
    use super::*;
    use crate::controls::host_subclass::Win32WindowHooks;
    use crate::controls::scintilla_handler;
    use crate::window_common;

    impl Bridge {
        /*
         * Creates the editor as a child of `parent`, binds the calling thread's
         * context, interposes the parent's message procedure and caches the
         * editor's direct-call pair. Returns the editor handle.
         */
        pub(crate) fn create_control(
            &self,
            env: &mut JNIEnv,
            parent: ControlHandle,
        ) -> Result<ControlHandle> {
            if let Some(existing) = self.registry.lookup(parent).and_then(|s| s.editor()) {
                return Err(BridgeError::OperationFailed(format!(
                    "control {parent} already hosts editor {existing}"
                )));
            }

            let editor = scintilla_handler::create_editor_window(&self.config, parent)?;
            let hosted = self
                .bind_context(env)
                .and_then(|()| self.registry.get_or_create(parent, &Win32WindowHooks))
                .and_then(|_| {
                    let direct_call = scintilla_handler::query_direct_call(editor)?;
                    self.registry.attach_editor(parent, editor, direct_call)
                });
            if let Err(err) = hosted {
                log::warn!("Bridge: hosting editor {editor} in {parent} failed, destroying it");
                scintilla_handler::destroy_editor_window(editor);
                return Err(err);
            }

            log::info!("Bridge: created editor {editor} in control {parent}");
            Ok(editor)
        }

        pub(crate) fn resize_control(
            &self,
            editor: ControlHandle,
            x: i32,
            y: i32,
            width: i32,
            height: i32,
        ) -> Result<()> {
            window_common::move_window(editor, x, y, width, height)
        }

        pub(crate) fn focus_control(&self, editor: ControlHandle) -> Result<()> {
            window_common::focus_window(editor)
        }

        pub(crate) fn dispose_control(&self, control: ControlHandle) {
            if self.registry.dispose(control, &Win32WindowHooks).is_some() {
                log::info!("Bridge: disposed control {control}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bridge_starts_without_controls_or_dispatch_handles() {
        let bridge = Bridge::new(BridgeConfig::default());
        assert_eq!(bridge.registry().len(), 0);
        assert!(bridge.dispatch_target().is_none());
        assert_eq!(bridge.config().editor_class, "Scintilla");
    }

    #[test]
    fn release_without_resolution_is_harmless() {
        let bridge = Bridge::new(BridgeConfig::default());
        bridge.release_dispatch_target();
        assert!(bridge.dispatch_target().is_none());
    }

    #[test]
    fn message_on_unbound_thread_for_unknown_control_is_unhandled() {
        // Arrange
        let bridge = Bridge::new(BridgeConfig::default());
        thread_context::clear();
        // Act
        let outcome = unsafe {
            bridge.intercept_message(ControlHandle::from_raw(0x10), interposer::WM_NOTIFY, 0)
        };
        // Assert
        assert_eq!(outcome, Interception::Unhandled);
    }
}
