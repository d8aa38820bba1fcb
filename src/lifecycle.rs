/*
 * Library lifecycle hooks. The VM calls `JNI_OnLoad`/`JNI_OnUnload`; the
 * Windows loader calls `DllMain`, which keeps the module instance (used as
 * the editor window's instance) and holds the lexer library for as long as
 * the bridge is mapped.
 */
use crate::bridge::Bridge;
use crate::config::{DEFAULT_LOG_FILTER, ENV_LOG_FILTER};
use crate::thread_context;

use jni::JavaVM;
use jni::sys::{JNI_VERSION_1_6, jint};
use std::ffi::c_void;

/*
 * Installs the `env_logger` backend, filtered by `SCIJNI_LOG`. A host that
 * already installed a logger keeps it.
 */
pub fn init_logging() {
    let env = env_logger::Env::default().filter_or(ENV_LOG_FILTER, DEFAULT_LOG_FILTER);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Lifecycle: a logger is already installed, keeping it");
    }
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    init_logging();
    log::info!(
        "Lifecycle: scintilla-jni {} loaded",
        env!("CARGO_PKG_VERSION")
    );
    JNI_VERSION_1_6
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnUnload(_vm: JavaVM, _reserved: *mut c_void) {
    Bridge::global().release_dispatch_target();
    thread_context::clear();
    log::info!("Lifecycle: unloaded");
}

#[cfg(target_os = "windows")]
pub(crate) use self::windows_module::module_instance;

#[cfg(target_os = "windows")]
mod windows_module {
    use super::*;
    use crate::error::{BridgeError, Result as BridgeResult};

    use std::sync::{Mutex, MutexGuard, PoisonError};
    use windows::Win32::{
        Foundation::{FreeLibrary, HINSTANCE, HMODULE},
        System::LibraryLoader::{GetModuleHandleW, LoadLibraryW},
        System::SystemServices::{DLL_PROCESS_ATTACH, DLL_PROCESS_DETACH},
    };
    use windows::core::{BOOL, HSTRING};

    /// Raw handles captured at process attach; 0 when not (yet) known.
    struct LoadedModule {
        instance: isize,
        lexer: isize,
    }

    static LOADED: Mutex<LoadedModule> = Mutex::new(LoadedModule {
        instance: 0,
        lexer: 0,
    });

    fn loaded() -> MutexGuard<'static, LoadedModule> {
        LOADED.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /*
     * Instance handle for windows the bridge creates. When the crate is used
     * as a plain Rust library no DllMain ran, so the process module stands in.
     */
    pub(crate) fn module_instance() -> BridgeResult<HINSTANCE> {
        let instance = loaded().instance;
        if instance != 0 {
            return Ok(HINSTANCE(instance as *mut c_void));
        }
        let module = unsafe { GetModuleHandleW(None) }.map_err(|err| {
            BridgeError::InitializationFailed(format!("no module instance available: {err}"))
        })?;
        Ok(HINSTANCE(module.0))
    }

    fn attach(dll_module: HINSTANCE) -> bool {
        let lexer_library = &Bridge::global().config().lexer_library;
        match unsafe { LoadLibraryW(&HSTRING::from(lexer_library.as_str())) } {
            Ok(lexer) => {
                let mut loaded = loaded();
                loaded.instance = dll_module.0 as isize;
                loaded.lexer = lexer.0 as isize;
                true
            }
            Err(err) => {
                log::error!("Lifecycle: unable to load {lexer_library}: {err}");
                false
            }
        }
    }

    fn detach() {
        let lexer = std::mem::replace(&mut loaded().lexer, 0);
        if lexer != 0 {
            if let Err(err) = unsafe { FreeLibrary(HMODULE(lexer as *mut c_void)) } {
                log::warn!("Lifecycle: FreeLibrary for the lexer failed: {err}");
            }
        }
    }

    #[allow(non_snake_case)]
    #[unsafe(no_mangle)]
    pub extern "system" fn DllMain(
        dll_module: HINSTANCE,
        call_reason: u32,
        _reserved: *mut c_void,
    ) -> BOOL {
        match call_reason {
            DLL_PROCESS_ATTACH => BOOL::from(attach(dll_module)),
            DLL_PROCESS_DETACH => {
                detach();
                BOOL::from(true)
            }
            _ => BOOL::from(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_can_be_initialized_twice() {
        init_logging();
        init_logging();
        log::debug!("Lifecycle: test logger active");
    }
}
