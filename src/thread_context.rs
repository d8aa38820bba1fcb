/*
 * Thread-local binding of the JNI environment. Window procedures are plain
 * `extern "system"` functions with no user-data parameter, so the interposer
 * recovers the environment of the thread it runs on from here. A thread that
 * never called into the bridge has no binding, and messages delivered on it
 * are dropped by the interposer.
 */
use jni::JNIEnv;
use jni::sys;
use std::cell::Cell;
use std::ptr::NonNull;

thread_local! {
    static BOUND_ENV: Cell<Option<NonNull<sys::JNIEnv>>> = const { Cell::new(None) };
}

/// Binds the calling thread to `env`, replacing any earlier binding.
pub(crate) fn store(env: &JNIEnv) {
    bind_raw(NonNull::new(env.get_raw()));
}

pub(crate) fn bind_raw(env: Option<NonNull<sys::JNIEnv>>) {
    BOUND_ENV.with(|slot| slot.set(env));
}

/// The environment bound to the calling thread, if any.
pub(crate) fn load() -> Option<NonNull<sys::JNIEnv>> {
    BOUND_ENV.with(Cell::get)
}

pub(crate) fn clear() {
    bind_raw(None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_thread_loads_nothing() {
        clear();
        assert!(load().is_none());
    }

    #[test]
    fn binding_is_visible_only_on_storing_thread() {
        // Arrange
        let marker = NonNull::<sys::JNIEnv>::dangling();
        bind_raw(Some(marker));
        // Act
        let seen_elsewhere = std::thread::spawn(|| load().is_some())
            .join()
            .expect("probe thread");
        // Assert
        assert_eq!(load(), Some(marker));
        assert!(!seen_elsewhere);
        clear();
    }
}
