/*
 * Native methods of `org.scintilla.editor.Scintilla`. Each export resolves
 * its arguments, runs one bridge operation and converts a failure into a
 * pending Java exception; nothing here returns a `Result` to the VM.
 *
 * Word and long parameters arrive as Java `int` and are sign-extended to
 * pointer width, so `-1` reaches the editor as -1.
 */
#![allow(non_snake_case)]

use crate::bridge::Bridge;
use crate::command_executor::{
    execute_raw_send, execute_send_find_text, execute_send_text, execute_send_text_out,
    execute_send_text_range, execute_send_texts, resolve_control,
};
use crate::error::Result as BridgeResult;
use crate::field_access::{JniObject, surface_error};
use crate::types::ControlHandle;

use jni::JNIEnv;
use jni::objects::{JObject, JString};
use jni::sys::jint;

fn wide(param: jint) -> usize {
    param as isize as usize
}

fn result_to_jint(result: isize) -> jint {
    result as jint
}

/// Runs `operation`, turning an error into a Java exception and `fallback`.
fn run_or_throw<T>(
    env: &mut JNIEnv,
    name: &str,
    fallback: T,
    operation: impl FnOnce(&mut JNIEnv) -> BridgeResult<T>,
) -> T {
    match operation(env) {
        Ok(value) => value,
        Err(err) => {
            surface_error(env, name, &err);
            fallback
        }
    }
}

fn host_control(env: &mut JNIEnv, host: &JObject) -> BridgeResult<ControlHandle> {
    resolve_control(&mut JniObject::new(env, host))
}

/// Decodes a Java string out of its modified UTF-8 form; `None` for a null reference.
fn native_string(env: &mut JNIEnv, text: &JString) -> BridgeResult<Option<String>> {
    if text.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_string(text)?.into()))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_scintilla_editor_Scintilla_sendMessage__III<'local>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    message: jint,
    wparam: jint,
    lparam: jint,
) -> jint {
    let bridge = Bridge::global();
    run_or_throw(&mut env, "sendMessage(int,int,int)", 0, |env| {
        let result = execute_raw_send(
            bridge.registry(),
            &mut JniObject::new(env, &this),
            message as u32,
            wide(wparam),
            lparam as isize,
        )?;
        Ok(result_to_jint(result))
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_scintilla_editor_Scintilla_sendMessage__IILjava_lang_String_2<
    'local,
>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    message: jint,
    wparam: jint,
    lparam: JString<'local>,
) -> jint {
    let bridge = Bridge::global();
    run_or_throw(&mut env, "sendMessage(int,int,String)", 0, |env| {
        let control = host_control(env, &this)?;
        let text = native_string(env, &lparam)?;
        let result = execute_send_text(
            bridge.registry(),
            control,
            message as u32,
            wide(wparam),
            text.as_deref(),
        )?;
        Ok(result_to_jint(result))
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_scintilla_editor_Scintilla_sendMessage__ILjava_lang_String_2Ljava_lang_String_2<
    'local,
>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    message: jint,
    wparam: JString<'local>,
    lparam: JString<'local>,
) -> jint {
    let bridge = Bridge::global();
    run_or_throw(&mut env, "sendMessage(int,String,String)", 0, |env| {
        let control = host_control(env, &this)?;
        let wtext = native_string(env, &wparam)?;
        let ltext = native_string(env, &lparam)?;
        let result = execute_send_texts(
            bridge.registry(),
            control,
            message as u32,
            wtext.as_deref(),
            ltext.as_deref(),
        )?;
        Ok(result_to_jint(result))
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_scintilla_editor_Scintilla_sendMessage__IILorg_scintilla_editor_CText_2<
    'local,
>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    message: jint,
    wparam: jint,
    text: JObject<'local>,
) -> jint {
    let bridge = Bridge::global();
    run_or_throw(&mut env, "sendMessage(int,int,CText)", 0, |env| {
        let control = host_control(env, &this)?;
        let result = execute_send_text_out(
            bridge.registry(),
            control,
            message as u32,
            wide(wparam),
            &mut JniObject::new(env, &text),
        )?;
        Ok(result_to_jint(result))
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_scintilla_editor_Scintilla_sendMessage__IILorg_scintilla_editor_TextRange_2<
    'local,
>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    message: jint,
    wparam: jint,
    range: JObject<'local>,
) -> jint {
    let bridge = Bridge::global();
    run_or_throw(&mut env, "sendMessage(int,int,TextRange)", 0, |env| {
        let control = host_control(env, &this)?;
        let result = execute_send_text_range(
            bridge.registry(),
            control,
            message as u32,
            wide(wparam),
            &mut JniObject::new(env, &range),
        )?;
        Ok(result_to_jint(result))
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_org_scintilla_editor_Scintilla_sendMessage__IILorg_scintilla_editor_FindText_2<
    'local,
>(
    mut env: JNIEnv<'local>,
    this: JObject<'local>,
    message: jint,
    wparam: jint,
    find: JObject<'local>,
) -> jint {
    let bridge = Bridge::global();
    run_or_throw(&mut env, "sendMessage(int,int,FindText)", 0, |env| {
        let control = host_control(env, &this)?;
        let result = execute_send_find_text(
            bridge.registry(),
            control,
            message as u32,
            wide(wparam),
            &mut JniObject::new(env, &find),
        )?;
        Ok(result_to_jint(result))
    })
}

#[cfg(target_os = "windows")]
mod windowing {
    use super::*;
    use jni::objects::JClass;

    /// Returns the editor handle, or 0 when the editor could not be created.
    #[unsafe(no_mangle)]
    pub extern "system" fn Java_org_scintilla_editor_Scintilla_createControl<'local>(
        mut env: JNIEnv<'local>,
        _class: JClass<'local>,
        control: jint,
    ) -> jint {
        let bridge = Bridge::global();
        run_or_throw(&mut env, "createControl", 0, |env| {
            let editor = bridge.create_control(env, ControlHandle::from_jint(control))?;
            Ok(editor.to_jint())
        })
    }

    #[unsafe(no_mangle)]
    pub extern "system" fn Java_org_scintilla_editor_Scintilla_resizeControl<'local>(
        mut env: JNIEnv<'local>,
        _class: JClass<'local>,
        editor: jint,
        x: jint,
        y: jint,
        width: jint,
        height: jint,
    ) {
        let bridge = Bridge::global();
        run_or_throw(&mut env, "resizeControl", (), |_| {
            bridge.resize_control(ControlHandle::from_jint(editor), x, y, width, height)
        })
    }

    #[unsafe(no_mangle)]
    pub extern "system" fn Java_org_scintilla_editor_Scintilla_setFocus<'local>(
        mut env: JNIEnv<'local>,
        _class: JClass<'local>,
        editor: jint,
    ) {
        let bridge = Bridge::global();
        run_or_throw(&mut env, "setFocus", (), |_| {
            bridge.focus_control(ControlHandle::from_jint(editor))
        })
    }

    #[unsafe(no_mangle)]
    pub extern "system" fn Java_org_scintilla_editor_Scintilla_disposeControl<'local>(
        _env: JNIEnv<'local>,
        _class: JClass<'local>,
        control: jint,
    ) {
        Bridge::global().dispose_control(ControlHandle::from_jint(control));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_parameters_are_sign_extended() {
        assert_eq!(wide(-1), usize::MAX);
        assert_eq!(wide(7), 7);
    }

    #[test]
    fn results_are_narrowed_to_java_int() {
        assert_eq!(result_to_jint(-1), -1);
        assert_eq!(result_to_jint(42), 42);
    }
}
