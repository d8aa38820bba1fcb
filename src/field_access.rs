/*
 * Reflection-style access to named fields of managed objects. Fields are
 * resolved against the class of the actual instance (JNI GetObjectClass +
 * GetFieldID), never against a statically known class, so subclasses on the
 * Java side keep working. Failures are not masked: a missing field leaves the
 * VM's NoSuchFieldError pending and surfaces here as an `Err`.
 */
use crate::error::{BridgeError, Result};

use jni::JNIEnv;
use jni::objects::{JObject, JString, JValue};

const INT_SIGNATURE: &str = "I";
const STRING_SIGNATURE: &str = "Ljava/lang/String;";
const RUNTIME_EXCEPTION_CLASS: &str = "java/lang/RuntimeException";

/// Named `int` and `String` fields of one managed object.
pub trait ManagedObject {
    fn get_int(&mut self, name: &str) -> Result<i32>;
    fn set_int(&mut self, name: &str, value: i32) -> Result<()>;
    /// `Ok(None)` when the field holds `null`.
    fn get_string(&mut self, name: &str) -> Result<Option<String>>;
    fn set_string(&mut self, name: &str, value: Option<&str>) -> Result<()>;
}

pub struct JniObject<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
    object: &'a JObject<'a>,
}

impl<'a, 'local> JniObject<'a, 'local> {
    pub fn new(env: &'a mut JNIEnv<'local>, object: &'a JObject<'a>) -> Self {
        Self { env, object }
    }
}

impl ManagedObject for JniObject<'_, '_> {
    fn get_int(&mut self, name: &str) -> Result<i32> {
        Ok(self.env.get_field(self.object, name, INT_SIGNATURE)?.i()?)
    }

    fn set_int(&mut self, name: &str, value: i32) -> Result<()> {
        self.env
            .set_field(self.object, name, INT_SIGNATURE, JValue::Int(value))?;
        Ok(())
    }

    fn get_string(&mut self, name: &str) -> Result<Option<String>> {
        let value = self.env.get_field(self.object, name, STRING_SIGNATURE)?.l()?;
        if value.is_null() {
            return Ok(None);
        }
        let value = JString::from(value);
        let text: String = self.env.get_string(&value)?.into();
        self.env.delete_local_ref(value)?;
        Ok(Some(text))
    }

    fn set_string(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(text) => {
                let value = self.env.new_string(text)?;
                self.env
                    .set_field(self.object, name, STRING_SIGNATURE, JValue::Object(&value))?;
                self.env.delete_local_ref(value)?;
            }
            None => {
                self.env.set_field(
                    self.object,
                    name,
                    STRING_SIGNATURE,
                    JValue::Object(&JObject::null()),
                )?;
            }
        }
        Ok(())
    }
}

/*
 * Raises a java.lang.RuntimeException carrying `message`. If the exception
 * class itself cannot be thrown, the message is only logged; there is no
 * further channel back to the caller.
 */
pub fn report_error(env: &mut JNIEnv, message: &str) {
    if let Err(err) = env.throw_new(RUNTIME_EXCEPTION_CLASS, message) {
        log::error!("JNI error: Unable to throw RuntimeException ({err}). {message}");
    }
}

/*
 * Converts an error from an exported entry point into the runtime channel.
 * An exception the VM already raised (NoSuchFieldError, OutOfMemoryError, ...)
 * is more precise than anything we could throw, so it is left in place.
 */
pub(crate) fn surface_error(env: &mut JNIEnv, operation: &str, err: &BridgeError) {
    log::warn!("Exports: {operation} failed: {err}");
    if env.exception_check().unwrap_or(true) {
        return;
    }
    report_error(env, &err.to_string());
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory stand-in for a Java object with a fixed field schema.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct FakeObject {
        pub ints: HashMap<String, i32>,
        pub strings: HashMap<String, Option<String>>,
    }

    impl FakeObject {
        pub(crate) fn with_ints(fields: &[(&str, i32)]) -> Self {
            let mut object = Self::default();
            for (name, value) in fields {
                object.ints.insert(name.to_string(), *value);
            }
            object
        }

        pub(crate) fn declare_string(mut self, name: &str, value: Option<&str>) -> Self {
            self.strings
                .insert(name.to_string(), value.map(str::to_string));
            self
        }

        pub(crate) fn int(&self, name: &str) -> Option<i32> {
            self.ints.get(name).copied()
        }

        pub(crate) fn string(&self, name: &str) -> Option<&str> {
            self.strings.get(name).and_then(|v| v.as_deref())
        }
    }

    impl ManagedObject for FakeObject {
        fn get_int(&mut self, name: &str) -> Result<i32> {
            self.ints
                .get(name)
                .copied()
                .ok_or_else(|| BridgeError::unresolved("Field", name))
        }

        fn set_int(&mut self, name: &str, value: i32) -> Result<()> {
            match self.ints.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(BridgeError::unresolved("Field", name)),
            }
        }

        fn get_string(&mut self, name: &str) -> Result<Option<String>> {
            self.strings
                .get(name)
                .cloned()
                .ok_or_else(|| BridgeError::unresolved("Field", name))
        }

        fn set_string(&mut self, name: &str, value: Option<&str>) -> Result<()> {
            match self.strings.get_mut(name) {
                Some(slot) => {
                    *slot = value.map(str::to_string);
                    Ok(())
                }
                None => Err(BridgeError::unresolved("Field", name)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeObject;
    use super::*;

    #[test]
    fn fake_object_rejects_undeclared_fields() {
        let mut object = FakeObject::with_ints(&[("handle", 7)]);
        assert_eq!(object.get_int("handle").unwrap(), 7);
        assert!(matches!(
            object.set_int("capacity", 1),
            Err(BridgeError::Unresolved { kind: "Field", .. })
        ));
        assert!(object.get_string("text").is_err());
    }

    #[test]
    fn fake_object_stores_null_strings() {
        let mut object = FakeObject::default().declare_string("text", Some("old"));
        object.set_string("text", None).unwrap();
        assert_eq!(object.get_string("text").unwrap(), None);
    }
}
