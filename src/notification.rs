/*
 * Translation of a Scintilla WM_NOTIFY payload into the flat record handed to
 * Java. The record is built natively as an ordered list of named values, then
 * written field by field onto a fresh `NotificationEvent` instance through
 * the field accessor. Which fields are present depends only on the event
 * code; the three header fields are always present.
 */
use crate::error::Result;
use crate::field_access::ManagedObject;
use crate::scintilla::{
    NotifyHeader, SCN_CALLTIPCLICK, SCN_CHARADDED, SCN_DWELLEND, SCN_DWELLSTART,
    SCN_HOTSPOTCLICK, SCN_HOTSPOTDOUBLECLICK, SCN_KEY, SCN_MACRORECORD, SCN_MARGINCLICK,
    SCN_MODIFIED, SCN_STYLENEEDED, SCN_USERLISTSELECTION, ScNotification,
};
use crate::scratch::ScratchBuffer;

use std::ffi::c_char;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i32),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRecord {
    fields: Vec<(&'static str, FieldValue)>,
}

impl NotificationRecord {
    /// Record holding only `hwndFrom`, `idFrom` and `code`.
    pub fn from_header(header: &NotifyHeader) -> Self {
        let mut record = Self::default();
        record.set_int("hwndFrom", header.hwnd_from as i32);
        record.set_int("idFrom", header.id_from as i32);
        record.set_int("code", header.code as i32);
        record
    }

    /*
     * Builds the record for a full Scintilla notification.
     *
     * # Safety
     * For SCN_MODIFIED, a non-null `notification.text` must point to at least
     * `notification.length` readable bytes. Scintilla does not terminate that
     * buffer, so exactly `length` bytes are copied.
     */
    pub unsafe fn from_notification(notification: &ScNotification) -> Result<Self> {
        let mut record = Self::from_header(&notification.header);
        let n = notification;
        match n.header.code {
            SCN_CALLTIPCLICK | SCN_STYLENEEDED => {
                record.set_int("position", n.position as i32);
            }
            SCN_CHARADDED => {
                record.set_int("ch", n.ch);
            }
            SCN_KEY => {
                record.set_int("ch", n.ch);
                record.set_int("modifiers", n.modifiers);
            }
            SCN_MODIFIED => {
                record.set_int("position", n.position as i32);
                record.set_int("modificationType", n.modification_type);
                if let Some(text) = unsafe { payload_text(n.text, n.length) }? {
                    record.set_text("text", text);
                }
                record.set_int("length", n.length as i32);
                record.set_int("linesAdded", n.lines_added as i32);
                record.set_int("line", n.line as i32);
                record.set_int("foldLevelNow", n.fold_level_now);
                record.set_int("foldLevelPrev", n.fold_level_prev);
            }
            SCN_MACRORECORD => {
                record.set_int("message", n.message);
                record.set_int("wParam", n.w_param as i32);
                record.set_int("lParam", n.l_param as i32);
            }
            SCN_MARGINCLICK => {
                record.set_int("margin", n.margin);
            }
            SCN_USERLISTSELECTION => {
                record.set_int("listType", n.list_type);
            }
            SCN_DWELLSTART | SCN_DWELLEND => {
                record.set_int("position", n.position as i32);
                record.set_int("x", n.x);
                record.set_int("y", n.y);
            }
            SCN_HOTSPOTCLICK | SCN_HOTSPOTDOUBLECLICK => {
                record.set_int("position", n.position as i32);
                record.set_int("modifiers", n.modifiers);
            }
            other => {
                log::trace!("Notification: code {other} carries header fields only");
            }
        }
        Ok(record)
    }

    fn set_int(&mut self, name: &'static str, value: i32) {
        self.fields.push((name, FieldValue::Int(value)));
    }

    fn set_text(&mut self, name: &'static str, value: String) {
        self.fields.push((name, FieldValue::Text(value)));
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        self.fields.iter().find_map(|(field, value)| match value {
            FieldValue::Int(v) if *field == name => Some(*v),
            _ => None,
        })
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|(field, value)| match value {
            FieldValue::Text(v) if *field == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// Writes every field onto a managed `NotificationEvent` instance.
    pub fn apply_to(&self, target: &mut impl ManagedObject) -> Result<()> {
        for (name, value) in &self.fields {
            match value {
                FieldValue::Int(v) => target.set_int(name, *v)?,
                FieldValue::Text(v) => target.set_string(name, Some(v))?,
            }
        }
        Ok(())
    }
}

/*
 * Copies `length` bytes of a modification payload into a NUL-terminated
 * scratch buffer and decodes it. The copy is what makes the payload safe to
 * read as a C string; Scintilla's own buffer has no terminator.
 */
unsafe fn payload_text(text: *const c_char, length: isize) -> Result<Option<String>> {
    if text.is_null() {
        return Ok(None);
    }
    let len = usize::try_from(length).unwrap_or(0);
    let bytes = unsafe { std::slice::from_raw_parts(text.cast::<u8>(), len) };
    let buffer = ScratchBuffer::terminated(bytes)?;
    Ok(Some(buffer.to_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_access::testing::FakeObject;

    const BASE: [&str; 3] = ["hwndFrom", "idFrom", "code"];

    fn notification(code: u32) -> ScNotification {
        ScNotification {
            header: NotifyHeader {
                hwnd_from: 0x1234,
                id_from: 7,
                code,
            },
            position: 42,
            ch: 'a' as i32,
            modifiers: 2,
            modification_type: 1,
            length: 0,
            lines_added: 3,
            message: 2170,
            w_param: 5,
            l_param: 6,
            line: 9,
            fold_level_now: 1024,
            fold_level_prev: 1025,
            margin: 1,
            list_type: 4,
            x: 10,
            y: 20,
            ..Default::default()
        }
    }

    fn names_for(code: u32) -> Vec<&'static str> {
        unsafe { NotificationRecord::from_notification(&notification(code)) }
            .unwrap()
            .field_names()
    }

    fn expected(extra: &[&'static str]) -> Vec<&'static str> {
        BASE.iter().chain(extra).copied().collect()
    }

    #[test]
    fn every_event_code_gets_its_field_set() {
        let table: &[(u32, &[&'static str])] = &[
            (SCN_CALLTIPCLICK, &["position"]),
            (SCN_STYLENEEDED, &["position"]),
            (SCN_CHARADDED, &["ch"]),
            (SCN_KEY, &["ch", "modifiers"]),
            (
                SCN_MODIFIED,
                &[
                    "position",
                    "modificationType",
                    "length",
                    "linesAdded",
                    "line",
                    "foldLevelNow",
                    "foldLevelPrev",
                ],
            ),
            (SCN_MACRORECORD, &["message", "wParam", "lParam"]),
            (SCN_MARGINCLICK, &["margin"]),
            (SCN_USERLISTSELECTION, &["listType"]),
            (SCN_DWELLSTART, &["position", "x", "y"]),
            (SCN_DWELLEND, &["position", "x", "y"]),
            (SCN_HOTSPOTCLICK, &["position", "modifiers"]),
            (SCN_HOTSPOTDOUBLECLICK, &["position", "modifiers"]),
        ];
        for (code, extra) in table {
            assert_eq!(names_for(*code), expected(extra), "event code {code}");
        }
    }

    #[test]
    fn unknown_code_gets_header_fields_only() {
        assert_eq!(names_for(2007), expected(&[]));
        assert_eq!(names_for(0), expected(&[]));
    }

    #[test]
    fn header_fields_carry_origin() {
        let record = unsafe { NotificationRecord::from_notification(&notification(SCN_KEY)) }.unwrap();
        assert_eq!(record.int("hwndFrom"), Some(0x1234));
        assert_eq!(record.int("idFrom"), Some(7));
        assert_eq!(record.int("code"), Some(SCN_KEY as i32));
        assert_eq!(record.int("ch"), Some('a' as i32));
    }

    #[test]
    fn modified_text_is_cut_to_reported_length() {
        // Arrange: payload is longer than the reported length and unterminated.
        let payload = *b"hello world";
        let mut n = notification(SCN_MODIFIED);
        n.text = payload.as_ptr().cast();
        n.length = 5;
        // Act
        let record = unsafe { NotificationRecord::from_notification(&n) }.unwrap();
        // Assert
        assert_eq!(record.text("text"), Some("hello"));
        assert_eq!(record.int("length"), Some(5));
        assert_eq!(
            record.field_names(),
            expected(&[
                "position",
                "modificationType",
                "text",
                "length",
                "linesAdded",
                "line",
                "foldLevelNow",
                "foldLevelPrev",
            ])
        );
    }

    #[test]
    fn modified_text_copy_is_released() {
        let payload = *b"abc";
        let mut n = notification(SCN_MODIFIED);
        n.text = payload.as_ptr().cast();
        n.length = 3;
        let live_before = crate::scratch::live::count();
        let total_before = crate::scratch::live::total();

        let record = unsafe { NotificationRecord::from_notification(&n) }.unwrap();

        assert_eq!(record.text("text"), Some("abc"));
        assert_eq!(crate::scratch::live::total(), total_before + 1);
        assert_eq!(crate::scratch::live::count(), live_before);
    }

    #[test]
    fn apply_to_writes_every_field() {
        // Arrange
        let record = unsafe { NotificationRecord::from_notification(&notification(SCN_DWELLSTART)) }
            .unwrap();
        let mut event = FakeObject::with_ints(&[
            ("hwndFrom", 0),
            ("idFrom", 0),
            ("code", 0),
            ("position", 0),
            ("x", 0),
            ("y", 0),
        ]);
        // Act
        record.apply_to(&mut event).unwrap();
        // Assert
        assert_eq!(event.int("hwndFrom"), Some(0x1234));
        assert_eq!(event.int("code"), Some(SCN_DWELLSTART as i32));
        assert_eq!(event.int("position"), Some(42));
        assert_eq!(event.int("x"), Some(10));
        assert_eq!(event.int("y"), Some(20));
    }

    #[test]
    fn apply_to_surfaces_missing_field() {
        let record = unsafe { NotificationRecord::from_notification(&notification(SCN_MARGINCLICK)) }
            .unwrap();
        let mut event = FakeObject::with_ints(&[("hwndFrom", 0), ("idFrom", 0), ("code", 0)]);
        assert!(record.apply_to(&mut event).is_err());
    }
}
