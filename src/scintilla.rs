/*
 * The slice of Scintilla.h the bridge depends on: the notification codes it
 * translates, the two messages used to obtain the direct-call capability, and
 * the C layouts of the structures exchanged through WM_NOTIFY and through the
 * range/find commands.
 */
use std::ffi::c_char;
use std::os::raw::c_long;

pub const SCI_GETDIRECTFUNCTION: u32 = 2184;
pub const SCI_GETDIRECTPOINTER: u32 = 2185;

pub const SCN_STYLENEEDED: u32 = 2000;
pub const SCN_CHARADDED: u32 = 2001;
pub const SCN_KEY: u32 = 2005;
pub const SCN_MODIFIED: u32 = 2008;
pub const SCN_MACRORECORD: u32 = 2009;
pub const SCN_MARGINCLICK: u32 = 2010;
pub const SCN_USERLISTSELECTION: u32 = 2014;
pub const SCN_DWELLSTART: u32 = 2016;
pub const SCN_DWELLEND: u32 = 2017;
pub const SCN_HOTSPOTCLICK: u32 = 2019;
pub const SCN_HOTSPOTDOUBLECLICK: u32 = 2020;
pub const SCN_CALLTIPCLICK: u32 = 2021;

/// `NMHDR`: the header every WM_NOTIFY payload starts with.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyHeader {
    pub hwnd_from: isize,
    pub id_from: usize,
    pub code: u32,
}

/// `SCNotification` as laid out by Scintilla 5 (`Sci_Position` is `ptrdiff_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ScNotification {
    pub header: NotifyHeader,
    pub position: isize,
    pub ch: i32,
    pub modifiers: i32,
    pub modification_type: i32,
    pub text: *const c_char,
    pub length: isize,
    pub lines_added: isize,
    pub message: i32,
    pub w_param: usize,
    pub l_param: isize,
    pub line: isize,
    pub fold_level_now: i32,
    pub fold_level_prev: i32,
    pub margin: i32,
    pub list_type: i32,
    pub x: i32,
    pub y: i32,
    pub token: i32,
    pub annotation_lines_added: isize,
    pub updated: i32,
    pub list_completion_method: i32,
    pub character_source: i32,
}

impl Default for ScNotification {
    fn default() -> Self {
        Self {
            header: NotifyHeader::default(),
            position: 0,
            ch: 0,
            modifiers: 0,
            modification_type: 0,
            text: std::ptr::null(),
            length: 0,
            lines_added: 0,
            message: 0,
            w_param: 0,
            l_param: 0,
            line: 0,
            fold_level_now: 0,
            fold_level_prev: 0,
            margin: 0,
            list_type: 0,
            x: 0,
            y: 0,
            token: 0,
            annotation_lines_added: 0,
            updated: 0,
            list_completion_method: 0,
            character_source: 0,
        }
    }
}

/// `Sci_CharacterRange`; `Sci_PositionCR` is a C `long`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterRange {
    pub cp_min: c_long,
    pub cp_max: c_long,
}

impl CharacterRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            cp_min: c_long::from(start),
            cp_max: c_long::from(end),
        }
    }

    /// A range Scintilla has not written to yet.
    pub fn unset() -> Self {
        Self::new(-1, -1)
    }
}

/// `Sci_TextRange`, used by SCI_GETTEXTRANGE and friends.
#[repr(C)]
#[derive(Debug)]
pub struct TextRange {
    pub chrg: CharacterRange,
    pub text: *mut c_char,
}

/// `Sci_TextToFind`, used by SCI_FINDTEXT. `found` receives the match.
#[repr(C)]
#[derive(Debug)]
pub struct TextToFind {
    pub chrg: CharacterRange,
    pub text: *const c_char,
    pub found: CharacterRange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn header_is_leading_member_of_notification() {
        assert_eq!(offset_of!(ScNotification, header), 0);
        assert_eq!(offset_of!(ScNotification, position), size_of::<NotifyHeader>());
    }

    #[test]
    fn find_descriptor_places_found_range_after_pattern_pointer() {
        assert_eq!(
            offset_of!(TextToFind, found),
            offset_of!(TextToFind, text) + size_of::<*const c_char>()
        );
    }

    #[test]
    fn unset_range_is_minus_one_on_both_ends() {
        let range = CharacterRange::unset();
        assert_eq!((range.cp_min, range.cp_max), (-1, -1));
    }
}
