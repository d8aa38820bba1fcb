/*
 * Owned scratch memory lent to the editor for the span of one command or one
 * notification. Allocation is fallible (an out-of-memory condition fails the
 * single call instead of aborting the host VM) and release happens on drop,
 * so every exit path of a caller frees the buffer exactly once.
 */
use crate::error::{BridgeError, Result};
use std::ffi::c_char;

pub(crate) struct ScratchBuffer {
    bytes: Vec<u8>,
}

impl ScratchBuffer {
    /// Zero-filled buffer of `len` bytes.
    pub(crate) fn zeroed(len: usize) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| BridgeError::AllocationFailed(len))?;
        bytes.resize(len, 0);
        live::acquired();
        Ok(Self { bytes })
    }

    /// Copy of `text` followed by a terminating NUL.
    pub(crate) fn terminated(text: &[u8]) -> Result<Self> {
        let mut buffer = Self::zeroed(text.len() + 1)?;
        buffer.bytes[..text.len()].copy_from_slice(text);
        Ok(buffer)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn as_ptr(&self) -> *const c_char {
        self.bytes.as_ptr().cast()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut c_char {
        self.bytes.as_mut_ptr().cast()
    }

    /// Bytes up to the first NUL, or the whole buffer if the writer left it unterminated.
    pub(crate) fn terminated_bytes(&self) -> &[u8] {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len());
        &self.bytes[..end]
    }

    pub(crate) fn to_text(&self) -> String {
        String::from_utf8_lossy(self.terminated_bytes()).into_owned()
    }
}

impl Drop for ScratchBuffer {
    fn drop(&mut self) {
        live::released();
    }
}

/*
 * Per-thread count of scratch buffers currently alive. Only compiled for
 * tests, where it proves that a command released everything it allocated.
 */
#[cfg(test)]
pub(crate) mod live {
    use std::cell::Cell;

    thread_local! {
        static LIVE: Cell<isize> = const { Cell::new(0) };
        static TOTAL: Cell<usize> = const { Cell::new(0) };
    }

    pub(crate) fn acquired() {
        LIVE.with(|live| live.set(live.get() + 1));
        TOTAL.with(|total| total.set(total.get() + 1));
    }

    pub(crate) fn released() {
        LIVE.with(|live| live.set(live.get() - 1));
    }

    pub(crate) fn count() -> isize {
        LIVE.with(Cell::get)
    }

    pub(crate) fn total() -> usize {
        TOTAL.with(Cell::get)
    }
}

#[cfg(not(test))]
mod live {
    #[inline(always)]
    pub(super) fn acquired() {}
    #[inline(always)]
    pub(super) fn released() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_appends_nul() {
        let buffer = ScratchBuffer::terminated(b"foo").unwrap();
        assert_eq!(buffer.len(), 4);
        let raw = unsafe { std::slice::from_raw_parts(buffer.as_ptr().cast::<u8>(), buffer.len()) };
        assert_eq!(raw, b"foo\0");
    }

    #[test]
    fn unterminated_content_is_bounded_by_buffer_length() {
        let mut buffer = ScratchBuffer::zeroed(3).unwrap();
        unsafe { std::ptr::copy_nonoverlapping(b"abc".as_ptr(), buffer.as_mut_ptr().cast(), 3) };
        assert_eq!(buffer.to_text(), "abc");
    }

    #[test]
    fn text_stops_at_first_nul() {
        let buffer = ScratchBuffer::terminated(b"ab\0cd").unwrap();
        assert_eq!(buffer.to_text(), "ab");
    }

    #[test]
    fn drop_releases_exactly_once() {
        let before = live::count();
        {
            let _a = ScratchBuffer::zeroed(8).unwrap();
            let _b = ScratchBuffer::terminated(b"x").unwrap();
            assert_eq!(live::count(), before + 2);
        }
        assert_eq!(live::count(), before);
    }
}
