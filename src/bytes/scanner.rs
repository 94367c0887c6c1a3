use crate::bytes::{buffer::ByteBuffer, charset};
use memchr::memchr;

/// Forward cursor over the content of a [`ByteBuffer`].
///
/// The end-of-input flag is raised only when a read is attempted past the
/// last byte, not when the cursor merely reaches it.
///
/// # Examples
///
/// ```
/// use cell_http::{ByteBuffer, Scanner};
///
/// let data = ByteBuffer::from("GET /");
/// let mut scanner = Scanner::new(&data);
/// let mut method = ByteBuffer::new();
///
/// assert!(scanner.copy_until(&mut method, b' '));
/// assert_eq!(method, "GET");
/// assert_eq!(scanner.next(), Some(b'/'));
/// assert!(!scanner.is_eof());
/// assert_eq!(scanner.next(), None);
/// assert!(scanner.is_eof());
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    cursor: usize,
    data: &'a ByteBuffer,
    eof: bool,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub const fn new(data: &'a ByteBuffer) -> Self {
        Self {
            cursor: 0,
            data,
            eof: false,
        }
    }

    #[inline(always)]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    #[inline(always)]
    pub const fn position(&self) -> usize {
        self.cursor
    }

    /// Unread part of the input.
    #[inline(always)]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data.as_bytes()[self.cursor..]
    }

    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.cursor)
    }

    /// Moves the cursor forward by `n`, clamping to the end and raising the
    /// end-of-input flag when it would pass it.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        match self.cursor.checked_add(n) {
            Some(end) if end <= self.data.len() => self.cursor = end,
            _ => {
                self.cursor = self.data.len();
                self.eof = true;
            }
        }
    }

    /// Moves the cursor back by `n`, stopping at the start. Clears end-of-input.
    #[inline]
    pub fn rewind(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
        self.eof = false;
    }

    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.eof = false;
    }

    /// Appends bytes to `out` until `stop` is met.
    ///
    /// The stop byte is consumed but not appended. Returns `false` when the
    /// input ends first, in which case everything left has been appended.
    pub fn copy_until(&mut self, out: &mut ByteBuffer, stop: u8) -> bool {
        let rest = self.remaining();

        match memchr(stop, rest) {
            Some(i) => {
                out.extend_from_slice(&rest[..i]);
                self.cursor += i + 1;
                true
            }
            None => {
                out.extend_from_slice(rest);
                self.cursor = self.data.len();
                self.eof = true;
                false
            }
        }
    }

    /// Consumes a run of `byte` and checks that it is exactly `count` long.
    ///
    /// A shorter run is consumed entirely. A longer run has only `count`
    /// bytes consumed. Both report `false`.
    pub fn advance_run_of_exactly(&mut self, byte: u8, count: usize) -> bool {
        let run = self.remaining().iter().take_while(|&&b| b == byte).count();

        if run < count {
            self.cursor += run;
            if self.cursor == self.data.len() {
                self.eof = true;
            }
            return false;
        }

        self.cursor += count;
        run == count
    }

    /// Skips bytes contained in `set`, returning how many were skipped.
    pub fn advance_while_any_of(&mut self, set: &[u8]) -> usize {
        let skipped = self
            .remaining()
            .iter()
            .take_while(|&&byte| set.contains(&byte))
            .count();

        self.cursor += skipped;
        skipped
    }

    #[inline]
    pub fn advance_whitespace(&mut self) -> usize {
        self.advance_while_any_of(charset::ASCII_WHITESPACE)
    }
}

impl Iterator for Scanner<'_> {
    type Item = u8;

    /// Returns the byte under the cursor and moves past it.
    #[inline(always)]
    fn next(&mut self) -> Option<u8> {
        match self.data.get(self.cursor) {
            Some(byte) => {
                self.cursor += 1;
                Some(byte)
            }
            None => {
                self.eof = true;
                None
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.data.len() - self.cursor;
        (left, Some(left))
    }
}
