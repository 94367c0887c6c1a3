use crate::bytes::{charset, slice::ByteSlice};
use memchr::memchr;
use std::fmt;

const ALIGNMENT: usize = 8;
const DEFAULT_CAPACITY: usize = 8;

/// Rounds a capacity hint up to the storage alignment, never below one slot.
#[inline(always)]
pub(crate) const fn aligned_capacity(hint: usize) -> usize {
    let hint = if hint == 0 { 1 } else { hint };
    match hint.checked_add(ALIGNMENT - 1) {
        Some(n) => n & !(ALIGNMENT - 1),
        None => usize::MAX & !(ALIGNMENT - 1),
    }
}

/// Growable, owned byte string with a trailing zero byte.
///
/// The storage always keeps at least one zero byte after the content, so
/// `capacity() > len()` holds at every point. Capacity only grows and is
/// always a multiple of 8. The zero terminator makes [`ByteBuffer::raw_mut`]
/// followed by [`ByteBuffer::refresh_length`] behave like a C string fill.
///
/// # Examples
///
/// ```
/// use cell_http::ByteBuffer;
///
/// let mut buf = ByteBuffer::new();
/// buf.extend_from_slice(b"GET / HTTP/1.1");
///
/// assert_eq!(buf.len(), 14);
/// assert_eq!(buf.capacity(), 16);
/// assert!(buf.starts_with(b"GET"));
/// ```
#[derive(Clone)]
pub struct ByteBuffer {
    len: usize,
    storage: Box<[u8]>,
}

impl ByteBuffer {
    /// Creates an empty buffer with the default capacity of 8 bytes.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty buffer whose capacity is `capacity` rounded up to 8.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            len: 0,
            storage: vec![0; aligned_capacity(capacity)].into_boxed_slice(),
        }
    }

    /// Creates a buffer holding a copy of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut buf = Self::with_capacity(bytes.len() + 1);
        buf.storage[..bytes.len()].copy_from_slice(bytes);
        buf.len = bytes.len();
        buf
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Content followed by its zero terminator.
    #[inline(always)]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.storage[..=self.len]
    }

    #[inline(always)]
    pub fn as_slice(&self) -> ByteSlice<'_> {
        ByteSlice::new(self.as_bytes())
    }

    /// View of `n` bytes starting at `from`.
    ///
    /// Returns an empty view when the range does not fit inside the content.
    pub fn slice(&self, from: usize, n: usize) -> ByteSlice<'_> {
        match from.checked_add(n) {
            Some(end) if end <= self.len => ByteSlice::new(&self.storage[from..end]),
            _ => ByteSlice::default(),
        }
    }

    /// View of the content from `from` to the end, empty when out of range.
    pub fn slice_from(&self, from: usize) -> ByteSlice<'_> {
        match self.as_bytes().get(from..) {
            Some(rest) => ByteSlice::new(rest),
            None => ByteSlice::default(),
        }
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.as_bytes().get(index).copied()
    }

    /// Returns the content as `&str` if it is valid UTF-8.
    #[inline]
    pub fn to_str(&self) -> Option<&str> {
        simdutf8::basic::from_utf8(self.as_bytes()).ok()
    }

    /// Appends one byte, doubling the capacity when the terminator slot
    /// would be taken.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        if self.len + 1 == self.capacity() {
            self.grow(self.capacity() * 2);
        }

        self.storage[self.len] = byte;
        self.len += 1;
        self.storage[self.len] = 0;
    }

    /// Appends `bytes`, growing to the next aligned size that keeps the terminator.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        let new_len = self.len + bytes.len();
        if new_len >= self.capacity() {
            self.grow(new_len + 1);
        }

        self.storage[self.len..new_len].copy_from_slice(bytes);
        self.len = new_len;
        self.storage[new_len] = 0;
    }

    #[inline]
    pub fn append_slice(&mut self, slice: ByteSlice<'_>) {
        self.extend_from_slice(slice.as_bytes());
    }

    /// Replaces the content with `bytes`, keeping the allocation when it fits.
    #[inline]
    pub fn assign(&mut self, bytes: &[u8]) {
        self.clear();
        self.extend_from_slice(bytes);
    }

    /// Zeroes the content and sets the length to 0. Capacity is kept.
    ///
    /// Bytes past the terminator are already zero, so the cost follows the
    /// content length rather than the capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.storage[..self.len].fill(0);
        self.len = 0;
    }

    /// Grows the storage to at least `new_capacity` (rounded up to 8).
    ///
    /// Requests not larger than the current capacity are ignored.
    pub fn grow(&mut self, new_capacity: usize) {
        let new_capacity = aligned_capacity(new_capacity);
        if new_capacity <= self.capacity() {
            return;
        }

        let mut storage = vec![0; new_capacity].into_boxed_slice();
        storage[..self.capacity()].copy_from_slice(&self.storage);
        self.storage = storage;
    }

    /// Removes leading `delim` bytes.
    pub fn trim_left(&mut self, delim: u8) {
        let start = self
            .as_bytes()
            .iter()
            .position(|&byte| byte != delim)
            .unwrap_or(self.len);

        if start == 0 {
            return;
        }

        let new_len = self.len - start;
        self.storage.copy_within(start..self.len, 0);
        self.storage[new_len..self.len].fill(0);
        self.len = new_len;
    }

    /// Removes trailing `delim` bytes.
    pub fn trim_right(&mut self, delim: u8) {
        let end = self
            .as_bytes()
            .iter()
            .rposition(|&byte| byte != delim)
            .map_or(0, |i| i + 1);

        self.storage[end..self.len].fill(0);
        self.len = end;
    }

    #[inline]
    pub fn trim(&mut self, delim: u8) {
        self.trim_right(delim);
        self.trim_left(delim);
    }

    /// Writable storage without the final terminator slot.
    ///
    /// Bytes written here only become content after [`ByteBuffer::refresh_length`].
    #[inline]
    pub fn raw_mut(&mut self) -> &mut [u8] {
        let last = self.capacity() - 1;
        &mut self.storage[..last]
    }

    /// Recomputes the length as the position of the first zero byte.
    ///
    /// Anything written through [`ByteBuffer::raw_mut`] past that zero is
    /// dropped so the storage after the terminator stays zeroed.
    #[inline]
    pub fn refresh_length(&mut self) {
        self.len = memchr(0, &self.storage).unwrap_or(self.capacity() - 1);
        self.storage[self.len..].fill(0);
    }

    /// Lowercases the ASCII letters of the content in place.
    #[inline]
    pub fn to_lower(&mut self) {
        charset::to_lower_case(&mut self.storage[..self.len]);
    }

    #[inline]
    pub fn compare(&self, other: ByteSlice<'_>) -> bool {
        self.as_bytes() == other.as_bytes()
    }

    #[inline]
    pub fn compare_ignore_case(&self, other: ByteSlice<'_>) -> bool {
        charset::eq_ignore_case(self.as_bytes(), other.as_bytes())
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        memchr(byte, self.as_bytes()).is_some()
    }

    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.as_bytes().starts_with(prefix)
    }

    #[inline]
    pub fn ends_with_byte(&self, byte: u8) -> bool {
        self.as_bytes().last() == Some(&byte)
    }
}

impl Default for ByteBuffer {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ByteBuffer {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteBuffer {}

impl PartialEq<[u8]> for ByteBuffer {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&str> for ByteBuffer {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl AsRef<[u8]> for ByteBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<&[u8]> for ByteBuffer {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Self::from_slice(value)
    }
}

impl From<&str> for ByteBuffer {
    #[inline]
    fn from(value: &str) -> Self {
        Self::from_slice(value.as_bytes())
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("content", &String::from_utf8_lossy(self.as_bytes()))
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_slice(), f)
    }
}
