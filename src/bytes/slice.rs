use crate::bytes::charset;
use memchr::memchr;
use std::fmt;

/// Borrowed, read-only view of bytes owned by a [`ByteBuffer`](crate::ByteBuffer)
/// or any other byte storage.
///
/// A view never outlives its owner.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSlice<'a> {
    bytes: &'a [u8],
}

impl<'a> ByteSlice<'a> {
    #[inline(always)]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// View up to, not including, the first zero byte.
    #[inline]
    pub fn from_nul_terminated(bytes: &'a [u8]) -> Self {
        let len = memchr(0, bytes).unwrap_or(bytes.len());
        Self::new(&bytes[..len])
    }

    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    #[inline]
    pub fn compare(&self, other: ByteSlice<'_>) -> bool {
        self.bytes == other.bytes
    }

    #[inline]
    pub fn compare_ignore_case(&self, other: ByteSlice<'_>) -> bool {
        charset::eq_ignore_case(self.bytes, other.bytes)
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        memchr(byte, self.bytes).is_some()
    }

    /// Returns the view as `&str` if it is valid UTF-8.
    #[inline]
    pub fn to_str(&self) -> Option<&'a str> {
        simdutf8::basic::from_utf8(self.bytes).ok()
    }
}

impl<'a> From<&'a [u8]> for ByteSlice<'a> {
    #[inline(always)]
    fn from(value: &'a [u8]) -> Self {
        Self::new(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ByteSlice<'a> {
    #[inline(always)]
    fn from(value: &'a [u8; N]) -> Self {
        Self::new(value)
    }
}

impl<'a> From<&'a str> for ByteSlice<'a> {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl PartialEq<[u8]> for ByteSlice<'_> {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&str> for ByteSlice<'_> {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl AsRef<[u8]> for ByteSlice<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl fmt::Debug for ByteSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSlice({:?})", String::from_utf8_lossy(self.bytes))
    }
}

impl fmt::Display for ByteSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.bytes))
    }
}
