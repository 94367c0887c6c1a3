use crate::bytes::{buffer::ByteBuffer, charset, slice::ByteSlice};
use std::fmt;

/// Ordered key-value table with linear lookup.
///
/// Keys are unique: adding an existing key overwrites its value in place and
/// keeps its position. Requests carry few headers and few query parameters,
/// so a scan beats hashing here.
///
/// [`HeaderTable::clear`] keeps the entry buffers, so refilling a table
/// after a clear reuses their allocations.
///
/// # Examples
///
/// ```
/// use cell_http::HeaderTable;
///
/// let mut table = HeaderTable::new();
/// let index = table.add_or_overwrite(b"accept", b"text/html");
/// table.append_to_value(b"accept", b",application/xhtml+xml");
///
/// assert_eq!(table.value_at(index).unwrap(), "text/html,application/xhtml+xml");
/// assert_eq!(table.find_ignore_case(b"Accept"), Some(index));
/// ```
#[derive(Clone, Default)]
pub struct HeaderTable {
    // Slots past `len` are cleared buffers waiting for reuse
    entries: Vec<(ByteBuffer, ByteBuffer)>,
    len: usize,
}

impl HeaderTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empties the table, keeping the entry buffers for later inserts.
    pub fn clear(&mut self) {
        for (key, value) in &mut self.entries[..self.len] {
            key.clear();
            value.clear();
        }
        self.len = 0;
    }

    #[inline(always)]
    fn live(&self) -> &[(ByteBuffer, ByteBuffer)] {
        &self.entries[..self.len]
    }

    /// Inserts `key` with `value`, or replaces the value of an existing `key`.
    /// Returns the index of the entry.
    pub fn add_or_overwrite(&mut self, key: &[u8], value: &[u8]) -> usize {
        match self.find(key) {
            Some(index) => {
                self.entries[index].1.assign(value);
                index
            }
            None => {
                match self.entries.get_mut(self.len) {
                    Some((spare_key, spare_value)) => {
                        spare_key.assign(key);
                        spare_value.assign(value);
                    }
                    None => self
                        .entries
                        .push((ByteBuffer::from_slice(key), ByteBuffer::from_slice(value))),
                }
                self.len += 1;
                self.len - 1
            }
        }
    }

    /// Appends `more` to the value of `key`, inserting `key` first if missing.
    /// Returns the index of the entry.
    pub fn append_to_value(&mut self, key: &[u8], more: &[u8]) -> usize {
        match self.find(key) {
            Some(index) => {
                self.entries[index].1.extend_from_slice(more);
                index
            }
            None => self.add_or_overwrite(key, more),
        }
    }

    /// Index of the entry whose key equals `key` exactly.
    #[inline]
    pub fn find(&self, key: &[u8]) -> Option<usize> {
        self.live().iter().position(|(k, _)| k.as_bytes() == key)
    }

    /// Index of the entry whose key equals `key` ignoring ASCII case.
    #[inline]
    pub fn find_ignore_case(&self, key: &[u8]) -> Option<usize> {
        self.live()
            .iter()
            .position(|(k, _)| charset::eq_ignore_case(k.as_bytes(), key))
    }

    #[inline]
    pub fn key_at(&self, index: usize) -> Option<ByteSlice<'_>> {
        self.live().get(index).map(|(k, _)| k.as_slice())
    }

    #[inline]
    pub fn value_at(&self, index: usize) -> Option<ByteSlice<'_>> {
        self.live().get(index).map(|(_, v)| v.as_slice())
    }

    #[inline]
    pub fn get(&self, key: &[u8]) -> Option<ByteSlice<'_>> {
        self.value_at(self.find(key)?)
    }

    #[inline]
    pub fn get_ignore_case(&self, key: &[u8]) -> Option<ByteSlice<'_>> {
        self.value_at(self.find_ignore_case(key)?)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ByteSlice<'_>, ByteSlice<'_>)> {
        self.live().iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

impl PartialEq for HeaderTable {
    fn eq(&self, other: &Self) -> bool {
        self.live() == other.live()
    }
}

impl Eq for HeaderTable {}

impl fmt::Debug for HeaderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
