//! Binary codec primitives.
//!
//! Provides `ByteReader` and `ByteWriter` for the fixed-width, big-endian
//! wire format shared by every transaction, input, output and credential
//! layout, plus the free-standing `read_fixed` helper.  Bounds are checked
//! once, here, so callers never index into a buffer directly.

use crate::PrimitivesError;

/// Size in bytes of the count prefix in front of every variable-length array.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Read `length` bytes from `buf` starting at `offset`.
///
/// # Arguments
/// * `buf` - The buffer to read from.
/// * `offset` - Start position of the read.
/// * `length` - Number of bytes to read.
///
/// # Returns
/// The slice read and the offset just past it, or `BufferBounds` when
/// `offset + length` runs past the end of `buf`.
pub fn read_fixed(buf: &[u8], offset: usize, length: usize) -> Result<(&[u8], usize), PrimitivesError> {
    let end = offset.checked_add(length).ok_or(PrimitivesError::BufferBounds {
        offset,
        length,
        available: buf.len(),
    })?;
    if end > buf.len() {
        return Err(PrimitivesError::BufferBounds {
            offset,
            length,
            available: buf.len(),
        });
    }
    Ok((&buf[offset..end], end))
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for big-endian binary data.
///
/// Wraps a byte slice and maintains a read position.  Every read either
/// returns the decoded value and advances, or fails with `BufferBounds`
/// without moving the cursor.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Create a reader positioned at `offset` within `data`.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        ByteReader { data, pos: offset }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Returns
    /// A byte slice of length `n`, or an error if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        let (slice, next) = read_fixed(self.data, self.pos, n)?;
        self.pos = next;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte and advance the position.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a big-endian u16 and advance the position by 2 bytes.
    pub fn read_u16_be(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u32 and advance the position by 4 bytes.
    pub fn read_u32_be(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u64 and advance the position by 8 bytes.
    pub fn read_u64_be(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a 4-byte big-endian length followed by that many raw bytes.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_u32_be()? as usize;
        self.read_bytes(len)
    }

    /// Read a 2-byte big-endian length followed by that many raw bytes.
    ///
    /// Used for short strings such as asset names and chain names.
    pub fn read_short_prefixed_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_u16_be()? as usize;
        self.read_bytes(len)
    }

    /// Read a 4-byte big-endian element count, then decode that many
    /// elements in sequence with `decode`.
    ///
    /// The count is checked against the remaining bytes before allocating,
    /// assuming every element occupies at least `min_element_size` bytes.
    ///
    /// # Arguments
    /// * `min_element_size` - Lower bound on the encoded size of one element.
    /// * `decode` - Decoder invoked once per element.
    pub fn read_length_prefixed_array<T, E, F>(
        &mut self,
        min_element_size: usize,
        mut decode: F,
    ) -> Result<Vec<T>, E>
    where
        E: From<PrimitivesError>,
        F: FnMut(&mut ByteReader<'a>) -> Result<T, E>,
    {
        let count_offset = self.pos;
        let count = self.read_u32_be()? as usize;
        let needed = count.saturating_mul(min_element_size.max(1));
        if min_element_size > 0 && needed > self.remaining() {
            return Err(PrimitivesError::BufferBounds {
                offset: count_offset + LENGTH_PREFIX_SIZE,
                length: needed,
                available: self.data.len(),
            }
            .into());
        }
        let mut out = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            out.push(decode(self)?);
        }
        Ok(out)
    }

    /// Current read position.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// The whole underlying buffer, independent of position.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

// ---------------------------------------------------------------------------
// ByteWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer for big-endian binary data.
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        ByteWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ByteWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a big-endian u16 (2 bytes).
    pub fn write_u16_be(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a big-endian u32 (4 bytes).
    pub fn write_u32_be(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a big-endian u64 (8 bytes).
    pub fn write_u64_be(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a 4-byte big-endian length followed by the bytes.
    pub fn write_length_prefixed_bytes(&mut self, bytes: &[u8]) {
        self.write_u32_be(bytes.len() as u32);
        self.write_bytes(bytes);
    }

    /// Append a 2-byte big-endian length followed by the bytes.
    ///
    /// Callers bound `bytes` to `u16::MAX`; a longer slice is a bug.
    pub fn write_short_prefixed_bytes(&mut self, bytes: &[u8]) {
        debug_assert!(
            bytes.len() <= usize::from(u16::MAX),
            "short-prefixed field of {} bytes",
            bytes.len()
        );
        self.write_u16_be(bytes.len() as u16);
        self.write_bytes(bytes);
    }

    /// Append a 4-byte big-endian count, then each element via `encode`.
    pub fn write_length_prefixed_array<T, F>(&mut self, items: &[T], mut encode: F)
    where
        F: FnMut(&mut ByteWriter, &T),
    {
        self.write_u32_be(items.len() as u32);
        for item in items {
            encode(self, item);
        }
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}
