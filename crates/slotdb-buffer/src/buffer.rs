//! The byte-storage contract pages are written against.

/// Synchronous random-access byte storage for one page.
///
/// Implementations own the bytes; a page only borrows them. Offsets are
/// relative to the start of the page region. Every method panics when the
/// requested range is outside `[0, capacity)`; pages check their ranges
/// before calling, so a panic here means a page bug rather than bad input.
pub trait Buffer {
    /// Returns the number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Returns `len` bytes starting at `offset`.
    fn read(&self, offset: usize, len: usize) -> &[u8];

    /// Overwrites `bytes.len()` bytes starting at `offset`.
    fn write(&mut self, offset: usize, bytes: &[u8]);

    /// Sets `len` bytes starting at `offset` to `value`.
    fn fill(&mut self, offset: usize, len: usize, value: u8) {
        self.write(offset, &vec![value; len]);
    }

    /// Reads a little-endian `u32` at `offset`.
    fn read_u32_le(&self, offset: usize) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.read(offset, 4));
        u32::from_le_bytes(raw)
    }

    /// Writes a little-endian `u32` at `offset`.
    fn write_u32_le(&mut self, offset: usize, value: u32) {
        self.write(offset, &value.to_le_bytes());
    }
}

#[inline]
fn check_range(offset: usize, len: usize, capacity: usize) -> std::ops::Range<usize> {
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= capacity)
        .unwrap_or_else(|| {
            panic!("buffer range {offset}+{len} out of bounds for capacity {capacity}")
        });
    offset..end
}

impl Buffer for [u8] {
    #[inline]
    fn capacity(&self) -> usize {
        self.len()
    }

    #[inline]
    fn read(&self, offset: usize, len: usize) -> &[u8] {
        &self[check_range(offset, len, self.len())]
    }

    #[inline]
    fn write(&mut self, offset: usize, bytes: &[u8]) {
        let range = check_range(offset, bytes.len(), self.len());
        self[range].copy_from_slice(bytes);
    }

    #[inline]
    fn fill(&mut self, offset: usize, len: usize, value: u8) {
        let range = check_range(offset, len, self.len());
        self[range].fill(value);
    }
}

impl Buffer for Vec<u8> {
    #[inline]
    fn capacity(&self) -> usize {
        self.len()
    }

    #[inline]
    fn read(&self, offset: usize, len: usize) -> &[u8] {
        self.as_slice().read(offset, len)
    }

    #[inline]
    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.as_mut_slice().write(offset, bytes);
    }

    #[inline]
    fn fill(&mut self, offset: usize, len: usize, value: u8) {
        Buffer::fill(self.as_mut_slice(), offset, len, value);
    }
}
