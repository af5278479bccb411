//! Ring buffer (sliding window) for LZSS decompression.
//!
//! The window keeps the most recently produced output bytes so that
//! back-references can copy from them. ZUN's LZSS addresses the window by
//! absolute slot index rather than by distance from the write cursor, and
//! starts writing at slot 1 instead of slot 0. Both addressing styles are
//! supported here; the distance of a slot is `(position - index) mod capacity`.
//!
//! The buffer tracks which slots have been written since creation. Reading
//! a slot that was never written is reported to the caller instead of
//! returning the zero fill, so corrupt streams cannot leak stale state.
//!
//! # Sizes
//!
//! - ZUN LZSS: 8 KB (13-bit index)

/// Common window sizes.
pub mod sizes {
    /// Window size for ZUN LZSS (8 KB).
    pub const ZUN_LZSS: usize = 8192;
}

/// A ring buffer (circular buffer) for maintaining decompression history.
///
/// The buffer stores the most recent `capacity` bytes of output data,
/// wrapping around when full. Overlapping copies (length greater than the
/// distance) replay byte by byte and produce a repeating pattern.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Slot the first byte was written to.
    origin: usize,
    /// Number of bytes written (up to capacity).
    size: usize,
    /// Capacity (must be power of 2).
    capacity: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl RingBuffer {
    /// Create a new ring buffer that starts writing at slot 0.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_origin(capacity, 0)
    }

    /// Create a new ring buffer that starts writing at slot `origin`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn with_origin(capacity: usize, origin: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        let mask = capacity - 1;
        Self {
            buffer: vec![0; capacity],
            position: origin & mask,
            origin: origin & mask,
            size: 0,
            capacity,
            mask,
        }
    }

    /// Create a new ring buffer laid out like ZUN's LZSS window.
    pub fn zun() -> Self {
        Self::with_origin(sizes::ZUN_LZSS, 1)
    }

    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of bytes currently in the buffer.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Get the current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Clear the buffer and rewind to the origin slot.
    pub fn clear(&mut self) {
        self.position = self.origin;
        self.size = 0;
        self.buffer.fill(0);
    }

    /// Write a single byte to the buffer.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        if self.size < self.capacity {
            self.size += 1;
        }
    }

    /// Write multiple bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Whether the slot at `index` holds a byte written since creation.
    #[inline]
    pub fn is_written(&self, index: usize) -> bool {
        if self.size == self.capacity {
            return true;
        }
        (index.wrapping_sub(self.origin) & self.mask) < self.size
    }

    /// Read the slot at absolute `index` (taken modulo capacity).
    ///
    /// Returns `None` if the slot was never written.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        let index = index & self.mask;
        self.is_written(index).then(|| self.buffer[index])
    }

    /// Distance from the write cursor back to slot `index`.
    ///
    /// A distance of `capacity` (the oldest byte) is reported as `capacity`,
    /// never 0.
    pub fn distance_to(&self, index: usize) -> usize {
        match self.position.wrapping_sub(index) & self.mask {
            0 => self.capacity,
            distance => distance,
        }
    }

    /// Copy `length` bytes starting at absolute slot `index`, appending
    /// each to `sink` and writing it back into the window.
    ///
    /// The source advances one slot per produced byte, so a source that
    /// catches up with the write cursor replays bytes produced by this
    /// same copy.
    ///
    /// # Errors
    ///
    /// Returns the first source slot that was never written. Bytes copied
    /// before that point stay in `sink`.
    pub fn copy_from_index(
        &mut self,
        index: usize,
        length: usize,
        sink: &mut Vec<u8>,
    ) -> std::result::Result<(), usize> {
        let mut src_pos = index & self.mask;

        for _ in 0..length {
            if !self.is_written(src_pos) {
                return Err(src_pos);
            }
            let byte = self.buffer[src_pos];
            sink.push(byte);
            self.write_byte(byte);
            src_pos = (src_pos + 1) & self.mask;
        }

        Ok(())
    }

    /// Copy `length` bytes from `distance` bytes behind the write cursor.
    pub fn copy_from_distance(
        &mut self,
        distance: usize,
        length: usize,
        sink: &mut Vec<u8>,
    ) -> std::result::Result<(), usize> {
        if distance == 0 || distance > self.size {
            return Err(self.position.wrapping_sub(distance) & self.mask);
        }
        self.copy_from_index(self.position.wrapping_sub(distance), length, sink)
    }

    /// Get the last N bytes written (for debugging/testing).
    pub fn last_bytes(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.size);
        (0..count)
            .map(|i| self.buffer[self.position.wrapping_sub(count - i) & self.mask])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ringbuffer_basic() {
        let mut ring = RingBuffer::new(8);
        ring.write_bytes(b"Hello");

        assert_eq!(ring.len(), 5);
        assert_eq!(ring.get(0), Some(b'H'));
        assert_eq!(ring.get(4), Some(b'o'));
        assert_eq!(ring.get(5), None);
        assert_eq!(ring.distance_to(4), 1);
    }

    #[test]
    fn test_ringbuffer_origin() {
        let mut ring = RingBuffer::with_origin(8, 1);
        ring.write_bytes(b"AB");

        assert_eq!(ring.get(0), None);
        assert_eq!(ring.get(1), Some(b'A'));
        assert_eq!(ring.get(2), Some(b'B'));
        assert_eq!(ring.position(), 3);
    }

    #[test]
    fn test_ringbuffer_wrap() {
        let mut ring = RingBuffer::new(4);
        ring.write_bytes(b"ABCDEF"); // Wraps around

        assert_eq!(ring.len(), 4); // Max is capacity
        assert_eq!(ring.last_bytes(4), b"CDEF");
        assert!(ring.is_written(3));
        assert_eq!(ring.distance_to(ring.position()), 4);
    }

    #[test]
    fn test_copy_from_index_overlap() {
        // "AB" at slots 1,2 then copy 6 bytes from slot 1 -> "ABABAB"
        let mut ring = RingBuffer::with_origin(32, 1);
        let mut out = Vec::new();
        ring.write_bytes(b"AB");

        ring.copy_from_index(1, 6, &mut out).unwrap();
        assert_eq!(out, b"ABABAB");
        assert_eq!(ring.last_bytes(8), b"ABABABAB");
    }

    #[test]
    fn test_copy_single_byte_repeat() {
        let mut ring = RingBuffer::new(32);
        let mut out = Vec::new();
        ring.write_byte(b'X');

        ring.copy_from_distance(1, 5, &mut out).unwrap();
        assert_eq!(out, b"XXXXX");
    }

    #[test]
    fn test_copy_from_unwritten_slot() {
        let mut ring = RingBuffer::with_origin(32, 1);
        let mut out = Vec::new();
        ring.write_bytes(b"AB");

        assert_eq!(ring.copy_from_index(10, 3, &mut out), Err(10));
        assert!(out.is_empty());

        // Slot 0 sits before the origin and is never written first
        assert_eq!(ring.copy_from_index(0, 1, &mut out), Err(0));
        assert_eq!(ring.copy_from_distance(3, 1, &mut out), Err(0));
    }

    #[test]
    fn test_full_window_is_readable_everywhere() {
        let mut ring = RingBuffer::with_origin(8, 1);
        ring.write_bytes(&[7u8; 8]);
        assert!((0..8).all(|i| ring.get(i) == Some(7)));
    }

    #[test]
    fn test_clear_rewinds_to_origin() {
        let mut ring = RingBuffer::zun();
        ring.write_bytes(b"abc");
        ring.clear();

        assert!(ring.is_empty());
        assert_eq!(ring.position(), 1);
        assert_eq!(ring.get(1), None);
    }

    #[test]
    #[should_panic(expected = "power of 2")]
    fn test_non_power_of_two_panics() {
        let _ = RingBuffer::new(100);
    }
}
