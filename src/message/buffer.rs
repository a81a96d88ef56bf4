//! The fixed-size PD message buffer.
//!
//! Replaces the C firmware's `union pd_msg` (`lib/include/pdb_msg.h`): a
//! 30-byte raw payload, little-endian throughout, viewable either as a
//! header plus up to seven 32-bit data objects, or as a header plus a
//! 16-bit extended header plus 26 data bytes. Rather than keep that as a
//! union with redundant cached fields, [`MessageBuffer`] keeps only the raw
//! bytes and a length; callers parse the [`super::header::Header`] and data
//! objects on demand via [`super::header`]/[`super::pdo`]/[`super::rdo`],
//! per the REDESIGN FLAGS in the design notes.

/// Maximum encoded size of a PD message: 2-byte header + 7 * 4-byte objects.
pub const MAX_MESSAGE_LEN: usize = 2 + 7 * 4;

/// A single PD message buffer, owned by exactly one layer at a time.
///
/// Buffers are never allocated on the heap; they live in the fixed-size
/// [`super::pool::Pool`] and pass between tasks by value through mailboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageBuffer {
    bytes: [u8; MAX_MESSAGE_LEN],
    len: usize,
}

impl MessageBuffer {
    /// An all-zero buffer with no valid content (`len == 0`).
    pub const EMPTY: Self = Self {
        bytes: [0; MAX_MESSAGE_LEN],
        len: 0,
    };

    /// Build a buffer from a 2-byte header plus `n` little-endian `u32`
    /// data objects (`n` must be 0..=7).
    #[must_use]
    pub fn from_header_and_objects(header: u16, objects: &[u32]) -> Self {
        debug_assert!(objects.len() <= 7);
        let mut bytes = [0u8; MAX_MESSAGE_LEN];
        bytes[0..2].copy_from_slice(&header.to_le_bytes());
        let mut offset = 2;
        for obj in objects {
            bytes[offset..offset + 4].copy_from_slice(&obj.to_le_bytes());
            offset += 4;
        }
        Self {
            bytes,
            len: offset,
        }
    }

    /// Build a buffer from raw encoded bytes, e.g. as read from the PHY.
    ///
    /// `data` must be at least 2 bytes (a bare header) and at most
    /// [`MAX_MESSAGE_LEN`].
    #[must_use]
    pub fn from_raw(data: &[u8]) -> Self {
        debug_assert!((2..=MAX_MESSAGE_LEN).contains(&data.len()));
        let mut bytes = [0u8; MAX_MESSAGE_LEN];
        bytes[..data.len()].copy_from_slice(data);
        Self {
            bytes,
            len: data.len(),
        }
    }

    /// The raw encoded bytes, header first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Mutable access to the full backing storage, for PHY drivers that
    /// write directly into the buffer (`read_message`).
    pub fn storage_mut(&mut self) -> &mut [u8; MAX_MESSAGE_LEN] {
        &mut self.bytes
    }

    /// Record how many bytes of `storage_mut` are valid, after a PHY read.
    pub fn set_len(&mut self, len: usize) {
        debug_assert!(len <= MAX_MESSAGE_LEN);
        self.len = len;
    }

    /// The 16-bit header word.
    #[must_use]
    pub fn raw_header(&self) -> u16 {
        u16::from_le_bytes([self.bytes[0], self.bytes[1]])
    }

    /// Overwrite the header word in place (used to stamp the message ID
    /// just before transmission).
    pub fn set_raw_header(&mut self, header: u16) {
        self.bytes[0..2].copy_from_slice(&header.to_le_bytes());
    }

    /// The `n`th 32-bit data object (0-based), if present.
    #[must_use]
    pub fn data_object(&self, index: usize) -> Option<u32> {
        let start = 2 + index * 4;
        let end = start + 4;
        if end > self.len {
            return None;
        }
        Some(u32::from_le_bytes([
            self.bytes[start],
            self.bytes[start + 1],
            self.bytes[start + 2],
            self.bytes[start + 3],
        ]))
    }
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::EMPTY
    }
}
