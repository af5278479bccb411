//! ZUN's light obfuscation ciphers.
//!
//! Two schemes are in use across the games. Neither is meant to protect
//! anything; they only keep casual hex editing away.
//!
//! ## Additive (TH06)
//!
//! Every byte has a running key subtracted from it, and the key grows by 7
//! after each byte.
//!
//! ## Block interleave (TH08 onwards)
//!
//! The buffer is cut into blocks. Inside a block, the first half of the
//! input bytes is spread backwards over the odd positions counted from the
//! block's end, the second half over the even ones. Each byte is XORed with
//! a running key that grows by `add` per byte. A short tail (less than a
//! quarter block) and the last byte of odd-length buffers pass through
//! unchanged.
//!
//! ## Example
//!
//! ```rust
//! use zunarc_archive::crypto::{decrypt_blocks, encrypt_blocks};
//!
//! let original = b"Reimu Hakurei, Marisa Kirisame".to_vec();
//! let mut data = original.clone();
//!
//! encrypt_blocks(&mut data, 8, 0x1b, 0x37).unwrap();
//! assert_ne!(data, original);
//!
//! decrypt_blocks(&mut data, 8, 0x1b, 0x37).unwrap();
//! assert_eq!(data, original);
//! ```

use zunarc_core::error::{Result, ZunError};

/// Key increment of the additive cipher.
pub const ADDITIVE_STEP: u8 = 7;

/// Cipher applied to an entry payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cipher {
    /// Plain bytes.
    #[default]
    None,
    /// TH06 additive cipher.
    Additive {
        /// Starting key.
        key: u8,
    },
    /// TH08+ block interleave cipher.
    Block {
        /// Block size in bytes.
        block_size: u32,
        /// Starting key.
        base: u8,
        /// Key increment per byte.
        add: u8,
    },
}

impl Cipher {
    /// Undo the cipher in place.
    pub fn decrypt(&self, buf: &mut [u8]) -> Result<()> {
        match *self {
            Cipher::None => Ok(()),
            Cipher::Additive { key } => {
                decrypt_additive(buf, key);
                Ok(())
            }
            Cipher::Block {
                block_size,
                base,
                add,
            } => decrypt_blocks(buf, block_size as usize, base, add),
        }
    }

    /// Apply the cipher in place.
    pub fn encrypt(&self, buf: &mut [u8]) -> Result<()> {
        match *self {
            Cipher::None => Ok(()),
            Cipher::Additive { key } => {
                encrypt_additive(buf, key);
                Ok(())
            }
            Cipher::Block {
                block_size,
                base,
                add,
            } => encrypt_blocks(buf, block_size as usize, base, add),
        }
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Cipher::None => "none",
            Cipher::Additive { .. } => "additive",
            Cipher::Block { .. } => "block",
        }
    }
}

/// Undo the TH06 additive cipher in place.
pub fn decrypt_additive(buf: &mut [u8], mut key: u8) {
    for byte in buf.iter_mut() {
        *byte = byte.wrapping_sub(key);
        key = key.wrapping_add(ADDITIVE_STEP);
    }
}

/// Apply the TH06 additive cipher in place.
pub fn encrypt_additive(buf: &mut [u8], mut key: u8) {
    for byte in buf.iter_mut() {
        *byte = byte.wrapping_add(key);
        key = key.wrapping_add(ADDITIVE_STEP);
    }
}

/// Undo the TH08+ block interleave cipher in place.
pub fn decrypt_blocks(buf: &mut [u8], block_size: usize, base: u8, add: u8) -> Result<()> {
    let src = buf.to_vec();
    for_each_block_slot(buf.len(), block_size, base, add, |cipher_pos, plain_pos, key| {
        buf[plain_pos] = src[cipher_pos] ^ key;
    })
}

/// Apply the TH08+ block interleave cipher in place.
pub fn encrypt_blocks(buf: &mut [u8], block_size: usize, base: u8, add: u8) -> Result<()> {
    let src = buf.to_vec();
    for_each_block_slot(buf.len(), block_size, base, add, |cipher_pos, plain_pos, key| {
        buf[cipher_pos] = src[plain_pos] ^ key;
    })
}

/// Walk the cipher layout, calling `f(cipher_pos, plain_pos, key)` once
/// per transformed byte in key order.
fn for_each_block_slot(
    len: usize,
    block_size: usize,
    mut key: u8,
    add: u8,
    mut f: impl FnMut(usize, usize, u8),
) -> Result<()> {
    if block_size == 0 {
        return Err(ZunError::invalid_parameters("block size must be non-zero"));
    }

    let mut left = len;
    if left % block_size < block_size / 4 {
        left -= left % block_size;
    }
    left = left.saturating_sub(len & 1);

    let mut pos = 0;
    let mut block = block_size;
    while left > 0 {
        block = block.min(left);
        let start = pos;

        for i in 0..block.div_ceil(2) {
            f(pos, start + block - 1 - 2 * i, key);
            key = key.wrapping_add(add);
            pos += 1;
        }
        for i in 0..block / 2 {
            f(pos, start + block - 2 - 2 * i, key);
            key = key.wrapping_add(add);
            pos += 1;
        }

        left -= block;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_known_values() {
        let mut data = [0x10, 0x10, 0x10];
        decrypt_additive(&mut data, 0x05);
        assert_eq!(data, [0x0B, 0x04, 0xFD]);

        encrypt_additive(&mut data, 0x05);
        assert_eq!(data, [0x10, 0x10, 0x10]);
    }

    #[test]
    fn test_additive_key_wraps() {
        let mut data = vec![0u8; 300];
        encrypt_additive(&mut data, 0xFF);
        assert_eq!(data[0], 0xFF);
        assert_eq!(data[1], 0x06);
        decrypt_additive(&mut data, 0xFF);
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_block_layout_single_block() {
        // Ciphertext 0..8 with a zero key: the first half lands on positions
        // 7, 5, 3, 1 and the second half on 6, 4, 2, 0.
        let mut data: Vec<u8> = (0..8).collect();
        decrypt_blocks(&mut data, 8, 0, 0).unwrap();
        assert_eq!(data, [7, 3, 6, 2, 5, 1, 4, 0]);
    }

    #[test]
    fn test_block_key_progression() {
        let mut data = vec![0u8; 4];
        decrypt_blocks(&mut data, 4, 0x10, 0x01).unwrap();
        // Keys 0x10, 0x11 go to positions 3, 1; 0x12, 0x13 to 2, 0
        assert_eq!(data, [0x13, 0x11, 0x12, 0x10]);
    }

    #[test]
    fn test_block_short_tail_untouched() {
        // 16 + 3 bytes: 3 < 16 / 4, so the tail is left alone
        let mut data: Vec<u8> = (100..119).collect();
        decrypt_blocks(&mut data, 16, 0x22, 0x33).unwrap();
        assert_eq!(&data[16..], &[116, 117, 118]);
    }

    #[test]
    fn test_block_long_tail_is_a_short_block() {
        // 16 + 6 bytes: 6 >= 16 / 4, so the tail forms a 6-byte block
        let mut data: Vec<u8> = (0..22).collect();
        decrypt_blocks(&mut data, 16, 0, 0).unwrap();
        assert_eq!(&data[16..], &[21, 18, 20, 17, 19, 16]);
    }

    #[test]
    fn test_block_odd_length_keeps_last_byte() {
        let original: Vec<u8> = (0..33).map(|i| i * 3).collect();
        let mut data = original.clone();
        decrypt_blocks(&mut data, 16, 0xAA, 0x05).unwrap();
        // 33 -> 32 after trimming the 1-byte tail, minus 1 for odd length:
        // bytes 31 and 32 pass through
        assert_eq!(&data[31..], &original[31..]);
    }

    #[test]
    fn test_block_roundtrip() {
        for len in [0usize, 1, 2, 7, 64, 100, 257, 1000] {
            let original: Vec<u8> = (0..len).map(|i| (i * 13 + 1) as u8).collect();
            let mut data = original.clone();
            encrypt_blocks(&mut data, 0x40, 0x1b, 0x37).unwrap();
            decrypt_blocks(&mut data, 0x40, 0x1b, 0x37).unwrap();
            assert_eq!(data, original, "len {len}");
        }
    }

    #[test]
    fn test_block_zero_size_rejected() {
        let mut data = vec![1, 2, 3];
        assert!(matches!(
            decrypt_blocks(&mut data, 0, 1, 1),
            Err(ZunError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_cipher_enum_dispatch() {
        let original = b"spell card".to_vec();
        for cipher in [
            Cipher::None,
            Cipher::Additive { key: 0x3A },
            Cipher::Block {
                block_size: 4,
                base: 0x80,
                add: 0x3d,
            },
        ] {
            let mut data = original.clone();
            cipher.encrypt(&mut data).unwrap();
            cipher.decrypt(&mut data).unwrap();
            assert_eq!(data, original, "{}", cipher.name());
        }
    }
}
