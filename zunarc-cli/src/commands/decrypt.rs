//! Raw buffer decryption.

use crate::utils::write_output;
use std::path::Path;
use zunarc_archive::Cipher;

/// Cipher selection from the command line.
pub struct DecryptOptions {
    /// TH06 additive key.
    pub key: Option<u8>,
    /// TH08+ block size.
    pub block: Option<u32>,
    pub base: Option<u8>,
    pub add: Option<u8>,
}

impl DecryptOptions {
    fn cipher(&self) -> Result<Cipher, String> {
        match (self.key, self.block, self.base, self.add) {
            (Some(key), None, None, None) => Ok(Cipher::Additive { key }),
            (None, Some(block_size), Some(base), Some(add)) => Ok(Cipher::Block {
                block_size,
                base,
                add,
            }),
            _ => Err("use either --key, or --block with --base and --add".to_string()),
        }
    }
}

pub fn cmd_decrypt(
    input: &Path,
    output: Option<&Path>,
    options: &DecryptOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let cipher = options.cipher()?;
    let mut data = std::fs::read(input)?;
    cipher.decrypt(&mut data)?;
    write_output(output, &data)
}
