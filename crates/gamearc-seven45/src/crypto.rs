//! Header decryption using AES-128-CBC.
//!
//! Whole cipher blocks are decrypted under the configuration's key, chained
//! from its `iv`. The first plaintext block is then masked with `header_iv`.
//! A trailing partial block is left as is.

use cipher::generic_array::GenericArray;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::KeyConfig;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Decrypt a header buffer in place.
pub fn decrypt_in_place(config: &KeyConfig, data: &mut [u8]) {
    let aligned = data.len() - data.len() % BLOCK_SIZE;
    if aligned == 0 {
        return;
    }

    let mut decryptor = Aes128CbcDec::new(
        GenericArray::from_slice(&config.key),
        GenericArray::from_slice(&config.iv),
    );
    for block in data[..aligned].chunks_exact_mut(BLOCK_SIZE) {
        decryptor.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }

    for (byte, mask) in data.iter_mut().zip(config.header_iv) {
        *byte ^= mask;
    }
}

/// Decrypt a header to a new buffer.
pub fn decrypt_header(config: &KeyConfig, data: &[u8]) -> Vec<u8> {
    let mut buffer = data.to_vec();
    decrypt_in_place(config, &mut buffer);
    buffer
}

/// Decrypt just the first block and read the leading little-endian u32.
///
/// Returns `None` if the input is shorter than one block.
pub fn decrypt_magic(config: &KeyConfig, data: &[u8]) -> Option<u32> {
    let mut block: [u8; BLOCK_SIZE] = data.get(..BLOCK_SIZE)?.try_into().ok()?;
    decrypt_in_place(config, &mut block);
    Some(u32::from_le_bytes([block[0], block[1], block[2], block[3]]))
}

/// Encrypt a plaintext header under `config`; the inverse of [`decrypt_header`].
pub fn encrypt_header(config: &KeyConfig, plain: &[u8]) -> Vec<u8> {
    let aligned = plain.len() - plain.len() % BLOCK_SIZE;
    let mut buffer = plain.to_vec();
    if aligned == 0 {
        return buffer;
    }

    for (byte, mask) in buffer.iter_mut().zip(config.header_iv) {
        *byte ^= mask;
    }
    let mut encryptor = Aes128CbcEnc::new(
        GenericArray::from_slice(&config.key),
        GenericArray::from_slice(&config.iv),
    );
    for block in buffer[..aligned].chunks_exact_mut(BLOCK_SIZE) {
        encryptor.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
    buffer
}
