//! Block cipher interface, and AES.
//!
//! A `BlockCipher` is keyed once for a direction, then transforms blocks
//! in place. Modes and key-wrap algorithms are written against this
//! trait; `AesEngine` implements it with the `aes` crate (AES-128,
//! AES-192 or AES-256, selected by the key length).

use aes::{Aes128, Aes192, Aes256, Block};
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::error::{Error, Result};

/// A block cipher.
pub trait BlockCipher {

    /// Name of the algorithm, for diagnostics.
    fn algorithm_name(&self) -> &'static str;

    /// Block size, in bytes.
    fn block_size(&self) -> usize;

    /// Sets the key and direction.
    fn init(&mut self, for_encryption: bool, key: &[u8]) -> Result<()>;

    /// Encrypts or decrypts one block in place. The slice length must
    /// be exactly the block size.
    fn process_block(&self, block: &mut [u8]) -> Result<()>;
}

#[derive(Clone)]
enum AesKey {
    K128(Aes128),
    K192(Aes192),
    K256(Aes256),
}

/// AES block cipher.
#[derive(Clone, Default)]
pub struct AesEngine {
    key: Option<AesKey>,
    for_encryption: bool,
}

impl AesEngine {

    /// Creates a new, unkeyed engine.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockCipher for AesEngine {

    fn algorithm_name(&self) -> &'static str {
        "AES"
    }

    fn block_size(&self) -> usize {
        16
    }

    fn init(&mut self, for_encryption: bool, key: &[u8]) -> Result<()> {
        let k = match key.len() {
            16 => Aes128::new_from_slice(key).map(AesKey::K128),
            24 => Aes192::new_from_slice(key).map(AesKey::K192),
            32 => Aes256::new_from_slice(key).map(AesKey::K256),
            _ => return Err(Error::InvalidArgument("AES key must be 16, 24 or 32 bytes")),
        };
        let k = k.map_err(|_| Error::InvalidArgument("invalid AES key"))?;
        self.key = Some(k);
        self.for_encryption = for_encryption;
        Ok(())
    }

    fn process_block(&self, block: &mut [u8]) -> Result<()> {
        let key = self.key.as_ref()
            .ok_or(Error::InvalidState("AES engine not initialised"))?;
        if block.len() != 16 {
            return Err(Error::DataLength("AES block must be 16 bytes"));
        }
        let b = Block::from_mut_slice(block);
        match (key, self.for_encryption) {
            (AesKey::K128(c), true) => c.encrypt_block(b),
            (AesKey::K128(c), false) => c.decrypt_block(b),
            (AesKey::K192(c), true) => c.encrypt_block(b),
            (AesKey::K192(c), false) => c.decrypt_block(b),
            (AesKey::K256(c), true) => c.encrypt_block(b),
            (AesKey::K256(c), false) => c.decrypt_block(b),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn fips197() {
        // FIPS 197, appendix C.1 and C.3.
        let pt = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let k1 = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let k3 = hex::decode(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f").unwrap();

        let mut e = AesEngine::new();
        let mut buf = pt.clone();
        assert!(e.process_block(&mut buf).is_err());
        e.init(true, &k1).unwrap();
        e.process_block(&mut buf).unwrap();
        assert!(buf == hex::decode("69c4e0d86a7b0430d8cdb78070b4c55a").unwrap());
        let mut d = AesEngine::new();
        d.init(false, &k1).unwrap();
        d.process_block(&mut buf).unwrap();
        assert!(buf == pt);

        e.init(true, &k3).unwrap();
        e.process_block(&mut buf).unwrap();
        assert!(buf == hex::decode("8ea2b7ca516745bfeafc49904b496089").unwrap());

        assert!(e.init(true, &k1[..15]).is_err());
        assert!(e.process_block(&mut buf[..8]).is_err());
        assert!(e.block_size() == 16);
    }
}
