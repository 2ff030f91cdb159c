//! OAEP encoding (RFC 8017, section 7.1).
//!
//! `OaepEncoding` wraps an asymmetric block cipher and encodes each
//! message `M` into a block of the engine input size (`k-1` bytes for a
//! `k`-byte RSA modulus):
//!
//! ```text
//!     DB         = lHash || PS || 0x01 || M
//!     maskedDB   = DB xor MGF1(seed, len(DB))
//!     maskedSeed = seed xor MGF1(maskedDB, hLen)
//!     block      = maskedSeed || maskedDB
//! ```
//!
//! where `lHash` is the hash of the (optional) label, `PS` a run of zeros
//! and `seed` a fresh random string of `hLen` bytes. The leading zero
//! byte of the RFC layout is implicit, as with `Pkcs1Encoding`.
//!
//! The content hash `D` and the MGF1 hash `M` are type parameters; both
//! default to SHA-1, and `M` defaults to `D` when only `D` is specified.
//!
//! Decoding is constant-time with regards to the decrypted block, and
//! every failure (label hash mismatch, missing 0x01 delimiter, block of
//! the wrong size) yields the same `Error::InvalidCipherText`. A key too
//! small for the hash size is rejected at `init()` time.

use core::marker::PhantomData;

use digest::Digest;
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::{CryptoRngCore, Vec};
use crate::ct;
use crate::engine::AsymmetricBlockCipher;
use crate::error::{Error, Result};
use crate::mgf::mgf1_xor;

/// OAEP encoding over an asymmetric block cipher.
pub struct OaepEncoding<C: AsymmetricBlockCipher, D: Digest = Sha1, M: Digest = D> {
    engine: C,
    label_hash: Vec<u8>,
    for_encryption: bool,
    _hashes: PhantomData<fn() -> (D, M)>,
}

impl<C, D, M> OaepEncoding<C, D, M>
where
    C: AsymmetricBlockCipher,
    D: Digest,
    M: Digest,
{

    /// Wraps `engine`, with an empty label.
    pub fn new(engine: C) -> Self {
        Self::with_label(engine, &[])
    }

    /// Wraps `engine`, with the provided label (encoding parameters).
    pub fn with_label(engine: C, label: &[u8]) -> Self {
        Self {
            engine,
            label_hash: D::digest(label).to_vec(),
            for_encryption: false,
            _hashes: PhantomData,
        }
    }

    /// Gets a reference to the wrapped engine.
    pub fn underlying_cipher(&self) -> &C {
        &self.engine
    }

    fn hash_len() -> usize {
        <D as Digest>::output_size()
    }

    // Size of the encoded block (engine input when encrypting, engine
    // output when decrypting).
    fn block_len(&self) -> usize {
        if self.for_encryption {
            self.engine.input_block_size()
        } else {
            self.engine.output_block_size()
        }
    }

    fn encode_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        if input.len() > self.input_block_size() {
            return Err(Error::DataLength("input data too long"));
        }
        let hlen = Self::hash_len();
        let len = self.block_len();
        let mut block = Zeroizing::new(vec![0u8; len]);

        block[(len - input.len())..].copy_from_slice(input);
        block[len - input.len() - 1] = 0x01;
        block[hlen..(2 * hlen)].copy_from_slice(&self.label_hash);

        let (seed, db) = block.split_at_mut(hlen);
        rng.fill_bytes(seed);
        mgf1_xor::<M>(seed, db);
        mgf1_xor::<M>(db, seed);

        self.engine.process_block(rng, &block[..])
    }

    fn decode_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        let data = Zeroizing::new(self.engine.process_block(rng, input)?);
        let hlen = Self::hash_len();
        let len = self.block_len();
        if len < 2 * hlen + 1 {
            return Err(Error::InvalidCipherText);
        }

        // Realign the (minimal-length) engine output on the block size.
        let mut block = Zeroizing::new(vec![0u8; len]);
        let mut good = 0xFFFFFFFFu32;
        if data.len() <= len {
            block[(len - data.len())..].copy_from_slice(&data[..]);
        } else {
            block.copy_from_slice(&data[..len]);
            good = 0;
        }

        let (seed, db) = block.split_at_mut(hlen);
        mgf1_xor::<M>(db, seed);
        mgf1_xor::<M>(seed, db);

        good &= ct::slice_eq(&db[..hlen], &self.label_hash);

        // Skip the zeros; the first non-zero byte must be 0x01.
        let mut found = 0u32;
        let mut start = 0usize;
        for i in hlen..db.len() {
            let nz = !ct::eq_u8(db[i], 0x00);
            let first = nz & !found;
            start = ct::select_usize(first, i, start);
            good &= !first | ct::eq_u8(db[i], 0x01);
            found |= nz;
        }
        good &= found;

        if good == 0 {
            return Err(Error::InvalidCipherText);
        }
        Ok(db[(start + 1)..].to_vec())
    }
}

impl<C, D, M> AsymmetricBlockCipher for OaepEncoding<C, D, M>
where
    C: AsymmetricBlockCipher,
    D: Digest,
    M: Digest,
{
    type Key = C::Key;

    fn algorithm_name(&self) -> &'static str {
        "OAEP"
    }

    fn init(&mut self, for_encryption: bool, key: C::Key) -> Result<()> {
        self.engine.init(for_encryption, key)?;
        self.for_encryption = for_encryption;
        let hlen = Self::hash_len();
        if self.block_len() < 2 * hlen + 1 {
            log::debug!("OAEP init rejected: block={} hash={}",
                self.block_len(), hlen);
            return Err(Error::KeyTooSmall);
        }
        log::debug!("OAEP init over {}: encryption={} hash={}",
            self.engine.algorithm_name(), for_encryption, hlen);
        Ok(())
    }

    fn input_block_size(&self) -> usize {
        let n = self.engine.input_block_size();
        if self.for_encryption {
            n.saturating_sub(1 + 2 * Self::hash_len())
        } else {
            n
        }
    }

    fn output_block_size(&self) -> usize {
        let n = self.engine.output_block_size();
        if self.for_encryption {
            n
        } else {
            n.saturating_sub(1 + 2 * Self::hash_len())
        }
    }

    fn key_size(&self) -> usize {
        self.engine.key_size()
    }

    fn process_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        if self.for_encryption {
            self.encode_block(rng, input)
        } else {
            self.decode_block(rng, input)
        }
    }
}
