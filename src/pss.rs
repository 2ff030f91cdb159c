//! RSASSA-PSS signatures (RFC 8017, sections 8.1 and 9.1).
//!
//! `PssSigner` hashes the message incrementally with `D`, then builds the
//! encoded message:
//!
//! ```text
//!     M'  = 0x00 x 8 || mHash || salt
//!     H   = Hash(M')
//!     DB  = PS || 0x01 || salt
//!     EM  = (DB xor MGF1(H)) || H || trailer
//! ```
//!
//! with the top bits of `EM` cleared so that it fits in `emBits =
//! modBits - 1` bits; the encoded message then goes through the wrapped
//! engine (`RsaEngine` with a private key) to produce the signature.
//! Verification reverses the process; an invalid signature yields
//! `Ok(false)`, and only misconfiguration is reported as an error.
//!
//! The MGF1 hash `M` defaults to the content hash `D`. The salt length
//! and trailer byte are set at construction; a key that cannot hold
//! `8*hLen + 8*sLen + 9` bits is rejected at `init()` time with
//! `Error::KeyTooSmall`.

use digest::Digest;
use zeroize::Zeroizing;

use crate::{CryptoRngCore, Vec};
use crate::engine::AsymmetricBlockCipher;
use crate::error::{Error, Result};
use crate::mgf::mgf1_xor;

/// Default trailer byte (implicit hash identification).
pub const TRAILER_IMPLICIT: u8 = 0xBC;

/// PSS signer/verifier over an asymmetric block cipher.
pub struct PssSigner<C: AsymmetricBlockCipher, D: Digest, M: Digest = D> {
    engine: C,
    content: D,
    salt_len: usize,
    trailer: u8,
    em_bits: usize,
    initialized: bool,
    _mgf: core::marker::PhantomData<fn() -> M>,
}

impl<C, D, M> PssSigner<C, D, M>
where
    C: AsymmetricBlockCipher,
    D: Digest,
    M: Digest,
{

    /// Creates a signer with the provided salt length (in bytes) and the
    /// default trailer (0xBC).
    pub fn new(engine: C, salt_len: usize) -> Self {
        Self::with_trailer(engine, salt_len, TRAILER_IMPLICIT)
    }

    /// Creates a signer with an explicit trailer byte.
    pub fn with_trailer(engine: C, salt_len: usize, trailer: u8) -> Self {
        Self {
            engine,
            content: D::new(),
            salt_len,
            trailer,
            em_bits: 0,
            initialized: false,
            _mgf: core::marker::PhantomData,
        }
    }

    fn hash_len() -> usize {
        <D as Digest>::output_size()
    }

    /// Initializes for signing (private key) or verification (public
    /// key). Any buffered message data is discarded.
    pub fn init(&mut self, for_signing: bool, key: C::Key) -> Result<()> {
        self.engine.init(for_signing, key)?;
        self.content = D::new();
        self.initialized = false;
        let hlen = Self::hash_len();
        let em_bits = self.engine.key_size().saturating_sub(1);
        if em_bits < 8 * hlen + 8 * self.salt_len + 9 {
            return Err(Error::KeyTooSmall);
        }
        self.em_bits = em_bits;
        self.initialized = true;
        log::debug!("PSS init over {}: signing={} emBits={} hash={} salt={}",
            self.engine.algorithm_name(), for_signing, em_bits, hlen,
            self.salt_len);
        Ok(())
    }

    /// Adds some message data.
    pub fn update(&mut self, data: &[u8]) {
        self.content.update(data);
    }

    // Computes H = Hash(0x00 x 8 || mHash || salt).
    fn hash_m_prime(m_hash: &[u8], salt: &[u8]) -> Vec<u8> {
        let mut h = D::new();
        h.update([0u8; 8]);
        h.update(m_hash);
        h.update(salt);
        h.finalize().to_vec()
    }

    fn em_len(&self) -> usize {
        (self.em_bits + 7) >> 3
    }

    fn top_mask(&self) -> u8 {
        0xFFu8 >> ((self.em_len() << 3) - self.em_bits)
    }

    /// Signs the message accumulated so far, and resets the message
    /// hash.
    pub fn generate_signature(&mut self, rng: &mut dyn CryptoRngCore)
        -> Result<Vec<u8>>
    {
        if !self.initialized {
            return Err(Error::InvalidState("PSS signer not initialised"));
        }
        let m_hash = core::mem::replace(&mut self.content, D::new()).finalize();
        let hlen = Self::hash_len();
        let slen = self.salt_len;

        let mut salt = Zeroizing::new(vec![0u8; slen]);
        rng.fill_bytes(&mut salt[..]);
        let h = Self::hash_m_prime(&m_hash, &salt);

        let len = self.em_len();
        let mut block = Zeroizing::new(vec![0u8; len]);
        block[len - slen - hlen - 2] = 0x01;
        block[(len - slen - hlen - 1)..(len - hlen - 1)].copy_from_slice(&salt);
        mgf1_xor::<M>(&h, &mut block[..(len - hlen - 1)]);
        block[0] &= self.top_mask();
        block[(len - hlen - 1)..(len - 1)].copy_from_slice(&h);
        block[len - 1] = self.trailer;

        self.engine.process_block(rng, &block[..])
    }

    /// Verifies a signature on the message accumulated so far, and
    /// resets the message hash.
    ///
    /// The RNG is passed through to the engine; public key operations
    /// do not consume randomness.
    pub fn verify_signature(&mut self, rng: &mut dyn CryptoRngCore,
        signature: &[u8]) -> Result<bool>
    {
        if !self.initialized {
            return Err(Error::InvalidState("PSS signer not initialised"));
        }
        let m_hash = core::mem::replace(&mut self.content, D::new()).finalize();
        let hlen = Self::hash_len();
        let slen = self.salt_len;
        let len = self.em_len();

        let b = match self.engine.process_block(rng, signature) {
            Ok(b) => Zeroizing::new(b),
            Err(Error::DataLength(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        if b.len() > len {
            return Ok(false);
        }
        let mut block = Zeroizing::new(vec![0u8; len]);
        block[(len - b.len())..].copy_from_slice(&b[..]);

        let mask = self.top_mask();
        if block[0] & !mask != 0 || block[len - 1] != self.trailer {
            return Ok(false);
        }

        let (db, rest) = block.split_at_mut(len - hlen - 1);
        let h = &rest[..hlen];
        mgf1_xor::<M>(h, db);
        db[0] &= mask;

        let ps_len = len - hlen - slen - 2;
        if db[..ps_len].iter().any(|&x| x != 0) || db[ps_len] != 0x01 {
            return Ok(false);
        }
        let salt = &db[(ps_len + 1)..];
        let h2 = Self::hash_m_prime(&m_hash, salt);
        Ok(h2[..] == h[..])
    }
}
