//! PKCS#1 v1.5 block encoding (RFC 8017, sections 7.2 and 9.2).
//!
//! `Pkcs1Encoding` wraps another `AsymmetricBlockCipher` (usually
//! `RsaEngine`) and pads each input block to the underlying input block
//! size:
//!
//! ```text
//!     type || PS || 0x00 || payload
//! ```
//!
//! With a private key, the block type is 1 and `PS` is a run of 0xFF
//! bytes (signature-style encoding); with a public key, the block type is
//! 2 and `PS` consists of random non-zero bytes (encryption). `PS` is at
//! least eight bytes long, hence a header of at least 10 bytes. The
//! leading zero byte of the RFC layout is implicit: the engine input
//! block is one byte shorter than the modulus.
//!
//! Decoding is performed in constant time with regards to the block
//! contents: all checks are evaluated and combined into a mask, and a
//! single `Error::InvalidCipherText` is reported at the end, whichever
//! check failed. Callers that must not even reveal that the padding was
//! invalid (as in TLS key exchange) can use `with_expected_length()`:
//! decoding then never fails on bad padding, and returns random bytes of
//! the expected length instead of the payload.
//!
//! Strict length checking (the decrypted block must have exactly the
//! expected length) is enabled by default and can be turned off with
//! `Pkcs1Options`, for interoperability with peers that produce
//! improperly short blocks.

use zeroize::Zeroizing;

use crate::{CryptoRngCore, Vec};
use crate::ct;
use crate::engine::AsymmetricBlockCipher;
use crate::error::{Error, Result};
use crate::params::KeyParameter;

/// Minimum padding overhead: type byte, eight padding bytes, separator.
pub const HEADER_LENGTH: usize = 10;

/// Name of the environment variable read by `Pkcs1Options::from_env()`.
pub const STRICT_LENGTH_ENV: &str = "PKCORE_PKCS1_STRICT";

/// Options for PKCS#1 v1.5 decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pkcs1Options {
    /// Require decrypted blocks to have exactly the engine output size.
    pub strict_length: bool,
}

impl Default for Pkcs1Options {
    fn default() -> Self {
        Self { strict_length: true }
    }
}

impl Pkcs1Options {

    /// Reads the options from the environment. Strict length checking
    /// is disabled if `PKCORE_PKCS1_STRICT` is set to `0`, `false` or
    /// `no` (case-insensitive); it is enabled otherwise.
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        let strict_length = match std::env::var(STRICT_LENGTH_ENV) {
            Ok(v) => !is_disabled(&v),
            Err(_) => true,
        };
        if !strict_length {
            log::warn!("PKCS#1 strict length checking disabled by {}",
                STRICT_LENGTH_ENV);
        }
        Self { strict_length }
    }
}

#[cfg(feature = "std")]
fn is_disabled(v: &str) -> bool {
    let v = v.trim();
    v == "0" || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no")
}

/// PKCS#1 v1.5 encoding over an asymmetric block cipher.
#[derive(Clone, Debug)]
pub struct Pkcs1Encoding<C: AsymmetricBlockCipher> {
    engine: C,
    options: Pkcs1Options,
    expected_length: Option<usize>,
    for_encryption: bool,
    for_private_key: bool,
}

impl<C: AsymmetricBlockCipher> Pkcs1Encoding<C> {

    /// Wraps `engine` with the default (strict) options.
    pub fn new(engine: C) -> Self {
        Self::with_options(engine, Pkcs1Options::default())
    }

    /// Wraps `engine` with explicit options.
    pub fn with_options(engine: C, options: Pkcs1Options) -> Self {
        Self {
            engine,
            options,
            expected_length: None,
            for_encryption: false,
            for_private_key: false,
        }
    }

    /// Wraps `engine` for decryption of payloads of exactly
    /// `expected_length` bytes. Malformed blocks then decode to random
    /// bytes instead of an error.
    pub fn with_expected_length(engine: C, expected_length: usize) -> Self {
        let mut e = Self::new(engine);
        e.expected_length = Some(expected_length);
        e
    }

    /// Gets a reference to the wrapped engine.
    pub fn underlying_cipher(&self) -> &C {
        &self.engine
    }

    fn encode_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        let len = self.engine.input_block_size();
        if input.len() + HEADER_LENGTH > len {
            return Err(Error::InvalidArgument("input data too large"));
        }
        let mut block = Zeroizing::new(vec![0u8; len]);
        let sep = len - input.len() - 1;
        if self.for_private_key {
            block[0] = 0x01;
            for b in block[1..sep].iter_mut() {
                *b = 0xFF;
            }
        } else {
            block[0] = 0x02;
            rng.fill_bytes(&mut block[1..sep]);
            for b in block[1..sep].iter_mut() {
                while *b == 0 {
                    let mut t = [0u8; 1];
                    rng.fill_bytes(&mut t);
                    *b = t[0];
                }
            }
        }
        block[sep] = 0x00;
        block[(sep + 1)..].copy_from_slice(input);
        self.engine.process_block(rng, &block[..])
    }

    fn decode_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        if let Some(plen) = self.expected_length {
            return self.decode_block_or_random(rng, input, plen);
        }

        let block = Zeroizing::new(self.engine.process_block(rng, input)?);
        if block.is_empty() {
            return Err(Error::InvalidCipherText);
        }
        let len_ok = if self.options.strict_length {
            ct::eq_usize(block.len(), self.engine.output_block_size())
        } else {
            0xFFFFFFFF
        };

        // A private key decrypts type 2 blocks; a public key recovers
        // type 1 blocks.
        let expected = if self.for_private_key { 0x02 } else { 0x01 };
        let mut good = len_ok & ct::eq_u8(block[0], expected);

        // Locate the first zero byte; for type 1, every byte before it
        // must be 0xFF.
        let mut found = 0u32;
        let mut sep = 0usize;
        for i in 1..block.len() {
            let z = ct::eq_u8(block[i], 0x00);
            sep = ct::select_usize(z & !found, i, sep);
            if expected == 0x01 {
                good &= found | z | ct::eq_u8(block[i], 0xFF);
            }
            found |= z;
        }
        good &= found & !ct::lt_usize(sep, HEADER_LENGTH - 1);

        if good == 0 {
            return Err(Error::InvalidCipherText);
        }
        Ok(block[(sep + 1)..].to_vec())
    }

    fn decode_block_or_random(&mut self, rng: &mut dyn CryptoRngCore,
        input: &[u8], plen: usize) -> Result<Vec<u8>>
    {
        if !self.for_private_key {
            return Err(Error::InvalidArgument(
                "decode-or-random is only for decryption with a private key"));
        }

        // Random output is drawn before the padding is examined.
        let mut random = Zeroizing::new(vec![0u8; plen]);
        rng.fill_bytes(&mut random[..]);

        let block = Zeroizing::new(self.engine.process_block(rng, input)?);
        let len = block.len();
        if len < plen + HEADER_LENGTH {
            return Ok(random.to_vec());
        }

        let mut good = ct::eq_u8(block[0], 0x02);
        if self.options.strict_length {
            good &= ct::eq_usize(len, self.engine.output_block_size());
        }
        let sep = len - plen - 1;
        for i in 1..sep {
            good &= !ct::eq_u8(block[i], 0x00);
        }
        good &= ct::eq_u8(block[sep], 0x00);

        let mut out = Vec::with_capacity(plen);
        for i in 0..plen {
            out.push(ct::select_u8(good, block[sep + 1 + i], random[i]));
        }
        Ok(out)
    }
}

impl<C: AsymmetricBlockCipher> AsymmetricBlockCipher for Pkcs1Encoding<C> {
    type Key = C::Key;

    fn algorithm_name(&self) -> &'static str {
        "PKCS1"
    }

    fn init(&mut self, for_encryption: bool, key: C::Key) -> Result<()> {
        self.for_private_key = key.is_private();
        self.for_encryption = for_encryption;
        self.engine.init(for_encryption, key)?;
        let block_len = if for_encryption {
            self.engine.input_block_size()
        } else {
            self.engine.output_block_size()
        };
        if block_len < HEADER_LENGTH {
            log::debug!("PKCS#1 v1.5 init rejected: block={}", block_len);
            return Err(Error::KeyTooSmall);
        }
        log::debug!("PKCS#1 v1.5 init over {}: encryption={} private={} strict={}",
            self.engine.algorithm_name(), for_encryption,
            self.for_private_key, self.options.strict_length);
        Ok(())
    }

    fn input_block_size(&self) -> usize {
        let n = self.engine.input_block_size();
        if self.for_encryption {
            n.saturating_sub(HEADER_LENGTH)
        } else {
            n
        }
    }

    fn output_block_size(&self) -> usize {
        let n = self.engine.output_block_size();
        if self.for_encryption {
            n
        } else {
            n.saturating_sub(HEADER_LENGTH)
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

#[cfg(test)]
mod tests {

    use super::*;
    use alloc::sync::Arc;
    use num_bigint::BigUint;
    use crate::elgamal::{self, ElGamalEngine};
    use crate::params::{ElGamalParameters, KeyRole, RsaPublicKey};
    use crate::rsa::RsaEngine;
    use crate::testing::{modp768, rsa_key, TestRng};

    // Encryption of "hello pkcs1" under the test key, by an independent
    // implementation.
    const KAT_ENC: &str = concat!(
        "43797153ffbd9433c6b0666df9c750d4267ca879266a3068a8f8ef1eafcf47a0",
        "6cf1ec4f2aa1386d3758d1769585f534e481c87b9ba59240bbdb6644260ed9e1",
        "adc4b8cd34db323d15f6040d73b3f99f3482e1a6dae3da462e35f20f3f4b9b02",
        "9a29249e74b3be15584f3c2149940f6b2bef5251c93f55858e91de110f694820");

    // Raw RSA over the type 1 block of "raw payload".
    const KAT_SIG: &str = concat!(
        "6b3e2fdf67da61fe14b15c7d8d4c7dea56749cce6db478adced5ab2cf17beb4c",
        "a1a2ff53deadc7d3820da536c8cb29328fd232484e05e1aee21a7065d06c8398",
        "9568c947c855b1fda1cfbb66b138d1d4c9071873fea6e9d63a54b60d9b0d7542",
        "5d1eb25f7f30129468bd96ba21deccfc7f4cb2d3660d8172fe2a95dd131eb4b5");

    fn rsa_pair() -> (Pkcs1Encoding<RsaEngine>, Pkcs1Encoding<RsaEngine>) {
        let sk = rsa_key();
        let mut enc = Pkcs1Encoding::new(RsaEngine::new());
        enc.init(true, KeyRole::Public(sk.public_key())).unwrap();
        let mut dec = Pkcs1Encoding::new(RsaEngine::new());
        dec.init(false, KeyRole::Private(sk)).unwrap();
        (enc, dec)
    }

    #[test]
    fn known_answers() {
        let mut rng = TestRng::new(b"pkcs1 kat");
        let (_, mut dec) = rsa_pair();
        let c = hex::decode(KAT_ENC).unwrap();
        assert!(dec.process_block(&mut rng, &c).unwrap() == b"hello pkcs1");

        // Type 1 encoding is deterministic.
        let sk = rsa_key();
        let mut signer = Pkcs1Encoding::new(RsaEngine::new());
        signer.init(true, KeyRole::Private(sk.clone())).unwrap();
        let s = signer.process_block(&mut rng, b"raw payload").unwrap();
        assert!(s == hex::decode(KAT_SIG).unwrap());

        let mut verifier = Pkcs1Encoding::new(RsaEngine::new());
        verifier.init(false, KeyRole::Public(sk.public_key())).unwrap();
        assert!(verifier.process_block(&mut rng, &s).unwrap() == b"raw payload");

        // A type 2 block is not accepted by a public key decoder, and
        // a type 1 block is not accepted by a private key decoder.
        assert!(verifier.process_block(&mut rng, &c)
            == Err(Error::InvalidCipherText));
        assert!(dec.process_block(&mut rng, &s)
            == Err(Error::InvalidCipherText));
    }

    #[test]
    fn round_trip() {
        let mut rng = TestRng::new(b"pkcs1 round trip");
        let (mut enc, mut dec) = rsa_pair();
        assert!(enc.input_block_size() == 117);
        assert!(enc.output_block_size() == 128);
        assert!(dec.output_block_size() == 117);
        for len in [0, 1, 16, 100, 117] {
            let msg: Vec<u8> = (0..len).map(|i| (i * 7 + 1) as u8).collect();
            let c = enc.process_block(&mut rng, &msg).unwrap();
            assert!(c.len() == 128);
            assert!(dec.process_block(&mut rng, &c).unwrap() == msg);
        }
        assert!(matches!(enc.process_block(&mut rng, &[0u8; 118]),
            Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn small_modulus() {
        let mut rng = TestRng::new(b"pkcs1 small");
        let e = BigUint::from(65537u32);
        let pk = |bits: u64| {
            let mut n = BigUint::from(1u32);
            n.set_bit(bits - 1, true);
            RsaPublicKey::new(n, e.clone()).unwrap()
        };

        // Engine blocks of 1 and 7 bytes leave no room for the header.
        let tiny = RsaPublicKey::new(BigUint::from(64507u32),
            BigUint::from(5u32)).unwrap();
        let mut enc = Pkcs1Encoding::new(RsaEngine::new());
        assert!(enc.init(true, KeyRole::Public(tiny)).unwrap_err()
            == Error::KeyTooSmall);
        let mut enc = Pkcs1Encoding::new(RsaEngine::new());
        assert!(enc.init(true, KeyRole::Public(pk(64))).unwrap_err()
            == Error::KeyTooSmall);
        let mut dec = Pkcs1Encoding::new(RsaEngine::new());
        assert!(dec.init(false, KeyRole::Public(pk(64))).unwrap_err()
            == Error::KeyTooSmall);

        // An 88-bit modulus gives a 10-byte block: empty payloads only.
        let mut enc = Pkcs1Encoding::new(RsaEngine::new());
        enc.init(true, KeyRole::Public(pk(88))).unwrap();
        assert!(enc.input_block_size() == 0);
        assert!(enc.process_block(&mut rng, b"").unwrap().len() == 11);
        assert!(matches!(enc.process_block(&mut rng, b"x"),
            Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn tamper() {
        let mut rng = TestRng::new(b"pkcs1 tamper");
        let sk = rsa_key();
        let pk = sk.public_key();
        let (_, mut dec) = rsa_pair();

        // Build bad blocks directly and encrypt them with raw RSA.
        let mut raw = RsaEngine::new();
        raw.init(true, KeyRole::Public(pk)).unwrap();
        let good = {
            let mut b = vec![0x02u8; 127];
            b[120] = 0x00;
            b
        };
        let c = raw.process_block(&mut rng, &good).unwrap();
        assert!(dec.process_block(&mut rng, &c).unwrap() == [0x02; 6]);

        // Wrong type byte.
        let mut b = good.clone();
        b[0] = 0x03;
        let c = raw.process_block(&mut rng, &b).unwrap();
        assert!(dec.process_block(&mut rng, &c) == Err(Error::InvalidCipherText));

        // No separator.
        let b = vec![0x02u8; 127];
        let c = raw.process_block(&mut rng, &b).unwrap();
        assert!(dec.process_block(&mut rng, &c) == Err(Error::InvalidCipherText));

        // Separator too early (only seven padding bytes).
        let mut b = vec![0x02u8; 127];
        b[8] = 0x00;
        let c = raw.process_block(&mut rng, &b).unwrap();
        assert!(dec.process_block(&mut rng, &c) == Err(Error::InvalidCipherText));
        b[8] = 0x02;
        b[9] = 0x00;
        let c = raw.process_block(&mut rng, &b).unwrap();
        assert!(dec.process_block(&mut rng, &c).unwrap().len() == 117);

        // Short block: rejected in strict mode only.
        let mut b = vec![0x02u8; 126];
        b[100] = 0x00;
        let c = raw.process_block(&mut rng, &b).unwrap();
        assert!(dec.process_block(&mut rng, &c) == Err(Error::InvalidCipherText));
        let mut lax = Pkcs1Encoding::with_options(RsaEngine::new(),
            Pkcs1Options { strict_length: false });
        lax.init(false, KeyRole::Private(sk)).unwrap();
        assert!(lax.process_block(&mut rng, &c).unwrap() == [0x02; 25]);

        // Any single bit flip in a genuine ciphertext is caught.
        let (mut enc, _) = rsa_pair();
        let c = enc.process_block(&mut rng, b"bit flips").unwrap();
        for i in [0, 1, 31, 64, 127] {
            let mut t = c.clone();
            t[i] ^= 0x10;
            let r = dec.process_block(&mut rng, &t);
            assert!(r.is_err() || r.unwrap() != b"bit flips");
        }
    }

    #[test]
    fn decode_or_random() {
        let mut rng = TestRng::new(b"pkcs1 random");
        let sk = rsa_key();
        let (mut enc, _) = rsa_pair();
        let mut dec = Pkcs1Encoding::with_expected_length(RsaEngine::new(), 16);
        dec.init(false, KeyRole::Private(sk.clone())).unwrap();

        let key = [0x5Au8; 16];
        let c = enc.process_block(&mut rng, &key).unwrap();
        assert!(dec.process_block(&mut rng, &c).unwrap() == key);

        // Wrong length: random output, no error.
        let c = enc.process_block(&mut rng, &[0x5Au8; 15]).unwrap();
        let r1 = dec.process_block(&mut rng, &c).unwrap();
        let r2 = dec.process_block(&mut rng, &c).unwrap();
        assert!(r1.len() == 16 && r2.len() == 16);
        assert!(r1 != r2);

        let mut wrong_role = Pkcs1Encoding::with_expected_length(
            RsaEngine::new(), 16);
        wrong_role.init(false, KeyRole::Public(sk.public_key())).unwrap();
        assert!(wrong_role.process_block(&mut rng, &c).is_err());
    }

    #[test]
    fn over_elgamal() {
        let mut rng = TestRng::new(b"pkcs1 elgamal");
        let pp = Arc::new(ElGamalParameters::new(modp768(),
            BigUint::from(2u32), 0).unwrap());
        let (sk, pk) = elgamal::generate_key_pair(pp, &mut rng);
        let mut enc = Pkcs1Encoding::new(ElGamalEngine::new());
        enc.init(true, KeyRole::Public(pk)).unwrap();
        let mut dec = Pkcs1Encoding::new(ElGamalEngine::new());
        dec.init(false, KeyRole::Private(sk)).unwrap();
        assert!(enc.input_block_size() == 85);
        let c = enc.process_block(&mut rng, b"PKCS#1 over ElGamal").unwrap();
        assert!(c.len() == 192);
        assert!(dec.process_block(&mut rng, &c).unwrap() == b"PKCS#1 over ElGamal");
    }

    #[cfg(feature = "std")]
    #[test]
    fn env_values() {
        assert!(is_disabled("0"));
        assert!(is_disabled("False"));
        assert!(is_disabled(" no "));
        assert!(!is_disabled("1"));
        assert!(!is_disabled("true"));
        assert!(Pkcs1Options::default().strict_length);
    }
}
