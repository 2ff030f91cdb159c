//! ElGamal encryption over a prime field.
//!
//! A message `m` (an integer lower than `p`) is encrypted under the
//! public value `y = g^x mod p` as the pair:
//!
//! ```text
//!     gamma = g^k mod p
//!     phi   = m*y^k mod p
//! ```
//!
//! for a fresh random `k`; both halves are encoded over the byte length
//! of `p` and concatenated, so that the ciphertext is twice as long as
//! the modulus. Decryption computes `m = phi*gamma^(p-1-x) mod p`.
//!
//! Unlike RSA, the operation is fully determined by the mode: the engine
//! must be initialized with a public key for encryption and with a
//! private key for decryption. ElGamal is malleable and should normally
//! be wrapped in an encoding such as `Pkcs1Encoding`.

use alloc::sync::Arc;
use num_bigint::BigUint;

use crate::{CryptoRngCore, Vec};
use crate::bigint;
use crate::dh;
use crate::engine::AsymmetricBlockCipher;
use crate::error::{Error, Result};
use crate::params::{ElGamalKey, ElGamalParameters, ElGamalPrivateKey,
    ElGamalPublicKey, KeyRole};

/// ElGamal block engine.
#[derive(Clone, Debug, Default)]
pub struct ElGamalEngine {
    key: Option<ElGamalKey>,
    for_encryption: bool,
    bit_size: usize,
}

impl ElGamalEngine {

    /// Creates a new, uninitialized engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn encrypt(&self, pk: &ElGamalPublicKey, rng: &mut dyn CryptoRngCore,
        m: &BigUint) -> Result<Vec<u8>>
    {
        let pp = &pk.parameters;
        let p = &pp.p;

        // k is uniform in [1, p-2].
        let pm1 = p - 1u32;
        let k = bigint::random_nonzero_below(rng, &pm1);

        let gamma = pp.g.modpow(&k, p);
        let phi = (m * pk.y.modpow(&k, p)) % p;

        let half = self.output_block_size() >> 1;
        let mut out = bigint::to_fixed_bytes(&gamma, half)?;
        out.extend_from_slice(&bigint::to_fixed_bytes(&phi, half)?);
        Ok(out)
    }

    fn decrypt(&self, sk: &ElGamalPrivateKey, input: &[u8])
        -> Result<Vec<u8>>
    {
        let p = &sk.parameters.p;
        let half = self.input_block_size() >> 1;
        if input.len() != (half << 1) {
            return Err(Error::DataLength("invalid ElGamal ciphertext length"));
        }
        let gamma = bigint::from_unsigned_bytes(&input[..half]);
        let phi = bigint::from_unsigned_bytes(&input[half..]);
        if &gamma >= p || &phi >= p {
            return Err(Error::DataLength("ElGamal ciphertext value too large"));
        }

        // gamma^(p-1-x) = gamma^(-x) (Fermat).
        let e = p - 1u32 - &sk.x;
        let m = (gamma.modpow(&e, p) * phi) % p;
        Ok(bigint::to_unsigned_bytes(&m))
    }
}

impl AsymmetricBlockCipher for ElGamalEngine {
    type Key = ElGamalKey;

    fn algorithm_name(&self) -> &'static str {
        "ElGamal"
    }

    fn init(&mut self, for_encryption: bool, key: ElGamalKey) -> Result<()> {
        let p = match (&key, for_encryption) {
            (KeyRole::Public(k), true) => &k.parameters.p,
            (KeyRole::Private(k), false) => &k.parameters.p,
            (KeyRole::Private(_), true) => {
                return Err(Error::InvalidArgument(
                    "ElGamal public key required for encryption"));
            }
            (KeyRole::Public(_), false) => {
                return Err(Error::InvalidArgument(
                    "ElGamal private key required for decryption"));
            }
        };
        self.bit_size = bigint::bit_length(p);
        log::debug!("ElGamal engine init: encryption={} bits={}",
            for_encryption, self.bit_size);
        self.key = Some(key);
        self.for_encryption = for_encryption;
        Ok(())
    }

    fn input_block_size(&self) -> usize {
        if self.for_encryption {
            (self.bit_size.saturating_sub(1)) >> 3
        } else {
            ((self.bit_size + 7) >> 3) << 1
        }
    }

    fn output_block_size(&self) -> usize {
        if self.for_encryption {
            ((self.bit_size + 7) >> 3) << 1
        } else {
            (self.bit_size.saturating_sub(1)) >> 3
        }
    }

    fn key_size(&self) -> usize {
        self.bit_size
    }

    fn process_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        match &self.key {
            Some(KeyRole::Public(pk)) => {
                // One extra byte is tolerated as long as the value is
                // lower than the modulus.
                if input.len() > self.input_block_size() + 1 {
                    return Err(Error::DataLength("input too large for ElGamal cipher"));
                }
                let m = bigint::from_unsigned_bytes(input);
                if m >= pk.parameters.p {
                    return Err(Error::DataLength("input too large for ElGamal cipher"));
                }
                self.encrypt(pk, rng, &m)
            }
            Some(KeyRole::Private(sk)) => self.decrypt(sk, input),
            None => Err(Error::InvalidState("ElGamal engine not initialised")),
        }
    }
}

/// Generates an ElGamal key pair for the provided parameters.
///
/// If the parameters specify a private value length `l`, the private
/// exponent has exactly `l` bits; otherwise it is uniform in `[2, p-2]`.
pub fn generate_key_pair(parameters: Arc<ElGamalParameters>,
    rng: &mut dyn CryptoRngCore) -> (ElGamalPrivateKey, ElGamalPublicKey)
{
    let x = dh::calculate_private(&parameters.p, None, parameters.l, rng);
    let sk = ElGamalPrivateKey { x, parameters };
    let pk = sk.public_key();
    (sk, pk)
}
