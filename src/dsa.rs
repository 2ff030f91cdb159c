//! DSA signatures (FIPS 186-4, section 4).
//!
//! The message passed to `generate_signature()` and `verify_signature()`
//! is the hash value computed by the caller. It is converted into an
//! integer `e` by keeping its leftmost `min(len, qbits/8)` bytes
//! (big-endian); then:
//!
//! ```text
//!     r = (g^k mod p) mod q
//!     s = k^(-1)*(e + x*r) mod q
//! ```
//!
//! A new `k` is drawn whenever `r` or `s` is zero. Verification checks
//! that `r` and `s` are in `[1, q-1]`, then that
//! `(g^(e*w) * y^(r*w) mod p) mod q = r` with `w = s^(-1) mod q`.

use alloc::sync::Arc;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::CryptoRngCore;
use crate::bigint;
use crate::error::{Error, Result};
use crate::params::{DsaKey, DsaParameters, DsaPrivateKey, DsaPublicKey,
    KeyRole};
use crate::signer::{Dsa, KCalculator, RandomKCalculator, Signature};

/// DSA signer and verifier.
#[derive(Clone, Debug)]
pub struct DsaSigner<K: KCalculator = RandomKCalculator> {
    k_calculator: K,
    key: Option<DsaKey>,
}

impl DsaSigner<RandomKCalculator> {

    /// Creates a signer with random `k` values.
    pub fn new() -> Self {
        Self::with_k_calculator(RandomKCalculator::new())
    }
}

impl Default for DsaSigner<RandomKCalculator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KCalculator> DsaSigner<K> {

    /// Creates a signer with the provided source of `k` values (e.g. a
    /// `HmacKCalculator` for deterministic signatures).
    pub fn with_k_calculator(k_calculator: K) -> Self {
        Self { k_calculator, key: None }
    }

    fn parameters(&self) -> Option<&DsaParameters> {
        match &self.key {
            Some(KeyRole::Private(k)) => Some(&k.parameters),
            Some(KeyRole::Public(k)) => Some(&k.parameters),
            None => None,
        }
    }
}

// Leftmost min(len, qbits/8) bytes of the message.
fn calculate_e(q: &BigUint, message: &[u8]) -> BigUint {
    let len = core::cmp::min(message.len(), bigint::bit_length(q) >> 3);
    BigUint::from_bytes_be(&message[..len])
}

impl<K: KCalculator> Dsa for DsaSigner<K> {
    type Key = DsaKey;

    fn algorithm_name(&self) -> &'static str {
        "DSA"
    }

    fn init(&mut self, for_signing: bool, key: DsaKey) -> Result<()> {
        match (&key, for_signing) {
            (KeyRole::Private(_), true) | (KeyRole::Public(_), false) => {}
            (KeyRole::Public(_), true) => {
                return Err(Error::InvalidArgument(
                    "DSA private key required for signing"));
            }
            (KeyRole::Private(_), false) => {
                return Err(Error::InvalidArgument(
                    "DSA public key required for verification"));
            }
        }
        self.key = Some(key);
        if let Some(pp) = self.parameters() {
            log::debug!("DSA init: signing={} p={} q={}", for_signing,
                pp.p.bits(), pp.q.bits());
        }
        Ok(())
    }

    fn order(&self) -> Option<BigUint> {
        self.parameters().map(|pp| pp.q.clone())
    }

    fn generate_signature(&mut self, rng: &mut dyn CryptoRngCore,
        message: &[u8]) -> Result<Signature>
    {
        let sk = match &self.key {
            Some(KeyRole::Private(k)) => k,
            Some(KeyRole::Public(_)) => {
                return Err(Error::InvalidState("DSA signer initialised for verification"));
            }
            None => return Err(Error::InvalidState("DSA signer not initialised")),
        };
        let pp = &sk.parameters;
        let q = &pp.q;
        let e = calculate_e(q, message);
        self.k_calculator.init(q, &sk.x, message);

        loop {
            let k = self.k_calculator.next_k(rng);
            let r = pp.g.modpow(&k, &pp.p) % q;
            if r.is_zero() {
                log::trace!("DSA: r = 0, drawing a new k");
                continue;
            }
            let kinv = match k.modinv(q) {
                Some(v) => v,
                None => continue,
            };
            let s = (kinv * (&e + &sk.x * &r)) % q;
            if s.is_zero() {
                log::trace!("DSA: s = 0, drawing a new k");
                continue;
            }
            return Ok(Signature { r, s });
        }
    }

    fn verify_signature(&self, message: &[u8], signature: &Signature)
        -> Result<bool>
    {
        let pk = match &self.key {
            Some(KeyRole::Public(k)) => k,
            Some(KeyRole::Private(_)) => {
                return Err(Error::InvalidState("DSA signer initialised for signing"));
            }
            None => return Err(Error::InvalidState("DSA signer not initialised")),
        };
        let pp = &pk.parameters;
        let q = &pp.q;
        if !signature.in_range(q) {
            return Ok(false);
        }
        let e = calculate_e(q, message);
        let w = match signature.s.modinv(q) {
            Some(w) => w,
            None => return Ok(false),
        };
        let u1 = (e * &w) % q;
        let u2 = (&signature.r * &w) % q;
        let v = ((pp.g.modpow(&u1, &pp.p) * pk.y.modpow(&u2, &pp.p)) % &pp.p) % q;
        Ok(v == signature.r)
    }
}

/// Generates a DSA key pair in the provided group. The private key is
/// uniform in `[1, q-1]`, excluding values of low NAF weight.
pub fn generate_key_pair(parameters: Arc<DsaParameters>,
    rng: &mut dyn CryptoRngCore) -> (DsaPrivateKey, DsaPublicKey)
{
    let q = &parameters.q;
    let min_weight = bigint::bit_length(q) >> 2;
    let x = loop {
        let x = bigint::random_nonzero_below(rng, q);
        if bigint::naf_weight(&x) >= min_weight {
            break x;
        }
    };
    let sk = DsaPrivateKey { x, parameters };
    let pk = sk.public_key();
    (sk, pk)
}
