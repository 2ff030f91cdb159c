//! GOST R 34.10-2001 signatures over an elliptic curve.
//!
//! The hash value is interpreted as a little-endian integer `e`, reduced
//! modulo `n` (a zero value is replaced with 1). Then:
//!
//! ```text
//!     r = x(k*G) mod n
//!     s = (k*e + d*r) mod n
//! ```
//!
//! Verification computes `v = e^(-1) mod n`, `z1 = s*v mod n`,
//! `z2 = (n - r)*v mod n`, and accepts if `x(z1*G + z2*Q) mod n = r`.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{CryptoRngCore, Vec};
use crate::ec::{Curve, EcKey};
use crate::error::{Error, Result};
use crate::params::KeyRole;
use crate::signer::{Dsa, KCalculator, RandomKCalculator, Signature};

/// GOST R 34.10 signer and verifier over curve `C`.
#[derive(Clone, Debug)]
pub struct Gost3410Signer<C: Curve, K: KCalculator = RandomKCalculator> {
    k_calculator: K,
    key: Option<EcKey<C>>,
}

impl<C: Curve> Gost3410Signer<C, RandomKCalculator> {

    /// Creates a signer with random `k` values.
    pub fn new() -> Self {
        Self::with_k_calculator(RandomKCalculator::new())
    }
}

impl<C: Curve> Default for Gost3410Signer<C, RandomKCalculator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Curve, K: KCalculator> Gost3410Signer<C, K> {

    /// Creates a signer with the provided source of `k` values.
    pub fn with_k_calculator(k_calculator: K) -> Self {
        Self { k_calculator, key: None }
    }
}

fn calculate_e(n: &BigUint, message: &[u8]) -> BigUint {
    let rev: Vec<u8> = message.iter().rev().copied().collect();
    let e = BigUint::from_bytes_be(&rev) % n;
    if e.is_zero() {
        BigUint::one()
    } else {
        e
    }
}

impl<C: Curve, K: KCalculator> Dsa for Gost3410Signer<C, K> {
    type Key = EcKey<C>;

    fn algorithm_name(&self) -> &'static str {
        "ECGOST3410"
    }

    fn init(&mut self, for_signing: bool, key: EcKey<C>) -> Result<()> {
        match (&key, for_signing) {
            (KeyRole::Private(_), true) | (KeyRole::Public(_), false) => {}
            (KeyRole::Public(_), true) => {
                return Err(Error::InvalidArgument(
                    "GOST3410 private key required for signing"));
            }
            (KeyRole::Private(_), false) => {
                return Err(Error::InvalidArgument(
                    "GOST3410 public key required for verification"));
            }
        }
        log::debug!("GOST3410 init: curve={} signing={}", C::NAME, for_signing);
        self.key = Some(key);
        Ok(())
    }

    fn order(&self) -> Option<BigUint> {
        self.key.as_ref().map(|_| C::order())
    }

    fn generate_signature(&mut self, rng: &mut dyn CryptoRngCore,
        message: &[u8]) -> Result<Signature>
    {
        let sk = match &self.key {
            Some(KeyRole::Private(k)) => k,
            Some(KeyRole::Public(_)) => {
                return Err(Error::InvalidState("GOST3410 signer initialised for verification"));
            }
            None => return Err(Error::InvalidState("GOST3410 signer not initialised")),
        };
        let n = C::order();
        let e = calculate_e(&n, message);
        self.k_calculator.init(&n, &sk.d, message);

        loop {
            let k = self.k_calculator.next_k(rng);
            let r = C::x_coordinate(&C::mulgen(&k)) % &n;
            if r.is_zero() {
                log::trace!("GOST3410: r = 0, drawing a new k");
                continue;
            }
            let s = (&k * &e + &sk.d * &r) % &n;
            if s.is_zero() {
                log::trace!("GOST3410: s = 0, drawing a new k");
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
                return Err(Error::InvalidState("GOST3410 signer initialised for signing"));
            }
            None => return Err(Error::InvalidState("GOST3410 signer not initialised")),
        };
        let n = C::order();
        if !signature.in_range(&n) {
            return Ok(false);
        }
        let e = calculate_e(&n, message);
        let v = match e.modinv(&n) {
            Some(v) => v,
            None => return Ok(false),
        };
        let z1 = (&signature.s * &v) % &n;
        let z2 = ((&n - &signature.r) * &v) % &n;
        let p = C::mul_add_mulgen_vartime(&pk.q, &z2, &z1);
        if C::is_neutral(&p) {
            return Ok(false);
        }
        Ok(C::x_coordinate(&p) % &n == signature.r)
    }
}
