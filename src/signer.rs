//! Signature interface for the discrete-logarithm signature schemes,
//! and per-signature secret (`k`) generation.
//!
//! DSA, ECDSA and GOST R 34.10 signatures are all pairs of integers
//! `(r, s)` modulo a group order `n`. The `Dsa` trait is the common
//! interface: a signer is initialized once with a private key (signing)
//! or a public key (verification), then signs or verifies messages
//! (hash values, computed by the caller) any number of times.
//!
//! The secret `k` is obtained from a `KCalculator`. Two implementations
//! are provided:
//!
//!  - `RandomKCalculator`: uniform random `k` in `[1, n-1]`, drawn from
//!    the caller's RNG.
//!
//!  - `HmacKCalculator`: deterministic `k` derived from the private key
//!    and the message with HMAC_DRBG, as specified in [RFC 6979]. The
//!    caller's RNG is then not used.
//!
//! [RFC 6979]: https://datatracker.ietf.org/doc/html/rfc6979

use core::marker::PhantomData;

use digest::Digest;
use digest::core_api::BlockSizeUser;
use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroizing;

use crate::{CryptoRngCore, Vec};
use crate::bigint;
use crate::error::Result;
use crate::params::KeyParameter;

/// A signature: pair of integers `(r, s)`, both in `[1, n-1]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {

    /// Creates a signature from its two components.
    pub fn new(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    /// Checks that both components are in `[1, n-1]`.
    pub fn in_range(&self, n: &BigUint) -> bool {
        !self.r.is_zero() && &self.r < n && !self.s.is_zero() && &self.s < n
    }
}

/// Interface for signature schemes producing `(r, s)` pairs.
pub trait Dsa {

    /// Key type accepted by this signer.
    type Key: KeyParameter;

    /// Name of the algorithm, for diagnostics.
    fn algorithm_name(&self) -> &'static str;

    /// Initializes for signing (`true`, private key required) or
    /// verification (`false`, public key required).
    fn init(&mut self, for_signing: bool, key: Self::Key) -> Result<()>;

    /// Order of the group (the modulus for `r` and `s`), if initialized.
    fn order(&self) -> Option<BigUint>;

    /// Signs a message (normally a hash value).
    fn generate_signature(&mut self, rng: &mut dyn CryptoRngCore,
        message: &[u8]) -> Result<Signature>;

    /// Verifies a signature over a message. An invalid signature (which
    /// includes components out of range) yields `Ok(false)`.
    fn verify_signature(&self, message: &[u8], signature: &Signature)
        -> Result<bool>;
}

// ========================================================================

/// Source of per-signature secrets `k`.
pub trait KCalculator {

    /// Returns `true` if the produced values do not depend on the RNG.
    fn is_deterministic(&self) -> bool;

    /// Prepares for a new signature with group order `n`, private key
    /// `d` and message `message`.
    fn init(&mut self, n: &BigUint, d: &BigUint, message: &[u8]);

    /// Returns the next candidate `k`, in `[1, n-1]`.
    fn next_k(&mut self, rng: &mut dyn CryptoRngCore) -> BigUint;
}

/// Random `k` values.
#[derive(Clone, Debug, Default)]
pub struct RandomKCalculator {
    n: BigUint,
}

impl RandomKCalculator {

    /// Creates a new calculator.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KCalculator for RandomKCalculator {

    fn is_deterministic(&self) -> bool {
        false
    }

    fn init(&mut self, n: &BigUint, _d: &BigUint, _message: &[u8]) {
        self.n = n.clone();
    }

    fn next_k(&mut self, rng: &mut dyn CryptoRngCore) -> BigUint {
        bigint::random_nonzero_below(rng, &self.n)
    }
}

/// Deterministic `k` values (RFC 6979), using HMAC over hash function `D`.
pub struct HmacKCalculator<D: Digest + BlockSizeUser> {
    n: BigUint,
    k: Zeroizing<Vec<u8>>,
    v: Zeroizing<Vec<u8>>,
    _hash: PhantomData<fn() -> D>,
}

impl<D: Digest + BlockSizeUser> Default for HmacKCalculator<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest + BlockSizeUser> HmacKCalculator<D> {

    /// Creates a new calculator.
    pub fn new() -> Self {
        Self {
            n: BigUint::zero(),
            k: Zeroizing::new(Vec::new()),
            v: Zeroizing::new(Vec::new()),
            _hash: PhantomData,
        }
    }

    // HMAC(key, data[0] || data[1] || ...). The key is never longer than
    // the hash output, hence never longer than a block.
    fn hmac(key: &[u8], data: &[&[u8]]) -> Zeroizing<Vec<u8>> {
        let bs = D::block_size();
        let mut pad = Zeroizing::new(vec![0x36u8; bs]);
        for (p, k) in pad.iter_mut().zip(key.iter()) {
            *p ^= *k;
        }
        let mut sh = D::new();
        sh.update(&pad[..]);
        for d in data {
            sh.update(d);
        }
        let inner = Zeroizing::new(sh.finalize().to_vec());

        for p in pad.iter_mut() {
            *p ^= 0x36 ^ 0x5C;
        }
        let mut sh = D::new();
        sh.update(&pad[..]);
        sh.update(&inner[..]);
        Zeroizing::new(sh.finalize().to_vec())
    }

    // bits2int: leftmost qlen bits of t, as an integer.
    fn bits_to_int(&self, t: &[u8]) -> BigUint {
        let v = BigUint::from_bytes_be(t);
        let tbits = t.len() << 3;
        let nbits = bigint::bit_length(&self.n);
        if tbits > nbits {
            v >> (tbits - nbits)
        } else {
            v
        }
    }
}

impl<D: Digest + BlockSizeUser> KCalculator for HmacKCalculator<D> {

    fn is_deterministic(&self) -> bool {
        true
    }

    fn init(&mut self, n: &BigUint, d: &BigUint, message: &[u8]) {
        self.n = n.clone();
        let hlen = <D as Digest>::output_size();
        let size = bigint::byte_length(n);

        // int2octets(d) and bits2octets(message)
        let x = Zeroizing::new(bigint::to_fixed_bytes(d, size)
            .unwrap_or_else(|_| vec![0u8; size]));
        let mut m = self.bits_to_int(message);
        if &m >= n {
            m -= n;
        }
        let mb = bigint::to_fixed_bytes(&m, size)
            .unwrap_or_else(|_| vec![0u8; size]);

        let v0 = vec![0x01u8; hlen];
        let k0 = vec![0x00u8; hlen];
        let k = Self::hmac(&k0, &[&v0, &[0x00], &x, &mb]);
        let v = Self::hmac(&k, &[&v0]);
        let k = Self::hmac(&k, &[&v, &[0x01], &x, &mb]);
        let v = Self::hmac(&k, &[&v]);
        self.k = k;
        self.v = v;
    }

    fn next_k(&mut self, _rng: &mut dyn CryptoRngCore) -> BigUint {
        let size = bigint::byte_length(&self.n);
        let mut t = Zeroizing::new(Vec::with_capacity(size));
        loop {
            t.clear();
            while t.len() < size {
                self.v = Self::hmac(&self.k, &[&self.v]);
                let len = core::cmp::min(size - t.len(), self.v.len());
                t.extend_from_slice(&self.v[..len]);
            }
            let k = self.bits_to_int(&t);
            if !k.is_zero() && k < self.n {
                return k;
            }
            log::trace!("deterministic k out of range, stepping HMAC_DRBG");
            self.k = Self::hmac(&self.k, &[&self.v, &[0x00]]);
            self.v = Self::hmac(&self.k, &[&self.v]);
        }
    }
}
