//! Key and domain parameter types.
//!
//! A key is always tagged with its role through the `KeyRole`
//! enumeration: `KeyRole::Private` carries the private half of a key
//! pair, `KeyRole::Public` the public half. Each algorithm family defines
//! its own payload types, and each engine accepts exactly one
//! `KeyRole<Private, Public>` instantiation, so that a DSA key cannot be
//! handed to an ElGamal engine; engines then check the role against the
//! requested mode once, in their `init()` function.
//!
//! Domain parameters (the group description shared by many key pairs)
//! are held behind an `Arc` and are never mutated after construction.
//! Constructors validate the ranges that the algorithms rely upon.
//!
//! RSA keys are defined here as well; DSA, Diffie-Hellman and ElGamal
//! keys share the same layout (a secret exponent `x` or a public value
//! `y = g^x mod p`, plus a reference to the group).

use alloc::sync::Arc;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Error, Result};

/// A key tagged with its role (private or public).
#[derive(Clone, Debug)]
pub enum KeyRole<S, P> {
    /// The private half of a key pair.
    Private(S),
    /// The public half of a key pair.
    Public(P),
}

/// Common queries on key parameters.
pub trait KeyParameter {
    /// Returns `true` for private keys.
    fn is_private(&self) -> bool;
}

impl<S, P> KeyParameter for KeyRole<S, P> {
    fn is_private(&self) -> bool {
        match self {
            KeyRole::Private(_) => true,
            KeyRole::Public(_) => false,
        }
    }
}

/// Symmetric key material, optionally accompanied by an initialization
/// vector.
#[derive(Clone, Copy, Debug)]
pub struct ParametersWithIv<'a> {
    /// Raw key bytes.
    pub key: &'a [u8],
    /// Initialization vector, if any (the consuming engine defines the
    /// default value and the required length).
    pub iv: Option<&'a [u8]>,
}

impl<'a> ParametersWithIv<'a> {

    /// Pairs a key with an initialization vector.
    pub fn new(key: &'a [u8], iv: &'a [u8]) -> Self {
        Self { key, iv: Some(iv) }
    }

    /// Key without an initialization vector (the engine default is used).
    pub fn key_only(key: &'a [u8]) -> Self {
        Self { key, iv: None }
    }
}

// ========================================================================

/// An RSA public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub modulus: BigUint,
    pub exponent: BigUint,
}

/// An RSA private key, with its CRT components.
#[derive(Clone, Debug)]
pub struct RsaPrivateCrtKey {
    pub modulus: BigUint,
    pub public_exponent: BigUint,
    pub private_exponent: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub dp: BigUint,
    pub dq: BigUint,
    pub qinv: BigUint,
}

impl RsaPublicKey {

    /// Creates a public key; the modulus must be odd and the exponent
    /// odd and greater than 1.
    pub fn new(modulus: BigUint, exponent: BigUint) -> Result<Self> {
        if !modulus.bit(0) || modulus.bits() < 16 {
            return Err(Error::InvalidKey("RSA modulus must be odd"));
        }
        if !exponent.bit(0) || exponent.is_one() || exponent >= modulus {
            return Err(Error::InvalidKey("RSA public exponent out of range"));
        }
        Ok(Self { modulus, exponent })
    }
}

impl RsaPrivateCrtKey {

    /// Creates a private key from its components. The factors are
    /// checked against the modulus; CRT exponents are not recomputed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(modulus: BigUint, public_exponent: BigUint,
        private_exponent: BigUint, p: BigUint, q: BigUint,
        dp: BigUint, dq: BigUint, qinv: BigUint) -> Result<Self>
    {
        if &p * &q != modulus {
            return Err(Error::InvalidKey("RSA factors do not match modulus"));
        }
        if dp >= p || dq >= q || qinv >= p {
            return Err(Error::InvalidKey("RSA CRT component out of range"));
        }
        Ok(Self {
            modulus, public_exponent, private_exponent,
            p, q, dp, dq, qinv,
        })
    }

    /// Gets the public key matching this private key.
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            modulus: self.modulus.clone(),
            exponent: self.public_exponent.clone(),
        }
    }
}

/// RSA key with its role.
pub type RsaKey = KeyRole<RsaPrivateCrtKey, RsaPublicKey>;

// ========================================================================

/// DSA domain parameters (FIPS 186): prime modulus `p`, prime subgroup
/// order `q` (a divisor of `p-1`), and generator `g` of that subgroup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DsaParameters {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
}

impl DsaParameters {

    /// Creates DSA domain parameters. Checks that `q` divides `p-1` and
    /// that `g` has order `q` (primality of `p` and `q` is not verified).
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self> {
        if q.bits() < 2 || p <= q {
            return Err(Error::InvalidArgument("invalid DSA group sizes"));
        }
        if !((&p - 1u32) % &q).is_zero() {
            return Err(Error::InvalidArgument("q does not divide p-1"));
        }
        if g <= BigUint::one() || g >= p || !g.modpow(&q, &p).is_one() {
            return Err(Error::InvalidArgument("DSA generator has wrong order"));
        }
        Ok(Self { p, q, g })
    }
}

/// A DSA private key.
#[derive(Clone, Debug)]
pub struct DsaPrivateKey {
    pub x: BigUint,
    pub parameters: Arc<DsaParameters>,
}

/// A DSA public key.
#[derive(Clone, Debug)]
pub struct DsaPublicKey {
    pub y: BigUint,
    pub parameters: Arc<DsaParameters>,
}

impl DsaPrivateKey {

    /// Creates a private key; `x` must be in `[1, q-1]`.
    pub fn new(x: BigUint, parameters: Arc<DsaParameters>) -> Result<Self> {
        if x.is_zero() || x >= parameters.q {
            return Err(Error::InvalidKey("DSA private value out of range"));
        }
        Ok(Self { x, parameters })
    }

    /// Gets the public key `y = g^x mod p`.
    pub fn public_key(&self) -> DsaPublicKey {
        let pp = &self.parameters;
        DsaPublicKey {
            y: pp.g.modpow(&self.x, &pp.p),
            parameters: self.parameters.clone(),
        }
    }
}

impl DsaPublicKey {

    /// Creates a public key; `y` must be in `[2, p-2]` and belong to the
    /// subgroup of order `q`.
    pub fn new(y: BigUint, parameters: Arc<DsaParameters>) -> Result<Self> {
        let pp = &parameters;
        if y < BigUint::from(2u32) || y > &pp.p - 2u32
            || !y.modpow(&pp.q, &pp.p).is_one()
        {
            return Err(Error::InvalidKey("DSA public value out of range"));
        }
        Ok(Self { y, parameters })
    }
}

/// DSA key with its role.
pub type DsaKey = KeyRole<DsaPrivateKey, DsaPublicKey>;

// ========================================================================

/// Diffie-Hellman domain parameters: prime modulus `p`, generator `g`,
/// optional order `q` of `g`, and optional private value length `l` in
/// bits (0 means "no constraint").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DhParameters {
    pub p: BigUint,
    pub g: BigUint,
    pub q: Option<BigUint>,
    pub l: usize,
}

impl DhParameters {

    /// Creates DH parameters without a known subgroup order.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self> {
        Self::with_order(p, g, None, 0)
    }

    /// Creates DH parameters with an optional subgroup order `q` and an
    /// optional private value length `l`.
    pub fn with_order(p: BigUint, g: BigUint, q: Option<BigUint>,
        l: usize) -> Result<Self>
    {
        if p.bits() < 3 || !p.bit(0) {
            return Err(Error::InvalidArgument("DH modulus must be an odd prime"));
        }
        if g < BigUint::from(2u32) || g > &p - 2u32 {
            return Err(Error::InvalidArgument("DH generator out of range"));
        }
        if let Some(q) = &q {
            // Private values are drawn from [2, q-2].
            if q >= &p || *q < BigUint::from(5u32) {
                return Err(Error::InvalidArgument("DH subgroup order out of range"));
            }
        }
        if l != 0 && l >= p.bits() as usize {
            return Err(Error::InvalidArgument("DH private value length too large"));
        }
        Ok(Self { p, g, q, l })
    }
}

/// A Diffie-Hellman private key.
#[derive(Clone, Debug)]
pub struct DhPrivateKey {
    pub x: BigUint,
    pub parameters: Arc<DhParameters>,
}

/// A Diffie-Hellman public key.
#[derive(Clone, Debug)]
pub struct DhPublicKey {
    pub y: BigUint,
    pub parameters: Arc<DhParameters>,
}

impl DhPrivateKey {

    /// Creates a private key; `x` must be in `[1, p-2]`.
    pub fn new(x: BigUint, parameters: Arc<DhParameters>) -> Result<Self> {
        if x.is_zero() || x > &parameters.p - 2u32 {
            return Err(Error::InvalidKey("DH private value out of range"));
        }
        Ok(Self { x, parameters })
    }

    /// Gets the public key `y = g^x mod p`.
    pub fn public_key(&self) -> DhPublicKey {
        let pp = &self.parameters;
        DhPublicKey {
            y: pp.g.modpow(&self.x, &pp.p),
            parameters: self.parameters.clone(),
        }
    }
}

impl DhPublicKey {

    /// Creates a public key. The value must satisfy `1 < y < p-1`; if
    /// the subgroup order `q` is known, `y^q = 1 mod p` is also checked.
    pub fn new(y: BigUint, parameters: Arc<DhParameters>) -> Result<Self> {
        check_dh_value(&y, &parameters)?;
        if let Some(q) = &parameters.q {
            if !y.modpow(q, &parameters.p).is_one() {
                return Err(Error::InvalidKey("DH public value not in subgroup"));
            }
        }
        Ok(Self { y, parameters })
    }
}

/// Checks that `1 < y < p-1` (values 0, 1 and p-1 confine the shared
/// secret to a subgroup of order at most 2).
pub(crate) fn check_dh_value(y: &BigUint, pp: &DhParameters) -> Result<()> {
    if y <= &BigUint::one() || y >= &(&pp.p - 1u32) {
        return Err(Error::InvalidKey("DH public value out of range"));
    }
    Ok(())
}

/// Diffie-Hellman key with its role.
pub type DhKey = KeyRole<DhPrivateKey, DhPublicKey>;

// ========================================================================

/// ElGamal domain parameters: prime modulus `p`, generator `g`, optional
/// private value length `l` in bits (0 means "no constraint").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElGamalParameters {
    pub p: BigUint,
    pub g: BigUint,
    pub l: usize,
}

impl ElGamalParameters {

    /// Creates ElGamal parameters.
    pub fn new(p: BigUint, g: BigUint, l: usize) -> Result<Self> {
        if p.bits() < 16 || !p.bit(0) {
            return Err(Error::InvalidArgument("ElGamal modulus must be an odd prime"));
        }
        if g < BigUint::from(2u32) || g > &p - 2u32 {
            return Err(Error::InvalidArgument("ElGamal generator out of range"));
        }
        if l != 0 && l >= p.bits() as usize {
            return Err(Error::InvalidArgument("ElGamal private value length too large"));
        }
        Ok(Self { p, g, l })
    }
}

/// An ElGamal private key.
#[derive(Clone, Debug)]
pub struct ElGamalPrivateKey {
    pub x: BigUint,
    pub parameters: Arc<ElGamalParameters>,
}

/// An ElGamal public key.
#[derive(Clone, Debug)]
pub struct ElGamalPublicKey {
    pub y: BigUint,
    pub parameters: Arc<ElGamalParameters>,
}

impl ElGamalPrivateKey {

    /// Creates a private key; `x` must be in `[1, p-2]`.
    pub fn new(x: BigUint, parameters: Arc<ElGamalParameters>) -> Result<Self> {
        if x.is_zero() || x > &parameters.p - 2u32 {
            return Err(Error::InvalidKey("ElGamal private value out of range"));
        }
        Ok(Self { x, parameters })
    }

    /// Gets the public key `y = g^x mod p`.
    pub fn public_key(&self) -> ElGamalPublicKey {
        let pp = &self.parameters;
        ElGamalPublicKey {
            y: pp.g.modpow(&self.x, &pp.p),
            parameters: self.parameters.clone(),
        }
    }
}

impl ElGamalPublicKey {

    /// Creates a public key; `y` must be in `[2, p-2]`.
    pub fn new(y: BigUint, parameters: Arc<ElGamalParameters>) -> Result<Self> {
        if y < BigUint::from(2u32) || y > &parameters.p - 2u32 {
            return Err(Error::InvalidKey("ElGamal public value out of range"));
        }
        Ok(Self { y, parameters })
    }
}

/// ElGamal key with its role.
pub type ElGamalKey = KeyRole<ElGamalPrivateKey, ElGamalPublicKey>;
