//! Elliptic curve keys and EC Diffie-Hellman.
//!
//! Point arithmetic is delegated to `crrl`; the `Curve` trait is the
//! narrow interface used by the curve-based schemes of this crate
//! (ECDSA, GOST R 34.10, ECMQV, ECDH). Scalars are handled as `BigUint`
//! values modulo the curve order `n`, and converted to the engine scalar
//! type only when multiplying points. Two curves are provided:
//!
//!  - `P256`: NIST P-256 (a.k.a. secp256r1), from `crrl::p256`;
//!
//!  - `Secp256k1`: the SEC 2 Koblitz curve, from `crrl::secp256k1`.
//!
//! Both curves have a prime order (cofactor 1), so that any non-neutral
//! point decoded from a valid encoding is in the subgroup generated by
//! the conventional base point.
//!
//! The domain parameters of a key are its curve type: keys over distinct
//! curves have distinct types and cannot be mixed.

use core::fmt::Debug;
use core::marker::PhantomData;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::{CryptoRngCore, Vec};
use crate::bigint;
use crate::engine::BasicAgreement;
use crate::error::{Error, Result};
use crate::params::KeyRole;

/// An elliptic curve group of prime order.
pub trait Curve: Clone + Copy + Debug + PartialEq + Eq + 'static {

    /// Group element type.
    type Point: Clone + Copy + Debug;

    /// Curve name, for diagnostics.
    const NAME: &'static str;

    /// Order `n` of the group (a prime).
    fn order() -> BigUint;

    /// Size of an encoded field element, in bytes.
    fn field_size() -> usize;

    /// Computes `k*G`, with `G` the conventional generator.
    fn mulgen(k: &BigUint) -> Self::Point;

    /// Computes `k*P`.
    fn mul(p: &Self::Point, k: &BigUint) -> Self::Point;

    /// Computes `P + Q`.
    fn add(p: &Self::Point, q: &Self::Point) -> Self::Point;

    /// Computes `u*P + v*G` (not constant-time; public data only).
    fn mul_add_mulgen_vartime(p: &Self::Point, u: &BigUint, v: &BigUint)
        -> Self::Point;

    /// Returns `true` for the point at infinity.
    fn is_neutral(p: &Self::Point) -> bool;

    /// Returns `true` if both points are equal.
    fn equals(p: &Self::Point, q: &Self::Point) -> bool;

    /// Affine x coordinate, as an integer (zero for the neutral).
    fn x_coordinate(p: &Self::Point) -> BigUint;

    /// Uncompressed SEC 1 encoding (`0x04 || x || y`).
    fn encode_point(p: &Self::Point) -> Vec<u8>;

    /// Decodes a point (compressed or uncompressed SEC 1 encoding).
    /// The point at infinity decodes successfully (from a single 0x00).
    fn decode_point(buf: &[u8]) -> Option<Self::Point>;
}

macro_rules! define_curve {
    ($(#[$attr:meta])* $name:ident, $m:ident, $cname:expr, $order:expr) => {

        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            fn scalar(k: &BigUint) -> crrl::$m::Scalar {
                crrl::$m::Scalar::decode_reduce(&k.to_bytes_le())
            }
        }

        impl Curve for $name {
            type Point = crrl::$m::Point;

            const NAME: &'static str = $cname;

            fn order() -> BigUint {
                BigUint::from_bytes_be(&$order)
            }

            fn field_size() -> usize {
                32
            }

            fn mulgen(k: &BigUint) -> Self::Point {
                crrl::$m::Point::mulgen(&Self::scalar(k))
            }

            fn mul(p: &Self::Point, k: &BigUint) -> Self::Point {
                p * &Self::scalar(k)
            }

            fn add(p: &Self::Point, q: &Self::Point) -> Self::Point {
                p + q
            }

            fn mul_add_mulgen_vartime(p: &Self::Point, u: &BigUint,
                v: &BigUint) -> Self::Point
            {
                p.mul_add_mulgen_vartime(&Self::scalar(u), &Self::scalar(v))
            }

            fn is_neutral(p: &Self::Point) -> bool {
                p.isneutral() != 0
            }

            fn equals(p: &Self::Point, q: &Self::Point) -> bool {
                p.equals(*q) != 0
            }

            fn x_coordinate(p: &Self::Point) -> BigUint {
                BigUint::from_bytes_be(&p.encode_compressed()[1..33])
            }

            fn encode_point(p: &Self::Point) -> Vec<u8> {
                p.encode_uncompressed().to_vec()
            }

            fn decode_point(buf: &[u8]) -> Option<Self::Point> {
                crrl::$m::Point::decode(buf)
            }
        }
    }
}

define_curve!(
    /// NIST P-256.
    P256, p256, "P-256", [
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xBC, 0xE6, 0xFA, 0xAD, 0xA7, 0x17, 0x9E, 0x84,
    0xF3, 0xB9, 0xCA, 0xC2, 0xFC, 0x63, 0x25, 0x51,
]);

define_curve!(
    /// SEC 2 curve secp256k1.
    Secp256k1, secp256k1, "secp256k1", [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B,
    0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
]);

// ========================================================================

/// An EC private key: scalar `d` in `[1, n-1]`.
#[derive(Clone, Debug)]
pub struct EcPrivateKey<C: Curve> {
    pub d: BigUint,
    _curve: PhantomData<C>,
}

/// An EC public key: non-neutral point `Q = d*G`.
#[derive(Clone, Copy, Debug)]
pub struct EcPublicKey<C: Curve> {
    pub q: C::Point,
}

/// EC key with its role.
pub type EcKey<C> = KeyRole<EcPrivateKey<C>, EcPublicKey<C>>;

impl<C: Curve> EcPrivateKey<C> {

    /// Creates a private key; `d` must be in `[1, n-1]`.
    pub fn new(d: BigUint) -> Result<Self> {
        if d.is_zero() || d >= C::order() {
            return Err(Error::InvalidKey("EC private scalar out of range"));
        }
        Ok(Self { d, _curve: PhantomData })
    }

    /// Gets the public key `d*G`.
    pub fn public_key(&self) -> EcPublicKey<C> {
        EcPublicKey { q: C::mulgen(&self.d) }
    }
}

impl<C: Curve> EcPublicKey<C> {

    /// Creates a public key; the point at infinity is rejected.
    pub fn new(q: C::Point) -> Result<Self> {
        if C::is_neutral(&q) {
            return Err(Error::InvalidKey("EC public point is the point at infinity"));
        }
        Ok(Self { q })
    }

    /// Decodes a public key from its SEC 1 encoding.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let q = C::decode_point(buf)
            .ok_or(Error::InvalidKey("invalid EC point encoding"))?;
        Self::new(q)
    }

    /// Encodes this key (uncompressed SEC 1 format).
    pub fn encode(&self) -> Vec<u8> {
        C::encode_point(&self.q)
    }
}

/// Generates a key pair on curve `C`. The private scalar is uniform in
/// `[1, n-1]`, excluding values of low NAF weight.
pub fn generate_key_pair<C: Curve>(rng: &mut dyn CryptoRngCore)
    -> (EcPrivateKey<C>, EcPublicKey<C>)
{
    let n = C::order();
    let min_weight = bigint::bit_length(&n) >> 2;
    let d = loop {
        let d = bigint::random_nonzero_below(rng, &n);
        if bigint::naf_weight(&d) >= min_weight {
            break d;
        }
    };
    let sk = EcPrivateKey { d, _curve: PhantomData };
    let pk = sk.public_key();
    (sk, pk)
}

// ========================================================================

/// EC Diffie-Hellman (SEC 1, section 3.3.1): the shared value is the x
/// coordinate of `d*Q_peer`.
#[derive(Clone, Debug)]
pub struct EcdhBasicAgreement<C: Curve> {
    key: Option<EcPrivateKey<C>>,
}

impl<C: Curve> Default for EcdhBasicAgreement<C> {
    fn default() -> Self {
        Self { key: None }
    }
}

impl<C: Curve> EcdhBasicAgreement<C> {

    /// Creates a new, uninitialized agreement.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Curve> BasicAgreement for EcdhBasicAgreement<C> {
    type Key = EcKey<C>;
    type PeerKey = EcPublicKey<C>;

    fn init(&mut self, key: EcKey<C>) -> Result<()> {
        match key {
            KeyRole::Private(k) => {
                log::debug!("ECDH agreement init: curve={}", C::NAME);
                self.key = Some(k);
                Ok(())
            }
            KeyRole::Public(_) => Err(Error::InvalidArgument(
                "ECDH agreement requires a private key")),
        }
    }

    fn field_size(&self) -> usize {
        C::field_size()
    }

    fn calculate_agreement(&self, peer: &EcPublicKey<C>) -> Result<BigUint> {
        let sk = self.key.as_ref()
            .ok_or(Error::InvalidState("ECDH agreement not initialised"))?;
        let p = C::mul(&peer.q, &sk.d);
        if C::is_neutral(&p) {
            return Err(Error::InvalidAgreement(
                "infinity is not a valid agreement value for ECDH"));
        }
        Ok(C::x_coordinate(&p))
    }
}
