//! EC-MQV key agreement (SEC 1, section 3.4; ANSI X9.63).
//!
//! Each party holds a static key pair and an ephemeral key pair. With
//! `e = ceil(log2(n)/2)` and the "half x" function
//!
//! ```text
//!     avf(Q) = (x(Q) mod 2^e) + 2^e
//! ```
//!
//! party U computes the implicit signature `s = d2U + avf(Q2U)*d1U mod n`
//! and the shared point
//!
//! ```text
//!     P = s*(Q2V + avf(Q2V)*Q1V)
//! ```
//!
//! where `(d1U, Q1U)` and `(d2U, Q2U)` are U's static and ephemeral
//! pairs, and `Q1V`, `Q2V` are V's static and ephemeral public keys. The
//! shared value is `x(P)`. Both supported curves have cofactor 1.

use num_bigint::BigUint;
use num_traits::One;

use crate::bigint;
use crate::ec::{Curve, EcPrivateKey, EcPublicKey};
use crate::engine::BasicAgreement;
use crate::error::{Error, Result};
use crate::params::KeyParameter;

/// Local side of an MQV exchange: static and ephemeral private keys,
/// with the ephemeral public key.
#[derive(Clone, Debug)]
pub struct MqvPrivateParameters<C: Curve> {
    pub static_private: EcPrivateKey<C>,
    pub ephemeral_private: EcPrivateKey<C>,
    pub ephemeral_public: EcPublicKey<C>,
}

impl<C: Curve> MqvPrivateParameters<C> {

    /// Creates the local parameters; the ephemeral public key is
    /// computed from the ephemeral private key.
    pub fn new(static_private: EcPrivateKey<C>,
        ephemeral_private: EcPrivateKey<C>) -> Self
    {
        let ephemeral_public = ephemeral_private.public_key();
        Self { static_private, ephemeral_private, ephemeral_public }
    }

    /// Creates the local parameters with an explicit ephemeral public
    /// key. It is not checked against the ephemeral private key.
    pub fn with_ephemeral_public(static_private: EcPrivateKey<C>,
        ephemeral_private: EcPrivateKey<C>,
        ephemeral_public: EcPublicKey<C>) -> Self
    {
        Self { static_private, ephemeral_private, ephemeral_public }
    }
}

impl<C: Curve> KeyParameter for MqvPrivateParameters<C> {
    fn is_private(&self) -> bool {
        true
    }
}

/// Peer side of an MQV exchange: static and ephemeral public keys.
#[derive(Clone, Copy, Debug)]
pub struct MqvPublicParameters<C: Curve> {
    pub static_public: EcPublicKey<C>,
    pub ephemeral_public: EcPublicKey<C>,
}

impl<C: Curve> MqvPublicParameters<C> {

    /// Creates the peer parameters.
    pub fn new(static_public: EcPublicKey<C>,
        ephemeral_public: EcPublicKey<C>) -> Self
    {
        Self { static_public, ephemeral_public }
    }
}

/// EC-MQV agreement.
#[derive(Clone, Debug)]
pub struct EcMqvBasicAgreement<C: Curve> {
    key: Option<MqvPrivateParameters<C>>,
}

impl<C: Curve> Default for EcMqvBasicAgreement<C> {
    fn default() -> Self {
        Self { key: None }
    }
}

impl<C: Curve> EcMqvBasicAgreement<C> {

    /// Creates a new, uninitialized agreement.
    pub fn new() -> Self {
        Self::default()
    }
}

// avf(Q) = (x(Q) mod 2^e) | 2^e
fn half_x<C: Curve>(q: &EcPublicKey<C>, e: usize) -> BigUint {
    let pow_e = BigUint::one() << e;
    let mut x = C::x_coordinate(&q.q) % &pow_e;
    x.set_bit(e as u64, true);
    x
}

impl<C: Curve> BasicAgreement for EcMqvBasicAgreement<C> {
    type Key = MqvPrivateParameters<C>;
    type PeerKey = MqvPublicParameters<C>;

    fn init(&mut self, key: MqvPrivateParameters<C>) -> Result<()> {
        log::debug!("ECMQV agreement init: curve={}", C::NAME);
        self.key = Some(key);
        Ok(())
    }

    fn field_size(&self) -> usize {
        C::field_size()
    }

    fn calculate_agreement(&self, peer: &MqvPublicParameters<C>)
        -> Result<BigUint>
    {
        let local = self.key.as_ref()
            .ok_or(Error::InvalidState("ECMQV agreement not initialised"))?;
        let n = C::order();
        let e = (bigint::bit_length(&n) + 1) >> 1;

        let q2u_bar = half_x(&local.ephemeral_public, e);
        let s = (&local.static_private.d * q2u_bar
            + &local.ephemeral_private.d) % &n;
        let q2v_bar = half_x(&peer.ephemeral_public, e);
        let u = (q2v_bar * &s) % &n;

        let p = C::add(&C::mul(&peer.static_public.q, &u),
            &C::mul(&peer.ephemeral_public.q, &s));
        if C::is_neutral(&p) {
            return Err(Error::InvalidAgreement(
                "infinity is not a valid agreement value for MQV"));
        }
        Ok(C::x_coordinate(&p))
    }
}
