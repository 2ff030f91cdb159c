//! Diffie-Hellman key generation and key agreement over a prime field.
//!
//! Two agreement flavours are provided:
//!
//!  - `DhBasicAgreement`: the classic static-static exchange; the shared
//!    value is `y_peer^x mod p`.
//!
//!  - `DhAgreement`: the MTI/A0 protocol, which mixes in one ephemeral
//!    key pair per side. Each party first calls `calculate_message()`,
//!    which generates an ephemeral pair and returns its public value
//!    to send to the peer; then `calculate_agreement()` combines the
//!    peer's static public key and the peer's message:
//!
//!    ```text
//!        Z = message_peer^x_static * y_peer^x_ephemeral mod p
//!    ```
//!
//!    The object is a small state machine; calls out of order are
//!    rejected with `Error::InvalidState`.
//!
//! Peer values are checked to lie in `[2, p-2]`, and a shared value of 1
//! is rejected (it would mean that the peer value was chosen in a small
//! subgroup).

use alloc::sync::Arc;
use num_bigint::BigUint;
use num_traits::One;
use zeroize::Zeroizing;

use crate::{CryptoRngCore, Vec};
use crate::bigint;
use crate::engine::BasicAgreement;
use crate::error::{Error, Result};
use crate::params::{check_dh_value, DhKey, DhParameters, DhPrivateKey,
    DhPublicKey, KeyRole};

/// Computes a random private exponent for the provided group.
///
/// With a non-zero length `l`, the exponent has exactly `l` bits (top bit
/// set). Otherwise, it is uniform in `[2, q-2]` (or `[2, p-2]` if the
/// order `q` is unknown). In both cases, candidates with a low NAF weight
/// are discarded, since they may allow faster discrete logarithm
/// attacks.
pub(crate) fn calculate_private(p: &BigUint, q: Option<&BigUint>, l: usize,
    rng: &mut dyn CryptoRngCore) -> BigUint
{
    if l != 0 {
        let min_weight = l >> 2;
        loop {
            let mut x = bigint::random_bits(rng, l);
            x.set_bit((l - 1) as u64, true);
            if bigint::naf_weight(&x) >= min_weight {
                return x;
            }
        }
    }

    let two = BigUint::from(2u32);
    let max = q.unwrap_or(p) - 2u32;
    let min_weight = bigint::bit_length(&max) >> 2;
    loop {
        let x = bigint::random_in_range(rng, &two, &max);
        if bigint::naf_weight(&x) >= min_weight {
            return x;
        }
        log::trace!("DH private value has low NAF weight, drawing again");
    }
}

/// Generates a Diffie-Hellman key pair in the provided group.
pub fn generate_key_pair(parameters: Arc<DhParameters>,
    rng: &mut dyn CryptoRngCore) -> (DhPrivateKey, DhPublicKey)
{
    let x = calculate_private(&parameters.p, parameters.q.as_ref(),
        parameters.l, rng);
    let sk = DhPrivateKey { x, parameters };
    let pk = sk.public_key();
    (sk, pk)
}

fn private_key(key: DhKey) -> Result<DhPrivateKey> {
    match key {
        KeyRole::Private(k) => Ok(k),
        KeyRole::Public(_) => Err(Error::InvalidArgument(
            "DH agreement requires a private key")),
    }
}

fn check_peer(sk: &DhPrivateKey, peer: &DhPublicKey) -> Result<()> {
    if !Arc::ptr_eq(&sk.parameters, &peer.parameters)
        && *sk.parameters != *peer.parameters
    {
        return Err(Error::InvalidArgument(
            "DH public key has wrong domain parameters"));
    }
    check_dh_value(&peer.y, &sk.parameters)
}

// ========================================================================

/// Basic (static-static) Diffie-Hellman agreement.
#[derive(Clone, Debug, Default)]
pub struct DhBasicAgreement {
    key: Option<DhPrivateKey>,
}

impl DhBasicAgreement {

    /// Creates a new, uninitialized agreement.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BasicAgreement for DhBasicAgreement {
    type Key = DhKey;
    type PeerKey = DhPublicKey;

    fn init(&mut self, key: DhKey) -> Result<()> {
        let sk = private_key(key)?;
        log::debug!("DH basic agreement init: bits={}", sk.parameters.p.bits());
        self.key = Some(sk);
        Ok(())
    }

    fn field_size(&self) -> usize {
        self.key.as_ref().map(|k| bigint::byte_length(&k.parameters.p))
            .unwrap_or(0)
    }

    fn calculate_agreement(&self, peer: &DhPublicKey) -> Result<BigUint> {
        let sk = self.key.as_ref()
            .ok_or(Error::InvalidState("DH agreement not initialised"))?;
        check_peer(sk, peer)?;
        let z = peer.y.modpow(&sk.x, &sk.parameters.p);
        if z.is_one() {
            return Err(Error::InvalidAgreement("shared key can't be 1"));
        }
        Ok(z)
    }
}

// ========================================================================

#[derive(Clone, Debug)]
enum MtiState {
    Uninitialized,
    AwaitingMessage,
    // Ephemeral exponent, big-endian.
    AwaitingAgreement { ephemeral: Zeroizing<Vec<u8>> },
    Done,
}

/// MTI/A0 Diffie-Hellman agreement (static and ephemeral keys).
#[derive(Clone, Debug)]
pub struct DhAgreement {
    key: Option<DhPrivateKey>,
    state: MtiState,
}

impl Default for DhAgreement {
    fn default() -> Self {
        Self { key: None, state: MtiState::Uninitialized }
    }
}

impl DhAgreement {

    /// Creates a new, uninitialized agreement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes with the local static private key. This starts a new
    /// session, discarding any pending ephemeral key.
    pub fn init(&mut self, key: DhKey) -> Result<()> {
        let sk = private_key(key)?;
        log::debug!("DH MTI/A0 agreement init: bits={}", sk.parameters.p.bits());
        self.key = Some(sk);
        self.state = MtiState::AwaitingMessage;
        Ok(())
    }

    /// Generates the ephemeral key pair of this session and returns its
    /// public value, to be sent to the peer.
    pub fn calculate_message(&mut self, rng: &mut dyn CryptoRngCore)
        -> Result<BigUint>
    {
        let sk = match (&self.key, &self.state) {
            (Some(sk), MtiState::AwaitingMessage) => sk,
            (None, _) => return Err(Error::InvalidState("DH agreement not initialised")),
            _ => return Err(Error::InvalidState("DH message already calculated")),
        };
        let (eph, eph_pub) = generate_key_pair(sk.parameters.clone(), rng);
        self.state = MtiState::AwaitingAgreement {
            ephemeral: Zeroizing::new(eph.x.to_bytes_be()),
        };
        Ok(eph_pub.y)
    }

    /// Computes the shared value from the peer's static public key and
    /// the peer's message. This completes the session.
    pub fn calculate_agreement(&mut self, peer: &DhPublicKey,
        message: &BigUint) -> Result<BigUint>
    {
        let sk = self.key.as_ref()
            .ok_or(Error::InvalidState("DH agreement not initialised"))?;
        let ephemeral = match &self.state {
            MtiState::AwaitingAgreement { ephemeral } => ephemeral,
            MtiState::Done => {
                return Err(Error::InvalidState("DH agreement already completed"));
            }
            _ => return Err(Error::InvalidState("DH message not yet calculated")),
        };
        check_peer(sk, peer)?;
        check_dh_value(message, &sk.parameters)?;

        let p = &sk.parameters.p;
        let t = peer.y.modpow(&BigUint::from_bytes_be(ephemeral), p);
        if t.is_one() {
            return Err(Error::InvalidAgreement("shared key can't be 1"));
        }
        let z = (message.modpow(&sk.x, p) * t) % p;
        self.state = MtiState::Done;
        Ok(z)
    }
}
