//! Asymmetric block cipher interface.
//!
//! An asymmetric block cipher transforms one block of bytes with a key:
//! RSA and ElGamal engines implement it directly, and the PKCS#1 v1.5 and
//! OAEP encodings implement it by wrapping another engine. This makes
//! encodings composable over any engine (e.g. PKCS#1 v1.5 over ElGamal).
//!
//! Block sizes depend on the mode selected at `init()` time: for RSA
//! with a k-byte modulus, encryption accepts up to `k-1` bytes and
//! produces `k` bytes, decryption accepts up to `k` bytes and produces a
//! minimal-length unsigned encoding of the result (at most `k-1` bytes
//! in normal usage).
//!
//! Key agreements (Diffie-Hellman, EC Diffie-Hellman, EC-MQV) implement
//! `BasicAgreement`: a private key is set once, then combined with any
//! number of peer public keys.

use num_bigint::BigUint;

use crate::{CryptoRngCore, Vec};
use crate::error::Result;
use crate::params::KeyParameter;

/// A public-key engine processing data one block at a time.
pub trait AsymmetricBlockCipher {

    /// Key type accepted by this engine.
    type Key: KeyParameter;

    /// Name of the algorithm, for diagnostics.
    fn algorithm_name(&self) -> &'static str;

    /// Initializes (or reinitializes) the engine for encryption (`true`)
    /// or decryption (`false`) with the provided key.
    fn init(&mut self, for_encryption: bool, key: Self::Key) -> Result<()>;

    /// Maximum input block size (in bytes) for the current mode.
    fn input_block_size(&self) -> usize;

    /// Maximum output block size (in bytes) for the current mode.
    fn output_block_size(&self) -> usize;

    /// Size of the key modulus, in bits.
    fn key_size(&self) -> usize;

    /// Processes a single block. Randomness is drawn from `rng` when the
    /// operation needs it (randomized encryption, blinding).
    fn process_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>;
}

/// A key agreement computing a shared value from a private key and the
/// peer's public key.
pub trait BasicAgreement {

    /// Private key type used to initialize the agreement.
    type Key: KeyParameter;

    /// Public key type of the peer.
    type PeerKey;

    /// Initializes the agreement with the local private key.
    fn init(&mut self, key: Self::Key) -> Result<()>;

    /// Size of the shared value, in bytes.
    fn field_size(&self) -> usize;

    /// Computes the shared value from the peer's public key.
    fn calculate_agreement(&self, peer: &Self::PeerKey) -> Result<BigUint>;
}
