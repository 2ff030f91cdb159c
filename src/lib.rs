//! Pkcore is a Rust library of public-key primitives and their standard
//! encodings.
//!
//! This library implements the "modular exponentiation" layer of
//! public-key cryptography: block engines (RSA, ElGamal), signature
//! schemes (DSA, ECDSA, GOST R 34.10 over elliptic curves), key
//! agreement protocols (Diffie-Hellman, MTI/A0, ECMQV), and the message
//! encodings that turn raw primitives into standards-compliant byte
//! sequences (PKCS#1 v1.5, OAEP, PSS). Key derivation functions (KDF1,
//! KDF2 / ANSI X9.63, RFC 2631) stretch agreement outputs into key
//! material, and two symmetric helpers (RFC 3394 key wrap, CTS mode) are
//! provided on top of a generic block cipher interface.
//!
//! Arbitrary-precision arithmetic is delegated to `num-bigint`, and
//! elliptic curve point arithmetic to `crrl` (curves P-256 and
//! secp256k1, behind the `ec` feature). This library does not parse or
//! produce ASN.1 structures beyond the few fixed DER shapes needed by
//! the KDFs.
//!
//! # Usage
//!
//! Engines follow a simple life cycle: an instance is created, then
//! initialized once with a mode (encryption/decryption, or
//! signing/verification) and a key; it can then be invoked repeatedly.
//! Switching roles requires calling `init()` again. Instances are not
//! meant to be shared between threads without external locking.
//!
//! Keys are represented with the `KeyRole` enumeration, which tags an
//! algorithm-specific payload as either private or public; engines check
//! the role once, at initialization time, and reject mismatches with
//! `Error::InvalidArgument`.
//!
//! Operations that need randomness take it as an explicit parameter
//! (`&mut dyn CryptoRngCore`); each call draws fresh randomness. With
//! the default `std` feature, `rand_core::OsRng` can be used.
//!
//! # Conventions
//!
//! Functions that handle secret data in a way that should not leak
//! through timing (padding checks in PKCS#1 and OAEP decoding) use `u32`
//! masks for Booleans: 0xFFFFFFFF means "true", and 0x00000000 means
//! "false". Big integer arithmetic itself is NOT constant-time (this is
//! a limitation of the underlying integer engine).
//!
//! Signature verification functions report an invalid signature by
//! returning `false` (or `Ok(false)`); errors are reserved for
//! misconfiguration (wrong key role, engine not initialized, key too
//! small). Decryption failures in the padding schemes are reported with
//! a single, undifferentiated `Error::InvalidCipherText`.
//!
//! Sensitive temporary buffers (seeds, masks, shared secrets, salts) are
//! held in `zeroize::Zeroizing` containers, so that they are cleared on
//! every exit path, including error paths.

#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub(crate) use alloc::vec::Vec;

pub use rand_core::{CryptoRng, CryptoRngCore, RngCore, Error as RngError};

#[cfg(feature = "std")]
pub use rand_core::OsRng;

pub use num_bigint::BigUint;

mod ct;

pub mod error;
pub mod params;
pub mod bigint;
pub mod engine;
pub mod mgf;

pub mod rsa;
pub mod elgamal;
pub mod pkcs1;
pub mod oaep;
pub mod pss;

pub mod signer;
pub mod dsa;
pub mod dh;

#[cfg(feature = "ec")]
pub mod ec;
#[cfg(feature = "ec")]
pub mod ecdsa;
#[cfg(feature = "ec")]
pub mod gost3410;
#[cfg(feature = "ec")]
pub mod ecmqv;

pub mod der;
pub mod kdf;

pub mod block;
pub mod wrap;
pub mod cts;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use params::{KeyParameter, KeyRole};
pub use engine::{AsymmetricBlockCipher, BasicAgreement};
pub use signer::{Dsa, Signature};
