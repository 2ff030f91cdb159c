//! Key derivation functions.
//!
//! All functions here use the same counter construction: output block
//! `i` is `Hash(Z || BE32(counter) || info)`, with `counter` starting at
//! a fixed value and increasing by one for each block; blocks are
//! concatenated and truncated to the requested length. At most
//! `(2^32 - 1)` blocks can be produced; requesting more output is
//! reported as `Error::DataLength`.
//!
//!  - `KdfBytesGenerator`: ISO 18033-2 KDF1 (counter starts at 0) and
//!    KDF2 / ANSI X9.63 (counter starts at 1), with a free-form `info`.
//!
//!  - `DhKekGenerator`: RFC 2631 key-encryption-key derivation. The
//!    counter is carried inside a DER-encoded `OtherInfo` structure,
//!    which also names the key-wrap algorithm and key size.
//!
//!  - `EcdhKekGenerator`: RFC 3278 derivation (KDF2 with a DER-encoded
//!    `ECC-CMS-SharedInfo` as `info`).
//!
//! Shared secrets are kept in `Zeroizing` buffers and cleared when the
//! generator is dropped or reinitialized.

use core::marker::PhantomData;

use digest::Digest;
use zeroize::Zeroizing;

use crate::Vec;
use crate::der::{self, ObjectIdentifier};
use crate::error::{Error, Result};

/// A function deriving arbitrary-length output from some parameters.
pub trait DerivationFunction {

    /// Parameters (shared secret and context information).
    type Parameters;

    /// Sets the derivation parameters.
    fn init(&mut self, parameters: Self::Parameters);

    /// Fills `out` with derived bytes.
    fn generate_bytes(&self, out: &mut [u8]) -> Result<()>;
}

// Output of at most (2^32-1) hash blocks.
fn check_output_length(len: u64, hlen: usize) -> Result<()> {
    if len > 0xFFFF_FFFFu64 * (hlen as u64) {
        return Err(Error::DataLength("output length too large"));
    }
    Ok(())
}

/// Shared secret and optional context information for `KdfBytesGenerator`.
#[derive(Clone, Debug)]
pub struct KdfParameters {
    shared: Zeroizing<Vec<u8>>,
    info: Vec<u8>,
}

impl KdfParameters {

    /// Creates the parameters; `info` may be empty.
    pub fn new(shared: &[u8], info: &[u8]) -> Self {
        Self {
            shared: Zeroizing::new(shared.to_vec()),
            info: info.to_vec(),
        }
    }
}

/// Counter-mode KDF over hash function `D` (KDF1 or KDF2).
pub struct KdfBytesGenerator<D: Digest> {
    counter_start: u32,
    parameters: Option<KdfParameters>,
    _hash: PhantomData<fn() -> D>,
}

impl<D: Digest> KdfBytesGenerator<D> {

    /// Creates a generator with an explicit initial counter value.
    pub fn new(counter_start: u32) -> Self {
        Self { counter_start, parameters: None, _hash: PhantomData }
    }

    /// ISO 18033-2 KDF1 (counter starts at 0).
    pub fn kdf1() -> Self {
        Self::new(0)
    }

    /// ISO 18033-2 KDF2, also ANSI X9.63 (counter starts at 1).
    pub fn kdf2() -> Self {
        Self::new(1)
    }
}

impl<D: Digest> DerivationFunction for KdfBytesGenerator<D> {
    type Parameters = KdfParameters;

    fn init(&mut self, parameters: KdfParameters) {
        self.parameters = Some(parameters);
    }

    fn generate_bytes(&self, out: &mut [u8]) -> Result<()> {
        let pp = self.parameters.as_ref()
            .ok_or(Error::InvalidState("KDF not initialised"))?;
        let hlen = <D as Digest>::output_size();
        check_output_length(out.len() as u64, hlen)?;
        let mut counter = self.counter_start;
        for chunk in out.chunks_mut(hlen) {
            let mut h = D::new();
            h.update(&pp.shared[..]);
            h.update(counter.to_be_bytes());
            h.update(&pp.info);
            let block = Zeroizing::new(h.finalize().to_vec());
            chunk.copy_from_slice(&block[..chunk.len()]);
            counter = counter.wrapping_add(1);
        }
        Ok(())
    }
}

// ========================================================================

/// Parameters for the KEK generators: shared secret `z`, key-wrap
/// algorithm and size of the key to produce (in bits), and optional
/// party information (the `partyAInfo` / `entityUInfo` field).
#[derive(Clone, Debug)]
pub struct DhKdfParameters {
    pub algorithm: ObjectIdentifier,
    pub key_size: u32,
    z: Zeroizing<Vec<u8>>,
    pub extra_info: Option<Vec<u8>>,
}

impl DhKdfParameters {

    /// Creates the parameters, without party information.
    pub fn new(algorithm: ObjectIdentifier, key_size: u32, z: &[u8]) -> Self {
        Self {
            algorithm,
            key_size,
            z: Zeroizing::new(z.to_vec()),
            extra_info: None,
        }
    }

    /// Creates the parameters with party information.
    pub fn with_extra_info(algorithm: ObjectIdentifier, key_size: u32,
        z: &[u8], extra_info: &[u8]) -> Self
    {
        let mut pp = Self::new(algorithm, key_size, z);
        pp.extra_info = Some(extra_info.to_vec());
        pp
    }
}

/// RFC 2631 KEK generator over hash function `D`.
pub struct DhKekGenerator<D: Digest> {
    parameters: Option<DhKdfParameters>,
    _hash: PhantomData<fn() -> D>,
}

impl<D: Digest> Default for DhKekGenerator<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> DhKekGenerator<D> {

    /// Creates a new, uninitialized generator.
    pub fn new() -> Self {
        Self { parameters: None, _hash: PhantomData }
    }
}

// OtherInfo ::= SEQUENCE {
//     keyInfo KeySpecificInfo,             -- SEQUENCE { OID, OCTET STRING }
//     partyAInfo [0] OCTET STRING OPTIONAL,
//     suppPubInfo [2] OCTET STRING }
fn other_info(pp: &DhKdfParameters, counter: u32) -> Vec<u8> {
    let key_info = der::sequence(&[
        &pp.algorithm.encode(),
        &der::octet_string(&counter.to_be_bytes()),
    ]);
    let supp_pub = der::explicit(2, &der::octet_string(&pp.key_size.to_be_bytes()));
    match &pp.extra_info {
        Some(info) => {
            let party_a = der::explicit(0, &der::octet_string(info));
            der::sequence(&[&key_info, &party_a, &supp_pub])
        }
        None => der::sequence(&[&key_info, &supp_pub]),
    }
}

impl<D: Digest> DerivationFunction for DhKekGenerator<D> {
    type Parameters = DhKdfParameters;

    fn init(&mut self, parameters: DhKdfParameters) {
        log::debug!("DH KEK generator init: key size={}", parameters.key_size);
        self.parameters = Some(parameters);
    }

    fn generate_bytes(&self, out: &mut [u8]) -> Result<()> {
        let pp = self.parameters.as_ref()
            .ok_or(Error::InvalidState("DH KEK generator not initialised"))?;
        let hlen = <D as Digest>::output_size();
        check_output_length(out.len() as u64, hlen)?;
        let mut counter = 1u32;
        for chunk in out.chunks_mut(hlen) {
            let mut h = D::new();
            h.update(&pp.z[..]);
            h.update(other_info(pp, counter));
            let block = Zeroizing::new(h.finalize().to_vec());
            chunk.copy_from_slice(&block[..chunk.len()]);
            counter = counter.wrapping_add(1);
        }
        Ok(())
    }
}

/// RFC 3278 KEK generator (KDF2 over `D` with `ECC-CMS-SharedInfo`).
pub struct EcdhKekGenerator<D: Digest> {
    kdf: KdfBytesGenerator<D>,
}

impl<D: Digest> Default for EcdhKekGenerator<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> EcdhKekGenerator<D> {

    /// Creates a new, uninitialized generator.
    pub fn new() -> Self {
        Self { kdf: KdfBytesGenerator::kdf2() }
    }
}

// ECC-CMS-SharedInfo ::= SEQUENCE {
//     keyInfo AlgorithmIdentifier,         -- parameters are NULL
//     entityUInfo [0] OCTET STRING OPTIONAL,
//     suppPubInfo [2] OCTET STRING }
fn shared_info(pp: &DhKdfParameters) -> Vec<u8> {
    let key_info = der::sequence(&[&pp.algorithm.encode(), &der::null()]);
    let supp_pub = der::explicit(2, &der::octet_string(&pp.key_size.to_be_bytes()));
    match &pp.extra_info {
        Some(info) => {
            let entity_u = der::explicit(0, &der::octet_string(info));
            der::sequence(&[&key_info, &entity_u, &supp_pub])
        }
        None => der::sequence(&[&key_info, &supp_pub]),
    }
}

impl<D: Digest> DerivationFunction for EcdhKekGenerator<D> {
    type Parameters = DhKdfParameters;

    fn init(&mut self, parameters: DhKdfParameters) {
        log::debug!("ECDH KEK generator init: key size={}", parameters.key_size);
        let info = shared_info(&parameters);
        self.kdf.init(KdfParameters {
            shared: parameters.z,
            info,
        });
    }

    fn generate_bytes(&self, out: &mut [u8]) -> Result<()> {
        self.kdf.generate_bytes(out).map_err(|e| match e {
            Error::InvalidState(_) => Error::InvalidState("ECDH KEK generator not initialised"),
            e => e,
        })
    }
}
