//! Raw RSA engine and RSA key pair generation.
//!
//! `RsaEngine` implements the bare RSA permutation (RSAEP/RSADP and
//! RSASP1/RSAVP1 in PKCS#1 terminology) as an `AsymmetricBlockCipher`.
//! The operation applied depends on the key role, not on the mode: a
//! public key computes `m^e mod n`, a private key computes `c^d mod n`
//! (with the CRT, and multiplicative blinding by a random value drawn
//! from the caller's RNG). The mode selected at `init()` only sets the
//! block sizes and the output format: in "encryption" mode the output
//! is always `k` bytes (for a `k`-byte modulus), while in "decryption"
//! mode the output is the minimal unsigned big-endian encoding of the
//! result, i.e. with leading zeros removed. Padding layers rely on that
//! convention.
//!
//! Raw RSA is NOT a secure encryption or signature scheme by itself; it
//! must be used through `Pkcs1Encoding`, `OaepEncoding` or `PssSigner`.
//!
//! Private key operations are checked by recomputing the public
//! operation on the result; a mismatch (which would indicate a fault,
//! e.g. an inconsistent CRT key) is reported as an error instead of
//! returning an output that could leak the factorization.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::{CryptoRngCore, Vec};
use crate::bigint;
use crate::engine::AsymmetricBlockCipher;
use crate::error::{Error, Result};
use crate::params::{KeyRole, RsaKey, RsaPrivateCrtKey, RsaPublicKey};

/// Raw RSA block engine.
#[derive(Clone, Debug, Default)]
pub struct RsaEngine {
    key: Option<RsaKey>,
    for_encryption: bool,
}

impl RsaEngine {

    /// Creates a new, uninitialized engine.
    pub fn new() -> Self {
        Self { key: None, for_encryption: false }
    }

    fn modulus(&self) -> Option<&BigUint> {
        match &self.key {
            Some(KeyRole::Private(k)) => Some(&k.modulus),
            Some(KeyRole::Public(k)) => Some(&k.modulus),
            None => None,
        }
    }

    // Converts input bytes into an integer lower than the modulus.
    fn convert_input(&self, input: &[u8]) -> Result<BigUint> {
        let n = self.modulus().ok_or(Error::InvalidState("RSA engine not initialised"))?;
        let max = self.input_block_size();
        if input.len() > max + 1
            || (input.len() == max + 1 && !self.for_encryption)
        {
            return Err(Error::DataLength("input too large for RSA cipher"));
        }
        let m = bigint::from_unsigned_bytes(input);
        if &m >= n {
            return Err(Error::DataLength("input too large for RSA cipher"));
        }
        Ok(m)
    }

    fn convert_output(&self, r: &BigUint) -> Result<Vec<u8>> {
        if self.for_encryption {
            bigint::to_fixed_bytes(r, self.output_block_size())
        } else {
            Ok(bigint::to_unsigned_bytes(r))
        }
    }
}

/// Computes `c^d mod n` with the CRT. Not blinded; see `private_op()`.
fn crt_op(key: &RsaPrivateCrtKey, c: &BigUint) -> BigUint {
    let m1 = c.modpow(&key.dp, &key.p);
    let m2 = c.modpow(&key.dq, &key.q);
    // h = qinv*(m1 - m2) mod p
    let m2p = &m2 % &key.p;
    let diff = if m1 >= m2p { m1 - m2p } else { &key.p - m2p + m1 };
    let h = (&key.qinv * diff) % &key.p;
    m2 + h * &key.q
}

/// Blinded private key operation, with fault check.
fn private_op(key: &RsaPrivateCrtKey, c: &BigUint,
    rng: &mut dyn CryptoRngCore) -> Result<BigUint>
{
    let n = &key.modulus;
    let e = &key.public_exponent;

    // Blinding factor r (invertible modulo n), c' = c*r^e mod n.
    let (r, rinv) = loop {
        let r = bigint::random_nonzero_below(rng, n);
        if let Some(rinv) = r.modinv(n) {
            break (r, rinv);
        }
    };
    let blinded = (c * r.modpow(e, n)) % n;
    let m = (crt_op(key, &blinded) * rinv) % n;

    if &m.modpow(e, n) != c {
        return Err(Error::InvalidState("RSA private operation check failed"));
    }
    Ok(m)
}

impl AsymmetricBlockCipher for RsaEngine {
    type Key = RsaKey;

    fn algorithm_name(&self) -> &'static str {
        "RSA"
    }

    fn init(&mut self, for_encryption: bool, key: RsaKey) -> Result<()> {
        log::debug!("RSA engine init: encryption={} private={} bits={}",
            for_encryption, matches!(key, KeyRole::Private(_)),
            match &key {
                KeyRole::Private(k) => k.modulus.bits(),
                KeyRole::Public(k) => k.modulus.bits(),
            });
        self.key = Some(key);
        self.for_encryption = for_encryption;
        Ok(())
    }

    fn input_block_size(&self) -> usize {
        let bits = self.key_size();
        if self.for_encryption {
            (bits.saturating_sub(1)) >> 3
        } else {
            (bits + 7) >> 3
        }
    }

    fn output_block_size(&self) -> usize {
        let bits = self.key_size();
        if self.for_encryption {
            (bits + 7) >> 3
        } else {
            (bits.saturating_sub(1)) >> 3
        }
    }

    fn key_size(&self) -> usize {
        self.modulus().map(bigint::bit_length).unwrap_or(0)
    }

    fn process_block(&mut self, rng: &mut dyn CryptoRngCore, input: &[u8])
        -> Result<Vec<u8>>
    {
        let m = self.convert_input(input)?;
        let r = match &self.key {
            Some(KeyRole::Public(k)) => m.modpow(&k.exponent, &k.modulus),
            Some(KeyRole::Private(k)) => private_op(k, &m, rng)?,
            None => return Err(Error::InvalidState("RSA engine not initialised")),
        };
        self.convert_output(&r)
    }
}

// ========================================================================

/// RSA key pair generator.
///
/// Primes are generated with the two top bits set, so that the modulus
/// has exactly the requested size; `p` and `q` are required to differ
/// in their top 100 bits, and `p-1` and `q-1` to be coprime with the
/// public exponent (which must be an odd prime such as 65537).
#[derive(Clone, Debug)]
pub struct RsaKeyPairGenerator {
    strength: usize,
    public_exponent: BigUint,
    certainty: usize,
}

impl RsaKeyPairGenerator {

    /// Creates a generator for moduli of `strength` bits, with public
    /// exponent 65537.
    pub fn new(strength: usize) -> Result<Self> {
        Self::with_exponent(strength, BigUint::from(65537u32))
    }

    /// Creates a generator with an explicit (odd prime) public exponent.
    pub fn with_exponent(strength: usize, public_exponent: BigUint)
        -> Result<Self>
    {
        if strength < 256 {
            return Err(Error::InvalidArgument("RSA key size too small"));
        }
        if !public_exponent.bit(0) || public_exponent.bits() < 2 {
            return Err(Error::InvalidArgument("RSA public exponent must be odd"));
        }
        Ok(Self { strength, public_exponent, certainty: 40 })
    }

    /// Generates a new key pair.
    pub fn generate(&self, rng: &mut dyn CryptoRngCore)
        -> (RsaPrivateCrtKey, RsaPublicKey)
    {
        let e = &self.public_exponent;
        let pbits = (self.strength + 1) >> 1;
        let qbits = self.strength - pbits;
        let min_diff = self.strength / 2 - 100;

        loop {
            let p = choose_prime(rng, pbits, e, self.certainty);
            let q = choose_prime(rng, qbits, e, self.certainty);
            let diff = if p > q { &p - &q } else { &q - &p };
            if diff.bits() < min_diff as u64 {
                log::trace!("RSA primes too close, generating again");
                continue;
            }
            let n = &p * &q;
            if n.bits() as usize != self.strength {
                continue;
            }
            let (p, q) = if p > q { (p, q) } else { (q, p) };
            let p1 = &p - 1u32;
            let q1 = &q - 1u32;
            let phi = &p1 * &q1;
            let d = match e.modinv(&phi) {
                Some(d) => d,
                None => continue,
            };
            let qinv = match q.modinv(&p) {
                Some(v) => v,
                None => continue,
            };
            if d <= BigUint::one() {
                continue;
            }
            let dp = &d % &p1;
            let dq = &d % &q1;
            let sk = RsaPrivateCrtKey {
                modulus: n,
                public_exponent: e.clone(),
                private_exponent: d,
                p, q, dp, dq, qinv,
            };
            let pk = sk.public_key();
            return (sk, pk);
        }
    }
}

// Generates a prime p such that p-1 is not a multiple of e.
fn choose_prime(rng: &mut dyn CryptoRngCore, bits: usize, e: &BigUint,
    certainty: usize) -> BigUint
{
    loop {
        let p = bigint::random_prime(rng, bits, certainty);
        if !((&p - 1u32) % e).is_zero() {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::testing::{rsa_key, TestRng};

    #[test]
    fn raw_round_trip() {
        let mut rng = TestRng::new(b"rsa raw");
        let sk = rsa_key();
        let pk = sk.public_key();

        let mut enc = RsaEngine::new();
        enc.init(true, KeyRole::Public(pk.clone())).unwrap();
        assert!(enc.input_block_size() == 127);
        assert!(enc.output_block_size() == 128);

        let mut dec = RsaEngine::new();
        dec.init(false, KeyRole::Private(sk.clone())).unwrap();
        assert!(dec.input_block_size() == 128);
        assert!(dec.output_block_size() == 127);

        let msg = b"raw RSA message";
        let c = enc.process_block(&mut rng, msg).unwrap();
        assert!(c.len() == 128);
        let m = dec.process_block(&mut rng, &c).unwrap();
        assert!(m == msg);

        // Leading zeros are dropped on decryption.
        let c = enc.process_block(&mut rng, &[0, 0, 5]).unwrap();
        assert!(dec.process_block(&mut rng, &c).unwrap() == [5]);

        // CRT and plain exponentiation agree.
        let x = BigUint::from(123456789u32);
        assert!(crt_op(&sk, &x) == x.modpow(&sk.private_exponent, &sk.modulus));
    }

    #[test]
    fn input_checks() {
        let mut rng = TestRng::new(b"rsa input");
        let sk = rsa_key();
        let mut enc = RsaEngine::new();
        assert!(enc.process_block(&mut rng, &[1]).is_err());
        enc.init(true, KeyRole::Public(sk.public_key())).unwrap();

        // A full-size input is accepted if lower than the modulus.
        let mut big = bigint::to_fixed_bytes(&sk.modulus, 128).unwrap();
        assert!(enc.process_block(&mut rng, &big).is_err());
        big[0] = 0x01;
        assert!(enc.process_block(&mut rng, &big).is_ok());
        assert!(enc.process_block(&mut rng, &[1u8; 129]).is_err());

        let mut dec = RsaEngine::new();
        dec.init(false, KeyRole::Private(sk)).unwrap();
        assert!(dec.process_block(&mut rng, &[1u8; 129]).is_err());
    }

    #[test]
    fn fault_check() {
        let mut rng = TestRng::new(b"rsa fault");
        let mut sk = rsa_key();
        sk.dp += 2u32;
        let mut dec = RsaEngine::new();
        dec.init(false, KeyRole::Private(sk)).unwrap();
        assert!(dec.process_block(&mut rng, &[0x42; 64])
            == Err(Error::InvalidState("RSA private operation check failed")));
    }

    #[test]
    fn keygen() {
        let mut rng = TestRng::new(b"rsa keygen");
        let kpg = RsaKeyPairGenerator::new(512).unwrap();
        let (sk, pk) = kpg.generate(&mut rng);
        assert!(pk.modulus.bits() == 512);
        assert!(&sk.p * &sk.q == pk.modulus);
        let m = BigUint::from(0xC0FFEEu32);
        let c = m.modpow(&pk.exponent, &pk.modulus);
        assert!(crt_op(&sk, &c) == m);
        assert!(RsaKeyPairGenerator::new(128).is_err());
        assert!(RsaKeyPairGenerator::with_exponent(1024,
            BigUint::from(4u32)).is_err());
    }
}
