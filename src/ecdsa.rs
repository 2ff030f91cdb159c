//! ECDSA signatures (ANSI X9.62, SEC 1 section 4.1).
//!
//! The hash value is converted into an integer `e` by keeping its
//! leftmost `log2(n)` bits; then, with `k` from the configured
//! `KCalculator`:
//!
//! ```text
//!     r = x(k*G) mod n
//!     s = k^(-1)*(e + d*r) mod n
//! ```
//!
//! With `HmacKCalculator`, signatures are deterministic and match the
//! test vectors of RFC 6979.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::CryptoRngCore;
use crate::bigint;
use crate::ec::{Curve, EcKey};
use crate::error::{Error, Result};
use crate::params::KeyRole;
use crate::signer::{Dsa, KCalculator, RandomKCalculator, Signature};

/// ECDSA signer and verifier over curve `C`.
#[derive(Clone, Debug)]
pub struct EcdsaSigner<C: Curve, K: KCalculator = RandomKCalculator> {
    k_calculator: K,
    key: Option<EcKey<C>>,
}

impl<C: Curve> EcdsaSigner<C, RandomKCalculator> {

    /// Creates a signer with random `k` values.
    pub fn new() -> Self {
        Self::with_k_calculator(RandomKCalculator::new())
    }
}

impl<C: Curve> Default for EcdsaSigner<C, RandomKCalculator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Curve, K: KCalculator> EcdsaSigner<C, K> {

    /// Creates a signer with the provided source of `k` values.
    pub fn with_k_calculator(k_calculator: K) -> Self {
        Self { k_calculator, key: None }
    }
}

// Leftmost log2(n) bits of the message.
fn calculate_e(n: &BigUint, message: &[u8]) -> BigUint {
    let nbits = bigint::bit_length(n);
    let mbits = message.len() << 3;
    let e = BigUint::from_bytes_be(message);
    if mbits > nbits {
        e >> (mbits - nbits)
    } else {
        e
    }
}

impl<C: Curve, K: KCalculator> Dsa for EcdsaSigner<C, K> {
    type Key = EcKey<C>;

    fn algorithm_name(&self) -> &'static str {
        "ECDSA"
    }

    fn init(&mut self, for_signing: bool, key: EcKey<C>) -> Result<()> {
        match (&key, for_signing) {
            (KeyRole::Private(_), true) | (KeyRole::Public(_), false) => {}
            (KeyRole::Public(_), true) => {
                return Err(Error::InvalidArgument(
                    "ECDSA private key required for signing"));
            }
            (KeyRole::Private(_), false) => {
                return Err(Error::InvalidArgument(
                    "ECDSA public key required for verification"));
            }
        }
        log::debug!("ECDSA init: curve={} signing={}", C::NAME, for_signing);
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
                return Err(Error::InvalidState("ECDSA signer initialised for verification"));
            }
            None => return Err(Error::InvalidState("ECDSA signer not initialised")),
        };
        let n = C::order();
        let e = calculate_e(&n, message);
        self.k_calculator.init(&n, &sk.d, message);

        loop {
            let k = self.k_calculator.next_k(rng);
            let r = C::x_coordinate(&C::mulgen(&k)) % &n;
            if r.is_zero() {
                log::trace!("ECDSA: r = 0, drawing a new k");
                continue;
            }
            let kinv = match k.modinv(&n) {
                Some(v) => v,
                None => continue,
            };
            let s = (kinv * (&e + &sk.d * &r)) % &n;
            if s.is_zero() {
                log::trace!("ECDSA: s = 0, drawing a new k");
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
                return Err(Error::InvalidState("ECDSA signer initialised for signing"));
            }
            None => return Err(Error::InvalidState("ECDSA signer not initialised")),
        };
        let n = C::order();
        if !signature.in_range(&n) {
            return Ok(false);
        }
        let e = calculate_e(&n, message);
        let c = match signature.s.modinv(&n) {
            Some(c) => c,
            None => return Ok(false),
        };
        let u1 = (e * &c) % &n;
        let u2 = (&signature.r * &c) % &n;
        let p = C::mul_add_mulgen_vartime(&pk.q, &u2, &u1);
        if C::is_neutral(&p) {
            return Ok(false);
        }
        Ok(C::x_coordinate(&p) % &n == signature.r)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use sha2::{Digest, Sha256, Sha512};
    use crate::ec::{generate_key_pair, EcPrivateKey, P256, Secp256k1};
    use crate::signer::HmacKCalculator;
    use crate::testing::{int, TestRng};

    fn rfc6979_key() -> EcPrivateKey<P256> {
        EcPrivateKey::new(int(
            "C9AFA9D845BA75166B5C215767B1D6934E50C3DB36E89B127B8A622B120F6721"))
            .unwrap()
    }

    #[test]
    fn rfc6979() {
        // RFC 6979, A.2.5, SHA-256.
        let sk = rfc6979_key();
        let pk = sk.public_key();
        let mut signer: EcdsaSigner<P256, _> =
            EcdsaSigner::with_k_calculator(HmacKCalculator::<Sha256>::new());
        signer.init(true, KeyRole::Private(sk)).unwrap();
        let mut verifier = EcdsaSigner::<P256>::new();
        verifier.init(false, KeyRole::Public(pk)).unwrap();
        let mut rng = TestRng::new(b"unused");

        let h = Sha256::digest(b"sample");
        let sig = signer.generate_signature(&mut rng, &h).unwrap();
        assert!(sig.r == int("EFD48B2AACB6A8FD1140DD9CD45E81D69D2C877B56AAF991C34D0EA84EAF3716"));
        assert!(sig.s == int("F7CB1C942D657C41D436C7A1B6E29F65F3E900DBB9AFF4064DC4AB2F843ACDA8"));
        assert!(verifier.verify_signature(&h, &sig).unwrap());

        let h = Sha256::digest(b"test");
        let sig = signer.generate_signature(&mut rng, &h).unwrap();
        assert!(sig.r == int("F1ABB023518351CD71D881567B1EA663ED3EFCF6C5132B354F28D3B0B7D38367"));
        assert!(sig.s == int("019F4113742A2B14BD25926B49C649155F267E60D3814B4C0CC84250E46F0083"));
        assert!(verifier.verify_signature(&h, &sig).unwrap());
        assert!(!verifier.verify_signature(&Sha256::digest(b"sample"), &sig).unwrap());
    }

    #[test]
    fn sign_verify() {
        fn check<C: Curve>(rng: &mut TestRng) {
            let (sk, pk) = generate_key_pair::<C>(rng);
            let mut signer = EcdsaSigner::<C>::new();
            signer.init(true, KeyRole::Private(sk)).unwrap();
            let mut verifier = EcdsaSigner::<C>::new();
            verifier.init(false, KeyRole::Public(pk)).unwrap();
            let n = verifier.order().unwrap();

            for i in 0..5u8 {
                let h = Sha256::digest([i; 3]);
                let sig = signer.generate_signature(rng, &h).unwrap();
                assert!(sig.in_range(&n));
                assert!(verifier.verify_signature(&h, &sig).unwrap());
                let bad = Signature::new(sig.r.clone(), (&sig.s + 1u32) % &n);
                assert!(!verifier.verify_signature(&h, &bad).unwrap());
                let bad = Signature::new(sig.r.clone(), &sig.s + &n);
                assert!(!verifier.verify_signature(&h, &bad).unwrap());
            }

            // Hash longer than the order: truncated to the top bits.
            let h = Sha512::digest(b"long");
            let sig = signer.generate_signature(rng, &h).unwrap();
            assert!(verifier.verify_signature(&h, &sig).unwrap());
            assert!(verifier.verify_signature(&h[..32], &sig).unwrap());
        }
        let mut rng = TestRng::new(b"ecdsa");
        check::<P256>(&mut rng);
        check::<Secp256k1>(&mut rng);
    }

    #[test]
    fn sha3_hash() {
        use sha3::Sha3_256;
        let mut rng = TestRng::new(b"ecdsa sha3");
        let sk = rfc6979_key();
        let pk = sk.public_key();
        let mut signer: EcdsaSigner<P256, _> =
            EcdsaSigner::with_k_calculator(HmacKCalculator::<Sha3_256>::new());
        signer.init(true, KeyRole::Private(sk)).unwrap();
        let mut verifier = EcdsaSigner::<P256>::new();
        verifier.init(false, KeyRole::Public(pk)).unwrap();
        let h = Sha3_256::digest(b"sample");
        let s1 = signer.generate_signature(&mut rng, &h).unwrap();
        let s2 = signer.generate_signature(&mut rng, &h).unwrap();
        assert!(s1 == s2);
        assert!(verifier.verify_signature(&h, &s1).unwrap());
        assert!(!verifier.verify_signature(&Sha256::digest(b"sample"), &s1).unwrap());
    }

    #[test]
    fn roles() {
        let mut rng = TestRng::new(b"ecdsa roles");
        let (sk, pk) = generate_key_pair::<P256>(&mut rng);
        let mut s = EcdsaSigner::<P256>::new();
        assert!(s.order().is_none());
        assert!(s.generate_signature(&mut rng, b"x").is_err());
        assert!(s.init(true, KeyRole::Public(pk)).is_err());
        assert!(s.init(false, KeyRole::Private(sk.clone())).is_err());
        s.init(true, KeyRole::Private(sk)).unwrap();
        assert!(s.algorithm_name() == "ECDSA");
        let sig = s.generate_signature(&mut rng, b"x").unwrap();
        assert!(matches!(s.verify_signature(b"x", &sig),
            Err(Error::InvalidState(_))));
    }
}
