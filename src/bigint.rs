//! Helpers around the big integer engine.
//!
//! Integers are `num_bigint::BigUint` values. This module provides the
//! conversions to and from the unsigned big-endian byte encodings used by
//! the standards (PKCS#1 I2OSP/OS2IP, FIPS 186 and SEC 1 conventions),
//! uniform random sampling in ranges, and Miller-Rabin probable prime
//! testing for key pair generation.
//!
//! Random sampling uses rejection: a candidate with the bit length of the
//! upper bound is drawn, and discarded if out of range. This yields a
//! uniform distribution over the range, at the cost of an average of less
//! than two draws per sample.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use zeroize::Zeroizing;

use crate::{CryptoRngCore, Vec};
use crate::error::{Error, Result};

/// Returns the size of `x`, in bits (0 for `x = 0`).
pub fn bit_length(x: &BigUint) -> usize {
    x.bits() as usize
}

/// Returns the minimal size of the unsigned encoding of `x`, in bytes.
pub fn byte_length(x: &BigUint) -> usize {
    (bit_length(x) + 7) >> 3
}

/// Decodes an unsigned big-endian integer. An empty slice decodes to
/// zero.
pub fn from_unsigned_bytes(buf: &[u8]) -> BigUint {
    BigUint::from_bytes_be(buf)
}

/// Encodes `x` in unsigned big-endian convention, over the minimal
/// number of bytes (zero yields an empty vector).
pub fn to_unsigned_bytes(x: &BigUint) -> Vec<u8> {
    if x.is_zero() {
        Vec::new()
    } else {
        x.to_bytes_be()
    }
}

/// Encodes `x` in unsigned big-endian convention, over exactly `len`
/// bytes (left-padded with zeros).
///
/// `Error::DataLength` is returned if `x` does not fit.
pub fn to_fixed_bytes(x: &BigUint, len: usize) -> Result<Vec<u8>> {
    let enc = to_unsigned_bytes(x);
    if enc.len() > len {
        return Err(Error::DataLength("integer too large for output length"));
    }
    let mut out = vec![0u8; len];
    out[(len - enc.len())..].copy_from_slice(&enc);
    Ok(out)
}

/// Returns a uniformly random integer in the `[0, 2^bits)` range.
pub fn random_bits(rng: &mut dyn CryptoRngCore, bits: usize) -> BigUint {
    if bits == 0 {
        return BigUint::zero();
    }
    let len = (bits + 7) >> 3;
    let mut buf = Zeroizing::new(vec![0u8; len]);
    rng.fill_bytes(&mut buf[..]);
    buf[0] &= 0xFFu8 >> ((len << 3) - bits);
    BigUint::from_bytes_be(&buf[..])
}

/// Returns a uniformly random integer in the `[0, n)` range.
///
/// `n` MUST be non-zero.
pub fn random_below(rng: &mut dyn CryptoRngCore, n: &BigUint) -> BigUint {
    assert!(!n.is_zero());
    let bits = bit_length(n);
    loop {
        let k = random_bits(rng, bits);
        if &k < n {
            return k;
        }
    }
}

/// Returns a uniformly random integer in the `[1, n)` range.
///
/// `n` MUST be at least 2. This is the nonce sampler for the signature
/// schemes; each rejected candidate is logged at `trace` level (the
/// value itself is never logged).
pub fn random_nonzero_below(rng: &mut dyn CryptoRngCore, n: &BigUint) -> BigUint {
    assert!(n > &BigUint::one());
    let bits = bit_length(n);
    loop {
        let k = random_bits(rng, bits);
        if !k.is_zero() && &k < n {
            return k;
        }
        log::trace!("random value out of [1, n-1], drawing again");
    }
}

/// Returns a uniformly random integer in the `[min, max]` range (both
/// bounds included).
///
/// `max` MUST NOT be lower than `min`.
pub fn random_in_range(rng: &mut dyn CryptoRngCore,
    min: &BigUint, max: &BigUint) -> BigUint
{
    assert!(min <= max);
    let width = max - min + 1u32;
    min + random_below(rng, &width)
}

/// Returns the number of non-zero digits in the non-adjacent form of
/// `x`. Private exponents with a low NAF weight are rejected by the key
/// generators.
pub(crate) fn naf_weight(x: &BigUint) -> usize {
    let x3 = (x << 1u32) + x;
    (x3 ^ x).count_ones() as usize
}

// Odd primes below 256, for trial division.
const SMALL_PRIMES: [u32; 53] = [
      3,   5,   7,  11,  13,  17,  19,  23,  29,  31,  37,  41,  43,  47,
     53,  59,  61,  67,  71,  73,  79,  83,  89,  97, 101, 103, 107, 109,
    113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Tests `n` for primality (trial division, then `rounds` Miller-Rabin
/// iterations with random bases).
///
/// A composite survives with probability at most `4^(-rounds)`. This
/// function is not constant-time.
pub fn is_probable_prime(n: &BigUint, rounds: usize,
    rng: &mut dyn CryptoRngCore) -> bool
{
    if n < &BigUint::from(2u32) {
        return false;
    }
    if n.bits() <= 2 {
        // 2 or 3
        return true;
    }
    if !n.bit(0) {
        return false;
    }
    for &p in SMALL_PRIMES.iter() {
        if n == &BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    // n - 1 = d*2^s with d odd.
    let n1 = n - 1u32;
    let s = match n1.trailing_zeros() {
        Some(s) => s,
        None => return false,
    };
    let d = &n1 >> s;
    let two = BigUint::from(2u32);
    let nm2 = n - 2u32;

    'witness: for _ in 0..rounds {
        let a = random_in_range(rng, &two, &nm2);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n1 {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n1 {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }
        return false;
    }
    true
}

/// Generates a random probable prime of exactly `bits` bits. The two top
/// bits are set, so that the product of two such primes has exactly the
/// sum of their sizes.
///
/// `bits` MUST be at least 3.
pub fn random_prime(rng: &mut dyn CryptoRngCore, bits: usize,
    rounds: usize) -> BigUint
{
    assert!(bits >= 3);
    let top = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2));
    loop {
        let c = random_bits(rng, bits) | &top | BigUint::one();
        if is_probable_prime(&c, rounds, rng) {
            return c;
        }
    }
}
