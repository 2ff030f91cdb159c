//! AES key wrap (RFC 3394), over any 128-bit block cipher.
//!
//! Wrapping a key of `n` 64-bit blocks `R[1..n]`, with initial value
//! `A = IV`, runs six passes of:
//!
//! ```text
//!     B = E(K, A || R[i])
//!     A = MSB64(B) xor (n*j + i)
//!     R[i] = LSB64(B)
//! ```
//!
//! and outputs `A || R[1] || ... || R[n]`. Unwrapping runs the same steps
//! backwards and checks that the recovered `A` equals the IV; any
//! mismatch is reported as `Error::InvalidCipherText`.
//!
//! The default IV is `A6A6A6A6A6A6A6A6`. Keys to wrap must be at least
//! two blocks (16 bytes) long.

use zeroize::Zeroizing;

use crate::Vec;
use crate::block::BlockCipher;
use crate::ct;
use crate::error::{Error, Result};
use crate::params::ParametersWithIv;

/// Default initial value (RFC 3394, section 2.2.3.1).
pub const DEFAULT_IV: [u8; 8] = [0xA6; 8];

/// RFC 3394 wrap/unwrap engine.
#[derive(Clone)]
pub struct Rfc3394WrapEngine<E: BlockCipher> {
    engine: E,
    iv: [u8; 8],
    for_wrapping: bool,
    initialized: bool,
}

impl<E: BlockCipher> Rfc3394WrapEngine<E> {

    /// Creates an engine over the provided block cipher (which must
    /// have 16-byte blocks).
    pub fn new(engine: E) -> Self {
        Self { engine, iv: DEFAULT_IV, for_wrapping: true, initialized: false }
    }

    /// Name of the algorithm, for diagnostics.
    pub fn algorithm_name(&self) -> &'static str {
        self.engine.algorithm_name()
    }

    /// Sets the key-encryption key and direction. An IV, if provided,
    /// must be 8 bytes; otherwise the default IV is used.
    pub fn init(&mut self, for_wrapping: bool, params: ParametersWithIv) -> Result<()> {
        if self.engine.block_size() != 16 {
            return Err(Error::InvalidArgument("key wrap requires a 128-bit block cipher"));
        }
        self.iv = match params.iv {
            Some(iv) if iv.len() == 8 => {
                let mut t = [0u8; 8];
                t.copy_from_slice(iv);
                t
            }
            Some(_) => return Err(Error::InvalidArgument("IV must be 8 bytes")),
            None => DEFAULT_IV,
        };
        self.engine.init(for_wrapping, params.key)?;
        self.for_wrapping = for_wrapping;
        self.initialized = true;
        log::debug!("RFC 3394 {} init: wrapping={}", self.engine.algorithm_name(),
            for_wrapping);
        Ok(())
    }

    /// Wraps a key.
    pub fn wrap(&self, input: &[u8]) -> Result<Vec<u8>> {
        if !self.initialized || !self.for_wrapping {
            return Err(Error::InvalidState("not set for wrapping"));
        }
        if input.len() < 16 {
            return Err(Error::DataLength("wrap data must be at least 16 bytes"));
        }
        if input.len() % 8 != 0 {
            return Err(Error::DataLength("wrap data must be a multiple of 8 bytes"));
        }
        let n = input.len() >> 3;
        let mut block = Zeroizing::new(Vec::with_capacity(input.len() + 8));
        block.extend_from_slice(&self.iv);
        block.extend_from_slice(input);

        let mut buf = Zeroizing::new([0u8; 16]);
        for j in 0..6 {
            for i in 1..=n {
                buf[..8].copy_from_slice(&block[..8]);
                buf[8..].copy_from_slice(&block[(8 * i)..(8 * i + 8)]);
                self.engine.process_block(&mut buf[..])?;
                xor_counter(&mut buf[..8], (n * j + i) as u64);
                block[..8].copy_from_slice(&buf[..8]);
                block[(8 * i)..(8 * i + 8)].copy_from_slice(&buf[8..]);
            }
        }
        Ok(core::mem::take(&mut *block))
    }

    /// Unwraps a key.
    pub fn unwrap(&self, input: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if !self.initialized || self.for_wrapping {
            return Err(Error::InvalidState("not set for unwrapping"));
        }
        if input.len() < 24 || input.len() % 8 != 0 {
            return Err(Error::InvalidCipherText);
        }
        let n = (input.len() >> 3) - 1;
        let mut a = [0u8; 8];
        a.copy_from_slice(&input[..8]);
        let mut r = Zeroizing::new(input[8..].to_vec());

        let mut buf = Zeroizing::new([0u8; 16]);
        for j in (0..6).rev() {
            for i in (1..=n).rev() {
                buf[..8].copy_from_slice(&a);
                xor_counter(&mut buf[..8], (n * j + i) as u64);
                buf[8..].copy_from_slice(&r[(8 * i - 8)..(8 * i)]);
                self.engine.process_block(&mut buf[..])?;
                a.copy_from_slice(&buf[..8]);
                r[(8 * i - 8)..(8 * i)].copy_from_slice(&buf[8..]);
            }
        }
        if ct::slice_eq(&a, &self.iv) == 0 {
            return Err(Error::InvalidCipherText);
        }
        Ok(r)
    }
}

// A = A xor t, with t as a 64-bit big-endian integer.
fn xor_counter(a: &mut [u8], t: u64) {
    for (x, y) in a.iter_mut().zip(t.to_be_bytes().iter()) {
        *x ^= *y;
    }
}
