//! CBC mode with ciphertext stealing.
//!
//! Messages of any length of at least one block are encrypted without
//! expansion. All blocks but the last two are processed in plain CBC
//! mode; the last full block and the final (possibly partial) block are
//! processed as:
//!
//! ```text
//!     E = E(K, P[n-1] xor C[n-2])
//!     C[n-1] = E(K, E xor (P[n] || 0...))
//!     C[n]   = MSB_d(E)
//! ```
//!
//! and emitted as `C[n-1] || C[n]`, i.e. the last two blocks are swapped
//! relative to plain CBC (the layout of RFC 2040 and RFC 3962). A
//! single-block message is plain CBC; messages shorter than a block are
//! rejected.

use zeroize::Zeroizing;

use crate::Vec;
use crate::block::BlockCipher;
use crate::error::{Error, Result};
use crate::params::ParametersWithIv;

/// CTS over a block cipher.
#[derive(Clone)]
pub struct CtsBlockCipher<E: BlockCipher> {
    engine: E,
    iv: Vec<u8>,
    for_encryption: bool,
    initialized: bool,
}

fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}

impl<E: BlockCipher> CtsBlockCipher<E> {

    /// Creates a CTS cipher over the provided engine.
    pub fn new(engine: E) -> Self {
        Self { engine, iv: Vec::new(), for_encryption: true, initialized: false }
    }

    /// Gets the underlying block cipher.
    pub fn underlying_cipher(&self) -> &E {
        &self.engine
    }

    /// Sets key, IV and direction. The IV, if provided, must have the
    /// length of a block; the default is all-zero.
    pub fn init(&mut self, for_encryption: bool, params: ParametersWithIv) -> Result<()> {
        let bs = self.engine.block_size();
        self.iv = match params.iv {
            Some(iv) if iv.len() == bs => iv.to_vec(),
            Some(_) => return Err(Error::InvalidArgument("IV length must match the block size")),
            None => vec![0u8; bs],
        };
        self.engine.init(for_encryption, params.key)?;
        self.for_encryption = for_encryption;
        self.initialized = true;
        log::debug!("CTS/{} init: encryption={}", self.engine.algorithm_name(),
            for_encryption);
        Ok(())
    }

    /// Encrypts or decrypts a complete message.
    pub fn process(&self, input: &[u8]) -> Result<Vec<u8>> {
        if !self.initialized {
            return Err(Error::InvalidState("CTS cipher not initialised"));
        }
        let bs = self.engine.block_size();
        if input.len() < bs {
            return Err(Error::DataLength("need at least one block of input for CTS"));
        }
        if self.for_encryption {
            self.encrypt(input, bs)
        } else {
            self.decrypt(input, bs)
        }
    }

    fn encrypt(&self, input: &[u8], bs: usize) -> Result<Vec<u8>> {
        let len = input.len();
        let mut out = Vec::with_capacity(len);
        let mut chain = Zeroizing::new(self.iv.clone());

        // Plain CBC up to the last two blocks.
        let tail = if len == bs { bs } else { bs + (len - 1) % bs + 1 };
        let mut buf = Zeroizing::new(vec![0u8; bs]);
        for block in input[..(len - tail)].chunks(bs) {
            buf.copy_from_slice(block);
            xor_into(&mut buf, &chain);
            self.engine.process_block(&mut buf)?;
            out.extend_from_slice(&buf);
            chain.copy_from_slice(&buf);
        }

        let last = &input[(len - tail)..];
        buf.copy_from_slice(&last[..bs]);
        xor_into(&mut buf, &chain);
        self.engine.process_block(&mut buf)?;
        if len == bs {
            out.extend_from_slice(&buf);
            return Ok(out);
        }

        let d = tail - bs;
        let mut next = Zeroizing::new(buf.to_vec());
        xor_into(&mut next[..d], &last[bs..]);
        self.engine.process_block(&mut next)?;
        out.extend_from_slice(&next);
        out.extend_from_slice(&buf[..d]);
        Ok(out)
    }

    fn decrypt(&self, input: &[u8], bs: usize) -> Result<Vec<u8>> {
        let len = input.len();
        let mut out = Vec::with_capacity(len);
        let mut chain = Zeroizing::new(self.iv.clone());

        let tail = if len == bs { bs } else { bs + (len - 1) % bs + 1 };
        let mut buf = Zeroizing::new(vec![0u8; bs]);
        for block in input[..(len - tail)].chunks(bs) {
            buf.copy_from_slice(block);
            self.engine.process_block(&mut buf)?;
            xor_into(&mut buf, &chain);
            out.extend_from_slice(&buf);
            chain.copy_from_slice(block);
        }

        let last = &input[(len - tail)..];
        buf.copy_from_slice(&last[..bs]);
        self.engine.process_block(&mut buf)?;
        if len == bs {
            xor_into(&mut buf, &chain);
            out.extend_from_slice(&buf);
            return Ok(out);
        }

        // buf = E xor (P[n] || 0); E starts with C[n].
        let d = tail - bs;
        let cn = &last[bs..];
        let mut pn = Zeroizing::new(buf[..d].to_vec());
        xor_into(&mut pn, cn);
        buf[..d].copy_from_slice(cn);
        self.engine.process_block(&mut buf)?;
        xor_into(&mut buf, &chain);
        out.extend_from_slice(&buf);
        out.extend_from_slice(&pn);
        Ok(out)
    }
}
