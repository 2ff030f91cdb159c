//! Minimal DER encoder.
//!
//! Only the few constructs needed by the key derivation functions are
//! supported: SEQUENCE, OCTET STRING, NULL, OBJECT IDENTIFIER and
//! explicitly tagged context-specific values. Encoding functions return
//! complete TLV byte strings, which are then nested by passing them as
//! components of an outer SEQUENCE.

use crate::Vec;
use crate::error::{Error, Result};

const TAG_OCTET_STRING: u8 = 0x04;
const TAG_NULL: u8 = 0x05;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_CONTEXT_CONSTRUCTED: u8 = 0xA0;

fn encode_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = (len as u64).to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (8 - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn tlv(tag: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(len + 6);
    out.push(tag);
    encode_length(&mut out, len);
    for p in parts {
        out.extend_from_slice(p);
    }
    out
}

/// Encodes a SEQUENCE from already encoded components.
pub fn sequence(components: &[&[u8]]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, components)
}

/// Encodes an OCTET STRING.
pub fn octet_string(data: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, &[data])
}

/// Encodes a NULL.
pub fn null() -> Vec<u8> {
    vec![TAG_NULL, 0x00]
}

/// Encodes an explicitly tagged, context-specific value `[tag] inner`.
/// `inner` is a complete encoding.
pub fn explicit(tag: u8, inner: &[u8]) -> Vec<u8> {
    tlv(TAG_CONTEXT_CONSTRUCTED | (tag & 0x1F), &[inner])
}

/// An object identifier, kept in encoded form (contents octets).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectIdentifier {
    body: Vec<u8>,
}

impl ObjectIdentifier {

    /// Builds an identifier from its arcs. There must be at least two
    /// arcs; the first one is 0, 1 or 2, and the second one is lower
    /// than 40 unless the first one is 2.
    pub fn new(arcs: &[u32]) -> Result<Self> {
        if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
            return Err(Error::InvalidArgument("invalid object identifier"));
        }
        let mut body = Vec::new();
        let first = (arcs[0] as u64) * 40 + (arcs[1] as u64);
        push_base128(&mut body, first);
        for &a in &arcs[2..] {
            push_base128(&mut body, a as u64);
        }
        Ok(Self { body })
    }

    /// Gets the complete encoding (tag, length and contents).
    pub fn encode(&self) -> Vec<u8> {
        tlv(TAG_OID, &[&self.body])
    }
}

fn push_base128(out: &mut Vec<u8>, mut x: u64) {
    let mut tmp = [0u8; 10];
    let mut n = tmp.len();
    loop {
        n -= 1;
        tmp[n] = (x & 0x7F) as u8;
        x >>= 7;
        if x == 0 {
            break;
        }
    }
    let end = tmp.len() - 1;
    for t in tmp[n..end].iter_mut() {
        *t |= 0x80;
    }
    out.extend_from_slice(&tmp[n..]);
}
