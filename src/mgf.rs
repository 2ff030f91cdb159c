//! MGF1 mask generation function (PKCS#1 v2.1, appendix B.2.1).
//!
//! `MGF1(seed, len)` is the concatenation of `Hash(seed || C)` for
//! `C = 0, 1, 2...` (each counter encoded over 4 bytes, big-endian),
//! truncated to `len` bytes. OAEP and PSS only ever use the mask to XOR
//! it into a buffer, so that is the exposed operation.

use digest::Digest;

/// XORs `MGF1(seed, out.len())` into `out`, using hash function `D`.
pub fn mgf1_xor<D: Digest>(seed: &[u8], out: &mut [u8]) {
    let hlen = <D as Digest>::output_size();
    let mut counter = 0u32;
    for chunk in out.chunks_mut(hlen) {
        let mut h = D::new();
        h.update(seed);
        h.update(counter.to_be_bytes());
        let v = h.finalize();
        for (x, y) in chunk.iter_mut().zip(v.iter()) {
            *x ^= *y;
        }
        counter = counter.wrapping_add(1);
    }
}
