// Constant-time helpers on u32 masks: 0xFFFFFFFF is "true", 0x00000000
// is "false". No other value is ever produced by these functions.

/// Returns 0xFFFFFFFF if `x == 0`, 0x00000000 otherwise.
#[inline(always)]
pub(crate) fn eq0(x: u32) -> u32 {
    let q = x | x.wrapping_neg();
    (q >> 31).wrapping_sub(1)
}

/// Returns 0xFFFFFFFF if `a == b`, 0x00000000 otherwise.
#[inline(always)]
pub(crate) fn eq_u8(a: u8, b: u8) -> u32 {
    eq0((a ^ b) as u32)
}

/// Returns 0xFFFFFFFF if `a == b`, 0x00000000 otherwise.
#[inline(always)]
pub(crate) fn eq_usize(a: usize, b: usize) -> u32 {
    let x = (a ^ b) as u64;
    eq0((x as u32) | ((x >> 32) as u32))
}

/// Returns 0xFFFFFFFF if `a < b`, 0x00000000 otherwise.
#[inline(always)]
pub(crate) fn lt_usize(a: usize, b: usize) -> u32 {
    let (a, b) = (a as u64, b as u64);
    let c = a.wrapping_sub(b);
    (((c ^ ((a ^ b) & (b ^ c))) >> 63) as u32).wrapping_neg()
}

/// Converts a Boolean into a mask. Only meant for values that are not
/// secret (e.g. lengths).
#[inline(always)]
pub(crate) fn from_bool(b: bool) -> u32 {
    (b as u32).wrapping_neg()
}

/// Returns `a` if `ctl` is 0xFFFFFFFF, `b` if `ctl` is 0x00000000.
#[inline(always)]
pub(crate) fn select_usize(ctl: u32, a: usize, b: usize) -> usize {
    let m = ((ctl & 1) as usize).wrapping_neg();
    b ^ (m & (a ^ b))
}

/// Returns `a` if `ctl` is 0xFFFFFFFF, `b` if `ctl` is 0x00000000.
#[inline(always)]
pub(crate) fn select_u8(ctl: u32, a: u8, b: u8) -> u8 {
    let m = ctl as u8;
    b ^ (m & (a ^ b))
}

/// Compares two slices of equal length; returns 0xFFFFFFFF on equality.
/// Slices of distinct lengths yield 0x00000000 (length is not secret).
pub(crate) fn slice_eq(a: &[u8], b: &[u8]) -> u32 {
    if a.len() != b.len() {
        return 0;
    }
    let mut acc = 0u32;
    for i in 0..a.len() {
        acc |= (a[i] ^ b[i]) as u32;
    }
    eq0(acc)
}
