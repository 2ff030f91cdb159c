// Test support: deterministic random sources and shared key material.

use alloc::sync::Arc;
use num_bigint::BigUint;
use rand_core::{impls, CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::Vec;
use crate::params::{DhParameters, DsaParameters, RsaPrivateCrtKey};

/// Deterministic RNG: SHA-256 over a seed and a 64-bit counter.
pub(crate) struct TestRng {
    seed: [u8; 32],
    counter: u64,
    buf: [u8; 32],
    ptr: usize,
}

impl TestRng {
    pub(crate) fn new(seed: &[u8]) -> Self {
        Self {
            seed: Sha256::digest(seed).into(),
            counter: 0,
            buf: [0u8; 32],
            ptr: 32,
        }
    }
}

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for d in dest.iter_mut() {
            if self.ptr == self.buf.len() {
                let mut sh = Sha256::new();
                sh.update(&self.seed);
                sh.update(self.counter.to_le_bytes());
                self.buf = sh.finalize().into();
                self.counter += 1;
                self.ptr = 0;
            }
            *d = self.buf[self.ptr];
            self.ptr += 1;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8])
        -> Result<(), rand_core::Error>
    {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for TestRng {}

/// Scripted RNG: returns the provided bytes first, then falls back to a
/// `TestRng`.
pub(crate) struct FixedRng {
    data: Vec<u8>,
    ptr: usize,
    fallback: TestRng,
}

impl FixedRng {
    pub(crate) fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            ptr: 0,
            fallback: TestRng::new(b"fixed rng fallback"),
        }
    }

    /// Number of scripted bytes consumed so far.
    pub(crate) fn consumed(&self) -> usize {
        self.ptr
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for d in dest.iter_mut() {
            if self.ptr < self.data.len() {
                *d = self.data[self.ptr];
                self.ptr += 1;
            } else {
                let mut t = [0u8; 1];
                self.fallback.fill_bytes(&mut t);
                *d = t[0];
            }
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8])
        -> Result<(), rand_core::Error>
    {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for FixedRng {}

pub(crate) fn int(hex_str: &str) -> BigUint {
    BigUint::from_bytes_be(&hex::decode(hex_str).unwrap())
}

// RSA-1024 test key (generated with an independent implementation).
const RSA_N: &str = concat!(
    "ADEAE5E7EF7F5E48BAB35070A192E6D755ACEAA00612509FFA21A69B68BEAAF1",
    "8B5F448121CBBD9ACAD84A853AEC239F96CD737EEBFF5432599C31BA0C75CF37",
    "9DF5DB74FD9706345D6B9B535D8843756937D490AE82C60BAA6711A06BAB77BD",
    "00EA06AB59324CCAF15758EF849DF540872BD04A2F6D02CEE0A1B8B9D6306041");
const RSA_E: &str = "010001";
const RSA_D: &str = concat!(
    "01BC4C5B0A2ACD381094E5829A3A2B0F8F0D50B2141D6EAC8A0477F329126E06",
    "470BC6553B8F1AEF4682EE0B725114F1ECC1541BBA232C25EC7B008C08BFCC37",
    "8FA7DF53E4830735A639C0C08EC94C6C1D14C8E536FA32652E27974E6ECF8FB9",
    "91773C5424F51F1085C6388E3FB517A2D97D3DA90AD9AE11CB46F4A64036B801");
const RSA_P: &str = concat!(
    "D3A22149800657BA746B3508143CB02E429FEEDEA243CE24E4483D3EDAD5595C",
    "3625475531638EF3C6824B04F8AE19BF3DD55AC11963137B46EAF5CB852A52A1");
const RSA_Q: &str = concat!(
    "D260A6B0A45934DD8E6C0DB527B017D05920E8D3C2E2D5B2E391571CA07F0289",
    "091576C59A650B7C06876BAD61230052A807B8C07865F43ACDDF7FEA1072C9A1");
const RSA_DP: &str = concat!(
    "2A5915041A242AC5DAA9E130BEABEE2D3393C13EB7858DE87FED9CA3C9324BF1",
    "51BC5FEBC23843D0AFF63E80BE2A4868A63CDD2E2AA052B3A65B39D801CB9841");
const RSA_DQ: &str = concat!(
    "BEEF295A384F1E43D6F70A99D7A362799DEAD865190376A01D19D3CE0F7C3678",
    "D8DDBA262DB27771E11B17070C9A0FB8F4F7CD1E2227A639988FB8305F2D4F01");
const RSA_QINV: &str = concat!(
    "34455ED9CB6FE06D94239FB16DB12D2DC39F10A1E01AC7C115C616EEDEB12F8F",
    "DEC3A865C850201EA4A2FC4CCAE04141E996600C42C42FA1B88B3283BDE85502");

pub(crate) fn rsa_key() -> RsaPrivateCrtKey {
    RsaPrivateCrtKey::new(int(RSA_N), int(RSA_E), int(RSA_D),
        int(RSA_P), int(RSA_Q), int(RSA_DP), int(RSA_DQ), int(RSA_QINV))
        .unwrap()
}

// DSA 1024/160 domain parameters.
const DSA_P: &str = concat!(
    "B16A7496D73AC1E662D07498173C66AE3C8380459A83C00C5783FF5FE52B636F",
    "844E0B1180B2E71B1D9B9477B60954C6589D145A4E16A1B2742E86B0FBB312C4",
    "528555ACB167F81045F157408B644AE0F9687A85E54B894B9C2B9F7F18E577C5",
    "185C8E04E654752BEA9B235FD953FCDD98757F34339FCAAA855A8EE767CAC5B3");
const DSA_Q: &str = "AB9CCAAC21098D2B67D6ABCC652734AD5BF44F01";
const DSA_G: &str = concat!(
    "7698342A40D03ED817FF586452442DBE81C3AE6C99CD2D3C2BB95015CD68B5FC",
    "353B027627B7C067CBB86D61919F22D7DA62E004A6368D2158BFB797498C2BFB",
    "DFD5E471B6243817ACAD84D3D625A08CA600E9D55E56F9B52FB3F786C3D951CC",
    "11FAEF07D7CC4A6A9D124AD58781DF01A9B88B1C2750DB3A1C99D07F7051D5C9");

pub(crate) fn dsa_params() -> Arc<DsaParameters> {
    Arc::new(DsaParameters::new(int(DSA_P), int(DSA_Q), int(DSA_G)).unwrap())
}

// RFC 2409 / RFC 3526 768-bit MODP group ("Oakley group 1"), g = 2.
// p is a safe prime, so q = (p-1)/2 is the order of the squares.
const MODP768_P: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A63A3620FFFFFFFFFFFFFFFF");

pub(crate) fn modp768() -> BigUint {
    int(MODP768_P)
}

pub(crate) fn dh_params() -> Arc<DhParameters> {
    Arc::new(DhParameters::new(modp768(), BigUint::from(2u32)).unwrap())
}
