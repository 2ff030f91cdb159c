mod util;
use util::{core_cycles, BenchRng};

use std::sync::Arc;
use pkcore::{AsymmetricBlockCipher, BasicAgreement, BigUint, KeyRole};
use pkcore::dh::{self, DhBasicAgreement};
use pkcore::params::DhParameters;
use pkcore::pkcs1::Pkcs1Encoding;
use pkcore::rsa::{RsaEngine, RsaKeyPairGenerator};

// RFC 3526, 2048-bit MODP group (group 14).
const MODP2048: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF");

fn bench_rsa(bits: usize) -> (f64, f64, u8) {
    let mut rng = BenchRng::new();
    let gen = RsaKeyPairGenerator::new(bits).unwrap();
    let (sk, pk) = gen.generate(&mut rng);

    let mut enc = Pkcs1Encoding::new(RsaEngine::new());
    enc.init(true, KeyRole::Public(pk)).unwrap();
    let mut dec = Pkcs1Encoding::new(RsaEngine::new());
    dec.init(false, KeyRole::Private(sk)).unwrap();

    let mut msg = [0u8; 32];
    let mut ct = Vec::new();
    let mut tt = [0; 100];
    for i in 0..tt.len() {
        let begin = core_cycles();
        for _ in 0..10 {
            ct = enc.process_block(&mut rng, &msg).unwrap();
            msg[0] ^= ct[1];
        }
        let end = core_cycles();
        tt[i] = end.wrapping_sub(begin);
    }
    tt.sort();
    let t_pub = (tt[tt.len() >> 1] as f64) / 10.0;

    let mut tt = [0; 20];
    for i in 0..tt.len() {
        let begin = core_cycles();
        for _ in 0..10 {
            let m = dec.process_block(&mut rng, &ct).unwrap();
            msg[1] ^= m[0];
        }
        let end = core_cycles();
        tt[i] = end.wrapping_sub(begin);
    }
    tt.sort();
    let t_priv = (tt[tt.len() >> 1] as f64) / 10.0;
    (t_pub, t_priv, msg[0] ^ msg[1])
}

fn bench_dh() -> (f64, u8) {
    let mut rng = BenchRng::new();
    let p = BigUint::parse_bytes(MODP2048.as_bytes(), 16).unwrap();
    let pp = Arc::new(DhParameters::new(p, BigUint::from(2u32)).unwrap());
    let (a, _) = dh::generate_key_pair(pp.clone(), &mut rng);
    let (_, pb) = dh::generate_key_pair(pp, &mut rng);
    let mut ka = DhBasicAgreement::new();
    ka.init(KeyRole::Private(a)).unwrap();

    let mut x = 0u8;
    let mut tt = [0; 20];
    for i in 0..tt.len() {
        let begin = core_cycles();
        for _ in 0..10 {
            let z = ka.calculate_agreement(&pb).unwrap();
            x ^= z.to_bytes_le()[0];
        }
        let end = core_cycles();
        tt[i] = end.wrapping_sub(begin);
    }
    tt.sort();
    ((tt[tt.len() >> 1] as f64) / 10.0, x)
}

fn main() {
    let mut bx = 0u8;

    let (v1, v2, x) = bench_rsa(2048);
    bx ^= x;
    println!("RSA-2048 public (PKCS#1):   {:13.2}", v1);
    println!("RSA-2048 private (PKCS#1):  {:13.2}", v2);
    let (v, x) = bench_dh();
    bx ^= x;
    println!("DH-2048 agreement:          {:13.2}", v);

    println!("{}", bx);
}
