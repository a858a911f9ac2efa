//! Black-box integration tests against the public API only, in the manner
//! of `fuel-types/tests/types.rs`: a seeded `StdRng` for reproducible
//! property coverage, plus `serde_json` round trips behind the `serde`
//! feature.

use flint_core::prelude::*;
#[cfg(feature = "serde")]
use rand::rngs::StdRng;
#[cfg(feature = "serde")]
use rand::Rng;
#[cfg(feature = "serde")]
use rand::SeedableRng;

#[test]
fn decimal_round_trip_through_public_api() {
    let values = ["0", "1", "-1", "123456789012345678901234567890", "-42"];
    for v in values {
        let z: Z = v.parse().unwrap();
        assert_eq!(z.to_string(), v);
    }
}

#[test]
fn fraction_parsing_and_canonical_form() {
    let q: Q = "6/8".parse().unwrap();
    assert_eq!(q.to_string(), "3/4");

    let whole: Q = "5".parse().unwrap();
    assert_eq!(whole.to_string(), "5");
}

#[test]
fn polynomial_parsing_matches_reconstruction() {
    // coeffs [1, 2] over denominator 3, i.e. (1 + 2x) / 3.
    let f: Qx = "1 2 3".parse().unwrap();
    let g: Qx = f.to_string().parse().unwrap();
    assert_eq!(f, g);
}

#[test]
fn crt_combination_recovers_the_original_value() {
    let r1 = Z::from_i64(2);
    let m1 = Z::from_i64(5);
    let r2 = Z::from_i64(3);
    let m2 = Z::from_i64(7);
    let combined = Z::crt(&r1, &m1, &r2, &m2, false).unwrap();
    assert_eq!(combined.fdiv_qr(&m1).unwrap().1, r1);
    assert_eq!(combined.fdiv_qr(&m2).unwrap().1, r2);
}

#[cfg(feature = "random")]
#[test]
fn random_small_integers_are_reproducible_for_a_fixed_seed() {
    let mut a = RandState::from_seed(2024);
    let mut b = RandState::from_seed(2024);
    for _ in 0..50 {
        assert_eq!(Z::rand_bits(&mut a, 48), Z::rand_bits(&mut b, 48));
    }
}

#[cfg(feature = "random")]
#[test]
fn next_prime_search_finds_an_odd_prime_above_the_seed() {
    let mut rng = RandState::from_seed(11);
    let seed = Z::from_i64(100);
    let found = seed.next_prime(false, &mut rng).unwrap();
    assert!(found > seed);
    assert_eq!(found.is_prime(20, &mut rng), Primality::Prime);
}

#[cfg(feature = "serde")]
#[test]
fn json_round_trip_for_z_q_and_qx() {
    let rng = &mut StdRng::seed_from_u64(8586);

    let z = Z::from_i64(rng.gen::<i32>() as i64);
    let z_json = serde_json::to_string(&z).expect("serde_json::to_string failed on Z");
    assert_eq!(format!("\"{z}\""), z_json);
    let z_back: Z = serde_json::from_str(&z_json).expect("serde_json::from_str failed on Z");
    assert_eq!(z, z_back);

    let q = Q::set_from_fraction(&Z::from_i64(22), &Z::from_i64(7)).unwrap();
    let q_json = serde_json::to_string(&q).expect("serde_json::to_string failed on Q");
    assert_eq!(format!("[\"{}\",\"{}\"]", q.num(), q.den()), q_json);
    let q_back: Q = serde_json::from_str(&q_json).expect("serde_json::from_str failed on Q");
    assert_eq!(q, q_back);

    let qx: Qx = "1 1 3 2".parse().unwrap();
    let qx_json = serde_json::to_string(&qx).expect("serde_json::to_string failed on Qx");
    assert_eq!(format!("\"{qx}\""), qx_json);
    let qx_back: Qx = serde_json::from_str(&qx_json).expect("serde_json::from_str failed on Qx");
    assert_eq!(qx, qx_back);
}
