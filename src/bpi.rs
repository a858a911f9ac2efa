//! Operations the external Bignum Primitive provider is assumed to
//! supply but `num-bigint` itself does not: exact integer roots and
//! primality oracles. A thin adapter filling exactly that gap over
//! `num-bigint`.
//!
//! Everything here is crate-private: callers go through [`crate::z::Z`]'s
//! `isqrt`/`sqrt_rem`/`nth_root`/`is_probable_prime`/`is_prime` methods.

#[cfg(feature = "random")]
use crate::rand::RandState;
use num_bigint::{
    BigInt,
    BigUint,
    Sign,
};
use num_integer::Integer;
use num_traits::{
    One,
    Zero,
};

/// Floor integer square root of a nonnegative [`BigUint`] via Newton's
/// method. `0` maps to `0`.
pub fn isqrt(n: &BigUint) -> BigUint {
    sqrt_rem(n).0
}

/// Floor integer square root together with the remainder `n - root^2`.
pub fn sqrt_rem(n: &BigUint) -> (BigUint, BigUint) {
    if n.is_zero() {
        return (BigUint::zero(), BigUint::zero());
    }
    // Initial guess: 2^(ceil(bits/2) + 1), comfortably above the true root,
    // so the first Newton step already overshoots-then-descends.
    let bits = n.bits();
    let mut x = BigUint::one() << ((bits / 2) + 1);
    loop {
        let y = (&x + n / &x) >> 1u32;
        if y >= x {
            break;
        }
        x = y;
    }
    let rem = n - &x * &x;
    (x, rem)
}

/// Floor integer `k`-th root of a nonnegative [`BigUint`] via Newton's
/// method. `k` must be at least 1; `k == 1` returns `n` unchanged.
pub fn nth_root(n: &BigUint, k: u32) -> BigUint {
    assert!(k >= 1, "nth_root: k must be >= 1");
    if k == 1 || n.is_zero() {
        return n.clone();
    }
    if k == 2 {
        return isqrt(n);
    }
    let bits = n.bits();
    let mut x = BigUint::one() << (bits / u64::from(k) + 1);
    let k_big = BigUint::from(k);
    let k_minus_one = BigUint::from(k - 1);
    loop {
        let pow = x.pow(k - 1);
        if pow.is_zero() {
            x = BigUint::one();
            continue;
        }
        let y = (&k_minus_one * &x + n / &pow) / &k_big;
        if y >= x {
            break;
        }
        x = y;
    }
    // Newton's method for integer roots can settle one above the true
    // floor root when `n` sits just below a perfect `k`-th power; nudge
    // down until `x^k <= n` holds.
    while x.pow(k) > *n {
        x = &x - BigUint::one();
    }
    x
}

/// `true` iff `n` (assumed nonnegative) is a perfect `k`-th power.
pub fn is_perfect_kth_power(n: &BigUint, k: u32) -> bool {
    if n.is_zero() {
        return true;
    }
    nth_root(n, k).pow(k) == *n
}

const SMALL_PRIME_SIEVE: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin probabilistic primality test with `reps` independently
/// chosen witnesses.
#[cfg(feature = "random")]
pub fn is_probable_prime(n: &BigInt, reps: u32, rng: &mut RandState) -> bool {
    if *n < BigInt::from(2) {
        return false;
    }
    for p in SMALL_PRIME_SIEVE {
        let p = BigInt::from(*p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    let n_minus_three = n - BigInt::from(3);
    for _ in 0..reps {
        let a = if n_minus_three.sign() != Sign::Minus {
            let r = rng.uniform_bigint_below(
                &n_minus_three
                    .to_biguint()
                    .expect("n - 3 is nonnegative: checked above"),
            );
            BigInt::from(r) + BigInt::from(2)
        } else {
            BigInt::from(2)
        };
        if !miller_rabin_witness(n, &a) {
            return false;
        }
    }
    true
}

/// One Miller-Rabin round against a specific witness `a`. Public within the
/// crate so [`crate::z::Z::is_prime`] can run the deterministic witness set
/// below the proven bound without drawing from a [`RandState`].
pub fn miller_rabin_witness(n: &BigInt, a: &BigInt) -> bool {
    let n_minus_one = n - BigInt::one();
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while d.is_even() {
        d /= 2;
        r += 1;
    }
    let mut x = a.modpow(&d, n);
    if x == BigInt::one() || x == n_minus_one {
        return true;
    }
    for _ in 1..r {
        x = (&x * &x) % n;
        if x == n_minus_one {
            return true;
        }
    }
    false
}

/// Small primes used to fast-reject composite candidates before paying for
/// Miller-Rabin rounds.
pub fn small_prime_sieve() -> &'static [u64] {
    SMALL_PRIME_SIEVE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_matches_known_values() {
        assert_eq!(isqrt(&BigUint::from(0u32)), BigUint::from(0u32));
        assert_eq!(isqrt(&BigUint::from(1u32)), BigUint::from(1u32));
        assert_eq!(isqrt(&BigUint::from(15u32)), BigUint::from(3u32));
        assert_eq!(isqrt(&BigUint::from(16u32)), BigUint::from(4u32));
        assert_eq!(isqrt(&BigUint::from(17u32)), BigUint::from(4u32));
    }

    #[test]
    fn sqrt_rem_identity_holds() {
        let n = BigUint::from(123456789u64);
        let (root, rem) = sqrt_rem(&n);
        assert_eq!(&root * &root + &rem, n);
        assert!(rem <= &root * 2u32);
    }

    #[test]
    fn nth_root_matches_known_values() {
        assert_eq!(nth_root(&BigUint::from(27u32), 3), BigUint::from(3u32));
        assert_eq!(nth_root(&BigUint::from(26u32), 3), BigUint::from(2u32));
        assert_eq!(nth_root(&BigUint::from(1024u32), 10), BigUint::from(2u32));
    }

    #[test]
    fn perfect_kth_power_detection() {
        assert!(is_perfect_kth_power(&BigUint::from(81u32), 4));
        assert!(!is_perfect_kth_power(&BigUint::from(80u32), 4));
    }
}
