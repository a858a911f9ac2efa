//! `Z`: a tagged multi-precision integer.
//!
//! A `Z` is either a `Small` value living in an `i64` directly, or a
//! `Large` value owning a heap-allocated [`BigInt`] (the external Bignum
//! Primitive provider). Every public operation that could produce a
//! small-representable result demotes it back to `Small` before returning
//! — downstream equality is then a plain `i64` comparison in the common
//! case, giving the same fast-path behavior pointer-tagged small-integer
//! representations aim for, without needing any tagging: the enum
//! discriminant already tells small and large apart.

use crate::{
    arith,
    bpi,
    error::{
        Error,
        Result,
    },
};
#[cfg(feature = "random")]
use crate::rand::RandState;
use num_bigint::{
    BigInt,
    Sign,
};
use num_integer::Integer;
use num_traits::{
    FromPrimitive,
    One,
    Signed,
    ToPrimitive,
    Zero,
};
use std::{
    cmp::Ordering,
    fmt,
    hash::{
        Hash,
        Hasher,
    },
    ops::{
        Add,
        AddAssign,
        Mul,
        MulAssign,
        Neg,
        Sub,
        SubAssign,
    },
    str::FromStr,
};

/// The three-valued result of [`Z::is_prime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primality {
    /// Definitely prime.
    Prime,
    /// Definitely composite.
    Composite,
    /// Not resolved within the effort budget.
    Unknown,
}

/// A tagged multi-precision integer: a small value in-place, or an owned
/// pointer to a [`BigInt`] once the magnitude exceeds `i64::MAX`.
#[derive(Clone, Debug)]
pub enum Z {
    /// In-place small form.
    Small(i64),
    /// Owning large form. Always holds a magnitude `> i64::MAX`;
    /// constructors normalize through [`normalize`] so this invariant is
    /// never observable as violated by a caller.
    Large(Box<BigInt>),
}

/// Normalize a [`BigInt`] into the narrowest representation: `Small` if it
/// fits in an `i64`, `Large` otherwise. Every constructor and arithmetic
/// result routes through here so the demote/promote discipline holds
/// everywhere.
fn normalize(v: BigInt) -> Z {
    match v.to_i64() {
        Some(small) => Z::Small(small),
        None => Z::Large(Box::new(v)),
    }
}

impl Default for Z {
    fn default() -> Self {
        Z::Small(0)
    }
}

impl Z {
    /// The additive identity.
    pub fn zero() -> Self {
        Z::Small(0)
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Z::Small(1)
    }

    /// Initialize to zero. Equivalent to [`Z::zero`]; kept as a named
    /// constructor for parity with the lifecycle spec (`init`/`clear`).
    pub fn init() -> Self {
        Self::zero()
    }

    /// Reset to the documented default (zero).
    pub fn clear(&mut self) {
        *self = Self::zero();
    }

    /// Swap two values in place. O(1): this is a move, never a deep copy.
    pub fn swap(a: &mut Z, b: &mut Z) {
        std::mem::swap(a, b);
    }

    /// Overwrite `self` with a copy of `src`.
    pub fn set(&mut self, src: &Z) {
        *self = src.clone();
    }

    /// Construct from a signed machine word.
    pub fn from_i64(v: i64) -> Self {
        Z::Small(v)
    }

    /// Construct from an unsigned machine word.
    pub fn from_u64(v: u64) -> Self {
        normalize(BigInt::from(v))
    }

    /// Construct by truncating a double toward zero. Fails on NaN/Inf.
    pub fn from_f64(v: f64) -> Result<Self> {
        if !v.is_finite() {
            return Err(Error::domain("Z::from_f64: value is NaN or infinite"));
        }
        let truncated = v.trunc();
        BigInt::from_f64(truncated)
            .map(normalize)
            .ok_or_else(|| Error::domain("Z::from_f64: value has no integer representation"))
    }

    /// Convert to the nearest double, if representable without loss of the
    /// `i64`/`BigInt` distinction mattering (standard narrowing: values
    /// outside `f64`'s exact integer range lose precision, matching the
    /// external BigInt provider's own narrowing conversion).
    pub fn to_f64(&self) -> f64 {
        match self {
            Z::Small(v) => *v as f64,
            Z::Large(b) => b.to_f64().unwrap_or(if b.is_negative() {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }),
        }
    }

    /// View as an owned [`BigInt`], regardless of current representation.
    pub fn to_bigint(&self) -> BigInt {
        match self {
            Z::Small(v) => BigInt::from(*v),
            Z::Large(b) => (**b).clone(),
        }
    }

    /// `true` for the small-form representation.
    pub fn is_small(&self) -> bool {
        matches!(self, Z::Small(_))
    }

    /// `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Z::Small(0))
    }

    /// `true` if this value is one.
    pub fn is_one(&self) -> bool {
        matches!(self, Z::Small(1))
    }

    /// Sign: `-1`, `0`, or `1`.
    pub fn sign(&self) -> i32 {
        match self {
            Z::Small(v) => v.signum() as i32,
            Z::Large(b) => match b.sign() {
                Sign::Minus => -1,
                Sign::NoSign => 0,
                Sign::Plus => 1,
            },
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Z {
        match self {
            Z::Small(v) => match v.checked_abs() {
                Some(a) => Z::Small(a),
                None => normalize(BigInt::from(*v).abs()),
            },
            Z::Large(b) => normalize(b.abs()),
        }
    }

    /// Negation.
    pub fn neg(&self) -> Z {
        -self.clone()
    }

    /// Compare by magnitude only (ignoring sign).
    pub fn cmp_abs(&self, other: &Z) -> Ordering {
        if let (Z::Small(a), Z::Small(b)) = (self, other) {
            return a.unsigned_abs().cmp(&b.unsigned_abs());
        }
        self.to_bigint().abs().cmp(&other.to_bigint().abs())
    }

    // ---- division family ---------------------------------------------

    /// Truncating division (toward zero): quotient and remainder.
    /// `self == q * d + r` with `r` having the sign of `self` (or zero).
    pub fn tdiv_qr(&self, d: &Z) -> Result<(Z, Z)> {
        if d.is_zero() {
            return Err(Error::domain("tdiv_qr: division by zero"));
        }
        if let (Z::Small(a), Z::Small(b)) = (self, d) {
            if !(*a == i64::MIN && *b == -1) {
                return Ok((Z::Small(a / b), Z::Small(a % b)));
            }
        }
        let (q, r) = self.to_bigint().div_rem(&d.to_bigint());
        Ok((normalize(q), normalize(r)))
    }

    /// Floor division (quotient rounds toward negative infinity);
    /// remainder has the sign of the divisor.
    pub fn fdiv_qr(&self, d: &Z) -> Result<(Z, Z)> {
        if d.is_zero() {
            return Err(Error::domain("fdiv_qr: division by zero"));
        }
        let (q, r) = self.to_bigint().div_mod_floor(&d.to_bigint());
        Ok((normalize(q), normalize(r)))
    }

    /// Ceiling division (quotient rounds toward positive infinity).
    pub fn cdiv_qr(&self, d: &Z) -> Result<(Z, Z)> {
        if d.is_zero() {
            return Err(Error::domain("cdiv_qr: division by zero"));
        }
        let (tq, tr) = self.tdiv_qr(d)?;
        if tr.is_zero() || self.sign() != d.sign() {
            // truncation toward zero already rounds toward +infinity when
            // the operands have opposite signs (the quotient is <= 0).
            Ok((tq, tr))
        } else {
            let q = &tq + &Z::one();
            let r = &tr - d;
            Ok((q, r))
        }
    }

    /// Division that requires the divisor to divide evenly; returns a
    /// `Domain` error otherwise.
    pub fn divexact(&self, d: &Z) -> Result<Z> {
        if d.is_zero() {
            return Err(Error::domain("divexact: division by zero"));
        }
        let (q, r) = self.tdiv_qr(d)?;
        if !r.is_zero() {
            return Err(Error::domain("divexact: division is not exact"));
        }
        Ok(q)
    }

    /// Floor-mod: `0 <= result < |d|` for `d > 0`. For `d < 0` the
    /// remainder takes the sign of `d`, matching [`Z::fdiv_qr`].
    pub fn modulo(&self, d: &Z) -> Result<Z> {
        Ok(self.fdiv_qr(d)?.1)
    }

    /// Floor-mod reduced to a machine word. `d` must be nonzero.
    pub fn mod_word(&self, d: u64) -> Result<u64> {
        if d == 0 {
            return Err(Error::domain("mod_word: division by zero"));
        }
        let m = self.modulo(&Z::from_u64(d))?;
        Ok(m.to_bigint().to_u64().unwrap_or(0))
    }

    /// Modular inverse of `self` mod `m`. `Domain` error if it does not
    /// exist (i.e. `gcd(self, m) != 1`).
    pub fn invmod(&self, m: &Z) -> Result<Z> {
        if m.is_zero() {
            return Err(Error::domain("invmod: modulus is zero"));
        }
        let egcd = self.to_bigint().extended_gcd(&m.to_bigint());
        if egcd.gcd != BigInt::one() && egcd.gcd != -BigInt::one() {
            return Err(Error::domain("invmod: value is not invertible modulo m"));
        }
        let m_big = m.to_bigint().abs();
        let inv = egcd.x.mod_floor(&m_big);
        Ok(normalize(inv))
    }

    /// Modular exponentiation `self^exp mod m`, result in `[0, |m|)`.
    /// Negative exponents require `self` to be invertible mod `m`.
    pub fn powmod(&self, exp: &Z, m: &Z) -> Result<Z> {
        if m.is_zero() {
            return Err(Error::domain("powmod: modulus is zero"));
        }
        let modulus = m.to_bigint().abs();
        if exp.sign() < 0 {
            let inv = self.invmod(m)?;
            let pos_exp = exp.neg().to_bigint();
            return Ok(normalize(inv.to_bigint().modpow(&pos_exp, &modulus)));
        }
        let base = self.to_bigint().mod_floor(&modulus);
        Ok(normalize(base.modpow(&exp.to_bigint(), &modulus)))
    }

    /// Modular exponentiation with a machine-word exponent.
    pub fn powmod_word(&self, exp: u64, m: &Z) -> Result<Z> {
        self.powmod(&Z::from_u64(exp), m)
    }

    /// Greatest common divisor (always nonnegative).
    pub fn gcd(&self, other: &Z) -> Z {
        normalize(self.to_bigint().gcd(&other.to_bigint()))
    }

    /// Least common multiple (always nonnegative).
    pub fn lcm(&self, other: &Z) -> Z {
        normalize(self.to_bigint().lcm(&other.to_bigint()))
    }

    /// Extended GCD: returns `(g, s, t)` with `g = s*a + t*b`.
    pub fn xgcd(&self, other: &Z) -> (Z, Z, Z) {
        let egcd = self.to_bigint().extended_gcd(&other.to_bigint());
        (normalize(egcd.gcd), normalize(egcd.x), normalize(egcd.y))
    }

    // ---- CRT ------------------------------------------------------------

    /// Chinese Remainder combination: given `r1 mod m1` and `r2 mod m2`
    /// with `gcd(m1, m2) = 1`, returns the residue mod `m1*m2`. When
    /// `signed` is false the result lies in `[0, m1*m2)`; when true, in
    /// the symmetric range `(-m1*m2/2, m1*m2/2]`, picking whichever of the
    /// nonsymmetric representative or that representative minus `m1*m2`
    /// has the smaller magnitude (ties favor the nonsymmetric one).
    pub fn crt(r1: &Z, m1: &Z, r2: &Z, m2: &Z, signed: bool) -> Result<Z> {
        let egcd = m1.to_bigint().extended_gcd(&m2.to_bigint());
        if egcd.gcd != BigInt::one() && egcd.gcd != -BigInt::one() {
            return Err(Error::domain("crt: moduli are not coprime"));
        }
        let m1m2 = m1 * m2;
        let inv_reduced = normalize(egcd.x.mod_floor(&m2.to_bigint().abs()));
        Self::crt_precomp(r1, m1, r2, m2, &m1m2, &inv_reduced, signed)
    }

    /// CRT combination using a precomputed `m1*m2` and a precomputed
    /// inverse of `m1` modulo `m2`, for callers (e.g. incremental CRT
    /// accumulation) who have already paid that cost once.
    pub fn crt_precomp(
        r1: &Z,
        m1: &Z,
        r2: &Z,
        m2: &Z,
        m1m2: &Z,
        inv_m1_mod_m2: &Z,
        signed: bool,
    ) -> Result<Z> {
        let m2_big = m2.to_bigint().abs();
        let diff = (&r2.to_bigint() - &r1.to_bigint()).mod_floor(&m2_big);
        let t = (&diff * &inv_m1_mod_m2.to_bigint()).mod_floor(&m2_big);
        let m1m2_big = m1m2.to_bigint();
        let mut x = (&r1.to_bigint() + &(&m1.to_bigint() * &t)).mod_floor(&m1m2_big);
        if signed {
            let alt = &x - &m1m2_big;
            if alt.abs() < x.abs() {
                x = alt;
            }
        }
        Ok(normalize(x))
    }

    // ---- bit operations ---------------------------------------------

    /// Left shift (multiply by `2^k`).
    pub fn shl(&self, k: u32) -> Z {
        normalize(self.to_bigint() << k)
    }

    /// Right shift rounding toward negative infinity (floor division by
    /// `2^k`); this is ordinary arithmetic shift.
    pub fn shr_floor(&self, k: u32) -> Z {
        normalize(self.to_bigint() >> k)
    }

    /// Right shift rounding toward positive infinity.
    pub fn shr_ceil(&self, k: u32) -> Z {
        -self.neg().shr_floor(k)
    }

    /// Right shift truncating toward zero.
    pub fn shr_trunc(&self, k: u32) -> Z {
        let b = self.to_bigint();
        let mag = b.abs() >> k;
        normalize(if b.is_negative() { -mag } else { mag })
    }

    /// Population count of the absolute value.
    pub fn popcount(&self) -> u64 {
        let (_, digits) = self.to_bigint().abs().to_u32_digits();
        digits.iter().map(|d| u64::from(d.count_ones())).sum()
    }

    /// Number of bits needed to represent the magnitude (0 for zero).
    pub fn bit_length(&self) -> u64 {
        self.to_bigint().bits()
    }

    /// Value of the two's-complement bit at `pos`.
    pub fn bit(&self, pos: u64) -> bool {
        (self.to_bigint() >> pos) & BigInt::one() == BigInt::one()
    }

    /// Set the bit at `pos` (two's complement).
    pub fn set_bit(&mut self, pos: u64) {
        let one_at = BigInt::one() << pos;
        *self = normalize(self.to_bigint() | one_at);
    }

    /// Clear the bit at `pos` (two's complement).
    pub fn clear_bit(&mut self, pos: u64) {
        let mask = !(BigInt::one() << pos);
        *self = normalize(self.to_bigint() & mask);
    }

    /// Complement the bit at `pos` (two's complement).
    pub fn complement_bit(&mut self, pos: u64) {
        let one_at = BigInt::one() << pos;
        *self = normalize(self.to_bigint() ^ one_at);
    }

    // ---- string conversion --------------------------------------------

    /// Format in the given base, `B` in `[2, 62]`: digits `0-9`, then
    /// `A-Z`, then `a-z`.
    pub fn to_str_radix(&self, base: u32) -> Result<String> {
        if !(2..=62).contains(&base) {
            return Err(Error::domain("to_str_radix: base must be in [2, 62]"));
        }
        // Always use the combined 0-9, A-Z, a-z alphabet: BigInt's own
        // formatter only ever emits lowercase digits, which would be wrong
        // for e.g. base 16.
        let mut n = self.to_bigint().abs();
        if n.is_zero() {
            return Ok("0".to_string());
        }
        let base_big = BigInt::from(base);
        let mut digits = Vec::new();
        while !n.is_zero() {
            let (q, r) = n.div_rem(&base_big);
            digits.push(digit_to_char(r.to_u32().expect("remainder fits in u32")));
            n = q;
        }
        if self.sign() < 0 {
            digits.push('-');
        }
        digits.reverse();
        Ok(digits.into_iter().collect())
    }

    /// Parse from the given base, `B` in `[2, 62]`.
    pub fn from_str_radix(s: &str, base: u32) -> Result<Z> {
        if !(2..=62).contains(&base) {
            return Err(Error::domain("from_str_radix: base must be in [2, 62]"));
        }
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::domain("from_str_radix: empty string"));
        }
        let (neg, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        if digits.is_empty() {
            return Err(Error::domain("from_str_radix: no digits"));
        }
        let base_big = BigInt::from(base);
        let mut acc = BigInt::zero();
        for c in digits.chars() {
            let d = char_to_digit(c)
                .ok_or_else(|| Error::domain("from_str_radix: invalid digit"))?;
            if d >= base {
                return Err(Error::domain("from_str_radix: digit out of range for base"));
            }
            acc = acc * &base_big + BigInt::from(d);
        }
        if neg {
            acc = -acc;
        }
        Ok(normalize(acc))
    }

    // ---- bit packing -----------------------------------------------------

    /// Pack `value` (optionally negated) as a `bits`-wide two's-complement
    /// field into `arr`, starting at bit offset `shift`. `borrow` is added
    /// to the (possibly negated) value before encoding; returns the
    /// borrow to chain into the next field (`-1` iff the adjusted value
    /// was negative). Bits of `arr` outside `[shift, shift + bits)` are
    /// left untouched.
    pub fn bit_pack(
        arr: &mut [u64],
        shift: u32,
        bits: u32,
        value: &Z,
        negate: bool,
        borrow: i64,
    ) -> Result<i64> {
        if bits == 0 || bits > 4096 {
            return Err(Error::overflow("bit_pack: bits out of supported range"));
        }
        let span = ((shift as u64 + bits as u64) + 63) / 64;
        if (span as usize) > arr.len() {
            return Err(Error::overflow("bit_pack: destination array too small"));
        }
        let mut v = value.to_bigint();
        if negate {
            v = -v;
        }
        v += borrow;
        let borrow_out = if v.is_negative() { -1 } else { 0 };
        let mask = (BigInt::one() << bits) - BigInt::one();
        let field = v & mask;
        write_bits(arr, shift, bits, &field);
        Ok(borrow_out)
    }

    /// Recover a signed `bits`-wide two's-complement field from `arr`.
    pub fn bit_unpack_signed(arr: &[u64], shift: u32, bits: u32) -> Result<Z> {
        let field = read_bits(arr, shift, bits)?;
        let half = BigInt::one() << (bits - 1);
        let result = if field >= half {
            field - (BigInt::one() << bits)
        } else {
            field
        };
        Ok(normalize(result))
    }

    /// Recover an unsigned `bits`-wide field from `arr`.
    pub fn bit_unpack_unsigned(arr: &[u64], shift: u32, bits: u32) -> Result<Z> {
        Ok(normalize(read_bits(arr, shift, bits)?))
    }

    // ---- roots -----------------------------------------------------------

    /// Floor integer square root together with the remainder
    /// `self - root^2`. `Domain` error if `self` is negative.
    pub fn sqrt_rem(&self) -> Result<(Z, Z)> {
        if self.sign() < 0 {
            return Err(Error::domain("sqrt_rem: square root of a negative value"));
        }
        let mag = self
            .to_bigint()
            .to_biguint()
            .expect("nonnegative: checked above");
        let (root, rem) = bpi::sqrt_rem(&mag);
        Ok((normalize(BigInt::from(root)), normalize(BigInt::from(rem))))
    }

    /// Floor integer square root. `Domain` error if `self` is negative.
    pub fn isqrt(&self) -> Result<Z> {
        Ok(self.sqrt_rem()?.0)
    }

    /// `true` iff `self` is a nonnegative perfect square.
    pub fn is_perfect_square(&self) -> bool {
        self.sign() >= 0 && matches!(self.sqrt_rem(), Ok((_, r)) if r.is_zero())
    }

    /// Floor integer `k`-th root (`k >= 1`). Negative `self` requires `k`
    /// odd (otherwise a `Domain` error, matching the real-valued domain of
    /// even roots).
    pub fn nth_root(&self, k: u32) -> Result<Z> {
        if k == 0 {
            return Err(Error::domain("nth_root: k must be >= 1"));
        }
        if self.sign() < 0 && k % 2 == 0 {
            return Err(Error::domain(
                "nth_root: even root of a negative value",
            ));
        }
        let mag = self.abs().to_bigint().to_biguint().expect("abs is nonnegative");
        let root = bpi::nth_root(&mag, k);
        let root = normalize(BigInt::from(root));
        Ok(if self.sign() < 0 { -root } else { root })
    }

    // ---- primality and randomness --------------------------------------

    /// Probabilistic primality test with `reps` Miller-Rabin rounds using
    /// independently chosen witnesses.
    #[cfg(feature = "random")]
    pub fn is_probable_prime(&self, reps: u32, rng: &mut RandState) -> bool {
        tracing::trace!(target: "flint_core::z", reps, "is_probable_prime");
        bpi::is_probable_prime(&self.to_bigint(), reps, rng)
    }

    /// Attempt a definite primality answer within a bounded effort budget
    /// (measured in Miller-Rabin rounds). Small numbers are resolved
    /// exactly via trial division + a deterministic witness set; larger
    /// numbers fall back to `Unknown` once the budget is exhausted, since
    /// unconditional primality proofs (APR-CL, ECPP) are out of scope for
    /// this core.
    #[cfg(feature = "random")]
    pub fn is_prime(&self, effort: u32, rng: &mut RandState) -> Primality {
        tracing::trace!(target: "flint_core::z", effort, "is_prime");
        let n = self.to_bigint();
        if n < BigInt::from(2) {
            return Primality::Composite;
        }
        for p in bpi::small_prime_sieve() {
            let p = BigInt::from(*p);
            if n == p {
                return Primality::Prime;
            }
            if (&n % &p).is_zero() {
                return Primality::Composite;
            }
        }
        if !bpi::is_probable_prime(&n, effort.max(1), rng) {
            return Primality::Composite;
        }
        // Deterministic for every value fitting in a u64: the fixed
        // witness set {2,3,5,7,11,13,17,19,23,29,31,37} is proven
        // sufficient below 3,317,044,064,679,887,385,961,981.
        const DETERMINISTIC_BOUND_WITNESSES: [u64; 12] =
            [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
        if n.to_u64().is_some() {
            for w in DETERMINISTIC_BOUND_WITNESSES {
                if !bpi::miller_rabin_witness(&n, &BigInt::from(w)) {
                    return Primality::Composite;
                }
            }
            return Primality::Prime;
        }
        Primality::Unknown
    }

    /// Uniform value in `[0, 2^k)` with the top bit always set (when
    /// `k >= 1`) and an independently chosen sign.
    #[cfg(feature = "random")]
    pub fn rand_bits(rng: &mut RandState, k: u32) -> Z {
        if k == 0 {
            return Z::zero();
        }
        let mut v = rng.uniform_bits(k);
        v.set_bit(u64::from(k - 1), true);
        let mut z = normalize(BigInt::from(v));
        if rng.uniform_bool() {
            z = -z;
        }
        z
    }

    /// A test generator biased toward boundary magnitudes (0, +-1,
    /// +-2^63, +-(2^63-1), and other power-of-two boundaries), required
    /// for reliable corner-case coverage of the small/large boundary.
    #[cfg(feature = "random")]
    pub fn rand_test(rng: &mut RandState) -> Z {
        let boundary: [Z; 7] = [
            Z::zero(),
            Z::one(),
            Z::Small(-1),
            Z::Small(i64::MAX),
            Z::Small(i64::MIN),
            normalize(BigInt::from(i64::MAX) + 1),
            normalize(BigInt::from(i64::MIN) - 1),
        ];
        if rng.uniform_word_below(2) == 0 {
            let idx = rng.uniform_word_below(boundary.len() as u64) as usize;
            return boundary[idx].clone();
        }
        let bits = 1 + (rng.uniform_word_below(256) as u32);
        Self::rand_bits(rng, bits)
    }

    /// A uniform random prime of the given bit length.
    #[cfg(feature = "random")]
    pub fn rand_prime(rng: &mut RandState, bits: u32, proved: bool) -> Result<Z> {
        if bits < 2 {
            return Err(Error::domain("rand_prime: bits must be >= 2"));
        }
        loop {
            let mut candidate = Self::rand_bits(rng, bits).abs();
            candidate.set_bit_mut(0);
            if Self::accept_as_prime(&candidate, proved, rng) {
                return Ok(candidate);
            }
        }
    }

    /// The smallest prime strictly greater than `self`.
    #[cfg(feature = "random")]
    pub fn next_prime(&self, proved: bool, rng: &mut RandState) -> Result<Z> {
        let mut candidate = if self.sign() < 0 {
            Z::from_i64(2)
        } else {
            &self.clone() + &Z::one()
        };
        if candidate.cmp_abs(&Z::from_i64(2)) == Ordering::Less && candidate.sign() >= 0 {
            candidate = Z::from_i64(2);
        }
        if candidate != Z::from_i64(2) && candidate.to_bigint().is_even() {
            candidate = &candidate + &Z::one();
        }
        loop {
            if Self::accept_as_prime(&candidate, proved, rng) {
                return Ok(candidate);
            }
            candidate = &candidate + &Z::from_i64(2);
        }
    }

    #[cfg(feature = "random")]
    fn accept_as_prime(candidate: &Z, proved: bool, rng: &mut RandState) -> bool {
        if proved {
            matches!(candidate.is_prime(64, rng), Primality::Prime)
        } else {
            candidate.is_probable_prime(30, rng)
        }
    }

    /// Set (or clear) the low bit in place; a small helper for odd-number
    /// candidate generation.
    fn set_bit_mut(&mut self, pos: u64) {
        self.set_bit(pos);
    }
}

fn write_bits(arr: &mut [u64], shift: u32, bits: u32, field: &BigInt) {
    for i in 0..bits {
        let bit = (field >> i) & BigInt::one() == BigInt::one();
        let global = u64::from(shift) + u64::from(i);
        let limb = (global / 64) as usize;
        let off = (global % 64) as u32;
        if bit {
            arr[limb] |= 1u64 << off;
        } else {
            arr[limb] &= !(1u64 << off);
        }
    }
}

fn read_bits(arr: &[u64], shift: u32, bits: u32) -> Result<BigInt> {
    let span = ((shift as u64 + bits as u64) + 63) / 64;
    if (span as usize) > arr.len() {
        return Err(Error::overflow("bit_unpack: source array too small"));
    }
    let mut acc = BigInt::zero();
    for i in (0..bits).rev() {
        let global = u64::from(shift) + u64::from(i);
        let limb = (global / 64) as usize;
        let off = (global % 64) as u32;
        let bit = (arr[limb] >> off) & 1;
        acc = (acc << 1) + BigInt::from(bit);
    }
    Ok(acc)
}

const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

fn digit_to_char(d: u32) -> char {
    DIGITS[d as usize] as char
}

fn char_to_digit(c: char) -> Option<u32> {
    DIGITS.iter().position(|&b| b as char == c).map(|p| p as u32)
}

// ---- trait impls --------------------------------------------------------

impl PartialEq for Z {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Z::Small(a), Z::Small(b)) => a == b,
            (Z::Large(a), Z::Large(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Z {}

impl PartialOrd for Z {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Z {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Z::Small(a), Z::Small(b)) => a.cmp(b),
            _ => self.to_bigint().cmp(&other.to_bigint()),
        }
    }
}

impl Hash for Z {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Z::Small(v) => v.hash(state),
            Z::Large(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Z {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Z::Small(v) => write!(f, "{v}"),
            Z::Large(b) => write!(f, "{b}"),
        }
    }
}

impl FromStr for Z {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_radix(s, 10)
    }
}

impl From<i64> for Z {
    fn from(v: i64) -> Self {
        Z::Small(v)
    }
}

impl From<u64> for Z {
    fn from(v: u64) -> Self {
        Z::from_u64(v)
    }
}

impl Add for &Z {
    type Output = Z;
    fn add(self, rhs: &Z) -> Z {
        if let (Z::Small(a), Z::Small(b)) = (self, rhs) {
            if let Some(r) = arith::checked_add_i64(*a, *b) {
                return Z::Small(r);
            }
        }
        normalize(self.to_bigint() + rhs.to_bigint())
    }
}
impl Add for Z {
    type Output = Z;
    fn add(self, rhs: Z) -> Z {
        &self + &rhs
    }
}
impl AddAssign<&Z> for Z {
    fn add_assign(&mut self, rhs: &Z) {
        *self = &*self + rhs;
    }
}

impl Sub for &Z {
    type Output = Z;
    fn sub(self, rhs: &Z) -> Z {
        if let (Z::Small(a), Z::Small(b)) = (self, rhs) {
            if let Some(r) = arith::checked_sub_i64(*a, *b) {
                return Z::Small(r);
            }
        }
        normalize(self.to_bigint() - rhs.to_bigint())
    }
}
impl Sub for Z {
    type Output = Z;
    fn sub(self, rhs: Z) -> Z {
        &self - &rhs
    }
}
impl SubAssign<&Z> for Z {
    fn sub_assign(&mut self, rhs: &Z) {
        *self = &*self - rhs;
    }
}

impl Mul for &Z {
    type Output = Z;
    fn mul(self, rhs: &Z) -> Z {
        if let (Z::Small(a), Z::Small(b)) = (self, rhs) {
            if let Some(r) = arith::checked_mul_i64(*a, *b) {
                return Z::Small(r);
            }
        }
        normalize(self.to_bigint() * rhs.to_bigint())
    }
}
impl Mul for Z {
    type Output = Z;
    fn mul(self, rhs: Z) -> Z {
        &self * &rhs
    }
}
impl MulAssign<&Z> for Z {
    fn mul_assign(&mut self, rhs: &Z) {
        *self = &*self * rhs;
    }
}

impl Neg for &Z {
    type Output = Z;
    fn neg(self) -> Z {
        match self {
            Z::Small(v) => match arith::checked_neg_i64(*v) {
                Some(n) => Z::Small(n),
                None => normalize(-BigInt::from(*v)),
            },
            Z::Large(b) => normalize(-(**b).clone()),
        }
    }
}
impl Neg for Z {
    type Output = Z;
    fn neg(self) -> Z {
        -&self
    }
}

impl Z {
    /// Fused `self += a * b`.
    pub fn addmul(&mut self, a: &Z, b: &Z) {
        *self = &*self + &(a * b);
    }

    /// Fused `self -= a * b`.
    pub fn submul(&mut self, a: &Z, b: &Z) {
        *self = &*self - &(a * b);
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Z {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Z {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Z::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    // decimal round-trip.
    #[quickcheck]
    fn prop_decimal_roundtrip(v: i64) -> bool {
        let z = Z::from_i64(v);
        Z::from_str(&z.to_string()).unwrap() == z
    }

    // add is commutative and associative; mul distributes over add.
    #[quickcheck]
    fn prop_add_commutative(a: i64, b: i64) -> bool {
        let (za, zb) = (Z::from_i64(a), Z::from_i64(b));
        &za + &zb == &zb + &za
    }

    #[quickcheck]
    fn prop_add_associative(a: i64, b: i64, c: i64) -> bool {
        let (za, zb, zc) = (Z::from_i64(a), Z::from_i64(b), Z::from_i64(c));
        &(&za + &zb) + &zc == &za + &(&zb + &zc)
    }

    #[quickcheck]
    fn prop_mul_distributes_over_add(a: i64, b: i64, c: i64) -> bool {
        let (za, zb, zc) = (Z::from_i64(a), Z::from_i64(b), Z::from_i64(c));
        &za * &(&zb + &zc) == &(&za * &zb) + &(&za * &zc)
    }

    // floor-division identity and remainder bound.
    #[quickcheck]
    fn prop_fdiv_identity(a: i64, b: i64) -> TestResult {
        if b == 0 {
            return TestResult::discard();
        }
        let (za, zb) = (Z::from_i64(a), Z::from_i64(b));
        let (q, r) = za.fdiv_qr(&zb).expect("b is nonzero");
        let reconstructed = &(&q * &zb) + &r;
        TestResult::from_bool(reconstructed == za && r.cmp_abs(&zb) == Ordering::Less)
    }

    // CRT soundness, over quickcheck-generated small coprime-ish moduli
    // (discard the rare non-coprime draw rather than special-casing it).
    #[quickcheck]
    fn prop_crt_soundness(r1: u8, m1: u8, r2: u8, m2: u8) -> TestResult {
        if m1 < 2 || m2 < 2 {
            return TestResult::discard();
        }
        let (m1, m2) = (Z::from_i64(i64::from(m1)), Z::from_i64(i64::from(m2)));
        if !m1.gcd(&m2).is_one() {
            return TestResult::discard();
        }
        let r1 = Z::from_i64(i64::from(r1)).modulo(&m1).expect("m1 nonzero");
        let r2 = Z::from_i64(i64::from(r2)).modulo(&m2).expect("m2 nonzero");
        let x = Z::crt(&r1, &m1, &r2, &m2, false).expect("moduli are coprime");
        TestResult::from_bool(x.modulo(&m1).unwrap() == r1 && x.modulo(&m2).unwrap() == r2)
    }

    // bit-pack round-trip for arbitrary in-range values.
    #[quickcheck]
    fn prop_bit_pack_roundtrip_signed(v: i32, shift: u8) -> TestResult {
        let shift = u32::from(shift) % 192;
        let bits = 32u32;
        let value = Z::from_i64(i64::from(v));
        let mut arr = [0u64; 8];
        Z::bit_pack(&mut arr, shift, bits, &value, false, 0).expect("fits by construction");
        let back = Z::bit_unpack_signed(&arr, shift, bits).expect("fits by construction");
        TestResult::from_bool(back == value)
    }

    #[test]
    fn small_stays_small_across_arithmetic() {
        let a = Z::from_str("1000000000000000000001").unwrap();
        let b = Z::from_str("1000000000000000000000").unwrap();
        let diff = &a - &b;
        assert_eq!(diff, Z::from(1i64));
        assert!(diff.is_small());
    }

    #[test]
    fn decimal_roundtrip() {
        for s in ["0", "-1", "170141183460469231731687303715884105728", "-42"] {
            let z = Z::from_str(s).unwrap();
            assert_eq!(z.to_string(), s);
        }
    }

    #[test]
    fn radix_roundtrip_high_base() {
        let z = Z::from_str("123456789012345678901234567890").unwrap();
        let s = z.to_str_radix(62).unwrap();
        let back = Z::from_str_radix(&s, 62).unwrap();
        assert_eq!(z, back);
    }

    #[test]
    fn overflow_promotes_to_large() {
        let a = Z::Small(i64::MAX);
        let b = Z::Small(1);
        let sum = &a + &b;
        assert!(!sum.is_small());
        assert_eq!(sum, Z::from_str("9223372036854775808").unwrap());
    }

    #[test]
    fn division_families_agree_with_identity() {
        let a = Z::from_i64(-17);
        let b = Z::from_i64(5);
        let (q, r) = a.fdiv_qr(&b).unwrap();
        assert_eq!(&(&q * &b) + &r, a);
        assert!(r.sign() >= 0 && r.cmp_abs(&b) == Ordering::Less);
    }

    #[test]
    fn divexact_rejects_inexact_division() {
        let a = Z::from_i64(10);
        let b = Z::from_i64(3);
        assert!(a.divexact(&b).is_err());
        assert_eq!(Z::from_i64(9).divexact(&b).unwrap(), Z::from_i64(3));
    }

    #[test]
    fn crt_soundness() {
        let r1 = Z::from_i64(2);
        let m1 = Z::from_i64(3);
        let r2 = Z::from_i64(3);
        let m2 = Z::from_i64(5);
        let x = Z::crt(&r1, &m1, &r2, &m2, false).unwrap();
        assert_eq!(x.modulo(&m1).unwrap(), r1);
        assert_eq!(x.modulo(&m2).unwrap(), r2);
    }

    #[test]
    fn incremental_crt_recovers_value() {
        let x_true: i64 = 314159265;
        let mut acc_r = Z::from_i64(x_true).modulo(&Z::from_i64(2)).unwrap();
        let mut acc_m = Z::from_i64(2);
        let primes = [3i64, 5, 7, 11, 13, 17, 19, 23];
        let bound = Z::from_i64(x_true) * Z::from_i64(2);
        for p in primes {
            if acc_m.cmp_abs(&bound) != Ordering::Less {
                break;
            }
            let p = Z::from_i64(p);
            let r = Z::from_i64(x_true).modulo(&p).unwrap();
            let combined = Z::crt(&acc_r, &acc_m, &r, &p, false).unwrap();
            acc_m = &acc_m * &p;
            acc_r = combined;
        }
        assert_eq!(acc_r, Z::from_i64(x_true));
    }

    #[test]
    fn bit_pack_roundtrip_minus_seven() {
        let mut arr = [0xFFFF_FFFF_FFFF_FFFFu64; 2];
        let borrow = Z::bit_pack(&mut arr, 3, 5, &Z::from_i64(-7), false, 0).unwrap();
        assert_eq!(borrow, -1);
        let back = Z::bit_unpack_signed(&arr, 3, 5).unwrap();
        assert_eq!(back, Z::from_i64(-7));
        // low 3 bits of arr[0] (outside the packed span) are untouched.
        assert_eq!(arr[0] & 0b111, 0b111);
    }

    #[test]
    fn bit_length_and_popcount() {
        assert_eq!(Z::from_i64(0).bit_length(), 0);
        assert_eq!(Z::from_i64(7).bit_length(), 3);
        assert_eq!(Z::from_i64(7).popcount(), 3);
    }

    #[test]
    fn gcd_and_xgcd_consistency() {
        let a = Z::from_i64(240);
        let b = Z::from_i64(46);
        let g = a.gcd(&b);
        assert_eq!(g, Z::from_i64(2));
        let (d, s, t) = a.xgcd(&b);
        assert_eq!(d, g);
        assert_eq!(&(&s * &a) + &(&t * &b), d);
    }

    #[test]
    fn isqrt_and_nth_root_match_known_values() {
        let n = Z::from_i64(123456789);
        let (root, rem) = n.sqrt_rem().unwrap();
        assert_eq!(&(&root * &root) + &rem, n);
        assert!(Z::from_i64(144).is_perfect_square());
        assert!(!Z::from_i64(145).is_perfect_square());
        assert_eq!(Z::from_i64(27).nth_root(3).unwrap(), Z::from_i64(3));
        assert_eq!(Z::from_i64(-27).nth_root(3).unwrap(), Z::from_i64(-3));
        assert!(Z::from_i64(-4).nth_root(2).is_err());
        assert!(Z::from_i64(-4).isqrt().is_err());
    }

    #[cfg(feature = "random")]
    #[test]
    fn small_primes_are_detected() {
        let mut rng = RandState::from_seed(1234);
        for p in [2i64, 3, 5, 7, 97, 7919] {
            assert_eq!(
                Z::from_i64(p).is_prime(32, &mut rng),
                Primality::Prime,
                "{p} should be prime"
            );
        }
        for c in [4i64, 6, 8, 9, 100] {
            assert_eq!(Z::from_i64(c).is_prime(32, &mut rng), Primality::Composite);
        }
    }

    #[cfg(feature = "random")]
    #[test]
    fn next_prime_after_small_values() {
        let mut rng = RandState::from_seed(99);
        assert_eq!(
            Z::from_i64(10).next_prime(false, &mut rng).unwrap(),
            Z::from_i64(11)
        );
    }
}
