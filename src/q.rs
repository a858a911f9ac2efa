//! `Q`: a canonical arbitrary-precision rational.
//!
//! A `Q` is a pair of [`Z`] kept in canonical form at every public boundary:
//! denominator positive, numerator and denominator coprime, zero
//! represented uniquely as `0/1`. Every constructor and arithmetic result
//! routes through [`Q::canonicalize`] before it is returned, the same
//! demote-on-exit discipline `Z` uses for its small/large boundary.

use crate::{
    error::{
        Error,
        Result,
    },
    z::Z,
};
use std::{
    cmp::Ordering,
    fmt,
    ops::{
        Add,
        AddAssign,
        Div,
        Mul,
        MulAssign,
        Neg,
        Sub,
        SubAssign,
    },
    str::FromStr,
};

/// A canonical rational: `num / den` with `den > 0` and `gcd(|num|, den) = 1`.
#[derive(Clone, Debug)]
pub struct Q {
    num: Z,
    den: Z,
}

impl Q {
    /// The additive identity, `0/1`.
    pub fn zero() -> Self {
        Q {
            num: Z::zero(),
            den: Z::one(),
        }
    }

    /// The multiplicative identity, `1/1`.
    pub fn one() -> Self {
        Q {
            num: Z::one(),
            den: Z::one(),
        }
    }

    /// Initialize to zero. Named constructor for lifecycle parity with `Z`.
    pub fn init() -> Self {
        Self::zero()
    }

    /// Reset to the documented default (`0/1`).
    pub fn clear(&mut self) {
        *self = Self::zero();
    }

    /// Build from an integer numerator and denominator, canonicalizing.
    /// `Domain` error if `den == 0`.
    pub fn set_from_fraction(num: &Z, den: &Z) -> Result<Self> {
        if den.is_zero() {
            return Err(Error::domain("Q::set_from_fraction: denominator is zero"));
        }
        let mut q = Q {
            num: num.clone(),
            den: den.clone(),
        };
        q.canonicalize();
        Ok(q)
    }

    /// Build from a plain integer (denominator 1).
    pub fn from_z(n: &Z) -> Self {
        Q {
            num: n.clone(),
            den: Z::one(),
        }
    }

    /// The numerator of the canonical form.
    pub fn num(&self) -> &Z {
        &self.num
    }

    /// The denominator of the canonical form (always positive).
    pub fn den(&self) -> &Z {
        &self.den
    }

    /// `true` iff this value is zero.
    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// `true` iff this value is one.
    pub fn is_one(&self) -> bool {
        self.num.is_one() && self.den.is_one()
    }

    /// Sign: `-1`, `0`, or `1`.
    pub fn sign(&self) -> i32 {
        self.num.sign()
    }

    /// Reduce `(num, den)` to canonical form in place: divide through by
    /// `gcd(|num|, den)`, flip signs if `den < 0`, and force `den = 1` when
    /// `num = 0`.
    fn canonicalize(&mut self) {
        if self.num.is_zero() {
            self.den = Z::one();
            return;
        }
        let g = self.num.gcd(&self.den);
        if !g.is_one() {
            self.num = self.num.divexact(&g).expect("g divides num by construction");
            self.den = self.den.divexact(&g).expect("g divides den by construction");
        }
        if self.den.sign() < 0 {
            self.num = -self.num.clone();
            self.den = -self.den.clone();
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Q {
        Q {
            num: self.num.abs(),
            den: self.den.clone(),
        }
    }

    /// Negation.
    pub fn neg(&self) -> Q {
        -self.clone()
    }

    /// Exact rational square root. `Domain` error if `self` is negative, or
    /// if neither the numerator nor the denominator is a perfect square
    /// (canonical form keeps `gcd(|num|, den) = 1`, so `p/q` has a rational
    /// square root iff both `p` and `q` do).
    pub fn sqrt(&self) -> Result<Q> {
        if self.sign() < 0 {
            return Err(Error::domain("Q::sqrt: square root of a negative value"));
        }
        let num_root = self
            .num
            .sqrt_rem()
            .ok()
            .filter(|(_, r)| r.is_zero())
            .map(|(r, _)| r)
            .ok_or_else(|| Error::domain("Q::sqrt: numerator is not a perfect square"))?;
        let den_root = self
            .den
            .sqrt_rem()
            .ok()
            .filter(|(_, r)| r.is_zero())
            .map(|(r, _)| r)
            .ok_or_else(|| Error::domain("Q::sqrt: denominator is not a perfect square"))?;
        Ok(Q {
            num: num_root,
            den: den_root,
        })
    }

    /// Multiplicative inverse. `Domain` error on zero.
    pub fn inv(&self) -> Result<Q> {
        if self.is_zero() {
            return Err(Error::domain("Q::inv: division by zero"));
        }
        let mut q = Q {
            num: self.den.clone(),
            den: self.num.clone(),
        };
        q.canonicalize();
        Ok(q)
    }

    /// Raise to a nonnegative or negative integer power by binary
    /// exponentiation; negative exponents invert first.
    pub fn pow(&self, exp: i64) -> Result<Q> {
        if exp < 0 {
            return self.inv()?.pow(-exp);
        }
        let mut base = self.clone();
        let mut result = Q::one();
        let mut e = exp as u64;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &base;
            }
            base = &base * &base;
            e >>= 1;
        }
        Ok(result)
    }

    /// Greatest common divisor, defined as `gcd(num_a·den_b, num_b·den_a) /
    /// (den_a·den_b)` reduced — i.e. the smallest positive rational `g` such
    /// that both `self/g` and `other/g` are integers times a unit, matching
    /// the convention that `gcd` of rationals is itself taken over a common
    /// denominator.
    pub fn gcd(&self, other: &Q) -> Q {
        let cross_a = &self.num * &other.den;
        let cross_b = &other.num * &self.den;
        let n = cross_a.gcd(&cross_b);
        let d = &self.den * &other.den;
        let mut q = Q { num: n, den: d };
        q.canonicalize();
        q
    }

    /// Least common multiple, dually to [`Q::gcd`].
    pub fn lcm(&self, other: &Q) -> Q {
        let cross_a = &self.num * &other.den;
        let cross_b = &other.num * &self.den;
        let n = cross_a.lcm(&cross_b);
        let d = self.den.gcd(&other.den);
        let mut q = Q { num: n, den: d };
        q.canonicalize();
        q
    }

    /// Fused `self += a * b`.
    pub fn addmul(&mut self, a: &Q, b: &Q) {
        *self = &*self + &(a * b);
    }

    /// Fused `self -= a * b`.
    pub fn submul(&mut self, a: &Q, b: &Q) {
        *self = &*self - &(a * b);
    }

    /// Multiply by `2^k`, reducing the power of two out of the denominator
    /// rather than routing through full cross-multiplication.
    pub fn mul_2exp(&self, k: u32) -> Q {
        let mut q = Q {
            num: self.num.shl(k),
            den: self.den.clone(),
        };
        q.canonicalize();
        q
    }

    /// Divide by `2^k`: shifts the power of two out of the numerator when
    /// possible instead of always growing the denominator.
    pub fn div_2exp(&self, k: u32) -> Q {
        let mut q = Q {
            num: self.num.clone(),
            den: self.den.shl(k),
        };
        q.canonicalize();
        q
    }

    /// Rational reconstruction: given `a mod m`, find `p/q` with
    /// `gcd(q, m) = 1`, `gcd(p, q) = 1`, and `2·max(|p|, q)^2 <= m`.
    /// Returns `None` if no such rational exists. Implemented via the
    /// half-extended Euclidean algorithm on `(m, a)`, terminating once the
    /// running remainder satisfies the size bound (grounded on FLINT's
    /// `fmpq_reconstruct_fmpz`).
    pub fn reconstruct_from_residue(a: &Z, m: &Z) -> Option<Q> {
        tracing::trace!(target: "flint_core::q", "reconstruct_from_residue");
        if a.is_zero() || a.is_one() {
            return Some(Q::from_z(a));
        }
        let two = Z::from_i64(2);

        let mut u0 = Z::one();
        let mut u1 = Z::zero();
        let mut u2 = m.clone();
        let mut v0 = Z::zero();
        let mut v1 = Z::one();
        let mut v2 = a.modulo(m).ok()?;

        loop {
            let check = &(&v2 * &v2) * &two;
            if check.cmp_abs(m) != Ordering::Greater {
                break;
            }
            let (q, _) = u2.fdiv_qr(&v2).ok()?;
            let t0 = &u0 - &(&q * &v0);
            let t1 = &u1 - &(&q * &v1);
            let t2 = &u2 - &(&q * &v2);
            u0 = v0;
            u1 = v1;
            u2 = v2;
            v0 = t0;
            v1 = t1;
            v2 = t2;
        }

        let den = v1.abs();
        let num = v2;
        let check = &(&den * &den) * &two;
        if check.cmp_abs(m) == Ordering::Greater {
            return None;
        }
        let g = num.gcd(&den);
        if !g.is_one() {
            return None;
        }
        Some(
            Q::set_from_fraction(&num, &v1)
                .expect("v1 is nonzero: reconstruction only completes past the size check"),
        )
    }

    /// Build the `p_n/q_n` convergent of the continued fraction
    /// `[a_0; a_1, a_2, ..., a_{n-1}]` by the standard recurrence
    /// `h_k = a_k h_{k-1} + h_{k-2}`, `k_k = a_k k_{k-1} + k_{k-2}`.
    pub fn from_continued_fraction(terms: &[Z]) -> Result<Q> {
        if terms.is_empty() {
            return Err(Error::domain(
                "Q::from_continued_fraction: empty term list",
            ));
        }
        let mut h_prev2 = Z::one();
        let mut h_prev1 = terms[0].clone();
        let mut k_prev2 = Z::zero();
        let mut k_prev1 = Z::one();
        for a in &terms[1..] {
            let h = &(a * &h_prev1) + &h_prev2;
            let k = &(a * &k_prev1) + &k_prev2;
            h_prev2 = h_prev1;
            h_prev1 = h;
            k_prev2 = k_prev1;
            k_prev1 = k;
        }
        Q::set_from_fraction(&h_prev1, &k_prev1)
    }
}

impl Default for Q {
    fn default() -> Self {
        Q::zero()
    }
}

impl PartialEq for Q {
    fn eq(&self, other: &Self) -> bool {
        self.num == other.num && self.den == other.den
    }
}
impl Eq for Q {}

impl PartialOrd for Q {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Q {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl fmt::Display for Q {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Q {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('/') {
            Some((n, d)) => {
                let num = Z::from_str(n.trim())?;
                let den = Z::from_str(d.trim())?;
                Q::set_from_fraction(&num, &den)
            }
            None => {
                let num = Z::from_str(s)?;
                Ok(Q::from_z(&num))
            }
        }
    }
}

impl Add for &Q {
    type Output = Q;
    fn add(self, rhs: &Q) -> Q {
        let num = &(&self.num * &rhs.den) + &(&rhs.num * &self.den);
        let den = &self.den * &rhs.den;
        let mut q = Q { num, den };
        q.canonicalize();
        q
    }
}
impl Add for Q {
    type Output = Q;
    fn add(self, rhs: Q) -> Q {
        &self + &rhs
    }
}
impl AddAssign<&Q> for Q {
    fn add_assign(&mut self, rhs: &Q) {
        *self = &*self + rhs;
    }
}

impl Sub for &Q {
    type Output = Q;
    fn sub(self, rhs: &Q) -> Q {
        let num = &(&self.num * &rhs.den) - &(&rhs.num * &self.den);
        let den = &self.den * &rhs.den;
        let mut q = Q { num, den };
        q.canonicalize();
        q
    }
}
impl Sub for Q {
    type Output = Q;
    fn sub(self, rhs: Q) -> Q {
        &self - &rhs
    }
}
impl SubAssign<&Q> for Q {
    fn sub_assign(&mut self, rhs: &Q) {
        *self = &*self - rhs;
    }
}

impl Mul for &Q {
    type Output = Q;
    fn mul(self, rhs: &Q) -> Q {
        let num = &self.num * &rhs.num;
        let den = &self.den * &rhs.den;
        let mut q = Q { num, den };
        q.canonicalize();
        q
    }
}
impl Mul for Q {
    type Output = Q;
    fn mul(self, rhs: Q) -> Q {
        &self * &rhs
    }
}
impl MulAssign<&Q> for Q {
    fn mul_assign(&mut self, rhs: &Q) {
        *self = &*self * rhs;
    }
}

impl Div for &Q {
    type Output = Result<Q>;
    fn div(self, rhs: &Q) -> Result<Q> {
        Ok(self * &rhs.inv()?)
    }
}

impl Neg for &Q {
    type Output = Q;
    fn neg(self) -> Q {
        Q {
            num: -self.num.clone(),
            den: self.den.clone(),
        }
    }
}
impl Neg for Q {
    type Output = Q;
    fn neg(self) -> Q {
        -&self
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Q {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.num)?;
        tup.serialize_element(&self.den)?;
        tup.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Q {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (num, den) = <(Z, Z)>::deserialize(deserializer)?;
        Q::set_from_fraction(&num, &den).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    // arithmetic results are always canonical: den > 0, gcd(num,den)=1.
    #[quickcheck]
    fn prop_sum_is_canonical(na: i16, da: i16, nb: i16, db: i16) -> TestResult {
        if da == 0 || db == 0 {
            return TestResult::discard();
        }
        let a = Q::set_from_fraction(&Z::from_i64(i64::from(na)), &Z::from_i64(i64::from(da)))
            .unwrap();
        let b = Q::set_from_fraction(&Z::from_i64(i64::from(nb)), &Z::from_i64(i64::from(db)))
            .unwrap();
        let sum = &a + &b;
        let canonical = sum.den.sign() > 0
            && (sum.is_zero() || sum.num.abs().gcd(&sum.den).is_one());
        TestResult::from_bool(canonical)
    }

    // nonzero q * q.inv() == 1.
    #[quickcheck]
    fn prop_inverse_identity(n: i32, d: i32) -> TestResult {
        if n == 0 || d == 0 {
            return TestResult::discard();
        }
        let q = Q::set_from_fraction(&Z::from_i64(i64::from(n)), &Z::from_i64(i64::from(d)))
            .unwrap();
        TestResult::from_bool(&q * &q.inv().unwrap() == Q::one())
    }

    #[test]
    fn from_fraction_canonicalizes() {
        let q = Q::set_from_fraction(&Z::from_i64(6), &Z::from_i64(-4)).unwrap();
        assert_eq!(q.num(), &Z::from_i64(-3));
        assert_eq!(q.den(), &Z::from_i64(2));

        let z = Q::set_from_fraction(&Z::from_i64(0), &Z::from_i64(5)).unwrap();
        assert_eq!(z.num(), &Z::from_i64(0));
        assert_eq!(z.den(), &Z::from_i64(1));
    }

    #[test]
    fn zero_denominator_is_domain_error() {
        assert!(Q::set_from_fraction(&Z::from_i64(1), &Z::from_i64(0)).is_err());
    }

    #[test]
    fn inverse_round_trip() {
        let q = Q::set_from_fraction(&Z::from_i64(3), &Z::from_i64(7)).unwrap();
        let p = &q * &q.inv().unwrap();
        assert_eq!(p, Q::one());
    }

    #[test]
    fn arithmetic_is_canonical() {
        let a = Q::set_from_fraction(&Z::from_i64(1), &Z::from_i64(2)).unwrap();
        let b = Q::set_from_fraction(&Z::from_i64(1), &Z::from_i64(3)).unwrap();
        let sum = &a + &b;
        assert_eq!(sum, Q::set_from_fraction(&Z::from_i64(5), &Z::from_i64(6)).unwrap());
    }

    #[test]
    fn display_elides_unit_denominator() {
        assert_eq!(Q::from_z(&Z::from_i64(4)).to_string(), "4");
        assert_eq!(
            Q::set_from_fraction(&Z::from_i64(3), &Z::from_i64(4))
                .unwrap()
                .to_string(),
            "3/4"
        );
    }

    #[test]
    fn string_round_trip() {
        for s in ["3/4", "-5/8", "7"] {
            let q: Q = s.parse().unwrap();
            assert_eq!(q.to_string(), s);
        }
    }

    #[test]
    fn continued_fraction_matches_convergent() {
        // [1; 2, 3] = 1 + 1/(2 + 1/3) = 1 + 3/7 = 10/7.
        let terms = [Z::from_i64(1), Z::from_i64(2), Z::from_i64(3)];
        let q = Q::from_continued_fraction(&terms).unwrap();
        assert_eq!(q, Q::set_from_fraction(&Z::from_i64(10), &Z::from_i64(7)).unwrap());
    }

    #[test]
    fn reconstruction_recovers_known_fraction() {
        let p = Z::from_i64(3);
        let q_den = Z::from_i64(7);
        let m = Z::from_i64(1000);
        let a = (&p * &q_den.invmod(&m).unwrap()).modulo(&m).unwrap();
        let reconstructed = Q::reconstruct_from_residue(&a, &m).unwrap();
        assert_eq!(reconstructed, Q::set_from_fraction(&p, &q_den).unwrap());
    }

    #[test]
    fn reconstruction_recovers_negative_fraction() {
        let p = Z::from_i64(-3);
        let q_den = Z::from_i64(7);
        let m = Z::from_i64(1000);
        let a = (&p * &q_den.invmod(&m).unwrap()).modulo(&m).unwrap();
        let reconstructed = Q::reconstruct_from_residue(&a, &m).unwrap();
        assert_eq!(reconstructed, Q::set_from_fraction(&p, &q_den).unwrap());
    }

    #[test]
    fn sqrt_of_perfect_square_fraction() {
        let q = Q::set_from_fraction(&Z::from_i64(4), &Z::from_i64(9)).unwrap();
        assert_eq!(q.sqrt().unwrap(), Q::set_from_fraction(&Z::from_i64(2), &Z::from_i64(3)).unwrap());
    }

    #[test]
    fn sqrt_rejects_negative_and_non_square() {
        assert!(Q::from_z(&Z::from_i64(-4)).sqrt().is_err());
        assert!(Q::set_from_fraction(&Z::from_i64(2), &Z::from_i64(9)).unwrap().sqrt().is_err());
    }

    #[test]
    fn pow_handles_negative_exponents() {
        let q = Q::set_from_fraction(&Z::from_i64(2), &Z::from_i64(3)).unwrap();
        let cubed = q.pow(3).unwrap();
        assert_eq!(cubed, Q::set_from_fraction(&Z::from_i64(8), &Z::from_i64(27)).unwrap());
        let inv_cubed = q.pow(-3).unwrap();
        assert_eq!(inv_cubed, Q::set_from_fraction(&Z::from_i64(27), &Z::from_i64(8)).unwrap());
    }
}
