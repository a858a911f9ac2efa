//! Integer vector utilities: free functions over `&[Z]` / `&mut [Z]` used by
//! [`crate::q`] and [`crate::qx`] internals.

use crate::z::Z;

/// Returns `(sum_bits, max_bits)`: the bit-length of the sum of absolute
/// values, and the maximum bit-length of any single entry. `Qx`
/// multiplication uses this to decide whether an integer-coefficient
/// product can be accumulated in `i128` before promoting to `BigInt`.
pub fn sum_max_bits(vec: &[Z]) -> (u64, u64) {
    let mut sum = Z::zero();
    let mut max_bits = 0u64;
    for z in vec {
        sum += &z.abs();
        max_bits = max_bits.max(z.bit_length());
    }
    (sum.bit_length(), max_bits)
}

/// Iterated GCD over the entries (always nonnegative). Empty slices and
/// all-zero slices both yield zero.
pub fn content(vec: &[Z]) -> Z {
    let mut acc = Z::zero();
    for z in vec {
        acc = acc.gcd(z);
        if acc.is_one() {
            break;
        }
    }
    acc
}

/// Maximum absolute value among the entries (zero for an empty slice).
pub fn height(vec: &[Z]) -> Z {
    let mut acc = Z::zero();
    for z in vec {
        let a = z.abs();
        if a.cmp_abs(&acc) == std::cmp::Ordering::Greater {
            acc = a;
        }
    }
    acc
}

/// Maximum bit-length among the entries (0 for an empty slice).
pub fn max_bits(vec: &[Z]) -> u64 {
    vec.iter().map(Z::bit_length).max().unwrap_or(0)
}

/// Maximum limb count (64-bit words) among the entries (0 for an empty
/// slice); `ceil(max_bits / 64)`, at least 1 for any nonzero entry.
pub fn max_limbs(vec: &[Z]) -> u64 {
    let bits = max_bits(vec);
    if bits == 0 {
        0
    } else {
        (bits + 63) / 64
    }
}

/// Zero every entry in place.
pub fn zero(vec: &mut [Z]) {
    for z in vec {
        z.clear();
    }
}

/// Negate every entry in place.
pub fn negate(vec: &mut [Z]) {
    for z in vec.iter_mut() {
        *z = -z.clone();
    }
}

/// Copy `src` into `dst`; panics (via slice indexing) if lengths differ.
/// Aliasing of `src` and `dst` is permitted since this is a plain
/// element-wise clone, never an in-place read-then-write of overlapping
/// memory.
pub fn copy(dst: &mut [Z], src: &[Z]) {
    assert_eq!(dst.len(), src.len(), "copy: length mismatch");
    for (d, s) in dst.iter_mut().zip(src) {
        d.set(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_the_gcd() {
        let v = [Z::from_i64(12), Z::from_i64(18), Z::from_i64(30)];
        assert_eq!(content(&v), Z::from_i64(6));
    }

    #[test]
    fn content_of_empty_is_zero() {
        let v: [Z; 0] = [];
        assert_eq!(content(&v), Z::from_i64(0));
    }

    #[test]
    fn height_is_max_abs() {
        let v = [Z::from_i64(-7), Z::from_i64(3), Z::from_i64(5)];
        assert_eq!(height(&v), Z::from_i64(7));
    }

    #[test]
    fn max_bits_matches_largest_entry() {
        let v = [Z::from_i64(1), Z::from_i64(255)];
        assert_eq!(max_bits(&v), 8);
        assert_eq!(max_limbs(&v), 1);
    }

    #[test]
    fn sum_max_bits_reports_both_quantities() {
        let v = [Z::from_i64(100), Z::from_i64(-100)];
        let (sum_bits, max_bits) = sum_max_bits(&v);
        assert_eq!(sum_bits, Z::from_i64(200).bit_length());
        assert_eq!(max_bits, Z::from_i64(100).bit_length());
    }

    #[test]
    fn negate_flips_every_entry() {
        let mut v = [Z::from_i64(1), Z::from_i64(-2), Z::from_i64(0)];
        negate(&mut v);
        assert_eq!(v, [Z::from_i64(-1), Z::from_i64(2), Z::from_i64(0)]);
    }
}
