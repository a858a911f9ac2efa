//! Checked word-sized arithmetic helpers used by the `Z::Small` fast path.
//!
//! These mirror plain `i64::checked_*` but exist as free functions so the
//! call sites in [`crate::z`] read the same way regardless of which
//! operation is being dispatched, and so the widening multiply has a home
//! next to its narrower siblings.

/// Add two words, returning `None` on overflow.
#[inline(always)]
pub fn checked_add_i64(a: i64, b: i64) -> Option<i64> {
    a.checked_add(b)
}

/// Subtract two words, returning `None` on overflow.
#[inline(always)]
pub fn checked_sub_i64(a: i64, b: i64) -> Option<i64> {
    a.checked_sub(b)
}

/// Multiply two words, returning `None` on overflow.
#[inline(always)]
pub fn checked_mul_i64(a: i64, b: i64) -> Option<i64> {
    a.checked_mul(b)
}

/// Negate a word, returning `None` on overflow (only `i64::MIN` overflows).
#[inline(always)]
pub fn checked_neg_i64(a: i64) -> Option<i64> {
    a.checked_neg()
}

/// Widening multiply of two words into an `i128`, for the "medium" cost
/// regime described in the dispatch rules: a product that overflows `i64`
/// but not `i128` can still be accumulated without promoting to `BigInt`.
#[inline(always)]
pub fn widening_mul_i64(a: i64, b: i64) -> i128 {
    (a as i128) * (b as i128)
}

/// Narrow an `i128` back to `i64` if it fits.
#[inline(always)]
pub fn narrow_i128(v: i128) -> Option<i64> {
    i64::try_from(v).ok()
}
