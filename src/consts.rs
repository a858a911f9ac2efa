//! Word-size constants shared by [`crate::z`], [`crate::q`] and [`crate::qx`].

/// Bits in the machine word used for the small-value fast path.
pub const WORD_BITS: u32 = i64::BITS;

/// Largest value representable in small form.
pub const SMALL_MAX: i64 = i64::MAX;

/// Smallest value representable in small form.
pub const SMALL_MIN: i64 = i64::MIN;

static_assertions::const_assert!(WORD_BITS == 64);
