//! Arbitrary-precision integers, rationals and dense rational polynomials.
//!
//! This crate is the core of a multi-precision arithmetic library in the
//! tradition of FLINT: [`z::Z`] is a tagged integer with a small/large
//! boundary, [`q::Q`] is a canonical rational built on `Z`, and [`qx::Qx`]
//! is a dense univariate polynomial over `Q` sharing one integer
//! denominator. [`ivec`] holds the free-function utilities `Q`/`Qx`
//! internals share over contiguous `Z` slices, and [`rand::RandState`]
//! (behind the `random` feature) is the uniform adapter over an external
//! pseudo-random generator that the probabilistic paths of `z` consume.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]
#![deny(unused_crate_dependencies)]
#![deny(
    clippy::arithmetic_side_effects,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::string_slice
)]

mod arith;
mod bpi;
pub mod consts;
pub mod error;
pub mod ivec;
pub mod q;
pub mod qx;
#[cfg(feature = "random")]
pub mod rand;
pub mod z;

pub mod prelude {
    //! Everything most callers need in scope.
    pub use crate::{
        consts::{
            SMALL_MAX,
            SMALL_MIN,
            WORD_BITS,
        },
        error::{
            Error,
            Result,
        },
        q::Q,
        qx::Qx,
        z::{
            Primality,
            Z,
        },
    };

    #[cfg(feature = "random")]
    pub use crate::rand::RandState;
}
