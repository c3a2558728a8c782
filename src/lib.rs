//! Fast integer division by divisors fixed at construction time.
//!
//! Tensor kernels recover multi-dimensional coordinates from flat offsets by
//! dividing over and over by fixed per-dimension strides. A hardware divide is
//! one of the slowest integer instructions on most cores, and on wide
//! accelerator execution units a single slow lane stalls the whole group. A
//! [`Divisor`] precomputes, once per divisor, the constants that turn every
//! later division into a widening multiply and a couple of shifts, following
//! Granlund and Montgomery, "Division by invariant integers using
//! multiplication" (PLDI '94). [`MagicDivisor32`] is a narrower, faster
//! variant for signed 32-bit numerators with a divisor known to be at least 2,
//! using the classical magic-number derivation from Hacker's Delight
//! section 10.
//!
//! Both divisor types are plain immutable values: construct once, share
//! freely across threads or lanes, divide as often as needed.
//!
//! ```
//! use tensor_intdiv::Divisor;
//!
//! let by7 = Divisor::new(7u32)?;
//! assert_eq!(by7.divide(100), 14);
//! assert_eq!(100 / &by7, 14);
//! # Ok::<(), tensor_intdiv::DivisorError>(())
//! ```

use num_traits::{Bounded, One, PrimInt, Unsigned};

pub mod array;
pub mod primitives;

pub use array::DivisorArray;

use primitives::{count_leading_zeros32, count_leading_zeros64, mul_high_u32, mul_high_u64};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisorError {
    /// General divisors must be strictly positive.
    #[error("divisor must be > 0")]
    ZeroOrNegative,
    /// The specialized signed divisor requires `divisor >= 2`.
    #[error("divisor must be >= 2")]
    BelowMinimum,
    /// Divisors and numerators must stay below half the unsigned range of
    /// their width.
    #[error("divisor exceeds half the representable range for its width")]
    OutOfRange,
}

/// Integer element types a [`Divisor`] can be built for.
///
/// The four impls (`u32`, `i32`, `u64`, `i64`) form a closed set of
/// width/signedness variants. The associated items route each width to its
/// leading-zero count, its multiply-high, and the single extended-precision
/// step of construction; everything else is width-independent.
pub trait DivisorInt: PrimInt {
    /// Element width in bits.
    const BITS: u32;
    /// Unsigned type of the same width; all division arithmetic runs here.
    type Unsigned: PrimInt + Unsigned + std::fmt::Debug;

    fn to_unsigned(self) -> Self::Unsigned;
    fn from_unsigned(v: Self::Unsigned) -> Self;
    fn count_leading_zeros(v: Self::Unsigned) -> u32;
    fn mul_high(a: Self::Unsigned, b: Self::Unsigned) -> Self::Unsigned;
    /// `floor(2^(BITS + log_div) / divisor) - 2^BITS + 1`, computed in an
    /// intermediate wider than `BITS`. Runs once per construction, never on
    /// the division path.
    fn compute_multiplier(log_div: u32, divisor: Self::Unsigned) -> Self::Unsigned;
}

macro_rules! impl_divisor_int {
    ($t:ty, $unsigned:ty, $wide:ty, $bits:expr, $clz:path, $mul_high:path) => {
        impl DivisorInt for $t {
            const BITS: u32 = $bits;
            type Unsigned = $unsigned;

            #[inline]
            fn to_unsigned(self) -> $unsigned {
                self as $unsigned
            }

            #[inline]
            fn from_unsigned(v: $unsigned) -> Self {
                v as Self
            }

            #[inline]
            fn count_leading_zeros(v: $unsigned) -> u32 {
                $clz(v)
            }

            #[inline]
            fn mul_high(a: $unsigned, b: $unsigned) -> $unsigned {
                $mul_high(a, b)
            }

            #[inline]
            fn compute_multiplier(log_div: u32, divisor: $unsigned) -> $unsigned {
                let pow = (1 as $wide) << ($bits + log_div);
                (pow / divisor as $wide - ((1 as $wide) << $bits) + 1) as $unsigned
            }
        }
    };
}

impl_divisor_int!(u32, u32, u64, 32, count_leading_zeros32, mul_high_u32);
impl_divisor_int!(i32, u32, u64, 32, count_leading_zeros32, mul_high_u32);
impl_divisor_int!(u64, u64, u128, 64, count_leading_zeros64, mul_high_u64);
impl_divisor_int!(i64, u64, u128, 64, count_leading_zeros64, mul_high_u64);

/// Granlund-Montgomery divisor: constants precomputed once from a runtime
/// divisor `d`, dividing by `d` afterwards with one widening multiply, one
/// subtraction, one addition and two shifts.
///
/// Valid for `0 < d < max_unsigned / 2` of the element width; numerators
/// passed to [`divide`](Self::divide) must satisfy the same upper bound.
/// Immutable after construction, so a single value can be read concurrently
/// from any number of threads or lanes.
///
/// There is deliberately no `Default`: an all-zero divisor divides wrongly
/// rather than failing, so deferred initialization should go through
/// `Option<Divisor<T>>` instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Divisor<T: DivisorInt> {
    multiplier: T::Unsigned,
    shift1: i32,
    shift2: i32,
}

impl<T: DivisorInt> Divisor<T> {
    /// Precomputes the division constants for `divisor`.
    ///
    /// Fails with [`DivisorError::ZeroOrNegative`] for `divisor <= 0` and
    /// with [`DivisorError::OutOfRange`] when `divisor` reaches half the
    /// unsigned range of the element width.
    pub fn new(divisor: T) -> Result<Self, DivisorError> {
        if divisor <= T::zero() {
            return Err(DivisorError::ZeroOrNegative);
        }
        let d = divisor.to_unsigned();
        if d >= Self::range_bound() {
            return Err(DivisorError::OutOfRange);
        }

        // Fast log2: one too high when d is an exact power of two.
        let mut log_div = (T::BITS - T::count_leading_zeros(d)) as i32;
        if T::Unsigned::one() << (log_div - 1) as usize == d {
            log_div -= 1;
        }

        Ok(Divisor {
            multiplier: T::compute_multiplier(log_div as u32, d),
            shift1: if log_div > 1 { 1 } else { log_div },
            shift2: if log_div > 1 { log_div - 1 } else { 0 },
        })
    }

    /// Computes `numerator / d` (floored) without a division instruction.
    ///
    /// `numerator` must be non-negative and below half the unsigned range of
    /// the element width. The bound is checked in debug builds only; release
    /// builds return an unspecified value when it is violated.
    #[inline]
    pub fn divide(&self, numerator: T) -> T {
        debug_assert!(numerator >= T::zero());
        debug_assert!(numerator.to_unsigned() < Self::range_bound());

        let n = numerator.to_unsigned();
        let t1 = T::mul_high(self.multiplier, n);
        let t = (n - t1) >> self.shift1 as usize;
        T::from_unsigned((t1 + t) >> self.shift2 as usize)
    }

    #[inline]
    fn range_bound() -> T::Unsigned {
        T::Unsigned::max_value() >> 1
    }
}

/// Specialized divisor for signed 32-bit numerators with `d >= 2`: a single
/// multiply-high and arithmetic shift, with the classical sign corrections.
///
/// Derived as in Hacker's Delight section 10. Unlike [`Divisor`], this
/// accepts every representable `i32` numerator, negative values included,
/// and returns the truncating (round-toward-zero) quotient.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MagicDivisor32 {
    magic: u32,
    shift: i32,
}

impl MagicDivisor32 {
    /// Derives the magic constant and shift for `divisor`.
    ///
    /// Fails with [`DivisorError::BelowMinimum`] unless `divisor >= 2`.
    pub fn new(divisor: i32) -> Result<Self, DivisorError> {
        if divisor < 2 {
            return Err(DivisorError::BelowMinimum);
        }

        const TWO31: u32 = 0x8000_0000;
        let ad = divisor as u32;
        let t = TWO31 + (ad >> 31);
        // Absolute value of the "almost" negative complement of d.
        let anc = t - 1 - t % ad;
        let mut p = 31;
        let mut q1 = TWO31 / anc; // q1 = 2^p / |nc|
        let mut r1 = TWO31 - q1 * anc; // r1 = rem(2^p, |nc|)
        let mut q2 = TWO31 / ad; // q2 = 2^p / d
        let mut r2 = TWO31 - q2 * ad; // r2 = rem(2^p, d)

        // Double p and both quotient/remainder pairs until 2^p is large
        // enough; at most 33 iterations. The doublings run mod 2^32 on
        // purpose, matching the unsigned arithmetic of the derivation.
        loop {
            p += 1;
            q1 = q1.wrapping_mul(2);
            r1 = r1.wrapping_mul(2);
            if r1 >= anc {
                q1 += 1;
                r1 -= anc;
            }
            q2 = q2.wrapping_mul(2);
            r2 = r2.wrapping_mul(2);
            if r2 >= ad {
                q2 += 1;
                r2 -= ad;
            }
            let delta = ad - r2;
            if !(q1 < delta || (q1 == delta && r1 == 0)) {
                break;
            }
        }

        Ok(MagicDivisor32 {
            magic: q2.wrapping_add(1),
            shift: p - 32,
        })
    }

    /// Computes the truncating quotient `n / d` for any representable `n`.
    #[inline]
    pub fn divide(&self, n: i32) -> i32 {
        let mut q = (((self.magic as i32 as i64) * n as i64) >> 32) as i32;
        // When the magic constant is negative as an i32, the derivation
        // folded one numerator addend into it; restore it here.
        if (self.magic as i32) < 0 {
            q = q.wrapping_add(n);
        }
        q >>= self.shift;
        // Round toward zero: negative quotients are one too low after the
        // arithmetic shift.
        q + ((q as u32) >> 31) as i32
    }
}

macro_rules! impl_div_by {
    ($t:ty) => {
        impl std::ops::Div<&Divisor<$t>> for $t {
            type Output = $t;

            #[inline]
            fn div(self, divisor: &Divisor<$t>) -> $t {
                divisor.divide(self)
            }
        }
    };
}

impl_div_by!(u32);
impl_div_by!(i32);
impl_div_by!(u64);
impl_div_by!(i64);

impl std::ops::Div<&MagicDivisor32> for i32 {
    type Output = i32;

    #[inline]
    fn div(self, divisor: &MagicDivisor32) -> i32 {
        divisor.divide(self)
    }
}
