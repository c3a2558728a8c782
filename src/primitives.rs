//! The two execution-context primitives shared by both divisor algorithms:
//! leading-zero count and the upper half of a widening multiply.
//!
//! The division code only ever touches these two operations, so porting to
//! another execution context (an accelerator lane, a target without native
//! 128-bit arithmetic) means reimplementing this module and nothing else.
//! Every implementation must return the same numeric answer; only the
//! instruction selection may differ.

/// Counts leading zero bits of a nonzero 32-bit value.
///
/// The result is unspecified for `v == 0`; callers guarantee nonzero
/// divisors.
#[inline]
pub fn count_leading_zeros32(v: u32) -> u32 {
    debug_assert!(v != 0);
    v.leading_zeros()
}

/// Counts leading zero bits of a nonzero 64-bit value.
#[inline]
pub fn count_leading_zeros64(v: u64) -> u32 {
    debug_assert!(v != 0);
    v.leading_zeros()
}

/// Upper 32 bits of the full 64-bit product `a * b`.
#[inline]
pub fn mul_high_u32(a: u32, b: u32) -> u32 {
    ((a as u64 * b as u64) >> 32) as u32
}

/// Upper 64 bits of the full 128-bit product `a * b`.
///
/// `u128` exists on every Rust target; the pointer-width gate is only a
/// proxy for whether the `u128` product lowers to a native widening
/// multiply or a runtime libcall. Narrow targets take the multi-word path
/// directly instead.
#[inline]
#[cfg(target_pointer_width = "64")]
pub fn mul_high_u64(a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) >> 64) as u64
}

/// Upper 64 bits of the full 128-bit product `a * b`.
#[inline]
#[cfg(not(target_pointer_width = "64"))]
pub fn mul_high_u64(a: u64, b: u64) -> u64 {
    mul_high_u64_portable(a, b)
}

/// Upper 64 bits of `a * b` computed from four 32x32 partial products with
/// carry propagation, without any 128-bit intermediate.
///
/// Bit-identical to [`mul_high_u64`] for all operand pairs; this is the
/// path taken on targets where a wide native multiply is unavailable.
#[inline]
pub fn mul_high_u64_portable(a: u64, b: u64) -> u64 {
    let a_lo = a & 0xffff_ffff;
    let a_hi = a >> 32;
    let b_lo = b & 0xffff_ffff;
    let b_hi = b >> 32;

    // None of the sums below can overflow: each partial product is at most
    // (2^32 - 1)^2 and each carry term is below 2^32.
    let lo_lo = a_lo * b_lo;
    let hi_lo = a_hi * b_lo + (lo_lo >> 32);
    let lo_hi = a_lo * b_hi + (hi_lo & 0xffff_ffff);

    a_hi * b_hi + (hi_lo >> 32) + (lo_hi >> 32)
}
