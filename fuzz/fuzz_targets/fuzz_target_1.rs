#![no_main]
use libfuzzer_sys::fuzz_target;
use tensor_intdiv::{primitives, Divisor, MagicDivisor32};

fuzz_target!(|items: Vec<u64>| {
    if items.is_empty() {
        return;
    }
    let d = items[0];

    macro_rules! run {
        ($num_type:ty, $bound:expr) => {{
            let d = (d as $num_type).rem_euclid($bound);
            if let Ok(divisor) = Divisor::new(d) {
                for item in items.iter() {
                    let item = (*item as $num_type).rem_euclid($bound);
                    assert_eq!(item / &divisor, item / d, "{} {} / {}", stringify!($num_type), item, d);
                }
            }
        }};
    }
    run!(u32, u32::MAX >> 1);
    run!(i32, i32::MAX);
    run!(u64, u64::MAX >> 1);
    run!(i64, i64::MAX);

    // The specialized signed divisor takes any i32 numerator.
    let signed = (d as i32).unsigned_abs().max(2) as i32;
    if let Ok(divisor) = MagicDivisor32::new(signed) {
        for item in items.iter() {
            let item = *item as i32;
            assert_eq!(item / &divisor, item / signed, "i32 {} / {}", item, signed);
        }
    }

    // Native and portable wide multiplies must agree bit for bit.
    for pair in items.windows(2) {
        assert_eq!(
            primitives::mul_high_u64(pair[0], pair[1]),
            primitives::mul_high_u64_portable(pair[0], pair[1])
        );
    }
});
