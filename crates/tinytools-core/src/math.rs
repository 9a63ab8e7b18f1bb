//! Integer helpers usable in `const` context.

/// `base` raised to `exponent`.
///
/// # Panics
///
/// Panics on `u64` overflow, which is a compile error when evaluated in a
/// `const` item.
#[must_use]
pub const fn power(base: u64, exponent: u32) -> u64 {
    let mut acc: u64 = 1;
    let mut remaining = exponent;
    while remaining > 0 {
        acc = match acc.checked_mul(base) {
            Some(next) => next,
            None => panic!("power overflows u64"),
        };
        remaining -= 1;
    }
    acc
}

/// Ten raised to `exponent`.
///
/// # Panics
///
/// Panics when the result does not fit in `u64` (`exponent > 19`).
#[must_use]
pub const fn pow10(exponent: u32) -> u64 {
    power(10, exponent)
}

/// Number of decimal digits in `value`; zero has none.
#[must_use]
pub const fn digit_count(mut value: u128) -> u32 {
    let mut digits = 0;
    while value != 0 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Decimal digit counts for primitive integers.
pub trait Digits: Copy {
    /// Digits in the type's maximum value.
    const MAX_DIGITS: u32;

    /// Digits in `self`, ignoring the sign; zero has none.
    fn digits(self) -> u32;
}

macro_rules! impl_digits_unsigned {
    ($($t:ty),*) => {
        $(
            impl Digits for $t {
                const MAX_DIGITS: u32 = digit_count(<$t>::MAX as u128);

                fn digits(self) -> u32 {
                    digit_count(self as u128)
                }
            }
        )*
    };
}

macro_rules! impl_digits_signed {
    ($($t:ty),*) => {
        $(
            impl Digits for $t {
                const MAX_DIGITS: u32 = digit_count(<$t>::MAX as u128);

                fn digits(self) -> u32 {
                    digit_count(self.unsigned_abs() as u128)
                }
            }
        )*
    };
}

impl_digits_unsigned!(u8, u16, u32, u64, u128, usize);
impl_digits_signed!(i8, i16, i32, i64, i128, isize);
