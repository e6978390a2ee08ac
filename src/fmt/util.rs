/// A simple formatter for converting `i64` values to ASCII byte strings.
///
/// This avoids going through `core::fmt` machinery for the digits of every
/// numeric field.
///
/// By default, this only includes the sign if it's negative. To always include
/// the sign, set `force_sign` to `true`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DecimalFormatter {
    force_sign: bool,
    minimum_digits: u8,
}

impl DecimalFormatter {
    /// Creates a new decimal formatter using the default configuration.
    pub(crate) const fn new() -> DecimalFormatter {
        DecimalFormatter { force_sign: false, minimum_digits: 0 }
    }

    /// Format the given value using this configuration as a decimal ASCII
    /// number.
    pub(crate) const fn format(&self, value: i64) -> Decimal {
        Decimal::new(self, value)
    }

    /// Forces the sign to be rendered, even if it's positive. Zero is
    /// rendered with a `+`.
    pub(crate) const fn force_sign(self, yes: bool) -> DecimalFormatter {
        DecimalFormatter { force_sign: yes, ..self }
    }

    /// The minimum number of digits that this number should be formatted
    /// with. Shorter numbers are padded with leading zeros.
    ///
    /// The minimum is capped at the maximum number of digits for an `i64`
    /// value (which is 19).
    pub(crate) const fn padding(self, mut digits: u8) -> DecimalFormatter {
        if digits > Decimal::MAX_I64_DIGITS {
            digits = Decimal::MAX_I64_DIGITS;
        }
        DecimalFormatter { minimum_digits: digits, ..self }
    }
}

/// A formatted decimal number that can be converted to a sequence of bytes.
#[derive(Debug)]
pub(crate) struct Decimal {
    buf: [u8; Self::MAX_I64_LEN as usize],
    start: u8,
    end: u8,
}

impl Decimal {
    /// Discovered via `i64::MIN.to_string().len()`.
    const MAX_I64_LEN: u8 = 20;
    /// Discovered via `i64::MAX.to_string().len()`.
    const MAX_I64_DIGITS: u8 = 19;

    const fn new(formatter: &DecimalFormatter, value: i64) -> Decimal {
        let negative = value < 0;
        let mut magnitude = value.unsigned_abs();
        let mut decimal = Decimal {
            buf: [0; Self::MAX_I64_LEN as usize],
            start: Self::MAX_I64_LEN,
            end: Self::MAX_I64_LEN,
        };
        loop {
            decimal.start -= 1;
            decimal.buf[decimal.start as usize] = b'0' + (magnitude % 10) as u8;
            magnitude /= 10;
            if magnitude == 0 {
                break;
            }
        }
        while decimal.digits() < formatter.minimum_digits {
            decimal.start -= 1;
            decimal.buf[decimal.start as usize] = b'0';
        }
        if negative || formatter.force_sign {
            decimal.start -= 1;
            decimal.buf[decimal.start as usize] =
                if negative { b'-' } else { b'+' };
        }
        decimal
    }

    /// Returns the number of digits, excluding any sign.
    const fn digits(&self) -> u8 {
        self.end - self.start
    }

    /// Returns the ASCII representation of this decimal as a string slice.
    pub(crate) fn as_str(&self) -> &str {
        let bytes = &self.buf[usize::from(self.start)..usize::from(self.end)];
        // SAFETY: Every byte written to `self.buf` in the range above is an
        // ASCII digit or sign, and thus the slice is valid UTF-8.
        unsafe { core::str::from_utf8_unchecked(bytes) }
    }
}

/// Formats a nanosecond-of-second value as fractional digits.
///
/// Trailing zeros are dropped until `min` digits remain, and at most `max`
/// digits are kept. Extra precision is truncated, never rounded.
///
/// The value must be in the range `0..=999_999_999` and `max` must be at
/// most `9`.
#[derive(Debug)]
pub(crate) struct Fractional {
    buf: [u8; 9],
    end: u8,
}

impl Fractional {
    pub(crate) fn new(nanos: u32, min: u8, max: u8) -> Fractional {
        debug_assert!(nanos <= 999_999_999);
        debug_assert!(min <= max && max <= 9);
        let mut buf = [b'0'; 9];
        let mut value = nanos;
        for slot in buf.iter_mut().rev() {
            *slot = b'0' + (value % 10) as u8;
            value /= 10;
        }
        let mut end = max;
        while end > min && buf[usize::from(end) - 1] == b'0' {
            end -= 1;
        }
        Fractional { buf, end }
    }

    /// Returns the digits. This may be empty when `min` is zero.
    pub(crate) fn as_str(&self) -> &str {
        let bytes = &self.buf[..usize::from(self.end)];
        // SAFETY: `buf` only ever contains ASCII digits.
        unsafe { core::str::from_utf8_unchecked(bytes) }
    }
}

/// Scales up to nine fractional digits to nanoseconds.
///
/// Callers guarantee that `digits` is non-empty, all ASCII digits and at
/// most nine long.
pub(crate) fn fraction_to_nanos(digits: &[u8]) -> u32 {
    let mut nanos: u32 = 0;
    for &d in digits {
        nanos = nanos * 10 + u32::from(d - b'0');
    }
    for _ in digits.len()..9 {
        nanos *= 10;
    }
    nanos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal() {
        let f = |fmt: DecimalFormatter, n| {
            alloc::string::String::from(fmt.format(n).as_str())
        };
        let fmt = DecimalFormatter::new();

        assert_eq!(f(fmt, i64::MIN), "-9223372036854775808");
        assert_eq!(f(fmt, i64::MAX), "9223372036854775807");
        assert_eq!(f(fmt, 0), "0");
        assert_eq!(f(fmt.force_sign(true), 0), "+0");
        assert_eq!(f(fmt.padding(4), 0), "0000");
        assert_eq!(f(fmt.padding(4), -789), "-0789");
        assert_eq!(f(fmt.padding(2).force_sign(true), 7), "+07");
        assert_eq!(f(fmt.padding(2), 12345), "12345");
    }

    #[test]
    fn fractional() {
        let f = |nanos, min, max| {
            alloc::string::String::from(Fractional::new(nanos, min, max).as_str())
        };

        assert_eq!(f(0, 0, 9), "");
        assert_eq!(f(0, 1, 9), "0");
        assert_eq!(f(0, 3, 3), "000");
        assert_eq!(f(123_000_000, 0, 9), "123");
        assert_eq!(f(123_000_000, 6, 9), "123000");
        assert_eq!(f(456_789, 0, 9), "000456789");
        // Truncation, no rounding.
        assert_eq!(f(999_999_999, 1, 2), "99");
    }

    #[test]
    fn fraction_scaling() {
        assert_eq!(fraction_to_nanos(b"5"), 500_000_000);
        assert_eq!(fraction_to_nanos(b"000456789"), 456_789);
        assert_eq!(fraction_to_nanos(b"12"), 120_000_000);
    }
}
