use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// An exact decimal amount of money. Shown with two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(pub Decimal);

impl Money {
    pub const DISPLAY_DECIMALS: u32 = 2;
    // Any 28-digit integer fits a Decimal.
    const MAX_DIGITS: usize = 28;

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Integer part, truncated toward zero, if it fits an `i64`.
    pub fn trunc_to_i64(&self) -> Option<i64> {
        self.0.trunc().to_i64()
    }

    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `self * percent / 100`.
    pub fn percent_of(self, percent: Money) -> Option<Self> {
        self.0
            .checked_mul(percent.0)?
            .checked_div(Decimal::ONE_HUNDRED)
            .map(Self)
    }

    /// Parses the longest numeric prefix of `input`, the way `strtod` reads a line:
    /// leading whitespace, an optional sign, digits with an optional fraction and an
    /// optional exponent. Anything after the number is ignored.
    ///
    /// Returns `None` when no digits are found or the value does not fit a `Decimal`.
    pub fn parse_prefix(input: &str) -> Option<Self> {
        let s = input.trim_start();
        let bytes = s.as_bytes();
        let mut pos = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                pos = 1;
                true
            }
            Some(b'+') => {
                pos = 1;
                false
            }
            _ => false,
        };

        let int_start = pos;
        pos = skip_digits(bytes, pos);
        let int_digits = &s[int_start..pos];

        let mut frac_digits = "";
        if bytes.get(pos) == Some(&b'.') {
            let frac_start = pos + 1;
            let frac_end = skip_digits(bytes, frac_start);
            frac_digits = &s[frac_start..frac_end];
            if !int_digits.is_empty() || !frac_digits.is_empty() {
                pos = frac_end;
            }
        }

        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let mut exponent: i64 = 0;
        if matches!(bytes.get(pos), Some(b'e' | b'E')) {
            let mut exp_start = pos + 1;
            let exp_negative = match bytes.get(exp_start) {
                Some(b'-') => {
                    exp_start += 1;
                    true
                }
                Some(b'+') => {
                    exp_start += 1;
                    false
                }
                _ => false,
            };
            let exp_end = skip_digits(bytes, exp_start);
            // "1e" or "1e+" leave the exponent unconsumed.
            if exp_end > exp_start {
                let magnitude = s[exp_start..exp_end].parse::<i64>().unwrap_or(i64::MAX);
                exponent = if exp_negative { -magnitude } else { magnitude };
            }
        }

        let (mantissa, shift) = mantissa(int_digits, frac_digits)?;
        let value = scale_by_power_of_ten(mantissa, exponent.saturating_add(shift))?;

        if negative && !value.is_zero() {
            Some(Self(-value))
        } else {
            Some(Self(value))
        }
    }
}

fn skip_digits(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

/// Builds the significand from the digits around the decimal point, keeping at most
/// `MAX_DIGITS` significant digits. Dropped digits move into the returned exponent.
fn mantissa(int_digits: &str, frac_digits: &str) -> Option<(Decimal, i64)> {
    let digits = format!("{}{}", int_digits, frac_digits);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some((Decimal::ZERO, 0));
    }

    // Digits beyond Decimal's precision are dropped, as a double would drop them.
    let kept = digits.len().min(Money::MAX_DIGITS);
    let dropped = (digits.len() - kept) as i64;
    let exponent = dropped - frac_digits.len() as i64;

    let value = Decimal::from_str(&digits[..kept]).ok()?;
    Some((value, exponent))
}

/// `value * 10^exponent`, or `None` when the result overflows or a non-zero value
/// underflows to zero.
fn scale_by_power_of_ten(value: Decimal, exponent: i64) -> Option<Decimal> {
    if value.is_zero() {
        return Some(value);
    }

    let mut scaled = value;
    if exponent >= 0 {
        // A non-zero value overflows long before a large exponent is exhausted.
        for _ in 0..exponent {
            scaled = scaled.checked_mul(Decimal::TEN)?;
        }
    } else {
        for _ in 0..exponent.unsigned_abs() {
            scaled = scaled.checked_div(Decimal::TEN)?;
            if scaled.is_zero() {
                return None;
            }
        }
    }
    Some(scaled)
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(Self::DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{:.2}", rounded)
    }
}
