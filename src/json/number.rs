//! Numeric literal reconstruction
//!
//! The grammar reads digit runs into [`BigInt`] accumulators, so no digit
//! is lost however long the literal is. [`NumberLiteral::into_value`] then
//! decides the output representation:
//!
//! - Default: the nearest `f64`, obtained by handing the exact decimal
//!   `mantissa e scale` text to Rust's correctly rounded float parser.
//! - Exact integers: trailing zeros are shifted out of the mantissa into
//!   the scale. If the resulting scale is non-negative and at most
//!   [`MAX_EXACT_SCALE`], the value is an integer and is returned exactly
//!   as [`Value::Integer`]. Anything else (fractions, negative zero,
//!   `Infinity`, `NaN`, absurd exponents) falls back to `f64`.

use super::value::Value;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

/// Largest power of ten an exact integer may be scaled by
///
/// `1e4096` is a 4097-digit integer; beyond that a hostile exponent could
/// make a few bytes of input allocate arbitrary memory.
pub const MAX_EXACT_SCALE: i64 = 4096;

/// A digit run read into a big integer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Digits {
    /// Value of the run
    pub value: BigInt,
    /// Number of digits read, leading zeros included
    pub count: usize,
    /// Number of `0` digits ending the run
    pub trailing_zeros: usize,
}

impl Digits {
    /// Read every digit of `radix` in `text`, most-significant first;
    /// other characters are skipped
    pub fn parse(text: &str, radix: u32) -> Self {
        let digits: Vec<u8> = text
            .bytes()
            .filter(|&b| char::from(b).is_digit(radix))
            .collect();
        let value = BigInt::parse_bytes(&digits, radix).unwrap_or_default();
        let trailing_zeros = digits.iter().rev().take_while(|&&b| b == b'0').count();
        Self {
            value,
            count: digits.len(),
            trailing_zeros,
        }
    }
}

fn power_of_ten(exponent: usize) -> BigInt {
    BigInt::from(10u32).pow(u32::try_from(exponent).unwrap_or(u32::MAX))
}

/// A numeric literal before it is turned into a [`Value`]
#[derive(Debug, Clone, PartialEq)]
pub enum NumberLiteral {
    /// `integer.fraction e exponent`
    Decimal {
        /// Leading `-`
        negative: bool,
        /// Digits before the point
        integer: Digits,
        /// Digits after the point (may be empty)
        fraction: Digits,
        /// Signed exponent, zero when absent
        exponent: BigInt,
    },
    /// `0x...`
    Hex {
        /// Leading `-`
        negative: bool,
        /// Magnitude
        value: BigInt,
    },
    /// `Infinity`
    Infinity {
        /// Leading `-`
        negative: bool,
    },
    /// `NaN`
    NaN,
}

impl NumberLiteral {
    /// Whether a leading `-` was present
    pub fn is_negative(&self) -> bool {
        match self {
            NumberLiteral::Decimal { negative, .. }
            | NumberLiteral::Hex { negative, .. }
            | NumberLiteral::Infinity { negative } => *negative,
            NumberLiteral::NaN => false,
        }
    }

    /// Apply a sign read in front of the literal
    pub fn negated(self, negate: bool) -> Self {
        if !negate {
            return self;
        }
        match self {
            NumberLiteral::Decimal {
                negative,
                integer,
                fraction,
                exponent,
            } => NumberLiteral::Decimal {
                negative: !negative,
                integer,
                fraction,
                exponent,
            },
            NumberLiteral::Hex { negative, value } => NumberLiteral::Hex {
                negative: !negative,
                value,
            },
            NumberLiteral::Infinity { negative } => NumberLiteral::Infinity {
                negative: !negative,
            },
            NumberLiteral::NaN => NumberLiteral::NaN,
        }
    }

    /// Exact `(mantissa, scale)` with value `mantissa * 10^scale`
    fn decimal_parts(&self) -> Option<(BigInt, i64)> {
        match self {
            NumberLiteral::Decimal {
                integer,
                fraction,
                exponent,
                ..
            } => {
                let mantissa = &integer.value * power_of_ten(fraction.count) + &fraction.value;
                // Trailing zeros of the mantissa, known from the digit text
                let zeros = if !fraction.value.is_zero() {
                    fraction.trailing_zeros
                } else if !integer.value.is_zero() {
                    fraction.count + integer.trailing_zeros
                } else {
                    return Some((BigInt::zero(), 0));
                };
                let mantissa = if zeros == 0 {
                    mantissa
                } else {
                    mantissa / power_of_ten(zeros)
                };
                let scale = saturate(exponent)
                    .saturating_sub(fraction.count as i64)
                    .saturating_add(zeros as i64);
                Some((mantissa, scale))
            }
            NumberLiteral::Hex { value, .. } => Some((value.clone(), 0)),
            _ => None,
        }
    }

    /// Nearest `f64`
    pub fn to_f64(&self) -> f64 {
        match self {
            NumberLiteral::Infinity { negative: false } => f64::INFINITY,
            NumberLiteral::Infinity { negative: true } => f64::NEG_INFINITY,
            NumberLiteral::NaN => f64::NAN,
            _ => {
                let (mantissa, scale) = self.decimal_parts().unwrap_or_default();
                let sign = if self.is_negative() { "-" } else { "" };
                // Decimal digits with an exponent always parse.
                format!("{}{}e{}", sign, mantissa, scale)
                    .parse::<f64>()
                    .unwrap_or(f64::NAN)
            }
        }
    }

    /// Output value, exact for integers when `exact_integers` is set
    pub fn into_value(self, exact_integers: bool) -> Value {
        if exact_integers {
            if let Some(integer) = self.exact_integer() {
                return Value::Integer(integer);
            }
        }
        Value::Number(self.to_f64())
    }

    fn exact_integer(&self) -> Option<BigInt> {
        let (mantissa, scale) = self.decimal_parts()?;
        if mantissa.is_zero() {
            // -0 only survives as a float
            return (!self.is_negative()).then(BigInt::zero);
        }
        if !(0..=MAX_EXACT_SCALE).contains(&scale) {
            return None;
        }
        let magnitude = mantissa * power_of_ten(scale as usize);
        Some(if self.is_negative() { -magnitude } else { magnitude })
    }
}

fn saturate(n: &BigInt) -> i64 {
    n.to_i64().unwrap_or(match n.sign() {
        Sign::Minus => i64::MIN / 4,
        _ => i64::MAX / 4,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(text: &str) -> Digits {
        Digits::parse(text, 10)
    }

    fn decimal(negative: bool, integer: &str, fraction: &str, exponent: i64) -> NumberLiteral {
        NumberLiteral::Decimal {
            negative,
            integer: digits(integer),
            fraction: digits(fraction),
            exponent: BigInt::from(exponent),
        }
    }

    #[test]
    fn test_parse_digits() {
        let d = digits("0042");
        assert_eq!(d.value, BigInt::from(42));
        assert_eq!(d.count, 4);
        assert_eq!(d.trailing_zeros, 0);
        assert_eq!(Digits::parse("fF", 16).value, BigInt::from(255));
        assert_eq!(digits("1200").trailing_zeros, 2);
        assert_eq!(digits("000").trailing_zeros, 3);
        assert_eq!(digits(""), Digits::default());
    }

    #[test]
    fn test_long_zero_runs() {
        let zeros = "0".repeat(20_000);
        let big = decimal(false, &format!("1{}", zeros), "", 0);
        assert_eq!(big.to_f64(), f64::INFINITY);
        assert_eq!(big.into_value(false), Value::Number(f64::INFINITY));

        let exact = decimal(false, &format!("7{}", &zeros[..4000]), &zeros, -10);
        let expected = BigInt::from(7) * BigInt::from(10u32).pow(3990);
        assert_eq!(exact.into_value(true), Value::Integer(expected));

        let tiny = decimal(false, "0", &format!("{}5", zeros), 0);
        assert_eq!(tiny.to_f64(), 0.0);
    }

    #[test]
    fn test_float_output() {
        assert_eq!(decimal(false, "1", "5", 0).into_value(false), Value::Number(1.5));
        assert_eq!(decimal(true, "12", "", 2).into_value(false), Value::Number(-1200.0));
        assert_eq!(decimal(false, "0", "001", 0).into_value(false), Value::Number(0.001));
        assert_eq!(decimal(false, "1", "", 400).to_f64(), f64::INFINITY);
        assert_eq!(decimal(false, "1", "", -400).to_f64(), 0.0);
    }

    #[test]
    fn test_negative_zero() {
        let value = decimal(true, "0", "", 0).into_value(true);
        match value {
            Value::Number(n) => assert!(n == 0.0 && n.is_sign_negative()),
            other => panic!("expected float, got {:?}", other),
        }
        assert_eq!(decimal(false, "0", "000", 5).into_value(true), Value::integer(0));
    }

    #[test]
    fn test_exact_integers() {
        let nines = "9".repeat(30);
        let expected: BigInt = nines.parse().unwrap();
        assert_eq!(decimal(false, &nines, "", 0).into_value(true), Value::Integer(expected));

        assert_eq!(decimal(false, "15", "", 2).into_value(true), Value::integer(1500));
        assert_eq!(decimal(true, "1", "2500", 2).into_value(true), Value::integer(-125));
        assert_eq!(decimal(false, "100", "", -2).into_value(true), Value::integer(1));
        assert_eq!(decimal(false, "1", "5", 0).into_value(true), Value::Number(1.5));
    }

    #[test]
    fn test_exact_scale_cap() {
        assert!(matches!(
            decimal(false, "1", "", MAX_EXACT_SCALE).into_value(true),
            Value::Integer(_)
        ));
        assert_eq!(
            decimal(false, "1", "", MAX_EXACT_SCALE + 1).into_value(true),
            Value::Number(f64::INFINITY)
        );
    }

    #[test]
    fn test_huge_exponent_saturates() {
        let literal = NumberLiteral::Decimal {
            negative: false,
            integer: digits("1"),
            fraction: Digits::default(),
            exponent: "1".repeat(40).parse().unwrap(),
        };
        assert_eq!(literal.to_f64(), f64::INFINITY);
    }

    #[test]
    fn test_hex_and_specials() {
        let hex = NumberLiteral::Hex {
            negative: true,
            value: BigInt::from(255),
        };
        assert_eq!(hex.clone().into_value(false), Value::Number(-255.0));
        assert_eq!(hex.into_value(true), Value::integer(-255));

        let inf = NumberLiteral::Infinity { negative: false }.negated(true);
        assert_eq!(inf.into_value(true), Value::Number(f64::NEG_INFINITY));
        match NumberLiteral::NaN.into_value(true) {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {:?}", other),
        }
    }

    #[test]
    fn test_nearest_float_for_long_runs() {
        let nines = "9".repeat(30);
        assert_eq!(decimal(false, &nines, "", 0).to_f64(), 1e30);
        assert_eq!(decimal(false, "0", "1", 0).to_f64(), 0.1);
    }
}
