use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// Micro-units per major unit.
const MICROS_PER_UNIT: i64 = 1_000_000;
/// Micro-units per minor unit (hundredth).
const MICROS_PER_MINOR: i64 = 10_000;
/// Fractional digits kept exactly.
const SCALE_DIGITS: usize = 6;

/// Largest magnitude accepted from a floating-point source, in micro-units.
const MAX_FROM_FLOAT: f64 = 9.0e18;

/// Divides `n` by `d` (positive), rounding half away from zero.
fn round_div(n: i128, d: i128) -> i128 {
    let quotient = n / d;
    let remainder = (n % d).abs();
    if remainder * 2 >= d {
        quotient + n.signum()
    } else {
        quotient
    }
}

/// Money amount represented as **integer micro-units** (millionths of the
/// major unit).
///
/// Transaction amounts keep up to six decimals exactly, so sums are exact;
/// derived figures are rounded to two decimals with
/// [`Money::round_to_minor`].
///
/// On the wire the amount is a plain JSON number in major units (`12.34`).
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert_eq!("0.005".parse::<Money>().unwrap().micros(), 5_000);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units (hundredths).
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor.saturating_mul(MICROS_PER_MINOR))
    }

    /// Creates a new amount from integer micro-units.
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Returns the raw value in micro-units.
    #[must_use]
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Returns the value in minor units, rounded half away from zero.
    #[must_use]
    pub fn minor(self) -> i64 {
        // |result| <= |self.0| / 10_000 + 1, so the cast cannot truncate.
        round_div(i128::from(self.0), i128::from(MICROS_PER_MINOR)) as i64
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Rounds half away from zero to two decimals.
    #[must_use]
    pub fn round_to_minor(self) -> Money {
        Money::new(self.minor())
    }

    /// Value in major units, for display and JSON.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Divides by `count`, rounding half away from zero to the nearest minor
    /// unit. Division by zero yields [`Money::ZERO`].
    #[must_use]
    pub fn div_round(self, count: u64) -> Money {
        if count == 0 {
            return Money::ZERO;
        }
        let minor = round_div(
            i128::from(self.0),
            i128::from(count) * i128::from(MICROS_PER_MINOR),
        );
        // |minor| <= |self.0| / 10_000 + 1, so the cast cannot truncate.
        Money::new(minor as i64)
    }

    /// Converts a major-unit floating-point value (e.g. `12.34`).
    ///
    /// The value is rounded to the nearest micro-unit. Rejects non-finite
    /// values and values beyond the representable range.
    pub fn from_major(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidArgument(
                "amount must be a finite number".to_string(),
            ));
        }
        let rounded = (value * MICROS_PER_UNIT as f64).round();
        if rounded.abs() > MAX_FROM_FLOAT {
            return Err(EngineError::InvalidArgument("amount too large".to_string()));
        }
        Ok(Money(rounded as i64))
    }
}

impl fmt::Display for Money {
    /// At least two decimals, more only when the amount carries them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / MICROS_PER_UNIT as u64;
        let fraction = format!("{:06}", abs % MICROS_PER_UNIT as u64);
        let fraction = fraction.trim_end_matches('0');
        write!(f, "{sign}{major}.{fraction:0<2}")
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// Digits past the sixth decimal are rounded half away from zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidArgument("empty amount".to_string());
        let invalid = || EngineError::InvalidArgument(format!("invalid amount: {s}"));
        let overflow = || EngineError::InvalidArgument("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim().replace(',', ".");
        if rest.is_empty() {
            return Err(empty());
        }

        let (major_str, fraction_str) = match rest.split_once('.') {
            Some((major, fraction)) => (major, fraction),
            None => (rest.as_str(), ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let major: i64 = major_str.parse().map_err(|_| overflow())?;

        let kept = &fraction_str[..fraction_str.len().min(SCALE_DIGITS)];
        let mut micros: i64 = if kept.is_empty() {
            0
        } else {
            let padded = format!("{kept:0<width$}", width = SCALE_DIGITS);
            padded.parse().map_err(|_| invalid())?
        };
        if fraction_str.as_bytes().get(SCALE_DIGITS).is_some_and(|d| *d >= b'5') {
            micros += 1;
        }

        let total = major
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|v| v.checked_add(micros))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -total } else { total }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_major())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(value) => Money::from_major(value),
            RawAmount::Text(text) => text.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_at_least_two_decimals() {
        assert_eq!(Money::new(0).to_string(), "0.00");
        assert_eq!(Money::new(1).to_string(), "0.01");
        assert_eq!(Money::new(10).to_string(), "0.10");
        assert_eq!(Money::new(1050).to_string(), "10.50");
        assert_eq!(Money::new(-1050).to_string(), "-10.50");
        assert_eq!(Money::from_micros(10_005_000).to_string(), "10.005");
        assert_eq!(Money::from_micros(1).to_string(), "0.000001");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("+1.00".parse::<Money>().unwrap().minor(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
    }

    #[test]
    fn parse_keeps_six_decimals_and_rounds_the_rest() {
        assert_eq!("12.345".parse::<Money>().unwrap().micros(), 12_345_000);
        assert_eq!("0.000001".parse::<Money>().unwrap().micros(), 1);
        assert_eq!("0.0000005".parse::<Money>().unwrap().micros(), 1);
        assert_eq!("0.0000004".parse::<Money>().unwrap().micros(), 0);
        assert_eq!("7.".parse::<Money>().unwrap(), Money::new(700));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.a".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("-".parse::<Money>().is_err());
    }

    #[test]
    fn rounding_to_minor_units_is_half_away_from_zero() {
        assert_eq!(Money::from_micros(10_005_000).round_to_minor(), Money::new(1_001));
        assert_eq!(Money::from_micros(10_004_999).round_to_minor(), Money::new(1_000));
        assert_eq!(Money::from_micros(-5_000).minor(), -1);
        assert_eq!(Money::from_micros(4_999).minor(), 0);
    }

    #[test]
    fn div_round_rounds_half_away_from_zero() {
        assert_eq!(Money::new(17_500).div_round(3), Money::new(5_833));
        assert_eq!(Money::new(5).div_round(2), Money::new(3));
        assert_eq!(Money::new(-5).div_round(2), Money::new(-3));
        assert_eq!(Money::new(4).div_round(3), Money::new(1));
        assert_eq!(Money::from_micros(10_000).div_round(2), Money::new(1));
        assert_eq!(Money::new(100).div_round(0), Money::ZERO);
    }

    #[test]
    fn from_major_rounds_to_micro_units() {
        assert_eq!(Money::from_major(0.1).unwrap(), Money::new(10));
        assert_eq!(Money::from_major(999.99).unwrap(), Money::new(99_999));
        assert_eq!(Money::from_major(10.005).unwrap().micros(), 10_005_000);
        assert_eq!(Money::from_major(0.005).unwrap().micros(), 5_000);
        assert!(Money::from_major(f64::NAN).is_err());
        assert!(Money::from_major(1e300).is_err());
    }

    #[test]
    fn serde_uses_major_units() {
        let json = serde_json::to_string(&Money::new(5_833)).unwrap();
        assert_eq!(json, "58.33");
        let parsed: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(parsed, Money::new(1_250));
        let parsed: Money = serde_json::from_str("\"7,25\"").unwrap();
        assert_eq!(parsed, Money::new(725));
        let parsed: Money = serde_json::from_str("10.005").unwrap();
        assert_eq!(parsed.micros(), 10_005_000);
    }
}
