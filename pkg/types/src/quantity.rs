use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Nano-units per whole unit. Quantities are stored exactly at this scale.
const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// Binary SI suffixes, largest first, with their power of two.
const BINARY_SUFFIXES: &[(&str, u32)] = &[
    ("Ei", 60),
    ("Pi", 50),
    ("Ti", 40),
    ("Gi", 30),
    ("Mi", 20),
    ("Ki", 10),
];

/// Decimal exponents tried when rendering, largest first.
const DECIMAL_EXPONENTS: &[i32] = &[18, 15, 12, 9, 6, 3, 0, -3, -6, -9];

/// Notation a quantity was written in. Only affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `k`, `M`, `G`, `m`, `u`, `n`, ...
    #[default]
    DecimalSI,
    /// `Ki`, `Mi`, `Gi`, ...
    BinarySI,
    /// `1e3`, `5E-3`
    DecimalExponent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseQuantityError {
    #[error("quantity must not be empty")]
    Empty,
    #[error("quantity '{0}' is not a number followed by an optional suffix")]
    InvalidFormat(String),
    #[error("unable to parse suffix of quantity '{0}'")]
    UnknownSuffix(String),
    #[error("quantity '{0}' is out of range")]
    Overflow(String),
}

/// A resource amount such as `500Mi`, `2` or `100m`.
///
/// The value is kept exactly as a count of nano-units; anything finer is
/// rounded up in magnitude when parsing. Comparison looks at the value
/// only, so `1Ki` equals `1024`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quantity {
    nanos: i128,
    format: Format,
}

enum Suffix {
    Decimal(i64, Format),
    Binary(u32),
}

fn parse_suffix(suffix: &str) -> Option<Suffix> {
    let decimal = |exp| Some(Suffix::Decimal(exp, Format::DecimalSI));
    match suffix {
        "" => decimal(0),
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        _ => {
            if let Some((_, shift)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
                return Some(Suffix::Binary(*shift));
            }
            let exp = suffix.strip_prefix(['e', 'E'])?;
            exp.parse::<i64>()
                .ok()
                .map(|e| Suffix::Decimal(e, Format::DecimalExponent))
        }
    }
}

fn pow10(exp: u64) -> Option<i128> {
    u32::try_from(exp).ok().and_then(|e| 10i128.checked_pow(e))
}

/// Unsigned decimal number: digits with `point` of them before the
/// decimal point. `point` may lie outside the digits.
struct DecimalDigits {
    digits: Vec<u8>,
    point: i64,
}

impl DecimalDigits {
    fn new(whole: &str, frac: &str) -> Self {
        Self {
            digits: whole.bytes().chain(frac.bytes()).map(|b| b - b'0').collect(),
            point: whole.len() as i64,
        }
    }

    fn double(&mut self) {
        let mut carry = 0;
        for d in self.digits.iter_mut().rev() {
            let v = *d * 2 + carry;
            *d = v % 10;
            carry = v / 10;
        }
        if carry > 0 {
            self.digits.insert(0, carry);
            self.point += 1;
        }
    }

    /// Round up to a whole number, or `None` if it does not fit.
    fn ceil(&self) -> Option<i128> {
        let whole_len = self.point.clamp(0, self.digits.len() as i64) as usize;
        let (whole, frac) = self.digits.split_at(whole_len);
        let mut n: i128 = 0;
        for &d in whole {
            n = n.checked_mul(10)?.checked_add(i128::from(d))?;
        }
        if n != 0 {
            for _ in whole_len as i64..self.point {
                n = n.checked_mul(10)?;
            }
        }
        if frac.iter().any(|&d| d != 0) {
            n = n.checked_add(1)?;
        }
        Some(n)
    }
}

fn decimal_suffix(exp: i32) -> &'static str {
    match exp {
        18 => "E",
        15 => "P",
        12 => "T",
        9 => "G",
        6 => "M",
        3 => "k",
        -3 => "m",
        -6 => "u",
        -9 => "n",
        _ => "",
    }
}

impl Quantity {
    pub const fn from_nanos(nanos: i128, format: Format) -> Self {
        Self { nanos, format }
    }

    /// Whole units in decimal notation, e.g. a pod count.
    pub const fn from_units(units: i64) -> Self {
        Self::from_nanos(units as i128 * NANOS_PER_UNIT, Format::DecimalSI)
    }

    /// Whole bytes in binary notation.
    pub const fn from_bytes(bytes: i64) -> Self {
        Self::from_nanos(bytes as i128 * NANOS_PER_UNIT, Format::BinarySI)
    }

    /// Thousandths of a unit, e.g. CPU millicores.
    pub const fn from_millis(millis: i64) -> Self {
        Self::from_nanos(millis as i128 * 1_000_000, Format::DecimalSI)
    }

    /// Parse a quantity string such as `"500Mi"`, `"1.5"`, `"100m"` or `"1e3"`.
    pub fn parse(input: &str) -> Result<Self, ParseQuantityError> {
        if input.is_empty() {
            return Err(ParseQuantityError::Empty);
        }
        let invalid = || ParseQuantityError::InvalidFormat(input.to_string());
        let overflow = || ParseQuantityError::Overflow(input.to_string());

        let (negative, rest) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_end);
        let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
        if frac.contains('.') || (whole.is_empty() && frac.is_empty()) {
            return Err(invalid());
        }
        let parsed_suffix =
            parse_suffix(suffix).ok_or_else(|| ParseQuantityError::UnknownSuffix(input.to_string()))?;

        // Scale to nano-units exactly, then round up whatever is left below.
        let mut number = DecimalDigits::new(whole, frac);
        let (exp, format) = match parsed_suffix {
            Suffix::Decimal(exp, format) => (exp, format),
            Suffix::Binary(shift) => {
                for _ in 0..shift {
                    number.double();
                }
                (0, Format::BinarySI)
            }
        };
        number.point = number
            .point
            .checked_add(exp)
            .and_then(|p| p.checked_add(9))
            .ok_or_else(overflow)?;
        let magnitude = number.ceil().ok_or_else(overflow)?;

        let nanos = if negative { -magnitude } else { magnitude };
        Ok(Self { nanos, format })
    }

    pub fn nanos(&self) -> i128 {
        self.nanos
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// Whole units, rounded up.
    pub fn value(&self) -> i128 {
        let q = self.nanos / NANOS_PER_UNIT;
        if self.nanos % NANOS_PER_UNIT > 0 { q + 1 } else { q }
    }

    /// Thousandths of a unit, rounded up.
    pub fn milli_value(&self) -> i128 {
        let q = self.nanos / 1_000_000;
        if self.nanos % 1_000_000 > 0 { q + 1 } else { q }
    }

    /// Largest decimal exponent (multiple of 3) that keeps the mantissa integral.
    fn decimal_parts(&self) -> (i128, i32) {
        for &exp in DECIMAL_EXPONENTS {
            if let Some(divisor) = pow10((exp + 9) as u64) {
                if self.nanos % divisor == 0 {
                    return (self.nanos / divisor, exp);
                }
            }
        }
        (self.nanos, -9)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return f.write_str("0");
        }
        if self.format == Format::BinarySI && self.nanos % NANOS_PER_UNIT == 0 {
            let units = self.nanos / NANOS_PER_UNIT;
            for (suffix, shift) in BINARY_SUFFIXES {
                let base = 1i128 << shift;
                if units % base == 0 {
                    return write!(f, "{}{}", units / base, suffix);
                }
            }
            return write!(f, "{}", units);
        }
        let (mantissa, exp) = self.decimal_parts();
        match self.format {
            Format::DecimalExponent if exp != 0 => write!(f, "{}e{}", mantissa, exp),
            Format::DecimalExponent => write!(f, "{}", mantissa),
            _ => write!(f, "{}{}", mantissa, decimal_suffix(exp)),
        }
    }
}

impl FromStr for Quantity {
    type Err = ParseQuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nanos.hash(state);
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity {
            nanos: self.nanos.saturating_add(rhs.nanos),
            format: self.format,
        }
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity {
            nanos: self.nanos.saturating_sub(rhs.nanos),
            format: self.format,
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
