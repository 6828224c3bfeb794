//! Volume units, stored amounts and canonical text rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millilitres in one US fluid ounce.
pub const ML_PER_OZ: f64 = 29.5735295625;

/// Volume unit an amount is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Millilitres,
    Ounces,
}

impl Unit {
    /// Builds a unit from the single-bit "is ounces" flag used in records.
    pub fn from_oz_flag(is_oz: bool) -> Self {
        if is_oz {
            Unit::Ounces
        } else {
            Unit::Millilitres
        }
    }

    pub fn is_oz(self) -> bool {
        self == Unit::Ounces
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Millilitres => "mL",
            Unit::Ounces => "oz",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Millilitres => write!(f, "ml"),
            Unit::Ounces => write!(f, "oz"),
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ml" | "millilitres" | "milliliters" => Ok(Unit::Millilitres),
            "oz" | "ounces" => Ok(Unit::Ounces),
            _ => Err(format!("Invalid unit '{}'. Valid options: ml, oz", s)),
        }
    }
}

/// Converts `amount` between units. No rounding happens here.
pub fn convert(amount: f64, from: Unit, to: Unit) -> f64 {
    match (from, to) {
        (Unit::Ounces, Unit::Millilitres) => amount * ML_PER_OZ,
        (Unit::Millilitres, Unit::Ounces) => amount / ML_PER_OZ,
        _ => amount,
    }
}

/// Converts and renders an amount: ounces keep one decimal ("8.0 oz"),
/// millilitres round to a whole number ("237 mL").
pub fn format_amount(amount: f64, from: Unit, to: Unit) -> String {
    let value = convert(amount, from, to);
    match to {
        Unit::Ounces => format!("{:.1} {}", value, to.symbol()),
        Unit::Millilitres => format!("{:.0} {}", value.round(), to.symbol()),
    }
}

/// Renders a wall-clock time as `H:MM` or, with `use_meridiem`, `h:MMam`/`h:MMpm`.
pub fn format_time(hour: u8, minute: u8, use_meridiem: bool) -> String {
    if !use_meridiem {
        return format!("{}:{:02}", hour, minute);
    }
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02}{}", display_hour, minute, suffix)
}

/// A non-negative volume with one decimal digit of precision.
///
/// Stored as tenths in 16 bits, so the representable range is 0.0 to 6553.5.
/// Construction never fails: out-of-range input is clamped and non-finite
/// input other than positive infinity becomes zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(into = "f64")]
pub struct Amount(u16);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u16::MAX);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        let tenths = (value * 10.0).round();
        if tenths <= 0.0 {
            Self::ZERO
        } else if tenths >= f64::from(u16::MAX) {
            Self::MAX
        } else {
            Self(tenths as u16)
        }
    }

    /// Rebuilds an amount from its stored tenths.
    pub fn from_tenths(tenths: u16) -> Self {
        Self(tenths)
    }

    pub fn tenths(self) -> u16 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}
