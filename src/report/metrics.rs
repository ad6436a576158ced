use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fixed-point percentage with two fractional digits.
///
/// Stored as hundredths of a percent, so `Percent::from_hundredths(98)` is
/// `0.98%`. Arithmetic is integer only and renders identically everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(u64);

impl Percent {
    pub const ZERO: Percent = Percent(0);

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Percent(hundredths)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// `numerator / denominator * 100`, rounded half up to the hundredth.
    /// A zero denominator gives zero.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Percent::ZERO;
        }
        let den = u128::from(denominator);
        let scaled = (u128::from(numerator) * 10_000 + den / 2) / den;
        Percent(u64::try_from(scaled).unwrap_or(u64::MAX))
    }

    pub const fn whole(self) -> u64 {
        self.0 / 100
    }

    pub const fn fraction(self) -> u64 {
        self.0 % 100
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole(), self.fraction())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid percentage {0:?}: expected <digits>.<two digits>")]
pub struct ParsePercentError(String);

impl FromStr for Percent {
    type Err = ParsePercentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParsePercentError(s.to_string());
        let (whole, fraction) = s.split_once('.').ok_or_else(invalid)?;
        if whole.is_empty()
            || fraction.len() != 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction: u64 = fraction.parse().map_err(|_| invalid())?;
        whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(fraction))
            .map(Percent)
            .ok_or_else(invalid)
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What accumulated CPU time is divided by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CpuTimeBase {
    /// Host uptime: share of one CPU used since boot.
    #[default]
    Uptime,
    /// Lifetime of the root process: average share of one CPU since it started.
    Lifetime,
}

impl CpuTimeBase {
    pub fn label(self) -> &'static str {
        match self {
            CpuTimeBase::Uptime => "uptime",
            CpuTimeBase::Lifetime => "lifetime",
        }
    }
}

pub fn memory_percent(resident_bytes: u64, total_bytes: u64) -> Percent {
    Percent::ratio(resident_bytes, total_bytes)
}

/// Both arguments in milliseconds.
pub fn cpu_percent(cpu_time_ms: u64, base_ms: u64) -> Percent {
    Percent::ratio(cpu_time_ms, base_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(memory_percent(12345, 0).to_string(), "0.00");
        assert_eq!(cpu_percent(u64::MAX, 0), Percent::ZERO);
    }

    #[test]
    fn ten_megabytes_of_one_gigabyte() {
        let p = memory_percent(10_240 * 1024, 1_048_576 * 1024);
        assert_eq!(p.to_string(), "0.98");
    }

    #[test]
    fn rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(Percent::ratio(1, 8).to_string(), "12.50");
        // 1/3 = 33.333..%
        assert_eq!(Percent::ratio(1, 3).to_string(), "33.33");
        // 2/3 = 66.666..%
        assert_eq!(Percent::ratio(2, 3).to_string(), "66.67");
        // 1/20000 = 0.005%
        assert_eq!(Percent::ratio(1, 20_000).to_string(), "0.01");
    }

    #[test]
    fn can_exceed_one_hundred() {
        assert_eq!(cpu_percent(3_000, 1_000).to_string(), "300.00");
    }

    #[test]
    fn huge_values_do_not_overflow() {
        assert_eq!(Percent::ratio(u64::MAX, u64::MAX).to_string(), "100.00");
    }

    #[test]
    fn parses_rendered_form() {
        assert_eq!("0.98".parse::<Percent>(), Ok(Percent::from_hundredths(98)));
        assert_eq!("120.05".parse::<Percent>(), Ok(Percent::from_hundredths(12_005)));
        assert!("1.5".parse::<Percent>().is_err());
        assert!(".50".parse::<Percent>().is_err());
        assert!("-1.00".parse::<Percent>().is_err());
        assert!("1,00".parse::<Percent>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Percent::from_hundredths(5)).unwrap();
        assert_eq!(json, "\"0.05\"");
        let back: Percent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Percent::from_hundredths(5));
    }

    #[test]
    fn cpu_base_labels() {
        assert_eq!(CpuTimeBase::default(), CpuTimeBase::Uptime);
        assert_eq!(CpuTimeBase::Lifetime.label(), "lifetime");
    }
}
