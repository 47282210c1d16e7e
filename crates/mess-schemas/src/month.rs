use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Utc};

/// Calendar month in `YYYY-MM` form.
///
/// Dues are keyed by month; the only arithmetic the ledger ever needs is
/// "the month before this one", so that is all this type offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Month {
    year: i32,
    /// 1..=12
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("invalid month number: {}", month));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given instant (UTC).
    pub fn containing(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    /// The immediately preceding calendar month.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| anyhow!("invalid month '{}': expected YYYY-MM", s))?;
        let year: i32 = y
            .parse()
            .map_err(|_| anyhow!("invalid month '{}': bad year", s))?;
        let month: u32 = m
            .parse()
            .map_err(|_| anyhow!("invalid month '{}': bad month", s))?;
        Self::new(year, month)
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(Month::new(2024, 6).unwrap().to_string(), "2024-06");
        assert_eq!(Month::new(2024, 12).unwrap().to_string(), "2024-12");
    }

    #[test]
    fn previous_rolls_over_year_boundary() {
        let jan = Month::new(2024, 1).unwrap();
        assert_eq!(jan.previous().to_string(), "2023-12");
        let jul = Month::new(2024, 7).unwrap();
        assert_eq!(jul.previous().to_string(), "2024-06");
    }

    #[test]
    fn parse_round_trips() {
        let m = Month::parse("2024-06").unwrap();
        assert_eq!(m, Month::new(2024, 6).unwrap());
        assert!(Month::parse("2024-13").is_err());
        assert!(Month::parse("2024").is_err());
        assert!(Month::parse("abcd-ef").is_err());
    }

    #[test]
    fn containing_uses_utc_calendar() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(Month::containing(ts).to_string(), "2024-06");
    }
}
