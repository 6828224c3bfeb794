//! Month arithmetic, per-day storage keys and calendar grids.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Number of columns in a calendar grid, Sunday first.
pub const WEEK_DAYS: usize = 7;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Returns `None` unless `month` is 1-12 and the year is one chrono can
    /// represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

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

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month).unwrap_or(0)
    }

    /// Storage key for `day` of this month, or `None` if the day does not exist.
    pub fn storage_key_for_day(&self, day: u32) -> Option<String> {
        self.day(day).map(storage_key)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid month '{}'. Use YYYY-MM.", s);
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// Days in the given month, counted as the day before the first of the
/// following month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let this = Month::new(year, month)?;
    let next = this.next();
    let last = next.first_day()?.pred_opt()?;
    Some(last.day())
}

/// Fixed-width `YYYYMMDD` key addressing the daily log of `date`.
pub fn storage_key(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

pub fn storage_key_for_day(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(storage_key)
}

/// One day in a calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub day: u32,
    pub key: String,
    pub has_data: bool,
    pub is_today: bool,
}

/// Layout of a month for rendering: leading blanks up to the weekday of the
/// first day, then one cell per day, wrapping every [`WEEK_DAYS`] cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    pub month: Month,
    pub leading_blanks: usize,
    pub cells: Vec<GridCell>,
}

impl CalendarGrid {
    /// Lays out `month`, asking `has_data` about each day's storage key.
    pub fn build<F>(month: Month, today: NaiveDate, mut has_data: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        let leading_blanks = month
            .first_day()
            .map(|d| d.weekday().num_days_from_sunday() as usize)
            .unwrap_or(0);

        let cells = (1..=month.days())
            .filter_map(|day| month.day(day))
            .map(|date| {
                let key = storage_key(date);
                GridCell {
                    day: date.day(),
                    has_data: has_data(&key),
                    is_today: date == today,
                    key,
                }
            })
            .collect();

        Self {
            month,
            leading_blanks,
            cells,
        }
    }

    /// Rows of the grid; `None` marks a blank slot before the first or after
    /// the last day.
    pub fn rows(&self) -> Vec<Vec<Option<&GridCell>>> {
        let slots: Vec<Option<&GridCell>> = std::iter::repeat(None)
            .take(self.leading_blanks)
            .chain(self.cells.iter().map(Some))
            .collect();

        slots
            .chunks(WEEK_DAYS)
            .map(|chunk| {
                let mut row = chunk.to_vec();
                row.resize(WEEK_DAYS, None);
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(1900, 2), Some(28));
        assert_eq!(days_in_month(2000, 2), Some(29));
        assert_eq!(days_in_month(2023, 12), Some(31));
        assert_eq!(days_in_month(2023, 4), Some(30));
        assert_eq!(days_in_month(2023, 13), None);
        assert_eq!(days_in_month(2023, 0), None);
    }

    #[test]
    fn test_next_wraps_year() {
        let dec = Month::new(2023, 12).unwrap();
        assert_eq!(dec.next(), Month::new(2024, 1).unwrap());
        assert_eq!(Month::new(2024, 5).unwrap().next(), Month::new(2024, 6).unwrap());
    }

    #[test]
    fn test_previous_wraps_year() {
        let jan = Month::new(2024, 1).unwrap();
        assert_eq!(jan.previous(), Month::new(2023, 12).unwrap());
        assert_eq!(jan.next().previous(), jan);
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(storage_key(date(2024, 2, 29)), "20240229");
        assert_eq!(storage_key_for_day(987, 1, 5), Some("09870105".to_string()));
        assert_eq!(storage_key_for_day(2023, 2, 29), None);

        let month = Month::new(2024, 3).unwrap();
        assert_eq!(month.storage_key_for_day(9), Some("20240309".to_string()));
        assert_eq!(month.storage_key_for_day(32), None);
    }

    #[test]
    fn test_month_parse_and_display() {
        let month: Month = "2024-02".parse().unwrap();
        assert_eq!(month, Month::new(2024, 2).unwrap());
        assert_eq!(month.to_string(), "2024-02");
        assert!("2024-13".parse::<Month>().is_err());
        assert!("202402".parse::<Month>().is_err());
    }

    #[test]
    fn test_grid_february_2024() {
        // 2024-02-01 was a Thursday.
        let month = Month::new(2024, 2).unwrap();
        let grid = CalendarGrid::build(month, date(2024, 2, 14), |key| key == "20240210");

        assert_eq!(grid.leading_blanks, 4);
        assert_eq!(grid.cells.len(), 29);
        assert!(grid.cells[9].has_data);
        assert_eq!(grid.cells.iter().filter(|c| c.has_data).count(), 1);
        assert!(grid.cells[13].is_today);
        assert_eq!(grid.cells.iter().filter(|c| c.is_today).count(), 1);

        let rows = grid.rows();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == WEEK_DAYS));
        assert!(rows[0][3].is_none());
        assert_eq!(rows[0][4].map(|c| c.day), Some(1));
        assert_eq!(rows[4][4].map(|c| c.day), Some(29));
        assert!(rows[4][5].is_none());
    }

    #[test]
    fn test_grid_starting_sunday() {
        // 2023-10-01 was a Sunday.
        let month = Month::new(2023, 10).unwrap();
        let grid = CalendarGrid::build(month, date(2024, 1, 1), |_| false);

        assert_eq!(grid.leading_blanks, 0);
        assert!(grid.cells.iter().all(|c| !c.is_today && !c.has_data));
        assert_eq!(grid.rows()[0][0].map(|c| c.key.as_str()), Some("20231001"));
    }

    #[test]
    fn test_grid_json() {
        let month = Month::new(2024, 2).unwrap();
        let grid = CalendarGrid::build(month, date(2024, 2, 1), |_| false);
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["month"]["year"], 2024);
        assert_eq!(json["cells"][0]["key"], "20240201");
        assert_eq!(json["cells"][0]["is_today"], true);
    }
}
