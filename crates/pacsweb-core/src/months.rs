//! Calendar month arithmetic used by the evolution reports

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month of the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

/// All months in calendar order
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

impl Month {
    /// Zero based index (January is 0)
    pub fn index(&self) -> u32 {
        *self as u32
    }

    pub fn from_index(index: u32) -> Option<Month> {
        MONTHS.get(index as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Month {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        month_index(s)
            .and_then(Month::from_index)
            .ok_or_else(|| format!("Unkown month {:?}", s))
    }
}

/// Index of a month name, `None` for unknown names
pub fn month_index(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| m.name().eq_ignore_ascii_case(name.trim()))
        .map(|i| i as u32)
}

/// A month of a given year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub month: Month,
    pub year: i32,
}

/// First and last day of a month, both inclusive
pub type Period = (NaiveDate, NaiveDate);

impl YearMonth {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// `November/2018`
    pub fn to_label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }

    /// Monotonic number used to order months
    pub fn as_number(&self) -> i64 {
        self.year as i64 * 12 + self.month.index() as i64
    }

    fn from_number(n: i64) -> Option<Self> {
        let year = i32::try_from(n.div_euclid(12)).ok()?;
        let month = Month::from_index(n.rem_euclid(12) as u32)?;
        Some(Self { month, year })
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.as_number() + 1)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.index() + 1, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next()?.first_day()?.pred_opt()
    }

    /// `[first day, last day]` of the month
    pub fn to_period(&self) -> Option<Period> {
        Some((self.first_day()?, self.last_day()?))
    }

    /// The month a period starts in
    pub fn from_period(period: &Period) -> Option<Self> {
        Self::from_date(&period.0)
    }

    pub fn from_date(date: &NaiveDate) -> Option<Self> {
        Some(Self {
            month: Month::from_index(date.month0())?,
            year: date.year(),
        })
    }
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_number().cmp(&other.as_number())
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_label())
    }
}

impl std::str::FromStr for YearMonth {
    type Err = String;
    /// Parses `November/2018`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, year) = s
            .split_once('/')
            .ok_or_else(|| format!("Expected <Month>/<Year>, found {:?}", s))?;
        let year = year
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid year {:?}", year))?;
        Ok(Self {
            month: month.parse()?,
            year,
        })
    }
}

/// Every month from `start` to `end`, both inclusive. Empty if `start > end`.
pub fn months_between(start: &YearMonth, end: &YearMonth) -> Vec<YearMonth> {
    (start.as_number()..=end.as_number())
        .filter_map(YearMonth::from_number)
        .collect()
}
