//! Date helpers

use chrono::{Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed number of days from `d2` to `d1` (positive when `d1` is later).
pub fn days_between(d1: &NaiveDate, d2: &NaiveDate) -> i64 {
    (*d1 - *d2).num_days()
}

/// `Thursday, January 31 2019`
pub fn format_full_readable(date: &NaiveDate) -> String {
    date.format("%A, %B %-d %Y").to_string()
}

/// RGB color for a distance in days: green when close, red when far.
pub fn distance_color(days: i64) -> (u8, u8, u8) {
    let red = ((1.0 + days.unsigned_abs() as f64).ln() / 0.02174)
        .max(0.0)
        .min(255.0)
        .round() as u8;
    (red, 255 - red, 0)
}

/// `rgb(R, G, B)` string for [`distance_color`]
pub fn distance_color_css(days: i64) -> String {
    let (r, g, b) = distance_color(days);
    format!("rgb({}, {}, {})", r, g, b)
}
