//! Year/month/day selectors for due dates.
//!
//! The picker can only ever hold a valid calendar date: the day options
//! are regenerated from the real month length whenever the year or month
//! changes, and a day that no longer exists is clamped to the last one.

use chrono::{Datelike, Local, NaiveDate};

/// How many years past the current one the year selector offers.
pub const YEARS_AHEAD: i32 = 5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DateParseError {
    #[error("expected a date as YYYY-MM-DD, got `{0}`")]
    Malformed(String),
    #[error("`{0}` is not a calendar date")]
    Invalid(String),
}

/// Number of days in `month` of `year`, leap years included. Returns 0 for
/// a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return 0;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Splits an ISO `YYYY-MM-DD` string on `-`.
pub fn parse_iso(value: &str) -> Result<(i32, u32, u32), DateParseError> {
    let malformed = || DateParseError::Malformed(value.to_string());
    let mut parts = value.trim().split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let year = y.parse::<i32>().map_err(|_| malformed())?;
    let month = m.parse::<u32>().map_err(|_| malformed())?;
    let day = d.parse::<u32>().map_err(|_| malformed())?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(DateParseError::Invalid(value.to_string()));
    }
    Ok((year, month, day))
}

/// Option `delta` places away from `current` in `options` (zero-padded
/// numbers), wrapping at either end.
fn step_option(options: &[String], current: u32, delta: i32) -> Option<u32> {
    let pos = options
        .iter()
        .position(|o| o.parse::<u32>().ok() == Some(current))?;
    let next = (pos as i32 + delta).rem_euclid(options.len() as i32) as usize;
    options[next].parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePicker {
    years: Vec<i32>,
    year: i32,
    month: u32,
    day: u32,
}

impl DatePicker {
    /// Picker preselected on today's local date.
    pub fn today() -> Self {
        let today = Local::now().date_naive();
        Self::new(today, today.year())
    }

    /// Picker preselected on `date`, with the year window starting at
    /// `current_year`. A date outside the window still gets its year added
    /// to the options so it can be shown.
    pub fn new(date: NaiveDate, current_year: i32) -> Self {
        let mut years: Vec<i32> = (current_year..=current_year + YEARS_AHEAD).collect();
        if !years.contains(&date.year()) {
            years.push(date.year());
            years.sort_unstable();
        }
        Self {
            years,
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn from_iso(value: &str, current_year: i32) -> Result<Self, DateParseError> {
        let (year, month, day) = parse_iso(value)?;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DateParseError::Invalid(value.to_string()))?;
        Ok(Self::new(date, current_year))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn year_options(&self) -> &[i32] {
        &self.years
    }

    /// `"01"` through `"12"`.
    pub fn month_options(&self) -> Vec<String> {
        (1..=12).map(|m| format!("{m:02}")).collect()
    }

    /// One option per day of the selected month.
    pub fn day_options(&self) -> Vec<String> {
        (1..=days_in_month(self.year, self.month))
            .map(|d| format!("{d:02}"))
            .collect()
    }

    /// Ignored unless `year` is one of the options.
    pub fn set_year(&mut self, year: i32) {
        if self.years.contains(&year) {
            self.year = year;
            self.rebuild_days();
        }
    }

    /// Ignored unless `month` is in 1..=12.
    pub fn set_month(&mut self, month: u32) {
        if (1..=12).contains(&month) {
            self.month = month;
            self.rebuild_days();
        }
    }

    /// Ignored unless `day` exists in the selected month.
    pub fn set_day(&mut self, day: u32) {
        if (1..=days_in_month(self.year, self.month)).contains(&day) {
            self.day = day;
        }
    }

    /// Moves the year selection by `delta` options, stopping at either end.
    pub fn step_year(&mut self, delta: i32) {
        let pos = self.years.iter().position(|y| *y == self.year).unwrap_or(0) as i32;
        let last = self.years.len() as i32 - 1;
        let target = (pos + delta).clamp(0, last) as usize;
        self.set_year(self.years[target]);
    }

    /// Moves the month selection by `delta` options, wrapping within the year.
    pub fn step_month(&mut self, delta: i32) {
        if let Some(month) = step_option(&self.month_options(), self.month, delta) {
            self.set_month(month);
        }
    }

    /// Moves the day selection by `delta` options, wrapping within the month.
    pub fn step_day(&mut self, delta: i32) {
        if let Some(day) = step_option(&self.day_options(), self.day, delta) {
            self.set_day(day);
        }
    }

    /// Selection with its place among the options, e.g. `"2027 (2/6)"`.
    pub fn year_label(&self) -> String {
        let options = self.year_options();
        let pos = options.iter().position(|y| *y == self.year).unwrap_or(0);
        format!("{} ({}/{})", self.year, pos + 1, options.len())
    }

    /// `"02/12"`: month number over the number of month options.

    pub fn month_label(&self) -> String {
        format!("{:02}/{}", self.month, self.month_options().len())
    }

    pub fn day_label(&self) -> String {
        format!("{:02}/{}", self.day, self.day_options().len())
    }

    fn rebuild_days(&mut self) {
        let last = days_in_month(self.year, self.month);
        if self.day > last {
            self.day = last;
        }
    }

    pub fn date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).unwrap_or_default()
    }

    /// The selection as `YYYY-MM-DD`.
    pub fn compose(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_count_follows_calendar() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn day_options_match_month_length_for_every_month() {
        let mut picker = DatePicker::new(date(2024, 1, 1), 2024);
        for year in 2024..=2029 {
            picker.set_year(year);
            for month in 1..=12 {
                picker.set_month(month);
                let expected = date(year, month, 1)
                    .checked_add_months(chrono::Months::new(1))
                    .unwrap()
                    .signed_duration_since(date(year, month, 1))
                    .num_days() as usize;
                assert_eq!(picker.day_options().len(), expected, "{year}-{month}");
            }
        }
    }

    #[test]
    fn year_window_starts_at_current_year() {
        let picker = DatePicker::new(date(2026, 10, 18), 2026);
        assert_eq!(picker.year_options(), &[2026, 2027, 2028, 2029, 2030, 2031]);
        assert_eq!(picker.month_options()[0], "01");
        assert_eq!(picker.month_options()[11], "12");
    }

    #[test]
    fn past_due_date_keeps_its_year() {
        let picker = DatePicker::from_iso("2024-05-02", 2026).unwrap();
        assert_eq!(picker.year_options()[0], 2024);
        assert_eq!(picker.year(), 2024);
    }

    #[test]
    fn changing_month_keeps_valid_day_and_clamps_invalid() {
        let mut picker = DatePicker::new(date(2027, 1, 15), 2026);
        picker.set_month(2);
        assert_eq!(picker.day(), 15);

        let mut picker = DatePicker::new(date(2028, 3, 31), 2026);
        picker.set_month(2);
        assert_eq!(picker.day(), 29);
        picker.set_year(2027);
        assert_eq!(picker.day(), 28);
        assert_eq!(picker.day_options().len(), 28);
    }

    #[test]
    fn compose_then_parse_gives_back_components() {
        let picker = DatePicker::new(date(2026, 3, 1), 2026);
        let composed = picker.compose();
        assert_eq!(composed, "2026-03-01");
        assert_eq!(parse_iso(&composed).unwrap(), (2026, 3, 1));

        let reparsed = DatePicker::from_iso(&composed, 2026).unwrap();
        assert_eq!(reparsed, picker);
    }

    #[test]
    fn labels_show_selection_and_option_range() {
        let mut picker = DatePicker::new(date(2028, 2, 14), 2026);
        assert_eq!(picker.year_label(), "2028 (3/6)");
        assert_eq!(picker.month_label(), "02/12");
        assert_eq!(picker.day_label(), "14/29");
        picker.step_year(1);
        assert_eq!(picker.day_label(), "14/28");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse_iso("2025/03/01"), Err(DateParseError::Malformed(_))));
        assert!(matches!(parse_iso("2025-03-01-1"), Err(DateParseError::Malformed(_))));
        assert!(matches!(parse_iso("2025-02-30"), Err(DateParseError::Invalid(_))));
    }

    #[test]
    fn stepping_wraps_months_and_days_but_not_years() {
        let mut picker = DatePicker::new(date(2026, 12, 31), 2026);
        picker.step_month(1);
        assert_eq!((picker.month(), picker.day()), (1, 31));
        picker.step_day(1);
        assert_eq!(picker.day(), 1);
        picker.step_day(-1);
        assert_eq!(picker.day(), 31);
        picker.step_year(-1);
        assert_eq!(picker.year(), 2026);
        picker.step_year(10);
        assert_eq!(picker.year(), 2031);
    }
}
