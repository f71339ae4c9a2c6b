//! Business-day calendar: Monday to Friday, no holidays.

use chrono::{Datelike, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first business day strictly after `date`.
pub fn next_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut day = date.succ_opt()?;
    while !is_business_day(day) {
        day = day.succ_opt()?;
    }
    Some(day)
}

/// `count` consecutive business days starting after `last`.
///
/// `None` only if the range runs off the end of the supported calendar.
pub fn business_days_after(last: NaiveDate, count: usize) -> Option<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(count);
    let mut day = last;
    while dates.len() < count {
        day = next_business_day(day)?;
        dates.push(day);
    }
    Some(dates)
}
