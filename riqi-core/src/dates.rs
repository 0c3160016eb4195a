use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

/// Number of days from `from` until the next `target` weekday, counting `from` itself
/// as zero. Weeks start on Monday, so the result is always in `0..=6`.
///
/// # Examples
///
/// ```
/// # use chrono::{NaiveDate, Weekday};
/// # use riqi_core::dates::days_until_weekday;
/// // 2024-01-10 is a Wednesday
/// let wednesday = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
///
/// assert_eq!(days_until_weekday(wednesday, Weekday::Fri), 2);
/// assert_eq!(days_until_weekday(wednesday, Weekday::Wed), 0);
/// assert_eq!(days_until_weekday(wednesday, Weekday::Mon), 5);
/// assert_eq!(days_until_weekday(wednesday, Weekday::Sun), 4);
/// ```
pub fn days_until_weekday(from: NaiveDate, target: Weekday) -> i64 {
    let current = from.weekday().num_days_from_monday() as i64;
    let target = target.num_days_from_monday() as i64;
    (target - current + 7) % 7
}

/// The next `target` weekday on or after `from`.
pub fn next_weekday(from: NaiveDate, target: Weekday) -> NaiveDate {
    from + Duration::days(days_until_weekday(from, target))
}

/// Saturday of the week containing `date`, where weeks start on Sunday.
/// A Sunday therefore resolves to the Saturday six days later.
pub fn saturday_of_week(date: NaiveDate) -> NaiveDate {
    let from_sunday = date.weekday().num_days_from_sunday() as i64;
    date + Duration::days(6 - from_sunday)
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_day_of_month(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next_first) => next_first - Duration::days(1),
        None => date,
    }
}

/// Adds calendar months, clamping the day to the end of the target month
/// (`2024-01-31` plus one month is `2024-02-29`).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// `(year, month)` of the month after the one containing `date`.
pub fn next_month_of(date: NaiveDate) -> (i32, u32) {
    if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    }
}

/// Whole days from `from` to `to`; negative when `to` is in the past.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn next_weekday_is_never_in_the_past() {
        let anchor = d(2024, 1, 14); // Sunday
        for target in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let resolved = next_weekday(anchor, target);
            assert_eq!(resolved.weekday(), target);
            assert!(resolved >= anchor);
            assert!(days_between(anchor, resolved) < 7);
        }
    }

    #[test]
    fn sunday_is_the_last_day_of_the_week() {
        // Sunday to Monday crosses into the next week
        assert_eq!(next_weekday(d(2024, 1, 14), Weekday::Mon), d(2024, 1, 15));
        assert_eq!(next_weekday(d(2024, 1, 14), Weekday::Sun), d(2024, 1, 14));
    }

    #[test]
    fn saturday_of_current_week() {
        assert_eq!(saturday_of_week(d(2024, 1, 10)), d(2024, 1, 13)); // Wed
        assert_eq!(saturday_of_week(d(2024, 1, 13)), d(2024, 1, 13)); // Sat
        assert_eq!(saturday_of_week(d(2024, 1, 14)), d(2024, 1, 20)); // Sun
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(first_day_of_month(d(2024, 2, 17)), d(2024, 2, 1));
        assert_eq!(last_day_of_month(d(2024, 2, 17)), d(2024, 2, 29));
        assert_eq!(last_day_of_month(d(2023, 2, 1)), d(2023, 2, 28));
        assert_eq!(last_day_of_month(d(2024, 12, 5)), d(2024, 12, 31));
    }

    #[test]
    fn add_months_clamps() {
        assert_eq!(add_months(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
        assert_eq!(add_months(d(2024, 11, 15), 3), Some(d(2025, 2, 15)));
        assert_eq!(next_month_of(d(2024, 12, 3)), (2025, 1));
        assert_eq!(next_month_of(d(2024, 3, 3)), (2024, 4));
    }
}
