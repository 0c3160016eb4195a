use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::dates::days_between;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    AsRefStr,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Day distances at which a task drops from one priority tier to the next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PriorityThresholds {
    /// Dates at most this many days away are `High`.
    pub high_within_days: i64,
    /// Dates at most this many days away (and not `High`) are `Medium`.
    pub medium_within_days: i64,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high_within_days: 1,
            medium_within_days: 3,
        }
    }
}

/// Maps the distance between `date` and `today` onto a priority tier.
///
/// Past dates count as negative distances and are therefore `High`. A missing
/// date is `Medium`.
///
/// # Examples
///
/// ```
/// # use chrono::NaiveDate;
/// # use riqi_core::priority::{derive_priority, Priority, PriorityThresholds};
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let t = PriorityThresholds::default();
///
/// assert_eq!(derive_priority(Some(today), today, t), Priority::High);
/// assert_eq!(derive_priority(NaiveDate::from_ymd_opt(2024, 1, 13), today, t), Priority::Medium);
/// assert_eq!(derive_priority(NaiveDate::from_ymd_opt(2024, 1, 20), today, t), Priority::Low);
/// assert_eq!(derive_priority(None, today, t), Priority::Medium);
/// ```
pub fn derive_priority(
    date: Option<NaiveDate>,
    today: NaiveDate,
    thresholds: PriorityThresholds,
) -> Priority {
    let Some(date) = date else {
        return Priority::Medium;
    };
    let diff = days_between(today, date);
    if diff <= thresholds.high_within_days {
        Priority::High
    } else if diff <= thresholds.medium_within_days {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn tiers_follow_day_distance() {
        let t = PriorityThresholds::default();
        let expected = [
            (-5, Priority::High),
            (0, Priority::High),
            (1, Priority::High),
            (2, Priority::Medium),
            (3, Priority::Medium),
            (4, Priority::Low),
            (30, Priority::Low),
        ];
        for (offset, priority) in expected {
            let date = today() + Duration::days(offset);
            assert_eq!(derive_priority(Some(date), today(), t), priority, "offset {offset}");
        }
    }

    #[test]
    fn later_dates_never_raise_priority() {
        let t = PriorityThresholds::default();
        let rank = |p: Priority| match p {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        };
        let mut previous = rank(Priority::High);
        for offset in 0..20 {
            let date = today() + Duration::days(offset);
            let current = rank(derive_priority(Some(date), today(), t));
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn custom_thresholds() {
        let t = PriorityThresholds {
            high_within_days: 0,
            medium_within_days: 7,
        };
        let tomorrow = today() + Duration::days(1);
        assert_eq!(derive_priority(Some(tomorrow), today(), t), Priority::Medium);
    }

    #[test]
    fn names_are_lowercase() {
        assert_eq!(Priority::High.as_ref(), "high");
        assert_eq!(Priority::Low.to_string(), "low");
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
    }
}
