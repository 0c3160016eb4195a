use chrono::{Duration, Months, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use strum_macros::{AsRefStr, EnumIter};
use tracing::debug;

use crate::numerals::{NUMERAL_CLASS, parse_number};
use crate::parsed_input::{OffsetMatch, Span, char_before};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum OffsetUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl OffsetUnit {
    fn from_word(word: &str) -> Option<Self> {
        let unit = match word.trim_start_matches('个') {
            "分钟" => OffsetUnit::Minute,
            "小时" | "钟头" | "时" => OffsetUnit::Hour,
            "天" => OffsetUnit::Day,
            "周" | "星期" | "礼拜" => OffsetUnit::Week,
            "月" => OffsetUnit::Month,
            _ => return None,
        };
        Some(unit)
    }

    /// Units fine enough to also decide the time of day.
    pub fn is_clock_unit(self) -> bool {
        matches!(self, OffsetUnit::Minute | OffsetUnit::Hour)
    }

    /// `now` moved forward by `amount` of this unit. Months are calendar months,
    /// clamped to the end of the target month.
    pub fn apply(self, amount: u32, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let amount_i = i64::from(amount);
        match self {
            OffsetUnit::Minute => now.checked_add_signed(Duration::minutes(amount_i)),
            OffsetUnit::Hour => now.checked_add_signed(Duration::hours(amount_i)),
            OffsetUnit::Day => now.checked_add_signed(Duration::days(amount_i)),
            OffsetUnit::Week => now.checked_add_signed(Duration::weeks(amount_i)),
            OffsetUnit::Month => now.checked_add_months(Months::new(amount)),
        }
    }
}

impl OffsetMatch {
    /// The moment this offset points at, counted from `now`.
    pub fn target(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.unit.apply(self.amount, now)
    }
}

/// Drops seconds and sub-second precision.
pub fn to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Recognises "N units later" idioms: `3小时后`, `2天后`, `1周后`, `两个月后`,
/// `30分钟以后`, `半小时后`.
pub struct OffsetRule {
    pattern: Regex,
}

impl OffsetRule {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(\d{{1,4}}|{NUMERAL_CLASS}{{1,3}}|半)\s*(个?小时|个?钟头|分钟|个月|个?星期|个?礼拜|时|天|周)以?后"
        ))?;
        Ok(Self { pattern })
    }

    pub fn extract(&self, text: &str) -> Option<OffsetMatch> {
        for caps in self.pattern.captures_iter(text) {
            let (Some(whole), Some(amount), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if char_before(text, whole.start()).is_some_and(|c| c.is_ascii_digit()) {
                continue;
            }
            let Some(unit) = OffsetUnit::from_word(unit.as_str()) else {
                continue;
            };
            let (amount, unit) = match (amount.as_str(), unit) {
                ("半", OffsetUnit::Hour) => (30, OffsetUnit::Minute),
                ("半", _) => continue,
                (n, unit) => match parse_number(n) {
                    Some(n) if n > 0 => (n, unit),
                    _ => continue,
                },
            };

            let span = Span::from(whole);
            debug!(amount, unit = unit.as_ref(), start = span.start, end = span.end, "offset matched");
            return Some(OffsetMatch { amount, unit, span });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(22, 15, 42)
            .unwrap()
    }

    fn extract(text: &str) -> Option<OffsetMatch> {
        OffsetRule::new().unwrap().extract(text)
    }

    #[test]
    fn recognises_units() {
        let cases = [
            ("3小时后开会", 3, OffsetUnit::Hour),
            ("3时后", 3, OffsetUnit::Hour),
            ("2个钟头后", 2, OffsetUnit::Hour),
            ("2天后提交报告", 2, OffsetUnit::Day),
            ("1周后项目评审", 1, OffsetUnit::Week),
            ("两个星期后", 2, OffsetUnit::Week),
            ("3个月后复查", 3, OffsetUnit::Month),
            ("30分钟后", 30, OffsetUnit::Minute),
            ("十天以后", 10, OffsetUnit::Day),
            ("半小时后出门", 30, OffsetUnit::Minute),
        ];
        for (text, amount, unit) in cases {
            let m = extract(text).unwrap_or_else(|| panic!("no offset in {text:?}"));
            assert_eq!((m.amount, m.unit), (amount, unit), "{text}");
        }
    }

    #[test]
    fn span_covers_the_idiom() {
        let text = "记得3小时后开会";
        let m = extract(text).unwrap();
        assert_eq!(&text[m.span.start..m.span.end], "3小时后");
    }

    #[test]
    fn zero_and_missing_amounts_do_not_match() {
        assert!(extract("0天后").is_none());
        assert!(extract("半天后").is_none());
        assert!(extract("天后").is_none());
        assert!(extract("明天开会").is_none());
    }

    #[test]
    fn apply_moves_forward() {
        let n = now();
        assert_eq!(
            OffsetUnit::Hour.apply(3, n),
            NaiveDate::from_ymd_opt(2024, 1, 11)
                .unwrap()
                .and_hms_opt(1, 15, 42)
        );
        assert_eq!(
            OffsetUnit::Month.apply(1, n).map(|t| t.date()),
            NaiveDate::from_ymd_opt(2024, 2, 10)
        );
        assert_eq!(
            OffsetUnit::Week.apply(2, n).map(|t| t.date()),
            NaiveDate::from_ymd_opt(2024, 1, 24)
        );
        assert!(OffsetUnit::Minute.is_clock_unit());
        assert!(!OffsetUnit::Day.is_clock_unit());
    }

    #[test]
    fn minute_truncation() {
        let t = NaiveTime::from_hms_opt(1, 15, 42).unwrap();
        assert_eq!(to_minute(t), NaiveTime::from_hms_opt(1, 15, 0).unwrap());
    }
}
