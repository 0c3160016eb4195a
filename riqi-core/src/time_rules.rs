//! Ordered time-of-day rules and the two-stage time resolver.

use chrono::NaiveTime;
use regex::{Captures, Regex};
use strum_macros::{AsRefStr, EnumIter};
use tracing::debug;

use crate::keywords::{Period, Vocabulary};
use crate::numerals::{NUMERAL_CLASS, is_numeral, parse_number};
use crate::parsed_input::{Span, TimeMatch, char_before};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum TimeRuleId {
    /// `14:30`
    Clock,
    /// `9点30分`, `9点30`, `九点十分`
    HourMinute,
    /// `9点`, `9时`, `九点`, `3点后`
    Hour,
    /// `下午3点`, `晚上8`, `下午三点`
    PeriodHour,
    /// `3点半`, `3点一刻`, `三时三刻`
    HalfQuarter,
}

impl TimeRuleId {
    /// Rules that read Chinese hour words, in the order the full-text pass tries them.
    const CHINESE_HOUR: [TimeRuleId; 4] = [
        TimeRuleId::HourMinute,
        TimeRuleId::Hour,
        TimeRuleId::HalfQuarter,
        TimeRuleId::PeriodHour,
    ];
}

/// Hour and minute as read, before any period conversion.
struct Reading {
    hour: u32,
    minute: u32,
    /// Period named inside the match itself.
    period: Option<(Period, Span)>,
    /// Whether a period word elsewhere in the text may shift the hour.
    convertible: bool,
}

type Accept = fn(&str, Span) -> bool;
type Read = fn(&Captures<'_>, &Vocabulary) -> Option<Reading>;

struct TimeRule {
    id: TimeRuleId,
    pattern: Regex,
    accept: Accept,
    read: Read,
}

impl TimeRule {
    fn new(id: TimeRuleId, pattern: &str, accept: Accept, read: Read) -> Result<Self, regex::Error> {
        Ok(Self {
            id,
            pattern: Regex::new(pattern)?,
            accept,
            read,
        })
    }

    /// First accepted match in `haystack`. Period words are looked up in `original`.
    fn first_match(
        &self,
        haystack: &str,
        original: &str,
        vocabulary: &Vocabulary,
    ) -> Option<TimeMatch> {
        for caps in self.pattern.captures_iter(haystack) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let span = Span::from(whole);
            if !(self.accept)(haystack, span) {
                continue;
            }
            let Some(reading) = (self.read)(&caps, vocabulary) else {
                continue;
            };

            let period = match reading.period {
                Some(period) => Some(period),
                None if reading.convertible => vocabulary.find_period(original),
                None => None,
            };
            let hour = match period {
                Some((p, _)) => p.to_24h(reading.hour),
                None => reading.hour,
            };
            let Some(time) = NaiveTime::from_hms_opt(hour, reading.minute, 0) else {
                continue;
            };

            debug!(rule = self.id.as_ref(), start = span.start, end = span.end, %time, "time rule matched");
            return Some(TimeMatch {
                rule: self.id,
                span,
                time,
                period,
            });
        }
        None
    }
}

/// The time rule table, in evaluation order.
pub struct TimeRules {
    rules: Vec<TimeRule>,
}

impl TimeRules {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        let periods = vocabulary.alternation(|k| k.period().is_some() && k.day_offset().is_none());
        let hour = format!(r"(\d{{1,2}}|{NUMERAL_CLASS}{{1,3}})");
        let rules = vec![
            TimeRule::new(
                TimeRuleId::Clock,
                r"(\d{1,2})[:：](\d{2})",
                not_after_digit,
                read_clock,
            )?,
            TimeRule::new(
                TimeRuleId::HourMinute,
                &format!(r"{hour}点(?:(\d{{1,2}})分?|({NUMERAL_CLASS}{{1,3}})分)"),
                hour_start,
                read_hour_minute,
            )?,
            TimeRule::new(
                TimeRuleId::Hour,
                &format!("{hour}(?:点钟?|时)(?:以?后)?"),
                bare_hour,
                read_hour,
            )?,
            TimeRule::new(
                TimeRuleId::PeriodHour,
                &format!(r"({periods})\s*(?:(\d{{1,2}})(?:点钟?|时)?|({NUMERAL_CLASS}{{1,3}})(?:点钟?|时))"),
                no_minutes_follow,
                read_period_hour,
            )?,
            TimeRule::new(
                TimeRuleId::HalfQuarter,
                &format!("{hour}[点时](半|一刻|三刻|刻)"),
                hour_start,
                read_half_quarter,
            )?,
        ];
        Ok(Self { rules })
    }

    /// Two-stage time extraction.
    ///
    /// Stage one runs every rule against `masked`, the text with the date span
    /// blanked out. If nothing matched there and a date was found, stage two runs
    /// the Chinese hour rules against the full `original` text, which recovers an
    /// hour the date match swallowed.
    pub fn extract(
        &self,
        masked: &str,
        original: &str,
        date_found: bool,
        vocabulary: &Vocabulary,
    ) -> Option<TimeMatch> {
        self.scan(masked, original, vocabulary).or_else(|| {
            if date_found {
                self.scan_chinese_hours(original, vocabulary)
            } else {
                None
            }
        })
    }

    fn scan(&self, haystack: &str, original: &str, vocabulary: &Vocabulary) -> Option<TimeMatch> {
        self.rules
            .iter()
            .find_map(|rule| rule.first_match(haystack, original, vocabulary))
    }

    fn scan_chinese_hours(&self, original: &str, vocabulary: &Vocabulary) -> Option<TimeMatch> {
        TimeRuleId::CHINESE_HOUR.iter().find_map(|id| {
            self.rules
                .iter()
                .find(|rule| rule.id == *id)
                .and_then(|rule| rule.first_match(original, original, vocabulary))
        })
    }
}

fn not_after_digit(text: &str, span: Span) -> bool {
    !char_before(text, span.start).is_some_and(|c| c.is_ascii_digit())
}

/// Words that read `一点` as "a little" (`早一点`, `快一点`), not as one o'clock.
const DEGREE_WORDS: &str = "早晚快慢多少好再稍差大小高低近远有";

/// The match starts a fresh hour: not the tail of a longer number, not the
/// numeral of a weekday (`周三点名`), and not `一点` meaning "a little".
fn hour_start(text: &str, span: Span) -> bool {
    let before = char_before(text, span.start);
    if before.is_some_and(|c| c.is_ascii_digit() || is_numeral(c)) {
        return false;
    }
    let matched = &text[span.start..span.end];
    let spelled = matched.starts_with(is_numeral);
    if spelled && before.is_some_and(|c| "周期拜".contains(c)) {
        return false;
    }
    !(matched.starts_with("一点") && before.is_some_and(|c| DEGREE_WORDS.contains(c)))
}

/// The hour is not followed by minutes, `半` or `刻`, which other rules read in full.
fn no_minutes_follow(text: &str, span: Span) -> bool {
    let tail = &text[span.end..];
    !(tail.starts_with(|c: char| c.is_ascii_digit() || c == '半' || c == '刻')
        || tail.starts_with("一刻")
        || tail.starts_with("三刻"))
}

/// `3时后` is a relative offset. `3点后` still reads as three o'clock.
fn not_offset(text: &str, span: Span) -> bool {
    let matched = &text[span.start..span.end];
    !(matched.contains('时') && matched.ends_with('后'))
}

fn bare_hour(text: &str, span: Span) -> bool {
    hour_start(text, span) && no_minutes_follow(text, span) && not_offset(text, span)
}

/// Reads a capture written in digits or Chinese numerals.
fn capture_number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    parse_number(caps.get(group)?.as_str())
}

fn read_clock(caps: &Captures<'_>, _: &Vocabulary) -> Option<Reading> {
    let hour = capture_number(caps, 1)?;
    let minute = capture_number(caps, 2)?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(Reading {
        hour,
        minute,
        period: None,
        convertible: false,
    })
}

fn read_hour_minute(caps: &Captures<'_>, _: &Vocabulary) -> Option<Reading> {
    let hour = capture_number(caps, 1)?;
    let minute = capture_number(caps, 2).or_else(|| capture_number(caps, 3))?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(Reading {
        hour,
        minute,
        period: None,
        convertible: true,
    })
}

fn read_hour(caps: &Captures<'_>, _: &Vocabulary) -> Option<Reading> {
    let hour = capture_number(caps, 1)?;
    if hour > 23 {
        return None;
    }
    Some(Reading {
        hour,
        minute: 0,
        period: None,
        convertible: true,
    })
}

fn read_period_hour(caps: &Captures<'_>, vocabulary: &Vocabulary) -> Option<Reading> {
    let word = caps.get(1)?;
    let period = vocabulary.lookup(word.as_str())?.period()?;
    let hour = capture_number(caps, 2).or_else(|| capture_number(caps, 3))?;
    if hour > 23 {
        return None;
    }
    Some(Reading {
        hour,
        minute: 0,
        period: Some((period, Span::from(word))),
        convertible: true,
    })
}

fn read_half_quarter(caps: &Captures<'_>, _: &Vocabulary) -> Option<Reading> {
    let hour = capture_number(caps, 1)?;
    if hour > 23 {
        return None;
    }
    let minute = match caps.get(2)?.as_str() {
        "半" => 30,
        "三刻" => 45,
        _ => 15,
    };
    Some(Reading {
        hour,
        minute,
        period: None,
        convertible: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn extract(text: &str) -> Option<TimeMatch> {
        let vocab = Vocabulary::builtin();
        let rules = TimeRules::new(&vocab).unwrap();
        rules.extract(text, text, false, &vocab)
    }

    fn time_of(text: &str) -> NaiveTime {
        extract(text)
            .unwrap_or_else(|| panic!("no time in {text:?}"))
            .time
    }

    #[test]
    fn clock_literal() {
        let m = extract("2024-03-15 14:30 会议").unwrap();
        assert_eq!(m.rule, TimeRuleId::Clock);
        assert_eq!(m.time, t(14, 30));
        assert_eq!(time_of("8：05出门"), t(8, 5));
    }

    #[test]
    fn clock_literal_is_not_period_shifted() {
        assert_eq!(time_of("下午 3:30 开会"), t(3, 30));
    }

    #[test]
    fn invalid_clock_falls_through() {
        assert!(extract("25:61").is_none());
    }

    #[test]
    fn hour_and_minutes() {
        let m = extract("9点30分开会").unwrap();
        assert_eq!(m.rule, TimeRuleId::HourMinute);
        assert_eq!(m.time, t(9, 30));
        assert_eq!(time_of("10点5去接人"), t(10, 5));
    }

    #[test]
    fn bare_hour() {
        let m = extract("9点开会").unwrap();
        assert_eq!(m.rule, TimeRuleId::Hour);
        assert_eq!(m.time, t(9, 0));
        assert_eq!(time_of("7点钟起床"), t(7, 0));
        assert_eq!(time_of("8时出发"), t(8, 0));
    }

    #[test]
    fn period_word_anywhere_shifts_the_hour() {
        let m = extract("下午开会3点").unwrap();
        assert_eq!(m.time, t(15, 0));
        let (period, span) = m.period.unwrap();
        assert_eq!(period, Period::Afternoon);
        assert_eq!(span, Span::new(0, 6));

        assert_eq!(time_of("晚上8点看电影"), t(20, 0));
        assert_eq!(time_of("上午12点"), t(0, 0));
        assert_eq!(time_of("中午12点吃饭"), t(12, 0));
        assert_eq!(time_of("今晚9点"), t(21, 0));
    }

    #[test]
    fn period_prefixed_hour_without_dian() {
        let m = extract("下午3开会").unwrap();
        assert_eq!(m.rule, TimeRuleId::PeriodHour);
        assert_eq!(m.time, t(15, 0));
        assert_eq!(m.span, Span::new(0, 7));
    }

    #[test]
    fn half_and_quarter_hours() {
        let m = extract("3点半").unwrap();
        assert_eq!(m.rule, TimeRuleId::HalfQuarter);
        assert_eq!(m.time, t(3, 30));
        assert_eq!(time_of("下午4点半"), t(16, 30));
        assert_eq!(time_of("8时一刻"), t(8, 15));
        assert_eq!(time_of("8点刻"), t(8, 15));
        assert_eq!(time_of("8点三刻"), t(8, 45));
    }

    #[test]
    fn no_time_words() {
        assert!(extract("买牛奶").is_none());
        assert!(extract("3小时后开会").is_none());
        assert!(extract("3时后开会").is_none());
        assert!(extract("三时以后开会").is_none());
        assert!(extract("25点").is_none());
    }

    #[test]
    fn dian_followed_by_hou_is_still_an_hour() {
        let m = extract("3点后打电话").unwrap();
        assert_eq!(m.rule, TimeRuleId::Hour);
        assert_eq!(m.time, t(3, 0));
        assert_eq!(m.span, Span::new(0, 7));
        assert_eq!(time_of("下午5点以后回电"), t(17, 0));
    }

    #[test]
    fn hours_in_chinese_numerals() {
        let m = extract("上午九点开会").unwrap();
        assert_eq!(m.rule, TimeRuleId::Hour);
        assert_eq!(m.time, t(9, 0));
        assert_eq!(time_of("十二点吃饭"), t(12, 0));
        assert_eq!(time_of("下午三点"), t(15, 0));
        assert_eq!(time_of("晚上十一点"), t(23, 0));
        assert_eq!(time_of("九点十分"), t(9, 10));
        assert_eq!(time_of("九点三刻"), t(9, 45));
        assert_eq!(time_of("两点半"), t(2, 30));
        assert_eq!(time_of("下午两点"), t(14, 0));
    }

    #[test]
    fn numerals_that_are_not_hours() {
        assert!(extract("早一点出发").is_none());
        assert!(extract("快一点完成").is_none());
        assert!(extract("上午一起开会").is_none());
        assert!(extract("周三点名").is_none());
    }

    #[test]
    fn second_stage_reads_the_original_text() {
        let vocab = Vocabulary::builtin();
        let rules = TimeRules::new(&vocab).unwrap();
        let original = "明天9点";
        // The first stage sees everything blanked out.
        let masked = " ".repeat(original.len());

        assert!(rules.extract(&masked, original, false, &vocab).is_none());
        let m = rules.extract(&masked, original, true, &vocab).unwrap();
        assert_eq!(m.time, t(9, 0));
        assert_eq!(m.rule, TimeRuleId::Hour);
    }
}
