//! Ordered date rules.
//!
//! Each rule pairs a pattern with an acceptance check and a resolver. Rules are
//! tried in table order and the first rule that produces a result wins; later
//! rules are not consulted, even if they would match earlier in the text.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use regex::{Captures, Regex};
use strum_macros::{AsRefStr, EnumIter};
use tracing::{debug, warn};

use crate::dates::{
    add_months, first_day_of_month, last_day_of_month, next_month_of, next_weekday,
    saturday_of_week,
};
use crate::keywords::{Keyword, Vocabulary};
use crate::numerals::{NUMERAL_CLASS, is_numeral, parse_number};
use crate::parsed_input::{DateMatch, Span, char_after, char_before};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum DateRuleId {
    RelativeDay,
    Weekday,
    YearMonthDay,
    MonthDay,
    ChineseMonthDay,
    NextWeekday,
    NextWeek,
    NextMonth,
    DayOfMonth,
    Holiday,
    MonthBoundary,
    Weekend,
}

/// What the resolvers may look at besides the matched text.
#[derive(Copy, Clone, Debug)]
pub struct RuleContext<'a> {
    pub now: NaiveDateTime,
    pub today: NaiveDate,
    pub vocabulary: &'a Vocabulary,
}

impl<'a> RuleContext<'a> {
    pub fn new(now: NaiveDateTime, vocabulary: &'a Vocabulary) -> Self {
        Self {
            now,
            today: now.date(),
            vocabulary,
        }
    }
}

/// Result of the date stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateExtraction {
    Found(DateMatch),
    /// A date literal was recognised but is not a valid calendar date (`2024-02-30`).
    Malformed {
        rule: DateRuleId,
        span: Span,
        literal: String,
    },
}

enum Outcome {
    Date(NaiveDate),
    Malformed,
}

type Accept = fn(&str, Span) -> bool;
type Resolve = fn(&Captures<'_>, &RuleContext<'_>) -> Option<Outcome>;

struct DateRule {
    id: DateRuleId,
    pattern: Regex,
    accept: Accept,
    resolve: Resolve,
}

impl DateRule {
    fn new(
        id: DateRuleId,
        pattern: &str,
        accept: Accept,
        resolve: Resolve,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            id,
            pattern: Regex::new(pattern)?,
            accept,
            resolve,
        })
    }

    fn first_match(&self, text: &str, ctx: &RuleContext<'_>) -> Option<DateExtraction> {
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let span = Span::from(whole);
            if !(self.accept)(text, span) {
                continue;
            }
            match (self.resolve)(&caps, ctx) {
                Some(Outcome::Date(date)) => {
                    debug!(rule = self.id.as_ref(), start = span.start, end = span.end, %date, "date rule matched");
                    return Some(DateExtraction::Found(DateMatch {
                        rule: self.id,
                        span,
                        date,
                    }));
                }
                Some(Outcome::Malformed) => {
                    return Some(DateExtraction::Malformed {
                        rule: self.id,
                        span,
                        literal: whole.as_str().to_string(),
                    });
                }
                None => continue,
            }
        }
        None
    }
}

const WEEK_WORD: &str = "(?:周|星期|礼拜)";
const WEEKDAY_CLASS: &str = "[一二三四五六日天]";

/// The date rule table, in evaluation order.
pub struct DateRules {
    rules: Vec<DateRule>,
}

impl DateRules {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        let relative = vocabulary.alternation(|k| k.day_offset().is_some());
        let holidays = vocabulary.alternation(Keyword::is_holiday);
        let boundaries = vocabulary.alternation(Keyword::is_month_boundary);
        let day = format!(r"(\d{{1,2}}|{NUMERAL_CLASS}{{1,3}})");

        let rules = vec![
            DateRule::new(
                DateRuleId::RelativeDay,
                &format!("({relative})"),
                always,
                resolve_relative_day,
            )?,
            DateRule::new(
                DateRuleId::Weekday,
                &format!("{WEEK_WORD}({WEEKDAY_CLASS})"),
                not_after_next,
                resolve_weekday,
            )?,
            DateRule::new(
                DateRuleId::YearMonthDay,
                r"(\d{4})[-/年](\d{1,2})[-/月](\d{1,2})[日号]?",
                not_after_digit,
                resolve_year_month_day,
            )?,
            DateRule::new(
                DateRuleId::MonthDay,
                r"(\d{1,2})[-/月](\d{1,2})[日号]?",
                not_after_digit,
                resolve_month_day,
            )?,
            DateRule::new(
                DateRuleId::ChineseMonthDay,
                &format!("(十[一二]|[一二三四五六七八九十])月{day}[日号]?"),
                not_after_numeral,
                resolve_chinese_month_day,
            )?,
            DateRule::new(
                DateRuleId::NextWeekday,
                &format!("下(下)?个?{WEEK_WORD}({WEEKDAY_CLASS})"),
                always,
                resolve_next_weekday,
            )?,
            DateRule::new(
                DateRuleId::NextWeek,
                "下(下)?(?:周|个?星期|个?礼拜)",
                not_before_weekend,
                resolve_next_week,
            )?,
            DateRule::new(
                DateRuleId::NextMonth,
                &format!("下个?月(?:{day}[号日]|([初底末]))?"),
                always,
                resolve_next_month,
            )?,
            DateRule::new(
                DateRuleId::DayOfMonth,
                r"(\d{1,2})[号日]",
                not_after_digit,
                resolve_day_of_month,
            )?,
            DateRule::new(
                DateRuleId::Holiday,
                &format!("({holidays})"),
                always,
                resolve_holiday,
            )?,
            DateRule::new(
                DateRuleId::MonthBoundary,
                &format!("({boundaries})"),
                always,
                resolve_month_boundary,
            )?,
            DateRule::new(DateRuleId::Weekend, "(下)?周末", always, resolve_weekend)?,
        ];

        Ok(Self { rules })
    }

    /// Runs the rules in order against `text` and returns the first hit.
    ///
    /// # Arguments
    ///
    /// * `text` - The task text, already normalised by the caller.
    /// * `ctx` - The reference moment and vocabulary the resolvers read.
    ///
    /// # Returns
    ///
    /// `Some(DateExtraction::Found(..))` for the first rule that matched and
    /// resolved, `Some(DateExtraction::Malformed { .. })` when that rule matched a
    /// literal naming an impossible date, and `None` when no rule matched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chrono::NaiveDate;
    /// # use riqi_core::date_rules::{DateExtraction, DateRuleId, DateRules, RuleContext};
    /// # use riqi_core::keywords::Vocabulary;
    /// let vocabulary = Vocabulary::builtin();
    /// let rules = DateRules::new(&vocabulary).unwrap();
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(8, 0, 0).unwrap();
    /// let ctx = RuleContext::new(now, &vocabulary);
    ///
    /// let Some(DateExtraction::Found(m)) = rules.extract("下个月底交房租", &ctx) else {
    ///     panic!("expected a date");
    /// };
    /// assert_eq!(m.rule, DateRuleId::NextMonth);
    /// assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    /// assert!(rules.extract("买牛奶", &ctx).is_none());
    /// ```
    pub fn extract(&self, text: &str, ctx: &RuleContext<'_>) -> Option<DateExtraction> {
        self.rules.iter().find_map(|rule| rule.first_match(text, ctx))
    }

    pub fn ids(&self) -> impl Iterator<Item = DateRuleId> + '_ {
        self.rules.iter().map(|rule| rule.id)
    }
}

fn always(_: &str, _: Span) -> bool {
    true
}

fn not_after_digit(text: &str, span: Span) -> bool {
    !char_before(text, span.start).is_some_and(|c| c.is_ascii_digit())
}

fn not_after_numeral(text: &str, span: Span) -> bool {
    !char_before(text, span.start).is_some_and(is_numeral)
}

/// `周五` inside `下周五` / `下个星期五` belongs to the next-week rule.
fn not_after_next(text: &str, span: Span) -> bool {
    let head = &text[..span.start];
    !(head.ends_with('下') || head.ends_with("下个"))
}

/// `下周` inside `下周末` belongs to the weekend rule.
fn not_before_weekend(text: &str, span: Span) -> bool {
    char_after(text, span.end) != Some('末')
}

fn weekday_from_char(c: char) -> Option<Weekday> {
    let weekday = match c {
        '一' => Weekday::Mon,
        '二' => Weekday::Tue,
        '三' => Weekday::Wed,
        '四' => Weekday::Thu,
        '五' => Weekday::Fri,
        '六' => Weekday::Sat,
        '日' | '天' => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn capture_weekday(caps: &Captures<'_>, group: usize) -> Option<Weekday> {
    caps.get(group)?.as_str().chars().next().and_then(weekday_from_char)
}

fn capture_number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    parse_number(caps.get(group)?.as_str())
}

fn literal(date: Option<NaiveDate>) -> Option<Outcome> {
    Some(match date {
        Some(date) => Outcome::Date(date),
        None => Outcome::Malformed,
    })
}

/// Counts the optional doubled `下` in group 1: `下周` is one week, `下下周` two.
fn weeks_ahead(caps: &Captures<'_>) -> i64 {
    if caps.get(1).is_some() { 2 } else { 1 }
}

fn resolve_relative_day(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let offset = ctx.vocabulary.lookup(caps.get(1)?.as_str())?.day_offset()?;
    Some(Outcome::Date(ctx.today + Duration::days(offset)))
}

fn resolve_weekday(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let weekday = capture_weekday(caps, 1)?;
    Some(Outcome::Date(next_weekday(ctx.today, weekday)))
}

fn resolve_year_month_day(caps: &Captures<'_>, _: &RuleContext<'_>) -> Option<Outcome> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month = capture_number(caps, 2)?;
    let day = capture_number(caps, 3)?;
    literal(NaiveDate::from_ymd_opt(year, month, day))
}

fn resolve_month_day(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let month = capture_number(caps, 1)?;
    let day = capture_number(caps, 2)?;
    literal(NaiveDate::from_ymd_opt(ctx.today.year(), month, day))
}

fn resolve_chinese_month_day(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let month = capture_number(caps, 1)?;
    let day = capture_number(caps, 2)?;
    let year = if month < ctx.today.month() {
        ctx.today.year() + 1
    } else {
        ctx.today.year()
    };
    literal(NaiveDate::from_ymd_opt(year, month, day))
}

fn resolve_next_weekday(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let weekday = capture_weekday(caps, 2)?;
    let date = next_weekday(ctx.today, weekday) + Duration::weeks(weeks_ahead(caps));
    Some(Outcome::Date(date))
}

fn resolve_next_week(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    Some(Outcome::Date(ctx.today + Duration::weeks(weeks_ahead(caps))))
}

/// `下个月15号`, `下个月底`/`下月初`, or plain `下个月` (same day next month, clamped).
fn resolve_next_month(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let (year, month) = next_month_of(ctx.today);
    match (caps.get(1), caps.get(2)) {
        (Some(_), _) => {
            let day = capture_number(caps, 1)?;
            literal(NaiveDate::from_ymd_opt(year, month, day))
        }
        (None, Some(boundary)) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1)?;
            let date = match boundary.as_str() {
                "初" => first,
                _ => last_day_of_month(first),
            };
            Some(Outcome::Date(date))
        }
        (None, None) => add_months(ctx.today, 1).map(Outcome::Date),
    }
}

fn resolve_day_of_month(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let day = capture_number(caps, 1)?;
    let (year, month) = if day < ctx.today.day() {
        next_month_of(ctx.today)
    } else {
        (ctx.today.year(), ctx.today.month())
    };
    literal(NaiveDate::from_ymd_opt(year, month, day))
}

fn resolve_holiday(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let word = caps.get(1)?.as_str();
    let keyword = ctx.vocabulary.lookup(word)?;
    if let Some((month, day)) = keyword.solar_date() {
        let this_year = NaiveDate::from_ymd_opt(ctx.today.year(), month, day)?;
        if this_year >= ctx.today {
            return Some(Outcome::Date(this_year));
        }
        return NaiveDate::from_ymd_opt(ctx.today.year() + 1, month, day).map(Outcome::Date);
    }
    warn!(holiday = word, "no lunar calendar table, resolving holiday to today");
    Some(Outcome::Date(ctx.today))
}

fn resolve_month_boundary(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let date = match ctx.vocabulary.lookup(caps.get(1)?.as_str())? {
        Keyword::MonthStart => first_day_of_month(ctx.today),
        Keyword::MonthEnd => last_day_of_month(ctx.today),
        _ => return None,
    };
    Some(Outcome::Date(date))
}

fn resolve_weekend(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<Outcome> {
    let saturday = saturday_of_week(ctx.today);
    let weeks = if caps.get(1).is_some() { 1 } else { 0 };
    Some(Outcome::Date(saturday + Duration::weeks(weeks)))
}
