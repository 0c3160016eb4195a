use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::config::Config;
use crate::date_rules::{DateExtraction, DateRules, RuleContext};
use crate::error::ParseError;
use crate::keywords::Vocabulary;
use crate::offset::{OffsetRule, to_minute};
use crate::parsed_input::{DateMatch, OffsetMatch, ParseInput, ParseResult, Span, TimeMatch};
use crate::priority::{PriorityThresholds, derive_priority};
use crate::time_rules::TimeRules;
use crate::title::TitleBuilder;

static DEFAULT_PARSER: Lazy<Result<Parser, ParseError>> = Lazy::new(Parser::with_defaults);

/// Extracts a date, a time, a priority and a title from free-form Chinese text.
///
/// All rule tables are compiled once in [`Parser::new`] and never change
/// afterwards, so a single parser can be shared freely between threads.
pub struct Parser {
    vocabulary: Vocabulary,
    dates: DateRules,
    times: TimeRules,
    offsets: OffsetRule,
    titles: TitleBuilder,
    thresholds: PriorityThresholds,
    strict_dates: bool,
}

impl Parser {
    /// Builds every rule table from `config`, including its synonyms.
    pub fn new(config: &Config) -> Result<Self, ParseError> {
        let vocabulary = config.vocabulary();
        Ok(Self {
            dates: DateRules::new(&vocabulary)?,
            times: TimeRules::new(&vocabulary)?,
            offsets: OffsetRule::new()?,
            titles: TitleBuilder::new(&vocabulary)?,
            thresholds: config.priority_thresholds(),
            strict_dates: config.strict_dates,
            vocabulary,
        })
    }

    pub fn with_defaults() -> Result<Self, ParseError> {
        Self::new(&Config::default())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Parses `text` relative to `now`, or to the local clock when `now` is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chrono::{NaiveDate, NaiveTime};
    /// # use riqi_core::{Parser, Priority};
    /// let parser = Parser::with_defaults().unwrap();
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(8, 0, 0);
    ///
    /// let parsed = parser.parse("明天上午9点开会", now).unwrap();
    ///
    /// assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    /// assert_eq!(parsed.time, NaiveTime::from_hms_opt(9, 0, 0));
    /// assert_eq!(parsed.title, "开会");
    /// assert_eq!(parsed.priority, Priority::High);
    /// assert!(parsed.explicit_date);
    /// ```
    pub fn parse(&self, text: &str, now: Option<NaiveDateTime>) -> Result<ParseResult, ParseError> {
        self.parse_input(&ParseInput::new(text, now))
    }

    /// Parses a prepared [`ParseInput`].
    ///
    /// # Arguments
    ///
    /// * `input` - The text together with the moment treated as "now".
    ///
    /// # Returns
    ///
    /// The populated [`ParseResult`]. Its `date` is always set, falling back to
    /// the day of `input.now` when the text names none. Fails with
    /// [`ParseError::MalformedDate`] only when the parser runs with strict dates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chrono::{NaiveDate, NaiveTime};
    /// # use riqi_core::{ParseInput, Parser};
    /// let parser = Parser::with_defaults().unwrap();
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(8, 0, 0);
    ///
    /// let parsed = parser.parse_input(&ParseInput::new("明天3点后打电话", now)).unwrap();
    ///
    /// assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    /// assert_eq!(parsed.time, NaiveTime::from_hms_opt(3, 0, 0));
    /// assert_eq!(parsed.title, "打电话");
    /// ```
    pub fn parse_input(&self, input: &ParseInput) -> Result<ParseResult, ParseError> {
        let text = input.text.as_str();
        let ctx = RuleContext::new(input.now, &self.vocabulary);
        let mut consumed: Vec<Span> = Vec::new();

        let date_match = self.extract_date(text, &ctx, &mut consumed)?;

        let masked = match consumed.first() {
            Some(span) => mask(text, *span),
            None => text.to_string(),
        };
        let time_match = self
            .times
            .extract(&masked, text, !consumed.is_empty(), &self.vocabulary);
        if let Some(m) = &time_match {
            consumed.push(m.span);
            if let Some((_, period_span)) = m.period {
                consumed.push(period_span);
            }
        }

        let offset_match = self.offsets.extract(text);
        let offset_target = offset_match.and_then(|m| m.target(input.now));
        if let Some(m) = &offset_match {
            consumed.push(m.span);
        }

        let (date, explicit_date) = resolve_date(ctx.today, date_match, offset_target);
        let time = resolve_time(time_match, offset_match, offset_target);
        let title = self.titles.build(text, &consumed);
        let priority = derive_priority(Some(date), ctx.today, self.thresholds);

        debug!(%date, ?time, %priority, title = title.as_str(), "parsed");
        Ok(ParseResult {
            title,
            date,
            time,
            has_date: true,
            has_time: time.is_some(),
            priority,
            explicit_date,
            date_match,
            time_match,
            offset_match,
        })
    }

    /// Runs the date stage. A malformed literal is either an error or, in the
    /// lenient mode, a consumed span with no date.
    fn extract_date(
        &self,
        text: &str,
        ctx: &RuleContext<'_>,
        consumed: &mut Vec<Span>,
    ) -> Result<Option<DateMatch>, ParseError> {
        match self.dates.extract(text, ctx) {
            Some(DateExtraction::Found(m)) => {
                consumed.push(m.span);
                Ok(Some(m))
            }
            Some(DateExtraction::Malformed {
                rule,
                span,
                literal,
            }) => {
                if self.strict_dates {
                    return Err(ParseError::MalformedDate { literal });
                }
                warn!(rule = rule.as_ref(), literal = literal.as_str(), "malformed date, falling back to today");
                consumed.push(span);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

/// Parses with the built-in vocabulary and default configuration.
///
/// # Examples
///
/// ```
/// # use chrono::NaiveDate;
/// let now = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap().and_hms_opt(8, 0, 0);
/// let parsed = riqi_core::parse("25号交报告", now).unwrap();
/// assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
/// assert_eq!(parsed.title, "交报告");
/// ```
pub fn parse(text: &str, now: Option<NaiveDateTime>) -> Result<ParseResult, ParseError> {
    DEFAULT_PARSER.as_ref().map_err(Clone::clone)?.parse(text, now)
}

/// An offset wins over a date word; with neither, the date is today.
fn resolve_date(
    today: NaiveDate,
    date_match: Option<DateMatch>,
    offset_target: Option<NaiveDateTime>,
) -> (NaiveDate, bool) {
    match (offset_target, date_match) {
        (Some(target), _) => (target.date(), true),
        (None, Some(m)) => (m.date, true),
        (None, None) => (today, false),
    }
}

fn resolve_time(
    time_match: Option<TimeMatch>,
    offset_match: Option<OffsetMatch>,
    offset_target: Option<NaiveDateTime>,
) -> Option<NaiveTime> {
    match (time_match, offset_match, offset_target) {
        (Some(m), _, _) => Some(m.time),
        (None, Some(o), Some(target)) if o.unit.is_clock_unit() => Some(to_minute(target.time())),
        _ => None,
    }
}

/// Blanks `span` with ASCII spaces of the same byte length, so offsets into
/// the masked text stay valid for the original.
fn mask(text: &str, span: Span) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.extend(std::iter::repeat_n(' ', span.len()));
    out.push_str(&text[span.end..]);
    out
}
