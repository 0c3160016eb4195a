use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::date_rules::DateRuleId;
use crate::keywords::Period;
use crate::offset::OffsetUnit;
use crate::priority::Priority;
use crate::time_rules::TimeRuleId;

/// Byte range `[start, end)` into the original input text. Always lies on
/// character boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl From<regex::Match<'_>> for Span {
    fn from(m: regex::Match<'_>) -> Self {
        Self::new(m.start(), m.end())
    }
}

/// Last character before byte offset `pos`.
pub(crate) fn char_before(text: &str, pos: usize) -> Option<char> {
    text.get(..pos).and_then(|head| head.chars().next_back())
}

/// First character at or after byte offset `pos`.
pub(crate) fn char_after(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|tail| tail.chars().next())
}

/// What the parser reads: the text and the moment it should treat as "now".
#[derive(Clone, Debug, PartialEq)]
pub struct ParseInput {
    pub text: String,
    pub now: NaiveDateTime,
}

impl ParseInput {
    pub fn new(text: impl Into<String>, now: Option<NaiveDateTime>) -> Self {
        Self {
            text: text.into(),
            now: now.unwrap_or_else(|| Local::now().naive_local()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateMatch {
    pub rule: DateRuleId,
    pub span: Span,
    pub date: NaiveDate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeMatch {
    pub rule: TimeRuleId,
    pub span: Span,
    pub time: NaiveTime,
    /// Period word applied to the hour, and where it was found. For period-prefixed
    /// matches the span lies inside `span`; otherwise it was found elsewhere in the text.
    pub period: Option<(Period, Span)>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OffsetMatch {
    pub amount: u32,
    pub unit: OffsetUnit,
    pub span: Span,
}

/// Everything extracted from one piece of text.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseResult {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    /// Always `true`: a text without date words resolves to today.
    pub has_date: bool,
    pub has_time: bool,
    pub priority: Priority,
    /// Whether the date came from the text rather than the default-to-today rule.
    pub explicit_date: bool,
    pub date_match: Option<DateMatch>,
    pub time_match: Option<TimeMatch>,
    pub offset_match: Option<OffsetMatch>,
}
