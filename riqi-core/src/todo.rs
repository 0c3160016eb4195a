use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::parse_input::Parser;
use crate::parsed_input::ParseResult;
use crate::priority::Priority;

pub const DEFAULT_CATEGORY: &str = "general";
pub const PARSED_BY_RULES: &str = "rules";

/// Task-creation payload derived from one parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    pub title: String,
    pub due_date: NaiveDate,
    pub due_time: Option<NaiveTime>,
    pub priority: Priority,
    pub category: String,
    pub description: String,
    pub raw_text: String,
    pub parsed_by: String,
}

impl TodoDraft {
    /// Parses `text` into a draft. `None` is rejected; an empty string is a
    /// valid (if untitled) task.
    pub fn from_text(
        parser: &Parser,
        text: Option<&str>,
        now: Option<NaiveDateTime>,
    ) -> Result<Self, ParseError> {
        let text = text.ok_or_else(|| ParseError::InvalidInput("missing task text".to_string()))?;
        let parsed = parser.parse(text, now)?;
        Ok(Self::from_parsed(&parsed, text))
    }

    pub fn from_parsed(parsed: &ParseResult, raw_text: &str) -> Self {
        Self {
            title: parsed.title.clone(),
            due_date: parsed.date,
            due_time: parsed.time,
            priority: parsed.priority,
            category: DEFAULT_CATEGORY.to_string(),
            description: String::new(),
            raw_text: raw_text.to_string(),
            parsed_by: PARSED_BY_RULES.to_string(),
        }
    }
}
