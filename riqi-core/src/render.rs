//! Plain-text rendering of parse results.
//!
//! Short form:  `2024-01-11 09:00 [high] 开会`
//! Long form:   one `label: value` line per field.

use chrono::{NaiveDate, NaiveTime};

use crate::parsed_input::ParseResult;

/// Placeholder printed when the text named no time of day.
pub const NO_TIME: &str = "--:--";

pub fn format_date(date: NaiveDate, date_format: &str) -> String {
    date.format(date_format).to_string()
}

pub fn format_time(time: Option<NaiveTime>, time_format: &str) -> String {
    match time {
        Some(t) => t.format(time_format).to_string(),
        None => NO_TIME.to_string(),
    }
}

/// `2024-01-11 09:00 [high] 开会`
pub fn format_result_line(result: &ParseResult, date_format: &str, time_format: &str) -> String {
    format!(
        "{} {} [{}] {}",
        format_date(result.date, date_format),
        format_time(result.time, time_format),
        result.priority,
        result.title
    )
}

/// Field-per-line rendering, including which rules fired.
pub fn format_result_block(result: &ParseResult, date_format: &str, time_format: &str) -> String {
    let date_source = match (&result.offset_match, &result.date_match) {
        (Some(m), _) => format!("offset {}{}", m.amount, m.unit.as_ref()),
        (None, Some(m)) => m.rule.as_ref().to_string(),
        (None, None) => "default".to_string(),
    };
    let time_source = result
        .time_match
        .map(|m| m.rule.as_ref().to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "title:    {}\ndate:     {} ({})\ntime:     {} ({})\npriority: {}\n",
        result.title,
        format_date(result.date, date_format),
        date_source,
        format_time(result.time, time_format),
        time_source,
        result.priority,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn parse(text: &str) -> ParseResult {
        let now = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0);
        Parser::with_defaults().unwrap().parse(text, now).unwrap()
    }

    #[test]
    fn line_with_time() {
        let s = format_result_line(&parse("明天上午9点开会"), "%Y-%m-%d", "%H:%M");
        assert_eq!(s, "2024-01-11 09:00 [high] 开会");
    }

    #[test]
    fn line_without_time() {
        let s = format_result_line(&parse("25号交报告"), "%Y-%m-%d", "%H:%M");
        assert_eq!(s, "2024-01-25 --:-- [low] 交报告");
    }

    #[test]
    fn custom_formats() {
        let s = format_result_line(&parse("明天上午9点开会"), "%m/%d", "%H时%M分");
        assert_eq!(s, "01/11 09时00分 [high] 开会");
    }

    #[test]
    fn block_names_rules() {
        let s = format_result_block(&parse("下周五下午3点汇报"), "%Y-%m-%d", "%H:%M");
        assert!(s.contains("date:     2024-01-19 (next-weekday)"));
        assert!(s.contains("time:     15:00 (hour)"));
        assert!(s.contains("priority: low"));

        let s = format_result_block(&parse("买牛奶"), "%Y-%m-%d", "%H:%M");
        assert!(s.contains("(default)"));
        assert!(s.contains("--:-- (-)"));

        let s = format_result_block(&parse("2天后交"), "%Y-%m-%d", "%H:%M");
        assert!(s.contains("(offset 2day)"));
    }
}
