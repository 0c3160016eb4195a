/// Character class matching the Chinese numerals accepted by [`parse_number`].
pub const NUMERAL_CLASS: &str = "[〇零一二两三四五六七八九十]";

/// Reads a small number written either with ASCII digits (`"25"`) or with
/// Chinese numerals (`"二十五"`, `"十"`, `"两"`).
///
/// Chinese numerals are supported up to `九十九`, which is enough for days,
/// months, hours and the amounts used in relative offsets.
///
/// # Examples
///
/// ```
/// # use riqi_core::numerals::parse_number;
/// assert_eq!(parse_number("12"), Some(12));
/// assert_eq!(parse_number("十五"), Some(15));
/// assert_eq!(parse_number("二十"), Some(20));
/// assert_eq!(parse_number("两"), Some(2));
/// assert_eq!(parse_number("明"), None);
/// ```
pub fn parse_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }

    match s.split_once('十') {
        None => single_digit(s),
        Some((tens, ones)) => {
            let tens = if tens.is_empty() { 1 } else { single_digit(tens)? };
            let ones = if ones.is_empty() { 0 } else { single_digit(ones)? };
            if tens == 0 {
                return None;
            }
            Some(tens * 10 + ones)
        }
    }
}

/// Returns `true` for any character [`parse_number`] reads as part of a Chinese numeral.
pub fn is_numeral(c: char) -> bool {
    c == '十' || digit_value(c).is_some()
}

fn single_digit(s: &str) -> Option<u32> {
    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    digit_value(c)
}

fn digit_value(c: char) -> Option<u32> {
    let value = match c {
        '〇' | '零' => 0,
        '一' => 1,
        '二' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => return None,
    };
    Some(value)
}
