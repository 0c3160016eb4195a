use regex::Regex;

use crate::keywords::Vocabulary;
use crate::numerals::NUMERAL_CLASS;
use crate::parsed_input::Span;

/// Words left dangling right after a removed date, as in `周五之前` or `月底的`.
const TRAILING_CONNECTIVES: &[&str] = &["之前", "以前", "的"];

/// Particles that only introduce a date (`在明天`, `于周五`). Dropped when they
/// are all that stands between the start of the text and a removed span.
const LEADING_PARTICLES: &[char] = &['在', '于', '要'];

/// Builds the residual task title from what the extractors did not consume.
pub struct TitleBuilder {
    /// Every date/time/period word and literal the parser knows.
    vocabulary: Regex,
    relative_days: Regex,
}

impl TitleBuilder {
    /// Compiles the fallback patterns for `vocabulary`.
    ///
    /// # Arguments
    ///
    /// * `vocabulary` - The same vocabulary the date and time rules were built
    ///   from, so user synonyms are stripped from titles as well.
    ///
    /// # Returns
    ///
    /// The builder, or the regex error if a pattern fails to compile.
    ///
    /// # Examples
    ///
    /// ```
    /// # use riqi_core::keywords::Vocabulary;
    /// # use riqi_core::title::TitleBuilder;
    /// # use riqi_core::Span;
    /// let titles = TitleBuilder::new(&Vocabulary::builtin()).unwrap();
    ///
    /// // "明天" occupies bytes 0..6.
    /// assert_eq!(titles.build("明天要求供应商回复", &[Span::new(0, 6)]), "要求供应商回复");
    /// assert_eq!(titles.build("买牛奶", &[]), "买牛奶");
    /// ```
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        let words = vocabulary.alternation(|_| true);
        let num = format!(r"(?:\d{{1,2}}|{NUMERAL_CLASS}{{1,3}})");
        let patterns = [
            r"\d{4}[-/年]\d{1,2}[-/月]\d{1,2}[日号]?".to_string(),
            r"\d{1,2}[-/月]\d{1,2}[日号]?".to_string(),
            format!("(?:十[一二]|[一二三四五六七八九十])月{num}[日号]?"),
            format!(r"(?:\d{{1,4}}|{NUMERAL_CLASS}{{1,3}}|半)\s*(?:个?小时|个?钟头|分钟|个月|个?星期|个?礼拜|时|天|周)以?后"),
            "下{0,2}个?(?:周|星期|礼拜)[一二三四五六日天]".to_string(),
            "下?周末".to_string(),
            "下下?(?:周|个?星期|个?礼拜)".to_string(),
            format!("下个?月(?:{num}[号日]|[底末初])?"),
            r"\d{1,2}[:：]\d{2}".to_string(),
            format!(r"{num}[点时](?:\d{{1,2}}分?|{NUMERAL_CLASS}{{1,3}}分|半|一刻|三刻|刻|钟)?(?:以?后)?"),
            r"\d{1,2}[号日]".to_string(),
            words,
        ];
        let vocabulary_re = Regex::new(&patterns.join("|"))?;
        let relative_days = Regex::new(&vocabulary.alternation(|k| k.day_offset().is_some()))?;

        Ok(Self {
            vocabulary: vocabulary_re,
            relative_days,
        })
    }

    /// Removes `consumed` from `original` and tidies what is left.
    ///
    /// Connectives are only dropped where they touch a removed span, so words
    /// such as `要求` or `目的` survive intact.
    ///
    /// When the residue is too short to be a real title the builder falls back,
    /// in order, to: the original with all date vocabulary stripped, the
    /// original with only relative-day words stripped, and finally the trimmed
    /// original itself.
    pub fn build(&self, original: &str, consumed: &[Span]) -> String {
        let residue = collapse(&remove_spans(original, consumed));
        if !is_degenerate(&residue) {
            return tidy(&residue);
        }

        let stripped = self.strip_matches(&self.vocabulary, original);
        if char_len(&stripped) >= 2 {
            return stripped;
        }

        let stripped = self.strip_matches(&self.relative_days, original);
        if char_len(&stripped) >= 2 {
            return stripped;
        }

        original.trim().to_string()
    }

    fn strip_matches(&self, pattern: &Regex, original: &str) -> String {
        let found: Vec<Span> = pattern.find_iter(original).map(Span::from).collect();
        tidy(&collapse(&remove_spans(original, &found)))
    }
}

/// Sorts and merges overlapping spans.
pub fn merge_spans(spans: &[Span]) -> Vec<Span> {
    let mut sorted: Vec<Span> = spans.iter().copied().filter(|s| !s.is_empty()).collect();
    sorted.sort();

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Drops the spans from `text` together with the connectives that only made
/// sense next to them. A space is left only where the removal would glue two
/// latin words together.
fn remove_spans(text: &str, spans: &[Span]) -> String {
    let merged = merge_spans(spans);
    let mut pieces = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0;
    for span in &merged {
        pieces.push(text.get(cursor..span.start).unwrap_or_default());
        cursor = cursor.max(span.end);
    }
    pieces.push(text.get(cursor..).unwrap_or_default());

    let last = pieces.len() - 1;
    let mut out = String::with_capacity(text.len());
    for (i, piece) in pieces.into_iter().enumerate() {
        let mut piece = piece;
        if i > 0 {
            piece = strip_trailing_connectives(piece);
        }
        if i < last && is_lead_in(piece) {
            piece = "";
        }
        let joins_words = out.chars().next_back().is_some_and(|c| c.is_ascii_alphanumeric())
            && piece.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
        if i > 0 && joins_words {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

/// Strips `之前`, `以前` and `的` from the start of the text following a removed span.
fn strip_trailing_connectives(piece: &str) -> &str {
    let mut t = piece;
    loop {
        let trimmed = t.trim_start_matches(is_stray);
        match TRAILING_CONNECTIVES
            .iter()
            .find_map(|word| trimmed.strip_prefix(word))
        {
            Some(rest) => t = rest,
            None => return t,
        }
    }
}

/// Text before a removed span made only of particles such as `在` or `要在`.
fn is_lead_in(piece: &str) -> bool {
    let t = piece.trim_matches(is_stray);
    !t.is_empty() && t.chars().all(|c| LEADING_PARTICLES.contains(&c))
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_stray(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || "，。、；：！？～·…（）【】「」“”‘’".contains(c)
}

/// Trims punctuation, and `之前`/`以前` left at either end.
fn tidy(text: &str) -> String {
    let mut t = text.trim_matches(is_stray);
    loop {
        let before = t;
        for word in ["之前", "以前"] {
            t = t.strip_prefix(word).unwrap_or(t);
            t = t.strip_suffix(word).unwrap_or(t);
        }
        t = t.trim_matches(is_stray);
        if t == before {
            break;
        }
    }
    t.to_string()
}

fn is_degenerate(residue: &str) -> bool {
    let trimmed = residue.trim_matches(is_stray);
    trimmed.is_empty()
        || trimmed.starts_with('的')
        || trimmed.starts_with('之')
        || char_len(&tidy(trimmed)) < 3
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TitleBuilder {
        TitleBuilder::new(&Vocabulary::builtin()).unwrap()
    }

    fn span_of(text: &str, needle: &str) -> Span {
        let start = text.find(needle).unwrap();
        Span::new(start, start + needle.len())
    }

    #[test]
    fn merges_overlapping_spans() {
        let merged = merge_spans(&[Span::new(6, 12), Span::new(0, 6), Span::new(10, 14)]);
        assert_eq!(merged, vec![Span::new(0, 14)]);
        let apart = merge_spans(&[Span::new(0, 3), Span::new(5, 6), Span::new(5, 5)]);
        assert_eq!(apart, vec![Span::new(0, 3), Span::new(5, 6)]);
    }

    #[test]
    fn residue_after_consumed_spans() {
        let text = "下周五下午3点向老板汇报";
        let spans = [span_of(text, "下周五"), span_of(text, "下午3点")];
        assert_eq!(builder().build(text, &spans), "向老板汇报");
    }

    #[test]
    fn connectives_next_to_removed_dates_are_trimmed() {
        let text = "明天之前，提交季度报告";
        let spans = [span_of(text, "明天")];
        assert_eq!(builder().build(text, &spans), "提交季度报告");

        let text = "周五之前 完成项目文档。";
        let spans = [span_of(text, "周五")];
        assert_eq!(builder().build(text, &spans), "完成项目文档");

        let text = "在明天之前完成报告";
        let spans = [span_of(text, "明天")];
        assert_eq!(builder().build(text, &spans), "完成报告");
    }

    #[test]
    fn words_starting_or_ending_with_particles_stay_whole() {
        let text = "明天要求供应商回复";
        assert_eq!(builder().build(text, &[span_of(text, "明天")]), "要求供应商回复");

        let text = "明天在线培训课程";
        assert_eq!(builder().build(text, &[span_of(text, "明天")]), "在线培训课程");

        let text = "周五整理会议的目的";
        assert_eq!(builder().build(text, &[span_of(text, "周五")]), "整理会议的目的");

        let text = "需要在周五提交";
        assert_eq!(builder().build(text, &[span_of(text, "周五")]), "需要在提交");
    }

    #[test]
    fn short_residue_falls_back_to_vocabulary_strip() {
        let text = "明天上午9点开会";
        let spans = [span_of(text, "明天"), span_of(text, "9点")];
        // The period word stays when only the hour was consumed.
        assert_eq!(builder().build(text, &spans), "上午开会");

        let spans = [span_of(text, "明天"), span_of(text, "上午"), span_of(text, "9点")];
        assert_eq!(builder().build(text, &spans), "开会");

        let text = "明天上午九点开会";
        let spans = [span_of(text, "明天"), span_of(text, "上午"), span_of(text, "九点")];
        assert_eq!(builder().build(text, &spans), "开会");
    }

    #[test]
    fn dangling_particle_after_a_date_is_dropped() {
        let text = "月底的预算评审";
        let spans = [span_of(text, "月底")];
        assert_eq!(builder().build(text, &spans), "预算评审");
    }

    #[test]
    fn last_resort_is_the_original() {
        assert_eq!(builder().build("明天", &[Span::new(0, 6)]), "明天");
        assert_eq!(builder().build("  ", &[]), "");
        assert_eq!(builder().build("", &[]), "");
    }

    #[test]
    fn untouched_titles_pass_through() {
        assert_eq!(builder().build("买牛奶", &[]), "买牛奶");
        assert_eq!(builder().build("  buy  milk ", &[]), "buy milk");
        let text = "call 明天 mom";
        assert_eq!(builder().build(text, &[span_of(text, "明天")]), "call mom");
    }
}
