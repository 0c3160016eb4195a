use std::collections::HashMap;

use crate::parsed_input::Span;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// Canonical meaning of a recognised date/time word. Every Chinese word in a
/// [`Vocabulary`] maps onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Keyword {
    Today,
    Tomorrow,
    DayAfterTomorrow,
    ThreeDaysFromNow,
    Yesterday,
    DayBeforeYesterday,
    ThreeDaysAgo,
    Tonight,
    ThisMorning,
    Morning,
    Noon,
    Afternoon,
    Evening,
    EarlyMorning,
    MonthStart,
    MonthEnd,
    NewYearsDay,
    ValentinesDay,
    LabourDay,
    ChildrensDay,
    NationalDay,
    Christmas,
    SpringFestival,
    NewYearsEve,
    LanternFestival,
    QingmingFestival,
    DragonBoatFestival,
    QixiFestival,
    MidAutumnFestival,
    DoubleNinthFestival,
}

/// Time-of-day qualifier used to move a 12-hour clock reading onto the 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Period {
    EarlyMorning,
    Morning,
    Noon,
    Afternoon,
    Evening,
}

impl Period {
    /// Converts an hour read next to this period to the 24-hour clock.
    pub fn to_24h(self, hour: u32) -> u32 {
        match self {
            Period::Afternoon | Period::Evening if hour < 12 => hour + 12,
            Period::Noon if hour < 11 => hour + 12,
            Period::Morning | Period::EarlyMorning if hour == 12 => 0,
            _ => hour,
        }
    }

    fn is_after_noon(self) -> bool {
        matches!(self, Period::Afternoon | Period::Evening)
    }
}

impl Keyword {
    /// Offset in days from today for relative-day words.
    pub fn day_offset(self) -> Option<i64> {
        let offset = match self {
            Keyword::Today | Keyword::Tonight | Keyword::ThisMorning => 0,
            Keyword::Tomorrow => 1,
            Keyword::DayAfterTomorrow => 2,
            Keyword::ThreeDaysFromNow => 3,
            Keyword::Yesterday => -1,
            Keyword::DayBeforeYesterday => -2,
            Keyword::ThreeDaysAgo => -3,
            _ => return None,
        };
        Some(offset)
    }

    pub fn period(self) -> Option<Period> {
        let period = match self {
            Keyword::Morning | Keyword::ThisMorning => Period::Morning,
            Keyword::Noon => Period::Noon,
            Keyword::Afternoon => Period::Afternoon,
            Keyword::Evening | Keyword::Tonight => Period::Evening,
            Keyword::EarlyMorning => Period::EarlyMorning,
            _ => return None,
        };
        Some(period)
    }

    pub fn is_month_boundary(self) -> bool {
        matches!(self, Keyword::MonthStart | Keyword::MonthEnd)
    }

    pub fn is_holiday(self) -> bool {
        self.solar_date().is_some() || self.is_lunar_holiday()
    }

    /// `(month, day)` of holidays fixed on the Gregorian calendar.
    pub fn solar_date(self) -> Option<(u32, u32)> {
        let md = match self {
            Keyword::NewYearsDay => (1, 1),
            Keyword::ValentinesDay => (2, 14),
            Keyword::LabourDay => (5, 1),
            Keyword::ChildrensDay => (6, 1),
            Keyword::NationalDay => (10, 1),
            Keyword::Christmas => (12, 25),
            _ => return None,
        };
        Some(md)
    }

    /// Holidays that move with the lunar calendar. No lunar table is shipped.
    pub fn is_lunar_holiday(self) -> bool {
        matches!(
            self,
            Keyword::SpringFestival
                | Keyword::NewYearsEve
                | Keyword::LanternFestival
                | Keyword::QingmingFestival
                | Keyword::DragonBoatFestival
                | Keyword::QixiFestival
                | Keyword::MidAutumnFestival
                | Keyword::DoubleNinthFestival
        )
    }
}

/// Built-in word list. Several words may share a keyword.
const BUILTIN_WORDS: &[(&str, Keyword)] = &[
    ("今天", Keyword::Today),
    ("今日", Keyword::Today),
    ("明天", Keyword::Tomorrow),
    ("明日", Keyword::Tomorrow),
    ("后天", Keyword::DayAfterTomorrow),
    ("后日", Keyword::DayAfterTomorrow),
    ("大后天", Keyword::ThreeDaysFromNow),
    ("昨天", Keyword::Yesterday),
    ("昨日", Keyword::Yesterday),
    ("前天", Keyword::DayBeforeYesterday),
    ("大前天", Keyword::ThreeDaysAgo),
    ("今晚", Keyword::Tonight),
    ("今早", Keyword::ThisMorning),
    ("上午", Keyword::Morning),
    ("早上", Keyword::Morning),
    ("早晨", Keyword::Morning),
    ("中午", Keyword::Noon),
    ("下午", Keyword::Afternoon),
    ("晚上", Keyword::Evening),
    ("傍晚", Keyword::Evening),
    ("夜里", Keyword::Evening),
    ("凌晨", Keyword::EarlyMorning),
    ("月初", Keyword::MonthStart),
    ("月底", Keyword::MonthEnd),
    ("月末", Keyword::MonthEnd),
    ("元旦", Keyword::NewYearsDay),
    ("情人节", Keyword::ValentinesDay),
    ("劳动节", Keyword::LabourDay),
    ("五一", Keyword::LabourDay),
    ("儿童节", Keyword::ChildrensDay),
    ("国庆节", Keyword::NationalDay),
    ("国庆", Keyword::NationalDay),
    ("圣诞节", Keyword::Christmas),
    ("圣诞", Keyword::Christmas),
    ("春节", Keyword::SpringFestival),
    ("除夕", Keyword::NewYearsEve),
    ("元宵节", Keyword::LanternFestival),
    ("清明节", Keyword::QingmingFestival),
    ("端午节", Keyword::DragonBoatFestival),
    ("七夕", Keyword::QixiFestival),
    ("中秋节", Keyword::MidAutumnFestival),
    ("重阳节", Keyword::DoubleNinthFestival),
];

/// Immutable word → [`Keyword`] table used by every extractor.
///
/// It is built once, from the built-in list plus user-defined synonyms, and then
/// handed to the [`Parser`](crate::Parser), which owns it for its whole life.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Sorted longest word first, so alternations built from it prefer `大后天` over `后天`.
    words: Vec<(String, Keyword)>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Vocabulary {
    pub fn builtin() -> Self {
        Self::from_words(
            BUILTIN_WORDS
                .iter()
                .map(|(word, keyword)| (word.to_string(), *keyword))
                .collect(),
        )
    }

    /// Builds the vocabulary with user-defined **synonyms** added.
    ///
    /// Each pair is `(alias, target)`. The `target` is either a known word
    /// (`"明天"`, or an alias registered earlier in the slice) or a canonical
    /// keyword name (`"tomorrow"`). Pairs whose target is unknown are ignored, as
    /// are aliases that would shadow a built-in word.
    ///
    /// ```toml
    /// # config.toml
    /// [synonyms]
    /// "明儿" = "明天"
    /// "晌午" = "noon"
    /// ```
    pub fn with_synonyms(synonyms: &[(String, String)]) -> Self {
        let mut map: HashMap<String, Keyword> = BUILTIN_WORDS
            .iter()
            .map(|(word, keyword)| (word.to_string(), *keyword))
            .collect();

        for (alias, target) in synonyms {
            let alias = alias.trim();
            if alias.is_empty() || Self::is_builtin(alias) {
                continue;
            }
            let canonical = map
                .get(target.trim())
                .copied()
                .or_else(|| target.trim().to_ascii_lowercase().parse::<Keyword>().ok());
            if let Some(keyword) = canonical {
                map.insert(alias.to_string(), keyword);
            }
        }

        Self::from_words(map.into_iter().collect())
    }

    fn from_words(mut words: Vec<(String, Keyword)>) -> Self {
        words.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self { words }
    }

    fn is_builtin(word: &str) -> bool {
        BUILTIN_WORDS.iter().any(|(w, _)| *w == word)
    }

    /// Returns `true` if `word` is a canonical keyword name (eg "tomorrow").
    pub fn is_canonical(word: &str) -> bool {
        Keyword::iter().any(|key| key.as_ref() == word)
    }

    pub fn lookup(&self, word: &str) -> Option<Keyword> {
        self.words
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, keyword)| *keyword)
    }

    /// Returns `true` if `input` is the given keyword or one of its registered words.
    pub fn matches(&self, keyword: Keyword, input: &str) -> bool {
        self.lookup(input) == Some(keyword)
    }

    /// Regex alternation (longest first, escaped) of every word whose keyword
    /// satisfies `filter`.
    pub fn alternation(&self, filter: impl Fn(Keyword) -> bool) -> String {
        self.words
            .iter()
            .filter(|(_, keyword)| filter(*keyword))
            .map(|(word, _)| regex::escape(word))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Leftmost occurrence in `text` of any word whose keyword satisfies `filter`.
    pub fn find_first(
        &self,
        text: &str,
        filter: impl Fn(Keyword) -> bool,
    ) -> Option<(Keyword, Span)> {
        self.words
            .iter()
            .filter(|(_, keyword)| filter(*keyword))
            .filter_map(|(word, keyword)| {
                text.find(word.as_str())
                    .map(|start| (*keyword, Span::new(start, start + word.len())))
            })
            .min_by_key(|(_, span)| span.start)
    }

    /// Finds the period word that governs a bare hour anywhere in `text`.
    /// Afternoon and evening words win over morning words when both appear.
    pub fn find_period(&self, text: &str) -> Option<(Period, Span)> {
        let after_noon = |k: Keyword| k.period().is_some_and(Period::is_after_noon);
        let other = |k: Keyword| k.period().is_some_and(|p| !p.is_after_noon());
        self.find_first(text, after_noon)
            .or_else(|| self.find_first(text, other))
            .and_then(|(keyword, span)| keyword.period().map(|p| (p, span)))
    }
}
