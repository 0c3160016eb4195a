use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::keywords::Vocabulary;
use crate::priority::PriorityThresholds;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// A date at most this many days away is high priority. Default 1.
    pub high_priority_within_days: i64,
    /// A date at most this many days away is medium priority. Default 3.
    pub medium_priority_within_days: i64,
    /// Fail the parse on impossible dates such as `2024-02-30` instead of
    /// falling back to today.
    pub strict_dates: bool,
    /// `chrono` format used when printing dates.
    pub date_format: String,
    /// `chrono` format used when printing times.
    pub time_format: String,
    /// `(alias, target)` pairs from the `[synonyms]` table.
    pub synonyms: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            high_priority_within_days: 1,
            medium_priority_within_days: 3,
            strict_dates: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            synonyms: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    high_priority_within_days: Option<i64>,
    medium_priority_within_days: Option<i64>,
    strict_dates: Option<bool>,
    date_format: Option<String>,
    time_format: Option<String>,
    /// Optional table:
    /// [synonyms]
    /// "明儿" = "明天"
    /// "晌午" = "noon"
    synonyms: Option<BTreeMap<String, String>>,
}

impl Config {
    /// Public entrypoint: load config from disk (first XDG path, then native)
    /// and apply defaults for anything left unset.
    pub fn load() -> Result<Self> {
        match Self::config_file_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Reads and parses one config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_toml(&s).with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), synonyms = config.synonyms.len(), "config loaded");
        Ok(config)
    }

    /// Parses a TOML document into a `Config`, defaulting every missing field.
    pub fn from_toml(s: &str) -> Result<Self> {
        let file = Self::parse_file(s)?;
        let defaults = Self::default();
        let high = file
            .high_priority_within_days
            .unwrap_or(defaults.high_priority_within_days);
        let medium = file
            .medium_priority_within_days
            .unwrap_or(defaults.medium_priority_within_days)
            .max(high);

        Ok(Self {
            high_priority_within_days: high,
            medium_priority_within_days: medium,
            strict_dates: file.strict_dates.unwrap_or(defaults.strict_dates),
            date_format: file.date_format.unwrap_or(defaults.date_format),
            time_format: file.time_format.unwrap_or(defaults.time_format),
            synonyms: Self::load_synonyms(file.synonyms),
        })
    }

    pub fn priority_thresholds(&self) -> PriorityThresholds {
        PriorityThresholds {
            high_within_days: self.high_priority_within_days,
            medium_within_days: self.medium_priority_within_days,
        }
    }

    /// The vocabulary every extractor is built from.
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::with_synonyms(&self.synonyms)
    }

    fn config_file_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Some(b) = BaseDirs::new() {
            let xdg = b.home_dir().join(".config").join("riqi").join("config.toml");
            v.push(xdg);
            let native = b.config_dir().join("riqi").join("config.toml");
            v.push(native);
        }
        v
    }

    fn parse_file(s: &str) -> Result<FileConfig> {
        Ok(toml::from_str::<FileConfig>(s)?)
    }

    /// Omits aliases that are canonical keyword names (eg. "tomorrow").
    fn load_synonyms(synonyms: Option<BTreeMap<String, String>>) -> Vec<(String, String)> {
        synonyms
            .unwrap_or_default()
            .into_iter()
            .filter(|(alias, _)| !Vocabulary::is_canonical(alias))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Keyword;
    use std::io::Write;

    #[test]
    fn candidates_prioritize_xdg_then_native() {
        if let Some(b) = BaseDirs::new() {
            let expected_xdg = b.home_dir().join(".config").join("riqi").join("config.toml");
            let expected_native = b.config_dir().join("riqi").join("config.toml");
            let c = Config::config_file_paths();
            assert_eq!(c.first(), Some(&expected_xdg));
            assert_eq!(c.get(1), Some(&expected_native));
        }
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.priority_thresholds(), PriorityThresholds::default());
    }

    #[test]
    fn parses_every_field() {
        let toml = r#"
            high_priority_within_days = 0
            medium_priority_within_days = 7
            strict_dates = true
            date_format = "%Y年%m月%d日"
            time_format = "%H时%M分"
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.high_priority_within_days, 0);
        assert_eq!(config.medium_priority_within_days, 7);
        assert!(config.strict_dates);
        assert_eq!(config.date_format, "%Y年%m月%d日");
        assert_eq!(config.time_format, "%H时%M分");
    }

    #[test]
    fn medium_threshold_never_below_high() {
        let config = Config::from_toml("high_priority_within_days = 5\nmedium_priority_within_days = 2").unwrap();
        assert_eq!(config.medium_priority_within_days, 5);
    }

    #[test]
    fn synonyms_extend_the_vocabulary() {
        let toml = r#"
            [synonyms]
            "明儿" = "明天"
            "晌午" = "noon"
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.synonyms.len(), 2);

        let vocab = config.vocabulary();
        assert!(vocab.matches(Keyword::Tomorrow, "明儿"));
        assert!(vocab.matches(Keyword::Noon, "晌午"));
    }

    #[test]
    fn canonical_names_are_not_accepted_as_aliases() {
        let toml = r#"
            [synonyms]
            tomorrow = "yesterday"
            "明儿" = "明天"
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.synonyms, vec![("明儿".to_string(), "明天".to_string())]);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("strict_dates = \"sometimes\"").is_err());
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "strict_dates = true\n[synonyms]\n\"后儿\" = \"后天\"").unwrap();

        let config = Config::from_path(file.path()).unwrap();
        assert!(config.strict_dates);
        assert!(config.vocabulary().matches(Keyword::DayAfterTomorrow, "后儿"));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let err = Config::from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
