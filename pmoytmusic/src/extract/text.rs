//! Text runs and noise tokens
//!
//! Upstream text fields are either `{ "simpleText": "..." }` or
//! `{ "runs": [{ "text": "...", "navigationEndpoint": {...} }, ...] }`.
//! Subtitle runs mix contributor names with separators, type labels, years,
//! play counts and durations; [`NOISE_RULES`] lists what is not a name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Separator between subtitle fields
pub const BULLET_SEPARATOR: &str = " • ";

/// Kind of non-name token found in subtitle runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseToken {
    /// "•", ",", "&"
    Separator,
    /// single, album, ep, playlist, video, song
    TypeWord,
    /// bare 4-digit year
    Year,
    /// "159M views", "1.1B plays", "45M monthly audience"...
    Count,
    /// "3:06", "1:02:03"
    Duration,
}

/// A named predicate of the noise table
pub struct NoiseRule {
    pub token: NoiseToken,
    pub matches: fn(&str) -> bool,
}

/// Evaluated in order on trimmed run text
pub const NOISE_RULES: &[NoiseRule] = &[
    NoiseRule {
        token: NoiseToken::Separator,
        matches: is_separator,
    },
    NoiseRule {
        token: NoiseToken::TypeWord,
        matches: is_type_word,
    },
    NoiseRule {
        token: NoiseToken::Year,
        matches: is_year,
    },
    NoiseRule {
        token: NoiseToken::Count,
        matches: is_count,
    },
    NoiseRule {
        token: NoiseToken::Duration,
        matches: is_duration,
    },
];

const TYPE_WORDS: &[&str] = &["single", "album", "ep", "playlist", "video", "song"];

static COUNT_TOKEN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^\d+(\.\d+)?[KMB]?\s*(views|plays|listeners|subscribers|monthly audience)").ok()
});

fn is_separator(text: &str) -> bool {
    matches!(text, "" | "•" | "," | "&")
}

fn is_type_word(text: &str) -> bool {
    let lower = text.to_lowercase();
    TYPE_WORDS.contains(&lower.as_str())
}

/// Exactly four ASCII digits
pub fn is_year(text: &str) -> bool {
    text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit())
}

fn is_count(text: &str) -> bool {
    COUNT_TOKEN.as_ref().is_some_and(|re| re.is_match(text))
}

/// `M:SS`, `MM:SS` or `H:MM:SS` with 1-2 digit leading groups
pub fn is_duration(text: &str) -> bool {
    let digits = |group: &str| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit());
    let groups: Vec<&str> = text.split(':').collect();
    match *groups.as_slice() {
        [m, s] => digits(m) && m.len() <= 2 && digits(s) && s.len() == 2,
        [h, m, s] => {
            digits(h) && h.len() <= 2 && digits(m) && m.len() == 2 && digits(s) && s.len() == 2
        }
        _ => false,
    }
}

/// First rule matching `text`, `None` for a plausible name
pub fn classify_token(text: &str) -> Option<NoiseToken> {
    let trimmed = text.trim();
    NOISE_RULES
        .iter()
        .find(|rule| (rule.matches)(trimmed))
        .map(|rule| rule.token)
}

pub fn is_noise(text: &str) -> bool {
    classify_token(text).is_some()
}

/// Runs of a text field, empty when the field has none
pub fn runs(field: Option<&Value>) -> &[Value] {
    field
        .and_then(|f| f.get("runs"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Text of a run
pub fn run_text(run: &Value) -> Option<&str> {
    run.get("text").and_then(Value::as_str)
}

/// Concatenated run texts of a text field
pub fn join_runs(field: Option<&Value>, separator: &str) -> String {
    runs(field)
        .iter()
        .filter_map(run_text)
        .collect::<Vec<_>>()
        .join(separator)
}

/// `simpleText` or joined runs of a text field
pub fn field_text(field: Option<&Value>) -> Option<String> {
    let field = field?;
    if let Some(simple) = field.get("simpleText").and_then(Value::as_str) {
        return non_empty(simple);
    }
    non_empty(&join_runs(Some(field), ""))
}

/// Trimmed copy, `None` when blank
pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_noise_table() {
        assert_eq!(classify_token(" • "), Some(NoiseToken::Separator));
        assert_eq!(classify_token(" & "), Some(NoiseToken::Separator));
        assert_eq!(classify_token("Single"), Some(NoiseToken::TypeWord));
        assert_eq!(classify_token("EP"), Some(NoiseToken::TypeWord));
        assert_eq!(classify_token("2022"), Some(NoiseToken::Year));
        assert_eq!(classify_token("159M views"), Some(NoiseToken::Count));
        assert_eq!(classify_token("1.1B plays"), Some(NoiseToken::Count));
        assert_eq!(classify_token("45M monthly audience"), Some(NoiseToken::Count));
        assert_eq!(classify_token("3:06"), Some(NoiseToken::Duration));
        assert_eq!(classify_token("1:23:45"), Some(NoiseToken::Duration));
    }

    #[test]
    fn test_names_are_not_noise() {
        for name in ["Taylor Swift", "ABBA", "Blink-182", "The 1975", "Songs of Faith"] {
            assert!(!is_noise(name), "{name} classified as noise");
        }
        // a band named after a year cannot be told apart
        assert!(is_noise("1975"));
    }

    #[test]
    fn test_is_duration_shapes() {
        assert!(is_duration("0:59"));
        assert!(is_duration("10:45"));
        assert!(!is_duration("100:45"));
        assert!(!is_duration("3:6"));
        assert!(!is_duration("a:bc"));
        assert!(!is_duration("1:2:3:4"));
    }

    #[test]
    fn test_field_text() {
        let simple = json!({ "simpleText": " 3:06 " });
        assert_eq!(field_text(Some(&simple)).as_deref(), Some("3:06"));

        let runs = json!({ "runs": [{ "text": "Mid" }, { "text": "nights" }] });
        assert_eq!(field_text(Some(&runs)).as_deref(), Some("Midnights"));

        assert_eq!(field_text(None), None);
        assert_eq!(field_text(Some(&json!({ "runs": [] }))), None);
    }
}
