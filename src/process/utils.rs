use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens read as missing by [`MissingValues::standard`], besides the empty field.
pub const STANDARD_MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

static STANDARD_MISSING: Lazy<Regex> = Lazy::new(|| missing_regex(&STANDARD_MISSING_TOKENS[..]));

/// Which CSV fields count as missing.
#[derive(Debug, Clone)]
pub enum MissingValues {
    /// Only the empty field.
    EmptyOnly,
    /// The empty field plus [`STANDARD_MISSING_TOKENS`].
    Standard,
    /// The empty field plus the given tokens.
    Tokens(Vec<String>),
}

impl MissingValues {
    pub fn empty_only() -> Self {
        MissingValues::EmptyOnly
    }

    pub fn standard() -> Self {
        MissingValues::Standard
    }

    /// Regex handed to the Arrow CSV reader; `None` keeps its empty-field default.
    pub fn null_regex(&self) -> Option<Regex> {
        match self {
            MissingValues::EmptyOnly => None,
            MissingValues::Standard => Some(STANDARD_MISSING.clone()),
            MissingValues::Tokens(tokens) => Some(missing_regex(tokens.as_slice())),
        }
    }

    pub fn is_missing(&self, raw: &str) -> bool {
        match self {
            MissingValues::EmptyOnly => raw.is_empty(),
            MissingValues::Standard => STANDARD_MISSING.is_match(raw),
            MissingValues::Tokens(tokens) => raw.is_empty() || tokens.iter().any(|t| t == raw),
        }
    }
}

fn missing_regex<S: AsRef<str>>(tokens: &[S]) -> Regex {
    let alternatives: Vec<String> = tokens.iter().map(|t| regex::escape(t.as_ref())).collect();
    // alternatives are escaped literals, so the pattern always compiles
    Regex::new(&format!("^(?:|{})$", alternatives.join("|"))).expect("escaped token regex")
}

pub fn parse_i64(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// Finite floats only; `inf` and `NaN` spellings stay text.
pub fn parse_f64(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tokens_are_missing() {
        let mv = MissingValues::standard();
        for token in STANDARD_MISSING_TOKENS {
            assert!(mv.is_missing(token), "{token} should be missing");
        }
        assert!(mv.is_missing(""));
        assert!(!mv.is_missing("NAN_VALUE"));
        assert!(!mv.is_missing("M"));
    }

    #[test]
    fn empty_only_keeps_na_text() {
        let mv = MissingValues::empty_only();
        assert!(mv.is_missing(""));
        assert!(!mv.is_missing("NA"));
        assert!(mv.null_regex().is_none());
    }

    #[test]
    fn custom_tokens_match_exactly() {
        let mv = MissingValues::Tokens(vec!["?".into(), "n.a.".into()]);
        let re = mv.null_regex().unwrap();
        assert!(re.is_match("?"));
        assert!(re.is_match("n.a."));
        assert!(re.is_match(""));
        assert!(!re.is_match("nxa."));
        assert!(mv.is_missing("?"));
    }

    #[test]
    fn numeric_parsers() {
        assert_eq!(parse_i64("42"), Some(42));
        assert_eq!(parse_i64("4.2"), None);
        assert_eq!(parse_f64("4.2"), Some(4.2));
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), None);
    }
}
