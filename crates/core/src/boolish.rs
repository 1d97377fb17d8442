//! Yes/no resolution for loosely-typed signal fields.
//!
//! Upstream forms store checkbox answers as booleans, free-text tokens or
//! not at all, often as a pair of "yes" and "no" fields. [`Boolish::parse`]
//! turns one field into a closed variant and [`resolve_yes_no`] combines a
//! pair into the text shown in the template's two tick boxes.

use serde::Serialize;
use serde_json::Value;

/// Tokens read as an affirmative answer (compared case-insensitively).
const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "y", "true", "1", "x", "checked", "ok"];

/// Tokens read as a negative answer (compared case-insensitively).
const NEGATIVE_TOKENS: &[&str] = &["no", "n", "false", "0"];

/// Interpretation of a single signal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolish {
    Affirmative,
    Negative,
    Unknown,
}

impl Boolish {
    /// Parse a raw JSON value. Absent and unrecognised values are `Unknown`.
    pub fn parse(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Bool(true)) => Self::Affirmative,
            Some(Value::Bool(false)) => Self::Negative,
            Some(Value::String(s)) => Self::parse_token(s),
            Some(Value::Number(n)) => Self::parse_token(&n.to_string()),
            _ => Self::Unknown,
        }
    }

    fn parse_token(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        if AFFIRMATIVE_TOKENS.contains(&token.as_str()) {
            Self::Affirmative
        } else if NEGATIVE_TOKENS.contains(&token.as_str()) {
            Self::Negative
        } else {
            Self::Unknown
        }
    }

    fn invert(self) -> Self {
        match self {
            Self::Affirmative => Self::Negative,
            Self::Negative => Self::Affirmative,
            Self::Unknown => Self::Unknown,
        }
    }

    fn from_fallback(fallback: Option<bool>) -> Self {
        match fallback {
            Some(true) => Self::Affirmative,
            Some(false) => Self::Negative,
            None => Self::Unknown,
        }
    }
}

/// Text placed in the template's "yes" and "no" boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YesNo {
    pub yes: &'static str,
    pub no: &'static str,
}

impl YesNo {
    pub const AFFIRMATIVE: YesNo = YesNo { yes: "YES", no: "" };
    pub const NEGATIVE: YesNo = YesNo { yes: "", no: "NO" };
    /// Neutral pair shown when nothing decided the answer. The casing differs
    /// from the decided pairs on purpose.
    pub const UNDECIDED: YesNo = YesNo { yes: "Yes", no: "No" };
}

impl From<Boolish> for YesNo {
    fn from(value: Boolish) -> Self {
        match value {
            Boolish::Affirmative => Self::AFFIRMATIVE,
            Boolish::Negative => Self::NEGATIVE,
            Boolish::Unknown => Self::UNDECIDED,
        }
    }
}

/// Resolve a yes/no signal pair.
///
/// The "yes" field wins when it is recognisable; otherwise a recognisable
/// "no" field decides the inverse; otherwise `fallback` applies; otherwise
/// the answer stays undecided.
pub fn resolve_yes_no(yes: Option<&Value>, no: Option<&Value>, fallback: Option<bool>) -> YesNo {
    let decided = match Boolish::parse(yes) {
        Boolish::Unknown => match Boolish::parse(no).invert() {
            Boolish::Unknown => Boolish::from_fallback(fallback),
            from_no => from_no,
        },
        from_yes => from_yes,
    };
    decided.into()
}
