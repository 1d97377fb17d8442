//! Free-text cleanup for rendered fields.
//!
//! Project text is often pasted from editors that use lightweight markup.
//! The template renders plain runs, so math delimiters and emphasis markers
//! are unwrapped (their inner text is kept) and whitespace is collapsed.

use std::sync::LazyLock;

use regex::Regex;

static DISPLAY_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("valid regex"));

static BRACKET_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\[(.+?)\\\]").expect("valid regex"));

static PAREN_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\\\((.+?)\\\)").expect("valid regex"));

/// `$x$` with no whitespace just inside the delimiters, so prices such as
/// "$500 and $600" are left alone.
static INLINE_MATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([^\s$](?:[^$\n]*?[^\s$])?)\$").expect("valid regex")
});

static BOLD_STAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+?)\*\*").expect("valid regex"));

static BOLD_UNDERSCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\W)__([^_]+?)__(\W|$)").expect("valid regex"));

static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*([^*\s](?:[^*]*?[^*\s])?)\*").expect("valid regex")
});

static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\W)_([^_\s](?:[^_]*?[^_\s])?)_(\W|$)").expect("valid regex")
});

static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strip markup and collapse whitespace in a free-text field.
///
/// Display math is unwrapped before inline math so `$$x$$` does not leave a
/// stray pair of `$`. Underscore emphasis only matches at word boundaries,
/// which keeps identifiers like `snake_case_name` intact.
pub fn sanitize_text(input: &str) -> String {
    let text = DISPLAY_MATH_RE.replace_all(input, "${1}");
    let text = BRACKET_MATH_RE.replace_all(&text, "${1}");
    let text = PAREN_MATH_RE.replace_all(&text, "${1}");
    let text = INLINE_MATH_RE.replace_all(&text, "${1}");
    let text = BOLD_STAR_RE.replace_all(&text, "${1}");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "${1}${2}${3}");
    let text = ITALIC_STAR_RE.replace_all(&text, "${1}");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "${1}${2}${3}");
    let text = INLINE_CODE_RE.replace_all(&text, "${1}");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Sanitize an optional field, mapping `None` to the empty string.
pub fn sanitize_opt(input: Option<&str>) -> String {
    input.map(sanitize_text).unwrap_or_default()
}
