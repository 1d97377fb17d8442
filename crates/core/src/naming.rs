//! Output document naming convention.
//!
//! Generates deterministic filenames from a record identifier.

/// Prefix of every generated document.
pub const DOCUMENT_PREFIX: &str = "RDTI_GA_";

/// Extension of every generated document.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Generate the output filename for a record.
///
/// Convention: `RDTI_GA_{uid}.docx`. Characters outside `[A-Za-z0-9_-]` are
/// replaced with `_` so an identifier can never name a path outside the
/// output directory. The mapping is not injective (`a/b` and `a_b` share a
/// name); batches refuse to write the same file twice.
///
/// # Examples
///
/// ```
/// use rdti_core::naming::document_filename;
///
/// assert_eq!(document_filename("p1"), "RDTI_GA_p1.docx");
/// assert_eq!(document_filename("../etc"), "RDTI_GA____etc.docx");
/// ```
pub fn document_filename(uid: &str) -> String {
    let safe: String = uid
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{DOCUMENT_PREFIX}{safe}.{DOCUMENT_EXTENSION}")
}
