//! Citation marker formatting for display
//!
//! `[Source A]` becomes `*[Source A]*`. Applied at render time only; stored
//! history and log entries keep the raw model text. Not idempotent.

use regex::Regex;
use std::sync::LazyLock;

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("citation pattern is valid"));

/// Emphasize every bracketed citation marker. Markers do not span lines and
/// their contents are kept verbatim.
pub fn format_citations(text: &str) -> String {
    CITATION.replace_all(text, "*[${1}]*").into_owned()
}
