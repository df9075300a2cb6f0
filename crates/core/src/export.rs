//! File naming for downloaded Markdown.

use time::format_description::StaticFormatDescription;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// UTC ISO 8601 with millisecond precision and `-` in place of `:`
const FILE_STAMP: StaticFormatDescription =
    format_description!("[year]-[month]-[day]T[hour]-[minute]-[second].[subsecond digits:3]Z");

/// File name for the Markdown exported from a page titled `title` at `at`.
///
/// Path and shell metacharacters in the title become `_`, an empty title
/// becomes `untitled`, and the UTC timestamp always carries three subsecond
/// digits and uses `-` instead of `:` so the name is valid on every platform.
///
/// ```rust
/// use mdpick_core::download_file_name;
/// use time::OffsetDateTime;
///
/// let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
/// assert_eq!(download_file_name("a/b", at), "a_b-2023-11-14T22-13-20.000Z.md");
/// ```
pub fn download_file_name(title: &str, at: OffsetDateTime) -> String {
    let safe_title: String = title
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let safe_title = if safe_title.is_empty() { "untitled".to_string() } else { safe_title };

    let timestamp = match at.to_offset(UtcOffset::UTC).format(FILE_STAMP) {
        Ok(formatted) => formatted,
        Err(e) => {
            tracing::warn!(error = %e, "timestamp not formattable");
            at.unix_timestamp().to_string()
        }
    };

    format!("{safe_title}-{timestamp}.md")
}
