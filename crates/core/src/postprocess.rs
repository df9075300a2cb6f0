use regex::Regex;
use std::sync::LazyLock;

/// `[]()`, `[ ]( )`
static EMPTY_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s*\]\(\s*\)").unwrap());

/// `[](#)`, `[](javascript:...)`
static JUNK_TARGET_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s*\]\((#|javascript:[^)]*)\)").unwrap());

/// `[text]()`
static TARGETLESS_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(\s*\)").unwrap());

static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Post-process converted Markdown.
///
/// The rules are order-sensitive and run exactly once each:
/// empty links, empty links with junk targets, links without target,
/// then blank-line runs. Surrounding whitespace is left alone.
pub fn postprocess_markdown(markdown: &str) -> String {
    let mut processed = remove_empty_links(markdown);
    processed = remove_junk_target_links(&processed);
    processed = unwrap_targetless_links(&processed);
    collapse_blank_lines(&processed)
}

/// Remove links with neither text nor target
fn remove_empty_links(markdown: &str) -> String {
    EMPTY_LINK.replace_all(markdown, "").to_string()
}

/// Remove text-less links pointing at `#` or a `javascript:` URL
///
/// Links that still carry text are left untouched.
fn remove_junk_target_links(markdown: &str) -> String {
    JUNK_TARGET_LINK.replace_all(markdown, "").to_string()
}

/// Replace `[text]()` by its text
fn unwrap_targetless_links(markdown: &str) -> String {
    TARGETLESS_LINK.replace_all(markdown, "$1").to_string()
}

/// Collapse three or more newlines into one blank line
fn collapse_blank_lines(markdown: &str) -> String {
    BLANK_LINE_RUN.replace_all(markdown, "\n\n").to_string()
}
