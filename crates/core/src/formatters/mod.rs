pub mod markdown;

#[cfg(feature = "markdown")]
pub use markdown::HtmdEngine;
pub use markdown::{MarkdownConverter, MarkdownEngine, convert_to_markdown};
