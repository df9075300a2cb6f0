pub mod config;
pub mod dom_tree;
pub mod error;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod formatters;
pub mod navigator;
pub mod parse;
pub mod pipeline;
pub mod postprocess;
pub mod preview;
pub mod session;

pub use config::{
    AttributePattern, ConfigLoader, ConfigStore, FilterConfig, JsonFileStore, KeyEvent, Layered, MemoryStore,
    ShortcutConfig,
};
#[doc(hidden)]
pub use dom_tree::{DomNode, DomTree, NodeData, NodeId, build_dom_tree};
pub use error::{MdPickError, Result};
pub use export::download_file_name;
pub use fetch::FetchConfig;
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{fetch_file, fetch_stdin};
pub use filter::{Sanitized, sanitize_element, sanitize_tree};
#[cfg(feature = "markdown")]
pub use formatters::HtmdEngine;
pub use formatters::{MarkdownConverter, MarkdownEngine, convert_to_markdown};
pub use navigator::{Direction, Effect, InputEvent, Navigator, SELECTION_HINT, SelectionState, TreeCursor, transition};
pub use parse::Document;
pub use pipeline::Pipeline;
pub use postprocess::postprocess_markdown;
#[cfg(feature = "preview")]
pub use preview::PulldownRenderer;
pub use preview::{Pane, PaneKind, PreviewRenderer, PreviewSync, SCROLL_LOCK_WINDOW, default_renderer};
pub use session::Session;
