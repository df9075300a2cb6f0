pub mod filter;
pub mod loader;
pub mod shortcut;
pub mod store;

pub use filter::{AttributePattern, FilterConfig};
pub use loader::{ConfigLoader, Layered};
pub use shortcut::{KeyEvent, ShortcutConfig};
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
