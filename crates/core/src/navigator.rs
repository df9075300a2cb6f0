//! Interactive element selection.
//!
//! A selection session walks the document tree starting from the body's first
//! element. Input arrives as [`InputEvent`]s; the pure [`transition`] function
//! maps the current [`SelectionState`] and one event to the next state plus the
//! [`Effect`]s the host must perform (highlighting, hint, scroll lock, and
//! finally handing the confirmed element to the conversion pipeline).
//!
//! Missing parents, siblings or children never fail: the move becomes a no-op.
//!
//! # Example
//!
//! ```rust
//! use mdpick_core::{Direction, Document, InputEvent, Navigator, ShortcutConfig};
//!
//! let doc = Document::parse("<html><body><div><p>One</p><p>Two</p></div></body></html>").unwrap();
//! let mut navigator = Navigator::new(ShortcutConfig::default());
//!
//! navigator.dispatch(doc.tree(), InputEvent::Activate);
//! navigator.dispatch(doc.tree(), InputEvent::Navigate(Direction::Down));
//! assert_eq!(doc.tree().tag_name(navigator.current().unwrap()), Some("p"));
//! ```

use std::fmt::Debug;

use crate::config::{KeyEvent, ShortcutConfig};

/// Instruction shown while a session is active
pub const SELECTION_HINT: &str =
    "Selecting element... Use Arrows to navigate, Mouse Wheel to expand/collapse, Click to confirm, Esc to cancel.";

/// Element-level view of a navigable tree.
///
/// Implementations return only element nodes; text and comments are invisible
/// to the navigator.
pub trait TreeCursor {
    type Node: Copy + Eq + Debug;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Whether `node` is the document root the selection must not climb into
    fn is_root(&self, node: Self::Node) -> bool;

    /// Where a new session starts
    fn entry_point(&self) -> Option<Self::Node>;
}

/// Arrow-key directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Maps DOM key names (`ArrowUp`, ...) to directions
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Input delivered to the navigator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent<N> {
    /// Activation chord or start command; toggles the session
    Activate,
    /// Arrow key
    Navigate(Direction),
    /// Mouse wheel; negative deltas scroll up
    Wheel { delta_y: f64 },
    /// Pointer moved over `target`
    Hover { target: N, in_overlay: bool },
    /// Pointer pressed
    Press { in_overlay: bool },
    Escape,
}

/// Side effects requested by a transition, in the order they must run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<N> {
    SuppressScroll,
    RestoreScroll,
    ShowHint(&'static str),
    HideHint,
    Highlight(N),
    Unhighlight(N),
    /// Run the conversion pipeline on the element
    Confirm(N),
}

/// Selection session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState<N> {
    #[default]
    Idle,
    Selecting {
        current: N,
    },
}

impl<N: Copy> SelectionState<N> {
    pub fn is_active(&self) -> bool {
        matches!(self, SelectionState::Selecting { .. })
    }

    pub fn current(&self) -> Option<N> {
        match self {
            SelectionState::Selecting { current } => Some(*current),
            SelectionState::Idle => None,
        }
    }
}

/// Compute the next state and effects for one event.
pub fn transition<T: TreeCursor>(
    tree: &T, state: SelectionState<T::Node>, event: &InputEvent<T::Node>,
) -> (SelectionState<T::Node>, Vec<Effect<T::Node>>) {
    let current = match state {
        SelectionState::Idle => return start(tree, event),
        SelectionState::Selecting { current } => current,
    };

    let target = match *event {
        InputEvent::Activate | InputEvent::Escape => {
            tracing::debug!(?current, "selection cancelled");
            return (SelectionState::Idle, leave(current));
        }
        InputEvent::Press { in_overlay: true } | InputEvent::Hover { in_overlay: true, .. } => current,
        InputEvent::Press { in_overlay: false } => {
            tracing::debug!(?current, "selection confirmed");
            let mut effects = vec![Effect::Confirm(current)];
            effects.extend(leave(current));
            return (SelectionState::Idle, effects);
        }
        InputEvent::Hover { target, in_overlay: false } => target,
        InputEvent::Navigate(direction) => step(tree, current, direction),
        InputEvent::Wheel { delta_y } if delta_y < 0.0 => step(tree, current, Direction::Up),
        InputEvent::Wheel { .. } => step(tree, current, Direction::Down),
    };

    if target == current {
        return (state, Vec::new());
    }

    tracing::debug!(from = ?current, to = ?target, "selection moved");
    (
        SelectionState::Selecting { current: target },
        vec![Effect::Unhighlight(current), Effect::Highlight(target)],
    )
}

fn start<T: TreeCursor>(
    tree: &T, event: &InputEvent<T::Node>,
) -> (SelectionState<T::Node>, Vec<Effect<T::Node>>) {
    if !matches!(event, InputEvent::Activate) {
        return (SelectionState::Idle, Vec::new());
    }

    let Some(entry) = tree.entry_point() else {
        tracing::debug!("document has no selectable element");
        return (SelectionState::Idle, Vec::new());
    };

    tracing::debug!(?entry, "selection started");
    (
        SelectionState::Selecting { current: entry },
        vec![Effect::SuppressScroll, Effect::ShowHint(SELECTION_HINT), Effect::Highlight(entry)],
    )
}

fn leave<N>(current: N) -> Vec<Effect<N>> {
    vec![Effect::Unhighlight(current), Effect::HideHint, Effect::RestoreScroll]
}

/// Resolve one arrow move from `current`; falls back to `current` when the move is impossible.
pub fn step<T: TreeCursor>(tree: &T, current: T::Node, direction: Direction) -> T::Node {
    match direction {
        Direction::Up => {
            let parent = tree.parent(current).unwrap_or(current);
            if tree.is_root(parent) { tree.first_child(parent).unwrap_or(parent) } else { parent }
        }
        Direction::Down => tree.first_child(current).unwrap_or(current),
        Direction::Left => match tree.previous_sibling(current) {
            Some(previous) => deepest(previous, |n| tree.last_child(n)),
            None => non_root_parent(tree, current).unwrap_or(current),
        },
        Direction::Right => match tree.next_sibling(current) {
            Some(next) => deepest(next, |n| tree.first_child(n)),
            None => non_root_parent(tree, current).unwrap_or(current),
        },
    }
}

fn deepest<N: Copy>(mut node: N, child: impl Fn(N) -> Option<N>) -> N {
    while let Some(next) = child(node) {
        node = next;
    }
    node
}

fn non_root_parent<T: TreeCursor>(tree: &T, node: T::Node) -> Option<T::Node> {
    tree.parent(node).filter(|p| !tree.is_root(*p))
}

/// Stateful wrapper owning one selection session at a time.
#[derive(Debug, Clone)]
pub struct Navigator<N> {
    state: SelectionState<N>,
    shortcut: ShortcutConfig,
}

impl<N: Copy + Eq + Debug> Navigator<N> {
    pub fn new(shortcut: ShortcutConfig) -> Self {
        Self { state: SelectionState::Idle, shortcut }
    }

    pub fn state(&self) -> SelectionState<N> {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state.is_active()
    }

    pub fn current(&self) -> Option<N> {
        self.state.current()
    }

    pub fn shortcut(&self) -> &ShortcutConfig {
        &self.shortcut
    }

    /// Apply one event and return the effects to perform.
    pub fn dispatch<T: TreeCursor<Node = N>>(&mut self, tree: &T, event: InputEvent<N>) -> Vec<Effect<N>> {
        let (next, effects) = transition(tree, self.state, &event);
        self.state = next;
        effects
    }

    /// Translate a raw key press; keys that mean nothing in the current state are ignored.
    pub fn handle_key<T: TreeCursor<Node = N>>(&mut self, tree: &T, key: &KeyEvent) -> Vec<Effect<N>> {
        match self.resolve_key(key) {
            Some(event) => self.dispatch(tree, event),
            None => Vec::new(),
        }
    }

    fn resolve_key(&self, key: &KeyEvent) -> Option<InputEvent<N>> {
        if self.shortcut.matches(key) {
            return Some(InputEvent::Activate);
        }
        if !self.is_selecting() {
            return None;
        }
        if key.key == "Escape" {
            return Some(InputEvent::Escape);
        }
        Direction::from_key(&key.key).map(InputEvent::Navigate)
    }
}
