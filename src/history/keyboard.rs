use crossterm::event::KeyCode;

/// What had focus when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    List,
    TextInput,
    TextArea,
    Other,
}

/// A key press as seen by list navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub code: KeyCode,
    pub target: FocusTarget,
    default_prevented: bool,
}

impl KeyInput {
    pub fn new(code: KeyCode, target: FocusTarget) -> Self {
        Self {
            code,
            target,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type IgnorePredicate = fn(&KeyInput) -> bool;

/// Default predicate: keys typed into text fields are not navigation.
pub fn ignore_text_input(event: &KeyInput) -> bool {
    matches!(event.target, FocusTarget::TextInput | FocusTarget::TextArea)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            _ => None,
        }
    }
}

/// Circular step. With no current selection both directions land on 0.
pub fn next_index(current: Option<usize>, len: usize, direction: Direction) -> usize {
    debug_assert!(len > 0, "next_index on an empty list");
    let Some(current) = current else {
        return 0;
    };
    let current = current % len;
    match direction {
        Direction::Down => (current + 1) % len,
        Direction::Up => (current + len - 1) % len,
    }
}

/// Receiver of navigation: reports the current index, accepts the new one.
pub trait NavigationTarget<T> {
    fn current_index(&self) -> Option<usize>;
    fn on_navigate(&mut self, item: &T, index: usize);
}

/// Up/Down navigation over a list, bound only while enabled and non-empty.
pub struct KeyboardNavigation {
    ignore: IgnorePredicate,
    bound: bool,
}

impl Default for KeyboardNavigation {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardNavigation {
    pub fn new() -> Self {
        Self::with_ignore(ignore_text_input)
    }

    pub fn with_ignore(ignore: IgnorePredicate) -> Self {
        Self {
            ignore,
            bound: false,
        }
    }

    /// Binds or unbinds to match the current items and enabled flag.
    pub fn sync<T>(&mut self, items: Option<&[T]>, enabled: bool) {
        let len = items.map_or(0, |items| items.len());
        let bound = enabled && len > 0;
        if bound != self.bound {
            tracing::debug!(bound, len, "keyboard navigation binding changed");
        }
        self.bound = bound;
    }

    pub fn unbind(&mut self) {
        self.bound = false;
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Returns true when the key moved the selection.
    pub fn handle_key<T>(
        &self,
        items: Option<&[T]>,
        event: &mut KeyInput,
        target: &mut dyn NavigationTarget<T>,
    ) -> bool {
        if !self.bound {
            return false;
        }
        let Some(items) = items.filter(|items| !items.is_empty()) else {
            return false;
        };
        let Some(direction) = Direction::from_key(event.code) else {
            return false;
        };
        if (self.ignore)(event) {
            return false;
        }

        event.prevent_default();
        let index = next_index(target.current_index(), items.len(), direction);
        target.on_navigate(&items[index], index);
        true
    }
}
