use std::collections::{HashMap, HashSet};

use crate::action::{Action, Direction};

/// Key-to-action bindings. Keys are case-insensitive characters.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: HashMap<char, Action>,
}

impl KeyMap {
    /// An empty map with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// WASD movement, N for night, H for controls, E to interact, F to toggle follow.
    pub fn standard() -> Self {
        let mut map = Self::new();
        map.bind('w', Action::Move(Direction::North));
        map.bind('s', Action::Move(Direction::South));
        map.bind('a', Action::Move(Direction::West));
        map.bind('d', Action::Move(Direction::East));
        map.bind('n', Action::ToggleNight);
        map.bind('h', Action::ToggleControls);
        map.bind('e', Action::Interact);
        map.bind('f', Action::ToggleFollow);
        map
    }

    /// Bind a key, returning the action it replaced.
    pub fn bind(&mut self, key: char, action: Action) -> Option<Action> {
        self.bindings.insert(normalize(key), action)
    }

    pub fn unbind(&mut self, key: char) -> Option<Action> {
        self.bindings.remove(&normalize(key))
    }

    pub fn action_for(&self, key: char) -> Option<Action> {
        self.bindings.get(&normalize(key)).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn normalize(key: char) -> char {
    key.to_ascii_lowercase()
}

/// Edge filter over a key map.
///
/// A key produces its action once when pressed and stays silent until it is
/// released, so auto-repeat from the host never double-fires a one-shot.
#[derive(Debug, Clone)]
pub struct InputState {
    keymap: KeyMap,
    held: HashSet<char>,
}

impl InputState {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            held: HashSet::new(),
        }
    }

    /// Register a key-down. Returns the bound action on the rising edge only.
    pub fn key_down(&mut self, key: char) -> Option<Action> {
        let key = normalize(key);
        if !self.held.insert(key) {
            return None;
        }
        let action = self.keymap.action_for(key);
        if action.is_none() {
            tracing::trace!(%key, "unbound key");
        }
        action
    }

    pub fn key_up(&mut self, key: char) {
        self.held.remove(&normalize(key));
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains(&normalize(key))
    }

    /// Forget every held key, e.g. when the host window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(KeyMap::standard())
    }
}
