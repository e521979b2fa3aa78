//! Input mapping: raw key presses become simulation actions.
//!
//! # Invariants
//! - The kernel consumes `Action`s, never raw keys.
//! - Actions fire on the rising edge of a key; held keys and OS key repeat
//!   produce nothing further until the key is released.

pub mod action;
pub mod keymap;

pub use action::{Action, Direction};
pub use keymap::{InputState, KeyMap};

pub fn crate_info() -> &'static str {
    "glade-input v0.1.0"
}
