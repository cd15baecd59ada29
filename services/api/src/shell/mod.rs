//! services/api/src/shell/mod.rs
//!
//! The terminal front end: an explicit-state controller, text views for each
//! screen, and the word-bag animation task.

pub mod animation;
pub mod controller;
pub mod views;

pub use animation::WordBagAnimation;
pub use controller::{AppView, GenerateOptions, NewWord, Shell, ShellError, ShellState};
