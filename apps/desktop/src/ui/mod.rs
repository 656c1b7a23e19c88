//! Terminal UI: list surface on stdout and line-based edit prompts.

pub mod terminal;

pub use terminal::{LineDialog, SharedLines, TerminalSurface};
