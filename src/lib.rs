//! `tuicore`: an interactive terminal UI engine and the multi-line editor
//! that is its most complex focusable component.
//!
//! The crate is organized leaf-first:
//!
//! - [`terminal`] — the tty driver; owns no UI state.
//! - [`width`] — grapheme segmentation and visible-width measurement.
//! - [`component`], [`overlay`], [`compositor`], [`engine`] — the
//!   differential-rendering TUI engine.
//! - [`editor`] — the multi-line, grapheme-aware text editor.
//! - [`input`] — the single-line auxiliary editor.
//!
//! Supporting modules ([`killring`], [`undo`], [`history`], [`paste`],
//! [`autocomplete`], [`select_list`], [`geometry`], [`error`]) are owned by
//! the editor or shared between the editor and the engine.

#![warn(missing_docs)]

pub mod autocomplete;
pub mod component;
pub mod compositor;
pub mod editor;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod killring;
pub mod overlay;
pub mod paste;
pub mod select_list;
pub mod terminal;
pub mod undo;
pub mod width;

pub use component::{Component, Container, Focusable, CURSOR_MARKER};
pub use editor::Editor;
pub use engine::{Engine, EngineConfig};
pub use error::{Result, TuiError};
pub use input::Input;
pub use overlay::{Anchor, Margins, Measure, OverlayHandle, OverlayOptions, Position};
