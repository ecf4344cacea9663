//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into four parts:
//!
//! - **[`app`]**: application state, keyboard event loop, debounced
//!   re-evaluation, save/new/quit commands
//! - **[`editor`]**: the plain-text line buffer and cursor
//! - **[`panes`]**: stateless render functions for the sheet, the result
//!   column and the status bar
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with the document
//! text and call [`App::run`] to start the event loop.
//!
//! [`App::run`]: app::App::run

pub mod app;
pub mod editor;
pub mod panes;
pub mod theme;

pub use app::App;
