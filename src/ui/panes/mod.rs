//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`document`]: the sheet with line numbers and highlighting, plus the
//!   result column aligned to it
//! - [`status`]: status bar with file state and keybindings
//!
//! Each pane module exports a primary `render_*` function that draws from
//! borrowed application state and keeps no state of its own beyond the
//! scroll offset passed in by the caller.

pub mod document;
pub mod status;

pub use document::{render_document_pane, DocumentScrollState};
pub use status::{render_status_bar, StatusRenderData};
