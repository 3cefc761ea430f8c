//! API Module
//!
//! Structure:
//! - commands.rs: session type and command functions
//! - v1/mod.rs: re-exports commands as the v1 API
//!
//! Usage:
//! - `api::commands::render_cell(&session, "T1059", Some("execution"), false)`
//! - `api::v1::render_cell(...)` - pinned version

pub mod commands;
pub mod v1;

pub use commands::*;
