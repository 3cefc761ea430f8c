//! nav-matrix - ATT&CK matrix view-model core
//!
//! Cell rendering state and related-object bulk selection over a loaded
//! ATT&CK domain.

pub mod api;
pub mod constants;
pub mod logic;
