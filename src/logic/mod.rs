//! Logic Module - matrix view-model and derivation
//!
//! ## Layout
//! - `stix/` - ATT&CK content model and bundle loading
//! - `viewmodel/` - session state, layers
//! - `color/` - color parsing, readability, gradients
//! - `cell` / `multiselect` - per-cell and bulk-selection logic

// Content & state
pub mod stix;
pub mod viewmodel;
pub mod config;

// Derivation
pub mod color;
pub mod theme;
pub mod cell;
pub mod multiselect;
