//! ViewModel Module - session state behind the matrix
//!
//! Holds per technique-tactic annotations, selection, highlight, layout and
//! the score gradient. Cells read it; interaction handlers mutate it.
//!
//! # Architecture
//! - `types.rs`: `TechniqueVM`, `LayoutOptions`, `LayoutMode`, `AggregateFunction`
//! - `model.rs`: `ViewModel`
//! - `layer.rs`: Layer file format (import/export)
//! - `storage.rs`: Layer persistence
//!
//! # Failure Strategy
//! Unknown techniques/tactics in a layer are skipped and reported, never fatal.

pub mod types;
pub mod model;
pub mod layer;
pub mod storage;

pub use types::{TechniqueVM, LayoutOptions, LayoutMode, AggregateFunction};
pub use model::ViewModel;
pub use layer::{Layer, LayerTechnique, LayerVersions, LayerReport, LayerError};
pub use storage::{default_layer_dir, layer_path, save_layer, load_layer};
