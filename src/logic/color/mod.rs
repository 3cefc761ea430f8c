//! Color Module - parsing, readability and score gradients
//!
//! # Components
//! - `parse.rs`: CSS color strings -> `Rgba`
//! - `readable.rs`: WCAG contrast and most-readable candidate selection
//! - `gradient.rs`: score -> color interpolation

pub mod parse;
pub mod readable;
pub mod gradient;

pub use parse::Rgba;
pub use readable::{contrast_ratio, most_readable};
pub use gradient::Gradient;
