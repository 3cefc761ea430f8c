//! STIX Module - ATT&CK content model and loading
//!
//! # Components
//! - `types.rs`: techniques, tactics, groups, software, mitigations, notes
//! - `domain.rs`: `Domain` (one ATT&CK version) and `DataService`
//! - `bundle.rs`: STIX 2.x bundle loader

pub mod types;
pub mod domain;
pub mod bundle;

#[cfg(test)]
pub mod fixtures;

pub use types::{
    Technique, Tactic, Matrix, Note,
    Group, Software, SoftwareKind, Mitigation,
    Relationships, RelatedTechniques, RelatedObject, PickerKind,
    technique_tactic_union_id,
};
pub use domain::{Domain, DataService};
pub use bundle::{load_domain, load_domain_file, StixError};
