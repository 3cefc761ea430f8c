//! STIX / ATT&CK Types
//!
//! Core domain objects loaded from a bundle. Immutable after loading;
//! cross references are STIX ids resolved through `Domain`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{LABEL_GROUPS, LABEL_MITIGATIONS, LABEL_SOFTWARE};
use super::domain::Domain;

// ============================================================================
// MATRIX CONTENT
// ============================================================================

/// ATT&CK technique or sub-technique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,          // "attack-pattern--..."
    pub attack_id: String,   // "T1059.001"
    pub name: String,
    /// Tactic shortnames this technique appears under
    pub tactics: Vec<String>,
    pub is_subtechnique: bool,
    /// STIX id of the parent technique (sub-techniques only)
    pub parent: Option<String>,
    /// STIX ids of sub-techniques (parents only)
    pub subtechniques: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub revoked: bool,
}

impl Technique {
    /// Key of the annotation for this technique under `tactic`
    pub fn get_technique_tactic_id(&self, tactic: &Tactic) -> String {
        technique_tactic_union_id(&self.attack_id, &tactic.shortname)
    }

    pub fn in_tactic(&self, shortname: &str) -> bool {
        self.tactics.iter().any(|t| t == shortname)
    }
}

/// `"{attack_id}^{tactic_shortname}"`
pub fn technique_tactic_union_id(attack_id: &str, tactic_shortname: &str) -> String {
    format!("{}^{}", attack_id, tactic_shortname)
}

/// ATT&CK tactic (matrix column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tactic {
    pub id: String,         // "x-mitre-tactic--..."
    pub attack_id: String,  // "TA0002"
    pub name: String,       // "Execution"
    pub shortname: String,  // "execution"
}

/// Ordered set of tactics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub id: String,
    pub name: String,
    pub tactic_refs: Vec<String>,
}

/// Analyst note attached to other objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub object_refs: Vec<String>,
}

impl Note {
    pub fn references(&self, object_id: &str) -> bool {
        self.object_refs.iter().any(|r| r == object_id)
    }
}

// ============================================================================
// RELATED OBJECTS
// ============================================================================

/// Threat group (intrusion-set)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub attack_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoftwareKind {
    Malware,
    Tool,
}

/// Malware or tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    pub id: String,
    pub attack_id: String,
    pub name: String,
    pub kind: SoftwareKind,
}

/// Course of action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mitigation {
    pub id: String,
    pub attack_id: String,
    pub name: String,
}

/// Relationship index built while loading a domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationships {
    /// group id -> technique ids
    pub group_uses: HashMap<String, Vec<String>>,
    /// software id -> technique ids
    pub software_uses: HashMap<String, Vec<String>>,
    /// mitigation id -> technique ids
    pub mitigates: HashMap<String, Vec<String>>,
    /// sub-technique id -> parent id
    pub subtechniques_of: HashMap<String, String>,
}

/// Objects that yield the techniques they relate to
pub trait RelatedTechniques {
    fn related_techniques<'d>(&self, domain: &'d Domain) -> &'d [String];
}

fn lookup<'d>(index: &'d HashMap<String, Vec<String>>, id: &str) -> &'d [String] {
    index.get(id).map(Vec::as_slice).unwrap_or(&[])
}

impl RelatedTechniques for Group {
    fn related_techniques<'d>(&self, domain: &'d Domain) -> &'d [String] {
        lookup(&domain.relationships.group_uses, &self.id)
    }
}

impl RelatedTechniques for Software {
    fn related_techniques<'d>(&self, domain: &'d Domain) -> &'d [String] {
        lookup(&domain.relationships.software_uses, &self.id)
    }
}

impl RelatedTechniques for Mitigation {
    fn related_techniques<'d>(&self, domain: &'d Domain) -> &'d [String] {
        lookup(&domain.relationships.mitigates, &self.id)
    }
}

/// Any object the multiselect panel can bulk-select by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedObject<'a> {
    Group(&'a Group),
    Software(&'a Software),
    Mitigation(&'a Mitigation),
}

impl<'a> RelatedObject<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            RelatedObject::Group(g) => &g.id,
            RelatedObject::Software(s) => &s.id,
            RelatedObject::Mitigation(m) => &m.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            RelatedObject::Group(g) => &g.name,
            RelatedObject::Software(s) => &s.name,
            RelatedObject::Mitigation(m) => &m.name,
        }
    }

    pub fn kind(&self) -> PickerKind {
        match self {
            RelatedObject::Group(_) => PickerKind::Groups,
            RelatedObject::Software(_) => PickerKind::Software,
            RelatedObject::Mitigation(_) => PickerKind::Mitigations,
        }
    }
}

impl RelatedTechniques for RelatedObject<'_> {
    fn related_techniques<'d>(&self, domain: &'d Domain) -> &'d [String] {
        match self {
            RelatedObject::Group(g) => g.related_techniques(domain),
            RelatedObject::Software(s) => s.related_techniques(domain),
            RelatedObject::Mitigation(m) => m.related_techniques(domain),
        }
    }
}

/// One of the three picker panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerKind {
    Groups,
    Software,
    Mitigations,
}

impl PickerKind {
    pub const ALL: [PickerKind; 3] = [PickerKind::Groups, PickerKind::Software, PickerKind::Mitigations];

    pub fn label(&self) -> &'static str {
        match self {
            PickerKind::Groups => LABEL_GROUPS,
            PickerKind::Software => LABEL_SOFTWARE,
            PickerKind::Mitigations => LABEL_MITIGATIONS,
        }
    }
}

impl std::fmt::Display for PickerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
