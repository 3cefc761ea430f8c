//! STIX Bundle Loader
//!
//! Builds a `Domain` from a STIX 2.x bundle. Only the object types the
//! matrix needs are read; everything else is ignored.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::ATTACK_SOURCE_NAME;
use super::domain::Domain;
use super::types::{Group, Matrix, Mitigation, Note, Software, SoftwareKind, Tactic, Technique};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum StixError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    EmptyDomain(String),
}

impl std::fmt::Display for StixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StixError::IoError(e) => write!(f, "IO Error: {}", e),
            StixError::ParseError(e) => write!(f, "Bundle Parse Error: {}", e),
            StixError::EmptyDomain(id) => write!(f, "Bundle for {} contains no techniques", id),
        }
    }
}

impl std::error::Error for StixError {}

impl From<std::io::Error> for StixError {
    fn from(err: std::io::Error) -> Self {
        StixError::IoError(err)
    }
}

impl From<serde_json::Error> for StixError {
    fn from(err: serde_json::Error) -> Self {
        StixError::ParseError(err)
    }
}

// ============================================================================
// RAW BUNDLE (for parsing)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawBundle {
    #[serde(default)]
    objects: Vec<RawObject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawObject {
    #[serde(rename = "type")]
    object_type: String,
    id: String,
    name: Option<String>,
    revoked: bool,
    x_mitre_deprecated: bool,
    x_mitre_is_subtechnique: bool,
    x_mitre_shortname: Option<String>,
    external_references: Vec<RawExternalReference>,
    kill_chain_phases: Vec<RawKillChainPhase>,
    tactic_refs: Vec<String>,
    object_refs: Vec<String>,
    content: Option<String>,
    relationship_type: Option<String>,
    source_ref: Option<String>,
    target_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawExternalReference {
    source_name: String,
    external_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawKillChainPhase {
    kill_chain_name: String,
    phase_name: String,
}

impl RawObject {
    fn attack_id(&self) -> String {
        self.external_references.iter()
            .find(|r| r.source_name == ATTACK_SOURCE_NAME)
            .and_then(|r| r.external_id.clone())
            .unwrap_or_default()
    }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }

    fn is_live(&self) -> bool {
        !self.revoked && !self.x_mitre_deprecated
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Load a domain from a bundle on disk
pub fn load_domain_file(path: &Path, domain_id: &str, version: &str) -> Result<Domain, StixError> {
    let data = fs::read_to_string(path)?;
    load_domain(&data, domain_id, version)
}

/// Load a domain from bundle JSON
pub fn load_domain(json: &str, domain_id: &str, version: &str) -> Result<Domain, StixError> {
    let bundle: RawBundle = serde_json::from_str(json)?;
    let mut domain = Domain::new(domain_id, version);

    let mut relationships = Vec::new();
    let mut skipped = 0usize;

    for obj in bundle.objects {
        if !obj.is_live() {
            skipped += 1;
            continue;
        }
        if obj.object_type == "relationship" {
            relationships.push(obj);
            continue;
        }

        match obj.object_type.as_str() {
            "attack-pattern" => {
                let technique = Technique {
                    attack_id: obj.attack_id(),
                    name: obj.name(),
                    tactics: obj.kill_chain_phases.iter()
                        .filter(|p| p.kill_chain_name == ATTACK_SOURCE_NAME)
                        .map(|p| p.phase_name.clone())
                        .collect(),
                    is_subtechnique: obj.x_mitre_is_subtechnique,
                    parent: None,
                    subtechniques: Vec::new(),
                    deprecated: false,
                    revoked: false,
                    id: obj.id,
                };
                if technique.is_subtechnique {
                    domain.subtechniques.push(technique);
                } else {
                    domain.techniques.push(technique);
                }
            }
            "x-mitre-tactic" => domain.tactics.push(Tactic {
                attack_id: obj.attack_id(),
                name: obj.name(),
                shortname: obj.x_mitre_shortname.clone().unwrap_or_default(),
                id: obj.id,
            }),
            "x-mitre-matrix" => domain.matrices.push(Matrix {
                name: obj.name(),
                id: obj.id,
                tactic_refs: obj.tactic_refs,
            }),
            "intrusion-set" => domain.groups.push(Group {
                attack_id: obj.attack_id(),
                name: obj.name(),
                id: obj.id,
            }),
            "malware" | "tool" => domain.software.push(Software {
                attack_id: obj.attack_id(),
                name: obj.name(),
                kind: if obj.object_type == "tool" { SoftwareKind::Tool } else { SoftwareKind::Malware },
                id: obj.id,
            }),
            "course-of-action" => domain.mitigations.push(Mitigation {
                attack_id: obj.attack_id(),
                name: obj.name(),
                id: obj.id,
            }),
            "note" => domain.notes.push(Note {
                content: obj.content.clone().unwrap_or_default(),
                id: obj.id,
                object_refs: obj.object_refs,
            }),
            _ => {}
        }
    }

    if domain.techniques.is_empty() && domain.subtechniques.is_empty() {
        return Err(StixError::EmptyDomain(domain.domain_version_id()));
    }

    index_relationships(&mut domain, &relationships);

    log::info!(
        "Loaded {}: {} techniques, {} sub-techniques, {} tactics, {} groups, {} software, {} mitigations, {} notes ({} revoked/deprecated skipped)",
        domain.domain_version_id(),
        domain.techniques.len(),
        domain.subtechniques.len(),
        domain.tactics.len(),
        domain.groups.len(),
        domain.software.len(),
        domain.mitigations.len(),
        domain.notes.len(),
        skipped,
    );

    Ok(domain)
}

/// Fill the relationship index and parent/child links
fn index_relationships(domain: &mut Domain, relationships: &[RawObject]) {
    let technique_ids: HashSet<String> = domain.all_techniques().map(|t| t.id.clone()).collect();
    let group_ids: HashSet<&str> = domain.groups.iter().map(|g| g.id.as_str()).collect();
    let software_ids: HashSet<&str> = domain.software.iter().map(|s| s.id.as_str()).collect();
    let mitigation_ids: HashSet<&str> = domain.mitigations.iter().map(|m| m.id.as_str()).collect();

    let mut group_uses: HashMap<String, Vec<String>> = HashMap::new();
    let mut software_uses: HashMap<String, Vec<String>> = HashMap::new();
    let mut mitigates: HashMap<String, Vec<String>> = HashMap::new();
    let mut subtechniques_of: HashMap<String, String> = HashMap::new();

    for rel in relationships {
        let (Some(kind), Some(source), Some(target)) =
            (rel.relationship_type.as_deref(), rel.source_ref.as_deref(), rel.target_ref.as_deref())
        else {
            continue;
        };
        if !technique_ids.contains(target) {
            continue;
        }

        let index = match kind {
            "subtechnique-of" if technique_ids.contains(source) => {
                subtechniques_of.insert(source.to_string(), target.to_string());
                continue;
            }
            "uses" if group_ids.contains(source) => &mut group_uses,
            "uses" if software_ids.contains(source) => &mut software_uses,
            "mitigates" if mitigation_ids.contains(source) => &mut mitigates,
            _ => continue,
        };

        let targets = index.entry(source.to_string()).or_default();
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }

    for sub in domain.subtechniques.iter_mut() {
        sub.parent = subtechniques_of.get(&sub.id).cloned();
    }
    for technique in domain.techniques.iter_mut() {
        technique.subtechniques = domain.subtechniques.iter()
            .filter(|s| s.parent.as_deref() == Some(technique.id.as_str()))
            .map(|s| s.id.clone())
            .collect();
    }

    domain.relationships.group_uses = group_uses;
    domain.relationships.software_uses = software_uses;
    domain.relationships.mitigates = mitigates;
    domain.relationships.subtechniques_of = subtechniques_of;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::stix::fixtures;
    use crate::logic::stix::RelatedTechniques;

    #[test]
    fn test_load_bundle() {
        let domain = load_domain(&fixtures::bundle_json(), "enterprise-attack", "14").unwrap();

        assert_eq!(domain.techniques.len(), 2);
        assert_eq!(domain.subtechniques.len(), 1);
        assert_eq!(domain.tactics.len(), 2);
        assert_eq!(domain.matrices[0].tactic_refs.len(), 2);

        let ps = domain.technique_by_attack_id("T1059.001").unwrap();
        assert_eq!(ps.parent.as_deref(), Some("attack-pattern--t1059"));
        assert_eq!(ps.tactics, vec!["execution".to_string()]);

        let parent = domain.technique_by_attack_id("T1059").unwrap();
        assert_eq!(parent.subtechniques, vec!["attack-pattern--t1059-001".to_string()]);

        let tactic = domain.tactic_by_shortname("execution").unwrap();
        assert_eq!(tactic.attack_id, "TA0002");
    }

    #[test]
    fn test_relationships_indexed() {
        let domain = load_domain(&fixtures::bundle_json(), "enterprise-attack", "14").unwrap();

        let group = &domain.groups[0];
        assert_eq!(group.related_techniques(&domain), &["attack-pattern--t1059-001".to_string()]);

        let tool = &domain.software[0];
        assert_eq!(tool.kind, SoftwareKind::Tool);
        assert_eq!(tool.related_techniques(&domain), &["attack-pattern--t1547".to_string()]);

        let mitigation = &domain.mitigations[0];
        assert_eq!(mitigation.related_techniques(&domain).len(), 2);

        assert_eq!(domain.notes.len(), 1);
    }

    #[test]
    fn test_revoked_and_deprecated_skipped() {
        let domain = load_domain(&fixtures::bundle_json(), "enterprise-attack", "14").unwrap();
        assert!(domain.technique_by_attack_id("T9999").is_none());
        assert!(domain.groups.iter().all(|g| g.name != "Retired Group"));

        // deprecated APT29 -> T1547 link
        let apt29 = domain.related_object(fixtures::APT29).unwrap();
        assert!(!apt29.related_techniques(&domain).contains(&fixtures::T1547.to_string()));
    }

    #[test]
    fn test_empty_and_malformed_bundles() {
        let empty = load_domain(r#"{"type":"bundle","objects":[]}"#, "enterprise-attack", "14");
        assert!(matches!(empty, Err(StixError::EmptyDomain(_))));

        let malformed = load_domain("{not json", "enterprise-attack", "14");
        assert!(matches!(malformed, Err(StixError::ParseError(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enterprise-attack.json");
        std::fs::write(&path, fixtures::bundle_json()).unwrap();

        let domain = load_domain_file(&path, "enterprise-attack", "14").unwrap();
        assert_eq!(domain.domain_version_id(), "enterprise-attack-14");

        let missing = load_domain_file(&dir.path().join("missing.json"), "enterprise-attack", "14");
        assert!(matches!(missing, Err(StixError::IoError(_))));
    }
}
