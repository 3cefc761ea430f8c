//! Domain & Data Service
//!
//! A `Domain` is one loaded ATT&CK version (e.g. enterprise-attack v14).
//! `DataService` owns every loaded domain and hands them out by
//! domain version id.

use serde::{Deserialize, Serialize};

use super::types::{
    Group, Matrix, Mitigation, Note, RelatedObject, Relationships, Software, Tactic, Technique,
};

// ============================================================================
// DOMAIN
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub version: String,
    pub techniques: Vec<Technique>,
    pub subtechniques: Vec<Technique>,
    pub tactics: Vec<Tactic>,
    pub matrices: Vec<Matrix>,
    pub groups: Vec<Group>,
    pub software: Vec<Software>,
    pub mitigations: Vec<Mitigation>,
    pub notes: Vec<Note>,
    pub relationships: Relationships,
}

impl Domain {
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    /// `"{id}-{version}"`
    pub fn domain_version_id(&self) -> String {
        format!("{}-{}", self.id, self.version)
    }

    /// Techniques followed by sub-techniques
    pub fn all_techniques(&self) -> impl Iterator<Item = &Technique> {
        self.techniques.iter().chain(self.subtechniques.iter())
    }

    pub fn technique(&self, id: &str) -> Option<&Technique> {
        self.all_techniques().find(|t| t.id == id)
    }

    pub fn technique_by_attack_id(&self, attack_id: &str) -> Option<&Technique> {
        self.all_techniques().find(|t| t.attack_id.eq_ignore_ascii_case(attack_id))
    }

    pub fn tactic(&self, id: &str) -> Option<&Tactic> {
        self.tactics.iter().find(|t| t.id == id)
    }

    pub fn tactic_by_shortname(&self, shortname: &str) -> Option<&Tactic> {
        self.tactics.iter().find(|t| t.shortname == shortname)
    }

    /// Tactic objects the technique appears under, in technique order
    pub fn tactics_of<'a>(&'a self, technique: &'a Technique) -> impl Iterator<Item = &'a Tactic> + 'a {
        technique.tactics.iter().filter_map(move |s| self.tactic_by_shortname(s))
    }

    pub fn parent_of(&self, technique: &Technique) -> Option<&Technique> {
        technique.parent.as_deref().and_then(|id| self.technique(id))
    }

    pub fn subtechniques_of<'a>(&'a self, technique: &'a Technique) -> impl Iterator<Item = &'a Technique> + 'a {
        technique.subtechniques.iter().filter_map(move |id| self.technique(id))
    }

    /// Resolve a STIX id to a group, software or mitigation
    pub fn related_object(&self, id: &str) -> Option<RelatedObject<'_>> {
        if let Some(g) = self.groups.iter().find(|g| g.id == id) {
            return Some(RelatedObject::Group(g));
        }
        if let Some(s) = self.software.iter().find(|s| s.id == id) {
            return Some(RelatedObject::Software(s));
        }
        self.mitigations.iter()
            .find(|m| m.id == id)
            .map(RelatedObject::Mitigation)
    }

    /// Notes referencing `object_id`
    pub fn notes_for<'a>(&'a self, object_id: &'a str) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes.iter().filter(move |n| n.references(object_id))
    }
}

// ============================================================================
// DATA SERVICE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DataService {
    domains: Vec<Domain>,
}

impl DataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(domain: Domain) -> Self {
        let mut service = Self::new();
        service.add_domain(domain);
        service
    }

    /// Add a domain, replacing any domain with the same version id
    pub fn add_domain(&mut self, domain: Domain) {
        let key = domain.domain_version_id();
        if let Some(existing) = self.domains.iter_mut().find(|d| d.domain_version_id() == key) {
            log::info!("Replacing loaded domain {}", key);
            *existing = domain;
        } else {
            log::info!("Registered domain {}", key);
            self.domains.push(domain);
        }
    }

    pub fn get_domain(&self, domain_version_id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.domain_version_id() == domain_version_id)
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn groups(&self, domain_version_id: &str) -> &[Group] {
        self.get_domain(domain_version_id).map(|d| d.groups.as_slice()).unwrap_or(&[])
    }

    pub fn software(&self, domain_version_id: &str) -> &[Software] {
        self.get_domain(domain_version_id).map(|d| d.software.as_slice()).unwrap_or(&[])
    }

    pub fn mitigations(&self, domain_version_id: &str) -> &[Mitigation] {
        self.get_domain(domain_version_id).map(|d| d.mitigations.as_slice()).unwrap_or(&[])
    }

    pub fn techniques(&self, domain_version_id: &str) -> &[Technique] {
        self.get_domain(domain_version_id).map(|d| d.techniques.as_slice()).unwrap_or(&[])
    }

    pub fn subtechniques(&self, domain_version_id: &str) -> &[Technique] {
        self.get_domain(domain_version_id).map(|d| d.subtechniques.as_slice()).unwrap_or(&[])
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::stix::fixtures;

    #[test]
    fn test_lookups() {
        let domain = fixtures::domain();
        assert_eq!(domain.domain_version_id(), "enterprise-attack-14");

        let ps = domain.technique_by_attack_id("T1059.001").unwrap();
        assert!(ps.is_subtechnique);
        assert_eq!(domain.parent_of(ps).unwrap().attack_id, "T1059");

        let parent = domain.technique_by_attack_id("t1059").unwrap();
        let subs: Vec<_> = domain.subtechniques_of(parent).map(|t| t.attack_id.as_str()).collect();
        assert_eq!(subs, vec!["T1059.001", "T1059.003"]);

        let tactics: Vec<_> = domain.tactics_of(domain.technique_by_attack_id("T1055").unwrap())
            .map(|t| t.shortname.as_str())
            .collect();
        assert_eq!(tactics, vec!["defense-evasion", "privilege-escalation"]);
    }

    #[test]
    fn test_related_object_resolution() {
        let domain = fixtures::domain();
        assert!(matches!(domain.related_object(fixtures::APT29), Some(RelatedObject::Group(_))));
        assert!(matches!(domain.related_object(fixtures::MIMIKATZ), Some(RelatedObject::Software(_))));
        assert!(matches!(domain.related_object(fixtures::EXEC_PREVENTION), Some(RelatedObject::Mitigation(_))));
        assert!(domain.related_object(fixtures::T1059).is_none());
    }

    #[test]
    fn test_data_service_domains() {
        let mut service = DataService::with_domain(fixtures::domain());
        assert!(service.get_domain("enterprise-attack-14").is_some());
        assert!(service.get_domain("mobile-attack-14").is_none());
        assert!(service.groups("mobile-attack-14").is_empty());

        let mut replacement = fixtures::domain();
        replacement.groups.clear();
        service.add_domain(replacement);
        assert_eq!(service.domains().len(), 1);
        assert!(service.groups("enterprise-attack-14").is_empty());
    }
}
