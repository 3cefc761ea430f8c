//! Multiselect Panel
//!
//! Catalog of related-object pickers (threat groups, software, mitigations)
//! and bulk selection of every technique related to a picked object.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Serialize;

use super::stix::{DataService, Domain, PickerKind, RelatedObject, RelatedTechniques, Technique};
use super::viewmodel::ViewModel;

/// Used when the view-model's domain is not loaded
static EMPTY_DOMAIN: Lazy<Domain> = Lazy::new(Domain::default);

/// One labeled picker list
#[derive(Debug, Clone)]
pub struct PickerGroup<'a> {
    pub kind: PickerKind,
    pub label: &'static str,
    pub objects: Vec<RelatedObject<'a>>,
}

/// Serializable summary of a picker entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerEntry {
    pub id: String,
    pub name: String,
    pub related_count: usize,
}

#[derive(Debug, Clone)]
pub struct Multiselect<'a> {
    domain: &'a Domain,
    stix_types: Vec<PickerGroup<'a>>,
    opened_panel: Option<PickerKind>,
}

impl<'a> Multiselect<'a> {
    /// Build the three picker lists for the view-model's domain
    pub fn new(data: &'a DataService, view_model: &ViewModel) -> Self {
        let domain = data.get_domain(&view_model.domain_version_id).unwrap_or_else(|| {
            log::warn!("Domain {} not loaded, multiselect is empty", view_model.domain_version_id);
            &*EMPTY_DOMAIN
        });
        Self::for_domain(domain)
    }

    pub fn for_domain(domain: &'a Domain) -> Self {
        let groups = domain.groups.iter().map(RelatedObject::Group).collect();
        let software = domain.software.iter().map(RelatedObject::Software).collect();
        let mitigations = domain.mitigations.iter().map(RelatedObject::Mitigation).collect();

        let stix_types = vec![
            picker(PickerKind::Groups, groups),
            picker(PickerKind::Software, software),
            picker(PickerKind::Mitigations, mitigations),
        ];

        Self {
            domain,
            stix_types,
            opened_panel: None,
        }
    }

    pub fn picker_groups(&self) -> &[PickerGroup<'a>] {
        &self.stix_types
    }

    pub fn picker(&self, kind: PickerKind) -> Option<&PickerGroup<'a>> {
        self.stix_types.iter().find(|g| g.kind == kind)
    }

    /// Entries of one picker with their related-technique counts
    pub fn entries(&self, kind: PickerKind) -> Vec<PickerEntry> {
        self.picker(kind)
            .map(|group| {
                group.objects.iter()
                    .map(|o| PickerEntry {
                        id: o.id().to_string(),
                        name: o.name().to_string(),
                        related_count: self.get_related(*o).len(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Techniques and sub-techniques related to `object`, in domain order
    pub fn get_related(&self, object: RelatedObject<'_>) -> Vec<&'a Technique> {
        let related = object.related_techniques(self.domain);
        self.domain
            .all_techniques()
            .filter(|t| related.iter().any(|id| *id == t.id))
            .collect()
    }

    /// Select every related technique across all of its tactics.
    /// Returns the number of related techniques.
    pub fn select(&self, view_model: &mut ViewModel, object: RelatedObject<'_>) -> usize {
        let related = self.get_related(object);
        for technique in &related {
            view_model.select_technique_across_tactics(technique, self.domain);
        }
        log::info!("Selected {} techniques related to {} ({})", related.len(), object.name(), object.kind());
        related.len()
    }

    /// Inverse of `select`
    pub fn deselect(&self, view_model: &mut ViewModel, object: RelatedObject<'_>) -> usize {
        let related = self.get_related(object);
        for technique in &related {
            view_model.unselect_technique_across_tactics(technique, self.domain);
        }
        log::info!("Deselected {} techniques related to {} ({})", related.len(), object.name(), object.kind());
        related.len()
    }

    // ------------------------------------------------------------------------
    // Panels
    // ------------------------------------------------------------------------

    pub fn opened_panel(&self) -> Option<PickerKind> {
        self.opened_panel
    }

    pub fn is_open(&self, kind: PickerKind) -> bool {
        self.opened_panel == Some(kind)
    }

    /// Open `kind` (closing any other panel), or close it if already open
    pub fn toggle_panel(&mut self, kind: PickerKind) {
        self.opened_panel = if self.is_open(kind) { None } else { Some(kind) };
    }

    pub fn close_panel(&mut self) {
        self.opened_panel = None;
    }
}

/// Deduplicate by id (first occurrence wins), then sort by name ignoring
/// case and Latin accents. The sort is stable.
fn picker(kind: PickerKind, objects: Vec<RelatedObject<'_>>) -> PickerGroup<'_> {
    let mut seen = HashSet::new();
    let mut objects: Vec<_> = objects.into_iter().filter(|o| seen.insert(o.id())).collect();
    objects.sort_by_cached_key(|o| name_sort_key(o.name()));

    PickerGroup {
        kind,
        label: kind.label(),
        objects,
    }
}

/// Lowercased name with Latin-1 accents folded, so "Ébola" sorts among the e's
fn name_sort_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à'..='å' => 'a',
            'ç' => 'c',
            'è'..='ë' => 'e',
            'ì'..='ï' => 'i',
            'ñ' => 'n',
            'ò'..='ö' | 'ø' => 'o',
            'ù'..='ü' => 'u',
            'ý' | 'ÿ' => 'y',
            other => other,
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
