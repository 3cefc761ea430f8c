//! ViewModel
//!
//! Session state for one matrix view: annotations, selection, highlight,
//! layout and score gradient. Mutated only through `&mut self` methods
//! called from user-interaction handlers.

use std::collections::{HashMap, HashSet};

use crate::logic::color::Gradient;
use crate::logic::config::NavigatorConfig;
use crate::logic::stix::{Domain, Tactic, Technique};
use super::types::{AggregateFunction, LayoutOptions, TechniqueVM};

#[derive(Debug, Clone)]
pub struct ViewModel {
    pub name: String,
    pub description: String,
    pub domain_version_id: String,

    /// Technique STIX ids currently highlighted
    pub highlighted_techniques: HashSet<String>,
    /// Tactic STIX id the highlight is scoped to; `None` highlights every column
    pub highlighted_tactic: Option<String>,

    pub select_techniques_across_tactics: bool,
    pub select_subtechniques_with_parent: bool,

    pub layout: LayoutOptions,
    pub gradient: Gradient,

    /// Selected technique-tactic union ids
    selected_techniques: HashSet<String>,
    technique_vms: HashMap<String, TechniqueVM>,
}

impl ViewModel {
    /// One annotation record per (technique, tactic) pair of `domain`
    pub fn new(domain: &Domain, config: &NavigatorConfig) -> Self {
        let mut technique_vms = HashMap::new();
        for technique in domain.all_techniques() {
            for tactic in &technique.tactics {
                let tvm = TechniqueVM::new(&technique.attack_id, tactic);
                technique_vms.insert(tvm.technique_tactic_union_id.clone(), tvm);
            }
        }

        log::debug!("ViewModel for {} with {} annotations", domain.domain_version_id(), technique_vms.len());

        Self {
            name: "layer".to_string(),
            description: String::new(),
            domain_version_id: domain.domain_version_id(),
            highlighted_techniques: HashSet::new(),
            highlighted_tactic: None,
            select_techniques_across_tactics: config.select_techniques_across_tactics,
            select_subtechniques_with_parent: config.select_subtechniques_with_parent,
            layout: config.layout.clone(),
            gradient: config.gradient.clone(),
            selected_techniques: HashSet::new(),
            technique_vms,
        }
    }

    // ------------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------------

    pub fn get_technique_vm(&self, technique: &Technique, tactic: &Tactic) -> Option<&TechniqueVM> {
        self.technique_vms.get(&technique.get_technique_tactic_id(tactic))
    }

    pub fn get_technique_vm_mut(&mut self, technique: &Technique, tactic: &Tactic) -> Option<&mut TechniqueVM> {
        self.technique_vms.get_mut(&technique.get_technique_tactic_id(tactic))
    }

    pub fn get_technique_vm_by_id(&self, union_id: &str) -> Option<&TechniqueVM> {
        self.technique_vms.get(union_id)
    }

    pub(crate) fn get_technique_vm_by_id_mut(&mut self, union_id: &str) -> Option<&mut TechniqueVM> {
        self.technique_vms.get_mut(union_id)
    }

    pub fn technique_vms(&self) -> impl Iterator<Item = &TechniqueVM> {
        self.technique_vms.values()
    }

    /// Set or clear a score and refresh its derived color.
    /// Returns false if the pair has no annotation record.
    pub fn set_score(&mut self, technique: &Technique, tactic: &Tactic, score: Option<f64>) -> bool {
        let union_id = technique.get_technique_tactic_id(tactic);
        let color = score.and_then(|s| self.gradient.get_color(s));
        match self.technique_vms.get_mut(&union_id) {
            Some(tvm) => {
                tvm.score = score;
                tvm.score_color = color;
                true
            }
            None => false,
        }
    }

    /// Recompute every `score_color`, e.g. after the gradient changed
    pub fn update_score_colors(&mut self) {
        let gradient = &self.gradient;
        for tvm in self.technique_vms.values_mut() {
            tvm.score_color = tvm.score.and_then(|s| gradient.get_color(s));
        }
    }

    /// Recompute aggregate scores of every parent technique, per tactic
    pub fn update_aggregate_scores(&mut self, domain: &Domain) {
        let mut updates: Vec<(String, Option<f64>)> = Vec::new();

        for technique in domain.all_techniques() {
            for tactic in &technique.tactics {
                let union_id = format!("{}^{}", technique.attack_id, tactic);
                let aggregate = if technique.subtechniques.is_empty() {
                    None
                } else {
                    self.calculate_aggregate_score(domain, technique, tactic)
                };
                updates.push((union_id, aggregate));
            }
        }

        for (union_id, aggregate) in updates {
            let color = aggregate.and_then(|a| self.gradient.get_color(a));
            if let Some(tvm) = self.technique_vms.get_mut(&union_id) {
                tvm.aggregate_score = aggregate;
                tvm.aggregate_score_color = color;
            }
        }
    }

    fn calculate_aggregate_score(&self, domain: &Domain, technique: &Technique, tactic: &str) -> Option<f64> {
        let score_of = |attack_id: &str| {
            self.technique_vms
                .get(&format!("{}^{}", attack_id, tactic))
                .and_then(|tvm| tvm.score.filter(|s| s.is_finite()))
        };

        let mut entries = 1usize;
        let mut scores: Vec<f64> = score_of(&technique.attack_id).into_iter().collect();
        for sub in domain.subtechniques_of(technique).filter(|s| s.in_tactic(tactic)) {
            entries += 1;
            if let Some(score) = score_of(&sub.attack_id) {
                scores.push(score);
            }
        }

        if scores.is_empty() {
            return None;
        }

        let aggregate = match self.layout.aggregate_function {
            AggregateFunction::Min => scores.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateFunction::Sum => scores.iter().sum(),
            AggregateFunction::Average => {
                let count = if self.layout.count_unscored { entries } else { scores.len() };
                scores.iter().sum::<f64>() / count as f64
            }
        };

        Some(aggregate)
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn is_technique_selected(&self, technique: &Technique, tactic: &Tactic) -> bool {
        self.selected_techniques.contains(&technique.get_technique_tactic_id(tactic))
    }

    pub fn selected_techniques(&self) -> &HashSet<String> {
        &self.selected_techniques
    }

    pub fn selected_count(&self) -> usize {
        self.selected_techniques.len()
    }

    /// Select one cell, honoring the across-tactics and with-parent options
    pub fn select_technique(&mut self, technique: &Technique, tactic: &Tactic, domain: &Domain) {
        if self.select_techniques_across_tactics {
            self.select_technique_across_tactics(technique, domain);
            return;
        }
        for t in self.family_in_tactic(technique, &tactic.shortname, domain) {
            self.selected_techniques.insert(format!("{}^{}", t, tactic.shortname));
        }
    }

    /// Inverse of `select_technique`
    pub fn unselect_technique(&mut self, technique: &Technique, tactic: &Tactic, domain: &Domain) {
        if self.select_techniques_across_tactics {
            self.unselect_technique_across_tactics(technique, domain);
            return;
        }
        for t in self.family_in_tactic(technique, &tactic.shortname, domain) {
            self.selected_techniques.remove(&format!("{}^{}", t, tactic.shortname));
        }
    }

    /// Select the technique under every tactic it appears in
    pub fn select_technique_across_tactics(&mut self, technique: &Technique, domain: &Domain) {
        for union_id in self.across_tactics_ids(technique, domain) {
            self.selected_techniques.insert(union_id);
        }
    }

    /// Unselect the technique under every tactic it appears in
    pub fn unselect_technique_across_tactics(&mut self, technique: &Technique, domain: &Domain) {
        for union_id in self.across_tactics_ids(technique, domain) {
            self.selected_techniques.remove(&union_id);
        }
    }

    pub fn clear_selected_techniques(&mut self) {
        self.selected_techniques.clear();
    }

    pub fn select_all_techniques(&mut self, domain: &Domain) {
        for technique in domain.all_techniques() {
            for tactic in &technique.tactics {
                self.selected_techniques.insert(format!("{}^{}", technique.attack_id, tactic));
            }
        }
    }

    /// Attack ids affected by selecting `technique` in one tactic.
    /// With `select_subtechniques_with_parent` a sub-technique redirects
    /// to its parent and a parent brings its sub-techniques along.
    fn family_in_tactic(&self, technique: &Technique, tactic: &str, domain: &Domain) -> Vec<String> {
        if !self.select_subtechniques_with_parent {
            return vec![technique.attack_id.clone()];
        }

        let root = domain.parent_of(technique).unwrap_or(technique);
        let mut ids = vec![root.attack_id.clone()];
        ids.extend(
            domain.subtechniques_of(root)
                .filter(|s| s.in_tactic(tactic))
                .map(|s| s.attack_id.clone()),
        );
        ids
    }

    /// Union ids affected by an across-tactics (un)selection
    fn across_tactics_ids(&self, technique: &Technique, domain: &Domain) -> Vec<String> {
        let mut family = vec![technique];
        if self.select_subtechniques_with_parent {
            let root = domain.parent_of(technique).unwrap_or(technique);
            family = vec![root];
            family.extend(domain.subtechniques_of(root));
        }

        family.iter()
            .flat_map(|t| t.tactics.iter().map(move |tactic| format!("{}^{}", t.attack_id, tactic)))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Highlight
    // ------------------------------------------------------------------------

    /// Highlight a technique, optionally scoped to one tactic column
    pub fn highlight_technique(&mut self, technique: &Technique, tactic: Option<&Tactic>) {
        let id = match (&technique.parent, self.select_subtechniques_with_parent && technique.is_subtechnique) {
            (Some(parent), true) => parent.clone(),
            _ => technique.id.clone(),
        };
        self.highlighted_techniques.insert(id);
        self.highlighted_tactic = tactic.map(|t| t.id.clone());
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted_tactic = None;
        self.highlighted_techniques.clear();
    }
}
