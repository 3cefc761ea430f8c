//! Matrix Cell
//!
//! Derives the visual state of one matrix entry (technique x tactic, or a
//! technique alone) from the shared view-model. Pure reads; the only
//! cell-local state is the transient `show_contextmenu` flag.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::constants::{BASE_CELL_CLASSES, DISABLED_TEXT_COLOR, TEXT_COLOR_CANDIDATES};
use super::color::most_readable;
use super::stix::{DataService, Tactic, Technique};
use super::theme::Theme;
use super::viewmodel::{TechniqueVM, ViewModel};

/// Stand-in for pairs the view-model has no record for
static DEFAULT_ANNOTATION: Lazy<TechniqueVM> = Lazy::new(TechniqueVM::default);

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// Background style, `{"background": "<color>"}` when serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueBackground {
    pub background: String,
}

impl TechniqueBackground {
    pub fn new(color: &str) -> Self {
        Self { background: color.to_string() }
    }

    /// Inline CSS declaration
    pub fn css(&self) -> String {
        format!("background: {}", self.background)
    }
}

/// Everything a front end needs to draw one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub technique_id: String,
    pub technique_name: String,
    pub tactic: Option<String>,
    pub class: String,
    pub text_color: String,
    pub background: Option<TechniqueBackground>,
    pub highlighted: bool,
}

// ============================================================================
// CELL
// ============================================================================

#[derive(Debug, Clone)]
pub struct Cell<'a> {
    pub technique: &'a Technique,
    pub tactic: Option<&'a Tactic>,
    view_model: &'a ViewModel,
    data: &'a DataService,
    theme: Theme,
    /// Set while a context menu is open on this cell
    pub show_contextmenu: bool,
}

impl<'a> Cell<'a> {
    pub fn new(
        technique: &'a Technique,
        tactic: Option<&'a Tactic>,
        view_model: &'a ViewModel,
        data: &'a DataService,
        theme: Theme,
    ) -> Self {
        Self {
            technique,
            tactic,
            view_model,
            data,
            theme,
            show_contextmenu: false,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Annotation for this pair; `None` without a tactic
    fn annotation(&self) -> Option<&'a TechniqueVM> {
        let tactic = self.tactic?;
        let tvm = self.view_model.get_technique_vm(self.technique, tactic).unwrap_or_else(|| {
            log::debug!(
                "No annotation for {}, using defaults",
                self.technique.get_technique_tactic_id(tactic)
            );
            &*DEFAULT_ANNOTATION
        });
        Some(tvm)
    }

    /// An open context menu always keeps the highlight
    pub fn is_highlighted(&self) -> bool {
        if self.show_contextmenu {
            return true;
        }

        let vm = self.view_model;
        let id_to_match = match (&self.technique.parent, vm.select_subtechniques_with_parent) {
            (Some(parent), true) if self.technique.is_subtechnique => parent.as_str(),
            _ => self.technique.id.as_str(),
        };

        if !vm.highlighted_techniques.contains(id_to_match) {
            return false;
        }

        match vm.highlighted_tactic.as_deref() {
            // highlight from search: every column
            None => true,
            Some(highlighted) => {
                let tactic_matches = self.tactic.is_some_and(|t| t.id == highlighted);
                vm.select_techniques_across_tactics || tactic_matches
            }
        }
    }

    /// CSS classes, in a fixed order
    pub fn get_class(&self) -> String {
        let vm = self.view_model;
        let annotation = self.annotation();
        let mut class = String::from(BASE_CELL_CLASSES);

        if let Some(tactic) = self.tactic {
            if vm.is_technique_selected(self.technique, tactic) {
                class.push_str(" editing");
            }
        }
        if self.is_highlighted() {
            class.push_str(" highlight");
        }

        // layout config
        if vm.layout.show_id {
            class.push_str(" showID");
        }
        if vm.layout.show_name {
            class.push_str(" showName");
        }
        class.push(' ');
        class.push_str(vm.layout.layout.as_str());

        // annotations
        if annotation.is_some_and(|a| !a.comment.is_empty()) || self.has_notes() {
            class.push_str(" commented");
        }
        if self.get_technique_background().is_some() {
            class.push_str(" colored");
        }
        if annotation.is_some_and(|a| !a.enabled) {
            class.push_str(" disabled");
        }

        class
    }

    /// Most readable text color for the cell's current background
    pub fn get_technique_text_color(&self) -> &'static str {
        let default = self.theme.default_text_color();
        let Some(tvm) = self.annotation() else {
            return default;
        };
        if !tvm.enabled {
            return DISABLED_TEXT_COLOR;
        }

        let readable = |color: &str| most_readable(color, TEXT_COLOR_CANDIDATES).unwrap_or(default);

        if let Some(color) = tvm.explicit_color() {
            return readable(color);
        }
        if self.view_model.layout.show_aggregate_scores {
            if let Some(color) = tvm.aggregate_score_color.as_deref() {
                return readable(color);
            }
        }
        if tvm.has_numeric_score() {
            if let Some(color) = tvm.score_color.as_deref() {
                return readable(color);
            }
        }

        default
    }

    /// True if any note in the current domain references this technique
    pub fn has_notes(&self) -> bool {
        match self.data.get_domain(&self.view_model.domain_version_id) {
            Some(domain) => domain.notes_for(&self.technique.id).next().is_some(),
            None => {
                log::debug!("Domain {} not loaded, no notes", self.view_model.domain_version_id);
                false
            }
        }
    }

    /// Background style; suppressed while highlighted so the highlight shows
    pub fn get_technique_background(&self) -> Option<TechniqueBackground> {
        let tvm = self.annotation()?;
        if !tvm.enabled || self.is_highlighted() {
            return None;
        }

        if let Some(color) = tvm.explicit_color() {
            return Some(TechniqueBackground::new(color));
        }
        if self.view_model.layout.show_aggregate_scores && tvm.has_numeric_aggregate_score() {
            if let Some(color) = tvm.aggregate_score_color.as_deref() {
                return Some(TechniqueBackground::new(color));
            }
        }
        if tvm.score.is_some() {
            if let Some(color) = tvm.score_color.as_deref() {
                return Some(TechniqueBackground::new(color));
            }
        }

        None
    }

    pub fn render(&self) -> CellView {
        CellView {
            technique_id: self.technique.attack_id.clone(),
            technique_name: self.technique.name.clone(),
            tactic: self.tactic.map(|t| t.shortname.clone()),
            class: self.get_class(),
            text_color: self.get_technique_text_color().to_string(),
            background: self.get_technique_background(),
            highlighted: self.is_highlighted(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
