//! Layer Files
//!
//! JSON snapshot of a view-model: annotations, gradient, layout and
//! selection options. Field names follow the Navigator layer format v4.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{APP_VERSION, LAYER_VERSION, SUPPORTED_LAYER_MAJOR};
use crate::logic::color::Gradient;
use crate::logic::stix::{technique_tactic_union_id, Domain};
use super::model::ViewModel;
use super::types::LayoutOptions;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum LayerError {
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
    UnsupportedVersion(String),
    DomainMismatch { expected: String, actual: String },
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerError::IoError(e) => write!(f, "IO Error: {}", e),
            LayerError::SerializationError(e) => write!(f, "Serialization Error: {}", e),
            LayerError::UnsupportedVersion(v) => {
                write!(f, "Unsupported layer version {} (expected {}.x)", v, SUPPORTED_LAYER_MAJOR)
            }
            LayerError::DomainMismatch { expected, actual } => {
                write!(f, "Layer Domain Mismatch: Expected {}, Got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for LayerError {}

impl From<std::io::Error> for LayerError {
    fn from(err: std::io::Error) -> Self {
        LayerError::IoError(err)
    }
}

impl From<serde_json::Error> for LayerError {
    fn from(err: serde_json::Error) -> Self {
        LayerError::SerializationError(err)
    }
}

// ============================================================================
// LAYER DOCUMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerVersions {
    pub layer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigator: Option<String>,
}

impl Default for LayerVersions {
    fn default() -> Self {
        Self {
            layer: LAYER_VERSION.to_string(),
            attack: None,
            navigator: None,
        }
    }
}

/// One annotation entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerTechnique {
    #[serde(rename = "techniqueID")]
    pub technique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub domain: String,
    #[serde(default)]
    pub versions: LayerVersions,
    #[serde(default)]
    pub techniques: Vec<LayerTechnique>,
    #[serde(default)]
    pub gradient: Gradient,
    #[serde(default)]
    pub layout: LayoutOptions,
    #[serde(default = "default_true")]
    pub select_techniques_across_tactics: bool,
    #[serde(default)]
    pub select_subtechniques_with_parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

/// Outcome of applying a layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerReport {
    /// Annotation records updated
    pub applied: usize,
    /// Entries that matched nothing, as "techniqueID" or "techniqueID^tactic"
    pub skipped: Vec<String>,
}

impl Layer {
    /// Snapshot `vm`; only annotated records are written
    pub fn from_view_model(vm: &ViewModel, domain: &Domain) -> Self {
        let mut techniques = Vec::new();
        for technique in domain.all_techniques() {
            for tactic in &technique.tactics {
                let union_id = technique_tactic_union_id(&technique.attack_id, tactic);
                let Some(tvm) = vm.get_technique_vm_by_id(&union_id) else { continue };
                if !tvm.is_annotated() {
                    continue;
                }
                techniques.push(LayerTechnique {
                    technique_id: technique.attack_id.clone(),
                    tactic: Some(tactic.clone()),
                    score: tvm.score,
                    color: tvm.explicit_color().map(str::to_string),
                    comment: Some(tvm.comment.clone()).filter(|c| !c.is_empty()),
                    enabled: Some(tvm.enabled),
                });
            }
        }

        Self {
            name: vm.name.clone(),
            description: vm.description.clone(),
            domain: domain.id.clone(),
            versions: LayerVersions {
                layer: LAYER_VERSION.to_string(),
                attack: Some(domain.version.clone()),
                navigator: Some(APP_VERSION.to_string()),
            },
            techniques,
            gradient: vm.gradient.clone(),
            layout: vm.layout.clone(),
            select_techniques_across_tactics: vm.select_techniques_across_tactics,
            select_subtechniques_with_parent: vm.select_subtechniques_with_parent,
            exported_at: Some(Utc::now()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LayerError> {
        let layer: Layer = serde_json::from_str(json)?;
        layer.validate_version()?;
        Ok(layer)
    }

    pub fn to_json(&self) -> Result<String, LayerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Layer major version must be supported
    pub fn validate_version(&self) -> Result<(), LayerError> {
        let major = self.versions.layer
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u32>().ok());

        match major {
            Some(SUPPORTED_LAYER_MAJOR) => Ok(()),
            _ => Err(LayerError::UnsupportedVersion(self.versions.layer.clone())),
        }
    }

    /// Write this layer into `vm`. Options are copied, then annotations;
    /// unknown techniques and tactics are skipped and reported.
    pub fn apply(&self, vm: &mut ViewModel, domain: &Domain) -> Result<LayerReport, LayerError> {
        self.validate_version()?;
        if self.domain != domain.id {
            return Err(LayerError::DomainMismatch {
                expected: domain.id.clone(),
                actual: self.domain.clone(),
            });
        }
        if let Some(attack) = self.versions.attack.as_deref() {
            if attack != domain.version {
                log::warn!("Layer targets ATT&CK v{}, applying to v{}", attack, domain.version);
            }
        }

        vm.name = self.name.clone();
        vm.description = self.description.clone();
        vm.gradient = self.gradient.clone();
        vm.layout = self.layout.clone();
        vm.select_techniques_across_tactics = self.select_techniques_across_tactics;
        vm.select_subtechniques_with_parent = self.select_subtechniques_with_parent;

        let mut report = LayerReport::default();

        for entry in &self.techniques {
            let Some(technique) = domain.technique_by_attack_id(&entry.technique_id) else {
                log::warn!("Layer references unknown technique {}, skipping", entry.technique_id);
                report.skipped.push(entry.technique_id.clone());
                continue;
            };

            let tactics: Vec<&String> = match entry.tactic.as_deref() {
                Some(t) if technique.in_tactic(t) => technique.tactics.iter().filter(|s| *s == t).collect(),
                Some(t) => {
                    log::warn!("Technique {} is not under tactic {}, skipping", technique.attack_id, t);
                    report.skipped.push(technique_tactic_union_id(&technique.attack_id, t));
                    continue;
                }
                None => technique.tactics.iter().collect(),
            };

            for tactic in tactics {
                let union_id = technique_tactic_union_id(&technique.attack_id, tactic);
                let Some(tvm) = vm.get_technique_vm_by_id_mut(&union_id) else { continue };

                if let Some(score) = entry.score {
                    tvm.score = Some(score);
                }
                if let Some(color) = &entry.color {
                    tvm.color = Some(color.clone()).filter(|c| !c.is_empty());
                }
                if let Some(comment) = &entry.comment {
                    tvm.comment = comment.clone();
                }
                if let Some(enabled) = entry.enabled {
                    tvm.enabled = enabled;
                }
                report.applied += 1;
            }
        }

        vm.update_score_colors();
        vm.update_aggregate_scores(domain);

        log::info!(
            "Applied layer '{}': {} annotations, {} entries skipped",
            self.name,
            report.applied,
            report.skipped.len()
        );

        Ok(report)
    }
}
