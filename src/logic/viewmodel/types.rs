//! ViewModel Types
//!
//! Annotation records and layout options. Data only.

use serde::{Deserialize, Serialize};

// ============================================================================
// TECHNIQUE ANNOTATION
// ============================================================================

/// Per (technique, tactic) annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechniqueVM {
    /// `"{attack_id}^{tactic_shortname}"`
    pub technique_tactic_union_id: String,
    pub technique_id: String,
    pub tactic_name: String,

    pub enabled: bool,
    pub comment: String,
    /// Explicit color set by the user
    pub color: Option<String>,
    pub score: Option<f64>,
    /// Derived from `score` through the gradient
    pub score_color: Option<String>,
    pub aggregate_score: Option<f64>,
    /// Derived from `aggregate_score` through the gradient
    pub aggregate_score_color: Option<String>,
}

impl Default for TechniqueVM {
    fn default() -> Self {
        Self {
            technique_tactic_union_id: String::new(),
            technique_id: String::new(),
            tactic_name: String::new(),
            enabled: true,
            comment: String::new(),
            color: None,
            score: None,
            score_color: None,
            aggregate_score: None,
            aggregate_score_color: None,
        }
    }
}

impl TechniqueVM {
    pub fn new(attack_id: &str, tactic_shortname: &str) -> Self {
        Self {
            technique_tactic_union_id: format!("{}^{}", attack_id, tactic_shortname),
            technique_id: attack_id.to_string(),
            tactic_name: tactic_shortname.to_string(),
            ..Default::default()
        }
    }

    pub fn has_numeric_score(&self) -> bool {
        self.score.is_some_and(f64::is_finite)
    }

    pub fn has_numeric_aggregate_score(&self) -> bool {
        self.aggregate_score.is_some_and(f64::is_finite)
    }

    /// Explicit color, ignoring empty strings
    pub fn explicit_color(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| !c.is_empty())
    }

    /// True if the user has changed anything on this record
    pub fn is_annotated(&self) -> bool {
        !self.enabled || !self.comment.is_empty() || self.explicit_color().is_some() || self.score.is_some()
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Side,
    Flat,
    Mini,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Side => "side",
            LayoutMode::Flat => "flat",
            LayoutMode::Mini => "mini",
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "side" => Ok(LayoutMode::Side),
            "flat" => Ok(LayoutMode::Flat),
            "mini" => Ok(LayoutMode::Mini),
            other => Err(format!("Unknown layout mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    #[default]
    Average,
    Min,
    Max,
    Sum,
}

/// Which fields a cell shows and how scores roll up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub layout: LayoutMode,
    #[serde(rename = "showID")]
    pub show_id: bool,
    pub show_name: bool,
    pub show_aggregate_scores: bool,
    pub aggregate_function: AggregateFunction,
    pub count_unscored: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            layout: LayoutMode::Side,
            show_id: false,
            show_name: true,
            show_aggregate_scores: false,
            aggregate_function: AggregateFunction::Average,
            count_unscored: false,
        }
    }
}
