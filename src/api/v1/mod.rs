//! API v1 Module
//!
//! Re-exports the session commands so later versions can coexist.

pub use super::commands::{
    clear_highlight, clear_selection, deselect_related, export_layer, highlight, import_layer,
    load_layer, multiselect_catalog, related_techniques, render_cell, render_matrix, save_layer,
    select_related, set_score, CatalogGroup, NavigatorSession, RelatedTechnique, SessionError,
};
