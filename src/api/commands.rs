//! Session Commands - API for front ends
//!
//! A `NavigatorSession` owns the loaded content, the view-model and the
//! resolved theme. Objects are addressed by ATT&CK id (techniques),
//! shortname (tactics) or STIX id (groups, software, mitigations).

use std::path::PathBuf;

use serde::Serialize;

use crate::logic::cell::{Cell, CellView};
use crate::logic::config::NavigatorConfig;
use crate::logic::multiselect::{Multiselect, PickerEntry};
use crate::logic::stix::{DataService, Domain, PickerKind, Tactic, Technique};
use crate::logic::theme::{CookieJar, Theme};
use crate::logic::viewmodel::{self, Layer, LayerReport, ViewModel};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownDomain(String),
    UnknownTechnique(String),
    UnknownTactic(String),
    /// STIX id that is not a group, software or mitigation
    NotRelatable(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownDomain(id) => write!(f, "Domain not loaded: {}", id),
            SessionError::UnknownTechnique(id) => write!(f, "Unknown technique: {}", id),
            SessionError::UnknownTactic(name) => write!(f, "Unknown tactic: {}", name),
            SessionError::NotRelatable(id) => {
                write!(f, "{} is not a group, software or mitigation", id)
            }
        }
    }
}

impl std::error::Error for SessionError {}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One picker panel of the multiselect catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogGroup {
    pub kind: PickerKind,
    pub label: String,
    pub entries: Vec<PickerEntry>,
}

/// Related technique as reported to front ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedTechnique {
    pub attack_id: String,
    pub name: String,
    pub tactics: Vec<String>,
}

// ============================================================================
// SESSION
// ============================================================================

pub struct NavigatorSession {
    data: DataService,
    view_model: ViewModel,
    theme: Theme,
    config: NavigatorConfig,
}

impl NavigatorSession {
    /// Open a session on the configured domain. `cookie_header` is the raw
    /// `Cookie:` header, if any.
    pub fn new(
        data: DataService,
        config: NavigatorConfig,
        cookie_header: Option<&str>,
    ) -> Result<Self, SessionError> {
        let domain_version_id = config.domain_version_id();
        let domain = lookup_domain(&data, &domain_version_id)?;
        let view_model = ViewModel::new(domain, &config);

        let cookies = cookie_header.map(CookieJar::parse).unwrap_or_default();
        let theme = Theme::detect(&cookies, config.prefers_dark);

        log::info!(
            "Session opened on {} ({} techniques, {} theme)",
            domain_version_id,
            domain.all_techniques().count(),
            if theme.is_dark() { "dark" } else { "light" }
        );

        Ok(Self { data, view_model, theme, config })
    }

    /// Session over a single domain; the config's domain fields are replaced
    pub fn with_domain(
        domain: Domain,
        mut config: NavigatorConfig,
        cookie_header: Option<&str>,
    ) -> Result<Self, SessionError> {
        config.domain = domain.id.clone();
        config.attack_version = domain.version.clone();
        Self::new(DataService::with_domain(domain), config, cookie_header)
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view_model
    }

    pub fn view_model_mut(&mut self) -> &mut ViewModel {
        &mut self.view_model
    }

    pub fn data(&self) -> &DataService {
        &self.data
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Apply a user theme toggle; returns the cookie pair to persist
    pub fn set_theme(&mut self, dark: bool) -> String {
        self.theme = Theme::from_dark(dark);
        self.theme.to_cookie()
    }

    fn domain(&self) -> Result<&Domain, SessionError> {
        lookup_domain(&self.data, &self.view_model.domain_version_id)
    }

    fn layer_dir(&self) -> PathBuf {
        self.config.layer_dir.clone().unwrap_or_else(viewmodel::default_layer_dir)
    }
}

fn lookup_domain<'a>(data: &'a DataService, domain_version_id: &str) -> Result<&'a Domain, SessionError> {
    data.get_domain(domain_version_id)
        .ok_or_else(|| SessionError::UnknownDomain(domain_version_id.to_string()))
}

fn lookup_technique<'a>(domain: &'a Domain, attack_id: &str) -> Result<&'a Technique, SessionError> {
    domain.technique_by_attack_id(attack_id)
        .ok_or_else(|| SessionError::UnknownTechnique(attack_id.to_string()))
}

fn lookup_tactic<'a>(domain: &'a Domain, shortname: &str) -> Result<&'a Tactic, SessionError> {
    domain.tactic_by_shortname(shortname)
        .ok_or_else(|| SessionError::UnknownTactic(shortname.to_string()))
}

// ============================================================================
// CELL COMMANDS
// ============================================================================

/// Visual state of one cell. Without a tactic the cell stands for the
/// technique alone.
pub fn render_cell(
    session: &NavigatorSession,
    attack_id: &str,
    tactic: Option<&str>,
    show_contextmenu: bool,
) -> Result<CellView, String> {
    let domain = session.domain().map_err(|e| e.to_string())?;
    let technique = lookup_technique(domain, attack_id).map_err(|e| e.to_string())?;
    let tactic = tactic
        .map(|t| lookup_tactic(domain, t))
        .transpose()
        .map_err(|e| e.to_string())?;

    let mut cell = Cell::new(technique, tactic, &session.view_model, &session.data, session.theme);
    cell.show_contextmenu = show_contextmenu;
    Ok(cell.render())
}

/// Every technique x tactic cell, techniques before sub-techniques
pub fn render_matrix(session: &NavigatorSession) -> Result<Vec<CellView>, String> {
    let domain = session.domain().map_err(|e| e.to_string())?;

    let cells: Vec<CellView> = domain
        .all_techniques()
        .flat_map(|technique| {
            domain.tactics_of(technique).map(move |tactic| {
                Cell::new(technique, Some(tactic), &session.view_model, &session.data, session.theme)
                    .render()
            })
        })
        .collect();

    log::debug!("Rendered {} cells", cells.len());
    Ok(cells)
}

/// Set or clear the score of one technique-tactic pair
pub fn set_score(
    session: &mut NavigatorSession,
    attack_id: &str,
    tactic: &str,
    score: Option<f64>,
) -> Result<bool, String> {
    let domain = lookup_domain(&session.data, &session.view_model.domain_version_id)
        .map_err(|e| e.to_string())?;
    let technique = lookup_technique(domain, attack_id).map_err(|e| e.to_string())?;
    let tactic = lookup_tactic(domain, tactic).map_err(|e| e.to_string())?;

    let changed = session.view_model.set_score(technique, tactic, score);
    if changed {
        session.view_model.update_aggregate_scores(domain);
    }
    Ok(changed)
}

// ============================================================================
// HIGHLIGHT COMMANDS
// ============================================================================

pub fn highlight(session: &mut NavigatorSession, attack_id: &str, tactic: Option<&str>) -> Result<(), String> {
    let domain = lookup_domain(&session.data, &session.view_model.domain_version_id)
        .map_err(|e| e.to_string())?;
    let technique = lookup_technique(domain, attack_id).map_err(|e| e.to_string())?;
    let tactic = tactic
        .map(|t| lookup_tactic(domain, t))
        .transpose()
        .map_err(|e| e.to_string())?;

    session.view_model.highlight_technique(technique, tactic);
    Ok(())
}

pub fn clear_highlight(session: &mut NavigatorSession) {
    session.view_model.clear_highlight();
}

// ============================================================================
// MULTISELECT COMMANDS
// ============================================================================

pub fn multiselect_catalog(session: &NavigatorSession) -> Result<Vec<CatalogGroup>, String> {
    let domain = session.domain().map_err(|e| e.to_string())?;
    let multiselect = Multiselect::for_domain(domain);

    Ok(PickerKind::ALL
        .iter()
        .map(|kind| CatalogGroup {
            kind: *kind,
            label: kind.label().to_string(),
            entries: multiselect.entries(*kind),
        })
        .collect())
}

/// Techniques related to a group, software or mitigation
pub fn related_techniques(session: &NavigatorSession, stix_id: &str) -> Result<Vec<RelatedTechnique>, String> {
    let domain = session.domain().map_err(|e| e.to_string())?;
    let object = domain
        .related_object(stix_id)
        .ok_or_else(|| SessionError::NotRelatable(stix_id.to_string()).to_string())?;

    Ok(Multiselect::for_domain(domain)
        .get_related(object)
        .into_iter()
        .map(|t| RelatedTechnique {
            attack_id: t.attack_id.clone(),
            name: t.name.clone(),
            tactics: t.tactics.clone(),
        })
        .collect())
}

pub fn select_related(session: &mut NavigatorSession, stix_id: &str) -> Result<usize, String> {
    apply_related(session, stix_id, true)
}

pub fn deselect_related(session: &mut NavigatorSession, stix_id: &str) -> Result<usize, String> {
    apply_related(session, stix_id, false)
}

fn apply_related(session: &mut NavigatorSession, stix_id: &str, select: bool) -> Result<usize, String> {
    let domain = lookup_domain(&session.data, &session.view_model.domain_version_id)
        .map_err(|e| e.to_string())?;
    let Some(object) = domain.related_object(stix_id) else {
        log::warn!("Bulk selection requested for {}", stix_id);
        return Err(SessionError::NotRelatable(stix_id.to_string()).to_string());
    };

    let multiselect = Multiselect::for_domain(domain);
    Ok(if select {
        multiselect.select(&mut session.view_model, object)
    } else {
        multiselect.deselect(&mut session.view_model, object)
    })
}

pub fn clear_selection(session: &mut NavigatorSession) {
    session.view_model.clear_selected_techniques();
}

// ============================================================================
// LAYER COMMANDS
// ============================================================================

pub fn import_layer(session: &mut NavigatorSession, json: &str) -> Result<LayerReport, String> {
    let layer = Layer::from_json(json).map_err(|e| e.to_string())?;
    apply_layer(session, &layer)
}

pub fn export_layer(session: &NavigatorSession) -> Result<String, String> {
    let domain = session.domain().map_err(|e| e.to_string())?;
    Layer::from_view_model(&session.view_model, domain)
        .to_json()
        .map_err(|e| e.to_string())
}

/// Save the current layer under the configured layer directory
pub fn save_layer(session: &NavigatorSession) -> Result<PathBuf, String> {
    let domain = session.domain().map_err(|e| e.to_string())?;
    let layer = Layer::from_view_model(&session.view_model, domain);
    let path = viewmodel::layer_path(&session.layer_dir(), &layer.name);

    viewmodel::save_layer(&layer, &path).map_err(|e| e.to_string())?;
    log::info!("Layer '{}' saved to {}", layer.name, path.display());
    Ok(path)
}

/// Load a saved layer by name from the configured layer directory
pub fn load_layer(session: &mut NavigatorSession, name: &str) -> Result<LayerReport, String> {
    let path = viewmodel::layer_path(&session.layer_dir(), name);
    let layer = viewmodel::load_layer(&path).map_err(|e| e.to_string())?;
    apply_layer(session, &layer)
}

fn apply_layer(session: &mut NavigatorSession, layer: &Layer) -> Result<LayerReport, String> {
    let domain = lookup_domain(&session.data, &session.view_model.domain_version_id)
        .map_err(|e| e.to_string())?;
    let report = layer.apply(&mut session.view_model, domain).map_err(|e| e.to_string())?;

    if !report.skipped.is_empty() {
        log::warn!("Layer '{}': {} entries skipped", layer.name, report.skipped.len());
    }
    log::info!("Layer '{}' applied ({} annotations)", layer.name, report.applied);
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::stix::fixtures;

    fn session() -> NavigatorSession {
        NavigatorSession::new(fixtures::data_service(), NavigatorConfig::default(), None).unwrap()
    }

    #[test]
    fn test_unknown_domain() {
        let config = NavigatorConfig { attack_version: "99".into(), ..Default::default() };
        let err = NavigatorSession::new(fixtures::data_service(), config, None).err();
        assert_eq!(err, Some(SessionError::UnknownDomain("enterprise-attack-99".into())));
    }

    #[test]
    fn test_with_domain_overrides_config() {
        let mut domain = fixtures::domain();
        domain.version = "15".into();
        let session = NavigatorSession::with_domain(domain, NavigatorConfig::default(), None).unwrap();
        assert_eq!(session.view_model().domain_version_id, "enterprise-attack-15");
    }

    #[test]
    fn test_theme_from_cookie() {
        let session = NavigatorSession::new(
            fixtures::data_service(),
            NavigatorConfig::default(),
            Some("is_user_theme_dark=true"),
        )
        .unwrap();
        assert!(session.theme().is_dark());

        let cell = render_cell(&session, "T1204", Some("execution"), false).unwrap();
        assert_eq!(cell.text_color, "white");
    }

    #[test]
    fn test_set_theme_returns_cookie() {
        let mut session = session();
        assert_eq!(session.set_theme(true), "is_user_theme_dark=true");
        assert!(session.theme().is_dark());
    }

    #[test]
    fn test_render_cell_errors() {
        let session = session();
        assert!(render_cell(&session, "T9999", None, false).unwrap_err().contains("T9999"));
        assert!(render_cell(&session, "T1059", Some("impact"), false).unwrap_err().contains("impact"));
    }

    #[test]
    fn test_render_cell_without_tactic() {
        let session = session();
        let cell = render_cell(&session, "T1059", None, false).unwrap();
        assert_eq!(cell.tactic, None);
        assert_eq!(cell.background, None);
    }

    #[test]
    fn test_render_matrix_covers_every_pair() {
        let session = session();
        let cells = render_matrix(&session).unwrap();
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[0].technique_id, "T1059");
    }

    #[test]
    fn test_score_changes_background() {
        let mut session = session();
        assert!(set_score(&mut session, "T1204", "execution", Some(0.0)).unwrap());

        let cell = render_cell(&session, "T1204", Some("execution"), false).unwrap();
        assert_eq!(cell.background.unwrap().background, "#ff6666");
        assert!(cell.class.contains("colored"));
    }

    #[test]
    fn test_highlight_and_clear() {
        let mut session = session();
        highlight(&mut session, "T1547", Some("persistence")).unwrap();
        assert!(render_cell(&session, "T1547", Some("persistence"), false).unwrap().highlighted);

        clear_highlight(&mut session);
        assert!(!render_cell(&session, "T1547", Some("persistence"), false).unwrap().highlighted);
    }

    #[test]
    fn test_catalog() {
        let session = session();
        let catalog = multiselect_catalog(&session).unwrap();
        let labels: Vec<_> = catalog.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["threat groups", "software", "mitigations"]);
        assert_eq!(catalog[0].entries[0].name, "APT29");
        assert_eq!(catalog[0].entries[0].related_count, 2);
    }

    #[test]
    fn test_related_techniques() {
        let session = session();
        let related = related_techniques(&session, fixtures::MIMIKATZ).unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].attack_id, "T1055");
        assert_eq!(related[0].tactics, vec!["defense-evasion", "privilege-escalation"]);
    }

    #[test]
    fn test_select_and_deselect_related() {
        let mut session = session();
        assert_eq!(select_related(&mut session, fixtures::EXEC_PREVENTION).unwrap(), 2);
        assert_eq!(session.view_model().selected_count(), 2);

        assert_eq!(deselect_related(&mut session, fixtures::EXEC_PREVENTION).unwrap(), 2);
        assert_eq!(session.view_model().selected_count(), 0);

        select_related(&mut session, fixtures::LAZARUS).unwrap();
        clear_selection(&mut session);
        assert_eq!(session.view_model().selected_count(), 0);
    }

    #[test]
    fn test_non_relatable_id_is_rejected() {
        let mut session = session();
        let err = select_related(&mut session, fixtures::T1059).unwrap_err();
        assert_eq!(err, SessionError::NotRelatable(fixtures::T1059.into()).to_string());
        assert!(related_techniques(&session, "campaign--x").is_err());
        assert_eq!(session.view_model().selected_count(), 0);
    }

    #[test]
    fn test_layer_export_import() {
        let mut source = session();
        set_score(&mut source, "T1547", "persistence", Some(50.0)).unwrap();
        let json = export_layer(&source).unwrap();

        let mut target = session();
        let report = import_layer(&mut target, &json).unwrap();
        assert_eq!(report.applied, 1);
        assert!(report.skipped.is_empty());

        let cell = render_cell(&target, "T1547", Some("persistence"), false).unwrap();
        assert_eq!(cell.background.unwrap().background, "#ffe766");
    }

    #[test]
    fn test_import_rejects_bad_json() {
        let mut session = session();
        assert!(import_layer(&mut session, "{not json").is_err());
    }

    #[test]
    fn test_save_and_load_layer() {
        let dir = tempfile::tempdir().unwrap();
        let config = NavigatorConfig {
            layer_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let mut source = NavigatorSession::new(fixtures::data_service(), config.clone(), None).unwrap();
        source.view_model_mut().name = "red team".into();
        set_score(&mut source, "T1204", "execution", Some(100.0)).unwrap();
        let path = save_layer(&source).unwrap();
        assert!(path.ends_with("red_team.json"));

        let mut target = NavigatorSession::new(fixtures::data_service(), config, None).unwrap();
        let report = load_layer(&mut target, "red team").unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(target.view_model().name, "red team");
    }
}
