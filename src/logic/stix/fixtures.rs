//! Test fixtures: a small enterprise domain and a matching STIX bundle

use serde_json::json;

use super::domain::{DataService, Domain};
use super::types::{Group, Matrix, Mitigation, Note, Software, SoftwareKind, Tactic, Technique};

pub const T1059: &str = "attack-pattern--t1059";
pub const T1059_001: &str = "attack-pattern--t1059-001";
pub const T1059_003: &str = "attack-pattern--t1059-003";
pub const T1547: &str = "attack-pattern--t1547";
pub const T1055: &str = "attack-pattern--t1055";
pub const T1055_001: &str = "attack-pattern--t1055-001";
pub const T1204: &str = "attack-pattern--t1204";

pub const EXECUTION: &str = "x-mitre-tactic--execution";
pub const PERSISTENCE: &str = "x-mitre-tactic--persistence";
pub const PRIV_ESC: &str = "x-mitre-tactic--privilege-escalation";
pub const DEFENSE_EVASION: &str = "x-mitre-tactic--defense-evasion";

pub const APT29: &str = "intrusion-set--apt29";
pub const LAZARUS: &str = "intrusion-set--lazarus";
pub const MIMIKATZ: &str = "tool--mimikatz";
pub const COBALT_STRIKE: &str = "malware--cobalt-strike";
pub const EXEC_PREVENTION: &str = "course-of-action--execution-prevention";
pub const AUDIT: &str = "course-of-action--audit";

fn technique(id: &str, attack_id: &str, name: &str, tactics: &[&str], parent: Option<&str>, subs: &[&str]) -> Technique {
    Technique {
        id: id.to_string(),
        attack_id: attack_id.to_string(),
        name: name.to_string(),
        tactics: tactics.iter().map(|t| t.to_string()).collect(),
        is_subtechnique: parent.is_some(),
        parent: parent.map(str::to_string),
        subtechniques: subs.iter().map(|s| s.to_string()).collect(),
        deprecated: false,
        revoked: false,
    }
}

fn tactic(id: &str, attack_id: &str, name: &str, shortname: &str) -> Tactic {
    Tactic {
        id: id.to_string(),
        attack_id: attack_id.to_string(),
        name: name.to_string(),
        shortname: shortname.to_string(),
    }
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// enterprise-attack v14 subset
pub fn domain() -> Domain {
    let mut d = Domain::new("enterprise-attack", "14");

    d.tactics = vec![
        tactic(EXECUTION, "TA0002", "Execution", "execution"),
        tactic(PERSISTENCE, "TA0003", "Persistence", "persistence"),
        tactic(PRIV_ESC, "TA0004", "Privilege Escalation", "privilege-escalation"),
        tactic(DEFENSE_EVASION, "TA0005", "Defense Evasion", "defense-evasion"),
    ];
    d.matrices = vec![Matrix {
        id: "x-mitre-matrix--enterprise".into(),
        name: "Enterprise ATT&CK".into(),
        tactic_refs: ids(&[EXECUTION, PERSISTENCE, PRIV_ESC, DEFENSE_EVASION]),
    }];

    d.techniques = vec![
        technique(T1059, "T1059", "Command and Scripting Interpreter", &["execution"], None, &[T1059_001, T1059_003]),
        technique(T1547, "T1547", "Boot or Logon Autostart Execution", &["persistence", "privilege-escalation"], None, &[]),
        technique(T1055, "T1055", "Process Injection", &["defense-evasion", "privilege-escalation"], None, &[T1055_001]),
        technique(T1204, "T1204", "User Execution", &["execution"], None, &[]),
    ];
    d.subtechniques = vec![
        technique(T1059_001, "T1059.001", "PowerShell", &["execution"], Some(T1059), &[]),
        technique(T1059_003, "T1059.003", "Windows Command Shell", &["execution"], Some(T1059), &[]),
        technique(T1055_001, "T1055.001", "Dynamic-link Library Injection", &["defense-evasion", "privilege-escalation"], Some(T1055), &[]),
    ];

    d.groups = vec![
        Group { id: APT29.into(), attack_id: "G0016".into(), name: "APT29".into() },
        Group { id: LAZARUS.into(), attack_id: "G0032".into(), name: "Lazarus Group".into() },
    ];
    d.software = vec![
        Software { id: MIMIKATZ.into(), attack_id: "S0002".into(), name: "Mimikatz".into(), kind: SoftwareKind::Tool },
        Software { id: COBALT_STRIKE.into(), attack_id: "S0154".into(), name: "Cobalt Strike".into(), kind: SoftwareKind::Malware },
    ];
    d.mitigations = vec![
        Mitigation { id: EXEC_PREVENTION.into(), attack_id: "M1038".into(), name: "Execution Prevention".into() },
        Mitigation { id: AUDIT.into(), attack_id: "M1047".into(), name: "Audit".into() },
    ];
    d.notes = vec![Note {
        id: "note--1".into(),
        content: "Seen in recent intrusions".into(),
        object_refs: ids(&[T1059]),
    }];

    d.relationships.group_uses.insert(APT29.into(), ids(&[T1059_001, T1547]));
    d.relationships.group_uses.insert(LAZARUS.into(), ids(&[T1204]));
    d.relationships.software_uses.insert(MIMIKATZ.into(), ids(&[T1055]));
    d.relationships.software_uses.insert(COBALT_STRIKE.into(), ids(&[T1059_001, T1055_001]));
    d.relationships.mitigates.insert(EXEC_PREVENTION.into(), ids(&[T1059, T1204]));
    for (child, parent) in [(T1059_001, T1059), (T1059_003, T1059), (T1055_001, T1055)] {
        d.relationships.subtechniques_of.insert(child.into(), parent.into());
    }

    d
}

pub fn data_service() -> DataService {
    DataService::with_domain(domain())
}

fn attack_ref(id: &str) -> serde_json::Value {
    json!([{ "source_name": "mitre-attack", "external_id": id }])
}

fn phases(names: &[&str]) -> serde_json::Value {
    serde_json::Value::Array(
        names.iter()
            .map(|n| json!({ "kill_chain_name": "mitre-attack", "phase_name": n }))
            .collect(),
    )
}

fn rel(kind: &str, source: &str, target: &str) -> serde_json::Value {
    json!({
        "type": "relationship",
        "id": format!("relationship--{}-{}", source, target),
        "relationship_type": kind,
        "source_ref": source,
        "target_ref": target,
    })
}

/// Small STIX 2.1 bundle exercising every object type the loader reads
pub fn bundle_json() -> String {
    json!({
        "type": "bundle",
        "id": "bundle--fixture",
        "objects": [
            { "type": "identity", "id": "identity--mitre", "name": "The MITRE Corporation" },
            { "type": "x-mitre-tactic", "id": EXECUTION, "name": "Execution",
              "x_mitre_shortname": "execution", "external_references": attack_ref("TA0002") },
            { "type": "x-mitre-tactic", "id": PERSISTENCE, "name": "Persistence",
              "x_mitre_shortname": "persistence", "external_references": attack_ref("TA0003") },
            { "type": "x-mitre-matrix", "id": "x-mitre-matrix--enterprise", "name": "Enterprise ATT&CK",
              "tactic_refs": [EXECUTION, PERSISTENCE] },
            { "type": "attack-pattern", "id": T1059, "name": "Command and Scripting Interpreter",
              "external_references": attack_ref("T1059"), "kill_chain_phases": phases(&["execution"]) },
            { "type": "attack-pattern", "id": T1059_001, "name": "PowerShell",
              "x_mitre_is_subtechnique": true,
              "external_references": attack_ref("T1059.001"), "kill_chain_phases": phases(&["execution"]) },
            { "type": "attack-pattern", "id": T1547, "name": "Boot or Logon Autostart Execution",
              "external_references": attack_ref("T1547"), "kill_chain_phases": phases(&["persistence"]) },
            { "type": "attack-pattern", "id": "attack-pattern--t9999", "name": "Old Technique",
              "x_mitre_deprecated": true,
              "external_references": attack_ref("T9999"), "kill_chain_phases": phases(&["execution"]) },
            { "type": "intrusion-set", "id": APT29, "name": "APT29", "external_references": attack_ref("G0016") },
            { "type": "intrusion-set", "id": "intrusion-set--retired", "name": "Retired Group", "revoked": true },
            { "type": "tool", "id": "tool--reg", "name": "Reg", "external_references": attack_ref("S0075") },
            { "type": "course-of-action", "id": EXEC_PREVENTION, "name": "Execution Prevention",
              "external_references": attack_ref("M1038") },
            { "type": "note", "id": "note--1", "content": "Check this", "object_refs": [T1059] },
            rel("subtechnique-of", T1059_001, T1059),
            rel("uses", APT29, T1059_001),
            rel("uses", APT29, "attack-pattern--t9999"),
            rel("uses", "tool--reg", T1547),
            { "type": "relationship", "id": "relationship--apt29-t1547-old", "relationship_type": "uses",
              "source_ref": APT29, "target_ref": T1547, "x_mitre_deprecated": true },
            rel("mitigates", EXEC_PREVENTION, T1059),
            rel("mitigates", EXEC_PREVENTION, T1059_001),
        ]
    })
    .to_string()
}
