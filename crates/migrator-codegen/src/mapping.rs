//! §4.5 "Component resolution": `(ir_type, ir_subtype) → talend_component`,
//! consulting an external [`MappingRepository`] before the built-in
//! fallback table. C5 in the component table — the trait is the contract,
//! the concrete repository (DB-backed or otherwise) lives outside this
//! crate.

use log::warn;
use migrator_ir::{IRNode, IRNodeType};

use crate::error::{CodeGenResult, MappingNotFoundError};

/// External collaborator providing a `(ir_type, ir_subtype) →
/// talend_component` table, e.g. backed by a database (§6 env vars
/// `ETL_MIGRATOR_MAPPING_DSN` et al. configure a concrete implementation
/// elsewhere; this crate only depends on the trait).
pub trait MappingRepository {
    fn lookup(&self, ir_type: &str, ir_subtype: &str) -> Option<String>;
}

/// A repository with no entries: every lookup falls straight through to
/// the built-in table. Used when no external mapping source is configured.
pub struct NullMappingRepository;

impl MappingRepository for NullMappingRepository {
    fn lookup(&self, _ir_type: &str, _ir_subtype: &str) -> Option<String> {
        None
    }
}

/// Resolve the Talend component name for an IR node (§4.5).
///
/// Fallback chain: external repository match on `(type,subtype)`, then
/// `(type,"")`, then `props.customType`, then the hard-coded defaults
/// below. In strict mode an unresolved node is a [`MappingNotFoundError`];
/// otherwise it falls back to `tUnknown`.
pub fn resolve_component(
    node: &IRNode,
    repo: &dyn MappingRepository,
    strict: bool,
) -> CodeGenResult<String> {
    let ir_type = ir_type_name(node.node_type);

    if let Some(name) = repo.lookup(ir_type, &node.subtype) {
        return Ok(name);
    }
    if let Some(name) = repo.lookup(ir_type, "") {
        return Ok(name);
    }
    if let Some(custom) = node.props.get("customType") {
        return Ok(custom.clone());
    }

    match default_component_for(node.node_type, &node.subtype) {
        Some(name) => Ok(name.to_string()),
        None if strict => Err(MappingNotFoundError::Unresolved {
            ir_type: ir_type.to_string(),
            ir_subtype: node.subtype.clone(),
        }
        .into()),
        None => {
            warn!("node '{}': no component mapping for {ir_type}/{}, falling back to tUnknown", node.id, node.subtype);
            Ok("tUnknown".to_string())
        }
    }
}

fn ir_type_name(node_type: IRNodeType) -> &'static str {
    match node_type {
        IRNodeType::Source => "Source",
        IRNodeType::Sink => "Sink",
        IRNodeType::Transform => "Transform",
        IRNodeType::Lookup => "Lookup",
        IRNodeType::Join => "Join",
        IRNodeType::Merge => "Merge",
        IRNodeType::Deduplicate => "Deduplicate",
        IRNodeType::Aggregate => "Aggregate",
    }
}

/// Grounded against `original_source/translation_service.py`'s `type_map`
/// fallback: `database_read→tDB2Input`, `database_write→tDB2Output`,
/// `file_read→tFileInputDelimited`, `file_write→tFileOutputDelimited`,
/// `transform|lookup→tMap`, `custom_write|custom_read→tJavaRow`, else
/// `tUnknown`.
fn default_component_for(node_type: IRNodeType, subtype: &str) -> Option<&'static str> {
    match (node_type, subtype) {
        (IRNodeType::Source, "File") => Some("tFileInputDelimited"),
        (IRNodeType::Sink, "File") => Some("tFileOutputDelimited"),
        (IRNodeType::Source, "Custom") => Some("tJavaRow"),
        (IRNodeType::Sink, "Custom") => Some("tJavaRow"),
        (IRNodeType::Transform, "Custom") => Some("tJavaRow"),
        (IRNodeType::Transform, "Map") => Some("tMap"),
        (IRNodeType::Lookup, _) => Some("tMap"),
        (IRNodeType::Join, _) => Some("tMap"),
        (IRNodeType::Merge, _) => Some("tUnite"),
        (IRNodeType::Deduplicate, _) => Some("tUniqRow"),
        (IRNodeType::Aggregate, _) => Some("tAggregateRow"),
        (IRNodeType::Source, db) if is_db_subtype(db) => Some(db_component_override(db, true)),
        (IRNodeType::Sink, db) if is_db_subtype(db) => Some(db_component_override(db, false)),
        _ => None,
    }
}

fn is_db_subtype(subtype: &str) -> bool {
    !subtype.is_empty() && subtype != "File" && subtype != "Custom" && subtype != "Map"
}

/// Whether a resolved Talend component name denotes a database connector,
/// used by the job builder's DB-passthrough exclusion (§4.5).
pub fn is_db_component(component: &str) -> bool {
    matches!(
        component,
        "tDB2Input" | "tDB2Output" | "tOracleInput" | "tOracleOutput" | "tDBInput" | "tDBOutput"
    )
}

/// Well-known component-name overrides for specific database flavors,
/// falling back to the generic `tDBInput`/`tDBOutput` pair otherwise.
fn db_component_override(subtype: &str, is_input: bool) -> &'static str {
    match (subtype, is_input) {
        ("DB2", true) => "tDB2Input",
        ("DB2", false) => "tDB2Output",
        ("Oracle", true) => "tOracleInput",
        ("Oracle", false) => "tOracleOutput",
        ("ODBC", true) => "tDBInput",
        ("ODBC", false) => "tDBOutput",
        (_, true) => "tDBInput",
        (_, false) => "tDBOutput",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_ir::{Provenance, TransformationDetails};
    use std::collections::HashMap;

    fn node(node_type: IRNodeType, subtype: &str) -> IRNode {
        IRNode {
            id: "n0".into(),
            node_type,
            subtype: subtype.to_string(),
            name: "Stage".into(),
            props: HashMap::new(),
            schema_ref: None,
            trx_gen_code: None,
            trx_class_name: None,
            transformation_details: TransformationDetails {
                has_transformations: false,
                transformation_count: 0,
                complexity_score: 0,
            },
            provenance: Provenance {
                source: "dsx".into(),
                location: "Job.dsx".into(),
                line_start: "--".into(),
                line_end: "--".into(),
            },
        }
    }

    #[test]
    fn resolves_file_source_and_sink() {
        let repo = NullMappingRepository;
        assert_eq!(
            resolve_component(&node(IRNodeType::Source, "File"), &repo, false).unwrap(),
            "tFileInputDelimited"
        );
        assert_eq!(
            resolve_component(&node(IRNodeType::Sink, "File"), &repo, false).unwrap(),
            "tFileOutputDelimited"
        );
    }

    #[test]
    fn resolves_db2_override() {
        let repo = NullMappingRepository;
        assert_eq!(
            resolve_component(&node(IRNodeType::Source, "DB2"), &repo, false).unwrap(),
            "tDB2Input"
        );
    }

    #[test]
    fn transform_map_resolves_to_tmap() {
        let repo = NullMappingRepository;
        assert_eq!(
            resolve_component(&node(IRNodeType::Transform, "Map"), &repo, false).unwrap(),
            "tMap"
        );
    }

    #[test]
    fn unresolved_falls_back_to_unknown_in_lenient_mode() {
        let repo = NullMappingRepository;
        assert_eq!(
            resolve_component(&node(IRNodeType::Transform, "Weird"), &repo, false).unwrap(),
            "tUnknown"
        );
    }

    #[test]
    fn unresolved_is_an_error_in_strict_mode() {
        let repo = NullMappingRepository;
        assert!(resolve_component(&node(IRNodeType::Transform, "Weird"), &repo, true).is_err());
    }

    #[test]
    fn custom_type_override_wins_before_defaults() {
        let repo = NullMappingRepository;
        let mut n = node(IRNodeType::Transform, "Weird");
        n.props.insert("customType".to_string(), "tCustomThing".to_string());
        assert_eq!(resolve_component(&n, &repo, false).unwrap(), "tCustomThing");
    }
}
