//! §4.5: the Talend job builder (C6). Consumes an IR document plus a
//! [`MappingRepository`] and produces an in-memory [`TalendJob`] that `xml.rs`
//! can serialize. Grounded against `original_source/translation_service.py`'s
//! node-building pass (positioning table around its line 629, per-component
//! parameter tables around lines 1052-1780, tMap expression translation at
//! `_convert_ir_expression_to_talend`).

use std::collections::{HashMap, HashSet};

use log::warn;
use migrator_ir::{Ir, IRLink, IRNode, IRNodeType, SchemaColumn};

use crate::error::CodeGenResult;
use crate::mapping::{self, MappingRepository};
use crate::talend_model::{
    ElementParameter, ElementValueRow, MapperData, MapperInputTable, MapperOutputTable, MapperTableEntry,
    Metadata, MetadataColumn, NodeData, ParamField, TalendConnection, TalendJob, TalendNode,
};

pub struct BuildOptions {
    pub strict: bool,
    pub allow_db_passthrough: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            strict: false,
            allow_db_passthrough: true,
        }
    }
}

pub fn build(ir: &Ir, repo: &dyn MappingRepository, options: &BuildOptions) -> CodeGenResult<TalendJob> {
    let mut components: HashMap<String, String> = HashMap::new();
    for node in &ir.nodes {
        let name = mapping::resolve_component(node, repo, options.strict)?;
        components.insert(node.id.clone(), name);
    }

    let excluded: HashSet<String> = if options.allow_db_passthrough {
        HashSet::new()
    } else {
        ir.nodes
            .iter()
            .filter(|n| mapping::is_db_component(&components[&n.id]))
            .map(|n| n.id.clone())
            .collect()
    };

    let links = police_links(ir, &excluded);
    let schemas = propagate_schemas(ir, &links);
    let positions = layout(ir.nodes.len());

    let mut nodes = Vec::with_capacity(ir.nodes.len());
    for (idx, node) in ir.nodes.iter().enumerate() {
        let component_name = components[&node.id].clone();
        let schema = schemas.get(&node.id).cloned().unwrap_or_default();
        let (pos_x, pos_y) = positions[idx];
        let incoming: Vec<&IRLink> = links.iter().filter(|l| l.to.node_id == node.id).collect();
        let outgoing: Vec<&IRLink> = links.iter().filter(|l| l.from.node_id == node.id).collect();

        let parameters = synth_parameters(node, &component_name, &schema);
        let metadata = synth_metadata(node, &component_name, &schema);
        let node_data = synth_node_data(ir, node, &component_name, &schema, &incoming, &outgoing);

        let component_version = component_version_for(&component_name);
        nodes.push(TalendNode {
            component_name,
            component_version,
            unique_name: sanitize_unique_name(&node.name),
            pos_x,
            pos_y,
            parameters,
            metadata,
            node_data,
        });
    }

    let unique_names: HashMap<&str, String> = ir
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), sanitize_unique_name(&n.name)))
        .collect();

    let connections = links
        .iter()
        .map(|link| TalendConnection {
            source: unique_names[link.from.node_id.as_str()].clone(),
            target: unique_names[link.to.node_id.as_str()].clone(),
            connector_name: "FLOW".to_string(),
            label: link.from.port.clone(),
            line_style: 0,
            metaname: link.schema_ref.clone().unwrap_or_default(),
            offset_label_x: 0,
            offset_label_y: 0,
            parameters: Vec::new(),
        })
        .collect();

    Ok(TalendJob {
        name: ir.job.name.clone(),
        nodes,
        connections,
    })
}

/// §4.5 "Data-flow policing": drop links that violate Talend's DAG rules,
/// collapse bidirectional pairs to the lexicographically-smaller source.
fn police_links(ir: &Ir, excluded: &HashSet<String>) -> Vec<IRLink> {
    let mut kept: Vec<IRLink> = Vec::new();
    let mut pair_index: HashMap<(String, String), usize> = HashMap::new();

    for link in &ir.links {
        if excluded.contains(&link.from.node_id) || excluded.contains(&link.to.node_id) {
            warn!("link '{}': dropped, references an excluded DB node", link.id);
            continue;
        }
        if matches!(ir.node(&link.from.node_id).map(|n| n.node_type), Some(IRNodeType::Sink)) {
            warn!("link '{}': dropped, source node '{}' is a Sink", link.id, link.from.node_id);
            continue;
        }
        if matches!(ir.node(&link.to.node_id).map(|n| n.node_type), Some(IRNodeType::Source)) {
            warn!("link '{}': dropped, target node '{}' is a Source", link.id, link.to.node_id);
            continue;
        }

        let key = unordered_key(&link.from.node_id, &link.to.node_id);
        if let Some(&idx) = pair_index.get(&key) {
            if link.from.node_id < kept[idx].from.node_id {
                warn!(
                    "link '{}': reciprocal of '{}', keeping the lexicographically-smaller source",
                    kept[idx].id, link.id
                );
                kept[idx] = link.clone();
            } else {
                warn!(
                    "link '{}': reciprocal of '{}', dropped in favor of the lexicographically-smaller source",
                    link.id, kept[idx].id
                );
            }
            continue;
        }
        pair_index.insert(key, kept.len());
        kept.push(link.clone());
    }

    kept
}

fn unordered_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// §4.5 "Schema propagation": nodes with no schema of their own inherit one
/// from a kept incoming link; empty-schema Source nodes probe downstream.
fn propagate_schemas(ir: &Ir, links: &[IRLink]) -> HashMap<String, Vec<SchemaColumn>> {
    let mut schemas: HashMap<String, Vec<SchemaColumn>> = HashMap::new();
    for node in &ir.nodes {
        let own = ir.schema(node).map(|s| s.to_vec()).unwrap_or_default();
        schemas.insert(node.id.clone(), own);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for link in links {
            let to_empty = schemas.get(&link.to.node_id).map(|s| s.is_empty()).unwrap_or(true);
            if !to_empty {
                continue;
            }
            let from_schema = schemas.get(&link.from.node_id).cloned().unwrap_or_default();
            if !from_schema.is_empty() {
                schemas.insert(link.to.node_id.clone(), from_schema);
                changed = true;
            }
        }
    }

    for node in &ir.nodes {
        if node.node_type != IRNodeType::Source {
            continue;
        }
        let empty = schemas.get(&node.id).map(|s| s.is_empty()).unwrap_or(true);
        if !empty {
            continue;
        }
        if let Some(link) = links.iter().find(|l| l.from.node_id == node.id) {
            let downstream = schemas.get(&link.to.node_id).cloned().unwrap_or_default();
            if !downstream.is_empty() {
                schemas.insert(node.id.clone(), downstream);
            }
        }
    }

    schemas
}

/// §4.5 "Positioning". `max_per_row` packs small jobs into a single row
/// rather than one node per row (a count of 1 with `max_per_row == 1` would
/// still be "1 row", so the bound is the node count itself up to 3).
fn layout(count: usize) -> Vec<(i64, i64)> {
    const SPACING_X: i64 = 250;
    const SPACING_Y: i64 = 200;

    let max_per_row = if count <= 3 {
        count.max(1)
    } else if count <= 6 {
        3
    } else if count <= 12 {
        4
    } else {
        5
    };

    let mut positions = Vec::with_capacity(count);
    for idx in 0..count {
        let row = idx / max_per_row;
        let col = idx % max_per_row;
        let pos_x = 100 + (col as i64) * SPACING_X;
        let pos_y = 100 + (row as i64) * SPACING_Y + (col as i64) * 20;
        positions.push((pos_x, pos_y));
    }

    let mut row_start = 0;
    while row_start < positions.len() {
        let row_end = (row_start + max_per_row).min(positions.len());
        for i in (row_start + 1)..row_end {
            if positions[i].0 <= positions[i - 1].0 {
                positions[i].0 = positions[i - 1].0 + SPACING_X;
            }
        }
        row_start = row_end;
    }

    positions
}

/// §9 "Open questions — resolved": component versions are hard-coded, not
/// negotiated against a Talend Studio install.
fn component_version_for(component: &str) -> String {
    if component == "tMap" {
        "2.1".to_string()
    } else {
        "0.102".to_string()
    }
}

fn sanitize_unique_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "node".to_string()
    } else {
        cleaned
    }
}

/// Strip `0file/`/`0file\`, normalize separators, drop a drive letter, and
/// wrap in real quote characters. The XML emitter escapes these to `&quot;`
/// on write; pre-encoding here would double-escape.
fn normalize_path(raw: &str) -> String {
    let mut path = raw.replace("0file/", "").replace("0file\\", "");
    path = path.replace('\\', "/");
    if path.len() >= 2 && path.as_bytes()[1] == b':' && path.as_bytes()[0].is_ascii_alphabetic() {
        path = path[2..].to_string();
    }
    format!("\"{path}\"")
}

fn prop(node: &IRNode, key: &str) -> Option<&str> {
    node.props.get(key).map(|v| v.as_str())
}

fn prop_bool(node: &IRNode, key: &str, default: bool) -> bool {
    prop(node, key).map(|v| v.eq_ignore_ascii_case("true") || v == "1").unwrap_or(default)
}

fn synth_parameters(node: &IRNode, component: &str, schema: &[SchemaColumn]) -> Vec<ElementParameter> {
    match component {
        "tFileInputDelimited" => file_input_parameters(node, schema),
        "tFileOutputDelimited" => file_output_parameters(node),
        "tMap" => tmap_parameters(),
        c if mapping::is_db_component(c) => db_parameters(node, c.ends_with("Input")),
        _ => {
            let _ = schema;
            Vec::new()
        }
    }
}

fn file_input_parameters(node: &IRNode, schema: &[SchemaColumn]) -> Vec<ElementParameter> {
    let raw_path = prop(node, "FilePath").or_else(|| prop(node, "FileName")).unwrap_or("");
    let separator = prop(node, "Delimiter").unwrap_or(",");
    let header = prop_bool(node, "firstLineColumnNames", false);

    let mut params = vec![
        ElementParameter::new(ParamField::File, "FILENAME", normalize_path(raw_path)),
        ElementParameter::new(ParamField::Text, "FIELDSEPARATOR", format!("\"{separator}\"")),
        ElementParameter::new(ParamField::Text, "ROWSEPARATOR", "\"\\n\""),
        ElementParameter::new(ParamField::Text, "HEADER", if header { "1" } else { "0" }),
        ElementParameter::new(ParamField::EncodingType, "ENCODING", "\"ISO-8859-15\""),
        ElementParameter::new(ParamField::Check, "CSV_OPTION", bool_str(node, "csv_option", false)),
        ElementParameter::new(ParamField::Check, "REMOVE_EMPTY_ROW", bool_str(node, "remove_empty_row", true)),
        ElementParameter::new(ParamField::Check, "DIE_ON_ERROR", bool_str(node, "die_on_error", false)),
        ElementParameter::new(ParamField::Check, "TRIMALL", bool_str(node, "trim_all", false)),
        ElementParameter::new(ParamField::Check, "SPLITRECORD", bool_str(node, "advanced_separator", false)),
        ElementParameter::new(ParamField::Text, "LIMIT", prop(node, "row_limit").unwrap_or("")),
    ];
    params.push(ElementParameter::table("TRIMSELECT", schema_flag_rows(schema, "TRIM")));
    params.push(ElementParameter::table("DECODE_COLS", schema_flag_rows(schema, "DECODE")).hidden());
    params
}

/// One `SCHEMA_COLUMN`/`flag_ref` row pair per column, for `TRIMSELECT` and
/// `DECODE_COLS` (both default their flag to `"false"` on migration).
fn schema_flag_rows(schema: &[SchemaColumn], flag_ref: &str) -> Vec<ElementValueRow> {
    schema
        .iter()
        .enumerate()
        .flat_map(|(i, col)| {
            let base = (i * 2) as u32;
            vec![
                ElementValueRow {
                    element_ref: "SCHEMA_COLUMN".to_string(),
                    value: col.name.clone(),
                    id: base,
                },
                ElementValueRow {
                    element_ref: flag_ref.to_string(),
                    value: "false".to_string(),
                    id: base + 1,
                },
            ]
        })
        .collect()
}

fn file_output_parameters(node: &IRNode) -> Vec<ElementParameter> {
    let raw_path = prop(node, "FilePath").or_else(|| prop(node, "FileName")).unwrap_or("");
    let separator = prop(node, "Delimiter").unwrap_or(",");

    vec![
        ElementParameter::new(ParamField::File, "FILENAME", normalize_path(raw_path)),
        ElementParameter::new(ParamField::Text, "FIELDSEPARATOR", format!("\"{separator}\"")),
        ElementParameter::new(ParamField::Text, "ROWSEPARATOR", "\"\\n\""),
        ElementParameter::new(ParamField::EncodingType, "ENCODING", "\"ISO-8859-15\""),
        ElementParameter::new(ParamField::Check, "APPEND", bool_str(node, "append", false)),
        ElementParameter::new(ParamField::Check, "INCLUDEHEADER", bool_str(node, "include_header", false)),
        ElementParameter::new(ParamField::Check, "COMPRESS", bool_str(node, "compress", false)),
        ElementParameter::new(ParamField::Check, "CREATE", bool_str(node, "create_dir", true)),
        ElementParameter::new(ParamField::Check, "SPLIT", bool_str(node, "split", false)),
    ]
}

fn bool_str(node: &IRNode, key: &str, default: bool) -> &'static str {
    if prop_bool(node, key, default) {
        "true"
    } else {
        "false"
    }
}

fn tmap_parameters() -> Vec<ElementParameter> {
    vec![
        ElementParameter::new(ParamField::External, "MAP", ""),
        ElementParameter::new(ParamField::ClosedList, "LINK_STYLE", "AUTO"),
        ElementParameter::new(ParamField::Directory, "TEMPORARY_DATA_DIRECTORY", ""),
        ElementParameter::new(ParamField::Check, "DIE_ON_ERROR", "true").hidden(),
        ElementParameter::new(ParamField::Text, "ROWS_BUFFER_SIZE", "2000000"),
        ElementParameter::new(ParamField::Text, "CONNECTION_FORMAT", "row"),
    ]
}

fn db_parameters(node: &IRNode, is_input: bool) -> Vec<ElementParameter> {
    let mut params = vec![
        ElementParameter::new(ParamField::Text, "HOST", prop(node, "ServerName").unwrap_or("")),
        ElementParameter::new(ParamField::Text, "DBNAME", prop(node, "DatabaseName").unwrap_or("")),
        ElementParameter::new(ParamField::DbTable, "TABLE", prop(node, "TableName").unwrap_or("")),
        ElementParameter::new(ParamField::Text, "SCHEMA", prop(node, "SchemaName").unwrap_or("")),
    ];
    if is_input {
        params.push(ElementParameter::new(ParamField::Text, "QUERY", prop(node, "SelectStatement").unwrap_or("")));
    } else {
        params.push(ElementParameter::new(ParamField::ClosedList, "DATA_ACTION", "INSERT"));
        params.push(ElementParameter::new(ParamField::Check, "COMMIT_EVERY", "10000"));
    }
    params
}

fn synth_metadata(node: &IRNode, component: &str, schema: &[SchemaColumn]) -> Vec<Metadata> {
    if schema.is_empty() {
        return Vec::new();
    }
    let columns: Vec<MetadataColumn> = schema.iter().map(column_to_metadata).collect();
    let mut metadata = vec![Metadata {
        connector: "FLOW".to_string(),
        name: "metadata".to_string(),
        columns: columns.clone(),
    }];

    if component == "tFileInputDelimited" {
        let mut reject_columns = columns;
        reject_columns.push(MetadataColumn {
            name: "errorCode".to_string(),
            talend_type: "id_String".to_string(),
            nullable: true,
            length: None,
            precision: None,
            key: false,
            source_type: String::new(),
            pattern: String::new(),
            original_length: None,
            useful_column: true,
            comment: String::new(),
        });
        reject_columns.push(MetadataColumn {
            name: "errorMessage".to_string(),
            talend_type: "id_String".to_string(),
            nullable: true,
            length: None,
            precision: None,
            key: false,
            source_type: String::new(),
            pattern: String::new(),
            original_length: None,
            useful_column: true,
            comment: String::new(),
        });
        metadata.push(Metadata {
            connector: "REJECT".to_string(),
            name: "reject".to_string(),
            columns: reject_columns,
        });
    }

    metadata
}

fn column_to_metadata(col: &SchemaColumn) -> MetadataColumn {
    MetadataColumn {
        name: col.name.clone(),
        talend_type: col.type_name.clone(),
        nullable: col.nullable,
        length: col.length,
        precision: col.precision,
        key: false,
        source_type: String::new(),
        pattern: String::new(),
        original_length: col.length,
        useful_column: true,
        comment: String::new(),
    }
}

/// One `MapperInputTable` per incoming link (a lookup or join feeds a tMap
/// from several upstream nodes at once, not just one), each carrying its own
/// upstream node's schema rather than the tMap's own output schema.
fn synth_node_data(
    ir: &Ir,
    node: &IRNode,
    component: &str,
    schema: &[SchemaColumn],
    incoming: &[&IRLink],
    outgoing: &[&IRLink],
) -> Option<NodeData> {
    if component != "tMap" {
        return None;
    }

    let input_tables: Vec<MapperInputTable> = if incoming.is_empty() {
        vec![MapperInputTable {
            name: "row1".to_string(),
            matching_mode: "unique_match".to_string(),
            lookup_mode: "none".to_string(),
            entries: schema.iter().map(|c| schema_entry(c)).collect(),
        }]
    } else {
        incoming
            .iter()
            .enumerate()
            .map(|(idx, link)| {
                let upstream_schema = ir.node(&link.from.node_id).and_then(|n| ir.schema(n)).unwrap_or(&[]);
                MapperInputTable {
                    name: incoming_alias(ir, link),
                    matching_mode: "unique_match".to_string(),
                    lookup_mode: if idx == 0 { "none".to_string() } else { "match".to_string() },
                    entries: upstream_schema.iter().map(|c| schema_entry(c)).collect(),
                }
            })
            .collect()
    };

    let primary_incoming_name = incoming.first().map(|l| incoming_alias(ir, l)).unwrap_or_else(|| "row1".to_string());

    let output_name = outgoing
        .first()
        .and_then(|l| ir.node(&l.to.node_id))
        .map(|n| sanitize_unique_name(&n.name))
        .unwrap_or_else(|| "output".to_string());

    let output_table = MapperOutputTable {
        name: output_name,
        entries: schema
            .iter()
            .map(|c| MapperTableEntry {
                name: c.name.clone(),
                expression: Some(translate_expression(c.expression.as_deref(), &primary_incoming_name, &c.name)),
                type_name: c.type_name.clone(),
                nullable: c.nullable,
            })
            .collect(),
    };

    Some(NodeData::Mapper(MapperData {
        input_tables,
        output_tables: vec![output_table],
    }))
}

fn incoming_alias(ir: &Ir, link: &IRLink) -> String {
    ir.node(&link.from.node_id)
        .map(|n| format!("row{}", sanitize_unique_name(&n.name)))
        .unwrap_or_else(|| "row1".to_string())
}

fn schema_entry(c: &SchemaColumn) -> MapperTableEntry {
    MapperTableEntry {
        name: c.name.clone(),
        expression: None,
        type_name: c.type_name.clone(),
        nullable: c.nullable,
    }
}

/// §4.5 tMap expression translation: `UPPER(X)` becomes
/// `StringHandling.UPPER(<incoming>.X)`, a bare `LINK.COL` reference becomes
/// `<incoming>.COL`, anything else passes through as `<incoming>.<col>`.
fn translate_expression(expression: Option<&str>, incoming: &str, col_name: &str) -> String {
    let Some(expr) = expression else {
        return format!("{incoming}.{col_name}");
    };
    if expr.is_empty() {
        return format!("{incoming}.{col_name}");
    }

    let lower = expr.to_ascii_lowercase();
    if let Some(open) = lower.find('(') {
        let head = lower[..open].trim();
        if head == "upper" || head == "uppercase" {
            if let Some(close) = expr.rfind(')') {
                let arg = &expr[open + 1..close];
                let col_ref = arg.rsplit('.').next().unwrap_or(arg).trim();
                return format!("StringHandling.UPPER({incoming}.{col_ref})");
            }
        }
    }

    if let Some((_, col_ref)) = expr.rsplit_once('.') {
        return format!("{incoming}.{}", col_ref.trim());
    }

    format!("{incoming}.{col_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_ir::{JobRef, Provenance, TransformationDetails, TransformationTracking};
    use std::collections::HashMap as Map;

    struct StaticRepo;
    impl MappingRepository for StaticRepo {
        fn lookup(&self, _ir_type: &str, _ir_subtype: &str) -> Option<String> {
            None
        }
    }

    fn node(id: &str, node_type: IRNodeType, subtype: &str, name: &str) -> IRNode {
        IRNode {
            id: id.to_string(),
            node_type,
            subtype: subtype.to_string(),
            name: name.to_string(),
            props: Map::new(),
            schema_ref: Some(format!("s_{id}")),
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

    fn column(name: &str) -> SchemaColumn {
        SchemaColumn {
            name: name.to_string(),
            type_name: "id_String".to_string(),
            nullable: true,
            length: None,
            precision: None,
            scale: None,
            has_transformation: false,
            transformation_logic: None,
            transformation_classification: None,
            source_columns: Vec::new(),
            expression: None,
            functions: Vec::new(),
        }
    }

    fn sample_ir() -> Ir {
        let mut schemas = Map::new();
        schemas.insert("s_n0".to_string(), vec![column("USERNAME")]);
        schemas.insert("s_n1".to_string(), Vec::new());

        Ir {
            version: "1.0".into(),
            generated_at: "2026-01-01T00:00:00+0000".into(),
            job: JobRef {
                id: "Sample_Job".into(),
                name: "Sample_Job".into(),
                parameters: vec![],
            },
            nodes: vec![
                node("n0", IRNodeType::Source, "File", "Input_File"),
                node("n1", IRNodeType::Sink, "File", "Output_File"),
            ],
            links: vec![IRLink {
                id: "l1".into(),
                from: migrator_ir::LinkEndpoint {
                    node_id: "n0".into(),
                    port: "out".into(),
                },
                to: migrator_ir::LinkEndpoint {
                    node_id: "n1".into(),
                    port: "in".into(),
                },
                schema_ref: Some("s_n0".into()),
            }],
            schemas,
            transformation_tracking: TransformationTracking::default(),
        }
    }

    #[test]
    fn builds_job_with_resolved_components_and_positions() {
        let ir = sample_ir();
        let job = build(&ir, &StaticRepo, &BuildOptions::default()).unwrap();
        assert_eq!(job.nodes.len(), 2);
        assert_eq!(job.nodes[0].component_name, "tFileInputDelimited");
        assert_eq!(job.nodes[1].component_name, "tFileOutputDelimited");
        assert_eq!(job.nodes[0].pos_x, 100);
        assert_eq!(job.nodes[1].pos_x, 350);
        assert_eq!(job.connections.len(), 1);
    }

    #[test]
    fn sink_schema_propagates_from_incoming_link() {
        let ir = sample_ir();
        let job = build(&ir, &StaticRepo, &BuildOptions::default()).unwrap();
        let sink_metadata = &job.nodes[1].metadata;
        assert_eq!(sink_metadata.len(), 1);
        assert_eq!(sink_metadata[0].columns[0].name, "USERNAME");
    }

    #[test]
    fn drops_link_into_source_and_out_of_sink() {
        let mut ir = sample_ir();
        ir.links.push(IRLink {
            id: "l2".into(),
            from: migrator_ir::LinkEndpoint {
                node_id: "n1".into(),
                port: "out".into(),
            },
            to: migrator_ir::LinkEndpoint {
                node_id: "n0".into(),
                port: "in".into(),
            },
            schema_ref: None,
        });
        let job = build(&ir, &StaticRepo, &BuildOptions::default()).unwrap();
        assert_eq!(job.connections.len(), 1);
    }

    #[test]
    fn file_input_emits_trimselect_and_decode_cols_per_schema_column() {
        let node = node("n0", IRNodeType::Source, "File", "Input_File");
        let schema = vec![column("USERNAME"), column("EMAIL")];
        let params = file_input_parameters(&node, &schema);

        let trimselect = params.iter().find(|p| p.name == "TRIMSELECT").expect("TRIMSELECT present");
        assert_eq!(trimselect.rows.len(), 4);
        assert_eq!(trimselect.rows[0].element_ref, "SCHEMA_COLUMN");
        assert_eq!(trimselect.rows[0].value, "USERNAME");
        assert_eq!(trimselect.rows[1].element_ref, "TRIM");
        assert_eq!(trimselect.rows[2].value, "EMAIL");
        assert!(trimselect.show.is_none());

        let decode_cols = params.iter().find(|p| p.name == "DECODE_COLS").expect("DECODE_COLS present");
        assert_eq!(decode_cols.rows.len(), 4);
        assert_eq!(decode_cols.rows[1].element_ref, "DECODE");
        assert_eq!(decode_cols.show, Some(false));
    }

    #[test]
    fn normalize_path_produces_real_quotes_not_pre_escaped_entities() {
        let normalized = normalize_path(r"0file/D:\data\in.csv");
        assert_eq!(normalized, "\"data/in.csv\"");
        assert!(!normalized.contains("&quot;"));
    }

    #[test]
    fn tmap_parameters_lead_with_map() {
        let params = tmap_parameters();
        assert_eq!(params[0].name, "MAP");
        assert_eq!(params[1].name, "LINK_STYLE");
    }

    #[test]
    fn translates_upper_expression() {
        assert_eq!(
            translate_expression(Some("UPPER(USERNAME)"), "rowInput_File", "USERNAME"),
            "StringHandling.UPPER(rowInput_File.USERNAME)"
        );
        assert_eq!(
            translate_expression(Some("UserLink.USERID"), "rowInput_File", "USERID"),
            "rowInput_File.USERID"
        );
        assert_eq!(
            translate_expression(None, "rowInput_File", "USERID"),
            "rowInput_File.USERID"
        );
    }
}
