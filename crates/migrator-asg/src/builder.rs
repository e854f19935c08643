//! §4.3: the ASG builder (C3). Consumes the raw record forest produced by
//! `dsx_parser` and produces a fully linked [`crate::model::Job`].

use std::collections::{HashMap, HashSet};

use dsx_parser::{decode::decode_dsx_value, Document, Record};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{classify, PropertyEvidence};
use crate::derivation::classify_derivation;
use crate::error::{ASGBuildError, ASGResult, AsgError, SchemaValidationError};
use crate::model::{
    dsxvalue_to_string, Column, ContainerInfo, Direction, DirectionSer, Edge, Job, JoinType, Node,
    Parameter, Pin, StageProperties,
};
use crate::policy::AptPolicy;
use crate::sqltype::talend_type_for_code;

static CONTAINER_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^V\d+$").unwrap());
static STAGE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^V\d+S\d+$").unwrap());
static PIN_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^V\d+S\d+P\d+$").unwrap());

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Promote dangling references and malformed schema entries to hard
    /// errors instead of warnings (§4.3 "Failure model").
    pub strict: bool,
}

/// Build a [`Job`] from a parsed [`Document`] (§4.3 steps 1-8).
pub fn build(doc: &Document, options: &BuildOptions) -> ASGResult<Job> {
    let policy = AptPolicy::v1();

    // Step 1: partition records by identifier pattern. Pins and stages are
    // not guaranteed to sit at the same nesting depth as their container, so
    // we walk the whole job tree rather than assuming a flat list of direct
    // children.
    let mut identified: Vec<&Record> = Vec::new();
    collect_identified(&doc.job, &mut identified);

    let root = identified.iter().find(|r| r.identifier() == Some("ROOT")).copied();
    let containers: Vec<&Record> = identified
        .iter()
        .filter(|r| r.identifier().map(|id| CONTAINER_ID.is_match(id)).unwrap_or(false))
        .copied()
        .collect();
    let stage_records: Vec<&Record> = identified
        .iter()
        .filter(|r| r.identifier().map(|id| STAGE_ID.is_match(id)).unwrap_or(false))
        .copied()
        .collect();
    let pin_records: Vec<&Record> = identified
        .iter()
        .filter(|r| r.identifier().map(|id| PIN_ID.is_match(id)).unwrap_or(false))
        .copied()
        .collect();

    if stage_records.is_empty() {
        return Err(AsgError::from(ASGBuildError::NoStages {
            job: doc.job.field_str("Name").unwrap_or("<unnamed>").to_string(),
        }));
    }

    let job_name = root
        .and_then(|r| r.field_str("Name"))
        .or_else(|| doc.job.field_str("Name"))
        .unwrap_or("UnnamedJob")
        .to_string();

    let parameters = root.map(extract_parameters).unwrap_or_default();
    let container_info = containers.first().map(|c| extract_container_info(c)).unwrap_or_default();

    // Step 2+3+4: resolve name/type, classify enhanced_type, extract
    // properties, for every stage.
    let mut nodes = Vec::with_capacity(stage_records.len());
    let mut seen_names: HashSet<String> = HashSet::new();
    for stage in &stage_records {
        let id = stage.identifier().unwrap_or_default().to_string();
        let (name, stage_type) = resolve_stage_name_and_type(stage, &containers, &id);

        if !seen_names.insert(name.clone()) {
            if options.strict {
                return Err(AsgError::from(ASGBuildError::DuplicateStageName {
                    name,
                    job: job_name.clone(),
                }));
            }
            warn!("duplicate stage name '{name}' in job '{job_name}'");
        }

        let ole_type = stage.field_str("OLEType").map(|s| s.to_string());
        let evidence = PropertyEvidence {
            has_trx_gen_code: stage
                .subrecords
                .iter()
                .any(|s| s.field_str("Name") == Some("TrxGenCode")),
            has_file_path: stage.field_str("FilePath").is_some(),
            has_db_connector_descriptor: stage
                .fields
                .keys()
                .any(|k| k.contains("Connector") || k == "DSN" || k == "Database"),
        };
        let enhanced_type = classify(&stage_type, ole_type.as_deref(), evidence);
        let properties = extract_properties(stage, &policy);

        // Step 5: build pins belonging to this stage.
        let pins = build_pins(&id, stage, &pin_records, options)?;

        nodes.push(Node {
            id,
            name,
            stage_type,
            ole_type,
            enhanced_type,
            properties,
            pins,
        });
    }

    // Step 7: build edges from partner refs, then fill gaps from the
    // container's link tables.
    let mut edges = build_edges_from_partners(&nodes);
    fill_edges_from_container_links(&containers, &nodes, &mut edges);

    // Step 8: infer join type from the target stage's properties.
    for edge in &mut edges {
        edge.join_type = infer_join_type(&nodes, &edge.to_node);
    }

    Ok(Job {
        name: job_name,
        parameters,
        nodes,
        edges,
        container_info,
    })
}

/// Recursively collect every record in the tree that carries an
/// `Identifier` field, at any nesting depth (pins and stages are not
/// guaranteed to live at the same depth as their owning container).
fn collect_identified<'a>(record: &'a Record, out: &mut Vec<&'a Record>) {
    for sub in &record.subrecords {
        if sub.identifier().is_some() {
            out.push(sub);
        }
        collect_identified(sub, out);
    }
}

fn extract_parameters(root: &Record) -> Vec<Parameter> {
    root.subrecords_named("DSSUBRECORD")
        .filter_map(|sub| {
            let name = sub.field_str("Name")?.to_string();
            Some(Parameter {
                name,
                prompt: sub.field_str("Prompt").map(|s| s.to_string()),
                default_value: sub.field_str("Default").map(|s| decode_dsx_value(s)),
            })
        })
        .collect()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c| c == '\n' || c == ',' || c == ';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn extract_container_info(container: &Record) -> ContainerInfo {
    let field_list = |key: &str| {
        container
            .field_str(key)
            .map(split_list)
            .unwrap_or_default()
    };
    ContainerInfo {
        stage_list: field_list("StageList"),
        stage_names: field_list("StageNames"),
        stage_types: field_list("StageTypes"),
    }
}

/// Step 2: prefer the stage's own `Name`/`StageType` fields; fall back to
/// the owning container's parallel arrays indexed by the stage's position
/// within its container (`V<d>S<s>` → index `s`).
fn resolve_stage_name_and_type(
    stage: &Record,
    containers: &[&Record],
    stage_id: &str,
) -> (String, String) {
    let name = stage.field_str("Name").map(|s| s.to_string());
    let stage_type = stage.field_str("StageType").map(|s| s.to_string());
    if name.is_some() && stage_type.is_some() {
        return (name.unwrap(), stage_type.unwrap());
    }

    let container_prefix = stage_id.split('S').next().unwrap_or(stage_id);
    let index = stage_id
        .rsplit('S')
        .next()
        .and_then(|s| s.parse::<usize>().ok());
    let container = containers
        .iter()
        .find(|c| c.identifier() == Some(container_prefix));

    let fallback_name = container
        .zip(index)
        .and_then(|(c, i)| c.field_str("StageNames").map(split_list).and_then(|v| v.get(i).cloned()))
        .or_else(|| {
            container
                .zip(index)
                .and_then(|(c, i)| c.field_str("StageList").map(split_list).and_then(|v| v.get(i).cloned()))
        })
        .unwrap_or_else(|| stage_id.to_string());

    let fallback_type = container
        .zip(index)
        .and_then(|(c, i)| c.field_str("StageTypes").map(split_list).and_then(|v| v.get(i).cloned()))
        .unwrap_or_default();

    (name.unwrap_or(fallback_name), stage_type.unwrap_or(fallback_type))
}

/// Step 4: categorize a stage's properties into configuration, APT-owned
/// and metadata buckets.
fn extract_properties(stage: &Record, policy: &AptPolicy) -> StageProperties {
    const STRUCTURAL_KEYS: &[&str] = &["Identifier", "Name", "StageType", "OLEType", "InputPins", "OutputPins"];

    let mut configuration = HashMap::new();
    for (key, value) in &stage.fields {
        if STRUCTURAL_KEYS.contains(&key.as_str()) {
            continue;
        }
        configuration.insert(key.clone(), decode_dsx_value(&dsxvalue_to_string(value)));
    }

    let mut apt_properties = HashMap::new();
    let mut metadata = HashMap::new();
    for sub in stage.subrecords_named("DSSUBRECORD") {
        let (Some(name), Some(value)) = (sub.field_str("Name"), sub.field("Value")) else {
            continue;
        };
        let decoded = decode_dsx_value(&dsxvalue_to_string(value));
        let is_apt = sub.field_str("Owner") == Some("APT");
        if is_apt && policy.is_preserved(name) {
            apt_properties.insert(name.to_string(), decoded);
        } else if !is_apt {
            metadata.insert(name.to_string(), decoded);
        }
    }

    StageProperties {
        configuration,
        apt_properties,
        metadata,
    }
}

/// Step 5: resolve the pins belonging to a stage, either via explicit
/// `InputPins`/`OutputPins` id lists or by pin-id prefix match, and build
/// each pin's schema from its column subrecords.
fn build_pins(
    stage_id: &str,
    stage: &Record,
    pin_records: &[&Record],
    options: &BuildOptions,
) -> ASGResult<Vec<Pin>> {
    let explicit_ids: HashSet<String> = ["InputPins", "OutputPins"]
        .iter()
        .filter_map(|key| stage.field_str(key))
        .flat_map(split_list)
        .collect();

    let prefix = format!("{stage_id}P");
    let mut pins = Vec::new();
    for pin_rec in pin_records {
        let pin_id = pin_rec.identifier().unwrap_or_default();
        let belongs = explicit_ids.contains(pin_id) || pin_id.starts_with(prefix.as_str());
        if !belongs {
            continue;
        }
        pins.push(build_pin(pin_rec, options)?);
    }
    Ok(pins)
}

fn build_pin(pin_rec: &Record, options: &BuildOptions) -> ASGResult<Pin> {
    let id = pin_rec.identifier().unwrap_or_default().to_string();
    let name = pin_rec.field_str("Name").unwrap_or(&id).to_string();
    let direction = match pin_rec.field_str("OLEType") {
        Some("CTrxInput") => Some(DirectionSer::from(Direction::Input)),
        Some("CTrxOutput") => Some(DirectionSer::from(Direction::Output)),
        _ => None,
    };
    let partner_ref = pin_rec.field_str("Partner").map(|s| s.to_string());

    const STRUCTURAL_KEYS: &[&str] = &["Identifier", "Name", "OLEType", "Partner"];
    let mut properties = HashMap::new();
    for (key, value) in &pin_rec.fields {
        if STRUCTURAL_KEYS.contains(&key.as_str()) {
            continue;
        }
        properties.insert(key.clone(), decode_dsx_value(&dsxvalue_to_string(value)));
    }

    let mut schema = Vec::new();
    for col_rec in &pin_rec.subrecords {
        match build_column(col_rec, &id, options)? {
            Some(col) => schema.push(col),
            None => continue,
        }
    }

    Ok(Pin {
        id,
        name,
        direction,
        schema,
        properties,
        partner_ref,
    })
}

/// Step 5 (schema extraction) + malformed-column failure model.
fn build_column(col_rec: &Record, pin_id: &str, options: &BuildOptions) -> ASGResult<Option<Column>> {
    let Some(name) = col_rec.field_str("Name") else {
        return Ok(None);
    };
    let raw_sql_type = col_rec.field_str("SqlType").unwrap_or_default();
    let sql_type_code = match col_rec.field("SqlType").and_then(|v| v.as_i64()) {
        Some(code) => code,
        None => {
            if options.strict {
                return Err(AsgError::from(SchemaValidationError::MalformedSqlType {
                    pin: pin_id.to_string(),
                    name: name.to_string(),
                    raw: raw_sql_type.to_string(),
                }));
            }
            warn!("pin {pin_id}: column '{name}' has malformed SqlType '{raw_sql_type}', skipping");
            return Ok(None);
        }
    };

    let derivation = col_rec
        .field_str("Derivation")
        .map(decode_dsx_value)
        .filter(|d| !d.is_empty());
    let transformation_logic = derivation.as_deref().map(classify_derivation);

    Ok(Some(Column {
        name: name.to_string(),
        sql_type_code,
        talend_type: talend_type_for_code(sql_type_code),
        length: col_rec.field("Length").and_then(|v| v.as_i64()),
        precision: col_rec.field("Precision").and_then(|v| v.as_i64()),
        scale: col_rec.field("Scale").and_then(|v| v.as_i64()),
        nullable: col_rec.field("Nullable").and_then(|v| v.as_bool()).unwrap_or(true),
        derivation,
        transformation_logic,
    }))
}

/// Step 7: build edges from each pin's `Partner` reference.
fn build_edges_from_partners(nodes: &[Node]) -> Vec<Edge> {
    let mut pins_by_id: HashMap<&str, (&Node, &Pin)> = HashMap::new();
    for node in nodes {
        for pin in &node.pins {
            pins_by_id.insert(pin.id.as_str(), (node, pin));
        }
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut edges = Vec::new();
    for node in nodes {
        for pin in &node.pins {
            let Some(partner_ref) = &pin.partner_ref else {
                continue;
            };
            let partner_pin_id = partner_ref.split('|').last().unwrap_or(partner_ref.as_str());
            let Some((partner_node, partner_pin)) = pins_by_id.get(partner_pin_id) else {
                warn!("pin {}: dangling partner reference '{partner_ref}'", pin.id);
                continue;
            };

            let (from_node, from_pin, to_node, to_pin) = match (pin.direction, partner_pin.direction) {
                (Some(DirectionSer::Output), Some(DirectionSer::Input)) => (node, pin, *partner_node, *partner_pin),
                (Some(DirectionSer::Input), Some(DirectionSer::Output)) => (*partner_node, *partner_pin, node, pin),
                _ => continue,
            };

            let key = (from_pin.id.clone(), to_pin.id.clone());
            if !seen.insert(key) {
                continue;
            }
            edges.push(Edge {
                from_node: from_node.id.clone(),
                from_pin: from_pin.id.clone(),
                from_pin_name: from_pin.name.clone(),
                to_node: to_node.id.clone(),
                to_pin: to_pin.id.clone(),
                to_pin_name: to_pin.name.clone(),
                join_type: JoinType::Unknown,
            });
        }
    }
    edges
}

/// Step 7 (continued): fill in edges the per-pin partner references miss,
/// using the container's `LinkSourcePinIDs`/`TargetStageIDs` parallel
/// arrays. A target stage's first input pin is used as the edge's sink,
/// since the container table only names the target stage, not its pin.
fn fill_edges_from_container_links(containers: &[&Record], nodes: &[Node], edges: &mut Vec<Edge>) {
    let mut seen: HashSet<(String, String)> = edges
        .iter()
        .map(|e| (e.from_pin.clone(), e.to_pin.clone()))
        .collect();

    for container in containers {
        let sources = container
            .field_str("LinkSourcePinIDs")
            .map(split_list)
            .unwrap_or_default();
        let targets = container
            .field_str("TargetStageIDs")
            .map(split_list)
            .unwrap_or_default();
        if sources.is_empty() || targets.is_empty() {
            continue;
        }

        for (source_pin_id, target_stage_id) in sources.iter().zip(targets.iter()) {
            let Some((from_node, from_pin)) = nodes.iter().find_map(|n| {
                n.pins.iter().find(|p| &p.id == source_pin_id).map(|p| (n, p))
            }) else {
                continue;
            };
            let Some(to_node) = nodes.iter().find(|n| &n.id == target_stage_id) else {
                continue;
            };
            let Some(to_pin) = to_node.input_pins().next() else {
                continue;
            };

            let key = (from_pin.id.clone(), to_pin.id.clone());
            if !seen.insert(key) {
                continue;
            }
            edges.push(Edge {
                from_node: from_node.id.clone(),
                from_pin: from_pin.id.clone(),
                from_pin_name: from_pin.name.clone(),
                to_node: to_node.id.clone(),
                to_pin: to_pin.id.clone(),
                to_pin_name: to_pin.name.clone(),
                join_type: JoinType::Unknown,
            });
        }
    }
}

/// Step 8: infer join type from the target stage's properties.
fn infer_join_type(nodes: &[Node], to_node_id: &str) -> JoinType {
    let Some(node) = nodes.iter().find(|n| n.id == to_node_id) else {
        return JoinType::Unknown;
    };
    let operator_value = node
        .properties
        .configuration
        .iter()
        .chain(node.properties.apt_properties.iter())
        .chain(node.properties.metadata.iter())
        .find(|(k, _)| k.eq_ignore_ascii_case("operator"))
        .map(|(_, v)| v.to_lowercase());

    match operator_value {
        Some(v) if v.contains("leftouter") => JoinType::LeftOuter,
        Some(v) if v.contains("fullouter") => JoinType::FullOuter,
        Some(v) if v.contains("inner") => JoinType::Inner,
        _ => JoinType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsx_parser::ParserOptions;

    fn two_stage_job() -> String {
        r#"BEGIN HEADER
DSXVersion "3"
END HEADER
BEGIN DSJOB
Name "Sample_Job"
BEGIN DSRECORD
Identifier "V0"
StageList "Input_File,Output_File"
END DSRECORD
BEGIN DSRECORD
Identifier "V0S0"
Name "Input_File"
StageType "PxSequentialFile"
FilePath "0file/D:\in.csv"
END DSRECORD
BEGIN DSRECORD
Identifier "V0S0P0"
Name "outLink"
OLEType "CTrxOutput"
Partner "V0S0|V0S1P0"
BEGIN DSSUBRECORD
Name "USERNAME"
SqlType 12
Nullable 1
END DSSUBRECORD
END DSRECORD
BEGIN DSRECORD
Identifier "V0S1"
Name "Output_File"
StageType "PxSequentialFile"
FilePath "0file/D:\out.csv"
END DSRECORD
BEGIN DSRECORD
Identifier "V0S1P0"
Name "inLink"
OLEType "CTrxInput"
Partner "V0S1|V0S0P0"
BEGIN DSSUBRECORD
Name "USERNAME"
SqlType 12
Nullable 1
Derivation =+=+=+=UPPER(Input_File.USERNAME)=+=+=+=
END DSSUBRECORD
END DSRECORD
END DSJOB
"#
        .to_string()
    }

    #[test]
    fn builds_two_stage_job_with_one_edge() {
        let doc = dsx_parser::parse_str("sample.dsx", &two_stage_job(), &ParserOptions::default())
            .unwrap();
        let job = build(&doc, &BuildOptions::default()).unwrap();

        assert_eq!(job.name, "Sample_Job");
        assert_eq!(job.nodes.len(), 2);
        assert_eq!(job.edges.len(), 1);

        let edge = &job.edges[0];
        assert_eq!(edge.from_pin, "V0S0P0");
        assert_eq!(edge.to_pin, "V0S1P0");

        let sink = job.node("V0S1").unwrap();
        let in_pin = sink.pins.iter().find(|p| p.id == "V0S1P0").unwrap();
        let column = &in_pin.schema[0];
        assert_eq!(column.name, "USERNAME");
        assert_eq!(column.talend_type, "id_String");
        let logic = column.transformation_logic.as_ref().unwrap();
        assert_eq!(logic.classification, crate::model::TransformationClass::StringOperation);
    }

    #[test]
    fn decodes_file_path_prefix() {
        let doc = dsx_parser::parse_str("sample.dsx", &two_stage_job(), &ParserOptions::default())
            .unwrap();
        let job = build(&doc, &BuildOptions::default()).unwrap();
        let source = job.node("V0S0").unwrap();
        assert_eq!(
            source.properties.configuration.get("FilePath").map(|s| s.as_str()),
            Some("D:/in.csv")
        );
    }

    #[test]
    fn no_stages_is_an_error() {
        let src = "BEGIN HEADER\nEND HEADER\nBEGIN DSJOB\nName \"Empty\"\nEND DSJOB\n";
        let doc = dsx_parser::parse_str("empty.dsx", src, &ParserOptions::default()).unwrap();
        let err = build(&doc, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AsgError::Build(ASGBuildError::NoStages { .. })));
    }
}
