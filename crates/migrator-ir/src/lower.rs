//! §4.4: the ASG→IR lowerer (C4).

use std::collections::HashMap;

use migrator_asg::Job;

use crate::error::{IRResult, IRValidationError};
use crate::mapping::map_enhanced_type;
use crate::model::{
    Ir, IRLink, IRNode, IRParameter, JobRef, LinkEndpoint, Provenance, SchemaColumn, TransformationDetails,
    TransformationTracking,
};

const IR_VERSION: &str = "1.0";

/// Lower a `Job` into an [`Ir`] document. `generated_at` is threaded in by
/// the caller (an ISO-8601 timestamp) rather than stamped here, since this
/// crate has no clock dependency and lowering must stay deterministic for a
/// given input (§5 "Ordering guarantees").
pub fn lower(job: &Job, generated_at: &str) -> IRResult<Ir> {
    // ID policy: n0, n1, ... in ASG traversal order; retain asg_id -> ir_id.
    let mut asg_to_ir: HashMap<&str, String> = HashMap::new();
    for (i, node) in job.nodes.iter().enumerate() {
        asg_to_ir.insert(node.id.as_str(), format!("n{i}"));
    }

    let mut nodes = Vec::with_capacity(job.nodes.len());
    let mut schemas = HashMap::new();
    for node in &job.nodes {
        let ir_id = asg_to_ir[node.id.as_str()].clone();
        let (node_type, subtype) = map_enhanced_type(node);

        let schema_source = node
            .output_pins()
            .find(|p| !p.schema.is_empty())
            .or_else(|| node.input_pins().find(|p| !p.schema.is_empty()));
        let schema: Vec<SchemaColumn> = schema_source
            .map(|pin| pin.schema.iter().map(column_to_schema).collect())
            .unwrap_or_default();

        let schema_ref = format!("s_{}", node.id);
        let transformation_count = schema.iter().filter(|c| c.has_transformation).count();
        let complexity_score = schema
            .iter()
            .map(|c| complexity_weight(c.transformation_classification.as_deref()))
            .sum();

        schemas.insert(schema_ref.clone(), schema);

        nodes.push(IRNode {
            id: ir_id,
            node_type,
            subtype,
            name: node.name.clone(),
            props: node.properties.configuration.clone(),
            schema_ref: Some(schema_ref),
            trx_gen_code: node.properties.apt_properties.get("TrxGenCode").cloned(),
            trx_class_name: node.properties.apt_properties.get("TrxClassName").cloned(),
            transformation_details: TransformationDetails {
                has_transformations: transformation_count > 0,
                transformation_count,
                complexity_score,
            },
            provenance: Provenance {
                source: "dsx".to_string(),
                location: format!("{}.dsx", job.name),
                line_start: "--".to_string(),
                line_end: "--".to_string(),
            },
        });
    }

    let mut links = Vec::with_capacity(job.edges.len());
    for (i, edge) in job.edges.iter().enumerate() {
        let Some(from_ir) = asg_to_ir.get(edge.from_node.as_str()) else {
            continue;
        };
        let Some(to_ir) = asg_to_ir.get(edge.to_node.as_str()) else {
            continue;
        };
        let schema_ref = nodes
            .iter()
            .find(|n| &n.id == from_ir)
            .and_then(|n| n.schema_ref.clone());
        links.push(IRLink {
            id: format!("l{}", i + 1),
            from: LinkEndpoint {
                node_id: from_ir.clone(),
                port: edge.from_pin_name.clone(),
            },
            to: LinkEndpoint {
                node_id: to_ir.clone(),
                port: edge.to_pin_name.clone(),
            },
            schema_ref,
        });
    }

    let total_transformations: usize = nodes.iter().map(|n| n.transformation_details.transformation_count).sum();
    let nodes_with_transformations = nodes
        .iter()
        .filter(|n| n.transformation_details.has_transformations)
        .count();

    let ir = Ir {
        version: IR_VERSION.to_string(),
        generated_at: generated_at.to_string(),
        job: JobRef {
            id: job.name.clone(),
            name: job.name.clone(),
            parameters: job
                .parameters
                .iter()
                .map(|p| IRParameter {
                    name: p.name.clone(),
                    prompt: p.prompt.clone(),
                    default_value: p.default_value.clone(),
                })
                .collect(),
        },
        nodes,
        links,
        schemas,
        transformation_tracking: TransformationTracking {
            total_transformations,
            nodes_with_transformations,
        },
    };

    validate(&ir)?;
    Ok(ir)
}

fn column_to_schema(col: &migrator_asg::Column) -> SchemaColumn {
    SchemaColumn {
        name: col.name.clone(),
        type_name: col.talend_type.clone(),
        nullable: col.nullable,
        length: col.length,
        precision: col.precision,
        scale: col.scale,
        has_transformation: col.transformation_logic.is_some(),
        transformation_logic: col.derivation.clone(),
        transformation_classification: col
            .transformation_logic
            .as_ref()
            .map(|l| l.classification.as_str().to_string()),
        source_columns: col
            .transformation_logic
            .as_ref()
            .map(|l| l.source_columns.clone())
            .unwrap_or_default(),
        expression: col.transformation_logic.as_ref().map(|l| l.expression.clone()),
        functions: col
            .transformation_logic
            .as_ref()
            .map(|l| l.functions.clone())
            .unwrap_or_default(),
    }
}

fn complexity_weight(classification: Option<&str>) -> u32 {
    match classification {
        Some("complex") | Some("window_function") => 3,
        Some("aggregation") | Some("conditional") => 2,
        Some("arithmetic") | Some("string_operation") | Some("date_operation") => 1,
        _ => 0,
    }
}

/// §4.4 "Validation": every link's endpoints exist, every schemaRef exists,
/// and the data-flow graph is acyclic (Talend requires a DAG).
fn validate(ir: &Ir) -> IRResult<()> {
    for link in &ir.links {
        if ir.node(&link.from.node_id).is_none() {
            return Err(IRValidationError::DanglingLinkEndpoint {
                link: link.id.clone(),
                node: link.from.node_id.clone(),
            });
        }
        if ir.node(&link.to.node_id).is_none() {
            return Err(IRValidationError::DanglingLinkEndpoint {
                link: link.id.clone(),
                node: link.to.node_id.clone(),
            });
        }
    }
    for node in &ir.nodes {
        if let Some(schema_ref) = &node.schema_ref {
            if !ir.schemas.contains_key(schema_ref) {
                return Err(IRValidationError::MissingSchemaRef {
                    node: node.id.clone(),
                    schema_ref: schema_ref.clone(),
                });
            }
        }
    }
    detect_cycle(ir)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn detect_cycle(ir: &Ir) -> IRResult<()> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in &ir.nodes {
        adjacency.entry(node.id.as_str()).or_default();
    }
    for link in &ir.links {
        adjacency
            .entry(link.from.node_id.as_str())
            .or_default()
            .push(link.to.node_id.as_str());
    }

    let mut marks: HashMap<&str, Mark> = ir.nodes.iter().map(|n| (n.id.as_str(), Mark::Unvisited)).collect();
    for node in &ir.nodes {
        if marks[node.id.as_str()] == Mark::Unvisited {
            visit(node.id.as_str(), &adjacency, &mut marks)?;
        }
    }
    Ok(())
}

fn visit<'a>(
    node_id: &'a str,
    adjacency: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
) -> IRResult<()> {
    marks.insert(node_id, Mark::InProgress);
    if let Some(successors) = adjacency.get(node_id) {
        for &next in successors {
            match marks.get(next) {
                Some(Mark::InProgress) => {
                    return Err(IRValidationError::CyclicGraph {
                        node: next.to_string(),
                    })
                }
                Some(Mark::Done) | None => continue,
                Some(Mark::Unvisited) => visit(next, adjacency, marks)?,
            }
        }
    }
    marks.insert(node_id, Mark::Done);
    Ok(())
}
