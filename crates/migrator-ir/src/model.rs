//! §3 "IR (output of C4)": the vendor-neutral graph that `migrator-codegen`
//! consumes. Every field here is meant to survive a JSON round-trip, since
//! the IR document is persistable on its own between the lowering and
//! code-generation passes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IRNodeType {
    Source,
    Sink,
    Transform,
    Lookup,
    Join,
    Merge,
    Deduplicate,
    Aggregate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationDetails {
    pub has_transformations: bool,
    pub transformation_count: usize,
    pub complexity_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub location: String,
    pub line_start: String,
    pub line_end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: IRNodeType,
    pub subtype: String,
    pub name: String,
    pub props: HashMap<String, String>,
    pub schema_ref: Option<String>,
    pub trx_gen_code: Option<String>,
    pub trx_class_name: Option<String>,
    pub transformation_details: TransformationDetails,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkEndpoint {
    pub node_id: String,
    pub port: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRLink {
    pub id: String,
    pub from: LinkEndpoint,
    pub to: LinkEndpoint,
    pub schema_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub nullable: bool,
    pub length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub has_transformation: bool,
    pub transformation_logic: Option<String>,
    pub transformation_classification: Option<String>,
    pub source_columns: Vec<String>,
    pub expression: Option<String>,
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IRParameter {
    pub name: String,
    pub prompt: Option<String>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRef {
    pub id: String,
    pub name: String,
    pub parameters: Vec<IRParameter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformationTracking {
    pub total_transformations: usize,
    pub nodes_with_transformations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ir {
    pub version: String,
    pub generated_at: String,
    pub job: JobRef,
    pub nodes: Vec<IRNode>,
    pub links: Vec<IRLink>,
    pub schemas: HashMap<String, Vec<SchemaColumn>>,
    pub transformation_tracking: TransformationTracking,
}

impl Ir {
    pub fn node(&self, id: &str) -> Option<&IRNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn schema(&self, node: &IRNode) -> Option<&[SchemaColumn]> {
        node.schema_ref
            .as_ref()
            .and_then(|r| self.schemas.get(r))
            .map(|v| v.as_slice())
    }
}
