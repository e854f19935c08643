use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use dsx_parser::DSXValue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub prompt: Option<String>,
    pub default_value: Option<String>,
}

/// A normalized classification of a stage, derived from `stage_type ∪
/// ole_type ∪ property evidence` (§4.3 step 3). Unknown stage types retain
/// their raw `stage_type` string rather than falling into a fixed variant,
/// so this is a thin wrapper over `String` rather than an enum: the set of
/// values DataStage emits in the wild is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnhancedType(pub String);

impl EnhancedType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EnhancedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformationClass {
    SimpleColumn,
    Conditional,
    StringOperation,
    DateOperation,
    Aggregation,
    Arithmetic,
    WindowFunction,
    Constant,
    Complex,
}

impl TransformationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationClass::SimpleColumn => "simple_column",
            TransformationClass::Conditional => "conditional",
            TransformationClass::StringOperation => "string_operation",
            TransformationClass::DateOperation => "date_operation",
            TransformationClass::Aggregation => "aggregation",
            TransformationClass::Arithmetic => "arithmetic",
            TransformationClass::WindowFunction => "window_function",
            TransformationClass::Constant => "constant",
            TransformationClass::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationLogic {
    pub classification: TransformationClass,
    pub source_columns: Vec<String>,
    pub functions: Vec<String>,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type_code: i64,
    pub talend_type: String,
    pub length: Option<i64>,
    pub precision: Option<i64>,
    pub scale: Option<i64>,
    pub nullable: bool,
    pub derivation: Option<String>,
    pub transformation_logic: Option<TransformationLogic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: String,
    pub name: String,
    pub direction: Option<DirectionSer>,
    pub schema: Vec<Column>,
    pub properties: HashMap<String, String>,
    pub partner_ref: Option<String>,
}

/// Serializable mirror of [`Direction`] (kept distinct so the IR crate can
/// depend on a plain enum without pulling in ASG-only helper methods).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionSer {
    Input,
    Output,
}

impl From<Direction> for DirectionSer {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Input => DirectionSer::Input,
            Direction::Output => DirectionSer::Output,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageProperties {
    pub configuration: HashMap<String, String>,
    pub apt_properties: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub stage_type: String,
    pub ole_type: Option<String>,
    pub enhanced_type: EnhancedType,
    pub properties: StageProperties,
    pub pins: Vec<Pin>,
}

impl Node {
    pub fn output_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins
            .iter()
            .filter(|p| p.direction == Some(DirectionSer::Output))
    }

    pub fn input_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins
            .iter()
            .filter(|p| p.direction == Some(DirectionSer::Input))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    LeftOuter,
    FullOuter,
    Inner,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub from_node: String,
    pub from_pin: String,
    pub from_pin_name: String,
    pub to_node: String,
    pub to_pin: String,
    pub to_pin_name: String,
    pub join_type: JoinType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub stage_list: Vec<String>,
    pub stage_names: Vec<String>,
    pub stage_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub container_info: ContainerInfo,
}

impl Job {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn pin(&self, id: &str) -> Option<&Pin> {
        self.nodes.iter().flat_map(|n| n.pins.iter()).find(|p| p.id == id)
    }
}

pub(crate) fn dsxvalue_to_string(value: &DSXValue) -> String {
    value.clone().into_string()
}
