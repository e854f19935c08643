//! §3 "Talend graph (intermediate, output of C6)": the in-memory component
//! graph `xml.rs` serializes. Distinct from the Talend XML itself so the
//! builder (C6) and the emitter (C7) stay independently testable.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    Text,
    File,
    Check,
    ClosedList,
    External,
    DbTable,
    Directory,
    Image,
    EncodingType,
    Technical,
    Label,
    ComponentList,
    OpenedList,
    Table,
}

impl ParamField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamField::Text => "TEXT",
            ParamField::File => "FILE",
            ParamField::Check => "CHECK",
            ParamField::ClosedList => "CLOSED_LIST",
            ParamField::External => "EXTERNAL",
            ParamField::DbTable => "DBTABLE",
            ParamField::Directory => "DIRECTORY",
            ParamField::Image => "IMAGE",
            ParamField::EncodingType => "ENCODING_TYPE",
            ParamField::Technical => "TECHNICAL",
            ParamField::Label => "LABEL",
            ParamField::ComponentList => "COMPONENT_LIST",
            ParamField::OpenedList => "OPENED_LIST",
            ParamField::Table => "TABLE",
        }
    }
}

/// One row of a `field="TABLE"` `elementParameter` (`TRIMSELECT`, `DECODE_COLS`):
/// a pair of `elementValue` children per schema column, `SCHEMA_COLUMN`/flag.
#[derive(Debug, Clone)]
pub struct ElementValueRow {
    pub element_ref: String,
    pub value: String,
    pub id: u32,
}

#[derive(Debug, Clone)]
pub struct ElementParameter {
    pub field: ParamField,
    pub name: String,
    pub value: String,
    pub show: Option<bool>,
    pub rows: Vec<ElementValueRow>,
}

impl ElementParameter {
    pub fn new(field: ParamField, name: impl Into<String>, value: impl Into<String>) -> Self {
        ElementParameter {
            field,
            name: name.into(),
            value: value.into(),
            show: None,
            rows: Vec::new(),
        }
    }

    /// A `field="TABLE"` parameter with no scalar `value`, just `elementValue` rows.
    pub fn table(name: impl Into<String>, rows: Vec<ElementValueRow>) -> Self {
        ElementParameter {
            field: ParamField::Table,
            name: name.into(),
            value: String::new(),
            show: None,
            rows,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.show = Some(false);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MetadataColumn {
    pub name: String,
    pub talend_type: String,
    pub nullable: bool,
    pub length: Option<i64>,
    pub precision: Option<i64>,
    pub key: bool,
    pub source_type: String,
    pub pattern: String,
    pub original_length: Option<i64>,
    pub useful_column: bool,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct Metadata {
    pub connector: String,
    pub name: String,
    pub columns: Vec<MetadataColumn>,
}

/// `tMap`'s dialect (§4.6): a `varTables`/`outputTables`/`inputTables`
/// structure rather than generic JSON `nodeData`.
#[derive(Debug, Clone, Default)]
pub struct MapperTableEntry {
    pub name: String,
    pub expression: Option<String>,
    pub type_name: String,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct MapperInputTable {
    pub name: String,
    pub matching_mode: String,
    pub lookup_mode: String,
    pub entries: Vec<MapperTableEntry>,
}

#[derive(Debug, Clone)]
pub struct MapperOutputTable {
    pub name: String,
    pub entries: Vec<MapperTableEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct MapperData {
    pub input_tables: Vec<MapperInputTable>,
    pub output_tables: Vec<MapperOutputTable>,
}

/// Node-specific data that doesn't fit the generic `elementParameter`/
/// `metadata` shape. `tMap` gets its own dialect; everything else falls
/// back to a JSON blob wrapped in `CDATA` (§4.6).
#[derive(Debug, Clone)]
pub enum NodeData {
    Mapper(MapperData),
    Json(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct TalendNode {
    pub component_name: String,
    pub component_version: String,
    pub unique_name: String,
    pub pos_x: i64,
    pub pos_y: i64,
    pub parameters: Vec<ElementParameter>,
    pub metadata: Vec<Metadata>,
    pub node_data: Option<NodeData>,
}

#[derive(Debug, Clone)]
pub struct TalendConnection {
    pub source: String,
    pub target: String,
    pub connector_name: String,
    pub label: String,
    pub line_style: i32,
    pub metaname: String,
    pub offset_label_x: i64,
    pub offset_label_y: i64,
    pub parameters: Vec<ElementParameter>,
}

#[derive(Debug, Clone)]
pub struct TalendJob {
    pub name: String,
    pub nodes: Vec<TalendNode>,
    pub connections: Vec<TalendConnection>,
}
