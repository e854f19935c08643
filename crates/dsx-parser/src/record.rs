use crate::value::DSXValue;
use std::collections::HashMap;

/// One `BEGIN T ... END T` block, with its direct key-value fields and any
/// nested blocks. This is the raw forest produced by C2, before the ASG
/// builder (C3, in `migrator-asg`) interprets identifier patterns and
/// cross-references.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub block_type: String,
    pub fields: HashMap<String, DSXValue>,
    pub subrecords: Vec<Record>,
    pub line_start: usize,
    pub line_end: usize,
}

impl Record {
    pub fn new(block_type: impl Into<String>, line_start: usize) -> Self {
        Record {
            block_type: block_type.into(),
            fields: HashMap::new(),
            subrecords: Vec::new(),
            line_start,
            line_end: line_start,
        }
    }

    pub fn field(&self, key: &str) -> Option<&DSXValue> {
        self.fields.get(key)
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|v| v.as_str())
    }

    /// The DSX `Identifier` field, which the ASG builder uses to decide
    /// whether a record is a container (`V<d>`), a stage (`V<d>S<d>`) or a
    /// pin (`V<d>S<d>P<d>`).
    pub fn identifier(&self) -> Option<&str> {
        self.field_str("Identifier")
    }

    pub fn subrecords_named(&self, block_type: &str) -> impl Iterator<Item = &Record> {
        self.subrecords
            .iter()
            .filter(move |r| r.block_type == block_type)
    }
}
