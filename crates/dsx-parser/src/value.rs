use serde::{Deserialize, Serialize};

/// A single decoded DSX property value.
///
/// The source format mixes quoted strings, bare literals and heredocs
/// freely for the same logical field across stage types, so callers must
/// coerce through one place rather than matching on the DSX surface syntax
/// at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DSXValue {
    String(String),
    Int(i64),
    Bool(bool),
    Heredoc(String),
}

impl DSXValue {
    pub fn as_str(&self) -> &str {
        match self {
            DSXValue::String(s) => s,
            DSXValue::Heredoc(s) => s,
            DSXValue::Int(_) | DSXValue::Bool(_) => "",
        }
    }

    pub fn into_string(self) -> String {
        match self {
            DSXValue::String(s) | DSXValue::Heredoc(s) => s,
            DSXValue::Int(i) => i.to_string(),
            DSXValue::Bool(b) => b.to_string(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DSXValue::Int(i) => Some(*i),
            DSXValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DSXValue::Bool(b) => Some(*b),
            DSXValue::Int(i) => Some(*i != 0),
            DSXValue::String(s) => match s.trim() {
                "1" | "true" | "TRUE" | "True" | "yes" => Some(true),
                "0" | "false" | "FALSE" | "False" | "no" => Some(false),
                _ => None,
            },
            DSXValue::Heredoc(_) => None,
        }
    }
}

impl From<&str> for DSXValue {
    fn from(s: &str) -> Self {
        DSXValue::String(s.to_string())
    }
}

impl From<String> for DSXValue {
    fn from(s: String) -> Self {
        DSXValue::String(s)
    }
}
