//! §4.3 step 6: classify a raw `Derivation` expression string.
//!
//! This is explicitly a lightweight regex engine, not a real expression
//! parser (§9 Design Notes): it MUST be total (no input panics it) and
//! MUST produce `Complex` whenever no rule matches, rather than erroring.
//! The raw expression is always preserved verbatim regardless of how it
//! classifies.

use crate::model::{TransformationClass, TransformationLogic};
use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());
static LINK_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\.([A-Za-z_][A-Za-z0-9_]*)\b").unwrap());
static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());
static NUMERIC_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*-?\d+(\.\d+)?\s*$").unwrap());
static QUOTED_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s*'[^']*'\s*$"#).unwrap());
static ARITHMETIC_OP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+\-*/]").unwrap());

const WINDOW_FUNCTIONS: &[&str] = &["DENSE_RANK", "RANK", "ROW_NUMBER", "OVER", "LAG", "LEAD"];
const AGGREGATE_FUNCTIONS: &[&str] = &["SUM", "COUNT", "AVG", "MIN", "MAX"];
const DATE_FUNCTIONS: &[&str] = &[
    "TO_DATE",
    "DATE",
    "CURRENT_DATE",
    "YEAR",
    "MONTH",
    "DAY",
    "TIMESTAMP_TO_DATE",
];
const STRING_FUNCTIONS: &[&str] = &[
    "UPPER",
    "LOWER",
    "TRIM",
    "SUBSTRING",
    "CONCAT",
    "LEFT",
    "RIGHT",
    "DOWNCASE",
    "UPCASE",
];
// Keywords the bare-identifier scan should not report as source columns.
const KEYWORDS: &[&str] = &[
    "CASE", "WHEN", "THEN", "ELSE", "END", "IF", "AND", "OR", "NOT", "NULL", "IS",
];

pub fn classify_derivation(expression: &str) -> TransformationLogic {
    let trimmed = expression.trim();
    let upper = trimmed.to_uppercase();

    let functions: Vec<String> = FUNCTION_CALL
        .captures_iter(trimmed)
        .map(|c| c[1].to_uppercase())
        .filter(|name| !KEYWORDS.contains(&name.as_str()))
        .collect();

    let source_columns = extract_source_columns(trimmed);

    let classification = if trimmed.is_empty() {
        TransformationClass::Constant
    } else if functions.iter().any(|f| WINDOW_FUNCTIONS.contains(&f.as_str())) || upper.contains(" OVER(") || upper.contains(" OVER (") {
        TransformationClass::WindowFunction
    } else if functions.iter().any(|f| AGGREGATE_FUNCTIONS.contains(&f.as_str())) {
        TransformationClass::Aggregation
    } else if functions.iter().any(|f| DATE_FUNCTIONS.contains(&f.as_str())) {
        TransformationClass::DateOperation
    } else if functions.iter().any(|f| STRING_FUNCTIONS.contains(&f.as_str())) {
        TransformationClass::StringOperation
    } else if upper.contains("CASE WHEN") || upper.starts_with("IF ") || upper.starts_with("IF(") {
        TransformationClass::Conditional
    } else if QUOTED_LITERAL.is_match(trimmed) || NUMERIC_LITERAL.is_match(trimmed) {
        TransformationClass::Constant
    } else if functions.is_empty() && LINK_COLUMN.is_match(trimmed) && !ARITHMETIC_OP.is_match(trimmed) {
        TransformationClass::SimpleColumn
    } else if functions.is_empty() && is_bare_identifier(trimmed) {
        TransformationClass::SimpleColumn
    } else if functions.is_empty() && ARITHMETIC_OP.is_match(trimmed) {
        TransformationClass::Arithmetic
    } else {
        TransformationClass::Complex
    };

    TransformationLogic {
        classification,
        source_columns,
        functions,
        expression: expression.to_string(),
    }
}

fn is_bare_identifier(s: &str) -> bool {
    let trimmed = s.trim();
    !trimmed.is_empty() && BARE_IDENTIFIER.is_match(trimmed) && BARE_IDENTIFIER.find(trimmed).map(|m| m.as_str() == trimmed).unwrap_or(false)
}

fn extract_source_columns(expression: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    for caps in LINK_COLUMN.captures_iter(expression) {
        seen.insert(format!("{}.{}", &caps[1], &caps[2]));
    }
    if seen.is_empty() {
        for m in BARE_IDENTIFIER.find_iter(expression) {
            let word = m.as_str();
            if !KEYWORDS.contains(&word.to_uppercase().as_str())
                && !FUNCTION_CALL.is_match(&format!("{word}("))
            {
                seen.insert(word.to_string());
            }
        }
    }
    seen.into_iter().collect()
}
