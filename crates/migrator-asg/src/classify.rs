//! §4.3 step 3: `enhanced_type` classification.
//!
//! A rule table keyed on `stage_type` first, then `ole_type`, then property
//! evidence. Unknown values retain `stage_type` verbatim rather than
//! erroring — DataStage's stage-type vocabulary is open-ended and new
//! values show up in real exports faster than any fixed table can track.

use crate::model::EnhancedType;

/// Evidence gathered from a stage's properties, used only when neither
/// `stage_type` nor `ole_type` resolve to a known classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyEvidence {
    pub has_trx_gen_code: bool,
    pub has_file_path: bool,
    pub has_db_connector_descriptor: bool,
}

const KNOWN_STAGE_TYPES: &[&str] = &[
    "PxSequentialFile",
    "PxTransformer",
    "PxLookup",
    "PxJoin",
    "PxChangeCapture",
    "DB2ConnectorPX",
    "CTransformerStage",
    "CCustomStage",
    "TransactionalCustomStage",
    "PxFunnel",
    "PxRemoveDup",
];

pub fn classify(
    stage_type: &str,
    ole_type: Option<&str>,
    evidence: PropertyEvidence,
) -> EnhancedType {
    if KNOWN_STAGE_TYPES.contains(&stage_type) {
        return EnhancedType(stage_type.to_string());
    }

    if let Some(ole) = ole_type {
        if let Some(mapped) = classify_from_ole_type(ole) {
            return EnhancedType(mapped.to_string());
        }
    }

    if evidence.has_trx_gen_code {
        return EnhancedType("CTransformerStage".to_string());
    }
    if evidence.has_file_path {
        return EnhancedType("PxSequentialFile".to_string());
    }
    if evidence.has_db_connector_descriptor {
        return EnhancedType("DB2ConnectorPX".to_string());
    }

    if stage_type.is_empty() {
        return EnhancedType("Generic".to_string());
    }
    EnhancedType(stage_type.to_string())
}

fn classify_from_ole_type(ole_type: &str) -> Option<&'static str> {
    match ole_type {
        "CTransformerStage" | "CCustomStage" | "CSequentialFile" | "CDB2Connector" => {
            KNOWN_STAGE_TYPES.iter().find(|s| **s == ole_type).copied()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_stage_type_wins_outright() {
        let e = classify("PxLookup", None, PropertyEvidence::default());
        assert_eq!(e.as_str(), "PxLookup");
    }

    #[test]
    fn trx_gen_code_evidence_implies_transformer() {
        let e = classify(
            "SomeUnknownType",
            None,
            PropertyEvidence {
                has_trx_gen_code: true,
                ..Default::default()
            },
        );
        assert_eq!(e.as_str(), "CTransformerStage");
    }

    #[test]
    fn file_path_evidence_implies_sequential_file() {
        let e = classify(
            "SomeUnknownType",
            None,
            PropertyEvidence {
                has_file_path: true,
                ..Default::default()
            },
        );
        assert_eq!(e.as_str(), "PxSequentialFile");
    }

    #[test]
    fn unknown_retains_stage_type_verbatim() {
        let e = classify("WeirdCustomThing", None, PropertyEvidence::default());
        assert_eq!(e.as_str(), "WeirdCustomThing");
    }
}
