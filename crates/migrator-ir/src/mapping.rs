//! §4.4 "Type mapping": `enhanced_type → (ir_type, ir_subtype)`, direction
//! resolved from pin counts per the IR invariant ("a node is classified
//! `Source` iff it has only output pins, `Sink` iff only input pins").

use migrator_asg::Node;

use crate::model::IRNodeType;

const DB_CONNECTOR_SUFFIX: &str = "ConnectorPX";

pub fn map_enhanced_type(node: &Node) -> (IRNodeType, String) {
    let has_inputs = node.input_pins().next().is_some();
    let has_outputs = node.output_pins().next().is_some();

    match node.enhanced_type.as_str() {
        "PxSequentialFile" => (source_or_sink(has_inputs, has_outputs), "File".to_string()),
        "CTransformerStage" | "PxTransformer" => (IRNodeType::Transform, "Map".to_string()),
        "PxLookup" => (IRNodeType::Lookup, "Lookup".to_string()),
        "PxJoin" => (IRNodeType::Join, "Join".to_string()),
        "PxFunnel" => (IRNodeType::Merge, "Merge".to_string()),
        "PxRemoveDup" => (IRNodeType::Deduplicate, "Deduplicate".to_string()),
        "CCustomStage" | "TransactionalCustomStage" => classify_custom_stage(node, has_inputs, has_outputs),
        stage_type if stage_type.ends_with(DB_CONNECTOR_SUFFIX) => {
            let flavor = stage_type.trim_end_matches(DB_CONNECTOR_SUFFIX);
            (source_or_sink(has_inputs, has_outputs), flavor.to_string())
        }
        _ => (source_or_sink_else_transform(has_inputs, has_outputs), "Custom".to_string()),
    }
}

fn source_or_sink(has_inputs: bool, has_outputs: bool) -> IRNodeType {
    if has_outputs && !has_inputs {
        IRNodeType::Source
    } else {
        IRNodeType::Sink
    }
}

fn source_or_sink_else_transform(has_inputs: bool, has_outputs: bool) -> IRNodeType {
    match (has_inputs, has_outputs) {
        (false, true) => IRNodeType::Source,
        (true, false) => IRNodeType::Sink,
        _ => IRNodeType::Transform,
    }
}

/// Resolved open question (SPEC_FULL.md §9): `CCustomStage` has no pins to
/// reliably infer direction from in every export, so classify by property
/// evidence first (a `FilePath` makes it a file endpoint) and only fall
/// back to `Transform/Custom` if no such evidence exists.
fn classify_custom_stage(node: &Node, has_inputs: bool, has_outputs: bool) -> (IRNodeType, String) {
    if node.properties.configuration.contains_key("FilePath") {
        (source_or_sink(has_inputs, has_outputs), "File".to_string())
    } else {
        (IRNodeType::Transform, "Custom".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrator_asg::{Direction, DirectionSer, EnhancedType, Pin, StageProperties};

    fn node_with(enhanced_type: &str, pins: Vec<Pin>) -> Node {
        Node {
            id: "V0S0".into(),
            name: "Stage".into(),
            stage_type: enhanced_type.into(),
            ole_type: None,
            enhanced_type: EnhancedType(enhanced_type.into()),
            properties: StageProperties::default(),
            pins,
        }
    }

    fn pin(direction: Direction) -> Pin {
        Pin {
            id: "V0S0P0".into(),
            name: "link".into(),
            direction: Some(direction.into()),
            schema: vec![],
            properties: Default::default(),
            partner_ref: None,
        }
    }

    #[test]
    fn sequential_file_with_only_output_is_source() {
        let node = node_with("PxSequentialFile", vec![pin(Direction::Output)]);
        let (ty, subtype) = map_enhanced_type(&node);
        assert_eq!(ty, IRNodeType::Source);
        assert_eq!(subtype, "File");
    }

    #[test]
    fn sequential_file_with_only_input_is_sink() {
        let node = node_with("PxSequentialFile", vec![pin(Direction::Input)]);
        let (ty, _) = map_enhanced_type(&node);
        assert_eq!(ty, IRNodeType::Sink);
    }

    #[test]
    fn transformer_is_transform_map() {
        let node = node_with("CTransformerStage", vec![pin(Direction::Input), pin(Direction::Output)]);
        let (ty, subtype) = map_enhanced_type(&node);
        assert_eq!(ty, IRNodeType::Transform);
        assert_eq!(subtype, "Map");
    }

    #[test]
    fn db2_connector_extracts_flavor() {
        let node = node_with("DB2ConnectorPX", vec![pin(Direction::Output)]);
        let (ty, subtype) = map_enhanced_type(&node);
        assert_eq!(ty, IRNodeType::Source);
        assert_eq!(subtype, "DB2");
    }

    #[test]
    fn custom_stage_without_file_evidence_is_transform() {
        let mut node = node_with("CCustomStage", vec![]);
        node.properties.configuration.clear();
        let (ty, subtype) = map_enhanced_type(&node);
        assert_eq!(ty, IRNodeType::Transform);
        assert_eq!(subtype, "Custom");
    }

    #[test]
    fn custom_stage_with_file_path_is_file_endpoint() {
        let mut node = node_with("CCustomStage", vec![pin(Direction::Output)]);
        node.properties
            .configuration
            .insert("FilePath".to_string(), "D:/out.csv".to_string());
        let (ty, subtype) = map_enhanced_type(&node);
        assert_eq!(ty, IRNodeType::Source);
        assert_eq!(subtype, "File");
    }
}
