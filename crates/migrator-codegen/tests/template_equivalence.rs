//! §4.6 "Template usage": the templated and programmatic paths for
//! `tFileInputDelimited`/`tFileOutputDelimited` must produce XML-equivalent
//! output. Compares both against a golden fixture, ignoring indentation
//! (semantically insignificant in XML, and the two paths nest the same
//! content at different depths).

use std::fs;
use std::path::Path;

use migrator_codegen::talend_model::{ElementParameter, Metadata, MetadataColumn, ParamField, TalendNode};
use migrator_codegen::{template, xml};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

fn sample_input_node() -> TalendNode {
    TalendNode {
        component_name: "tFileInputDelimited".to_string(),
        component_version: "0.102".to_string(),
        unique_name: "Input_File".to_string(),
        pos_x: 100,
        pos_y: 100,
        parameters: vec![
            ElementParameter::new(ParamField::File, "FILENAME", "\"in.csv\""),
            ElementParameter::new(ParamField::Text, "FIELDSEPARATOR", "\",\""),
        ],
        metadata: vec![Metadata {
            connector: "FLOW".to_string(),
            name: "metadata".to_string(),
            columns: vec![MetadataColumn {
                name: "USERNAME".to_string(),
                talend_type: "id_String".to_string(),
                nullable: true,
                length: None,
                precision: None,
                key: false,
                source_type: String::new(),
                pattern: String::new(),
                original_length: None,
                useful_column: true,
                comment: String::new(),
            }],
        }],
        node_data: None,
    }
}

/// Normalize line endings/whitespace so a comparison isn't sensitive to
/// indentation depth, which differs between a standalone render and a
/// render embedded under a template's `{{BODY}}` placeholder.
fn normalize(xml: &str) -> Vec<String> {
    xml.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect()
}

#[test]
fn templated_and_programmatic_bodies_match_golden_fixture() {
    let node = sample_input_node();

    let golden = fixture("golden_tfileinputdelimited_body.xml");
    let body = xml::render_node_body(&node).expect("programmatic body render");

    assert_eq!(normalize(&body), normalize(&golden));
}

#[test]
fn templated_node_embeds_the_same_body_as_the_programmatic_path() {
    let node = sample_input_node();

    let programmatic = xml::render_node_standalone(&node).expect("programmatic node render");
    let templated = template::render_node(&node).expect("tFileInputDelimited has a template").expect("template render");

    let programmatic_body: Vec<String> = normalize(&programmatic)
        .into_iter()
        .filter(|l| !l.starts_with("<node") && l != "</node>")
        .collect();
    let templated_body: Vec<String> = normalize(&templated)
        .into_iter()
        .filter(|l| !l.starts_with("<node") && l != "</node>")
        .collect();

    assert_eq!(programmatic_body, templated_body);
    assert!(templated.contains(r#"componentName="tFileInputDelimited""#));
    assert!(templated.contains(r#"uniqueName="Input_File""#));
    assert!(xml::well_formed("Sample_Job", &format!("<root>{programmatic}</root>")).is_ok());
}

#[test]
fn component_with_no_template_falls_back_to_programmatic_path() {
    let mut node = sample_input_node();
    node.component_name = "tMap".to_string();
    node.parameters = vec![ElementParameter::new(ParamField::Text, "CONNECTION_FORMAT", "row")];
    node.metadata = vec![];

    assert!(template::render_node(&node).is_none());
}
