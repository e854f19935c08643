use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use dsx_parser::ParserOptions;
use migrator_asg::BuildOptions as AsgOptions;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn cmd() -> Command {
    Command::cargo_bin("etl-migrator").unwrap()
}

/// Scenario A: a source -> transformer -> sink pipeline with an UPPER()
/// derivation on one column lowers to tFileInputDelimited/tMap/tFileOutputDelimited,
/// with the tMap expression naming the upstream node's sanitized "row" alias
/// and the file path normalized to drop its drive letter.
#[test]
fn scenario_a_simple_pipeline_resolves_components_and_expression() {
    let out = tempfile::tempdir().unwrap();
    cmd()
        .arg(fixture("scenario_a_simple_pipeline.dsx"))
        .args(["--output-dir", out.path().to_str().unwrap()])
        .args(["--project", "scenario_a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 stages, 2 links"));

    let item_xml = read_item_xml(out.path(), "scenario_a", "Simple_User_Pipeline");
    assert!(item_xml.contains(r#"componentName="tFileInputDelimited""#));
    assert!(item_xml.contains(r#"componentName="tMap""#));
    assert!(item_xml.contains(r#"componentName="tFileOutputDelimited""#));
    assert!(item_xml.contains("StringHandling.UPPER(rowInput_File.USERNAME)"));
    assert!(item_xml.contains("in.csv"));
    assert!(!item_xml.contains(r#"D:\in.csv"#));
}

/// Scenario B: a lookup fed by three sources (a primary read plus two
/// reference tables) lowers to a tMap with one input table per source link
/// and a single output table carrying the lookup's full 36-column schema.
#[test]
fn scenario_b_lookup_resolves_three_input_tables_and_full_output() {
    let out = tempfile::tempdir().unwrap();
    cmd()
        .arg(fixture("scenario_b_lookup_three_inputs.dsx"))
        .args(["--output-dir", out.path().to_str().unwrap()])
        .args(["--project", "scenario_b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 stages, 4 links"));

    let item_xml = read_item_xml(out.path(), "scenario_b", "Customer_Lookup_Job");
    assert_eq!(item_xml.matches("<inputTables ").count(), 3);
    assert_eq!(item_xml.matches("<outputTables ").count(), 1);

    let output_section = item_xml
        .split("<outputTables ")
        .nth(1)
        .expect("an outputTables element");
    let output_section = output_section.split("</outputTables>").next().unwrap();
    assert_eq!(output_section.matches("<mapperTableEntries ").count(), 36);
}

/// Scenario C: DSX `ROOT` parameters lower into `Ir::job.parameters` with
/// their prompts and defaults intact, and the CLI materializes them as a
/// Talend context group alongside the job.
#[test]
fn scenario_c_job_parameters_populate_ir_and_context_group() {
    let out = tempfile::tempdir().unwrap();
    cmd()
        .arg(fixture("scenario_c_job_parameters.dsx"))
        .args(["--output-dir", out.path().to_str().unwrap()])
        .args(["--project", "scenario_c"])
        .assert()
        .success();

    let context_path = out
        .path()
        .join("scenario_c")
        .join("contexts")
        .join("Parameterized_Job_Default.properties");
    let context = fs::read_to_string(&context_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", context_path.display()));
    assert!(context.contains("TEST_Param=\n"));
    assert!(context.contains("STMT_START=2016-03-01\n"));
}

/// Scenario E: an `Owner "APT"` `TrxGenCode` subrecord (a 2KB legacy code
/// block) survives into the IR node verbatim, with no truncation from the
/// control-marker/path-normalization decoding it passes through.
#[test]
fn scenario_e_apt_trx_gen_code_survives_verbatim() {
    let path = fixture("scenario_e_apt_preservation.dsx");
    let document = dsx_parser::parse_file(&path, &ParserOptions { strict: true }).unwrap();
    let job = migrator_asg::build(&document, &AsgOptions { strict: true }).unwrap();
    let ir = migrator_ir::lower(&job, "2026-01-01T00:00:00+0000").unwrap();

    let node = ir.nodes.iter().find(|n| n.name == "Legacy_Transformer").expect("the transformer node");
    let trx_gen_code = node.trx_gen_code.as_ref().expect("TrxGenCode preserved");
    assert_eq!(trx_gen_code.len(), 2048);
    assert!(trx_gen_code.starts_with("MOVE WS-INPUT-FIELD TO WS-OUTPUT-FIELD."));
    assert_eq!(node.trx_class_name.as_deref(), Some("Legacy_Transformer_Trx"));
}

/// Scenario D: reciprocal `A->B`/`B->A` edges (over-zealous partner linking)
/// must collapse to exactly one surviving connection in the Talend output.
#[test]
fn scenario_d_cycle_collapses_to_one_connection() {
    let out = tempfile::tempdir().unwrap();
    cmd()
        .arg(fixture("scenario_d_cycle_suppression.dsx"))
        .args(["--output-dir", out.path().to_str().unwrap()])
        .args(["--project", "scenario_d"])
        .assert()
        .success();

    let item_xml = read_item_xml(out.path(), "scenario_d", "Cycle_Suppression_Job");
    assert_eq!(item_xml.matches("<connection ").count(), 1);
}

/// Scenario F: a heredoc left open at EOF is a hard parse error under
/// `--strict`, and an accepted-to-EOF warning otherwise.
#[test]
fn scenario_f_malformed_heredoc_strict_fails_lenient_succeeds() {
    let out = tempfile::tempdir().unwrap();
    cmd()
        .arg(fixture("scenario_f_malformed_heredoc.dsx"))
        .args(["--output-dir", out.path().to_str().unwrap()])
        .args(["--project", "scenario_f_strict"])
        .arg("--strict")
        .assert()
        .failure()
        .code(2);

    let out2 = tempfile::tempdir().unwrap();
    cmd()
        .arg(fixture("scenario_f_malformed_heredoc.dsx"))
        .args(["--output-dir", out2.path().to_str().unwrap()])
        .args(["--project", "scenario_f_lenient"])
        .assert()
        .success();

    let item_xml = read_item_xml(out2.path(), "scenario_f_lenient", "Malformed_Heredoc_Job");
    assert!(item_xml.contains(r#"componentName="tFileInputDelimited""#));
}

fn read_item_xml(output_dir: &Path, project: &str, job_name: &str) -> String {
    let item_path = output_dir
        .join(project)
        .join("process")
        .join("DataStage")
        .join(format!("{job_name}.item"));
    fs::read_to_string(&item_path).unwrap_or_else(|e| panic!("failed to read {}: {e}", item_path.display()))
}
