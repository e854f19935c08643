//! The Glue: composes `dsx-parser` -> `migrator-asg` -> `migrator-ir` ->
//! `migrator-codegen` into a single per-job pipeline. §5 "Suspension points"
//! — everything here is synchronous `std::fs`, no async runtime.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use dsx_parser::{parse_file, ParserOptions};
use migrator_asg::{build as build_asg, BuildOptions as AsgOptions};
use migrator_codegen::{artifacts, build as build_talend, xml, BuildOptions as CodegenOptions, NullMappingRepository};
use migrator_ir::lower;

use crate::cli::Cli;
use crate::config::MigratorConfig;
use crate::errors::MigrateError;
use crate::package;

pub struct MigrateOutcome {
    pub stages: usize,
    pub links: usize,
    pub transformations: usize,
    pub output_dir: PathBuf,
}

/// Run one `.dsx` file through the whole pipeline and write the resulting
/// Talend project + zip under `cli.output_dir`.
pub fn migrate_one(dsx_path: &Path, cli: &Cli, _config: &MigratorConfig) -> Result<MigrateOutcome, MigrateError> {
    let parser_options = ParserOptions { strict: cli.strict };
    let document = parse_file(dsx_path, &parser_options)?;

    let asg_options = AsgOptions { strict: cli.strict };
    let job = build_asg(&document, &asg_options)?;

    let generated_at = Utc::now().format("%Y-%m-%dT%H:%M:%S+0000").to_string();
    let ir = lower(&job, &generated_at)?;

    let stages = ir.nodes.len();
    let links = ir.links.len();
    let transformations = ir.transformation_tracking.total_transformations;

    let repo = NullMappingRepository;
    let codegen_options = CodegenOptions {
        strict: cli.strict,
        allow_db_passthrough: !cli.no_db_components,
    };
    let talend_job = build_talend(&ir, &repo, &codegen_options)?;
    let item_xml = xml::render(&talend_job)?;

    let project_dir = cli.output_dir.join(&cli.project);
    let job_dir = project_dir.join("process").join("DataStage");

    if let Err(err) = write_outputs(
        &job_dir,
        &project_dir,
        &talend_job.name,
        &item_xml,
        &cli.project,
        &generated_at,
        &ir.job.parameters,
    ) {
        let _ = fs::remove_dir_all(&project_dir);
        return Err(err);
    }

    let zip_path = cli.output_dir.join(format!("{}.zip", cli.project));
    if let Err(e) = package::package_project(&project_dir, &zip_path) {
        let _ = fs::remove_dir_all(&project_dir);
        return Err(MigrateError::Io(e));
    }

    Ok(MigrateOutcome {
        stages,
        links,
        transformations,
        output_dir: project_dir,
    })
}

fn write_outputs(
    job_dir: &Path,
    project_dir: &Path,
    job_name: &str,
    item_xml: &str,
    project_name: &str,
    generated_at: &str,
    parameters: &[migrator_ir::IRParameter],
) -> Result<(), MigrateError> {
    fs::create_dir_all(job_dir)?;

    fs::write(job_dir.join(format!("{job_name}.item")), item_xml)?;

    let properties = artifacts::render_properties(job_name, generated_at);
    fs::write(job_dir.join(format!("{job_name}.properties")), properties)?;

    let descriptor = artifacts::render_project_descriptor(project_name, generated_at);
    fs::write(project_dir.join("talend.project"), descriptor)?;

    if !parameters.is_empty() {
        let contexts_dir = project_dir.join("contexts");
        fs::create_dir_all(&contexts_dir)?;
        let context_properties = artifacts::render_context_properties(parameters);
        fs::write(contexts_dir.join(format!("{job_name}_Default.properties")), context_properties)?;
    }

    Ok(())
}
