use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::cli::Cli;
use crate::config::MigratorConfig;
use crate::errors::MigrateError;
use crate::orchestrator::{self, MigrateOutcome};

/// `migrate <dsx-file> ...` — single-file mode (§6).
pub fn run_single(cli: &Cli) -> Result<()> {
    let dsx_file = cli.dsx_file.as_ref().expect("clap enforces dsx_file when --jobs-dir is absent");
    let config = MigratorConfig::resolve(cli.config.as_deref())?;

    match orchestrator::migrate_one(dsx_file, cli, &config) {
        Ok(outcome) => {
            print_summary(dsx_file, &outcome);
            Ok(())
        }
        Err(err) => {
            print_failure(dsx_file, &err);
            std::process::exit(err.exit_code());
        }
    }
}

/// `migrate --jobs-dir DIR ...` — batch mode (§6, §5 "multiple jobs in parallel").
pub fn run_batch(jobs_dir: &Path, cli: &Cli) -> Result<()> {
    let config = MigratorConfig::resolve(cli.config.as_deref())?;

    let mut files: Vec<PathBuf> = fs::read_dir(jobs_dir)
        .with_context(|| format!("failed to read jobs directory {}", jobs_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("dsx"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    let results: Vec<(PathBuf, Result<MigrateOutcome, MigrateError>)> = files
        .par_iter()
        .map(|path| (path.clone(), orchestrator::migrate_one(path, cli, &config)))
        .collect();

    let mut failures = 0usize;
    for (path, result) in &results {
        match result {
            Ok(outcome) => print_summary(path, outcome),
            Err(err) => {
                failures += 1;
                print_failure(path, err);
            }
        }
    }

    println!("{} job(s) migrated, {} failed", results.len() - failures, failures);
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(path: &Path, outcome: &MigrateOutcome) {
    println!(
        "{}: {} stages, {} links, {} transformations preserved -> {}",
        path.display(),
        outcome.stages,
        outcome.links,
        outcome.transformations,
        outcome.output_dir.display()
    );
}

/// §7 "User-visible behavior": failing phase, offending identifier, and a
/// 3-line context window of the source when the error carries a location.
fn print_failure(path: &Path, err: &MigrateError) {
    eprintln!("{}: {}", path.display(), err);
    if let Some((_, line)) = err.location() {
        if let Ok(source) = fs::read_to_string(path) {
            eprintln!("{}", dsx_parser::context_window(&source, line));
        }
    }
}
