use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

use crate::commands::migrate;

/// §6 "CLI surface": migrates a single DataStage `.dsx` export, or every
/// `.dsx` file under a directory in `--jobs-dir` batch mode.
#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(about = "Migrates IBM DataStage .dsx job exports into a Talend Studio project", version, author)]
pub struct Cli {
    /// The .dsx file to migrate. Omit when using --jobs-dir.
    #[arg(value_name = "DSX_FILE", required_unless_present = "jobs_dir")]
    pub dsx_file: Option<PathBuf>,

    /// Migrate every *.dsx file in DIR in parallel instead of a single file.
    #[arg(long, value_name = "DIR", conflicts_with = "dsx_file")]
    pub jobs_dir: Option<PathBuf>,

    /// Directory the generated Talend project (and its zip) are written under.
    #[arg(long, value_name = "DIR", default_value = "out")]
    pub output_dir: PathBuf,

    /// Name of the generated Talend project.
    #[arg(long, value_name = "NAME", default_value = "migrated_project")]
    pub project: String,

    /// Promote recoverable parse/build warnings to hard errors.
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Drop database components instead of emitting tDB2Input/tDB2Output/etc.
    #[arg(long, default_value_t = false)]
    pub no_db_components: bool,

    /// Emit debug-level logging.
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// TOML file overriding ETL_MIGRATOR_MAPPING_*/TEMPLATE_DIR env vars.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    match &cli.jobs_dir {
        Some(dir) => migrate::run_batch(dir, &cli),
        None => migrate::run_single(&cli),
    }
}
