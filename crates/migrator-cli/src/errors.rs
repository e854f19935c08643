//! §7 "Error handling design": the pipeline-level taxonomy collapsed to one
//! error with an exit code per §6's CLI surface (`0`/`2`/`3`/`4`/`5`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Parse(#[from] dsx_parser::DSXParseError),

    #[error(transparent)]
    Build(#[from] migrator_asg::AsgError),

    #[error(transparent)]
    Lower(#[from] migrator_ir::IRValidationError),

    #[error(transparent)]
    CodeGen(#[from] migrator_codegen::CodeGenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::Parse(_) => 2,
            MigrateError::Build(_) | MigrateError::Lower(_) => 3,
            MigrateError::CodeGen(_) => 4,
            MigrateError::Io(_) => 5,
        }
    }

    /// `(path, line)` for errors carrying a source location, so the CLI can
    /// print a 3-line context window (§7 "user-visible behavior").
    pub fn location(&self) -> Option<(&str, usize)> {
        match self {
            MigrateError::Parse(
                dsx_parser::DSXParseError::UnterminatedBlock { path, line, .. }
                | dsx_parser::DSXParseError::MismatchedEnd { path, line, .. }
                | dsx_parser::DSXParseError::UnterminatedHeredoc { path, line, .. }
                | dsx_parser::DSXParseError::UnrecognizedLine { path, line, .. },
            ) => Some((path.as_str(), *line)),
            _ => None,
        }
    }
}
