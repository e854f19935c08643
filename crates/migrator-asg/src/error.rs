use thiserror::Error;

#[derive(Debug, Error)]
pub enum ASGBuildError {
    #[error("no stage records found in job '{job}'")]
    NoStages { job: String },

    #[error("container record {container} missing required array '{field}'")]
    MissingContainerArray { container: String, field: String },

    #[error("duplicate stage name '{name}' in job '{job}'")]
    DuplicateStageName { name: String, job: String },
}

#[derive(Debug, Error)]
pub enum SchemaValidationError {
    #[error("column '{name}' in pin {pin} has malformed SqlType '{raw}'")]
    MalformedSqlType { pin: String, name: String, raw: String },
}

/// The ASG builder's full error surface: either the graph cannot be
/// constructed at all ([`ASGBuildError`]), or a schema entry is malformed
/// under strict mode ([`SchemaValidationError`]).
#[derive(Debug, Error)]
pub enum AsgError {
    #[error(transparent)]
    Build(#[from] ASGBuildError),
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),
}

pub type ASGResult<T> = Result<T, AsgError>;
