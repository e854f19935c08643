use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingNotFoundError {
    #[error("no component mapping for IR node type '{ir_type}' subtype '{ir_subtype}'")]
    Unresolved { ir_type: String, ir_subtype: String },
}

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error("generated XML for job '{job}' is not well-formed: {reason}")]
    MalformedXml { job: String, reason: String },

    #[error("template render failed for component '{component}': {reason}")]
    TemplateRenderFailed { component: String, reason: String },

    #[error(transparent)]
    MappingNotFound(#[from] MappingNotFoundError),
}

pub type CodeGenResult<T> = Result<T, CodeGenError>;
