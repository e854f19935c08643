use thiserror::Error;

#[derive(Debug, Error)]
pub enum IRValidationError {
    #[error("link '{link}' references non-existent node '{node}'")]
    DanglingLinkEndpoint { link: String, node: String },

    #[error("node '{node}' references non-existent schema '{schema_ref}'")]
    MissingSchemaRef { node: String, schema_ref: String },

    #[error("data-flow graph contains a cycle through node '{node}'")]
    CyclicGraph { node: String },
}

pub type IRResult<T> = Result<T, IRValidationError>;
