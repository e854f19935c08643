//! ASG→IR lowerer (C4; see SPEC_FULL.md §4.4): normalizes the vendor-specific
//! ASG into the vendor-neutral IR graph `migrator-codegen` consumes.

pub mod error;
pub mod lower;
pub mod mapping;
pub mod model;

pub use error::{IRResult, IRValidationError};
pub use lower::lower;
pub use model::{
    Ir, IRLink, IRNode, IRNodeType, IRParameter, JobRef, LinkEndpoint, Provenance, SchemaColumn,
    TransformationDetails, TransformationTracking,
};
