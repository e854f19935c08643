//! ASG builder (C3; see SPEC_FULL.md §4.3): turns the raw record forest
//! produced by `dsx-parser` into a fully linked stage/pin/edge graph.

pub mod builder;
pub mod classify;
pub mod derivation;
pub mod error;
pub mod model;
pub mod policy;
pub mod sqltype;

pub use builder::{build, BuildOptions};
pub use error::{ASGBuildError, ASGResult, AsgError, SchemaValidationError};
pub use model::{
    Column, ContainerInfo, Direction, DirectionSer, Edge, EnhancedType, Job, JoinType, Node,
    Parameter, Pin, StageProperties, TransformationClass, TransformationLogic,
};
pub use policy::AptPolicy;
