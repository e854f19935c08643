//! Talend job builder and XML/project emitter (C6-C8; see SPEC_FULL.md
//! §4.5-§4.7). Consumes a `migrator_ir::Ir` document and a component mapping
//! table, produces an in-memory `TalendJob`, then serializes it to the
//! `.item`/`.properties`/`talend.project` artifacts a Talend Studio project
//! expects.

pub mod artifacts;
pub mod builder;
pub mod error;
pub mod mapping;
pub mod talend_model;
pub mod template;
pub mod uuidgen;
pub mod xml;

pub use builder::{build, BuildOptions};
pub use error::{CodeGenError, CodeGenResult, MappingNotFoundError};
pub use mapping::{MappingRepository, NullMappingRepository};
pub use talend_model::{
    ElementParameter, ElementValueRow, MapperData, MapperInputTable, MapperOutputTable, MapperTableEntry,
    Metadata, MetadataColumn, NodeData, ParamField, TalendConnection, TalendJob, TalendNode,
};
pub use uuidgen::generate_talend_id;
