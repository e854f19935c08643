//! Lexer and recursive-descent parser for IBM DataStage `.dsx` textual
//! exports (pipeline stages C1+C2; see SPEC_FULL.md §4.1-4.2).
//!
//! This crate only builds the raw nested record forest described in
//! SPEC_FULL.md §3's "ASG (output of C3)" preamble — turning that forest
//! into a linked `Job` graph is `migrator-asg`'s job.

pub mod decode;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod record;
pub mod value;

pub use decode::decode_dsx_value;
pub use error::{context_window, DSXParseError, DSXParseResult};
pub use parser::{parse_bytes, parse_str, Document, ParserOptions, APT_PRESERVE_NAMES};
pub use record::Record;
pub use value::DSXValue;

use std::path::Path;

/// Read and parse a `.dsx` file from disk.
pub fn parse_file(path: impl AsRef<Path>, options: &ParserOptions) -> DSXParseResult<Document> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();
    let bytes = std::fs::read(path_ref).map_err(|source| DSXParseError::Io {
        path: path_str.clone(),
        source,
    })?;
    parse_bytes(&path_str, &bytes, options)
}
