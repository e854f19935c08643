use thiserror::Error;

/// Errors raised while lexing or parsing a `.dsx` export.
///
/// Strict mode promotes what would otherwise be a logged warning (an
/// unknown block, a missing heredoc terminator) into one of these.
#[derive(Debug, Error)]
pub enum DSXParseError {
    #[error("{path}:{line}: unterminated block {block_type:?} (reached end of file)")]
    UnterminatedBlock {
        path: String,
        line: usize,
        block_type: String,
    },

    #[error("{path}:{line}: END {found} does not match open block {expected}")]
    MismatchedEnd {
        path: String,
        line: usize,
        expected: String,
        found: String,
    },

    #[error("{path}:{line}: heredoc for key '{key}' missing terminator (reached end of file)")]
    UnterminatedHeredoc {
        path: String,
        line: usize,
        key: String,
    },

    #[error("{path}: no DSJOB block found")]
    MissingJob { path: String },

    #[error("{path}:{line}: unrecognized line: {context}")]
    UnrecognizedLine {
        path: String,
        line: usize,
        context: String,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type DSXParseResult<T> = Result<T, DSXParseError>;

/// A three-line window of source around `line`, 1-based, for CLI diagnostics.
pub fn context_window(source: &str, line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let start = line.saturating_sub(2).max(1);
    let end = (line + 1).min(lines.len());
    let mut out = String::new();
    for (i, text) in lines.iter().enumerate().take(end).skip(start - 1) {
        let no = i + 1;
        let marker = if no == line { ">" } else { " " };
        out.push_str(&format!("{marker} {no:>5} | {text}\n"));
    }
    out
}
