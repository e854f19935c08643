//! C1+C2: lexical layer and recursive-descent DSX parser.
//!
//! The algorithm is the stack-based one described in SPEC_FULL.md §4.2:
//! push a record on `BEGIN T`, pop and verify on `END T`, attach key-values
//! to the record on top of the stack, and fold heredoc continuation lines
//! into whichever key opened the heredoc.

use crate::error::{DSXParseError, DSXParseResult};
use crate::lexer::{lex_line, LineToken};
use crate::record::Record;
use crate::value::DSXValue;
use log::warn;

/// The preserve set for APT-owned subrecords (§4.2). Anything under
/// `Owner "APT"` whose `Name` is not in this set is dropped after parsing.
/// Treated as a versioned policy table per SPEC_FULL.md's resolved open
/// question, not a structural parser rule.
pub const APT_PRESERVE_NAMES: &[&str] = &["TrxGenCode", "TrxClassName", "JobParameterNames"];

#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Promote warnings (unknown blocks, unterminated heredocs, unrecognized
    /// lines) to hard errors.
    pub strict: bool,
}

/// The root of a parsed `.dsx` file: the `HEADER` block and the `DSJOB`
/// block (itself a forest of `DSRECORD`/`DSSUBRECORD` children).
#[derive(Debug, Clone)]
pub struct Document {
    pub header: Record,
    pub job: Record,
}

struct OpenBlock {
    record: Record,
    /// Key currently collecting a multi-line heredoc, if any.
    heredoc_key: Option<String>,
    heredoc_lines: Vec<String>,
    heredoc_start_line: usize,
}

pub fn parse_bytes(
    path: &str,
    bytes: &[u8],
    options: &ParserOptions,
) -> DSXParseResult<Document> {
    let source = String::from_utf8_lossy(bytes);
    parse_str(path, &source, options)
}

pub fn parse_str(path: &str, source: &str, options: &ParserOptions) -> DSXParseResult<Document> {
    let mut stack: Vec<OpenBlock> = Vec::new();
    let mut header: Option<Record> = None;
    let mut job: Option<Record> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(top) = stack.last_mut() {
            if let Some(key) = top.heredoc_key.clone() {
                let trimmed = raw_line.trim_start();
                if trimmed.starts_with(crate::lexer::HEREDOC_DELIM) {
                    let content = top.heredoc_lines.join("\n");
                    top.record
                        .fields
                        .insert(key, DSXValue::Heredoc(content));
                    top.heredoc_key = None;
                    top.heredoc_lines.clear();
                    continue;
                } else {
                    top.heredoc_lines.push(raw_line.to_string());
                    continue;
                }
            }
        }

        let token = match lex_line(raw_line) {
            Some(t) => t,
            None => {
                let msg = format!(
                    "{path}:{line_no}: unrecognized line: {raw_line}",
                    raw_line = raw_line.trim()
                );
                if options.strict {
                    return Err(DSXParseError::UnrecognizedLine {
                        path: path.to_string(),
                        line: line_no,
                        context: raw_line.trim().to_string(),
                    });
                }
                warn!("{msg}");
                continue;
            }
        };

        match token {
            LineToken::Blank => continue,
            LineToken::Begin { block_type } => {
                stack.push(OpenBlock {
                    record: Record::new(block_type, line_no),
                    heredoc_key: None,
                    heredoc_lines: Vec::new(),
                    heredoc_start_line: 0,
                });
            }
            LineToken::End { block_type } => {
                let mut open = stack.pop().ok_or_else(|| DSXParseError::MismatchedEnd {
                    path: path.to_string(),
                    line: line_no,
                    expected: "<nothing open>".to_string(),
                    found: block_type.clone(),
                })?;
                if open.record.block_type != block_type {
                    return Err(DSXParseError::MismatchedEnd {
                        path: path.to_string(),
                        line: line_no,
                        expected: open.record.block_type,
                        found: block_type,
                    });
                }
                open.record.line_end = line_no;
                let finished = open.record;
                match finished.block_type.as_str() {
                    "HEADER" => header = Some(finished),
                    "DSJOB" => job = Some(finished),
                    _ => {
                        if let Some(parent) = stack.last_mut() {
                            parent.record.subrecords.push(finished);
                        } else {
                            // A top-level block outside HEADER/DSJOB: keep it
                            // as a synthetic job so lenient-mode inputs that
                            // omit the wrapper still parse.
                            job.get_or_insert_with(|| Record::new("DSJOB", line_no))
                                .subrecords
                                .push(finished);
                        }
                    }
                }
            }
            LineToken::KeyValue { key, value } => {
                if let Some(top) = stack.last_mut() {
                    top.record.fields.insert(key, value);
                } else {
                    warn!("{path}:{line_no}: key-value outside any block, ignored: {key}");
                }
            }
            LineToken::HeredocInline { key, content } => {
                if let Some(top) = stack.last_mut() {
                    top.record.fields.insert(key, DSXValue::Heredoc(content));
                } else {
                    warn!("{path}:{line_no}: heredoc outside any block, ignored: {key}");
                }
            }
            LineToken::HeredocOpen { key } => {
                if let Some(top) = stack.last_mut() {
                    top.heredoc_key = Some(key);
                    top.heredoc_lines.clear();
                    top.heredoc_start_line = line_no;
                } else {
                    warn!("{path}:{line_no}: heredoc outside any block, ignored: {key}");
                }
            }
            LineToken::HeredocTerminator => {
                // A terminator with no open heredoc collecting: ignore.
            }
        }
    }

    // Anything still open at EOF is either an unterminated heredoc or an
    // unterminated block. Strict mode rejects both; lenient mode flushes
    // each open heredoc with whatever it collected and force-closes each
    // open block as if EOF were its `END`, innermost first, with a warning.
    if options.strict {
        if let Some(top) = stack.last() {
            if let Some(key) = &top.heredoc_key {
                return Err(DSXParseError::UnterminatedHeredoc {
                    path: path.to_string(),
                    line: top.heredoc_start_line,
                    key: key.clone(),
                });
            }
        }
        if let Some(top) = stack.first() {
            return Err(DSXParseError::UnterminatedBlock {
                path: path.to_string(),
                line: top.record.line_start,
                block_type: top.record.block_type.clone(),
            });
        }
    }

    while let Some(mut open) = stack.pop() {
        if let Some(key) = open.heredoc_key.take() {
            warn!(
                "{path}:{line}: heredoc for '{key}' missing terminator, accepting to EOF",
                line = open.heredoc_start_line
            );
            let content = open.heredoc_lines.join("\n");
            open.record.fields.insert(key, DSXValue::Heredoc(content));
        }
        warn!(
            "{path}:{line}: unterminated block {block_type} closed implicitly at EOF",
            line = open.record.line_start,
            block_type = open.record.block_type
        );
        open.record.line_end = open.record.line_start;
        let finished = open.record;
        match finished.block_type.as_str() {
            "HEADER" => header = Some(finished),
            "DSJOB" => job = Some(finished),
            _ => {
                if let Some(parent) = stack.last_mut() {
                    parent.record.subrecords.push(finished);
                } else {
                    job.get_or_insert_with(|| Record::new("DSJOB", 0))
                        .subrecords
                        .push(finished);
                }
            }
        }
    }

    let job = job.ok_or_else(|| DSXParseError::MissingJob {
        path: path.to_string(),
    })?;
    let header = header.unwrap_or_else(|| Record::new("HEADER", 0));

    let job = strip_apt_properties(job);

    Ok(Document { header, job })
}

/// Drop `Owner "APT"` subrecords whose `Name` is not in the preserve set
/// (§4.2), recursively.
fn strip_apt_properties(mut record: Record) -> Record {
    record.subrecords = record
        .subrecords
        .into_iter()
        .filter(|sub| {
            let is_apt = sub
                .field_str("Owner")
                .map(|o| o == "APT")
                .unwrap_or(false);
            if !is_apt {
                return true;
            }
            sub.field_str("Name")
                .map(|name| APT_PRESERVE_NAMES.contains(&name))
                .unwrap_or(false)
        })
        .map(strip_apt_properties)
        .collect();
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        r#"BEGIN HEADER
DSXVersion "3"
END HEADER
BEGIN DSJOB
BEGIN DSRECORD
Identifier "V0"
StageList "Input_File"
END DSRECORD
BEGIN DSRECORD
Identifier "V0S0"
Name "Input_File"
StageType "PxSequentialFile"
BEGIN DSSUBRECORD
Owner "APT"
Name "TrxGenCode"
Value =+=+=+=
some code
more code
=+=+=+=
END DSSUBRECORD
BEGIN DSSUBRECORD
Owner "APT"
Name "Internal"
END DSSUBRECORD
END DSRECORD
END DSJOB
"#
        .to_string()
    }

    #[test]
    fn parses_nested_blocks_and_heredoc() {
        let doc = parse_str("t.dsx", &sample(), &ParserOptions::default()).unwrap();
        assert_eq!(doc.job.subrecords.len(), 2);
        let stage = &doc.job.subrecords[1];
        assert_eq!(stage.field_str("Name"), Some("Input_File"));
        // Only the preserved APT subrecord should survive.
        assert_eq!(stage.subrecords.len(), 1);
        assert_eq!(stage.subrecords[0].field_str("Name"), Some("TrxGenCode"));
        match stage.subrecords[0].field("Value") {
            Some(DSXValue::Heredoc(content)) => {
                assert_eq!(content, "some code\nmore code");
            }
            other => panic!("expected heredoc, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_end_is_an_error() {
        let bad = "BEGIN DSJOB\nBEGIN DSRECORD\nEND DSJOB\n";
        let err = parse_str("t.dsx", bad, &ParserOptions::default()).unwrap_err();
        assert!(matches!(err, DSXParseError::MismatchedEnd { .. }));
    }

    #[test]
    fn unterminated_heredoc_lenient_accepts_to_eof() {
        let src = "BEGIN DSJOB\nBEGIN DSRECORD\nIdentifier \"V0S0\"\nDerivation =+=+=+=\nline one\nline two\n";
        let doc = parse_str("t.dsx", src, &ParserOptions::default()).unwrap();
        assert_eq!(doc.job.subrecords.len(), 1);
    }

    #[test]
    fn unterminated_heredoc_strict_is_an_error() {
        let src = "BEGIN DSJOB\nBEGIN DSRECORD\nIdentifier \"V0S0\"\nDerivation =+=+=+=\nline one\n";
        let opts = ParserOptions { strict: true };
        // Block itself is also unterminated in this fragment, so we only
        // assert that parsing fails, not which error wins.
        assert!(parse_str("t.dsx", src, &opts).is_err());
    }

    #[test]
    fn inline_heredoc_on_one_line() {
        let src = "BEGIN DSJOB\nBEGIN DSRECORD\nDerivation =+=+=+=UPPER(USERNAME)=+=+=+=\nEND DSRECORD\nEND DSJOB\n";
        let doc = parse_str("t.dsx", src, &ParserOptions::default()).unwrap();
        match doc.job.subrecords[0].field("Derivation") {
            Some(DSXValue::Heredoc(content)) => assert_eq!(content, "UPPER(USERNAME)"),
            other => panic!("expected heredoc, got {other:?}"),
        }
    }
}
