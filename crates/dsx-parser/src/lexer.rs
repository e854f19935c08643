//! Line-oriented lexer over the DSX textual export format.
//!
//! DSX is explicitly a one-property-per-line format (see §4.1 of
//! SPEC_FULL.md): the grammar never spans a property across newlines
//! except inside a heredoc, so the lexer recognizes exactly one line at a
//! time rather than the whole file as one `nom` input, the way a
//! tokenizer for a free-form grammar would.

use crate::value::DSXValue;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, space0, space1},
    combinator::{map, opt, rest},
    sequence::{delimited, preceded, terminated},
    IResult,
};

pub const HEREDOC_DELIM: &str = "=+=+=+=";

#[derive(Debug, Clone, PartialEq)]
pub enum LineToken {
    Begin { block_type: String },
    End { block_type: String },
    KeyValue { key: String, value: DSXValue },
    /// `KEY =+=+=+=CONTENT=+=+=+=` on a single line.
    HeredocInline { key: String, content: String },
    /// `KEY =+=+=+=` opening a multi-line heredoc.
    HeredocOpen { key: String },
    /// A line starting with the heredoc delimiter, closing an open heredoc.
    HeredocTerminator,
    Blank,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)
}

fn begin_line(input: &str) -> IResult<&str, LineToken> {
    map(
        preceded(
            terminated(tag("BEGIN"), space1),
            terminated(identifier, space0),
        ),
        |ty: &str| LineToken::Begin {
            block_type: ty.to_string(),
        },
    )(input)
}

fn end_line(input: &str) -> IResult<&str, LineToken> {
    map(
        preceded(
            terminated(tag("END"), space1),
            terminated(identifier, space0),
        ),
        |ty: &str| LineToken::End {
            block_type: ty.to_string(),
        },
    )(input)
}

fn quoted_value(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_until("\""), char('"'))(input)
}

fn heredoc_inline(input: &str) -> IResult<&str, LineToken> {
    let (input, key) = identifier(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag(HEREDOC_DELIM)(input)?;
    // Inline form requires a closing delimiter later on the same line.
    let (input, content) = take_until(HEREDOC_DELIM)(input)?;
    let (input, _) = tag(HEREDOC_DELIM)(input)?;
    Ok((
        input,
        LineToken::HeredocInline {
            key: key.to_string(),
            content: content.to_string(),
        },
    ))
}

fn heredoc_open(input: &str) -> IResult<&str, LineToken> {
    let (input, key) = identifier(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag(HEREDOC_DELIM)(input)?;
    let (input, trailing) = opt(rest)(input)?;
    if trailing.map(|s| !s.trim().is_empty()).unwrap_or(false) {
        // Leftover content but no closing delimiter: not a valid inline form
        // and not a clean open either. Treat as open; the remainder is
        // folded into the first collected heredoc line by the caller.
    }
    Ok((
        input,
        LineToken::HeredocOpen {
            key: key.to_string(),
        },
    ))
}

fn key_value_quoted(input: &str) -> IResult<&str, LineToken> {
    let (input, key) = identifier(input)?;
    let (input, _) = space1(input)?;
    let (input, value) = quoted_value(input)?;
    Ok((
        input,
        LineToken::KeyValue {
            key: key.to_string(),
            value: DSXValue::String(value.to_string()),
        },
    ))
}

fn key_value_bare(input: &str) -> IResult<&str, LineToken> {
    let (input, key) = identifier(input)?;
    let (input, _) = space1(input)?;
    let (input, value) = rest(input)?;
    let value = value.trim_end();
    let decoded = if let Ok(i) = value.parse::<i64>() {
        DSXValue::Int(i)
    } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        DSXValue::Bool(value.eq_ignore_ascii_case("true"))
    } else {
        DSXValue::String(value.to_string())
    };
    Ok((
        input,
        LineToken::KeyValue {
            key: key.to_string(),
            value: decoded,
        },
    ))
}

/// A line starting with the heredoc delimiter and nothing else of interest
/// (the multi-line terminator form).
fn heredoc_terminator(input: &str) -> IResult<&str, LineToken> {
    map(tag(HEREDOC_DELIM), |_| LineToken::HeredocTerminator)(input)
}

/// Lex a single already-trimmed-of-trailing-newline line.
///
/// Blank and comment lines lex to `None`, matching §4.1's "comment/blank
/// lines are skipped" rule (DSX has no comment marker of its own, but
/// empty lines are common between records).
pub fn lex_line(raw: &str) -> Option<LineToken> {
    let trimmed_start = raw.trim_start();
    if trimmed_start.is_empty() {
        return Some(LineToken::Blank);
    }
    if trimmed_start.starts_with(HEREDOC_DELIM) {
        return heredoc_terminator(trimmed_start).ok().map(|(_, t)| t);
    }
    let candidates: [fn(&str) -> IResult<&str, LineToken>; 6] = [
        begin_line,
        end_line,
        heredoc_inline,
        heredoc_open,
        key_value_quoted,
        key_value_bare,
    ];
    for parser in candidates {
        if let Ok((_, token)) = alt((parser,))(trimmed_start) {
            return Some(token);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_begin_end() {
        assert_eq!(
            lex_line("BEGIN DSRECORD"),
            Some(LineToken::Begin {
                block_type: "DSRECORD".into()
            })
        );
        assert_eq!(
            lex_line("END DSRECORD"),
            Some(LineToken::End {
                block_type: "DSRECORD".into()
            })
        );
    }

    #[test]
    fn lexes_quoted_and_bare_kv() {
        assert_eq!(
            lex_line(r#"Name "Input_File""#),
            Some(LineToken::KeyValue {
                key: "Name".into(),
                value: DSXValue::String("Input_File".into())
            })
        );
        assert_eq!(
            lex_line("SqlType 12"),
            Some(LineToken::KeyValue {
                key: "SqlType".into(),
                value: DSXValue::Int(12)
            })
        );
    }

    #[test]
    fn lexes_inline_heredoc() {
        assert_eq!(
            lex_line("Derivation =+=+=+=UPPER(USERNAME)=+=+=+="),
            Some(LineToken::HeredocInline {
                key: "Derivation".into(),
                content: "UPPER(USERNAME)".into()
            })
        );
    }

    #[test]
    fn lexes_heredoc_open_and_terminator() {
        assert_eq!(
            lex_line("TrxGenCode =+=+=+="),
            Some(LineToken::HeredocOpen {
                key: "TrxGenCode".into()
            })
        );
        assert_eq!(lex_line("=+=+=+="), Some(LineToken::HeredocTerminator));
    }

    #[test]
    fn blank_line_is_blank() {
        assert_eq!(lex_line("   "), Some(LineToken::Blank));
    }
}
