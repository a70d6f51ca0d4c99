//! Terminal output helpers for the `jp` binary.

use anyhow::Context as _;
use colored::{ColoredString, Colorize};
use std::io::Write;
use std::io::{self, ErrorKind};

use crate::encoder::quote;
use crate::tokenizer::{Token, TokenKind};
use crate::value::JSONValue;

/// Map broken pipes to success, so that piping to tools like `less` or `head`
/// exits cleanly.
fn ignore_broken_pipe(
    result: io::Result<()>,
    what: &'static str,
) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err).context(what),
    }
}

// ==============================================================================
// Colorized JSON Output
// ==============================================================================

/// Write a decoded document as colorized JSON, followed by a newline.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails for any reason other than a
/// broken pipe.
pub fn write_colored_value<W: Write>(
    writer: &mut W,
    value: &JSONValue,
    pretty: bool,
) -> anyhow::Result<()> {
    let result = (|| -> io::Result<()> {
        write_colored_json(writer, value, 0, pretty)?;
        writeln!(writer)
    })();
    ignore_broken_pipe(result, "write colorized JSON to stdout")
}

/// Recursively write a JSON value with syntax highlighting, using the same
/// separators as [`crate::encoder`].
fn write_colored_json<W: Write>(
    writer: &mut W,
    value: &JSONValue,
    indent: usize,
    pretty: bool,
) -> io::Result<()> {
    let next_indent = indent + 2;
    let separator = if pretty { "," } else { ", " };

    match value {
        JSONValue::Null => write!(writer, "{}", "null".red().dimmed()),
        JSONValue::Boolean(b) => write!(writer, "{}", b.to_string().yellow().bold()),
        JSONValue::Number(n) => write!(writer, "{}", n.as_str().yellow()),
        JSONValue::JString(s) => write!(writer, "{}", quote(s).green()),
        JSONValue::Array(arr) => {
            write!(writer, "[")?;
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    write!(writer, "{separator}")?;
                }
                if pretty {
                    write!(writer, "\n{:width$}", "", width = next_indent)?;
                }
                write_colored_json(writer, item, next_indent, pretty)?;
            }
            if pretty && !arr.is_empty() {
                write!(writer, "\n{:width$}", "", width = indent)?;
            }
            write!(writer, "]")
        }
        JSONValue::Object(obj) => {
            write!(writer, "{{")?;
            for (i, (key, val)) in obj.iter().enumerate() {
                if i > 0 {
                    write!(writer, "{separator}")?;
                }
                if pretty {
                    write!(writer, "\n{:width$}", "", width = next_indent)?;
                }
                write!(writer, "{}: ", quote(key).cyan())?;
                write_colored_json(writer, val, next_indent, pretty)?;
            }
            if pretty && !obj.is_empty() {
                write!(writer, "\n{:width$}", "", width = indent)?;
            }
            write!(writer, "}}")
        }
    }
}

// ==============================================================================
// Token Listings
// ==============================================================================

fn colorize_label(token: &Token) -> ColoredString {
    let label = token.label.as_ref();
    match token.kind() {
        Some(TokenKind::JString) => label.green(),
        Some(TokenKind::JNumber | TokenKind::True | TokenKind::False) => {
            label.yellow()
        }
        Some(TokenKind::Null) => label.red().dimmed(),
        Some(TokenKind::Space) => label.dimmed(),
        Some(_) => label.cyan(),
        None => label.magenta(),
    }
}

/// Write one line per token: byte span, label, then the quoted content.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails for any reason other than a
/// broken pipe.
pub fn write_colored_tokens<W: Write>(
    writer: &mut W,
    tokens: &[Token],
) -> anyhow::Result<()> {
    let width = tokens.last().map_or(1, |t| t.span.end.to_string().len());
    let result = (|| -> io::Result<()> {
        for token in tokens {
            let span = format!("{}..{}", token.span.start, token.span.end);
            writeln!(
                writer,
                "{:>width$}  {:<8} {}",
                span.bold(),
                colorize_label(token),
                quote(&token.content),
                width = 2 * width + 2
            )?;
        }
        Ok(())
    })();
    ignore_broken_pipe(result, "write tokens to stdout")
}
