//! Indentation-structured pseudocode to [`Sequence`].
//!
//! ```text
//! input n
//! if n > 0
//!     print n
//! else
//!     print -n
//! done
//! ```
//!
//! Parsing never fails: every non-blank line ends up in the tree.

use crate::config::ParserConfig;
use crate::ir::{Sequence, Statement};
use once_cell::sync::Lazy;
use regex::Regex;

static IF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^if\s+(?P<cond>.+)$").unwrap());
static INPUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^input\s+(?P<name>.+)$").unwrap());
static ELSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^else(?:\s.*)?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceLine<'a> {
    number: usize,
    level: usize,
    text: &'a str,
}

struct LineCursor<'a> {
    lines: Vec<SourceLine<'a>>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: scan_lines(source),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<SourceLine<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }
}

/// Parses a whole program and wraps it in start and stop terminals.
pub fn parse_program(source: &str, config: &ParserConfig) -> Sequence {
    let body = parse_statements(source);
    let mut items = Vec::with_capacity(body.items.len() + 2);
    items.push(Statement::terminal(config.start_label.as_str()));
    items.extend(body.items);
    items.push(Statement::terminal(config.stop_label.as_str()));
    let program = Sequence::new(items);
    tracing::debug!(statements = program.statement_count(), "parsed program");
    program
}

/// Parses statements without the synthesized terminals.
pub fn parse_statements(source: &str) -> Sequence {
    let mut cursor = LineCursor::new(source);
    // Level zero admits every line, so the top block consumes the input.
    parse_block(&mut cursor, 0)
}

fn scan_lines(source: &str) -> Vec<SourceLine<'_>> {
    source
        .split('\n')
        .enumerate()
        .filter_map(|(idx, raw)| {
            let raw = raw.trim_end_matches('\r');
            let text = raw.trim_start_matches([' ', '\t']);
            let level = raw.len() - text.len();
            let text = text.trim_end();
            if text.is_empty() {
                None
            } else {
                Some(SourceLine {
                    number: idx + 1,
                    level,
                    text,
                })
            }
        })
        .collect()
}

/// Consumes every following line indented at least `min_level`.
fn parse_block(cursor: &mut LineCursor<'_>, min_level: usize) -> Sequence {
    let mut items = Vec::new();
    while let Some(line) = cursor.peek() {
        if line.level < min_level {
            break;
        }
        cursor.advance();
        items.push(parse_statement(line, cursor));
    }
    Sequence::new(items)
}

fn parse_statement(line: SourceLine<'_>, cursor: &mut LineCursor<'_>) -> Statement {
    if let Some(caps) = IF_RE.captures(line.text) {
        let on_true = parse_block(cursor, line.level + 1);
        let on_false = match cursor.peek() {
            Some(next) if next.level == line.level && ELSE_RE.is_match(next.text) => {
                cursor.advance();
                parse_block(cursor, next.level + 1)
            }
            _ => Sequence::empty(),
        };
        if on_true.is_empty() && on_false.is_empty() {
            tracing::trace!(line = line.number, "conditional without a body");
        }
        return Statement::conditional(caps["cond"].trim(), on_true, on_false);
    }
    if let Some(caps) = INPUT_RE.captures(line.text) {
        return Statement::input(caps["name"].trim());
    }
    if ELSE_RE.is_match(line.text) {
        tracing::trace!(line = line.number, "else without a matching if");
    }
    Statement::leaf(line.text)
}
