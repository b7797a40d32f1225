//! Block tokenizer for Quarto markdown.
//!
//! Wraps comrak's CommonMark parser and keeps only the blocks the core cares
//! about: code blocks (fenced and indented) and display math. Line numbers
//! are converted from comrak's 1-based inclusive source positions to 0-based
//! half-open ranges over host lines.

use std::borrow::Cow;

use comrak::nodes::NodeValue;
use comrak::{Arena, Options, parse_document};

use crate::document::split_lines;

/// A half-open range of 0-based host lines, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// The block kinds the tokenizer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A code block delimited by backtick or tilde fences.
    FencedCode,
    /// A code block introduced by indentation.
    IndentedCode,
    /// A `$$ ... $$` block spanning at least two lines.
    DisplayMath,
}

/// A block-level token.
///
/// `lines` covers the whole block including delimiters. `body` covers only
/// the lines holding the block's content: for a closed fence these are the
/// lines strictly between the two fence lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lines: LineRange,
    pub body: LineRange,
    /// Fence info string, e.g. `{python}`. Empty for indented code and math.
    pub info: String,
    pub content: String,
}

/// Characters editors treat as line breaks but CommonMark does not.
const LINE_SEPARATORS: [char; 2] = ['\u{2028}', '\u{2029}'];

/// Tokenizer configuration.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    display_math: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { display_math: true }
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable `$$` display math detection.
    pub fn without_display_math(mut self) -> Self {
        self.display_math = false;
        self
    }

    /// Tokenize a document into its code and math blocks, in document order.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let text = strip_line_separators(text);
        let lines: Vec<&str> = split_lines(&text).collect();

        let arena = Arena::new();
        let options = Options::default();
        let root = parse_document(&arena, &text, &options);

        let mut tokens = Vec::new();
        for node in root.descendants() {
            let ast = node.data.borrow();
            let NodeValue::CodeBlock(block) = &ast.value else {
                continue;
            };
            // comrak lines are 1-based and inclusive
            let start = ast.sourcepos.start.line.saturating_sub(1);
            let end = ast.sourcepos.end.line;

            let content_lines = literal_line_count(&block.literal);
            let (kind, body) = if block.fenced {
                (
                    TokenKind::FencedCode,
                    LineRange::new(start + 1, start + 1 + content_lines),
                )
            } else {
                (
                    TokenKind::IndentedCode,
                    LineRange::new(start, start + content_lines),
                )
            };
            tokens.push(Token {
                kind,
                lines: LineRange::new(start, end.max(body.end)),
                body,
                info: block.info.clone(),
                content: block.literal.clone(),
            });
        }

        if self.display_math {
            let math = display_math(&lines, &tokens);
            tokens.extend(math);
            tokens.sort_by_key(|token| token.lines.start);
        }
        tokens
    }
}

fn strip_line_separators(text: &str) -> Cow<'_, str> {
    if text.contains(&LINE_SEPARATORS[..]) {
        Cow::Owned(text.replace(&LINE_SEPARATORS[..], ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Number of lines in a code block literal, which ends with a terminator
/// unless the fence was left open at the end of the document.
fn literal_line_count(literal: &str) -> usize {
    if literal.is_empty() {
        return 0;
    }
    let lines = split_lines(literal).count();
    if literal.ends_with(|c| c == '\n' || c == '\r') {
        lines - 1
    } else {
        lines
    }
}

/// Find `$$` regions outside code blocks.
///
/// comrak has no notion of display math, so regions are found line by line:
/// a line starting with `$$` opens a region and the next such line closes
/// it. Prose may precede the opening line and the body may contain blank
/// lines. A single-line `$$x$$` is not a region.
fn display_math(lines: &[&str], code: &[Token]) -> Vec<Token> {
    let in_code = |line: usize| code.iter().any(|token| token.lines.contains(line));

    let mut tokens = Vec::new();
    let mut open = None;
    for (index, line) in lines.iter().enumerate() {
        if in_code(index) {
            open = None;
            continue;
        }
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("$$") else {
            continue;
        };
        match open.take() {
            None if !rest.contains("$$") => open = Some(index),
            None => {}
            Some(start) => {
                let body = LineRange::new(start + 1, index);
                tokens.push(Token {
                    kind: TokenKind::DisplayMath,
                    lines: LineRange::new(start, index + 1),
                    body,
                    info: String::new(),
                    content: lines[body.iter()].join("\n"),
                });
            }
        }
    }
    tokens
}
