//! Converts plain assistant/user text into structured blocks the frontend
//! renders directly. Pure and total: any input produces some block sequence.

use serde::{Deserialize, Serialize};

/// One structural unit of rendered message content.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    Code { content: String },
    Header { level: u8, text: String },
    UnorderedList { items: Vec<String> },
    OrderedList { items: Vec<String> },
    Paragraph { spans: Vec<Span> },
}

/// An inline-styled run of text within a paragraph. Line breaks inside a
/// paragraph survive as `\n` characters in span text (soft breaks).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "style", content = "text", rename_all = "camelCase")]
pub enum Span {
    Plain(String),
    Code(String),
    Bold(String),
    Italic(String),
}

/// Formats a message into an ordered block sequence.
///
/// Paragraphs are separated by blank lines and classified independently:
/// fenced code, then unordered list, then ordered list, then header, then
/// inline-formatted paragraph. List and header checks look at the raw
/// paragraph text, never at the inline-expanded form.
pub fn format(text: &str) -> Vec<Block> {
    text.split("\n\n").map(format_paragraph).collect()
}

fn format_paragraph(paragraph: &str) -> Block {
    if paragraph.starts_with("```") && paragraph.ends_with("```") {
        let inner = if paragraph.len() >= 6 {
            &paragraph[3..paragraph.len() - 3]
        } else {
            ""
        };
        return Block::Code {
            content: inner.trim().to_string(),
        };
    }

    if paragraph.contains("\n-") || paragraph.contains("\n*") {
        let items: Vec<String> = paragraph
            .lines()
            .filter_map(unordered_item)
            .collect();
        if !items.is_empty() {
            return Block::UnorderedList { items };
        }
    }

    if paragraph.contains("\n1.") || paragraph.contains("\n2.") || paragraph.contains("\n3.") {
        // Items are renumbered by position; source numbers are discarded.
        let items: Vec<String> = paragraph.lines().filter_map(ordered_item).collect();
        if !items.is_empty() {
            return Block::OrderedList { items };
        }
    }

    if paragraph.starts_with('#') {
        let hashes = paragraph.chars().take_while(|&c| c == '#').count();
        let text = paragraph
            .trim_start_matches('#')
            .trim_start()
            .to_string();
        return Block::Header {
            level: hashes.min(6) as u8,
            text,
        };
    }

    Block::Paragraph {
        spans: tokenize_inline(paragraph),
    }
}

/// A list-candidate line: trimmed form starts with `-` or `*`. Lines that
/// do not match are dropped from the list entirely.
fn unordered_item(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))?;
    Some(rest.trim_start().to_string())
}

/// A numbered line: trimmed form matches `<digits>.`.
fn ordered_item(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    Some(rest.trim_start().to_string())
}

/// Inline span tokenizer. Fixed precedence: code spans first, then bold,
/// then italic; later passes only rescan plain segments. Splitting on a
/// delimiter alternates plain/styled by segment parity, so an unterminated
/// delimiter styles the trailing remainder instead of failing.
fn tokenize_inline(text: &str) -> Vec<Span> {
    let mut spans = vec![Span::Plain(text.to_string())];
    spans = rescan_plain(spans, "`", Span::Code);
    spans = rescan_plain(spans, "**", Span::Bold);
    spans = rescan_plain(spans, "*", Span::Italic);
    spans
}

fn rescan_plain(
    spans: Vec<Span>,
    delimiter: &str,
    styled: fn(String) -> Span,
) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        match span {
            Span::Plain(text) => {
                for (i, piece) in text.split(delimiter).enumerate() {
                    if piece.is_empty() {
                        continue;
                    }
                    if i % 2 == 1 {
                        out.push(styled(piece.to_string()));
                    } else {
                        out.push(Span::Plain(piece.to_string()));
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}
