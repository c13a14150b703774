// SPDX-FileCopyrightText: 2026 Steeple Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-oriented, quote-aware CSV reader.
//!
//! The input is split into lines before any quote handling, so a quoted
//! field cannot span lines. Blank lines are dropped and every field is
//! trimmed.

/// A parsed CSV document: the first non-blank line and every line after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Split one line into trimmed fields.
///
/// A `"` toggles quote mode. Inside quotes, `""` is a literal quote. A `,`
/// outside quotes ends the field.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => current.push(ch),
            }
        } else {
            match ch {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current)),
                _ => current.push(ch),
            }
        }
    }
    fields.push(current);

    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Parse a whole CSV blob.
///
/// `\r\n` and lone `\r` are normalized to `\n` first. An input with no
/// non-blank lines yields an empty header and no rows.
pub fn parse_csv(text: &str) -> ParsedCsv {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized.split('\n').filter(|l| !l.trim().is_empty());

    let Some(first) = lines.next() else {
        return ParsedCsv::default();
    };

    ParsedCsv {
        header: split_line(first),
        rows: lines.map(split_line).collect(),
    }
}
