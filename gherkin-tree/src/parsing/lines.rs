//! Line classification
//!
//! Gherkin is line oriented: what a line means is decided by its first
//! non-blank characters alone. Classification happens lazily so a
//! `# language:` header can switch the keyword table for every line after it.

use crate::dialect::{Dialect, KeywordKind};
use once_cell::sync::Lazy;
use regex::Regex;

static LANGUAGE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*language\s*:\s*([a-zA-Z_\-]+)\s*$")
        .expect("language header pattern is valid")
});

pub(crate) static DOC_STRING_DELIMITERS: [&str; 2] = ["\"\"\"", "```"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'s> {
    Empty,
    Comment,
    Language(&'s str),
    Tags,
    TableRow,
    DocStringSeparator {
        delimiter: &'static str,
        content_type: &'s str,
    },
    Header {
        keyword: &'static str,
        kind: KeywordKind,
        name: &'s str,
    },
    Step {
        keyword: &'static str,
        text: &'s str,
    },
    Other,
}

/// One classified source line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'s> {
    /// 1-based line number.
    pub number: usize,
    pub raw: &'s str,
    pub trimmed: &'s str,
    /// Leading whitespace, in characters.
    pub indent: usize,
    pub kind: LineKind<'s>,
}

impl<'s> Line<'s> {
    pub(crate) fn classify(number: usize, raw: &'s str, dialect: &Dialect) -> Self {
        let trimmed = raw.trim();
        let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
        Self {
            number,
            raw,
            trimmed,
            indent,
            kind: classify(trimmed, dialect),
        }
    }

    /// 1-based column of the first non-blank character.
    pub(crate) fn column(&self) -> usize {
        self.indent + 1
    }
}

fn classify<'s>(trimmed: &'s str, dialect: &Dialect) -> LineKind<'s> {
    if trimmed.is_empty() {
        return LineKind::Empty;
    }
    if trimmed.starts_with('#') {
        return match LANGUAGE_HEADER.captures(trimmed).and_then(|caps| caps.get(1)) {
            Some(code) => LineKind::Language(code.as_str()),
            None => LineKind::Comment,
        };
    }
    if trimmed.starts_with('@') {
        return LineKind::Tags;
    }
    if trimmed.starts_with('|') {
        return LineKind::TableRow;
    }
    if let Some(delimiter) = DOC_STRING_DELIMITERS
        .iter()
        .find(|delimiter| trimmed.starts_with(**delimiter))
    {
        return LineKind::DocStringSeparator {
            delimiter: *delimiter,
            content_type: trimmed[delimiter.len()..].trim(),
        };
    }
    for (keyword, kind) in dialect.header_keywords() {
        if let Some(rest) = trimmed
            .strip_prefix(keyword)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return LineKind::Header {
                keyword,
                kind,
                name: rest.trim(),
            };
        }
    }
    let mut steps = dialect.step_keywords();
    steps.sort_by_key(|keyword| std::cmp::Reverse(keyword.len()));
    for keyword in steps {
        // A step without text is just its keyword
        let text = trimmed
            .strip_prefix(keyword)
            .or_else(|| (trimmed == keyword.trim_end()).then_some(""));
        if let Some(text) = text {
            return LineKind::Step {
                keyword,
                text: text.trim(),
            };
        }
    }
    LineKind::Other
}

/// A tag and the 1-based column it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagToken {
    pub name: String,
    pub column: usize,
}

/// Splits a tag line into tags. A `#` starts a trailing comment.
pub(crate) fn split_tags(raw: &str) -> Vec<TagToken> {
    let mut tags = Vec::new();
    let mut column = 0;
    let mut current: Option<(usize, String)> = None;

    for c in raw.chars() {
        column += 1;
        if c.is_whitespace() {
            if let Some((start, name)) = current.take() {
                tags.push(TagToken { name, column: start });
            }
            continue;
        }
        match current.as_mut() {
            Some((_, name)) => name.push(c),
            None if c == '#' => break,
            None => current = Some((column, c.to_string())),
        }
    }
    if let Some((start, name)) = current {
        tags.push(TagToken { name, column: start });
    }
    tags
}
