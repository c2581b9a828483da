//! Table cell tokenization
//!
//! A row is a run of cells between unescaped pipes. Escapes are only
//! meaningful inside cells: `\|` is a literal pipe, `\\` a literal backslash
//! and `\n` a newline. Any other backslash is kept as written. Text after the
//! last pipe is not part of any cell.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum CellToken {
    #[token("|")]
    Pipe,
    #[token("\\|")]
    EscapedPipe,
    #[token("\\\\")]
    EscapedBackslash,
    #[token("\\n")]
    EscapedNewline,
    #[token("\\")]
    Backslash,
    #[regex(r"[^|\\]+")]
    Text,
}

/// A cell value and the 1-based column its first character sits at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellText {
    pub value: String,
    pub column: usize,
}

/// Splits a table row line into unescaped, trimmed cell values.
pub(crate) fn split_cells(line: &str) -> Vec<CellText> {
    let mut cells = Vec::new();
    let mut lexer = CellToken::lexer(line);
    let mut current: Option<Vec<(CellToken, &str, usize)>> = None;

    while let Some(token) = lexer.next() {
        let Ok(token) = token else { continue };
        let span = lexer.span();
        match token {
            CellToken::Pipe => {
                if let Some(pieces) = current.take() {
                    cells.push(finish_cell(line, &pieces));
                }
                current = Some(Vec::new());
            }
            other => {
                if let Some(pieces) = current.as_mut() {
                    pieces.push((other, lexer.slice(), span.start));
                }
            }
        }
    }
    cells
}

fn finish_cell(line: &str, pieces: &[(CellToken, &str, usize)]) -> CellText {
    let mut value = String::new();
    let mut start: Option<usize> = None;
    let mut pending_space = String::new();

    for (index, (token, text, offset)) in pieces.iter().enumerate() {
        let text: &str = match token {
            CellToken::Text if index == 0 => {
                let stripped = text.trim_start();
                if !stripped.is_empty() {
                    start = Some(offset + (text.len() - stripped.len()));
                }
                stripped
            }
            _ => text,
        };
        if text.is_empty() {
            continue;
        }
        start.get_or_insert(*offset);
        value.push_str(&pending_space);
        pending_space.clear();

        match token {
            CellToken::Text => {
                let kept = text.trim_end();
                value.push_str(kept);
                pending_space.push_str(&text[kept.len()..]);
            }
            CellToken::EscapedPipe => value.push('|'),
            CellToken::EscapedBackslash => value.push('\\'),
            CellToken::EscapedNewline => value.push('\n'),
            CellToken::Backslash | CellToken::Pipe => value.push_str(text),
        }
    }

    let column = match start {
        Some(byte) => line[..byte].chars().count() + 1,
        None => pieces
            .first()
            .map_or(1, |(_, _, offset)| line[..*offset].chars().count() + 1),
    };
    CellText { value, column }
}
