use serde::Serialize;
use thiserror::Error;

use super::cursor::{Cursor, Input};

/// Why parsing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
pub enum ParseErrorKind {
    /// No grammar rule could account for the text.
    #[error("parse error")]
    NoMatch,
    /// A choice block directly followed another one in the same section.
    #[error("consecutive choice blocks are not allowed")]
    ConsecutiveChoiceBlocks,
    /// The text holds a NUL, which the parser reserves for end of input.
    #[error("NUL character in document")]
    NulCharacter,
}

/// A failed parse, positioned at the deepest offset any attempt reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind} near {context:?} (offset {offset})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub context: String,
}

impl ParseError {
    /// Total failure of the grammar; reported at the deepest attempt.
    pub fn no_match(input: &Input) -> Self {
        let offset = input.deepest_pos().min(input.source().len());
        Self {
            kind: ParseErrorKind::NoMatch,
            offset,
            context: input.context_at(offset),
        }
    }

    /// Raised while assembling section content, at the second block.
    pub fn consecutive_choice_blocks(at: Cursor<'_>) -> Self {
        Self {
            kind: ParseErrorKind::ConsecutiveChoiceBlocks,
            offset: at.pos(),
            context: at.input().context_at(at.pos()),
        }
    }

    /// Raised before parsing when the text contains the end-of-input symbol.
    pub fn nul_character(offset: usize) -> Self {
        Self {
            kind: ParseErrorKind::NulCharacter,
            offset,
            context: "NUL character".to_string(),
        }
    }

    /// 1-based line and column of the offset within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let before = &source[..self.offset.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        (line, col)
    }
}
