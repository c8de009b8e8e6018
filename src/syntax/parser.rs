//! Branchtext Parser
//!
//! Converts document text into a [`Document`]. Purely syntactic: section
//! names, gotos and reachability are checked later by the validator.

use tracing::{debug, trace};

use crate::ast::Document;

use super::cursor::{Input, SENTINEL};
use super::error::ParseError;
use super::grammar;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a whole document.
///
/// On failure the error points at the deepest offset any rule examined,
/// which is usually the line that stopped the parse. Text containing a NUL
/// is rejected up front, since NUL marks the end of input.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    if let Some(offset) = text.find(SENTINEL) {
        let err = ParseError::nul_character(offset);
        debug!(offset, "document contains a NUL character");
        return Err(err);
    }
    let input = Input::new(text);
    let reply = grammar::document(input.start());
    trace!(deepest = input.deepest_pos(), "grammar finished");

    match reply {
        Ok(Some((document, _))) => {
            debug!(
                sections = document.sections().len(),
                bytes = text.len(),
                "parsed document"
            );
            Ok(document)
        }
        Ok(None) => {
            let err = ParseError::no_match(&input);
            debug!(offset = err.offset, context = %err.context, "document did not parse");
            Err(err)
        }
        Err(err) => {
            debug!(offset = err.offset, kind = %err.kind, "parse aborted");
            Err(err)
        }
    }
}
