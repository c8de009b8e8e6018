//! Speculative input positions for the backtracking parser.
//!
//! A [`Cursor`] is a cheap, copyable view of one offset into an [`Input`].
//! Rules receive a cursor by value and hand back a new one on success; a
//! failed attempt simply drops its copy, so the caller's position can never
//! be disturbed by a rule that did not match.
//!
//! The only shared state is the high-water mark of every symbol any attempt
//! has examined. It is kept on the `Input` and is read once, after a total
//! parse failure, to report where the document stopped making sense.

use std::cell::Cell;
use std::fmt;

/// End-of-input symbol appended to every source buffer.
///
/// It is an ordinary, matchable character: the document rule ends by
/// consuming it, and `Newline` accepts it by lookahead.
pub const SENTINEL: char = '\0';

/// Maximum number of characters shown in a "near ..." error context.
const CONTEXT_CHARS: usize = 24;

// ============================================================================
// INPUT
// ============================================================================

/// Source text plus the sentinel, and the deepest offset any attempt reached.
pub struct Input {
    text: String,
    deepest: Cell<usize>,
}

impl Input {
    pub fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len() + 1);
        text.push_str(source);
        text.push(SENTINEL);
        Self {
            text,
            deepest: Cell::new(0),
        }
    }

    /// Cursor at offset zero.
    pub fn start(&self) -> Cursor<'_> {
        Cursor {
            input: self,
            pos: 0,
        }
    }

    /// The caller-supplied text, without the sentinel.
    pub fn source(&self) -> &str {
        &self.text[..self.text.len() - SENTINEL.len_utf8()]
    }

    /// Furthest byte offset examined by any attempt, successful or not.
    pub fn deepest_pos(&self) -> usize {
        self.deepest.get()
    }

    /// A short excerpt of the line starting at `offset`, for diagnostics.
    pub fn context_at(&self, offset: usize) -> String {
        let source = self.source();
        let offset = offset.min(source.len());
        let rest = source.get(offset..).unwrap_or_default();
        let line = rest.lines().next().unwrap_or_default();
        if line.is_empty() {
            return if offset >= source.len() {
                "end of input".to_string()
            } else {
                "end of line".to_string()
            };
        }
        line.chars().take(CONTEXT_CHARS).collect()
    }

    fn touch(&self, pos: usize) {
        if pos > self.deepest.get() {
            self.deepest.set(pos);
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("len", &self.source().len())
            .field("deepest", &self.deepest.get())
            .finish()
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// A position in an [`Input`].
#[derive(Clone, Copy)]
pub struct Cursor<'s> {
    input: &'s Input,
    pos: usize,
}

impl<'s> Cursor<'s> {
    /// Byte offset into the source.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// A speculative copy of this cursor. Input it consumes stays private to
    /// the branch until [`Cursor::commit`] is called.
    pub fn branch(&self) -> Cursor<'s> {
        *self
    }

    /// Makes the branch's consumption permanent for `parent`.
    pub fn commit(self, parent: &mut Cursor<'s>) {
        debug_assert!(std::ptr::eq(self.input, parent.input));
        parent.pos = self.pos;
    }

    /// Reads one symbol and advances past it. The sentinel is returned like
    /// any other symbol; `None` only appears once the sentinel is consumed.
    pub fn next(&mut self) -> Option<char> {
        self.input.touch(self.pos);
        let ch = self.input.text[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// The next symbol without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.input.text[self.pos..].chars().next()
    }

    /// True when the next symbol is the sentinel.
    pub fn at_end(&self) -> bool {
        self.peek() == Some(SENTINEL)
    }

    /// Source text between this cursor and a later one.
    pub fn slice_to(&self, end: &Cursor<'s>) -> &'s str {
        &self.input.text[self.pos..end.pos.max(self.pos)]
    }

    /// Furthest offset reached by any attempt made over the same input.
    pub fn deepest_pos(&self) -> usize {
        self.input.deepest_pos()
    }

    pub fn input(&self) -> &'s Input {
        self.input
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.pos)
    }
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.input, other.input) && self.pos == other.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_reads_sentinel_then_stops() {
        let input = Input::new("ab");
        let mut cursor = input.start();
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.next(), Some('b'));
        assert!(cursor.at_end());
        assert_eq!(cursor.next(), Some(SENTINEL));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_branch_without_commit_leaves_parent() {
        let input = Input::new("hello");
        let parent = input.start();
        let mut branch = parent.branch();
        branch.next();
        branch.next();
        assert_eq!(parent.pos(), 0);
        assert_eq!(branch.pos(), 2);
    }

    #[test]
    fn test_commit_propagates_offset() {
        let input = Input::new("hello");
        let mut parent = input.start();
        let mut branch = parent.branch();
        branch.next();
        branch.commit(&mut parent);
        assert_eq!(parent.pos(), 1);
    }

    #[test]
    fn test_deepest_pos_survives_abandoned_branches() {
        let input = Input::new("abcdef");
        let parent = input.start();
        {
            let mut branch = parent.branch();
            for _ in 0..4 {
                branch.next();
            }
        }
        let mut other = parent.branch();
        other.next();
        assert_eq!(parent.pos(), 0);
        assert_eq!(parent.deepest_pos(), 3);
    }

    #[test]
    fn test_multibyte_symbols() {
        let input = Input::new("é!");
        let mut cursor = input.start();
        assert_eq!(cursor.next(), Some('é'));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.next(), Some('!'));
    }

    #[test]
    fn test_context_at() {
        let input = Input::new("first line\nsecond line");
        assert_eq!(input.context_at(11), "second line");
        assert_eq!(input.context_at(10), "end of line");
        assert_eq!(input.context_at(99), "end of input");
    }
}
