//! AST module for branchtext documents
//!
//! A [`Document`] is an ordered list of [`Section`]s. The first section has no
//! heading; the last one is the terminal section. Each section holds
//! [`Block`]s, and choice blocks hold [`Choice`]s.
//!
//! Nodes are built once by the parser (or [`builder::DocumentBuilder`]) and
//! are read-only afterwards. Interactive selections live outside the tree, in
//! [`crate::runtime::Selections`].

pub mod builder;

use serde::{Deserialize, Serialize};

// ============================================================================
// SPANS
// ============================================================================

/// Byte range in the source text.
///
/// # Examples
///
/// ```rust
/// use branchtext::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts byte offsets to 1-based `(line, col)` pairs for both ends.
    pub fn byte_to_line_col(&self, source: &str) -> Option<((usize, usize), (usize, usize))> {
        Some((line_col(source, self.start)?, line_col(source, self.end)?))
    }
}

fn line_col(source: &str, offset: usize) -> Option<(usize, usize)> {
    let before = source.get(..offset)?;
    let line = before.matches('\n').count() + 1;
    let col = before.rsplit('\n').next().map_or(0, |tail| tail.chars().count()) + 1;
    Some((line, col))
}

// ============================================================================
// DOCUMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// The unheaded section every walk starts from.
    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    pub fn terminal_index(&self) -> Option<usize> {
        self.sections.len().checked_sub(1)
    }

    /// The last section; reaching it is the goal of every walk.
    pub fn terminal_section(&self) -> Option<&Section> {
        self.sections.last()
    }

    /// True when any section, block or choice carries recorded feedback.
    pub fn is_completed(&self) -> bool {
        self.sections.iter().any(Section::has_feedback)
    }

    /// Looks up a choice by its position in the tree.
    pub fn choice(&self, at: ChoiceRef) -> Option<&Choice> {
        match self.sections.get(at.section)?.blocks().get(at.block)? {
            Block::Choice { choices, .. } => choices.get(at.choice),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION
// ============================================================================

/// A named (or, for the first one, anonymous) run of blocks.
///
/// `span` covers the heading line and is ignored by `PartialEq`.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    name: Option<String>,
    blocks: Vec<Block>,
    feedback: Option<String>,
    #[serde(skip)]
    span: Span,
}

/// Label used for the anonymous first section in messages.
pub const START_SECTION_LABEL: &str = "(start)";

impl Section {
    pub fn new(
        name: Option<String>,
        blocks: Vec<Block>,
        feedback: Option<String>,
        span: Span,
    ) -> Self {
        Self {
            name,
            blocks,
            feedback,
            span,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The heading name, or [`START_SECTION_LABEL`] for the first section.
    pub fn label(&self) -> &str {
        self.name().unwrap_or(START_SECTION_LABEL)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Choice blocks with their block index, in document order.
    pub fn choice_blocks(&self) -> impl Iterator<Item = (usize, &[Choice])> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| block.choices().map(|choices| (index, choices)))
    }

    fn has_feedback(&self) -> bool {
        self.feedback.is_some() || self.blocks.iter().any(Block::has_feedback)
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.blocks == other.blocks && self.feedback == other.feedback
    }
}

// ============================================================================
// BLOCKS
// ============================================================================

/// The unit of section content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Text {
        text: String,
        feedback: Option<String>,
    },
    Instruction {
        text: String,
        feedback: Option<String>,
    },
    Choice {
        choices: Vec<Choice>,
        feedback: Option<String>,
    },
}

impl Block {
    pub fn is_choice(&self) -> bool {
        matches!(self, Block::Choice { .. })
    }

    pub fn choices(&self) -> Option<&[Choice]> {
        match self {
            Block::Choice { choices, .. } => Some(choices.as_slice()),
            _ => None,
        }
    }

    pub fn feedback(&self) -> Option<&str> {
        match self {
            Block::Text { feedback, .. }
            | Block::Instruction { feedback, .. }
            | Block::Choice { feedback, .. } => feedback.as_deref(),
        }
    }

    fn has_feedback(&self) -> bool {
        self.feedback().is_some()
            || self
                .choices()
                .is_some_and(|choices| choices.iter().any(|c| c.feedback.is_some()))
    }
}

// ============================================================================
// CHOICES
// ============================================================================

/// One option of a choice block.
///
/// `span` covers the choice's first line and is ignored by `PartialEq`.
#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    mark: Option<String>,
    description: String,
    response: Option<String>,
    goto: Option<String>,
    feedback: Option<String>,
    #[serde(skip)]
    span: Span,
}

impl Choice {
    pub fn new(
        mark: Option<String>,
        description: impl Into<String>,
        response: Option<String>,
        goto: Option<String>,
    ) -> Self {
        Self {
            mark,
            description: description.into(),
            response,
            goto,
            feedback: None,
            span: Span::default(),
        }
    }

    pub fn with_feedback(mut self, feedback: Option<String>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn mark(&self) -> Option<&str> {
        self.mark.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn goto(&self) -> Option<&str> {
        self.goto.as_deref()
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// True when picking this choice continues with the next block.
    pub fn falls_through(&self) -> bool {
        self.goto.is_none()
    }
}

impl PartialEq for Choice {
    fn eq(&self, other: &Self) -> bool {
        self.mark == other.mark
            && self.description == other.description
            && self.response == other.response
            && self.goto == other.goto
            && self.feedback == other.feedback
    }
}

/// Position of a choice: section, block within it, choice within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChoiceRef {
    pub section: usize,
    pub block: usize,
    pub choice: usize,
}
