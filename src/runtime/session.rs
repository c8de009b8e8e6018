use im::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::ast::{Block, Choice, ChoiceRef, Document, Section};
use crate::validation::{validate_with, SectionIndex, ValidationError, ValidatorOptions};

/// Mark recorded for a choice the reader picked.
pub const SELECTED_MARK: &str = "x";

/// Marks recorded during a walk, keyed by choice position.
pub type Selections = HashMap<ChoiceRef, String>;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("document is not playable: {0}")]
    Invalid(#[from] ValidationError),

    #[error("waiting for a choice; use choose()")]
    AwaitingChoice,

    #[error("there is no choice to make here")]
    NotAtPrompt,

    #[error("choice {index} does not exist ({available} available)")]
    NoSuchChoice { index: usize, available: usize },

    #[error("section '{0}' ended without a choice leading anywhere")]
    FellThrough(String),

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("the walk has already finished")]
    Finished,
}

// ============================================================================
// STEPS
// ============================================================================

/// What the reader is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<'d> {
    Text(&'d str),
    Instruction(&'d str),
    Prompt(&'d [Choice]),
    Finished,
}

// ============================================================================
// SESSION
// ============================================================================

/// A walk through a document, one block at a time.
#[derive(Debug, Clone)]
pub struct Session<'d> {
    document: &'d Document,
    index: SectionIndex,
    section: usize,
    block: usize,
    selections: Selections,
}

impl<'d> Session<'d> {
    /// Validates the document and positions the walk at its first block.
    pub fn start(document: &'d Document) -> Result<Self, SessionError> {
        Self::start_with(document, &ValidatorOptions::default())
    }

    pub fn start_with(
        document: &'d Document,
        options: &ValidatorOptions,
    ) -> Result<Self, SessionError> {
        validate_with(document, options)?;
        let index = SectionIndex::build(document, options.name_matching)?;
        Ok(Self {
            document,
            index,
            section: 0,
            block: 0,
            selections: Selections::new(),
        })
    }

    pub fn current_section(&self) -> Option<&'d Section> {
        self.document.section(self.section)
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn into_selections(self) -> Selections {
        self.selections
    }

    /// The current step. Running off the end of the terminal section
    /// finishes the walk; running off any other section is an error.
    pub fn step(&self) -> Result<Step<'d>, SessionError> {
        let Some(section) = self.current_section() else {
            return Ok(Step::Finished);
        };
        match section.blocks().get(self.block) {
            Some(Block::Text { text, .. }) => Ok(Step::Text(text)),
            Some(Block::Instruction { text, .. }) => Ok(Step::Instruction(text)),
            Some(Block::Choice { choices, .. }) => Ok(Step::Prompt(choices)),
            None if self.document.terminal_index() == Some(self.section) => Ok(Step::Finished),
            None => Err(SessionError::FellThrough(section.label().to_string())),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.step(), Ok(Step::Finished))
    }

    /// Moves past a text or instruction block.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        match self.step()? {
            Step::Text(_) | Step::Instruction(_) => {
                self.block += 1;
                Ok(())
            }
            Step::Prompt(_) => Err(SessionError::AwaitingChoice),
            Step::Finished => Err(SessionError::Finished),
        }
    }

    /// Picks a choice at the current prompt, records it, and follows it.
    /// Returns the choice's response, if any.
    pub fn choose(&mut self, index: usize) -> Result<Option<&'d str>, SessionError> {
        let choices = match self.step()? {
            Step::Prompt(choices) => choices,
            Step::Finished => return Err(SessionError::Finished),
            Step::Text(_) | Step::Instruction(_) => return Err(SessionError::NotAtPrompt),
        };
        let choice = choices.get(index).ok_or(SessionError::NoSuchChoice {
            index,
            available: choices.len(),
        })?;

        let at = ChoiceRef {
            section: self.section,
            block: self.block,
            choice: index,
        };
        self.selections = self.selections.update(at, SELECTED_MARK.to_string());
        debug!(?at, description = choice.description(), goto = ?choice.goto(), "choice made");

        match choice.goto() {
            Some(target) => {
                self.section = self
                    .index
                    .resolve(target)
                    .ok_or_else(|| SessionError::UnknownSection(target.to_string()))?;
                self.block = 0;
            }
            None => self.block += 1,
        }
        Ok(choice.response())
    }
}
