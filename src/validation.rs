//! Goto-graph validation.
//!
//! Checks run in order and stop at the first violation:
//! 1. section names are unique;
//! 2. every goto names an existing section;
//! 3. every section has a legal shape and every walk can reach the
//!    terminal section (see [`liveness`]).
//!
//! ```rust
//! use branchtext::{parse, validation::validate};
//!
//! let doc = parse(":: [ ] Begin GO TO End\n== End ==\n:: [ ] Done\n").unwrap();
//! assert!(validate(&doc).is_ok());
//! ```

pub mod index;
pub mod liveness;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ast::Document;

pub use index::{NameMatching, SectionIndex};

// ============================================================================
// ERRORS
// ============================================================================

/// A document authoring error. Each variant carries the offending section
/// (or goto target) name as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", content = "section")]
pub enum ValidationError {
    #[error("duplicate section name '{0}'")]
    DuplicateSectionName(String),

    #[error("unknown section reference '{0}'")]
    UnknownSectionReference(String),

    #[error("section '{0}' has no choices but is not the terminal section")]
    ChoicelessNonTerminalSection(String),

    #[error("section '{0}' is part of a loop with no way out")]
    DeadEndLoop(String),

    #[error("section '{0}' falls through its last choice block but is not the terminal section")]
    NonFallthroughNonTerminalSection(String),

    #[error("terminal section '{0}' must end with a choice that falls through")]
    TerminalSectionMustFallThrough(String),
}

impl ValidationError {
    /// The section (or unresolved goto) the error is about.
    pub fn section_name(&self) -> &str {
        match self {
            Self::DuplicateSectionName(name)
            | Self::UnknownSectionReference(name)
            | Self::ChoicelessNonTerminalSection(name)
            | Self::DeadEndLoop(name)
            | Self::NonFallthroughNonTerminalSection(name)
            | Self::TerminalSectionMustFallThrough(name) => name,
        }
    }

    /// Stable snake_case identifier, used in diagnostic codes.
    pub fn code_suffix(&self) -> &'static str {
        match self {
            Self::DuplicateSectionName(_) => "duplicate_section_name",
            Self::UnknownSectionReference(_) => "unknown_section_reference",
            Self::ChoicelessNonTerminalSection(_) => "choiceless_non_terminal_section",
            Self::DeadEndLoop(_) => "dead_end_loop",
            Self::NonFallthroughNonTerminalSection(_) => "non_fallthrough_non_terminal_section",
            Self::TerminalSectionMustFallThrough(_) => "terminal_section_must_fall_through",
        }
    }
}

/// A validation error plus the position of the section it is about, when
/// the check that raised it knows one. Diagnostics use the position to tell
/// the anonymous first section apart from a heading that shares its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedError {
    pub error: ValidationError,
    pub section: Option<usize>,
}

impl LocatedError {
    pub fn at(section: usize, error: ValidationError) -> Self {
        Self {
            error,
            section: Some(section),
        }
    }
}

impl From<ValidationError> for LocatedError {
    fn from(error: ValidationError) -> Self {
        Self {
            error,
            section: None,
        }
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Validator configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    pub name_matching: NameMatching,
}

impl ValidatorOptions {
    pub fn case_sensitive() -> Self {
        Self {
            name_matching: NameMatching::CaseSensitive,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Validates with the default (case-insensitive) name matching.
pub fn validate(document: &Document) -> Result<(), ValidationError> {
    validate_with(document, &ValidatorOptions::default())
}

pub fn validate_with(document: &Document, options: &ValidatorOptions) -> Result<(), ValidationError> {
    validate_located(document, options).map_err(|located| located.error)
}

/// Like [`validate_with`], but keeps the position of the offending section.
pub fn validate_located(document: &Document, options: &ValidatorOptions) -> Result<(), LocatedError> {
    let index = SectionIndex::build(document, options.name_matching)?;
    check_references(document, &index)?;
    liveness::check(document, &index)?;
    debug!(sections = document.sections().len(), "document is valid");
    Ok(())
}

fn check_references(document: &Document, index: &SectionIndex) -> Result<(), ValidationError> {
    let gotos = document
        .sections()
        .iter()
        .flat_map(|section| section.choice_blocks())
        .flat_map(|(_, choices)| choices)
        .filter_map(|choice| choice.goto());
    for goto in gotos {
        if index.resolve(goto).is_none() {
            return Err(ValidationError::UnknownSectionReference(goto.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::DocumentBuilder;

    #[test]
    fn test_single_section_with_fallthrough_is_valid() {
        let doc = DocumentBuilder::new().choices(&[("Done", None)]).build();
        assert_eq!(validate(&doc), Ok(()));
    }

    #[test]
    fn test_unknown_reference_names_target() {
        let doc = DocumentBuilder::new()
            .choices(&[("Go", Some("Nowhere"))])
            .section("End")
            .choices(&[("Done", None)])
            .build();
        assert_eq!(
            validate(&doc),
            Err(ValidationError::UnknownSectionReference("Nowhere".into()))
        );
    }

    #[test]
    fn test_case_policy_is_configurable() {
        let doc = DocumentBuilder::new()
            .choices(&[("Go", Some("end"))])
            .section("End")
            .choices(&[("Done", None)])
            .build();
        assert_eq!(validate(&doc), Ok(()));
        assert_eq!(
            validate_with(&doc, &ValidatorOptions::case_sensitive()),
            Err(ValidationError::UnknownSectionReference("end".into()))
        );
    }

    #[test]
    fn test_located_errors_carry_section_position() {
        let doc = DocumentBuilder::new()
            .choices(&[("Go", Some("(start)"))])
            .section("(start)")
            .text("Nothing to pick.")
            .section("End")
            .choices(&[("Done", None)])
            .build();
        assert_eq!(
            validate_located(&doc, &ValidatorOptions::default()),
            Err(LocatedError::at(
                1,
                ValidationError::ChoicelessNonTerminalSection("(start)".into())
            ))
        );
    }

    #[test]
    fn test_error_accessors() {
        let err = ValidationError::DeadEndLoop("Cave".into());
        assert_eq!(err.section_name(), "Cave");
        assert_eq!(err.code_suffix(), "dead_end_loop");
        assert_eq!(err.to_string(), "section 'Cave' is part of a loop with no way out");
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ValidatorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.name_matching, NameMatching::CaseInsensitive);
        let options: ValidatorOptions =
            serde_json::from_str(r#"{"name_matching":"case_sensitive"}"#).unwrap();
        assert_eq!(options, ValidatorOptions::case_sensitive());
    }
}
