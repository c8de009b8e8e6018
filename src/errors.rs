//! Branchtext Error Reporting
//!
//! The core modules return small `thiserror` values ([`ParseError`],
//! [`ValidationError`], [`SessionError`]). This module lifts them into a
//! single [`DocError`] that knows its source text, a labelled span, a
//! stable code and a help line, and renders through `miette`.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use std::fmt;
use std::sync::Arc;

use crate::ast::{Document, Span, START_SECTION_LABEL};
use crate::runtime::SessionError;
use crate::syntax::{ParseError, ParseErrorKind};
use crate::validation::{LocatedError, NameMatching, ValidationError};

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// A named piece of document text, for error reporting.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// A reportable error: what went wrong, where, and how to fix it.
#[derive(Debug)]
pub struct DocError {
    pub kind: ErrorKind,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Parse(ParseError),
    Validation(ValidationError),
    Session(SessionError),
    Io { path: String, message: String },
    Output { format: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Validation,
    Session,
    Io,
}

impl ErrorCategory {
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::Session => "session",
            Self::Io => "io",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(_) => ErrorCategory::Parse,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Session(_) => ErrorCategory::Session,
            Self::Io { .. } | Self::Output { .. } => ErrorCategory::Io,
        }
    }

    pub fn code_suffix(&self) -> &'static str {
        match self {
            Self::Parse(err) => match err.kind {
                ParseErrorKind::NoMatch => "no_match",
                ParseErrorKind::ConsecutiveChoiceBlocks => "consecutive_choice_blocks",
                ParseErrorKind::NulCharacter => "nul_character",
            },
            Self::Validation(err) => err.code_suffix(),
            Self::Session(_) => "invalid_step",
            Self::Io { .. } => "unreadable",
            Self::Output { .. } => "unwritable",
        }
    }

    fn help(&self) -> Option<&'static str> {
        let help = match self {
            Self::Parse(err) => match err.kind {
                ParseErrorKind::NoMatch => {
                    "every block starts with `::` or `%%`, and every heading looks like `== Name ==`"
                }
                ParseErrorKind::ConsecutiveChoiceBlocks => {
                    "put a text or instruction block between the two choice blocks"
                }
                ParseErrorKind::NulCharacter => "documents are plain text; remove the NUL byte",
            },
            Self::Validation(err) => match err {
                ValidationError::DuplicateSectionName(_) => "rename one of the sections",
                ValidationError::UnknownSectionReference(_) => {
                    "add a section with this name or fix the GO TO target"
                }
                ValidationError::ChoicelessNonTerminalSection(_) => {
                    "add a choice block leading onwards, or move this section to the end"
                }
                ValidationError::DeadEndLoop(_) => {
                    "give a section in this loop a choice that leads out of it"
                }
                ValidationError::NonFallthroughNonTerminalSection(_) => {
                    "end the section with a choice block where every choice has a GO TO"
                }
                ValidationError::TerminalSectionMustFallThrough(_) => {
                    "give the final choice block a choice without GO TO"
                }
            },
            Self::Session(_) | Self::Io { .. } | Self::Output { .. } => return None,
        };
        Some(help)
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::Parse(err) => match err.kind {
                ParseErrorKind::NoMatch => "parsing stopped here",
                ParseErrorKind::ConsecutiveChoiceBlocks => "second choice block",
                ParseErrorKind::NulCharacter => "NUL character",
            },
            Self::Validation(ValidationError::UnknownSectionReference(_)) => "unknown target",
            Self::Validation(ValidationError::DuplicateSectionName(_)) => "duplicate heading",
            Self::Validation(_) => "in this section",
            Self::Session(_) | Self::Io { .. } | Self::Output { .. } => "here",
        }
    }
}

impl std::error::Error for DocError {}

impl fmt::Display for DocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse(err) => write!(f, "Parse error: {err}"),
            ErrorKind::Validation(err) => write!(f, "Validation error: {err}"),
            ErrorKind::Session(err) => write!(f, "Session error: {err}"),
            ErrorKind::Io { path, message } => write!(f, "Cannot read {path}: {message}"),
            ErrorKind::Output { format, message } => {
                write!(f, "Cannot write {format} output: {message}")
            }
        }
    }
}

impl Diagnostic for DocError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

/// Context-aware error creation.
pub trait ErrorReporting {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> DocError;

    fn parse_error(&self, err: ParseError) -> DocError {
        let span = SourceSpan::from(err.offset..err.offset);
        self.report(ErrorKind::Parse(err), span)
    }

    fn session_error(&self, err: SessionError) -> DocError {
        self.report(ErrorKind::Session(err), unspanned())
    }

    fn output_error(&self, format: &str, message: impl fmt::Display) -> DocError {
        self.report(
            ErrorKind::Output {
                format: format.to_string(),
                message: message.to_string(),
            },
            unspanned(),
        )
    }

    fn io_error(&self, path: &str, err: &std::io::Error) -> DocError {
        self.report(
            ErrorKind::Io {
                path: path.to_string(),
                message: err.to_string(),
            },
            unspanned(),
        )
    }
}

/// Error creation for one document file.
#[derive(Debug, Clone)]
pub struct DocumentContext {
    pub source: SourceContext,
}

impl DocumentContext {
    pub fn new(source: SourceContext) -> Self {
        Self { source }
    }

    /// A validation error, labelled at the heading (or goto) it names.
    pub fn validation_error(
        &self,
        document: &Document,
        matching: NameMatching,
        err: impl Into<LocatedError>,
    ) -> DocError {
        let located = err.into();
        let span = to_source_span(validation_span(document, matching, &located));
        self.report(ErrorKind::Validation(located.error), span)
    }
}

impl ErrorReporting for DocumentContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> DocError {
        let error_code = format!(
            "branchtext::{}::{}",
            kind.category().phase(),
            kind.code_suffix()
        );
        let help = kind.help().map(str::to_string);

        DocError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }
}

/// Where a validation error points: the section it was raised for, else the
/// last heading carrying the name, or for an unknown reference, the first
/// choice naming it.
pub fn validation_span(document: &Document, matching: NameMatching, located: &LocatedError) -> Span {
    let sections = document.sections();
    if let Some(section) = located.section.and_then(|position| sections.get(position)) {
        return section.span();
    }
    let err = &located.error;
    let name = err.section_name();
    if let ValidationError::UnknownSectionReference(_) = err {
        return sections
            .iter()
            .flat_map(|section| section.choice_blocks())
            .flat_map(|(_, choices)| choices)
            .find(|choice| choice.goto().is_some_and(|goto| matching.matches(goto, name)))
            .map(|choice| choice.span())
            .unwrap_or_default();
    }
    sections
        .iter()
        .rev()
        .find(|section| section.name().is_some_and(|heading| matching.matches(heading, name)))
        .or_else(|| sections.first().filter(|_| name == START_SECTION_LABEL))
        .map(|section| section.span())
        .unwrap_or_default()
}

/// Placeholder span for errors not tied to a location in the document.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}

pub fn to_source_span(span: Span) -> SourceSpan {
    SourceSpan::from(span.start..span.end)
}

// ============================================================================
// ERROR FORMATTING UTILITIES
// ============================================================================

/// Prints a DocError with full miette diagnostics to stderr.
pub fn print_error(error: DocError) {
    use miette::Report;
    let report = Report::new(error);
    eprintln!("{report:?}");
}
