//! Branchtext: branching, choice-driven plain-text documents.
//!
//! A document is a sequence of sections made of text, instruction and choice
//! blocks; choices may jump to other sections with `GO TO`. The crate parses
//! documents with a backtracking PEG engine ([`syntax`]), checks that every
//! walk can reach the final section ([`validation`]), renders them back to
//! text ([`render`]) and plays them interactively ([`runtime`]).
//!
//! ```rust
//! use branchtext::{parse, validate};
//!
//! let text = "\
//! :: You are lost.
//! :: [ ] Wait GO TO End
//!
//! == End ==
//! :: [ ] Rest
//! ";
//! let doc = parse(text).unwrap();
//! assert_eq!(doc.sections().len(), 2);
//! assert!(validate(&doc).is_ok());
//! ```

pub mod ast;
pub mod cli;
pub mod engine;
pub mod errors;
pub mod render;
pub mod runtime;
pub mod syntax;
pub mod validation;

pub use ast::{Block, Choice, ChoiceRef, Document, Section, Span};
pub use errors::{DocError, ErrorReporting, SourceContext};
pub use render::{render, render_with};
pub use runtime::{Selections, Session, SessionError, Step};
pub use syntax::{parse, ParseError, ParseErrorKind};
pub use validation::{
    validate, validate_located, validate_with, LocatedError, NameMatching, ValidationError,
    ValidatorOptions,
};
