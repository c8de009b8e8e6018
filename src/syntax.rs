//! Syntax module for branchtext documents
//!
//! A small backtracking PEG engine ([`cursor`], [`combinators`]) and the
//! document grammar built on it ([`grammar`]). [`parse`] is the entry point.

pub mod combinators;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
