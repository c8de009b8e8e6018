//! Section lookup by name.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::ast::Document;

/// How section names are compared, for duplicates, gotos and jumps alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatching {
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

impl NameMatching {
    /// The lookup key for a name under this policy.
    pub fn key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            NameMatching::CaseSensitive => Cow::Borrowed(name),
            NameMatching::CaseInsensitive => Cow::Owned(name.to_lowercase()),
        }
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

/// Maps headed section names to their position in the document.
#[derive(Debug, Clone)]
pub struct SectionIndex {
    matching: NameMatching,
    positions: HashMap<String, usize>,
}

impl SectionIndex {
    /// Fails on the first section whose name repeats an earlier one.
    pub fn build(document: &Document, matching: NameMatching) -> Result<Self, ValidationError> {
        let mut positions = HashMap::new();
        for (position, section) in document.sections().iter().enumerate() {
            let Some(name) = section.name() else { continue };
            if positions
                .insert(matching.key(name).into_owned(), position)
                .is_some()
            {
                return Err(ValidationError::DuplicateSectionName(name.to_string()));
            }
        }
        Ok(Self {
            matching,
            positions,
        })
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.positions.get(self.matching.key(name).as_ref()).copied()
    }

    pub fn matching(&self) -> NameMatching {
        self.matching
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
