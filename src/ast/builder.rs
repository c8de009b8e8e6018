//! # Document Builder
//!
//! Assembles documents in code, without going through the text grammar.
//! Used by tests and by tools that generate documents programmatically.
//!
//! ```rust
//! use branchtext::ast::builder::DocumentBuilder;
//!
//! let doc = DocumentBuilder::new()
//!     .text("You wake up.")
//!     .choices(&[("Get up", Some("Hall")), ("Sleep", Some("Hall"))])
//!     .section("Hall")
//!     .choices(&[("Leave", None)])
//!     .build();
//! assert_eq!(doc.sections().len(), 2);
//! ```

use crate::ast::{Block, Choice, Document, Section, Span};

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    done: Vec<Section>,
    name: Option<String>,
    blocks: Vec<Block>,
}

impl DocumentBuilder {
    /// Starts with the anonymous first section open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the current section and opens a headed one.
    pub fn section(mut self, name: &str) -> Self {
        self.close();
        self.name = Some(name.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.blocks.push(Block::Text {
            text: text.to_string(),
            feedback: None,
        });
        self
    }

    pub fn instruction(mut self, text: &str) -> Self {
        self.blocks.push(Block::Instruction {
            text: text.to_string(),
            feedback: None,
        });
        self
    }

    /// A choice block from `(description, goto)` pairs.
    pub fn choices(self, options: &[(&str, Option<&str>)]) -> Self {
        let choices = options
            .iter()
            .map(|(description, goto)| {
                Choice::new(None, *description, None, goto.map(str::to_string))
            })
            .collect();
        self.choice_block(choices)
    }

    pub fn choice_block(mut self, choices: Vec<Choice>) -> Self {
        self.blocks.push(Block::Choice {
            choices,
            feedback: None,
        });
        self
    }

    pub fn build(mut self) -> Document {
        self.close();
        Document::new(self.done)
    }

    fn close(&mut self) {
        let is_first = self.done.is_empty() && self.name.is_none();
        if self.blocks.is_empty() && !is_first && self.name.is_none() {
            return;
        }
        let blocks = std::mem::take(&mut self.blocks);
        let name = self.name.take();
        self.done.push(Section::new(name, blocks, None, Span::default()));
    }
}
