//! # Shared test helpers
//!
//! Document fixtures and a small text generator for goto-graphs.

#![allow(dead_code)]

use branchtext::{parse, validate, Document, ValidationError};

pub fn parse_ok(text: &str) -> Document {
    parse(text).unwrap_or_else(|e| panic!("failed to parse: {e}\n---\n{text}"))
}

pub fn validation_of(text: &str) -> Result<(), ValidationError> {
    validate(&parse_ok(text))
}

/// Name used for section `index` in [`graph_text`]. Section 0 is the
/// anonymous start section and has no name.
pub fn section_name(index: usize) -> String {
    format!("S{index}")
}

/// One choice: `Some(target)` jumps, `None` falls through.
pub type Edge = Option<usize>;

/// Writes a goto-graph as document text: one section per entry, each with a
/// line of text and a single choice block holding the given edges.
pub fn graph_text(sections: &[Vec<Edge>]) -> String {
    let mut text = String::new();
    for (index, edges) in sections.iter().enumerate() {
        if index > 0 {
            text.push_str(&format!("\n== {} ==\n", section_name(index)));
        }
        text.push_str(&format!(":: Section {index}.\n"));
        for (n, edge) in edges.iter().enumerate() {
            let marker = if n == 0 { "::" } else { ":" };
            match edge {
                Some(target) => text.push_str(&format!(
                    "{marker} [ ] Option {n} GO TO {}\n",
                    section_name(*target)
                )),
                None => text.push_str(&format!("{marker} [ ] Option {n}\n")),
            }
        }
    }
    text
}

/// Three-section story used across integration tests.
pub const CAVE_STORY: &str = "\
:: You wake up in a cave.
:: [ ] Walk towards the light -- It is warm. GO TO Exit
: [ ] Go deeper GO TO Depths

== Depths ==
%% Lower the lantern.
:: [ ] Look around again GO TO Depths
: [ ] Squeeze through -- It is tight. GO TO Exit

== Exit ==
:: You are outside.
:: [ ] Breathe
";
