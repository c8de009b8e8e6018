//! Native-text rendering.
//!
//! Produces text the parser reads back into an equal document, provided the
//! document carries no feedback. Selections from a [`Session`] are merged
//! into the choice marks here and nowhere else.
//!
//! [`Session`]: crate::runtime::Session

use std::fmt::Write as _;

use crate::ast::{Block, Choice, ChoiceRef, Document, Section};
use crate::runtime::Selections;

/// Renders a document exactly as parsed.
pub fn render(document: &Document) -> String {
    render_with(document, &Selections::new())
}

/// Renders a document with the given selections shown as marks.
pub fn render_with(document: &Document, selections: &Selections) -> String {
    let mut out = String::new();
    for (position, section) in document.sections().iter().enumerate() {
        if position > 0 {
            out.push('\n');
        }
        render_section(&mut out, position, section, selections);
    }
    out
}

fn render_section(out: &mut String, position: usize, section: &Section, selections: &Selections) {
    if let Some(name) = section.name() {
        let _ = writeln!(out, "== {name} ==");
    }
    if let Some(feedback) = section.feedback() {
        push_feedback(out, feedback);
    }
    for (block_index, block) in section.blocks().iter().enumerate() {
        if block_index > 0 {
            out.push('\n');
        }
        match block {
            Block::Text { text, feedback } => {
                push_lines(out, "::", ":", text);
                push_optional_feedback(out, feedback.as_deref());
            }
            Block::Instruction { text, feedback } => {
                push_lines(out, "%%", "%", text);
                push_optional_feedback(out, feedback.as_deref());
            }
            Block::Choice { choices, feedback } => {
                for (choice_index, choice) in choices.iter().enumerate() {
                    let at = ChoiceRef {
                        section: position,
                        block: block_index,
                        choice: choice_index,
                    };
                    let marker = if choice_index == 0 { "::" } else { ":" };
                    let mark = selections.get(&at).map(String::as_str);
                    render_choice(out, marker, choice, mark);
                }
                if let Some(feedback) = feedback {
                    out.push('\n');
                    push_feedback(out, feedback);
                }
            }
        }
    }
}

fn render_choice(out: &mut String, marker: &str, choice: &Choice, selected: Option<&str>) {
    let mark = selected.or(choice.mark()).unwrap_or(" ");
    let _ = write!(out, "{marker} [{mark}] {}", continued(choice.description()));
    if let Some(response) = choice.response() {
        let _ = write!(out, " -- {}", continued(response));
    }
    if let Some(goto) = choice.goto() {
        let _ = write!(out, " GO TO {goto}");
    }
    out.push('\n');
    if let Some(feedback) = choice.feedback() {
        push_feedback(out, feedback);
    }
}

/// Multi-line choice text, each extra line behind a `:` continuation.
fn continued(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("\n: ")
}

fn push_lines(out: &mut String, first: &str, rest: &str, text: &str) {
    let mut lines = text.split('\n');
    let _ = writeln!(out, "{first} {}", lines.next().unwrap_or_default());
    for line in lines {
        if line.is_empty() {
            let _ = writeln!(out, "{rest}");
        } else {
            let _ = writeln!(out, "{rest} {line}");
        }
    }
}

fn push_optional_feedback(out: &mut String, feedback: Option<&str>) {
    if let Some(feedback) = feedback {
        push_feedback(out, feedback);
    }
}

fn push_feedback(out: &mut String, feedback: &str) {
    for line in feedback.lines() {
        let _ = writeln!(out, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::DocumentBuilder;

    #[test]
    fn test_render_layout() {
        let doc = DocumentBuilder::new()
            .text("Hello\n\nworld")
            .choices(&[("Go", Some("End")), ("Stay", None)])
            .section("End")
            .instruction("Stop.")
            .build();
        let expected = "\
:: Hello
:
: world

:: [ ] Go GO TO End
: [ ] Stay

== End ==
%% Stop.
";
        assert_eq!(render(&doc), expected);
    }

    #[test]
    fn test_selections_override_marks() {
        let doc = DocumentBuilder::new()
            .choices(&[("A", None), ("B", None)])
            .build();
        let selections = Selections::new().update(
            ChoiceRef {
                section: 0,
                block: 0,
                choice: 1,
            },
            "x".to_string(),
        );
        assert_eq!(render_with(&doc, &selections), ":: [ ] A\n: [x] B\n");
    }

    #[test]
    fn test_multiline_choice_uses_continuations() {
        let choice = Choice::new(
            Some("*".into()),
            "Climb the\nold tower",
            Some("You climb.".into()),
            Some("Top".into()),
        );
        let mut out = String::new();
        render_choice(&mut out, "::", &choice, None);
        assert_eq!(out, ":: [*] Climb the\n: old tower -- You climb. GO TO Top\n");
    }
}
