// tests/parser_tests.rs

mod common;

use branchtext::{parse, Block, ParseErrorKind};
use common::{parse_ok, CAVE_STORY};

// ---
// Structure
// ---

#[test]
fn test_parse_cave_story() {
    let doc = parse_ok(CAVE_STORY);
    let names: Vec<_> = doc.sections().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec![None, Some("Depths"), Some("Exit")]);

    let first = &doc.sections()[0];
    assert!(matches!(&first.blocks()[0], Block::Text { text, .. } if text == "You wake up in a cave."));
    let choices = first.blocks()[1].choices().unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0].description(), "Walk towards the light");
    assert_eq!(choices[0].response(), Some("It is warm."));
    assert_eq!(choices[0].goto(), Some("Exit"));
    assert_eq!(choices[1].response(), None);
    assert_eq!(choices[1].goto(), Some("Depths"));

    let depths = &doc.sections()[1];
    assert!(matches!(&depths.blocks()[0], Block::Instruction { text, .. } if text == "Lower the lantern."));
}

#[test]
fn test_terminal_is_last_section() {
    let doc = parse_ok(CAVE_STORY);
    assert_eq!(doc.terminal_section().and_then(|s| s.name()), Some("Exit"));
    assert_eq!(doc.terminal_index(), Some(2));
}

#[test]
fn test_marks_are_kept() {
    let doc = parse_ok(":: [x] Taken\n: [ ] Not taken\n: [  ] Also not\n");
    let choices = doc.sections()[0].blocks()[0].choices().unwrap();
    assert_eq!(choices[0].mark(), Some("x"));
    assert_eq!(choices[1].mark(), None);
    assert_eq!(choices[2].mark(), None);
}

#[test]
fn test_crlf_line_endings() {
    let doc = parse_ok(":: Hello\r\n:: [ ] Go GO TO End\r\n\r\n== End ==\r\n:: [ ] Stop\r\n");
    assert_eq!(doc.sections().len(), 2);
    assert_eq!(doc.sections()[1].name(), Some("End"));
    let choice = &doc.sections()[0].blocks()[1].choices().unwrap()[0];
    assert_eq!(choice.goto(), Some("End"));
}

#[test]
fn test_quoted_document_parses_like_plain_one() {
    let plain = ":: Hi\n:: [ ] Go GO TO End\n\n== End ==\n:: [ ] Stop\n";
    let quoted = "> :: Hi\n> :: [ ] Go GO TO End\n>\n> == End ==\n> > :: [ ] Stop\n";
    assert_eq!(parse_ok(plain), parse_ok(quoted));
}

#[test]
fn test_text_and_choice_blocks_may_alternate() {
    let doc = parse_ok(":: [ ] A\n:: between\n:: [ ] B\n%% note\n:: [ ] C\n");
    let kinds: Vec<_> = doc.sections()[0]
        .blocks()
        .iter()
        .map(Block::is_choice)
        .collect();
    assert_eq!(kinds, vec![true, false, true, false, true]);
}

// ---
// Feedback
// ---

#[test]
fn test_feedback_placement() {
    let text = "\
I liked the opening.
:: Once upon a time.
: There was a fox.
The fox is cute.

:: [ ] Follow the fox
Why would I?
: [ ] Ignore it

Too few options.
";
    let doc = parse_ok(text);
    let section = &doc.sections()[0];
    assert_eq!(section.feedback(), Some("I liked the opening."));
    assert_eq!(section.blocks()[0].feedback(), Some("The fox is cute."));

    let Block::Choice { choices, feedback } = &section.blocks()[1] else {
        panic!("expected a choice block");
    };
    assert_eq!(choices[0].feedback(), Some("Why would I?"));
    assert_eq!(choices[1].feedback(), None);
    assert_eq!(feedback.as_deref(), Some("Too few options."));
    assert!(doc.is_completed());
}

#[test]
fn test_feedback_never_swallows_structure() {
    let doc = parse_ok(":: Start\nnotes here\n== Next ==\n:: [ ] Done\n");
    assert_eq!(doc.sections().len(), 2);
    assert_eq!(doc.sections()[0].blocks()[0].feedback(), Some("notes here"));
}

// ---
// Errors
// ---

#[test]
fn test_consecutive_choice_blocks_rejected() {
    let source = ":: Intro\n:: [ ] A GO TO End\n:: [ ] B GO TO End\n== End ==\n:: [ ] Stop\n";
    let err = parse(source).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ConsecutiveChoiceBlocks);
    assert_eq!(err.line_col(source), (3, 1));
}

#[test]
fn test_consecutive_choice_blocks_rejected_across_blank_lines() {
    let err = parse(":: [ ] A\n\n\n:: [ ] B\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::ConsecutiveChoiceBlocks);
}

#[test]
fn test_document_without_blocks_fails() {
    let err = parse("just some prose\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NoMatch);
}

#[test]
fn test_heading_without_content_fails_at_that_section() {
    let source = ":: Hi\n== Empty ==\n\n== Full ==\n:: [ ] ok\n";
    let err = parse(source).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::NoMatch);
    assert!(err.to_string().starts_with("parse error near"));
}
