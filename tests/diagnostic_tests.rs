//! Diagnostic output tests.
//!
//! Each error is rendered through miette's graphical handler without colour,
//! and the report is checked for its code, label, help and source excerpt.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

use branchtext::errors::{DocumentContext, ErrorCategory, ErrorKind};
use branchtext::{
    parse, validate, validate_located, DocError, ErrorReporting, SessionError, SourceContext,
};

fn context(text: &str) -> DocumentContext {
    DocumentContext::new(SourceContext::from_file("story.btx", text))
}

/// Renders a diagnostic the way `print_error` does, minus colours.
fn render_report(error: &DocError) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .with_width(200)
        .render_report(&mut out, error)
        .unwrap();
    out
}

fn validation_report(text: &str) -> DocError {
    let doc = parse(text).unwrap();
    let err = validate(&doc).unwrap_err();
    context(text).validation_error(&doc, Default::default(), err)
}

#[test]
fn test_parse_error_diagnostic() {
    let text = ":: Hi\n== Empty ==\n\n== Full ==\n:: [ ] ok\n";
    let error = context(text).parse_error(parse(text).unwrap_err());

    assert_eq!(error.kind.category(), ErrorCategory::Parse);
    assert_eq!(
        error.code().map(|c| c.to_string()).as_deref(),
        Some("branchtext::parse::no_match")
    );

    let output = render_report(&error);
    assert!(output.contains("branchtext::parse::no_match"), "{output}");
    assert!(output.contains("story.btx"), "{output}");
    assert!(output.contains("parsing stopped here"), "{output}");
    assert!(output.contains("== Full =="), "{output}");
    assert!(output.contains("help:"), "{output}");
}

#[test]
fn test_consecutive_choice_blocks_diagnostic() {
    let text = ":: [ ] A\n\n:: [ ] B\n";
    let error = context(text).parse_error(parse(text).unwrap_err());

    assert_eq!(error.source_info.primary_span.offset(), text.find(":: [ ] B").unwrap());
    let output = render_report(&error);
    assert!(output.contains("second choice block"), "{output}");
    assert!(output.contains("put a text or instruction block between"), "{output}");
}

#[test]
fn test_nul_character_diagnostic() {
    let text = ":: [ ] Done\n\0== Junk ==\n";
    let error = context(text).parse_error(parse(text).unwrap_err());

    assert_eq!(error.diagnostic_info.error_code, "branchtext::parse::nul_character");
    assert_eq!(error.source_info.primary_span.offset(), text.find('\0').unwrap());
    assert!(error.help().is_some());
}

#[test]
fn test_start_section_diagnostic_is_not_confused_with_heading() {
    let text = ":: Lost.\n\n== (start) ==\n:: [ ] Done\n";
    let doc = parse(text).unwrap();
    let located = validate_located(&doc, &Default::default()).unwrap_err();
    let error = context(text).validation_error(&doc, Default::default(), located);

    assert_eq!(error.source_info.primary_span.offset(), 0);
    assert_eq!(
        error.to_string(),
        "Validation error: section '(start)' has no choices but is not the terminal section"
    );
}

#[test]
fn test_duplicate_heading_diagnostic_points_at_second_heading() {
    let text = ":: [ ] Go GO TO Intro\n\n== Intro ==\n:: [ ] Go GO TO End\n\n== Intro ==\n:: [ ] Go GO TO End\n\n== End ==\n:: [ ] Done\n";
    let error = validation_report(text);

    assert_eq!(
        error.diagnostic_info.error_code,
        "branchtext::validation::duplicate_section_name"
    );
    assert_eq!(error.source_info.primary_span.offset(), text.rfind("== Intro").unwrap());
    assert_eq!(error.to_string(), "Validation error: duplicate section name 'Intro'");

    let output = render_report(&error);
    assert!(output.contains("duplicate heading"), "{output}");
    assert!(output.contains("rename one of the sections"), "{output}");
}

#[test]
fn test_unknown_reference_diagnostic_points_at_choice() {
    let text = ":: [ ] Wander GO TO Nowhere\n\n== End ==\n:: [ ] Done\n";
    let error = validation_report(text);

    assert!(matches!(error.kind, ErrorKind::Validation(_)));
    let output = render_report(&error);
    assert!(output.contains("unknown target"), "{output}");
    assert!(output.contains("Wander GO TO Nowhere"), "{output}");
}

#[test]
fn test_every_validation_error_has_help() {
    let texts = [
        ":: [ ] Go GO TO s2\n\n== s2 ==\n:: Nothing.\n\n== End ==\n:: [ ] Done\n",
        ":: [ ] Go GO TO Loop\n\n== Loop ==\n:: [ ] Again GO TO Loop\n\n== End ==\n:: [ ] Done\n",
        ":: [ ] Go GO TO Mid\n\n== Mid ==\n:: [ ] Wait\n\n== End ==\n:: [ ] Done\n",
        ":: [ ] Go GO TO End\n\n== End ==\n:: [ ] Again GO TO End\n",
    ];
    for text in texts {
        let error = validation_report(text);
        assert!(error.help().is_some(), "{}", error);
        assert!(error.diagnostic_info.error_code.starts_with("branchtext::validation::"));
    }
}

#[test]
fn test_session_and_output_errors_have_no_help() {
    let ctx = context(":: [ ] Done\n");

    let session = ctx.session_error(SessionError::Finished);
    assert_eq!(session.diagnostic_info.error_code, "branchtext::session::invalid_step");
    assert!(session.help().is_none());

    let output = ctx.output_error("yaml", "broken pipe");
    assert_eq!(output.diagnostic_info.error_code, "branchtext::io::unwritable");
    assert_eq!(output.to_string(), "Cannot write yaml output: broken pipe");
}
