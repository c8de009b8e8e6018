//! Handles all user-facing output for the CLI.
//!
//! Status lines and summaries are coloured with `termcolor`; error reports
//! go through `miette` in [`crate::errors::print_error`].

use std::io::Write;
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One line per checked file: `ok` in green or `FAILED` in red.
pub fn print_status(path: &Path, passed: bool) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let (label, color) = if passed {
        ("ok", Color::Green)
    } else {
        ("FAILED", Color::Red)
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{label:>6}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", path.display());
}

pub fn print_summary(passed: usize, failed: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if failed == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(
        stdout,
        "\n{} checked: {passed} valid, {failed} invalid",
        passed + failed
    );
    let _ = stdout.reset();
}

/// Plain output for commands that produce a document or a dump.
pub fn print_text(text: &str) {
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
}
