//! Line-oriented terminal runner over a [`Session`].

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::runtime::{Session, SessionError, Step};

#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Finished,
    /// Input ran out before the walk finished.
    Abandoned,
}

/// Drives the session until it finishes or `input` runs dry. Choices are
/// read as 1-based numbers; anything else asks again.
pub fn play<R, W>(session: &mut Session<'_>, mut input: R, mut output: W) -> Result<PlayOutcome, PlayError>
where
    R: BufRead,
    W: Write,
{
    loop {
        match session.step()? {
            Step::Finished => {
                writeln!(output, "-- The End --")?;
                return Ok(PlayOutcome::Finished);
            }
            Step::Text(text) => {
                writeln!(output, "{text}\n")?;
                session.advance()?;
            }
            Step::Instruction(text) => {
                writeln!(output, "* {text}\n")?;
                session.advance()?;
            }
            Step::Prompt(choices) => {
                for (number, choice) in choices.iter().enumerate() {
                    writeln!(output, "  {}) {}", number + 1, choice.description())?;
                }
                let Some(index) = read_choice(&mut input, &mut output, choices.len())? else {
                    return Ok(PlayOutcome::Abandoned);
                };
                if let Some(response) = session.choose(index)? {
                    writeln!(output, "{response}")?;
                }
                writeln!(output)?;
            }
        }
    }
}

fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    available: usize,
) -> io::Result<Option<usize>> {
    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(number) if (1..=available).contains(&number) => return Ok(Some(number - 1)),
            _ => writeln!(output, "Pick a number from 1 to {available}.")?,
        }
    }
}
