//! Grammar rules for branchtext documents.
//!
//! Each rule is a plain function `fn(Cursor) -> Reply<T>` built from the
//! combinators, so every rule can be tried on its own. Line-level rules
//! consume their trailing newline; block rules consume the blank and
//! feedback lines that follow them up to the next block-starting line.

use crate::ast::{Block, Choice, Document, Section, Span};

use super::combinators::{
    alt, end_of_input, many0, many1, map, not, one_of, opt, peek, recognize, satisfy, seq, tag,
    verify, Reply, Rule,
};
use super::cursor::Cursor;
use super::error::ParseError;

/// Characters allowed to trail a goto target; they are discarded.
const GOTO_PUNCTUATION: &str = ".,!?;:";

// ============================================================================
// LEXICAL PIECES
// ============================================================================

/// Any non-control character, plus tab. Excludes newlines and the sentinel.
pub fn printable<'s>(c: Cursor<'s>) -> Reply<'s, char> {
    satisfy(|ch: char| ch == '\t' || !ch.is_control()).try_parse(c)
}

/// Zero or more spaces or tabs.
pub fn space<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    recognize(many0(one_of(" \t"))).try_parse(c)
}

pub fn space1<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    recognize(many1(one_of(" \t"))).try_parse(c)
}

/// A line break, or (zero-width) the end of input.
pub fn newline<'s>(c: Cursor<'s>) -> Reply<'s, ()> {
    alt((
        map(seq((opt(tag("\r")), tag("\n"))), |_| ()),
        map(peek(end_of_input()), |_| ()),
    ))
    .try_parse(c)
}

/// Block-quote prefix: one or more `>`, each optionally preceded by blanks.
pub fn quote<'s>(c: Cursor<'s>) -> Reply<'s, ()> {
    map(seq((many1(seq((space, tag(">")))), space)), |_| ()).try_parse(c)
}

/// Everything up to the end of the line, right-trimmed.
pub fn rest_of_line<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    map(recognize(many0(printable)), str::trim_end).try_parse(c)
}

/// A line with nothing but blanks (and possibly a quote prefix).
pub fn blank_line<'s>(c: Cursor<'s>) -> Reply<'s, ()> {
    map(seq((opt(quote), space, newline)), |_| ()).try_parse(c)
}

/// A line break followed by a `:` continuation marker that does not open a
/// new choice. Joins the lines of a multi-line description or response.
pub fn line_join<'s>(c: Cursor<'s>) -> Reply<'s, ()> {
    map(
        seq((
            space,
            newline,
            opt(quote),
            tag(":"),
            not(tag(":")),
            not(seq((space, tag("[")))),
            space,
        )),
        |_| (),
    )
    .try_parse(c)
}

// ============================================================================
// LINES
// ============================================================================

/// `== name ==`; yields the trimmed name.
pub fn heading<'s>(c: Cursor<'s>) -> Reply<'s, String> {
    let name = verify(
        map(
            recognize(many1(seq((not(tag("==")), printable)))),
            str::trim,
        ),
        |name: &&str| !name.is_empty(),
    );
    map(
        seq((opt(quote), tag("=="), space, name, tag("=="), space, newline)),
        |(_, _, _, name, _, _, _)| name.to_string(),
    )
    .try_parse(c)
}

/// `:: text`
pub fn first_text_line<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    marked_line(c, "::", None)
}

/// `: text`
pub fn text_line<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    marked_line(c, ":", Some(":"))
}

/// `%% text`
pub fn first_instruction_line<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    marked_line(c, "%%", None)
}

/// `% text`
pub fn instruction_line<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    marked_line(c, "%", Some("%"))
}

fn marked_line<'s>(
    c: Cursor<'s>,
    marker: &'static str,
    not_followed_by: Option<&'static str>,
) -> Reply<'s, &'s str> {
    let Some((_, c)) = seq((opt(quote), tag(marker))).try_parse(c)? else {
        return Ok(None);
    };
    if let Some(forbidden) = not_followed_by {
        if tag(forbidden).try_parse(c)?.is_some() {
            return Ok(None);
        }
    }
    map(seq((space, rest_of_line, newline)), |(_, text, _)| text).try_parse(c)
}

/// Any line that can open a block or a section.
pub fn starter_line<'s>(c: Cursor<'s>) -> Reply<'s, ()> {
    alt((
        map(heading, |_| ()),
        map(first_text_line, |_| ()),
        map(first_instruction_line, |_| ()),
        map(first_choice, |_| ()),
    ))
    .try_parse(c)
}

/// Unstructured prose. Never swallows a line that could start a block.
pub fn feedback_line<'s>(c: Cursor<'s>) -> Reply<'s, String> {
    map(
        seq((
            not(starter_line),
            not(blank_line),
            opt(quote),
            recognize(many1(printable)),
            newline,
        )),
        |(_, _, _, text, _)| text.trim().to_string(),
    )
    .try_parse(c)
}

// ============================================================================
// CHOICES
// ============================================================================

/// `GO TO `, the start of a goto clause.
pub fn goto_start<'s>(c: Cursor<'s>) -> Reply<'s, ()> {
    map(seq((tag("GO"), space1, tag("TO"), space1)), |_| ()).try_parse(c)
}

/// `GO TO name` through the end of the line; yields the name without
/// trailing punctuation. Punctuation inside the name is kept.
pub fn goto_clause<'s>(c: Cursor<'s>) -> Reply<'s, String> {
    let name = verify(
        map(rest_of_line, |line: &'s str| {
            line.trim_end_matches(|ch: char| ch.is_whitespace() || GOTO_PUNCTUATION.contains(ch))
                .trim_start()
        }),
        |name: &&str| !name.is_empty(),
    );
    map(seq((goto_start, name)), |(_, name)| name.to_string()).try_parse(c)
}

/// `[mark]`; an empty mark is absent.
pub fn mark<'s>(c: Cursor<'s>) -> Reply<'s, Option<String>> {
    map(
        seq((
            tag("["),
            recognize(many0(seq((not(tag("]")), printable)))),
            tag("]"),
        )),
        |(_, mark, _)| Some(mark.trim()).filter(|m| !m.is_empty()).map(str::to_string),
    )
    .try_parse(c)
}

/// One line of description: stops before `--` and before `GO TO`.
fn description_text<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    recognize(many1(seq((not(tag("--")), not(goto_start), printable)))).try_parse(c)
}

/// One line of response: stops before `GO TO`.
fn response_text<'s>(c: Cursor<'s>) -> Reply<'s, &'s str> {
    recognize(many1(seq((not(goto_start), printable)))).try_parse(c)
}

/// Text spread over continuation lines, joined with `\n`.
fn joined<'s, R>(c: Cursor<'s>, piece: R) -> Reply<'s, String>
where
    R: Rule<'s, &'s str> + Copy,
{
    map(
        seq((piece, many0(map(seq((line_join, piece)), |(_, text)| text)))),
        |(first, rest)| {
            std::iter::once(first)
                .chain(rest)
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
    .try_parse(c)
}

pub fn description<'s>(c: Cursor<'s>) -> Reply<'s, String> {
    verify(|c: Cursor<'s>| joined(c, description_text), |d: &String| !d.is_empty()).try_parse(c)
}

pub fn response<'s>(c: Cursor<'s>) -> Reply<'s, String> {
    joined(c, response_text)
}

/// `[mark] description -- response GO TO name.` through the end of its line.
pub fn choice<'s>(c: Cursor<'s>) -> Reply<'s, Choice> {
    let start = c.pos();
    let response_clause = map(
        seq((opt(line_join), tag("--"), space, opt(response))),
        |(_, _, _, response)| response.filter(|r| !r.is_empty()),
    );
    let goto = map(seq((opt(line_join), goto_clause)), |(_, name)| name);
    let Some(((mark, _, description, response, goto, _, _), next)) = seq((
        mark,
        space,
        description,
        opt(response_clause),
        opt(goto),
        space,
        newline,
    ))
    .try_parse(c)?
    else {
        return Ok(None);
    };
    let choice = Choice::new(mark, description, response.flatten(), goto)
        .with_span(Span::new(start, next.pos()));
    Ok(Some((choice, next)))
}

/// `:: [ ] ...` opens a choice block.
pub fn first_choice<'s>(c: Cursor<'s>) -> Reply<'s, Choice> {
    map(seq((opt(quote), tag("::"), space, choice)), |(_, _, _, ch)| ch).try_parse(c)
}

/// `: [ ] ...` adds a further choice to the same block.
pub fn choice_line<'s>(c: Cursor<'s>) -> Reply<'s, Choice> {
    map(
        seq((opt(quote), tag(":"), not(tag(":")), space, choice)),
        |(_, _, _, _, ch)| ch,
    )
    .try_parse(c)
}

// ============================================================================
// BLOCKS
// ============================================================================

/// What may follow a block's first line.
enum Trail<T> {
    Item(T),
    Blank,
    Feedback(String),
}

fn trail<'s, T, R>(item: R) -> impl Fn(Cursor<'s>) -> Reply<'s, Vec<Trail<T>>>
where
    R: Rule<'s, T>,
{
    many0(alt((
        map(item, Trail::Item),
        map(blank_line, |_| Trail::Blank),
        map(feedback_line, Trail::Feedback),
    )))
}

fn join_feedback(lines: Vec<String>) -> Option<String> {
    Some(lines.join("\n")).filter(|text| !text.is_empty())
}

/// Prose lines with interior blank lines kept as empty lines.
fn prose_block<'s>(
    c: Cursor<'s>,
    first: fn(Cursor<'s>) -> Reply<'s, &'s str>,
    rest: fn(Cursor<'s>) -> Reply<'s, &'s str>,
) -> Reply<'s, (String, Option<String>)> {
    let Some(((first, trail), next)) = seq((first, trail(rest))).try_parse(c)? else {
        return Ok(None);
    };
    let mut lines = vec![first.to_string()];
    let mut feedback = Vec::new();
    for item in trail {
        match item {
            Trail::Item(line) => lines.push(line.to_string()),
            Trail::Blank => lines.push(String::new()),
            Trail::Feedback(text) => feedback.push(text),
        }
    }
    while lines.len() > 1 && lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    Ok(Some(((lines.join("\n"), join_feedback(feedback)), next)))
}

pub fn text_block<'s>(c: Cursor<'s>) -> Reply<'s, Block> {
    map(
        |c: Cursor<'s>| prose_block(c, first_text_line, text_line),
        |(text, feedback)| Block::Text { text, feedback },
    )
    .try_parse(c)
}

pub fn instruction_block<'s>(c: Cursor<'s>) -> Reply<'s, Block> {
    map(
        |c: Cursor<'s>| prose_block(c, first_instruction_line, instruction_line),
        |(text, feedback)| Block::Instruction { text, feedback },
    )
    .try_parse(c)
}

/// A run of choices. Feedback directly under a choice belongs to it; after a
/// blank line, feedback belongs to the block.
pub fn choice_block<'s>(c: Cursor<'s>) -> Reply<'s, Block> {
    let Some(((first, trail), next)) = seq((first_choice, trail(choice_line))).try_parse(c)?
    else {
        return Ok(None);
    };
    let mut choices = vec![(first, Vec::new())];
    let mut block_feedback = Vec::new();
    let mut attached = true;
    for item in trail {
        match item {
            Trail::Item(choice) => {
                choices.push((choice, Vec::new()));
                attached = true;
            }
            Trail::Blank => attached = false,
            Trail::Feedback(text) => match choices.last_mut() {
                Some((_, lines)) if attached => lines.push(text),
                _ => block_feedback.push(text),
            },
        }
    }
    let choices = choices
        .into_iter()
        .map(|(choice, lines)| choice.with_feedback(join_feedback(lines)))
        .collect();
    let block = Block::Choice {
        choices,
        feedback: join_feedback(block_feedback),
    };
    Ok(Some((block, next)))
}

pub fn block<'s>(c: Cursor<'s>) -> Reply<'s, Block> {
    alt((choice_block, instruction_block, text_block)).try_parse(c)
}

// ============================================================================
// SECTIONS & DOCUMENT
// ============================================================================

/// Lead blank/feedback lines, then one or more blocks.
///
/// Two choice blocks in a row abort the parse immediately.
pub fn content<'s>(c: Cursor<'s>) -> Reply<'s, (Vec<Block>, Option<String>)> {
    let lead_line = alt((map(blank_line, |_| None), map(feedback_line, Some)));
    let Some((lead, mut c)) = many0(lead_line).try_parse(c)? else {
        return Ok(None);
    };
    let mut blocks: Vec<Block> = Vec::new();
    while let Some((next_block, next)) = block(c)? {
        if next_block.is_choice() && blocks.last().is_some_and(Block::is_choice) {
            return Err(ParseError::consecutive_choice_blocks(c));
        }
        blocks.push(next_block);
        c = next;
    }
    if blocks.is_empty() {
        return Ok(None);
    }
    let feedback = join_feedback(lead.into_iter().flatten().collect());
    Ok(Some(((blocks, feedback), c)))
}

/// The anonymous section at the top of the document.
pub fn first_section<'s>(c: Cursor<'s>) -> Reply<'s, Section> {
    let start = c.pos();
    map(content, move |(blocks, feedback)| {
        Section::new(None, blocks, feedback, Span::new(start, start))
    })
    .try_parse(c)
}

/// A heading and its content.
pub fn section<'s>(c: Cursor<'s>) -> Reply<'s, Section> {
    let start = c.pos();
    let Some((name, after_heading)) = heading(c)? else {
        return Ok(None);
    };
    let span = Span::new(start, after_heading.pos());
    map(content, move |(blocks, feedback)| {
        Section::new(Some(name.clone()), blocks, feedback, span)
    })
    .try_parse(after_heading)
}

/// First section, headed sections, then the end-of-input sentinel.
pub fn document<'s>(c: Cursor<'s>) -> Reply<'s, Document> {
    map(
        seq((first_section, many0(section), end_of_input())),
        |(first, rest, _)| {
            let mut sections = Vec::with_capacity(rest.len() + 1);
            sections.push(first);
            sections.extend(rest);
            Document::new(sections)
        },
    )
    .try_parse(c)
}
