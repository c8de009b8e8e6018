//! Section shape checks and the dead-end loop walk.
//!
//! The walk is a depth-first search over the goto-graph that keeps the
//! current path as an explicit stack of frames, so document length never
//! turns into call depth. Each frame holds its section's exits, the next
//! one to follow, whether the section has already found a way to the
//! terminal section and whether it still has unexplored exits (an "open
//! lead"). When a goto closes a loop back onto the path, the loop is
//! accepted as long as some section inside it still has an exit or an open
//! lead; otherwise no walk can ever leave.
//!
//! Sections left unresolved by an accepted loop wait on a pending stack
//! until the head of their loop finishes, at which point the whole group
//! is either live or a dead end.

use tracing::{debug, trace};

use super::{LocatedError, SectionIndex, ValidationError};
use crate::ast::{Choice, Document};

/// Walks every section, starting with the first one.
pub fn check(document: &Document, index: &SectionIndex) -> Result<(), LocatedError> {
    let mut walk = Walk::new(document, index);
    for position in 0..document.sections().len() {
        if matches!(walk.states[position], State::Unvisited) {
            walk.run(position)?;
        }
    }
    Ok(())
}

/// The resolved goto targets a section can leave through, in order.
///
/// Choice blocks are scanned until one has no choice that falls through;
/// anything after it can never run.
pub fn exits(
    document: &Document,
    index: &SectionIndex,
    position: usize,
) -> Result<Vec<usize>, ValidationError> {
    let Some(section) = document.section(position) else {
        return Ok(Vec::new());
    };
    let terminal = document.terminal_index() == Some(position);
    let label = || section.label().to_string();

    let mut blocks = section.choice_blocks().peekable();
    if blocks.peek().is_none() {
        return if terminal {
            Ok(Vec::new())
        } else {
            Err(ValidationError::ChoicelessNonTerminalSection(label()))
        };
    }

    let mut targets = Vec::new();
    let mut stopped = false;
    for (_, choices) in blocks {
        targets.extend(
            choices
                .iter()
                .filter_map(Choice::goto)
                .filter_map(|goto| index.resolve(goto)),
        );
        if !choices.iter().any(Choice::falls_through) {
            stopped = true;
            break;
        }
    }

    match (terminal, stopped) {
        (true, true) => Err(ValidationError::TerminalSectionMustFallThrough(label())),
        (false, false) => Err(ValidationError::NonFallthroughNonTerminalSection(label())),
        _ => Ok(targets),
    }
}

// ============================================================================
// WALK STATE
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum State {
    Unvisited,
    /// On the current path, at this depth.
    OnPath(usize),
    /// Finished, but part of a loop whose head is still on the path.
    Pending { low: usize },
    /// Known to reach the terminal section.
    Live,
}

#[derive(Debug)]
struct Frame {
    section: usize,
    targets: Vec<usize>,
    /// Index into `targets` of the next exit to follow.
    next: usize,
    found_exit: bool,
    open_lead: bool,
    /// Shallowest path depth this section's subtree loops back to.
    low: usize,
}

struct Walk<'a> {
    document: &'a Document,
    index: &'a SectionIndex,
    states: Vec<State>,
    path: Vec<Frame>,
    pending: Vec<usize>,
}

impl<'a> Walk<'a> {
    fn new(document: &'a Document, index: &'a SectionIndex) -> Self {
        Self {
            document,
            index,
            states: vec![State::Unvisited; document.sections().len()],
            path: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn label(&self, position: usize) -> String {
        self.document
            .section(position)
            .map(|section| section.label().to_string())
            .unwrap_or_default()
    }

    /// Walks everything reachable from `root` until the path is empty again.
    fn run(&mut self, root: usize) -> Result<(), LocatedError> {
        self.enter(root)?;
        while let Some(depth) = self.path.len().checked_sub(1) {
            let frame = &mut self.path[depth];
            let Some(&target) = frame.targets.get(frame.next) else {
                self.finish(depth)?;
                continue;
            };
            frame.next += 1;
            frame.open_lead = frame.next < frame.targets.len();

            match self.states[target] {
                State::Unvisited => self.enter(target)?,
                State::Live => self.path[depth].found_exit = true,
                State::Pending { low } => {
                    let frame = &mut self.path[depth];
                    frame.low = frame.low.min(low);
                }
                State::OnPath(at) => self.close_loop(at)?,
            }
        }
        Ok(())
    }

    /// Pushes a frame for `section` onto the path.
    fn enter(&mut self, section: usize) -> Result<(), LocatedError> {
        let targets = exits(self.document, self.index, section)
            .map_err(|error| LocatedError::at(section, error))?;
        let depth = self.path.len();
        trace!(section = %self.label(section), depth, "visit");

        self.states[section] = State::OnPath(depth);
        self.pending.push(section);
        self.path.push(Frame {
            section,
            targets,
            next: 0,
            found_exit: self.document.terminal_index() == Some(section),
            open_lead: false,
            low: depth,
        });
        Ok(())
    }

    /// A goto from the top of the path back to depth `at`.
    fn close_loop(&mut self, at: usize) -> Result<(), LocatedError> {
        let Some(top) = self.path.last_mut() else {
            return Ok(());
        };
        top.low = top.low.min(at);
        let current = top.section;

        // Sections inside the loop may already depend on shallower ones.
        let mut start = at;
        loop {
            let widened = self.path[start..]
                .iter()
                .map(|frame| frame.low)
                .fold(start, usize::min);
            if widened == start {
                break;
            }
            start = widened;
        }

        let escapable = self.path[start..]
            .iter()
            .any(|frame| frame.found_exit || frame.open_lead);
        debug!(
            from = %self.label(current),
            to = %self.label(self.path[at].section),
            loop_start = start,
            escapable,
            "loop closed"
        );
        if escapable {
            Ok(())
        } else {
            Err(self.dead_end(current))
        }
    }

    fn finish(&mut self, depth: usize) -> Result<(), LocatedError> {
        let Some(frame) = self.path.pop() else {
            return Ok(());
        };

        if frame.low < depth {
            self.states[frame.section] = State::Pending { low: frame.low };
            if let Some(parent) = self.path.last_mut() {
                parent.low = parent.low.min(frame.low);
                parent.found_exit |= frame.found_exit;
            }
            return Ok(());
        }

        if !frame.found_exit {
            return Err(self.dead_end(frame.section));
        }
        while let Some(member) = self.pending.pop() {
            self.states[member] = State::Live;
            if member == frame.section {
                break;
            }
        }
        if let Some(parent) = self.path.last_mut() {
            parent.found_exit = true;
        }
        Ok(())
    }

    fn dead_end(&self, section: usize) -> LocatedError {
        LocatedError::at(section, ValidationError::DeadEndLoop(self.label(section)))
    }
}
