//! Generic PEG operators over the [`Rule`] contract.
//!
//! Every rule is a function from a [`Cursor`] to a [`Reply`]:
//! - `Ok(Some((value, next)))`: matched, `next` is past the consumed input;
//! - `Ok(None)`: no match, nothing consumed;
//! - `Err(_)`: a structural error that aborts the whole parse.
//!
//! Because cursors are `Copy` and failure returns no cursor at all, a rule
//! cannot leak partial consumption to its caller.

use super::cursor::{Cursor, SENTINEL};
use super::error::ParseError;

/// Outcome of one rule application.
pub type Reply<'s, T> = Result<Option<(T, Cursor<'s>)>, ParseError>;

/// Anything that can attempt a parse at a cursor.
pub trait Rule<'s, T> {
    fn try_parse(&self, cursor: Cursor<'s>) -> Reply<'s, T>;
}

impl<'s, T, F> Rule<'s, T> for F
where
    F: Fn(Cursor<'s>) -> Reply<'s, T>,
{
    fn try_parse(&self, cursor: Cursor<'s>) -> Reply<'s, T> {
        self(cursor)
    }
}

// ============================================================================
// SYMBOLS
// ============================================================================

/// One symbol satisfying `pred`.
pub fn satisfy<'s, P>(pred: P) -> impl Fn(Cursor<'s>) -> Reply<'s, char>
where
    P: Fn(char) -> bool,
{
    move |cursor: Cursor<'s>| {
        let mut branch = cursor.branch();
        match branch.next() {
            Some(ch) if pred(ch) => Ok(Some((ch, branch))),
            _ => Ok(None),
        }
    }
}

/// One symbol from a fixed set.
pub fn one_of<'s>(set: &'static str) -> impl Fn(Cursor<'s>) -> Reply<'s, char> {
    satisfy(move |ch| set.contains(ch))
}

/// An exact literal.
pub fn tag<'s>(literal: &'static str) -> impl Fn(Cursor<'s>) -> Reply<'s, &'s str> {
    move |cursor: Cursor<'s>| {
        let mut branch = cursor.branch();
        for expected in literal.chars() {
            if branch.next() != Some(expected) {
                return Ok(None);
            }
        }
        Ok(Some((cursor.slice_to(&branch), branch)))
    }
}

/// The end-of-input sentinel itself.
pub fn end_of_input<'s>() -> impl Fn(Cursor<'s>) -> Reply<'s, char> {
    satisfy(|ch| ch == SENTINEL)
}

// ============================================================================
// SEQUENCE & ALTERNATIVES
// ============================================================================

/// A tuple of rules applied one after another.
pub trait Sequence<'s, T> {
    fn parse_all(&self, cursor: Cursor<'s>) -> Reply<'s, T>;
}

/// A tuple of rules tried in order, first success wins.
pub trait Alternatives<'s, T> {
    fn parse_first(&self, cursor: Cursor<'s>) -> Reply<'s, T>;
}

macro_rules! impl_sequence {
    ($($rule:ident $var:ident $out:ident),+) => {
        impl<'s, $($rule, $out),+> Sequence<'s, ($($out,)+)> for ($($rule,)+)
        where
            $($rule: Rule<'s, $out>),+
        {
            fn parse_all(&self, cursor: Cursor<'s>) -> Reply<'s, ($($out,)+)> {
                let ($($var,)+) = self;
                let mut branch = cursor.branch();
                let values = ($(
                    {
                        let Some((value, next)) = $var.try_parse(branch)? else {
                            return Ok(None);
                        };
                        branch = next;
                        value
                    },
                )+);
                Ok(Some((values, branch)))
            }
        }
    };
}

macro_rules! impl_alternatives {
    ($($rule:ident $var:ident),+) => {
        impl<'s, T, $($rule),+> Alternatives<'s, T> for ($($rule,)+)
        where
            $($rule: Rule<'s, T>),+
        {
            fn parse_first(&self, cursor: Cursor<'s>) -> Reply<'s, T> {
                let ($($var,)+) = self;
                $(
                    if let Some(found) = $var.try_parse(cursor)? {
                        return Ok(Some(found));
                    }
                )+
                Ok(None)
            }
        }
    };
}

impl_sequence!(A a TA, B b TB);
impl_sequence!(A a TA, B b TB, C c TC);
impl_sequence!(A a TA, B b TB, C c TC, D d TD);
impl_sequence!(A a TA, B b TB, C c TC, D d TD, E e TE);
impl_sequence!(A a TA, B b TB, C c TC, D d TD, E e TE, F f TF);
impl_sequence!(A a TA, B b TB, C c TC, D d TD, E e TE, F f TF, G g TG);
impl_sequence!(A a TA, B b TB, C c TC, D d TD, E e TE, F f TF, G g TG, H h TH);

impl_alternatives!(A a, B b);
impl_alternatives!(A a, B b, C c);
impl_alternatives!(A a, B b, C c, D d);

/// All rules in order; any failure discards the whole sequence.
pub fn seq<'s, T, S>(rules: S) -> impl Fn(Cursor<'s>) -> Reply<'s, T>
where
    S: Sequence<'s, T>,
{
    move |cursor: Cursor<'s>| rules.parse_all(cursor)
}

/// Ordered choice. No longest-match: the first alternative that matches wins.
pub fn alt<'s, T, A>(alternatives: A) -> impl Fn(Cursor<'s>) -> Reply<'s, T>
where
    A: Alternatives<'s, T>,
{
    move |cursor: Cursor<'s>| alternatives.parse_first(cursor)
}

// ============================================================================
// REPETITION & LOOKAHEAD
// ============================================================================

/// Never fails; `None` marks absence and consumes nothing.
pub fn opt<'s, T, R>(rule: R) -> impl Fn(Cursor<'s>) -> Reply<'s, Option<T>>
where
    R: Rule<'s, T>,
{
    move |cursor: Cursor<'s>| match rule.try_parse(cursor)? {
        Some((value, next)) => Ok(Some((Some(value), next))),
        None => Ok(Some((None, cursor))),
    }
}

/// Greedy repetition. Stops at the first failure or at a zero-width match,
/// and never revisits an item once it has matched.
pub fn many0<'s, T, R>(rule: R) -> impl Fn(Cursor<'s>) -> Reply<'s, Vec<T>>
where
    R: Rule<'s, T>,
{
    move |cursor: Cursor<'s>| {
        let mut items = Vec::new();
        let mut branch = cursor.branch();
        while let Some((item, next)) = rule.try_parse(branch)? {
            if next.pos() == branch.pos() {
                break;
            }
            items.push(item);
            branch = next;
        }
        Ok(Some((items, branch)))
    }
}

/// Like [`many0`], but fails unless at least one item matched.
pub fn many1<'s, T, R>(rule: R) -> impl Fn(Cursor<'s>) -> Reply<'s, Vec<T>>
where
    R: Rule<'s, T>,
{
    let repeat = many0(rule);
    move |cursor: Cursor<'s>| match repeat(cursor)? {
        Some((items, next)) if !items.is_empty() => Ok(Some((items, next))),
        _ => Ok(None),
    }
}

/// Negative lookahead: zero-width, matches iff `rule` does not.
pub fn not<'s, T, R>(rule: R) -> impl Fn(Cursor<'s>) -> Reply<'s, ()>
where
    R: Rule<'s, T>,
{
    move |cursor: Cursor<'s>| match rule.try_parse(cursor)? {
        Some(_) => Ok(None),
        None => Ok(Some(((), cursor))),
    }
}

/// Positive lookahead: zero-width, matches iff `rule` does.
pub fn peek<'s, T, R>(rule: R) -> impl Fn(Cursor<'s>) -> Reply<'s, T>
where
    R: Rule<'s, T>,
{
    move |cursor: Cursor<'s>| Ok(rule.try_parse(cursor)?.map(|(value, _)| (value, cursor)))
}

// ============================================================================
// TRANSFORMS
// ============================================================================

pub fn map<'s, T, U, R, F>(rule: R, f: F) -> impl Fn(Cursor<'s>) -> Reply<'s, U>
where
    R: Rule<'s, T>,
    F: Fn(T) -> U,
{
    move |cursor: Cursor<'s>| Ok(rule.try_parse(cursor)?.map(|(value, next)| (f(value), next)))
}

/// Keeps a match only if `check` accepts its value.
pub fn verify<'s, T, R, F>(rule: R, check: F) -> impl Fn(Cursor<'s>) -> Reply<'s, T>
where
    R: Rule<'s, T>,
    F: Fn(&T) -> bool,
{
    move |cursor: Cursor<'s>| Ok(rule.try_parse(cursor)?.filter(|(value, _)| check(value)))
}

/// The source text a rule consumed, discarding its value.
pub fn recognize<'s, T, R>(rule: R) -> impl Fn(Cursor<'s>) -> Reply<'s, &'s str>
where
    R: Rule<'s, T>,
{
    move |cursor: Cursor<'s>| {
        Ok(rule
            .try_parse(cursor)?
            .map(|(_, next)| (cursor.slice_to(&next), next)))
    }
}
