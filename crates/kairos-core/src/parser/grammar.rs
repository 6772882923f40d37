//! # Fallback Grammar
//!
//! Splits a free-form listing into time, date, timezone and noise fragments.
//! Every character must be covered by a fragment or by whitespace between
//! fragments, otherwise tokenization fails.
//!
//! At each position all alternatives are tried on a copy of the cursor and the
//! longest span wins. A typed fragment beats noise of the same length; two
//! typed fragments of the same length are reported as ambiguous.

use crate::error::GrammarError;
use crate::types::{
    DateFragment, Fragment, FragmentKind, Meridiem, TimeFragment, TimezoneLabel,
};

/// A fragment together with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The recognised fragment
    pub fragment: Fragment,
    /// Start byte offset in the original string
    pub start: usize,
    /// End byte offset in the original string
    pub end: usize,
    /// Token index in the sequence
    pub index: usize,
}

impl Token {
    /// The slice of `input` this token covers.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

/// Punctuation that may appear inside a noise word.
const NOISE_PUNCTUATION: &[char] = &[':', ';', ',', '(', ')'];

/// Separators between date components.
const DATE_SEPARATORS: &[char] = &['/', '.'];

/// Grammar engine over noisy date/time listings.
#[derive(Debug, Clone, Default)]
pub struct Grammar;

impl Grammar {
    /// Create a new grammar instance.
    pub fn new() -> Self {
        Self
    }

    /// Tokenize `input` into an ordered fragment sequence covering all of it.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::EmptyInput`] for blank input,
    /// [`GrammarError::NoMatch`] when some character cannot start any
    /// fragment, and [`GrammarError::Ambiguous`] when two typed fragments
    /// claim the same longest span.
    ///
    /// # Examples
    /// ```
    /// use kairos_core::parser::grammar::Grammar;
    /// use kairos_core::types::FragmentKind;
    ///
    /// let tokens = Grammar::new().tokenize("Thu, 12/02/10 8:00 PM PST").unwrap();
    /// let kinds: Vec<_> = tokens.iter().map(|t| t.fragment.kind()).collect();
    /// assert_eq!(
    ///     kinds,
    ///     [FragmentKind::Noise, FragmentKind::Date, FragmentKind::Time, FragmentKind::Timezone]
    /// );
    /// ```
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, GrammarError> {
        let mut cursor = Cursor::new(input);
        cursor.skip_whitespace();
        if cursor.is_at_end() {
            return Err(GrammarError::EmptyInput);
        }

        let mut tokens = Vec::new();
        while !cursor.is_at_end() {
            let (fragment, end) = next_fragment(cursor)?;
            tokens.push(Token {
                fragment,
                start: cursor.pos,
                end,
                index: tokens.len(),
            });
            cursor.pos = end;
            cursor.skip_whitespace();
        }

        Ok(tokens)
    }
}

/// Picks the fragment starting at `cursor`.
fn next_fragment(cursor: Cursor<'_>) -> Result<(Fragment, usize), GrammarError> {
    let candidates = [
        time(cursor).map(|(t, end)| (Fragment::Time(t), end)),
        date(cursor).map(|(d, end)| (Fragment::Date(d), end)),
        timezone(cursor).map(|(tz, end)| (Fragment::Timezone(tz), end)),
        noise(cursor).map(|end| (Fragment::Noise, end)),
    ];
    select(cursor, candidates.into_iter().flatten().collect())
}

/// Longest match wins; typed fragments beat noise on a tie; two typed
/// fragments on a tie are an error.
fn select(
    cursor: Cursor<'_>,
    candidates: Vec<(Fragment, usize)>,
) -> Result<(Fragment, usize), GrammarError> {
    let Some(longest) = candidates.iter().map(|(_, end)| *end).max() else {
        return Err(GrammarError::NoMatch {
            position: cursor.pos,
            remainder: cursor.rest().to_string(),
        });
    };

    let (mut typed, noise): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .filter(|(_, end)| *end == longest)
        .partition(|(fragment, _)| fragment.kind() != FragmentKind::Noise);

    match typed.len() {
        0 => noise.into_iter().next().ok_or_else(|| GrammarError::NoMatch {
            position: cursor.pos,
            remainder: cursor.rest().to_string(),
        }),
        1 => Ok(typed.swap_remove(0)),
        _ => Err(GrammarError::Ambiguous {
            position: cursor.pos,
            span: cursor.input.get(cursor.pos..longest).unwrap_or("").to_string(),
            first: typed[0].0.kind(),
            second: typed[1].0.kind(),
        }),
    }
}

/// Military `HHMM`, else `hour[:minutes[:seconds]] [am|pm]`.
fn time(start: Cursor<'_>) -> Option<(TimeFragment, usize)> {
    military(start).or_else(|| clock(start))
}

fn military(mut cursor: Cursor<'_>) -> Option<(TimeFragment, usize)> {
    let run = cursor.digit_run()?;
    if run.len() != 4 {
        return None;
    }
    let hour = run[..2].parse().ok()?;
    let minutes = run[2..].parse().ok()?;
    Some((TimeFragment::military(hour, minutes), cursor.pos))
}

fn clock(mut cursor: Cursor<'_>) -> Option<(TimeFragment, usize)> {
    let hour = cursor.short_number()?;
    let mut minutes = None;
    let mut seconds = None;

    if let Some((m, after_minutes)) = colon_field(cursor) {
        minutes = Some(m);
        cursor = after_minutes;
        if let Some((s, after_seconds)) = colon_field(cursor) {
            seconds = Some(s);
            cursor = after_seconds;
        }
    }

    let mut probe = cursor;
    probe.skip_whitespace();
    let mut ampm = None;
    for label in ["am", "pm"] {
        if probe.eat_word_caseless(label) {
            ampm = Meridiem::from_label(label);
            cursor = probe;
            break;
        }
    }

    Some((TimeFragment::clock(hour, minutes, seconds, ampm), cursor.pos))
}

/// `":" nn`, with optional whitespace around the colon.
fn colon_field(mut cursor: Cursor<'_>) -> Option<(u32, Cursor<'_>)> {
    cursor.skip_whitespace();
    if !cursor.eat(':') {
        return None;
    }
    cursor.skip_whitespace();
    let value = cursor.short_number()?;
    Some((value, cursor))
}

/// `month sep day [sep year]` with `sep` one of `/` or `.`.
fn date(mut cursor: Cursor<'_>) -> Option<(DateFragment, usize)> {
    let month = cursor.number()?;
    let day = separated_number(&mut cursor)?;
    let year = separated_number(&mut cursor);

    Some((DateFragment { month, day, year }, cursor.pos))
}

/// `sep number`; leaves `cursor` untouched on failure.
fn separated_number(cursor: &mut Cursor<'_>) -> Option<u32> {
    let mut probe = *cursor;
    probe.skip_whitespace();
    probe.eat_one_of(DATE_SEPARATORS)?;
    probe.skip_whitespace();
    let value = probe.number()?;
    *cursor = probe;
    Some(value)
}

fn timezone(cursor: Cursor<'_>) -> Option<(TimezoneLabel, usize)> {
    let rest = cursor.rest();
    TimezoneLabel::ALL
        .into_iter()
        .find(|tz| rest.starts_with(tz.as_str()))
        .map(|tz| (tz, cursor.pos + tz.as_str().len()))
}

fn noise(cursor: Cursor<'_>) -> Option<usize> {
    let len: usize = cursor
        .rest()
        .chars()
        .take_while(|c| c.is_alphanumeric() || NOISE_PUNCTUATION.contains(c))
        .map(char::len_utf8)
        .sum();
    (len > 0).then_some(cursor.pos + len)
}

/// Read position over the input. Copied freely; each alternative works on
/// its own copy so a failed attempt never moves the caller.
#[derive(Debug, Clone, Copy)]
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_one_of(&mut self, set: &[char]) -> Option<char> {
        let c = self.peek().filter(|c| set.contains(c))?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes `word` ignoring ASCII case, unless more letters or digits
    /// follow it directly.
    fn eat_word_caseless(&mut self, word: &str) -> bool {
        let rest = self.rest();
        let Some(head) = rest.get(..word.len()) else {
            return false;
        };
        if !head.eq_ignore_ascii_case(word) {
            return false;
        }
        let runs_on = rest[word.len()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        if runs_on {
            return false;
        }
        self.pos += word.len();
        true
    }

    /// The maximal run of ASCII digits at the cursor.
    fn digit_run(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// A whole digit run of any length that fits in a `u32`.
    fn number(&mut self) -> Option<u32> {
        let mut probe = *self;
        let value = probe.digit_run()?.parse().ok()?;
        *self = probe;
        Some(value)
    }

    /// A whole digit run of one or two digits.
    fn short_number(&mut self) -> Option<u32> {
        let mut probe = *self;
        let run = probe.digit_run()?;
        if run.len() > 2 {
            return None;
        }
        let value = run.parse().ok()?;
        *self = probe;
        Some(value)
    }
}
