//! Time expressions: durations written inside instruction text, the
//! `H:MM` / plain-minutes values a cook types into a timer, and the ISO-8601
//! durations found in recipe metadata.
//!
//! Instruction text is read with a small grammar rather than a pattern
//! cascade:
//!
//! ```text
//! duration  := hours (joiner* minutes)? | minutes
//! hours     := quantity "-"? ("hour" | "hours" | "hr" | "hrs")
//! minutes   := quantity "-"? ("minute" | "minutes" | "min" | "mins")
//! joiner    := "and" | "," | "&"
//! quantity  := digits ("." digits)?
//! ```
//!
//! A quantity without a unit word never produces a duration, so step
//! ordinals such as `"5"` are ignored.

use crate::model::Duration;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Hour,
    Minute,
}

impl Unit {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "hour" | "hours" | "hr" | "hrs" => Some(Unit::Hour),
            "minute" | "minutes" | "min" | "mins" => Some(Unit::Minute),
            _ => None,
        }
    }

    fn seconds(self) -> f64 {
        match self {
            Unit::Hour => 3600.0,
            Unit::Minute => 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Word(String),
    Hyphen,
    Joiner,
    Other,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() {
            let mut end = start;
            let mut seen_dot = false;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    end = i + d.len_utf8();
                    chars.next();
                } else if d == '.' && !seen_dot {
                    // Only a decimal point when a digit follows.
                    let next_is_digit = text[i + 1..]
                        .chars()
                        .next()
                        .is_some_and(|n| n.is_ascii_digit());
                    if !next_is_digit {
                        break;
                    }
                    seen_dot = true;
                    end = i + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            let kind = text[start..end]
                .parse::<f64>()
                .map(TokenKind::Number)
                .unwrap_or(TokenKind::Other);
            tokens.push(Token { kind, start, end });
        } else if c.is_alphabetic() {
            let mut end = start;
            while let Some(&(i, a)) = chars.peek() {
                if a.is_alphabetic() {
                    end = i + a.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let word = text[start..end].to_lowercase();
            let kind = if word == "and" {
                TokenKind::Joiner
            } else {
                TokenKind::Word(word)
            };
            tokens.push(Token { kind, start, end });
        } else {
            chars.next();
            let kind = match c {
                '-' | '\u{2010}' | '\u{2011}' => TokenKind::Hyphen,
                ',' | '&' => TokenKind::Joiner,
                _ => TokenKind::Other,
            };
            tokens.push(Token {
                kind,
                start,
                end: start + c.len_utf8(),
            });
        }
    }

    tokens
}

/// A single `quantity unit` phrase starting at token `index`.
struct UnitPhrase {
    unit: Unit,
    quantity: f64,
    /// Index of the first token after the phrase.
    next: usize,
}

fn unit_phrase(tokens: &[Token], index: usize) -> Option<UnitPhrase> {
    let TokenKind::Number(quantity) = tokens.get(index)?.kind else {
        return None;
    };
    let mut cursor = index + 1;
    if matches!(tokens.get(cursor)?.kind, TokenKind::Hyphen) {
        cursor += 1;
    }
    match &tokens.get(cursor)?.kind {
        TokenKind::Word(word) => Unit::from_word(word).map(|unit| UnitPhrase {
            unit,
            quantity,
            next: cursor + 1,
        }),
        _ => None,
    }
}

/// Finds every duration phrase in `text`, left to right.
///
/// An hour phrase immediately followed by a minute phrase (optionally joined
/// by "and", a comma or "&") is read as one combined duration, so
/// `"1 hour and 15 minutes"` yields a single 4500 second value.
pub fn extract_durations_from_instruction(text: &str) -> Vec<Duration> {
    let tokens = tokenize(text);
    let mut durations = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        let Some(phrase) = unit_phrase(&tokens, index) else {
            index += 1;
            continue;
        };

        let start = tokens[index].start;
        let mut seconds = phrase.quantity * phrase.unit.seconds();
        let mut next = phrase.next;

        if phrase.unit == Unit::Hour {
            let mut lookahead = next;
            while matches!(tokens.get(lookahead).map(|t| &t.kind), Some(TokenKind::Joiner)) {
                lookahead += 1;
            }
            if let Some(minutes) = unit_phrase(&tokens, lookahead) {
                if minutes.unit == Unit::Minute {
                    seconds += minutes.quantity * minutes.unit.seconds();
                    next = minutes.next;
                }
            }
        }

        let end = tokens[next - 1].end;
        let seconds = seconds.round() as u64;
        if seconds >= 1 {
            durations.push(Duration {
                seconds,
                source: text[start..end].to_string(),
            });
        }
        index = next;
    }

    durations
}

/// Why a hand-edited timer value was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableDurationError {
    #[error("duration is empty")]
    Empty,
    #[error("duration must be greater than zero")]
    Zero,
    #[error("duration must be minutes (\"45\") or hours:minutes (\"1:30\")")]
    Malformed,
}

impl EditableDurationError {
    /// Stable reason code for callers that branch on the failure.
    pub fn reason(&self) -> &'static str {
        match self {
            EditableDurationError::Empty => "empty",
            EditableDurationError::Zero => "zero",
            EditableDurationError::Malformed => "invalid",
        }
    }
}

fn parse_digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parses a timer value typed by the user.
///
/// A plain integer is minutes (`"200"` is 12000 seconds); `"H:MM"` is
/// hours and minutes (`"2:30"` is 9000 seconds). Zero is rejected in
/// either form.
pub fn parse_editable_duration_to_seconds(input: &str) -> Result<u64, EditableDurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EditableDurationError::Empty);
    }

    let minutes = match input.split_once(':') {
        Some((hours, minutes)) => {
            let hours = parse_digits(hours).ok_or(EditableDurationError::Malformed)?;
            if minutes.len() > 2 {
                return Err(EditableDurationError::Malformed);
            }
            let minutes = parse_digits(minutes).ok_or(EditableDurationError::Malformed)?;
            if minutes >= 60 {
                return Err(EditableDurationError::Malformed);
            }
            hours
                .checked_mul(60)
                .and_then(|h| h.checked_add(minutes))
                .ok_or(EditableDurationError::Malformed)?
        }
        None => parse_digits(input).ok_or(EditableDurationError::Malformed)?,
    };

    if minutes == 0 {
        return Err(EditableDurationError::Zero);
    }
    minutes.checked_mul(60).ok_or(EditableDurationError::Malformed)
}

/// Renders seconds the way a timer field shows them: plain minutes below an
/// hour, `H:MM` otherwise. Partial minutes are rounded up so a running timer
/// never displays less time than it has.
pub fn format_seconds_as_editable(seconds: u64) -> String {
    let minutes = seconds.div_ceil(60);
    if minutes < 60 {
        minutes.to_string()
    } else {
        format!("{}:{:02}", minutes / 60, minutes % 60)
    }
}

/// A human label for a duration, e.g. `1 hour 5 minutes`.
pub struct HumanDuration(pub u64);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.0 / 60;
        let (hours, minutes) = (minutes / 60, minutes % 60);
        let plural = |n: u64| if n == 1 { "" } else { "s" };
        match (hours, minutes) {
            (0, 0) => write!(f, "{} second{}", self.0, plural(self.0)),
            (0, m) => write!(f, "{m} minute{}", plural(m)),
            (h, 0) => write!(f, "{h} hour{}", plural(h)),
            (h, m) => write!(f, "{h} hour{} {m} minute{}", plural(h), plural(m)),
        }
    }
}

/// Converts an ISO-8601 duration such as `PT1H15M`, `P0DT45M` or
/// `PT5400.0S` to seconds.
///
/// Ranges like `PT15-20M` use the upper bound. Returns `None` for anything
/// unparseable or zero-length.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let value = value.trim().to_ascii_uppercase();
    let rest = value.strip_prefix('P')?;

    let mut total = 0.0;
    let mut in_time = false;
    let mut number = String::new();
    let mut matched = false;

    for c in rest.chars() {
        match c {
            'T' => {
                if !number.is_empty() {
                    return None;
                }
                in_time = true;
            }
            '0'..='9' | '.' | ',' => number.push(if c == ',' { '.' } else { c }),
            '-' => number.clear(),
            'W' | 'D' | 'H' | 'M' | 'S' => {
                let amount: f64 = number.parse().ok()?;
                number.clear();
                let factor = match (c, in_time) {
                    ('W', false) => 7.0 * 86_400.0,
                    ('D', false) => 86_400.0,
                    ('H', true) => 3600.0,
                    ('M', true) => 60.0,
                    ('S', true) => 1.0,
                    _ => return None,
                };
                total += amount * factor;
                matched = true;
            }
            _ => return None,
        }
    }

    if !matched || !number.is_empty() {
        return None;
    }
    let seconds = total.round() as u64;
    (seconds > 0).then_some(seconds)
}
