//! Parameter validation for effect tokens.
//!
//! Numeric tokens are parsed leniently: anything malformed becomes `0` and
//! anything out of range is clamped to the nearest bound. Both cases produce
//! a [`ParamNote`] so the shell can tell the user what was changed. Only a
//! missing token is an error, because it means the command itself is
//! malformed.

use core::fmt;
use core::num::IntErrorKind;

use serde::Serialize;
use tracing::debug;

use crate::encoder::EncodeError;

/// Parse a signed integer the way `strtol(.., 0)` picks its base.
///
/// Accepts an optional sign followed by `0x`/`0X` hex, leading-`0` octal or
/// decimal digits. The whole token must be consumed. Values beyond the `i64`
/// range saturate to `i64::MIN`/`i64::MAX` so callers can still clamp them.
///
/// # Examples
///
/// ```
/// use openracing_fftune::parse_integer;
///
/// assert_eq!(parse_integer("500"), Some(500));
/// assert_eq!(parse_integer("0xffff"), Some(0xffff));
/// assert_eq!(parse_integer("-010"), Some(-8));
/// assert_eq!(parse_integer("12ms"), None);
/// assert_eq!(parse_integer("99999999999999999999"), Some(i64::MAX));
/// ```
pub fn parse_integer(token: &str) -> Option<i64> {
    let (negative, digits) = if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = token.strip_prefix('+') {
        (false, rest)
    } else {
        (false, token)
    };

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, digits.get(1..)?)
    } else {
        (10, digits)
    };

    // from_str_radix tolerates a sign of its own
    if body.is_empty() || body.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = match u64::from_str_radix(body, radix) {
        Ok(magnitude) => magnitude,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => u64::MAX,
        Err(_) => return None,
    };
    Some(if negative {
        0_i64.checked_sub_unsigned(magnitude).unwrap_or(i64::MIN)
    } else {
        i64::try_from(magnitude).unwrap_or(i64::MAX)
    })
}

/// What the validator changed about a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamNoteKind {
    /// The token was not a number; the default was substituted
    NotANumber { value: i64 },
    /// The value was above the field maximum
    AboveMax { max: i64 },
    /// The value was below the field minimum
    BelowMin { min: i64 },
}

/// Diagnostic for a token that was defaulted or clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamNote {
    pub field: &'static str,
    pub token: String,
    pub kind: ParamNoteKind,
}

impl ParamNote {
    /// The value that was used instead of the token.
    pub fn applied(&self) -> i64 {
        match self.kind {
            ParamNoteKind::NotANumber { value } => value,
            ParamNoteKind::AboveMax { max } => max,
            ParamNoteKind::BelowMin { min } => min,
        }
    }
}

impl fmt::Display for ParamNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamNoteKind::NotANumber { value } => write!(
                f,
                "{}: '{}' is not a number, using {value}",
                self.field, self.token
            ),
            ParamNoteKind::AboveMax { max } => write!(
                f,
                "{}: {} too high, changing to maximum value {max}",
                self.field, self.token
            ),
            ParamNoteKind::BelowMin { min } => write!(
                f,
                "{}: {} too small, changing to minimum value {min}",
                self.field, self.token
            ),
        }
    }
}

/// A validated value and the note explaining any adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub value: i64,
    pub note: Option<ParamNote>,
}

/// Validate `token` against the inclusive range `[min, max]`.
///
/// Never fails. Unparseable tokens yield `0` (pulled into range when `0`
/// is outside it), out-of-range values yield the violated bound.
///
/// # Examples
///
/// ```
/// use openracing_fftune::{validate, ParamNoteKind};
///
/// let v = validate("strong_magnitude", "0x10000", 0, 0xffff);
/// assert_eq!(v.value, 0xffff);
/// assert!(matches!(v.note.map(|n| n.kind), Some(ParamNoteKind::AboveMax { max: 0xffff })));
/// ```
pub fn validate(field: &'static str, token: &str, min: i64, max: i64) -> Validated {
    let kind = match parse_integer(token) {
        None => ParamNoteKind::NotANumber {
            value: 0_i64.max(min).min(max),
        },
        Some(raw) if raw > max => ParamNoteKind::AboveMax { max },
        Some(raw) if raw < min => ParamNoteKind::BelowMin { min },
        Some(raw) => {
            return Validated {
                value: raw,
                note: None,
            };
        }
    };

    let note = ParamNote {
        field,
        token: token.to_owned(),
        kind,
    };
    debug!(field, token, "{note}");
    Validated {
        value: note.applied(),
        note: Some(note),
    }
}

/// Explicit cursor over the positional argument tail of an `add` command.
///
/// Collects a [`ParamNote`] for every adjusted token.
#[derive(Debug)]
pub struct TokenCursor<'a, S> {
    tokens: &'a [S],
    position: usize,
    notes: Vec<ParamNote>,
}

impl<'a, S: AsRef<str>> TokenCursor<'a, S> {
    pub fn new(tokens: &'a [S]) -> Self {
        Self {
            tokens,
            position: 0,
            notes: Vec::new(),
        }
    }

    /// Next raw token, or [`EncodeError::MissingToken`] naming `field`.
    pub fn next_required(&mut self, field: &'static str) -> Result<&'a str, EncodeError> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or(EncodeError::MissingToken { field })?;
        self.position = self.position.saturating_add(1);
        Ok(token.as_ref())
    }

    /// Next token validated against `[min, max]`.
    pub fn take_bounded(
        &mut self,
        field: &'static str,
        min: i64,
        max: i64,
    ) -> Result<i64, EncodeError> {
        let token = self.next_required(field)?;
        let validated = validate(field, token, min, max);
        self.notes.extend(validated.note);
        Ok(validated.value)
    }

    pub fn take_u16(&mut self, field: &'static str) -> Result<u16, EncodeError> {
        let value = self.take_bounded(field, 0, i64::from(u16::MAX))?;
        Ok(u16::try_from(value).unwrap_or(u16::MAX))
    }

    pub fn take_i16(&mut self, field: &'static str) -> Result<i16, EncodeError> {
        let value = self.take_bounded(field, i64::from(i16::MIN), i64::from(i16::MAX))?;
        Ok(i16::try_from(value).unwrap_or(if value < 0 { i16::MIN } else { i16::MAX }))
    }

    /// Duration in milliseconds within `[0, max_ms]`.
    pub fn take_duration(&mut self, field: &'static str, max_ms: u32) -> Result<u32, EncodeError> {
        let value = self.take_bounded(field, 0, i64::from(max_ms))?;
        Ok(u32::try_from(value).unwrap_or(max_ms))
    }

    /// Tokens not consumed yet.
    pub fn remaining(&self) -> &'a [S] {
        self.tokens.get(self.position..).unwrap_or_default()
    }

    pub fn notes(&self) -> &[ParamNote] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<ParamNote> {
        self.notes
    }
}
