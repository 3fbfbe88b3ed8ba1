//! Effect encoding from positional `add` tokens.
//!
//! Token order:
//!
//! ```text
//! r: <ms> <strong_magnitude> <weak_magnitude>
//! p: <sine|triangle|square> <ms> <period> <magnitude> <offset> <phase>
//!    <attack_length> <attack_level> <fade_length> <fade_level>
//! ```
//!
//! Numeric fields are validated leniently (see [`crate::params`]). A missing
//! token, an unknown waveform or an unknown kind tag aborts the whole record.

use tracing::debug;

use crate::constants::{PERIODIC_MAX_DURATION_MS, PERIODIC_TAG, RUMBLE_MAX_DURATION_MS, RUMBLE_TAG};
use crate::effect::{EffectRecord, Envelope, PeriodicParams, RumbleParams, Waveform};
use crate::params::{ParamNote, TokenCursor};

/// Structural problems that make an `add` command unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// The argument list ended before `field`
    #[error("missing value for '{field}'")]
    MissingToken { field: &'static str },

    /// Waveform name other than sine, triangle or square
    #[error("unknown waveform '{0}', expected one of: sine, triangle, square")]
    UnknownWaveform(String),

    /// Kind tag other than `r:` or `p:`
    #[error("unknown effect kind '{0}', expected 'r:' or 'p:'")]
    UnknownKind(String),
}

/// An encoded record plus the notes for every adjusted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub record: EffectRecord,
    pub notes: Vec<ParamNote>,
}

/// Build a rumble record from `<ms> <strong> <weak>`.
///
/// # Errors
///
/// [`EncodeError::MissingToken`] when fewer than three tokens are given.
///
/// # Examples
///
/// ```
/// use openracing_fftune::{encode_rumble, EffectPayload};
///
/// # fn main() -> Result<(), openracing_fftune::EncodeError> {
/// let encoded = encode_rumble(&["500", "0xffff", "0xffff"])?;
/// assert_eq!(encoded.record.duration_ms, 500);
/// assert!(matches!(encoded.record.payload, EffectPayload::Rumble(r) if r.weak_magnitude == 0xffff));
/// # Ok(())
/// # }
/// ```
pub fn encode_rumble<S: AsRef<str>>(tokens: &[S]) -> Result<Encoded, EncodeError> {
    let mut cursor = TokenCursor::new(tokens);
    let duration_ms = cursor.take_duration("duration", RUMBLE_MAX_DURATION_MS)?;
    let params = RumbleParams {
        strong_magnitude: cursor.take_u16("strong_magnitude")?,
        weak_magnitude: cursor.take_u16("weak_magnitude")?,
    };
    finish(cursor, EffectRecord::rumble(duration_ms, params))
}

/// Build a periodic record from the ten positional periodic tokens.
///
/// # Errors
///
/// [`EncodeError::UnknownWaveform`] for a bad waveform name,
/// [`EncodeError::MissingToken`] when any field is absent.
pub fn encode_periodic<S: AsRef<str>>(tokens: &[S]) -> Result<Encoded, EncodeError> {
    let mut cursor = TokenCursor::new(tokens);
    let waveform: Waveform = cursor.next_required("waveform")?.parse()?;
    let duration_ms = cursor.take_duration("duration", PERIODIC_MAX_DURATION_MS)?;
    let period = cursor.take_u16("period")?;
    let magnitude = cursor.take_i16("magnitude")?;
    let offset = cursor.take_i16("offset")?;
    let phase = cursor.take_i16("phase")?;
    let envelope = Envelope {
        attack_length: cursor.take_u16("attack_length")?,
        attack_level: cursor.take_u16("attack_level")?,
        fade_length: cursor.take_u16("fade_length")?,
        fade_level: cursor.take_u16("fade_level")?,
    };

    let params = PeriodicParams {
        waveform,
        period,
        magnitude,
        offset,
        phase,
        envelope,
    };
    finish(cursor, EffectRecord::periodic(duration_ms, params))
}

/// Dispatch on the `r:` / `p:` kind tag.
///
/// # Errors
///
/// [`EncodeError::UnknownKind`] for any other tag, otherwise whatever the
/// kind-specific encoder reports.
pub fn encode_effect<S: AsRef<str>>(tag: &str, tokens: &[S]) -> Result<Encoded, EncodeError> {
    match tag {
        RUMBLE_TAG => encode_rumble(tokens),
        PERIODIC_TAG => encode_periodic(tokens),
        other => Err(EncodeError::UnknownKind(other.to_owned())),
    }
}

fn finish<S: AsRef<str>>(
    cursor: TokenCursor<'_, S>,
    record: EffectRecord,
) -> Result<Encoded, EncodeError> {
    let surplus = cursor.remaining().len();
    if surplus > 0 {
        debug!(surplus, kind = %record.kind(), "ignoring surplus effect tokens");
    }
    Ok(Encoded {
        record,
        notes: cursor.into_notes(),
    })
}
