//! Effect data model

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::constants::{FF_PERIODIC, FF_RUMBLE, FF_SINE, FF_SQUARE, FF_TRIANGLE, WIRE_MAX_REPLAY_MS};
use crate::encoder::EncodeError;

/// Effect kinds this tool can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EffectKind {
    Rumble,
    Periodic,
}

impl EffectKind {
    /// Linux `FF_*` type code.
    pub fn code(self) -> u16 {
        match self {
            EffectKind::Rumble => FF_RUMBLE,
            EffectKind::Periodic => FF_PERIODIC,
        }
    }

    /// Name as printed by the kernel headers, e.g. `FF_RUMBLE`.
    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Rumble => "FF_RUMBLE",
            EffectKind::Periodic => "FF_PERIODIC",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Periodic waveform shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

impl Waveform {
    pub fn code(self) -> u16 {
        match self {
            Waveform::Sine => FF_SINE,
            Waveform::Triangle => FF_TRIANGLE,
            Waveform::Square => FF_SQUARE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
        }
    }
}

impl FromStr for Waveform {
    type Err = EncodeError;

    /// Exact, case-sensitive match on `sine`, `triangle` or `square`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sine" => Ok(Waveform::Sine),
            "triangle" => Ok(Waveform::Triangle),
            "square" => Ok(Waveform::Square),
            other => Err(EncodeError::UnknownWaveform(other.to_owned())),
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attack/fade shaping of a periodic effect's magnitude.
///
/// All-zero means no shaping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Envelope {
    /// Ramp-in time in ms
    pub attack_length: u16,
    /// Level at the start of the attack
    pub attack_level: u16,
    /// Ramp-out time in ms
    pub fade_length: u16,
    /// Level at the end of the fade
    pub fade_level: u16,
}

impl Envelope {
    pub fn is_flat(&self) -> bool {
        *self == Self::default()
    }
}

/// Dual-motor rumble strengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RumbleParams {
    pub strong_magnitude: u16,
    pub weak_magnitude: u16,
}

/// Periodic waveform parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodicParams {
    pub waveform: Waveform,
    /// Period in ms
    pub period: u16,
    pub magnitude: i16,
    pub offset: i16,
    /// Sent to the device as the raw `u16` bit pattern
    pub phase: i16,
    pub envelope: Envelope,
}

/// Type-specific part of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EffectPayload {
    Rumble(RumbleParams),
    Periodic(PeriodicParams),
}

/// Identifier the device assigned to an uploaded effect.
///
/// Opaque to everything except the device adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeviceEffectId(i16);

impl DeviceEffectId {
    pub fn new(raw: i16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> i16 {
        self.0
    }
}

impl fmt::Display for DeviceEffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete effect description, ready to be uploaded.
///
/// `device_id` is `None` until the device adapter has accepted the upload.
///
/// # Examples
///
/// ```
/// use openracing_fftune::{EffectKind, EffectRecord, RumbleParams};
///
/// let record = EffectRecord::rumble(500, RumbleParams { strong_magnitude: 0xffff, weak_magnitude: 0 });
/// assert_eq!(record.kind(), EffectKind::Rumble);
/// assert!(record.device_id.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectRecord {
    pub duration_ms: u32,
    pub payload: EffectPayload,
    pub device_id: Option<DeviceEffectId>,
}

impl EffectRecord {
    pub fn rumble(duration_ms: u32, params: RumbleParams) -> Self {
        Self {
            duration_ms,
            payload: EffectPayload::Rumble(params),
            device_id: None,
        }
    }

    pub fn periodic(duration_ms: u32, params: PeriodicParams) -> Self {
        Self {
            duration_ms,
            payload: EffectPayload::Periodic(params),
            device_id: None,
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self.payload {
            EffectPayload::Rumble(_) => EffectKind::Rumble,
            EffectPayload::Periodic(_) => EffectKind::Periodic,
        }
    }

    /// Copy of this record carrying the device-assigned id.
    pub fn with_device_id(self, id: DeviceEffectId) -> Self {
        Self {
            device_id: Some(id),
            ..self
        }
    }

    /// `ff_replay.length` for this record, saturated at the wire ceiling.
    pub fn wire_replay_length(&self) -> u16 {
        u16::try_from(self.duration_ms)
            .unwrap_or(u16::MAX)
            .min(WIRE_MAX_REPLAY_MS)
    }
}
