//! Device protocol adapter.
//!
//! [`FfDevice`] is the only seam through which effects reach hardware. The
//! effect table never talks to a device directly; [`crate::FfTune`] calls
//! the adapter first and mutates the table only after the device confirmed.

use core::fmt;
use std::io;


use crate::constants::{
    FF_AUTOCENTER, FF_CONSTANT, FF_CUSTOM, FF_DAMPER, FF_FRICTION, FF_GAIN, FF_INERTIA, FF_MAX,
    FF_PERIODIC, FF_RAMP, FF_RUMBLE, FF_SAW_DOWN, FF_SAW_UP, FF_SINE, FF_SPRING, FF_SQUARE,
    FF_TRIANGLE,
};
use crate::effect::{DeviceEffectId, EffectKind, EffectRecord};

/// Device adapter errors.
///
/// Distinguishes a device that refused the request ([`DeviceError::Rejected`],
/// [`DeviceError::UnknownEffect`]) from a transport failure
/// ([`DeviceError::Io`]).
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Device refused the parameters or has no room for another effect
    #[error("device rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    /// Transport failure talking to the device
    #[error("I/O failure during {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// Device id the device does not know
    #[error("device has no effect with id {0}")]
    UnknownEffect(DeviceEffectId),

    /// Upload of a record that already carries a device id
    #[error("effect already has device id {0}")]
    AlreadyAssigned(DeviceEffectId),
}

impl DeviceError {
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        DeviceError::Rejected {
            operation,
            reason: reason.into(),
        }
    }

    /// Classify an OS error from a device call.
    ///
    /// Parameter and capacity refusals become [`DeviceError::Rejected`],
    /// anything else is a transport failure.
    pub fn from_io(operation: &'static str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::StorageFull | io::ErrorKind::Unsupported => {
                DeviceError::Rejected {
                    operation,
                    reason: source.to_string(),
                }
            }
            _ => DeviceError::Io { operation, source },
        }
    }

    /// The device understood the request and said no.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            DeviceError::Rejected { .. }
                | DeviceError::UnknownEffect(_)
                | DeviceError::AlreadyAssigned(_)
        )
    }

    /// The request may never have reached the device.
    pub fn is_transport(&self) -> bool {
        matches!(self, DeviceError::Io { .. })
    }
}

/// Force feedback features a device can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfFeature {
    Rumble,
    Periodic,
    Constant,
    Spring,
    Friction,
    Damper,
    Inertia,
    Ramp,
    Square,
    Triangle,
    Sine,
    SawUp,
    SawDown,
    Custom,
    Gain,
    Autocenter,
}

impl FfFeature {
    pub const ALL: [FfFeature; 16] = [
        FfFeature::Rumble,
        FfFeature::Periodic,
        FfFeature::Constant,
        FfFeature::Spring,
        FfFeature::Friction,
        FfFeature::Damper,
        FfFeature::Inertia,
        FfFeature::Ramp,
        FfFeature::Square,
        FfFeature::Triangle,
        FfFeature::Sine,
        FfFeature::SawUp,
        FfFeature::SawDown,
        FfFeature::Custom,
        FfFeature::Gain,
        FfFeature::Autocenter,
    ];

    pub fn code(self) -> u16 {
        match self {
            FfFeature::Rumble => FF_RUMBLE,
            FfFeature::Periodic => FF_PERIODIC,
            FfFeature::Constant => FF_CONSTANT,
            FfFeature::Spring => FF_SPRING,
            FfFeature::Friction => FF_FRICTION,
            FfFeature::Damper => FF_DAMPER,
            FfFeature::Inertia => FF_INERTIA,
            FfFeature::Ramp => FF_RAMP,
            FfFeature::Square => FF_SQUARE,
            FfFeature::Triangle => FF_TRIANGLE,
            FfFeature::Sine => FF_SINE,
            FfFeature::SawUp => FF_SAW_UP,
            FfFeature::SawDown => FF_SAW_DOWN,
            FfFeature::Custom => FF_CUSTOM,
            FfFeature::Gain => FF_GAIN,
            FfFeature::Autocenter => FF_AUTOCENTER,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|feature| feature.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            FfFeature::Rumble => "FF_RUMBLE",
            FfFeature::Periodic => "FF_PERIODIC",
            FfFeature::Constant => "FF_CONSTANT",
            FfFeature::Spring => "FF_SPRING",
            FfFeature::Friction => "FF_FRICTION",
            FfFeature::Damper => "FF_DAMPER",
            FfFeature::Inertia => "FF_INERTIA",
            FfFeature::Ramp => "FF_RAMP",
            FfFeature::Square => "FF_SQUARE",
            FfFeature::Triangle => "FF_TRIANGLE",
            FfFeature::Sine => "FF_SINE",
            FfFeature::SawUp => "FF_SAW_UP",
            FfFeature::SawDown => "FF_SAW_DOWN",
            FfFeature::Custom => "FF_CUSTOM",
            FfFeature::Gain => "FF_GAIN",
            FfFeature::Autocenter => "FF_AUTOCENTER",
        }
    }
}

impl From<EffectKind> for FfFeature {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Rumble => FfFeature::Rumble,
            EffectKind::Periodic => FfFeature::Periodic,
        }
    }
}

/// Bitset over the `FF_*` codes `0..=FF_MAX`.
///
/// # Examples
///
/// ```
/// use openracing_fftune::{FfCapabilities, FfFeature};
///
/// let caps = FfCapabilities::from_features([FfFeature::Rumble, FfFeature::Periodic]);
/// assert!(caps.supports_tuning());
/// assert_eq!(caps.to_string(), "FF_RUMBLE | FF_PERIODIC");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FfCapabilities {
    bits: u128,
}

impl FfCapabilities {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_features(features: impl IntoIterator<Item = FfFeature>) -> Self {
        Self::from_codes(features.into_iter().map(FfFeature::code))
    }

    /// Codes above `FF_MAX` are ignored.
    pub fn from_codes(codes: impl IntoIterator<Item = u16>) -> Self {
        let bits = codes
            .into_iter()
            .filter(|code| *code <= FF_MAX)
            .fold(0_u128, |bits, code| bits | (1_u128 << code));
        Self { bits }
    }

    pub fn with(self, feature: FfFeature) -> Self {
        Self {
            bits: self.bits | (1_u128 << feature.code()),
        }
    }

    pub fn contains_code(&self, code: u16) -> bool {
        code <= FF_MAX && (self.bits >> code) & 1 == 1
    }

    pub fn supports(&self, feature: FfFeature) -> bool {
        self.contains_code(feature.code())
    }

    /// Both effect kinds this tool builds are available.
    pub fn supports_tuning(&self) -> bool {
        self.supports(FfFeature::Rumble) && self.supports(FfFeature::Periodic)
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Known features in code order.
    pub fn iter(&self) -> impl Iterator<Item = FfFeature> + '_ {
        FfFeature::ALL
            .into_iter()
            .filter(|feature| self.supports(*feature))
    }
}

impl fmt::Display for FfCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for feature in self.iter() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(feature.name())?;
            first = false;
        }
        Ok(())
    }
}

/// A force feedback device, opened and owned exclusively by one session.
///
/// Calls are blocking and either fully succeed or fully fail.
pub trait FfDevice {
    /// Human-readable device name.
    fn name(&self) -> &str;

    /// Upload a new effect and return the id the device assigned.
    ///
    /// # Errors
    ///
    /// [`DeviceError::AlreadyAssigned`] when `record` already carries an id,
    /// otherwise whatever the device reports.
    fn upload(&mut self, record: &EffectRecord) -> Result<DeviceEffectId, DeviceError>;

    /// Erase an uploaded effect.
    ///
    /// # Errors
    ///
    /// [`DeviceError::UnknownEffect`] for ids the device does not hold.
    fn remove(&mut self, id: DeviceEffectId) -> Result<(), DeviceError>;

    /// Start (`true`) or stop (`false`) playback.
    ///
    /// # Errors
    ///
    /// [`DeviceError::UnknownEffect`] for ids the device does not hold.
    fn signal(&mut self, id: DeviceEffectId, start: bool) -> Result<(), DeviceError>;

    /// Supported force feedback features.
    ///
    /// # Errors
    ///
    /// Transport failures while querying.
    fn query_capabilities(&self) -> Result<FfCapabilities, DeviceError>;

    /// Number of effects the device can hold at once.
    fn max_simultaneous(&self) -> usize;
}

impl<D: FfDevice + ?Sized> FfDevice for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upload(&mut self, record: &EffectRecord) -> Result<DeviceEffectId, DeviceError> {
        (**self).upload(record)
    }

    fn remove(&mut self, id: DeviceEffectId) -> Result<(), DeviceError> {
        (**self).remove(id)
    }

    fn signal(&mut self, id: DeviceEffectId, start: bool) -> Result<(), DeviceError> {
        (**self).signal(id, start)
    }

    fn query_capabilities(&self) -> Result<FfCapabilities, DeviceError> {
        (**self).query_capabilities()
    }

    fn max_simultaneous(&self) -> usize {
        (**self).max_simultaneous()
    }
}
