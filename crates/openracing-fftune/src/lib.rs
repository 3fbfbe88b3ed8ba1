//! Force feedback effect tuning core.
//!
//! This crate turns human-entered effect parameters into validated effect
//! records, keeps them in a fixed-capacity effect table and drives their
//! upload/play/stop/remove lifecycle against a force feedback device.
//!
//! # Architecture
//!
//! - [`params`]: lenient numeric token validation (clamping, defaulting)
//! - [`effect`]: effect data model (rumble, periodic + envelope)
//! - [`encoder`]: positional token sequences to [`EffectRecord`]s
//! - [`table`]: dense, 32-slot effect table
//! - [`device`]: the [`FfDevice`] adapter trait and capability set
//! - [`wire`]: bit-exact Linux `ff_effect` / `input_event` layouts
//! - [`mock`]: in-memory device for tests and dry runs
//! - [`context`]: [`FfTune`] session tying table and device together
//! - [`dispatch`]: shell verbs to session operations
//!
//! # Example
//!
//! ```
//! use openracing_fftune::{FfTune, mock::MockFfDevice};
//!
//! # fn main() -> Result<(), openracing_fftune::FfTuneError> {
//! let mut tune = FfTune::new(MockFfDevice::new("dry-run"))?;
//! let added = tune.add("r:", &["500", "0xffff", "0xffff"])?;
//! assert_eq!(added.slot, 0);
//!
//! tune.run(0)?;
//! tune.stop(0)?;
//! tune.remove(0)?;
//! assert!(tune.table().is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod constants;
pub mod context;
pub mod device;
pub mod dispatch;
pub mod effect;
pub mod encoder;
pub mod error;
pub mod mock;
pub mod params;
pub mod table;
pub mod wire;

pub use context::{AddOutcome, FfTune};
pub use device::{DeviceError, FfCapabilities, FfDevice, FfFeature};
pub use dispatch::{Command, Reply, dispatch};
pub use effect::{
    DeviceEffectId, EffectKind, EffectPayload, EffectRecord, Envelope, PeriodicParams,
    RumbleParams, Waveform,
};
pub use encoder::{EncodeError, Encoded, encode_effect, encode_periodic, encode_rumble};
pub use error::{ErrorCategory, FfTuneError};
pub use params::{ParamNote, ParamNoteKind, TokenCursor, Validated, parse_integer, validate};
pub use table::{EffectSummary, EffectTable, TableError};

/// A specialized `Result` type for effect tuning operations.
pub type Result<T> = std::result::Result<T, FfTuneError>;
