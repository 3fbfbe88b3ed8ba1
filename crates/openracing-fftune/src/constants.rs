//! Effect table limits and Linux input force feedback codes

/// Number of slots in the effect table
pub const MAX_EFFECTS: usize = 32;

/// Longest accepted rumble duration in milliseconds
pub const RUMBLE_MAX_DURATION_MS: u32 = 0x7FFF_FFFF;

/// Longest accepted periodic duration in milliseconds
pub const PERIODIC_MAX_DURATION_MS: u32 = 0x7FFF;

/// Ceiling for `ff_replay.length` on the wire.
///
/// The kernel documents values above 0x7fff ms as unspecified.
pub const WIRE_MAX_REPLAY_MS: u16 = 0x7FFF;

/// Kind tag introducing a rumble effect on the `add` command line
pub const RUMBLE_TAG: &str = "r:";

/// Kind tag introducing a periodic effect on the `add` command line
pub const PERIODIC_TAG: &str = "p:";

/// `EV_FF` event type
pub const EV_FF: u16 = 0x15;

/// Force feedback effect types (`linux/input.h`)
pub const FF_RUMBLE: u16 = 0x50;
pub const FF_PERIODIC: u16 = 0x51;
pub const FF_CONSTANT: u16 = 0x52;
pub const FF_SPRING: u16 = 0x53;
pub const FF_FRICTION: u16 = 0x54;
pub const FF_DAMPER: u16 = 0x55;
pub const FF_INERTIA: u16 = 0x56;
pub const FF_RAMP: u16 = 0x57;

/// Periodic waveforms
pub const FF_SQUARE: u16 = 0x58;
pub const FF_TRIANGLE: u16 = 0x59;
pub const FF_SINE: u16 = 0x5a;
pub const FF_SAW_UP: u16 = 0x5b;
pub const FF_SAW_DOWN: u16 = 0x5c;
pub const FF_CUSTOM: u16 = 0x5d;

/// Device properties
pub const FF_GAIN: u16 = 0x60;
pub const FF_AUTOCENTER: u16 = 0x61;

/// Highest force feedback code
pub const FF_MAX: u16 = 0x7f;
