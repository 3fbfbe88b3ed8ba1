//! Linux force feedback wire layouts.
//!
//! All functions are pure and allocation-free. Multi-byte fields use native
//! byte order, as the kernel reads them straight out of user memory.
//!
//! # `struct ff_effect` (64-bit, 48 bytes)
//!
//! ```text
//! Offset  Size  Field
//!  0      2     type            FF_RUMBLE / FF_PERIODIC
//!  2      2     id              -1 for a new effect
//!  4      2     direction
//!  6      2     trigger.button
//!  8      2     trigger.interval
//! 10      2     replay.length   ms, at most 0x7fff
//! 12      2     replay.delay
//! 14      2     (padding)
//! 16      ...   union u (8-byte aligned)
//!
//! rumble:   16 strong_magnitude u16, 18 weak_magnitude u16
//! periodic: 16 waveform u16, 18 period u16, 20 magnitude s16,
//!           22 offset s16, 24 phase u16,
//!           26 attack_length, 28 attack_level, 30 fade_length,
//!           32 fade_level (u16 each), 36 custom_len u32,
//!           40 custom_data pointer (null)
//! ```
//!
//! # `struct input_event` (64-bit, 24 bytes)
//!
//! ```text
//!  0  16  timeval (zero, the kernel stamps it)
//! 16   2  type  EV_FF
//! 18   2  code  effect id
//! 20   4  value 1 = start, 0 = stop
//! ```

use crate::constants::EV_FF;
use crate::effect::{DeviceEffectId, EffectPayload, EffectRecord};

/// Size of `struct ff_effect` on 64-bit Linux.
pub const FF_EFFECT_LEN: usize = 48;

/// Size of `struct input_event` on 64-bit Linux.
pub const INPUT_EVENT_LEN: usize = 24;

/// `ff_effect.id` for an upload that asks the kernel to allocate an id.
pub const NEW_EFFECT_ID: i16 = -1;

const UNION_OFFSET: usize = 16;

/// Encode `record` as a `struct ff_effect` carrying `id`.
///
/// Pass [`NEW_EFFECT_ID`] for a fresh upload.
pub fn encode_ff_effect(record: &EffectRecord, id: i16) -> [u8; FF_EFFECT_LEN] {
    let mut out = [0_u8; FF_EFFECT_LEN];
    put(&mut out, 0, record.kind().code().to_ne_bytes());
    put(&mut out, 2, id.to_ne_bytes());
    put(&mut out, 10, record.wire_replay_length().to_ne_bytes());

    match record.payload {
        EffectPayload::Rumble(rumble) => {
            put(&mut out, UNION_OFFSET, rumble.strong_magnitude.to_ne_bytes());
            put(&mut out, UNION_OFFSET + 2, rumble.weak_magnitude.to_ne_bytes());
        }
        EffectPayload::Periodic(periodic) => {
            let envelope = periodic.envelope;
            put(&mut out, UNION_OFFSET, periodic.waveform.code().to_ne_bytes());
            put(&mut out, UNION_OFFSET + 2, periodic.period.to_ne_bytes());
            put(&mut out, UNION_OFFSET + 4, periodic.magnitude.to_ne_bytes());
            put(&mut out, UNION_OFFSET + 6, periodic.offset.to_ne_bytes());
            put(
                &mut out,
                UNION_OFFSET + 8,
                periodic.phase.cast_unsigned().to_ne_bytes(),
            );
            put(&mut out, UNION_OFFSET + 10, envelope.attack_length.to_ne_bytes());
            put(&mut out, UNION_OFFSET + 12, envelope.attack_level.to_ne_bytes());
            put(&mut out, UNION_OFFSET + 14, envelope.fade_length.to_ne_bytes());
            put(&mut out, UNION_OFFSET + 16, envelope.fade_level.to_ne_bytes());
        }
    }
    out
}

/// Encode the `EV_FF` event that starts or stops effect `id`.
pub fn encode_control_event(id: DeviceEffectId, start: bool) -> [u8; INPUT_EVENT_LEN] {
    let mut out = [0_u8; INPUT_EVENT_LEN];
    put(&mut out, 16, EV_FF.to_ne_bytes());
    put(&mut out, 18, id.raw().cast_unsigned().to_ne_bytes());
    put(&mut out, 20, i32::from(start).to_ne_bytes());
    out
}

/// Decode an `EV_FF` control event into `(id, start)`.
///
/// Returns `None` for other event types.
pub fn decode_control_event(event: &[u8; INPUT_EVENT_LEN]) -> Option<(DeviceEffectId, bool)> {
    let [t0, t1, c0, c1, v0, v1, v2, v3] = *event.last_chunk::<8>()?;
    if u16::from_ne_bytes([t0, t1]) != EV_FF {
        return None;
    }
    let id = u16::from_ne_bytes([c0, c1]).cast_signed();
    let value = i32::from_ne_bytes([v0, v1, v2, v3]);
    Some((DeviceEffectId::new(id), value != 0))
}

/// `ff_effect.type` of an encoded effect.
pub fn effect_type(effect: &[u8; FF_EFFECT_LEN]) -> u16 {
    let [b0, b1, ..] = *effect;
    u16::from_ne_bytes([b0, b1])
}

fn put<const N: usize>(out: &mut [u8], offset: usize, bytes: [u8; N]) {
    if let Some(field) = out.get_mut(offset..offset.saturating_add(N)) {
        field.copy_from_slice(&bytes);
    }
}
