//! Fixed-capacity effect table.
//!
//! Slots are addressed densely from `0` to `len - 1`. A slot goes
//! `Free -> Reserved -> Active` on a successful add and is removed again by
//! [`EffectTable::cancel`] (failed upload) or [`EffectTable::release`]
//! (successful device removal). Both shift every later slot down by one so
//! indices stay dense.

use serde::Serialize;
use tracing::info;

use crate::constants::MAX_EFFECTS;
use crate::effect::{DeviceEffectId, EffectKind, EffectRecord};

/// Effect table errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Every slot is in use
    #[error("effect table is full ({capacity} effects)")]
    Full { capacity: usize },

    /// Slot index outside `[0, len)` or not holding an uploaded effect
    #[error("no such effect {slot}")]
    NotFound { slot: i64 },

    /// `commit`/`cancel` on a slot that was not reserved
    #[error("slot {slot} is not reserved")]
    NotReserved { slot: usize },

    /// `commit` of a record the device never accepted
    #[error("effect for slot {slot} has no device id")]
    Unassigned { slot: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum SlotState {
    #[default]
    Free,
    Reserved,
    Active(EffectRecord),
}

/// One line of the `list` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectSummary {
    pub slot: usize,
    pub kind: EffectKind,
    pub duration_ms: u32,
}

/// Arena of [`MAX_EFFECTS`] slots with a dense length.
#[derive(Debug, Clone)]
pub struct EffectTable {
    slots: [SlotState; MAX_EFFECTS],
    len: usize,
}

impl Default for EffectTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectTable {
    pub fn new() -> Self {
        Self {
            slots: [SlotState::Free; MAX_EFFECTS],
            len: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        MAX_EFFECTS
    }

    /// Slots in use, reserved ones included.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= MAX_EFFECTS
    }

    /// Claim the next dense slot for an effect about to be uploaded.
    ///
    /// # Errors
    ///
    /// [`TableError::Full`] when all [`MAX_EFFECTS`] slots are in use.
    pub fn reserve_slot(&mut self) -> Result<usize, TableError> {
        let slot = self.len;
        let state = self.slots.get_mut(slot).ok_or(TableError::Full {
            capacity: MAX_EFFECTS,
        })?;
        *state = SlotState::Reserved;
        self.len = slot.saturating_add(1);
        Ok(slot)
    }

    /// Store an uploaded record in its reserved slot.
    ///
    /// # Errors
    ///
    /// [`TableError::Unassigned`] when `record` has no device id,
    /// [`TableError::NotReserved`] when `slot` was not reserved.
    pub fn commit(&mut self, slot: usize, record: EffectRecord) -> Result<(), TableError> {
        let Some(device_id) = record.device_id else {
            return Err(TableError::Unassigned { slot });
        };
        match self.slots.get_mut(slot) {
            Some(state @ SlotState::Reserved) if slot < self.len => {
                *state = SlotState::Active(record);
                info!(slot, %device_id, kind = %record.kind(), "effect committed");
                Ok(())
            }
            _ => Err(TableError::NotReserved { slot }),
        }
    }

    /// Drop a reservation whose upload failed.
    ///
    /// # Errors
    ///
    /// [`TableError::NotReserved`] when `slot` is not reserved.
    pub fn cancel(&mut self, slot: usize) -> Result<(), TableError> {
        match self.slots.get(slot) {
            Some(SlotState::Reserved) if slot < self.len => {
                self.compact(slot);
                Ok(())
            }
            _ => Err(TableError::NotReserved { slot }),
        }
    }

    /// Remove an active effect after the device has erased it.
    ///
    /// Later slots shift down by one.
    ///
    /// # Errors
    ///
    /// [`TableError::NotFound`] when `slot` does not hold an active effect.
    pub fn release(&mut self, slot: usize) -> Result<EffectRecord, TableError> {
        match self.slots.get(slot).copied() {
            Some(SlotState::Active(record)) if slot < self.len => {
                self.compact(slot);
                info!(slot, remaining = self.len, "effect released");
                Ok(record)
            }
            _ => Err(TableError::NotFound {
                slot: i64::try_from(slot).unwrap_or(i64::MAX),
            }),
        }
    }

    /// Resolve a user-supplied slot index.
    ///
    /// Negative and out-of-range indices are [`TableError::NotFound`].
    pub fn get(&self, slot: i64) -> Result<&EffectRecord, TableError> {
        usize::try_from(slot)
            .ok()
            .filter(|index| *index < self.len)
            .and_then(|index| self.slots.get(index))
            .and_then(|state| match state {
                SlotState::Active(record) => Some(record),
                SlotState::Free | SlotState::Reserved => None,
            })
            .ok_or(TableError::NotFound { slot })
    }

    /// Active effects in slot order.
    pub fn list(&self) -> Vec<EffectSummary> {
        self.active()
            .map(|(slot, record)| EffectSummary {
                slot,
                kind: record.kind(),
                duration_ms: record.duration_ms,
            })
            .collect()
    }

    /// `(slot, device id)` for every active effect.
    pub fn active_ids(&self) -> impl Iterator<Item = (usize, DeviceEffectId)> + '_ {
        self.active()
            .filter_map(|(slot, record)| record.device_id.map(|id| (slot, id)))
    }

    fn active(&self) -> impl Iterator<Item = (usize, &EffectRecord)> + '_ {
        self.slots
            .iter()
            .take(self.len)
            .enumerate()
            .filter_map(|(slot, state)| match state {
                SlotState::Active(record) => Some((slot, record)),
                SlotState::Free | SlotState::Reserved => None,
            })
    }

    fn compact(&mut self, slot: usize) {
        if let Some(window) = self.slots.get_mut(slot..self.len) {
            window.rotate_left(1);
            if let Some(last) = window.last_mut() {
                *last = SlotState::Free;
            }
        }
        self.len = self.len.saturating_sub(1);
    }
}
