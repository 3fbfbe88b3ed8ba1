//! In-memory force feedback device.
//!
//! Hands out the lowest free effect id, keeps the wire bytes of everything
//! it was sent and can be told to fail the next call of each kind.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use tracing::debug;

use crate::constants::MAX_EFFECTS;
use crate::device::{DeviceError, FfCapabilities, FfDevice, FfFeature};
use crate::effect::{DeviceEffectId, EffectRecord};
use crate::wire::{self, FF_EFFECT_LEN, INPUT_EVENT_LEN, NEW_EFFECT_ID};

/// Effects a [`MockFfDevice`] holds unless configured otherwise.
///
/// Matches the effect table, so a full table is reported before the device
/// runs out of ids.
pub const DEFAULT_MOCK_EFFECTS: usize = MAX_EFFECTS;

/// Failure to inject into the next call of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Rejected,
    Io,
}

impl InjectedFailure {
    fn into_error(self, operation: &'static str) -> DeviceError {
        match self {
            InjectedFailure::Rejected => DeviceError::rejected(operation, "injected rejection"),
            InjectedFailure::Io => DeviceError::Io {
                operation,
                source: io::Error::from(io::ErrorKind::BrokenPipe),
            },
        }
    }
}

/// Software stand-in for an evdev force feedback node.
#[derive(Debug)]
pub struct MockFfDevice {
    name: String,
    capabilities: FfCapabilities,
    max_effects: usize,
    free_ids: BTreeSet<i16>,
    effects: BTreeMap<DeviceEffectId, EffectRecord>,
    playing: BTreeSet<DeviceEffectId>,
    uploads: Vec<[u8; FF_EFFECT_LEN]>,
    removals: Vec<DeviceEffectId>,
    events: Vec<[u8; INPUT_EVENT_LEN]>,
    fail_upload: Option<InjectedFailure>,
    fail_remove: Option<InjectedFailure>,
    fail_signal: Option<InjectedFailure>,
}

impl MockFfDevice {
    /// Device supporting rumble and sine/triangle/square periodic effects.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_MOCK_EFFECTS)
    }

    pub fn with_capacity(name: impl Into<String>, max_effects: usize) -> Self {
        let ids = i16::try_from(max_effects).unwrap_or(i16::MAX);
        Self {
            name: name.into(),
            capabilities: FfCapabilities::from_features([
                FfFeature::Rumble,
                FfFeature::Periodic,
                FfFeature::Square,
                FfFeature::Triangle,
                FfFeature::Sine,
                FfFeature::Gain,
            ]),
            max_effects,
            free_ids: (0..ids).collect(),
            effects: BTreeMap::new(),
            playing: BTreeSet::new(),
            uploads: Vec::new(),
            removals: Vec::new(),
            events: Vec::new(),
            fail_upload: None,
            fail_remove: None,
            fail_signal: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: FfCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn fail_next_upload(&mut self, failure: InjectedFailure) {
        self.fail_upload = Some(failure);
    }

    pub fn fail_next_remove(&mut self, failure: InjectedFailure) {
        self.fail_remove = Some(failure);
    }

    pub fn fail_next_signal(&mut self, failure: InjectedFailure) {
        self.fail_signal = Some(failure);
    }

    /// Every `ff_effect` uploaded so far, in order.
    pub fn uploads(&self) -> &[[u8; FF_EFFECT_LEN]] {
        &self.uploads
    }

    /// Every id erased so far, in order.
    pub fn removals(&self) -> &[DeviceEffectId] {
        &self.removals
    }

    /// Every control event written so far, in order.
    pub fn events(&self) -> &[[u8; INPUT_EVENT_LEN]] {
        &self.events
    }

    /// Effects currently held by the device.
    pub fn effect(&self, id: DeviceEffectId) -> Option<&EffectRecord> {
        self.effects.get(&id)
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    pub fn is_playing(&self, id: DeviceEffectId) -> bool {
        self.playing.contains(&id)
    }
}

impl FfDevice for MockFfDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn upload(&mut self, record: &EffectRecord) -> Result<DeviceEffectId, DeviceError> {
        if let Some(id) = record.device_id {
            return Err(DeviceError::AlreadyAssigned(id));
        }
        if let Some(failure) = self.fail_upload.take() {
            return Err(failure.into_error("upload"));
        }
        let raw = self
            .free_ids
            .pop_first()
            .ok_or_else(|| DeviceError::rejected("upload", "no free effect slots"))?;
        let id = DeviceEffectId::new(raw);

        self.uploads.push(wire::encode_ff_effect(record, NEW_EFFECT_ID));
        self.effects.insert(id, record.with_device_id(id));
        debug!(device = %self.name, %id, "mock upload");
        Ok(id)
    }

    fn remove(&mut self, id: DeviceEffectId) -> Result<(), DeviceError> {
        if let Some(failure) = self.fail_remove.take() {
            return Err(failure.into_error("remove"));
        }
        self.effects
            .remove(&id)
            .ok_or(DeviceError::UnknownEffect(id))?;
        self.playing.remove(&id);
        self.free_ids.insert(id.raw());
        self.removals.push(id);
        debug!(device = %self.name, %id, "mock remove");
        Ok(())
    }

    fn signal(&mut self, id: DeviceEffectId, start: bool) -> Result<(), DeviceError> {
        if let Some(failure) = self.fail_signal.take() {
            return Err(failure.into_error("signal"));
        }
        if !self.effects.contains_key(&id) {
            return Err(DeviceError::UnknownEffect(id));
        }
        let event = wire::encode_control_event(id, start);
        if let Some((decoded, playing)) = wire::decode_control_event(&event) {
            if playing {
                self.playing.insert(decoded);
            } else {
                self.playing.remove(&decoded);
            }
        }
        self.events.push(event);
        Ok(())
    }

    fn query_capabilities(&self) -> Result<FfCapabilities, DeviceError> {
        Ok(self.capabilities)
    }

    fn max_simultaneous(&self) -> usize {
        self.max_effects
    }
}
