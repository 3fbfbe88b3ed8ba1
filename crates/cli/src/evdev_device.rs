//! Force feedback over a Linux event device node.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use evdev::{
    Device, FFEffect, FFEffectData, FFEffectKind, FFEnvelope, FFReplay, FFTrigger, FFWaveform,
};
use openracing_fftune::{
    DeviceEffectId, DeviceError, EffectPayload, EffectRecord, Envelope, FfCapabilities, FfDevice,
    Waveform,
};
use tracing::debug;

/// An opened `/dev/input/eventN` node.
///
/// Uploaded effects are owned here; the kernel erases an effect when its
/// handle is dropped.
pub struct EvdevFfDevice {
    path: PathBuf,
    name: String,
    device: Device,
    effects: HashMap<DeviceEffectId, FFEffect>,
}

impl EvdevFfDevice {
    /// Open `path` read-write.
    ///
    /// # Errors
    ///
    /// Whatever the kernel reports for the open call.
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let device = Device::open(path).map_err(|e| DeviceError::from_io("open", e))?;
        let name = device.name().unwrap_or("Unknown device").to_string();
        debug!(path = %path.display(), name, "opened event device");
        Ok(Self {
            path: path.to_path_buf(),
            name,
            device,
            effects: HashMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Capabilities advertised by an opened device.
pub fn capabilities_of(device: &Device) -> FfCapabilities {
    device
        .supported_ff()
        .map(|set| FfCapabilities::from_codes(set.iter().map(|kind| kind.0)))
        .unwrap_or_default()
}

fn waveform(waveform: Waveform) -> FFWaveform {
    match waveform {
        Waveform::Sine => FFWaveform::Sine,
        Waveform::Triangle => FFWaveform::Triangle,
        Waveform::Square => FFWaveform::Square,
    }
}

fn envelope(envelope: &Envelope) -> FFEnvelope {
    FFEnvelope {
        attack_length: envelope.attack_length,
        attack_level: envelope.attack_level,
        fade_length: envelope.fade_length,
        fade_level: envelope.fade_level,
    }
}

/// Kernel effect description for `record`.
pub fn effect_data(record: &EffectRecord) -> FFEffectData {
    let kind = match &record.payload {
        EffectPayload::Rumble(rumble) => FFEffectKind::Rumble {
            strong_magnitude: rumble.strong_magnitude,
            weak_magnitude: rumble.weak_magnitude,
        },
        EffectPayload::Periodic(periodic) => FFEffectKind::Periodic {
            waveform: waveform(periodic.waveform),
            period: periodic.period,
            magnitude: periodic.magnitude,
            offset: periodic.offset,
            phase: periodic.phase.cast_unsigned(),
            envelope: envelope(&periodic.envelope),
        },
    };
    FFEffectData {
        direction: 0,
        trigger: FFTrigger {
            button: 0,
            interval: 0,
        },
        replay: FFReplay {
            length: record.wire_replay_length(),
            delay: 0,
        },
        kind,
    }
}

impl FfDevice for EvdevFfDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn upload(&mut self, record: &EffectRecord) -> Result<DeviceEffectId, DeviceError> {
        if let Some(id) = record.device_id {
            return Err(DeviceError::AlreadyAssigned(id));
        }
        let effect = self
            .device
            .upload_ff_effect(effect_data(record))
            .map_err(|e| DeviceError::from_io("upload", e))?;
        let id = DeviceEffectId::new(effect.id().cast_signed());
        debug!(path = %self.path.display(), %id, "uploaded effect");
        self.effects.insert(id, effect);
        Ok(id)
    }

    fn remove(&mut self, id: DeviceEffectId) -> Result<(), DeviceError> {
        let effect = self
            .effects
            .remove(&id)
            .ok_or(DeviceError::UnknownEffect(id))?;
        // erased by the kernel when the handle goes away
        drop(effect);
        debug!(path = %self.path.display(), %id, "erased effect");
        Ok(())
    }

    fn signal(&mut self, id: DeviceEffectId, start: bool) -> Result<(), DeviceError> {
        let effect = self
            .effects
            .get_mut(&id)
            .ok_or(DeviceError::UnknownEffect(id))?;
        let result = if start { effect.play(1) } else { effect.stop() };
        result.map_err(|e| DeviceError::from_io("signal", e))
    }

    fn query_capabilities(&self) -> Result<FfCapabilities, DeviceError> {
        Ok(capabilities_of(&self.device))
    }

    fn max_simultaneous(&self) -> usize {
        self.device.max_ff_effects()
    }
}
