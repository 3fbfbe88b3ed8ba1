//! Tuning session: one device, one effect table.
//!
//! Every mutation of the table follows a confirmed device call:
//!
//! - add: encode, reserve, upload, commit (reservation cancelled on failure)
//! - remove: device erase, then table release
//! - run/stop: resolve slot, signal; the table is untouched

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::device::{DeviceError, FfCapabilities, FfDevice, FfFeature};
use crate::effect::EffectRecord;
use crate::encoder::encode_effect;
use crate::params::ParamNote;
use crate::table::{EffectSummary, EffectTable};
use crate::{FfTuneError, Result};

/// Result of a successful `add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub slot: usize,
    pub record: EffectRecord,
    pub notes: Vec<ParamNote>,
}

/// A tuning session over an exclusively owned device.
pub struct FfTune<D: FfDevice> {
    device: D,
    table: EffectTable,
    capabilities: FfCapabilities,
}

impl<D: FfDevice> FfTune<D> {
    /// Start a session, querying the device capabilities once.
    ///
    /// # Errors
    ///
    /// The device failed to report its capabilities.
    pub fn new(device: D) -> Result<Self> {
        let capabilities = device.query_capabilities()?;
        info!(device = device.name(), %capabilities, "tuning session started");
        Ok(Self::with_capabilities(device, capabilities))
    }

    /// Start a session with capabilities the caller already queried.
    pub fn with_capabilities(device: D, capabilities: FfCapabilities) -> Self {
        Self {
            device,
            table: EffectTable::new(),
            capabilities,
        }
    }

    pub fn capabilities(&self) -> FfCapabilities {
        self.capabilities
    }

    pub fn table(&self) -> &EffectTable {
        &self.table
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Encode, upload and store a new effect.
    ///
    /// `tag` is `r:` or `p:`, `tokens` the positional arguments after it.
    ///
    /// # Errors
    ///
    /// Input errors and a full table abort before the device is touched;
    /// a device failure cancels the reservation. The table is unchanged in
    /// every error case.
    pub fn add<S: AsRef<str>>(&mut self, tag: &str, tokens: &[S]) -> Result<AddOutcome> {
        let encoded = encode_effect(tag, tokens)?;
        let kind = encoded.record.kind();
        if !self.capabilities.supports(FfFeature::from(kind)) {
            warn!(%kind, "device does not advertise this effect kind, uploading anyway");
        }

        let slot = self.table.reserve_slot()?;
        let id = match self.device.upload(&encoded.record) {
            Ok(id) => id,
            Err(err) => {
                warn!(slot, error = %err, "upload failed, releasing reservation");
                self.table.cancel(slot)?;
                return Err(err.into());
            }
        };

        let record = encoded.record.with_device_id(id);
        if let Err(err) = self.table.commit(slot, record) {
            // keep the device in step with the table
            if let Err(remove_err) = self.device.remove(id) {
                warn!(%id, error = %remove_err, "could not erase effect after failed commit");
            }
            if let Err(cancel_err) = self.table.cancel(slot) {
                warn!(slot, error = %cancel_err, "could not release reservation");
            }
            return Err(err.into());
        }

        info!(device = self.device.name(), slot, %id, %kind, "effect added");
        Ok(AddOutcome {
            slot,
            record,
            notes: encoded.notes,
        })
    }

    /// Start playback of the effect in `slot`.
    ///
    /// # Errors
    ///
    /// Lookup errors for unknown slots, device errors from the signal.
    pub fn run(&mut self, slot: i64) -> Result<()> {
        self.signal(slot, true)
    }

    /// Stop playback of the effect in `slot`.
    ///
    /// # Errors
    ///
    /// Lookup errors for unknown slots, device errors from the signal.
    pub fn stop(&mut self, slot: i64) -> Result<()> {
        self.signal(slot, false)
    }

    fn signal(&mut self, slot: i64, start: bool) -> Result<()> {
        let id = self.device_id(slot)?;
        self.device.signal(id, start)?;
        debug!(device = self.device.name(), slot, %id, start, "effect signalled");
        Ok(())
    }

    /// Erase the effect in `slot` from the device, then drop it from the
    /// table. Later slots move down by one.
    ///
    /// # Errors
    ///
    /// Lookup errors for unknown slots. A device failure leaves both the
    /// device effect and the table entry in place.
    pub fn remove(&mut self, slot: i64) -> Result<EffectRecord> {
        let id = self.device_id(slot)?;
        self.device.remove(id)?;
        let index = usize::try_from(slot).map_err(|_err| FfTuneError::no_such_effect(slot))?;
        let record = self.table.release(index)?;
        info!(device = self.device.name(), slot, %id, "effect removed");
        Ok(record)
    }

    /// Active effects in slot order.
    pub fn list(&self) -> Vec<EffectSummary> {
        self.table.list()
    }

    /// Record in `slot`.
    ///
    /// # Errors
    ///
    /// Lookup error for unknown slots.
    pub fn get(&self, slot: i64) -> Result<&EffectRecord> {
        Ok(self.table.get(slot)?)
    }

    /// Stop every active effect, continuing past failures.
    ///
    /// Returns the slots that could not be stopped.
    pub fn stop_all(&mut self) -> Vec<(usize, DeviceError)> {
        let ids: Vec<_> = self.table.active_ids().collect();
        let mut failures = Vec::new();
        for (slot, id) in ids {
            if let Err(err) = self.device.signal(id, false) {
                warn!(slot, %id, error = %err, "failed to stop effect");
                failures.push((slot, err));
            }
        }
        failures
    }

    fn device_id(&self, slot: i64) -> Result<crate::DeviceEffectId> {
        self.table
            .get(slot)?
            .device_id
            .ok_or_else(|| FfTuneError::no_such_effect(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;
    use crate::mock::{InjectedFailure, MockFfDevice};

    fn session() -> Result<FfTune<MockFfDevice>> {
        FfTune::new(MockFfDevice::new("test pad"))
    }

    #[test]
    fn test_add_uploads_once_and_commits() -> Result<()> {
        let mut tune = session()?;
        let outcome = tune.add("r:", &["500", "0xffff", "0xffff"])?;
        assert_eq!(outcome.slot, 0);
        assert!(outcome.record.device_id.is_some());
        assert_eq!(tune.table().len(), 1);
        assert_eq!(tune.device().uploads().len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_input_error_touches_nothing() -> Result<()> {
        let mut tune = session()?;
        let err = tune.add("p:", &["hexagon", "100"]);
        assert!(matches!(err, Err(FfTuneError::Input(_))));
        assert!(tune.table().is_empty());
        assert!(tune.device().uploads().is_empty());
        Ok(())
    }

    #[test]
    fn test_add_unadvertised_kind_still_uploads() -> Result<()> {
        let rumble_only = FfCapabilities::from_features([FfFeature::Rumble]);
        let mut tune = FfTune::new(MockFfDevice::new("rumble pad").with_capabilities(rumble_only))?;
        assert!(!tune.capabilities().supports(FfFeature::Periodic));

        let outcome = tune.add("p:", &["sine", "1000", "100", "0x4000", "0", "0", "0", "0", "0", "0"])?;
        assert_eq!(outcome.record.kind(), crate::EffectKind::Periodic);
        assert_eq!(tune.table().len(), 1);
        assert_eq!(tune.device().uploads().len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_upload_failure_rolls_back() -> Result<()> {
        let mut tune = session()?;
        tune.add("r:", &["1", "2", "3"])?;
        tune.device_mut().fail_next_upload(InjectedFailure::Rejected);
        let err = tune.add("r:", &["1", "2", "3"]);
        assert!(matches!(err, Err(FfTuneError::Device(ref e)) if e.is_rejected()));
        assert_eq!(tune.table().len(), 1);
        assert_eq!(tune.device().effect_count(), 1);
        Ok(())
    }

    #[test]
    fn test_add_when_full() -> Result<()> {
        let mut tune = FfTune::new(MockFfDevice::with_capacity("big", 64))?;
        for _ in 0..32 {
            tune.add("r:", &["1", "2", "3"])?;
        }
        let err = tune.add("r:", &["1", "2", "3"]);
        assert!(matches!(err, Err(ref e) if e.category() == ErrorCategory::Capacity));
        assert_eq!(tune.device().effect_count(), 32);
        Ok(())
    }

    #[test]
    fn test_run_and_stop() -> Result<()> {
        let mut tune = session()?;
        let added = tune.add("r:", &["1", "2", "3"])?;
        let id = added.record.device_id.ok_or(FfTuneError::no_such_effect(0))?;
        tune.run(0)?;
        assert!(tune.device().is_playing(id));
        tune.stop(0)?;
        assert!(!tune.device().is_playing(id));
        assert_eq!(tune.table().len(), 1);
        Ok(())
    }

    #[test]
    fn test_run_unknown_slot_no_device_call() -> Result<()> {
        let mut tune = session()?;
        tune.add("r:", &["1", "2", "3"])?;
        let err = tune.run(5);
        assert!(matches!(err, Err(ref e) if e.category() == ErrorCategory::Lookup));
        assert!(tune.device().events().is_empty());
        Ok(())
    }

    #[test]
    fn test_remove_failure_keeps_entry() -> Result<()> {
        let mut tune = session()?;
        tune.add("r:", &["1", "2", "3"])?;
        tune.device_mut().fail_next_remove(InjectedFailure::Io);
        let err = tune.remove(0);
        assert!(matches!(err, Err(FfTuneError::Device(ref e)) if e.is_transport()));
        assert_eq!(tune.table().len(), 1);
        assert_eq!(tune.device().effect_count(), 1);
        Ok(())
    }

    #[test]
    fn test_remove_negative_slot() -> Result<()> {
        let mut tune = session()?;
        tune.add("r:", &["1", "2", "3"])?;
        let err = tune.remove(-1);
        assert!(matches!(err, Err(ref e) if e.category() == ErrorCategory::Lookup));
        assert!(tune.device().removals().is_empty());
        Ok(())
    }

    #[test]
    fn test_stop_all_halts_every_effect() -> Result<()> {
        let mut tune = session()?;
        tune.add("r:", &["1", "2", "3"])?;
        tune.add("r:", &["1", "2", "3"])?;
        tune.run(0)?;
        tune.run(1)?;
        assert!(tune.stop_all().is_empty());
        assert_eq!(tune.device().events().len(), 4);
        Ok(())
    }

    #[test]
    fn test_stop_all_reports_failures() -> Result<()> {
        let mut tune = session()?;
        tune.add("r:", &["1", "2", "3"])?;
        tune.add("r:", &["1", "2", "3"])?;
        tune.device_mut().fail_next_signal(InjectedFailure::Io);
        let failures = tune.stop_all();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures.first().map(|(slot, _)| *slot), Some(0));
        Ok(())
    }
}
