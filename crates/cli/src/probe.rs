//! Device discovery over `/dev/input/eventN`.

use std::io;
use std::path::{Path, PathBuf};

use openracing_fftune::FfCapabilities;
use tracing::{debug, info};

/// A device that can play both rumble and periodic effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHit {
    pub path: PathBuf,
    pub name: String,
    pub capabilities: FfCapabilities,
}

/// Path of event node `index`.
pub fn event_path(index: u32) -> PathBuf {
    PathBuf::from(format!("/dev/input/event{index}"))
}

/// Scan event nodes `0..limit` and return the first one suitable for tuning.
///
/// `open` reports the name and capabilities of a node. Scanning stops at the
/// first node that does not exist; nodes that fail to open for any other
/// reason (typically permissions) are skipped.
pub fn probe_with<F>(limit: u32, mut open: F) -> Option<ProbeHit>
where
    F: FnMut(&Path) -> io::Result<(String, FfCapabilities)>,
{
    for index in 0..limit {
        let path = event_path(index);
        match open(&path) {
            Ok((name, capabilities)) if capabilities.supports_tuning() => {
                info!(path = %path.display(), name, "found force feedback device");
                return Some(ProbeHit {
                    path,
                    name,
                    capabilities,
                });
            }
            Ok((name, capabilities)) => {
                debug!(path = %path.display(), name, %capabilities, "skipping device");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no more event devices");
                break;
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot open device");
            }
        }
    }
    None
}

/// Probe the real event nodes.
#[cfg(target_os = "linux")]
pub fn probe(limit: u32) -> Option<ProbeHit> {
    probe_with(limit, |path| {
        let device = evdev::Device::open(path)?;
        let name = device.name().unwrap_or("Unknown device").to_string();
        Ok((name, crate::evdev_device::capabilities_of(&device)))
    })
}

#[cfg(not(target_os = "linux"))]
pub fn probe(_limit: u32) -> Option<ProbeHit> {
    None
}
