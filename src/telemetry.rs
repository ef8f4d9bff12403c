//! Live telemetry snapshots.
//!
//! The real-time feed pushes `{voltage, temperature, raw, connected}` per
//! device at arbitrary intervals. [`TelemetryHub`] keeps only the latest
//! snapshot for each device; readers either poll it or watch for changes.
//! There is no buffering and no ordering across readings.

use futures::{Stream, StreamExt};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::data::SensorReading;
use crate::error::{Error, Result};

/// Watch channel for one device.
struct DeviceChannel {
    /// Latest reading, or an offline placeholder before the first publish.
    tx: watch::Sender<SensorReading>,
    /// Whether the device has published at least once.
    published: bool,
}

impl DeviceChannel {
    fn new(initial: SensorReading, published: bool) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx, published }
    }
}

/// Latest-reading store keyed by device identifier.
#[derive(Default)]
pub struct TelemetryHub {
    channels: RwLock<HashMap<String, DeviceChannel>>,
}

impl TelemetryHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest reading for a device.
    pub fn publish(&self, device_id: &str, reading: SensorReading) {
        trace!(device = device_id, voltage = reading.voltage, "Telemetry update");

        if let Some(channel) = self.channels.read().get(device_id) {
            if channel.published {
                channel.tx.send_replace(reading);
                return;
            }
        }

        let mut channels = self.channels.write();
        match channels.get_mut(device_id) {
            Some(channel) => {
                if !channel.published {
                    debug!(device = device_id, "First telemetry for device");
                    channel.published = true;
                }
                channel.tx.send_replace(reading);
            }
            None => {
                debug!(device = device_id, "First telemetry for device");
                channels.insert(device_id.to_string(), DeviceChannel::new(reading, true));
            }
        }
    }

    /// Latest reading for a device, if any was published.
    pub fn latest(&self, device_id: &str) -> Option<SensorReading> {
        self.channels
            .read()
            .get(device_id)
            .filter(|channel| channel.published)
            .map(|channel| channel.tx.borrow().clone())
    }

    /// Latest reading for a device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if nothing was published for it.
    pub fn reading(&self, device_id: &str) -> Result<SensorReading> {
        self.latest(device_id).ok_or_else(|| Error::DeviceNotFound {
            device_id: device_id.to_string(),
        })
    }

    /// Watch a device's readings.
    ///
    /// Devices that have not reported yet start from an offline placeholder.
    /// The placeholder is never reported by [`latest`](Self::latest),
    /// [`reading`](Self::reading) or [`devices`](Self::devices).
    pub fn subscribe(&self, device_id: &str) -> watch::Receiver<SensorReading> {
        if let Some(channel) = self.channels.read().get(device_id) {
            return channel.tx.subscribe();
        }
        self.channels
            .write()
            .entry(device_id.to_string())
            .or_insert_with(|| DeviceChannel::new(SensorReading::offline(), false))
            .tx
            .subscribe()
    }

    /// Devices that have published at least once, in no particular order.
    pub fn devices(&self) -> Vec<String> {
        self.channels
            .read()
            .iter()
            .filter(|(_, channel)| channel.published)
            .map(|(device_id, _)| device_id.clone())
            .collect()
    }

    /// Forget a device. Existing watchers see the channel close.
    pub fn remove(&self, device_id: &str) -> bool {
        self.channels.write().remove(device_id).is_some()
    }

    /// Drain a stream of `(device_id, reading)` updates into the hub.
    ///
    /// Returns the number of readings applied once the stream ends.
    pub async fn ingest<S>(&self, stream: S) -> usize
    where
        S: Stream<Item = (String, SensorReading)>,
    {
        futures::pin_mut!(stream);
        let mut count = 0;
        while let Some((device_id, reading)) = stream.next().await {
            self.publish(&device_id, reading);
            count += 1;
        }
        debug!(count, "Telemetry stream ended");
        count
    }
}
