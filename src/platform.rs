//! Binary sensor platform setup.
//!
//! Turns one config entry and its coordinator into one sensor per registry
//! entry and hands them to the host.

use crate::config::ConfigEntry;
use crate::coordinator::Coordinator;
use crate::error::Result;
use crate::sensors::{BinarySensorEntity, RyobiBinarySensor, SensorRegistry};
use log::info;
use std::sync::Arc;

/// Receives the entities created by platform setup.
pub trait EntitySink {
    fn add_entities(
        &mut self,
        entities: Vec<Arc<dyn BinarySensorEntity>>,
        update_before_add: bool,
    );
}

impl EntitySink for Vec<Arc<dyn BinarySensorEntity>> {
    fn add_entities(
        &mut self,
        entities: Vec<Arc<dyn BinarySensorEntity>>,
        _update_before_add: bool,
    ) {
        self.extend(entities);
    }
}

/// Set up the binary sensor platform for `entry`.
///
/// Creates one [`RyobiBinarySensor`] per descriptor in `registry`, in
/// registry order, and adds them to `sink` in a single call without an
/// update before add. Returns the number of entities added.
pub fn setup_entry(
    entry: &ConfigEntry,
    coordinator: Arc<Coordinator>,
    registry: &SensorRegistry,
    sink: &mut dyn EntitySink,
) -> Result<usize> {
    let device_id = entry.device_id()?;

    let entities: Vec<Arc<dyn BinarySensorEntity>> = registry
        .iter()
        .map(|descriptor| {
            Arc::new(RyobiBinarySensor::new(
                *descriptor,
                device_id.clone(),
                coordinator.clone(),
            )) as Arc<dyn BinarySensorEntity>
        })
        .collect();

    let count = entities.len();
    info!(
        "Adding {} binary sensor(s) for device {} (entry {})",
        count, device_id, entry.entry_id
    );
    sink.add_entities(entities, false);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Snapshot;
    use crate::error::BridgeError;
    use crate::sensors::SensorDescriptor;
    use serde_json::{Map, Value, json};

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<(usize, bool)>,
        entities: Vec<Arc<dyn BinarySensorEntity>>,
    }

    impl EntitySink for RecordingSink {
        fn add_entities(
            &mut self,
            entities: Vec<Arc<dyn BinarySensorEntity>>,
            update_before_add: bool,
        ) {
            self.calls.push((entities.len(), update_before_add));
            self.entities.extend(entities);
        }
    }

    fn entry(device_id: Option<&str>) -> ConfigEntry {
        let mut data = Map::new();
        if let Some(id) = device_id {
            data.insert("device_id".to_string(), Value::String(id.to_string()));
        }
        ConfigEntry::new("entry-1", data)
    }

    #[test]
    fn test_setup_adds_builtin_sensors_once() {
        let coordinator = Arc::new(Coordinator::with_data(Snapshot::new(), true));
        let mut sink = RecordingSink::default();

        let count = setup_entry(
            &entry(Some("abc123")),
            coordinator,
            &SensorRegistry::builtin(),
            &mut sink,
        )
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(sink.calls, vec![(1, false)]);
        assert_eq!(sink.entities[0].unique_id(), "ryobi_gdo_Park Assist_abc123");
    }

    #[test]
    fn test_setup_requires_device_id() {
        let coordinator = Arc::new(Coordinator::with_data(Snapshot::new(), true));
        let mut sink = RecordingSink::default();

        let err = setup_entry(&entry(None), coordinator, &SensorRegistry::builtin(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingDeviceId));
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_sensors_share_coordinator() {
        let coordinator = Arc::new(Coordinator::with_data(
            Snapshot::from_json(json!({"park_assist": 1, "vacation_mode": 0})).unwrap(),
            true,
        ));
        let registry = SensorRegistry::builtin()
            .with(SensorDescriptor::new("vacation_mode", "Vacation Mode", "mdi:beach"))
            .unwrap();
        let mut sensors: Vec<Arc<dyn BinarySensorEntity>> = Vec::new();

        setup_entry(&entry(Some("abc123")), coordinator.clone(), &registry, &mut sensors).unwrap();

        let states: Vec<_> = sensors.iter().map(|s| s.is_on()).collect();
        assert_eq!(states, vec![Some(true), Some(false)]);

        coordinator.set_update_failed();
        assert!(sensors.iter().all(|s| !s.available()));
    }
}
