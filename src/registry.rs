//! Fixed-capacity device table keyed by MAC address.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use uuid::Uuid;

use crate::device::Device;
use crate::types::MacAddress;

/// Stable handle to a registry slot. Slots are never freed or reused.
///
/// A handle only resolves in the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeviceHandle {
    registry: Uuid,
    index: usize,
}

impl DeviceHandle {
    /// Discovery-order position of the device.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Insertion-ordered device records with a MAC index and no eviction.
///
/// # Example
///
/// ```
/// use lifx_lan_rs::{MacAddress, Registry};
///
/// let mut registry = Registry::with_capacity(1);
/// let a = MacAddress::new([1, 1, 1, 1, 1, 1]);
/// let b = MacAddress::new([2, 2, 2, 2, 2, 2]);
///
/// assert!(registry.find_or_create(a, false).is_none());
/// let handle = registry.find_or_create(a, true).unwrap();
/// assert_eq!(registry.find_or_create(a, false), Some(handle));
///
/// // full: new devices are silently not tracked
/// assert!(registry.find_or_create(b, true).is_none());
/// assert_eq!(registry.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    id: Uuid,
    devices: Vec<Device>,
    index: HashMap<MacAddress, DeviceHandle>,
    capacity: usize,
}

impl Registry {
    pub fn with_capacity(capacity: usize) -> Self {
        Registry {
            id: Uuid::new_v4(),
            devices: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Find the record for `mac`, creating it when `create` is set and there
    /// is room left.
    pub fn find_or_create(&mut self, mac: MacAddress, create: bool) -> Option<DeviceHandle> {
        if let Some(handle) = self.find(&mac) {
            return Some(handle);
        }
        if !create {
            return None;
        }
        if self.devices.len() >= self.capacity {
            debug!("registry full ({} devices), not tracking {mac}", self.capacity);
            return None;
        }

        let handle = self.handle(self.devices.len());
        self.devices.push(Device::new(mac));
        self.index.insert(mac, handle);
        Some(handle)
    }

    pub fn find(&self, mac: &MacAddress) -> Option<DeviceHandle> {
        self.index.get(mac).copied()
    }

    pub fn by_index(&self, index: usize) -> Option<DeviceHandle> {
        (index < self.devices.len()).then(|| self.handle(index))
    }

    pub fn get(&self, handle: DeviceHandle) -> Option<&Device> {
        if handle.registry != self.id {
            return None;
        }
        self.devices.get(handle.index)
    }

    pub(crate) fn get_mut(&mut self, handle: DeviceHandle) -> Option<&mut Device> {
        if handle.registry != self.id {
            return None;
        }
        self.devices.get_mut(handle.index)
    }

    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn handle(&self, index: usize) -> DeviceHandle {
        DeviceHandle {
            registry: self.id,
            index,
        }
    }

    /// Devices in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }
}


#[cfg(test)]
mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::Registry;
    use crate::types::MacAddress;

    proptest! {
        #[test]
        fn test_find_or_create_matches_model(
            capacity in 0usize..16,
            ops in vec((0u8..24, any::<bool>()), 0..100),
        ) {
            let mut registry = Registry::with_capacity(capacity);
            let mut model: Vec<MacAddress> = Vec::new();

            for (n, create) in ops {
                let mac = MacAddress::new([0xd0, 0x73, 0xd5, 0, 0, n]);
                let expected = match model.iter().position(|m| *m == mac) {
                    Some(index) => Some(index),
                    None if create && model.len() < capacity => {
                        model.push(mac);
                        Some(model.len() - 1)
                    }
                    None => None,
                };

                let handle = registry.find_or_create(mac, create);
                prop_assert_eq!(handle.map(|h| h.index()), expected);
                prop_assert!(registry.count() <= capacity);
            }

            let order: Vec<_> = registry.iter().map(|d| d.mac()).collect();
            prop_assert_eq!(order, model);
        }
    }
}
