// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The local record of every registered port.

use std::collections::BTreeMap;
use std::collections::btree_map;
use uuid::Uuid;
use vrouter_api::Port;
use vrouter_api::PortCfg;

/// All ports the client has registered, keyed by port identifier.
///
/// This is the source of truth: it is updated before the agent is told
/// anything and it is never rolled back when the agent can't be
/// reached.
#[derive(Clone, Debug, Default)]
pub struct PortRegistry {
    ports: BTreeMap<Uuid, PortCfg>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `cfg`, replacing any existing port with the same id.
    pub fn upsert(&mut self, port_id: Uuid, cfg: PortCfg) {
        self.ports.insert(port_id, cfg);
    }

    /// Remove a port. Removing an unknown port is a no-op.
    pub fn remove(&mut self, port_id: &Uuid) -> Option<PortCfg> {
        self.ports.remove(port_id)
    }

    pub fn get(&self, port_id: &Uuid) -> Option<&PortCfg> {
        self.ports.get(port_id)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, Uuid, PortCfg> {
        self.ports.values()
    }

    /// Every port in wire form, ordered by port id.
    pub fn snapshot(&self) -> Vec<Port> {
        self.ports.values().map(Port::from).collect()
    }
}

impl<'a> IntoIterator for &'a PortRegistry {
    type Item = &'a PortCfg;
    type IntoIter = btree_map::Values<'a, Uuid, PortCfg>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use vrouter_api::uuid_to_wire;

    fn cfg(id: u128, name: &str) -> PortCfg {
        PortCfg {
            port_id: Uuid::from_u128(id),
            instance_id: Uuid::from_u128(0xaa),
            interface_name: name.to_string(),
            interface_addr: "192.168.1.10".parse().unwrap(),
            mac_addr: [2, 0, 0, 0, 0, id as u8].into(),
            network_id: Uuid::from_u128(0xbb),
            vlan_id: 0,
            isolated_vlan_id: 0,
            display_name: "vm".to_string(),
            project_id: None,
        }
    }

    #[test]
    fn upsert_replaces() {
        let mut reg = PortRegistry::new();
        let id = Uuid::from_u128(1);
        reg.upsert(id, cfg(1, "tap-a"));
        reg.upsert(id, cfg(1, "tap-b"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&id).unwrap().interface_name, "tap-b");
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut reg = PortRegistry::new();
        reg.upsert(Uuid::from_u128(1), cfg(1, "tap-a"));
        assert!(reg.remove(&Uuid::from_u128(2)).is_none());
        assert_eq!(reg.len(), 1);
        assert!(reg.remove(&Uuid::from_u128(1)).is_some());
        assert!(reg.is_empty());
    }

    #[test]
    fn snapshot_is_complete_and_ordered() {
        let mut reg = PortRegistry::new();
        for id in [3, 1, 2] {
            reg.upsert(Uuid::from_u128(id), cfg(id, "tap"));
        }

        let ids: Vec<_> =
            reg.snapshot().into_iter().map(|p| p.port_id).collect();
        let want: Vec<_> =
            [1, 2, 3].map(|id| uuid_to_wire(&Uuid::from_u128(id))).into();
        assert_eq!(ids, want);
    }

    #[test]
    fn empty_snapshot() {
        assert!(PortRegistry::new().snapshot().is_empty());
    }
}
