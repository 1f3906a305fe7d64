// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use super::id::WireUuid;
use super::id::uuid_to_wire;
use super::mac::MacAddr;
use serde::Deserialize;
use serde::Serialize;
use std::net::IpAddr;
use uuid::Uuid;

/// The attributes of a VM interface, as the client tracks them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PortCfg {
    /// Identifier of the VIF itself. This is the key the agent uses.
    pub port_id: Uuid,

    /// Identifier of the instance which owns the VIF.
    pub instance_id: Uuid,

    /// Name of the tap/VIF device on the host.
    pub interface_name: String,

    /// The address assigned to the VIF.
    pub interface_addr: IpAddr,

    /// The guest-facing MAC address.
    pub mac_addr: MacAddr,

    /// Identifier of the virtual network the VIF is attached to.
    pub network_id: Uuid,

    /// The primary VLAN tag.
    pub vlan_id: u16,

    /// The isolated (secondary) VLAN tag.
    pub isolated_vlan_id: u16,

    /// Human-readable name of the owning instance.
    pub display_name: String,

    /// The owning project, if the orchestrator tracks one.
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// A port as it is carried in an `AddPort` batch.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Port {
    pub port_id: WireUuid,
    pub instance_id: WireUuid,
    pub tap_name: String,
    pub ip_address: String,
    pub vn_id: WireUuid,
    pub mac_address: String,
    pub display_name: Option<String>,
    pub vlan_id: Option<i16>,
    pub isolated_vlan_id: Option<i16>,
    pub vm_project_id: Option<WireUuid>,
}

impl From<&PortCfg> for Port {
    fn from(cfg: &PortCfg) -> Self {
        Self {
            port_id: uuid_to_wire(&cfg.port_id),
            instance_id: uuid_to_wire(&cfg.instance_id),
            tap_name: cfg.interface_name.clone(),
            ip_address: cfg.interface_addr.to_string(),
            vn_id: uuid_to_wire(&cfg.network_id),
            mac_address: cfg.mac_addr.to_string(),
            display_name: Some(cfg.display_name.clone()),
            // The agent's schema uses signed 16-bit fields; keep the
            // bit pattern.
            vlan_id: Some(cfg.vlan_id as i16),
            isolated_vlan_id: Some(cfg.isolated_vlan_id as i16),
            vm_project_id: cfg.project_id.as_ref().map(uuid_to_wire),
        }
    }
}
