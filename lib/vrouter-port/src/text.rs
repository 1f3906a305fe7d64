// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Ports described as text, as an orchestrator tends to hand them over.

use serde::Deserialize;
use serde::Serialize;
use std::net::IpAddr;
use std::net::ToSocketAddrs;
use uuid::Uuid;
use vrouter_api::MacAddr;
use vrouter_api::PortCfg;
use vrouter_rpc::Error;

/// A port whose identifiers and addresses have not been parsed yet.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PortText {
    pub port_id: String,
    pub instance_id: String,
    pub interface_name: String,
    pub interface_addr: String,
    pub mac_addr: String,
    pub network_id: String,
    pub vlan_id: u16,
    pub isolated_vlan_id: u16,
    pub display_name: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl PortText {
    pub fn parse(&self) -> Result<PortCfg, Error> {
        let project_id = match self.project_id.as_deref() {
            None | Some("") => None,
            Some(id) => Some(parse_uuid("project_id", id)?),
        };

        Ok(PortCfg {
            port_id: parse_uuid("port_id", &self.port_id)?,
            instance_id: parse_uuid("instance_id", &self.instance_id)?,
            interface_name: self.interface_name.clone(),
            interface_addr: parse_addr(&self.interface_addr)?,
            mac_addr: parse_mac(&self.mac_addr)?,
            network_id: parse_uuid("network_id", &self.network_id)?,
            vlan_id: self.vlan_id,
            isolated_vlan_id: self.isolated_vlan_id,
            display_name: self.display_name.clone(),
            project_id,
        })
    }
}

/// Parse a required identifier. `what` names the field in the error.
pub fn parse_uuid(what: &str, s: &str) -> Result<Uuid, Error> {
    if s.is_empty() {
        return Err(Error::InvalidArgument(format!("{what}: missing")));
    }

    Uuid::parse_str(s)
        .map_err(|e| Error::InvalidArgument(format!("{what}: {s:?}: {e}")))
}

/// Parse an address literal, falling back to a name lookup.
pub fn parse_addr(s: &str) -> Result<IpAddr, Error> {
    if s.is_empty() {
        return Err(Error::InvalidArgument("interface_addr: missing".into()));
    }

    if let Ok(addr) = s.parse() {
        return Ok(addr);
    }

    (s, 0)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|sa| sa.ip())
        .ok_or_else(|| Error::UnreachableHost(s.to_string()))
}

pub fn parse_mac(s: &str) -> Result<MacAddr, Error> {
    s.parse()
        .map_err(|e| Error::InvalidArgument(format!("mac_addr: {s:?}: {e}")))
}
