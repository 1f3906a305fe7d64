// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Configuration and port files.
//!
//! A configuration file names the agent:
//!
//! ```toml
//! [agent]
//! addr = "10.0.0.1"
//! port = 9090
//! timeout_ms = 1000
//! ```
//!
//! A ports file lists the ports to keep registered, one `[[port]]`
//! table per port, with the same fields as [`PortText`].

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;
use vrouter_api::PortCfg;
use vrouter_port::ClientCfg;
use vrouter_port::PortText;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct AdmCfg {
    pub agent: ClientCfg,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct PortsFile {
    #[serde(default, rename = "port")]
    pub ports: Vec<PortText>,
}

impl PortsFile {
    /// Parse every port, failing on the first bad one.
    pub fn parse(&self) -> Result<Vec<PortCfg>> {
        self.ports
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                text.parse().with_context(|| format!("port #{idx}"))
            })
            .collect()
    }
}

pub fn load_cfg(path: &Path) -> Result<AdmCfg> {
    load_toml(path)
}

pub fn load_ports(path: &Path) -> Result<PortsFile> {
    load_toml(path)
}

fn load_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&s)
        .with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn agent_defaults() {
        let cfg: AdmCfg =
            toml::from_str("[agent]\naddr = \"10.0.0.1\"\n").unwrap();
        assert_eq!(
            cfg.agent,
            ClientCfg::new(
                "10.0.0.1".parse().unwrap(),
                ClientCfg::DEFAULT_PORT
            )
        );
    }

    #[test]
    fn agent_overrides() {
        let cfg: AdmCfg = toml::from_str(
            r#"
            [agent]
            addr = "fd00::1"
            port = 4000
            one_shot = true
            timeout_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.agent.port, 4000);
        assert!(cfg.agent.one_shot);
        assert_eq!(cfg.agent.timeout_ms, 0);
    }

    #[test]
    fn ports_file() {
        let ports: PortsFile = toml::from_str(
            r#"
            [[port]]
            port_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a01"
            instance_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a02"
            interface_name = "tap0"
            interface_addr = "10.1.1.3"
            mac_addr = "02:6f:1e:8a:8c:2f"
            network_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a03"
            vlan_id = 10
            isolated_vlan_id = 20
            display_name = "db-0"

            [[port]]
            port_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a11"
            instance_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a12"
            interface_name = "tap1"
            interface_addr = "10.1.1.4"
            mac_addr = "02:6f:1e:8a:8c:30"
            network_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a03"
            vlan_id = 10
            isolated_vlan_id = 20
            display_name = "db-1"
            project_id = "6f1e8a8c-2f5e-4d2b-9b1a-0c4e3c7d9a04"
            "#,
        )
        .unwrap();

        let cfgs = ports.parse().unwrap();
        assert_eq!(cfgs.len(), 2);
        assert_eq!(cfgs[0].interface_name, "tap0");
        assert_eq!(cfgs[0].project_id, None);
        assert!(cfgs[1].project_id.is_some());
    }

    #[test]
    fn bad_port_is_reported_by_index() {
        let ports = PortsFile {
            ports: vec![PortText {
                port_id: "x".into(),
                ..Default::default()
            }],
        };
        let err = ports.parse().unwrap_err();
        assert!(err.to_string().contains("port #0"));
    }

    #[test]
    fn empty_ports_file() {
        let ports: PortsFile = toml::from_str("").unwrap();
        assert!(ports.ports.is_empty());
    }
}
