// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Common routines for integration tests.

// This type of pedantry is more trouble than it's worth here.
#![allow(dead_code)]

pub mod fake_agent;
pub mod mock;

pub use fake_agent::FakeAgent;
pub use mock::Call;
pub use mock::MockAgent;
pub use mock::MockLink;

use slog::Drain;
use uuid::Uuid;
pub use vrouter_api::MacAddr;
pub use vrouter_api::Port;
pub use vrouter_api::PortCfg;
pub use vrouter_api::uuid_to_wire;

/// A logger which writes through the test harness's captured stdout.
pub fn test_logger() -> slog::Logger {
    let decorator =
        slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    slog::Logger::root(drain, slog::o!())
}

/// Build a distinct, fully populated port configuration from a small
/// number.
pub fn port_cfg(n: u8) -> PortCfg {
    PortCfg {
        port_id: Uuid::from_u128(0x1000 + u128::from(n)),
        instance_id: Uuid::from_u128(0x2000 + u128::from(n)),
        interface_name: format!("tap{n}"),
        interface_addr: format!("10.0.0.{n}").parse().unwrap(),
        mac_addr: MacAddr::from([0xa8, 0x40, 0x25, 0x00, 0x00, n]),
        network_id: Uuid::from_u128(0x3000),
        vlan_id: 100,
        isolated_vlan_id: 200,
        display_name: format!("vm-{n}"),
        project_id: Some(Uuid::from_u128(0x4000)),
    }
}

/// The wire form of `port_cfg(n)`.
pub fn wire_port(n: u8) -> Port {
    Port::from(&port_cfg(n))
}
