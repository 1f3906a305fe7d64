// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Drive a `VrouterApi` against an agent listening on loopback.

use std::net::TcpListener;
use vrouter_port::ClientCfg;
use vrouter_port::Error;
use vrouter_port::PortText;
use vrouter_port::VrouterApi;
use vrouter_test_utils::*;

fn cfg(agent: &FakeAgent) -> ClientCfg {
    ClientCfg::new(agent.addr().ip(), agent.addr().port())
}

#[test]
fn register_and_unregister() {
    let agent = FakeAgent::start();
    let mut api = VrouterApi::new(&cfg(&agent), &test_logger());

    api.register_port(port_cfg(1)).unwrap();
    api.register_port(port_cfg(2)).unwrap();
    api.unregister_port(port_cfg(1).port_id).unwrap();
    api.periodic_connection_check().unwrap();

    assert_eq!(
        agent.calls(),
        vec![
            Call::Connect,
            Call::AddPort(vec![wire_port(1)]),
            Call::AddPort(vec![wire_port(2)]),
            Call::DeletePort(uuid_to_wire(&port_cfg(1).port_id)),
            Call::KeepAliveCheck,
        ]
    );
    assert_eq!(agent.links(), 1);
}

#[test]
fn dropped_link_is_resynced() {
    let agent = FakeAgent::start();
    let mut api = VrouterApi::new(&cfg(&agent), &test_logger());
    api.register_port(port_cfg(1)).unwrap();
    api.register_port(port_cfg(2)).unwrap();

    agent.disconnect_all();
    assert!(api.periodic_connection_check().is_err());
    assert!(!api.is_connected());

    api.periodic_connection_check().unwrap();
    assert!(api.is_connected());
    assert_eq!(agent.links(), 2);

    let calls = agent.calls();
    assert_eq!(
        calls[calls.len() - 3..],
        [
            Call::Connect,
            Call::AddPort(vec![wire_port(1), wire_port(2)]),
            Call::KeepAliveCheck,
        ]
    );
}

#[test]
fn one_shot_skips_handshake() {
    let agent = FakeAgent::start();
    let cfg = cfg(&agent).one_shot(true);
    let mut api = VrouterApi::new(&cfg, &test_logger());

    // The first call only opens the link.
    api.register_port(port_cfg(7)).unwrap();
    assert!(api.is_connected());

    api.register_port(port_cfg(8)).unwrap();
    api.periodic_connection_check().unwrap();
    assert_eq!(
        agent.calls(),
        vec![Call::AddPort(vec![wire_port(8)]), Call::KeepAliveCheck]
    );
    assert_eq!(agent.links(), 1);
}

#[test]
fn silent_agent_times_out() {
    // Connections complete in the backlog but nothing ever answers.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let cfg = ClientCfg::new(addr.ip(), addr.port()).timeout_ms(200);
    let mut api = VrouterApi::new(&cfg, &test_logger());

    let err = api.register_port(port_cfg(1)).unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "{err:?}");
    assert!(!api.is_connected());
    assert_eq!(api.ports().len(), 1);

    // A timed-out check is no different.
    let err = api.periodic_connection_check().unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "{err:?}");
    assert!(!api.is_connected());
    drop(listener);
}

#[test]
fn refused_connection_keeps_registry() {
    // Grab a free port, then close it so nothing is listening.
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap()
    };

    let cfg = ClientCfg::new(addr.ip(), addr.port()).timeout_ms(200);
    let mut api = VrouterApi::new(&cfg, &test_logger());

    let err = api.register_port(port_cfg(1)).unwrap_err();
    assert!(err.is_transport());
    assert!(!api.is_connected());
    assert_eq!(api.ports().len(), 1);

    assert!(api.unregister_port(port_cfg(1).port_id).is_err());
    assert!(api.ports().is_empty());
}

#[test]
fn text_input_checked_before_connecting() {
    let agent = FakeAgent::start();
    let mut api = VrouterApi::new(&cfg(&agent), &test_logger());

    let text = PortText {
        port_id: "not-a-uuid".into(),
        ..Default::default()
    };
    assert!(matches!(
        api.register_port_text(&text),
        Err(Error::InvalidArgument(_))
    ));
    assert!(api.ports().is_empty());
    assert_eq!(agent.links(), 0);
}
