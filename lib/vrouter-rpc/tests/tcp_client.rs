// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use std::net::TcpStream;
use vrouter_api::AddPortReq;
use vrouter_api::AgentCmd;
use vrouter_api::AgentError;
use vrouter_api::CmdResp;
use vrouter_api::NoResp;
use vrouter_api::RpcHdr;
use vrouter_rpc::Connector;
use vrouter_rpc::Error;
use vrouter_rpc::InstanceService;
use vrouter_rpc::RpcClient;
use vrouter_rpc::TcpConnector;
use vrouter_rpc::frame::read_frame;
use vrouter_rpc::frame::write_frame;
use vrouter_test_utils::*;

#[test]
fn every_operation_reaches_the_agent() {
    let agent = FakeAgent::start();
    let connector = TcpConnector::new(agent.addr(), 1000);
    assert_eq!(connector.peer(), agent.addr().to_string());

    let mut link = connector.open().unwrap();
    link.connect().unwrap();
    link.add_port(&[wire_port(1), wire_port(2)]).unwrap();
    link.delete_port(uuid_to_wire(&port_cfg(1).port_id)).unwrap();
    link.keep_alive_check().unwrap();

    assert_eq!(
        agent.calls(),
        vec![
            Call::Connect,
            Call::AddPort(vec![wire_port(1), wire_port(2)]),
            Call::DeletePort(uuid_to_wire(&port_cfg(1).port_id)),
            Call::KeepAliveCheck,
        ]
    );
}

#[test]
fn link_fails_once_agent_hangs_up() {
    let agent = FakeAgent::start();
    let mut link = TcpConnector::new(agent.addr(), 1000).open().unwrap();
    link.connect().unwrap();

    agent.disconnect_all();
    assert!(matches!(link.keep_alive_check(), Err(Error::Io(_))));
}

#[test]
fn agent_rejects_version_mismatch() {
    let agent = FakeAgent::start();
    let mut stream = TcpStream::connect(agent.addr()).unwrap();

    let hdr = RpcHdr {
        api_version: 999,
        ..RpcHdr::new(AgentCmd::KeepAliveCheck)
    };
    write_frame(&mut stream, &postcard::to_allocvec(&hdr).unwrap()).unwrap();

    assert!(matches!(
        read_resp(&mut stream),
        Err(AgentError::BadApiVersion { client: 999, .. })
    ));
    assert!(agent.calls().is_empty());
}

fn read_resp(stream: &mut TcpStream) -> CmdResp<NoResp> {
    postcard::from_bytes(&read_frame(stream).unwrap()).unwrap()
}

#[test]
fn rejected_request_body_is_consumed() {
    let agent = FakeAgent::start();
    let mut stream = TcpStream::connect(agent.addr()).unwrap();

    // A stale AddPort, header and body.
    let hdr = RpcHdr { api_version: 999, ..RpcHdr::new(AgentCmd::AddPort) };
    let body = AddPortReq { ports: vec![wire_port(1)] };
    write_frame(&mut stream, &postcard::to_allocvec(&hdr).unwrap()).unwrap();
    write_frame(&mut stream, &postcard::to_allocvec(&body).unwrap()).unwrap();
    assert!(matches!(
        read_resp(&mut stream),
        Err(AgentError::BadApiVersion { .. })
    ));

    // The link is still in step for the next request.
    let mut link = RpcClient::new(stream);
    link.keep_alive_check().unwrap();
    assert_eq!(agent.calls(), vec![Call::KeepAliveCheck]);
}

#[test]
fn unknown_command_is_rejected() {
    let agent = FakeAgent::start();
    let mut stream = TcpStream::connect(agent.addr()).unwrap();

    let hdr = RpcHdr { cmd: 2, ..RpcHdr::new(AgentCmd::Connect) };
    write_frame(&mut stream, &postcard::to_allocvec(&hdr).unwrap()).unwrap();
    assert_eq!(read_resp(&mut stream), Err(AgentError::BadCmd(2)));
    assert!(agent.calls().is_empty());
}
