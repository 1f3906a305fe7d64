// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use super::Connector;
use super::Error;
use super::InstanceService;
use super::frame::read_frame;
use super::frame::write_frame;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::time::Duration;
use vrouter_api::AddPortReq;
use vrouter_api::AgentCmd;
use vrouter_api::CmdOk;
use vrouter_api::CmdResp;
use vrouter_api::DeletePortReq;
use vrouter_api::NoResp;
use vrouter_api::Port;
use vrouter_api::RpcHdr;
use vrouter_api::WireUuid;

/// Opens plain TCP links to an agent.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    addr: SocketAddr,
    timeout: Option<Duration>,
}

impl TcpConnector {
    /// A `timeout_ms` of zero means block forever.
    pub fn new(addr: SocketAddr, timeout_ms: u32) -> Self {
        let timeout = match timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(u64::from(ms))),
        };
        Self { addr, timeout }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Connector for TcpConnector {
    type Client = RpcClient<TcpStream>;

    fn open(&self) -> Result<Self::Client, Error> {
        let stream = match self.timeout {
            Some(timeout) => TcpStream::connect_timeout(&self.addr, timeout)?,
            None => TcpStream::connect(self.addr)?,
        };

        // The same bound applies to every call made over the link.
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        stream.set_nodelay(true)?;
        Ok(RpcClient::new(stream))
    }

    fn peer(&self) -> String {
        self.addr.to_string()
    }
}

/// A link to the agent over any byte stream.
#[derive(Debug)]
pub struct RpcClient<S> {
    stream: S,
}

impl<S: Read + Write> RpcClient<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> InstanceService for RpcClient<S> {
    fn connect(&mut self) -> Result<(), Error> {
        let _: NoResp =
            run_cmd(&mut self.stream, AgentCmd::Connect, None::<&()>)?;
        Ok(())
    }

    fn add_port(&mut self, ports: &[Port]) -> Result<(), Error> {
        let req = AddPortReq { ports: ports.to_vec() };
        let _: NoResp =
            run_cmd(&mut self.stream, AgentCmd::AddPort, Some(&req))?;
        Ok(())
    }

    fn delete_port(&mut self, port_id: WireUuid) -> Result<(), Error> {
        let req = DeletePortReq { port_id };
        let _: NoResp =
            run_cmd(&mut self.stream, AgentCmd::DeletePort, Some(&req))?;
        Ok(())
    }

    fn keep_alive_check(&mut self) -> Result<(), Error> {
        let _: NoResp =
            run_cmd(&mut self.stream, AgentCmd::KeepAliveCheck, None::<&()>)?;
        Ok(())
    }
}

/// Send `cmd` (and its request body, if any) and wait for the agent's
/// response.
pub fn run_cmd<S, T, R>(
    stream: &mut S,
    cmd: AgentCmd,
    req: Option<&R>,
) -> Result<T, Error>
where
    S: Read + Write,
    T: CmdOk + DeserializeOwned,
    R: Serialize,
{
    let hdr = postcard::to_allocvec(&RpcHdr::new(cmd))
        .map_err(|e| Error::ReqSer(cmd, e))?;

    // Encode the body before writing anything so that a serialization
    // failure leaves the stream untouched.
    let body = match req {
        Some(req) => Some(
            postcard::to_allocvec(req).map_err(|e| Error::ReqSer(cmd, e))?,
        ),

        None if cmd.has_body() => {
            return Err(Error::InvalidArgument(format!(
                "command {cmd} requires a request body"
            )));
        }

        None => None,
    };

    write_frame(stream, &hdr)?;
    if let Some(body) = body {
        write_frame(stream, &body)?;
    }
    stream.flush()?;

    let resp_bytes = read_frame(stream)?;
    let resp: CmdResp<T> = postcard::from_bytes(&resp_bytes)
        .map_err(|e| Error::RespDeser(cmd, e))?;
    resp.map_err(|e| Error::CommandError(cmd, e))
}
