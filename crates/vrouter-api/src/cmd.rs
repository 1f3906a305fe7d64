// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use super::API_VERSION;
use super::id::WireUuid;
use super::port::Port;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use serde::Deserialize;
use serde::Serialize;

/// The commands understood by the agent's instance service.
///
/// The discriminant is what travels in [`RpcHdr`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AgentCmd {
    Connect = 1,         // handshake, must precede anything else
    AddPort = 10,        // add or replace a batch of ports
    DeletePort = 11,     // remove a single port
    KeepAliveCheck = 20, // liveness check
}

impl TryFrom<u32> for AgentCmd {
    type Error = ();

    fn try_from(num: u32) -> Result<Self, Self::Error> {
        match num {
            1 => Ok(Self::Connect),
            10 => Ok(Self::AddPort),
            11 => Ok(Self::DeletePort),
            20 => Ok(Self::KeepAliveCheck),
            _ => Err(()),
        }
    }
}

impl AgentCmd {
    /// Does this command carry a request body?
    pub fn has_body(&self) -> bool {
        matches!(self, Self::AddPort | Self::DeletePort)
    }
}

impl Display for AgentCmd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Connect => "Connect",
            Self::AddPort => "AddPort",
            Self::DeletePort => "DeletePort",
            Self::KeepAliveCheck => "KeepAliveCheck",
        };

        write!(f, "{s}")
    }
}

/// The header preceding every request sent to the agent.
///
/// A request body, when the command has one, follows as its own
/// frame so the agent can reject a version mismatch before trying to
/// decode it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RpcHdr {
    pub api_version: u64,
    pub cmd: u32,
}

impl RpcHdr {
    pub fn new(cmd: AgentCmd) -> Self {
        Self { api_version: API_VERSION, cmd: cmd as u32 }
    }

    /// Is this the expected API version?
    pub fn check_version(&self) -> bool {
        self.api_version == API_VERSION
    }

    /// The command this header announces.
    pub fn cmd(&self) -> Result<AgentCmd, AgentError> {
        AgentCmd::try_from(self.cmd).map_err(|_| AgentError::BadCmd(self.cmd))
    }
}

/// Add (or replace) a batch of ports.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AddPortReq {
    pub ports: Vec<Port>,
}

/// Remove the port with the given identifier.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DeletePortReq {
    pub port_id: WireUuid,
}

/// A failure reported by the agent itself.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AgentError {
    BadApiVersion { client: u64, agent: u64 },
    BadCmd(u32),
    DeserCmdReq(String),
    NoRequestBody,
    /// The agent refused a port, for example because it names an
    /// unknown virtual network.
    PortRejected(String),
    System(String),
}

impl Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BadApiVersion { client, agent } => write!(
                f,
                "API version mismatch: client {client}, agent {agent}"
            ),
            Self::BadCmd(num) => write!(f, "unknown command {num}"),
            Self::DeserCmdReq(msg) => {
                write!(f, "failed to decode request: {msg}")
            }
            Self::NoRequestBody => write!(f, "missing request body"),
            Self::PortRejected(msg) => write!(f, "port rejected: {msg}"),
            Self::System(msg) => write!(f, "{msg}"),
        }
    }
}

/// A marker trait indicating a success response type that is returned
/// from a command and may be passed across the RPC boundary.
pub trait CmdOk: Debug + Serialize {}

/// Indicates no meaningful response value on success.
#[derive(Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct NoResp {
    pub unused: u64,
}

impl CmdOk for NoResp {}

/// What the agent writes back for every request.
pub type CmdResp<T> = Result<T, AgentError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cmd_numbers_round_trip() {
        for cmd in [
            AgentCmd::Connect,
            AgentCmd::AddPort,
            AgentCmd::DeletePort,
            AgentCmd::KeepAliveCheck,
        ] {
            assert_eq!(AgentCmd::try_from(cmd as u32), Ok(cmd));
        }
        assert_eq!(AgentCmd::try_from(2), Err(()));
    }

    #[test]
    fn only_port_cmds_have_bodies() {
        assert!(!AgentCmd::Connect.has_body());
        assert!(AgentCmd::AddPort.has_body());
        assert!(AgentCmd::DeletePort.has_body());
        assert!(!AgentCmd::KeepAliveCheck.has_body());
    }

    #[test]
    fn hdr_version_check() {
        let hdr = RpcHdr::new(AgentCmd::KeepAliveCheck);
        assert!(hdr.check_version());
        let old = RpcHdr { api_version: 0, ..hdr };
        assert!(!old.check_version());

        let bytes = postcard::to_allocvec(&hdr).unwrap();
        let decoded: RpcHdr = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, hdr);
    }

    #[test]
    fn hdr_carries_cmd_number() {
        let hdr = RpcHdr::new(AgentCmd::DeletePort);
        assert_eq!(hdr.cmd, 11);
        assert_eq!(hdr.cmd(), Ok(AgentCmd::DeletePort));

        let bogus = RpcHdr { cmd: 2, ..hdr };
        assert_eq!(bogus.cmd(), Err(AgentError::BadCmd(2)));
    }
}
