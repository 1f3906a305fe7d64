// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Client side of the vrouter agent's instance service.
//!
//! The [`InstanceService`] trait names the four remote operations the
//! port client depends on, and [`Connector`] names how a fresh link to
//! the agent is opened. [`TcpConnector`] and [`RpcClient`] are the
//! stock implementations, carrying each command over a length-prefixed
//! TCP stream.

use std::io;
use thiserror::Error;
pub use vrouter_api::AgentCmd;
pub use vrouter_api::AgentError;
use vrouter_api::Port;
use vrouter_api::WireUuid;

mod client;
pub mod frame;

pub use client::RpcClient;
pub use client::TcpConnector;
pub use client::run_cmd;

/// Errors related to talking to the vrouter agent.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument {0}")]
    InvalidArgument(String),

    #[error("unable to resolve host {0}")]
    UnreachableHost(String),

    #[error("no link to the agent")]
    NotConnected,

    #[error("timed out talking to agent: {0}")]
    Timeout(io::Error),

    #[error("error interacting with agent: {0}")]
    Io(io::Error),

    #[error("request serialization failed for command {0}: {1}")]
    ReqSer(AgentCmd, postcard::Error),

    #[error("response deserialization failed for command {0}: {1}")]
    RespDeser(AgentCmd, postcard::Error),

    #[error(
        "frame of {0} bytes exceeds the {max} byte limit",
        max = frame::MAX_FRAME_LEN
    )]
    FrameTooLarge(usize),

    #[error("command {0} failed: {1}")]
    CommandError(AgentCmd, AgentError),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // A socket read timeout surfaces as either of these
            // depending on the platform.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Error::Timeout(e)
            }
            _ => Error::Io(e),
        }
    }
}

impl Error {
    /// Did this error come from the link to the agent (as opposed to
    /// the caller's input)?
    ///
    /// Any transport error means the link can no longer be trusted.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_) | Self::UnreachableHost(_))
    }
}

/// The remote operations offered by the agent.
pub trait InstanceService {
    /// Handshake. Must be the first call on a new link.
    fn connect(&mut self) -> Result<(), Error>;

    /// Add or replace each port in `ports`.
    fn add_port(&mut self, ports: &[Port]) -> Result<(), Error>;

    /// Remove a port. Removing an unknown port is not an error.
    fn delete_port(&mut self, port_id: WireUuid) -> Result<(), Error>;

    /// Verify that the link is still usable.
    fn keep_alive_check(&mut self) -> Result<(), Error>;
}

/// Opens new links to the agent.
pub trait Connector {
    type Client: InstanceService;

    /// Establish the transport. No RPC is made.
    fn open(&self) -> Result<Self::Client, Error>;

    /// A description of where links go, for logging.
    fn peer(&self) -> String;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn io_timeouts_are_classified() {
        let e = Error::from(io::Error::from(io::ErrorKind::WouldBlock));
        assert!(matches!(e, Error::Timeout(_)));
        let e = Error::from(io::Error::from(io::ErrorKind::TimedOut));
        assert!(matches!(e, Error::Timeout(_)));
        let e = Error::from(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn input_errors_are_not_transport_errors() {
        assert!(!Error::InvalidArgument("x".into()).is_transport());
        assert!(!Error::UnreachableHost("x".into()).is_transport());
        assert!(Error::NotConnected.is_transport());
        assert!(Error::FrameTooLarge(1 << 30).is_transport());
        assert!(
            Error::CommandError(
                AgentCmd::AddPort,
                AgentError::PortRejected("unknown vn".into())
            )
            .is_transport()
        );
    }
}
