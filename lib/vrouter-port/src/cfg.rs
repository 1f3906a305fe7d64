// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use serde::Deserialize;
use serde::Serialize;
use std::net::IpAddr;
use std::net::SocketAddr;
use vrouter_rpc::TcpConnector;

/// Where the agent lives and how to talk to it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClientCfg {
    /// The agent's address.
    pub addr: IpAddr,

    /// The agent's instance service port.
    #[serde(default = "ClientCfg::default_port")]
    pub port: u16,

    /// Skip the handshake and the resync when a link is opened.
    ///
    /// For callers which drive the agent with one-off commands and
    /// have no registry worth replaying.
    #[serde(default)]
    pub one_shot: bool,

    /// Socket timeout applied to connects and to every call. Zero
    /// means no timeout.
    #[serde(default = "ClientCfg::default_timeout_ms")]
    pub timeout_ms: u32,
}

impl ClientCfg {
    pub const DEFAULT_PORT: u16 = 9090;
    pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

    pub fn new(addr: IpAddr, port: u16) -> Self {
        Self {
            addr,
            port,
            one_shot: false,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn sockaddr(&self) -> SocketAddr {
        SocketAddr::new(self.addr, self.port)
    }

    pub fn connector(&self) -> TcpConnector {
        TcpConnector::new(self.sockaddr(), self.timeout_ms)
    }

    fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }

    fn default_timeout_ms() -> u32 {
        Self::DEFAULT_TIMEOUT_MS
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let cfg = ClientCfg::new("127.0.0.1".parse().unwrap(), 9090);
        assert!(!cfg.one_shot);
        assert_eq!(cfg.timeout_ms, 1000);
        assert_eq!(cfg.sockaddr(), "127.0.0.1:9090".parse().unwrap());
        assert_eq!(cfg.connector().timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn no_timeout() {
        let cfg = ClientCfg::new("::1".parse().unwrap(), 9090).timeout_ms(0);
        assert_eq!(cfg.connector().timeout(), None);
        assert_eq!(cfg.connector().addr(), "[::1]:9090".parse().unwrap());
    }
}
