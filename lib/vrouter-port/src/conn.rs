// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! The lifecycle of the link to the agent.
//!
//! A link is created lazily, the first time an operation needs one,
//! and is thrown away as soon as any call on it fails. There is no
//! background reconnect: the next operation (or periodic check) pays
//! for the new link, including the full resync that comes with it.

use crate::registry::PortRegistry;
use crate::resync::resynchronize;
use slog::Logger;
use slog::debug;
use slog::error;
use slog::info;
use vrouter_rpc::Connector;
use vrouter_rpc::Error;
use vrouter_rpc::InstanceService;

/// The state of the link to the agent.
#[derive(Debug)]
pub enum ConnState<L> {
    /// No usable link; the next operation must create one.
    Disconnected,

    /// A link which has completed its handshake and resync (or, in
    /// one-shot mode, merely been opened).
    Connected(L),
}

impl<L> ConnState<L> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// What `ensure_connected()` had to do to produce a link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Established {
    /// The link was already up.
    Existing,

    /// A new link was opened, the handshake done, and the full
    /// registry pushed.
    Resynced,

    /// A new link was opened in one-shot mode. Nothing was sent.
    OneShot,
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    one_shot: bool,
    state: ConnState<C::Client>,
    log: Logger,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, one_shot: bool, log: &Logger) -> Self {
        let log = log.new(slog::o!("agent" => connector.peer()));
        Self { connector, one_shot, state: ConnState::Disconnected, log }
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn is_one_shot(&self) -> bool {
        self.one_shot
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }

    /// Drop the current link, if any.
    pub fn disconnect(&mut self) {
        if self.state.is_connected() {
            debug!(self.log, "dropping link");
        }
        self.state = ConnState::Disconnected;
    }

    /// Make sure there is a usable link, creating one if needed.
    ///
    /// A new link is handshaken and then brought up to date with
    /// every port in `registry` before it is considered connected. In
    /// one-shot mode both steps are skipped. On failure the manager
    /// stays disconnected.
    pub fn ensure_connected(
        &mut self,
        registry: &PortRegistry,
    ) -> Result<Established, Error> {
        if self.state.is_connected() {
            return Ok(Established::Existing);
        }

        let mut link = self.connector.open().map_err(|e| {
            error!(self.log, "failed to open link"; "error" => %e);
            e
        })?;

        if self.one_shot {
            debug!(self.log, "link opened (one-shot)");
            self.state = ConnState::Connected(link);
            return Ok(Established::OneShot);
        }

        if let Err(e) = link.connect() {
            error!(self.log, "Connect failed"; "error" => %e);
            return Err(e);
        }

        info!(self.log, "connected to agent");

        match resynchronize(&mut link, registry) {
            Ok(nports) => {
                info!(self.log, "resynchronized"; "ports" => nports);
                self.state = ConnState::Connected(link);
                Ok(Established::Resynced)
            }

            Err(e) => {
                error!(self.log, "resynchronize failed"; "error" => %e);
                Err(e)
            }
        }
    }

    /// Run `f` against the current link.
    ///
    /// Any error from `f` drops the link. Without a link this fails
    /// with `NotConnected` and does not try to create one.
    pub fn call<T, F>(&mut self, what: &str, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut C::Client) -> Result<T, Error>,
    {
        let ConnState::Connected(link) = &mut self.state else {
            return Err(Error::NotConnected);
        };

        let res = f(link);
        if let Err(e) = &res {
            debug!(self.log, "{} failed, dropping link", what; "error" => %e);
            self.state = ConnState::Disconnected;
        }
        res
    }
}
