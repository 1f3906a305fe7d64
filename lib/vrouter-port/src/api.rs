// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use crate::cfg::ClientCfg;
use crate::conn::ConnectionManager;
use crate::conn::Established;
use crate::registry::PortRegistry;
use crate::text::PortText;
use crate::text::parse_uuid;
use slog::Logger;
use slog::debug;
use slog::error;
use uuid::Uuid;
use vrouter_api::Port;
use vrouter_api::PortCfg;
use vrouter_api::uuid_to_wire;
use vrouter_rpc::Connector;
use vrouter_rpc::Error;
use vrouter_rpc::InstanceService;
use vrouter_rpc::TcpConnector;

/// Registers VM ports with a vrouter agent.
///
/// Every change is applied to the local [`PortRegistry`] first and then
/// pushed to the agent on a best-effort basis. When the agent can't be
/// reached the call fails, but the registry keeps the change; the next
/// successful connection replays the whole registry. It is up to the
/// caller to retry, typically by calling
/// [`VrouterApi::periodic_connection_check`] on a timer.
///
/// There is no internal locking. Callers sharing a `VrouterApi`
/// between threads must serialize access themselves.
pub struct VrouterApi<C: Connector = TcpConnector> {
    registry: PortRegistry,
    conn: ConnectionManager<C>,
}

impl VrouterApi<TcpConnector> {
    pub fn new(cfg: &ClientCfg, log: &Logger) -> Self {
        Self::with_connector(cfg.connector(), cfg.one_shot, log)
    }
}

impl<C: Connector> VrouterApi<C> {
    pub fn with_connector(connector: C, one_shot: bool, log: &Logger) -> Self {
        Self {
            registry: PortRegistry::new(),
            conn: ConnectionManager::new(connector, one_shot, log),
        }
    }

    /// The ports registered so far.
    pub fn ports(&self) -> &PortRegistry {
        &self.registry
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Register (or re-register) a port.
    pub fn register_port(&mut self, cfg: PortCfg) -> Result<(), Error> {
        let port_id = cfg.port_id;
        let port = Port::from(&cfg);
        self.registry.upsert(port_id, cfg);

        self.propagate("AddPort", |link| link.add_port(&[port])).map_err(|e| {
            error!(
                self.conn.log(),
                "AddPort FAILED";
                "port_id" => %port_id,
                "error" => %e
            );
            e
        })
    }

    /// Register a port given in text form.
    ///
    /// Nothing changes, locally or remotely, if any field fails to
    /// parse.
    pub fn register_port_text(&mut self, text: &PortText) -> Result<(), Error> {
        let cfg = text.parse().map_err(|e| {
            error!(self.conn.log(), "AddPort rejected"; "error" => %e);
            e
        })?;
        self.register_port(cfg)
    }

    /// Unregister a port. Unregistering an unknown port is not an
    /// error; the agent is still told, as it may know the port from an
    /// earlier registration.
    pub fn unregister_port(&mut self, port_id: Uuid) -> Result<(), Error> {
        if self.registry.remove(&port_id).is_none() {
            debug!(
                self.conn.log(),
                "unregistering unknown port";
                "port_id" => %port_id
            );
        }

        let wire_id = uuid_to_wire(&port_id);
        self.propagate("DeletePort", |link| link.delete_port(wire_id)).map_err(
            |e| {
                error!(
                    self.conn.log(),
                    "DeletePort FAILED";
                    "port_id" => %port_id,
                    "error" => %e
                );
                e
            },
        )
    }

    /// Unregister a port given by its textual identifier.
    pub fn unregister_port_text(&mut self, port_id: &str) -> Result<(), Error> {
        let port_id = parse_uuid("port_id", port_id).map_err(|e| {
            error!(self.conn.log(), "DeletePort rejected"; "error" => %e);
            e
        })?;
        self.unregister_port(port_id)
    }

    /// Check the link to the agent, re-establishing it if needed.
    ///
    /// The caller is expected to invoke this on a fixed cadence. A
    /// missing link is recreated (with a full resync); an existing one
    /// is checked with a keep-alive and dropped if that fails. No
    /// retry happens within a single call.
    pub fn periodic_connection_check(&mut self) -> Result<(), Error> {
        let res = self.conn.ensure_connected(&self.registry).and_then(|_| {
            self.conn.call("KeepAliveCheck", |link| link.keep_alive_check())
        });

        if let Err(e) = &res {
            error!(
                self.conn.log(),
                "PeriodicConnectionCheck FAILED";
                "error" => %e
            );
        }
        res
    }

    // Only an already established link carries the single change. A
    // link opened here either replayed the registry (which includes
    // the change) or, in one-shot mode, carries nothing until the
    // next call.
    fn propagate<F>(&mut self, what: &str, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut C::Client) -> Result<(), Error>,
    {
        match self.conn.ensure_connected(&self.registry)? {
            Established::Resynced | Established::OneShot => Ok(()),
            Established::Existing => {
                debug!(self.conn.log(), "pushing change"; "op" => what);
                self.conn.call(what, f)
            }
        }
    }
}
