// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! An in-memory agent.
//!
//! `MockAgent` stands in for both the transport and the agent. It
//! records every call made over any of its links, keeps an agent-side
//! view of the ports so tests can check convergence, and can be told
//! to become unreachable or to fail particular commands.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use vrouter_api::AgentCmd;
use vrouter_api::Port;
use vrouter_api::WireUuid;
use vrouter_rpc::Connector;
use vrouter_rpc::Error;
use vrouter_rpc::InstanceService;

/// A call observed by the agent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    Connect,
    AddPort(Vec<Port>),
    DeletePort(WireUuid),
    KeepAliveCheck,
}

impl Call {
    pub fn cmd(&self) -> AgentCmd {
        match self {
            Self::Connect => AgentCmd::Connect,
            Self::AddPort(_) => AgentCmd::AddPort,
            Self::DeletePort(_) => AgentCmd::DeletePort,
            Self::KeepAliveCheck => AgentCmd::KeepAliveCheck,
        }
    }
}

#[derive(Debug)]
struct MockState {
    reachable: bool,
    failing: BTreeSet<u32>,
    // Bumped on restart; links from an older generation are dead.
    generation: u64,
    opens: usize,
    calls: Vec<Call>,
    ports: BTreeMap<WireUuid, Port>,
}

#[derive(Clone, Debug)]
pub struct MockAgent {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgent {
    /// A reachable agent with no ports.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                reachable: true,
                failing: BTreeSet::new(),
                generation: 0,
                opens: 0,
                calls: vec![],
                ports: BTreeMap::new(),
            })),
        }
    }

    /// An agent which refuses every connection until made reachable.
    pub fn unreachable() -> Self {
        let agent = Self::new();
        agent.set_reachable(false);
        agent
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// While unreachable, opening a link fails and so does every call
    /// on an existing link.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Make every future `cmd` fail until `clear_failures()`.
    pub fn fail_cmd(&self, cmd: AgentCmd) {
        self.lock().failing.insert(cmd as u32);
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Simulate an agent restart: all links die and the agent forgets
    /// its ports.
    pub fn restart(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.ports.clear();
    }

    /// Number of successful transport opens.
    pub fn opens(&self) -> usize {
        self.lock().opens
    }

    /// All calls received so far, including failed ones.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Return and forget the calls received so far.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.lock().calls)
    }

    /// The ports the agent currently holds, in identifier order.
    pub fn ports(&self) -> Vec<Port> {
        self.lock().ports.values().cloned().collect()
    }

    fn handle(&self, generation: u64, call: Call) -> Result<(), Error> {
        let mut state = self.lock();
        let cmd = call.cmd();
        state.calls.push(call.clone());

        if !state.reachable || state.generation != generation {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "agent went away",
            )));
        }

        if state.failing.contains(&(cmd as u32)) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("injected {cmd} failure"),
            )));
        }

        match call {
            Call::AddPort(ports) => {
                for port in ports {
                    state.ports.insert(port.port_id, port);
                }
            }

            Call::DeletePort(id) => {
                state.ports.remove(&id);
            }

            Call::Connect | Call::KeepAliveCheck => {}
        }

        Ok(())
    }
}

impl Connector for MockAgent {
    type Client = MockLink;

    fn open(&self) -> Result<Self::Client, Error> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(Error::Io(io::Error::from(
                io::ErrorKind::ConnectionRefused,
            )));
        }

        state.opens += 1;
        Ok(MockLink { agent: self.clone(), generation: state.generation })
    }

    fn peer(&self) -> String {
        "mock-agent".to_string()
    }
}

/// A link handed out by [`MockAgent`].
#[derive(Debug)]
pub struct MockLink {
    agent: MockAgent,
    generation: u64,
}

impl InstanceService for MockLink {
    fn connect(&mut self) -> Result<(), Error> {
        self.agent.handle(self.generation, Call::Connect)
    }

    fn add_port(&mut self, ports: &[Port]) -> Result<(), Error> {
        self.agent.handle(self.generation, Call::AddPort(ports.to_vec()))
    }

    fn delete_port(&mut self, port_id: WireUuid) -> Result<(), Error> {
        self.agent.handle(self.generation, Call::DeletePort(port_id))
    }

    fn keep_alive_check(&mut self) -> Result<(), Error> {
        self.agent.handle(self.generation, Call::KeepAliveCheck)
    }
}
