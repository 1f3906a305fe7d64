// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! A TCP agent speaking the framed command protocol.
//!
//! Each accepted link is served on its own thread. Every request is
//! recorded and acknowledged; there is no port logic beyond that.

use super::Call;
use serde::de::DeserializeOwned;
use std::io;
use std::net::Shutdown;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use vrouter_api::AddPortReq;
use vrouter_api::AgentCmd;
use vrouter_api::AgentError;
use vrouter_api::CmdResp;
use vrouter_api::DeletePortReq;
use vrouter_api::NoResp;
use vrouter_api::RpcHdr;
use vrouter_rpc::Error;
use vrouter_rpc::frame::read_frame;
use vrouter_rpc::frame::write_frame;

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<Call>>,
    links: Mutex<Vec<TcpStream>>,
    stop: AtomicBool,
}

pub struct FakeAgent {
    addr: SocketAddr,
    shared: Arc<Shared>,
    acceptor: Option<JoinHandle<()>>,
}

impl FakeAgent {
    /// Listen on an ephemeral loopback port.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared::default());

        let acceptor = {
            let shared = shared.clone();
            std::thread::spawn(move || accept_loop(listener, shared))
        };

        Self { addr, shared, acceptor: Some(acceptor) }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().unwrap().clone()
    }

    /// Number of links accepted so far.
    pub fn links(&self) -> usize {
        self.shared.links.lock().unwrap().len()
    }

    /// Tear down every link accepted so far. The listener stays up.
    pub fn disconnect_all(&self) {
        for link in self.shared.links.lock().unwrap().iter() {
            let _ = link.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for FakeAgent {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.disconnect_all();
        // Wake the acceptor so it notices the stop flag.
        let _ = TcpStream::connect(self.addr);
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
    }
}

fn accept_loop(listener: TcpListener, shared: Arc<Shared>) {
    for stream in listener.incoming() {
        if shared.stop.load(Ordering::SeqCst) {
            return;
        }

        let Ok(stream) = stream else {
            continue;
        };

        if let Ok(clone) = stream.try_clone() {
            shared.links.lock().unwrap().push(clone);
        }

        let shared = shared.clone();
        std::thread::spawn(move || {
            let _ = serve(stream, &shared);
        });
    }
}

fn serve(mut stream: TcpStream, shared: &Shared) -> Result<(), Error> {
    loop {
        let hdr = read_frame(&mut stream)?;
        let resp =
            handle(&mut stream, &hdr, shared).map(|_| NoResp::default());
        reply(&mut stream, &resp)?;
    }
}

fn handle(
    stream: &mut TcpStream,
    hdr: &[u8],
    shared: &Shared,
) -> Result<(), AgentError> {
    // An undecodable header leaves no way to know whether a body
    // follows; the link is out of step from here on.
    let hdr: RpcHdr = postcard::from_bytes(hdr)
        .map_err(|e| AgentError::DeserCmdReq(e.to_string()))?;
    let cmd = hdr.cmd();

    if !hdr.check_version() {
        // Consume the body so the next header lines up.
        if matches!(cmd, Ok(cmd) if cmd.has_body()) {
            let _ = read_frame(stream);
        }
        return Err(AgentError::BadApiVersion {
            client: hdr.api_version,
            agent: vrouter_api::API_VERSION,
        });
    }

    let call = match cmd? {
        AgentCmd::Connect => Call::Connect,
        AgentCmd::KeepAliveCheck => Call::KeepAliveCheck,
        AgentCmd::AddPort => {
            let req: AddPortReq = read_body(stream)?;
            Call::AddPort(req.ports)
        }
        AgentCmd::DeletePort => {
            let req: DeletePortReq = read_body(stream)?;
            Call::DeletePort(req.port_id)
        }
    };

    shared.calls.lock().unwrap().push(call);
    Ok(())
}

fn read_body<T: DeserializeOwned>(
    stream: &mut TcpStream,
) -> Result<T, AgentError> {
    let body = read_frame(stream).map_err(|_| AgentError::NoRequestBody)?;
    postcard::from_bytes(&body)
        .map_err(|e| AgentError::DeserCmdReq(e.to_string()))
}

fn reply(
    stream: &mut TcpStream,
    resp: &CmdResp<NoResp>,
) -> Result<(), Error> {
    let bytes = postcard::to_allocvec(resp).map_err(|e| {
        Error::Io(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    })?;
    write_frame(stream, &bytes)
}
