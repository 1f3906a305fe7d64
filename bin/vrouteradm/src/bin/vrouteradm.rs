// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use slog::Logger;
use slog::info;

use vrouter_port::ClientCfg;
use vrouter_port::PortText;
use vrouter_port::VrouterApi;
use vrouter_port::text::parse_uuid;
use vrouteradm::cfg::load_cfg;
use vrouteradm::cfg::load_ports;
use vrouteradm::init_logger;
use vrouteradm::pkg_version;
use vrouteradm::print::print_ports;

/// Register instance ports with a vrouter agent.
///
/// Set `RUST_LOG` (e.g. `RUST_LOG=info`) for more than error output.
#[derive(Debug, Parser)]
#[command(version = pkg_version())]
struct Cli {
    #[command(flatten)]
    agent: AgentArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct AgentArgs {
    /// TOML file with an `[agent]` table.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Agent address, overriding the configuration file.
    #[arg(long, global = true)]
    agent: Option<IpAddr>,

    /// Agent port, overriding the configuration file.
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Socket timeout in milliseconds; zero disables it.
    #[arg(long, global = true)]
    timeout_ms: Option<u32>,
}

impl AgentArgs {
    fn client_cfg(&self) -> anyhow::Result<ClientCfg> {
        let mut cfg = match &self.config {
            Some(path) => load_cfg(path)?.agent,
            None => ClientCfg::new(
                Ipv4Addr::LOCALHOST.into(),
                ClientCfg::DEFAULT_PORT,
            ),
        };

        if let Some(addr) = self.agent {
            cfg.addr = addr;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            cfg.timeout_ms = timeout_ms;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
struct PortArgs {
    /// Port UUID.
    #[arg(long)]
    port_id: String,

    /// Instance UUID.
    #[arg(long)]
    instance_id: String,

    /// Host-side tap interface name.
    #[arg(long)]
    interface_name: String,

    /// IP address or hostname of the interface.
    #[arg(long)]
    interface_addr: String,

    /// MAC address of the interface.
    #[arg(long)]
    mac_addr: String,

    /// Virtual network UUID.
    #[arg(long)]
    network_id: String,

    #[arg(long, default_value_t = 0)]
    vlan_id: u16,

    #[arg(long, default_value_t = 0)]
    isolated_vlan_id: u16,

    #[arg(long, default_value = "")]
    display_name: String,

    /// Project UUID.
    #[arg(long)]
    project_id: Option<String>,
}

impl From<PortArgs> for PortText {
    fn from(a: PortArgs) -> Self {
        Self {
            port_id: a.port_id,
            instance_id: a.instance_id,
            interface_name: a.interface_name,
            interface_addr: a.interface_addr,
            mac_addr: a.mac_addr,
            network_id: a.network_id,
            vlan_id: a.vlan_id,
            isolated_vlan_id: a.isolated_vlan_id,
            display_name: a.display_name,
            project_id: a.project_id,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a single port and exit.
    AddPort {
        #[command(flatten)]
        port: PortArgs,
    },

    /// Unregister a single port and exit.
    DeletePort {
        /// Port UUID.
        port_id: String,
    },

    /// Check that the agent answers a handshake and a keep-alive.
    Keepalive,

    /// Keep the ports in a file registered, replaying them whenever
    /// the agent comes back.
    Sync {
        /// TOML file with one `[[port]]` table per port.
        #[arg(long)]
        ports: PathBuf,

        /// Seconds between connection checks.
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        /// Register the ports, check the connection once, and exit.
        #[arg(long)]
        once: bool,
    },

    /// Show the ports in a ports file without contacting the agent.
    ShowPorts {
        /// TOML file with one `[[port]]` table per port.
        #[arg(long)]
        ports: PathBuf,
    },
}

fn sync(
    cfg: &ClientCfg,
    log: &Logger,
    ports: PathBuf,
    interval: Duration,
    once: bool,
) -> anyhow::Result<()> {
    // Reject the whole file before anything reaches the agent.
    let ports = load_ports(&ports)?.parse()?;
    let mut api = VrouterApi::new(cfg, log);

    for p in ports {
        let port_id = p.port_id;
        // Transport failures are retried by the connection check
        // below; the port stays registered locally either way.
        if let Err(e) = api.register_port(p) {
            if !e.is_transport() {
                return Err(e)
                    .with_context(|| format!("registering port {port_id}"));
            }
        }
    }
    info!(log, "ports loaded"; "count" => api.ports().len());

    loop {
        let res = api.periodic_connection_check();
        if once {
            res?;
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn one_shot_api(
    agent: &AgentArgs,
    log: &Logger,
) -> anyhow::Result<VrouterApi> {
    let cfg = agent.client_cfg()?.one_shot(true);
    let mut api = VrouterApi::new(&cfg, log);
    api.periodic_connection_check()?;
    Ok(api)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log = init_logger();

    match cli.cmd {
        // One-shot links carry nothing on the call that opens them, so
        // bring the link up (and check it) before pushing the change.
        Command::AddPort { port } => {
            let port = PortText::from(port).parse()?;
            let mut api = one_shot_api(&cli.agent, &log)?;
            api.register_port(port)?;
        }

        Command::DeletePort { port_id } => {
            let port_id = parse_uuid("port_id", &port_id)?;
            let mut api = one_shot_api(&cli.agent, &log)?;
            api.unregister_port(port_id)?;
        }

        Command::Keepalive => {
            let cfg = cli.agent.client_cfg()?;
            let mut api = VrouterApi::new(&cfg, &log);
            api.periodic_connection_check()?;
            println!("agent {} is alive", cfg.sockaddr());
        }

        Command::Sync { ports, interval_secs, once } => {
            let cfg = cli.agent.client_cfg()?;
            let interval = Duration::from_secs(interval_secs);
            sync(&cfg, &log, ports, interval, once)?;
        }

        Command::ShowPorts { ports } => {
            let ports = load_ports(&ports)?.parse()?;
            print_ports(&ports)?;
        }
    }

    Ok(())
}
