// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Keep a vrouter agent informed of the VM ports on this host.
//!
//! The [`VrouterApi`] is the entry point. It owns a [`PortRegistry`],
//! which is the authoritative list of ports, and a
//! [`ConnectionManager`], which creates the link to the agent on
//! demand and replays the registry every time a new link comes up.

pub mod api;
pub mod cfg;
pub mod conn;
pub mod registry;
pub mod resync;
pub mod text;

pub use api::VrouterApi;
pub use cfg::ClientCfg;
pub use conn::ConnState;
pub use conn::ConnectionManager;
pub use conn::Established;
pub use registry::PortRegistry;
pub use text::PortText;
pub use vrouter_api::MacAddr;
pub use vrouter_api::Port;
pub use vrouter_api::PortCfg;
pub use vrouter_rpc::Error;
