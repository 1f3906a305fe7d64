// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Types shared between the vrouter port client and its agent.

#![deny(unreachable_patterns)]
#![deny(unused_must_use)]

pub mod cmd;
pub mod id;
pub mod mac;
pub mod port;

pub use cmd::*;
pub use id::*;
pub use mac::*;
pub use port::*;

/// The overall version of the agent API. Anytime a command is added,
/// removed, or has its request body modified, this number should
/// increment. The agent rejects requests carrying a different value.
pub const API_VERSION: u64 = 1;

/// Major version of the vrouter client package.
pub const MAJOR_VERSION: u64 = 0;
