// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! vrouter agent administration library

use slog::Drain;
use slog::Logger;
use vrouter_api::API_VERSION;
use vrouter_api::MAJOR_VERSION;

pub mod cfg;
pub mod print;

/// Build the logger used by the command line tool.
///
/// Output goes to stderr and is filtered by `RUST_LOG`; with no filter
/// set only errors are shown.
pub fn init_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_envlogger::new(drain);
    let drain = slog_async::Async::new(drain).build().fuse();
    Logger::root(drain, slog::o!("component" => "vrouteradm"))
}

pub fn pkg_version() -> String {
    format!("{MAJOR_VERSION}.{API_VERSION}.{}", env!("CARGO_PKG_VERSION"))
}
