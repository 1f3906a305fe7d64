// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use crate::registry::PortRegistry;
use vrouter_rpc::Error;
use vrouter_rpc::InstanceService;

/// Push every registered port to the agent as a single `AddPort` batch.
///
/// This is a full push rather than a diff: the agent replaces whatever
/// it held for each id in the batch. Ports the agent knows about but
/// the registry doesn't are left alone. The batch is sent even when
/// the registry is empty.
///
/// On error the link must be considered unusable.
pub fn resynchronize<S: InstanceService>(
    link: &mut S,
    registry: &PortRegistry,
) -> Result<usize, Error> {
    let ports = registry.snapshot();
    link.add_port(&ports)?;
    Ok(ports.len())
}
