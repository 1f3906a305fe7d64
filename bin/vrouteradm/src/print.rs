// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Print ports in human-friendly manner.

use std::io::Write;
use tabwriter::TabWriter;
use vrouter_api::PortCfg;

/// Print a table of ports to stdout.
pub fn print_ports<'a>(
    ports: impl IntoIterator<Item = &'a PortCfg>,
) -> std::io::Result<()> {
    print_ports_into(&mut std::io::stdout(), ports)
}

/// Print a table of ports.
pub fn print_ports_into<'a>(
    writer: &mut impl Write,
    ports: impl IntoIterator<Item = &'a PortCfg>,
) -> std::io::Result<()> {
    let mut t = TabWriter::new(writer);

    writeln!(
        t,
        "PORT ID\tINTERFACE\tADDRESS\tMAC ADDRESS\tVLAN\tISOLATED\tINSTANCE\tNAME"
    )?;
    for p in ports {
        writeln!(
            t,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            p.port_id,
            p.interface_name,
            p.interface_addr,
            p.mac_addr,
            p.vlan_id,
            p.isolated_vlan_id,
            p.instance_id,
            p.display_name,
        )?;
    }

    t.flush()
}
