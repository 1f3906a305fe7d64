// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

use core::fmt;
use core::fmt::Debug;
use core::fmt::Display;
use core::str::FromStr;
use serde::Deserialize;
use serde::Serialize;

/// The hardware address of a VM interface.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Hash,
)]
pub struct MacAddr {
    inner: [u8; 6],
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        Self { inner: bytes }
    }
}

impl FromStr for MacAddr {
    type Err = String;

    /// Parse the usual six-octet notation. Octets may be separated by
    /// either `:` or `-`, but not a mix of both.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = if s.contains('-') { '-' } else { ':' };

        let octets: Vec<u8> = s
            .split(sep)
            .map(|o| {
                // from_str_radix() would also take a leading '+'.
                if o.is_empty()
                    || o.len() > 2
                    || !o.bytes().all(|b| b.is_ascii_hexdigit())
                {
                    return Err(format!("bad octet: {o:?}"));
                }
                u8::from_str_radix(o, 16).map_err(|_| format!("bad octet: {o}"))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        let inner: [u8; 6] = octets.as_slice().try_into().map_err(|_| {
            format!("incorrect number of bytes: {}", octets.len())
        })?;

        Ok(MacAddr { inner })
    }
}

// The agent expects the lower-case, colon-separated form.
impl Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.inner[0],
            self.inner[1],
            self.inner[2],
            self.inner[3],
            self.inner[4],
            self.inner[5]
        )
    }
}

// There's no reason to view the MAC address as its raw array, so just
// present it in a human-friendly manner.
impl Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddr {{ inner: {self} }}")
    }
}
