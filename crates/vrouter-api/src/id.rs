// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Identifier encoding used on the wire.
//!
//! The agent carries every 128-bit identifier as 16 signed bytes in
//! big-endian order: the most significant 64 bits first, then the
//! least significant 64 bits.

use uuid::Uuid;

/// A 128-bit identifier as the agent expects it.
pub type WireUuid = [i8; 16];

/// Encode an identifier for the wire.
pub fn uuid_to_wire(id: &Uuid) -> WireUuid {
    let (msb, lsb) = id.as_u64_pair();
    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&msb.to_be_bytes());
    bytes[8..].copy_from_slice(&lsb.to_be_bytes());
    bytes.map(|b| b as i8)
}

/// Decode an identifier received from the wire.
pub fn wire_to_uuid(wire: &WireUuid) -> Uuid {
    Uuid::from_bytes(wire.map(|b| b as u8))
}
