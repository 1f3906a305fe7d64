// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2025 Oxide Computer Company

//! Length-prefixed framing.
//!
//! Every message is preceded by its length as a big-endian `u32`.

use super::Error;
use std::io::Read;
use std::io::Write;

/// The largest frame either side will accept.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Write `buf` as a single frame.
pub fn write_frame<W: Write>(w: &mut W, buf: &[u8]) -> Result<(), Error> {
    if buf.len() > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge(buf.len()));
    }

    // Checked above.
    let len = buf.len() as u32;
    w.write_all(&len.to_be_bytes())?;
    w.write_all(buf)?;
    Ok(())
}

/// Read a single frame.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Vec<u8>, Error> {
    let mut len = [0u8; 4];
    r.read_exact(&mut len)?;
    let len = u32::from_be_bytes(len) as usize;

    if len > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge(len));
    }

    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}
