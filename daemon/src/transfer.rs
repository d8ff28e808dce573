// This file is part of rcfgd, a service to load full and partial FPGA bitstreams through the Linux reconfiguration interfaces.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// rcfgd is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// rcfgd is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Chunked, offset-aware transfers between a handle and an in-memory buffer.
//!
//! DMA character devices (and some kernel attributes) reject or silently truncate very large
//! single reads and writes, so every transfer here is split into chunks of at most
//! [`TransferRequest::chunk_cap`] bytes. Before each chunk the handle is positioned at
//! `base_offset + bytes_transferred`, unless that offset is zero, which lets the same code
//! drive both seekable DMA channels and plain streams.
//!
//! A chunk that moves fewer bytes than asked for ends the transfer early. The partial count
//! is returned as-is and it is up to the caller to treat it as fatal. Seek, read and write
//! failures are errors carrying the attempted size and offset.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use rcfgd::transfer::{TransferRequest, write_from_buffer};
//! # use std::fs::OpenOptions;
//! # use std::path::Path;
//! # fn example(bitstream: &[u8]) -> Result<(), rcfgd::error::RcfgError> {
//! let device = Path::new("/dev/xdma0_h2c_2");
//! let mut channel = OpenOptions::new().write(true).open(device).unwrap();
//! let request = TransferRequest::new(bitstream.len(), 0x4000_0000, 0x7fff_f000);
//! let written = write_from_buffer(device, &mut channel, bitstream, &request)?;
//! assert_eq!(written, bitstream.len());
//! # Ok(())
//! # }
//! ```

use crate::error::RcfgError;
use log::{trace, warn};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::Path;

/// Size in bytes of the words the reconfiguration engines consume.
pub const WORD_SIZE: usize = 4;

/// Which way the bytes move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// handle -> buffer
    ToBuffer,
    /// buffer -> handle
    FromBuffer,
}

impl Direction {
    fn op(self) -> &'static str {
        match self {
            Direction::ToBuffer => "read",
            Direction::FromBuffer => "write",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op())
    }
}

/// Size and placement of one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Total number of bytes to move.
    pub size: usize,
    /// Offset of the first byte on the handle side.
    pub base_offset: u64,
    /// Largest number of bytes moved by a single read or write.
    pub chunk_cap: usize,
}

impl TransferRequest {
    pub fn new(size: usize, base_offset: u64, chunk_cap: usize) -> Self {
        TransferRequest {
            size,
            base_offset,
            chunk_cap,
        }
    }

    /// Number of read or write calls a complete transfer takes.
    pub fn chunk_count(&self) -> usize {
        if self.chunk_cap == 0 {
            return 0;
        }
        self.size.div_ceil(self.chunk_cap)
    }

    fn validate(&self, buffer_len: usize) -> Result<(), RcfgError> {
        if self.chunk_cap == 0 {
            return Err(RcfgError::Argument(
                "A transfer needs a chunk cap of at least one byte.".into(),
            ));
        }
        if self.size > buffer_len {
            return Err(RcfgError::Argument(format!(
                "Cannot transfer {:#x} bytes with a buffer of {buffer_len:#x} bytes.",
                self.size
            )));
        }
        Ok(())
    }
}

/// Move `request.size` bytes between `handle` and `buffer` in the given direction.
///
/// `device` only names the handle in logs and errors.
///
/// # Returns: `Result<usize, RcfgError>`
/// * `Ok(usize)` - Bytes actually moved. Less than `request.size` after a short transfer.
/// * `Err(RcfgError::IOTransfer)` - A seek, read or write failed
/// * `Err(RcfgError::Argument)` - The buffer is smaller than `request.size` or the chunk cap is zero
pub fn copy<H: Read + Write + Seek>(
    device: &Path,
    handle: &mut H,
    buffer: &mut [u8],
    request: &TransferRequest,
    direction: Direction,
) -> Result<usize, RcfgError> {
    match direction {
        Direction::ToBuffer => read_to_buffer(device, handle, buffer, request),
        Direction::FromBuffer => write_from_buffer(device, handle, buffer, request),
    }
}

/// Fill `buffer[..request.size]` from `handle`. See [`copy`].
pub fn read_to_buffer<H: Read + Seek>(
    device: &Path,
    handle: &mut H,
    buffer: &mut [u8],
    request: &TransferRequest,
) -> Result<usize, RcfgError> {
    request.validate(buffer.len())?;
    chunked(device, handle, request, Direction::ToBuffer, |h, chunk| {
        h.read(&mut buffer[chunk])
    })
}

/// Write `buffer[..request.size]` to `handle`. See [`copy`].
pub fn write_from_buffer<H: Write + Seek>(
    device: &Path,
    handle: &mut H,
    buffer: &[u8],
    request: &TransferRequest,
) -> Result<usize, RcfgError> {
    request.validate(buffer.len())?;
    chunked(device, handle, request, Direction::FromBuffer, |h, chunk| {
        h.write(&buffer[chunk])
    })
}

fn chunked<H: Seek>(
    device: &Path,
    handle: &mut H,
    request: &TransferRequest,
    direction: Direction,
    mut step: impl FnMut(&mut H, Range<usize>) -> io::Result<usize>,
) -> Result<usize, RcfgError> {
    let op = direction.op();
    let mut count = 0usize;

    while count < request.size {
        let bytes = (request.size - count).min(request.chunk_cap);
        let offset = request.base_offset + count as u64;

        if offset != 0 {
            let landed = handle
                .seek(SeekFrom::Start(offset))
                .map_err(|e| RcfgError::IOTransfer {
                    device: device.into(),
                    op: "seek",
                    size: bytes,
                    offset,
                    e,
                })?;
            if landed != offset {
                return Err(RcfgError::IOTransfer {
                    device: device.into(),
                    op: "seek",
                    size: bytes,
                    offset,
                    e: io::Error::other(format!("seek landed at {landed:#x}")),
                });
            }
        }

        let moved = step(handle, count..count + bytes).map_err(|e| RcfgError::IOTransfer {
            device: device.into(),
            op,
            size: bytes,
            offset,
            e,
        })?;
        count += moved;

        if moved != bytes {
            warn!("{device:?}, {op} underflow {moved:#x}/{bytes:#x} @ {offset:#x}");
            break;
        }
    }

    if count != request.size {
        warn!("{device:?}, {op} underflow {count:#x}/{:#x}", request.size);
    } else {
        trace!("{device:?}, {op} of {count:#x} bytes @ {:#x} done", request.base_offset);
    }
    Ok(count)
}
