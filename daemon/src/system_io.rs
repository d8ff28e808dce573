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

//! File system helpers for sysfs attributes, device nodes and bitstream files.
//!
//! Each helper wraps one std file system call, logs it at trace level and turns its
//! `io::Error` into the `RcfgError` variant naming the path involved.
//!
//! Opening a kernel attribute or device node is kept distinct from using it: a node that
//! cannot be opened is reported as `RcfgError::DeviceUnavailable`, while a failing read or
//! write on an open node is an `IORead`/`IOWrite` error.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use rcfgd::system_io::{fs_read, fs_write_attribute};
//! # use std::path::Path;
//!
//! # fn example() -> Result<(), rcfgd::error::RcfgError> {
//! // Read a file
//! let content = fs_read(Path::new("/sys/class/fpga_manager/fpga0/state"))?;
//!
//! // Write to an attribute
//! fs_write_attribute(Path::new("/sys/class/fpga_manager/fpga0/flags"), "0")?;
//! # Ok(())
//! # }
//! ```

use crate::error::RcfgError;
use log::trace;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::unix::fs::symlink;
use std::path::Path;

/// How a device node is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Read the contents of a file to a String.
///
/// # Arguments
///
/// * `file_path` - Path to the file to read
///
/// # Returns: `Result<String, RcfgError>`
/// * `Ok(String)` - The complete contents of the file
/// * `Err(RcfgError::IORead)` - If the file cannot be opened or read
pub fn fs_read(file_path: &Path) -> Result<String, RcfgError> {
    trace!("Attempting to read from {file_path:?}");
    let mut buf: String = String::new();
    let result = OpenOptions::new()
        .read(true)
        .open(file_path)
        .and_then(|mut f| f.read_to_string(&mut buf));

    match result {
        Ok(_) => {
            trace!("Reading done");
            Ok(buf)
        }
        Err(e) => Err(RcfgError::IORead {
            file: file_path.into(),
            e,
        }),
    }
}

/// Open a device node or kernel attribute.
///
/// # Arguments
///
/// * `device` - Path of the node
/// * `access` - Whether the node is read, written or both
///
/// # Returns: `Result<File, RcfgError>`
/// * `Ok(File)` - The open handle. Dropping it closes the node.
/// * `Err(RcfgError::DeviceUnavailable)` - The node cannot be opened
pub fn fs_open_device(device: &Path, access: Access) -> Result<File, RcfgError> {
    trace!("Opening {device:?} ({access:?})");
    OpenOptions::new()
        .read(matches!(access, Access::ReadOnly | Access::ReadWrite))
        .write(matches!(access, Access::WriteOnly | Access::ReadWrite))
        .open(device)
        .map_err(|e| RcfgError::DeviceUnavailable {
            device: device.into(),
            e,
        })
}

/// Read the contents of a kernel attribute to a String.
///
/// Unlike [`fs_read`], an attribute that cannot be opened means the device providing it
/// is missing, so that case is reported as `RcfgError::DeviceUnavailable`.
///
/// # Returns: `Result<String, RcfgError>`
/// * `Ok(String)` - The complete contents of the attribute
/// * `Err(RcfgError::DeviceUnavailable)` - The attribute cannot be opened
/// * `Err(RcfgError::IORead)` - The attribute was opened but reading failed
pub fn fs_read_attribute(attribute: &Path) -> Result<String, RcfgError> {
    let mut file = fs_open_device(attribute, Access::ReadOnly)?;
    let mut buf = String::new();
    file.read_to_string(&mut buf).map_err(|e| RcfgError::IORead {
        file: attribute.into(),
        e,
    })?;
    trace!("Read {buf:?} from {attribute:?}");
    Ok(buf)
}

/// Write a string value to an existing kernel attribute.
///
/// The attribute is opened write-only, written in a single call and closed again before
/// returning. It is never created.
///
/// # Arguments
///
/// * `attribute` - Path to the attribute
/// * `value` - The string value to write (implements `AsRef<str>`)
///
/// # Returns: `Result<(), RcfgError>`
/// * `Ok(())` - Write succeeded
/// * `Err(RcfgError::DeviceUnavailable)` - The attribute cannot be opened
/// * `Err(RcfgError::IOWrite)` - The attribute rejected the value
///
/// # Examples
///
/// ```rust,no_run
/// # use rcfgd::system_io::fs_write_attribute;
/// # use std::path::Path;
/// #
/// # fn example() -> Result<(), rcfgd::error::RcfgError> {
/// fs_write_attribute(Path::new("/sys/class/fpga_manager/fpga0/firmware"), "design.bit.bin")?;
/// # Ok(())
/// # }
/// ```
pub fn fs_write_attribute(attribute: &Path, value: impl AsRef<str>) -> Result<(), RcfgError> {
    trace!("Attempting to write {:?} to {:?}", value.as_ref(), attribute);
    let mut file = fs_open_device(attribute, Access::WriteOnly)?;
    match file.write_all(value.as_ref().as_bytes()) {
        Ok(_) => {
            trace!("Write done.");
            Ok(())
        }
        Err(e) => Err(RcfgError::IOWrite {
            data: value.as_ref().to_owned(),
            file: attribute.into(),
            e,
        }),
    }
}

/// Open a bitstream file for reading and report its length.
///
/// # Returns: `Result<(File, u64), RcfgError>`
/// * `Ok((File, u64))` - Open file and its length in bytes
/// * `Err(RcfgError::FileNotFound)` - Nothing exists at `path`
/// * `Err(RcfgError::FileReadError)` - The file exists but cannot be opened, or is a directory
pub fn fs_open_bitstream(path: &Path) -> Result<(File, u64), RcfgError> {
    trace!("Opening bitstream {path:?}");
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RcfgError::FileNotFound(path.into()),
        _ => RcfgError::FileReadError {
            file: path.into(),
            e,
        },
    })?;
    let metadata = file.metadata().map_err(|e| RcfgError::FileReadError {
        file: path.into(),
        e,
    })?;
    if metadata.is_dir() {
        return Err(RcfgError::FileReadError {
            file: path.into(),
            e: ErrorKind::IsADirectory.into(),
        });
    }
    Ok((file, metadata.len()))
}

/// Create a symbolic link at `link` pointing to `target`.
///
/// # Returns: `Result<(), RcfgError>`
/// * `Ok(())` - Link created
/// * `Err(RcfgError::IOCreate)` - Link creation failed (already exists, permissions, etc.)
pub fn fs_symlink(target: &Path, link: &Path) -> Result<(), RcfgError> {
    trace!("Linking {link:?} -> {target:?}");
    symlink(target, link).map_err(|e| RcfgError::IOCreate {
        file: link.into(),
        e,
    })
}

/// Remove a file or symbolic link. The link itself is removed, never its target.
///
/// # Arguments
///
/// * `path` - The link to remove
/// * `missing_ok` - If `true`, a path that does not exist is not an error
///
/// # Returns: `Result<(), RcfgError>`
/// * `Ok(())` - Removed, or absent and `missing_ok` was set
/// * `Err(RcfgError::IODelete)` - Removal failed
pub fn fs_remove_link(path: &Path, missing_ok: bool) -> Result<(), RcfgError> {
    trace!("Attempting to delete '{path:?}'");
    match std::fs::remove_file(path) {
        Ok(_) => {
            trace!("Deleted {path:?}");
            Ok(())
        }
        Err(e) if missing_ok && e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RcfgError::IODelete {
            file: path.into(),
            e,
        }),
    }
}
