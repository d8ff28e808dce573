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

use log::error;
use std::path::PathBuf;
use std::time::Duration;
use zbus::fdo;

const ENOENT: i32 = 2;
const EIO: i32 = 5;
const ENOMEM: i32 = 12;
const EBUSY: i32 = 16;
const ENODEV: i32 = 19;
const EINVAL: i32 = 22;
const ETIMEDOUT: i32 = 110;

#[derive(Debug, thiserror::Error)]
pub enum RcfgError {
    #[error("RcfgError::DeviceUnavailable: Could not open {device:?}: {e}")]
    DeviceUnavailable { device: PathBuf, e: std::io::Error },
    #[error("RcfgError::FileNotFound: Bitstream file {0:?} does not exist")]
    FileNotFound(PathBuf),
    #[error("RcfgError::FileReadError: Failed to read bitstream file {file:?}: {e}")]
    FileReadError { file: PathBuf, e: std::io::Error },
    #[error(
        "RcfgError::IoUnderflow: Only {transferred:#x} of {expected:#x} bytes were transferred with {device:?}"
    )]
    IoUnderflow {
        device: PathBuf,
        transferred: u64,
        expected: u64,
    },
    #[error("RcfgError::AllocationFailure: Could not allocate {size} bytes for the bitstream")]
    AllocationFailure { size: u64 },
    #[error("RcfgError::StateValidationFailure: FPGA state is not as expected: '{0}'")]
    StateValidationFailure(String),
    #[error("RcfgError::Timeout: {device:?} did not report completion after {waited:?}")]
    Timeout { device: PathBuf, waited: Duration },
    #[error("RcfgError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("RcfgError::IOWrite: An IO error occurred when writing {data:?} to {file:?}: {e}")]
    IOWrite {
        data: String,
        file: PathBuf,
        e: std::io::Error,
    },
    #[error("RcfgError::IOCreate: An IO error occurred when creating {file:?}: {e}")]
    IOCreate { file: PathBuf, e: std::io::Error },
    #[error("RcfgError::IODelete: An IO error occurred when deleting {file:?}: {e}")]
    IODelete { file: PathBuf, e: std::io::Error },
    #[error(
        "RcfgError::IOTransfer: {op} of {size:#x} bytes @ {offset:#x} failed on {device:?}: {e}"
    )]
    IOTransfer {
        device: PathBuf,
        op: &'static str,
        size: usize,
        offset: u64,
        e: std::io::Error,
    },
    #[error("RcfgError::Argument: {0}")]
    Argument(String),
    #[error("RcfgError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}

impl RcfgError {
    /// Negative errno-style classification of the error, matching the return convention of
    /// the kernel-facing C interfaces (`0` is success, anything else is `-errno`).
    pub fn errno(&self) -> i32 {
        match self {
            RcfgError::DeviceUnavailable { .. } => -ENODEV,
            RcfgError::FileNotFound(..) => -ENOENT,
            RcfgError::AllocationFailure { .. } => -ENOMEM,
            RcfgError::StateValidationFailure(..) => -EBUSY,
            RcfgError::Timeout { .. } => -ETIMEDOUT,
            RcfgError::Argument(..) => -EINVAL,
            RcfgError::FileReadError { .. }
            | RcfgError::IoUnderflow { .. }
            | RcfgError::IORead { .. }
            | RcfgError::IOWrite { .. }
            | RcfgError::IOCreate { .. }
            | RcfgError::IODelete { .. }
            | RcfgError::IOTransfer { .. }
            | RcfgError::Internal(..) => -EIO,
        }
    }
}

impl From<RcfgError> for fdo::Error {
    fn from(err: RcfgError) -> Self {
        error!("{err}");
        match err {
            RcfgError::Argument(..) => fdo::Error::InvalidArgs(err.to_string()),
            RcfgError::FileNotFound(..) => fdo::Error::FileNotFound(err.to_string()),
            RcfgError::AllocationFailure { .. } => fdo::Error::NoMemory(err.to_string()),
            RcfgError::Timeout { .. } => fdo::Error::TimedOut(err.to_string()),
            RcfgError::DeviceUnavailable { .. }
            | RcfgError::FileReadError { .. }
            | RcfgError::IoUnderflow { .. }
            | RcfgError::IORead { .. }
            | RcfgError::IOWrite { .. }
            | RcfgError::IOCreate { .. }
            | RcfgError::IODelete { .. }
            | RcfgError::IOTransfer { .. } => fdo::Error::IOError(err.to_string()),
            _ => fdo::Error::Failed(err.to_string()),
        }
    }
}
