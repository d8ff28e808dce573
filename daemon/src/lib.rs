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

//! # rcfgd
//!
//! Loads full and partial FPGA bitstreams through the reconfiguration interfaces Linux
//! exposes to userspace.
//!
//! A load is a sequence of fallible steps against the kernel (attribute writes, device
//! opens, chunked transfers, register programming, completion polling). Whatever step
//! fails, every resource acquired before it is released and the partial reconfiguration
//! flag is left cleared.
//!
//! # Modules
//!
//! - [`loader`] - [`BitstreamLoader`] and the build-time backend selection
//! - [`backends`] - one [`ReconfigBackend`] per kernel interface
//! - [`transfer`] - chunked, positioned reads and writes between a buffer and a device
//! - [`flag`] - the partial reconfiguration flag and its scoped guard
//! - [`completion`] - bounded polling for reconfiguration completion
//! - [`registers`] - bounds-checked access to memory-mapped HBICAP registers
//! - [`comm`] - the DBus interfaces served by the `rcfgd` daemon
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let mut loader = rcfgd::BitstreamLoader::configured()?;
//! loader.load(Path::new("/lib/firmware/design_partial.bin"), true)?;
//! # Ok::<(), rcfgd::RcfgError>(())
//! ```

pub mod backends;
pub mod comm;
pub mod completion;
pub mod config;
pub mod error;
pub mod flag;
pub mod loader;
pub mod registers;
pub mod system_io;
pub mod transfer;

pub use backends::{BackendKind, ReconfigBackend};
pub use error::RcfgError;
pub use loader::{BitstreamLoader, ConfiguredBackend, load};
