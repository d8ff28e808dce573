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

//! Entry point for loading bitstreams.
//!
//! The backend is picked at build time through cargo features, highest priority first:
//!
//! | Feature       | Backend                   |
//! |---------------|---------------------------|
//! | `xdma-hbicap` | [`XdmaHbicapBackend`]     |
//! | `xdevcfg`     | [`XdevcfgBackend`]        |
//! | (none)        | [`FpgaManagerBackend`]    |
//!
//! [`BitstreamLoader`] itself is generic over [`ReconfigBackend`], so tests and embedders
//! can hand it any backend.

#[cfg(all(not(feature = "xdma-hbicap"), not(feature = "xdevcfg")))]
use crate::backends::FpgaManagerBackend;
#[cfg(all(feature = "xdevcfg", not(feature = "xdma-hbicap")))]
use crate::backends::XdevcfgBackend;
#[cfg(feature = "xdma-hbicap")]
use crate::backends::XdmaHbicapBackend;
use crate::backends::{BackendKind, ReconfigBackend};
use crate::error::RcfgError;
use log::{error, info, trace};
use std::path::Path;

/// Backend selected by the enabled cargo features.
#[cfg(feature = "xdma-hbicap")]
pub type ConfiguredBackend = XdmaHbicapBackend;
/// Backend selected by the enabled cargo features.
#[cfg(all(feature = "xdevcfg", not(feature = "xdma-hbicap")))]
pub type ConfiguredBackend = XdevcfgBackend;
/// Backend selected by the enabled cargo features.
#[cfg(all(not(feature = "xdma-hbicap"), not(feature = "xdevcfg")))]
pub type ConfiguredBackend = FpgaManagerBackend;

#[derive(Debug)]
pub struct BitstreamLoader<B: ReconfigBackend> {
    backend: B,
}

impl BitstreamLoader<ConfiguredBackend> {
    /// Build a loader around the backend chosen at build time, using its default
    /// configuration.
    ///
    /// # Returns: `Result<BitstreamLoader<ConfiguredBackend>, RcfgError>`
    /// * `Ok(BitstreamLoader)` - Ready to load
    /// * `Err(RcfgError)` - The backend could not acquire a device it holds for its lifetime
    pub fn configured() -> Result<Self, RcfgError> {
        let backend = ConfiguredBackend::with_default_config()?;
        trace!("Configured {} backend", backend.kind());
        Ok(BitstreamLoader::new(backend))
    }
}

impl<B: ReconfigBackend> BitstreamLoader<B> {
    pub fn new(backend: B) -> Self {
        BitstreamLoader { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Load a full or partial bitstream into the fabric.
    ///
    /// # Arguments
    ///
    /// * `bitstream`: Path to the bitstream file
    /// * `is_partial`: Whether the bitstream reconfigures a partition only
    ///
    /// # Returns: `Result<(), RcfgError>`
    /// * `Ok(())` - The bitstream was loaded
    /// * `Err(RcfgError::Argument)` - `bitstream` is empty
    /// * `Err(RcfgError)` - Error from the backend, after it released everything it acquired
    pub fn load(&mut self, bitstream: &Path, is_partial: bool) -> Result<(), RcfgError> {
        if bitstream.as_os_str().is_empty() {
            return Err(RcfgError::Argument(
                "A bitstream path is required. Provided path is empty.".into(),
            ));
        }
        let kind = if is_partial { "partial" } else { "full" };
        info!(
            "Starting {kind} reconfiguration with {bitstream:?} via {}",
            self.backend.kind()
        );
        match self.backend.load(bitstream, is_partial) {
            Ok(()) => {
                info!("Reconfiguration with {bitstream:?} done");
                Ok(())
            }
            Err(e) => {
                error!("Reconfiguration with {bitstream:?} failed: {e}");
                Err(e)
            }
        }
    }
}

/// Load `bitstream` with a loader built around the configured backend.
///
/// Convenience for one-shot callers. Long-lived callers should keep a [`BitstreamLoader`]
/// so devices held by the backend are opened once.
pub fn load(bitstream: impl AsRef<Path>, is_partial: bool) -> Result<(), RcfgError> {
    BitstreamLoader::configured()?.load(bitstream.as_ref(), is_partial)
}
