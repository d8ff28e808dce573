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

//! Detecting the end of a reconfiguration.
//!
//! Hardware engines such as the HBICAP raise a status bit once the bitstream has been
//! consumed ([`RegisterPoll`]), while fpga_manager publishes a textual `state` attribute
//! ([`StateAttribute`]). Both are [`CompletionMonitor`]s, and [`CompletionMonitor::wait`]
//! polls either one under a [`PollPolicy`] so that a fabric that never answers produces
//! `RcfgError::Timeout` rather than a hung load.

use crate::config;
use crate::error::RcfgError;
use crate::registers::HbicapRegisters;
use crate::system_io::fs_read_attribute;
use log::{debug, trace};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Outcome of one completion check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Pending,
    Done,
    /// Finished in an unexpected state, as reported by the device.
    Failed(String),
}

/// Bounds on how long and how often a completion status is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: config::COMPLETION_POLL_INTERVAL,
            timeout: config::COMPLETION_TIMEOUT,
        }
    }
}

pub trait CompletionMonitor {
    /// Path of the device or attribute being watched, for diagnostics.
    fn source(&self) -> &Path;

    /// Check the completion status once.
    fn status(&self) -> Result<CompletionStatus, RcfgError>;

    /// Poll [`status`](Self::status) until the operation is done.
    ///
    /// # Returns: `Result<(), RcfgError>`
    /// * `Ok(())` - The device reported completion
    /// * `Err(RcfgError::StateValidationFailure)` - The device reported an unexpected state
    /// * `Err(RcfgError::Timeout)` - Still pending once `policy.timeout` elapsed
    /// * `Err(RcfgError)` - Reading the status failed
    fn wait(&self, policy: &PollPolicy) -> Result<(), RcfgError> {
        let start = Instant::now();
        let mut polls = 0u64;
        loop {
            polls += 1;
            match self.status()? {
                CompletionStatus::Done => {
                    debug!(
                        "{:?} reported completion after {polls} poll(s) in {:?}",
                        self.source(),
                        start.elapsed()
                    );
                    return Ok(());
                }
                CompletionStatus::Failed(observed) => {
                    return Err(RcfgError::StateValidationFailure(observed));
                }
                CompletionStatus::Pending => {}
            }
            let waited = start.elapsed();
            if waited >= policy.timeout {
                return Err(RcfgError::Timeout {
                    device: self.source().to_owned(),
                    waited,
                });
            }
            thread::sleep(policy.interval);
        }
    }
}

/// Watches the done bit of the HBICAP status register.
#[derive(Debug)]
pub struct RegisterPoll<'a> {
    registers: &'a HbicapRegisters,
    done_mask: u32,
}

impl<'a> RegisterPoll<'a> {
    pub fn new(registers: &'a HbicapRegisters) -> Self {
        RegisterPoll {
            registers,
            done_mask: config::HBICAP_STATUS_DONE,
        }
    }
}

impl CompletionMonitor for RegisterPoll<'_> {
    fn source(&self) -> &Path {
        self.registers.device()
    }

    fn status(&self) -> Result<CompletionStatus, RcfgError> {
        let status = self.registers.read_status()?;
        trace!("HBICAP status {status:#x}");
        if status & self.done_mask != 0 {
            Ok(CompletionStatus::Done)
        } else {
            Ok(CompletionStatus::Pending)
        }
    }
}

/// Reads a textual state attribute and compares it with the expected state.
///
/// The attribute is read once per check; it never reports `Pending`.
#[derive(Debug, Clone)]
pub struct StateAttribute {
    path: PathBuf,
    expected: String,
}

impl StateAttribute {
    pub fn new(path: impl Into<PathBuf>, expected: impl Into<String>) -> Self {
        StateAttribute {
            path: path.into(),
            expected: expected.into(),
        }
    }

    /// Current contents of the attribute, up to the first newline.
    pub fn read(&self) -> Result<String, RcfgError> {
        let contents = fs_read_attribute(&self.path)?;
        Ok(contents
            .split('\n')
            .find(|token| !token.is_empty())
            .unwrap_or_default()
            .trim_end_matches('\0')
            .to_owned())
    }
}

impl CompletionMonitor for StateAttribute {
    fn source(&self) -> &Path {
        &self.path
    }

    fn status(&self) -> Result<CompletionStatus, RcfgError> {
        let state = self.read()?;
        debug!("{:?} reads '{state}'", self.path);
        if state == self.expected {
            Ok(CompletionStatus::Done)
        } else {
            Ok(CompletionStatus::Failed(state))
        }
    }
}
