// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structured reporting for tolerated misuse.
//!
//! The registry and the command list never abort on a sequencing mistake or a
//! dangling handle; they skip the operation instead. Every such skip is
//! published as a [`Diagnostic`] on a [`DiagnosticsBus`] and mirrored to the
//! `log` facade, so a misordered frame degrades visibly instead of silently.

use std::fmt;

/// The component that reported a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSource {
    /// The device resource registry.
    Device,
    /// A command list during recording or submission.
    CommandList,
}

/// The category of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A handle did not resolve to a live resource.
    InvalidHandle,
    /// The call is not valid in the current recording state.
    InvalidState,
    /// A CPU write targeted a resource without host access.
    NotCpuAccessible,
    /// A write range exceeded the destination's extent.
    OutOfBounds,
    /// The operation is declared but has no implementation yet.
    Unimplemented,
    /// The backend reported a failure.
    Backend,
}

impl DiagnosticKind {
    fn level(self) -> log::Level {
        match self {
            DiagnosticKind::Backend => log::Level::Error,
            _ => log::Level::Warn,
        }
    }
}

/// A single report of a skipped or degraded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Who reported it.
    pub source: DiagnosticSource,
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// Human-readable details.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: [{:?}] {}", self.source, self.kind, self.message)
    }
}

/// An unbounded multi-producer channel carrying [`Diagnostic`]s.
///
/// The bus keeps its own receiver so reports are never lost for lack of a
/// listener; consumers drain it through [`DiagnosticsBus::drain`] or by
/// polling [`DiagnosticsBus::receiver`].
#[derive(Debug, Clone)]
pub struct DiagnosticsBus {
    sender: flume::Sender<Diagnostic>,
    receiver: flume::Receiver<Diagnostic>,
}

impl DiagnosticsBus {
    /// Creates a bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Logs the diagnostic at its kind's level and publishes it.
    pub fn report(&self, source: DiagnosticSource, kind: DiagnosticKind, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            source,
            kind,
            message: message.into(),
        };
        log::log!(kind.level(), "{diagnostic}");

        if let Err(e) = self.sender.send(diagnostic) {
            log::error!("Failed to publish diagnostic: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sending end, for components that report on
    /// behalf of the device.
    pub fn sender(&self) -> flume::Sender<Diagnostic> {
        self.sender.clone()
    }

    /// Returns the receiving end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<Diagnostic> {
        &self.receiver
    }

    /// Removes and returns every pending diagnostic.
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.receiver.try_iter().collect()
    }
}

impl Default for DiagnosticsBus {
    fn default() -> Self {
        Self::new()
    }
}
