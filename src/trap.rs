// Copyright 2026 Runlog Developers
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

use std::io;
use std::io::Write;

use crate::error::Error;

/// Where a handle sends failures it has swallowed.
///
/// Handles never return errors to their callers; anything that goes wrong
/// during folder creation, file creation or a write ends up here. Ordinary
/// handles trap into the registry's internal sink; the sink's own handle
/// traps into [`StderrTrap`] so a broken sink cannot recurse into itself.
pub trait FailureTrap: Send + Sync + 'static {
    /// Record a failure. Must not fail in a way visible to the caller.
    fn trap(&self, err: &Error);
}

/// The last-resort trap: writes the failure to standard error.
///
/// If standard error is unavailable too, the failure is dropped. There is
/// nothing left to tell.
#[derive(Debug, Default)]
pub struct StderrTrap {}

impl FailureTrap for StderrTrap {
    fn trap(&self, err: &Error) {
        let _ = writeln!(io::stderr(), "runlog: {err}");
    }
}
