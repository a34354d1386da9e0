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

use std::path::Path;
use std::sync::Arc;

use crate::elapsed::ElapsedClock;
use crate::error::Error;
use crate::handle::LevelFile;
use crate::handle::LogHandle;
use crate::subject::Subject;
use crate::trap::FailureTrap;
use crate::trap::StderrTrap;

/// The folder name of the registry's own logs inside the run root.
pub(crate) const REGISTRY_DIR: &str = "runlog";

/// The subject standing in for the registry itself.
struct RegistrySubject;

impl Subject for RegistrySubject {
    fn describe(&self) -> String {
        REGISTRY_DIR.to_string()
    }
}

/// The registry's own handle, used exclusively for the logging subsystem's
/// operational records.
///
/// Besides the three standard level files it owns `failures.txt`, where every
/// failure trapped anywhere in the subsystem lands. Its inner handle traps
/// straight to stderr, so a broken sink never feeds back into itself.
pub(crate) struct InternalSink {
    handle: LogHandle,
    failures: LevelFile,
    clock: ElapsedClock,
    stderr: Arc<StderrTrap>,
}

impl InternalSink {
    pub(crate) fn new(run_root: &Path, clock: ElapsedClock) -> Arc<Self> {
        let stderr = Arc::new(StderrTrap::default());
        let folder = run_root.join(REGISTRY_DIR);
        let handle = LogHandle::new(
            Arc::new(RegistrySubject),
            folder.clone(),
            None,
            clock,
            stderr.clone(),
        );
        let (failures, failure) = LevelFile::create(folder.join("failures.txt"));
        if let Some(err) = failure {
            stderr.trap(&err);
        }
        Arc::new(Self {
            handle,
            failures,
            clock,
            stderr,
        })
    }

    pub(crate) fn handle(&self) -> &LogHandle {
        &self.handle
    }
}

impl FailureTrap for InternalSink {
    fn trap(&self, err: &Error) {
        let line = format!("[{}] {err}", self.clock.elapsed());
        if let Err(write_err) = self.failures.append_line(&line) {
            // A failure while recording a failure. There is no deeper
            // fallback, and recursing into this sink could loop forever.
            self.stderr.trap(&Error::InternalReporting {
                source: Box::new(write_err),
            });
            self.stderr.trap(err);
        }
    }
}
