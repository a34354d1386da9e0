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
use std::path::PathBuf;

/// Failures arising inside the logging subsystem.
///
/// None of these ever reach a caller of [`LogHandle::log`] or
/// [`LogRegistry::handle_for`]: every variant except [`Error::InternalReporting`]
/// is trapped at its origin and routed to the registry's internal sink.
/// `InternalReporting` has no further fallback inside the subsystem and
/// surfaces on stderr instead.
///
/// [`LogHandle::log`]: crate::LogHandle::log
/// [`LogRegistry::handle_for`]: crate::LogRegistry::handle_for
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to allocate run directory {path}: {source}")]
    RunDirAllocation { path: PathBuf, source: io::Error },

    #[error("failed to create log folder {path}: {source}")]
    FolderCreation { path: PathBuf, source: io::Error },

    #[error("failed to create log file {path}: {source}")]
    FileCreation { path: PathBuf, source: io::Error },

    #[error("failed to write to log file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to construct handler for {type_name}: {source}")]
    HandlerConstruction {
        type_name: &'static str,
        source: anyhow::Error,
    },

    #[error("failed to report an internal failure: {source}")]
    InternalReporting { source: Box<Error> },
}
