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

//! Run-directory allocation.
//!
//! Each process run logs into its own integer-named directory under the
//! base directory, so restarts never touch an earlier run's files as long
//! as old directories are retained.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Error;

/// The outcome of allocating a run directory.
///
/// Allocation is best-effort: `path` is always usable as a run root, and
/// `failure` carries any I/O error hit while creating it. The caller reports
/// the failure through the internal sink once that exists; allocation itself
/// never aborts the process.
#[derive(Debug)]
pub(crate) struct Allocation {
    pub(crate) run_id: u64,
    pub(crate) path: PathBuf,
    pub(crate) failure: Option<Error>,
}

/// Pick the first unused integer run id under `base` and create its directory.
///
/// Scans `base/0`, `base/1`, ... until a name is free. Given existing runs
/// `0..=k` this yields `k + 1`; an id is never reused against the same base
/// directory while its directory remains.
pub(crate) fn allocate(base: &Path) -> Allocation {
    let mut run_id = 0u64;
    loop {
        let path = base.join(run_id.to_string());
        if !path.is_dir() {
            let failure = fs::create_dir_all(&path).err().map(|source| {
                Error::RunDirAllocation {
                    path: path.clone(),
                    source,
                }
            });
            return Allocation {
                run_id,
                path,
                failure,
            };
        }
        run_id += 1;
    }
}
