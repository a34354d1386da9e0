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

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use crate::dispatch::DispatchTable;
use crate::dispatch::Handler;
use crate::dispatch::RunPaths;
use crate::elapsed::Elapsed;
use crate::elapsed::ElapsedClock;
use crate::error::Error;
use crate::handle::LogHandle;
use crate::run_dir;
use crate::sink::InternalSink;
use crate::subject::Subject;
use crate::subject::SubjectId;
use crate::trap::FailureTrap;

/// The base directory the global registry logs under.
pub const DEFAULT_BASE_DIR: &str = "runlog";

static GLOBAL: OnceLock<LogRegistry> = OnceLock::new();

/// Configures a [`LogRegistry`] before construction.
///
/// All handler registration happens here, at process init; the dispatch
/// table is frozen once [`build`] or [`LogRegistry::install`] runs.
///
/// [`build`]: RegistryBuilder::build
#[derive(Debug)]
pub struct RegistryBuilder {
    base_dir: PathBuf,
    table: DispatchTable,
}

impl RegistryBuilder {
    /// Register a specialized [`Handler`] for subjects of exactly `T`.
    ///
    /// # Panics
    ///
    /// Panics if a handler for `T` is already registered; see
    /// [`Handler`] for why duplicates are rejected outright.
    #[must_use = "call `build` or `LogRegistry::install` to construct the registry"]
    pub fn register<T: Subject>(mut self, handler: Handler<T>) -> Self {
        let (type_id, erased) = handler.erase();
        self.table.insert(type_id, erased);
        self
    }

    /// Construct an isolated, non-global registry.
    ///
    /// This is the constructor tests use; production code usually goes
    /// through [`LogRegistry::install`] or [`LogRegistry::global`] instead.
    ///
    /// Construction is infallible by design: a run directory that cannot be
    /// created leaves the registry logging best-effort into the planned
    /// path, with the failure recorded in the internal sink (or on stderr
    /// if even that is out of reach).
    pub fn build(self) -> LogRegistry {
        let clock = ElapsedClock::start_now();
        let allocation = run_dir::allocate(&self.base_dir);
        let sink = InternalSink::new(&allocation.path, clock);
        if let Some(err) = allocation.failure {
            sink.trap(&err);
        }
        sink.handle().info(&format!(
            "run {} started at {}",
            allocation.run_id,
            jiff::Zoned::now()
        ));
        LogRegistry {
            base_dir: self.base_dir,
            run_id: allocation.run_id,
            run_root: allocation.path,
            clock,
            table: self.table,
            cache: Mutex::new(HashMap::new()),
            sink,
        }
    }
}

/// The process-wide registry of per-object log handles.
///
/// The registry owns this run's numbered directory, the dispatch table, the
/// identity-keyed handle cache and the internal sink. Handles are created
/// lazily on first request and live for the rest of the run; a given object
/// identity maps to exactly one handle, ever.
pub struct LogRegistry {
    base_dir: PathBuf,
    run_id: u64,
    run_root: PathBuf,
    clock: ElapsedClock,
    table: DispatchTable,
    cache: Mutex<HashMap<SubjectId, Arc<LogHandle>>>,
    sink: Arc<InternalSink>,
}

impl std::fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRegistry")
            .field("run_id", &self.run_id)
            .field("run_root", &self.run_root)
            .finish_non_exhaustive()
    }
}

impl LogRegistry {
    /// Start configuring a registry that logs under `base_dir`.
    pub fn builder(base_dir: impl Into<PathBuf>) -> RegistryBuilder {
        RegistryBuilder {
            base_dir: base_dir.into(),
            table: DispatchTable::default(),
        }
    }

    /// The process-wide registry, constructed on first use.
    ///
    /// Safe under concurrent first use: exactly one instance is ever
    /// constructed. Without a prior [`install`] the registry logs under
    /// [`DEFAULT_BASE_DIR`] with no specialized handlers.
    ///
    /// [`install`]: LogRegistry::install
    pub fn global() -> &'static LogRegistry {
        GLOBAL.get_or_init(|| LogRegistry::builder(DEFAULT_BASE_DIR).build())
    }

    /// Install a configured registry as the process-wide one.
    ///
    /// Call this once, early. If the global registry already exists the
    /// builder is discarded and the existing instance is returned, so the
    /// winner of a racing first use is always a fully constructed registry.
    pub fn install(builder: RegistryBuilder) -> &'static LogRegistry {
        GLOBAL.get_or_init(|| builder.build())
    }

    /// The handle for `subject`, created on first request.
    pub fn handle_for<T: Subject>(&self, subject: &Arc<T>) -> Arc<LogHandle> {
        let subject: Arc<dyn Subject> = subject.clone();
        self.handle_for_dyn(subject)
    }

    /// As [`handle_for`], for subjects already behind `Arc<dyn Subject>`.
    ///
    /// Identity is the `Arc` allocation, not the value: two clones of one
    /// `Arc` share a handle, two separately allocated but equal subjects do
    /// not. The cache lock is held across construction, so concurrent first
    /// requests for one subject still construct exactly one handle.
    ///
    /// [`handle_for`]: LogRegistry::handle_for
    pub fn handle_for_dyn(&self, subject: Arc<dyn Subject>) -> Arc<LogHandle> {
        let id = SubjectId::of(&subject);
        let mut cache = self.cache();
        if let Some(handle) = cache.get(&id) {
            return handle.clone();
        }
        let handle = Arc::new(self.construct(subject));
        cache.insert(id, handle.clone());
        handle
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<SubjectId, Arc<LogHandle>>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Build a handle for `subject`, specialized if its exact type has a
    /// registered handler and generic otherwise.
    ///
    /// A handler whose folder derivation fails degrades the whole request to
    /// the generic handle; the failure goes to the internal sink.
    fn construct(&self, subject: Arc<dyn Subject>) -> LogHandle {
        let paths = RunPaths {
            base_dir: &self.base_dir,
            run_root: &self.run_root,
        };
        let mut folder = None;
        let mut status = None;
        let type_id = crate::subject::concrete_type_id(subject.as_ref());
        if let Some(handler) = self.table.resolve(type_id) {
            match handler.derive_folder(subject.as_ref(), &paths) {
                Some(Ok(path)) => {
                    folder = Some(path);
                    status = handler.status();
                }
                Some(Err(source)) => {
                    self.report_internal_failure(&Error::HandlerConstruction {
                        type_name: handler.type_name(),
                        source,
                    });
                }
                None => {
                    status = handler.status();
                }
            }
        }
        let folder = folder.unwrap_or_else(|| self.run_root.join(subject.describe()));
        let trap: Arc<dyn FailureTrap> = self.sink.clone();
        LogHandle::new(subject, folder, status, self.clock, trap)
    }

    /// Record a failure of the logging subsystem itself.
    ///
    /// Never returns an error. Lands in the internal sink's failures file,
    /// or on stderr as the last resort.
    pub fn report_internal_failure(&self, err: &Error) {
        self.sink.trap(err);
    }

    /// Time since this registry was constructed, decomposed for prefixing.
    pub fn elapsed(&self) -> Elapsed {
        self.clock.elapsed()
    }

    /// This run's numbered directory.
    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    /// This run's integer id.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}
