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

//! Exact-type dispatch from tracked objects to specialized handlers.
//!
//! Specialization is opt-in per concrete type: a [`Handler`] registered for
//! `T` applies to subjects whose runtime type is exactly `T` and to nothing
//! else. Unregistered types degrade to the generic handle rather than
//! erroring. The table is populated at process init and read-only afterward.

use std::any::Any;
use std::any::TypeId;
use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::handle::StatusFn;
use crate::subject::Subject;

/// The directories a folder derivation can root itself under.
#[derive(Debug, Clone, Copy)]
pub struct RunPaths<'a> {
    /// The base directory shared by every run.
    ///
    /// Handlers keyed by a stable hardware id may place their subtree here
    /// directly, accumulating one device's logs across runs.
    pub base_dir: &'a Path,
    /// This run's own numbered directory.
    pub run_root: &'a Path,
}

/// A typed specialization for subjects of exactly `T`.
///
/// A handler composes up to two strategies into the one [`LogHandle`] type:
/// a folder derivation replacing the generic `run_root/<description>` path,
/// and a status formatter replacing [`Subject::describe`] as the
/// [`report_status`] line. Either can be omitted.
///
/// # Examples
///
/// ```ignore
/// let handler = Handler::<Talon>::new()
///     .folder(|talon, paths| Ok(paths.base_dir.join("talon").join(talon.device_id().to_string())))
///     .status(|talon| format!("output={:.2} current={:.1}A", talon.output(), talon.current()));
/// ```
///
/// [`LogHandle`]: crate::LogHandle
/// [`report_status`]: crate::LogHandle::report_status
pub struct Handler<T: Subject> {
    folder: Option<Box<dyn Fn(&T, &RunPaths<'_>) -> anyhow::Result<PathBuf> + Send + Sync>>,
    status: Option<Box<dyn Fn(&T) -> String + Send + Sync>>,
}

impl<T: Subject> Default for Handler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Subject> Handler<T> {
    /// Create a handler with no overrides.
    #[must_use = "pass the handler to `RegistryBuilder::register`"]
    pub fn new() -> Self {
        Self {
            folder: None,
            status: None,
        }
    }

    /// Override how the log folder is derived.
    ///
    /// Prefer a stable identifier (a CAN id, a port) over a display string
    /// when several subjects of `T` can coexist. An error here degrades the
    /// request to the generic folder and is reported to the internal sink.
    ///
    /// The derivation runs while the registry's handle cache is locked, so
    /// it must not call back into [`LogRegistry::handle_for`] (directly or
    /// through anything it invokes); doing so deadlocks.
    ///
    /// [`LogRegistry::handle_for`]: crate::LogRegistry::handle_for
    #[must_use = "pass the handler to `RegistryBuilder::register`"]
    pub fn folder<F>(mut self, folder: F) -> Self
    where
        F: Fn(&T, &RunPaths<'_>) -> anyhow::Result<PathBuf> + Send + Sync + 'static,
    {
        self.folder = Some(Box::new(folder));
        self
    }

    /// Override the line [`report_status`] emits.
    ///
    /// [`report_status`]: crate::LogHandle::report_status
    #[must_use = "pass the handler to `RegistryBuilder::register`"]
    pub fn status<F>(mut self, status: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.status = Some(Box::new(status));
        self
    }

    pub(crate) fn erase(self) -> (TypeId, ErasedHandler) {
        let folder = self.folder.map(|f| {
            Box::new(move |subject: &dyn Subject, paths: &RunPaths<'_>| {
                let subject = (subject as &dyn Any)
                    .downcast_ref::<T>()
                    .context("subject does not match its dispatch entry")?;
                f(subject, paths)
            }) as FolderFn
        });
        let status = self.status.map(|f| {
            Arc::new(move |subject: &dyn Subject| {
                match (subject as &dyn Any).downcast_ref::<T>() {
                    Some(subject) => f(subject),
                    None => subject.describe(),
                }
            }) as StatusFn
        });
        let erased = ErasedHandler {
            type_name: type_name::<T>(),
            folder,
            status,
        };
        (TypeId::of::<T>(), erased)
    }
}

type FolderFn = Box<dyn Fn(&dyn Subject, &RunPaths<'_>) -> anyhow::Result<PathBuf> + Send + Sync>;

/// A [`Handler`] with its subject type erased, keyed in the table by `TypeId`.
pub(crate) struct ErasedHandler {
    type_name: &'static str,
    folder: Option<FolderFn>,
    status: Option<StatusFn>,
}

impl ErasedHandler {
    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Run the folder override, if any.
    pub(crate) fn derive_folder(
        &self,
        subject: &dyn Subject,
        paths: &RunPaths<'_>,
    ) -> Option<anyhow::Result<PathBuf>> {
        self.folder.as_ref().map(|f| f(subject, paths))
    }

    pub(crate) fn status(&self) -> Option<StatusFn> {
        self.status.clone()
    }
}

impl fmt::Debug for ErasedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedHandler")
            .field("type_name", &self.type_name)
            .field("folder", &self.folder.is_some())
            .field("status", &self.status.is_some())
            .finish()
    }
}

/// The registered handlers, frozen once the registry is built.
#[derive(Debug, Default)]
pub(crate) struct DispatchTable {
    entries: HashMap<TypeId, ErasedHandler>,
}

impl DispatchTable {
    /// Add an entry.
    ///
    /// # Panics
    ///
    /// Panics if a handler is already registered for the same type. Two
    /// registrations for one type is a process-init configuration error;
    /// silently letting one win would make dispatch depend on registration
    /// order.
    pub(crate) fn insert(&mut self, type_id: TypeId, handler: ErasedHandler) {
        let type_name = handler.type_name();
        if self.entries.insert(type_id, handler).is_some() {
            panic!("a handler is already registered for {type_name}");
        }
    }

    /// Look up the handler for an exact runtime type.
    pub(crate) fn resolve(&self, type_id: TypeId) -> Option<&ErasedHandler> {
        self.entries.get(&type_id)
    }
}
