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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::elapsed::ElapsedClock;
use crate::error::Error;
use crate::subject::Subject;
use crate::trap::FailureTrap;

/// The level a message is logged at, selecting which file it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Routine detail; most users never read this file.
    Info,
    /// Something worth attention that did not disrupt the run.
    Warn,
    /// Something the operator must be able to find without digging.
    Error,
}

impl Level {
    pub(crate) fn filename(self) -> &'static str {
        match self {
            Level::Info => "info.txt",
            Level::Warn => "warn.txt",
            Level::Error => "error.txt",
        }
    }
}

/// One append-only log file guarded by its own writer lock.
///
/// The file is opened create-if-absent and append, never truncate, so a
/// restart into the same folder extends earlier content instead of
/// destroying it. A file that failed to open stays degraded and retries the
/// open on the next write.
#[derive(Debug)]
pub(crate) struct LevelFile {
    path: PathBuf,
    writer: Mutex<Option<File>>,
}

impl LevelFile {
    /// Create the file idempotently. An open failure leaves the file in the
    /// degraded state and hands the error back for trapping.
    pub(crate) fn create(path: PathBuf) -> (Self, Option<Error>) {
        match Self::open(&path) {
            Ok(file) => {
                let writer = Mutex::new(Some(file));
                (Self { path, writer }, None)
            }
            Err(err) => {
                let writer = Mutex::new(None);
                (Self { path, writer }, Some(err))
            }
        }
    }

    fn open(path: &Path) -> Result<File, Error> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|source| Error::FileCreation {
                path: path.to_path_buf(),
                source,
            })
    }

    fn writer(&self) -> MutexGuard<'_, Option<File>> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append one full line. The line plus terminator goes out in a single
    /// `write_all` under the lock, so concurrent writers can never interleave
    /// partial lines.
    pub(crate) fn append_line(&self, line: &str) -> Result<(), Error> {
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');

        let mut writer = self.writer();
        if writer.is_none() {
            *writer = Some(Self::open(&self.path)?);
        }
        let file = writer.as_mut().expect("writer was just opened");
        file.write_all(&bytes).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })
    }
}

pub(crate) type StatusFn = Arc<dyn Fn(&dyn Subject) -> String + Send + Sync>;

/// The per-object unit owning one tracked object's log files.
///
/// A handle is created on the first [`LogRegistry::handle_for`] request for
/// its subject and lives for the rest of the run. It owns three
/// level-partitioned append-only files in its folder and serializes writes
/// per file. I/O failures are trapped into the registry's internal sink and
/// never surface to the caller.
///
/// [`LogRegistry::handle_for`]: crate::LogRegistry::handle_for
pub struct LogHandle {
    subject: Arc<dyn Subject>,
    folder: PathBuf,
    info: LevelFile,
    warn: LevelFile,
    error: LevelFile,
    status: Option<StatusFn>,
    clock: ElapsedClock,
    trap: Arc<dyn FailureTrap>,
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle")
            .field("subject", &self.subject.describe())
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

impl LogHandle {
    /// Materialize the folder and level files for `subject`.
    ///
    /// Folder and file creation failures are trapped, not returned; the
    /// handle is always constructed and degraded files retry on first write.
    pub(crate) fn new(
        subject: Arc<dyn Subject>,
        folder: PathBuf,
        status: Option<StatusFn>,
        clock: ElapsedClock,
        trap: Arc<dyn FailureTrap>,
    ) -> Self {
        if let Err(source) = fs::create_dir_all(&folder) {
            trap.trap(&Error::FolderCreation {
                path: folder.clone(),
                source,
            });
        }

        let create = |level: Level| {
            let (file, failure) = LevelFile::create(folder.join(level.filename()));
            if let Some(err) = failure {
                trap.trap(&err);
            }
            file
        };
        let info = create(Level::Info);
        let warn = create(Level::Warn);
        let error = create(Level::Error);

        Self {
            subject,
            folder,
            info,
            warn,
            error,
            status,
            clock,
            trap,
        }
    }

    /// The folder this handle's files live in.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The tracked object this handle belongs to.
    pub fn subject(&self) -> &Arc<dyn Subject> {
        &self.subject
    }

    fn file(&self, level: Level) -> &LevelFile {
        match level {
            Level::Info => &self.info,
            Level::Warn => &self.warn,
            Level::Error => &self.error,
        }
    }

    /// Append `[h:m:s] message` to the file for `level`.
    ///
    /// Never fails from the caller's point of view; write errors go to the
    /// internal sink.
    pub fn log(&self, level: Level, message: &str) {
        let line = format!("[{}] {message}", self.clock.elapsed());
        if let Err(err) = self.file(level).append_line(&line) {
            self.trap.trap(&err);
        }
    }

    /// Log to the info file.
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Log to the warn file.
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Log to the error file.
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Log a snapshot of the subject's current state at `level`.
    ///
    /// Uses the status formatter injected by the subject's registered
    /// handler, or falls back to [`Subject::describe`].
    pub fn report_status(&self, level: Level) {
        let line = match &self.status {
            Some(status) => status(self.subject.as_ref()),
            None => self.subject.describe(),
        };
        self.log(level, &line);
    }
}
