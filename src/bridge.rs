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

//! Bridge from the `log` crate facade to a handle.
//!
//! Optional plumbing for hosts that already use `log::info!` and friends:
//! route those records into one tracked object's files, typically a subject
//! standing for the process itself.

use std::sync::Arc;

use log::LevelFilter;

use crate::handle::Level;
use crate::handle::LogHandle;

/// A [`log::Log`] implementation forwarding records to one [`LogHandle`].
///
/// `log` levels collapse onto the three files: `Error` → error, `Warn` →
/// warn, everything else → info.
///
/// # Examples
///
/// ```ignore
/// let process = Arc::new(Process::new());
/// let handle = LogRegistry::global().handle_for(&process);
/// LogBridge::new(handle).apply()?;
///
/// log::info!("control loop up");
/// ```
#[derive(Debug)]
pub struct LogBridge {
    handle: Arc<LogHandle>,
    max_level: LevelFilter,
}

impl LogBridge {
    /// Create a bridge forwarding to `handle`, accepting all levels.
    #[must_use = "call `apply` to install the bridge as the global logger"]
    pub fn new(handle: Arc<LogHandle>) -> Self {
        Self {
            handle,
            max_level: LevelFilter::Trace,
        }
    }

    /// Discard records above `max_level` instead of writing them.
    #[must_use = "call `apply` to install the bridge as the global logger"]
    pub fn max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }

    /// Install this bridge as the `log` crate's global logger.
    ///
    /// # Errors
    ///
    /// Returns an error if a global logger has already been set.
    pub fn apply(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Level::Info,
        };
        self.handle.log(level, &record.args().to_string());
    }

    fn flush(&self) {}
}
