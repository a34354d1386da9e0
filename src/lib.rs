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

//! Runlog keeps one set of append-only log files per tracked object of a
//! running control process.
//!
//! # Overview
//!
//! A control process (originally a robot runtime) tracks many objects: motor
//! controllers, sensors, the process itself. Runlog gives each of them its
//! own folder of level-partitioned files under a per-run numbered directory,
//! without pre-registering every instance. Handles are created lazily on
//! first use, exactly once per object identity, and every storage failure is
//! contained inside the subsystem: logging can degrade, but it never
//! destabilizes the host.
//!
//! # Examples
//!
//! Generic logging needs nothing but a [`Subject`] impl:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use runlog::LogRegistry;
//!
//! struct Lift;
//!
//! impl runlog::Subject for Lift {
//!     fn describe(&self) -> String {
//!         "lift".to_string()
//!     }
//! }
//!
//! let lift = Arc::new(Lift);
//! let handle = LogRegistry::global().handle_for(&lift);
//! handle.info("raising to scoring height");
//! ```
//!
//! Specialized handlers are registered once, at process init:
//!
//! ```no_run
//! use runlog::Handler;
//! use runlog::LogRegistry;
//! # struct Talon;
//! # impl Talon {
//! #     fn device_id(&self) -> u8 { 0 }
//! #     fn output(&self) -> f64 { 0.0 }
//! # }
//! # impl runlog::Subject for Talon {
//! #     fn describe(&self) -> String { "talon".to_string() }
//! # }
//!
//! LogRegistry::install(
//!     LogRegistry::builder("runlog").register(
//!         Handler::<Talon>::new()
//!             .folder(|t, paths| Ok(paths.base_dir.join("talon").join(t.device_id().to_string())))
//!             .status(|t| format!("output={:.2}", t.output())),
//!     ),
//! );
//! ```

pub mod bridge;
mod dispatch;
mod elapsed;
mod error;
mod handle;
mod registry;
mod run_dir;
mod sink;
mod subject;
mod trap;

pub use dispatch::Handler;
pub use dispatch::RunPaths;
pub use elapsed::Elapsed;
pub use error::Error;
pub use handle::Level;
pub use handle::LogHandle;
pub use registry::DEFAULT_BASE_DIR;
pub use registry::LogRegistry;
pub use registry::RegistryBuilder;
pub use subject::Subject;
pub use trap::FailureTrap;
pub use trap::StderrTrap;
