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

//! Elapsed-time measurement for log-line prefixes.
//!
//! Every log line is prefixed with the time since the registry was
//! constructed, not wall-clock time. The zero point is captured once and
//! measured with [`Instant`], which is monotonic; wall-clock time is not,
//! and a control process may run across clock adjustments.

use std::fmt;
use std::time::Duration;
use std::time::Instant;

/// The zero point for elapsed-time prefixes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElapsedClock {
    start: Instant,
}

impl ElapsedClock {
    pub(crate) fn start_now() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub(crate) fn elapsed(&self) -> Elapsed {
        Elapsed::from_duration(self.start.elapsed())
    }
}

/// Time since registry construction, decomposed for log-line prefixes.
///
/// The decomposition is a proper modular breakdown: `minutes`, `seconds`
/// and `millis` are the remainders not accounted for by the larger units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    /// Whole hours since start.
    pub hours: u64,
    /// Minutes not accounted for by `hours` (0–59).
    pub minutes: u64,
    /// Seconds not accounted for by `minutes` (0–59).
    pub seconds: u64,
    /// Milliseconds not accounted for by `seconds` (0–999).
    pub millis: u64,
}

impl Elapsed {
    pub(crate) fn from_duration(elapsed: Duration) -> Self {
        let millis = u64::from(elapsed.subsec_millis());
        let total_seconds = elapsed.as_secs();
        Self {
            hours: total_seconds / 3600,
            minutes: total_seconds / 60 % 60,
            seconds: total_seconds % 60,
            millis,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Elapsed;

    #[test]
    fn test_decompose_sub_minute() {
        let elapsed = Elapsed::from_duration(Duration::from_millis(1200));
        assert_eq!(elapsed, Elapsed {
            hours: 0,
            minutes: 0,
            seconds: 1,
            millis: 200,
        });
        assert_eq!(elapsed.to_string(), "0:0:1");
    }

    #[test]
    fn test_decompose_minutes() {
        let elapsed = Elapsed::from_duration(Duration::from_secs(65));
        assert_eq!(elapsed.to_string(), "0:1:5");
    }

    #[test]
    fn test_decompose_past_one_hour() {
        // 2h 3m 4s; a naive hour rollover that subtracts the wrong base
        // would leak hours into the minute field here.
        let elapsed = Elapsed::from_duration(Duration::from_secs(2 * 3600 + 3 * 60 + 4));
        assert_eq!(elapsed, Elapsed {
            hours: 2,
            minutes: 3,
            seconds: 4,
            millis: 0,
        });
    }

    #[test]
    fn test_minutes_and_seconds_stay_in_range() {
        for secs in [0, 59, 60, 3599, 3600, 86399, 86400] {
            let elapsed = Elapsed::from_duration(Duration::from_secs(secs));
            assert!(elapsed.minutes < 60);
            assert!(elapsed.seconds < 60);
            let total = elapsed.hours * 3600 + elapsed.minutes * 60 + elapsed.seconds;
            assert_eq!(total, secs);
        }
    }
}
