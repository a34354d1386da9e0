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
use std::sync::Arc;
use std::thread;

use rand::Rng;
use rand::distr::Alphanumeric;
use runlog::Level;
use runlog::LogRegistry;
use runlog::Subject;
use tempfile::TempDir;

struct Sensor(&'static str);

impl Subject for Sensor {
    fn describe(&self) -> String {
        self.0.to_string()
    }
}

/// Parse the `[h:m:s]` prefix of a log line into total seconds.
fn prefix_seconds(line: &str) -> u64 {
    let end = line.find(']').expect("line has no prefix");
    let parts: Vec<u64> = line[1..end]
        .split(':')
        .map(|p| p.parse().expect("prefix field is not a number"))
        .collect();
    assert_eq!(parts.len(), 3, "prefix is not h:m:s in {line:?}");
    parts[0] * 3600 + parts[1] * 60 + parts[2]
}

#[test]
fn test_lines_arrive_in_call_order_with_monotonic_prefixes() {
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let sensor = Arc::new(Sensor("lidar"));
    let handle = registry.handle_for(&sensor);

    let count = 50;
    for i in 0..count {
        handle.log(Level::Info, &format!("sweep {i}"));
    }

    let content = fs::read_to_string(handle.folder().join("info.txt")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), count);
    let mut last = 0;
    for (i, line) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!("sweep {i}")), "got {line:?}");
        let seconds = prefix_seconds(line);
        assert!(seconds >= last, "prefix went backwards at line {i}");
        last = seconds;
    }
}

#[test]
fn test_arbitrary_payloads_round_trip_unmangled() {
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let sensor = Arc::new(Sensor("imu"));
    let handle = registry.handle_for(&sensor);

    let mut rng = rand::rng();
    let message: String = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(80)
        .map(char::from)
        .collect();
    handle.warn(&message);

    let content = fs::read_to_string(handle.folder().join("warn.txt")).unwrap();
    assert!(content.trim_end().ends_with(&message));
}

#[test]
fn test_concurrent_writers_never_interleave_or_drop_lines() {
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let sensor = Arc::new(Sensor("encoder"));
    let handle = registry.handle_for(&sensor);

    let threads = 100;
    thread::scope(|scope| {
        for i in 0..threads {
            let handle = &handle;
            scope.spawn(move || {
                handle.info(&format!("tick from thread {i}"));
            });
        }
    });

    let content = fs::read_to_string(handle.folder().join("info.txt")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), threads);
    for line in &lines {
        assert!(line.starts_with('['), "corrupted line {line:?}");
        assert!(line.contains("tick from thread"), "corrupted line {line:?}");
    }
    // Every thread's message survived exactly once.
    for i in 0..threads {
        let needle = format!("tick from thread {i}");
        let hits = lines.iter().filter(|l| l.ends_with(&needle)).count();
        assert_eq!(hits, 1, "message {i} appeared {hits} times");
    }
}

#[test]
fn test_concurrent_handle_requests_construct_one_handle() {
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let sensor: Arc<dyn Subject> = Arc::new(Sensor("gyro"));

    let handles: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..16)
            .map(|_| {
                let registry = &registry;
                let sensor = sensor.clone();
                scope.spawn(move || registry.handle_for_dyn(sensor))
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    for handle in &handles[1..] {
        assert!(Arc::ptr_eq(&handles[0], handle));
    }
}

#[test]
fn test_levels_do_not_cross_contaminate() {
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let sensor = Arc::new(Sensor("limit-switch"));
    let handle = registry.handle_for(&sensor);

    handle.info("pressed");
    handle.warn("bounced");
    handle.error("stuck");

    let folder = handle.folder();
    let info = fs::read_to_string(folder.join("info.txt")).unwrap();
    let warn = fs::read_to_string(folder.join("warn.txt")).unwrap();
    let error = fs::read_to_string(folder.join("error.txt")).unwrap();
    assert_eq!(info.lines().count(), 1);
    assert_eq!(warn.lines().count(), 1);
    assert_eq!(error.lines().count(), 1);
    assert!(info.contains("pressed"));
    assert!(warn.contains("bounced"));
    assert!(error.contains("stuck"));
}

#[test]
fn test_degraded_files_trap_failures_and_recover_on_retry() {
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let sensor = Arc::new(Sensor("blocked"));

    // Squat a plain file where the handle's folder would go, so folder
    // creation and every file open fail.
    let folder = registry.run_root().join("blocked");
    fs::write(&folder, b"in the way").unwrap();

    let handle = registry.handle_for(&sensor);
    handle.info("while degraded");

    let failures =
        fs::read_to_string(registry.run_root().join("runlog").join("failures.txt")).unwrap();
    let folder_failures = failures
        .lines()
        .filter(|l| l.contains("failed to create log folder"))
        .count();
    let file_failures = failures
        .lines()
        .filter(|l| l.contains("failed to create log file"))
        .count();
    // One trapped folder failure, three trapped opens at construction and
    // a fourth from the degraded write's retry.
    assert_eq!(folder_failures, 1, "failures were {failures:?}");
    assert_eq!(file_failures, 4, "failures were {failures:?}");

    // Clear the path; the next write retries the open and lands.
    fs::remove_file(&folder).unwrap();
    fs::create_dir_all(&folder).unwrap();
    handle.info("recovered");

    let info = fs::read_to_string(folder.join("info.txt")).unwrap();
    let lines: Vec<&str> = info.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("recovered"), "got {:?}", lines[0]);
}

#[test]
fn test_matching_descriptions_share_a_file_set() {
    // Known boundary condition: generic folders derive from the description,
    // so two distinct subjects that describe identically collide.
    let dir = TempDir::new().unwrap();
    let registry = LogRegistry::builder(dir.path()).build();
    let a = Arc::new(Sensor("twin"));
    let b = Arc::new(Sensor("twin"));

    let handle_a = registry.handle_for(&a);
    let handle_b = registry.handle_for(&b);
    assert!(!Arc::ptr_eq(&handle_a, &handle_b));
    assert_eq!(handle_a.folder(), handle_b.folder());

    handle_a.info("from a");
    handle_b.info("from b");
    let content = fs::read_to_string(handle_a.folder().join("info.txt")).unwrap();
    assert!(content.contains("from a"));
    assert!(content.contains("from b"));
}
