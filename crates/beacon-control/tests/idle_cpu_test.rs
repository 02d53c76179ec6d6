// Copyright 2025 eraflo
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


//! Idle-loop CPU usage, measured from the kernel's per-thread accounting.

#![cfg(target_os = "linux")]

use beacon_control::{CancellationToken, PeriodicScheduler};
use std::thread;
use std::time::{Duration, Instant};

/// Kernel clock ticks per second used by `/proc` time fields (USER_HZ).
const USER_HZ: f64 = 100.0;

/// User plus system CPU time consumed so far by the calling thread.
fn thread_cpu_time() -> Duration {
    let stat = std::fs::read_to_string("/proc/thread-self/stat").unwrap();
    // The command name may contain spaces; fields resume after its `)`.
    let fields: Vec<&str> = stat[stat.rfind(')').unwrap() + 1..]
        .split_whitespace()
        .collect();
    let utime: u64 = fields[11].parse().unwrap();
    let stime: u64 = fields[12].parse().unwrap();
    Duration::from_secs_f64((utime + stime) as f64 / USER_HZ)
}

fn idle_cpu_share(frequency_hz: u64, run_for: Duration) -> (u64, f64) {
    let token = CancellationToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(run_for);
            token.cancel();
        })
    };

    let cpu_before = thread_cpu_time();
    let start = Instant::now();
    let stats = PeriodicScheduler::new(frequency_hz).run(&token, || {});
    let wall = start.elapsed();
    let cpu = thread_cpu_time() - cpu_before;
    canceller.join().unwrap();

    (stats.iterations, cpu.as_secs_f64() / wall.as_secs_f64())
}

#[test]
fn test_idle_loop_at_max_frequency_does_not_spin() {
    let (iterations, share) = idle_cpu_share(1000, Duration::from_secs(1));
    assert!(iterations > 100, "loop barely ran: {iterations} iterations");
    assert!(share < 0.3, "idle loop used {:.0}% of a core", share * 100.0);
}

#[test]
fn test_idle_loop_at_default_frequency_is_nearly_free() {
    let (iterations, share) = idle_cpu_share(30, Duration::from_secs(1));
    assert!(iterations >= 25, "only {iterations} iterations");
    assert!(share < 0.1, "idle loop used {:.0}% of a core", share * 100.0);
}
