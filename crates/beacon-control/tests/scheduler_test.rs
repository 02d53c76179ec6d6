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


use beacon_control::{CancellationToken, PeriodicScheduler};
use std::thread;
use std::time::{Duration, Instant};

fn run_iterations(frequency_hz: u64, iterations: u64) -> Duration {
    let token = CancellationToken::new();
    let scheduler = PeriodicScheduler::new(frequency_hz);
    let mut done = 0;
    let start = Instant::now();
    let stats = scheduler.run(&token, || {
        done += 1;
        if done == iterations {
            token.cancel();
        }
    });
    assert_eq!(stats.iterations, iterations);
    start.elapsed()
}

#[test]
fn test_cadence_at_100hz() {
    // 50 iterations: 49 full rests at 10 ms each.
    let elapsed = run_iterations(100, 50);
    assert!(elapsed >= Duration::from_millis(480), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(900), "too slow: {elapsed:?}");
}

#[test]
fn test_cadence_at_10hz_for_100_iterations() {
    // 99 full rests at 100 ms each; takes about ten seconds.
    let elapsed = run_iterations(10, 100);
    assert!(elapsed >= Duration::from_millis(9_800), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(11_000), "too slow: {elapsed:?}");
}

#[test]
fn test_work_time_is_subtracted_from_rest() {
    let token = CancellationToken::new();
    let mut done = 0;
    let start = Instant::now();
    PeriodicScheduler::new(50).run(&token, || {
        // 15 ms of work inside a 20 ms period.
        thread::sleep(Duration::from_millis(15));
        done += 1;
        if done == 10 {
            token.cancel();
        }
    });
    let elapsed = start.elapsed();

    // Nine full periods plus the last iteration's work, not 10 * (15 + 20).
    assert!(elapsed >= Duration::from_millis(190), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(300), "drifted: {elapsed:?}");
}

#[test]
fn test_cancellation_interrupts_rest() {
    let token = CancellationToken::new();
    let worker = {
        let token = token.clone();
        thread::spawn(move || PeriodicScheduler::new(1).run(&token, || {}))
    };

    // Let the first iteration finish and the one-second rest begin.
    thread::sleep(Duration::from_millis(100));
    let cancelled_at = Instant::now();
    token.cancel();
    let stats = worker.join().unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_millis(500));
    assert_eq!(stats.iterations, 1);
}

#[test]
fn test_handle_stop_returns_stats() {
    let handle = PeriodicScheduler::new(100)
        .spawn("cadence-test", || {})
        .unwrap();
    thread::sleep(Duration::from_millis(120));

    let stats = handle.stop();
    assert!(stats.iterations >= 5, "only {} ticks", stats.iterations);
    assert_eq!(stats.overruns, 0);
}
