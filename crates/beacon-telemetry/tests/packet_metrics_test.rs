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


use beacon_core::ManualClock;
use beacon_telemetry::PacketMetrics;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const START: u64 = 1_700_000_000_000;

#[test]
fn test_concurrent_producers_lose_no_events() {
    let metrics = Arc::new(PacketMetrics::new());

    let producers: Vec<_> = (0..8u64)
        .map(|id| {
            let metrics = Arc::clone(&metrics);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    metrics.record_event(id + 1);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let lifetime = metrics.lifetime();
    assert_eq!(lifetime.packet_count, 8_000);
    // 1000 * (1 + 2 + ... + 8)
    assert_eq!(lifetime.total_bytes, 36_000);
    assert_eq!(metrics.one_minute().packet_count, 8_000);
}

#[test]
fn test_readers_see_nested_windows_during_writes() {
    let clock = Arc::new(ManualClock::new(START));
    let metrics = Arc::new(PacketMetrics::with_clock(clock.clone()));

    let writer = {
        let metrics = Arc::clone(&metrics);
        let clock = clock.clone();
        thread::spawn(move || {
            for _ in 0..20_000 {
                metrics.record_event(128);
                clock.advance(Duration::from_millis(50));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let metrics = Arc::clone(&metrics);
            thread::spawn(move || {
                for _ in 0..500 {
                    let all = metrics.snapshot_all();
                    assert!(all.one_minute.packet_count <= all.five_minutes.packet_count);
                    assert!(all.five_minutes.packet_count <= all.ten_minutes.packet_count);
                    assert!(all.ten_minutes.packet_count <= all.lifetime.packet_count);
                    assert!(all.one_minute.total_bytes <= all.ten_minutes.total_bytes);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(metrics.total_packets(), 20_000);
}

#[test]
fn test_history_stays_bounded_under_steady_traffic() {
    let clock = Arc::new(ManualClock::new(START));
    let metrics = PacketMetrics::with_clock(clock.clone());

    // Thirty minutes at 10 events per second.
    for _ in 0..18_000 {
        metrics.record_event(64);
        clock.advance(Duration::from_millis(100));
    }

    // Ten minutes of records plus at most one trim interval of slack.
    assert!(metrics.history_size() <= 6_000 + 302);
    assert!(metrics.history_size() >= 6_000);
    assert_eq!(metrics.total_packets(), 18_000);
    assert_eq!(metrics.ten_minutes().packet_count, 6_000);
}

#[test]
fn test_report_captures_current_state() {
    let clock = Arc::new(ManualClock::new(START));
    let metrics = PacketMetrics::with_clock(clock.clone());
    for _ in 0..60 {
        metrics.record_event(100);
        clock.advance(Duration::from_secs(1));
    }

    let report = metrics.report();
    assert_eq!(report.history_size, 60);
    assert_eq!(report.metrics.one_minute.packet_count, 60);
    assert_eq!(report.metrics.lifetime.period_millis, 60_000);
    assert!(report
        .to_string()
        .contains("History Queue Size: 60 records"));
}
