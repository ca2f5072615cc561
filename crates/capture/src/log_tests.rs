// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use proptest::prelude::*;
use rstest::rstest;
use std::thread;

fn make_delivery(destination: u32, event: i32) -> CapturedDelivery {
    CapturedDelivery {
        destination,
        event,
        window: 0x1001,
        object_id: 0,
        child_id: 0,
        callback: 0xdead_beef,
        module: None,
        handle: 0x0020,
    }
}

fn read_lines(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn record_returns_sequence_numbers() {
    let log = DeliveryLog::new();

    assert_eq!(log.record(make_delivery(7, 0x8005)).unwrap(), 0);
    assert_eq!(log.record(make_delivery(7, 0x8006)).unwrap(), 1);

    assert_eq!(log.len(), 2);
    let deliveries = log.deliveries();
    assert_eq!(deliveries[1].seq, 1);
    assert_eq!(deliveries[0].delivery.destination, 7);
    assert_eq!(deliveries[0].delivery.event, 0x8005);
    assert_eq!(log.write_failures(), 0);
}

#[rstest]
#[case::first(10, &[1, 3])]
#[case::second(11, &[2])]
#[case::nobody(12, &[])]
fn for_destination_filters_in_order(#[case] thread: u32, #[case] events: &[i32]) {
    let log = DeliveryLog::new();
    log.record(make_delivery(10, 1)).unwrap();
    log.record(make_delivery(11, 2)).unwrap();
    log.record(make_delivery(10, 3)).unwrap();

    let seen: Vec<i32> = log
        .for_destination(thread)
        .iter()
        .map(|d| d.delivery.event)
        .collect();

    assert_eq!(seen, events);
}

#[rstest]
#[case(1, 1)]
#[case(5, 2)]
#[case(3, 10)]
fn last_keeps_the_newest_in_order(#[case] total: i32, #[case] n: usize) {
    let log = DeliveryLog::new();
    for event in 0..total {
        log.record(make_delivery(1, event)).unwrap();
    }

    let events: Vec<i32> = log.last(n).iter().map(|d| d.delivery.event).collect();

    let first = (total - n as i32).max(0);
    assert_eq!(events, (first..total).collect::<Vec<_>>());
}

#[test]
fn count_and_clear() {
    let log = DeliveryLog::new();
    log.record(make_delivery(1, 3)).unwrap();
    log.record(make_delivery(2, 4)).unwrap();
    log.record(make_delivery(1, 5)).unwrap();
    assert_eq!(log.count(|d| d.delivery.event >= 4), 2);

    log.clear();
    assert!(log.is_empty());
    assert_eq!(log.record(make_delivery(1, 6)).unwrap(), 0);
}

#[test]
fn clones_share_the_log() {
    let log = DeliveryLog::new();
    let clone = log.clone();

    clone.record(make_delivery(1, 1)).unwrap();

    assert!(!log.is_empty());
    assert_eq!(log.len(), 1);
}

#[test]
fn concurrent_recording_keeps_sequence_dense() {
    let log = DeliveryLog::new();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    log.record(make_delivery(t, i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(log.len(), 100);
    for (i, posted) in log.deliveries().iter().enumerate() {
        assert_eq!(posted.seq, i as u64);
    }
}

#[test]
fn with_file_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deliveries.jsonl");

    let log = DeliveryLog::with_file(&path).unwrap();
    let mut delivery = make_delivery(4, 9);
    delivery.module = Some("hooks.dll".to_string());
    log.record(delivery).unwrap();
    log.record(make_delivery(5, 10)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let first: PostedDelivery = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(first.seq, 0);
    assert_eq!(first.delivery.destination, 4);
    assert_eq!(first.delivery.module.as_deref(), Some("hooks.dll"));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["destination"], 5);
    assert_eq!(lines[1]["seq"], 1);
    assert!(lines[1]["elapsed_us"].is_u64());
}

#[test]
fn with_file_appends_to_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deliveries.jsonl");

    DeliveryLog::with_file(&path)
        .unwrap()
        .record(make_delivery(1, 1))
        .unwrap();
    DeliveryLog::with_file(&path)
        .unwrap()
        .record(make_delivery(2, 2))
        .unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["destination"], 1);
    assert_eq!(lines[1]["destination"], 2);
    assert_eq!(lines[1]["seq"], 0);
}

#[cfg(target_os = "linux")]
#[test]
fn failed_file_write_is_reported_and_counted() {
    let log = DeliveryLog::with_file(Path::new("/dev/full")).unwrap();

    let err = log.record(make_delivery(3, 1)).unwrap_err();
    assert!(log.record(make_delivery(3, 2)).is_err());

    assert_eq!(log.len(), 2);
    assert_eq!(log.write_failures(), 2);
    let pending = log.take_write_error().unwrap();
    assert_eq!(pending.kind(), err.kind());
    assert!(log.take_write_error().is_none());
}

proptest! {
    #[test]
    fn len_equals_record_count(count in 0usize..100) {
        let log = DeliveryLog::new();
        for i in 0..count {
            log.record(make_delivery(1, i as i32)).unwrap();
        }
        prop_assert_eq!(log.len(), count);
    }

    #[test]
    fn destinations_partition_log(
        first in 0usize..20,
        second in 0usize..20,
    ) {
        let log = DeliveryLog::new();
        for i in 0..first {
            log.record(make_delivery(1, i as i32)).unwrap();
        }
        for i in 0..second {
            log.record(make_delivery(2, i as i32)).unwrap();
        }

        prop_assert_eq!(log.for_destination(1).len(), first);
        prop_assert_eq!(log.for_destination(2).len(), second);
        prop_assert_eq!(log.len(), first + second);
    }
}
