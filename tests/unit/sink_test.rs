//! Tests for the shared output sink

use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::thread;

use rand::Rng;
use serde_json::{json, Value};
use service_poller::config::OutputTarget;
use service_poller::core::WriteError;
use service_poller::infra::SinkWriter;

#[test]
fn test_concurrent_appends_never_interleave() {
    const THREADS: usize = 16;
    const APPENDS: usize = 200;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.jsonl");
    let sink = Arc::new(SinkWriter::open(&OutputTarget::File(path.clone())).unwrap());

    let handles: Vec<_> = (0..THREADS)
        .map(|writer| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                let mut rng = rand::rng();
                for seq in 0..APPENDS {
                    let padding = "x".repeat(rng.random_range(0..4096));
                    let record = json!({"writer": writer, "seq": seq, "padding": padding});
                    sink.append(&record).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    sink.close().unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let mut per_writer = vec![0usize; THREADS];
    let mut lines = 0;
    for line in BufReader::new(file).lines() {
        let value: Value = serde_json::from_str(&line.unwrap()).expect("every line is one document");
        let writer = usize::try_from(value["writer"].as_u64().unwrap()).unwrap();
        per_writer[writer] += 1;
        lines += 1;
    }
    assert_eq!(lines, THREADS * APPENDS);
    assert!(per_writer.iter().all(|&n| n == APPENDS));
}

#[test]
fn test_file_sink_appends_to_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.jsonl");
    std::fs::write(&path, "{\"previous\":true}\n").unwrap();

    let sink = SinkWriter::open(&OutputTarget::File(path.clone())).unwrap();
    let written = sink.append(&json!({"b": 2, "a": 1})).unwrap();
    sink.close().unwrap();

    assert_eq!(written, "{\"b\":2,\"a\":1}\n".len());
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "{\"previous\":true}\n{\"b\":2,\"a\":1}\n");
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("output.jsonl");
    assert!(SinkWriter::open(&OutputTarget::File(path)).is_err());
}

#[test]
fn test_append_after_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let sink = SinkWriter::open(&OutputTarget::File(dir.path().join("out.jsonl"))).unwrap();
    assert!(sink.is_open());
    sink.close().unwrap();
    sink.close().unwrap();
    assert!(!sink.is_open());

    let err = sink.append(&json!({})).unwrap_err();
    assert!(matches!(err, WriteError::SinkUnavailable(_)));
}
