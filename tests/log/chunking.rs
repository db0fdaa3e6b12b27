//! Chunked reads

use crate::common::*;
use keepsake::Keepsake;

#[test]
fn test_hundred_bytes_in_default_chunks() {
    let (_dir, log) = disk_log();
    let content: Vec<u8> = (0..100u8).map(|b| b'a' + b % 26).collect();
    log.append("files/hundred", &content).unwrap();

    assert_eq!(chunk_sizes(&log, "files/hundred"), vec![31, 31, 31, 7]);
    assert_eq!(log.read_to_vec("files/hundred").unwrap(), content);
}

#[test]
fn test_exact_multiple_has_no_trailing_chunk() {
    let log = Keepsake::ephemeral().unwrap();
    log.append("files/even", &[b'x'; 62]).unwrap();
    assert_eq!(chunk_sizes(&log, "files/even"), vec![31, 31]);
}

#[test]
fn test_custom_chunk_size() {
    let dir = tempfile::tempdir().unwrap();
    let log = Keepsake::builder().path(dir.path()).chunk_size(4).open().unwrap();
    log.append_line("log", "abcdefghij").unwrap();

    let chunks = log.read_all("log").unwrap();
    assert_eq!(chunks.chunk_size(), 4);
    let chunks: Vec<Vec<u8>> = chunks.map(|c| c.unwrap()).collect();
    assert_eq!(chunks, vec![b"abcd".to_vec(), b"efgh".to_vec(), b"ij".to_vec()]);
}

#[test]
fn test_empty_resource_yields_no_chunks() {
    let (_dir, log) = disk_log();
    log.append_line("empty", "").unwrap();
    assert!(log.exists("empty").unwrap());
    assert!(chunk_sizes(&log, "empty").is_empty());
}

#[test]
fn test_stream_to_writer() {
    let (_dir, log) = disk_log();
    let line = "I was here :)\n";
    for _ in 0..5 {
        log.append_line("files/count.txt", line).unwrap();
    }

    let mut out = Vec::new();
    let emitted = log.stream_to("files/count.txt", &mut out).unwrap();
    assert_eq!(emitted, 5 * line.len() as u64);
    assert_eq!(out, line.repeat(5).into_bytes());
}

#[test]
fn test_partial_iteration_then_drop() {
    let (_dir, log) = disk_log();
    log.append("big", &[7u8; 500]).unwrap();

    let mut chunks = log.read_all("big").unwrap();
    assert_eq!(chunks.next().unwrap().unwrap().len(), 31);
    assert_eq!(chunks.bytes_read(), 31);
    drop(chunks);

    // Dropping a half-read stream leaves the resource usable.
    log.append("big", &[8u8; 1]).unwrap();
    assert_eq!(log.read_to_vec("big").unwrap().len(), 501);
}
