use pwn_core::{build, build_from_path, snapshot, IngestPipeline, ShardConfig, ShardSet};
use rand::Rng;
use std::io::Write;
use tempfile::NamedTempFile;

fn corpus(n: usize) -> String {
    let mut rng = rand::rng();
    let mut out = String::new();
    for _ in 0..n {
        let prefix: u64 = rng.random_range(0..(1u64 << 40));
        let count: u32 = rng.random_range(1..10_000);
        out.push_str(&format!("{prefix:010X}{:030X}:{count}\r\n", prefix ^ 0xABCDEF));
    }
    out
}

#[test]
fn every_ingested_key_is_found_across_shards() {
    let text = corpus(3_000);
    // 4096-bit shards fill after 512 keys, so this spills over several shards
    let cfg = ShardConfig::default().with_shard_bits(4096);
    let (set, report) = build(text.as_bytes(), text.len() as u64, &cfg).unwrap();
    assert!(set.len() > 1);
    assert!(report.rotations >= 1);
    assert_eq!(report.inserted, 3_000);
    assert_eq!(report.malformed, 0);
    for line in text.lines() {
        assert!(set.contains(line[..10].as_bytes()), "false negative for {line}");
    }
}

#[test]
fn identical_corpora_build_identical_sets() {
    let text = corpus(1_000);
    let cfg = ShardConfig::default().with_shard_bits(2048);
    let (a, _) = build(text.as_bytes(), text.len() as u64, &cfg).unwrap();
    let (b, _) = build(text.as_bytes(), text.len() as u64, &cfg).unwrap();
    assert_eq!(a, b);
    for (x, y) in a.shards().iter().zip(b.shards()) {
        assert_eq!(x.bits().as_bytes(), y.bits().as_bytes());
    }
}

#[test]
fn default_sizing_from_file_length() {
    let text = corpus(200);
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(text.as_bytes()).unwrap();
    f.flush().unwrap();
    let (set, report) = build_from_path(f.path(), &ShardConfig::default()).unwrap();
    // 200 lines * 44 bytes is far below 8 Mb, so a single 1 MiB shard
    assert_eq!(set.len(), 1);
    assert_eq!(set.shards()[0].bits().as_bytes().len(), 1024 * 1024);
    assert_eq!(report.inserted, 200);
}

#[test]
fn saved_snapshot_answers_like_the_original() {
    let text = corpus(800);
    let cfg = ShardConfig::default().with_shard_bits(1024);
    let (set, _) = build(text.as_bytes(), text.len() as u64, &cfg).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = snapshot::save(&set, dir.path().join("filters.pwnf")).unwrap();
    let back = snapshot::load(&path).unwrap();
    assert_eq!(back, set);
    for line in text.lines() {
        assert!(back.contains(line[..10].as_bytes()));
    }

    // keeps filling from the saved cursor
    let mut a = set;
    let mut b = back;
    let more = corpus(100);
    IngestPipeline::new(more.as_bytes()).run(&mut a).unwrap();
    IngestPipeline::new(more.as_bytes()).run(&mut b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn explicit_two_shard_set_rotates_once() {
    let cfg = ShardConfig::default().with_shard_bits(800);
    let mut set = ShardSet::create(2, &cfg).unwrap();
    let text: String = (0..101).map(|i| format!("{i:010}\n")).collect();
    let report = IngestPipeline::new(text.as_bytes()).run(&mut set).unwrap();
    assert_eq!(report.rotations, 1);
    assert_eq!(set.shards()[0].inserted_count(), 100);
    assert_eq!(set.shards()[1].inserted_count(), 1);
    assert!(set.contains(b"0000000100"));
}
