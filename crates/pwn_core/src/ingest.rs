//! Corpus ingestion: one line, one key, one shard mutation, in order.
use crate::consts::KEY_LEN;
use crate::errors::{PwnError, Result};
use crate::shard_set::{ShardConfig, ShardSet};
use crate::utils::trim_line_end;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of one ingestion pass.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct IngestReport {
    pub lines_read: u64,
    pub inserted: u64,
    /// Lines too short to carry a key; skipped.
    pub malformed: u64,
    pub rotations: u64,
    pub shard_count: usize,
}

/// A hash-prefix key, ASCII letters folded to upper case.
pub type Key = [u8; KEY_LEN];

fn fold_key(raw: &[u8]) -> Key {
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&raw[..KEY_LEN]);
    key.make_ascii_uppercase();
    key
}

/// The hash-prefix key of a corpus line, or `None` when the line is too short.
/// Anything after the first [`KEY_LEN`] bytes (the `:count` suffix) is ignored.
pub fn extract_key(line: &[u8]) -> Option<Key> {
    let line = trim_line_end(line);
    if line.len() < KEY_LEN { None } else { Some(fold_key(line)) }
}

/// Key for a user-supplied hash: at least [`KEY_LEN`] hex digits, any case.
/// Folded the same way as corpus keys, so `sha1sum` output matches an uppercase corpus.
pub fn query_key(hash: &str) -> Option<Key> {
    let b = hash.trim().as_bytes();
    let prefix = b.get(..KEY_LEN)?;
    hex::decode(prefix).ok()?;
    Some(fold_key(prefix))
}

pub struct IngestPipeline<R> {
    source: R,
}

impl<R: BufRead> IngestPipeline<R> {
    pub fn new(source: R) -> Self { Self { source } }

    /// Drain the source into `set`. A read error aborts the pass; a partially
    /// ingested set must not be mistaken for a complete one.
    pub fn run(mut self, set: &mut ShardSet) -> Result<IngestReport> {
        let mut report = IngestReport { shard_count: set.len(), ..Default::default() };
        let mut line = Vec::with_capacity(128);
        let mut saturation_logged = false;
        info!(shards = set.len(), "ingestion started");
        loop {
            line.clear();
            let n = self
                .source
                .read_until(b'\n', &mut line)
                .map_err(|source| PwnError::SourceRead { line: report.lines_read + 1, source })?;
            if n == 0 { break; }
            report.lines_read += 1;

            let Some(key) = extract_key(&line) else {
                report.malformed += 1;
                debug!(line = report.lines_read, len = n, "skipping short line");
                continue;
            };
            if set.route_insert(&key) {
                report.rotations += 1;
                if !saturation_logged && set.saturated() {
                    warn!(line = report.lines_read, "every shard is past its fill threshold; false-positive rate will climb");
                    saturation_logged = true;
                }
            }
            report.inserted += 1;
        }
        if report.malformed > 0 {
            warn!(malformed = report.malformed, "skipped lines shorter than {KEY_LEN} bytes");
        }
        info!(
            lines = report.lines_read,
            inserted = report.inserted,
            rotations = report.rotations,
            "ingestion finished"
        );
        Ok(report)
    }
}

/// Size a shard set from `corpus_len`, then ingest `source` into it.
pub fn build<R: BufRead>(source: R, corpus_len: u64, config: &ShardConfig) -> Result<(ShardSet, IngestReport)> {
    let mut set = ShardSet::for_corpus(corpus_len, config)?;
    let report = IngestPipeline::new(source).run(&mut set)?;
    Ok((set, report))
}

/// Like [`build`], sized from the file's length on disk.
pub fn build_from_path(path: impl AsRef<Path>, config: &ShardConfig) -> Result<(ShardSet, IngestReport)> {
    let open_err = |source| PwnError::SourceRead { line: 0, source };
    let f = File::open(path.as_ref()).map_err(open_err)?;
    let len = f.metadata().map_err(open_err)?.len();
    debug!(path = %path.as_ref().display(), bytes = len, "sizing from corpus");
    build(BufReader::new(f), len, config)
}
