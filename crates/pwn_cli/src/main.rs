use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pwn_core::{
    build_from_path,
    consts::{DEFAULT_FILL_DIVISOR, DEFAULT_SHARD_BITS, KEY_LEN},
    extract_key, query_key, snapshot, Key, ShardConfig, ShardSet,
};

#[derive(Parser)]
#[command(name = "pwn", about = "PWN-Filter CLI: sharded Bloom filters over breached hash prefixes")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Ingest a corpus and write a filter snapshot
    Build {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Bits per shard (multiple of 8)
        #[arg(long, default_value_t = DEFAULT_SHARD_BITS)]
        shard_bits: u64,
        /// A shard rotates after shard_bits / fill_divisor insertions
        #[arg(long, default_value_t = DEFAULT_FILL_DIVISOR)]
        fill_divisor: u64,
        /// Print the ingest summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Look up one or more hashes (only the first 10 hex characters are used)
    Check {
        #[arg(long)]
        filters: PathBuf,
        #[arg(long = "hash", value_name = "HEX", num_args = 1.., value_delimiter = ',')]
        hashes: Vec<String>,
    },

    /// Per-shard statistics of a snapshot
    Info {
        #[arg(long)]
        filters: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Re-read a corpus and confirm every key is reported present
    Verify {
        #[arg(long)]
        filters: PathBuf,
        #[arg(long)]
        corpus: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_filters(path: &Path) -> Result<ShardSet> {
    snapshot::load(path).with_context(|| format!("loading filters from {}", path.display()))
}

/// Folded key for a user-supplied hash; the first KEY_LEN characters must be hex.
fn parse_hash(hash: &str) -> Result<Key> {
    if hash.trim().len() < KEY_LEN {
        bail!("hash {hash:?} is shorter than {KEY_LEN} characters");
    }
    query_key(hash).ok_or_else(|| anyhow!("hash {hash:?} is not hex"))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build { corpus, out, shard_bits, fill_divisor, json } => {
            let cfg = ShardConfig { shard_bits, fill_divisor };
            let (set, report) = build_from_path(&corpus, &cfg)
                .with_context(|| format!("building filters from {}", corpus.display()))?;
            snapshot::save(&set, &out)
                .with_context(|| format!("writing filters to {}", out.display()))?;
            info!(path = %out.display(), shards = set.len(), "snapshot written");
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("build: wrote {}", out.display());
                println!(
                    "       shards={} lines={} inserted={} malformed={} rotations={}",
                    report.shard_count, report.lines_read, report.inserted, report.malformed, report.rotations
                );
            }
        }
        Cmd::Check { filters, hashes } => {
            let set = load_filters(&filters)?;
            for h in &hashes {
                let key = parse_hash(h)?;
                let verdict = if set.contains(&key) { "possibly-pwned" } else { "not-found" };
                println!("{}\t{}", String::from_utf8_lossy(&key), verdict);
            }
        }
        Cmd::Info { filters, json } => {
            let set = load_filters(&filters)?;
            let stats = set.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }
            println!("shards   : {}", set.len());
            println!("active   : {}", set.active_index());
            println!("inserted : {}", set.total_inserted());
            for (i, s) in stats.iter().enumerate() {
                let mark = if i == set.active_index() { '*' } else { ' ' };
                println!(
                    "{} #{:<4} bits={} inserted={} set={} fill≈{:.3} fpp≈{:.2e}{}",
                    mark,
                    i,
                    s.capacity_bits,
                    s.inserted,
                    s.bits_set,
                    s.bits_set as f64 / s.capacity_bits as f64,
                    s.estimated_fpp,
                    if s.full { "  [full]" } else { "" }
                );
            }
        }
        Cmd::Verify { filters, corpus } => {
            let set = load_filters(&filters)?;
            let f = File::open(&corpus).with_context(|| format!("opening {}", corpus.display()))?;
            let mut rdr = BufReader::new(f);
            let mut line = Vec::new();
            let (mut checked, mut skipped, mut missing) = (0u64, 0u64, 0u64);
            loop {
                line.clear();
                if rdr.read_until(b'\n', &mut line).context("reading corpus")? == 0 {
                    break;
                }
                match extract_key(&line) {
                    Some(key) => {
                        checked += 1;
                        if !set.contains(&key) {
                            missing += 1;
                            warn!(key = %String::from_utf8_lossy(&key), "corpus key not reported present");
                        }
                    }
                    None => skipped += 1,
                }
            }
            info!(checked, skipped, missing, "verify finished");
            println!("verify: checked={checked} skipped={skipped} missing={missing}");
            if missing > 0 {
                bail!("{missing} corpus keys are not reported present");
            }
        }
    }
    Ok(())
}
