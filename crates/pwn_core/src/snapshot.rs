//! Snapshot file format & IO for a built shard set.
//!
//! Header (LE, 24 bytes):
//!   magic[4]        = "PWNF"
//!   version[2]      = 1
//!   rsv[2]          = 0
//!   shard_count[4]
//!   active_index[4]
//!   fill_divisor[8]
//!
//! Then, per shard in order:
//!   capacity_bits[8]  inserted_count[8]  byte_len[8]
//!   bytes[byte_len]   crc32(bytes)[4]
//!
//! Shard order and the cursor are kept so a reloaded set answers and keeps
//! filling exactly like the one that was saved.

use crate::bitfield::BitField;
use crate::consts::{HDR_SIZE, MAGIC_SNAP, SHARD_HDR_SIZE, VERSION};
use crate::errors::{PwnError, Result};
use crate::shard::FilterShard;
use crate::shard_set::ShardSet;
use crate::utils::{crc32, read_u16, read_u32, read_u64, write_u16, write_u32, write_u64};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
fn fsync_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let f = std::fs::OpenOptions::new().read(true).custom_flags(libc::O_DIRECTORY).open(dir)?;
    f.sync_all()
}
#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> std::io::Result<()> { Ok(()) }

/// Serialize `set` into `w`.
pub fn write_to<W: Write>(set: &ShardSet, w: &mut W) -> Result<()> {
    let shards = set.shards();
    // every shard in a set shares one divisor
    let fill_divisor = shards[0].fill_divisor();
    w.write_all(MAGIC_SNAP)?;
    write_u16(w, VERSION)?;
    write_u16(w, 0)?;
    write_u32(w, u32::try_from(shards.len()).map_err(|_| PwnError::Corrupt)?)?;
    write_u32(w, u32::try_from(set.active_index()).map_err(|_| PwnError::Corrupt)?)?;
    write_u64(w, fill_divisor)?;
    for s in shards {
        let bytes = s.bits().as_bytes();
        write_u64(w, s.capacity_bits())?;
        write_u64(w, s.inserted_count())?;
        write_u64(w, bytes.len() as u64)?;
        w.write_all(bytes)?;
        write_u32(w, crc32(bytes))?;
    }
    Ok(())
}

/// Write `set` next to `path` and atomically rename it into place.
pub fn save(set: &ShardSet, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path_final = path.as_ref().to_path_buf();
    let dir = match path_final.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new().prefix("pwn_snap_").tempfile_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        write_to(set, &mut w)?;
        w.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(&path_final)?;
    let _ = fsync_dir(&path_final);
    debug!(path = %path_final.display(), shards = set.len(), "snapshot written");
    Ok(path_final)
}

/// Decode a snapshot held in memory.
pub fn read_from(buf: &[u8]) -> Result<ShardSet> {
    if buf.len() < HDR_SIZE || &buf[0..4] != MAGIC_SNAP { return Err(PwnError::BadHeader); }
    let mut c = Cursor::new(&buf[4..HDR_SIZE]);
    let ver = read_u16(&mut c)?;
    if ver != VERSION { return Err(PwnError::Unsupported(ver)); }
    let _rsv = read_u16(&mut c)?;
    let shard_count = read_u32(&mut c)? as usize;
    let active_index = read_u32(&mut c)? as usize;
    let fill_divisor = read_u64(&mut c)?;

    let mut pos = HDR_SIZE;
    let mut shards = Vec::new();
    for _ in 0..shard_count {
        let hdr = buf.get(pos..pos + SHARD_HDR_SIZE).ok_or(PwnError::Corrupt)?;
        let mut c = Cursor::new(hdr);
        let capacity_bits = read_u64(&mut c)?;
        let inserted_count = read_u64(&mut c)?;
        let byte_len = usize::try_from(read_u64(&mut c)?).map_err(|_| PwnError::Corrupt)?;
        pos += SHARD_HDR_SIZE;

        let end = pos.checked_add(byte_len).ok_or(PwnError::Corrupt)?;
        let bytes = buf.get(pos..end).ok_or(PwnError::Corrupt)?;
        let want = buf.get(end..end + 4).ok_or(PwnError::Corrupt)?;
        if crc32(bytes) != u32::from_le_bytes([want[0], want[1], want[2], want[3]]) {
            return Err(PwnError::Corrupt);
        }
        pos = end + 4;

        let bits = BitField::from_bytes(capacity_bits, bytes.to_vec())?;
        shards.push(FilterShard::from_parts(bits, inserted_count, fill_divisor)?);
    }
    if pos != buf.len() { return Err(PwnError::Corrupt); }
    ShardSet::from_parts(shards, active_index)
}

/// Map a snapshot file and decode it.
pub fn load(path: impl AsRef<Path>) -> Result<ShardSet> {
    let f = File::open(path.as_ref())?;
    let mmap = unsafe { Mmap::map(&f)? };
    let set = read_from(&mmap)?;
    debug!(path = %path.as_ref().display(), shards = set.len(), "snapshot loaded");
    Ok(set)
}
