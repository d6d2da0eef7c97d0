use alloc::string::String;

use fatdisk_layout::LayoutError;
use fatdisk_layout::fat::FatEntry;

use crate::store::StoreError;

/// Everything an operation on a volume can fail with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    // ── format ───────────────────────────────────────────────────────────────
    #[error(transparent)]
    Format(#[from] LayoutError),
    #[error("could not read {0}: image is too short")]
    ShortRead(&'static str),

    // ── I/O ──────────────────────────────────────────────────────────────────
    #[error(transparent)]
    Store(#[from] StoreError),

    // ── chains ───────────────────────────────────────────────────────────────
    #[error("FAT index out of range ({0})")]
    FatIndexOutOfRange(u32),
    #[error("broken chain: block {block} is linked from the chain but its FAT entry is {entry:?}")]
    BrokenChain { block: u32, entry: FatEntry },
    #[error("chain starting at block {0} does not terminate")]
    ChainCycle(u32),

    // ── paths and entries ────────────────────────────────────────────────────
    #[error("path '{0}' must start with '/'")]
    InvalidPath(String),
    #[error("directory path '{0}' not found")]
    DirNotFound(String),
    #[error("Requested file {name} not found in {dir}.")]
    FileNotFound { name: String, dir: String },
    #[error("directory name '{0}' is longer than 30 bytes")]
    NameTooLong(String),
    #[error("no free directory entry in {0}")]
    DirectoryFull(String),

    // ── space ────────────────────────────────────────────────────────────────
    #[error("not enough space on disk image: {needed} blocks needed, {free} allocatable (blocks 0 and 1 are never used)")]
    NoSpace { needed: usize, free: usize },
    #[error("file of {0} bytes does not fit a 32-bit size field")]
    FileTooLarge(u64),
}
