#![no_std]

#[cfg(test)]
extern crate std;

pub mod dir_entry;
pub mod fat;
pub mod superblock;

pub use dir_entry::{DirEntry, EntryKind, EntryStatus, Filename, Timestamp};
pub use superblock::Superblock;

/// Size of one directory entry slot on disk.
pub const DIR_ENTRY_SIZE: usize = 64;

/// Errors raised while decoding fixed-layout records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("not a CSC360FS file system")]
    BadMagic,
    #[error("block size {0} is smaller than one directory entry")]
    BadBlockSize(u16),
    #[error("could not read {what}: {got} of {expected} bytes available")]
    Truncated {
        what:     &'static str,
        expected: usize,
        got:      usize,
    },
}
