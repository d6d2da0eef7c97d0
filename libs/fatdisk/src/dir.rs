/// Directory regions and slot enumeration.
///
/// The root directory is a fixed run of blocks described by the superblock.
/// Every other directory is a FAT chain of blocks, each holding
/// `block_size / 64` slots. Both are walked slot by slot in on-disk order.

use fatdisk_layout::{DIR_ENTRY_SIZE, DirEntry, EntryKind, Superblock};

use crate::error::FsError;
use crate::fat::{Chain, FatTable};
use crate::store::ByteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Root,
    /// A subdirectory, by the first block of its chain.
    Subdir(u32),
}

/// One directory slot and where it lives in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub offset: u64,
    pub entry:  DirEntry,
}

// ─── Slot iterator ─────────────────────────────────────────────────────────────

enum Cursor<'a> {
    Root { index: u32 },
    Chain { chain: Chain<'a>, current: Option<(u32, u32)> },
}

/// Every slot of a region, used or not.
///
/// Stops after the first error.
pub struct Slots<'a, S> {
    store:  &'a mut S,
    sb:     &'a Superblock,
    cursor: Cursor<'a>,
    done:   bool,
}

impl<'a, S: ByteStore> Slots<'a, S> {
    pub fn new(store: &'a mut S, sb: &'a Superblock, fat: &'a FatTable, region: Region) -> Self {
        let cursor = match region {
            Region::Root          => Cursor::Root { index: 0 },
            Region::Subdir(start) => Cursor::Chain { chain: fat.chain(start), current: None },
        };
        Self { store, sb, cursor, done: false }
    }

    fn next_offset(&mut self) -> Option<Result<u64, FsError>> {
        let slot_size = DIR_ENTRY_SIZE as u64;
        match &mut self.cursor {
            Cursor::Root { index } => {
                if *index >= self.sb.root_slots() {
                    return None;
                }
                let offset = self.sb.block_offset(self.sb.root_start) + *index as u64 * slot_size;
                *index += 1;
                Some(Ok(offset))
            }
            Cursor::Chain { chain, current } => {
                let (block, index) = match *current {
                    Some((block, index)) if index < self.sb.slots_per_block() => (block, index),
                    _ => match chain.next()? {
                        Ok(block) => (block, 0),
                        Err(e) => return Some(Err(e)),
                    },
                };
                *current = Some((block, index + 1));
                Some(Ok(self.sb.block_offset(block) + index as u64 * slot_size))
            }
        }
    }
}

impl<S: ByteStore> Iterator for Slots<'_, S> {
    type Item = Result<Slot, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.next_offset()? {
            Ok(offset) => {
                let mut raw = [0u8; DIR_ENTRY_SIZE];
                self.store
                    .read_at(offset, &mut raw)
                    .map_err(FsError::from)
                    .and_then(|()| DirEntry::decode(&raw).map_err(FsError::from))
                    .map(|entry| Slot { offset, entry })
            }
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

// ─── Lookups ───────────────────────────────────────────────────────────────────

/// First in-use entry of `kind` whose name matches `name`.
pub fn find<S: ByteStore>(
    store: &mut S,
    sb: &Superblock,
    fat: &FatTable,
    region: Region,
    name: &str,
    kind: EntryKind,
) -> Result<Option<DirEntry>, FsError> {
    for slot in Slots::new(store, sb, fat, region) {
        let entry = slot?.entry;
        if entry.kind() == Some(kind) && entry.matches_name(name) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Offset of the first slot whose in-use bit is clear.
pub fn first_free_slot<S: ByteStore>(
    store: &mut S,
    sb: &Superblock,
    fat: &FatTable,
    region: Region,
) -> Result<Option<u64>, FsError> {
    for slot in Slots::new(store, sb, fat, region) {
        let slot = slot?;
        if !slot.entry.is_in_use() {
            return Ok(Some(slot.offset));
        }
    }
    Ok(None)
}

// ─── Unit tests ────────────────────────────────────────────────────────────────
