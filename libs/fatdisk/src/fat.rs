/// In-memory file allocation table.
///
/// Loaded wholesale when a volume is opened and written back wholesale by
/// `persist`. Nothing in between touches the on-disk copy, so every chain
/// mutation stays private to this process until the final flush.

use alloc::vec;
use alloc::vec::Vec;

use fatdisk_layout::Superblock;
use fatdisk_layout::fat::{FAT_EOC, FAT_FREE, FatEntry};

use crate::error::FsError;
use crate::store::{ByteStore, StoreError};

/// Indices 0 and 1 collide with the free/reserved encodings and can never
/// appear as a link, so the allocator skips them.
const FIRST_LINKABLE: usize = 2;

// ─── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatTable {
    entries: Vec<u32>,
}

/// Per-state block counts from one pass over the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FatTally {
    pub free:      u32,
    pub reserved:  u32,
    pub allocated: u32,
}

impl FatTally {
    pub fn total(&self) -> u64 {
        self.free as u64 + self.reserved as u64 + self.allocated as u64
    }
}

// ─── Implementation ────────────────────────────────────────────────────────────

impl FatTable {
    pub fn from_entries(entries: Vec<u32>) -> Self {
        Self { entries }
    }

    /// Read `fat_entries` big-endian words starting at the FAT's first block.
    pub fn load<S: ByteStore>(store: &mut S, sb: &Superblock) -> Result<Self, FsError> {
        let count = sb.fat_entries();
        let mut raw = vec![0u8; count * 4];
        store
            .read_at(sb.block_offset(sb.fat_start), &mut raw)
            .map_err(|e| match e {
                StoreError::Short { .. } => FsError::ShortRead("FAT"),
                other => other.into(),
            })?;

        let entries = raw
            .chunks_exact(4)
            .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
            .collect();
        log::debug!("fat: loaded {count} entries from block {}", sb.fat_start);
        Ok(Self { entries })
    }

    /// Write the whole table back in one request.
    pub fn persist<S: ByteStore>(&self, store: &mut S, sb: &Superblock) -> Result<(), FsError> {
        let raw: Vec<u8> = self.entries.iter().flat_map(|e| e.to_be_bytes()).collect();
        store.write_at(sb.block_offset(sb.fat_start), &raw)?;
        log::debug!("fat: persisted {} entries", self.entries.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn raw(&self) -> &[u32] {
        &self.entries
    }

    /// Decoded entry for `block`, range-checked.
    pub fn get(&self, block: u32) -> Result<FatEntry, FsError> {
        self.entries
            .get(block as usize)
            .map(|&raw| FatEntry::from_raw(raw))
            .ok_or(FsError::FatIndexOutOfRange(block))
    }

    /// Walk the chain that starts at `start`.
    pub fn chain(&self, start: u32) -> Chain<'_> {
        Chain { fat: self, start, state: ChainState::At(start), hops: 0 }
    }

    pub fn tally(&self) -> FatTally {
        let mut tally = FatTally::default();
        for &raw in &self.entries {
            match FatEntry::from_raw(raw) {
                FatEntry::Free     => tally.free += 1,
                FatEntry::Reserved => tally.reserved += 1,
                _                  => tally.allocated += 1,
            }
        }
        tally
    }

    /// Free blocks the allocator is able to hand out.
    pub fn allocatable(&self) -> usize {
        self.free_indices().count()
    }

    /// Take the first `count` free blocks in ascending order and link them
    /// into one chain ending in `FAT_EOC`.
    ///
    /// On shortage the table is left untouched.
    pub fn allocate(&mut self, count: usize) -> Result<Vec<u32>, FsError> {
        let blocks: Vec<u32> = self.free_indices().take(count).collect();
        if blocks.len() < count {
            return Err(FsError::NoSpace { needed: count, free: blocks.len() });
        }

        for pair in blocks.windows(2) {
            self.entries[pair[0] as usize] = pair[1];
        }
        if let Some(&last) = blocks.last() {
            self.entries[last as usize] = FAT_EOC;
        }
        log::debug!("fat: allocated {count} block(s) starting at {:?}", blocks.first());
        Ok(blocks)
    }

    fn free_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries
            .iter()
            .enumerate()
            .skip(FIRST_LINKABLE)
            .filter(|&(_, &raw)| raw == FAT_FREE)
            .map(|(i, _)| i as u32)
    }
}

// ─── Chain walk ────────────────────────────────────────────────────────────────

enum ChainState {
    At(u32),
    Broken(FsError),
    Done,
}

/// Blocks of one chain in order.
///
/// Each yielded block has been range-checked. The walk ends at `FAT_EOC`,
/// fails on a link into a free/reserved entry, and fails once it has made
/// more hops than the table has entries.
pub struct Chain<'a> {
    fat:   &'a FatTable,
    start: u32,
    state: ChainState,
    hops:  usize,
}

impl Iterator for Chain<'_> {
    type Item = Result<u32, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = match core::mem::replace(&mut self.state, ChainState::Done) {
            ChainState::Done      => return None,
            ChainState::Broken(e) => return Some(Err(e)),
            ChainState::At(block) => block,
        };

        let entry = match self.fat.get(block) {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };

        if self.hops >= self.fat.len() {
            return Some(Err(FsError::ChainCycle(self.start)));
        }
        self.hops += 1;

        self.state = match entry {
            FatEntry::EndOfChain => ChainState::Done,
            FatEntry::Next(next) => ChainState::At(next),
            FatEntry::Free | FatEntry::Reserved => ChainState::Broken(FsError::BrokenChain { block, entry }),
        };
        log::trace!("chain {}: block {block}", self.start);
        Some(Ok(block))
    }
}

// ─── Unit tests ────────────────────────────────────────────────────────────────
