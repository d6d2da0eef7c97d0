/// Volume header stored at byte 0 of the image.
///
/// Every multi-byte field is big-endian on disk. `decode` converts once;
/// nothing downstream ever looks at the raw bytes again.

use crate::{DIR_ENTRY_SIZE, LayoutError};

// ─── Layout ────────────────────────────────────────────────────────────────────

pub const MAGIC: [u8; 8] = *b"CSC360FS";

/// Encoded size of the superblock.
pub const SUPERBLOCK_SIZE: usize = 30;

const OFF_MAGIC:       usize = 0;
const OFF_BLOCK_SIZE:  usize = 8;
const OFF_BLOCK_COUNT: usize = 10;
const OFF_FAT_START:   usize = 14;
const OFF_FAT_BLOCKS:  usize = 18;
const OFF_ROOT_START:  usize = 22;
const OFF_ROOT_BLOCKS: usize = 26;

// ─── Superblock ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    pub block_size:  u16,
    pub block_count: u32,
    pub fat_start:   u32,
    pub fat_blocks:  u32,
    pub root_start:  u32,
    pub root_blocks: u32,
}

impl Superblock {
    /// Parse a header. The magic is checked before any other field is read.
    pub fn decode(raw: &[u8]) -> Result<Self, LayoutError> {
        if raw.len() < SUPERBLOCK_SIZE {
            return Err(LayoutError::Truncated {
                what: "superblock", expected: SUPERBLOCK_SIZE, got: raw.len(),
            });
        }
        if raw[OFF_MAGIC..OFF_MAGIC + 8] != MAGIC {
            return Err(LayoutError::BadMagic);
        }

        let block_size = u16::from_be_bytes([raw[OFF_BLOCK_SIZE], raw[OFF_BLOCK_SIZE + 1]]);
        if (block_size as usize) < DIR_ENTRY_SIZE {
            return Err(LayoutError::BadBlockSize(block_size));
        }

        Ok(Self {
            block_size,
            block_count: be_u32(raw, OFF_BLOCK_COUNT),
            fat_start:   be_u32(raw, OFF_FAT_START),
            fat_blocks:  be_u32(raw, OFF_FAT_BLOCKS),
            root_start:  be_u32(raw, OFF_ROOT_START),
            root_blocks: be_u32(raw, OFF_ROOT_BLOCKS),
        })
    }

    pub fn encode(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut raw = [0u8; SUPERBLOCK_SIZE];
        raw[OFF_MAGIC..OFF_MAGIC + 8].copy_from_slice(&MAGIC);
        raw[OFF_BLOCK_SIZE..OFF_BLOCK_SIZE + 2].copy_from_slice(&self.block_size.to_be_bytes());
        put_be_u32(&mut raw, OFF_BLOCK_COUNT, self.block_count);
        put_be_u32(&mut raw, OFF_FAT_START,   self.fat_start);
        put_be_u32(&mut raw, OFF_FAT_BLOCKS,  self.fat_blocks);
        put_be_u32(&mut raw, OFF_ROOT_START,  self.root_start);
        put_be_u32(&mut raw, OFF_ROOT_BLOCKS, self.root_blocks);
        raw
    }

    /// Number of 32-bit entries in the FAT.
    pub fn fat_entries(&self) -> usize {
        (self.fat_blocks as u64 * self.block_size as u64 / 4) as usize
    }

    /// Number of entry slots in the fixed root region.
    pub fn root_slots(&self) -> u32 {
        (self.root_blocks as u64 * self.block_size as u64 / DIR_ENTRY_SIZE as u64) as u32
    }

    /// Number of entry slots in one subdirectory block.
    pub fn slots_per_block(&self) -> u32 {
        self.block_size as u32 / DIR_ENTRY_SIZE as u32
    }

    /// Byte offset of `block` within the image.
    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size as u64
    }
}

// ─── Helpers ───────────────────────────────────────────────────────────────────

pub(crate) fn be_u32(raw: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([raw[off], raw[off + 1], raw[off + 2], raw[off + 3]])
}

pub(crate) fn put_be_u32(raw: &mut [u8], off: usize, value: u32) {
    raw[off..off + 4].copy_from_slice(&value.to_be_bytes());
}

// ─── Unit tests ────────────────────────────────────────────────────────────────
