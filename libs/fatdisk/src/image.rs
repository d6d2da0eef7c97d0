//! Fixture images for tests.
//!
//! `ImageBuilder` lays out a fresh volume (superblock in block 0, FAT from
//! block 1, root right after the FAT) and populates it without going through
//! `Volume`, so engine tests never depend on the code they exercise.
//!
//! Builder methods panic on misuse; this is test support only.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use fatdisk_layout::fat::{FAT_EOC, FAT_FREE, FAT_RESERVED};
use fatdisk_layout::{DIR_ENTRY_SIZE, DirEntry, Filename, Superblock, Timestamp};

use crate::path::split_file_path;
use crate::store::MemStore;

/// Creation time stamped on every entry the builder writes.
pub const FIXTURE_TIME: Timestamp =
    Timestamp { year: 2024, month: 1, day: 15, hour: 10, minute: 30, second: 0 };

#[derive(Debug, Clone)]
struct DirInfo {
    blocks:    Vec<u32>,
    next_slot: u32,
}

#[derive(Debug, Clone)]
pub struct ImageBuilder {
    sb:    Superblock,
    image: Vec<u8>,
    fat:   Vec<u32>,
    dirs:  BTreeMap<String, DirInfo>,
    files: BTreeMap<String, u32>,
}

impl ImageBuilder {
    /// An empty volume. `block_count * 4` must be a multiple of `block_size`
    /// so that the FAT has exactly one entry per block.
    pub fn new(block_size: u16, block_count: u32, root_blocks: u32) -> Self {
        let bs = block_size as u32;
        assert!(block_count * 4 % bs == 0, "FAT must fill whole blocks");
        let fat_blocks = block_count * 4 / bs;
        let root_start = 1 + fat_blocks;
        let sb = Superblock {
            block_size,
            block_count,
            fat_start: 1,
            fat_blocks,
            root_start,
            root_blocks,
        };

        let mut fat = vec![FAT_FREE; block_count as usize];
        for entry in fat.iter_mut().take((root_start + root_blocks) as usize) {
            *entry = FAT_RESERVED;
        }

        let mut dirs = BTreeMap::new();
        dirs.insert(
            "/".to_string(),
            DirInfo { blocks: (root_start..root_start + root_blocks).collect(), next_slot: 0 },
        );

        Self {
            sb,
            image: vec![0u8; block_count as usize * bs as usize],
            fat,
            dirs,
            files: BTreeMap::new(),
        }
    }

    pub fn superblock(&self) -> &Superblock {
        &self.sb
    }

    pub fn dir(self, path: &str) -> Self {
        self.dir_blocks(path, 1)
    }

    /// A subdirectory whose chain is `blocks` long. Slot 0 of the first block
    /// holds ".".
    pub fn dir_blocks(mut self, path: &str, blocks: usize) -> Self {
        let (parent, name) = split_file_path(path);
        let chain = self.alloc(blocks);
        let start = chain[0];

        let dot = Self::stamped(DirEntry::new_directory(&Filename::truncated("."), start));
        self.write_slot(&chain, 0, &dot);
        self.dirs.insert(path.to_string(), DirInfo { blocks: chain.clone(), next_slot: 1 });

        let mut entry = DirEntry::new_directory(&Filename::truncated(name), start);
        entry.block_count = chain.len() as u32;
        self.entry(parent, entry)
    }

    /// A file holding `data`, in freshly allocated blocks.
    pub fn file(mut self, path: &str, data: &[u8]) -> Self {
        let (parent, name) = split_file_path(path);
        let bs = self.sb.block_size as usize;
        let chain = self.alloc(data.len().div_ceil(bs).max(1));

        for (chunk, &block) in data.chunks(bs).zip(&chain) {
            let off = self.sb.block_offset(block) as usize;
            self.image[off..off + chunk.len()].copy_from_slice(chunk);
        }
        self.files.insert(path.to_string(), chain[0]);

        let entry = DirEntry::new_file(
            &Filename::truncated(name),
            chain[0],
            chain.len() as u32,
            data.len() as u32,
        );
        self.entry(parent, entry)
    }

    /// Place `entry` in the next unused slot of `dir`, stamping its times.
    pub fn entry(mut self, dir: &str, entry: DirEntry) -> Self {
        let entry = Self::stamped(entry);
        let info = self.dirs.get(dir).unwrap_or_else(|| panic!("no directory {dir} in fixture"));
        let (chain, slot) = (info.blocks.clone(), info.next_slot);
        self.write_slot(&chain, slot, &entry);
        if let Some(info) = self.dirs.get_mut(dir) {
            info.next_slot += 1;
        }
        self
    }

    /// Overwrite one raw FAT word.
    pub fn set_fat(mut self, block: u32, raw: u32) -> Self {
        self.fat[block as usize] = raw;
        self
    }

    pub fn dir_start(&self, path: &str) -> u32 {
        self.dirs[path].blocks[0]
    }

    pub fn file_start(&self, path: &str) -> u32 {
        self.files[path]
    }

    pub fn build(self) -> MemStore {
        let mut image = self.image;
        image[..self.sb.encode().len()].copy_from_slice(&self.sb.encode());

        let fat_off = self.sb.block_offset(self.sb.fat_start) as usize;
        for (i, word) in self.fat.iter().enumerate() {
            let at = fat_off + i * 4;
            image[at..at + 4].copy_from_slice(&word.to_be_bytes());
        }
        MemStore(image)
    }

    fn stamped(mut entry: DirEntry) -> DirEntry {
        entry.created = FIXTURE_TIME;
        entry.modified = FIXTURE_TIME;
        entry
    }

    fn alloc(&mut self, count: usize) -> Vec<u32> {
        let chain: Vec<u32> = (2..self.fat.len() as u32)
            .filter(|&b| self.fat[b as usize] == FAT_FREE)
            .take(count)
            .collect();
        assert_eq!(chain.len(), count, "fixture image is out of blocks");
        for pair in chain.windows(2) {
            self.fat[pair[0] as usize] = pair[1];
        }
        self.fat[chain[count - 1] as usize] = FAT_EOC;
        chain
    }

    fn write_slot(&mut self, chain: &[u32], slot: u32, entry: &DirEntry) {
        let per_block = self.sb.slots_per_block();
        let block = *chain
            .get((slot / per_block) as usize)
            .unwrap_or_else(|| panic!("fixture directory is full"));
        let off = self.sb.block_offset(block) as usize + (slot % per_block) as usize * DIR_ENTRY_SIZE;
        self.image[off..off + DIR_ENTRY_SIZE].copy_from_slice(&entry.encode());
    }
}
