/// An opened image: store, superblock and in-memory FAT.
///
/// All four tools work through one `Volume`. Reads never touch the FAT on
/// disk. `put_file` mutates the in-memory table and writes it back once, as
/// its very last step.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use fatdisk_layout::dir_entry::NAME_MAX;
use fatdisk_layout::superblock::SUPERBLOCK_SIZE;
use fatdisk_layout::{DIR_ENTRY_SIZE, DirEntry, EntryKind, Filename, Superblock};

use crate::dir::{self, Region, Slots};
use crate::error::FsError;
use crate::fat::{FatTable, FatTally};
use crate::path;
use crate::store::{ByteStore, StoreError};

/// Superblock fields plus a single pass over the FAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeReport {
    pub superblock: Superblock,
    pub tally:      FatTally,
}

pub struct Volume<S> {
    store:      S,
    superblock: Superblock,
    fat:        FatTable,
}

impl<S: ByteStore> Volume<S> {
    /// Validate the superblock and load the FAT.
    pub fn open(mut store: S) -> Result<Self, FsError> {
        let mut raw = [0u8; SUPERBLOCK_SIZE];
        store.read_at(0, &mut raw).map_err(|e| match e {
            StoreError::Short { .. } => FsError::ShortRead("superblock"),
            other => other.into(),
        })?;
        let superblock = Superblock::decode(&raw)?;
        log::debug!(
            "volume: block size {}, {} blocks, FAT at {}+{}, root at {}+{}",
            superblock.block_size,
            superblock.block_count,
            superblock.fat_start,
            superblock.fat_blocks,
            superblock.root_start,
            superblock.root_blocks,
        );

        let fat = FatTable::load(&mut store, &superblock)?;
        Ok(Self { store, superblock, fat })
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn fat(&self) -> &FatTable {
        &self.fat
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn report(&self) -> VolumeReport {
        VolumeReport { superblock: self.superblock, tally: self.fat.tally() }
    }

    /// Every slot of `region`, used or not.
    pub fn slots(&mut self, region: Region) -> Slots<'_, S> {
        Slots::new(&mut self.store, &self.superblock, &self.fat, region)
    }

    pub fn resolve(&mut self, path: &str) -> Result<Region, FsError> {
        path::resolve(&mut self.store, &self.superblock, &self.fat, path)
    }

    /// Visible entries of the directory at `path`, in slot order.
    pub fn list(&mut self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let region = self.resolve(path)?;
        let mut out = Vec::new();
        for slot in self.slots(region) {
            let entry = slot?.entry;
            if entry.kind().is_some() {
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Write the in-memory FAT back to the image.
    pub fn flush(&mut self) -> Result<(), FsError> {
        self.fat.persist(&mut self.store, &self.superblock)
    }

    // ── directories ──────────────────────────────────────────────────────────

    /// Resolve `path`, creating it first when it names a single missing
    /// directory directly under the root. Deeper paths are never created.
    ///
    /// A newly created directory claims its block in the in-memory FAT only;
    /// it reaches the image on the next `flush`.
    pub fn ensure_dir(&mut self, path: &str) -> Result<Region, FsError> {
        if path::is_root(path) {
            return Ok(Region::Root);
        }
        let Some(name) = path::single_component(path)? else {
            return self.resolve(path);
        };
        match self.resolve(path) {
            Err(FsError::DirNotFound(_)) => {}
            found => return found,
        }
        if name.len() > NAME_MAX {
            return Err(FsError::NameTooLong(name.to_string()));
        }
        self.create_root_dir(name)?;
        self.resolve(path)
    }

    fn create_root_dir(&mut self, name: &str) -> Result<(), FsError> {
        let block = self.fat.allocate(1)?[0];

        let mut raw = vec![0u8; self.superblock.block_size as usize];
        let dot = DirEntry::new_directory(&Filename::truncated("."), block);
        raw[..DIR_ENTRY_SIZE].copy_from_slice(&dot.encode());
        self.store.write_at(self.superblock.block_offset(block), &raw)?;

        let slot = dir::first_free_slot(&mut self.store, &self.superblock, &self.fat, Region::Root)?
            .ok_or_else(|| FsError::DirectoryFull("/".to_string()))?;
        let entry = DirEntry::new_directory(&Filename::truncated(name), block);
        self.store.write_at(slot, &entry.encode())?;

        log::debug!("volume: created directory /{name} at block {block}");
        Ok(())
    }

    /// True when `put_file` into `dir_path` would have to create it.
    fn needs_new_dir(&mut self, dir_path: &str) -> Result<bool, FsError> {
        if path::is_root(dir_path) {
            return Ok(false);
        }
        let Some(name) = path::single_component(dir_path)? else {
            return Ok(false);
        };
        let found = dir::find(
            &mut self.store,
            &self.superblock,
            &self.fat,
            Region::Root,
            name,
            EntryKind::Directory,
        )?;
        Ok(found.is_none())
    }

    // ── files ────────────────────────────────────────────────────────────────

    /// Locate the file at `path`. An unresolvable directory reports the same
    /// error as a missing file.
    pub fn find_file(&mut self, path: &str) -> Result<DirEntry, FsError> {
        let (dir_path, name) = path::split_file_path(path);
        let not_found = || FsError::FileNotFound { name: name.to_string(), dir: dir_path.to_string() };

        let region = match self.resolve(dir_path) {
            Ok(region) => region,
            Err(FsError::DirNotFound(_) | FsError::InvalidPath(_)) => return Err(not_found()),
            Err(e) => return Err(e),
        };
        dir::find(&mut self.store, &self.superblock, &self.fat, region, name, EntryKind::File)?
            .ok_or_else(not_found)
    }

    /// Stream the contents of `entry` into `sink`, one block at a time.
    ///
    /// Returns the number of bytes delivered. A chain that ends before
    /// `file_size` bytes is tolerated and yields a short copy.
    pub fn read_file<E, F>(&mut self, entry: &DirEntry, mut sink: F) -> Result<u64, E>
    where
        E: From<FsError>,
        F: FnMut(&[u8]) -> Result<(), E>,
    {
        let size = entry.file_size as u64;
        if size == 0 {
            return Ok(0);
        }

        let block_size = self.superblock.block_size as usize;
        let mut buf = vec![0u8; block_size];
        let mut remaining = size;
        for block in self.fat.chain(entry.start_block) {
            let block = block?;
            let n = remaining.min(block_size as u64) as usize;
            self.store
                .read_at(self.superblock.block_offset(block), &mut buf[..n])
                .map_err(FsError::from)?;
            sink(&buf[..n])?;
            log::trace!("volume: copied {n} bytes from block {block}");

            remaining -= n as u64;
            if remaining == 0 {
                break;
            }
        }

        if remaining > 0 {
            log::warn!(
                "chain of '{}' ended {remaining} bytes short of its recorded size",
                String::from_utf8_lossy(entry.name_bytes())
            );
        }
        Ok(size - remaining)
    }

    /// `find_file` followed by `read_file`.
    pub fn get_file<E, F>(&mut self, path: &str, sink: F) -> Result<u64, E>
    where
        E: From<FsError>,
        F: FnMut(&[u8]) -> Result<(), E>,
    {
        let entry = self.find_file(path)?;
        self.read_file(&entry, sink)
    }

    /// Store `data` as the file at `path` and write the FAT back.
    ///
    /// Free space is checked up front, counting the block a missing parent
    /// directory would need, so a shortage leaves the image untouched. So is a
    /// missing parent whose block could not hold an entry besides ".". Later
    /// failures can orphan data blocks but never persist the FAT.
    pub fn put_file(&mut self, path: &str, data: &[u8]) -> Result<DirEntry, FsError> {
        let size = u32::try_from(data.len()).map_err(|_| FsError::FileTooLarge(data.len() as u64))?;

        let (dir_path, raw_name) = path::split_file_path(path);
        if raw_name.is_empty() {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        let name = Filename::truncated(raw_name);
        if name.as_str().len() < raw_name.len() {
            log::warn!("file name '{raw_name}' truncated to '{name}'");
        }

        let block_size = self.superblock.block_size as usize;
        let blocks_needed = data.len().div_ceil(block_size).max(1);
        let creates_dir = self.needs_new_dir(dir_path)?;
        // A one-slot directory block holds only "." and could never take the file
        if creates_dir && self.superblock.slots_per_block() < 2 {
            return Err(FsError::DirectoryFull(dir_path.to_string()));
        }
        let needed = blocks_needed + usize::from(creates_dir);
        let free = self.fat.allocatable();
        if free < needed {
            return Err(FsError::NoSpace { needed, free });
        }

        let region = self.ensure_dir(dir_path)?;
        let blocks = self.fat.allocate(blocks_needed)?;

        let mut buf = vec![0u8; block_size];
        for (i, &block) in blocks.iter().enumerate() {
            let start = i * block_size;
            let end = data.len().min(start + block_size);
            buf.fill(0);
            buf[..end - start].copy_from_slice(&data[start..end]);
            self.store.write_at(self.superblock.block_offset(block), &buf)?;
        }

        let entry = DirEntry::new_file(&name, blocks[0], blocks.len() as u32, size);
        let slot = dir::first_free_slot(&mut self.store, &self.superblock, &self.fat, region)?
            .ok_or_else(|| {
                let label = if path::is_root(dir_path) { "/" } else { dir_path };
                FsError::DirectoryFull(label.to_string())
            })?;
        self.store.write_at(slot, &entry.encode())?;

        self.flush()?;
        log::debug!("volume: stored {path} ({size} bytes in {} block(s))", blocks.len());
        Ok(entry)
    }
}

// ─── Unit tests ────────────────────────────────────────────────────────────────
