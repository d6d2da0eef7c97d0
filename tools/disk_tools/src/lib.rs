//! Host side of the fatdisk tools: image file access, logging, and the text
//! formats shared by the `diskinfo`, `disklist`, `diskget` and `diskput`
//! binaries.

pub mod cli;
pub mod file_store;
pub mod logger;
pub mod report;

use std::path::Path;

use anyhow::Context;
use fatdisk::Volume;

pub use file_store::FileStore;

/// Open `image` read-only and load its superblock and FAT.
pub fn open_volume(image: &str) -> anyhow::Result<Volume<FileStore>> {
    let store = FileStore::open_read_only(Path::new(image))
        .with_context(|| format!("cannot open disk image {image}"))?;
    Ok(Volume::open(store)?)
}

/// Open `image` for writing and load its superblock and FAT.
pub fn open_volume_rw(image: &str) -> anyhow::Result<Volume<FileStore>> {
    let store = FileStore::open_read_write(Path::new(image))
        .with_context(|| format!("cannot open disk image {image}"))?;
    Ok(Volume::open(store)?)
}
