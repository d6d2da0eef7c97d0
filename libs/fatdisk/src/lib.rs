// No_std when not testing; the engine only needs `alloc`.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod dir;
pub mod error;
pub mod fat;
pub mod path;
pub mod store;
pub mod volume;

#[cfg(any(test, feature = "test_util"))]
pub mod image;

pub use dir::Region;
pub use error::FsError;
pub use fat::{FatTable, FatTally};
pub use store::{ByteStore, MemStore, StoreError, StoreOp};
pub use volume::{Volume, VolumeReport};
