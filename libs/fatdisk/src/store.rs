/// Byte-addressed access to the disk image.
///
/// The engine never opens files itself; everything goes through `ByteStore`,
/// so the whole crate runs against `MemStore` in tests.

use alloc::vec::Vec;
use core::fmt;

// ─── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Seek,
    Read,
    Write,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOp::Seek  => "seek",
            StoreOp::Read  => "read",
            StoreOp::Write => "write",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{op} of {len} bytes at offset {offset} failed")]
    Io { op: StoreOp, offset: u64, len: usize },
    /// The request ran past the end of the image.
    #[error("short {op}: {len} bytes at offset {offset} run past the end of the image")]
    Short { op: StoreOp, offset: u64, len: usize },
}

// ─── Store abstraction ─────────────────────────────────────────────────────────

pub trait ByteStore {
    /// Fill all of `buf` from `offset`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), StoreError>;
    /// Write all of `data` at `offset`.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), StoreError>;
}

impl<S: ByteStore + ?Sized> ByteStore for &mut S {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), StoreError> {
        (**self).read_at(offset, buf)
    }
    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), StoreError> {
        (**self).write_at(offset, data)
    }
}

/// A whole image held in memory. Never grows: writes past the end fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore(pub Vec<u8>);

impl MemStore {
    fn span(&self, op: StoreOp, offset: u64, len: usize) -> Result<core::ops::Range<usize>, StoreError> {
        let short = StoreError::Short { op, offset, len };
        let start = usize::try_from(offset).map_err(|_| short)?;
        let end = start.checked_add(len).ok_or(short)?;
        if end > self.0.len() {
            return Err(short);
        }
        Ok(start..end)
    }
}

impl ByteStore for MemStore {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), StoreError> {
        let span = self.span(StoreOp::Read, offset, buf.len())?;
        buf.copy_from_slice(&self.0[span]);
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), StoreError> {
        let span = self.span(StoreOp::Write, offset, data.len())?;
        self.0[span].copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_in_bounds() {
        let mut store = MemStore(vec![0u8; 16]);
        store.write_at(4, b"abcd").unwrap();
        let mut buf = [0u8; 6];
        store.read_at(3, &mut buf).unwrap();
        assert_eq!(&buf, b"\0abcd\0");
    }

    #[test]
    fn past_the_end_is_short() {
        let mut store = MemStore(vec![0u8; 16]);
        let mut buf = [0u8; 8];
        assert_eq!(
            store.read_at(12, &mut buf),
            Err(StoreError::Short { op: StoreOp::Read, offset: 12, len: 8 })
        );
        assert!(matches!(store.write_at(16, b"x"), Err(StoreError::Short { op: StoreOp::Write, .. })));
        assert_eq!(store.0, vec![0u8; 16]);
    }

    #[test]
    fn offset_overflow_is_short() {
        let mut store = MemStore(vec![0u8; 16]);
        assert!(store.write_at(u64::MAX, b"x").is_err());
    }
}
