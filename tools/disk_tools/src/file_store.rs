//! `ByteStore` over a host image file.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use fatdisk::{ByteStore, StoreError, StoreOp};

pub struct FileStore {
    file: File,
}

impl FileStore {
    pub fn open_read_only(path: &Path) -> io::Result<Self> {
        Ok(Self { file: File::open(path)? })
    }

    pub fn open_read_write(path: &Path) -> io::Result<Self> {
        Ok(Self { file: OpenOptions::new().read(true).write(true).open(path)? })
    }

    fn seek(&mut self, offset: u64, len: usize) -> Result<(), StoreError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map(drop)
            .map_err(|e| io_error(e, StoreOp::Seek, offset, len))
    }
}

fn io_error(err: io::Error, op: StoreOp, offset: u64, len: usize) -> StoreError {
    match err.kind() {
        ErrorKind::UnexpectedEof | ErrorKind::WriteZero => StoreError::Short { op, offset, len },
        _ => {
            log::debug!("{op} at {offset}: {err}");
            StoreError::Io { op, offset, len }
        }
    }
}

impl ByteStore for FileStore {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), StoreError> {
        self.seek(offset, buf.len())?;
        self.file
            .read_exact(buf)
            .map_err(|e| io_error(e, StoreOp::Read, offset, buf.len()))
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), StoreError> {
        self.seek(offset, data.len())?;
        self.file
            .write_all(data)
            .map_err(|e| io_error(e, StoreOp::Write, offset, data.len()))
    }
}
