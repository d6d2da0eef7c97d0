/// 64-byte directory entry record.
///
/// ```text
///  0      status         u8
///  1..5   starting block u32 BE
///  5..9   block count    u32 BE
///  9..13  file size      u32 BE
/// 13..20  create time    7 bytes
/// 20..27  modify time    7 bytes
/// 27..58  filename       31 bytes, NUL padded
/// 58..64  reserved       0xFF
/// ```

use core::fmt;

use bitflags::bitflags;

use crate::superblock::{be_u32, put_be_u32};
use crate::{DIR_ENTRY_SIZE, LayoutError};

// ─── Layout ────────────────────────────────────────────────────────────────────

/// Width of the on-disk filename field.
pub const NAME_FIELD_LEN: usize = 31;
/// Longest name written into a new entry; the last byte stays NUL.
pub const NAME_MAX: usize = NAME_FIELD_LEN - 1;

const OFF_STATUS:   usize = 0;
const OFF_START:    usize = 1;
const OFF_BLOCKS:   usize = 5;
const OFF_SIZE:     usize = 9;
const OFF_CREATED:  usize = 13;
const OFF_MODIFIED: usize = 20;
const OFF_NAME:     usize = 27;
const OFF_RESERVED: usize = 58;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntryStatus: u8 {
        const IN_USE    = 1 << 0;
        const FILE      = 1 << 1;
        const DIRECTORY = 1 << 2;

        // Images may carry other bits; keep them intact
        const _ = !0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

// ─── Timestamp ─────────────────────────────────────────────────────────────────

/// 7-byte timestamp: big-endian year, then month/day/hour/minute/second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub year:   u16,
    pub month:  u8,
    pub day:    u8,
    pub hour:   u8,
    pub minute: u8,
    pub second: u8,
}

impl Timestamp {
    pub const ZERO: Self = Self { year: 0, month: 0, day: 0, hour: 0, minute: 0, second: 0 };

    pub fn decode(raw: &[u8; 7]) -> Self {
        Self {
            year:   u16::from_be_bytes([raw[0], raw[1]]),
            month:  raw[2],
            day:    raw[3],
            hour:   raw[4],
            minute: raw[5],
            second: raw[6],
        }
    }

    pub fn encode(&self) -> [u8; 7] {
        let [y0, y1] = self.year.to_be_bytes();
        [y0, y1, self.month, self.day, self.hour, self.minute, self.second]
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

// ─── Filename ──────────────────────────────────────────────────────────────────

/// A name short enough to be stored in a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filename(heapless::String<NAME_MAX>);

impl Filename {
    /// Keep as many leading characters of `name` as fit in `NAME_MAX` bytes.
    pub fn truncated(name: &str) -> Self {
        let mut out = heapless::String::new();
        for c in name.chars() {
            if out.push(c).is_err() {
                break;
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn to_field(&self) -> [u8; NAME_FIELD_LEN] {
        let mut field = [0u8; NAME_FIELD_LEN];
        let bytes = self.0.as_bytes();
        field[..bytes.len()].copy_from_slice(bytes);
        field
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── DirEntry ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub status:      EntryStatus,
    pub start_block: u32,
    pub block_count: u32,
    pub file_size:   u32,
    pub created:     Timestamp,
    pub modified:    Timestamp,
    pub name:        [u8; NAME_FIELD_LEN],
    pub reserved:    [u8; 6],
}

impl DirEntry {
    /// An all-zero slot, as found in a freshly initialised directory block.
    pub const UNUSED: Self = Self {
        status:      EntryStatus::empty(),
        start_block: 0,
        block_count: 0,
        file_size:   0,
        created:     Timestamp::ZERO,
        modified:    Timestamp::ZERO,
        name:        [0; NAME_FIELD_LEN],
        reserved:    [0; 6],
    };

    pub fn new_file(name: &Filename, start_block: u32, block_count: u32, file_size: u32) -> Self {
        Self {
            status: EntryStatus::IN_USE | EntryStatus::FILE,
            start_block,
            block_count,
            file_size,
            created:  Timestamp::ZERO,
            modified: Timestamp::ZERO,
            name:     name.to_field(),
            reserved: [0xFF; 6],
        }
    }

    /// A one-block directory entry; sizes are always zero for directories.
    pub fn new_directory(name: &Filename, start_block: u32) -> Self {
        Self {
            status: EntryStatus::IN_USE | EntryStatus::DIRECTORY,
            start_block,
            block_count: 1,
            file_size:   0,
            created:  Timestamp::ZERO,
            modified: Timestamp::ZERO,
            name:     name.to_field(),
            reserved: [0xFF; 6],
        }
    }

    pub fn decode(raw: &[u8]) -> Result<Self, LayoutError> {
        if raw.len() < DIR_ENTRY_SIZE {
            return Err(LayoutError::Truncated {
                what: "directory entry", expected: DIR_ENTRY_SIZE, got: raw.len(),
            });
        }
        let mut created = [0u8; 7];
        let mut modified = [0u8; 7];
        let mut name = [0u8; NAME_FIELD_LEN];
        let mut reserved = [0u8; 6];
        created.copy_from_slice(&raw[OFF_CREATED..OFF_CREATED + 7]);
        modified.copy_from_slice(&raw[OFF_MODIFIED..OFF_MODIFIED + 7]);
        name.copy_from_slice(&raw[OFF_NAME..OFF_NAME + NAME_FIELD_LEN]);
        reserved.copy_from_slice(&raw[OFF_RESERVED..OFF_RESERVED + 6]);

        Ok(Self {
            status:      EntryStatus::from_bits_retain(raw[OFF_STATUS]),
            start_block: be_u32(raw, OFF_START),
            block_count: be_u32(raw, OFF_BLOCKS),
            file_size:   be_u32(raw, OFF_SIZE),
            created:     Timestamp::decode(&created),
            modified:    Timestamp::decode(&modified),
            name,
            reserved,
        })
    }

    pub fn encode(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[OFF_STATUS] = self.status.bits();
        put_be_u32(&mut raw, OFF_START,  self.start_block);
        put_be_u32(&mut raw, OFF_BLOCKS, self.block_count);
        put_be_u32(&mut raw, OFF_SIZE,   self.file_size);
        raw[OFF_CREATED..OFF_CREATED + 7].copy_from_slice(&self.created.encode());
        raw[OFF_MODIFIED..OFF_MODIFIED + 7].copy_from_slice(&self.modified.encode());
        raw[OFF_NAME..OFF_NAME + NAME_FIELD_LEN].copy_from_slice(&self.name);
        raw[OFF_RESERVED..OFF_RESERVED + 6].copy_from_slice(&self.reserved);
        raw
    }

    pub fn is_in_use(&self) -> bool {
        self.status.contains(EntryStatus::IN_USE)
    }

    /// `None` for free slots and for in-use entries carrying neither type bit.
    pub fn kind(&self) -> Option<EntryKind> {
        if !self.is_in_use() {
            None
        } else if self.status.contains(EntryStatus::FILE) {
            Some(EntryKind::File)
        } else if self.status.contains(EntryStatus::DIRECTORY) {
            Some(EntryKind::Directory)
        } else {
            None
        }
    }

    /// Stored name up to the first NUL.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_FIELD_LEN);
        &self.name[..end]
    }

    /// Compare at most `NAME_FIELD_LEN` bytes, stopping at the first NUL.
    ///
    /// Two names sharing a 31-byte prefix compare equal.
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.as_bytes();
        for (i, &stored) in self.name.iter().enumerate() {
            let wanted = query.get(i).copied().unwrap_or(0);
            if stored != wanted {
                return false;
            }
            if stored == 0 {
                return true;
            }
        }
        true
    }
}

// ─── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;

    fn readme() -> DirEntry {
        DirEntry::new_file(&Filename::truncated("README"), 61, 1, 11)
    }

    #[test]
    fn field_offsets() {
        let raw = readme().encode();
        assert_eq!(raw[0], 0x03);
        assert_eq!(&raw[1..5], &[0, 0, 0, 61]);
        assert_eq!(&raw[5..9], &[0, 0, 0, 1]);
        assert_eq!(&raw[9..13], &[0, 0, 0, 11]);
        assert_eq!(&raw[13..27], &[0u8; 14]);
        assert_eq!(&raw[27..33], b"README");
        assert_eq!(raw[33], 0);
        assert_eq!(&raw[58..64], &[0xFF; 6]);
    }

    #[test]
    fn decode_keeps_unknown_status_bits() {
        let mut raw = readme().encode();
        raw[0] = 0x83;
        let e = DirEntry::decode(&raw).unwrap();
        assert_eq!(e.status.bits(), 0x83);
        assert_eq!(e.encode()[0], 0x83);
        assert_eq!(e.kind(), Some(EntryKind::File));
    }

    #[test]
    fn decode_short_slice_fails() {
        assert!(matches!(
            DirEntry::decode(&[0u8; 10]),
            Err(LayoutError::Truncated { expected: 64, got: 10, .. })
        ));
    }

    #[test]
    fn kind_requires_in_use_bit() {
        let mut e = readme();
        e.status = EntryStatus::FILE;
        assert_eq!(e.kind(), None);
        e.status = EntryStatus::IN_USE;
        assert_eq!(e.kind(), None);
        e.status = EntryStatus::IN_USE | EntryStatus::DIRECTORY;
        assert_eq!(e.kind(), Some(EntryKind::Directory));
    }

    #[test]
    fn unused_slot_is_all_zero() {
        assert_eq!(DirEntry::UNUSED.encode(), [0u8; DIR_ENTRY_SIZE]);
        assert!(!DirEntry::UNUSED.is_in_use());
    }

    #[test]
    fn new_directory_entry() {
        let e = DirEntry::new_directory(&Filename::truncated("sub"), 99);
        assert_eq!(e.status.bits(), 0x05);
        assert_eq!(e.block_count, 1);
        assert_eq!(e.file_size, 0);
        assert_eq!(e.name_bytes(), b"sub");
    }

    // ── names ────────────────────────────────────────────────────────────────

    #[test]
    fn matches_exact_name_only() {
        let e = readme();
        assert!(e.matches_name("README"));
        assert!(!e.matches_name("README.md"));
        assert!(!e.matches_name("READ"));
        assert!(!e.matches_name("readme"));
    }

    #[test]
    fn unterminated_name_matches_on_prefix() {
        let mut e = readme();
        e.name = [b'a'; NAME_FIELD_LEN];
        let long = "a".repeat(40);
        assert!(e.matches_name(&long));
        assert!(e.matches_name(&long[..31]));
        assert!(!e.matches_name(&long[..30]));
    }

    #[test]
    fn filename_truncates_to_30_bytes() {
        let name = Filename::truncated("abcdefghijklmnopqrstuvwxyz0123456789");
        assert_eq!(name.as_str(), "abcdefghijklmnopqrstuvwxyz0123");
    }

    #[test]
    fn filename_truncates_on_char_boundary() {
        // 29 ASCII bytes followed by a two-byte character
        let input = format!("{}é", "x".repeat(29));
        assert_eq!(Filename::truncated(&input).as_str(), "x".repeat(29));
    }

    #[test]
    fn timestamp_display() {
        let t = Timestamp::decode(&[0x07, 0xE8, 3, 9, 14, 5, 7]);
        assert_eq!(t.year, 2024);
        assert_eq!(format!("{t}"), "2024/03/09 14:05:07");
        assert_eq!(t.encode(), [0x07, 0xE8, 3, 9, 14, 5, 7]);
    }
}
