//! Text rendering for `diskinfo` and `disklist`.

use fatdisk::VolumeReport;
use fatdisk_layout::{DirEntry, EntryKind};

pub fn volume_info(report: &VolumeReport) -> String {
    let sb = &report.superblock;
    let tally = &report.tally;
    format!(
        "Super block information:\n\
         Block size: {}\n\
         Block count: {}\n\
         FAT starts: {}\n\
         FAT blocks: {}\n\
         Root directory start: {}\n\
         Root directory blocks: {}\n\
         \n\
         FAT information:\n\
         Free Blocks: {}\n\
         Reserved Blocks: {}\n\
         Allocated Blocks: {}\n",
        sb.block_size,
        sb.block_count,
        sb.fat_start,
        sb.fat_blocks,
        sb.root_start,
        sb.root_blocks,
        tally.free,
        tally.reserved,
        tally.allocated,
    )
}

/// One `disklist` line, or `None` for entries that are not listed.
pub fn listing_line(entry: &DirEntry) -> Option<String> {
    let kind = match entry.kind()? {
        EntryKind::File => 'F',
        EntryKind::Directory => 'D',
    };
    let name = String::from_utf8_lossy(entry.name_bytes());
    Some(format!("{kind} {:>10} {name:<30} {}", entry.file_size, entry.created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatdisk::FatTally;
    use fatdisk_layout::{EntryStatus, Filename, Superblock, Timestamp};

    #[test]
    fn info_layout() {
        let report = VolumeReport {
            superblock: Superblock {
                block_size: 512, block_count: 6400,
                fat_start: 1, fat_blocks: 50,
                root_start: 51, root_blocks: 8,
            },
            tally: FatTally { free: 6192, reserved: 59, allocated: 149 },
        };
        let expected = "\
Super block information:
Block size: 512
Block count: 6400
FAT starts: 1
FAT blocks: 50
Root directory start: 51
Root directory blocks: 8

FAT information:
Free Blocks: 6192
Reserved Blocks: 59
Allocated Blocks: 149
";
        assert_eq!(volume_info(&report), expected);
    }

    #[test]
    fn file_line() {
        let mut entry = DirEntry::new_file(&Filename::truncated("README"), 61, 1, 11);
        entry.created = Timestamp { year: 2024, month: 3, day: 9, hour: 14, minute: 5, second: 7 };
        assert_eq!(
            listing_line(&entry).unwrap(),
            format!("F {:>10} {:<30} 2024/03/09 14:05:07", 11, "README")
        );
    }

    #[test]
    fn directory_line_and_hidden_entries() {
        let dir = DirEntry::new_directory(&Filename::truncated("sub"), 70);
        assert!(listing_line(&dir).unwrap().starts_with("D          0 sub "));

        let mut free = dir;
        free.status = EntryStatus::DIRECTORY;
        assert_eq!(listing_line(&free), None);
    }
}
