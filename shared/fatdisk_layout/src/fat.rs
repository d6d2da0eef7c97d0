/// FAT word encoding.

pub const FAT_FREE:     u32 = 0x0000_0000;
pub const FAT_RESERVED: u32 = 0x0000_0001;
pub const FAT_EOC:      u32 = 0xFFFF_FFFF;

/// Decoded meaning of one FAT word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    Free,
    Reserved,
    EndOfChain,
    Next(u32),
}

impl FatEntry {
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            FAT_FREE     => FatEntry::Free,
            FAT_RESERVED => FatEntry::Reserved,
            FAT_EOC      => FatEntry::EndOfChain,
            next         => FatEntry::Next(next),
        }
    }

    pub const fn to_raw(self) -> u32 {
        match self {
            FatEntry::Free       => FAT_FREE,
            FatEntry::Reserved   => FAT_RESERVED,
            FatEntry::EndOfChain => FAT_EOC,
            FatEntry::Next(next) => next,
        }
    }
}
