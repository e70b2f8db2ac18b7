//! Utilities for walking a key down the tree.
//!
//! A key is consumed `width` bits at a time, most significant bit first: the
//! child index at depth `d` is the `width`-bit number starting at bit offset
//! `d * width`.

use crate::types::Width;

/// Bits of the last key byte that still belong to the stem of a 10-bit tree.
/// 25 levels consume 250 bits, i.e. the 31 stem bytes plus the top two bits
/// of byte 31.
const TEN_BIT_LAST_BYTE_MASK: u8 = 0xc0;

impl Width {
    /// Returns `true` if both keys resolve to the same leaf.
    ///
    /// Keys of different lengths never share a path. For 8-bit trees the last
    /// byte is ignored entirely; for 10-bit trees its top two bits are part of
    /// the path as well.
    pub fn equal_paths(self, key1: &[u8], key2: &[u8]) -> bool {
        if key1.len() != key2.len() {
            return false;
        }

        match (key1.split_last(), key2.split_last()) {
            (Some((last1, stem1)), Some((last2, stem2))) => {
                stem1 == stem2
                    && match self {
                        Width::Eight => true,
                        Width::Ten => {
                            last1 & TEN_BIT_LAST_BYTE_MASK == last2 & TEN_BIT_LAST_BYTE_MASK
                        }
                    }
            }
            _ => true,
        }
    }

    /// Extracts the index of the child selected by `key` at bit `offset`.
    ///
    /// A 10-bit index is spread across two bytes. At the last level of a
    /// 32-byte key there is no second byte; the missing low bits are then zero,
    /// so children of that level are 16 apart.
    ///
    /// Returns `None` if `offset` starts past the end of the key.
    pub fn offset_to_key(self, key: &[u8], offset: usize) -> Option<usize> {
        let first = offset / 8;
        if first >= key.len() {
            return None;
        }

        match self {
            Width::Eight => Some(key[first] as usize),
            Width::Ten => {
                // Big-endian window over the (up to) three bytes the index can
                // touch; bytes past the end of the key read as zero.
                let window = (first..first + 3).fold(0u32, |acc, i| {
                    (acc << 8) | key.get(i).copied().unwrap_or(0) as u32
                });
                let shift = 24 - offset % 8 - self.bits();
                Some(((window >> shift) & 0x3ff) as usize)
            }
        }
    }
}
