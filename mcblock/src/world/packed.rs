//! Fixed-width palette indices packed into arrays of 64-bit words.
//!
//! Two layouts exist on disk. Older worlds pack elements back to back, so an element may start
//! near the top of one word and finish at the bottom of the next. From data version 2529 onwards
//! each word holds `64 / bits` whole elements and any remaining high bits are padding.

use std::cmp::max;

use crate::world::error::{Error, Result};

/// Smallest element width used for block states, however small the palette.
pub const MIN_BITS_PER_ELEMENT: u32 = 4;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Packing {
    /// Elements are contiguous and may cross word boundaries.
    Straddled,
    /// Elements never cross word boundaries.
    #[default]
    Aligned,
}

impl Packing {
    /// First data version (20w17a) that stopped splitting elements across words.
    pub const ALIGNED_SINCE_DATA_VERSION: i32 = 2529;

    pub fn for_data_version(data_version: i32) -> Self {
        if data_version < Self::ALIGNED_SINCE_DATA_VERSION {
            Packing::Straddled
        } else {
            Packing::Aligned
        }
    }

    /// Number of words needed to hold `count` elements of `bits` each.
    pub fn word_count(self, count: usize, bits: u32) -> usize {
        let bits = bits as usize;
        match self {
            Packing::Straddled => (count * bits).div_ceil(64),
            Packing::Aligned => count.div_ceil(64 / bits),
        }
    }
}

/// `max(4, ceil(log2(palette_len)))`, without going through floating point.
pub fn bits_per_element(palette_len: usize) -> u32 {
    let needed = u64::BITS - (palette_len as u64).saturating_sub(1).leading_zeros();
    max(MIN_BITS_PER_ELEMENT, needed)
}

#[inline(always)]
fn mask(bits: u32) -> u64 {
    u64::MAX >> (u64::BITS - bits)
}

#[inline(always)]
fn word_at(words: &[i64], index: usize) -> Result<u64> {
    words
        .get(index)
        .map(|&word| word as u64)
        .ok_or(Error::BlockStatesOutOfBounds {
            word: index,
            length: words.len(),
        })
}

/// Get element `index` of width `bits` from `words`.
pub fn get(index: usize, bits: u32, words: &[i64], packing: Packing) -> Result<u64> {
    debug_assert!((1..=64).contains(&bits), "invalid element width: {bits}");
    match packing {
        Packing::Straddled => get_straddled(index, bits, words),
        Packing::Aligned => get_aligned(index, bits, words),
    }
}

fn get_straddled(index: usize, bits: u32, words: &[i64]) -> Result<u64> {
    let bit_index = index * bits as usize;
    let word_index = bit_index / 64;
    let bit_offset = (bit_index % 64) as u32;
    let word = word_at(words, word_index)?;

    let available = u64::BITS - bit_offset;
    if available >= bits {
        return Ok((word >> bit_offset) & mask(bits));
    }

    // Low bits are at the top of this word, the rest at the bottom of the next
    let leftover = bits - available;
    let next = word_at(words, word_index + 1)?;
    Ok((word >> bit_offset) | ((next & mask(leftover)) << available))
}

fn get_aligned(index: usize, bits: u32, words: &[i64]) -> Result<u64> {
    let per_word = (u64::BITS / bits) as usize;
    let word = word_at(words, index / per_word)?;
    let shift = (index % per_word) as u32 * bits;
    Ok((word >> shift) & mask(bits))
}

/// Pack `values` at `bits` each, the inverse of [`get`]. Values wider than `bits` are truncated.
pub fn pack(values: &[u64], bits: u32, packing: Packing) -> Vec<i64> {
    debug_assert!((1..=64).contains(&bits), "invalid element width: {bits}");
    let mut words = vec![0u64; packing.word_count(values.len(), bits)];
    for (index, &value) in values.iter().enumerate() {
        let value = value & mask(bits);
        match packing {
            Packing::Straddled => {
                let bit_index = index * bits as usize;
                let word_index = bit_index / 64;
                let bit_offset = (bit_index % 64) as u32;
                words[word_index] |= value << bit_offset;
                let available = u64::BITS - bit_offset;
                if available < bits {
                    words[word_index + 1] |= value >> available;
                }
            }
            Packing::Aligned => {
                let per_word = (u64::BITS / bits) as usize;
                let shift = (index % per_word) as u32 * bits;
                words[index / per_word] |= value << shift;
            }
        }
    }
    words.into_iter().map(|word| word as i64).collect()
}
