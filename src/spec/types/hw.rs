use static_assertions::const_assert;

pub type Word = u32;

pub const BYTE_WIDTH: u32 = 8;
pub const WORD_WIDTH: u32 = 32;

// Widest integer literal we can carry: values are held in a `u128`/`i128`
// before being split into words.
pub const MAX_INT_WIDTH: u32 = 128;
pub const MAX_WORD_COUNT: usize = (MAX_INT_WIDTH / WORD_WIDTH) as usize;

const_assert!(WORD_WIDTH == BYTE_WIDTH * std::mem::size_of::<Word>() as u32);
const_assert!(MAX_INT_WIDTH % WORD_WIDTH == 0);
const_assert!(MAX_INT_WIDTH == 8 * std::mem::size_of::<u128>() as u32);

/// The number of words needed to store a value `width` bits wide.
pub const fn word_count(width: u32) -> usize {
    ((width + WORD_WIDTH - 1) / WORD_WIDTH) as usize
}

/// All-ones in the low `width` bits.
pub const fn low_mask(width: u32) -> u128 {
    if width >= MAX_INT_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Replicates bit `width - 1` of `bits` into every higher bit.
pub fn sign_extend(bits: u128, width: u32) -> u128 {
    debug_assert!(width > 0 && width <= MAX_INT_WIDTH);
    let shift = MAX_INT_WIDTH - width;
    (((bits << shift) as i128) >> shift) as u128
}

/// Splits `bits` into `count` words, low-order word first.
pub fn bits_to_words(bits: u128, count: usize) -> Vec<Word> {
    assert!(count <= MAX_WORD_COUNT);
    (0..count)
        .map(|idx| (bits >> (idx as u32 * WORD_WIDTH)) as Word)
        .collect()
}

/// Reassembles words (low-order word first) into a single value.
pub fn words_to_bits(words: &[Word]) -> u128 {
    assert!(words.len() <= MAX_WORD_COUNT);
    words
        .iter()
        .enumerate()
        .fold(0, |acc, (idx, &w)| acc | (u128::from(w) << (idx as u32 * WORD_WIDTH)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_counts() {
        assert_eq!(word_count(1), 1);
        assert_eq!(word_count(16), 1);
        assert_eq!(word_count(32), 1);
        assert_eq!(word_count(33), 2);
        assert_eq!(word_count(48), 2);
        assert_eq!(word_count(64), 2);
        assert_eq!(word_count(128), 4);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0x8000, 16), 0xFFFF_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF_8000);
        assert_eq!(sign_extend(0x7FFF, 16), 0x7FFF);
        assert_eq!(sign_extend(u128::MAX, 128), u128::MAX);
    }

    #[test]
    fn words_are_low_order_first() {
        let words = bits_to_words(0x0000_8000_0000_0001, 2);
        assert_eq!(words, vec![0x0000_0001, 0x0000_8000]);
        assert_eq!(words_to_bits(&words), 0x0000_8000_0000_0001);
    }
}
