const WORD_BITS: usize = 64;

/// A fixed-length set of indices packed into 64-bit words.
///
/// Bits beyond `len()` in the last word are kept at zero, so counting and
/// iteration never observe them. Indices at or past `len()` are a programming
/// error and panic in debug builds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// Creates a set of `len` bits, all set to `initial`.
    pub fn new(len: usize, initial: bool) -> Self {
        let fill = if initial { u64::MAX } else { 0 };
        let mut set = Self {
            words: vec![fill; len.div_ceil(WORD_BITS)],
            len,
        };
        set.clear_tail();
        set
    }

    /// Builds a set of length `len` containing the given indices.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(len, false);
        for index in indices {
            set.set(index);
        }
        set
    }

    fn clear_tail(&mut self) {
        let used = self.len % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len, "bit {index} out of range {}", self.len);
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Sets both bits of a pair.
    pub fn set_pair(&mut self, first: usize, second: usize) {
        self.set(first);
        self.set(second);
    }

    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len, "bit {index} out of range {}", self.len);
        self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }

    pub fn is_set(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "bit {index} out of range {}", self.len);
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Cardinality: the number of set bits, not the length.
    pub fn size(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Same as [`BitSet::size`].
    pub fn count(&self) -> usize {
        self.size()
    }

    /// Calls `callback` with every set index in ascending order.
    pub fn for_each(&self, mut callback: impl FnMut(usize)) {
        for (word_index, &word) in self.words.iter().enumerate() {
            let mut remaining = word;
            while remaining != 0 {
                let bit = remaining.trailing_zeros() as usize;
                callback(word_index * WORD_BITS + bit);
                remaining &= remaining - 1;
            }
        }
    }

    /// Iterates over set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_index, &word)| {
                let mut remaining = word;
                std::iter::from_fn(move || {
                    if remaining == 0 {
                        return None;
                    }
                    let bit = remaining.trailing_zeros() as usize;
                    remaining &= remaining - 1;
                    Some(word_index * WORD_BITS + bit)
                })
            })
    }

    /// In-place union; both sets must have the same length.
    pub fn union_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= b;
        }
    }

    /// In-place intersection; both sets must have the same length.
    pub fn intersect_with(&mut self, other: &BitSet) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= b;
        }
    }

    /// Flips every bit within `len()`.
    pub fn negate(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_tail();
    }
}
