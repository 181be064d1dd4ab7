use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;

/// A cutting pattern: how many items of each size are cut from one stock unit.
///
/// Equality and hashing only look at the cuts, so two patterns built from the same multiset of
/// sizes are interchangeable, whatever order they were built in. Sizes with a count of zero are
/// not stored.
///
/// A pattern does not know the capacity it was made for; the pricing problem makes sure that
/// generated patterns fit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pattern {
    cuts: BTreeMap<u32, u32>,
    total_size: u64,
}

impl Pattern {
    /// Creates a pattern from `(size, count)` pairs. Counts of repeated sizes are summed.
    ///
    /// # Panics
    ///
    /// Panics if the summed count of a size overflows `u32`. Use [`Pattern::try_new`] for counts
    /// that are not known to be small.
    pub fn new<I>(cuts: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        match Pattern::try_new(cuts) {
            Ok(pattern) => pattern,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a pattern from `(size, count)` pairs. Counts of repeated sizes are summed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the summed count of a size overflows `u32`.
    pub fn try_new<I>(cuts: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut map: BTreeMap<u32, u32> = BTreeMap::new();
        for (size, count) in cuts {
            if count > 0 {
                let total = map.entry(size).or_insert(0);
                *total = total.checked_add(count).ok_or_else(|| {
                    Error::InvalidPattern(format!("count of size {size} overflows u32"))
                })?;
            }
        }
        let total_size = map
            .iter()
            .map(|(&size, &count)| size as u64 * count as u64)
            .sum();
        Ok(Pattern {
            cuts: map,
            total_size,
        })
    }

    /// Creates a pattern from the sizes of the items to cut. A size may be repeated to cut it
    /// several times.
    pub fn from_sizes<I>(sizes: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Pattern::new(sizes.into_iter().map(|size| (size, 1)))
    }

    /// Whether at least one item of `size` is cut.
    pub fn contains_size(&self, size: u32) -> bool {
        self.cuts.contains_key(&size)
    }

    /// The distinct sizes cut by this pattern, in ascending order.
    pub fn sizes(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.cuts.keys().copied()
    }

    /// Iterates over `(size, count)` pairs in ascending size order.
    pub fn cuts(&self) -> impl ExactSizeIterator<Item = (u32, u32)> + '_ {
        self.cuts.iter().map(|(&size, &count)| (size, count))
    }

    /// How many items of `size` are cut, 0 if none.
    pub fn amount(&self, size: u32) -> u32 {
        self.cuts.get(&size).copied().unwrap_or(0)
    }

    /// The combined length of all cut items.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Whether nothing is cut at all.
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// The sizes of all cut items, repeated by their count.
    pub fn as_list(&self) -> Vec<u32> {
        self.cuts
            .iter()
            .flat_map(|(&size, &count)| std::iter::repeat_n(size, count as usize))
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_list())
    }
}
