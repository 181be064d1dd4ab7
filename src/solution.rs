use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::instance::Instance;
use crate::pattern::Pattern;

/// An integer solution: which patterns to apply and how many times.
#[derive(Debug, Clone)]
pub struct Solution {
    instance: Arc<Instance>,
    patterns: IndexMap<Pattern, u32>,
    stock_needed: u64,
}

impl Solution {
    /// Creates a solution for `instance` from `(pattern, copies)` pairs.
    /// Patterns with zero copies are dropped, repeated patterns have their copies summed.
    pub fn new<I>(instance: Arc<Instance>, patterns: I) -> Self
    where
        I: IntoIterator<Item = (Pattern, u32)>,
    {
        let mut map: IndexMap<Pattern, u32> = IndexMap::new();
        for (pattern, copies) in patterns {
            if copies > 0 {
                *map.entry(pattern).or_insert(0) += copies;
            }
        }
        let stock_needed = map.values().map(|&c| c as u64).sum();
        Solution {
            instance,
            patterns: map,
            stock_needed,
        }
    }

    /// The patterns used by this solution.
    pub fn patterns(&self) -> impl ExactSizeIterator<Item = &Pattern> + '_ {
        self.patterns.keys()
    }

    /// Iterates over `(pattern, copies)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Pattern, u32)> + '_ {
        self.patterns.iter().map(|(p, &c)| (p, c))
    }

    /// How many times `pattern` is applied, 0 if it is not used.
    pub fn copies(&self, pattern: &Pattern) -> u32 {
        self.patterns.get(pattern).copied().unwrap_or(0)
    }

    /// The number of stock units this solution cuts.
    pub fn stock_needed(&self) -> u64 {
        self.stock_needed
    }

    /// The instance this solution was computed for.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// How many items of `size` this solution produces.
    pub fn produced(&self, size: u32) -> u64 {
        self.iter()
            .map(|(p, c)| p.amount(size) as u64 * c as u64)
            .sum()
    }

    /// Whether every order of the instance is met.
    pub fn is_feasible(&self) -> bool {
        self.instance
            .orders()
            .all(|(size, demand)| self.produced(size) >= demand as u64)
    }

    /// Stock length that is cut but not part of an ordered item.
    pub fn waste(&self) -> u64 {
        (self.stock_needed * self.instance.capacity() as u64)
            .saturating_sub(self.instance.total_length())
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (pattern, copies)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{pattern}={copies}")?;
        }
        write!(f, "}}")
    }
}
