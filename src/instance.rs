use std::fmt;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A cutting-stock instance: orders for items of several sizes that have to be cut from stock
/// units of a fixed capacity.
///
/// Think of metal bars: the orders state how many bars of each length are needed, the capacity is
/// the length of the bars in stock. The sizes keep the order in which they were given, which fixes
/// the order of constraints and pricing variables in the models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInstance", into = "RawInstance")]
pub struct Instance {
    capacity: u32,
    orders: IndexMap<u32, u32>,
}

#[derive(Serialize, Deserialize)]
struct RawInstance {
    capacity: u32,
    orders: IndexMap<u32, u32>,
}

impl TryFrom<RawInstance> for Instance {
    type Error = Error;

    fn try_from(raw: RawInstance) -> Result<Self, Self::Error> {
        Instance::new(raw.capacity, raw.orders)
    }
}

impl From<Instance> for RawInstance {
    fn from(instance: Instance) -> Self {
        RawInstance {
            capacity: instance.capacity,
            orders: instance.orders,
        }
    }
}

impl Instance {
    /// Creates an instance from `(size, demand)` pairs and the stock capacity.
    ///
    /// Repeated sizes have their demands summed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstance`] if the capacity is zero, or a size is zero or exceeds the
    /// capacity.
    pub fn new<I>(capacity: u32, orders: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        if capacity == 0 {
            return Err(Error::InvalidInstance(
                "capacity must be positive".to_string(),
            ));
        }
        let mut merged: IndexMap<u32, u32> = IndexMap::new();
        for (size, demand) in orders {
            if size == 0 || size > capacity {
                return Err(Error::InvalidInstance(format!(
                    "size {size} is outside of 1..={capacity}"
                )));
            }
            let total = merged.entry(size).or_insert(0);
            *total = total.checked_add(demand).ok_or_else(|| {
                Error::InvalidInstance(format!("total demand of size {size} overflows u32"))
            })?;
        }
        Ok(Instance {
            capacity,
            orders: merged,
        })
    }

    /// Generates a random instance.
    ///
    /// Sizes are built by repeatedly adding a step drawn from `1..=max_step`, each with a demand
    /// drawn from `1..=max_amount`. The capacity is one more step beyond the largest size.
    ///
    /// The same seed gives the same instance for a given version of the `rand` crate.
    pub fn random(
        seed: u64,
        n_sizes: usize,
        max_step: u32,
        max_amount: u32,
    ) -> Result<Self, Error> {
        if max_step == 0 || max_amount == 0 {
            return Err(Error::InvalidInstance(
                "max_step and max_amount must be positive".to_string(),
            ));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let step = |length: u32, rng: &mut StdRng| {
            length
                .checked_add(rng.gen_range(1..=max_step))
                .ok_or_else(|| {
                    Error::InvalidInstance(format!(
                        "{n_sizes} sizes with steps up to {max_step} overflow u32"
                    ))
                })
        };
        let mut length: u32 = 0;
        let mut orders = Vec::with_capacity(n_sizes);
        for _ in 0..n_sizes {
            length = step(length, &mut rng)?;
            let amount = rng.gen_range(1..=max_amount);
            orders.push((length, amount));
        }
        let capacity = step(length, &mut rng)?;
        Instance::new(capacity, orders)
    }

    /// The capacity of a single stock unit.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The ordered sizes, in the order they were given.
    pub fn sizes(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.orders.keys().copied()
    }

    /// Iterates over `(size, demand)` pairs.
    pub fn orders(&self) -> impl ExactSizeIterator<Item = (u32, u32)> + '_ {
        self.orders.iter().map(|(&size, &demand)| (size, demand))
    }

    /// How many items of `size` are ordered, 0 if the size is not ordered at all.
    pub fn amount(&self, size: u32) -> u32 {
        self.orders.get(&size).copied().unwrap_or(0)
    }

    /// Whether items of `size` are ordered.
    pub fn contains_size(&self, size: u32) -> bool {
        self.orders.contains_key(&size)
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether there are no orders at all.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total number of ordered items.
    pub fn total_demand(&self) -> u64 {
        self.orders.values().map(|&d| d as u64).sum()
    }

    /// Total length of all ordered items.
    pub fn total_length(&self) -> u64 {
        self.orders
            .iter()
            .map(|(&size, &demand)| size as u64 * demand as u64)
            .sum()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance [capacity={}, orders={{", self.capacity)?;
        for (i, (size, demand)) in self.orders.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{size}={demand}")?;
        }
        write!(f, "}}]")
    }
}
