//! One-hot expansion of multi-valued configurations.
//!
//! A configuration is a vector of `nv` site values, each one of `ls`
//! admissible local states. The ansatz works on its expanded form `vtilde`:
//! a dense `nv * ls` vector in which site `i` holding the `k`-th admissible
//! value contributes a single `1.0` at position `i * ls + k`. The expansion
//! is what turns a many-valued site into a block of binary inputs a weight
//! row can be attached to.

use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;

/// Bijection from admissible local value to its offset within a one-hot block.
///
/// Built once at initialization from the Hilbert space's ordered state list;
/// lookups are O(1). Values are keyed by their exact bit pattern, so callers
/// must feed back the same `f64`s the Hilbert space advertises.
#[derive(Debug, Clone)]
pub struct ValueIndex {
    states: Vec<f64>,
    index: HashMap<u64, usize>,
}

impl ValueIndex {
    /// Build the map from the ordered admissible values.
    pub fn new(states: &[f64]) -> Result<Self> {
        if states.is_empty() {
            bail!("cannot build a value index over zero local states");
        }
        let mut index = HashMap::with_capacity(states.len());
        for (k, &v) in states.iter().enumerate() {
            if index.insert(v.to_bits(), k).is_some() {
                bail!("duplicate local state {} in value index", v);
            }
        }
        Ok(Self {
            states: states.to_vec(),
            index,
        })
    }

    /// Number of admissible values per site.
    #[inline]
    #[must_use]
    pub fn local_size(&self) -> usize {
        self.states.len()
    }

    /// The admissible values, in block order.
    #[must_use]
    pub fn states(&self) -> &[f64] {
        &self.states
    }

    /// Block offset of a site value.
    ///
    /// A value outside the admissible set is a caller/Hilbert-space mismatch
    /// and comes back as an error.
    #[inline]
    pub fn get(&self, value: f64) -> Result<usize> {
        self.index.get(&value.to_bits()).copied().ok_or_else(|| {
            anyhow!(
                "configuration value {} is not an admissible local state",
                value
            )
        })
    }

    /// Write the one-hot expansion of `config` into `out`.
    ///
    /// `out` must have length `config.len() * local_size()`; every block gets
    /// exactly one `1.0`.
    pub fn encode(&self, config: &[f64], out: &mut [f64]) -> Result<()> {
        let ls = self.local_size();
        if out.len() != config.len() * ls {
            bail!(
                "one-hot buffer has length {}, expected {}",
                out.len(),
                config.len() * ls
            );
        }
        out.fill(0.0);
        for (site, &v) in config.iter().enumerate() {
            out[site * ls + self.get(v)?] = 1.0;
        }
        Ok(())
    }
}
