//! Hilbert-space collaborator.
//!
//! The ansatz does not own the description of the physical system it
//! represents; it consumes one through the [`Hilbert`] trait. A Hilbert space
//! here is just a count of sites together with the ordered set of values a
//! single site may take. Loaded checkpoints are validated against this
//! description before any live state is touched.

use anyhow::{bail, Result};

/// Description of the discrete configuration space the ansatz is defined on.
pub trait Hilbert {
    /// Number of sites (visible variables).
    fn size(&self) -> usize;

    /// Number of admissible values per site.
    fn local_size(&self) -> usize;

    /// The admissible per-site values, in canonical order.
    ///
    /// The order is load-bearing: it fixes the layout of every one-hot block
    /// and therefore of the weight matrix rows.
    fn local_states(&self) -> &[f64];
}

/// A homogeneous discrete space: `sites` variables, each ranging over the
/// same ordered list of values.
#[derive(Debug, Clone)]
pub struct DiscreteSpace {
    sites: usize,
    states: Vec<f64>,
}

impl DiscreteSpace {
    /// Create a space of `sites` variables over the given local values.
    ///
    /// The values must be non-empty and pairwise distinct (compared by bit
    /// pattern, so `0.0` and `-0.0` count as different values).
    pub fn new(sites: usize, states: Vec<f64>) -> Result<Self> {
        if sites == 0 {
            bail!("a discrete space needs at least one site");
        }
        if states.is_empty() {
            bail!("a discrete space needs at least one local state");
        }
        for (i, a) in states.iter().enumerate() {
            if states[..i].iter().any(|b| b.to_bits() == a.to_bits()) {
                bail!("duplicate local state {} in discrete space", a);
            }
        }
        Ok(Self { sites, states })
    }
}

impl Hilbert for DiscreteSpace {
    fn size(&self) -> usize {
        self.sites
    }

    fn local_size(&self) -> usize {
        self.states.len()
    }

    fn local_states(&self) -> &[f64] {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_space_dims() {
        let space = DiscreteSpace::new(4, vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(space.size(), 4);
        assert_eq!(space.local_size(), 3);
        assert_eq!(space.local_states(), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_rejects_degenerate_spaces() {
        assert!(DiscreteSpace::new(0, vec![0.0]).is_err());
        assert!(DiscreteSpace::new(3, vec![]).is_err());
        assert!(DiscreteSpace::new(3, vec![1.0, 1.0]).is_err());
    }
}
