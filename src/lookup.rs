//! Caller-held pre-activation caches.

use num_complex::Complex64;

/// Opaque per-chain cache of derived state for one evolving configuration.
///
/// A handle is created by [`MultivalRbm::init_lookup`](crate::MultivalRbm::init_lookup)
/// and stays valid for the configuration it was derived from plus whatever
/// incremental updates have since been applied to it. Holding one handle per
/// Monte Carlo chain is the intended pattern; sharing a handle across
/// configurations or threads is not.
///
/// The enum plays the role of a tagged any-cast: each ansatz family owns one
/// variant, and an operation handed a handle destructures the variant it
/// expects, so a handle can never silently be interpreted as the wrong kind
/// of cache.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Hidden-unit pre-activations `theta`, one entry per hidden unit.
    Theta(Vec<Complex64>),
}

impl Lookup {
    /// Borrow the pre-activation vector.
    #[inline]
    #[must_use]
    pub fn theta(&self) -> &[Complex64] {
        match self {
            Lookup::Theta(t) => t,
        }
    }

    #[inline]
    pub(crate) fn theta_mut(&mut self) -> &mut Vec<Complex64> {
        match self {
            Lookup::Theta(t) => t,
        }
    }
}
