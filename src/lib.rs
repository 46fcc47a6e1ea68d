//! # multival-rbm
//!
//! A Restricted Boltzmann Machine over many-valued discrete variables, used
//! as a complex-valued variational wavefunction ansatz for many-body quantum
//! systems.
//!
//! The crate covers the numerics of the ansatz itself and nothing around it:
//!
//! - [`MultivalRbm`] — the parameters (weights and optional biases) and the
//!   evaluation engine: log-amplitude, batched amplitude ratios, and the
//!   full parameter gradient, all built on a numerically stable complex
//!   log-cosh reduction.
//! - [`Lookup`] — a caller-held cache of hidden-unit pre-activations that is
//!   patched incrementally as a Monte Carlo chain flips sites, instead of
//!   being recomputed from scratch each step.
//! - [`Hilbert`] / [`DiscreteSpace`] — the external description of the
//!   configuration space (site count and admissible per-site values).
//! - [`RbmDocument`] — the JSON checkpoint format behind
//!   [`MultivalRbm::save`] and [`MultivalRbm::load`].
//!
//! Samplers, optimizers, and anything that consumes the gradients live
//! elsewhere; this crate only makes evaluating the ansatz cheap.
//!
//! ```no_run
//! use multival_rbm::{DiscreteSpace, MultivalRbm};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let space = Arc::new(DiscreteSpace::new(4, vec![0.0, 1.0, 2.0])?);
//! let mut rbm = MultivalRbm::new(space, 0, 2, true, true)?;
//! rbm.init_random_pars(42, 0.1)?;
//!
//! let config = [0.0, 2.0, 1.0, 0.0];
//! let mut lookup = rbm.init_lookup(&config)?;
//! let amp = rbm.log_val(&config, Some(&lookup))?;
//!
//! // One site flips: patch the lookup instead of recomputing.
//! rbm.update_lookup(&config, &[1], &[0.0], &mut lookup)?;
//! # let _ = amp;
//! # Ok(())
//! # }
//! ```

pub mod encoding;
pub mod hilbert;
pub mod io;
pub mod logcosh;
pub mod lookup;
pub mod rbm;

pub use encoding::ValueIndex;
pub use hilbert::{DiscreteSpace, Hilbert};
pub use io::{RbmDocument, ANSATZ_NAME};
pub use logcosh::{logcosh, sum_logcosh};
pub use lookup::Lookup;
pub use rbm::MultivalRbm;
