//! # Multi-valued RBM wavefunction ansatz
//!
//! A Restricted Boltzmann Machine over many-valued discrete variables, used
//! as a complex-valued variational wavefunction:
//!
//! ```text
//! ln psi(v) = a . vtilde(v) + sum_h ln cosh( W^T vtilde(v) + b )_h
//! ```
//!
//! where `vtilde` is the one-hot expansion of the configuration, `W` couples
//! each (site, local value) pair to each hidden unit, and `a`/`b` are the
//! optional visible and hidden biases.
//!
//! ## Incremental evaluation
//!
//! The expensive part of the log-amplitude is the pre-activation vector
//! `theta = W^T vtilde + b`. A Monte Carlo step changes only a handful of
//! sites, and a changed site swaps exactly one active row of `W` for
//! another, so `theta` is kept in a caller-held [`Lookup`] and patched in
//! O(changed sites x nh):
//!
//! 1. Subtract the weight row of the site's old value.
//! 2. Add the weight row of the site's new value.
//!
//! This makes a sweep O(k * nh) instead of O(nv * ls * nh). The same trick,
//! applied to a scratch copy of `theta`, prices a whole batch of candidate
//! moves against one shared base log-cosh sum in [`MultivalRbm::log_val_diff`].
//!
//! ## Reentrancy
//!
//! The instance owns pre-sized scratch buffers (`vtilde`, `theta`,
//! `theta_new`, `tanh_theta`) that are reused across calls to keep the hot
//! path allocation-free. Evaluation methods therefore take `&mut self` and
//! are not reentrant; give each sampler chain its own instance.

use anyhow::{bail, Result};
use log::info;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use std::sync::Arc;

use crate::encoding::ValueIndex;
use crate::hilbert::Hilbert;
use crate::logcosh::sum_logcosh;
use crate::lookup::Lookup;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// RBM ansatz over many-valued visible variables.
pub struct MultivalRbm {
    pub(crate) hilbert: Arc<dyn Hilbert>,

    /// Number of visible sites.
    pub(crate) nv: usize,
    /// Number of admissible values per site.
    pub(crate) ls: usize,
    /// Number of hidden units.
    pub(crate) nh: usize,
    /// Trainable parameter count; always equals `parameters().len()`.
    pub(crate) npar: usize,

    pub(crate) use_visible_bias: bool,
    pub(crate) use_hidden_bias: bool,

    /// Weights, flat row-major `[(nv * ls) rows, nh cols]`.
    /// Row `site * ls + value_index` couples one (site, value) pair to all
    /// hidden units, so an incremental update touches contiguous memory.
    pub(crate) w: Vec<Complex64>,
    /// Visible bias over one-hot entries, length `nv * ls`. All zero (and
    /// excluded from `npar`) when `use_visible_bias` is false.
    pub(crate) a: Vec<Complex64>,
    /// Hidden bias, length `nh`. Same disabling rule as `a`.
    pub(crate) b: Vec<Complex64>,

    /// Value -> block offset map derived from the Hilbert space.
    pub(crate) values: ValueIndex,

    // Instance-owned scratch; single writer, not reentrant.
    vtilde: Vec<f64>,
    theta: Vec<Complex64>,
    theta_new: Vec<Complex64>,
    tanh_theta: Vec<Complex64>,
}

impl MultivalRbm {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a fresh ansatz on the given Hilbert space.
    ///
    /// The hidden unit count is `max(nhidden, alpha * nv)`: either an
    /// explicit size or a density factor on the site count, whichever is
    /// larger. Parameters start at zero; use
    /// [`init_random_pars`](Self::init_random_pars) before sampling.
    pub fn new(
        hilbert: Arc<dyn Hilbert>,
        nhidden: usize,
        alpha: usize,
        use_visible_bias: bool,
        use_hidden_bias: bool,
    ) -> Result<Self> {
        let nh = nhidden.max(alpha * hilbert.size());
        Self::build(hilbert, nh, use_visible_bias, use_hidden_bias)
    }

    /// Shared initialization path for construction and checkpoint loading:
    /// derives every cached dimension, the value-index map, and the scratch
    /// buffers from the Hilbert space and the final hidden unit count.
    pub(crate) fn build(
        hilbert: Arc<dyn Hilbert>,
        nh: usize,
        use_visible_bias: bool,
        use_hidden_bias: bool,
    ) -> Result<Self> {
        let nv = hilbert.size();
        let ls = hilbert.local_size();
        if nv == 0 || ls == 0 {
            bail!("Hilbert space must have at least one site and one local state");
        }
        let values = ValueIndex::new(hilbert.local_states())?;
        if values.local_size() != ls {
            bail!(
                "Hilbert space advertises {} local states but a local size of {}",
                values.local_size(),
                ls
            );
        }

        let mut npar = nv * nh * ls;
        if use_visible_bias {
            npar += nv * ls;
        }
        if use_hidden_bias {
            npar += nh;
        }

        info!(
            "multival RBM initialized with nvisible = {} and nhidden = {}",
            nv, nh
        );
        info!("using visible bias = {}", use_visible_bias);
        info!("using hidden bias  = {}", use_hidden_bias);
        info!("local size is      = {}", ls);

        Ok(Self {
            hilbert,
            nv,
            ls,
            nh,
            npar,
            use_visible_bias,
            use_hidden_bias,
            w: vec![ZERO; nv * ls * nh],
            a: vec![ZERO; nv * ls],
            b: vec![ZERO; nh],
            values,
            vtilde: vec![0.0; nv * ls],
            theta: vec![ZERO; nh],
            theta_new: vec![ZERO; nh],
            tanh_theta: vec![ZERO; nh],
        })
    }

    /// Gaussian random initialization of all trainable parameters.
    ///
    /// Real and imaginary parts are drawn i.i.d. from `N(0, sigma^2)`.
    pub fn init_random_pars(&mut self, seed: u64, sigma: f64) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        let pars: Vec<Complex64> = (0..self.npar)
            .map(|_| {
                let re: f64 = StandardNormal.sample(&mut rng);
                let im: f64 = StandardNormal.sample(&mut rng);
                Complex64::new(re, im) * sigma
            })
            .collect();
        self.set_parameters(&pars)
    }

    // ========================================================================
    // Shape accessors
    // ========================================================================

    /// Number of visible sites.
    #[must_use]
    pub fn nvisible(&self) -> usize {
        self.nv
    }

    /// Number of hidden units.
    #[must_use]
    pub fn nhidden(&self) -> usize {
        self.nh
    }

    /// Number of admissible values per site.
    #[must_use]
    pub fn local_size(&self) -> usize {
        self.ls
    }

    /// Trainable parameter count.
    #[must_use]
    pub fn npar(&self) -> usize {
        self.npar
    }

    /// The Hilbert space this ansatz is defined on.
    #[must_use]
    pub fn hilbert(&self) -> &Arc<dyn Hilbert> {
        &self.hilbert
    }

    /// The log-amplitude is a complex-differentiable function of the
    /// parameters; gradient consumers may treat derivatives as holomorphic.
    #[must_use]
    pub fn is_holomorphic(&self) -> bool {
        true
    }

    // ========================================================================
    // Pre-activation engine
    // ========================================================================

    /// Fill the scratch `vtilde` and `theta` from scratch for `config`.
    ///
    /// `theta = W^T vtilde + b`; since `vtilde` is one-hot this is `b` plus
    /// one weight row per site. This is the O(nv * nh) path, used only when
    /// no lookup exists yet.
    fn compute_theta(&mut self, config: &[f64]) -> Result<()> {
        self.values.encode(config, &mut self.vtilde)?;
        self.theta.copy_from_slice(&self.b);
        for (row, &x) in self.vtilde.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            let wrow = &self.w[row * self.nh..][..self.nh];
            for h in 0..self.nh {
                self.theta[h] += wrow[h];
            }
        }
        Ok(())
    }

    /// Create a pre-activation cache for `config`.
    pub fn init_lookup(&mut self, config: &[f64]) -> Result<Lookup> {
        self.compute_theta(config)?;
        Ok(Lookup::Theta(self.theta.clone()))
    }

    /// Patch `lookup` for a set of site changes.
    ///
    /// `config` must hold the *pre-change* values — the state the lookup
    /// currently describes. For each changed site the weight row of the old
    /// value is subtracted and the row of the new value added, O(k * nh)
    /// total. An empty change list is a no-op.
    pub fn update_lookup(
        &self,
        config: &[f64],
        tochange: &[usize],
        newconf: &[f64],
        lookup: &mut Lookup,
    ) -> Result<()> {
        if tochange.is_empty() {
            return Ok(());
        }
        if tochange.len() != newconf.len() {
            bail!(
                "{} sites to change but {} new values",
                tochange.len(),
                newconf.len()
            );
        }
        let nh = self.nh;
        let theta = lookup.theta_mut();
        if theta.len() != nh {
            bail!(
                "lookup holds {} pre-activations but this ansatz has {} hidden units",
                theta.len(),
                nh
            );
        }
        for (s, &site) in tochange.iter().enumerate() {
            let old = self.values.get(config[site])?;
            let new = self.values.get(newconf[s])?;
            let old_row = &self.w[(site * self.ls + old) * nh..][..nh];
            let new_row = &self.w[(site * self.ls + new) * nh..][..nh];
            for h in 0..nh {
                theta[h] += new_row[h] - old_row[h];
            }
        }
        Ok(())
    }

    // ========================================================================
    // Amplitude / gradient engine
    // ========================================================================

    /// Log of the wavefunction amplitude at `config`.
    ///
    /// With a lookup the cached pre-activations are used; without one,
    /// `theta` is recomputed from scratch first.
    pub fn log_val(&mut self, config: &[f64], lookup: Option<&Lookup>) -> Result<Complex64> {
        match lookup {
            None => {
                self.compute_theta(config)?;
                Ok(self.visible_term() + sum_logcosh(&self.theta))
            }
            Some(lt) => {
                let theta = lt.theta();
                if theta.len() != self.nh {
                    bail!(
                        "lookup holds {} pre-activations but this ansatz has {} hidden units",
                        theta.len(),
                        self.nh
                    );
                }
                self.values.encode(config, &mut self.vtilde)?;
                Ok(self.visible_term() + sum_logcosh(theta))
            }
        }
    }

    /// `a . vtilde` over the current scratch encoding.
    fn visible_term(&self) -> Complex64 {
        let mut acc = ZERO;
        for (row, &x) in self.vtilde.iter().enumerate() {
            if x != 0.0 {
                acc += self.a[row];
            }
        }
        acc
    }

    /// Log-amplitude differences for a batch of candidate moves off one base
    /// configuration.
    ///
    /// Entry `k` is `ln psi(config with tochange[k] -> newconf[k]) -
    /// ln psi(config)`. The base pre-activations and their log-cosh sum are
    /// computed once and shared by every candidate; each candidate patches a
    /// scratch copy of `theta`, so the caller's lookup state is never
    /// touched. A candidate with no changes yields exactly zero.
    pub fn log_val_diff(
        &mut self,
        config: &[f64],
        tochange: &[Vec<usize>],
        newconf: &[Vec<f64>],
    ) -> Result<Vec<Complex64>> {
        if tochange.len() != newconf.len() {
            bail!(
                "{} change sets but {} new-value sets",
                tochange.len(),
                newconf.len()
            );
        }
        let mut diffs = vec![ZERO; tochange.len()];

        self.compute_theta(config)?;
        let base = sum_logcosh(&self.theta);

        for (k, (sites, vals)) in tochange.iter().zip(newconf).enumerate() {
            if sites.is_empty() {
                continue;
            }
            if sites.len() != vals.len() {
                bail!(
                    "candidate {} changes {} sites but supplies {} values",
                    k,
                    sites.len(),
                    vals.len()
                );
            }
            self.theta_new.copy_from_slice(&self.theta);
            let mut bias_delta = ZERO;
            for (s, &site) in sites.iter().enumerate() {
                let old = self.values.get(config[site])?;
                let new = self.values.get(vals[s])?;
                let old_row = site * self.ls + old;
                let new_row = site * self.ls + new;

                bias_delta += self.a[new_row] - self.a[old_row];

                let sub = &self.w[old_row * self.nh..][..self.nh];
                let add = &self.w[new_row * self.nh..][..self.nh];
                for h in 0..self.nh {
                    self.theta_new[h] += add[h] - sub[h];
                }
            }
            diffs[k] = bias_delta + sum_logcosh(&self.theta_new) - base;
        }
        Ok(diffs)
    }

    /// Parameter gradient of the log-amplitude at `config`.
    ///
    /// The layout matches [`parameters`](Self::parameters): visible-bias
    /// block (the one-hot values) when enabled, hidden-bias block
    /// (`tanh(theta)`, the derivative of log-cosh) when enabled, then the
    /// weight block `tanh(theta_h) * vtilde_r`, row-major over (site, value)
    /// then hidden unit.
    pub fn der_log(&mut self, config: &[f64], lookup: Option<&Lookup>) -> Result<Vec<Complex64>> {
        match lookup {
            None => {
                self.compute_theta(config)?;
                for h in 0..self.nh {
                    self.tanh_theta[h] = self.theta[h].tanh();
                }
            }
            Some(lt) => {
                let theta = lt.theta();
                if theta.len() != self.nh {
                    bail!(
                        "lookup holds {} pre-activations but this ansatz has {} hidden units",
                        theta.len(),
                        self.nh
                    );
                }
                self.values.encode(config, &mut self.vtilde)?;
                for h in 0..self.nh {
                    self.tanh_theta[h] = theta[h].tanh();
                }
            }
        }

        let mut der = vec![ZERO; self.npar];
        let mut k = 0;
        if self.use_visible_bias {
            for row in 0..self.nv * self.ls {
                der[k] = Complex64::new(self.vtilde[row], 0.0);
                k += 1;
            }
        }
        if self.use_hidden_bias {
            for h in 0..self.nh {
                der[k] = self.tanh_theta[h];
                k += 1;
            }
        }
        for row in 0..self.nv * self.ls {
            let x = self.vtilde[row];
            for h in 0..self.nh {
                der[k] = self.tanh_theta[h] * x;
                k += 1;
            }
        }
        Ok(der)
    }

    // ========================================================================
    // Parameter flattening
    // ========================================================================

    /// Flatten all enabled parameter blocks, in the fixed order
    /// [visible bias][hidden bias][weights row-major].
    #[must_use]
    pub fn parameters(&self) -> Vec<Complex64> {
        let mut pars = Vec::with_capacity(self.npar);
        if self.use_visible_bias {
            pars.extend_from_slice(&self.a);
        }
        if self.use_hidden_bias {
            pars.extend_from_slice(&self.b);
        }
        pars.extend_from_slice(&self.w);
        pars
    }

    /// Restore all enabled parameter blocks from a flat vector.
    ///
    /// The vector length must equal [`npar`](Self::npar) exactly.
    pub fn set_parameters(&mut self, pars: &[Complex64]) -> Result<()> {
        if pars.len() != self.npar {
            bail!(
                "parameter vector has length {}, expected {}",
                pars.len(),
                self.npar
            );
        }
        let mut k = 0;
        if self.use_visible_bias {
            self.a.copy_from_slice(&pars[..self.nv * self.ls]);
            k = self.nv * self.ls;
        }
        if self.use_hidden_bias {
            self.b.copy_from_slice(&pars[k..k + self.nh]);
            k += self.nh;
        }
        self.w.copy_from_slice(&pars[k..]);
        Ok(())
    }
}
