//! End-to-end exercise of the ansatz under the Monte Carlo usage pattern:
//! a single evolving configuration with a long-lived lookup, candidate moves
//! priced through `log_val_diff`, and accepted moves applied through
//! `update_lookup`. The chain's incremental state must never drift from a
//! from-scratch evaluation.

use multival_rbm::{DiscreteSpace, Hilbert, MultivalRbm};
use std::sync::Arc;

fn build_chain() -> (MultivalRbm, Vec<f64>) {
    let space = Arc::new(DiscreteSpace::new(6, vec![-1.0, 0.0, 1.0]).unwrap());
    let mut rbm = MultivalRbm::new(space, 0, 2, true, true).unwrap();
    rbm.init_random_pars(2024, 0.15).unwrap();
    let config = vec![-1.0, 0.0, 1.0, 1.0, -1.0, 0.0];
    (rbm, config)
}

#[test_log::test]
fn incremental_walk_never_drifts_from_scratch_evaluation() {
    let (mut rbm, mut config) = build_chain();
    let states: Vec<f64> = rbm.hilbert().local_states().to_vec();
    let nv = rbm.nvisible();

    let mut lookup = rbm.init_lookup(&config).unwrap();

    // Deterministic walk: step i touches site i % nv and cycles its value.
    for step in 0..40 {
        let site = step % nv;
        let current = config[site];
        let pos = states.iter().position(|&s| s == current).unwrap();
        let proposed = states[(pos + 1 + step % 2) % states.len()];

        // Price the move as a sampler would, against the pre-move state.
        let diffs = rbm
            .log_val_diff(&config, &[vec![site]], &[vec![proposed]])
            .unwrap();
        let before = rbm.log_val(&config, None).unwrap();

        // Accept every move; patch the lookup before touching the config.
        rbm.update_lookup(&config, &[site], &[proposed], &mut lookup)
            .unwrap();
        config[site] = proposed;

        let after = rbm.log_val(&config, Some(&lookup)).unwrap();
        assert!(
            (after - before - diffs[0]).norm() < 1e-9,
            "step {}: batched diff {} inconsistent with direct {} -> {}",
            step,
            diffs[0],
            before,
            after
        );
    }

    // After the whole walk the patched lookup still matches from scratch.
    let fresh = rbm.init_lookup(&config).unwrap();
    for (patched, scratch) in lookup.theta().iter().zip(fresh.theta()) {
        assert!((patched - scratch).norm() < 1e-9);
    }
}

#[test_log::test]
fn batched_candidates_share_one_base_state() {
    let (mut rbm, config) = build_chain();

    // A realistic proposal batch: all single-site moves off the same base.
    let mut tochange = Vec::new();
    let mut newconf = Vec::new();
    for site in 0..rbm.nvisible() {
        for &value in &[-1.0, 0.0, 1.0] {
            if value != config[site] {
                tochange.push(vec![site]);
                newconf.push(vec![value]);
            }
        }
    }

    let diffs = rbm.log_val_diff(&config, &tochange, &newconf).unwrap();
    let base = rbm.log_val(&config, None).unwrap();

    for (k, (sites, vals)) in tochange.iter().zip(&newconf).enumerate() {
        let mut changed = config.clone();
        changed[sites[0]] = vals[0];
        let direct = rbm.log_val(&changed, None).unwrap() - base;
        assert!(
            (diffs[k] - direct).norm() < 1e-10,
            "candidate {}: {} vs {}",
            k,
            diffs[k],
            direct
        );
    }
}

#[test_log::test]
fn gradient_layout_matches_parameter_layout() {
    let (mut rbm, config) = build_chain();
    let lookup = rbm.init_lookup(&config).unwrap();
    let der = rbm.der_log(&config, Some(&lookup)).unwrap();
    assert_eq!(der.len(), rbm.npar());
    assert_eq!(der.len(), rbm.parameters().len());

    // Visible-bias block is the one-hot encoding itself: nv ones.
    let nv_ls = rbm.nvisible() * rbm.local_size();
    let ones = der[..nv_ls]
        .iter()
        .filter(|z| (z.re - 1.0).abs() < 1e-15 && z.im == 0.0)
        .count();
    assert_eq!(ones, rbm.nvisible());
}
