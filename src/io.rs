//! Checkpoint persistence.
//!
//! The full parameter set and the structural metadata needed to rebuild the
//! ansatz are written as a single JSON document. Loading validates the
//! document against the live Hilbert space before committing anything, so a
//! failed load leaves the receiving instance untouched.

use anyhow::{bail, Context, Result};
use log::info;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::rbm::MultivalRbm;

/// Type tag stored in every document; a mismatch means the file belongs to a
/// different ansatz family.
pub const ANSATZ_NAME: &str = "MultivalRBM";

/// On-disk form of a saved ansatz.
///
/// Everything but `Name` is optional on the way in: `Nhidden` may instead be
/// derived from `Alpha`, the bias flags default to true, and missing bias
/// vectors load as zero. A document without a weight matrix is rejected —
/// accepting one would silently yield an ansatz whose amplitudes mean
/// nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RbmDocument {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Nvisible")]
    pub nvisible: Option<usize>,
    #[serde(rename = "Nhidden")]
    pub nhidden: Option<usize>,
    /// Density factor; used to derive `Nhidden` when that field is absent.
    #[serde(rename = "Alpha", skip_serializing_if = "Option::is_none", default)]
    pub alpha: Option<usize>,
    #[serde(rename = "LocalSize")]
    pub local_size: Option<usize>,
    #[serde(rename = "UseVisibleBias")]
    pub use_visible_bias: Option<bool>,
    #[serde(rename = "UseHiddenBias")]
    pub use_hidden_bias: Option<bool>,
    /// Visible bias, length `nv * ls`.
    pub a: Option<Vec<Complex64>>,
    /// Hidden bias, length `nh`.
    pub b: Option<Vec<Complex64>>,
    /// Weight matrix as `nv * ls` rows of `nh` entries.
    #[serde(rename = "W")]
    pub w: Option<Vec<Vec<Complex64>>>,
}

impl MultivalRbm {
    /// Snapshot the current state as a document.
    #[must_use]
    pub fn to_document(&self) -> RbmDocument {
        RbmDocument {
            name: ANSATZ_NAME.to_string(),
            nvisible: Some(self.nv),
            nhidden: Some(self.nh),
            alpha: None,
            local_size: Some(self.ls),
            use_visible_bias: Some(self.use_visible_bias),
            use_hidden_bias: Some(self.use_hidden_bias),
            a: Some(self.a.clone()),
            b: Some(self.b.clone()),
            w: Some(self.w.chunks(self.nh).map(|row| row.to_vec()).collect()),
        }
    }

    /// Write the full state to `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create checkpoint file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &self.to_document())
            .with_context(|| format!("failed to write checkpoint {}", path.display()))?;
        Ok(())
    }

    /// Read a checkpoint from `path` and replace the current state with it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open checkpoint file {}", path.display()))?;
        let doc: RbmDocument = serde_json::from_reader(file)
            .with_context(|| format!("failed to parse checkpoint {}", path.display()))?;
        self.load_document(doc)
            .with_context(|| format!("failed to apply checkpoint {}", path.display()))?;
        info!("loaded MultivalRBM state from {}", path.display());
        Ok(())
    }

    /// Apply an already-parsed document.
    ///
    /// All structural checks run against the parsed document and the live
    /// Hilbert space first; the instance is only replaced once the whole
    /// document has validated.
    pub fn load_document(&mut self, doc: RbmDocument) -> Result<()> {
        if doc.name != ANSATZ_NAME {
            bail!(
                "checkpoint names ansatz {:?}, expected {:?}",
                doc.name,
                ANSATZ_NAME
            );
        }

        let nv = doc.nvisible.unwrap_or(self.nv);
        if nv != self.hilbert.size() {
            bail!(
                "checkpoint has {} visible sites but the Hilbert space has {}",
                nv,
                self.hilbert.size()
            );
        }
        let ls = doc.local_size.unwrap_or(self.ls);
        if ls != self.hilbert.local_size() {
            bail!(
                "checkpoint has local size {} but the Hilbert space has {}",
                ls,
                self.hilbert.local_size()
            );
        }

        let nh = match (doc.nhidden, doc.alpha) {
            (Some(nh), _) => nh,
            (None, Some(alpha)) => alpha * nv,
            (None, None) => bail!("checkpoint carries neither Nhidden nor Alpha"),
        };

        let use_visible_bias = doc.use_visible_bias.unwrap_or(true);
        let use_hidden_bias = doc.use_hidden_bias.unwrap_or(true);

        let w_rows = match doc.w {
            Some(rows) => rows,
            None => bail!("checkpoint carries no weight matrix"),
        };
        if w_rows.len() != nv * ls {
            bail!(
                "checkpoint weight matrix has {} rows, expected {}",
                w_rows.len(),
                nv * ls
            );
        }
        for (r, row) in w_rows.iter().enumerate() {
            if row.len() != nh {
                bail!(
                    "checkpoint weight row {} has {} entries, expected {}",
                    r,
                    row.len(),
                    nh
                );
            }
        }
        if let Some(a) = &doc.a {
            if a.len() != nv * ls {
                bail!(
                    "checkpoint visible bias has length {}, expected {}",
                    a.len(),
                    nv * ls
                );
            }
        }
        if let Some(b) = &doc.b {
            if b.len() != nh {
                bail!(
                    "checkpoint hidden bias has length {}, expected {}",
                    b.len(),
                    nh
                );
            }
        }

        // Everything validated: rebuild through the shared initialization
        // path, then fill in the loaded values.
        let mut fresh = Self::build(
            self.hilbert.clone(),
            nh,
            use_visible_bias,
            use_hidden_bias,
        )?;
        if let Some(a) = doc.a {
            if use_visible_bias {
                fresh.a = a;
            }
        }
        if let Some(b) = doc.b {
            if use_hidden_bias {
                fresh.b = b;
            }
        }
        fresh.w.clear();
        for row in w_rows {
            fresh.w.extend_from_slice(&row);
        }
        *self = fresh;
        Ok(())
    }
}
