//! QAOA angle schedules.

use crate::error::{LightconeError, LightconeResult};

/// Per-round mixer (`betas`) and problem (`gammas`) angles.
///
/// Angles follow the rotation conventions of [`crate::gates`]: a round
/// applies `exp(−iγ/2·Z_i Z_j)` on every edge and `exp(−iβ/2·X_i)` on every
/// site.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSchedule {
    betas: Vec<f64>,
    gammas: Vec<f64>,
}

impl AngleSchedule {
    /// Validate and wrap an angle schedule of `p >= 1` rounds.
    pub fn new(betas: Vec<f64>, gammas: Vec<f64>) -> LightconeResult<Self> {
        if betas.is_empty() || betas.len() != gammas.len() {
            return Err(LightconeError::AnglesRequired {
                betas: betas.len(),
                gammas: gammas.len(),
            });
        }
        Ok(Self { betas, gammas })
    }

    /// Convert from the common `exp(−iβ·Σ X)` mixer convention.
    ///
    /// The problem angles carry over unchanged; each mixer angle maps to
    /// `−2β`.
    pub fn from_standard(betas: &[f64], gammas: &[f64]) -> LightconeResult<Self> {
        Self::new(betas.iter().map(|b| -2.0 * b).collect(), gammas.to_vec())
    }

    /// Number of rounds `p`.
    pub fn rounds(&self) -> usize {
        self.betas.len()
    }

    /// Mixer angles.
    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    /// Problem angles.
    pub fn gammas(&self) -> &[f64] {
        &self.gammas
    }
}
