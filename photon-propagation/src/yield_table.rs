use crate::species::{ParticleSpecies, SpeciesValues};
use photolib_common::PdgCode;

/// Maps a deposit's particle species to the fraction of its scintillation
/// light emitted in the fast component.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldTable {
    by_particle_type: bool,
    default_ratio: f64,
    ratios: SpeciesValues<f64>,
}

impl YieldTable {
    pub fn new(by_particle_type: bool, default_ratio: f64, ratios: SpeciesValues<f64>) -> Self {
        Self {
            by_particle_type,
            default_ratio,
            ratios,
        }
    }

    /// A table which always returns `ratio`.
    pub fn constant(ratio: f64) -> Self {
        Self::new(false, ratio, SpeciesValues::uniform(ratio))
    }

    pub fn fast_fraction(&self, pdg_code: PdgCode) -> f64 {
        if self.by_particle_type {
            self.ratios.get(ParticleSpecies::from_pdg(pdg_code))
        } else {
            self.default_ratio
        }
    }
}
