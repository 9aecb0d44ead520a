use crate::{deposit::EnergyDeposit, species::SpeciesValues};
use photolib_common::PdgCode;
use serde::Deserialize;

/// Total scintillation light of one deposit.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct ScintillationYield {
    pub num_photons: f64,
    pub pdg_code: PdgCode,
}

/// Converts an energy deposit into a total scintillation photon count.
pub trait YieldCalculator {
    fn compute(&self, deposit: &EnergyDeposit) -> ScintillationYield;
}

impl<F> YieldCalculator for F
where
    F: Fn(&EnergyDeposit) -> ScintillationYield,
{
    fn compute(&self, deposit: &EnergyDeposit) -> ScintillationYield {
        self(deposit)
    }
}

fn default_prescale() -> f64 {
    1.0
}

/// Light proportional to deposited energy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinearYieldCalculator {
    /// Photons per MeV for all species without an override.
    pub photons_per_mev: f64,
    /// Applied to every yield, e.g. to account for a reduced detection efficiency
    /// already folded into the visibilities.
    #[serde(default = "default_prescale")]
    pub prescale: f64,
    /// Per-species photons per MeV, replacing `photons_per_mev` when present.
    #[serde(default)]
    pub species_photons_per_mev: Option<SpeciesValues<f64>>,
}

impl LinearYieldCalculator {
    pub fn new(photons_per_mev: f64) -> Self {
        Self {
            photons_per_mev,
            prescale: default_prescale(),
            species_photons_per_mev: None,
        }
    }

    fn photons_per_mev(&self, pdg_code: PdgCode) -> f64 {
        self.species_photons_per_mev
            .as_ref()
            .map_or(self.photons_per_mev, |values| values.for_pdg(pdg_code))
    }
}

impl YieldCalculator for LinearYieldCalculator {
    fn compute(&self, deposit: &EnergyDeposit) -> ScintillationYield {
        let num_photons =
            (deposit.energy * self.photons_per_mev(deposit.pdg_code) * self.prescale).max(0.0);
        ScintillationYield {
            num_photons,
            pdg_code: deposit.pdg_code,
        }
    }
}
