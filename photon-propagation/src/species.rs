use photolib_common::PdgCode;
use serde::Deserialize;
use strum::{Display, EnumIter};

/// Particle classes with a distinct scintillation response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ParticleSpecies {
    Proton,
    Muon,
    Pion,
    Kaon,
    Alpha,
    Electron,
}

/// PDG codes with a dedicated species. Anything else is treated as an electron.
const PDG_SPECIES: &[(PdgCode, ParticleSpecies)] = &[
    (2212, ParticleSpecies::Proton),
    (13, ParticleSpecies::Muon),
    (-13, ParticleSpecies::Muon),
    (211, ParticleSpecies::Pion),
    (-211, ParticleSpecies::Pion),
    (321, ParticleSpecies::Kaon),
    (-321, ParticleSpecies::Kaon),
    (1000020040, ParticleSpecies::Alpha),
    (11, ParticleSpecies::Electron),
    (-11, ParticleSpecies::Electron),
    (22, ParticleSpecies::Electron),
];

impl ParticleSpecies {
    pub const FALLBACK: ParticleSpecies = ParticleSpecies::Electron;

    pub fn from_pdg(pdg_code: PdgCode) -> Self {
        PDG_SPECIES
            .iter()
            .find_map(|&(code, species)| (code == pdg_code).then_some(species))
            .unwrap_or(Self::FALLBACK)
    }
}

/// One value per particle species.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpeciesValues<T> {
    pub proton: T,
    pub muon: T,
    pub pion: T,
    pub kaon: T,
    pub alpha: T,
    pub electron: T,
}

impl<T: Copy> SpeciesValues<T> {
    pub fn uniform(value: T) -> Self {
        Self {
            proton: value,
            muon: value,
            pion: value,
            kaon: value,
            alpha: value,
            electron: value,
        }
    }

    pub fn get(&self, species: ParticleSpecies) -> T {
        match species {
            ParticleSpecies::Proton => self.proton,
            ParticleSpecies::Muon => self.muon,
            ParticleSpecies::Pion => self.pion,
            ParticleSpecies::Kaon => self.kaon,
            ParticleSpecies::Alpha => self.alpha,
            ParticleSpecies::Electron => self.electron,
        }
    }

    pub fn for_pdg(&self, pdg_code: PdgCode) -> T {
        self.get(ParticleSpecies::from_pdg(pdg_code))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleSpecies, T)> + '_ {
        use strum::IntoEnumIterator;
        ParticleSpecies::iter().map(|species| (species, self.get(species)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(ParticleSpecies::from_pdg(2212), ParticleSpecies::Proton);
        assert_eq!(ParticleSpecies::from_pdg(-13), ParticleSpecies::Muon);
        assert_eq!(ParticleSpecies::from_pdg(211), ParticleSpecies::Pion);
        assert_eq!(ParticleSpecies::from_pdg(-321), ParticleSpecies::Kaon);
        assert_eq!(ParticleSpecies::from_pdg(1000020040), ParticleSpecies::Alpha);
        assert_eq!(ParticleSpecies::from_pdg(22), ParticleSpecies::Electron);
    }

    #[test]
    fn unknown_codes_fall_back_to_electron() {
        // neutron, antiproton, deuteron
        for code in [2112, -2212, 1000010020, 0] {
            assert_eq!(ParticleSpecies::from_pdg(code), ParticleSpecies::Electron);
        }
    }

    #[test]
    fn values_lookup() {
        let values = SpeciesValues {
            proton: 1,
            muon: 2,
            pion: 3,
            kaon: 4,
            alpha: 5,
            electron: 6,
        };
        assert_eq!(values.for_pdg(-211), 3);
        assert_eq!(values.for_pdg(12), 6);
        assert_eq!(values.iter().count(), 6);
        assert_eq!(ParticleSpecies::Alpha.to_string(), "alpha");
    }
}
