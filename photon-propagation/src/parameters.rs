use crate::{
    species::SpeciesValues,
    timing::{DEFAULT_MAX_TIMING_RETRIES, ScintillationComponent},
    yield_calculator::LinearYieldCalculator,
    yield_table::YieldTable,
};
use photolib_common::{DEFAULT_PHOTON_ENERGY, NO_RISE_TIME};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Invalid Parameter Document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No deposit sources configured")]
    NoDepositSources,
    #[error("{factors} photon scale factors given for {sources} deposit sources")]
    ScaleFactorCount { factors: usize, sources: usize },
    #[error("Photon scale factor {value} for source {source_index} is not a non-negative number")]
    ScaleFactor { source_index: usize, value: f64 },
    #[error("{name} time constant must be positive, got {value}")]
    TimeConstant { name: &'static str, value: f64 },
    #[error("{name} rise time must be positive or -1, got {value}")]
    RiseTime { name: &'static str, value: f64 },
    #[error("Yield ratio for {name} must lie in [0, 1], got {value}")]
    YieldRatio { name: String, value: f64 },
    #[error("Maximum timing retries must be positive")]
    TimingRetries,
    #[error("Photon energy must be positive, got {0}")]
    PhotonEnergy(f64),
    #[error("Yield calculator photons per MeV must be non-negative, got {0}")]
    PhotonsPerMev(f64),
}

fn default_rise_time() -> f64 {
    NO_RISE_TIME
}

fn default_photon_energy() -> f64 {
    DEFAULT_PHOTON_ENERGY
}

fn default_max_timing_retries() -> usize {
    DEFAULT_MAX_TIMING_RETRIES
}

fn default_yield_ratio() -> f64 {
    1.0
}

///
/// This struct is created from the run configuration JSON file.
///
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunParameters {
    /// Labels of the deposit collections to propagate, in processing order.
    pub deposit_sources: Vec<String>,
    /// One factor per deposit source. Missing trailing factors are 1.0.
    #[serde(default)]
    pub photon_scale: Vec<f64>,
    pub fast_time_constant: f64,
    pub slow_time_constant: f64,
    #[serde(default = "default_rise_time")]
    pub fast_rise_time: f64,
    #[serde(default = "default_rise_time")]
    pub slow_rise_time: f64,
    pub do_slow_component: bool,
    #[serde(default)]
    pub yield_by_particle_type: bool,
    #[serde(default = "default_yield_ratio")]
    pub default_yield_ratio: f64,
    /// Required only when `yield_by_particle_type` is set.
    #[serde(default)]
    pub species_yield_ratios: Option<SpeciesValues<f64>>,
    #[serde(default = "default_photon_energy")]
    pub photon_energy: f64,
    #[serde(default = "default_max_timing_retries")]
    pub max_timing_retries: usize,
    pub yield_calculator: LinearYieldCalculator,
}

/// Validated run constants consumed by the propagation driver.
#[derive(Debug, Clone)]
pub struct ScintillationParameters {
    pub fast: ScintillationComponent,
    pub slow: ScintillationComponent,
    pub do_slow_component: bool,
    pub yield_table: YieldTable,
    photon_scale: Vec<f64>,
    pub photon_energy: f64,
    pub max_timing_retries: usize,
}

impl ScintillationParameters {
    /// Scale factor of the deposit source at `source_index`. Sources beyond
    /// the configured list are not scaled.
    pub fn photon_scale(&self, source_index: usize) -> f64 {
        self.photon_scale.get(source_index).copied().unwrap_or(1.0)
    }

    /// Parameters with no rise times, no slow component and a constant yield ratio.
    pub fn fast_only(time_constant: f64, yield_ratio: f64) -> Self {
        Self {
            fast: ScintillationComponent::without_rise(time_constant),
            slow: ScintillationComponent::without_rise(time_constant),
            do_slow_component: false,
            yield_table: YieldTable::constant(yield_ratio),
            photon_scale: Vec::new(),
            photon_energy: DEFAULT_PHOTON_ENERGY,
            max_timing_retries: DEFAULT_MAX_TIMING_RETRIES,
        }
    }

    pub fn with_slow_component(mut self, slow: ScintillationComponent) -> Self {
        self.slow = slow;
        self.do_slow_component = true;
        self
    }

    pub fn with_photon_scale(mut self, photon_scale: Vec<f64>) -> Self {
        self.photon_scale = photon_scale;
        self
    }
}

fn validate_time_constant(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::TimeConstant { name, value })
    }
}

fn validate_rise_time(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value == NO_RISE_TIME || (value.is_finite() && value > 0.0) {
        Ok(())
    } else {
        Err(ParameterError::RiseTime { name, value })
    }
}

fn validate_ratio(name: String, value: f64) -> Result<(), ParameterError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ParameterError::YieldRatio { name, value })
    }
}

impl RunParameters {
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ParameterError> {
        let parameters: Self = serde_json::from_reader(BufReader::new(File::open(path.as_ref())?))?;
        info!(
            "Loaded run parameters for {} deposit sources",
            parameters.deposit_sources.len()
        );
        Ok(parameters)
    }

    /// Checks every run constant, padding the photon scale list to one factor per source.
    pub fn validate(&self) -> Result<ScintillationParameters, ParameterError> {
        let sources = self.deposit_sources.len();
        if sources == 0 {
            return Err(ParameterError::NoDepositSources);
        }
        if self.photon_scale.len() > sources {
            return Err(ParameterError::ScaleFactorCount {
                factors: self.photon_scale.len(),
                sources,
            });
        }
        if let Some((source_index, &value)) = self
            .photon_scale
            .iter()
            .enumerate()
            .find(|(_, value)| !(value.is_finite() && **value >= 0.0))
        {
            return Err(ParameterError::ScaleFactor {
                source_index,
                value,
            });
        }
        let mut photon_scale = self.photon_scale.clone();
        if photon_scale.len() < sources {
            debug!(
                "{} photon scale factors given for {sources} deposit sources, padding with 1.0",
                photon_scale.len()
            );
            photon_scale.resize(sources, 1.0);
        }

        validate_time_constant("Fast", self.fast_time_constant)?;
        validate_time_constant("Slow", self.slow_time_constant)?;
        validate_rise_time("Fast", self.fast_rise_time)?;
        validate_rise_time("Slow", self.slow_rise_time)?;

        validate_ratio("default".to_owned(), self.default_yield_ratio)?;
        let ratios = match (&self.species_yield_ratios, self.yield_by_particle_type) {
            (Some(ratios), _) => ratios.clone(),
            (None, true) => {
                warn!("Yield by particle type requested without species ratios, using the default ratio");
                SpeciesValues::uniform(self.default_yield_ratio)
            }
            (None, false) => SpeciesValues::uniform(self.default_yield_ratio),
        };
        for (species, ratio) in ratios.iter() {
            validate_ratio(species.to_string(), ratio)?;
        }

        if self.max_timing_retries == 0 {
            return Err(ParameterError::TimingRetries);
        }
        if !(self.photon_energy.is_finite() && self.photon_energy > 0.0) {
            return Err(ParameterError::PhotonEnergy(self.photon_energy));
        }
        if !(self.yield_calculator.photons_per_mev.is_finite()
            && self.yield_calculator.photons_per_mev >= 0.0)
        {
            return Err(ParameterError::PhotonsPerMev(
                self.yield_calculator.photons_per_mev,
            ));
        }

        Ok(ScintillationParameters {
            fast: ScintillationComponent::new(self.fast_time_constant, self.fast_rise_time),
            slow: ScintillationComponent::new(self.slow_time_constant, self.slow_rise_time),
            do_slow_component: self.do_slow_component,
            yield_table: YieldTable::new(self.yield_by_particle_type, self.default_yield_ratio, ratios),
            photon_scale,
            photon_energy: self.photon_energy,
            max_timing_retries: self.max_timing_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_INPUT_1: &str = r#"
    {
        "deposit-sources": ["ionization", "cosmics"],
        "photon-scale": [0.5],
        "fast-time-constant": 6.0,
        "slow-time-constant": 1590.0,
        "fast-rise-time": -1,
        "slow-rise-time": 1.5,
        "do-slow-component": true,
        "yield-by-particle-type": true,
        "default-yield-ratio": 0.3,
        "species-yield-ratios": {
            "proton": 0.29, "muon": 0.23, "pion": 0.23,
            "kaon": 0.23, "alpha": 0.56, "electron": 0.23
        },
        "yield-calculator": { "photons-per-mev": 24000, "prescale": 0.0093 }
    }
    "#;

    fn parameters() -> RunParameters {
        serde_json::from_str(JSON_INPUT_1).expect("valid document")
    }

    #[test]
    fn parse_and_validate() {
        let parameters = parameters();
        assert_eq!(parameters.deposit_sources.len(), 2);
        assert_eq!(parameters.photon_energy, DEFAULT_PHOTON_ENERGY);
        assert_eq!(parameters.max_timing_retries, DEFAULT_MAX_TIMING_RETRIES);

        let validated = parameters.validate().expect("valid parameters");
        assert_eq!(validated.fast.rise_time, None);
        assert_eq!(validated.slow.rise_time, Some(1.5));
        assert_eq!(validated.slow.time_constant, 1590.0);
        assert!(validated.do_slow_component);
        assert_eq!(validated.yield_table.fast_fraction(1000020040), 0.56);
    }

    #[test]
    fn scale_factors_are_padded() {
        let validated = parameters().validate().expect("valid parameters");
        assert_eq!(validated.photon_scale(0), 0.5);
        assert_eq!(validated.photon_scale(1), 1.0);
        assert_eq!(validated.photon_scale(7), 1.0);
    }

    #[test]
    fn too_many_scale_factors() {
        let mut parameters = parameters();
        parameters.photon_scale = vec![1.0, 1.0, 1.0];
        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::ScaleFactorCount {
                factors: 3,
                sources: 2
            })
        ));
    }

    #[test]
    fn negative_scale_factor() {
        let mut parameters = parameters();
        parameters.photon_scale = vec![1.0, -2.0];
        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::ScaleFactor { source_index: 1, .. })
        ));
    }

    #[test]
    fn no_sources() {
        let mut parameters = parameters();
        parameters.deposit_sources.clear();
        parameters.photon_scale.clear();
        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::NoDepositSources)
        ));
    }

    #[test]
    fn invalid_time_constants() {
        let mut parameters = parameters();
        parameters.fast_time_constant = -6.0;
        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::TimeConstant { name: "Fast", .. })
        ));

        let mut parameters = self::parameters();
        parameters.slow_rise_time = -2.0;
        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::RiseTime { name: "Slow", .. })
        ));
    }

    #[test]
    fn zero_rise_time_is_rejected() {
        let mut parameters = parameters();
        parameters.fast_rise_time = 0.0;
        let error = parameters.validate().expect_err("zero rise time");
        assert_eq!(
            error.to_string(),
            "Fast rise time must be positive or -1, got 0"
        );
    }

    #[test]
    fn invalid_ratio() {
        let mut parameters = parameters();
        if let Some(ratios) = parameters.species_yield_ratios.as_mut() {
            ratios.kaon = 1.2;
        }
        let error = parameters.validate().expect_err("kaon ratio out of range");
        assert_eq!(
            error.to_string(),
            "Yield ratio for kaon must lie in [0, 1], got 1.2"
        );
    }

    #[test]
    fn builders() {
        let parameters = ScintillationParameters::fast_only(6.0, 0.25)
            .with_slow_component(ScintillationComponent::new(1590.0, 1.0))
            .with_photon_scale(vec![2.0]);
        assert!(parameters.do_slow_component);
        assert_eq!(parameters.photon_scale(0), 2.0);
        assert_eq!(parameters.photon_scale(1), 1.0);
        assert_eq!(parameters.yield_table.fast_fraction(2212), 0.25);
    }
}
