//! Monte Carlo propagation of scintillation light from energy deposits to
//! optical channels, using tabulated visibilities and particle dependent
//! light yields.
pub mod count;
pub mod deposit;
pub mod event_file;
pub mod library;
pub mod parameters;
pub mod photon;
pub mod propagation;
pub mod runner;
pub mod species;
pub mod streams;
pub mod summary;
pub mod timing;
pub mod visibility;
pub mod yield_calculator;
pub mod yield_table;

pub use deposit::{EnergyDeposit, Position};
pub use library::PhotonLibrary;
pub use parameters::{RunParameters, ScintillationParameters};
pub use photon::{ChannelPhotons, Photon, PhotonCollection};
pub use propagation::PhotonPropagator;
pub use runner::Runner;
pub use streams::{RandomStreams, StreamSeeds};
pub use visibility::VisibilityProvider;
pub use yield_calculator::{LinearYieldCalculator, ScintillationYield, YieldCalculator};
