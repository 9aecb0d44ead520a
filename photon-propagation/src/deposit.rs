use photolib_common::{PdgCode, Time, TrackId};
use serde::{Deserialize, Serialize};

/// A point in detector coordinates, in cm.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A discretised unit of energy left by a particle at a point in space and time.
/// Produced upstream and only ever read here.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnergyDeposit {
    pub position: Position,
    /// Deposit time, in ns.
    pub time: Time,
    /// Deposited energy, in MeV.
    pub energy: f64,
    pub pdg_code: PdgCode,
    #[serde(default)]
    pub track_id: TrackId,
}
