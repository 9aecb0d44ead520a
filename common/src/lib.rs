pub mod metrics;
pub mod tracer;

/// Index of an optical channel.
pub type Channel = usize;
/// Times are in nanoseconds.
pub type Time = f64;
pub type PdgCode = i32;
pub type TrackId = i32;
pub type PhotonCount = u64;

/// Energy in MeV assigned to every scintillation photon.
pub const DEFAULT_PHOTON_ENERGY: f64 = 9.7e-6;

/// Rise time value which switches a scintillation component to pure exponential decay.
pub const NO_RISE_TIME: f64 = -1.0;
