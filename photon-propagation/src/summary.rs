use photolib_common::{
    PhotonCount,
    metrics::{
        deposits_skipped::{SkipReason, get_label},
        names::{
            DEPOSITS_PROCESSED, DEPOSITS_SKIPPED, EVENTS_PROCESSED, PHOTONS_EMITTED,
            TIMING_RETRIES_EXHAUSTED,
        },
    },
};
use serde::Serialize;
use std::ops::AddAssign;

/// Diagnostic counts accumulated by the propagation driver.
/// None of these feed back into the sampling.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunSummary {
    pub events: u64,
    pub deposits: u64,
    /// Deposits at positions the visibility provider has no data for.
    pub skipped_no_visibility: u64,
    /// Deposits whose visibility vector had the wrong number of channels.
    pub skipped_channel_mismatch: u64,
    /// Deposits with no scintillation light.
    pub zero_yield: u64,
    pub photons: PhotonCount,
    pub timing_retries_exhausted: u64,
}

impl RunSummary {
    pub fn skipped(&self) -> u64 {
        self.skipped_no_visibility + self.skipped_channel_mismatch
    }

    pub(crate) fn record_event(&mut self) {
        self.events += 1;
        metrics::counter!(EVENTS_PROCESSED).increment(1);
    }

    pub(crate) fn record_deposit(&mut self) {
        self.deposits += 1;
        metrics::counter!(DEPOSITS_PROCESSED).increment(1);
    }

    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoVisibility => self.skipped_no_visibility += 1,
            SkipReason::ChannelMismatch => self.skipped_channel_mismatch += 1,
            SkipReason::ZeroYield => self.zero_yield += 1,
        }
        metrics::counter!(DEPOSITS_SKIPPED, &[get_label(reason)]).increment(1);
    }

    pub(crate) fn record_photons(&mut self, photons: PhotonCount) {
        self.photons += photons;
        metrics::counter!(PHOTONS_EMITTED).increment(photons);
    }

    pub(crate) fn record_timing_exhausted(&mut self) {
        self.timing_retries_exhausted += 1;
        metrics::counter!(TIMING_RETRIES_EXHAUSTED).increment(1);
    }
}

impl AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.events += other.events;
        self.deposits += other.deposits;
        self.skipped_no_visibility += other.skipped_no_visibility;
        self.skipped_channel_mismatch += other.skipped_channel_mismatch;
        self.zero_yield += other.zero_yield;
        self.photons += other.photons;
        self.timing_retries_exhausted += other.timing_retries_exhausted;
    }
}
