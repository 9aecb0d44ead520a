use crate::deposit::Position;
use photolib_common::{Channel, PhotonCount, Time};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Photon {
    pub time: Time,
    pub position: Position,
    pub energy: f64,
    /// Set when the photon was emitted inside a sensitive-volume sub-region.
    pub in_sensitive_volume: bool,
}

/// Photons collected by a single optical channel during one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPhotons {
    pub channel: Channel,
    pub photons: Vec<Photon>,
}

impl ChannelPhotons {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            photons: Vec::new(),
        }
    }

    /// Appends `count` copies of `photon`.
    pub(crate) fn push_copies(&mut self, count: PhotonCount, photon: Photon) {
        let count = count as usize;
        self.photons.reserve(count);
        self.photons.extend(std::iter::repeat_n(photon, count));
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }
}

/// One entry per channel, in channel index order.
pub type PhotonCollection = Vec<ChannelPhotons>;

pub(crate) fn empty_collection(num_channels: usize) -> PhotonCollection {
    (0..num_channels).map(ChannelPhotons::new).collect()
}
