use crate::deposit::Position;
use photolib_common::Channel;
use tracing::warn;

/// Source of per-channel visibility fractions, built offline by an optical simulation.
pub trait VisibilityProvider {
    /// Number of optical channels in the detector. Fixed for the lifetime of the provider.
    fn channel_count(&self) -> usize;

    /// Per-channel visibilities at `position`, or `None` where the provider has no data.
    fn visibilities(&self, position: &Position) -> Option<&[f64]>;
}

impl<P: VisibilityProvider + ?Sized> VisibilityProvider for &P {
    fn channel_count(&self) -> usize {
        (**self).channel_count()
    }

    fn visibilities(&self, position: &Position) -> Option<&[f64]> {
        (**self).visibilities(position)
    }
}

/// Visibility fractions for every channel at one position.
#[derive(Debug, Clone, Copy)]
pub struct ChannelVisibilities<'a>(&'a [f64]);

impl<'a> ChannelVisibilities<'a> {
    pub fn get(&self, channel: Channel) -> f64 {
        self.0.get(channel).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + 'a {
        self.0.iter().copied().enumerate()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// The provider has no data for the position.
    NoData,
    /// The provider returned a vector of the wrong length.
    ChannelMismatch { expected: usize, found: usize },
}

/// Wraps a [VisibilityProvider], pinning the channel count at construction
/// so that every lookup it hands out has exactly that many entries.
pub struct VisibilityAdapter<'a, P: ?Sized> {
    provider: &'a P,
    channel_count: usize,
}

impl<'a, P: VisibilityProvider + ?Sized> VisibilityAdapter<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            channel_count: provider.channel_count(),
            provider,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn lookup(&self, position: &Position) -> Result<ChannelVisibilities<'a>, Unavailable> {
        let visibilities = self
            .provider
            .visibilities(position)
            .ok_or(Unavailable::NoData)?;
        if visibilities.len() != self.channel_count {
            warn!(
                "Visibility vector at {position:?} has {} entries, expected {}",
                visibilities.len(),
                self.channel_count
            );
            return Err(Unavailable::ChannelMismatch {
                expected: self.channel_count,
                found: visibilities.len(),
            });
        }
        Ok(ChannelVisibilities(visibilities))
    }
}
