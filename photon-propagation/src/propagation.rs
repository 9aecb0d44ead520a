use crate::{
    count::CountSampler,
    deposit::EnergyDeposit,
    parameters::ScintillationParameters,
    photon::{Photon, PhotonCollection, empty_collection},
    streams::RandomStreams,
    summary::RunSummary,
    timing::{ScintillationComponent, TimingSampler},
    visibility::{ChannelVisibilities, Unavailable, VisibilityAdapter, VisibilityProvider},
    yield_calculator::YieldCalculator,
};
use photolib_common::metrics::deposits_skipped::SkipReason;
use rand::{Rng, rngs::StdRng};
use tracing::{debug, trace};

/// Propagates scintillation light from energy deposits to optical channels.
///
/// The random streams persist across calls to [Self::propagate], so a run
/// seeded once gives the same sequence of events every time. Draws happen in
/// a fixed order: deposit source, deposit, fast emission time, fast counts in
/// channel order, then slow emission time and slow counts when enabled.
///
/// All photons of one deposit and component share a single emission time.
/// This keeps memory and draws per deposit bounded and is an approximation,
/// not a bug.
pub struct PhotonPropagator<'a, P: ?Sized, Y: ?Sized, R = StdRng> {
    parameters: &'a ScintillationParameters,
    visibility: VisibilityAdapter<'a, P>,
    yield_calculator: &'a Y,
    streams: RandomStreams<R>,
    timing: TimingSampler,
    counts: CountSampler,
    summary: RunSummary,
}

impl<'a, P, Y, R> PhotonPropagator<'a, P, Y, R>
where
    P: VisibilityProvider + ?Sized,
    Y: YieldCalculator + ?Sized,
    R: Rng,
{
    pub fn new(
        parameters: &'a ScintillationParameters,
        visibility: &'a P,
        yield_calculator: &'a Y,
        streams: RandomStreams<R>,
    ) -> Self {
        let visibility = VisibilityAdapter::new(visibility);
        debug!(
            "Creating photon propagator for {} channels",
            visibility.channel_count()
        );
        Self {
            parameters,
            visibility,
            yield_calculator,
            streams,
            timing: TimingSampler::new(parameters.max_timing_retries),
            counts: CountSampler,
            summary: RunSummary::default(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.visibility.channel_count()
    }

    /// Diagnostic counts accumulated over every event propagated so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Propagates one event. `sources` are processed in order, each scaled by
    /// its configured photon scale factor.
    #[tracing::instrument(skip_all, fields(num_sources = sources.len(), num_channels = self.channel_count()))]
    pub fn propagate<S: AsRef<[EnergyDeposit]>>(&mut self, sources: &[S]) -> PhotonCollection {
        let mut collection = empty_collection(self.channel_count());
        for (source_index, deposits) in sources.iter().enumerate() {
            let scale_factor = self.parameters.photon_scale(source_index);
            let deposits = deposits.as_ref();
            debug!(
                "Source {source_index}: {} deposits, scale factor {scale_factor}",
                deposits.len()
            );
            for deposit in deposits {
                self.propagate_deposit(&mut collection, deposit, scale_factor);
            }
        }
        self.summary.record_event();
        collection
    }

    fn propagate_deposit(
        &mut self,
        collection: &mut PhotonCollection,
        deposit: &EnergyDeposit,
        scale_factor: f64,
    ) {
        self.summary.record_deposit();

        let visibilities = match self.visibility.lookup(&deposit.position) {
            Ok(visibilities) => visibilities,
            Err(unavailable) => {
                trace!("No visibility at {:?}, skipping deposit", deposit.position);
                self.summary.record_skip(match unavailable {
                    Unavailable::NoData => SkipReason::NoVisibility,
                    Unavailable::ChannelMismatch { .. } => SkipReason::ChannelMismatch,
                });
                return;
            }
        };

        let light = self.yield_calculator.compute(deposit);
        if light.num_photons <= 0.0 {
            self.summary.record_skip(SkipReason::ZeroYield);
        }
        let fast_fraction = self.parameters.yield_table.fast_fraction(light.pdg_code);
        let fast_total = fast_fraction * light.num_photons;
        let slow_total = light.num_photons - fast_total;
        trace!(
            "Deposit of {} MeV at {:?}: {} photons, {fast_total} fast",
            deposit.energy, deposit.position, light.num_photons
        );

        let fast = self.parameters.fast;
        self.emit_component(collection, deposit, &fast, fast_total, scale_factor, visibilities);

        if self.parameters.do_slow_component && slow_total > 0.0 {
            let slow = self.parameters.slow;
            self.emit_component(collection, deposit, &slow, slow_total, scale_factor, visibilities);
        }
    }

    /// Draws one emission time for the component, then a photon count for
    /// every channel, appending that many photons with the shared time.
    /// The count mean is `total * visibility * scale_factor`, in that order.
    fn emit_component(
        &mut self,
        collection: &mut PhotonCollection,
        deposit: &EnergyDeposit,
        component: &ScintillationComponent,
        total: f64,
        scale_factor: f64,
        visibilities: ChannelVisibilities<'_>,
    ) {
        let draw = self.timing.sample(&mut self.streams.time, component);
        if draw.is_exhausted() {
            self.summary.record_timing_exhausted();
        }
        let photon = Photon {
            time: deposit.time + draw.offset(),
            position: deposit.position,
            energy: self.parameters.photon_energy,
            in_sensitive_volume: false,
        };

        let mut emitted = 0;
        for (channel_photons, (_, visibility)) in collection.iter_mut().zip(visibilities.iter()) {
            let count = self
                .counts
                .sample(&mut self.streams.count, total * visibility * scale_factor);
            channel_photons.push_copies(count, photon);
            emitted += count;
        }
        self.summary.record_photons(emitted);
    }
}
