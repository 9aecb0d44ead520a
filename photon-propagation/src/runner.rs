use crate::{
    event_file::{EventOutput, EventSources},
    parameters::ScintillationParameters,
    propagation::PhotonPropagator,
    streams::{RandomStreams, StreamSeeds},
    summary::RunSummary,
    visibility::VisibilityProvider,
    yield_calculator::YieldCalculator,
};
use rand::rngs::StdRng;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::info_span;

/// Propagates a whole run of events with one set of collaborators.
pub struct Runner<'a, P: ?Sized, Y: ?Sized> {
    parameters: &'a ScintillationParameters,
    visibility: &'a P,
    yield_calculator: &'a Y,
    seeds: StreamSeeds,
    full_photons: bool,
}

impl<'a, P, Y> Runner<'a, P, Y>
where
    P: VisibilityProvider + Sync + ?Sized,
    Y: YieldCalculator + Sync + ?Sized,
{
    pub fn new(
        parameters: &'a ScintillationParameters,
        visibility: &'a P,
        yield_calculator: &'a Y,
        seeds: StreamSeeds,
    ) -> Self {
        Self {
            parameters,
            visibility,
            yield_calculator,
            seeds,
            full_photons: false,
        }
    }

    /// Keep every photon in the output, not only per-channel counts.
    pub fn with_full_photons(mut self, full_photons: bool) -> Self {
        self.full_photons = full_photons;
        self
    }

    fn propagator(&self, seeds: StreamSeeds) -> PhotonPropagator<'a, P, Y> {
        PhotonPropagator::new(
            self.parameters,
            self.visibility,
            self.yield_calculator,
            RandomStreams::<StdRng>::from_seeds(seeds),
        )
    }

    /// One stream pair shared by every event, advancing from event to event.
    pub fn sequential(&self, events: &[EventSources]) -> (Vec<EventOutput>, RunSummary) {
        let mut propagator = self.propagator(self.seeds);
        let outputs = events
            .iter()
            .map(|(event, sources)| {
                let collection =
                    info_span!("Event", event).in_scope(|| propagator.propagate(sources));
                EventOutput::new(*event, collection, self.full_photons)
            })
            .collect();
        (outputs, *propagator.summary())
    }

    /// One stream pair per event, seeded from the event number, so the
    /// results do not depend on which worker handles which event.
    pub fn parallel(&self, events: &[EventSources]) -> (Vec<EventOutput>, RunSummary) {
        let results = events
            .par_iter()
            .map(|(event, sources)| {
                let mut propagator = self.propagator(self.seeds.for_event(*event));
                let collection =
                    info_span!("Event", event).in_scope(|| propagator.propagate(sources));
                (
                    EventOutput::new(*event, collection, self.full_photons),
                    *propagator.summary(),
                )
            })
            .collect::<Vec<_>>();

        let mut summary = RunSummary::default();
        let outputs = results
            .into_iter()
            .map(|(output, event_summary)| {
                summary += event_summary;
                output
            })
            .collect();
        (outputs, summary)
    }
}
