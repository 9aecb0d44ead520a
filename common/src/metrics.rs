use metrics::{describe_counter, describe_gauge, gauge};

pub fn component_info_metric(name: &'static str) {
    static NAME: &str = "photon_library_component_info";

    describe_gauge!(NAME, "Basic information about the component");

    let git_rev = option_env!("GIT_VERSION").unwrap_or("unknown");
    gauge!(NAME, "component" => name, "git_version" => git_rev).set(1);
}

/// Registers descriptions for every counter the propagation engine emits.
pub fn describe_propagation_metrics() {
    describe_counter!(
        names::EVENTS_PROCESSED,
        metrics::Unit::Count,
        "Number of events propagated"
    );
    describe_counter!(
        names::DEPOSITS_PROCESSED,
        metrics::Unit::Count,
        "Number of energy deposits considered"
    );
    describe_counter!(
        names::DEPOSITS_SKIPPED,
        metrics::Unit::Count,
        "Number of energy deposits which produced no light"
    );
    describe_counter!(
        names::PHOTONS_EMITTED,
        metrics::Unit::Count,
        "Number of photons appended to channel collections"
    );
    describe_counter!(
        names::TIMING_RETRIES_EXHAUSTED,
        metrics::Unit::Count,
        "Number of emission time draws which hit the rejection retry limit"
    );
}

pub mod names {
    use const_format::concatcp;

    pub const METRIC_NAME_PREFIX: &str = "photon_library_";

    pub const EVENTS_PROCESSED: &str = concatcp!(METRIC_NAME_PREFIX, "events_processed");
    pub const DEPOSITS_PROCESSED: &str = concatcp!(METRIC_NAME_PREFIX, "deposits_processed");
    pub const DEPOSITS_SKIPPED: &str = concatcp!(METRIC_NAME_PREFIX, "deposits_skipped");
    pub const PHOTONS_EMITTED: &str = concatcp!(METRIC_NAME_PREFIX, "photons_emitted");
    pub const TIMING_RETRIES_EXHAUSTED: &str =
        concatcp!(METRIC_NAME_PREFIX, "timing_retries_exhausted");
}

pub mod deposits_skipped {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum SkipReason {
        NoVisibility,
        ChannelMismatch,
        ZeroYield,
    }

    // Label building function
    pub fn get_label(skip_reason: SkipReason) -> (&'static str, &'static str) {
        (
            "skip_reason",
            match skip_reason {
                SkipReason::NoVisibility => "no_visibility",
                SkipReason::ChannelMismatch => "channel_mismatch",
                SkipReason::ZeroYield => "zero_yield",
            },
        )
    }
}
