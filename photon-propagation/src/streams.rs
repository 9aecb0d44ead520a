use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeds of the two random streams.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSeeds {
    pub time: u64,
    pub count: u64,
}

impl StreamSeeds {
    pub fn new(time: u64, count: u64) -> Self {
        Self { time, count }
    }

    /// A distinct seed pair for the event at `index`, for workers which
    /// each own their streams.
    pub fn for_event(&self, index: u64) -> Self {
        // splitmix64 increment
        let offset = index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self {
            time: self.time ^ offset,
            count: self.count ^ offset.rotate_left(32),
        }
    }
}

/// The two independent random streams consumed by the propagation driver.
/// The time stream is used only for emission times and the count stream only
/// for photon counts, so neither quantity perturbs the other's sequence.
#[derive(Debug, Clone)]
pub struct RandomStreams<R = StdRng> {
    pub(crate) time: R,
    pub(crate) count: R,
}

impl<R: Rng + SeedableRng> RandomStreams<R> {
    pub fn from_seeds(seeds: StreamSeeds) -> Self {
        Self {
            time: R::seed_from_u64(seeds.time),
            count: R::seed_from_u64(seeds.count),
        }
    }
}
