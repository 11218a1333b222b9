/// The stochastic steps of an experiment row that draw from a row seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stream {
    Functions,
    Distributions,
    Sampling,
}

impl Stream {
    const fn salt(self) -> u64 {
        match self {
            Self::Functions => 0x243F_6A88_85A3_08D3,
            Self::Distributions => 0x1319_8A2E_0370_7344,
            Self::Sampling => 0xA409_3822_299F_31D0,
        }
    }
}

/// SplitMix64 finaliser.
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Build the generator of one stochastic step of an experiment row.
///
/// Steps sharing a row seed get decorrelated streams.
#[inline]
pub(crate) fn seeded(seed: u64, stream: Stream) -> fastrand::Rng {
    fastrand::Rng::with_seed(mix(seed ^ stream.salt()))
}

/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Draw `n` items from `catalog` with replacement.
pub(crate) fn choose_with_replacement<T: Copy>(
    rng: &mut fastrand::Rng,
    catalog: &[T],
    n: usize,
) -> Vec<T> {
    (0..n).map(|_| catalog[rng.usize(0..catalog.len())]).collect()
}
