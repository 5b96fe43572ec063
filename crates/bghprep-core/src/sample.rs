//! Uniform position sampling without replacement

use rand::Rng;

/// Clamp a requested sample size against the population.
///
/// Requests at or above the population take `population - 1` positions.
pub fn clamp_sample_size(population: usize, requested: usize) -> usize {
    if requested < population {
        requested
    } else {
        population.saturating_sub(1)
    }
}

/// Pick K distinct positions from `1..=population + 1`, sorted ascending.
///
/// K is [`clamp_sample_size`]. Every K-subset is equally likely.
pub fn select_positions<R: Rng + ?Sized>(
    rng: &mut R,
    population: usize,
    requested: usize,
) -> Vec<usize> {
    let amount = clamp_sample_size(population, requested);
    let mut positions: Vec<usize> = rand::seq::index::sample(rng, population + 1, amount)
        .into_iter()
        .map(|idx| idx + 1)
        .collect();
    positions.sort_unstable();
    positions
}
