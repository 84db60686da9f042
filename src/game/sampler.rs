//! Weighted sampling without replacement

use rand::Rng;

/// Pick up to `count` distinct items, each draw proportional to weight.
///
/// Non-positive weights are never hit by a random draw. When every remaining
/// weight is zero the first remaining item is taken so the draw still makes
/// progress. Returns fewer than `count` items only when the pool runs out.
pub fn sample<T, R: Rng + ?Sized>(rng: &mut R, pool: Vec<(T, f64)>, count: usize) -> Vec<T> {
    let mut pool = pool;
    let mut picked = Vec::with_capacity(count.min(pool.len()));

    while picked.len() < count && !pool.is_empty() {
        let index = draw_index(rng, &pool);
        let (item, _) = pool.remove(index);
        picked.push(item);
    }

    picked
}

fn draw_index<T, R: Rng + ?Sized>(rng: &mut R, pool: &[(T, f64)]) -> usize {
    let total: f64 = pool.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return 0;
    }

    let target = rng.gen_range(0.0..=total);
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (index, (_, weight)) in pool.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = index;
        if cumulative >= target {
            return index;
        }
    }

    // Float rounding can leave the sum a hair short of `target`
    last_positive
}
