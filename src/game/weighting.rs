//! Distance-based pad weights for correct-pad sampling

use super::ports::{Pad, Position};

/// Extra distance allowed above the mean before a pad's weight stops growing
pub const DISTANCE_CAP_MARGIN: f64 = 12.0;

/// Weight per pad, in the same order as `pads`.
///
/// Pads far from every active player are favored, capped at the mean
/// distance plus [`DISTANCE_CAP_MARGIN`]. Every weight is at least 1. With no
/// player positions all distances are infinite, the mean is 0, and every pad
/// ends up with the same weight.
pub fn pad_weights(pads: &[Pad], players: &[Position]) -> Vec<f64> {
    let distances: Vec<f64> = pads
        .iter()
        .map(|pad| nearest_distance(&pad.position, players))
        .collect();

    let finite: Vec<f64> = distances.iter().copied().filter(|d| d.is_finite()).collect();
    let average = if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    };
    let cap = average + DISTANCE_CAP_MARGIN;

    distances.into_iter().map(|d| d.min(cap) + 1.0).collect()
}

fn nearest_distance(pad: &Position, players: &[Position]) -> f64 {
    players
        .iter()
        .map(|player| pad.distance(player))
        .fold(f64::INFINITY, f64::min)
}
