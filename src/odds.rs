//! Closed-form 5-star odds along the pity counter

use crate::config::GachaKind;

/// Odds at one pull of a dry streak
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PityStep {
    /// 1-based pull number since the last 5-star
    pub pull: u32,
    /// 5-star chance on this pull given none before it
    pub rate: f64,
    /// Chance the next 5-star lands exactly on this pull
    pub probability: f64,
    /// Chance the next 5-star has landed by this pull
    pub cumulative: f64,
}

/// Per-category chances of a roll that is not forced by either pity:
/// `[5-star, 4-star character, 4-star light cone, 3-star]`.
///
/// The 4-star bands sit on top of the ramped 5-star rate, so late in soft
/// pity they are squeezed out and the 3-star band absorbs nothing.
pub fn category_odds(kind: GachaKind, pity5: u32) -> [f64; 4] {
    let profile = kind.profile();
    let five = profile.five_star_rate(pity5);
    let char_edge = (five + profile.rates.four_star_character).min(1.0);
    let cone_edge = (char_edge + profile.rates.four_star_light_cone).min(1.0);
    [five, char_edge - five, cone_edge - char_edge, 1.0 - cone_edge]
}

pub fn pity_curve(kind: GachaKind) -> Vec<PityStep> {
    let profile = kind.profile();
    let hard = profile.pity.hard_pity_5;
    let mut survival = 1.0;
    let mut cumulative = 0.0;

    (0..hard)
        .map(|pity5| {
            let rate = if pity5 == hard - 1 {
                1.0
            } else {
                profile.five_star_rate(pity5)
            };
            let probability = survival * rate;
            survival *= 1.0 - rate;
            cumulative += probability;
            PityStep {
                pull: pity5 + 1,
                rate,
                probability,
                cumulative,
            }
        })
        .collect()
}

pub fn expected_pulls_per_five_star(kind: GachaKind) -> f64 {
    pity_curve(kind)
        .iter()
        .map(|s| s.pull as f64 * s.probability)
        .sum()
}
