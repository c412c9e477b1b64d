//! Single-pull engine: pity state in, item and next pity state out

use crate::config::{BannerProfile, GachaKind};
use crate::rng::RandomSource;

/// Outcome of one pull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    PickupFiveStarCharacter,
    OtherFiveStarCharacter,
    PickupFiveStarLightCone,
    OtherFiveStarLightCone,
    PickupFourStarCharacter,
    PickupFourStarLightCone,
    ThreeStar,
}

impl ItemOutcome {
    pub fn is_five_star(self) -> bool {
        matches!(
            self,
            ItemOutcome::PickupFiveStarCharacter
                | ItemOutcome::OtherFiveStarCharacter
                | ItemOutcome::PickupFiveStarLightCone
                | ItemOutcome::OtherFiveStarLightCone
        )
    }

    pub fn is_four_star(self) -> bool {
        matches!(
            self,
            ItemOutcome::PickupFourStarCharacter | ItemOutcome::PickupFourStarLightCone
        )
    }

    /// True for the featured 5-star of either banner
    pub fn is_five_star_pickup(self) -> bool {
        matches!(
            self,
            ItemOutcome::PickupFiveStarCharacter | ItemOutcome::PickupFiveStarLightCone
        )
    }

    fn five_star(kind: GachaKind, pickup: bool) -> Self {
        match (kind, pickup) {
            (GachaKind::Character, true) => ItemOutcome::PickupFiveStarCharacter,
            (GachaKind::Character, false) => ItemOutcome::OtherFiveStarCharacter,
            (GachaKind::LightCone, true) => ItemOutcome::PickupFiveStarLightCone,
            (GachaKind::LightCone, false) => ItemOutcome::OtherFiveStarLightCone,
        }
    }
}

/// Pity counters of one banner within one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PullState {
    /// Pulls since the last 5-star
    pub pity5: u32,
    /// Pulls since the last 4-star-or-better
    pub pity4: u32,
    /// Next 5-star is forced to be the pickup
    pub guaranteed_pickup: bool,
}

impl PullState {
    pub fn new(pity5: u32, guaranteed_pickup: bool) -> Self {
        Self {
            pity5,
            pity4: 0,
            guaranteed_pickup,
        }
    }
}

/// Draw one item from `kind`'s banner.
pub fn draw<R: RandomSource>(kind: GachaKind, state: PullState, rng: &mut R) -> (ItemOutcome, PullState) {
    draw_from(kind.profile(), state, rng)
}

/// Draw one item using an explicit banner profile.
///
/// Consumes one uniform draw for rarity, plus one for pickup-vs-other on a
/// 5-star unless the guarantee is already held. A hard-pity 5-star skips the
/// rarity draw.
pub fn draw_from<R: RandomSource>(
    profile: &BannerProfile,
    state: PullState,
    rng: &mut R,
) -> (ItemOutcome, PullState) {
    let pity = &profile.pity;

    if state.pity5 >= pity.hard_pity_5 - 1 {
        return five_star(profile, state, rng);
    }

    let rate5 = profile.five_star_rate(state.pity5);
    let r = rng.next_f64();
    if r < rate5 {
        return five_star(profile, state, rng);
    }

    let rates = &profile.rates;
    let after_four = PullState {
        pity5: state.pity5 + 1,
        pity4: 0,
        guaranteed_pickup: state.guaranteed_pickup,
    };

    if state.pity4 >= pity.hard_pity_4 - 1 {
        // 5-star ruled out: spread what is left over the two 4-star pickups
        let remaining = 1.0 - rate5;
        let total4 = rates.four_star_total();
        let char_share = if total4 > 0.0 {
            remaining * (rates.four_star_character / total4)
        } else {
            remaining / 2.0
        };
        let outcome = if r < rate5 + char_share {
            ItemOutcome::PickupFourStarCharacter
        } else {
            ItemOutcome::PickupFourStarLightCone
        };
        return (outcome, after_four);
    }

    let char_edge = rate5 + rates.four_star_character;
    if r < char_edge {
        return (ItemOutcome::PickupFourStarCharacter, after_four);
    }
    if r < char_edge + rates.four_star_light_cone {
        return (ItemOutcome::PickupFourStarLightCone, after_four);
    }

    let next = PullState {
        pity5: state.pity5 + 1,
        pity4: state.pity4 + 1,
        guaranteed_pickup: state.guaranteed_pickup,
    };
    (ItemOutcome::ThreeStar, next)
}

/// Resolve pickup vs. other for a 5-star and reset 5-star pity.
#[inline(always)]
fn five_star<R: RandomSource>(
    profile: &BannerProfile,
    state: PullState,
    rng: &mut R,
) -> (ItemOutcome, PullState) {
    // The guarantee short-circuits the split roll
    let pickup = state.guaranteed_pickup || rng.next_f64() < profile.pickup_split;
    let next = PullState {
        pity5: 0,
        // A pending 4-star guarantee carries over to the next pull
        pity4: (state.pity4 + 1).min(profile.pity.hard_pity_4 - 1),
        guaranteed_pickup: !pickup,
    };
    (ItemOutcome::five_star(profile.kind, pickup), next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHARACTER_BANNER, LIGHT_CONE_BANNER};
    use crate::rng::ScriptedRng;

    #[test]
    fn hard_pity_forces_five_star_without_rarity_roll() {
        let state = PullState::new(89, false);
        // 0.3 < 0.5 split, so pickup on the only draw consumed
        let mut rng = ScriptedRng::new(&[0.3]);
        let (item, next) = draw(GachaKind::Character, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFiveStarCharacter);
        assert_eq!(rng.consumed(), 1);
        assert_eq!(next, PullState { pity5: 0, pity4: 1, guaranteed_pickup: false });
    }

    #[test]
    fn guaranteed_hard_pity_consumes_no_draws() {
        let state = PullState::new(79, true);
        let mut rng = ScriptedRng::new(&[0.99]);
        let (item, next) = draw(GachaKind::LightCone, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFiveStarLightCone);
        assert_eq!(rng.consumed(), 0);
        assert!(!next.guaranteed_pickup);
    }

    #[test]
    fn lost_split_sets_guarantee() {
        let state = PullState::new(0, false);
        // rarity roll hits the 0.6% band, split roll 0.7 >= 0.5 loses
        let mut rng = ScriptedRng::new(&[0.001, 0.7]);
        let (item, next) = draw(GachaKind::Character, state, &mut rng);
        assert_eq!(item, ItemOutcome::OtherFiveStarCharacter);
        assert!(next.guaranteed_pickup);
        assert_eq!(rng.consumed(), 2);

        // The following 5-star is the pickup whatever the split roll says
        let mut rng = ScriptedRng::new(&[0.001, 0.99]);
        let (item, next) = draw(GachaKind::Character, next, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFiveStarCharacter);
        assert!(!next.guaranteed_pickup);
        assert_eq!(rng.consumed(), 1);
    }

    #[test]
    fn light_cone_split_is_three_quarters() {
        let state = PullState::new(0, false);
        let mut rng = ScriptedRng::new(&[0.0, 0.74]);
        let (item, _) = draw(GachaKind::LightCone, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFiveStarLightCone);

        let mut rng = ScriptedRng::new(&[0.0, 0.75]);
        let (item, _) = draw(GachaKind::LightCone, state, &mut rng);
        assert_eq!(item, ItemOutcome::OtherFiveStarLightCone);
    }

    #[test]
    fn soft_pity_raises_five_star_odds() {
        // At pity 80 the character rate is 0.006 + 8 * 0.06 = 0.486
        let state = PullState::new(80, false);
        let mut rng = ScriptedRng::new(&[0.48, 0.1]);
        let (item, _) = draw(GachaKind::Character, state, &mut rng);
        assert!(item.is_five_star());

        // Same roll at base rate is a 3-star
        let state = PullState::new(10, false);
        let mut rng = ScriptedRng::new(&[0.48]);
        let (item, next) = draw(GachaKind::Character, state, &mut rng);
        assert_eq!(item, ItemOutcome::ThreeStar);
        assert_eq!(next, PullState { pity5: 11, pity4: 1, guaranteed_pickup: false });
    }

    #[test]
    fn normal_roll_bands() {
        let state = PullState::new(0, false);
        let cases = [
            (0.006, ItemOutcome::PickupFourStarCharacter),
            (0.0314, ItemOutcome::PickupFourStarCharacter),
            (0.0316, ItemOutcome::PickupFourStarLightCone),
            (0.0569, ItemOutcome::PickupFourStarLightCone),
            (0.0571, ItemOutcome::ThreeStar),
        ];
        for (roll, expected) in cases {
            let mut rng = ScriptedRng::new(&[roll]);
            let (item, next) = draw(GachaKind::Character, state, &mut rng);
            assert_eq!(item, expected, "roll {}", roll);
            assert_eq!(rng.consumed(), 1);
            if item.is_four_star() {
                assert_eq!(next.pity4, 0);
            }
            assert_eq!(next.pity5, 1);
        }
    }

    #[test]
    fn four_star_pity_splits_residual_mass() {
        let state = PullState { pity5: 5, pity4: 9, guaranteed_pickup: false };
        // residual 0.994 split evenly: character below 0.006 + 0.497
        let mut rng = ScriptedRng::new(&[0.5]);
        let (item, next) = draw(GachaKind::Character, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFourStarCharacter);
        assert_eq!(next, PullState { pity5: 6, pity4: 0, guaranteed_pickup: false });

        let mut rng = ScriptedRng::new(&[0.504]);
        let (item, _) = draw(GachaKind::Character, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFourStarLightCone);
    }

    #[test]
    fn four_star_pity_with_zero_rates_splits_evenly() {
        let mut profile = LIGHT_CONE_BANNER;
        profile.rates.four_star_character = 0.0;
        profile.rates.four_star_light_cone = 0.0;
        profile.rates.three_star = 0.992;
        let state = PullState { pity5: 0, pity4: 9, guaranteed_pickup: false };

        let mut rng = ScriptedRng::new(&[0.5]);
        let (item, _) = draw_from(&profile, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFourStarCharacter);

        let mut rng = ScriptedRng::new(&[0.505]);
        let (item, _) = draw_from(&profile, state, &mut rng);
        assert_eq!(item, ItemOutcome::PickupFourStarLightCone);
    }

    #[test]
    fn five_star_keeps_pending_four_star_pity() {
        let state = PullState { pity5: 89, pity4: 9, guaranteed_pickup: true };
        let mut rng = ScriptedRng::new(&[0.99]);
        let (_, next) = draw_from(&CHARACTER_BANNER, state, &mut rng);
        assert_eq!(next.pity4, 9);

        // So the next pull is at least a 4-star
        let (item, _) = draw_from(&CHARACTER_BANNER, next, &mut rng);
        assert!(item.is_four_star());
    }

    #[test]
    fn full_dry_streak_ends_in_five_star() {
        for kind in GachaKind::ALL {
            let threshold = kind.profile().pity.hard_pity_5;
            // 0.999999 never rolls a 5-star before soft pity kicks the rate to 1.0
            let mut rng = ScriptedRng::new(&[0.999_999]);
            let mut state = PullState::default();
            let mut five_stars = 0;
            for pull in 1..=threshold {
                let (item, next) = draw(kind, state, &mut rng);
                if item.is_five_star() {
                    five_stars += 1;
                    assert_eq!(pull, threshold, "{:?} hit early at {}", kind, pull);
                }
                state = next;
            }
            assert_eq!(five_stars, 1);
        }
    }
}
