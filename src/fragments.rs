//! Fragment income from pulls and the fragment-for-ticket exchange

use crate::config::FRAGMENTS_PER_TICKET;
use crate::pull::ItemOutcome;

pub const PICKUP_CHARACTER_DUPLICATE: u32 = 40;
pub const OTHER_CHARACTER_COPY: u32 = 40;
pub const CHARACTER_EIGHTH_COPY_ON: u32 = 100;
pub const FOUR_STAR_CHARACTER: u32 = 20;
pub const FIVE_STAR_LIGHT_CONE: u32 = 40;
pub const FOUR_STAR_LIGHT_CONE: u32 = 8;

/// Fragments granted for `outcome`.
///
/// `pickup_count` and `other_count` are the 5-star character copies owned
/// *including* this draw. Light cone banner draws pass zero for both.
pub fn value_of(outcome: ItemOutcome, pickup_count: u32, other_count: u32) -> u32 {
    match outcome {
        ItemOutcome::PickupFiveStarCharacter => match pickup_count {
            2..=7 => PICKUP_CHARACTER_DUPLICATE,
            8.. => CHARACTER_EIGHTH_COPY_ON,
            _ => 0,
        },
        ItemOutcome::OtherFiveStarCharacter => match other_count {
            1..=7 => OTHER_CHARACTER_COPY,
            8.. => CHARACTER_EIGHTH_COPY_ON,
            _ => 0,
        },
        ItemOutcome::PickupFourStarCharacter => FOUR_STAR_CHARACTER,
        ItemOutcome::PickupFiveStarLightCone | ItemOutcome::OtherFiveStarLightCone => {
            FIVE_STAR_LIGHT_CONE
        }
        ItemOutcome::PickupFourStarLightCone => FOUR_STAR_LIGHT_CONE,
        ItemOutcome::ThreeStar => 0,
    }
}

/// Per-trial fragment and copy counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FragmentState {
    /// Unexchanged fragments, always below `FRAGMENTS_PER_TICKET` after `exchange`
    pub balance: u32,
    pub pickup_characters: u32,
    pub other_characters: u32,
    /// Tickets earned through exchange this trial
    pub tickets_earned: u32,
}

impl FragmentState {
    /// Count a character banner draw and bank its fragments
    pub fn record_character(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::PickupFiveStarCharacter => self.pickup_characters += 1,
            ItemOutcome::OtherFiveStarCharacter => self.other_characters += 1,
            _ => {}
        }
        self.balance += value_of(outcome, self.pickup_characters, self.other_characters);
    }

    /// Bank a light cone banner draw. Character copy counts are not consulted.
    pub fn record_light_cone(&mut self, outcome: ItemOutcome) {
        self.balance += value_of(outcome, 0, 0);
    }

    /// Convert whole batches of fragments into tickets; returns the tickets
    /// minted by this call.
    pub fn exchange(&mut self) -> u32 {
        let minted = self.balance / FRAGMENTS_PER_TICKET;
        self.balance %= FRAGMENTS_PER_TICKET;
        self.tickets_earned += minted;
        minted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_character_tiers() {
        let v = |n| value_of(ItemOutcome::PickupFiveStarCharacter, n, 0);
        assert_eq!(v(1), 0);
        assert_eq!(v(2), 40);
        assert_eq!(v(7), 40);
        assert_eq!(v(8), 100);
        assert_eq!(v(20), 100);
    }

    #[test]
    fn other_character_tiers_shift_by_one() {
        let v = |n| value_of(ItemOutcome::OtherFiveStarCharacter, 0, n);
        assert_eq!(v(0), 0);
        assert_eq!(v(1), 40);
        assert_eq!(v(7), 40);
        assert_eq!(v(8), 100);
    }

    #[test]
    fn fixed_values() {
        assert_eq!(value_of(ItemOutcome::PickupFourStarCharacter, 0, 0), 20);
        assert_eq!(value_of(ItemOutcome::PickupFourStarLightCone, 0, 0), 8);
        assert_eq!(value_of(ItemOutcome::PickupFiveStarLightCone, 0, 0), 40);
        assert_eq!(value_of(ItemOutcome::OtherFiveStarLightCone, 3, 3), 40);
        assert_eq!(value_of(ItemOutcome::ThreeStar, 9, 9), 0);
    }

    #[test]
    fn first_pickup_copy_is_free_of_fragments() {
        let mut ledger = FragmentState::default();
        ledger.record_character(ItemOutcome::PickupFiveStarCharacter);
        assert_eq!(ledger.pickup_characters, 1);
        assert_eq!(ledger.balance, 0);

        ledger.record_character(ItemOutcome::PickupFiveStarCharacter);
        assert_eq!(ledger.balance, 40);

        ledger.record_character(ItemOutcome::OtherFiveStarCharacter);
        assert_eq!(ledger.other_characters, 1);
        assert_eq!(ledger.balance, 80);
    }

    #[test]
    fn exchange_mints_whole_tickets_and_keeps_remainder() {
        let mut ledger = FragmentState::default();
        ledger.record_light_cone(ItemOutcome::PickupFiveStarLightCone);
        ledger.record_light_cone(ItemOutcome::PickupFourStarLightCone);
        assert_eq!(ledger.balance, 48);

        assert_eq!(ledger.exchange(), 2);
        assert_eq!(ledger.balance, 8);
        assert_eq!(ledger.tickets_earned, 2);

        assert_eq!(ledger.exchange(), 0);
        ledger.record_character(ItemOutcome::PickupFourStarCharacter);
        assert_eq!(ledger.exchange(), 1);
        assert_eq!(ledger.balance, 8);
        assert_eq!(ledger.tickets_earned, 3);
    }

    #[test]
    fn light_cone_banner_never_touches_character_counts() {
        let mut ledger = FragmentState::default();
        ledger.record_light_cone(ItemOutcome::PickupFourStarCharacter);
        ledger.record_light_cone(ItemOutcome::OtherFiveStarLightCone);
        assert_eq!(ledger.pickup_characters, 0);
        assert_eq!(ledger.other_characters, 0);
        assert_eq!(ledger.balance, 60);
    }
}
