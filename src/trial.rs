//! Single-trial drivers.
//!
//! A trial pulls on every active banner once per iteration until all pickup
//! targets are met. The budgeted driver pays for each iteration from the
//! starting tickets and currency and stops when both are gone; the unbounded
//! driver never runs dry and only measures how much it would have spent.
//! Both stop after `ITERATION_CAP` iterations.

use crate::config::{GachaKind, SimRequest, COST_PER_PULL, ITERATION_CAP};
use crate::fragments::FragmentState;
use crate::pull::{draw, PullState};
use crate::rng::RandomSource;
use serde::Serialize;

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrialEnd {
    GoalMet,
    /// Neither tickets nor enough currency for another pull
    Exhausted,
    /// Hit `ITERATION_CAP` before meeting the goal
    Capped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialResult {
    pub end: TrialEnd,
    /// Loop iterations, each paying for one pull on every unfinished banner
    pub pulls: u32,
    /// Tickets minted from fragments
    pub exchange_tickets: u32,
    /// Budgeted: currency actually spent.
    /// Unbounded: currency spent minus the currency value of exchange tickets.
    pub currency_consumed: i64,
}

impl TrialResult {
    pub fn succeeded(&self) -> bool {
        self.end == TrialEnd::GoalMet
    }
}

#[derive(Debug, Clone, Copy)]
struct Banner {
    kind: GachaKind,
    target: u32,
    obtained: u32,
    state: PullState,
}

/// Pull and fragment state of one trial, shared by both drivers
#[derive(Debug, Clone)]
pub struct TrialState {
    character: Option<Banner>,
    light_cone: Option<Banner>,
    ledger: FragmentState,
}

impl TrialState {
    /// Fresh state for `request`; the carried-over pity and guarantee go to
    /// the character banner when active, otherwise to the light cone banner.
    pub fn new(request: &SimRequest) -> Self {
        let carry = request.carry_over_kind();
        let banner = |kind: GachaKind| {
            let target = request.target(kind);
            (target > 0).then(|| {
                let state = if carry == Some(kind) {
                    PullState::new(request.initial_pity5, request.initial_guaranteed_pickup)
                } else {
                    PullState::default()
                };
                Banner {
                    kind,
                    target,
                    obtained: 0,
                    state,
                }
            })
        };
        Self {
            character: banner(GachaKind::Character),
            light_cone: banner(GachaKind::LightCone),
            ledger: FragmentState::default(),
        }
    }

    /// One iteration: pull on each unfinished banner, bank fragments and
    /// exchange them. Returns the tickets minted.
    pub fn step<R: RandomSource>(&mut self, rng: &mut R) -> u32 {
        if let Some(banner) = self.character.as_mut().filter(|b| b.obtained < b.target) {
            let (item, next) = draw(banner.kind, banner.state, rng);
            banner.state = next;
            if item.is_five_star_pickup() {
                banner.obtained += 1;
            }
            self.ledger.record_character(item);
        }
        if let Some(banner) = self.light_cone.as_mut().filter(|b| b.obtained < b.target) {
            let (item, next) = draw(banner.kind, banner.state, rng);
            banner.state = next;
            if item.is_five_star_pickup() {
                banner.obtained += 1;
            }
            self.ledger.record_light_cone(item);
        }
        self.ledger.exchange()
    }

    pub fn goal_met(&self) -> bool {
        [self.character, self.light_cone]
            .iter()
            .flatten()
            .all(|b| b.obtained >= b.target)
    }

    /// Pickup 5-stars obtained so far on `kind`'s banner
    pub fn obtained(&self, kind: GachaKind) -> u32 {
        let banner = match kind {
            GachaKind::Character => self.character,
            GachaKind::LightCone => self.light_cone,
        };
        banner.map_or(0, |b| b.obtained)
    }

    pub fn pity(&self, kind: GachaKind) -> Option<PullState> {
        match kind {
            GachaKind::Character => self.character.map(|b| b.state),
            GachaKind::LightCone => self.light_cone.map(|b| b.state),
        }
    }

    pub fn exchange_tickets(&self) -> u32 {
        self.ledger.tickets_earned
    }
}

/// Resource policy of a driver
pub trait Funding {
    /// Pay for one iteration; false when nothing is left to pay with
    fn pay(&mut self) -> bool;

    /// Exchange tickets minted during the last iteration
    fn credit(&mut self, tickets: u32);

    fn currency_consumed(&self, exchange_tickets: u32) -> i64;
}

/// Finite starting currency and tickets. Tickets are spent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub currency: u64,
    pub tickets: u64,
    spent: u64,
}

impl Budget {
    pub fn new(currency: u64, tickets: u64) -> Self {
        Self {
            currency,
            tickets,
            spent: 0,
        }
    }
}

impl Funding for Budget {
    #[inline(always)]
    fn pay(&mut self) -> bool {
        if self.tickets > 0 {
            self.tickets -= 1;
            true
        } else if self.currency >= COST_PER_PULL {
            self.currency -= COST_PER_PULL;
            self.spent += COST_PER_PULL;
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn credit(&mut self, tickets: u32) {
        self.tickets += tickets as u64;
    }

    fn currency_consumed(&self, _exchange_tickets: u32) -> i64 {
        self.spent as i64
    }
}

/// Every iteration is paid in currency. Exchange tickets are not spent; they
/// are deducted from the total at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unlimited {
    spent: u64,
}

impl Funding for Unlimited {
    #[inline(always)]
    fn pay(&mut self) -> bool {
        self.spent += COST_PER_PULL;
        true
    }

    #[inline(always)]
    fn credit(&mut self, _tickets: u32) {}

    fn currency_consumed(&self, exchange_tickets: u32) -> i64 {
        self.spent as i64 - exchange_tickets as i64 * COST_PER_PULL as i64
    }
}

/// Run one trial to termination under `funding`
pub fn drive<F: Funding, R: RandomSource>(
    request: &SimRequest,
    funding: &mut F,
    rng: &mut R,
) -> TrialResult {
    let mut trial = TrialState::new(request);
    let mut pulls = 0u32;

    let end = loop {
        if !funding.pay() {
            break TrialEnd::Exhausted;
        }
        pulls += 1;

        let minted = trial.step(rng);
        funding.credit(minted);

        if trial.goal_met() {
            break TrialEnd::GoalMet;
        }
        if pulls >= ITERATION_CAP {
            break TrialEnd::Capped;
        }
    };

    let exchange_tickets = trial.exchange_tickets();
    TrialResult {
        end,
        pulls,
        exchange_tickets,
        currency_consumed: funding.currency_consumed(exchange_tickets),
    }
}

/// Trial limited by the request's starting currency and tickets
pub fn run_budgeted<R: RandomSource>(request: &SimRequest, rng: &mut R) -> TrialResult {
    let mut budget = Budget::new(request.initial_currency, request.initial_tickets);
    drive(request, &mut budget, rng)
}

/// Trial with unlimited currency, measuring what reaching the goal costs
pub fn run_unbounded<R: RandomSource>(request: &SimRequest, rng: &mut R) -> TrialResult {
    drive(request, &mut Unlimited::default(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{FastRng, ScriptedRng};

    fn request(chars: u32, cones: u32) -> SimRequest {
        SimRequest {
            target_pickup_characters: chars,
            target_pickup_light_cones: cones,
            num_simulations: 1,
            ..Default::default()
        }
    }

    #[test]
    fn carry_over_goes_to_character_first() {
        let mut req = request(1, 1);
        req.initial_pity5 = 50;
        req.initial_guaranteed_pickup = true;
        let trial = TrialState::new(&req);
        assert_eq!(trial.pity(GachaKind::Character), Some(PullState::new(50, true)));
        assert_eq!(trial.pity(GachaKind::LightCone), Some(PullState::default()));

        let mut req = request(0, 1);
        req.initial_pity5 = 50;
        let trial = TrialState::new(&req);
        assert_eq!(trial.pity(GachaKind::Character), None);
        assert_eq!(trial.pity(GachaKind::LightCone), Some(PullState::new(50, false)));
    }

    #[test]
    fn no_resources_means_no_pulls() {
        let req = request(1, 0);
        let mut rng = FastRng::new(1);
        let result = run_budgeted(&req, &mut rng);
        assert_eq!(result.end, TrialEnd::Exhausted);
        assert_eq!(result.pulls, 0);
        assert_eq!(result.currency_consumed, 0);
    }

    #[test]
    fn tickets_spent_before_currency() {
        let mut budget = Budget::new(320, 1);
        assert!(budget.pay());
        assert_eq!((budget.tickets, budget.currency), (0, 320));
        assert!(budget.pay());
        assert!(budget.pay());
        assert_eq!(budget.currency, 0);
        assert!(!budget.pay());
        assert_eq!(budget.currency_consumed(0), 320);

        budget.credit(2);
        assert!(budget.pay());
        assert!(budget.pay());
        assert!(!budget.pay());
    }

    #[test]
    fn leftover_currency_below_cost_is_unusable() {
        let mut budget = Budget::new(159, 0);
        assert!(!budget.pay());
    }

    #[test]
    fn hard_pity_guarantee_wins_in_one_pull() {
        let mut req = request(1, 0);
        req.initial_pity5 = 89;
        req.initial_guaranteed_pickup = true;
        req.initial_tickets = 1;

        let mut rng = ScriptedRng::new(&[0.5]);
        let result = run_budgeted(&req, &mut rng);
        assert_eq!(result.end, TrialEnd::GoalMet);
        assert_eq!(result.pulls, 1);
        assert_eq!(result.currency_consumed, 0);

        let mut rng = ScriptedRng::new(&[0.5]);
        let result = run_unbounded(&req, &mut rng);
        assert_eq!(result.end, TrialEnd::GoalMet);
        assert_eq!(result.pulls, 1);
        assert_eq!(result.currency_consumed, 160);
        assert_eq!(result.exchange_tickets, 0);
    }

    #[test]
    fn exchange_tickets_keep_a_budget_alive() {
        // Every pull is a 4-star light cone (8 fragments) on the cone banner.
        // 0.05 sits inside the 4-star light cone band (0.041..0.074).
        let mut req = request(0, 1);
        req.initial_tickets = 5;
        let mut rng = ScriptedRng::new(&[0.05]);
        let result = run_budgeted(&req, &mut rng);
        assert_eq!(result.end, TrialEnd::Exhausted);
        // 5 tickets -> 40 fragments -> 2 more tickets -> 16 fragments
        assert_eq!(result.pulls, 7);
        assert_eq!(result.exchange_tickets, 2);
    }

    #[test]
    fn unbounded_deducts_exchange_tickets_from_spend() {
        let mut req = request(0, 1);
        // 0.05 is a 4-star light cone until the soft-pity rate passes it at
        // pity 63 (0.068), which lands the guaranteed pickup on pull 64
        req.initial_guaranteed_pickup = true;
        let mut rng = ScriptedRng::new(&[0.05]);
        let result = run_unbounded(&req, &mut rng);
        assert_eq!(result.end, TrialEnd::GoalMet);
        assert_eq!(result.pulls, 64);
        // 63 * 8 + 40 = 544 fragments -> 27 tickets
        assert_eq!(result.exchange_tickets, 27);
        assert_eq!(result.currency_consumed, 64 * 160 - 27 * 160);
    }

    #[test]
    fn unreachable_target_is_capped() {
        let req = request(5_000, 0);
        let mut rng = FastRng::new(3);
        let result = run_unbounded(&req, &mut rng);
        assert_eq!(result.end, TrialEnd::Capped);
        assert_eq!(result.pulls, ITERATION_CAP);
        assert!(!result.succeeded());
    }

    #[test]
    fn finished_banner_stops_pulling() {
        let mut req = request(1, 1);
        req.initial_pity5 = 89;
        req.initial_guaranteed_pickup = true;
        let mut trial = TrialState::new(&req);
        let mut rng = FastRng::new(11);

        trial.step(&mut rng);
        assert_eq!(trial.obtained(GachaKind::Character), 1);
        let frozen = trial.pity(GachaKind::Character);

        while !trial.goal_met() {
            trial.step(&mut rng);
            assert_eq!(trial.pity(GachaKind::Character), frozen);
        }
        assert_eq!(trial.obtained(GachaKind::LightCone), 1);
    }
}
