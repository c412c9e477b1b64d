//! Banner tables and simulation request loading

use crate::error::SimError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Currency spent on a single pull when no ticket is available
pub const COST_PER_PULL: u64 = 160;

/// Hard limit on loop iterations per trial
pub const ITERATION_CAP: u32 = 20_000;

/// Fragments exchanged for one pull ticket
pub const FRAGMENTS_PER_TICKET: u32 = 20;

pub const DEFAULT_NUM_SIMULATIONS: usize = 10_000;

/// Which limited banner a pull is made on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GachaKind {
    Character,
    LightCone,
}

// Custom deserializer for case-insensitive matching
impl<'de> Deserialize<'de> for GachaKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::unknown_variant(&s, &["character", "lightcone", "light_cone"])
        })
    }
}

impl FromStr for GachaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "character" | "char" => Ok(GachaKind::Character),
            "lightcone" | "cone" => Ok(GachaKind::LightCone),
            _ => Err(format!("unknown banner kind: {}", s)),
        }
    }
}

impl fmt::Display for GachaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl GachaKind {
    pub const ALL: [GachaKind; 2] = [GachaKind::Character, GachaKind::LightCone];

    pub fn label(self) -> &'static str {
        match self {
            GachaKind::Character => "character",
            GachaKind::LightCone => "light cone",
        }
    }

    /// The immutable rate/pity table for this banner
    #[inline(always)]
    pub fn profile(self) -> &'static BannerProfile {
        match self {
            GachaKind::Character => &CHARACTER_BANNER,
            GachaKind::LightCone => &LIGHT_CONE_BANNER,
        }
    }
}

/// Base drop rates of one banner. The four rates sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateTable {
    pub five_star: f64,
    pub four_star_character: f64,
    pub four_star_light_cone: f64,
    pub three_star: f64,
}

impl RateTable {
    pub fn total(&self) -> f64 {
        self.five_star + self.four_star_character + self.four_star_light_cone + self.three_star
    }

    /// Combined base rate of the two 4-star pickup categories
    pub fn four_star_total(&self) -> f64 {
        self.four_star_character + self.four_star_light_cone
    }
}

/// Pity counters of one banner. Indices are 0-based pulls since the last hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PityThresholds {
    /// Pull count at which a 5-star is forced
    pub hard_pity_5: u32,
    /// Pull count at which a 4-star-or-better is forced
    pub hard_pity_4: u32,
    /// Last pity index that still uses the base 5-star rate
    pub soft_pity_start: u32,
    /// Added to the 5-star rate for every pull past `soft_pity_start`
    pub soft_pity_increment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BannerProfile {
    pub kind: GachaKind,
    pub rates: RateTable,
    pub pity: PityThresholds,
    /// Chance a non-guaranteed 5-star is the pickup item
    pub pickup_split: f64,
}

impl BannerProfile {
    /// 5-star probability at `pity5` after the soft-pity ramp, capped at 1.0.
    /// Hard pity is handled by the engine, not here.
    #[inline(always)]
    pub fn five_star_rate(&self, pity5: u32) -> f64 {
        let base = self.rates.five_star;
        if pity5 < self.pity.soft_pity_start {
            return base;
        }
        let steps = (pity5 - self.pity.soft_pity_start + 1) as f64;
        (base + steps * self.pity.soft_pity_increment).min(1.0)
    }
}

pub static CHARACTER_BANNER: BannerProfile = BannerProfile {
    kind: GachaKind::Character,
    rates: RateTable {
        five_star: 0.006,
        four_star_character: 0.0255,
        four_star_light_cone: 0.0255,
        three_star: 0.943,
    },
    pity: PityThresholds {
        hard_pity_5: 90,
        hard_pity_4: 10,
        soft_pity_start: 73,
        soft_pity_increment: 0.06,
    },
    pickup_split: 0.5,
};

pub static LIGHT_CONE_BANNER: BannerProfile = BannerProfile {
    kind: GachaKind::LightCone,
    rates: RateTable {
        five_star: 0.008,
        four_star_character: 0.033,
        four_star_light_cone: 0.033,
        three_star: 0.926,
    },
    pity: PityThresholds {
        hard_pity_5: 80,
        hard_pity_4: 10,
        soft_pity_start: 63,
        soft_pity_increment: 0.06,
    },
    pickup_split: 0.75,
};

/// One simulation request. Every field is optional in the file and falls back
/// to the same defaults the web form uses.
/// Accepts both the current field names and the legacy request names
/// (`target_n_char`, `initial_gems`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimRequest {
    #[serde(alias = "target_n_char")]
    pub target_pickup_characters: u32,
    #[serde(alias = "target_m_lightcone")]
    pub target_pickup_light_cones: u32,
    #[serde(alias = "initial_gems")]
    pub initial_currency: u64,
    pub initial_tickets: u64,
    /// Applied to the character banner if active, else to the light cone banner
    #[serde(alias = "initial_pity_5star")]
    pub initial_pity5: u32,
    #[serde(alias = "initial_is_guaranteed_5star_pickup")]
    pub initial_guaranteed_pickup: bool,
    pub num_simulations: usize,
    /// Base seed; random when absent
    pub seed: Option<u64>,
    /// Worker threads for parallel runs; derived from the core count when absent
    pub threads: Option<usize>,
}

impl Default for SimRequest {
    fn default() -> Self {
        Self {
            target_pickup_characters: 0,
            target_pickup_light_cones: 0,
            initial_currency: 0,
            initial_tickets: 0,
            initial_pity5: 0,
            initial_guaranteed_pickup: false,
            num_simulations: DEFAULT_NUM_SIMULATIONS,
            seed: None,
            threads: None,
        }
    }
}

impl SimRequest {
    /// Load a request from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(&path)?;
        let path_str = path.as_ref().to_string_lossy().to_lowercase();

        if path_str.ends_with(".json") {
            let request: SimRequest = serde_json::from_str(&content)?;
            Ok(request)
        } else {
            let request: SimRequest = serde_yaml::from_str(&content)?;
            Ok(request)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let request: SimRequest = serde_json::from_str(json)?;
        Ok(request)
    }

    pub fn character_active(&self) -> bool {
        self.target_pickup_characters > 0
    }

    pub fn light_cone_active(&self) -> bool {
        self.target_pickup_light_cones > 0
    }

    /// Target count for one banner (0 means inactive)
    pub fn target(&self, kind: GachaKind) -> u32 {
        match kind {
            GachaKind::Character => self.target_pickup_characters,
            GachaKind::LightCone => self.target_pickup_light_cones,
        }
    }

    /// The banner that receives the carried-over pity and guarantee.
    /// Character takes precedence when both are active.
    pub fn carry_over_kind(&self) -> Option<GachaKind> {
        if self.character_active() {
            Some(GachaKind::Character)
        } else if self.light_cone_active() {
            Some(GachaKind::LightCone)
        } else {
            None
        }
    }

    /// Reject requests no trial can be run for
    pub fn validate(&self) -> Result<(), SimError> {
        let kind = self.carry_over_kind().ok_or(SimError::NoTargets)?;
        if self.num_simulations == 0 {
            return Err(SimError::NoSimulations);
        }
        let max = kind.profile().pity.hard_pity_5 - 1;
        if self.initial_pity5 > max {
            return Err(SimError::PityOutOfRange {
                kind,
                pity: self.initial_pity5,
                max,
            });
        }
        Ok(())
    }
}
