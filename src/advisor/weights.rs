use serde::{Deserialize, Serialize};

/// Tunable weights of the corner, road and robber heuristics.
///
/// Only the ordering matters: pips dominate, then diversity, then the
/// situational bonuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub pip: f64,
    pub diversity: f64,
    pub ore_wheat_setup: f64,
    pub ore_wheat_main: f64,
    pub generic_port: f64,
    pub matching_port: f64,
    pub mismatched_port: f64,
    /// Per adjacent 6 or 8.
    pub hot_number: f64,
    /// Per adjacent 5 or 9.
    pub warm_number: f64,
    pub robber_penalty: f64,
    pub complementary: f64,
    pub lookahead: f64,
    pub road_scale: f64,
    pub road_port_bonus: f64,
    pub robber_city_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            pip: 10.0,
            diversity: 8.0,
            ore_wheat_setup: 2.0,
            ore_wheat_main: 3.0,
            generic_port: 5.0,
            matching_port: 10.0,
            mismatched_port: 3.0,
            hot_number: 3.0,
            warm_number: 1.5,
            robber_penalty: 5.0,
            complementary: 4.0,
            lookahead: 0.5,
            road_scale: 0.4,
            road_port_bonus: 4.0,
            robber_city_bonus: 4.0,
        }
    }
}

impl ScoringWeights {
    pub fn ore_wheat(&self, setup_phase: bool) -> f64 {
        if setup_phase {
            self.ore_wheat_setup
        } else {
            self.ore_wheat_main
        }
    }
}
