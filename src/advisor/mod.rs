//! Read-only heuristics over a [`GameModel`].
//!
//! Nothing here mutates the model; every query recomputes from scratch, so it
//! is safe to call as often as the caller likes.

mod build;
mod placement;
mod recommendation;
mod scoring;
mod weights;

pub use build::{BuildOption, BuildPlan, Shortfall, Target};
pub use placement::{RoadOption, RobberOption};
pub use recommendation::{Recommendation, StrategicRecommendation, discard_plan};
pub use scoring::{CornerScore, ResourceYield};
pub use weights::ScoringWeights;

use crate::game::GameModel;

/// How many candidates each ranked query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN {
    pub placements: usize,
    pub roads: usize,
    pub robber: usize,
}

impl Default for TopN {
    fn default() -> Self {
        Self {
            placements: 5,
            roads: 3,
            robber: 3,
        }
    }
}

/// Borrowed view bundling the model with the scoring configuration.
#[derive(Debug, Clone, Copy)]
pub struct Advisor<'a> {
    pub model: &'a GameModel,
    pub weights: &'a ScoringWeights,
    /// Prefer the server's published legal sets over topology when present.
    pub trust_server_legality: bool,
}

impl<'a> Advisor<'a> {
    pub fn new(model: &'a GameModel, weights: &'a ScoringWeights) -> Self {
        Self {
            model,
            weights,
            trust_server_legality: true,
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Descending by score, ascending id on ties.
fn by_score_desc(a: (f64, u16), b: (f64, u16)) -> std::cmp::Ordering {
    b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
}
