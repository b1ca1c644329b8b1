use serde::Serialize;

use super::{Advisor, Shortfall, Target, TopN};
use crate::board::{CornerId, EdgeId, TileId};
use crate::game::ResourceBundle;
use crate::types::{ActionState, BuildAction, ColorId, DevelopmentCard, Resource};

/// Hands of this size or smaller keep every card on a seven.
const DISCARD_LIMIT: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Recommendation {
    PlaceSettlement { corner: CornerId, score: f64 },
    PlaceRoad { edge: EdgeId, score: f64 },
    Build { action: BuildAction, target: Option<Target> },
    SaveFor(Shortfall),
    MoveRobber { tile: TileId, victims: Vec<ColorId> },
    Steal { victim: ColorId },
    Discard(ResourceBundle),
    RollDice,
    Wait,
}

/// The single best move for the current action state, with runners-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicRecommendation {
    pub action: Option<ActionState>,
    pub headline: String,
    pub recommendation: Recommendation,
    pub alternatives: Vec<Recommendation>,
    pub rationale: Vec<String>,
}

impl StrategicRecommendation {
    fn wait(action: Option<ActionState>, headline: impl Into<String>) -> Self {
        Self {
            action,
            headline: headline.into(),
            recommendation: Recommendation::Wait,
            alternatives: Vec::new(),
            rationale: Vec::new(),
        }
    }
}

impl Advisor<'_> {
    pub fn get_strategic_recommendation(&self, top: TopN) -> StrategicRecommendation {
        let model = self.model;
        let action = model.current_action;
        // every player discards on a seven, not only the acting one
        if action == Some(ActionState::Discard) {
            return self.recommend_discard();
        }
        if !model.is_my_turn() {
            let headline = match model.current_turn_color {
                Some(color) => format!("Waiting for {}", model.player_name(color)),
                None => "Waiting for the game to start".to_string(),
            };
            return StrategicRecommendation::wait(action, headline);
        }
        match action {
            Some(ActionState::PlaceSettlement) => self.recommend_settlement(top.placements),
            Some(ActionState::PlaceRoad) => self.recommend_road(top.roads),
            Some(ActionState::RollDice) => self.recommend_roll(),
            Some(ActionState::PlaceRobber) => self.recommend_robber(top.robber),
            Some(ActionState::StealCard) => self.recommend_steal(),
            Some(ActionState::MainTurn) => self.recommend_build(),
            Some(ActionState::Discard) | Some(ActionState::Unknown(_)) | None => {
                if model.setup_phase {
                    self.recommend_settlement(top.placements)
                } else {
                    StrategicRecommendation::wait(action, "Nothing to suggest in this state")
                }
            }
        }
    }

    fn recommend_settlement(&self, top_n: usize) -> StrategicRecommendation {
        let action = self.model.current_action;
        let picks = self.suggest_initial_placement(top_n);
        let mut recommendations = picks.iter().map(|pick| Recommendation::PlaceSettlement {
            corner: pick.corner_id,
            score: pick.score,
        });
        let Some(best) = recommendations.next() else {
            return StrategicRecommendation::wait(action, "No open corner to settle");
        };
        let first = &picks[0];
        let mut rationale = vec![
            format!("touches {}", first.tiles.join(", ")),
            format!("{} pips over {} resource kinds", first.total_pips, first.diversity()),
        ];
        if let Some(port) = first.port {
            rationale.push(format!("{port} port"));
        }
        StrategicRecommendation {
            action,
            headline: format!("Settle corner {} (score {})", first.corner_id, first.score),
            recommendation: best,
            alternatives: recommendations.collect(),
            rationale,
        }
    }

    fn recommend_road(&self, top_n: usize) -> StrategicRecommendation {
        let action = self.model.current_action;
        let roads = self.suggest_road_placement(top_n);
        let Some(first) = roads.first() else {
            return StrategicRecommendation::wait(action, "No road extends the network");
        };
        let mut rationale = vec![format!("leads to {}", first.leads_to.join(", "))];
        if let Some(port) = first.port {
            rationale.push(format!("reaches a {port} port"));
        }
        StrategicRecommendation {
            action,
            headline: format!("Build road on edge {} toward corner {}", first.edge_id, first.to_corner),
            recommendation: Recommendation::PlaceRoad {
                edge: first.edge_id,
                score: first.score,
            },
            alternatives: roads[1..]
                .iter()
                .map(|road| Recommendation::PlaceRoad {
                    edge: road.edge_id,
                    score: road.score,
                })
                .collect(),
            rationale,
        }
    }

    fn recommend_roll(&self) -> StrategicRecommendation {
        let model = self.model;
        let mut rationale = Vec::new();
        let blocked = model.robber_tile.is_some_and(|tile| {
            model
                .topology
                .corners_of(tile)
                .iter()
                .filter_map(|id| model.corners.get(id))
                .any(|corner| model.is_mine(corner.owner))
        });
        let knights = model
            .my_color
            .and_then(|color| model.players.get(&color))
            .map_or(0, |player| player.held(DevelopmentCard::Knight));
        if blocked && knights > 0 {
            rationale.push("the robber sits on your tile; a knight before rolling frees it".to_string());
        }
        StrategicRecommendation {
            action: model.current_action,
            headline: "Roll the dice".to_string(),
            recommendation: Recommendation::RollDice,
            alternatives: Vec::new(),
            rationale,
        }
    }

    fn recommend_robber(&self, top_n: usize) -> StrategicRecommendation {
        let model = self.model;
        let picks = self.suggest_robber_placement(top_n);
        let Some(first) = picks.first() else {
            return StrategicRecommendation::wait(model.current_action, "No tile worth blocking");
        };
        let victims: Vec<String> = first.victims.iter().map(|c| model.player_name(*c)).collect();
        let mut rationale = vec![format!("blocks {}", first.tile)];
        if !victims.is_empty() {
            rationale.push(format!("steal from {}", victims.join(" or ")));
        }
        let to_move = |option: &super::RobberOption| Recommendation::MoveRobber {
            tile: option.tile_id,
            victims: option.victims.clone(),
        };
        StrategicRecommendation {
            action: model.current_action,
            headline: format!("Move the robber to tile {} ({})", first.tile_id, first.tile),
            recommendation: to_move(first),
            alternatives: picks[1..].iter().map(to_move).collect(),
            rationale,
        }
    }

    /// Richest opponent (by estimated hand) touching the robber tile.
    fn recommend_steal(&self) -> StrategicRecommendation {
        let model = self.model;
        let mut candidates: Vec<(u32, ColorId)> = model
            .robber_tile
            .map(|tile| model.topology.corners_of(tile))
            .unwrap_or_default()
            .iter()
            .filter_map(|id| model.corners.get(id))
            .filter_map(|corner| corner.owner)
            .filter(|owner| !model.is_mine(Some(*owner)))
            .map(|owner| {
                let cards = model.players.get(&owner).map_or(0, |p| p.resources.total());
                (cards, owner)
            })
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.dedup_by_key(|(_, owner)| *owner);
        let Some(&(cards, victim)) = candidates.first() else {
            return StrategicRecommendation::wait(model.current_action, "Nobody to steal from");
        };
        StrategicRecommendation {
            action: model.current_action,
            headline: format!("Steal from {}", model.player_name(victim)),
            recommendation: Recommendation::Steal { victim },
            alternatives: candidates[1..]
                .iter()
                .map(|(_, owner)| Recommendation::Steal { victim: *owner })
                .collect(),
            rationale: vec![format!("holds about {cards} cards")],
        }
    }

    fn recommend_build(&self) -> StrategicRecommendation {
        let action = self.model.current_action;
        let plan = self.suggest_build_priority();
        let mut options = plan.options.iter().map(|option| Recommendation::Build {
            action: option.action,
            target: option.target,
        });
        match (options.next(), plan.shortfall.clone()) {
            (Some(best), _) => StrategicRecommendation {
                action,
                headline: plan.options[0].action.to_string(),
                recommendation: best,
                alternatives: options.collect(),
                rationale: plan
                    .options
                    .iter()
                    .map(|option| format!("{}: {}", option.action, option.reason))
                    .collect(),
            },
            (None, Some(shortfall)) => StrategicRecommendation {
                action,
                headline: format!("Save for {}", shortfall.action),
                rationale: vec![format!("missing {}", shortfall.missing)],
                recommendation: Recommendation::SaveFor(shortfall),
                alternatives: Vec::new(),
            },
            (None, None) => StrategicRecommendation::wait(action, "End turn"),
        }
    }

    fn recommend_discard(&self) -> StrategicRecommendation {
        let model = self.model;
        let hand = model.my_resources;
        let discard = discard_plan(&hand);
        if discard.is_empty() {
            return StrategicRecommendation::wait(model.current_action, "No discard needed");
        }
        StrategicRecommendation {
            action: model.current_action,
            headline: format!("Discard {discard}"),
            recommendation: Recommendation::Discard(discard),
            alternatives: Vec::new(),
            rationale: vec![format!("keeps {} of {} cards", hand.total() - discard.total(), hand.total())],
        }
    }
}

/// Half the hand, rounded down, always taken from the largest pile. Empty
/// when the hand is small enough to be spared.
pub fn discard_plan(hand: &ResourceBundle) -> ResourceBundle {
    let mut remaining = *hand;
    let mut discard = ResourceBundle::zero();
    if hand.total() <= DISCARD_LIMIT {
        return discard;
    }
    for _ in 0..hand.total() / 2 {
        let largest = remaining
            .iter()
            .fold(None, |best: Option<(Resource, u8)>, (resource, count)| match best {
                Some((_, most)) if most >= count => best,
                _ if count > 0 => Some((resource, count)),
                _ => best,
            });
        let Some((resource, _)) = largest else {
            break;
        };
        if remaining.subtract(resource, 1).is_err() {
            break;
        }
        discard.add(resource, 1);
    }
    discard
}
