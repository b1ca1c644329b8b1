use serde::Serialize;

use super::{Advisor, by_score_desc};
use crate::board::{CornerId, EdgeId};
use crate::game::{ResourceBundle, cost_of};
use crate::types::{BuildAction, DevelopmentCard};

const DISCARD_RISK_HAND: u32 = 7;
const ARMY_PUSH_KNIGHTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    Corner(CornerId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOption {
    pub action: BuildAction,
    /// 1 is the most urgent.
    pub priority: u8,
    pub reason: String,
    pub target: Option<Target>,
}

/// The cheapest build the observer cannot yet afford.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortfall {
    pub action: BuildAction,
    pub missing: ResourceBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildPlan {
    pub hand: ResourceBundle,
    pub options: Vec<BuildOption>,
    pub shortfall: Option<Shortfall>,
}

impl BuildPlan {
    pub fn contains(&self, action: BuildAction) -> bool {
        self.options.iter().any(|option| option.action == action)
    }

    pub fn top(&self) -> Option<&BuildOption> {
        self.options.first()
    }
}

impl Advisor<'_> {
    /// Affordable builds in priority order, or the nearest one out of reach.
    pub fn suggest_build_priority(&self) -> BuildPlan {
        let model = self.model;
        let hand = model.my_resources;
        let city = self.best_city_target();
        let settlement = self.best_settlement_target();
        let road = self
            .suggest_road_placement(1)
            .first()
            .map(|option| option.edge_id);
        let knights_held = model
            .my_color
            .and_then(|color| model.players.get(&color))
            .map_or(0, |player| player.held(DevelopmentCard::Knight));

        let mut options = Vec::new();
        for action in BuildAction::ALL {
            if !hand.can_afford(&cost_of(action)) {
                continue;
            }
            let option = match action {
                BuildAction::City => city.map(|corner| BuildOption {
                    action,
                    priority: 1,
                    reason: "+1 VP and doubles resource production".to_string(),
                    target: Some(Target::Corner(corner)),
                }),
                BuildAction::Settlement => settlement.map(|corner| BuildOption {
                    action,
                    priority: 2,
                    reason: "+1 VP and new resource access".to_string(),
                    target: Some(Target::Corner(corner)),
                }),
                BuildAction::DevelopmentCard => Some(if hand.total() >= DISCARD_RISK_HAND {
                    BuildOption {
                        action,
                        priority: 1,
                        reason: format!("{} cards in hand risk a discard on a 7", hand.total()),
                        target: None,
                    }
                } else if knights_held >= ARMY_PUSH_KNIGHTS {
                    BuildOption {
                        action,
                        priority: 1,
                        reason: format!("{knights_held} knights held, push for largest army"),
                        target: None,
                    }
                } else {
                    BuildOption {
                        action,
                        priority: 3,
                        reason: "Could be VP or useful knight".to_string(),
                        target: None,
                    }
                }),
                BuildAction::Road => road.map(|edge| {
                    if settlement.is_none() {
                        BuildOption {
                            action,
                            priority: 2,
                            reason: "No settlement spot in reach, extend the network".to_string(),
                            target: Some(Target::Edge(edge)),
                        }
                    } else {
                        BuildOption {
                            action,
                            priority: 4,
                            reason: "Expand to new settlement spots".to_string(),
                            target: Some(Target::Edge(edge)),
                        }
                    }
                }),
            };
            options.extend(option);
        }
        // stable: equal priorities keep the City, Settlement, Dev, Road order
        options.sort_by_key(|option| option.priority);
        for (rank, option) in options.iter_mut().enumerate() {
            option.priority = rank as u8 + 1;
        }

        let shortfall = if options.is_empty() {
            BuildAction::ALL
                .into_iter()
                .filter(|action| match action {
                    BuildAction::City => city.is_some(),
                    BuildAction::Settlement => settlement.is_some(),
                    BuildAction::Road => road.is_some(),
                    BuildAction::DevelopmentCard => true,
                })
                .map(|action| Shortfall {
                    action,
                    missing: hand.missing(&cost_of(action)),
                })
                .min_by_key(|shortfall| shortfall.missing.total())
        } else {
            None
        };

        BuildPlan {
            hand,
            options,
            shortfall,
        }
    }

    /// Own settlement on the richest tiles, or the best server-published city spot.
    fn best_city_target(&self) -> Option<CornerId> {
        let model = self.model;
        let legal = &model.available_cities;
        let candidates: Vec<CornerId> = if self.trust_server_legality && !legal.is_empty() {
            legal.iter().copied().collect()
        } else {
            model.my_settlements().map(|corner| corner.id).collect()
        };
        candidates
            .into_iter()
            .map(|id| (f64::from(self.corner_pips(id)), id))
            .min_by(|a, b| by_score_desc(*a, *b))
            .map(|(_, id)| id)
    }

    /// Best open corner the observer's roads already reach.
    fn best_settlement_target(&self) -> Option<CornerId> {
        let model = self.model;
        let legal = &model.available_settlements;
        let candidates: Vec<CornerId> = if self.trust_server_legality && !legal.is_empty() {
            legal.iter().copied().collect()
        } else {
            model
                .my_edges()
                .filter_map(|edge| model.topology.ends_of(edge.id))
                .flatten()
                .collect()
        };
        candidates
            .into_iter()
            .filter_map(|id| self.score_corner(id))
            .map(|score| (score.score, score.corner_id))
            .min_by(|a, b| by_score_desc(*a, *b))
            .map(|(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::ScoringWeights;
    use crate::board::Corner;
    use crate::game::{GameModel, PlayerState};
    use crate::types::BuildingKind;

    fn model_with_settlement(hand: [u8; 5]) -> GameModel {
        let mut model = GameModel::new();
        model.my_color = Some(1);
        let mut corner = Corner::new(0);
        corner.owner = Some(1);
        corner.building = Some(BuildingKind::Settlement);
        model.corners.insert(0, corner);
        model.players.insert(1, PlayerState::new(1));
        model.my_resources = ResourceBundle::from_counts(hand);
        model
    }

    #[test]
    fn city_tops_the_list_when_affordable() {
        let model = model_with_settlement([0, 0, 0, 2, 3]);
        let weights = ScoringWeights::default();
        let plan = Advisor::new(&model, &weights).suggest_build_priority();
        let top = plan.top().unwrap();
        assert_eq!(top.action, BuildAction::City);
        assert_eq!(top.priority, 1);
        assert_eq!(top.target, Some(Target::Corner(0)));
        assert!(!plan.contains(BuildAction::Settlement));
        assert!(plan.shortfall.is_none());
    }

    #[test]
    fn big_hand_escalates_development_cards() {
        let model = model_with_settlement([0, 0, 3, 1, 4]);
        let weights = ScoringWeights::default();
        let plan = Advisor::new(&model, &weights).suggest_build_priority();
        let actions: Vec<BuildAction> = plan.options.iter().map(|o| o.action).collect();
        assert_eq!(actions, vec![BuildAction::DevelopmentCard]);

        let model = model_with_settlement([0, 0, 3, 2, 4]);
        let plan = Advisor::new(&model, &weights).suggest_build_priority();
        let actions: Vec<BuildAction> = plan.options.iter().map(|o| o.action).collect();
        assert_eq!(actions, vec![BuildAction::City, BuildAction::DevelopmentCard]);
        assert_eq!(plan.options[1].priority, 2);
    }

    #[test]
    fn held_knights_escalate_development_cards() {
        let mut model = model_with_settlement([0, 0, 1, 1, 1]);
        model.players.get_mut(&1).unwrap().dev_cards =
            vec![DevelopmentCard::Knight, DevelopmentCard::Knight];
        let weights = ScoringWeights::default();
        let plan = Advisor::new(&model, &weights).suggest_build_priority();
        assert!(plan.top().unwrap().reason.contains("largest army"));
    }

    #[test]
    fn empty_hand_names_the_cheapest_gap() {
        let model = model_with_settlement([0, 0, 1, 1, 0]);
        let weights = ScoringWeights::default();
        let plan = Advisor::new(&model, &weights).suggest_build_priority();
        assert!(plan.options.is_empty());
        let shortfall = plan.shortfall.unwrap();
        assert_eq!(shortfall.action, BuildAction::DevelopmentCard);
        assert_eq!(shortfall.missing, ResourceBundle::from_counts([0, 0, 0, 0, 1]));
    }
}
