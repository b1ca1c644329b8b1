use std::collections::BTreeSet;

use serde::Serialize;

use super::{Advisor, by_score_desc, round_tenth};
use crate::board::{CornerId, EdgeId, PortKind, TileId};
use crate::types::{BuildingKind, ColorId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadOption {
    pub edge_id: EdgeId,
    /// Endpoint attached to the observer's network, when known.
    pub from_corner: Option<CornerId>,
    pub to_corner: CornerId,
    pub score: f64,
    pub leads_to: Vec<String>,
    pub port: Option<PortKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobberOption {
    pub tile_id: TileId,
    pub score: f64,
    pub tile: String,
    /// Opponents with a building on the tile, candidates to steal from.
    pub victims: Vec<ColorId>,
}

impl Advisor<'_> {
    /// Best open corners for a settlement, highest score first.
    pub fn suggest_initial_placement(&self, top_n: usize) -> Vec<super::CornerScore> {
        let model = self.model;
        let legal = &model.available_settlements;
        let restrict = self.trust_server_legality && !legal.is_empty();
        let mut scores: Vec<_> = model
            .corners
            .keys()
            .filter(|id| !restrict || legal.contains(id))
            .filter_map(|id| self.score_corner(*id))
            .collect();
        scores.sort_by(|a, b| by_score_desc((a.score, a.corner_id), (b.score, b.corner_id)));
        scores.truncate(top_n);
        scores
    }

    /// Unowned edges touching the observer's network, ranked by where they lead.
    pub fn suggest_road_placement(&self, top_n: usize) -> Vec<RoadOption> {
        let model = self.model;
        let topology = &model.topology;
        let network = self.my_network();
        let legal = &model.available_roads;
        let candidates: BTreeSet<EdgeId> = if self.trust_server_legality && !legal.is_empty() {
            legal.clone()
        } else {
            network
                .iter()
                .flat_map(|corner| topology.edges_of(*corner))
                .copied()
                .collect()
        };

        let mut options: Vec<RoadOption> = candidates
            .into_iter()
            .filter(|id| model.edges.get(id).is_some_and(|edge| !edge.is_owned()))
            .filter_map(|id| self.score_road(id, &network))
            .collect();
        options.sort_by(|a, b| by_score_desc((a.score, a.edge_id), (b.score, b.edge_id)));
        options.truncate(top_n);
        options
    }

    fn score_road(&self, edge_id: EdgeId, network: &BTreeSet<CornerId>) -> Option<RoadOption> {
        let topology = &self.model.topology;
        let [a, b] = topology.ends_of(edge_id)?;
        let (from_corner, to_corner) = match (network.contains(&a), network.contains(&b)) {
            (true, false) => (Some(a), b),
            (false, true) => (Some(b), a),
            // both or neither: judge by the better end
            _ => {
                let score_a = self.reach_score(a).map(|(s, _)| s).unwrap_or(f64::MIN);
                let score_b = self.reach_score(b).map(|(s, _)| s).unwrap_or(f64::MIN);
                if score_b > score_a { (Some(a), b) } else { (Some(b), a) }
            }
        };
        let (reach, leads_to) = self.reach_score(to_corner)?;
        let port = topology.port_of(to_corner);
        let mut score = reach * self.weights.road_scale;
        if port.is_some() {
            score += self.weights.road_port_bonus;
        }
        Some(RoadOption {
            edge_id,
            from_corner: from_corner.filter(|corner| network.contains(corner)),
            to_corner,
            score: round_tenth(score),
            leads_to,
            port,
        })
    }

    /// Value of reaching a corner: its own score when settleable, otherwise a
    /// discounted score of the best settleable corner one edge further.
    fn reach_score(&self, corner_id: CornerId) -> Option<(f64, Vec<String>)> {
        if let Some(direct) = self.score_corner(corner_id) {
            return Some((direct.score, direct.tiles));
        }
        self.model
            .topology
            .neighbors_of(corner_id)
            .iter()
            .filter_map(|next| self.score_corner(*next))
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|best| (best.score * self.weights.lookahead, best.tiles))
    }

    /// Corners the observer can build roads from: own buildings plus the ends
    /// of own roads.
    pub fn my_network(&self) -> BTreeSet<CornerId> {
        let model = self.model;
        let mut network: BTreeSet<CornerId> = model.my_corners().map(|corner| corner.id).collect();
        for edge in model.my_edges() {
            if let Some(ends) = model.topology.ends_of(edge.id) {
                network.extend(ends);
            }
        }
        network
    }

    /// Tiles worth blocking, ranked by opponent production on them.
    pub fn suggest_robber_placement(&self, top_n: usize) -> Vec<RobberOption> {
        let model = self.model;
        let legal = &model.available_robber_spots;
        let restrict = self.trust_server_legality && !legal.is_empty();

        let mut options: Vec<RobberOption> = model
            .tiles
            .values()
            .filter(|tile| !restrict || legal.contains(&tile.id))
            .filter(|tile| !tile.terrain.is_desert() && model.robber_tile != Some(tile.id))
            .filter_map(|tile| {
                let buildings: Vec<(ColorId, BuildingKind)> = model
                    .topology
                    .corners_of(tile.id)
                    .iter()
                    .filter_map(|id| model.corners.get(id))
                    .filter_map(|corner| Some((corner.owner?, corner.building?)))
                    .collect();
                let theirs: Vec<&(ColorId, BuildingKind)> = buildings
                    .iter()
                    .filter(|(owner, _)| !model.is_mine(Some(*owner)))
                    .collect();
                if !buildings.is_empty() && theirs.is_empty() {
                    return None;
                }
                let mut score: f64 = theirs
                    .iter()
                    .map(|(_, building)| f64::from(tile.pips) * f64::from(building.yield_factor()))
                    .sum();
                if theirs.iter().any(|(_, building)| *building == BuildingKind::City) {
                    score += self.weights.robber_city_bonus;
                }
                let victims: BTreeSet<ColorId> = theirs.iter().map(|(owner, _)| *owner).collect();
                Some(RobberOption {
                    tile_id: tile.id,
                    score: round_tenth(score),
                    tile: tile.label(),
                    victims: victims.into_iter().collect(),
                })
            })
            .collect();
        options.sort_by(|a, b| by_score_desc((a.score, a.tile_id), (b.score, b.tile_id)));
        options.truncate(top_n);
        options
    }
}
