use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{Advisor, round_tenth};
use crate::board::{CornerId, PortKind};
use crate::types::Resource;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceYield {
    pub pips: u32,
    pub numbers: Vec<u8>,
}

/// Why a corner is worth settling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CornerScore {
    pub corner_id: CornerId,
    /// Rounded to one decimal.
    pub score: f64,
    pub total_pips: u32,
    pub resources: BTreeMap<Resource, ResourceYield>,
    pub port: Option<PortKind>,
    /// Labels such as `ore(8)` for every adjacent tile.
    pub tiles: Vec<String>,
}

impl CornerScore {
    pub fn diversity(&self) -> usize {
        self.resources.len()
    }
}

impl Advisor<'_> {
    /// Scores an open corner. `None` means "no opinion": unknown, occupied,
    /// blocked by the distance rule, or touching no known tile.
    pub fn score_corner(&self, corner_id: CornerId) -> Option<CornerScore> {
        let model = self.model;
        let weights = self.weights;
        let corner = model.corners.get(&corner_id)?;
        if corner.is_owned() || !self.is_open(corner_id) {
            return None;
        }
        let tile_ids = model.topology.tiles_of(corner_id);
        if tile_ids.is_empty() {
            return None;
        }

        let mut total_pips = 0u32;
        let mut resources: BTreeMap<Resource, ResourceYield> = BTreeMap::new();
        let mut tiles = Vec::with_capacity(tile_ids.len());
        let mut score = 0.0;
        for tile in tile_ids.iter().filter_map(|id| model.tiles.get(id)) {
            tiles.push(tile.label());
            let Some(resource) = tile.resource() else {
                continue;
            };
            let pips = u32::from(tile.pips);
            total_pips += pips;
            let entry = resources.entry(resource).or_default();
            entry.pips += pips;
            entry.numbers.extend(tile.dice_number);
            score += match tile.dice_number {
                Some(6 | 8) => weights.hot_number,
                Some(5 | 9) => weights.warm_number,
                _ => 0.0,
            };
        }

        score += f64::from(total_pips) * weights.pip;
        score += resources.len() as f64 * weights.diversity;

        let ore_wheat: u32 = [Resource::Ore, Resource::Wheat]
            .iter()
            .filter_map(|resource| resources.get(resource))
            .map(|produced| produced.pips)
            .sum();
        score += f64::from(ore_wheat) * weights.ore_wheat(model.setup_phase);

        let port = corner.port.or_else(|| model.topology.port_of(corner_id));
        if let Some(port) = port {
            score += match port.resource {
                None => weights.generic_port,
                Some(resource) => match resources.get(&resource) {
                    Some(produced) => weights.matching_port + f64::from(produced.pips),
                    None => weights.mismatched_port,
                },
            };
        }

        if model
            .robber_tile
            .is_some_and(|robber| tile_ids.contains(&robber))
        {
            score -= weights.robber_penalty;
        }

        if model.my_corners().next().is_some() {
            let produced = self.my_production();
            let new_kinds = resources
                .keys()
                .filter(|resource| !produced.contains(resource))
                .count();
            score += new_kinds as f64 * weights.complementary;
        }

        score += weights.lookahead * f64::from(self.best_spot_beyond(corner_id));

        Some(CornerScore {
            corner_id,
            score: round_tenth(score),
            total_pips,
            resources,
            port,
            tiles,
        })
    }

    /// Distance rule: no building on the corner or any neighbour.
    pub fn is_open(&self, corner_id: CornerId) -> bool {
        let model = self.model;
        let occupied = |id: &CornerId| model.corners.get(id).is_some_and(|c| c.is_owned());
        !occupied(&corner_id)
            && !model
                .topology
                .neighbors_of(corner_id)
                .iter()
                .any(occupied)
    }

    /// Resource kinds the observer's buildings already touch.
    pub fn my_production(&self) -> BTreeSet<Resource> {
        let model = self.model;
        model
            .my_corners()
            .flat_map(|corner| model.topology.tiles_of(corner.id))
            .filter_map(|id| model.tiles.get(id))
            .filter(|tile| tile.produces())
            .filter_map(|tile| tile.resource())
            .collect()
    }

    /// Raw pips of an open corner, without any bonus.
    pub fn corner_pips(&self, corner_id: CornerId) -> u32 {
        let model = self.model;
        model
            .topology
            .tiles_of(corner_id)
            .iter()
            .filter_map(|id| model.tiles.get(id))
            .filter(|tile| tile.resource().is_some())
            .map(|tile| u32::from(tile.pips))
            .sum()
    }

    /// Best pip total among open corners two edges away, the nearest spots a
    /// settlement here would leave buildable.
    fn best_spot_beyond(&self, corner_id: CornerId) -> u32 {
        let topology = &self.model.topology;
        topology
            .neighbors_of(corner_id)
            .iter()
            .flat_map(|neighbor| topology.neighbors_of(*neighbor))
            .filter(|far| **far != corner_id && !topology.neighbors_of(corner_id).contains(far))
            .filter(|far| self.is_open(**far))
            .map(|far| self.corner_pips(*far))
            .max()
            .unwrap_or(0)
    }
}
