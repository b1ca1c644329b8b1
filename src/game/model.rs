use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use uuid::Uuid;

use crate::board::{Corner, CornerId, Edge, EdgeId, Port, Tile, TileId, Topology};
use crate::game::players::PlayerState;
use crate::game::resources::ResourceBundle;
use crate::types::{ActionState, BuildingKind, ColorId};

const DEFAULT_PLAYER_COUNT: usize = 4;

/// Everything known about one observed game.
///
/// The reducer is the only writer; advisors and reports read it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameModel {
    pub session_id: Uuid,
    pub my_color: Option<ColorId>,
    pub play_order: Vec<ColorId>,
    pub players: BTreeMap<ColorId, PlayerState>,
    pub tiles: BTreeMap<TileId, Tile>,
    pub corners: BTreeMap<CornerId, Corner>,
    pub edges: BTreeMap<EdgeId, Edge>,
    pub ports: BTreeMap<EdgeId, Port>,
    #[serde(skip)]
    pub topology: Topology,
    pub current_action: Option<ActionState>,
    pub current_turn_color: Option<ColorId>,
    pub completed_turns: u32,
    pub setup_phase: bool,
    pub robber_tile: Option<TileId>,
    pub last_dice: Option<(u8, u8)>,
    /// Sums of every roll observed, oldest first.
    pub dice_history: Vec<u8>,
    pub my_resources: ResourceBundle,
    pub available_settlements: BTreeSet<CornerId>,
    pub available_roads: BTreeSet<EdgeId>,
    pub available_cities: BTreeSet<CornerId>,
    pub available_robber_spots: BTreeSet<TileId>,
    pub largest_army: Option<ColorId>,
    pub paused: bool,
    pub game_active: bool,
}

impl Default for GameModel {
    fn default() -> Self {
        Self::with_session(Uuid::new_v4())
    }
}

impl GameModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session_id: Uuid) -> Self {
        Self {
            session_id,
            my_color: None,
            play_order: Vec::new(),
            players: BTreeMap::new(),
            tiles: BTreeMap::new(),
            corners: BTreeMap::new(),
            edges: BTreeMap::new(),
            ports: BTreeMap::new(),
            topology: Topology::default(),
            current_action: None,
            current_turn_color: None,
            completed_turns: 0,
            setup_phase: true,
            robber_tile: None,
            last_dice: None,
            dice_history: Vec::new(),
            my_resources: ResourceBundle::zero(),
            available_settlements: BTreeSet::new(),
            available_roads: BTreeSet::new(),
            available_cities: BTreeSet::new(),
            available_robber_spots: BTreeSet::new(),
            largest_army: None,
            paused: false,
            game_active: false,
        }
    }

    /// Seats known so far, or the standard four before any roster arrives.
    pub fn num_players(&self) -> usize {
        if self.players.is_empty() {
            DEFAULT_PLAYER_COUNT
        } else {
            self.players.len()
        }
    }

    pub fn recompute_setup_phase(&mut self) {
        self.setup_phase = (self.completed_turns as usize) < self.num_players() * 2;
    }

    pub fn is_my_turn(&self) -> bool {
        self.my_color.is_some() && self.current_turn_color == self.my_color
    }

    pub fn is_mine(&self, owner: Option<ColorId>) -> bool {
        owner.is_some() && owner == self.my_color
    }

    pub fn player_name(&self, color: ColorId) -> String {
        self.players
            .get(&color)
            .map(PlayerState::display_name)
            .unwrap_or_else(|| crate::types::color_label(color))
    }

    pub fn player_mut(&mut self, color: ColorId) -> &mut PlayerState {
        self.players
            .entry(color)
            .or_insert_with(|| PlayerState::new(color))
    }

    /// Corners carrying one of the observer's buildings.
    pub fn my_corners(&self) -> impl Iterator<Item = &Corner> + '_ {
        self.corners
            .values()
            .filter(|corner| self.is_mine(corner.owner))
    }

    pub fn my_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values().filter(|edge| self.is_mine(edge.owner))
    }

    pub fn my_settlements(&self) -> impl Iterator<Item = &Corner> + '_ {
        self.my_corners()
            .filter(|corner| corner.building == Some(BuildingKind::Settlement))
    }

    /// Recomputes adjacency and copies port descriptors onto corners.
    pub fn rebuild_topology(&mut self) {
        self.topology = Topology::build(&self.tiles, &self.corners, &self.edges, &self.ports);
        for (id, corner) in self.corners.iter_mut() {
            corner.port = self.topology.port_of(*id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_phase_follows_turn_count() {
        let mut model = GameModel::new();
        model.completed_turns = 7;
        model.recompute_setup_phase();
        assert!(model.setup_phase);
        model.completed_turns = 8;
        model.recompute_setup_phase();
        assert!(!model.setup_phase);

        model.player_mut(1);
        model.player_mut(2);
        model.completed_turns = 4;
        model.recompute_setup_phase();
        assert!(!model.setup_phase);
    }

    #[test]
    fn turn_ownership() {
        let mut model = GameModel::new();
        assert!(!model.is_my_turn());
        model.my_color = Some(2);
        model.current_turn_color = Some(2);
        assert!(model.is_my_turn());
        assert!(!model.is_mine(None));
    }

    #[test]
    fn sessions_are_distinct() {
        assert_ne!(GameModel::new().session_id, GameModel::new().session_id);
    }
}
