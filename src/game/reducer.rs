use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{Corner, CornerId, Edge, EdgeId, Port, Tile, TileId};
use crate::coords::{CornerCoord, CornerOrientation, EdgeCoord, EdgeOrientation};
use crate::decoder::Value;
use crate::game::model::GameModel;
use crate::game::resources::{
    COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle, count_resources,
};
use crate::protocol::{CodeTable, MessageKind, TypedMessage};
use crate::types::{ActionState, BuildingKind, ColorId, DevelopmentCard};

const LARGEST_ARMY_MIN_KNIGHTS: u32 = 3;

/// What a reducer pass changed, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModelEvent {
    SnapshotApplied {
        tiles: usize,
        corners: usize,
        edges: usize,
    },
    BuildingPlaced {
        corner: CornerId,
        owner: ColorId,
        building: BuildingKind,
    },
    CityUpgraded {
        corner: CornerId,
        owner: ColorId,
    },
    RoadPlaced {
        edge: EdgeId,
        owner: ColorId,
    },
    DiceRolled {
        dice: (u8, u8),
        sum: u8,
    },
    TurnChanged {
        color: Option<ColorId>,
        action: Option<ActionState>,
    },
    RobberMoved {
        tile: TileId,
    },
    ResourcesChanged {
        color: ColorId,
    },
    VictoryPointsChanged {
        color: ColorId,
        points: u32,
    },
    DevelopmentCardsChanged {
        color: ColorId,
    },
    LargestArmyChanged {
        holder: Option<ColorId>,
    },
    LegalSpotsPublished {
        kind: MessageKind,
        count: usize,
    },
    PauseChanged {
        paused: bool,
    },
}

impl ModelEvent {
    /// Board ownership changes, the events advisors care about most.
    pub fn is_placement(&self) -> bool {
        matches!(
            self,
            ModelEvent::BuildingPlaced { .. }
                | ModelEvent::CityUpgraded { .. }
                | ModelEvent::RoadPlaced { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Snapshot,
    Diff,
}

/// Applies decoded messages onto a [`GameModel`].
///
/// Every field is optional on the wire; anything missing is simply left as
/// it was.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reducer {
    pub codes: CodeTable,
}

impl Reducer {
    pub fn new(codes: CodeTable) -> Self {
        Self { codes }
    }

    /// Routes one typed message by its code.
    pub fn apply(&self, model: &mut GameModel, message: TypedMessage<'_>) -> Vec<ModelEvent> {
        let payload = message.payload;
        match message.kind {
            MessageKind::FullSnapshot if payload.is_map() => self.apply_full_snapshot(model, payload),
            MessageKind::ResourceDistribution => self.apply_resource_distribution(model, payload),
            kind @ (MessageKind::LegalSettlements
            | MessageKind::LegalRoads
            | MessageKind::LegalCities
            | MessageKind::LegalRobberTiles) => replace_legal_spots(model, kind, payload),
            MessageKind::Pause => {
                let paused = payload.field("paused").and_then(Value::as_bool);
                match paused {
                    Some(paused) if paused != model.paused => {
                        model.paused = paused;
                        vec![ModelEvent::PauseChanged { paused }]
                    }
                    _ => Vec::new(),
                }
            }
            MessageKind::GameActive => {
                if let Some(active) = payload.as_bool() {
                    model.game_active = active;
                }
                Vec::new()
            }
            kind => {
                if let Some(diff) = message.diff() {
                    self.apply_diff(model, diff)
                } else if payload.field("playerStates").is_some()
                    || payload.field("currentState").is_some()
                {
                    self.apply_diff(model, payload)
                } else {
                    debug!(code = kind.code(), "message carries nothing to apply");
                    Vec::new()
                }
            }
        }
    }

    /// Rebuilds the model from a full snapshot. Only the session id survives.
    pub fn apply_full_snapshot(&self, model: &mut GameModel, payload: &Value) -> Vec<ModelEvent> {
        *model = GameModel::with_session(model.session_id);
        model.my_color = payload.i64_field("playerColor").and_then(color_id);
        model.play_order = payload
            .field("playOrder")
            .map(Value::int_items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(color_id)
            .collect();

        if let Some(roster) = payload.field("playerUserStates") {
            for (_, entry) in roster.records() {
                let Some(color) = entry.i64_field("selectedColor").and_then(color_id) else {
                    warn!("roster entry without a selected colour");
                    continue;
                };
                let player = model.player_mut(color);
                player.name = entry
                    .field("username")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                player.is_bot = entry
                    .field("isBot")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                player.user_id = entry.field("userId").map(Value::key_string);
            }
        }
        for color in model.play_order.clone() {
            model.player_mut(color);
        }

        let mut pass = Pass::new(self.codes, model, Origin::Snapshot);
        pass.recompute_setup = true;
        if let Some(state) = payload.field("gameState") {
            pass.merge_state(state);
        } else {
            warn!("snapshot without gameState");
        }
        pass.finish();

        info!(
            my_color = ?model.my_color,
            players = model.players.len(),
            tiles = model.tiles.len(),
            corners = model.corners.len(),
            edges = model.edges.len(),
            setup = model.setup_phase,
            "snapshot applied"
        );
        vec![ModelEvent::SnapshotApplied {
            tiles: model.tiles.len(),
            corners: model.corners.len(),
            edges: model.edges.len(),
        }]
    }

    /// Shallow-merges a partial state onto the model.
    pub fn apply_diff(&self, model: &mut GameModel, diff: &Value) -> Vec<ModelEvent> {
        debug!(keys = ?diff.sorted_keys(), "applying diff");
        let mut pass = Pass::new(self.codes, model, Origin::Diff);
        pass.merge_state(diff);
        pass.finish()
    }

    /// Type 28: cards handed out to players. Feeds opponent estimates only;
    /// the observer's own hand arrives exactly through player states.
    pub fn apply_resource_distribution(&self, model: &mut GameModel, payload: &Value) -> Vec<ModelEvent> {
        let mut touched: BTreeSet<ColorId> = BTreeSet::new();
        for (_, entry) in payload.records() {
            let Some(owner) = entry.i64_field("owner").and_then(color_id) else {
                continue;
            };
            let Some(resource) = entry.i64_field("card").and_then(|card| self.codes.resource(card)) else {
                continue;
            };
            if model.my_color == Some(owner) {
                continue;
            }
            model.player_mut(owner).resources.add(resource, 1);
            touched.insert(owner);
        }
        touched
            .into_iter()
            .map(|color| ModelEvent::ResourcesChanged { color })
            .collect()
    }
}

/// Replaces one of the server-published legal sets.
pub fn replace_legal_spots(model: &mut GameModel, kind: MessageKind, payload: &Value) -> Vec<ModelEvent> {
    let Some(items) = payload.as_array() else {
        debug!(code = kind.code(), "legal spot payload is not a list");
        return Vec::new();
    };
    let ids: BTreeSet<u16> = items
        .iter()
        .filter_map(Value::as_i64)
        .filter_map(|id| u16::try_from(id).ok())
        .collect();
    let count = ids.len();
    match kind {
        MessageKind::LegalSettlements => model.available_settlements = ids,
        MessageKind::LegalRoads => model.available_roads = ids,
        MessageKind::LegalCities => model.available_cities = ids,
        MessageKind::LegalRobberTiles => model.available_robber_spots = ids,
        _ => return Vec::new(),
    }
    debug!(code = kind.code(), count, "legal spots replaced");
    vec![ModelEvent::LegalSpotsPublished { kind, count }]
}

/// Outcome of merging one corner record.
enum CornerChange {
    None,
    Placed(ColorId, BuildingKind),
    Upgraded(ColorId),
}

/// One reducer pass over a snapshot's game state or a diff.
struct Pass<'m> {
    codes: CodeTable,
    model: &'m mut GameModel,
    origin: Origin,
    events: Vec<ModelEvent>,
    topology_dirty: bool,
    recompute_setup: bool,
}

impl<'m> Pass<'m> {
    fn new(codes: CodeTable, model: &'m mut GameModel, origin: Origin) -> Self {
        Self {
            codes,
            model,
            origin,
            events: Vec::new(),
            topology_dirty: origin == Origin::Snapshot,
            recompute_setup: false,
        }
    }

    fn emit(&mut self, event: ModelEvent) {
        if self.origin == Origin::Diff {
            self.events.push(event);
        }
    }

    fn finish(self) -> Vec<ModelEvent> {
        if self.recompute_setup {
            self.model.recompute_setup_phase();
        }
        if self.topology_dirty {
            self.model.rebuild_topology();
            for issue in &self.model.topology.issues {
                debug!("topology: {issue}");
            }
        }
        self.events
    }

    fn merge_state(&mut self, state: &Value) {
        if let Some(map) = state.field("mapState") {
            self.merge_map(map);
        }
        if let Some(players) = state.field("playerStates") {
            self.merge_player_states(players);
        }
        if let Some(dev) = state.path(&["mechanicDevelopmentCardsState", "players"]) {
            self.merge_development_cards(dev);
        }
        if let Some(dice) = state.field("diceState") {
            self.merge_dice(dice);
        }
        if let Some(tile) = state
            .path(&["mechanicRobberState", "locationTileIndex"])
            .and_then(Value::as_i64)
            .and_then(|id| TileId::try_from(id).ok())
        {
            if self.model.robber_tile != Some(tile) {
                self.model.robber_tile = Some(tile);
                self.emit(ModelEvent::RobberMoved { tile });
            }
        }
        if let Some(current) = state.field("currentState") {
            self.merge_current_state(current);
        }
    }

    fn merge_map(&mut self, map: &Value) {
        if let Some(tiles) = map.field("tileHexStates") {
            for (id, record) in tiles.records() {
                match TileId::try_from(id) {
                    Ok(id) => self.merge_tile(id, record),
                    Err(_) => warn!(id, "tile id out of range"),
                }
            }
        }
        if let Some(corners) = map.field("tileCornerStates") {
            for (id, record) in corners.records() {
                match CornerId::try_from(id) {
                    Ok(id) => self.merge_corner(id, record),
                    Err(_) => warn!(id, "corner id out of range"),
                }
            }
        }
        if let Some(edges) = map.field("tileEdgeStates") {
            for (id, record) in edges.records() {
                match EdgeId::try_from(id) {
                    Ok(id) => self.merge_edge(id, record),
                    Err(_) => warn!(id, "edge id out of range"),
                }
            }
        }
        if let Some(ports) = map.field("portEdgeStates") {
            for (id, record) in ports.records() {
                match EdgeId::try_from(id) {
                    Ok(id) => self.merge_port(id, record),
                    Err(_) => warn!(id, "port id out of range"),
                }
            }
        }
    }

    fn merge_tile(&mut self, id: TileId, record: &Value) {
        let codes = self.codes;
        let tile = self.model.tiles.entry(id).or_insert_with(|| {
            self.topology_dirty = true;
            Tile::new(id)
        });
        if tile.coord.is_none() {
            if let Some((x, y)) = xy(record) {
                tile.coord = Some(crate::coords::HexCoord::new(x, y));
                self.topology_dirty = true;
            }
        }
        let terrain = record.i64_field("type").map(|code| codes.terrain(code));
        let number = record.get("diceNumber").map(|value| {
            value
                .as_i64()
                .and_then(|n| u8::try_from(n).ok())
                .filter(|n| (2..=12).contains(n))
        });
        if terrain.is_some() || number.is_some() {
            let terrain = terrain.unwrap_or(tile.terrain);
            let number = number.unwrap_or(tile.dice_number);
            tile.set_production(terrain, number);
        }
    }

    fn merge_corner(&mut self, id: CornerId, record: &Value) {
        let corner = self.model.corners.entry(id).or_insert_with(|| {
            self.topology_dirty = true;
            Corner::new(id)
        });
        if corner.coord.is_none() {
            let orientation = record.i64_field("z").and_then(CornerOrientation::from_code);
            if let (Some((x, y)), Some(orientation)) = (xy(record), orientation) {
                corner.coord = Some(CornerCoord::new(x, y, orientation));
                self.topology_dirty = true;
            }
        }

        let owner = record.i64_field("owner").and_then(color_id);
        let building = record
            .i64_field("buildingType")
            .and_then(BuildingKind::from_code);
        let change = match (corner.owner, owner) {
            (None, Some(owner)) => {
                let building = building.unwrap_or(BuildingKind::Settlement);
                corner.owner = Some(owner);
                corner.building = Some(building);
                CornerChange::Placed(owner, building)
            }
            (Some(previous), Some(owner)) if previous != owner => {
                warn!(corner = id, previous, owner, "ignoring owner change on an occupied corner");
                CornerChange::None
            }
            (Some(previous), _) => {
                if building == Some(BuildingKind::City) && corner.building != Some(BuildingKind::City) {
                    corner.building = Some(BuildingKind::City);
                    CornerChange::Upgraded(previous)
                } else {
                    CornerChange::None
                }
            }
            (None, None) => CornerChange::None,
        };

        match change {
            CornerChange::None => {}
            CornerChange::Placed(owner, building) => {
                if self.origin == Origin::Diff {
                    info!(
                        corner = id,
                        player = %self.model.player_name(owner),
                        "built {building}"
                    );
                    let cost = match building {
                        BuildingKind::Settlement => COST_SETTLEMENT,
                        BuildingKind::City => COST_CITY,
                    };
                    self.charge(owner, &cost);
                }
                self.emit(ModelEvent::BuildingPlaced {
                    corner: id,
                    owner,
                    building,
                });
            }
            CornerChange::Upgraded(owner) => {
                if self.origin == Origin::Diff {
                    info!(corner = id, player = %self.model.player_name(owner), "upgraded to city");
                    self.charge(owner, &COST_CITY);
                }
                self.emit(ModelEvent::CityUpgraded { corner: id, owner });
            }
        }
    }

    fn merge_edge(&mut self, id: EdgeId, record: &Value) {
        let edge = self.model.edges.entry(id).or_insert_with(|| {
            self.topology_dirty = true;
            Edge::new(id)
        });
        if edge.coord.is_none() {
            let orientation = record.i64_field("z").and_then(EdgeOrientation::from_code);
            if let (Some((x, y)), Some(orientation)) = (xy(record), orientation) {
                edge.coord = Some(EdgeCoord::new(x, y, orientation));
                self.topology_dirty = true;
            }
        }

        let Some(owner) = record.i64_field("owner").and_then(color_id) else {
            return;
        };
        let previous = edge.owner;
        if previous.is_none() {
            edge.owner = Some(owner);
        }
        match previous {
            None => {
                if self.origin == Origin::Diff {
                    info!(edge = id, player = %self.model.player_name(owner), "built road");
                    self.charge(owner, &COST_ROAD);
                }
                self.emit(ModelEvent::RoadPlaced { edge: id, owner });
            }
            Some(previous) if previous != owner => {
                warn!(edge = id, previous, owner, "ignoring owner change on an occupied edge");
            }
            Some(_) => {}
        }
    }

    fn merge_port(&mut self, id: EdgeId, record: &Value) {
        let kind = record.i64_field("type").and_then(|code| self.codes.port(code));
        let orientation = record.i64_field("z").and_then(EdgeOrientation::from_code);
        let coord = match (xy(record), orientation) {
            (Some((x, y)), Some(orientation)) => Some(EdgeCoord::new(x, y, orientation)),
            _ => None,
        };
        match self.model.ports.get_mut(&id) {
            Some(port) => {
                if port.coord.is_none() && coord.is_some() {
                    port.coord = coord;
                    self.topology_dirty = true;
                }
                if let Some(kind) = kind {
                    if port.kind != kind {
                        port.kind = kind;
                        self.topology_dirty = true;
                    }
                }
            }
            None => {
                let Some(kind) = kind else {
                    warn!(port = id, code = ?record.i64_field("type"), "unknown port type");
                    return;
                };
                self.model.ports.insert(
                    id,
                    Port {
                        edge_id: id,
                        coord,
                        kind,
                    },
                );
                self.topology_dirty = true;
            }
        }
    }

    fn merge_player_states(&mut self, players: &Value) {
        for (color, record) in players.records() {
            let Some(color) = color_id(color) else {
                continue;
            };
            let mine = self.model.my_color == Some(color);

            if let Some(points) = record.field("victoryPointsState") {
                let total = sum_numeric_fields(points);
                let player = self.model.player_mut(color);
                if player.victory_points != total {
                    player.victory_points = total;
                    if self.origin == Origin::Diff {
                        info!(player = %player.display_name(), points = total, "victory points");
                    }
                    self.emit(ModelEvent::VictoryPointsChanged {
                        color,
                        points: total,
                    });
                }
            }

            if let Some(cards) = record.path(&["resourceCards", "cards"]) {
                if mine {
                    let hand = count_resources(&cards.int_items(), self.codes);
                    self.model.my_resources = hand;
                    self.model.player_mut(color).resources = hand;
                    debug!(%hand, "own hand");
                    self.emit(ModelEvent::ResourcesChanged { color });
                }
            }
        }
    }

    fn merge_development_cards(&mut self, players: &Value) {
        let mut changed = false;
        for (color, record) in players.records() {
            let Some(color) = color_id(color) else {
                continue;
            };
            let mine = self.model.my_color == Some(color);
            let player = self.model.player_mut(color);
            let before = (
                player.dev_cards.clone(),
                player.hidden_dev_cards,
                player.played_dev_cards.clone(),
            );

            if let Some(cards) = record.path(&["developmentCards", "cards"]) {
                let ids = cards.int_items();
                let known: Vec<DevelopmentCard> = ids
                    .iter()
                    .filter_map(|&id| DevelopmentCard::from_code(id))
                    .collect();
                player.hidden_dev_cards = ids.len() - known.len();
                player.dev_cards = known;
            }
            if let Some(used) = record.field("developmentCardsUsed") {
                let played = used
                    .int_items()
                    .into_iter()
                    .filter_map(DevelopmentCard::from_code)
                    .collect();
                player.set_played_dev_cards(played);
            }

            let after = (
                player.dev_cards.clone(),
                player.hidden_dev_cards,
                player.played_dev_cards.clone(),
            );
            if after == before {
                continue;
            }
            changed = true;
            // a play can land as two diffs, the hand shrinking before the
            // used pile grows, so compare against the peak
            let bought = player.record_dev_card_total();
            if self.origin == Origin::Diff && !mine {
                for _ in 0..bought {
                    self.charge(color, &COST_DEVELOPMENT);
                }
            }
            self.emit(ModelEvent::DevelopmentCardsChanged { color });
        }
        if changed {
            self.update_largest_army();
        }
    }

    fn update_largest_army(&mut self) {
        let holder = largest_army_holder(self.model);
        if holder == self.model.largest_army {
            return;
        }
        self.model.largest_army = holder;
        for player in self.model.players.values_mut() {
            player.has_largest_army = Some(player.color) == holder;
        }
        if self.origin == Origin::Diff {
            info!(holder = ?holder, "largest army changed");
        }
        self.emit(ModelEvent::LargestArmyChanged { holder });
    }

    fn merge_dice(&mut self, dice: &Value) {
        if dice.field("dice1").is_none() && dice.field("dice2").is_none() {
            return;
        }
        let last = self.model.last_dice;
        let first = dice.i64_field("dice1").or(last.map(|(a, _)| i64::from(a)));
        let second = dice.i64_field("dice2").or(last.map(|(_, b)| i64::from(b)));
        let (Some(first), Some(second)) = (first.and_then(die), second.and_then(die)) else {
            debug!(?first, ?second, "no usable dice values");
            return;
        };
        self.model.last_dice = Some((first, second));
        if self.origin == Origin::Diff {
            let sum = first + second;
            self.model.dice_history.push(sum);
            info!(first, second, sum, "dice rolled");
            self.emit(ModelEvent::DiceRolled {
                dice: (first, second),
                sum,
            });
        }
    }

    fn merge_current_state(&mut self, current: &Value) {
        let previous_action = self.model.current_action;
        let previous_color = self.model.current_turn_color;

        if let Some(code) = current.i64_field("actionState") {
            self.model.current_action = Some(ActionState::from_code(code));
        }
        if let Some(color) = current.i64_field("currentTurnPlayerColor").and_then(color_id) {
            self.model.current_turn_color = Some(color);
        }
        if let Some(turns) = current.i64_field("completedTurns") {
            self.model.completed_turns = u32::try_from(turns).unwrap_or(0);
            self.recompute_setup = true;
        }

        let action_changed = self.model.current_action != previous_action;
        let color_changed = self.model.current_turn_color != previous_color;
        if action_changed || color_changed {
            let model = &mut *self.model;
            model.available_settlements.clear();
            model.available_roads.clear();
            model.available_cities.clear();
            model.available_robber_spots.clear();
            if self.origin == Origin::Diff {
                let who = model
                    .current_turn_color
                    .map(|color| model.player_name(color))
                    .unwrap_or_default();
                info!(
                    player = %who,
                    action = ?model.current_action,
                    mine = model.is_my_turn(),
                    "turn state"
                );
            }
            self.emit(ModelEvent::TurnChanged {
                color: self.model.current_turn_color,
                action: self.model.current_action,
            });
        }
    }

    /// Deducts a build cost from an opponent's estimate outside setup.
    ///
    /// The phase is the one the pass started in. `finish` applies a new
    /// `completedTurns` only after every merge, so the last setup placement
    /// stays free even when it shares a diff with the turn that ends setup.
    fn charge(&mut self, color: ColorId, cost: &ResourceBundle) {
        if self.model.setup_phase || self.model.my_color == Some(color) {
            return;
        }
        let player = self.model.player_mut(color);
        if let Err(err) = player.pay(cost) {
            debug!(player = %player.display_name(), "estimate short: {err}");
        }
        self.emit(ModelEvent::ResourcesChanged { color });
    }
}

/// Holder after applying the rule that the title moves only when strictly
/// exceeded, and a tie for the lead with no holder among it leaves it vacant.
fn largest_army_holder(model: &GameModel) -> Option<ColorId> {
    let best = model
        .players
        .values()
        .map(|player| player.knights_played)
        .max()
        .unwrap_or(0);
    if best < LARGEST_ARMY_MIN_KNIGHTS {
        return None;
    }
    let leaders: Vec<ColorId> = model
        .players
        .values()
        .filter(|player| player.knights_played == best)
        .map(|player| player.color)
        .collect();
    match model.largest_army {
        Some(current) if leaders.contains(&current) => Some(current),
        _ if leaders.len() == 1 => leaders.first().copied(),
        _ => None,
    }
}

fn color_id(raw: i64) -> Option<ColorId> {
    ColorId::try_from(raw).ok().filter(|color| *color > 0)
}

fn die(raw: i64) -> Option<u8> {
    u8::try_from(raw).ok().filter(|value| (1..=6).contains(value))
}

fn xy(record: &Value) -> Option<(i32, i32)> {
    let x = i32::try_from(record.i64_field("x")?).ok()?;
    let y = i32::try_from(record.i64_field("y")?).ok()?;
    Some((x, y))
}

fn sum_numeric_fields(record: &Value) -> u32 {
    let total: i64 = record
        .as_map()
        .unwrap_or_default()
        .iter()
        .filter_map(|(_, value)| value.as_i64())
        .sum();
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn snapshot() -> Value {
        value(json!({
            "playerColor": 1,
            "playOrder": [1, 2],
            "playerUserStates": [
                { "username": "me", "isBot": false, "userId": 10, "selectedColor": 1 },
                { "username": "bot", "isBot": true, "userId": "b", "selectedColor": 2 }
            ],
            "gameState": {
                "mapState": {
                    "tileHexStates": {
                        "0": { "x": 0, "y": 0, "type": 5, "diceNumber": 8 },
                        "1": { "x": 1, "y": 0, "type": 0, "diceNumber": 0 }
                    },
                    "tileCornerStates": {
                        "0": { "x": 0, "y": 0, "z": 0 },
                        "1": { "x": 0, "y": 0, "z": 1 },
                        "2": { "x": 1, "y": 0, "z": 0 }
                    },
                    "tileEdgeStates": {
                        "0": { "x": 0, "y": 0, "z": 2 },
                        "1": { "x": 0, "y": 0, "z": 1 }
                    },
                    "portEdgeStates": {
                        "0": { "x": 0, "y": 0, "z": 2, "type": 6 }
                    }
                },
                "currentState": { "actionState": 1, "currentTurnPlayerColor": 1, "completedTurns": 0 },
                "mechanicRobberState": { "locationTileIndex": 1 },
                "playerStates": {
                    "1": {
                        "victoryPointsState": { "0": 2 },
                        "resourceCards": { "cards": [1, 5, 5] }
                    }
                }
            }
        }))
    }

    #[test]
    fn snapshot_populates_the_model() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        let events = reducer.apply_full_snapshot(&mut model, &snapshot());

        assert_eq!(events.len(), 1);
        assert_eq!(model.my_color, Some(1));
        assert_eq!(model.players[&2].name.as_deref(), Some("bot"));
        assert!(model.players[&2].is_bot);
        assert_eq!(model.players[&1].user_id.as_deref(), Some("10"));
        assert_eq!(model.tiles[&0].pips, 5);
        assert_eq!(model.tiles[&1].dice_number, None);
        assert_eq!(model.robber_tile, Some(1));
        assert_eq!(model.current_action, Some(ActionState::PlaceSettlement));
        assert!(model.setup_phase);
        assert_eq!(model.players[&1].victory_points, 2);
        assert_eq!(model.my_resources, ResourceBundle::from_counts([1, 0, 0, 0, 2]));
        assert_eq!(model.topology.ends_of(0), Some([0, 1]));
        assert!(model.corners[&0].port.is_some());
    }

    #[test]
    fn snapshot_twice_is_a_no_op() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        let once = model.clone();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        assert_eq!(model, once);
    }

    #[test]
    fn diff_places_buildings_once() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());

        let diff = value(json!({ "mapState": { "tileCornerStates": { "2": { "owner": 2, "buildingType": 1 } } } }));
        let events = reducer.apply_diff(&mut model, &diff);
        assert!(events.contains(&ModelEvent::BuildingPlaced {
            corner: 2,
            owner: 2,
            building: BuildingKind::Settlement
        }));

        let steal = value(json!({ "mapState": { "tileCornerStates": { "2": { "owner": 1 } } } }));
        assert!(reducer.apply_diff(&mut model, &steal).is_empty());
        assert_eq!(model.corners[&2].owner, Some(2));

        let upgrade = value(json!({ "mapState": { "tileCornerStates": { "2": { "owner": 2, "buildingType": 2 } } } }));
        let events = reducer.apply_diff(&mut model, &upgrade);
        assert_eq!(events[0], ModelEvent::CityUpgraded { corner: 2, owner: 2 });
        assert_eq!(model.corners[&2].building, Some(BuildingKind::City));
    }

    #[test]
    fn unknown_ids_are_created_lazily() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        let diff = value(json!({
            "mapState": {
                "tileCornerStates": { "40": { "owner": 3, "buildingType": 1 } },
                "tileEdgeStates": { "70": { "owner": 3 } }
            }
        }));
        let events = reducer.apply_diff(&mut model, &diff);
        assert_eq!(model.corners[&40].owner, Some(3));
        assert_eq!(model.edges[&70].owner, Some(3));
        assert_eq!(events.iter().filter(|e| e.is_placement()).count(), 2);
    }

    #[test]
    fn dice_and_turn_changes() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        model.available_settlements.insert(2);

        let diff = value(json!({
            "diceState": { "dice1": 3, "dice2": 4 },
            "currentState": { "actionState": 7, "completedTurns": 4 }
        }));
        let events = reducer.apply_diff(&mut model, &diff);
        assert!(events.contains(&ModelEvent::DiceRolled { dice: (3, 4), sum: 7 }));
        assert_eq!(model.dice_history, vec![7]);
        assert!(model.available_settlements.is_empty());
        assert!(!model.setup_phase);
    }

    #[test]
    fn own_hand_is_replaced_not_merged() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        let diff = value(json!({ "playerStates": { "1": { "resourceCards": { "cards": [4, 4] } } } }));
        reducer.apply_diff(&mut model, &diff);
        assert_eq!(model.my_resources, ResourceBundle::from_counts([0, 0, 0, 2, 0]));
    }

    #[test]
    fn opponent_estimates_rise_and_fall() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        model.completed_turns = 10;
        model.setup_phase = false;

        let handout = value(json!([
            { "owner": 2, "card": 1 },
            { "owner": 2, "card": 2 },
            { "owner": 1, "card": 3 }
        ]));
        let events = reducer.apply_resource_distribution(&mut model, &handout);
        assert_eq!(events, vec![ModelEvent::ResourcesChanged { color: 2 }]);
        assert_eq!(model.players[&2].resources, COST_ROAD);

        let road = value(json!({ "mapState": { "tileEdgeStates": { "1": { "owner": 2 } } } }));
        reducer.apply_diff(&mut model, &road);
        assert!(model.players[&2].resources.is_empty());
        assert_eq!(model.my_resources, ResourceBundle::from_counts([1, 0, 0, 0, 2]));
    }

    #[test]
    fn split_card_play_is_not_a_purchase() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        model.completed_turns = 10;
        model.setup_phase = false;
        let handout = || {
            value(json!([
                { "owner": 2, "card": 3 },
                { "owner": 2, "card": 4 },
                { "owner": 2, "card": 5 }
            ]))
        };
        let dev = |held: Vec<i64>, used: Option<Vec<i64>>| {
            let mut record = json!({ "developmentCards": { "cards": held } });
            if let Some(used) = used {
                record["developmentCardsUsed"] = json!(used);
            }
            value(json!({ "mechanicDevelopmentCardsState": { "players": { "2": record } } }))
        };

        reducer.apply_resource_distribution(&mut model, &handout());
        reducer.apply_diff(&mut model, &dev(vec![11], None));
        assert!(model.players[&2].resources.is_empty());

        reducer.apply_resource_distribution(&mut model, &handout());
        reducer.apply_diff(&mut model, &dev(vec![], None));
        reducer.apply_diff(&mut model, &dev(vec![], Some(vec![11])));
        assert_eq!(model.players[&2].resources, COST_DEVELOPMENT);
        assert_eq!(model.players[&2].knights_played, 1);

        reducer.apply_diff(&mut model, &dev(vec![11], Some(vec![11])));
        assert!(model.players[&2].resources.is_empty());
    }

    #[test]
    fn last_setup_placement_is_free_with_the_closing_turn() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());
        reducer.apply_resource_distribution(&mut model, &value(json!([
            { "owner": 2, "card": 1 },
            { "owner": 2, "card": 2 }
        ])));
        let before = model.players[&2].resources;
        assert_eq!(before, COST_ROAD);

        let diff = value(json!({
            "mapState": { "tileEdgeStates": { "1": { "owner": 2 } } },
            "currentState": { "completedTurns": 4 }
        }));
        reducer.apply_diff(&mut model, &diff);
        assert!(!model.setup_phase);
        assert_eq!(model.players[&2].resources, before);
    }

    #[test]
    fn largest_army_needs_a_strict_lead() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        reducer.apply_full_snapshot(&mut model, &snapshot());

        let knights = |a: usize, b: usize| {
            value(json!({
                "mechanicDevelopmentCardsState": { "players": {
                    "1": { "developmentCardsUsed": vec![11; a] },
                    "2": { "developmentCardsUsed": vec![11; b] }
                } }
            }))
        };
        reducer.apply_diff(&mut model, &knights(3, 3));
        assert_eq!(model.largest_army, None);
        reducer.apply_diff(&mut model, &knights(3, 4));
        assert_eq!(model.largest_army, Some(2));
        reducer.apply_diff(&mut model, &knights(4, 4));
        assert_eq!(model.largest_army, Some(2));
        reducer.apply_diff(&mut model, &knights(5, 4));
        assert_eq!(model.largest_army, Some(1));
        assert!(model.players[&1].has_largest_army);
        assert!(!model.players[&2].has_largest_army);
    }

    #[test]
    fn legal_spots_replace_previous_sets() {
        let mut model = GameModel::new();
        replace_legal_spots(&mut model, MessageKind::LegalSettlements, &value(json!([3, 4, 4])));
        assert_eq!(model.available_settlements.len(), 2);
        replace_legal_spots(&mut model, MessageKind::LegalSettlements, &value(json!([9])));
        assert_eq!(model.available_settlements, BTreeSet::from([9]));
        assert!(replace_legal_spots(&mut model, MessageKind::LegalRoads, &value(json!({}))).is_empty());
    }

    #[test]
    fn typed_payload_without_diff_still_updates_state() {
        let reducer = Reducer::default();
        let mut model = GameModel::new();
        let message = value(json!({ "type": 12, "payload": { "currentState": { "currentTurnPlayerColor": 3 } } }));
        let envelope = crate::protocol::Envelope::classify(&message);
        reducer.apply(&mut model, envelope.message().unwrap());
        assert_eq!(model.current_turn_color, Some(3));
    }
}
