#![allow(dead_code)]

use colonist_advisor::Value;
use serde_json::{Map, Value as Json, json};

/// Standard tile codes for the 19 land hexes, desert in the middle.
const TILE_CODES: [i64; 19] = [1, 3, 4, 2, 5, 1, 3, 4, 2, 0, 5, 1, 3, 4, 2, 5, 1, 3, 4];
const DICE_NUMBERS: [i64; 18] = [5, 2, 6, 3, 8, 10, 9, 12, 11, 4, 8, 10, 9, 4, 5, 6, 3, 11];
pub const DESERT_TILE: usize = 9;
pub const RESOLVED_EDGES: usize = 57;

pub fn tile_coords() -> Vec<(i32, i32)> {
    let mut coords = Vec::new();
    for x in -2..=2i32 {
        for y in -2..=2 {
            if (x + y).abs() <= 2 {
                coords.push((x, y));
            }
        }
    }
    coords
}

fn touching(x: i32, y: i32, z: i64) -> [(i32, i32); 3] {
    if z == 0 {
        [(x, y), (x - 1, y), (x, y - 1)]
    } else {
        [(x, y), (x + 1, y), (x, y + 1)]
    }
}

fn endpoints(x: i32, y: i32, z: i64) -> [(i32, i32, i64); 2] {
    match z {
        0 => [(x, y, 0), (x, y + 1, 1)],
        1 => [(x, y, 1), (x + 1, y, 0)],
        _ => [(x, y, 0), (x, y, 1)],
    }
}

/// Every vertex touching a land hex, in (x, y, z) order.
pub fn corner_coords() -> Vec<(i32, i32, i64)> {
    let tiles = tile_coords();
    let mut coords = Vec::new();
    for x in -4..=4 {
        for y in -4..=4 {
            for z in 0..2 {
                if touching(x, y, z).iter().any(|hex| tiles.contains(hex)) {
                    coords.push((x, y, z));
                }
            }
        }
    }
    coords
}

/// Edges whose endpoints both exist, then border edges with a single known
/// endpoint, 72 in total.
pub fn edge_coords() -> Vec<(i32, i32, i64)> {
    let corners = corner_coords();
    let mut full = Vec::new();
    let mut partial = Vec::new();
    for x in -4..=4 {
        for y in -4..=4 {
            for z in 0..3 {
                let known = endpoints(x, y, z)
                    .iter()
                    .filter(|end| corners.contains(end))
                    .count();
                match known {
                    2 => full.push((x, y, z)),
                    1 => partial.push((x, y, z)),
                    _ => {}
                }
            }
        }
    }
    full.extend(partial.into_iter().take(72 - RESOLVED_EDGES));
    full
}

fn indexed(items: impl IntoIterator<Item = Json>) -> Json {
    let map: Map<String, Json> = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| (idx.to_string(), item))
        .collect();
    Json::Object(map)
}

pub fn map_state() -> Json {
    let mut numbers = DICE_NUMBERS.iter();
    let tiles = tile_coords()
        .into_iter()
        .zip(TILE_CODES)
        .map(|((x, y), code)| {
            let number = if code == 0 { 0 } else { *numbers.next().unwrap_or(&0) };
            json!({ "x": x, "y": y, "type": code, "diceNumber": number })
        });
    let corners = corner_coords()
        .into_iter()
        .map(|(x, y, z)| json!({ "x": x, "y": y, "z": z }));
    let edge_coords = edge_coords();
    let (px, py, pz) = edge_coords[0];
    let (qx, qy, qz) = edge_coords[RESOLVED_EDGES - 1];
    let edges = edge_coords
        .into_iter()
        .map(|(x, y, z)| json!({ "x": x, "y": y, "z": z }));
    json!({
        "tileHexStates": indexed(tiles),
        "tileCornerStates": indexed(corners),
        "tileEdgeStates": indexed(edges),
        "portEdgeStates": {
            "0": { "x": px, "y": py, "z": pz, "type": 1 },
            "1": { "x": qx, "y": qy, "z": qz, "type": 6 }
        }
    })
}

/// Type 4 frame for a four player game where the observer is colour 1 and
/// nothing has been built yet.
pub fn snapshot_frame(resource_cards: &[i64]) -> Json {
    json!({
        "type": 4,
        "payload": {
            "playerColor": 1,
            "playOrder": [1, 2, 3, 4],
            "playerUserStates": [
                { "username": "observer", "isBot": false, "userId": 1, "selectedColor": 1 },
                { "username": "bob", "isBot": false, "userId": 2, "selectedColor": 2 },
                { "username": "bot-a", "isBot": true, "userId": "a", "selectedColor": 3 },
                { "username": "bot-b", "isBot": true, "userId": "b", "selectedColor": 4 }
            ],
            "gameState": {
                "mapState": map_state(),
                "currentState": { "actionState": 1, "currentTurnPlayerColor": 1, "completedTurns": 0 },
                "mechanicRobberState": { "locationTileIndex": DESERT_TILE },
                "playerStates": {
                    "1": {
                        "victoryPointsState": {},
                        "resourceCards": { "cards": resource_cards }
                    },
                    "2": { "victoryPointsState": {} },
                    "3": { "victoryPointsState": {} },
                    "4": { "victoryPointsState": {} }
                }
            }
        }
    })
}

pub fn diff_frame(diff: Json) -> Json {
    json!({ "type": 91, "payload": { "diff": diff } })
}

pub fn value(json: Json) -> Value {
    Value::from(json)
}

pub fn msgpack(json: &Json) -> Vec<u8> {
    rmp_serde::to_vec(json).expect("serde_json values always encode")
}
