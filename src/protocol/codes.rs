use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::board::PortKind;
use crate::types::{Resource, Terrain};

/// Numeric enumeration the server uses for resources, tiles and ports.
///
/// Captures disagree on which table is live, so the choice is configuration
/// rather than a constant.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CodeTable {
    /// 1..5: wood, brick, sheep, wheat, ore.
    #[default]
    Standard,
    /// 1..5: wood, sheep, ore, wheat, brick.
    Alternate,
}

impl CodeTable {
    /// Resource card id.
    pub fn resource(self, code: i64) -> Option<Resource> {
        let table = match self {
            CodeTable::Standard => STANDARD_RESOURCES,
            CodeTable::Alternate => ALTERNATE_RESOURCES,
        };
        lookup(&table, code)
    }

    /// Tile `type` field.
    pub fn terrain(self, code: i64) -> Terrain {
        if code == 0 {
            return Terrain::Desert;
        }
        let resource = match self {
            CodeTable::Standard => lookup(&STANDARD_RESOURCES, code),
            CodeTable::Alternate => lookup(&ALTERNATE_TILES, code),
        };
        match resource {
            Some(Resource::Wood) => Terrain::Wood,
            Some(Resource::Brick) => Terrain::Brick,
            Some(Resource::Sheep) => Terrain::Sheep,
            Some(Resource::Wheat) => Terrain::Wheat,
            Some(Resource::Ore) => Terrain::Ore,
            None => Terrain::Unknown,
        }
    }

    /// Port `type` field; 1 is the generic 3:1 in both tables.
    pub fn port(self, code: i64) -> Option<PortKind> {
        if code == 1 {
            return Some(PortKind::GENERIC);
        }
        let table = match self {
            CodeTable::Standard => STANDARD_PORTS,
            CodeTable::Alternate => ALTERNATE_PORTS,
        };
        lookup(&table, code - 1).map(PortKind::specific)
    }
}

const STANDARD_RESOURCES: [Resource; 5] = [
    Resource::Wood,
    Resource::Brick,
    Resource::Sheep,
    Resource::Wheat,
    Resource::Ore,
];

const ALTERNATE_RESOURCES: [Resource; 5] = [
    Resource::Wood,
    Resource::Sheep,
    Resource::Ore,
    Resource::Wheat,
    Resource::Brick,
];

const ALTERNATE_TILES: [Resource; 5] = [
    Resource::Wheat,
    Resource::Sheep,
    Resource::Ore,
    Resource::Wood,
    Resource::Brick,
];

// indexed from port code 2
const STANDARD_PORTS: [Resource; 5] = STANDARD_RESOURCES;

const ALTERNATE_PORTS: [Resource; 5] = [
    Resource::Sheep,
    Resource::Brick,
    Resource::Ore,
    Resource::Wood,
    Resource::Wheat,
];

/// One-based lookup.
fn lookup(table: &[Resource; 5], code: i64) -> Option<Resource> {
    let idx = usize::try_from(code).ok()?.checked_sub(1)?;
    table.get(idx).copied()
}
