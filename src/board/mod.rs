use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::coords::{CornerCoord, EdgeCoord, HexCoord};
use crate::types::{BuildingKind, ColorId, Resource, Terrain};

mod topology;

pub use topology::{Topology, TopologyIssue};

pub type TileId = u16;
pub type CornerId = u16;
pub type EdgeId = u16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub coord: Option<HexCoord>,
    pub terrain: Terrain,
    pub dice_number: Option<u8>,
    pub pips: u8,
}

impl Tile {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            coord: None,
            terrain: Terrain::Unknown,
            dice_number: None,
            pips: 0,
        }
    }

    /// Replaces the producing attributes; the pip weight follows the number.
    pub fn set_production(&mut self, terrain: Terrain, dice_number: Option<u8>) {
        self.terrain = terrain;
        self.dice_number = if terrain.is_desert() { None } else { dice_number };
        self.pips = self.dice_number.map(pips).unwrap_or(0);
    }

    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }

    /// Tiles that pay out on some roll.
    pub fn produces(&self) -> bool {
        self.resource().is_some() && self.pips > 0
    }

    pub fn label(&self) -> String {
        match self.dice_number {
            Some(number) => format!("{}({number})", self.terrain),
            None => self.terrain.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub id: CornerId,
    pub coord: Option<CornerCoord>,
    pub owner: Option<ColorId>,
    pub building: Option<BuildingKind>,
    pub port: Option<PortKind>,
}

impl Corner {
    pub fn new(id: CornerId) -> Self {
        Self {
            id,
            coord: None,
            owner: None,
            building: None,
            port: None,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub coord: Option<EdgeCoord>,
    pub owner: Option<ColorId>,
}

impl Edge {
    pub fn new(id: EdgeId) -> Self {
        Self {
            id,
            coord: None,
            owner: None,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }
}

/// Maritime exchange offered by a port; `resource: None` is the generic 3:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortKind {
    pub ratio: u8,
    pub resource: Option<Resource>,
}

impl PortKind {
    pub const GENERIC: PortKind = PortKind {
        ratio: 3,
        resource: None,
    };

    pub fn specific(resource: Resource) -> Self {
        Self {
            ratio: 2,
            resource: Some(resource),
        }
    }

    pub fn is_generic(&self) -> bool {
        self.resource.is_none()
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource {
            Some(resource) => write!(f, "{}:1 {resource}", self.ratio),
            None => write!(f, "{}:1 any", self.ratio),
        }
    }
}

/// A port sits on an edge and is identified by that edge's index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub edge_id: EdgeId,
    pub coord: Option<EdgeCoord>,
    pub kind: PortKind,
}

/// Number of two-dice combinations producing `number`, 0 outside 2..=12.
pub fn pips(number: u8) -> u8 {
    *DICE_PIPS.get(&number).unwrap_or(&0)
}

static DICE_PIPS: Lazy<HashMap<u8, u8>> = Lazy::new(|| {
    let mut table: HashMap<u8, u8> = HashMap::new();
    for i in 1..=6u8 {
        for j in 1..=6u8 {
            *table.entry(i + j).or_insert(0) += 1;
        }
    }
    table
});
