use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Protocol colour code of a seat (1..=4 on standard boards, wider in larger lobbies).
pub type ColorId = u8;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Desert,
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
    Unknown,
}

impl Terrain {
    pub fn resource(self) -> Option<Resource> {
        match self {
            Terrain::Wood => Some(Resource::Wood),
            Terrain::Brick => Some(Resource::Brick),
            Terrain::Sheep => Some(Resource::Sheep),
            Terrain::Wheat => Some(Resource::Wheat),
            Terrain::Ore => Some(Resource::Ore),
            Terrain::Desert | Terrain::Unknown => None,
        }
    }

    pub fn is_desert(self) -> bool {
        matches!(self, Terrain::Desert)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Settlement,
    City,
}

impl BuildingKind {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(BuildingKind::Settlement),
            2 => Some(BuildingKind::City),
            _ => None,
        }
    }

    pub fn victory_points(self) -> u32 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }

    /// Production multiplier on adjacent tiles.
    pub fn yield_factor(self) -> u32 {
        self.victory_points()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentCard {
    Knight,
    VictoryPoint,
    Monopoly,
    RoadBuilding,
    YearOfPlenty,
}

impl DevelopmentCard {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            11 => Some(DevelopmentCard::Knight),
            12 => Some(DevelopmentCard::VictoryPoint),
            13 => Some(DevelopmentCard::Monopoly),
            14 => Some(DevelopmentCard::RoadBuilding),
            15 => Some(DevelopmentCard::YearOfPlenty),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Blue,
    Orange,
    White,
}

impl Color {
    pub const ORDERED: [Color; 4] = [Color::Red, Color::Blue, Color::Orange, Color::White];

    pub fn from_code(code: ColorId) -> Option<Self> {
        match code {
            1..=4 => Some(Self::ORDERED[usize::from(code) - 1]),
            _ => None,
        }
    }

    pub fn code(self) -> ColorId {
        match self {
            Color::Red => 1,
            Color::Blue => 2,
            Color::Orange => 3,
            Color::White => 4,
        }
    }
}

/// Human label for a colour code, falling back to the raw number.
pub fn color_label(code: ColorId) -> String {
    Color::from_code(code)
        .map(|color| color.to_string())
        .unwrap_or_else(|| format!("color {code}"))
}

/// What the server currently expects from the acting colour.
///
/// The engine never drives these transitions; it only reacts to the codes
/// published in `currentState.actionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    RollDice,
    PlaceSettlement,
    PlaceRoad,
    Discard,
    MainTurn,
    PlaceRobber,
    StealCard,
    Unknown(i64),
}

impl ActionState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ActionState::RollDice,
            1 => ActionState::PlaceSettlement,
            3 => ActionState::PlaceRoad,
            4 => ActionState::Discard,
            7 => ActionState::MainTurn,
            24 => ActionState::PlaceRobber,
            25 => ActionState::StealCard,
            other => ActionState::Unknown(other),
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionState::RollDice => "roll_dice",
            ActionState::PlaceSettlement => "place_settlement",
            ActionState::PlaceRoad => "place_road",
            ActionState::Discard => "discard",
            ActionState::MainTurn => "main_turn",
            ActionState::PlaceRobber => "place_robber",
            ActionState::StealCard => "steal_card",
            ActionState::Unknown(code) => return write!(f, "unknown({code})"),
        };
        write!(f, "{label}")
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
pub enum BuildAction {
    #[strum(serialize = "Build City")]
    City,
    #[strum(serialize = "Build Settlement")]
    Settlement,
    #[strum(serialize = "Buy Dev Card")]
    DevelopmentCard,
    #[strum(serialize = "Build Road")]
    Road,
}

impl BuildAction {
    pub const ALL: [BuildAction; 4] = [
        BuildAction::City,
        BuildAction::Settlement,
        BuildAction::DevelopmentCard,
        BuildAction::Road,
    ];
}
