use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Axial position of a hex tile as published by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub x: i32,
    pub y: i32,
}

impl HexCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which of the two vertices "owned" by a hex a corner is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum CornerOrientation {
    /// z = 0: shared with the left and top neighbours.
    TopLeft,
    /// z = 1: shared with the right and bottom neighbours.
    BottomRight,
}

impl CornerOrientation {
    pub fn from_code(z: i64) -> Option<Self> {
        match z {
            0 => Some(CornerOrientation::TopLeft),
            1 => Some(CornerOrientation::BottomRight),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CornerOrientation::TopLeft => 0,
            CornerOrientation::BottomRight => 1,
        }
    }

    fn hex_offsets(self) -> [(i32, i32); 3] {
        match self {
            CornerOrientation::TopLeft => [(0, 0), (-1, 0), (0, -1)],
            CornerOrientation::BottomRight => [(0, 0), (1, 0), (0, 1)],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum EdgeOrientation {
    Horizontal,
    RightDiagonal,
    LeftDiagonal,
}

impl EdgeOrientation {
    pub fn from_code(z: i64) -> Option<Self> {
        match z {
            0 => Some(EdgeOrientation::Horizontal),
            1 => Some(EdgeOrientation::RightDiagonal),
            2 => Some(EdgeOrientation::LeftDiagonal),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            EdgeOrientation::Horizontal => 0,
            EdgeOrientation::RightDiagonal => 1,
            EdgeOrientation::LeftDiagonal => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CornerCoord {
    pub hex: HexCoord,
    pub orientation: CornerOrientation,
}

impl CornerCoord {
    pub fn new(x: i32, y: i32, orientation: CornerOrientation) -> Self {
        Self {
            hex: HexCoord::new(x, y),
            orientation,
        }
    }

    /// The three hexes meeting at this vertex; some may lie off the board.
    pub fn touching_hexes(self) -> [HexCoord; 3] {
        self.orientation
            .hex_offsets()
            .map(|(dx, dy)| self.hex.offset(dx, dy))
    }
}

impl fmt::Display for CornerCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.hex.x, self.hex.y, self.orientation.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeCoord {
    pub hex: HexCoord,
    pub orientation: EdgeOrientation,
}

impl EdgeCoord {
    pub fn new(x: i32, y: i32, orientation: EdgeOrientation) -> Self {
        Self {
            hex: HexCoord::new(x, y),
            orientation,
        }
    }

    /// Vertex coordinates this edge joins, per orientation.
    pub fn endpoints(self) -> [CornerCoord; 2] {
        let HexCoord { x, y } = self.hex;
        match self.orientation {
            EdgeOrientation::Horizontal => [
                CornerCoord::new(x, y, CornerOrientation::TopLeft),
                CornerCoord::new(x, y + 1, CornerOrientation::BottomRight),
            ],
            EdgeOrientation::RightDiagonal => [
                CornerCoord::new(x, y, CornerOrientation::BottomRight),
                CornerCoord::new(x + 1, y, CornerOrientation::TopLeft),
            ],
            EdgeOrientation::LeftDiagonal => [
                CornerCoord::new(x, y, CornerOrientation::TopLeft),
                CornerCoord::new(x, y, CornerOrientation::BottomRight),
            ],
        }
    }
}

impl fmt::Display for EdgeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.hex.x, self.hex.y, self.orientation.code())
    }
}
