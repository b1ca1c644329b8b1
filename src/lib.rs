#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod advisor;
pub mod board;
pub mod classifier;
pub mod cli;
pub mod coords;
pub mod decoder;
pub mod game;
pub mod protocol;
pub mod session;
pub mod types;

pub use advisor::{Advisor, ScoringWeights, StrategicRecommendation};
pub use board::{Tile, Topology};
pub use decoder::{DecodeError, Value, decode};
pub use game::{GameModel, ModelEvent, Reducer};
pub use protocol::{CodeTable, Direction, Envelope, Frame};
pub use session::{IngestOutcome, Session, SessionConfig};
pub use types::Color;
