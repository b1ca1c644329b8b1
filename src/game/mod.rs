pub mod model;
pub mod players;
pub mod reducer;
pub mod resources;

pub use model::GameModel;
pub use players::PlayerState;
pub use reducer::{ModelEvent, Reducer, replace_legal_spots};
pub use resources::{
    COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle, ResourceError,
    cost_of, count_resources,
};
