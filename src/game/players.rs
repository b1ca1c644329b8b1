use serde::{Deserialize, Serialize};

use crate::game::resources::{ResourceBundle, ResourceError};
use crate::types::{ColorId, DevelopmentCard, color_label};

/// A seat at the table, keyed by its colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub color: ColorId,
    pub name: Option<String>,
    pub is_bot: bool,
    pub user_id: Option<String>,
    pub victory_points: u32,
    /// Exact for the observer's own colour, a running estimate otherwise.
    pub resources: ResourceBundle,
    pub dev_cards: Vec<DevelopmentCard>,
    /// Held cards whose kind the server does not reveal.
    pub hidden_dev_cards: usize,
    pub played_dev_cards: Vec<DevelopmentCard>,
    /// Most cards ever seen at once, held or played. Only growth past this
    /// mark counts as a purchase.
    #[serde(default)]
    pub dev_cards_peak: usize,
    pub knights_played: u32,
    pub has_largest_army: bool,
}

impl PlayerState {
    pub fn new(color: ColorId) -> Self {
        Self {
            color,
            name: None,
            is_bot: false,
            user_id: None,
            victory_points: 0,
            resources: ResourceBundle::zero(),
            dev_cards: Vec::new(),
            hidden_dev_cards: 0,
            played_dev_cards: Vec::new(),
            dev_cards_peak: 0,
            knights_played: 0,
            has_largest_army: false,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => color_label(self.color),
        }
    }

    pub fn set_played_dev_cards(&mut self, played: Vec<DevelopmentCard>) {
        self.knights_played = played
            .iter()
            .filter(|card| matches!(card, DevelopmentCard::Knight))
            .count() as u32;
        self.played_dev_cards = played;
    }

    /// Cards bought so far, held or played.
    pub fn total_dev_cards(&self) -> usize {
        self.dev_cards.len() + self.hidden_dev_cards + self.played_dev_cards.len()
    }

    /// Raises the peak to the current total, returning how many cards are new.
    pub fn record_dev_card_total(&mut self) -> usize {
        let total = self.total_dev_cards();
        let bought = total.saturating_sub(self.dev_cards_peak);
        self.dev_cards_peak = self.dev_cards_peak.max(total);
        bought
    }

    pub fn held(&self, card: DevelopmentCard) -> usize {
        self.dev_cards.iter().filter(|held| **held == card).count()
    }

    /// Charges a cost against the estimated hand. The estimate is floored at
    /// zero either way; the error reports what the estimate could not cover.
    pub fn pay(&mut self, cost: &ResourceBundle) -> Result<(), ResourceError> {
        let result = self.resources.subtract_bundle(cost);
        if result.is_err() {
            self.resources.subtract_saturating(cost);
        }
        result
    }
}
