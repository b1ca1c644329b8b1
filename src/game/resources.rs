use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::CodeTable;
use crate::types::{BuildAction, Resource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceBundle {
    counts: [u8; Resource::ALL.len()],
}

impl ResourceBundle {
    pub const fn from_counts(counts: [u8; 5]) -> Self {
        Self { counts }
    }

    pub const fn zero() -> Self {
        Self {
            counts: [0; Resource::ALL.len()],
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&v| v as u32).sum()
    }

    pub fn add(&mut self, resource: Resource, amount: u8) {
        let idx = resource_index(resource);
        self.counts[idx] = self.counts[idx].saturating_add(amount);
    }

    pub fn subtract(&mut self, resource: Resource, amount: u8) -> Result<(), ResourceError> {
        let idx = resource_index(resource);
        if self.counts[idx] < amount {
            return Err(ResourceError::InsufficientResource {
                resource,
                available: self.counts[idx],
                requested: amount,
            });
        }
        self.counts[idx] -= amount;
        Ok(())
    }

    pub fn subtract_bundle(&mut self, other: &ResourceBundle) -> Result<(), ResourceError> {
        if !self.can_afford(other) {
            return Err(ResourceError::InsufficientBundle {
                missing: self.missing(other),
            });
        }
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] -= *value;
        }
        Ok(())
    }

    /// Subtracts what is there and floors every count at zero.
    pub fn subtract_saturating(&mut self, other: &ResourceBundle) {
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] = self.counts[idx].saturating_sub(*value);
        }
    }

    pub fn can_afford(&self, other: &ResourceBundle) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(have, need)| have >= need)
    }

    /// Per-resource shortfall against `cost`.
    pub fn missing(&self, cost: &ResourceBundle) -> ResourceBundle {
        let mut out = ResourceBundle::zero();
        for (idx, (have, need)) in self.counts.iter().zip(cost.counts.iter()).enumerate() {
            out.counts[idx] = need.saturating_sub(*have);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&value| value == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u8)> + '_ {
        Resource::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn get(&self, resource: Resource) -> u8 {
        self.counts[resource_index(resource)]
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        for (resource, amount) in self.iter() {
            if amount > 0 {
                parts.push(format!("{amount}x{resource}"));
            }
        }
        if parts.is_empty() {
            return write!(f, "nothing");
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("insufficient {resource}: have {available}, need {requested}")]
    InsufficientResource {
        resource: Resource,
        available: u8,
        requested: u8,
    },
    #[error("insufficient resources, missing {missing}")]
    InsufficientBundle { missing: ResourceBundle },
}

const fn resource_index(resource: Resource) -> usize {
    match resource {
        Resource::Wood => 0,
        Resource::Brick => 1,
        Resource::Sheep => 2,
        Resource::Wheat => 3,
        Resource::Ore => 4,
    }
}

pub const COST_ROAD: ResourceBundle = ResourceBundle::from_counts([1, 1, 0, 0, 0]);
pub const COST_SETTLEMENT: ResourceBundle = ResourceBundle::from_counts([1, 1, 1, 1, 0]);
pub const COST_CITY: ResourceBundle = ResourceBundle::from_counts([0, 0, 0, 2, 3]);
pub const COST_DEVELOPMENT: ResourceBundle = ResourceBundle::from_counts([0, 0, 1, 1, 1]);

pub fn cost_of(action: BuildAction) -> ResourceBundle {
    match action {
        BuildAction::City => COST_CITY,
        BuildAction::Settlement => COST_SETTLEMENT,
        BuildAction::DevelopmentCard => COST_DEVELOPMENT,
        BuildAction::Road => COST_ROAD,
    }
}

/// Tallies a hand of resource card ids. Unknown ids are ignored.
pub fn count_resources(cards: &[i64], codes: CodeTable) -> ResourceBundle {
    let mut bundle = ResourceBundle::zero();
    for resource in cards.iter().filter_map(|&card| codes.resource(card)) {
        bundle.add(resource, 1);
    }
    bundle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_uses_the_configured_table() {
        let cards = [1, 1, 2, 4, 4, 4];
        let standard = count_resources(&cards, CodeTable::Standard);
        assert_eq!(standard.counts, [2, 1, 0, 3, 0]);

        let alternate = count_resources(&cards, CodeTable::Alternate);
        assert_eq!(alternate.get(Resource::Wood), 2);
        assert_eq!(alternate.get(Resource::Brick), 0);
        assert_eq!(alternate.get(Resource::Sheep), 1);
        assert_eq!(alternate.get(Resource::Wheat), 3);
        assert_eq!(alternate.get(Resource::Ore), 0);
    }

    #[test]
    fn unknown_cards_are_ignored() {
        assert!(count_resources(&[0, 9, -1], CodeTable::Standard).is_empty());
    }

    #[test]
    fn missing_reports_shortfall() {
        let hand = ResourceBundle::from_counts([0, 0, 0, 2, 3]);
        assert!(hand.can_afford(&COST_CITY));
        assert_eq!(hand.missing(&COST_SETTLEMENT), ResourceBundle::from_counts([1, 1, 1, 0, 0]));
        assert_eq!(hand.missing(&COST_CITY), ResourceBundle::zero());
    }

    #[test]
    fn subtraction_checked_and_saturating() {
        let mut hand = ResourceBundle::from_counts([1, 0, 0, 0, 0]);
        let err = hand.subtract_bundle(&COST_ROAD).unwrap_err();
        assert_eq!(
            err,
            ResourceError::InsufficientBundle {
                missing: ResourceBundle::from_counts([0, 1, 0, 0, 0])
            }
        );
        assert!(hand.subtract(Resource::Ore, 1).is_err());
        hand.subtract_saturating(&COST_ROAD);
        assert!(hand.is_empty());
    }

    #[test]
    fn display_lists_non_zero_counts() {
        assert_eq!(COST_CITY.to_string(), "2xwheat, 3xore");
        assert_eq!(ResourceBundle::zero().to_string(), "nothing");
    }
}
