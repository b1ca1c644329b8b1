//! One observed game: frames in, model updates and advice out.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::advisor::{
    Advisor, BuildPlan, CornerScore, RoadOption, RobberOption, ScoringWeights,
    StrategicRecommendation, TopN,
};
use crate::board::CornerId;
use crate::classifier::{DedupPolicy, MessageCatalog};
use crate::decoder::Value;
use crate::game::{GameModel, ModelEvent, Reducer};
use crate::protocol::{CodeTable, Direction, Envelope, Frame};
use crate::types::ActionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub codes: CodeTable,
    pub weights: ScoringWeights,
    pub placement_top_n: usize,
    pub road_top_n: usize,
    pub robber_top_n: usize,
    pub trust_server_legality: bool,
    /// Attach a recommendation to every update made on the observer's turn.
    pub advise_on_update: bool,
    pub catalog_policy: DedupPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let top = TopN::default();
        Self {
            codes: CodeTable::default(),
            weights: ScoringWeights::default(),
            placement_top_n: top.placements,
            road_top_n: top.roads,
            robber_top_n: top.robber,
            trust_server_legality: true,
            advise_on_update: true,
            catalog_policy: DedupPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn top_n(&self) -> TopN {
        TopN {
            placements: self.placement_top_n,
            roads: self.road_top_n,
            robber: self.robber_top_n,
        }
    }
}

/// What happened to one ingested frame.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Could not be decoded.
    Dropped,
    Heartbeat { timestamp: Option<i64> },
    /// Decoded but carries nothing for the model.
    Ignored,
    Applied {
        events: Vec<ModelEvent>,
        advice: Option<StrategicRecommendation>,
    },
}

impl IngestOutcome {
    pub fn events(&self) -> &[ModelEvent] {
        match self {
            IngestOutcome::Applied { events, .. } => events,
            _ => &[],
        }
    }
}

pub type UpdateObserver = Box<dyn FnMut(&GameModel, &[ModelEvent])>;

pub struct Session {
    pub config: SessionConfig,
    model: GameModel,
    reducer: Reducer,
    catalog: MessageCatalog,
    observers: Vec<UpdateObserver>,
    last_heartbeat: Option<i64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("session_id", &self.model.session_id)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            reducer: Reducer::new(config.codes),
            catalog: MessageCatalog::new(config.catalog_policy),
            model: GameModel::new(),
            observers: Vec::new(),
            last_heartbeat: None,
            config,
        }
    }

    /// Registers a callback run synchronously after every update that changed
    /// the model.
    pub fn on_update<F>(&mut self, observer: F)
    where
        F: FnMut(&GameModel, &[ModelEvent]) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn ingest(&mut self, frame: &Frame) -> IngestOutcome {
        match frame.decode() {
            Some(value) => self.ingest_value(frame.direction, &value),
            None => IngestOutcome::Dropped,
        }
    }

    /// Classifies an already-decoded frame and, when it is incoming game
    /// traffic, applies it to the model.
    pub fn ingest_value(&mut self, direction: Direction, value: &Value) -> IngestOutcome {
        self.catalog.record(direction, value);
        let envelope = Envelope::classify(value);
        match envelope {
            Envelope::Heartbeat { timestamp } => {
                self.last_heartbeat = timestamp.or(self.last_heartbeat);
                return IngestOutcome::Heartbeat { timestamp };
            }
            Envelope::Control { name } => {
                debug!(name, %direction, "control frame");
                return IngestOutcome::Ignored;
            }
            Envelope::Unrecognized => {
                debug!(shape = value.kind_name(), %direction, "unrecognized envelope");
                return IngestOutcome::Ignored;
            }
            Envelope::Typed(_) | Envelope::Id { .. } => {}
        }
        if direction == Direction::Outgoing {
            return IngestOutcome::Ignored;
        }
        let Some(message) = envelope.message() else {
            return IngestOutcome::Ignored;
        };
        debug!(code = message.kind.code(), "applying message");

        let events = self.reducer.apply(&mut self.model, message);
        if events.is_empty() {
            return IngestOutcome::Applied {
                events,
                advice: None,
            };
        }
        for observer in self.observers.iter_mut() {
            observer(&self.model, &events);
        }
        let advice = self.wants_advice().then(|| self.get_strategic_recommendation());
        if let Some(advice) = &advice {
            info!(headline = %advice.headline, "advice");
        }
        IngestOutcome::Applied { events, advice }
    }

    fn wants_advice(&self) -> bool {
        self.config.advise_on_update
            && (self.model.is_my_turn() || self.model.current_action == Some(ActionState::Discard))
    }

    pub fn get_model(&self) -> &GameModel {
        &self.model
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    pub fn last_heartbeat(&self) -> Option<i64> {
        self.last_heartbeat
    }

    /// Starts a fresh game model with a new session id.
    pub fn reset(&mut self) {
        self.model = GameModel::new();
        info!(session = %self.model.session_id, "session reset");
    }

    pub fn advisor(&self) -> Advisor<'_> {
        Advisor {
            trust_server_legality: self.config.trust_server_legality,
            ..Advisor::new(&self.model, &self.config.weights)
        }
    }

    pub fn score_corner(&self, corner_id: CornerId) -> Option<CornerScore> {
        self.advisor().score_corner(corner_id)
    }

    pub fn suggest_initial_placement(&self) -> Vec<CornerScore> {
        self.advisor()
            .suggest_initial_placement(self.config.placement_top_n)
    }

    pub fn suggest_road_placement(&self) -> Vec<RoadOption> {
        self.advisor().suggest_road_placement(self.config.road_top_n)
    }

    pub fn suggest_robber_placement(&self) -> Vec<RobberOption> {
        self.advisor()
            .suggest_robber_placement(self.config.robber_top_n)
    }

    pub fn suggest_build_priority(&self) -> BuildPlan {
        self.advisor().suggest_build_priority()
    }

    pub fn get_strategic_recommendation(&self) -> StrategicRecommendation {
        self.advisor()
            .get_strategic_recommendation(self.config.top_n())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn config_fills_missing_fields() {
        let config: SessionConfig =
            serde_json::from_str(r#"{ "codes": "alternate", "road_top_n": 1 }"#).unwrap();
        assert_eq!(config.codes, CodeTable::Alternate);
        assert_eq!(config.road_top_n, 1);
        assert_eq!(config.placement_top_n, 5);
        assert!(config.trust_server_legality);
    }

    #[test]
    fn heartbeats_never_reach_the_model() {
        let mut session = Session::default();
        let before = session.get_model().clone();
        let outcome =
            session.ingest_value(Direction::Incoming, &value(json!({ "id": 136, "data": { "timestamp": 123 } })));
        assert_eq!(outcome, IngestOutcome::Heartbeat { timestamp: Some(123) });
        assert_eq!(session.get_model(), &before);
        assert_eq!(session.last_heartbeat(), Some(123));
        assert!(session.catalog().is_empty());
    }

    #[test]
    fn outgoing_frames_are_cataloged_but_not_applied() {
        let mut session = Session::default();
        let frame = value(json!({ "type": 91, "payload": { "diff": { "diceState": { "dice1": 2, "dice2": 3 } } } }));
        let outcome = session.ingest_value(Direction::Outgoing, &frame);
        assert_eq!(outcome, IngestOutcome::Ignored);
        assert!(session.get_model().dice_history.is_empty());
        assert_eq!(session.catalog().len(), 1);
    }

    #[test]
    fn undecodable_frames_are_dropped() {
        let mut session = Session::default();
        let outcome = session.ingest(&Frame::incoming(vec![0xc1]));
        assert_eq!(outcome, IngestOutcome::Dropped);
    }

    #[test]
    fn observers_see_every_update() {
        let mut session = Session::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.on_update(move |_, events| sink.borrow_mut().extend_from_slice(events));

        let frame = value(json!({ "type": 91, "payload": { "diff": { "diceState": { "dice1": 6, "dice2": 5 } } } }));
        let outcome = session.ingest_value(Direction::Incoming, &frame);
        assert_eq!(outcome.events().len(), seen.borrow().len());
        assert!(!seen.borrow().is_empty());
        assert_eq!(session.get_model().dice_history, vec![11]);
    }

    #[test]
    fn reset_starts_a_new_session() {
        let mut session = Session::default();
        let first = session.get_model().session_id;
        session.reset();
        assert_ne!(session.get_model().session_id, first);
        assert!(session.get_model().setup_phase);
    }
}
