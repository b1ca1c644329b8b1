use std::fmt::Write;

use itertools::Itertools;

use crate::advisor::StrategicRecommendation;
use crate::classifier::MessageCatalog;
use crate::game::GameModel;

pub fn render_summary(model: &GameModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {}", model.session_id);
    let phase = if model.setup_phase { "setup" } else { "main game" };
    let _ = writeln!(
        out,
        "Phase: {phase}, completed turns: {}, action: {}",
        model.completed_turns,
        model
            .current_action
            .map_or_else(|| "-".to_string(), |action| action.to_string())
    );
    if let Some(color) = model.current_turn_color {
        let _ = writeln!(out, "Turn: {}", model.player_name(color));
    }

    let _ = writeln!(out, "Players:");
    for player in model.players.values() {
        let mut tags = Vec::new();
        if model.is_mine(Some(player.color)) {
            tags.push("you");
        }
        if player.is_bot {
            tags.push("bot");
        }
        if model.largest_army == Some(player.color) {
            tags.push("largest army");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };
        let _ = writeln!(
            out,
            "  {:<16} {:>2} VP  {:>2} cards  {} dev  {} knights{tags}",
            player.display_name(),
            player.victory_points,
            player.resources.total(),
            player.total_dev_cards(),
            player.knights_played,
        );
    }

    let _ = writeln!(out, "Hand: {}", model.my_resources);
    let _ = writeln!(
        out,
        "Board: {} tiles, {} corners, {} edges, {} ports, robber on {}",
        model.tiles.len(),
        model.corners.len(),
        model.edges.len(),
        model.ports.len(),
        model
            .robber_tile
            .map_or_else(|| "-".to_string(), |tile| tile.to_string())
    );
    if let Some((first, second)) = model.last_dice {
        let _ = writeln!(
            out,
            "Last roll: {first}+{second}, history: {}",
            model.dice_history.iter().join(" ")
        );
    }

    let buildings = model
        .corners
        .values()
        .filter_map(|corner| Some((corner.id, corner.owner?, corner.building?)))
        .map(|(id, owner, building)| format!("  corner {id}: {} {building}", model.player_name(owner)))
        .collect::<Vec<_>>();
    if !buildings.is_empty() {
        let _ = writeln!(out, "Buildings:");
        for line in buildings {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

pub fn render_recommendation(advice: &StrategicRecommendation) -> String {
    let mut out = format!(">> {}\n", advice.headline);
    for reason in &advice.rationale {
        let _ = writeln!(out, "   - {reason}");
    }
    if !advice.alternatives.is_empty() {
        let _ = writeln!(out, "   alternatives: {}", advice.alternatives.len());
    }
    out
}

pub fn render_catalog(catalog: &MessageCatalog) -> String {
    let mut out = String::new();
    for entry in catalog.entries() {
        let _ = writeln!(
            out,
            "{:>5}x {:<8} {}",
            entry.count,
            entry.direction.to_string(),
            entry.fingerprint
        );
    }
    let _ = writeln!(
        out,
        "{} distinct shapes, {} negligible or heartbeat frames skipped",
        catalog.len(),
        catalog.skipped()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Corner;
    use crate::game::PlayerState;
    use crate::types::BuildingKind;

    #[test]
    fn summary_marks_the_observer() {
        let mut model = GameModel::new();
        model.my_color = Some(1);
        let mut me = PlayerState::new(1);
        me.name = Some("alice".to_string());
        model.players.insert(1, me);
        let mut corner = Corner::new(7);
        corner.owner = Some(1);
        corner.building = Some(BuildingKind::City);
        model.corners.insert(7, corner);

        let text = render_summary(&model);
        assert!(text.contains("alice"));
        assert!(text.contains("[you]"));
        assert!(text.contains("corner 7: alice"));
        assert!(text.contains("Phase: setup"));
    }
}
