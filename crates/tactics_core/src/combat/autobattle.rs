//! Action scoring for autobattle mode.

use crate::{AutobattleRole, CombatState, GameContent, PlayerActionDef, PlayerActionKind};

/// Heuristic score for one available action.
///
/// Strikes score `damage×2 + accuracy×0.5 + hits×5` (the hits term only for
/// multi-hit actions). Defensive actions score 100, 50 or 10 as player health
/// falls below 40%, below 70%, or neither. Situational modifiers follow.
pub fn score_action(action: &PlayerActionDef, player_health: f32, enemy_health: f32) -> f32 {
    let mut score = 0.0;
    match action.kind {
        PlayerActionKind::Strike {
            damage,
            accuracy,
            hits,
            role,
            ..
        } => {
            score += damage * 2.0 + accuracy * 0.5;
            if hits > 1 {
                score += hits as f32 * 5.0;
            }
            if enemy_health < 0.3 && damage > 15.0 {
                score += 50.0;
            }
            if enemy_health > 0.7 && accuracy < 70.0 {
                score -= 20.0;
            }
            match role {
                AutobattleRole::Special => score += 30.0,
                AutobattleRole::Heavy if enemy_health < 0.5 => score += 25.0,
                AutobattleRole::Basic => score = f32::max(score, 10.0),
                AutobattleRole::Heavy | AutobattleRole::Standard => {}
            }
        }
        PlayerActionKind::Defend { .. } | PlayerActionKind::Dodge { .. } => {
            score += if player_health < 0.4 {
                100.0
            } else if player_health < 0.7 {
                50.0
            } else {
                10.0
            };
        }
    }
    score
}

/// Highest-scoring action off cooldown. Ties go to the earliest action in
/// content order.
pub fn choose_player_action<'a>(
    combat: &CombatState,
    content: &'a GameContent,
) -> Option<&'a PlayerActionDef> {
    let player_health = combat.player.health_fraction();
    let enemy_health = combat.enemy.health_fraction();

    let mut best: Option<(&PlayerActionDef, f32)> = None;
    for action in super::available_actions(combat, content) {
        let score = score_action(action, player_health, enemy_health);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((action, score));
        }
    }
    best.map(|(action, _)| action)
}

#[cfg(test)]
mod autobattle_tests {
    use super::*;
    use crate::test_fixtures::{base_content, combat_state};
    use crate::ActionId;

    fn action<'a>(content: &'a GameContent, id: &str) -> &'a PlayerActionDef {
        content
            .player_actions
            .iter()
            .find(|a| a.id.0 == id)
            .expect("fixture action")
    }

    #[test]
    fn fresh_fight_prefers_special_ability() {
        let content = base_content();
        let combat = combat_state(&content, 3);
        // Special: 60 + 40 + 30 = 130; Heavy: 50 + 35 = 85; Rapid: 16 + 45 + 15 = 76.
        let chosen = choose_player_action(&combat, &content).unwrap();
        assert_eq!(chosen.id, ActionId("special_ability".to_string()));
    }

    #[test]
    fn heavy_attack_scores_finisher_bonuses_on_weak_enemy() {
        let content = base_content();
        let heavy = action(&content, "heavy_attack");
        // 50 + 35 + 50 (finisher) + 25 (vulnerable enemy)
        assert!((score_action(heavy, 1.0, 0.2) - 160.0).abs() < 1e-4);
        // Accuracy 70 sits exactly on the penalty line, so no deduction.
        assert!((score_action(heavy, 1.0, 0.9) - 85.0).abs() < 1e-4);
    }

    #[test]
    fn defensive_scores_follow_player_health() {
        let content = base_content();
        let defend = action(&content, "defend");
        assert!((score_action(defend, 0.3, 1.0) - 100.0).abs() < 1e-4);
        assert!((score_action(defend, 0.5, 1.0) - 50.0).abs() < 1e-4);
        assert!((score_action(defend, 0.9, 1.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn cooldowns_remove_actions_from_consideration() {
        let content = base_content();
        let mut combat = combat_state(&content, 3);
        combat
            .cooldowns
            .insert(ActionId("special_ability".to_string()), 2);
        combat.cooldowns.insert(ActionId("heavy_attack".to_string()), 1);
        let chosen = choose_player_action(&combat, &content).unwrap();
        // Attack: 30 + 42.5 = 72.5; Rapid Fire: 16 + 45 + 15 = 76.
        assert_eq!(chosen.id, ActionId("rapid_fire".to_string()));
    }

    #[test]
    fn ties_resolve_to_list_order() {
        let content = base_content();
        let mut combat = combat_state(&content, 3);
        for id in ["attack", "heavy_attack", "rapid_fire", "special_ability"] {
            combat.cooldowns.insert(ActionId(id.to_string()), 1);
        }
        // Defend and Dodge both score 10 at full health; Defend is listed first.
        let chosen = choose_player_action(&combat, &content).unwrap();
        assert_eq!(chosen.id, ActionId("defend".to_string()));
    }
}
