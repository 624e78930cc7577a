use rand::Rng;

use crate::{CombatantState, EnemyActionDef, EnemyActionEffect};

/// Damage above which an action is twice as likely to be picked.
const HEAVY_ACTION_DAMAGE: f32 = 15.0;

/// Picks the enemy's action. Below `heal_threshold` health the first heal
/// action wins outright; otherwise the pick is weighted random, favouring
/// heavy hitters.
pub fn choose_enemy_action<'a>(
    enemy: &CombatantState,
    actions: &'a [EnemyActionDef],
    heal_threshold: f32,
    rng: &mut impl Rng,
) -> Option<&'a EnemyActionDef> {
    if actions.is_empty() {
        return None;
    }
    if enemy.health_fraction() < heal_threshold {
        if let Some(heal) = actions
            .iter()
            .find(|action| action.effect == Some(EnemyActionEffect::Heal))
        {
            return Some(heal);
        }
    }

    let weight = |action: &EnemyActionDef| if action.damage > HEAVY_ACTION_DAMAGE { 2 } else { 1 };
    let total: u32 = actions.iter().map(weight).sum();
    let mut roll = rng.gen_range(0..total);
    for action in actions {
        let w = weight(action);
        if roll < w {
            return Some(action);
        }
        roll -= w;
    }
    actions.first()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, combat_state, make_rng};
    use crate::Faction;

    fn necron_actions(content: &crate::GameContent) -> &[EnemyActionDef] {
        &content
            .enemy_archetypes
            .iter()
            .find(|a| a.faction == Faction::Necrons)
            .expect("necron archetype")
            .actions
    }

    #[test]
    fn wounded_enemy_heals_when_it_can() {
        let content = base_content();
        let mut combat = combat_state(&content, 4);
        combat.enemy.health = combat.enemy.max_health * 0.2;
        let mut rng = make_rng();
        let action =
            choose_enemy_action(&combat.enemy, necron_actions(&content), 0.3, &mut rng).unwrap();
        assert_eq!(action.effect, Some(EnemyActionEffect::Heal));
    }

    #[test]
    fn heavy_actions_are_picked_more_often() {
        let content = base_content();
        let combat = combat_state(&content, 4);
        let actions = necron_actions(&content);
        let mut rng = make_rng();
        let mut gauss = 0;
        for _ in 0..4000 {
            let action = choose_enemy_action(&combat.enemy, actions, 0.3, &mut rng).unwrap();
            if action.name == "Gauss Blast" {
                gauss += 1;
            }
        }
        // Weights 2:1:1, so roughly half the picks.
        assert!((1700..2300).contains(&gauss), "gauss picked {gauss} times");
    }

    #[test]
    fn empty_action_list_yields_nothing() {
        let content = base_content();
        let combat = combat_state(&content, 1);
        let mut rng = make_rng();
        assert!(choose_enemy_action(&combat.enemy, &[], 0.3, &mut rng).is_none());
    }
}
