use super::*;

fn upgrade(id: &str) -> UpgradeId {
    UpgradeId(id.to_string())
}

#[test]
fn hero_upgrades_are_one_time_purchases() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.scrap = 60;
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::PurchaseHeroUpgrade {
        upgrade_id: upgrade("weapon_mastery"),
    })
    .unwrap();
    assert_eq!(state.character.attack, 15);
    assert_eq!(state.resources.scrap, 30);

    let err = apply(&mut state, &content, &mut rng, Command::PurchaseHeroUpgrade {
        upgrade_id: upgrade("weapon_mastery"),
    })
    .unwrap_err();
    assert_eq!(
        err,
        CommandError::Economy(EconomyError::AlreadyPurchased(upgrade("weapon_mastery")))
    );
    assert_eq!(state.resources.scrap, 30);
}

#[test]
fn max_health_upgrades_also_heal() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.biomass = 20;
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::PurchaseHeroUpgrade {
        upgrade_id: upgrade("warrior_spirit"),
    })
    .unwrap();
    assert_eq!(state.character.max_health, 125);
    assert_eq!(state.character.health, 125);
}

#[test]
fn branch_costs_grow_each_level() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.biomass = 100;
    let mut rng = make_rng();

    for _ in 0..2 {
        apply(&mut state, &content, &mut rng, Command::PurchaseBranchUpgrade {
            upgrade_id: upgrade("enhanced_physiology"),
        })
        .unwrap();
    }

    // 8 for the first level, floor(8 × 1.4) = 11 for the second.
    assert_eq!(state.resources.biomass, 81);
    assert_eq!(state.character.max_health, 130);
    assert_eq!(
        state.progression.branch_levels.get(&upgrade("enhanced_physiology")),
        Some(&2)
    );
}

#[test]
fn branch_upgrades_stop_at_max_level() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.biomass = 10_000;
    state
        .progression
        .branch_levels
        .insert(upgrade("expanded_neural_capacity"), 4);
    let mut rng = make_rng();

    let err = apply(&mut state, &content, &mut rng, Command::PurchaseBranchUpgrade {
        upgrade_id: upgrade("expanded_neural_capacity"),
    })
    .unwrap_err();
    assert!(matches!(err, CommandError::Economy(EconomyError::MaxLevel(_))));
    assert_eq!(state.resources.biomass, 10_000);
}

#[test]
fn neural_capacity_widens_the_inventory() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.biomass = 20;
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::PurchaseBranchUpgrade {
        upgrade_id: upgrade("expanded_neural_capacity"),
    })
    .unwrap();
    assert_eq!(state.character.inventory_capacity, 15);
    assert_eq!(state.character.max_health, 100);
}

#[test]
fn crafted_potions_stack() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.biomass = 30;
    let mut rng = make_rng();

    for _ in 0..2 {
        apply(&mut state, &content, &mut rng, Command::CraftItem {
            recipe_id: RecipeId("healing_potion".to_string()),
        })
        .unwrap();
    }

    assert_eq!(state.resources.biomass, 0);
    assert_eq!(state.character.inventory.len(), 1);
    let potion = &state.character.inventory[0];
    assert_eq!(potion.quantity, 2);
    assert_eq!(potion.recipe, Some(RecipeId("healing_potion".to_string())));
}

#[test]
fn crafting_without_resources_is_rejected() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.warpstone = 25;
    let mut rng = make_rng();

    let err = apply(&mut state, &content, &mut rng, Command::CraftItem {
        recipe_id: RecipeId("warp_bomb".to_string()),
    })
    .unwrap_err();
    assert_eq!(err, CommandError::Economy(EconomyError::CannotAfford));
    assert_eq!(state.resources.warpstone, 25);
    assert!(state.character.inventory.is_empty());
}

#[test]
fn disassembly_refunds_part_of_the_recipe() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.scrap = 25;
    state.resources.warpstone = 10;
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::CraftItem {
        recipe_id: RecipeId("power_sword".to_string()),
    })
    .unwrap();
    let item_id = state.character.inventory[0].id.clone();
    apply(&mut state, &content, &mut rng, Command::DisassembleItem { item_id }).unwrap();

    // Rare items return 70%.
    assert!(state.character.inventory.is_empty());
    assert_eq!(state.resources.scrap, 17);
    assert_eq!(state.resources.warpstone, 7);
}

#[test]
fn looted_items_cannot_be_disassembled() {
    let content = base_content();
    let mut state = base_state(&content);
    let pistol = test_item("item_pistol", "Bolt Pistol", false, ItemKind::Weapon(StatDelta {
        attack: 2,
        ..StatDelta::default()
    }));
    add_item(&mut state.character, pistol).unwrap();
    let mut rng = make_rng();

    let err = apply(&mut state, &content, &mut rng, Command::DisassembleItem {
        item_id: ItemId("item_pistol".to_string()),
    })
    .unwrap_err();
    assert!(matches!(err, CommandError::Economy(EconomyError::NotDisassemblable(_))));
}

#[test]
fn crafting_level_boosts_crafted_gear() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.scrap = 75;
    state.resources.warpstone = 35;
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::UpgradeCrafting).unwrap();
    assert_eq!(state.crafting.level, 2);
    apply(&mut state, &content, &mut rng, Command::CraftItem {
        recipe_id: RecipeId("power_sword".to_string()),
    })
    .unwrap();

    let ItemKind::Weapon(delta) = &state.character.inventory[0].kind else {
        panic!("power sword should be a weapon");
    };
    assert!(delta.attack > 15);
}

#[test]
fn equipping_through_commands_moves_stats() {
    let content = base_content();
    let mut state = base_state(&content);
    let pistol = test_item("item_pistol", "Bolt Pistol", false, ItemKind::Weapon(StatDelta {
        attack: 2,
        ..StatDelta::default()
    }));
    add_item(&mut state.character, pistol).unwrap();
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::EquipItem {
        item_id: ItemId("item_pistol".to_string()),
    })
    .unwrap();
    assert_eq!(state.character.attack, 12);
    assert!(state.character.inventory.is_empty());

    apply(&mut state, &content, &mut rng, Command::UnequipItem {
        slot: EquipSlot::Weapon,
    })
    .unwrap();
    assert_eq!(state.character.attack, 10);
    assert_eq!(state.character.inventory.len(), 1);
}

#[test]
fn armor_moves_health_cap_and_speed() {
    let content = base_content();
    let mut state = base_state(&content);
    let armor = test_item("item_terminator", "Terminator Armor", false, ItemKind::Armor(StatDelta {
        max_health: 100,
        defense: 20,
        speed: -30,
        ..StatDelta::default()
    }));
    add_item(&mut state.character, armor).unwrap();
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::EquipItem {
        item_id: ItemId("item_terminator".to_string()),
    })
    .unwrap();
    assert_eq!(state.character.max_health, 200);
    assert_eq!(state.character.health, 100);
    assert_eq!(state.character.defense, 25);
    assert_eq!(state.character.speed, 70);
    assert!(state.character.equipment.slot(EquipSlot::Armor).is_some());

    // Health above the bare cap is clipped when the armor comes off.
    state.character.health = 180;
    apply(&mut state, &content, &mut rng, Command::UnequipItem {
        slot: EquipSlot::Armor,
    })
    .unwrap();
    assert_eq!(state.character.max_health, 100);
    assert_eq!(state.character.health, 100);
    assert_eq!(state.character.defense, 5);
    assert_eq!(state.character.speed, 100);
    assert_eq!(state.character.inventory.len(), 1);
}

#[test]
fn base_repair_is_capped_at_max_defense() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::RepairBase).unwrap();
    assert_eq!(state.base.defense, 20);

    state.base.defense = 45;
    apply(&mut state, &content, &mut rng, Command::RepairBase).unwrap();
    assert_eq!(state.base.defense, 50);

    let err = apply(&mut state, &content, &mut rng, Command::RepairBase).unwrap_err();
    assert_eq!(err, CommandError::Economy(EconomyError::NothingToRepair));
}

#[test]
fn base_upgrade_raises_caps() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.scrap = 100;
    state.resources.warpstone = 50;
    let mut rng = make_rng();

    apply(&mut state, &content, &mut rng, Command::UpgradeBase).unwrap();
    assert_eq!(state.base.level, 2);
    assert_eq!(state.base.max_population, 12);
    assert_eq!(state.base.max_defense, 60);
    assert_eq!(state.resources, ResourceLedger::default());
}
