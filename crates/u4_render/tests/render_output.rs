use u4_core::core_api::{Engine, Session};
use u4_core::save::{CharacterRecord, CreatureSnapshot, SaveState, write_creature_table};
use u4_core::sex::Sex;
use u4_core::types::{AVATAR_KARMA, ClassType, Reagent, Status, Virtue, Weapon};
use u4_render::{
    FieldSelection, JsonStyle, TextStyle, render_field_pairs, render_json_full,
    render_json_selected, render_layout_json, render_text,
};

fn session() -> Session {
    let mut save = SaveState::init(CharacterRecord::new("Mariah", Sex::Female, ClassType::Mage));
    save.players[1] = CharacterRecord::new("Dupre", Sex::Male, ClassType::Paladin);
    save.players[1].status = Status::Poisoned;
    save.members = 2;
    save.food = 12_345;
    save.gold = 77;
    save.karma[Virtue::Honesty.index()] = AVATAR_KARMA;
    save.weapons[Weapon::Sword.index()] = 3;
    save.reagents[Reagent::SpiderSilk.index()] = 9;
    save.x = 86;
    save.y = 108;

    let bytes = save.to_bytes().expect("fixture should encode");
    Engine::new().open_bytes(bytes).expect("fixture should parse")
}

#[test]
fn full_json_uses_canonical_top_level_order() {
    let value = render_json_full(&session(), JsonStyle::CanonicalV1);
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(
        keys,
        vec![
            "name",
            "moves",
            "members",
            "food",
            "gold",
            "torches",
            "gems",
            "keys",
            "sextants",
            "position",
            "transport",
            "ship_hull",
            "stones",
            "runes",
            "moons",
            "karma",
            "characters",
            "inventory",
            "reagents",
            "creatures",
        ]
    );
}

#[test]
fn full_json_reports_values() {
    let value = render_json_full(&session(), JsonStyle::CanonicalV1);

    assert_eq!(value["name"], "Mariah");
    assert_eq!(value["food"], 123);
    assert_eq!(value["position"]["x"], 86);
    assert!(value["position"]["dungeon_level"].is_null());
    assert_eq!(value["karma"][0]["virtue"], "Honesty");
    assert_eq!(value["karma"][0]["avatar"], true);
    assert_eq!(value["characters"][1]["status"], "Poisoned");
    assert_eq!(value["inventory"][0]["name"], "Sword");
    assert_eq!(value["inventory"][0]["quantity"], 3);
    assert_eq!(value["creatures"].as_array().map(Vec::len), Some(0));
}

#[test]
fn selected_json_uses_canonical_subset_order() {
    let fields = FieldSelection {
        reagents: true,
        gold: true,
        name: true,
        ..FieldSelection::default()
    };
    let value = render_json_selected(&session(), &fields, JsonStyle::CanonicalV1);
    let keys: Vec<&str> = value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();

    assert_eq!(keys, vec!["name", "gold", "reagents"]);
    assert_eq!(value["reagents"][3]["name"], "Spider Silk");
    assert_eq!(value["reagents"][3]["quantity"], 9);
}

#[test]
fn field_pairs_repeat_list_keys() {
    let fields = FieldSelection {
        gold: true,
        karma: true,
        ..FieldSelection::default()
    };
    let pairs = render_field_pairs(&session(), &fields);

    assert_eq!(pairs[0], ("gold", "77".to_string()));
    assert_eq!(pairs[1], ("karma", "Honesty=Avatar".to_string()));
    assert_eq!(pairs[2], ("karma", "Compassion=20".to_string()));
    assert_eq!(pairs.len(), 9);
}

#[test]
fn roster_text_lists_members_and_sections() {
    let text = render_text(&session(), TextStyle::PartyRoster);

    assert!(text.contains("ULTIMA IV"));
    assert!(text.contains(" ::: Party :::"));
    assert!(text.contains("Mariah"));
    assert!(text.contains("Dupre"));
    assert!(text.contains("Poisoned"));
    assert!(text.contains("Food: 123"));
    assert!(text.contains("Honesty: Avatar"));
    assert!(text.contains("3x Sword"));
    assert!(text.contains("Spider Silk: 9"));
    assert!(!text.contains(" ::: Creatures :::"));
    assert!(text.lines().all(|line| line == line.trim_end()));
}

#[test]
fn roster_text_includes_loaded_creatures() {
    let mut session = session();
    let mut table = Vec::new();
    write_creature_table(
        &[CreatureSnapshot {
            tile: 0x90,
            x: 3,
            y: 4,
            prev_tile: 0x90,
            prev_x: 3,
            prev_y: 5,
            unused: [0, 0],
        }],
        &mut table,
    )
    .expect("table should encode");
    session.load_creatures(&table).expect("table should parse");

    let text = render_text(&session, TextStyle::PartyRoster);
    assert!(text.contains(" ::: Creatures :::"));
    assert!(text.contains("tile 0x90 at 3,4"));
}

#[test]
fn layout_json_counts_sections() {
    let value = render_layout_json(&session());

    assert_eq!(value["file_len"], 502);
    assert_eq!(value["section_count"], 16);
    assert_eq!(value["sections"][0]["id"], "header");
    assert_eq!(value["sections"][1]["id"], "character0");
    assert_eq!(value["sections"][1]["len"], 39);
}
