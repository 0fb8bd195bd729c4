use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use u4_core::save::{CharacterRecord, CreatureSnapshot, SaveState, write_creature_table};
use u4_core::sex::Sex;
use u4_core::types::{ClassType, Reagent, Virtue};

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_u4se"))
        .args(args)
        .output()
        .expect("failed to run u4se CLI")
}

fn temp_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("{prefix}_{}_{}.sav", std::process::id(), nanos))
}

fn fixture_save() -> SaveState {
    let mut save = SaveState::init(CharacterRecord::new("Lyra", Sex::Female, ClassType::Druid));
    save.players[1] = CharacterRecord::new("Mariah", Sex::Female, ClassType::Mage);
    save.food = 50_000;
    save.gold = 250;
    save.moves = 320;
    save.x = 86;
    save.y = 108;
    save.reagents[Reagent::Ginseng.index()] = 4;
    save
}

fn write_fixture(prefix: &str, save: &SaveState) -> PathBuf {
    let path = temp_path(prefix);
    fs::write(&path, save.to_bytes().expect("fixture should encode"))
        .expect("fixture should be writable");
    path
}

fn read_back(path: &PathBuf) -> SaveState {
    let bytes = fs::read(path).expect("output should exist");
    SaveState::read(bytes.as_slice()).expect("output should parse")
}

#[test]
fn cli_prints_single_gold_field() {
    let path = write_fixture("u4se_gold", &fixture_save());
    let output = run_cli(&["--gold", path.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "gold=250");
    let _ = fs::remove_file(path);
}

#[test]
fn cli_prints_requested_fields_in_fixed_order() {
    let path = write_fixture("u4se_order", &fixture_save());
    let output = run_cli(&["--food", "--name", "--moves", path.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["name=Lyra", "moves=320", "food=500"]);
    let _ = fs::remove_file(path);
}

#[test]
fn cli_without_field_flags_prints_roster() {
    let path = write_fixture("u4se_roster", &fixture_save());
    let output = run_cli(&[path.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(" ::: Party :::"));
    assert!(stdout.contains("Lyra"));
    assert!(stdout.contains("Ginseng: 4"));
    let _ = fs::remove_file(path);
}

#[test]
fn cli_json_full_is_valid_json() {
    let path = write_fixture("u4se_json", &fixture_save());
    let output = run_cli(&["--json", path.to_str().unwrap()]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["name"], "Lyra");
    assert_eq!(json["position"]["y"], 108);
    assert_eq!(json["karma"].as_array().map(Vec::len), Some(8));
    let _ = fs::remove_file(path);
}

#[test]
fn cli_json_selected_fields_only() {
    let path = write_fixture("u4se_json_sel", &fixture_save());
    let output = run_cli(&["--json", "--transport", "--gold", path.to_str().unwrap()]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let keys: Vec<&str> = json
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["gold", "transport"]);
    assert_eq!(json["transport"], "Foot");
    let _ = fs::remove_file(path);
}

#[test]
fn cli_layout_reports_sections() {
    let path = write_fixture("u4se_layout", &fixture_save());
    let output = run_cli(&["--layout", "--json", path.to_str().unwrap()]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["file_len"], 502);
    assert_eq!(json["sections"][9]["id"], "resources");
    let _ = fs::remove_file(path);
}

#[test]
fn cli_loads_monster_table() {
    let path = write_fixture("u4se_monsters_party", &fixture_save());
    let monsters = temp_path("u4se_monsters");
    let mut table = Vec::new();
    write_creature_table(
        &[CreatureSnapshot {
            tile: 0x84,
            x: 12,
            y: 30,
            prev_tile: 0x84,
            prev_x: 12,
            prev_y: 31,
            unused: [0, 0],
        }],
        &mut table,
    )
    .unwrap();
    fs::write(&monsters, table).unwrap();

    let output = run_cli(&[
        "--creatures",
        "--monsters",
        monsters.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "creature=tile=0x84 at 12,30");
    let _ = fs::remove_file(path);
    let _ = fs::remove_file(monsters);
}

#[test]
fn cli_writes_monster_table_next_to_edited_save() {
    let path = write_fixture("u4se_monsters_edit_in", &fixture_save());
    let monsters = temp_path("u4se_monsters_edit_table");
    let mut table = Vec::new();
    write_creature_table(
        &[CreatureSnapshot {
            tile: 0x90,
            x: 40,
            y: 41,
            prev_tile: 0x90,
            prev_x: 40,
            prev_y: 42,
            unused: [0x07, 0x00],
        }],
        &mut table,
    )
    .unwrap();
    fs::write(&monsters, &table).unwrap();
    let out = temp_path("u4se_monsters_edit_out");
    let monsters_out = temp_path("u4se_monsters_edit_table_out");

    let output = run_cli(&[
        "--set-gold",
        "77",
        "--monsters",
        monsters.to_str().unwrap(),
        "--monsters-output",
        monsters_out.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(read_back(&out).gold, 77);
    assert_eq!(fs::read(&monsters_out).expect("table should exist"), table);

    for file in [path, monsters, out, monsters_out] {
        let _ = fs::remove_file(file);
    }
}

#[test]
fn cli_monsters_output_needs_a_loaded_table() {
    let path = write_fixture("u4se_monsters_missing", &fixture_save());
    let out = temp_path("u4se_monsters_missing_out");
    let monsters_out = temp_path("u4se_monsters_missing_table");
    let output = run_cli(&[
        "--set-gold",
        "1",
        "--monsters-output",
        monsters_out.to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
    assert!(!monsters_out.exists());
    let _ = fs::remove_file(path);
}

#[test]
fn cli_edits_require_output() {
    let path = write_fixture("u4se_no_output", &fixture_save());
    let output = run_cli(&["--set-gold", "10", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    let _ = fs::remove_file(path);
}

#[test]
fn cli_applies_edits_to_output() {
    let path = write_fixture("u4se_edit_in", &fixture_save());
    let out = temp_path("u4se_edit_out");
    let output = run_cli(&[
        "--set-gold",
        "1234",
        "--set-karma",
        "valor=99",
        "--set-xp",
        "0=450",
        "--set-reagent",
        "black pearl=12",
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let save = read_back(&out);
    assert_eq!(save.gold, 1234);
    assert_eq!(save.karma[Virtue::Valor.index()], 99);
    assert_eq!(save.players[0].xp, 450);
    assert_eq!(save.reagents[Reagent::BlackPearl.index()], 12);
    // the input file is untouched
    assert_eq!(read_back(&path).gold, 250);

    let _ = fs::remove_file(path);
    let _ = fs::remove_file(out);
}

#[test]
fn cli_rejects_out_of_range_edit() {
    let path = write_fixture("u4se_range_in", &fixture_save());
    let out = temp_path("u4se_range_out");
    let output = run_cli(&[
        "--set-karma",
        "honor=150",
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!out.exists());
    let _ = fs::remove_file(path);
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let path = write_fixture("u4se_force_in", &fixture_save());
    let out = write_fixture("u4se_force_out", &fixture_save());

    let refused = run_cli(&[
        "--set-gold",
        "1",
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert_eq!(refused.status.code(), Some(1));
    assert_eq!(read_back(&out).gold, 250);

    let forced = run_cli(&[
        "--set-gold",
        "1",
        "--force",
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert!(forced.status.success());
    assert_eq!(read_back(&out).gold, 1);

    let _ = fs::remove_file(path);
    let _ = fs::remove_file(out);
}

#[test]
fn cli_join_refusal_exits_with_reason() {
    let path = write_fixture("u4se_join_in", &fixture_save());
    let out = temp_path("u4se_join_out");
    let output = run_cli(&[
        "--join",
        "Mariah",
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not experienced enough"), "{stderr}");
    assert!(!out.exists());
    let _ = fs::remove_file(path);
}

#[test]
fn cli_simulation_joins_donates_and_ends_turns() {
    let mut save = fixture_save();
    save.players[0].hp_max = 200;
    save.karma[Virtue::Honesty.index()] = 60;
    let path = write_fixture("u4se_sim_in", &save);
    let out = temp_path("u4se_sim_out");

    let output = run_cli(&[
        "--join",
        "Mariah",
        "--donate",
        "50",
        "--end-turns",
        "3",
        "--seed",
        "7",
        "--output",
        out.to_str().unwrap(),
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let save = read_back(&out);
    assert_eq!(save.members, 2);
    assert_eq!(save.players[1].name(), "Mariah");
    assert_eq!(save.gold, 200);
    assert_eq!(save.moves, 323);
    assert!(save.food < 50_000);

    let _ = fs::remove_file(path);
    let _ = fs::remove_file(out);
}
