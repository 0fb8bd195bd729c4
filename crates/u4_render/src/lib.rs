use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use u4_core::core_api::{
    CharacterEntry, InventoryEntry, InventoryKind, KarmaEntry, ReagentEntry, Session, Snapshot,
};
use u4_core::save::CreatureSnapshot;

const SHEET_WIDTH: usize = 72;
const NAME_COL_WIDTH: usize = 16;
const CLASS_COL_WIDTH: usize = 10;
const SEX_COL_WIDTH: usize = 8;
const STATUS_COL_WIDTH: usize = 10;
const HP_COL_WIDTH: usize = 11;
const TWO_COL_WIDTH_LEFT: usize = 34;
const VIRTUE_COL_WIDTH: usize = 24;
const VIRTUES_PER_ROW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    PartyRoster,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: bool,
    pub moves: bool,
    pub food: bool,
    pub gold: bool,
    pub position: bool,
    pub transport: bool,
    pub ship_hull: bool,
    pub karma: bool,
    pub characters: bool,
    pub inventory: bool,
    pub reagents: bool,
    pub creatures: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.name
            || self.moves
            || self.food
            || self.gold
            || self.position
            || self.transport
            || self.ship_hull
            || self.karma
            || self.characters
            || self.inventory
            || self.reagents
            || self.creatures
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

/// Selected fields only, in canonical order regardless of flag order.
pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(session, fields)),
    }
}

fn selected_json(session: &Session, fields: &FieldSelection) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    if fields.name {
        out.insert(
            "name".to_string(),
            JsonValue::String(snapshot.avatar_name.clone()),
        );
    }
    if fields.moves {
        out.insert("moves".to_string(), JsonValue::from(snapshot.moves));
    }
    if fields.food {
        out.insert("food".to_string(), JsonValue::from(snapshot.food));
    }
    if fields.gold {
        out.insert("gold".to_string(), JsonValue::from(snapshot.gold));
    }
    if fields.position {
        out.insert("position".to_string(), position_to_json(&snapshot));
    }
    if fields.transport {
        out.insert(
            "transport".to_string(),
            JsonValue::String(snapshot.transport.as_str().to_string()),
        );
    }
    if fields.ship_hull {
        out.insert("ship_hull".to_string(), JsonValue::from(snapshot.ship_hull));
    }
    if fields.karma {
        out.insert("karma".to_string(), karma_to_json(&session.karma()));
    }
    if fields.characters {
        out.insert(
            "characters".to_string(),
            characters_to_json(&session.characters()),
        );
    }
    if fields.inventory {
        out.insert(
            "inventory".to_string(),
            inventory_to_json(&session.inventory()),
        );
    }
    if fields.reagents {
        out.insert("reagents".to_string(), reagents_to_json(&session.reagents()));
    }
    if fields.creatures {
        out.insert(
            "creatures".to_string(),
            creatures_to_json(session.creatures()),
        );
    }

    out
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "name".to_string(),
        JsonValue::String(snapshot.avatar_name.clone()),
    );
    out.insert("moves".to_string(), JsonValue::from(snapshot.moves));
    out.insert("members".to_string(), JsonValue::from(snapshot.members));
    out.insert("food".to_string(), JsonValue::from(snapshot.food));
    out.insert("gold".to_string(), JsonValue::from(snapshot.gold));
    out.insert("torches".to_string(), JsonValue::from(snapshot.torches));
    out.insert("gems".to_string(), JsonValue::from(snapshot.gems));
    out.insert("keys".to_string(), JsonValue::from(snapshot.keys));
    out.insert("sextants".to_string(), JsonValue::from(snapshot.sextants));
    out.insert("position".to_string(), position_to_json(&snapshot));
    out.insert(
        "transport".to_string(),
        JsonValue::String(snapshot.transport.as_str().to_string()),
    );
    out.insert("ship_hull".to_string(), JsonValue::from(snapshot.ship_hull));
    out.insert("stones".to_string(), JsonValue::from(snapshot.stones));
    out.insert("runes".to_string(), JsonValue::from(snapshot.runes));
    out.insert(
        "moons".to_string(),
        JsonValue::Array(vec![
            JsonValue::from(snapshot.trammel_phase),
            JsonValue::from(snapshot.felucca_phase),
        ]),
    );
    out.insert("karma".to_string(), karma_to_json(&session.karma()));
    out.insert(
        "characters".to_string(),
        characters_to_json(&session.characters()),
    );
    out.insert(
        "inventory".to_string(),
        inventory_to_json(&session.inventory()),
    );
    out.insert("reagents".to_string(), reagents_to_json(&session.reagents()));
    out.insert(
        "creatures".to_string(),
        creatures_to_json(session.creatures()),
    );

    out
}

fn position_to_json(snapshot: &Snapshot) -> JsonValue {
    let mut m = JsonMap::new();
    m.insert("x".to_string(), JsonValue::from(snapshot.x));
    m.insert("y".to_string(), JsonValue::from(snapshot.y));
    m.insert("location".to_string(), JsonValue::from(snapshot.location));
    m.insert(
        "dungeon_level".to_string(),
        match snapshot.dungeon_level {
            Some(level) => JsonValue::from(level),
            None => JsonValue::Null,
        },
    );
    JsonValue::Object(m)
}

fn karma_to_json(karma: &[KarmaEntry]) -> JsonValue {
    JsonValue::Array(
        karma
            .iter()
            .map(|k| {
                let mut m = JsonMap::new();
                m.insert(
                    "virtue".to_string(),
                    JsonValue::String(k.virtue.as_str().to_string()),
                );
                m.insert("value".to_string(), JsonValue::from(k.value));
                m.insert("avatar".to_string(), JsonValue::Bool(k.avatar));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn characters_to_json(characters: &[CharacterEntry]) -> JsonValue {
    JsonValue::Array(
        characters
            .iter()
            .map(|c| {
                let mut m = JsonMap::new();
                m.insert("slot".to_string(), JsonValue::from(c.slot));
                m.insert("name".to_string(), JsonValue::String(c.name.clone()));
                m.insert("sex".to_string(), JsonValue::String(c.sex.to_string()));
                m.insert("class".to_string(), JsonValue::String(c.class.to_string()));
                m.insert(
                    "status".to_string(),
                    JsonValue::String(c.status.as_str().to_string()),
                );
                m.insert("level".to_string(), JsonValue::from(c.level));
                m.insert("hp".to_string(), JsonValue::from(c.hp));
                m.insert("hp_max".to_string(), JsonValue::from(c.hp_max));
                m.insert("xp".to_string(), JsonValue::from(c.xp));
                m.insert("strength".to_string(), JsonValue::from(c.strength));
                m.insert("dexterity".to_string(), JsonValue::from(c.dexterity));
                m.insert("intelligence".to_string(), JsonValue::from(c.intelligence));
                m.insert("mp".to_string(), JsonValue::from(c.mp));
                m.insert(
                    "weapon".to_string(),
                    JsonValue::String(c.weapon.as_str().to_string()),
                );
                m.insert(
                    "armor".to_string(),
                    JsonValue::String(c.armor.as_str().to_string()),
                );
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn inventory_to_json(items: &[InventoryEntry]) -> JsonValue {
    JsonValue::Array(
        items
            .iter()
            .map(|item| {
                let mut m = JsonMap::new();
                m.insert(
                    "kind".to_string(),
                    JsonValue::String(inventory_kind_label(item.kind).to_string()),
                );
                m.insert("name".to_string(), JsonValue::String(item.name.clone()));
                m.insert("quantity".to_string(), JsonValue::from(item.quantity));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn reagents_to_json(reagents: &[ReagentEntry]) -> JsonValue {
    JsonValue::Array(
        reagents
            .iter()
            .map(|r| {
                let mut m = JsonMap::new();
                m.insert(
                    "name".to_string(),
                    JsonValue::String(r.reagent.as_str().to_string()),
                );
                m.insert("quantity".to_string(), JsonValue::from(r.quantity));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn creatures_to_json(creatures: &[CreatureSnapshot]) -> JsonValue {
    JsonValue::Array(
        creatures
            .iter()
            .map(|c| {
                let mut m = JsonMap::new();
                m.insert("tile".to_string(), JsonValue::from(c.tile));
                m.insert("x".to_string(), JsonValue::from(c.x));
                m.insert("y".to_string(), JsonValue::from(c.y));
                m.insert("prev_tile".to_string(), JsonValue::from(c.prev_tile));
                m.insert("prev_x".to_string(), JsonValue::from(c.prev_x));
                m.insert("prev_y".to_string(), JsonValue::from(c.prev_y));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn inventory_kind_label(kind: InventoryKind) -> &'static str {
    match kind {
        InventoryKind::Weapon => "weapon",
        InventoryKind::Armor => "armor",
    }
}

/// `key=value` lines for field mode. List-valued fields repeat the key.
pub fn render_field_pairs(session: &Session, fields: &FieldSelection) -> Vec<(&'static str, String)> {
    let snapshot = session.snapshot();
    let mut out = Vec::new();

    if fields.name {
        out.push(("name", snapshot.avatar_name.clone()));
    }
    if fields.moves {
        out.push(("moves", snapshot.moves.to_string()));
    }
    if fields.food {
        out.push(("food", snapshot.food.to_string()));
    }
    if fields.gold {
        out.push(("gold", snapshot.gold.to_string()));
    }
    if fields.position {
        out.push(("position", format_position(&snapshot)));
    }
    if fields.transport {
        out.push(("transport", snapshot.transport.as_str().to_string()));
    }
    if fields.ship_hull {
        out.push(("ship_hull", snapshot.ship_hull.to_string()));
    }
    if fields.karma {
        for k in &session.karma() {
            out.push(("karma", format!("{}={}", k.virtue, format_karma(k))));
        }
    }
    if fields.characters {
        for c in &session.characters() {
            out.push((
                "character",
                format!(
                    "{}:{} {} L{} {} {}/{}",
                    c.slot, c.name, c.class, c.level, c.status, c.hp, c.hp_max
                ),
            ));
        }
    }
    if fields.inventory {
        for item in &session.inventory() {
            out.push((
                "inventory",
                format!(
                    "{}x {} ({})",
                    item.quantity,
                    item.name,
                    inventory_kind_label(item.kind)
                ),
            ));
        }
    }
    if fields.reagents {
        for r in &session.reagents() {
            out.push(("reagent", format!("{}={}", r.reagent, r.quantity)));
        }
    }
    if fields.creatures {
        for c in session.creatures() {
            out.push((
                "creature",
                format!("tile={:#04x} at {},{}", c.tile, c.x, c.y),
            ));
        }
    }

    out
}

fn format_position(snapshot: &Snapshot) -> String {
    match snapshot.dungeon_level {
        Some(level) => format!(
            "{},{} location={} level={}",
            snapshot.x, snapshot.y, snapshot.location, level
        ),
        None => format!("{},{} location={}", snapshot.x, snapshot.y, snapshot.location),
    }
}

fn format_karma(entry: &KarmaEntry) -> String {
    if entry.avatar {
        "Avatar".to_string()
    } else {
        entry.value.to_string()
    }
}

pub fn render_text(session: &Session, style: TextStyle) -> String {
    match style {
        TextStyle::PartyRoster => render_party_roster(session),
    }
}

fn render_party_roster(session: &Session) -> String {
    let snapshot = session.snapshot();
    let mut out = String::new();

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("ULTIMA IV", SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "{}",
        centered_no_trailing("Quest of the Avatar", SHEET_WIDTH)
    )
    .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    write_party_section(&mut out, &session.characters());
    write_resources_section(&mut out, &snapshot);
    write_virtues_section(&mut out, &session.karma());
    write_inventory_section(&mut out, &session.inventory(), &session.reagents());

    let creatures = session.creatures();
    if !creatures.is_empty() {
        writeln!(&mut out).expect("writing to String cannot fail");
        writeln!(&mut out, " ::: Creatures :::").expect("writing to String cannot fail");
        for c in creatures {
            writeln!(&mut out, "  tile {:#04x} at {},{}", c.tile, c.x, c.y)
                .expect("writing to String cannot fail");
        }
    }

    out
}

fn write_party_section(out: &mut String, characters: &[CharacterEntry]) {
    writeln!(out, " ::: Party :::").expect("writing to String cannot fail");
    let header = format!(
        "  #  {:<nw$}{:<cw$}{:<sw$}Lvl  {:<stw$}{:<hw$}MP   XP",
        "Name",
        "Class",
        "Sex",
        "Status",
        "HP",
        nw = NAME_COL_WIDTH,
        cw = CLASS_COL_WIDTH,
        sw = SEX_COL_WIDTH,
        stw = STATUS_COL_WIDTH,
        hw = HP_COL_WIDTH,
    );
    writeln!(out, "{header}").expect("writing to String cannot fail");

    for c in characters {
        let line = format!(
            "  {}  {:<nw$}{:<cw$}{:<sw$}{:<5}{:<stw$}{:<hw$}{:<5}{}",
            c.slot + 1,
            c.name,
            c.class.to_string(),
            c.sex.to_string(),
            c.level,
            c.status.as_str(),
            format!("{:03}/{:03}", c.hp, c.hp_max),
            format!("{:02}", c.mp),
            format!("{:04}", c.xp),
            nw = NAME_COL_WIDTH,
            cw = CLASS_COL_WIDTH,
            sw = SEX_COL_WIDTH,
            stw = STATUS_COL_WIDTH,
            hw = HP_COL_WIDTH,
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    writeln!(out).expect("writing to String cannot fail");
}

fn write_resources_section(out: &mut String, snapshot: &Snapshot) {
    writeln!(out, " ::: Resources :::").expect("writing to String cannot fail");

    let rows = [
        (
            format!("Food: {}", snapshot.food),
            format!("Gold: {}", snapshot.gold),
        ),
        (
            format!("Torches: {}", snapshot.torches),
            format!("Gems: {}", snapshot.gems),
        ),
        (
            format!("Keys: {}", snapshot.keys),
            format!("Sextants: {}", snapshot.sextants),
        ),
        (
            format!("Moves: {}", snapshot.moves),
            format!("Transport: {}", snapshot.transport.as_str()),
        ),
        (
            format!("Position: {}", format_position(snapshot)),
            format!("Ship hull: {}", snapshot.ship_hull),
        ),
    ];
    for (left, right) in rows {
        let line = format!("  {left:<TWO_COL_WIDTH_LEFT$}{right}");
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    writeln!(out).expect("writing to String cannot fail");
}

fn write_virtues_section(out: &mut String, karma: &[KarmaEntry]) {
    writeln!(out, " ::: Virtues :::").expect("writing to String cannot fail");
    for row in karma.chunks(VIRTUES_PER_ROW) {
        let mut line = String::from(" ");
        for entry in row {
            let cell = format!("{}: {}", entry.virtue, format_karma(entry));
            line.push_str(&format!(" {cell:<VIRTUE_COL_WIDTH$}"));
        }
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    writeln!(out).expect("writing to String cannot fail");
}

fn write_inventory_section(out: &mut String, items: &[InventoryEntry], reagents: &[ReagentEntry]) {
    writeln!(out, " ::: Inventory :::").expect("writing to String cannot fail");
    if items.is_empty() {
        writeln!(out, "  (empty)").expect("writing to String cannot fail");
    }
    for item in items {
        writeln!(out, "  {}x {}", item.quantity, item.name)
            .expect("writing to String cannot fail");
    }
    writeln!(out).expect("writing to String cannot fail");

    writeln!(out, " ::: Reagents :::").expect("writing to String cannot fail");
    for pair in reagents.chunks(2) {
        let mut line = String::new();
        for r in pair {
            let cell = format!("{}: {}", r.reagent, r.quantity);
            line.push_str(&format!("  {cell:<TWO_COL_WIDTH_LEFT$}"));
        }
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

/// One line per section: label, byte range and length.
pub fn render_layout_text(session: &Session) -> String {
    let layout = session.layout();
    let mut out = String::new();
    writeln!(&mut out, "file_len={}", layout.file_len).expect("writing to String cannot fail");
    for section in &layout.sections {
        writeln!(
            &mut out,
            "{:<12} {:>4}..{:<4} ({} bytes)",
            section.id.label(),
            section.range.start,
            section.range.end,
            section.range.len()
        )
        .expect("writing to String cannot fail");
    }
    out
}

pub fn render_layout_json(session: &Session) -> JsonValue {
    let layout = session.layout();
    let mut out = JsonMap::new();
    out.insert("file_len".to_string(), JsonValue::from(layout.file_len));
    out.insert(
        "section_count".to_string(),
        JsonValue::from(layout.sections.len()),
    );
    out.insert(
        "sections".to_string(),
        JsonValue::Array(
            layout
                .sections
                .iter()
                .map(|section| {
                    let mut m = JsonMap::new();
                    m.insert("id".to_string(), JsonValue::String(section.id.label()));
                    m.insert("start".to_string(), JsonValue::from(section.range.start));
                    m.insert("end".to_string(), JsonValue::from(section.range.end));
                    m.insert("len".to_string(), JsonValue::from(section.range.len()));
                    JsonValue::Object(m)
                })
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

fn centered_no_trailing(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{}", " ".repeat(left), text)
}
