use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use serde_json::Value as JsonValue;
use u4_core::core_api::{Engine, Session};
use u4_core::party::PartyEvent;
use u4_core::types::{LocationContext, Reagent, Virtue};
use u4_render::{
    FieldSelection, JsonStyle, TextStyle, render_field_pairs, render_json_full,
    render_json_selected, render_layout_json, render_layout_text, render_text,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum)]
enum ContextArg {
    #[default]
    WorldMap,
    Town,
    Dungeon,
    Combat,
    Camp,
    Altar,
}

impl ContextArg {
    fn to_core(self) -> LocationContext {
        match self {
            Self::WorldMap => LocationContext::WorldMap,
            Self::Town => LocationContext::Town,
            Self::Dungeon => LocationContext::Dungeon,
            Self::Combat => LocationContext::Combat,
            Self::Camp => LocationContext::Camp,
            Self::Altar => LocationContext::Altar,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "PARTY.SAV")]
    path: PathBuf,
    /// Creature table to load alongside the party file. It is only written
    /// back when --monsters-output is given.
    #[arg(long, value_name = "MONSTERS.SAV")]
    monsters: Option<PathBuf>,
    /// Where to write the creature table next to an edited --output save.
    #[arg(
        long = "monsters-output",
        value_name = "PATH",
        requires = "monsters",
        requires = "output"
    )]
    monsters_output: Option<PathBuf>,
    #[arg(long)]
    name: bool,
    #[arg(long)]
    moves: bool,
    #[arg(long)]
    food: bool,
    #[arg(long)]
    gold: bool,
    #[arg(long)]
    position: bool,
    #[arg(long)]
    transport: bool,
    #[arg(long = "ship-hull")]
    ship_hull: bool,
    #[arg(long)]
    karma: bool,
    #[arg(long)]
    characters: bool,
    #[arg(long)]
    inventory: bool,
    #[arg(long)]
    reagents: bool,
    #[arg(long)]
    creatures: bool,
    #[arg(long)]
    json: bool,
    /// Print the byte layout of the party file instead of its contents.
    #[arg(long)]
    layout: bool,
    #[arg(long = "set-gold")]
    set_gold: Option<u16>,
    /// Food in whole units.
    #[arg(long = "set-food")]
    set_food: Option<u32>,
    #[arg(long = "set-karma", value_name = "VIRTUE=N", value_parser = parse_karma_edit)]
    set_karma: Vec<(Virtue, u16)>,
    #[arg(long = "set-hp", value_name = "SLOT=N", value_parser = parse_slot_edit)]
    set_hp: Vec<(usize, u16)>,
    #[arg(long = "set-xp", value_name = "SLOT=N", value_parser = parse_slot_edit)]
    set_xp: Vec<(usize, u16)>,
    #[arg(long = "set-ship-hull")]
    set_ship_hull: Option<u16>,
    #[arg(long = "set-reagent", value_name = "NAME=N", value_parser = parse_reagent_edit)]
    set_reagent: Vec<(Reagent, u16)>,
    #[arg(long, value_name = "NAME")]
    join: Vec<String>,
    #[arg(long, value_name = "GOLD")]
    donate: Option<u16>,
    #[arg(long = "end-turns", value_name = "N")]
    end_turns: Option<u32>,
    #[arg(long, value_enum, default_value_t = ContextArg::WorldMap)]
    context: ContextArg,
    /// Seed for reproducible simulation.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    output: Option<PathBuf>,
    /// Overwrite an existing --output file.
    #[arg(long)]
    force: bool,
}

impl Cli {
    fn fields(&self) -> FieldSelection {
        FieldSelection {
            name: self.name,
            moves: self.moves,
            food: self.food,
            gold: self.gold,
            position: self.position,
            transport: self.transport,
            ship_hull: self.ship_hull,
            karma: self.karma,
            characters: self.characters,
            inventory: self.inventory,
            reagents: self.reagents,
            creatures: self.creatures,
        }
    }

    fn has_edits(&self) -> bool {
        self.set_gold.is_some()
            || self.set_food.is_some()
            || !self.set_karma.is_empty()
            || !self.set_hp.is_empty()
            || !self.set_xp.is_empty()
            || self.set_ship_hull.is_some()
            || !self.set_reagent.is_empty()
    }

    fn has_simulation(&self) -> bool {
        !self.join.is_empty() || self.donate.is_some() || self.end_turns.is_some()
    }
}

fn split_assignment(raw: &str) -> Result<(&str, u16), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=N, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<u16>()
        .map_err(|e| format!("invalid value in '{raw}': {e}"))?;
    Ok((key.trim(), value))
}

fn parse_karma_edit(raw: &str) -> Result<(Virtue, u16), String> {
    let (name, value) = split_assignment(raw)?;
    let virtue = Virtue::from_name(name).ok_or_else(|| format!("unknown virtue '{name}'"))?;
    Ok((virtue, value))
}

fn parse_slot_edit(raw: &str) -> Result<(usize, u16), String> {
    let (slot, value) = split_assignment(raw)?;
    let slot = slot
        .parse::<usize>()
        .map_err(|e| format!("invalid slot '{slot}': {e}"))?;
    Ok((slot, value))
}

fn parse_reagent_edit(raw: &str) -> Result<(Reagent, u16), String> {
    let (name, value) = split_assignment(raw)?;
    let reagent = Reagent::from_name(name).ok_or_else(|| format!("unknown reagent '{name}'"))?;
    Ok((reagent, value))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let fields = cli.fields();
    let has_mutations = cli.has_edits() || cli.has_simulation();

    if has_mutations && cli.output.is_none() {
        eprintln!("--set-*, --join, --donate and --end-turns require --output <PATH>");
        process::exit(2);
    }
    if !has_mutations && cli.output.is_some() {
        eprintln!("--output requires at least one edit or simulation flag");
        process::exit(2);
    }
    for out_path in cli.output.iter().chain(&cli.monsters_output) {
        if out_path.exists() && !cli.force {
            eprintln!(
                "Refusing to overwrite {} (pass --force to replace it)",
                out_path.display()
            );
            process::exit(1);
        }
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let mut session = Engine::new().open_bytes(bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if let Some(monsters) = &cli.monsters {
        let table = fs::read(monsters).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {e}", monsters.display());
            process::exit(1);
        });
        session.load_creatures(table).unwrap_or_else(|e| {
            eprintln!("Error parsing creature table: {}", monsters.display());
            eprintln!("  {e}");
            process::exit(1);
        });
    }

    apply_edits(&cli, &mut session);
    if cli.has_simulation() {
        simulate(&cli, &mut session);
    }

    if let Some(out_path) = &cli.output {
        let edited_bytes = session.to_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating modified save bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
        log::info!("wrote {}", out_path.display());
    }

    if let Some(monsters_path) = &cli.monsters_output {
        let table = session.creature_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating creature table bytes: {e}");
            process::exit(1);
        });
        let Some(table) = table else {
            eprintln!("No creature table loaded for {}", monsters_path.display());
            process::exit(1);
        };
        fs::write(monsters_path, table).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", monsters_path.display());
            process::exit(1);
        });
        log::info!("wrote {}", monsters_path.display());
    }

    if cli.layout {
        if cli.json {
            print_json(&render_layout_json(&session));
        } else {
            print!("{}", render_layout_text(&session));
        }
        return;
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        print_json(&json);
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_field_pairs(&session, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    print!("{}", render_text(&session, TextStyle::PartyRoster));
}

fn apply_edits(cli: &Cli, session: &mut Session) {
    if let Some(gold) = cli.set_gold {
        session.set_gold(gold).unwrap_or_else(|e| {
            eprintln!("Error applying gold edit: {e}");
            process::exit(1);
        });
    }
    if let Some(food) = cli.set_food {
        session.set_food(food).unwrap_or_else(|e| {
            eprintln!("Error applying food edit: {e}");
            process::exit(1);
        });
    }
    for &(virtue, value) in &cli.set_karma {
        session.set_karma(virtue, value).unwrap_or_else(|e| {
            eprintln!("Error applying karma edit: {e}");
            process::exit(1);
        });
    }
    for &(slot, hp) in &cli.set_hp {
        session.set_hp(slot, hp).unwrap_or_else(|e| {
            eprintln!("Error applying HP edit: {e}");
            process::exit(1);
        });
    }
    for &(slot, xp) in &cli.set_xp {
        session.set_xp(slot, xp).unwrap_or_else(|e| {
            eprintln!("Error applying xp edit: {e}");
            process::exit(1);
        });
    }
    if let Some(hull) = cli.set_ship_hull {
        session.set_ship_hull(hull).unwrap_or_else(|e| {
            eprintln!("Error applying ship hull edit: {e}");
            process::exit(1);
        });
    }
    for &(reagent, quantity) in &cli.set_reagent {
        session.set_reagent(reagent, quantity).unwrap_or_else(|e| {
            eprintln!("Error applying reagent edit: {e}");
            process::exit(1);
        });
    }
}

fn simulate(cli: &Cli, session: &mut Session) {
    let mut party = session.party(cli.context.to_core(), cli.seed);
    party.subscribe(|event: &PartyEvent| log::info!("party event: {event:?}"));

    for name in &cli.join {
        party.join(name).unwrap_or_else(|e| {
            eprintln!("{name} cannot join: {e}");
            process::exit(1);
        });
    }
    if let Some(gold) = cli.donate {
        party.donate(gold).unwrap_or_else(|e| {
            eprintln!("Cannot donate {gold} gold: {e}");
            process::exit(1);
        });
    }
    for _ in 0..cli.end_turns.unwrap_or(0) {
        party.end_turn();
    }
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
