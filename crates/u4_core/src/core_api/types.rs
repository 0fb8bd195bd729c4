use serde::{Deserialize, Serialize};

use crate::sex::Sex;
use crate::types::{Armor, ClassType, Reagent, Status, Transport, Virtue, Weapon};

/// Campaign-wide values, with food in whole units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub avatar_name: String,
    pub moves: u32,
    pub members: u16,
    pub food: u32,
    pub gold: u16,
    pub torches: u16,
    pub gems: u16,
    pub keys: u16,
    pub sextants: u16,
    pub x: u8,
    pub y: u8,
    pub location: u16,
    /// `None` on the surface.
    pub dungeon_level: Option<u16>,
    pub transport: Transport,
    pub ship_hull: u16,
    pub stones: u8,
    pub runes: u8,
    pub trammel_phase: u16,
    pub felucca_phase: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterEntry {
    pub slot: usize,
    pub name: String,
    pub sex: Sex,
    pub class: ClassType,
    pub status: Status,
    pub hp: u16,
    pub hp_max: u16,
    pub xp: u16,
    pub level: u16,
    pub strength: u16,
    pub dexterity: u16,
    pub intelligence: u16,
    pub mp: u16,
    pub weapon: Weapon,
    pub armor: Armor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KarmaEntry {
    pub virtue: Virtue,
    pub value: u16,
    /// The Avatar has attained this virtue; `value` is 0.
    pub avatar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryKind {
    Weapon,
    Armor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryEntry {
    pub kind: InventoryKind,
    pub name: String,
    pub quantity: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReagentEntry {
    pub reagent: Reagent,
    pub quantity: u16,
}
