use std::fmt;

use serde::{Deserialize, Serialize};

// Save file constants
pub const PARTY_SLOTS: usize = 8;
pub const VIRTUE_COUNT: usize = 8;
pub const ARMOR_TYPE_COUNT: usize = 8;
pub const WEAPON_TYPE_COUNT: usize = 16;
pub const REAGENT_TYPE_COUNT: usize = 8;
pub const SPELL_TYPE_COUNT: usize = 26;
pub const NAME_LEN: usize = 16;

/// `dnglevel` value meaning the party is not in a dungeon.
pub const NOT_IN_DUNGEON: u16 = 0xFFFF;

// Numeric ceilings
pub const MAX_FOOD: u32 = 999_900;
pub const MAX_GOLD: u16 = 9999;
pub const MAX_XP: u16 = 9999;
pub const MAX_STAT: u16 = 50;
pub const MAX_MP: u16 = 99;
pub const MAX_LEVEL: u16 = 8;
pub const MAX_REAGENT: u16 = 99;
pub const MAX_SHIP_HULL: u16 = 99;
/// Ships never repair themselves beyond this.
pub const SHIP_HULL_REPAIR_LIMIT: u16 = 50;
pub const MAX_KARMA: u16 = 99;
/// Karma value stored for a virtue the Avatar has attained.
pub const AVATAR_KARMA: u16 = 0;

// Tiles
pub const AVATAR_TILE: u16 = 0x1F;
pub const CORPSE_TILE: u16 = 0x38;
pub const BALLOON_TILE: u16 = 0x18;
const SHIP_TILES: std::ops::RangeInclusive<u16> = 0x10..=0x13;
const HORSE_TILES: std::ops::RangeInclusive<u16> = 0x14..=0x15;
const CLASS_TILE_BASE: u16 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Virtue {
    Honesty,
    Compassion,
    Valor,
    Justice,
    Sacrifice,
    Honor,
    Spirituality,
    Humility,
}

impl Virtue {
    pub const ALL: [Virtue; VIRTUE_COUNT] = [
        Virtue::Honesty,
        Virtue::Compassion,
        Virtue::Valor,
        Virtue::Justice,
        Virtue::Sacrifice,
        Virtue::Honor,
        Virtue::Spirituality,
        Virtue::Humility,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Honesty => "Honesty",
            Self::Compassion => "Compassion",
            Self::Valor => "Valor",
            Self::Justice => "Justice",
            Self::Sacrifice => "Sacrifice",
            Self::Honor => "Honor",
            Self::Spirituality => "Spirituality",
            Self::Humility => "Humility",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(name))
    }

    /// Bit for this virtue in the rune and stone masks.
    pub fn mask(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Virtue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character class. The raw value doubles as the index of the class's virtue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    Mage,
    Bard,
    Fighter,
    Druid,
    Tinker,
    Paladin,
    Ranger,
    Shepherd,
    Unknown(u8),
}

impl ClassType {
    pub const ALL: [ClassType; 8] = [
        ClassType::Mage,
        ClassType::Bard,
        ClassType::Fighter,
        ClassType::Druid,
        ClassType::Tinker,
        ClassType::Paladin,
        ClassType::Ranger,
        ClassType::Shepherd,
    ];

    pub fn from_raw(raw: u8) -> Self {
        Self::ALL
            .get(raw as usize)
            .copied()
            .unwrap_or(Self::Unknown(raw))
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::Mage => 0,
            Self::Bard => 1,
            Self::Fighter => 2,
            Self::Druid => 3,
            Self::Tinker => 4,
            Self::Paladin => 5,
            Self::Ranger => 6,
            Self::Shepherd => 7,
            Self::Unknown(other) => other,
        }
    }

    /// The virtue this class embodies.
    ///
    /// # Panics
    ///
    /// Panics on an unrecognized class; that only happens with corrupted data.
    pub fn virtue(&self) -> Virtue {
        match *self {
            Self::Unknown(raw) => panic!("invalid player class: {raw}"),
            known => Virtue::ALL[known.raw() as usize],
        }
    }

    /// Map tile used to draw a member of this class.
    pub fn tile(&self) -> u16 {
        CLASS_TILE_BASE + u16::from(self.raw()) * 2
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Mage => "Mage",
            Self::Bard => "Bard",
            Self::Fighter => "Fighter",
            Self::Druid => "Druid",
            Self::Tinker => "Tinker",
            Self::Paladin => "Paladin",
            Self::Ranger => "Ranger",
            Self::Shepherd => "Shepherd",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(v) => write!(f, "Unknown ({v})"),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Good,
    Poisoned,
    Sleeping,
    Dead,
}

impl Status {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            b'G' => Some(Self::Good),
            b'P' => Some(Self::Poisoned),
            b'S' => Some(Self::Sleeping),
            b'D' => Some(Self::Dead),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::Good => b'G',
            Self::Poisoned => b'P',
            Self::Sleeping => b'S',
            Self::Dead => b'D',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Poisoned => "Poisoned",
            Self::Sleeping => "Sleeping",
            Self::Dead => "Dead",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    Hands,
    Staff,
    Dagger,
    Sling,
    Mace,
    Axe,
    Sword,
    Bow,
    Crossbow,
    FlamingOil,
    Halberd,
    MagicAxe,
    MagicSword,
    MagicBow,
    MagicWand,
    MysticSword,
}

impl Weapon {
    pub const ALL: [Weapon; WEAPON_TYPE_COUNT] = [
        Weapon::Hands,
        Weapon::Staff,
        Weapon::Dagger,
        Weapon::Sling,
        Weapon::Mace,
        Weapon::Axe,
        Weapon::Sword,
        Weapon::Bow,
        Weapon::Crossbow,
        Weapon::FlamingOil,
        Weapon::Halberd,
        Weapon::MagicAxe,
        Weapon::MagicSword,
        Weapon::MagicBow,
        Weapon::MagicWand,
        Weapon::MysticSword,
    ];

    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn raw(self) -> u16 {
        self as u16
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether an attack with this weapon reaches beyond adjacent tiles.
    pub fn is_ranged(self) -> bool {
        matches!(
            self,
            Self::Dagger
                | Self::Sling
                | Self::Bow
                | Self::Crossbow
                | Self::FlamingOil
                | Self::Halberd
                | Self::MagicAxe
                | Self::MagicBow
                | Self::MagicWand
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hands => "Hands",
            Self::Staff => "Staff",
            Self::Dagger => "Dagger",
            Self::Sling => "Sling",
            Self::Mace => "Mace",
            Self::Axe => "Axe",
            Self::Sword => "Sword",
            Self::Bow => "Bow",
            Self::Crossbow => "Crossbow",
            Self::FlamingOil => "Flaming Oil",
            Self::Halberd => "Halberd",
            Self::MagicAxe => "Magic Axe",
            Self::MagicSword => "Magic Sword",
            Self::MagicBow => "Magic Bow",
            Self::MagicWand => "Magic Wand",
            Self::MysticSword => "Mystic Sword",
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Armor {
    None,
    Cloth,
    Leather,
    Chain,
    Plate,
    MagicChain,
    MagicPlate,
    MysticRobes,
}

impl Armor {
    pub const ALL: [Armor; ARMOR_TYPE_COUNT] = [
        Armor::None,
        Armor::Cloth,
        Armor::Leather,
        Armor::Chain,
        Armor::Plate,
        Armor::MagicChain,
        Armor::MagicPlate,
        Armor::MysticRobes,
    ];

    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn raw(self) -> u16 {
        self as u16
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "Skin",
            Self::Cloth => "Cloth",
            Self::Leather => "Leather",
            Self::Chain => "Chain Mail",
            Self::Plate => "Plate Mail",
            Self::MagicChain => "Magic Chain",
            Self::MagicPlate => "Magic Plate",
            Self::MysticRobes => "Mystic Robes",
        }
    }
}

impl fmt::Display for Armor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reagent {
    SulfurAsh,
    Ginseng,
    Garlic,
    SpiderSilk,
    BloodMoss,
    BlackPearl,
    Nightshade,
    MandrakeRoot,
}

impl Reagent {
    pub const ALL: [Reagent; REAGENT_TYPE_COUNT] = [
        Reagent::SulfurAsh,
        Reagent::Ginseng,
        Reagent::Garlic,
        Reagent::SpiderSilk,
        Reagent::BloodMoss,
        Reagent::BlackPearl,
        Reagent::Nightshade,
        Reagent::MandrakeRoot,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SulfurAsh => "Sulfur Ash",
            Self::Ginseng => "Ginseng",
            Self::Garlic => "Garlic",
            Self::SpiderSilk => "Spider Silk",
            Self::BloodMoss => "Blood Moss",
            Self::BlackPearl => "Black Pearl",
            Self::Nightshade => "Nightshade",
            Self::MandrakeRoot => "Mandrake Root",
        }
    }

    /// Matches display names loosely: case-insensitive, spaces optional.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();
        Self::ALL.iter().copied().find(|r| {
            let candidate: String = r.as_str().chars().filter(|c| *c != ' ').collect();
            candidate.eq_ignore_ascii_case(&wanted)
        })
    }
}

impl fmt::Display for Reagent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locomotion mode, derived from the transport tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    Foot,
    Horse,
    Ship,
    Balloon,
}

impl Transport {
    pub fn from_tile(tile: u16) -> Self {
        if HORSE_TILES.contains(&tile) {
            Self::Horse
        } else if SHIP_TILES.contains(&tile) {
            Self::Ship
        } else if tile == BALLOON_TILE {
            Self::Balloon
        } else {
            Self::Foot
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Foot => "Foot",
            Self::Horse => "Horse",
            Self::Ship => "Ship",
            Self::Balloon => "Balloon",
        }
    }
}

/// Where the party currently is. Decides which per-turn rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationContext {
    WorldMap,
    Town,
    Dungeon,
    Combat,
    Camp,
    Altar,
}

impl LocationContext {
    /// Food, poison and sleep only tick outside of combat-style maps.
    pub fn is_non_combat(self) -> bool {
        matches!(self, Self::WorldMap | Self::Town | Self::Dungeon)
    }

    pub fn is_combat(self) -> bool {
        self == Self::Combat
    }
}

/// Effect a tile applies to whoever stands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileEffect {
    None,
    Fire,
    Lava,
    Sleep,
    Poison,
    PoisonField,
    Electricity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_index_matches_virtue() {
        assert_eq!(ClassType::Mage.virtue(), Virtue::Honesty);
        assert_eq!(ClassType::Paladin.virtue(), Virtue::Honor);
        assert_eq!(ClassType::Shepherd.virtue(), Virtue::Humility);
    }

    #[test]
    #[should_panic(expected = "invalid player class")]
    fn unknown_class_has_no_virtue() {
        ClassType::from_raw(12).virtue();
    }

    #[test]
    fn transport_classification_follows_tile_ranges() {
        assert_eq!(Transport::from_tile(AVATAR_TILE), Transport::Foot);
        assert_eq!(Transport::from_tile(0x10), Transport::Ship);
        assert_eq!(Transport::from_tile(0x13), Transport::Ship);
        assert_eq!(Transport::from_tile(0x14), Transport::Horse);
        assert_eq!(Transport::from_tile(BALLOON_TILE), Transport::Balloon);
    }

    #[test]
    fn status_codes_are_ascii_letters() {
        assert_eq!(Status::from_raw(b'P'), Some(Status::Poisoned));
        assert_eq!(Status::Dead.raw(), b'D');
        assert_eq!(Status::from_raw(0), None);
    }

    #[test]
    fn reagent_names_parse_loosely() {
        assert_eq!(Reagent::from_name("black pearl"), Some(Reagent::BlackPearl));
        assert_eq!(Reagent::from_name("MandrakeRoot"), Some(Reagent::MandrakeRoot));
        assert_eq!(Reagent::from_name("eye of newt"), None);
    }

    #[test]
    fn class_tiles_step_by_two() {
        assert_eq!(ClassType::Mage.tile(), 0x20);
        assert_eq!(ClassType::Shepherd.tile(), 0x2E);
    }
}
