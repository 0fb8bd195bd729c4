use crate::layout::FileLayout;
use crate::party::Party;
use crate::save::{
    CharacterRecord, CreatureSnapshot, SaveState, read_creature_table, write_creature_table,
};
use crate::types::{
    AVATAR_KARMA, Armor, LocationContext, MAX_FOOD, MAX_GOLD, MAX_KARMA, MAX_REAGENT,
    MAX_SHIP_HULL, MAX_XP, Reagent, Transport, Virtue, Weapon,
};

use super::error::{CoreError, CoreErrorCode};
use super::types::{
    CharacterEntry, InventoryEntry, InventoryKind, KarmaEntry, ReagentEntry, Snapshot,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// A parsed PARTY.SAV, optionally with its MONSTERS.SAV table.
#[derive(Debug)]
pub struct Session {
    save: SaveState,
    layout: FileLayout,
    creatures: Option<Vec<CreatureSnapshot>>,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let (save, layout) = SaveState::parse_with_layout(bytes.as_ref()).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse party save: {e}"),
            )
        })?;

        Ok(Session {
            save,
            layout,
            creatures: None,
        })
    }
}

impl Session {
    pub fn save(&self) -> &SaveState {
        &self.save
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn load_creatures<B: AsRef<[u8]>>(&mut self, bytes: B) -> Result<(), CoreError> {
        let creatures = read_creature_table(bytes.as_ref()).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse creature table: {e}"),
            )
        })?;
        self.creatures = Some(creatures);
        Ok(())
    }

    /// Live creatures, or an empty list if no table was loaded.
    pub fn creatures(&self) -> &[CreatureSnapshot] {
        self.creatures.as_deref().unwrap_or(&[])
    }

    pub fn snapshot(&self) -> Snapshot {
        let save = &self.save;
        Snapshot {
            avatar_name: save.players[0].name(),
            moves: save.moves,
            members: save.members,
            food: save.food / 100,
            gold: save.gold,
            torches: save.torches,
            gems: save.gems,
            keys: save.keys,
            sextants: save.sextants,
            x: save.x,
            y: save.y,
            location: save.location,
            dungeon_level: save.in_dungeon().then_some(save.dng_level),
            transport: Transport::from_tile(save.transport),
            ship_hull: save.ship_hull,
            stones: save.stones,
            runes: save.runes,
            trammel_phase: save.trammel_phase,
            felucca_phase: save.felucca_phase,
        }
    }

    pub fn characters(&self) -> Vec<CharacterEntry> {
        self.save
            .active_players()
            .iter()
            .enumerate()
            .map(|(slot, record)| CharacterEntry {
                slot,
                name: record.name(),
                sex: record.sex,
                class: record.class,
                status: record.status,
                hp: record.hp,
                hp_max: record.hp_max,
                xp: record.xp,
                level: record.level(),
                strength: record.strength,
                dexterity: record.dexterity,
                intelligence: record.intelligence,
                mp: record.mp,
                weapon: record.weapon,
                armor: record.armor,
            })
            .collect()
    }

    pub fn karma(&self) -> Vec<KarmaEntry> {
        Virtue::ALL
            .iter()
            .map(|&virtue| {
                let value = self.save.karma[virtue.index()];
                KarmaEntry {
                    virtue,
                    value,
                    avatar: value == AVATAR_KARMA,
                }
            })
            .collect()
    }

    /// Weapons and armor carried in the pack, skipping empty entries.
    pub fn inventory(&self) -> Vec<InventoryEntry> {
        let weapons = Weapon::ALL.iter().filter_map(|&weapon| {
            let quantity = self.save.weapons[weapon.index()];
            (quantity > 0).then(|| InventoryEntry {
                kind: InventoryKind::Weapon,
                name: weapon.as_str().to_string(),
                quantity,
            })
        });
        let armor = Armor::ALL.iter().filter_map(|&armor| {
            let quantity = self.save.armor[armor.index()];
            (quantity > 0).then(|| InventoryEntry {
                kind: InventoryKind::Armor,
                name: armor.as_str().to_string(),
                quantity,
            })
        });
        weapons.chain(armor).collect()
    }

    pub fn reagents(&self) -> Vec<ReagentEntry> {
        Reagent::ALL
            .iter()
            .map(|&reagent| ReagentEntry {
                reagent,
                quantity: self.save.reagents[reagent.index()],
            })
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.save.to_bytes().map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to emit party save: {e}"),
            )
        })
    }

    /// The creature table in MONSTERS.SAV form, if one was loaded.
    pub fn creature_bytes(&self) -> Result<Option<Vec<u8>>, CoreError> {
        let Some(creatures) = &self.creatures else {
            return Ok(None);
        };
        let mut out = Vec::new();
        write_creature_table(creatures, &mut out).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to emit creature table: {e}"),
            )
        })?;
        Ok(Some(out))
    }

    pub fn set_gold(&mut self, gold: u16) -> Result<(), CoreError> {
        if gold > MAX_GOLD {
            return Err(CoreError::invalid_input(format!(
                "gold {gold} exceeds maximum {MAX_GOLD}"
            )));
        }
        self.save.gold = gold;
        Ok(())
    }

    /// Sets food in whole units.
    pub fn set_food(&mut self, food: u32) -> Result<(), CoreError> {
        let max_units = MAX_FOOD / 100;
        if food > max_units {
            return Err(CoreError::invalid_input(format!(
                "food {food} exceeds maximum {max_units}"
            )));
        }
        self.save.food = food * 100;
        Ok(())
    }

    /// 0 marks the virtue as attained.
    pub fn set_karma(&mut self, virtue: Virtue, value: u16) -> Result<(), CoreError> {
        if value > MAX_KARMA {
            return Err(CoreError::invalid_input(format!(
                "karma {value} for {virtue} exceeds maximum {MAX_KARMA}"
            )));
        }
        self.save.karma[virtue.index()] = value;
        Ok(())
    }

    pub fn set_hp(&mut self, slot: usize, hp: u16) -> Result<(), CoreError> {
        let record = self.active_record_mut(slot)?;
        if hp > record.hp_max {
            return Err(CoreError::invalid_input(format!(
                "hp {hp} exceeds slot {slot} maximum {}",
                record.hp_max
            )));
        }
        record.hp = hp;
        Ok(())
    }

    pub fn set_xp(&mut self, slot: usize, xp: u16) -> Result<(), CoreError> {
        if xp > MAX_XP {
            return Err(CoreError::invalid_input(format!(
                "xp {xp} exceeds maximum {MAX_XP}"
            )));
        }
        self.active_record_mut(slot)?.xp = xp;
        Ok(())
    }

    pub fn set_ship_hull(&mut self, hull: u16) -> Result<(), CoreError> {
        if hull > MAX_SHIP_HULL {
            return Err(CoreError::invalid_input(format!(
                "ship hull {hull} exceeds maximum {MAX_SHIP_HULL}"
            )));
        }
        self.save.ship_hull = hull;
        Ok(())
    }

    pub fn set_reagent(&mut self, reagent: Reagent, quantity: u16) -> Result<(), CoreError> {
        if quantity > MAX_REAGENT {
            return Err(CoreError::invalid_input(format!(
                "{reagent} quantity {quantity} exceeds maximum {MAX_REAGENT}"
            )));
        }
        self.save.reagents[reagent.index()] = quantity;
        Ok(())
    }

    /// A live party over this session's save. `seed` makes dice rolls repeatable.
    pub fn party(&mut self, context: LocationContext, seed: Option<u64>) -> Party<'_> {
        match seed {
            Some(seed) => Party::with_seed(&mut self.save, context, seed),
            None => Party::new(&mut self.save, context),
        }
    }

    fn active_record_mut(&mut self, slot: usize) -> Result<&mut CharacterRecord, CoreError> {
        let members = usize::from(self.save.members);
        if slot >= members || slot >= self.save.players.len() {
            return Err(CoreError::invalid_input(format!(
                "slot {slot} is not in the party ({members} members)"
            )));
        }
        Ok(&mut self.save.players[slot])
    }
}
