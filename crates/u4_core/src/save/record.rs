use std::io::{self, Read, Write};

use crate::codec::{LittleEndianReader, LittleEndianWriter};
use crate::sex::Sex;
use crate::types::{Armor, ClassType, MAX_LEVEL, MAX_MP, NAME_LEN, Status, Weapon};

/// One party member's persistent attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    pub hp: u16,
    pub hp_max: u16,
    pub xp: u16,
    pub strength: u16,
    pub dexterity: u16,
    pub intelligence: u16,
    pub mp: u16,
    pub unknown: u16,
    pub weapon: Weapon,
    pub armor: Armor,
    pub name: [u8; NAME_LEN],
    pub sex: Sex,
    pub class: ClassType,
    pub status: Status,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        Self {
            hp: 0,
            hp_max: 0,
            xp: 0,
            strength: 0,
            dexterity: 0,
            intelligence: 0,
            mp: 0,
            unknown: 0,
            weapon: Weapon::Hands,
            armor: Armor::None,
            name: [0; NAME_LEN],
            sex: Sex::Male,
            class: ClassType::Mage,
            status: Status::Good,
        }
    }
}

impl CharacterRecord {
    pub const ENCODED_LEN: usize = 39;

    /// A healthy level-one character.
    pub fn new(name: &str, sex: Sex, class: ClassType) -> Self {
        let mut record = Self {
            hp: 100,
            hp_max: 100,
            sex,
            class,
            ..Self::default()
        };
        record.set_name(name);
        record
    }

    /// Name up to the first NUL.
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Stores `name` NUL-padded, truncated so at least one NUL remains.
    pub fn set_name(&mut self, name: &str) {
        self.name = [0; NAME_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NAME_LEN - 1);
        self.name[..len].copy_from_slice(&bytes[..len]);
    }

    pub fn level(&self) -> u16 {
        self.hp_max / 100
    }

    /// Highest level the current experience supports. Each level needs
    /// double the previous threshold, starting at 100.
    pub fn max_level(&self) -> u16 {
        let mut level = 1;
        let mut next: u32 = 100;

        while u32::from(self.xp) >= next && level < MAX_LEVEL {
            level += 1;
            next <<= 1;
        }

        level
    }

    /// Most magic points this character can hold, from class and intelligence.
    ///
    /// # Panics
    ///
    /// Panics on an unrecognized class.
    pub fn max_mp(&self) -> u16 {
        let intel = self.intelligence;
        let max_mp = match self.class {
            ClassType::Mage => intel.saturating_mul(2),
            ClassType::Druid => (u32::from(intel) * 3 / 2).min(u32::from(u16::MAX)) as u16,
            ClassType::Bard | ClassType::Paladin | ClassType::Ranger => intel,
            ClassType::Tinker => intel / 2,
            ClassType::Fighter | ClassType::Shepherd => 0,
            ClassType::Unknown(raw) => panic!("invalid player class: {raw}"),
        };

        max_mp.min(MAX_MP)
    }

    pub fn read<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        let hp = r.read_u16()?;
        let hp_max = r.read_u16()?;
        let xp = r.read_u16()?;
        let strength = r.read_u16()?;
        let dexterity = r.read_u16()?;
        let intelligence = r.read_u16()?;
        let mp = r.read_u16()?;
        let unknown = r.read_u16()?;

        let raw_weapon = r.read_u16()?;
        let weapon = Weapon::from_raw(raw_weapon).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid weapon code {raw_weapon}"),
            )
        })?;
        let raw_armor = r.read_u16()?;
        let armor = Armor::from_raw(raw_armor).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid armor code {raw_armor}"),
            )
        })?;

        let name = r.read_array::<NAME_LEN>()?;
        let sex = Sex::from_raw(r.read_u8()?);
        let class = ClassType::from_raw(r.read_u8()?);
        let raw_status = r.read_u8()?;
        let status = Status::from_raw(raw_status).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid status code {raw_status:#04x}"),
            )
        })?;

        Ok(Self {
            hp,
            hp_max,
            xp,
            strength,
            dexterity,
            intelligence,
            mp,
            unknown,
            weapon,
            armor,
            name,
            sex,
            class,
            status,
        })
    }

    pub fn write<W: Write>(&self, w: &mut LittleEndianWriter<W>) -> io::Result<()> {
        w.write_u16(self.hp)?;
        w.write_u16(self.hp_max)?;
        w.write_u16(self.xp)?;
        w.write_u16(self.strength)?;
        w.write_u16(self.dexterity)?;
        w.write_u16(self.intelligence)?;
        w.write_u16(self.mp)?;
        w.write_u16(self.unknown)?;
        w.write_u16(self.weapon.raw())?;
        w.write_u16(self.armor.raw())?;
        w.write_bytes(&self.name)?;
        w.write_u8(self.sex.raw())?;
        w.write_u8(self.class.raw())?;
        w.write_u8(self.status.raw())
    }
}
