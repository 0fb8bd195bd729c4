pub mod creatures;
pub mod record;

use std::io::{self, Cursor, Read, Write};

use crate::codec::{LittleEndianReader, LittleEndianWriter};
use crate::layout::{ByteRange, FileLayout, SectionId, SectionLayout};
use crate::types::{
    ARMOR_TYPE_COUNT, AVATAR_TILE, NOT_IN_DUNGEON, PARTY_SLOTS, REAGENT_TYPE_COUNT,
    SPELL_TYPE_COUNT, VIRTUE_COUNT, WEAPON_TYPE_COUNT,
};
pub use creatures::{CREATURE_TABLE_SLOTS, CreatureSnapshot, read_creature_table, write_creature_table};
pub use record::CharacterRecord;

const INITIAL_KARMA: u16 = 20;
const INITIAL_SHIP_HULL: u16 = 50;

/// The complete persistent campaign state stored in PARTY.SAV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveState {
    pub unknown1: u32,
    pub moves: u32,
    pub players: [CharacterRecord; PARTY_SLOTS],
    /// Hundredths of a food unit.
    pub food: u32,
    pub gold: u16,
    /// 0 means the Avatar has attained the virtue; otherwise 1..=99, higher is
    /// more virtuous and 99 allows elevation.
    pub karma: [u16; VIRTUE_COUNT],
    pub torches: u16,
    pub gems: u16,
    pub keys: u16,
    pub sextants: u16,
    pub armor: [u16; ARMOR_TYPE_COUNT],
    pub weapons: [u16; WEAPON_TYPE_COUNT],
    pub reagents: [u16; REAGENT_TYPE_COUNT],
    pub mixtures: [u16; SPELL_TYPE_COUNT],
    pub items: u16,
    pub x: u8,
    pub y: u8,
    pub stones: u8,
    pub runes: u8,
    pub members: u16,
    pub transport: u16,
    pub balloon_state: u16,
    pub trammel_phase: u16,
    pub felucca_phase: u16,
    pub ship_hull: u16,
    pub lb_intro: u16,
    pub last_camp: u16,
    pub last_reagent: u16,
    pub last_meditation: u16,
    pub last_virtue: u16,
    pub dng_x: u8,
    pub dng_y: u8,
    pub orientation: u16,
    pub dng_level: u16,
    pub location: u16,
    /// Remaining turns of torch light. Kept in step by the party but not
    /// part of the file; it reads back as 0.
    pub torch_duration: u16,
}

struct Capture {
    sections: Vec<SectionLayout>,
}

impl Capture {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    fn record(&mut self, id: SectionId, start: u64, end: u64) {
        self.sections.push(SectionLayout {
            id,
            range: ByteRange {
                start: start as usize,
                end: end as usize,
            },
        });
    }
}

impl SaveState {
    pub const ENCODED_LEN: usize = 502;

    /// A fresh campaign with `avatar` in slot 0 and default resources.
    pub fn init(avatar: CharacterRecord) -> Self {
        let mut players: [CharacterRecord; PARTY_SLOTS] = Default::default();
        players[0] = avatar;

        Self {
            unknown1: 0,
            moves: 0,
            players,
            food: 0,
            gold: 0,
            karma: [INITIAL_KARMA; VIRTUE_COUNT],
            torches: 0,
            gems: 0,
            keys: 0,
            sextants: 0,
            armor: [0; ARMOR_TYPE_COUNT],
            weapons: [0; WEAPON_TYPE_COUNT],
            reagents: [0; REAGENT_TYPE_COUNT],
            mixtures: [0; SPELL_TYPE_COUNT],
            items: 0,
            x: 0,
            y: 0,
            stones: 0,
            runes: 0,
            members: 1,
            transport: AVATAR_TILE,
            balloon_state: 0,
            trammel_phase: 0,
            felucca_phase: 0,
            ship_hull: INITIAL_SHIP_HULL,
            lb_intro: 0,
            last_camp: 0,
            last_reagent: 0,
            last_meditation: 0,
            last_virtue: 0,
            dng_x: 0,
            dng_y: 0,
            orientation: 0,
            dng_level: NOT_IN_DUNGEON,
            location: 0,
            torch_duration: 0,
        }
    }

    pub fn read<R: Read>(reader: R) -> io::Result<Self> {
        let mut r = LittleEndianReader::new(reader);
        read_internal(&mut r, None)
    }

    /// Reads a complete PARTY.SAV image and records where each section lives.
    /// Trailing bytes after the last field are rejected.
    pub fn parse_with_layout(bytes: &[u8]) -> io::Result<(Self, FileLayout)> {
        let mut capture = Capture::new();
        let mut r = LittleEndianReader::new(Cursor::new(bytes));
        let save = read_internal(&mut r, Some(&mut capture))?;

        let consumed = r.position() as usize;
        if consumed != bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unexpected {} trailing bytes after party data",
                    bytes.len() - consumed
                ),
            ));
        }

        let layout = FileLayout {
            file_len: bytes.len(),
            sections: capture.sections,
        };
        layout.validate()?;

        Ok((save, layout))
    }

    pub fn write<W: Write>(&self, writer: W) -> io::Result<()> {
        let mut w = LittleEndianWriter::new(writer);

        w.write_u32(self.unknown1)?;
        w.write_u32(self.moves)?;

        for player in &self.players {
            player.write(&mut w)?;
        }

        w.write_u32(self.food)?;
        w.write_u16(self.gold)?;
        w.write_u16_slice(&self.karma)?;

        w.write_u16(self.torches)?;
        w.write_u16(self.gems)?;
        w.write_u16(self.keys)?;
        w.write_u16(self.sextants)?;
        w.write_u16_slice(&self.armor)?;
        w.write_u16_slice(&self.weapons)?;

        w.write_u16_slice(&self.reagents)?;
        w.write_u16_slice(&self.mixtures)?;
        w.write_u16(self.items)?;

        w.write_u8(self.x)?;
        w.write_u8(self.y)?;
        w.write_u8(self.stones)?;
        w.write_u8(self.runes)?;
        w.write_u16(self.members)?;

        w.write_u16(self.transport)?;
        w.write_u16(self.balloon_state)?;
        w.write_u16(self.trammel_phase)?;
        w.write_u16(self.felucca_phase)?;
        w.write_u16(self.ship_hull)?;
        w.write_u16(self.lb_intro)?;
        w.write_u16(self.last_camp)?;
        w.write_u16(self.last_reagent)?;
        w.write_u16(self.last_meditation)?;
        w.write_u16(self.last_virtue)?;

        w.write_u8(self.dng_x)?;
        w.write_u8(self.dng_y)?;
        w.write_u16(self.orientation)?;
        w.write_u16(self.dng_level)?;
        w.write_u16(self.location)?;

        w.flush()
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        self.write(&mut out)?;
        Ok(out)
    }

    pub fn in_dungeon(&self) -> bool {
        self.dng_level != NOT_IN_DUNGEON
    }

    /// Records of the members currently in the party.
    pub fn active_players(&self) -> &[CharacterRecord] {
        let count = usize::from(self.members).clamp(1, PARTY_SLOTS);
        &self.players[..count]
    }
}

fn read_internal<R: Read>(
    r: &mut LittleEndianReader<R>,
    mut capture: Option<&mut Capture>,
) -> io::Result<SaveState> {
    let start = r.position();
    let unknown1 = r.read_u32()?;
    let moves = r.read_u32()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Header, start, r.position());
    }

    let mut players: [CharacterRecord; PARTY_SLOTS] = Default::default();
    for (slot, player) in players.iter_mut().enumerate() {
        let start = r.position();
        *player = CharacterRecord::read(r)?;
        if let Some(c) = capture.as_deref_mut() {
            c.record(SectionId::Character(slot as u8), start, r.position());
        }
    }

    let start = r.position();
    let food = r.read_u32()?;
    let gold = r.read_u16()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Resources, start, r.position());
    }

    let start = r.position();
    let karma = r.read_u16_array::<VIRTUE_COUNT>()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Karma, start, r.position());
    }

    let start = r.position();
    let torches = r.read_u16()?;
    let gems = r.read_u16()?;
    let keys = r.read_u16()?;
    let sextants = r.read_u16()?;
    let armor = r.read_u16_array::<ARMOR_TYPE_COUNT>()?;
    let weapons = r.read_u16_array::<WEAPON_TYPE_COUNT>()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Equipment, start, r.position());
    }

    let start = r.position();
    let reagents = r.read_u16_array::<REAGENT_TYPE_COUNT>()?;
    let mixtures = r.read_u16_array::<SPELL_TYPE_COUNT>()?;
    let items = r.read_u16()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Inventory, start, r.position());
    }

    let start = r.position();
    let x = r.read_u8()?;
    let y = r.read_u8()?;
    let stones = r.read_u8()?;
    let runes = r.read_u8()?;
    let members = r.read_u16()?;
    if members == 0 || usize::from(members) > PARTY_SLOTS {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("party member count {members} outside 1..={PARTY_SLOTS}"),
        ));
    }
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Position, start, r.position());
    }

    let start = r.position();
    let transport = r.read_u16()?;
    let balloon_state = r.read_u16()?;
    let trammel_phase = r.read_u16()?;
    let felucca_phase = r.read_u16()?;
    let ship_hull = r.read_u16()?;
    let lb_intro = r.read_u16()?;
    let last_camp = r.read_u16()?;
    let last_reagent = r.read_u16()?;
    let last_meditation = r.read_u16()?;
    let last_virtue = r.read_u16()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Environment, start, r.position());
    }

    let start = r.position();
    let dng_x = r.read_u8()?;
    let dng_y = r.read_u8()?;
    let orientation = r.read_u16()?;
    let mut dng_level = r.read_u16()?;
    let location = r.read_u16()?;
    if let Some(c) = capture.as_deref_mut() {
        c.record(SectionId::Dungeon, start, r.position());
    }

    // Original DOS saves store level 0 at location 0 to mean "on the surface".
    if location == 0 && dng_level == 0 {
        log::debug!("applying surface fix-up: dungeon level 0 at location 0");
        dng_level = NOT_IN_DUNGEON;
    }

    Ok(SaveState {
        unknown1,
        moves,
        players,
        food,
        gold,
        karma,
        torches,
        gems,
        keys,
        sextants,
        armor,
        weapons,
        reagents,
        mixtures,
        items,
        x,
        y,
        stones,
        runes,
        members,
        transport,
        balloon_state,
        trammel_phase,
        felucca_phase,
        ship_hull,
        lb_intro,
        last_camp,
        last_reagent,
        last_meditation,
        last_virtue,
        dng_x,
        dng_y,
        orientation,
        dng_level,
        location,
        torch_duration: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sex::Sex;
    use crate::types::ClassType;

    fn avatar() -> CharacterRecord {
        CharacterRecord::new("Avatar", Sex::Female, ClassType::Shepherd)
    }

    #[test]
    fn init_sets_documented_defaults() {
        let save = SaveState::init(avatar());
        assert_eq!(save.players[0].name(), "Avatar");
        assert_eq!(save.players[1], CharacterRecord::default());
        assert_eq!(save.karma, [20; VIRTUE_COUNT]);
        assert_eq!(save.ship_hull, 50);
        assert_eq!(save.members, 1);
        assert_eq!(save.transport, AVATAR_TILE);
        assert_eq!(save.dng_level, NOT_IN_DUNGEON);
        assert!(!save.in_dungeon());
    }

    #[test]
    fn encoded_length_matches_party_sav() {
        let bytes = SaveState::init(avatar()).to_bytes().unwrap();
        assert_eq!(bytes.len(), SaveState::ENCODED_LEN);
    }

    #[test]
    fn layout_covers_every_section_in_order() {
        let bytes = SaveState::init(avatar()).to_bytes().unwrap();
        let (_, layout) = SaveState::parse_with_layout(&bytes).unwrap();

        assert_eq!(layout.sections.len(), 1 + PARTY_SLOTS + 7);
        assert_eq!(layout.sections[0].range, ByteRange { start: 0, end: 8 });
        let first_character = layout.section(SectionId::Character(0)).unwrap();
        assert_eq!(first_character.range.len(), CharacterRecord::ENCODED_LEN);
        let dungeon = layout.section(SectionId::Dungeon).unwrap();
        assert_eq!(dungeon.range.end, SaveState::ENCODED_LEN);
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = SaveState::init(avatar()).to_bytes().unwrap();
        bytes.push(0);
        let err = SaveState::parse_with_layout(&bytes).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn member_count_must_fit_the_party() {
        for members in [0, 9] {
            let mut save = SaveState::init(avatar());
            save.members = members;
            let bytes = save.to_bytes().unwrap();
            let err = SaveState::read(bytes.as_slice()).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "members {members}");
        }
    }

    #[test]
    fn dungeon_level_zero_outside_location_zero_is_kept() {
        let mut save = SaveState::init(avatar());
        save.location = 3;
        save.dng_level = 0;
        let back = SaveState::read(save.to_bytes().unwrap().as_slice()).unwrap();
        assert_eq!(back.dng_level, 0);
        assert!(back.in_dungeon());
    }
}
