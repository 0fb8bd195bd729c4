use std::io::{self, Read, Write};

use serde::Serialize;

use crate::codec::{LittleEndianReader, LittleEndianWriter};

pub const CREATURE_TABLE_SLOTS: usize = 32;
pub const CREATURE_RECORD_LEN: usize = 8;

/// A creature on the surface map as stored in MONSTERS.SAV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreatureSnapshot {
    pub tile: u8,
    pub x: u8,
    pub y: u8,
    pub prev_tile: u8,
    pub prev_x: u8,
    pub prev_y: u8,
    /// Trailing padding of the slot, kept so the table re-encodes unchanged.
    pub unused: [u8; 2],
}

impl CreatureSnapshot {
    fn is_live(&self) -> bool {
        self.tile != 0 && self.prev_tile != 0
    }

    fn read<R: Read>(r: &mut LittleEndianReader<R>) -> io::Result<Self> {
        let prev_tile = r.read_u8()?;
        let x = r.read_u8()?;
        let y = r.read_u8()?;
        let tile = r.read_u8()?;
        let prev_x = r.read_u8()?;
        let prev_y = r.read_u8()?;
        let unused = r.read_array::<2>()?;

        Ok(Self {
            tile,
            x,
            y,
            prev_tile,
            prev_x,
            prev_y,
            unused,
        })
    }

    fn write<W: Write>(&self, w: &mut LittleEndianWriter<W>) -> io::Result<()> {
        w.write_u8(self.prev_tile)?;
        w.write_u8(self.x)?;
        w.write_u8(self.y)?;
        w.write_u8(self.tile)?;
        w.write_u8(self.prev_x)?;
        w.write_u8(self.prev_y)?;
        w.write_bytes(&self.unused)
    }
}

/// Writes all 32 slots, zero-filling those past the end of `creatures`.
pub fn write_creature_table<W: Write>(creatures: &[CreatureSnapshot], writer: W) -> io::Result<()> {
    if creatures.len() > CREATURE_TABLE_SLOTS {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "creature table holds {CREATURE_TABLE_SLOTS} entries, got {}",
                creatures.len()
            ),
        ));
    }

    let mut w = LittleEndianWriter::new(writer);
    let empty = CreatureSnapshot::default();
    for slot in 0..CREATURE_TABLE_SLOTS {
        creatures.get(slot).unwrap_or(&empty).write(&mut w)?;
    }
    w.flush()
}

/// Reads a full table and keeps the live slots, in slot order.
pub fn read_creature_table<R: Read>(reader: R) -> io::Result<Vec<CreatureSnapshot>> {
    let mut r = LittleEndianReader::new(reader);
    let mut slots = Vec::with_capacity(CREATURE_TABLE_SLOTS);
    for _ in 0..CREATURE_TABLE_SLOTS {
        slots.push(CreatureSnapshot::read(&mut r)?);
    }

    // Walk backwards, pushing each live entry to the front of the list.
    let mut live = std::collections::VecDeque::new();
    for creature in slots.into_iter().rev() {
        if creature.is_live() {
            live.push_front(creature);
        }
    }

    log::trace!("read {} live creatures", live.len());
    Ok(live.into())
}
