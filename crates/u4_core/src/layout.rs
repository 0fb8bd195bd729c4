use std::io;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Named regions of PARTY.SAV, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionId {
    /// `unknown1` and the move counter.
    Header,
    /// One 39-byte character record, by slot.
    Character(u8),
    /// Food and gold.
    Resources,
    Karma,
    /// Torches, gems, keys, sextants and the armor/weapon counts.
    Equipment,
    /// Reagents, mixtures and the item bitmask.
    Inventory,
    /// World position, stones, runes and member count.
    Position,
    /// Transport, moons, ship hull and award timestamps.
    Environment,
    /// Dungeon position, orientation, level and location.
    Dungeon,
}

impl SectionId {
    pub fn label(&self) -> String {
        match self {
            Self::Header => "header".to_string(),
            Self::Character(slot) => format!("character{slot}"),
            Self::Resources => "resources".to_string(),
            Self::Karma => "karma".to_string(),
            Self::Equipment => "equipment".to_string(),
            Self::Inventory => "inventory".to_string(),
            Self::Position => "position".to_string(),
            Self::Environment => "environment".to_string(),
            Self::Dungeon => "dungeon".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub fn section(&self, id: SectionId) -> Option<&SectionLayout> {
        self.sections.iter().find(|section| section.id == id)
    }

    /// Sections must tile the file from byte 0 to `file_len` in order.
    pub fn validate(&self) -> io::Result<()> {
        if self.sections.is_empty() {
            return Err(invalid_layout("no sections recorded".to_string()));
        }

        let covered = self.sections.iter().try_fold(0usize, |cursor, section| {
            let ByteRange { start, end } = section.range;
            if start != cursor {
                return Err(invalid_layout(format!(
                    "{} starts at byte {start}, previous section ended at {cursor}",
                    section.id.label()
                )));
            }
            if end < start {
                return Err(invalid_layout(format!(
                    "{} has a reversed range {start}..{end}",
                    section.id.label()
                )));
            }
            Ok(end)
        })?;

        if covered != self.file_len {
            return Err(invalid_layout(format!(
                "sections cover {covered} of {} bytes",
                self.file_len
            )));
        }
        Ok(())
    }
}

fn invalid_layout(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: SectionId, start: usize, end: usize) -> SectionLayout {
        SectionLayout {
            id,
            range: ByteRange { start, end },
        }
    }

    #[test]
    fn contiguous_layout_validates() {
        let layout = FileLayout {
            file_len: 10,
            sections: vec![
                section(SectionId::Header, 0, 8),
                section(SectionId::Resources, 8, 10),
            ],
        };
        assert!(layout.validate().is_ok());
        assert_eq!(layout.section(SectionId::Resources).unwrap().range.len(), 2);
    }

    #[test]
    fn gap_is_rejected() {
        let layout = FileLayout {
            file_len: 10,
            sections: vec![
                section(SectionId::Header, 0, 8),
                section(SectionId::Resources, 9, 10),
            ],
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn short_coverage_is_rejected() {
        let layout = FileLayout {
            file_len: 12,
            sections: vec![section(SectionId::Header, 0, 8)],
        };
        assert!(layout.validate().is_err());
    }
}
