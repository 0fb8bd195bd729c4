//! Karma adjustment rules.
//!
//! Karma is stored per virtue as 0 (the Avatar has attained the virtue) or
//! 1..=99. While an action is evaluated, an attained virtue is worked on as
//! 100 so that any penalty drops it below the avatar threshold.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{AVATAR_KARMA, MAX_KARMA, VIRTUE_COUNT, Virtue};

const AVATAR_WORKING_VALUE: u16 = 100;
const KARMA_FLOOR: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KarmaAction {
    FoundItem,
    StoleChest,
    GaveToBeggar,
    Bragged,
    Humble,
    Hawkwind,
    Meditation,
    BadMantra,
    AttackedGood,
    FledEvil,
    HealthyFledEvil,
    KilledEvil,
    SparedGood,
    DonatedBlood,
    DidntDonateBlood,
    CheatReagents,
    DidntCheatReagents,
    UsedSkull,
    DestroyedSkull,
}

impl KarmaAction {
    pub const ALL: [KarmaAction; 19] = [
        KarmaAction::FoundItem,
        KarmaAction::StoleChest,
        KarmaAction::GaveToBeggar,
        KarmaAction::Bragged,
        KarmaAction::Humble,
        KarmaAction::Hawkwind,
        KarmaAction::Meditation,
        KarmaAction::BadMantra,
        KarmaAction::AttackedGood,
        KarmaAction::FledEvil,
        KarmaAction::HealthyFledEvil,
        KarmaAction::KilledEvil,
        KarmaAction::SparedGood,
        KarmaAction::DonatedBlood,
        KarmaAction::DidntDonateBlood,
        KarmaAction::CheatReagents,
        KarmaAction::DidntCheatReagents,
        KarmaAction::UsedSkull,
        KarmaAction::DestroyedSkull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FoundItem => "found_item",
            Self::StoleChest => "stole_chest",
            Self::GaveToBeggar => "gave_to_beggar",
            Self::Bragged => "bragged",
            Self::Humble => "humble",
            Self::Hawkwind => "hawkwind",
            Self::Meditation => "meditation",
            Self::BadMantra => "bad_mantra",
            Self::AttackedGood => "attacked_good",
            Self::FledEvil => "fled_evil",
            Self::HealthyFledEvil => "healthy_fled_evil",
            Self::KilledEvil => "killed_evil",
            Self::SparedGood => "spared_good",
            Self::DonatedBlood => "donated_blood",
            Self::DidntDonateBlood => "didnt_donate_blood",
            Self::CheatReagents => "cheat_reagents",
            Self::DidntCheatReagents => "didnt_cheat_reagents",
            Self::UsedSkull => "used_skull",
            Self::DestroyedSkull => "destroyed_skull",
        }
    }

    /// Time-limited actions count at most once per 16 moves.
    pub fn is_time_limited(self) -> bool {
        matches!(
            self,
            Self::GaveToBeggar | Self::Humble | Self::DidntCheatReagents
        )
    }
}

impl fmt::Display for KarmaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The committed result of a karma adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KarmaOutcome {
    pub karma: [u16; VIRTUE_COUNT],
    pub last_virtue: u16,
    /// Virtues the Avatar held before the action and no longer holds.
    pub lost_eighths: Vec<Virtue>,
}

/// 16-move resolution timestamp compared against `last_virtue`.
/// Wraps at 16 bits like the stored field.
pub fn virtue_timestamp(moves: u32) -> u16 {
    ((moves / 16) & 0xFFFF) as u16
}

struct Working {
    values: [u16; VIRTUE_COUNT],
    ceilings: [u16; VIRTUE_COUNT],
}

impl Working {
    fn new(karma: &[u16; VIRTUE_COUNT]) -> Self {
        let mut values = [0; VIRTUE_COUNT];
        let mut ceilings = [0; VIRTUE_COUNT];
        for (v, &stored) in karma.iter().enumerate() {
            if stored == AVATAR_KARMA {
                values[v] = AVATAR_WORKING_VALUE;
                ceilings[v] = AVATAR_WORKING_VALUE;
            } else {
                values[v] = stored.min(MAX_KARMA);
                ceilings[v] = MAX_KARMA;
            }
        }
        Self { values, ceilings }
    }

    fn raise(&mut self, virtue: Virtue, amount: u16) {
        let v = virtue.index();
        self.values[v] = self.values[v].saturating_add(amount).min(self.ceilings[v]);
    }

    fn lower(&mut self, virtue: Virtue, amount: u16) {
        let v = virtue.index();
        self.values[v] = self.values[v].saturating_sub(amount).max(KARMA_FLOOR);
    }

    fn commit(self) -> ([u16; VIRTUE_COUNT], Vec<Virtue>) {
        let mut karma = [0; VIRTUE_COUNT];
        let mut lost = Vec::new();
        for virtue in Virtue::ALL {
            let v = virtue.index();
            karma[v] = if self.ceilings[v] == AVATAR_WORKING_VALUE {
                if self.values[v] < AVATAR_WORKING_VALUE {
                    lost.push(virtue);
                    self.values[v]
                } else {
                    AVATAR_KARMA
                }
            } else {
                self.values[v].min(MAX_KARMA)
            };
        }
        (karma, lost)
    }
}

/// Applies `action` to `karma`.
///
/// Returns `None` when a time-limited action repeats within the same
/// 16-move window; nothing is changed in that case.
pub fn adjust_karma<R: Rng + ?Sized>(
    action: KarmaAction,
    karma: &[u16; VIRTUE_COUNT],
    moves: u32,
    last_virtue: u16,
    rng: &mut R,
) -> Option<KarmaOutcome> {
    use Virtue::*;

    let mut w = Working::new(karma);

    match action {
        KarmaAction::FoundItem => w.raise(Honor, 5),
        KarmaAction::StoleChest => {
            w.lower(Honesty, 1);
            w.lower(Justice, 1);
            w.lower(Honor, 1);
        }
        KarmaAction::GaveToBeggar => {
            w.raise(Compassion, 2);
            w.raise(Honor, 3);
        }
        KarmaAction::Bragged => w.lower(Humility, 5),
        KarmaAction::Humble => w.raise(Humility, 10),
        KarmaAction::Hawkwind | KarmaAction::Meditation => w.raise(Spirituality, 3),
        KarmaAction::BadMantra => w.lower(Spirituality, 3),
        KarmaAction::AttackedGood => {
            w.lower(Compassion, 5);
            w.lower(Justice, 5);
            w.lower(Honor, 5);
        }
        KarmaAction::FledEvil => w.lower(Valor, 2),
        KarmaAction::HealthyFledEvil => {
            w.lower(Valor, 2);
            w.lower(Sacrifice, 2);
        }
        // Valor goes up half the time.
        KarmaAction::KilledEvil => w.raise(Valor, rng.gen_range(0..=1)),
        KarmaAction::SparedGood => {
            w.raise(Compassion, 1);
            w.raise(Justice, 1);
        }
        KarmaAction::DonatedBlood => w.raise(Sacrifice, 5),
        KarmaAction::DidntDonateBlood => w.lower(Sacrifice, 5),
        KarmaAction::CheatReagents => {
            w.lower(Honesty, 10);
            w.lower(Justice, 10);
            w.lower(Honor, 10);
        }
        KarmaAction::DidntCheatReagents => {
            w.raise(Honesty, 2);
            w.raise(Justice, 2);
            w.raise(Honor, 2);
        }
        KarmaAction::UsedSkull => {
            for virtue in Virtue::ALL {
                w.lower(virtue, 5);
            }
        }
        KarmaAction::DestroyedSkull => {
            for virtue in Virtue::ALL {
                w.raise(virtue, 10);
            }
        }
    }

    let mut last_virtue = last_virtue;
    if action.is_time_limited() {
        let stamp = virtue_timestamp(moves);
        if stamp == last_virtue {
            log::trace!("{action} ignored: already rewarded at timestamp {stamp}");
            return None;
        }
        last_virtue = stamp;
    }

    let (karma, lost_eighths) = w.commit();
    log::debug!("karma after {action}: {karma:?}");
    for virtue in &lost_eighths {
        log::warn!("avatar lost the eighth of {virtue}");
    }

    Some(KarmaOutcome {
        karma,
        last_virtue,
        lost_eighths,
    })
}
