use std::fmt;

use serde::Serialize;

use crate::karma::KarmaAction;
use crate::types::Virtue;

/// A map position. `z` is the dungeon level or 0 on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coords {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A corpse drawn where a member fell in combat. It fades after `ttl` turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpseMarker {
    pub coords: Coords,
    pub tile: u16,
    pub ttl: usize,
}

/// The mutation behind a [`PartyEvent::Changed`] or [`PartyEvent::MemberChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    AdjustFood,
    AdjustGold,
    AdjustKarma(KarmaAction),
    AdjustReagent,
    DamageShip,
    HealShip,
    SetShipHull,
    LightTorch,
    BurnTorch,
    QuenchTorch,
    EndTurn,
    Join,
    AttemptElevation,
    ReviveParty,
    SetTransport,
    ApplyDamage,
    Heal,
    AdvanceLevel,
    AwardXp,
    AdjustMp,
    AddStatus,
    RemoveStatus,
    SetStatus,
    ApplyEffect,
    LoseWeapon,
    SetWeapon,
    SetArmor,
    SetHp,
    SetMp,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdjustFood => "adjust_food",
            Self::AdjustGold => "adjust_gold",
            Self::AdjustKarma(_) => "adjust_karma",
            Self::AdjustReagent => "adjust_reagent",
            Self::DamageShip => "damage_ship",
            Self::HealShip => "heal_ship",
            Self::SetShipHull => "set_ship_hull",
            Self::LightTorch => "light_torch",
            Self::BurnTorch => "burn_torch",
            Self::QuenchTorch => "quench_torch",
            Self::EndTurn => "end_turn",
            Self::Join => "join",
            Self::AttemptElevation => "attempt_elevation",
            Self::ReviveParty => "revive_party",
            Self::SetTransport => "set_transport",
            Self::ApplyDamage => "apply_damage",
            Self::Heal => "heal",
            Self::AdvanceLevel => "advance_level",
            Self::AwardXp => "award_xp",
            Self::AdjustMp => "adjust_mp",
            Self::AddStatus => "add_status",
            Self::RemoveStatus => "remove_status",
            Self::SetStatus => "set_status",
            Self::ApplyEffect => "apply_effect",
            Self::LoseWeapon => "lose_weapon",
            Self::SetWeapon => "set_weapon",
            Self::SetArmor => "set_armor",
            Self::SetHp => "set_hp",
            Self::SetMp => "set_mp",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdjustKarma(action) => write!(f, "adjust_karma({action})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Notifications delivered to subscribers after a mutation has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PartyEvent {
    Changed(Operation),
    MemberChanged { slot: usize, operation: Operation },
    EighthLost(Virtue),
    LevelAdvanced { slot: usize, level: u16 },
    MemberKilled { slot: usize, corpse: Option<CorpseMarker> },
    Starving,
}

pub trait PartyObserver {
    fn notify(&mut self, event: &PartyEvent);
}

impl<F> PartyObserver for F
where
    F: FnMut(&PartyEvent),
{
    fn notify(&mut self, event: &PartyEvent) {
        self(event)
    }
}
