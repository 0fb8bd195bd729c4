use rand::Rng;

use super::Party;
use super::error::HealError;
use super::event::{Coords, CorpseMarker, Operation, PartyEvent};
use crate::save::CharacterRecord;
use crate::types::{Armor, CORPSE_TILE, MAX_STAT, MAX_XP, Status, TileEffect, Weapon};

/// Ways a member can be healed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealKind {
    None,
    Cure,
    FullHeal,
    Resurrect,
    Heal,
    CampHeal,
    InnHeal,
}

/// Runtime state of an active party member that is not saved with the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyMember {
    statuses: Vec<Status>,
    tile: u16,
    ranged: bool,
    position: Option<Coords>,
}

impl PartyMember {
    pub(super) fn from_record(record: &CharacterRecord) -> Self {
        Self {
            statuses: vec![record.status],
            tile: record.class.tile(),
            ranged: record.weapon.is_ranged(),
            position: None,
        }
    }

    pub fn status(&self) -> Status {
        self.statuses.last().copied().unwrap_or(Status::Good)
    }

    pub fn tile(&self) -> u16 {
        self.tile
    }

    pub fn is_ranged(&self) -> bool {
        self.ranged
    }

    pub fn position(&self) -> Option<Coords> {
        self.position
    }

    pub fn is_dead(&self) -> bool {
        self.status() == Status::Dead
    }

    /// Sleeping and dead members cannot act.
    pub fn is_disabled(&self) -> bool {
        !matches!(self.status(), Status::Good | Status::Poisoned)
    }
}

/// Mutable access to one active member and the party it belongs to.
pub struct MemberMut<'p, 'a> {
    party: &'p mut Party<'a>,
    slot: usize,
}

impl<'p, 'a> MemberMut<'p, 'a> {
    pub(super) fn new(party: &'p mut Party<'a>, slot: usize) -> Self {
        Self { party, slot }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn record(&self) -> &CharacterRecord {
        &self.party.save.players[self.slot]
    }

    pub fn runtime(&self) -> &PartyMember {
        &self.party.members[self.slot]
    }

    pub fn status(&self) -> Status {
        self.runtime().status()
    }

    fn record_mut(&mut self) -> &mut CharacterRecord {
        &mut self.party.save.players[self.slot]
    }

    fn runtime_mut(&mut self) -> &mut PartyMember {
        &mut self.party.members[self.slot]
    }

    fn changed(&mut self, operation: Operation) {
        let slot = self.slot;
        self.party.emit(PartyEvent::MemberChanged { slot, operation });
    }

    fn sync_status(&mut self) {
        let status = self.runtime().status();
        self.record_mut().status = status;
    }

    /// Pushes `status` unless it is already on top. Dead members keep their status.
    /// Returns false when nothing changed.
    pub fn add_status(&mut self, status: Status) -> bool {
        if self.runtime().is_dead() || self.runtime().status() == status {
            return false;
        }
        self.runtime_mut().statuses.push(status);
        self.sync_status();
        self.changed(Operation::AddStatus);
        true
    }

    /// Removes every occurrence of `status`; an emptied stack falls back to Good.
    /// Returns false when nothing changed.
    pub fn remove_status(&mut self, status: Status) -> bool {
        let runtime = self.runtime_mut();
        let before = runtime.statuses.clone();
        runtime.statuses.retain(|&s| s != status);
        if runtime.statuses.is_empty() {
            runtime.statuses.push(Status::Good);
        }
        if runtime.statuses == before {
            return false;
        }
        self.sync_status();
        self.changed(Operation::RemoveStatus);
        true
    }

    /// Replaces the whole stack with `status`.
    pub fn set_status(&mut self, status: Status) {
        self.runtime_mut().statuses = vec![status];
        self.sync_status();
        self.changed(Operation::SetStatus);
    }

    /// Returns false if the member is dead afterwards, or was already dead.
    pub fn apply_damage(&mut self, damage: u16) -> bool {
        if self.runtime().is_dead() {
            return false;
        }

        let hp = self.record().hp;
        let killed = damage >= hp;
        if killed {
            self.runtime_mut().statuses = vec![Status::Dead];
            self.sync_status();
            self.record_mut().hp = 0;
        } else {
            self.record_mut().hp = hp - damage;
        }
        self.changed(Operation::ApplyDamage);

        if !killed {
            return true;
        }

        log::debug!("{} is killed", self.record().name());
        let corpse = if self.party.context.is_combat() {
            let ttl = self.party.size();
            let corpse = self.runtime().position.map(|coords| CorpseMarker {
                coords,
                tile: CORPSE_TILE,
                ttl,
            });
            self.remove_from_map();
            corpse
        } else {
            None
        };
        let slot = self.slot;
        self.party.emit(PartyEvent::MemberKilled { slot, corpse });

        false
    }

    pub fn heal(&mut self, kind: HealKind) -> Result<(), HealError> {
        let status = self.status();
        let needs_hp = |record: &CharacterRecord| -> Result<(), HealError> {
            if status == Status::Dead {
                Err(HealError::Dead)
            } else if record.hp >= record.hp_max {
                Err(HealError::AlreadyFullHealth)
            } else {
                Ok(())
            }
        };

        match kind {
            HealKind::None => return Ok(()),
            HealKind::Cure => {
                if status != Status::Poisoned {
                    return Err(HealError::NotPoisoned);
                }
                self.remove_status(Status::Poisoned);
            }
            HealKind::Resurrect => {
                if status != Status::Dead {
                    return Err(HealError::NotDead);
                }
                self.set_status(Status::Good);
            }
            HealKind::FullHeal => {
                needs_hp(self.record())?;
                let record = self.record_mut();
                record.hp = record.hp_max;
            }
            HealKind::Heal => {
                needs_hp(self.record())?;
                let amount = 75 + self.party.rng.gen_range(0..256u16) % 25;
                self.restore_hp(amount);
            }
            HealKind::CampHeal => {
                needs_hp(self.record())?;
                let amount = 99 + (self.party.rng.gen_range(0..256u16) & 0x77);
                self.restore_hp(amount);
            }
            HealKind::InnHeal => {
                needs_hp(self.record())?;
                let amount = 100 + self.party.rng.gen_range(0..50u16) * 2;
                self.restore_hp(amount);
            }
        }

        self.changed(Operation::Heal);
        Ok(())
    }

    fn restore_hp(&mut self, amount: u16) {
        let record = self.record_mut();
        record.hp = record.hp.saturating_add(amount).min(record.hp_max);
    }

    /// Raises the member to the level its experience supports.
    /// Returns false when there is nothing to gain.
    pub fn advance_level(&mut self) -> bool {
        let record = self.record();
        if record.level() >= record.max_level() {
            return false;
        }

        let level = record.max_level();
        self.runtime_mut().statuses = vec![Status::Good];
        self.sync_status();

        let gains: [u16; 3] = [
            self.party.rng.gen_range(1..=8),
            self.party.rng.gen_range(1..=8),
            self.party.rng.gen_range(1..=8),
        ];
        let record = self.record_mut();
        record.hp_max = level * 100;
        record.hp = record.hp_max;
        record.strength = record.strength.saturating_add(gains[0]).min(MAX_STAT);
        record.dexterity = record.dexterity.saturating_add(gains[1]).min(MAX_STAT);
        record.intelligence = record.intelligence.saturating_add(gains[2]).min(MAX_STAT);

        log::debug!("{} advanced to level {level}", self.record().name());
        let slot = self.slot;
        self.party.emit(PartyEvent::LevelAdvanced { slot, level });
        self.changed(Operation::AdvanceLevel);
        true
    }

    pub fn award_xp(&mut self, xp: u16) {
        let record = self.record_mut();
        let old = record.xp;
        record.xp = old.saturating_add(xp).min(MAX_XP);
        if record.xp != old {
            self.changed(Operation::AwardXp);
        }
    }

    /// Adjusts magic points within `0..=max_mp`.
    pub fn adjust_mp(&mut self, delta: i32) {
        let max = i32::from(self.record().max_mp());
        let record = self.record_mut();
        let old = record.mp;
        record.mp = (i32::from(old) + delta).clamp(0, max) as u16;
        if record.mp != old {
            self.changed(Operation::AdjustMp);
        }
    }

    pub fn put_to_sleep(&mut self) {
        if self.runtime().is_dead() {
            return;
        }
        self.add_status(Status::Sleeping);
        self.runtime_mut().tile = CORPSE_TILE;
    }

    pub fn wake_up(&mut self) {
        self.remove_status(Status::Sleeping);
        let tile = self.record().class.tile();
        self.runtime_mut().tile = tile;
    }

    /// Electricity and None leave the member untouched.
    pub fn apply_effect(&mut self, effect: TileEffect) {
        if self.runtime().is_dead() {
            return;
        }

        let applied = match effect {
            TileEffect::None | TileEffect::Electricity => false,
            TileEffect::Fire | TileEffect::Lava => {
                let damage = 16 + self.party.rng.gen_range(0..32);
                self.apply_damage(damage);
                true
            }
            TileEffect::Sleep => {
                let before = (self.status(), self.runtime().tile);
                self.put_to_sleep();
                before != (self.status(), self.runtime().tile)
            }
            TileEffect::Poison | TileEffect::PoisonField => self.add_status(Status::Poisoned),
        };

        if applied {
            self.changed(Operation::ApplyEffect);
        }
    }

    /// Drops the wielded weapon. Returns how many of that weapon the party
    /// had including the one dropped, or 0 if the member is now unarmed.
    pub fn lose_weapon(&mut self) -> u16 {
        let weapon = self.record().weapon;
        let stock = &mut self.party.save.weapons[weapon.index()];
        let remaining = if *stock > 0 {
            *stock -= 1;
            *stock + 1
        } else if weapon != Weapon::Hands {
            self.set_weapon(Weapon::Hands);
            0
        } else {
            return 0;
        };
        self.changed(Operation::LoseWeapon);
        remaining
    }

    pub fn set_weapon(&mut self, weapon: Weapon) {
        if self.record().weapon == weapon {
            return;
        }
        self.record_mut().weapon = weapon;
        self.runtime_mut().ranged = weapon.is_ranged();
        self.changed(Operation::SetWeapon);
    }

    pub fn set_armor(&mut self, armor: Armor) {
        if self.record().armor == armor {
            return;
        }
        self.record_mut().armor = armor;
        self.changed(Operation::SetArmor);
    }

    pub fn set_hp(&mut self, hp: u16) {
        if self.record().hp == hp {
            return;
        }
        self.record_mut().hp = hp;
        self.changed(Operation::SetHp);
    }

    pub fn set_mp(&mut self, mp: u16) {
        if self.record().mp == mp {
            return;
        }
        self.record_mut().mp = mp;
        self.changed(Operation::SetMp);
    }

    pub fn place_at(&mut self, coords: Coords) {
        self.runtime_mut().position = Some(coords);
    }

    pub fn remove_from_map(&mut self) {
        self.runtime_mut().position = None;
    }
}
